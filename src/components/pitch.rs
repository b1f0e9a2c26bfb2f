use matchday_api::formation::PositionGroup;
use matchday_api::lineup::SquadPlayer;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

/// Starting XI laid out by line, forwards at the top and the keeper at the
/// bottom. Players with an unknown position code get their own row.
pub struct PitchView<'a> {
    pub players: &'a [SquadPlayer],
}

#[derive(Debug, PartialEq, Eq)]
pub struct PitchRow {
    pub label: &'static str,
    pub names: Vec<String>,
}

pub fn pitch_rows(players: &[SquadPlayer]) -> Vec<PitchRow> {
    let lines: [(Option<PositionGroup>, &'static str); 5] = [
        (Some(PositionGroup::Forward), "FWD"),
        (Some(PositionGroup::Midfielder), "MID"),
        (Some(PositionGroup::Defender), "DEF"),
        (Some(PositionGroup::Goalkeeper), "GK"),
        (None, "???"),
    ];

    lines
        .iter()
        .filter_map(|(group, label)| {
            let names: Vec<String> = players
                .iter()
                .filter(|p| p.group() == *group)
                .map(|p| {
                    let captain = if p.is_captain { " (C)" } else { "" };
                    format!("{} {}{captain}", p.jersey_number, p.name)
                })
                .collect();
            (!names.is_empty()).then_some(PitchRow { label, names })
        })
        .collect()
}

impl Widget for PitchView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 8 || area.height == 0 {
            return;
        }

        let rows = pitch_rows(self.players);
        if rows.is_empty() {
            buf.set_string(area.x, area.y, "No starters picked", Style::default().fg(Color::DarkGray));
            return;
        }

        let step = (area.height / rows.len() as u16).max(1);
        for (i, row) in rows.iter().enumerate() {
            let y = area.y + step * i as u16 + step / 2;
            if y >= area.y + area.height {
                break;
            }
            buf.set_string(area.x, y, row.label, Style::default().fg(Color::DarkGray));

            let text = row.names.join("   ");
            let text_w = text.chars().count() as u16;
            let usable = area.width.saturating_sub(4);
            let x = area.x + 4 + usable.saturating_sub(text_w) / 2;
            buf.set_stringn(
                x,
                y,
                &text,
                usable as usize,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            );
        }
    }
}

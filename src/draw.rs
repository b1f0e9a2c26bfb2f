use chrono::Local;
use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::pitch::PitchView;
use crate::components::split_bar::SplitBar;
use crate::state::app_state::{LineupPanel, timeline_entries};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use matchday_api::reconcile::{ReconciledView, share_hundredths};
use matchday_api::{CheerMeter, TeamSide, TeamStats, TimelineKind};

static TABS: &[&str; 4] = &["Live", "Stats", "Timeline", "Lineup"];

const HOME_COLOR: Color = Color::Blue;
const AWAY_COLOR: Color = Color::Red;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }
        draw_notice(f, layout.notice, app);

        // Reconciled once per frame and shared by every tab.
        let view = app.state.live.view();
        match app.state.active_tab {
            MenuItem::Live => draw_live(f, layout.main, app, &view),
            MenuItem::Stats => draw_stats(f, layout.main, &view),
            MenuItem::Timeline => draw_timeline(f, layout.main, app, &view),
            MenuItem::Lineup => draw_lineup(f, layout.main, app, &view),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("draw failed: {e:?}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn team_color(side: TeamSide) -> Color {
    match side {
        TeamSide::Home => HOME_COLOR,
        TeamSide::Away => AWAY_COLOR,
    }
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Live => 0,
        MenuItem::Stats => 1,
        MenuItem::Timeline => 2,
        MenuItem::Lineup => 3,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let (marker, marker_color) = if app.state.live.connected {
        ("● live", Color::Green)
    } else {
        ("○ offline", Color::DarkGray)
    };
    let help = Paragraph::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(marker_color)),
        Span::raw("  Help: ? "),
    ]))
    .alignment(Alignment::Right)
    .block(
        Block::default()
            .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
            .border_type(border_type),
    )
    .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_notice(f: &mut Frame, area: Rect, app: &App) {
    let Some(notice) = app.state.notice.as_ref() else {
        return;
    };
    let color = if notice.is_error { Color::Red } else { Color::Green };
    f.render_widget(
        Paragraph::new(format!(" {}", notice.message)).style(Style::default().fg(color)),
        area,
    );
}

// ---------------------------------------------------------------------------
// Live tab
// ---------------------------------------------------------------------------

fn draw_live(f: &mut Frame, area: Rect, app: &App, view: &ReconciledView) {
    let block = default_border(Color::White).title(format!(" Fixture {} ", app.fixture_id()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.live.snapshot.is_none() {
        let msg = match app.state.last_error.as_deref() {
            Some(err) => format!("Fixture load failed:\n{err}"),
            None => "Loading fixture...".to_string(),
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let [scoreboard, info, possession, cheer, goals, key_legend] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    draw_scoreboard(f, scoreboard, view);
    draw_general_info(f, info, view);

    let share = view.possession();
    f.render_widget(
        SplitBar {
            title: "Possession",
            left_label: format!("{:.2}%", share.home_percent()),
            right_label: format!("{:.2}%", share.away_percent()),
            left_hundredths: share.home_hundredths,
            left_color: HOME_COLOR,
            right_color: AWAY_COLOR,
        },
        possession,
    );
    f.render_widget(
        SplitBar {
            title: "Cheer meter",
            left_label: view.cheer_meter.home.to_string(),
            right_label: view.cheer_meter.away.to_string(),
            left_hundredths: cheer_hundredths(&view.cheer_meter),
            left_color: HOME_COLOR,
            right_color: AWAY_COLOR,
        },
        cheer,
    );

    draw_goal_list(f, goals, view);

    f.render_widget(
        Paragraph::new("Keys: c/C=cheer home/away  s=next status  h/H a/A=home/away score +/-  R=refresh")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );
}

fn draw_scoreboard(f: &mut Frame, area: Rect, view: &ReconciledView) {
    let team = |name: &str, side: TeamSide| {
        Span::styled(
            name.to_string(),
            Style::default().fg(team_color(side)).add_modifier(Modifier::BOLD),
        )
    };

    let mut lines = vec![
        Line::from(vec![
            team(&view.home.name, TeamSide::Home),
            Span::styled(
                format!("   {}  -  {}   ", view.home_score, view.away_score),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            team(&view.away.name, TeamSide::Away),
        ]),
        Line::from(Span::styled(
            format!("{}  {}", view.status.label(), view.clock_label()),
            Style::default().fg(if view.status.is_live() { Color::Green } else { Color::Gray }),
        )),
    ];

    let mut extras = Vec::new();
    if let Some((home, away)) = view.halftime_score {
        extras.push(format!("HT {home}-{away}"));
    }
    if view.live_watchers > 0 {
        extras.push(format!("{} watching", view.live_watchers));
    }
    if !extras.is_empty() {
        lines.push(Line::from(Span::styled(extras.join("  |  "), Style::default().fg(Color::DarkGray))));
    }

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_general_info(f: &mut Frame, area: Rect, view: &ReconciledView) {
    let kickoff = view
        .kickoff_time
        .map(|t| t.with_timezone(&Local).format("%a %d %b %H:%M").to_string())
        .unwrap_or_else(|| "TBA".to_string());
    let label = Style::default().fg(Color::DarkGray);

    let lines = vec![
        Line::from(vec![
            Span::styled("Referee ", label),
            Span::raw(view.referee.clone()),
            Span::styled("   Kickoff ", label),
            Span::raw(kickoff),
        ]),
        Line::from(vec![
            Span::styled("Venue ", label),
            Span::raw(view.venue.clone()),
            Span::styled("   Weather ", label),
            Span::raw(view.weather.clone()),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_goal_list(f: &mut Frame, area: Rect, view: &ReconciledView) {
    let block = default_border(Color::DarkGray).title(" Goals ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if view.goal_scorers.is_empty() {
        f.render_widget(
            Paragraph::new("No goals yet").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let lines: Vec<Line> = view
        .goal_scorers
        .iter()
        .map(|g| {
            let tag = match (g.penalty, g.own_goal) {
                (true, _) => " (pen)",
                (_, true) => " (og)",
                _ => "",
            };
            let short = &view.team(g.team).short_name;
            Line::from(vec![
                Span::styled(format!("{:>3}' ", g.minute), Style::default().fg(Color::Gray)),
                Span::styled(format!("{short:<4}"), Style::default().fg(team_color(g.team))),
                Span::raw(format!("{}{tag}", g.player_name)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn cheer_hundredths(meter: &CheerMeter) -> u16 {
    share_hundredths(u64::from(meter.home), u64::from(meter.away))
}

// ---------------------------------------------------------------------------
// Stats tab
// ---------------------------------------------------------------------------

fn draw_stats(f: &mut Frame, area: Rect, view: &ReconciledView) {
    let block = default_border(Color::White).title(" Match Statistics ");
    let share = view.possession();
    let (home, away) = (&view.statistics.home, &view.statistics.away);

    let counted: [(&str, fn(&TeamStats) -> u16); 8] = [
        ("Shots", |s: &TeamStats| s.shots),
        ("Shots on target", |s: &TeamStats| s.shots_on_target),
        ("Corners", |s: &TeamStats| s.corners),
        ("Fouls", |s: &TeamStats| s.fouls),
        ("Yellow cards", |s: &TeamStats| s.yellow_cards),
        ("Red cards", |s: &TeamStats| s.red_cards),
        ("Offsides", |s: &TeamStats| s.offsides),
        ("Saves", |s: &TeamStats| s.saves),
    ];

    let mut rows = vec![Row::new(vec![
        Cell::from(format!("{:.2}%", share.home_percent())),
        Cell::from("Possession"),
        Cell::from(format!("{:.2}%", share.away_percent())),
    ])];
    rows.extend(counted.iter().map(|(label, pick)| {
        Row::new(vec![
            Cell::from(pick(home).to_string()),
            Cell::from(*label),
            Cell::from(pick(away).to_string()),
        ])
    }));

    let header = Row::new(vec![
        Cell::from(view.home.short_name.clone()).style(Style::default().fg(HOME_COLOR)),
        Cell::from(""),
        Cell::from(view.away.short_name.clone()).style(Style::default().fg(AWAY_COLOR)),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [Constraint::Length(10), Constraint::Fill(1), Constraint::Length(10)],
    )
    .header(header)
    .column_spacing(2)
    .block(block);
    f.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Timeline tab
// ---------------------------------------------------------------------------

fn draw_timeline(f: &mut Frame, area: Rect, app: &App, view: &ReconciledView) {
    let block = default_border(Color::White).title(" Timeline ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [list_area, key_legend] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
    f.render_widget(
        Paragraph::new("Keys: j/k=move  d=delete entry").style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let entries = timeline_entries(view);
    if entries.is_empty() {
        f.render_widget(
            Paragraph::new("Nothing has happened yet")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            list_area,
        );
        return;
    }

    let items: Vec<ListItem> = entries
        .iter()
        .map(|e| {
            let (team, color) = match e.team {
                Some(side) => (view.team(side).short_name.clone(), team_color(side)),
                None => (String::new(), Color::Gray),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>3}' ", e.minute), Style::default().fg(Color::Gray)),
                Span::styled(format!("{:<5}", e.kind.symbol()), kind_style(e.kind)),
                Span::styled(format!("{team:<4} "), Style::default().fg(color)),
                Span::raw(e.text.clone()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.state.timeline.selected));
    f.render_stateful_widget(list, list_area, &mut state);
}

fn kind_style(kind: TimelineKind) -> Style {
    let color = match kind {
        TimelineKind::Goal => Color::Green,
        TimelineKind::YellowCard => Color::Yellow,
        TimelineKind::RedCard => Color::Red,
        TimelineKind::Substitution => Color::Cyan,
        TimelineKind::VarReview => Color::Magenta,
        TimelineKind::Injury | TimelineKind::Other => Color::Gray,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

// ---------------------------------------------------------------------------
// Lineup tab
// ---------------------------------------------------------------------------

fn draw_lineup(f: &mut Frame, area: Rect, app: &App, view: &ReconciledView) {
    let lineup = &app.state.lineup;
    let side = lineup.side;
    let team = view.team(side);
    let draft = lineup.draft();

    let block = default_border(team_color(side)).title(format!(" Lineup: {} ", team.name));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [body, key_legend] = Layout::vertical([Constraint::Fill(1), Constraint::Length(2)]).areas(inner);
    f.render_widget(
        Paragraph::new(
            "Tab=panel  j/k=move  s/b=add to XI/bench  x=remove  m=swap squad  c=captain  f=formation  t=team\n\
             Enter=submit  g=goal  y/r=card  o=sub (starter off, sub on)  v=vote player of the match",
        )
        .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    if !draft.loaded {
        let msg = if app.state.live.team_id(side).is_some() {
            "Loading squad..."
        } else {
            "Squad unavailable until the fixture loads"
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            body,
        );
        return;
    }

    let [pool, squads, pitch] = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Percentage(40),
    ])
    .areas(body);
    let [xi, bench] = Layout::vertical([Constraint::Length(13), Constraint::Fill(1)]).areas(squads);

    draw_player_panel(f, pool, app, LineupPanel::Available, "Available".to_string());
    draw_player_panel(
        f,
        xi,
        app,
        LineupPanel::StartingXi,
        format!("Starting XI {}/11", draft.roster.starting_xi.len()),
    );
    draw_player_panel(
        f,
        bench,
        app,
        LineupPanel::Substitutes,
        format!("Substitutes {}/7", draft.roster.substitutes.len()),
    );

    let result = draft.roster.validate(&draft.formation_code);
    let (status, color) = match (result.formation, result.is_valid) {
        (None, _) => ("No formation selected".to_string(), Color::DarkGray),
        (Some(formation), true) => (format!("{} complete", formation.code), Color::Green),
        (Some(formation), false) => (format!("{} incomplete", formation.code), Color::Yellow),
    };
    let captain = draft
        .roster
        .captain()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "none".to_string());

    let pitch_block = default_border(color).title(format!(" {status} "));
    let pitch_inner = pitch_block.inner(pitch);
    f.render_widget(pitch_block, pitch);
    let [summary, field] = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(pitch_inner);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(result.summary(), Style::default().fg(color))),
            Line::from(format!("Captain: {captain}")),
        ]),
        summary,
    );
    f.render_widget(PitchView { players: &draft.roster.starting_xi }, field);
}

fn draw_player_panel(f: &mut Frame, area: Rect, app: &App, panel: LineupPanel, title: String) {
    let lineup = &app.state.lineup;
    let focused = lineup.focus == panel;
    let block = default_border(if focused { Color::White } else { Color::DarkGray }).title(format!(" {title} "));

    let items: Vec<ListItem> = lineup
        .panel_players(panel)
        .iter()
        .map(|p| {
            let group = p.group().map(|g| g.short()).unwrap_or("???");
            let captain = if p.is_captain { " (C)" } else { "" };
            ListItem::new(format!("{:>2} {:<3} {}{captain}", p.jersey_number, group, p.name))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        })
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(lineup.cursor(panel)));
    f.render_stateful_widget(list, area, &mut state);
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let rows = [
        ("1 2 3 4", "Live, Stats, Timeline, Lineup"),
        ("? / Esc", "open / close help"),
        ("R", "refresh fixture now"),
        ("F", "toggle full screen"),
        ("\"", "toggle log pane"),
        ("q", "quit"),
        ("", ""),
        ("Live c / C", "cheer for home / away"),
        ("Live s", "advance match status"),
        ("Live h H a A", "home +1 / -1, away +1 / -1"),
        ("Timeline d", "delete selected entry"),
        ("Lineup Tab", "cycle panel: pool, XI, bench"),
        ("Lineup s b", "add selected pool player to XI / bench"),
        ("Lineup x m c", "remove, swap squad, make captain"),
        ("Lineup f t", "cycle formation, switch team"),
        ("Lineup Enter", "submit lineup"),
        ("Lineup g o v", "record goal, substitution, vote POTM"),
        ("Lineup y r", "book starter: yellow / red card"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:<14}"), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .output_separator(' ')
        .output_target(false)
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Green));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(24), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cheer_share_splits_evenly_when_empty() {
        assert_eq!(cheer_hundredths(&CheerMeter::default()), 5_000);
        assert_eq!(cheer_hundredths(&CheerMeter { home: 1, away: 2 }), 3_333);
        assert_eq!(cheer_hundredths(&CheerMeter { home: 3, away: 0 }), 10_000);
    }
}

use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

const BAR_CHAR: &str = "█";

/// Two-colour tug-of-war bar: home share on the left, away on the right.
/// Used for possession and the cheer meter.
pub struct SplitBar<'a> {
    pub title: &'a str,
    pub left_label: String,
    pub right_label: String,
    /// Left share in hundredths of a percent, 0..=10_000.
    pub left_hundredths: u16,
    pub left_color: Color,
    pub right_color: Color,
}

impl Widget for SplitBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let label_style = Style::default().fg(Color::Gray);
        buf.set_stringn(area.x, area.y, &self.left_label, area.width as usize, label_style);

        let title_w = self.title.chars().count() as u16;
        if title_w < area.width {
            let x = area.x + (area.width - title_w) / 2;
            buf.set_string(x, area.y, self.title, label_style.add_modifier(Modifier::BOLD));
        }

        let right_w = self.right_label.chars().count() as u16;
        if right_w < area.width {
            buf.set_string(area.x + area.width - right_w, area.y, &self.right_label, label_style);
        }

        if area.height < 2 {
            return;
        }
        let y = area.y + 1;
        let left_cells = split_cells(area.width, self.left_hundredths);
        for dx in 0..area.width {
            let color = if dx < left_cells { self.left_color } else { self.right_color };
            buf.set_string(area.x + dx, y, BAR_CHAR, Style::default().fg(color));
        }
    }
}

/// Number of cells out of `width` that belong to the left side, rounded.
pub fn split_cells(width: u16, left_hundredths: u16) -> u16 {
    let share = u32::from(left_hundredths.min(10_000));
    ((u32::from(width) * share + 5_000) / 10_000) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_cells_rounds_and_clamps() {
        assert_eq!(split_cells(40, 5_000), 20);
        assert_eq!(split_cells(10, 6_667), 7);
        assert_eq!(split_cells(10, 0), 0);
        assert_eq!(split_cells(10, 12_000), 10);
    }

    #[test]
    fn renders_labels_and_bar() {
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        SplitBar {
            title: "POSS",
            left_label: "60%".into(),
            right_label: "40%".into(),
            left_hundredths: 6_000,
            left_color: Color::Blue,
            right_color: Color::Red,
        }
        .render(area, &mut buf);

        assert_eq!(buf[(0, 0)].symbol(), "6");
        assert_eq!(buf[(19, 0)].symbol(), "%");
        assert_eq!(buf[(11, 1)].fg, Color::Blue);
        assert_eq!(buf[(12, 1)].fg, Color::Red);
    }
}

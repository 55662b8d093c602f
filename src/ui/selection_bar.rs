use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::format::{format_sats, truncate_unicode};
use crate::ui::theme::Theme;

#[derive(Debug, Clone)]
pub struct SelectionInfo {
    pub label: String,
    pub sats: u64,
}

pub fn render(frame: &mut Frame, area: Rect, selected: Option<SelectionInfo>, theme: &Theme) {
    let style = Style::default()
        .bg(theme.statusbar_bg)
        .fg(theme.text_primary);
    let width = area.width as usize;
    let line = match selected {
        Some(selection) => format_selection_line(selection, width),
        None => " ".repeat(width),
    };

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(line, style))).style(style),
        area,
    );
}

fn format_selection_line(selection: SelectionInfo, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    let mut sats = format!("{} sats", format_sats(selection.sats));
    if sats.width() > width {
        sats = truncate_unicode(&sats, width);
        let pad = width.saturating_sub(sats.width());
        return format!("{}{}", " ".repeat(pad), sats);
    }

    let sats_width = sats.width();
    let left_capacity = width.saturating_sub(sats_width + 1);
    let label = truncate_unicode(&selection.label, left_capacity);
    let label_width = label.width();
    let gap = width.saturating_sub(label_width + sats_width);
    format!("{label}{}{sats}", " ".repeat(gap))
}

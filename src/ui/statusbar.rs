use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{InputMode, StatusLevel, StatusMessage};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    input_mode: InputMode,
    input_buffer: &str,
    status_message: Option<&StatusMessage>,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    // Status message takes priority
    if let Some(msg) = status_message {
        let color = match msg.level {
            StatusLevel::Info => theme.status_ok,
            StatusLevel::Error => theme.status_err,
        };
        let line = Line::from(Span::styled(
            format!(" {}", msg.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let line = match input_mode {
        InputMode::Edit => {
            let mut spans = vec![
                Span::styled(
                    " + ",
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {input_buffer}"),
                    Style::default().fg(theme.pill_desc_fg),
                ),
                Span::styled("\u{2588}", Style::default().fg(theme.pill_key_bg)),
            ];
            spans.extend(pill_spans("Esc", "Cancel", theme));
            spans.extend(pill_spans("Enter", "Add", theme));
            Line::from(spans)
        }
        InputMode::Normal | InputMode::Help => {
            let mut spans = Vec::new();
            spans.extend(pill_spans("q", "Quit", theme));
            spans.extend(pill_spans("a", "Add", theme));
            spans.extend(pill_spans("x", "Delete", theme));
            spans.extend(pill_spans("C", "Clear", theme));
            spans.extend(pill_spans("d", "Detail", theme));
            spans.extend(pill_spans("c", "Color", theme));
            spans.extend(pill_spans("t", "Theme", theme));
            spans.extend(pill_spans("s", "Sort", theme));
            spans.extend(pill_spans("r", "Price", theme));
            spans.extend(pill_spans("?", "Help", theme));
            spans.extend(pill_spans("\u{2190}\u{2193}\u{2191}\u{2192}", "Nav", theme));
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).style(bg_style), area);
}

fn pill_spans<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::amount::AmountEntry;
use crate::format::{format_btc_fixed, format_fiat, format_sats};
use crate::price::Currency;
use crate::ui::theme::{BorderStyle, Theme};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    entry: &AmountEntry,
    share: f64,
    quote: Option<f64>,
    currency: Currency,
    theme: &Theme,
    border_style: BorderStyle,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_style.border_type())
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Amount Detail ",
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));

    let fiat_line = match quote {
        Some(quote) => format_fiat(entry.btc() * quote, currency.symbol()),
        None => format!("{} unavailable", currency.label()),
    };
    let sats_display = if entry.sats >= 0 {
        format_sats(entry.sats as u64)
    } else {
        format!("-{}", format_sats(entry.sats.unsigned_abs()))
    };

    let lines = vec![
        detail_line("Amount", entry.label.clone(), theme),
        detail_line(
            "BTC",
            format!("{} BTC", format_btc_fixed(entry.sats.max(0) as u64)),
            theme,
        ),
        detail_line("Sats", format!("{sats_display} sats"), theme),
        detail_line("Share", format!("{:.1}%", share * 100.0), theme),
        detail_line("Value", fiat_line, theme),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn detail_line(label: &str, value: String, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {label:<7}"),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(theme.text_primary)),
    ])
}

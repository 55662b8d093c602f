use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Sparkline};

use crate::app::PriceState;
use crate::format::{format_btc_fixed, format_fiat, format_sats};
use crate::ui::theme::{BorderStyle, ColorMode, Theme};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    entry_count: usize,
    total_sats: u64,
    color_mode: ColorMode,
    sort_label: &str,
    theme: &Theme,
    border_style: BorderStyle,
    price: &PriceState,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_branding(
        frame,
        chunks[0],
        entry_count,
        color_mode,
        sort_label,
        theme,
        border_style,
    );
    render_total(frame, chunks[1], total_sats, theme, border_style);
    render_price(frame, chunks[2], price, theme, border_style);
}

fn render_branding(
    frame: &mut Frame,
    area: Rect,
    entry_count: usize,
    color_mode: ColorMode,
    sort_label: &str,
    theme: &Theme,
    border_style: BorderStyle,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_style.border_type())
        .border_style(Style::default().fg(theme.overlay_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let spans = vec![
        Span::styled(
            " satmap ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Amounts: {entry_count}"),
            Style::default().fg(theme.text_secondary),
        ),
        Span::raw("  "),
        Span::styled(
            color_mode.label().to_string(),
            Style::default().fg(theme.text_secondary),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Sort: {sort_label}"),
            Style::default().fg(theme.text_secondary),
        ),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_total(
    frame: &mut Frame,
    area: Rect,
    total_sats: u64,
    theme: &Theme,
    border_style: BorderStyle,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_style.border_type())
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Total ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(
            format!("{} BTC", format_btc_fixed(total_sats)),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} sats", format_sats(total_sats)),
            Style::default().fg(theme.text_secondary),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_price(
    frame: &mut Frame,
    area: Rect,
    price: &PriceState,
    theme: &Theme,
    border_style: BorderStyle,
) {
    let title = match price.quote {
        Some(quote) => format!(" BTC {} ", format_fiat(quote, price.currency.symbol())),
        None => format!(" BTC {} loading ", price.currency.label()),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_style.border_type())
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let history: Vec<u64> = price.history.iter().copied().collect();
    let sparkline = Sparkline::default()
        .block(block)
        .data(&history)
        .style(Style::default().fg(theme.sparkline_color));

    frame.render_widget(sparkline, area);
}

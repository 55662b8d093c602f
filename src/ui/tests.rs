use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::app::{App, InputMode, PriceState};
use crate::config::Config;
use crate::price::Currency;
use crate::treemap::node::LayoutRect;
use crate::ui::theme::{
    BorderStyle, ColorMode, ColorSupport, ColoredTreemapRect, HeatOverrides, Theme,
};
use crate::ui::{detail_panel, header, selection_bar, statusbar, treemap_widget};

fn buffer_to_string(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            let cell = buf.cell((x, y)).unwrap();
            out.push_str(cell.symbol());
        }
        if y + 1 < area.height {
            out.push('\n');
        }
    }
    out
}

fn render_to_string<F>(width: u16, height: u16, draw: F) -> String
where
    F: FnOnce(&mut ratatui::Frame),
{
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    let buf = terminal.backend().buffer();
    buffer_to_string(buf)
}

fn make_theme() -> Theme {
    let heat = HeatOverrides {
        low: "#2d5a27".to_string(),
        mid: "#b5890a".to_string(),
        high: "#a12e2e".to_string(),
    };
    Theme::from_config("dark", &heat, ColorSupport::Truecolor)
}

fn make_colored_rect(id: u32, label: &str, value: u64, rect: LayoutRect) -> ColoredTreemapRect {
    ColoredTreemapRect {
        rect,
        id,
        label: label.to_string(),
        value,
        color: ratatui::style::Color::Rgb(120, 200, 140),
    }
}

#[test]
fn header_shows_total_count_and_price() {
    let mut price = PriceState::new(Currency::Eur);
    price.record(61_234.5);

    let output = render_to_string(120, 4, |frame| {
        header::render(
            frame,
            Rect::new(0, 0, 120, 4),
            4,
            56_300_000,
            ColorMode::BySize,
            "Value",
            &make_theme(),
            BorderStyle::Rounded,
            &price,
        );
    });

    assert!(output.contains("satmap"));
    assert!(output.contains("Amounts: 4"));
    assert!(output.contains("0.56300000 BTC"));
    assert!(output.contains("56,300,000 sats"));
    assert!(output.contains("\u{20AC}61,235.00") || output.contains("\u{20AC}61,234.50"));
    assert!(output.contains("Sort: Value"));
}

#[test]
fn header_without_quote_shows_loading() {
    let price = PriceState::new(Currency::Usd);

    let output = render_to_string(120, 4, |frame| {
        header::render(
            frame,
            Rect::new(0, 0, 120, 4),
            0,
            0,
            ColorMode::BySize,
            "Value",
            &make_theme(),
            BorderStyle::Rounded,
            &price,
        );
    });

    assert!(output.contains("USD loading"));
}

#[test]
fn statusbar_normal_mode_lists_key_pills() {
    let output = render_to_string(100, 1, |frame| {
        statusbar::render(
            frame,
            Rect::new(0, 0, 100, 1),
            InputMode::Normal,
            "",
            None,
            &make_theme(),
        );
    });

    for pill in ["Quit", "Add", "Delete", "Clear", "Help"] {
        assert!(output.contains(pill), "missing pill: {pill}\n{output}");
    }
}

#[test]
fn statusbar_edit_mode_shows_input_buffer() {
    let output = render_to_string(80, 1, |frame| {
        statusbar::render(
            frame,
            Rect::new(0, 0, 80, 1),
            InputMode::Edit,
            "0.25",
            None,
            &make_theme(),
        );
    });

    assert!(output.contains("0.25"));
    assert!(output.contains("Cancel"));
    assert!(output.contains("Add"));
}

#[test]
fn selection_bar_right_aligns_sats() {
    let output = render_to_string(40, 1, |frame| {
        selection_bar::render(
            frame,
            Rect::new(0, 0, 40, 1),
            Some(selection_bar::SelectionInfo {
                label: "0.42 BTC".to_string(),
                sats: 42_000_000,
            }),
            &make_theme(),
        );
    });

    assert!(output.starts_with("0.42 BTC"));
    assert!(output.trim_end().ends_with("42,000,000 sats"));
}

#[test]
fn treemap_widget_renders_labels_on_big_cells() {
    let rects = vec![
        make_colored_rect(0, "0.42 BTC", 42_000_000, LayoutRect::new(0.0, 0.0, 24.0, 8.0)),
        make_colored_rect(1, "0.12 BTC", 12_000_000, LayoutRect::new(24.0, 0.0, 16.0, 8.0)),
    ];

    let output = render_to_string(40, 8, |frame| {
        treemap_widget::render(
            frame,
            Rect::new(0, 0, 40, 8),
            &rects,
            0,
            10,
            3,
            BorderStyle::Rounded,
            &make_theme(),
        );
    });

    assert!(output.contains("0.42 BTC"));
    assert!(output.contains("42,000,000 sats"));
    assert!(output.contains("0.12 BTC"));
}

#[test]
fn treemap_widget_suppresses_labels_below_threshold() {
    let rects = vec![
        make_colored_rect(0, "0.42 BTC", 42_000_000, LayoutRect::new(0.0, 0.0, 34.0, 8.0)),
        make_colored_rect(1, "0.0001 BTC", 10_000, LayoutRect::new(34.0, 0.0, 6.0, 8.0)),
    ];

    let output = render_to_string(40, 8, |frame| {
        treemap_widget::render(
            frame,
            Rect::new(0, 0, 40, 8),
            &rects,
            0,
            10,
            3,
            BorderStyle::Rounded,
            &make_theme(),
        );
    });

    assert!(output.contains("0.42 BTC"));
    assert!(!output.contains("0.0001 BTC"));
}

#[test]
fn treemap_widget_empty_message() {
    let output = render_to_string(40, 6, |frame| {
        treemap_widget::render(
            frame,
            Rect::new(0, 0, 40, 6),
            &[],
            0,
            10,
            3,
            BorderStyle::Rounded,
            &make_theme(),
        );
    });

    assert!(output.contains("No amounts"));
}

#[test]
fn detail_panel_shows_conversions() {
    let entry = crate::amount::AmountEntry {
        id: 7,
        label: "0.12 BTC".to_string(),
        sats: 12_000_000,
    };

    let output = render_to_string(36, 8, |frame| {
        detail_panel::render(
            frame,
            Rect::new(0, 0, 36, 8),
            &entry,
            0.25,
            Some(50_000.0),
            Currency::Eur,
            &make_theme(),
            BorderStyle::Rounded,
        );
    });

    assert!(output.contains("Amount Detail"));
    assert!(output.contains("0.12 BTC"));
    assert!(output.contains("12,000,000 sats"));
    assert!(output.contains("25.0%"));
    assert!(output.contains("\u{20AC}6,000.00"));
}

#[test]
fn detail_panel_without_quote_reports_unavailable() {
    let entry = crate::amount::AmountEntry {
        id: 1,
        label: "1 BTC".to_string(),
        sats: 100_000_000,
    };

    let output = render_to_string(36, 8, |frame| {
        detail_panel::render(
            frame,
            Rect::new(0, 0, 36, 8),
            &entry,
            1.0,
            None,
            Currency::Eur,
            &make_theme(),
            BorderStyle::Rounded,
        );
    });

    assert!(output.contains("EUR unavailable"));
}

#[test]
fn full_draw_renders_all_chrome() {
    let mut app = App::new(Config::default());
    app.set_amounts(vec![12_000_000, 3_500_000, 800_000, 42_000_000]);

    let output = render_to_string(100, 30, |frame| {
        crate::ui::draw(frame, &mut app);
    });

    assert!(output.contains("satmap"));
    assert!(output.contains("0.42 BTC"));
    assert!(output.contains("Quit"));
    // Selection bar reflects the largest (first-selected) amount
    assert!(output.contains("42,000,000 sats"));
}

#[test]
fn full_draw_help_overlay_on_top() {
    let mut app = App::new(Config::default());
    app.set_amounts(vec![12_000_000]);
    app.dispatch(crate::action::Action::ToggleHelp);

    let output = render_to_string(100, 30, |frame| {
        crate::ui::draw(frame, &mut app);
    });

    assert!(output.contains("Keybinds"));
    assert!(output.contains("Cycle theme"));
}

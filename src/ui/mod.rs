pub mod detail_panel;
pub mod header;
pub mod help;
pub mod selection_bar;
pub mod statusbar;
pub mod theme;
pub mod treemap_widget;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;
use crate::ui::theme::colorize_rects;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let content_area = chunks[1];
    let total = app.total_sats();

    if app.show_detail_panel {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(36)])
            .split(content_area);

        let treemap_area = h_chunks[0];
        let detail_area = h_chunks[1];

        app.treemap_area = Some(treemap_area);
        app.compute_layout(treemap_area.width, treemap_area.height);

        let rects = app.display_rects();
        let colored = colorize_rects(
            &rects,
            total,
            app.color_mode,
            &app.theme,
            app.color_support,
        );
        treemap_widget::render(
            frame,
            treemap_area,
            &colored,
            app.selected_index,
            app.min_label_width,
            app.min_label_height,
            app.border_style,
            &app.theme,
        );

        if let Some(entry) = app.selected_entry() {
            detail_panel::render(
                frame,
                detail_area,
                entry,
                app.share_of(entry),
                app.price.quote,
                app.price.currency,
                &app.theme,
                app.border_style,
            );
        }
    } else {
        app.treemap_area = Some(content_area);
        app.compute_layout(content_area.width, content_area.height);
        let rects = app.display_rects();
        let colored = colorize_rects(
            &rects,
            total,
            app.color_mode,
            &app.theme,
            app.color_support,
        );
        treemap_widget::render(
            frame,
            content_area,
            &colored,
            app.selected_index,
            app.min_label_width,
            app.min_label_height,
            app.border_style,
            &app.theme,
        );
    }

    header::render(
        frame,
        chunks[0],
        app.entries.len(),
        total,
        app.color_mode,
        app.sort_mode.label(),
        &app.theme,
        app.border_style,
        &app.price,
    );
    statusbar::render(
        frame,
        chunks[3],
        app.input_mode,
        &app.input_buffer,
        app.status_message.as_ref(),
        &app.theme,
    );

    let selected = app.selected_entry().map(|e| selection_bar::SelectionInfo {
        label: e.label.clone(),
        sats: e.sats.max(0) as u64,
    });
    selection_bar::render(frame, chunks[2], selected, &app.theme);

    // Help overlay — rendered last to appear on top
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_entries(), &app.theme);
    }
}

#[cfg(test)]
mod tests;

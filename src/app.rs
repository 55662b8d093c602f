use std::collections::VecDeque;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::action::{Action, Direction};
use crate::amount::{self, AmountEntry};
use crate::config::{Config, parse_key};
use crate::format::format_btc;
use crate::price::{Currency, PriceResult};
use crate::treemap::algorithm;
use crate::treemap::node::{TreemapRect, WeightedItem};
use crate::ui::theme::{
    BorderStyle, ColorMode, ColorSupport, HeatOverrides, Theme, resolve_color_support,
};

const PRICE_HISTORY_LEN: usize = 60;
const STATUS_MESSAGE_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Edit,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    created: Instant,
}

impl StatusMessage {
    fn new(text: String, level: StatusLevel) -> Self {
        Self {
            text,
            level,
            created: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created.elapsed().as_secs() >= STATUS_MESSAGE_SECS
    }
}

/// Latest fiat quote plus a short history for the header sparkline.
#[derive(Debug)]
pub struct PriceState {
    pub quote: Option<f64>,
    pub currency: Currency,
    pub history: VecDeque<u64>,
    capacity: usize,
}

impl PriceState {
    pub fn new(currency: Currency) -> Self {
        Self {
            quote: None,
            currency,
            history: VecDeque::with_capacity(PRICE_HISTORY_LEN),
            capacity: PRICE_HISTORY_LEN,
        }
    }

    pub fn record(&mut self, quote: f64) {
        self.quote = Some(quote);
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(quote.round().max(0.0) as u64);
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub add: KeyCode,
    pub delete: KeyCode,
    pub clear: KeyCode,
    pub cycle_color: KeyCode,
    pub cycle_theme: KeyCode,
    pub toggle_detail: KeyCode,
    pub cycle_sort: KeyCode,
    pub refresh_price: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &crate::config::KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            add: parse_key(&kb.add).unwrap_or(KeyCode::Char('a')),
            delete: parse_key(&kb.delete).unwrap_or(KeyCode::Char('x')),
            clear: parse_key(&kb.clear).unwrap_or(KeyCode::Char('C')),
            cycle_color: parse_key(&kb.cycle_color).unwrap_or(KeyCode::Char('c')),
            cycle_theme: parse_key(&kb.cycle_theme).unwrap_or(KeyCode::Char('t')),
            toggle_detail: parse_key(&kb.toggle_detail).unwrap_or(KeyCode::Char('d')),
            cycle_sort: parse_key(&kb.cycle_sort).unwrap_or(KeyCode::Char('s')),
            refresh_price: parse_key(&kb.refresh_price).unwrap_or(KeyCode::Char('r')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.add), "Add amount"),
            (key_label(self.delete), "Delete selected amount"),
            (key_label(self.clear), "Clear all amounts"),
            (key_label(self.cycle_color), "Cycle color mode"),
            (key_label(self.cycle_theme), "Cycle theme"),
            (key_label(self.toggle_detail), "Toggle detail panel"),
            (key_label(self.cycle_sort), "Cycle sort mode"),
            (key_label(self.refresh_price), "Refresh price"),
            (key_label(self.help), "Toggle help"),
        ];
        entries.push(("↑↓←→".to_string(), "Navigate"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => "?".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Value,
    Label,
    Entry,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Value => SortMode::Label,
            SortMode::Label => SortMode::Entry,
            SortMode::Entry => SortMode::Value,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Value => "Value",
            SortMode::Label => "Label",
            SortMode::Entry => "Entry",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "label" => SortMode::Label,
            "entry" | "order" => SortMode::Entry,
            _ => SortMode::Value,
        }
    }
}

pub struct App {
    pub running: bool,
    pub entries: Vec<AmountEntry>,
    pub layout_rects: Vec<TreemapRect>,
    pub selected_index: usize,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub show_detail_panel: bool,
    pub color_mode: ColorMode,
    pub theme: Theme,
    pub color_support: ColorSupport,
    pub border_style: BorderStyle,
    pub status_message: Option<StatusMessage>,
    pub treemap_area: Option<Rect>,
    pub min_label_width: u16,
    pub min_label_height: u16,
    pub price: PriceState,
    pub price_refresh: Option<mpsc::UnboundedSender<()>>,
    pub sort_mode: SortMode,
    pub keybinds: ResolvedKeybinds,
    next_entry_id: u32,
    heat_overrides: HeatOverrides,
    prev_layout_rects: Vec<TreemapRect>,
    animation_frame: u8,
    anim_frames: u8,
    needs_relayout: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let color_support = resolve_color_support(&config.general.color_support);
        let heat_overrides = HeatOverrides::from_config(&config.colors);
        let mut color_mode = ColorMode::from_str_config(&config.general.default_color_mode);
        if color_support == ColorSupport::Mono {
            color_mode = ColorMode::Monochrome;
        }
        let theme = Theme::from_config(&config.colors.theme, &heat_overrides, color_support);
        let border_style = BorderStyle::from_config_str(&config.treemap.border_style);
        let currency = Currency::from_str_config(&config.general.currency);
        let sort_mode = SortMode::from_str_config(&config.general.default_sort);
        let keybinds = ResolvedKeybinds::from_config(&config.keybinds);

        App {
            running: true,
            entries: Vec::new(),
            layout_rects: Vec::new(),
            selected_index: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            show_detail_panel: config.general.show_detail_panel,
            color_mode,
            theme,
            color_support,
            border_style,
            status_message: None,
            treemap_area: None,
            min_label_width: config.treemap.min_label_width,
            min_label_height: config.treemap.min_label_height,
            price: PriceState::new(currency),
            price_refresh: None,
            sort_mode,
            keybinds,
            next_entry_id: 0,
            heat_overrides,
            prev_layout_rects: Vec::new(),
            animation_frame: 0,
            anim_frames: config.treemap.animation_frames,
            needs_relayout: true,
        }
    }

    fn alloc_entry(&mut self, sats: i64) -> AmountEntry {
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        AmountEntry {
            id,
            label: format!("{} BTC", format_btc(sats)),
            sats,
        }
    }

    /// Replaces the whole entry list, e.g. from a loaded amounts file.
    pub fn set_amounts(&mut self, sats: Vec<i64>) {
        self.entries.clear();
        for s in sats {
            let entry = self.alloc_entry(s);
            self.entries.push(entry);
        }
        self.selected_index = 0;
        self.needs_relayout = true;
    }

    /// Appends amounts (wallet import) and returns how many were added.
    pub fn append_amounts(&mut self, sats: &[i64]) -> usize {
        for &s in sats {
            let entry = self.alloc_entry(s);
            self.entries.push(entry);
        }
        self.needs_relayout = true;
        sats.len()
    }

    pub fn total_sats(&self) -> u64 {
        amount::total_sats(&self.entries)
    }

    fn weighted_items(&self) -> Vec<WeightedItem> {
        let mut items: Vec<WeightedItem> = self
            .entries
            .iter()
            .filter(|e| e.sats > 0)
            .map(|e| WeightedItem {
                id: e.id,
                label: e.label.clone(),
                value: e.sats as u64,
            })
            .collect();

        match self.sort_mode {
            SortMode::Value => items.sort_by(|a, b| b.value.cmp(&a.value)),
            SortMode::Label => {
                items.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
            }
            SortMode::Entry => items.sort_by(|a, b| a.id.cmp(&b.id)),
        }
        items
    }

    pub fn compute_layout(&mut self, width: u16, height: u16) {
        if !self.needs_relayout {
            return;
        }

        #[cfg(feature = "perf-tracing")]
        let _layout_span = tracing::debug_span!(
            "app.compute_layout",
            width = width,
            height = height,
            entries = self.entries.len()
        )
        .entered();

        let items = self.weighted_items();

        // Save old layout for animation
        if !self.layout_rects.is_empty() {
            self.prev_layout_rects = self.layout_rects.clone();
            self.animation_frame = 1;
        }

        self.layout_rects = algorithm::compute_layout(&items, width as f64, height as f64);

        if self.selected_index >= self.layout_rects.len() && !self.layout_rects.is_empty() {
            self.selected_index = 0;
        }
        self.needs_relayout = false;
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Edit => self.map_key_edit(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Arrow keys are hardwired (not configurable)
        if let KeyCode::Up = code {
            return Action::Navigate(Direction::Up);
        }
        if let KeyCode::Down = code {
            return Action::Navigate(Direction::Down);
        }
        if let KeyCode::Left = code {
            return Action::Navigate(Direction::Left);
        }
        if let KeyCode::Right = code {
            return Action::Navigate(Direction::Right);
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.add {
            return Action::EnterAddMode;
        }
        if code == kb.delete {
            return if self.selected_entry_id().is_some() {
                Action::DeleteSelected
            } else {
                Action::None
            };
        }
        if code == kb.clear {
            return Action::ClearAmounts;
        }
        if code == kb.cycle_color {
            return Action::CycleColorMode;
        }
        if code == kb.cycle_theme {
            return Action::CycleTheme;
        }
        if code == kb.toggle_detail {
            return Action::ToggleDetailPanel;
        }
        if code == kb.cycle_sort {
            return Action::CycleSortMode;
        }
        if code == kb.refresh_price {
            return Action::RefreshPrice;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }

        Action::None
    }

    fn map_key_edit(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::CancelInput,
            KeyCode::Enter => Action::CommitInput,
            KeyCode::Backspace => {
                let mut text = self.input_buffer.clone();
                text.pop();
                Action::UpdateInput(text)
            }
            KeyCode::Char(c) => {
                let mut text = self.input_buffer.clone();
                text.push(c);
                Action::UpdateInput(text)
            }
            _ => Action::None,
        }
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(dir) => self.navigate(dir),
            Action::EnterAddMode => {
                self.input_buffer.clear();
                self.input_mode = InputMode::Edit;
            }
            Action::CancelInput => {
                self.input_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            Action::UpdateInput(text) => {
                self.input_buffer = text;
            }
            Action::CommitInput => self.commit_input(),
            Action::DeleteSelected => self.delete_selected(),
            Action::ClearAmounts => {
                let n = self.entries.len();
                self.entries.clear();
                self.layout_rects.clear();
                self.prev_layout_rects.clear();
                self.animation_frame = 0;
                self.selected_index = 0;
                self.needs_relayout = true;
                self.set_status(format!("Cleared {n} amounts"), StatusLevel::Info);
            }
            Action::CycleColorMode => {
                if self.color_support == ColorSupport::Mono {
                    self.color_mode = ColorMode::Monochrome;
                } else {
                    self.color_mode = self.color_mode.next();
                }
            }
            Action::CycleTheme => {
                self.theme = self.theme.next(&self.heat_overrides, self.color_support);
            }
            Action::ToggleDetailPanel => {
                self.show_detail_panel = !self.show_detail_panel;
                self.needs_relayout = true;
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::CycleSortMode => {
                self.sort_mode = self.sort_mode.next();
                self.needs_relayout = true;
            }
            Action::RefreshPrice => {
                let sent = self
                    .price_refresh
                    .as_ref()
                    .is_some_and(|tx| tx.send(()).is_ok());
                if sent {
                    self.set_status("Refreshing price".to_string(), StatusLevel::Info);
                } else {
                    self.set_status("Price fetching is disabled".to_string(), StatusLevel::Error);
                }
            }
            Action::SelectAt(col, row) => {
                self.select_at(col, row);
            }
            Action::None => {}
        }
    }

    fn commit_input(&mut self) {
        let text = self.input_buffer.trim().to_string();
        if text.is_empty() {
            self.input_buffer.clear();
            self.input_mode = InputMode::Normal;
            return;
        }

        match amount::parse_amounts(&text) {
            Ok(parsed) => {
                let mut last_label = String::new();
                for e in &parsed {
                    let entry = self.alloc_entry(e.sats);
                    last_label = entry.label.clone();
                    self.entries.push(entry);
                }
                self.input_buffer.clear();
                self.input_mode = InputMode::Normal;
                self.needs_relayout = true;
                self.set_status(format!("Added {last_label}"), StatusLevel::Info);
            }
            Err(err) => {
                // Stay in edit mode so the input can be corrected
                self.set_status(format!("Invalid amount: {err}"), StatusLevel::Error);
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_entry_id() else {
            return;
        };
        let Some(pos) = self.entries.iter().position(|e| e.id == id) else {
            return;
        };
        let removed = self.entries.remove(pos);
        self.selected_index = 0;
        self.needs_relayout = true;
        self.set_status(format!("Removed {}", removed.label), StatusLevel::Info);
    }

    fn navigate(&mut self, direction: Direction) {
        if self.layout_rects.is_empty() {
            return;
        }

        let current = &self.layout_rects[self.selected_index].rect;
        let cx = current.x + current.width / 2.0;
        let cy = current.y + current.height / 2.0;

        let mut best_index = self.selected_index;
        let mut best_dist = f64::MAX;

        for (i, r) in self.layout_rects.iter().enumerate() {
            if i == self.selected_index {
                continue;
            }
            let rx = r.rect.x + r.rect.width / 2.0;
            let ry = r.rect.y + r.rect.height / 2.0;
            let dx = rx - cx;
            let dy = ry - cy;

            let in_direction = match direction {
                Direction::Up => dy < -0.1,
                Direction::Down => dy > 0.1,
                Direction::Left => dx < -0.1,
                Direction::Right => dx > 0.1,
            };
            if !in_direction {
                continue;
            }

            let dist = match direction {
                Direction::Up | Direction::Down => dy.abs() + dx.abs() * 0.5,
                Direction::Left | Direction::Right => dx.abs() + dy.abs() * 0.5,
            };
            if dist < best_dist {
                best_dist = dist;
                best_index = i;
            }
        }
        self.selected_index = best_index;
    }

    fn select_at(&mut self, col: u16, row: u16) {
        let area = match self.treemap_area {
            Some(a) => a,
            None => return,
        };

        if col < area.x || col >= area.x + area.width || row < area.y || row >= area.y + area.height
        {
            return;
        }

        let local_col = (col - area.x) as f64;
        let local_row = (row - area.y) as f64;

        for (i, r) in self.layout_rects.iter().enumerate() {
            if local_col >= r.rect.x
                && local_col < r.rect.x + r.rect.width
                && local_row >= r.rect.y
                && local_row < r.rect.y + r.rect.height
            {
                self.selected_index = i;
                return;
            }
        }
    }

    pub fn selected_entry_id(&self) -> Option<u32> {
        self.layout_rects.get(self.selected_index).map(|r| r.id)
    }

    pub fn selected_entry(&self) -> Option<&AmountEntry> {
        self.selected_entry_id()
            .and_then(|id| self.entries.iter().find(|e| e.id == id))
    }

    /// Share of the laid-out total held by one entry, in `0.0..=1.0`.
    pub fn share_of(&self, entry: &AmountEntry) -> f64 {
        let total = self.total_sats();
        if total == 0 || entry.sats <= 0 {
            return 0.0;
        }
        entry.sats as f64 / total as f64
    }

    pub fn apply_price(&mut self, result: PriceResult) {
        match result {
            PriceResult::Updated(quote) => self.price.record(quote),
            PriceResult::Failed(msg) => {
                self.set_status(format!("Price fetch failed: {msg}"), StatusLevel::Error);
            }
        }
    }

    fn set_status(&mut self, text: String, level: StatusLevel) {
        self.status_message = Some(StatusMessage::new(text, level));
    }

    pub fn expire_status(&mut self) {
        if self
            .status_message
            .as_ref()
            .is_some_and(StatusMessage::is_expired)
        {
            self.status_message = None;
        }
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }

    pub fn on_resize(&mut self) {
        self.needs_relayout = true;
    }

    pub fn is_animating(&self) -> bool {
        self.animation_frame > 0 && self.animation_frame <= self.anim_frames
    }

    pub fn tick_animation(&mut self) {
        if self.is_animating() {
            self.animation_frame += 1;
            if self.animation_frame > self.anim_frames {
                self.animation_frame = 0;
                self.prev_layout_rects.clear();
            }
        }
    }

    pub fn display_rects(&self) -> Vec<TreemapRect> {
        if !self.is_animating() || self.prev_layout_rects.is_empty() {
            return self.layout_rects.clone();
        }

        let t = self.animation_frame as f64 / self.anim_frames as f64;

        self.layout_rects
            .iter()
            .map(|new_rect| {
                // Find matching old rect by entry id
                let old = self
                    .prev_layout_rects
                    .iter()
                    .find(|old| old.id == new_rect.id);

                match old {
                    Some(old_rect) => TreemapRect {
                        rect: old_rect.rect.lerp(&new_rect.rect, t),
                        id: new_rect.id,
                        label: new_rect.label.clone(),
                        value: new_rect.value,
                    },
                    None => new_rect.clone(), // New rect, no transition
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_app(sats: Vec<i64>, sort_mode: SortMode) -> App {
        let mut app = App::new(Config::default());
        app.sort_mode = sort_mode;
        app.set_amounts(sats);
        app.compute_layout(100, 50);
        app
    }

    #[test]
    fn sort_mode_cycles_through_all_variants() {
        let mode = SortMode::Value;
        assert_eq!(mode.next(), SortMode::Label);
        assert_eq!(mode.next().next(), SortMode::Entry);
        assert_eq!(mode.next().next().next(), SortMode::Value);
    }

    #[test]
    fn value_sort_orders_descending() {
        let app = make_test_app(vec![800_000, 42_000_000, 3_500_000], SortMode::Value);
        let labels: Vec<&str> = app.layout_rects.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["0.42 BTC", "0.035 BTC", "0.008 BTC"]);
    }

    #[test]
    fn entry_sort_preserves_insertion_order() {
        let app = make_test_app(vec![800_000, 42_000_000, 3_500_000], SortMode::Entry);
        let ids: Vec<u32> = app.layout_rects.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn negative_and_zero_amounts_stay_out_of_the_layout() {
        let app = make_test_app(vec![100_000, -50_000, 0, 25_000], SortMode::Value);
        assert_eq!(app.entries.len(), 4);
        assert_eq!(app.layout_rects.len(), 2);
        assert_eq!(app.total_sats(), 125_000);
    }

    #[test]
    fn dispatch_cycle_sort_advances_mode() {
        let mut app = make_test_app(vec![100_000], SortMode::Value);

        assert_eq!(app.sort_mode, SortMode::Value);
        app.dispatch(Action::CycleSortMode);
        assert_eq!(app.sort_mode, SortMode::Label);
        app.dispatch(Action::CycleSortMode);
        assert_eq!(app.sort_mode, SortMode::Entry);
        app.dispatch(Action::CycleSortMode);
        assert_eq!(app.sort_mode, SortMode::Value);
    }

    #[test]
    fn default_keybinds_map_to_actions() {
        let app = make_test_app(vec![100_000], SortMode::Value);

        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::Quit);

        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::EnterAddMode);

        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::CycleSortMode);

        let key = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::ToggleHelp);

        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::DeleteSelected);

        // Ctrl+C always quits
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.map_key(key), Action::Quit);

        // Arrow keys stay hardwired
        let key = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::Navigate(Direction::Up));
    }

    #[test]
    fn delete_without_selection_is_a_no_op() {
        let app = make_test_app(vec![], SortMode::Value);
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::None);
    }

    #[test]
    fn custom_keybind_remap_works() {
        let mut app = make_test_app(vec![100_000], SortMode::Value);

        // Remap quit to 'Z'
        app.keybinds.quit = KeyCode::Char('Z');

        let key = KeyEvent::new(KeyCode::Char('Z'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::Quit);

        // 'q' should now do nothing
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::None);
    }

    #[test]
    fn help_mode_blocks_other_keys() {
        let mut app = make_test_app(vec![100_000], SortMode::Value);

        app.dispatch(Action::ToggleHelp);
        assert_eq!(app.input_mode, InputMode::Help);
        assert!(app.show_help());

        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::None);

        // But help key dismisses
        let key = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::ToggleHelp);

        // Esc also dismisses
        let key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::ToggleHelp);

        // Ctrl+C still works (safety)
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.map_key(key), Action::Quit);

        app.dispatch(Action::ToggleHelp);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn edit_mode_adds_an_amount() {
        let mut app = make_test_app(vec![12_000_000], SortMode::Value);

        app.dispatch(Action::EnterAddMode);
        assert_eq!(app.input_mode, InputMode::Edit);

        for c in "0.25".chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            let action = app.map_key(key);
            app.dispatch(action);
        }
        assert_eq!(app.input_buffer, "0.25");

        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.map_key(key), Action::CommitInput);
        app.dispatch(Action::CommitInput);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.entries.len(), 2);
        assert_eq!(app.entries[1].sats, 25_000_000);
        assert_eq!(app.entries[1].label, "0.25 BTC");
        let status = app.status_message.expect("expected a status message");
        assert_eq!(status.level, StatusLevel::Info);
        assert!(status.text.contains("0.25 BTC"));
    }

    #[test]
    fn invalid_input_keeps_edit_mode_and_reports() {
        let mut app = make_test_app(vec![], SortMode::Value);

        app.dispatch(Action::EnterAddMode);
        app.dispatch(Action::UpdateInput("nonsense".to_string()));
        app.dispatch(Action::CommitInput);

        assert_eq!(app.input_mode, InputMode::Edit);
        assert!(app.entries.is_empty());
        let status = app.status_message.expect("expected a status message");
        assert_eq!(status.level, StatusLevel::Error);
    }

    #[test]
    fn backspace_edits_the_buffer() {
        let mut app = make_test_app(vec![], SortMode::Value);
        app.dispatch(Action::EnterAddMode);
        app.dispatch(Action::UpdateInput("0.15".to_string()));

        let key = KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE);
        let action = app.map_key(key);
        assert_eq!(action, Action::UpdateInput("0.1".to_string()));
    }

    #[test]
    fn delete_selected_removes_the_right_entry() {
        let mut app = make_test_app(vec![800_000, 42_000_000], SortMode::Value);

        // Value sort puts 0.42 BTC first; selection starts at index 0
        assert_eq!(app.selected_entry().unwrap().sats, 42_000_000);

        app.dispatch(Action::DeleteSelected);
        assert_eq!(app.entries.len(), 1);
        assert_eq!(app.entries[0].sats, 800_000);

        app.compute_layout(100, 50);
        assert_eq!(app.layout_rects.len(), 1);
    }

    #[test]
    fn clear_amounts_empties_everything() {
        let mut app = make_test_app(vec![1_000, 2_000, 3_000], SortMode::Value);
        app.dispatch(Action::ClearAmounts);
        assert!(app.entries.is_empty());
        assert!(app.layout_rects.is_empty());
        assert_eq!(app.total_sats(), 0);
    }

    #[test]
    fn zero_sized_terminal_does_not_crash_layout() {
        let mut app = make_test_app(vec![100_000, 200_000], SortMode::Value);
        app.on_resize();
        app.compute_layout(0, 0);
        assert_eq!(app.layout_rects.len(), 2);
        for r in &app.layout_rects {
            assert!(r.rect.width >= 1.0);
            assert!(r.rect.height >= 1.0);
        }
    }

    #[test]
    fn relayout_after_resize_starts_animation() {
        let mut app = make_test_app(vec![100_000, 200_000], SortMode::Value);
        assert!(!app.is_animating());

        app.on_resize();
        app.compute_layout(80, 30);
        assert!(app.is_animating());

        for _ in 0..app.anim_frames {
            app.tick_animation();
        }
        assert!(!app.is_animating());
    }

    #[test]
    fn price_history_is_bounded() {
        let mut state = PriceState::new(Currency::Eur);
        for i in 0..(PRICE_HISTORY_LEN + 10) {
            state.record(1000.0 + i as f64);
        }
        assert_eq!(state.history.len(), PRICE_HISTORY_LEN);
        assert_eq!(state.quote, Some(1000.0 + (PRICE_HISTORY_LEN + 9) as f64));
    }

    #[test]
    fn price_failure_surfaces_in_statusbar() {
        let mut app = make_test_app(vec![], SortMode::Value);
        app.apply_price(PriceResult::Failed("timeout".to_string()));
        let status = app.status_message.expect("expected a status message");
        assert_eq!(status.level, StatusLevel::Error);
        assert!(status.text.contains("timeout"));
    }

    #[test]
    fn refresh_without_price_task_reports_disabled() {
        let mut app = make_test_app(vec![], SortMode::Value);
        app.dispatch(Action::RefreshPrice);
        let status = app.status_message.expect("expected a status message");
        assert_eq!(status.level, StatusLevel::Error);
    }

    #[test]
    fn share_of_reflects_positive_total() {
        let app = make_test_app(vec![75_000, 25_000, -10_000], SortMode::Value);
        let top = app.selected_entry().unwrap();
        assert!((app.share_of(top) - 0.75).abs() < 1e-9);
    }
}

use std::hash::{Hash, Hasher};

use ratatui::style::Color;
use ratatui::widgets::BorderType;

use crate::config::ColorsConfig;
use crate::treemap::node::{LayoutRect, TreemapRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    BySize,
    ByLabel,
    Monochrome,
}

impl ColorMode {
    pub fn next(self) -> Self {
        match self {
            ColorMode::BySize => ColorMode::ByLabel,
            ColorMode::ByLabel => ColorMode::Monochrome,
            ColorMode::Monochrome => ColorMode::BySize,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorMode::BySize => "Size",
            ColorMode::ByLabel => "Label",
            ColorMode::Monochrome => "Mono",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "label" | "name" => ColorMode::ByLabel,
            "mono" | "monochrome" => ColorMode::Monochrome,
            _ => ColorMode::BySize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    Auto,
    Truecolor,
    Color256,
    Mono,
}

impl ColorSupport {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "truecolor" | "24bit" => ColorSupport::Truecolor,
            "256" | "256color" => ColorSupport::Color256,
            "mono" | "monochrome" => ColorSupport::Mono,
            _ => ColorSupport::Auto,
        }
    }
}

pub fn detect_color_support() -> ColorSupport {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorSupport::Truecolor;
    }
    ColorSupport::Color256
}

pub fn resolve_color_support(config: &str) -> ColorSupport {
    let parsed = ColorSupport::from_config_str(config);
    if parsed == ColorSupport::Auto {
        detect_color_support()
    } else {
        parsed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Rounded,
    Thin,
}

impl BorderStyle {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "thin" => BorderStyle::Thin,
            _ => BorderStyle::Rounded,
        }
    }

    pub fn border_type(self) -> BorderType {
        match self {
            BorderStyle::Rounded => BorderType::Rounded,
            BorderStyle::Thin => BorderType::Plain,
        }
    }

    /// Corner glyphs in top-left, top-right, bottom-left, bottom-right order.
    pub fn corners(self) -> [char; 4] {
        match self {
            BorderStyle::Rounded => ['\u{256D}', '\u{256E}', '\u{2570}', '\u{256F}'],
            BorderStyle::Thin => ['\u{250C}', '\u{2510}', '\u{2514}', '\u{2518}'],
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeatOverrides {
    pub low: String,
    pub mid: String,
    pub high: String,
}

impl HeatOverrides {
    pub fn from_config(colors: &ColorsConfig) -> Self {
        Self {
            low: colors.heat_low.clone(),
            mid: colors.heat_mid.clone(),
            high: colors.heat_high.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub selection_border: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub sparkline_color: Color,
    pub heat_colors: [Color; 5],
    pub hash_palette: [Color; 8],
    pub mono_base: u8,
    pub mono_range: u8,
}

impl Theme {
    pub fn from_config(theme_name: &str, heat: &HeatOverrides, support: ColorSupport) -> Self {
        let mut theme = match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "colorblind" => Self::colorblind(),
            "vivid" => Self::vivid(),
            _ => Self::dark(),
        };

        if support == ColorSupport::Mono {
            theme = Self::mono();
        }

        theme.apply_heat_overrides(heat);
        theme.apply_color_support(support);
        theme
    }

    pub fn next(&self, heat: &HeatOverrides, support: ColorSupport) -> Self {
        if support == ColorSupport::Mono {
            return Self::mono();
        }
        let next_name = match self.name {
            "dark" => "vivid",
            "vivid" => "light",
            "light" => "colorblind",
            _ => "dark",
        };
        Theme::from_config(next_name, heat, support)
    }

    fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Rgb(247, 147, 26),
            header_accent_fg: Color::Rgb(30, 30, 46),
            selection_border: Color::Rgb(249, 226, 175),
            status_ok: Color::Rgb(166, 227, 161),
            status_err: Color::Rgb(243, 139, 168),
            statusbar_bg: Color::Rgb(24, 24, 37),
            overlay_border: Color::Rgb(108, 112, 134),
            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(147, 153, 178),
            accent: Color::Rgb(203, 166, 247),
            pill_key_bg: Color::Rgb(69, 71, 90),
            pill_key_fg: Color::Rgb(245, 224, 220),
            pill_desc_fg: Color::Rgb(166, 173, 200),
            surface_bg: Color::Rgb(30, 30, 46),
            sparkline_color: Color::Rgb(247, 147, 26),
            heat_colors: [
                Color::Rgb(45, 90, 39),
                Color::Rgb(87, 131, 60),
                Color::Rgb(181, 137, 10),
                Color::Rgb(193, 88, 42),
                Color::Rgb(161, 46, 46),
            ],
            hash_palette: [
                Color::Rgb(137, 180, 250),
                Color::Rgb(166, 227, 161),
                Color::Rgb(250, 179, 135),
                Color::Rgb(203, 166, 247),
                Color::Rgb(148, 226, 213),
                Color::Rgb(243, 139, 168),
                Color::Rgb(249, 226, 175),
                Color::Rgb(116, 199, 236),
            ],
            mono_base: 236,
            mono_range: 16,
        }
    }

    fn vivid() -> Self {
        Theme {
            name: "vivid",
            header_accent_bg: Color::Rgb(249, 115, 22),
            header_accent_fg: Color::Rgb(15, 15, 20),
            selection_border: Color::Rgb(253, 224, 71),
            status_ok: Color::Rgb(34, 197, 94),
            status_err: Color::Rgb(239, 68, 68),
            statusbar_bg: Color::Rgb(17, 17, 27),
            overlay_border: Color::Rgb(113, 113, 122),
            text_primary: Color::Rgb(244, 244, 245),
            text_secondary: Color::Rgb(161, 161, 170),
            accent: Color::Rgb(168, 85, 247),
            pill_key_bg: Color::Rgb(63, 63, 70),
            pill_key_fg: Color::Rgb(250, 250, 250),
            pill_desc_fg: Color::Rgb(212, 212, 216),
            surface_bg: Color::Rgb(24, 24, 27),
            sparkline_color: Color::Rgb(249, 115, 22),
            heat_colors: [
                Color::Rgb(21, 128, 61),
                Color::Rgb(101, 163, 13),
                Color::Rgb(234, 179, 8),
                Color::Rgb(249, 115, 22),
                Color::Rgb(220, 38, 38),
            ],
            hash_palette: [
                Color::Rgb(96, 165, 250),
                Color::Rgb(52, 211, 153),
                Color::Rgb(251, 146, 60),
                Color::Rgb(192, 132, 252),
                Color::Rgb(45, 212, 191),
                Color::Rgb(251, 113, 133),
                Color::Rgb(250, 204, 21),
                Color::Rgb(56, 189, 248),
            ],
            mono_base: 234,
            mono_range: 18,
        }
    }

    fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Rgb(247, 147, 26),
            header_accent_fg: Color::Rgb(255, 255, 255),
            selection_border: Color::Rgb(136, 57, 239),
            status_ok: Color::Rgb(64, 160, 43),
            status_err: Color::Rgb(210, 15, 57),
            statusbar_bg: Color::Rgb(230, 233, 239),
            overlay_border: Color::Rgb(124, 127, 147),
            text_primary: Color::Rgb(76, 79, 105),
            text_secondary: Color::Rgb(108, 111, 133),
            accent: Color::Rgb(136, 57, 239),
            pill_key_bg: Color::Rgb(188, 192, 204),
            pill_key_fg: Color::Rgb(48, 52, 70),
            pill_desc_fg: Color::Rgb(92, 95, 119),
            surface_bg: Color::Rgb(239, 241, 245),
            sparkline_color: Color::Rgb(210, 119, 6),
            heat_colors: [
                Color::Rgb(154, 205, 142),
                Color::Rgb(110, 170, 100),
                Color::Rgb(223, 184, 85),
                Color::Rgb(230, 140, 80),
                Color::Rgb(217, 95, 95),
            ],
            hash_palette: [
                Color::Rgb(114, 160, 222),
                Color::Rgb(125, 196, 136),
                Color::Rgb(235, 170, 110),
                Color::Rgb(180, 140, 230),
                Color::Rgb(110, 200, 190),
                Color::Rgb(230, 130, 150),
                Color::Rgb(222, 200, 120),
                Color::Rgb(120, 185, 230),
            ],
            mono_base: 250,
            mono_range: 5,
        }
    }

    fn colorblind() -> Self {
        let mut theme = Self::dark();
        theme.name = "colorblind";
        // Viridis-style ramp, ordered by lightness so the common red-green
        // deficiencies still read the scale.
        theme.heat_colors = [
            Color::Rgb(68, 1, 84),
            Color::Rgb(59, 82, 139),
            Color::Rgb(33, 145, 140),
            Color::Rgb(94, 201, 98),
            Color::Rgb(253, 231, 37),
        ];
        theme.hash_palette = [
            Color::Rgb(0, 114, 178),
            Color::Rgb(230, 159, 0),
            Color::Rgb(86, 180, 233),
            Color::Rgb(240, 228, 66),
            Color::Rgb(0, 158, 115),
            Color::Rgb(213, 94, 0),
            Color::Rgb(204, 121, 167),
            Color::Rgb(153, 153, 153),
        ];
        theme.status_ok = Color::Rgb(0, 158, 115);
        theme.status_err = Color::Rgb(213, 94, 0);
        theme
    }

    fn mono() -> Self {
        let gray = Color::Indexed;
        Theme {
            name: "mono",
            header_accent_bg: gray(250),
            header_accent_fg: gray(233),
            selection_border: gray(255),
            status_ok: gray(252),
            status_err: gray(255),
            statusbar_bg: gray(234),
            overlay_border: gray(244),
            text_primary: gray(252),
            text_secondary: gray(246),
            accent: gray(254),
            pill_key_bg: gray(240),
            pill_key_fg: gray(255),
            pill_desc_fg: gray(248),
            surface_bg: gray(233),
            sparkline_color: gray(250),
            heat_colors: [gray(237), gray(240), gray(243), gray(246), gray(250)],
            hash_palette: [
                gray(237),
                gray(239),
                gray(241),
                gray(243),
                gray(245),
                gray(247),
                gray(249),
                gray(251),
            ],
            mono_base: 236,
            mono_range: 16,
        }
    }

    fn apply_heat_overrides(&mut self, heat: &HeatOverrides) {
        let low = parse_hex_color(&heat.low);
        let mid = parse_hex_color(&heat.mid);
        let high = parse_hex_color(&heat.high);

        if let (Some(low), Some(mid), Some(high)) = (low, mid, high) {
            // Config anchors the ends and the middle; the in-between stops
            // stay theme-provided.
            self.heat_colors = [low, self.heat_colors[1], mid, self.heat_colors[3], high];
        }
    }

    fn apply_color_support(&mut self, support: ColorSupport) {
        let map = |c: Color| adapt_color(c, support);

        self.header_accent_bg = map(self.header_accent_bg);
        self.header_accent_fg = map(self.header_accent_fg);
        self.selection_border = map(self.selection_border);
        self.status_ok = map(self.status_ok);
        self.status_err = map(self.status_err);
        self.statusbar_bg = map(self.statusbar_bg);
        self.overlay_border = map(self.overlay_border);
        self.text_primary = map(self.text_primary);
        self.text_secondary = map(self.text_secondary);
        self.accent = map(self.accent);
        self.pill_key_bg = map(self.pill_key_bg);
        self.pill_key_fg = map(self.pill_key_fg);
        self.pill_desc_fg = map(self.pill_desc_fg);
        self.surface_bg = map(self.surface_bg);
        self.sparkline_color = map(self.sparkline_color);
        for c in self.heat_colors.iter_mut() {
            *c = map(*c);
        }
        for c in self.hash_palette.iter_mut() {
            *c = map(*c);
        }
    }
}

pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

pub fn adapt_color(color: Color, support: ColorSupport) -> Color {
    match (color, support) {
        (Color::Rgb(r, g, b), ColorSupport::Color256) => Color::Indexed(rgb_to_256(r, g, b)),
        (Color::Rgb(r, g, b), ColorSupport::Mono) => {
            let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
            let idx = 232 + ((luminance / 255.0) * 23.0).round() as u8;
            Color::Indexed(idx.min(255))
        }
        _ => color,
    }
}

/// Nearest xterm-256 index: the grayscale ramp for near-gray colors,
/// otherwise the 6x6x6 color cube.
fn rgb_to_256(r: u8, g: u8, b: u8) -> u8 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max - min < 10 {
        let luminance = (r as u16 + g as u16 + b as u16) / 3;
        if luminance < 8 {
            return 16; // cube black
        }
        if luminance > 238 {
            return 231; // cube white
        }
        return 232 + ((luminance - 8) / 10) as u8;
    }
    let level = |v: u8| -> u8 {
        if v < 48 {
            0
        } else if v < 115 {
            1
        } else {
            ((v as u16 - 35) / 40) as u8
        }
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// A layout cell with its resolved fill color, ready for the widget.
#[derive(Clone, Debug)]
pub struct ColoredTreemapRect {
    pub rect: LayoutRect,
    pub id: u32,
    pub label: String,
    pub value: u64,
    pub color: Color,
}

pub fn colorize_rects(
    rects: &[TreemapRect],
    total_value: u64,
    mode: ColorMode,
    theme: &Theme,
    support: ColorSupport,
) -> Vec<ColoredTreemapRect> {
    let mode = if support == ColorSupport::Mono {
        ColorMode::Monochrome
    } else {
        mode
    };

    rects
        .iter()
        .map(|r| {
            let share = if total_value > 0 {
                r.value as f64 / total_value as f64
            } else {
                0.0
            };
            let color = match mode {
                ColorMode::BySize => share_color(share, theme),
                ColorMode::ByLabel => theme.hash_palette[label_bucket(&r.label, 8)],
                ColorMode::Monochrome => {
                    let step = (share * theme.mono_range as f64).round() as u8;
                    Color::Indexed(theme.mono_base.saturating_add(step.min(theme.mono_range)))
                }
            };
            ColoredTreemapRect {
                rect: r.rect.clone(),
                id: r.id,
                label: r.label.clone(),
                value: r.value,
                color,
            }
        })
        .collect()
}

fn share_color(share: f64, theme: &Theme) -> Color {
    if share > 0.4 {
        theme.heat_colors[4]
    } else if share > 0.25 {
        theme.heat_colors[3]
    } else if share > 0.12 {
        theme.heat_colors[2]
    } else if share > 0.05 {
        theme.heat_colors[1]
    } else {
        theme.heat_colors[0]
    }
}

fn label_bucket(label: &str, buckets: usize) -> usize {
    let mut hasher = std::hash::DefaultHasher::new();
    label.hash(&mut hasher);
    (hasher.finish() % buckets as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_overrides() -> HeatOverrides {
        HeatOverrides {
            low: String::new(),
            mid: String::new(),
            high: String::new(),
        }
    }

    fn make_rect(id: u32, label: &str, value: u64) -> TreemapRect {
        TreemapRect {
            rect: LayoutRect::new(0.0, 0.0, 10.0, 10.0),
            id,
            label: label.to_string(),
            value,
        }
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex_color("#2d5a27"), Some(Color::Rgb(45, 90, 39)));
        assert_eq!(
            parse_hex_color("  #FFFFFF "),
            Some(Color::Rgb(255, 255, 255))
        );
        assert_eq!(parse_hex_color("2d5a27"), None);
        assert_eq!(parse_hex_color("#xyzxyz"), None);
        assert_eq!(parse_hex_color("#fff"), None);
    }

    #[test]
    fn heat_overrides_replace_anchor_stops() {
        let heat = HeatOverrides {
            low: "#000000".to_string(),
            mid: "#808080".to_string(),
            high: "#ffffff".to_string(),
        };
        let theme = Theme::from_config("dark", &heat, ColorSupport::Truecolor);
        assert_eq!(theme.heat_colors[0], Color::Rgb(0, 0, 0));
        assert_eq!(theme.heat_colors[2], Color::Rgb(128, 128, 128));
        assert_eq!(theme.heat_colors[4], Color::Rgb(255, 255, 255));
    }

    #[test]
    fn mono_support_forces_mono_theme() {
        let theme = Theme::from_config("vivid", &plain_overrides(), ColorSupport::Mono);
        assert_eq!(theme.name, "mono");
    }

    #[test]
    fn theme_cycle_returns_to_start() {
        let heat = plain_overrides();
        let start = Theme::from_config("dark", &heat, ColorSupport::Truecolor);
        let mut theme = start.clone();
        for _ in 0..4 {
            theme = theme.next(&heat, ColorSupport::Truecolor);
        }
        assert_eq!(theme.name, start.name);
    }

    #[test]
    fn color256_adaptation_maps_rgb_to_indexed() {
        let theme = Theme::from_config("dark", &plain_overrides(), ColorSupport::Color256);
        for c in theme.heat_colors {
            assert!(matches!(c, Color::Indexed(_)), "expected indexed, got {c:?}");
        }
    }

    #[test]
    fn rgb_to_256_endpoints() {
        assert_eq!(rgb_to_256(0, 0, 0), 16);
        assert_eq!(rgb_to_256(255, 255, 255), 231);
        assert_eq!(rgb_to_256(255, 0, 0), 16 + 36 * 5);
        assert_eq!(rgb_to_256(0, 0, 255), 16 + 5);
    }

    #[test]
    fn size_mode_uses_hotter_colors_for_bigger_shares() {
        let theme = Theme::from_config("dark", &plain_overrides(), ColorSupport::Truecolor);
        let rects = vec![make_rect(0, "big", 90), make_rect(1, "small", 10)];
        let colored =
            colorize_rects(&rects, 100, ColorMode::BySize, &theme, ColorSupport::Truecolor);
        assert_eq!(colored[0].color, theme.heat_colors[4]);
        assert_eq!(colored[1].color, theme.heat_colors[1]);
    }

    #[test]
    fn label_mode_is_stable_per_label() {
        let theme = Theme::from_config("dark", &plain_overrides(), ColorSupport::Truecolor);
        let rects = vec![
            make_rect(0, "0.12 BTC", 60),
            make_rect(1, "0.12 BTC", 25),
            make_rect(2, "0.42 BTC", 15),
        ];
        let colored =
            colorize_rects(&rects, 100, ColorMode::ByLabel, &theme, ColorSupport::Truecolor);
        assert_eq!(colored[0].color, colored[1].color);
    }

    #[test]
    fn mono_support_overrides_requested_mode() {
        let theme = Theme::from_config("dark", &plain_overrides(), ColorSupport::Mono);
        let rects = vec![make_rect(0, "a", 50), make_rect(1, "b", 50)];
        let colored = colorize_rects(&rects, 100, ColorMode::ByLabel, &theme, ColorSupport::Mono);
        for c in &colored {
            assert!(matches!(c.color, Color::Indexed(_)));
        }
    }
}

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::icon::IconCategory;

/// Opaque RGB color, written as `#RRGGBB` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<&str> for Color {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let hex = value
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| anyhow!("Invalid color '{value}'. Expected #RRGGBB."))?;

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::try_from(value.as_str())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub color: Color,
    pub bold: bool,
    pub anti_alias: bool,
    pub text_size: f32,
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self { color, bold: false, anti_alias: false, text_size: 0.0 }
    }

    pub fn text(color: Color, bold: bool) -> Self {
        Self { color, bold, anti_alias: true, text_size: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

/// A weather glyph scaled for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherIcon {
    pub category: IconCategory,
    pub width: f32,
    pub height: f32,
}

impl WeatherIcon {
    /// Scale to `height`, keeping `aspect_ratio` (width / height).
    pub fn scaled(category: IconCategory, height: f32, aspect_ratio: f32) -> Self {
        Self { category, width: height * aspect_ratio, height }
    }
}

/// Drawing surface the face paints onto.
pub trait Canvas {
    fn draw_color(&mut self, color: Color);

    fn draw_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32, paint: &Paint);

    /// `y` is the text baseline.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, paint: &Paint);

    fn draw_line(&mut self, start_x: f32, start_y: f32, stop_x: f32, stop_y: f32, paint: &Paint);

    /// `(left, top)` is the icon's upper-left corner.
    fn draw_icon(&mut self, icon: &WeatherIcon, left: f32, top: f32);

    fn measure_text(&self, text: &str, paint: &Paint) -> f32;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Color { color: Color },
    Rect { left: f32, top: f32, right: f32, bottom: f32, color: Color },
    Text { text: String, x: f32, y: f32, color: Color, size: f32, bold: bool, anti_alias: bool },
    Line { start_x: f32, start_y: f32, stop_x: f32, stop_y: f32, color: Color },
    Icon { category: IconCategory, left: f32, top: f32, width: f32, height: f32 },
}

impl std::fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawCommand::Color { color } => write!(f, "fill     {color}"),
            DrawCommand::Rect { left, top, right, bottom, color } => {
                write!(f, "rect     ({left:.1}, {top:.1})-({right:.1}, {bottom:.1}) {color}")
            }
            DrawCommand::Text { text, x, y, color, size, .. } => {
                write!(f, "text     {text:?} at ({x:.1}, {y:.1}) {color} {size:.1}px")
            }
            DrawCommand::Line { start_x, start_y, stop_x, stop_y, color } => {
                let (x0, y0, x1, y1) = (start_x, start_y, stop_x, stop_y);
                write!(f, "line     ({x0:.1}, {y0:.1})-({x1:.1}, {y1:.1}) {color}")
            }
            DrawCommand::Icon { category, left, top, width, height } => {
                write!(f, "icon     {category} at ({left:.1}, {top:.1}) {width:.1}x{height:.1}")
            }
        }
    }
}

/// Canvas that records draw calls instead of rasterising them.
///
/// Text width is estimated from a fixed per-glyph advance.
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub const GLYPH_ADVANCE: f32 = 0.55;
    pub const BOLD_GLYPH_ADVANCE: f32 = 0.6;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

impl Canvas for RecordingCanvas {
    fn draw_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::Color { color });
    }

    fn draw_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Rect { left, top, right, bottom, color: paint.color });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color: paint.color,
            size: paint.text_size,
            bold: paint.bold,
            anti_alias: paint.anti_alias,
        });
    }

    fn draw_line(&mut self, start_x: f32, start_y: f32, stop_x: f32, stop_y: f32, paint: &Paint) {
        let color = paint.color;
        self.commands.push(DrawCommand::Line { start_x, start_y, stop_x, stop_y, color });
    }

    fn draw_icon(&mut self, icon: &WeatherIcon, left: f32, top: f32) {
        self.commands.push(DrawCommand::Icon {
            category: icon.category,
            left,
            top,
            width: icon.width,
            height: icon.height,
        });
    }

    fn measure_text(&self, text: &str, paint: &Paint) -> f32 {
        let advance = if paint.bold { Self::BOLD_GLYPH_ADVANCE } else { Self::GLYPH_ADVANCE };
        text.chars().count() as f32 * paint.text_size * advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_hex() {
        assert_eq!(Color::try_from("#03A9F4").unwrap(), Color::rgb(0x03, 0xA9, 0xF4));
        assert_eq!(Color::try_from("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(Color::rgb(0x02, 0x88, 0xD1).to_string(), "#0288D1");
    }

    #[test]
    fn color_rejects_malformed_input() {
        for bad in ["03A9F4", "#03A9F", "#03A9F4FF", "#GGGGGG", ""] {
            let err = Color::try_from(bad).unwrap_err();
            assert!(err.to_string().contains("Invalid color"), "{bad}");
        }
    }

    #[test]
    fn icon_keeps_aspect_ratio() {
        let icon = WeatherIcon::scaled(IconCategory::Fog, 40.0, 1.5);
        assert_eq!(icon.height, 40.0);
        assert_eq!(icon.width, 60.0);
    }

    #[test]
    fn recording_canvas_measures_by_glyph_count() {
        let canvas = RecordingCanvas::new();
        let mut paint = Paint::text(Color::WHITE, false);
        paint.text_size = 20.0;

        assert_eq!(canvas.measure_text("12:30", &paint), 5.0 * 20.0 * 0.55);

        paint.bold = true;
        assert_eq!(canvas.measure_text("25°", &paint), 3.0 * 20.0 * 0.6);
    }

    #[test]
    fn recording_canvas_keeps_call_order() {
        let mut canvas = RecordingCanvas::new();
        let paint = Paint::fill(Color::WHITE);

        canvas.draw_color(Color::BLACK);
        canvas.draw_line(0.0, 1.0, 2.0, 1.0, &paint);

        assert_eq!(
            canvas.commands(),
            &[
                DrawCommand::Color { color: Color::BLACK },
                DrawCommand::Line {
                    start_x: 0.0,
                    start_y: 1.0,
                    stop_x: 2.0,
                    stop_y: 1.0,
                    color: Color::WHITE,
                },
            ]
        );
    }
}

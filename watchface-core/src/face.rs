//! Watch-face engine: display state, input handling and the per-frame draw
//! sequence. The host owns the lifecycle and forwards its callbacks here.

use chrono::{DateTime, FixedOffset};

use crate::{
    clock::{am_pm_text, date_text, time_text},
    config::{Config, LayoutConfig, LayoutMetrics, Palette},
    icon::IconCategory,
    model::{DataEvent, WeatherSnapshot},
    render::{Bounds, Canvas, Color, Paint, WeatherIcon},
};

/// Gap between the time and the am/pm marker.
const AM_PM_GAP: f32 = 5.0;
/// Half the width of the divider above the weather row.
const DIVIDER_HALF_WIDTH: f32 = 15.0;
/// Gap between high and low temperatures.
const TEMP_GAP: f32 = 20.0;
/// Gap between the icon and the high temperature.
const ICON_GAP: f32 = 30.0;
/// am/pm text size relative to the temperature text size.
const AM_PM_SCALE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    /// Finger went down.
    Touch,
    /// Gesture turned into something else.
    TouchCancel,
    /// Tap completed.
    Tap,
}

#[derive(Debug, Clone)]
struct Paints {
    background: Paint,
    time: Paint,
    am_pm: Paint,
    date: Paint,
    date_ambient: Paint,
    max_temp: Paint,
    min_temp: Paint,
    min_temp_ambient: Paint,
}

impl Paints {
    fn new(palette: &Palette) -> Self {
        Self {
            background: Paint::fill(palette.primary),
            time: Paint::text(palette.text_white, false),
            am_pm: Paint::text(palette.text_white, false),
            date: Paint::text(palette.text_grey, false),
            date_ambient: Paint::text(palette.text_white, false),
            max_temp: Paint::text(palette.text_white, true),
            min_temp: Paint::text(palette.text_grey, false),
            min_temp_ambient: Paint::text(palette.text_white, false),
        }
    }

    fn text_paints_mut(&mut self) -> [&mut Paint; 7] {
        [
            &mut self.time,
            &mut self.am_pm,
            &mut self.date,
            &mut self.date_ambient,
            &mut self.max_temp,
            &mut self.min_temp,
            &mut self.min_temp_ambient,
        ]
    }

    fn set_text_sizes(&mut self, metrics: &LayoutMetrics) {
        self.time.text_size = metrics.time_text_size;
        self.am_pm.text_size = metrics.temp_text_size * AM_PM_SCALE;
        self.date.text_size = metrics.date_text_size;
        self.date_ambient.text_size = metrics.date_text_size;
        self.max_temp.text_size = metrics.temp_text_size;
        self.min_temp.text_size = metrics.temp_text_size;
        self.min_temp_ambient.text_size = metrics.temp_text_size;
    }
}

#[derive(Debug, Clone)]
pub struct WatchFace {
    palette: Palette,
    layout: LayoutConfig,
    metrics: LayoutMetrics,
    paints: Paints,
    snapshot: WeatherSnapshot,
    use_24_hour: bool,
    visible: bool,
    ambient: bool,
    low_bit_ambient: bool,
    tap_count: u32,
    invalidated: bool,
}

impl WatchFace {
    pub fn new(config: &Config) -> Self {
        let mut face = Self {
            palette: config.palette,
            layout: config.layout,
            metrics: *config.layout.metrics(false),
            paints: Paints::new(&config.palette),
            snapshot: WeatherSnapshot::default(),
            use_24_hour: config.display.use_24_hour,
            visible: false,
            ambient: false,
            low_bit_ambient: false,
            tap_count: 0,
            invalidated: true,
        };
        face.on_properties_changed(config.display.low_bit_ambient);
        face.on_apply_insets(config.display.round);
        face
    }

    pub fn on_properties_changed(&mut self, low_bit_ambient: bool) {
        self.low_bit_ambient = low_bit_ambient;
    }

    /// Screen shape is known; pick offsets and text sizes for it.
    pub fn on_apply_insets(&mut self, round: bool) {
        self.metrics = *self.layout.metrics(round);
        self.paints.set_text_sizes(&self.metrics);
        self.invalidated = true;
    }

    pub fn on_ambient_mode_changed(&mut self, ambient: bool) {
        if self.ambient == ambient {
            return;
        }
        self.ambient = ambient;
        if self.low_bit_ambient {
            for paint in self.paints.text_paints_mut() {
                paint.anti_alias = !ambient;
            }
        }
        self.invalidated = true;
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn on_time_tick(&mut self) {
        self.invalidated = true;
    }

    /// A completed tap flips the background between primary and primary-dark.
    pub fn on_tap(&mut self, kind: TapKind) {
        if kind == TapKind::Tap {
            self.tap_count = self.tap_count.wrapping_add(1);
            self.paints.background.color = if self.tap_count % 2 == 0 {
                self.palette.primary
            } else {
                self.palette.primary_dark
            };
        }
        self.invalidated = true;
    }

    pub fn on_data_events(&mut self, events: &[DataEvent]) {
        for event in events {
            if self.snapshot.apply(event) {
                self.invalidated = true;
            }
        }
    }

    /// The per-second timer only runs while visible and interactive.
    pub fn should_timer_be_running(&self) -> bool {
        self.visible && !self.ambient
    }

    /// Returns whether a redraw was requested, clearing the request.
    pub fn take_invalidated(&mut self) -> bool {
        std::mem::take(&mut self.invalidated)
    }

    pub fn tap_count(&self) -> u32 {
        self.tap_count
    }

    pub fn snapshot(&self) -> &WeatherSnapshot {
        &self.snapshot
    }

    /// Icon scaled to the high-temperature text height.
    pub fn weather_icon(&self) -> Option<WeatherIcon> {
        self.snapshot.icon.map(|category| self.scaled_icon(category))
    }

    fn scaled_icon(&self, category: IconCategory) -> WeatherIcon {
        let height = self.paints.max_temp.text_size;
        WeatherIcon::scaled(category, height, self.layout.icon_aspect_ratio)
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas, bounds: Bounds, now: &DateTime<FixedOffset>) {
        let paints = &self.paints;
        let metrics = &self.metrics;
        let center_x = bounds.center_x();

        if self.ambient {
            canvas.draw_color(Color::BLACK);
        } else {
            canvas.draw_rect(0.0, 0.0, bounds.width, bounds.height, &paints.background);
        }

        let time = time_text(now, self.use_24_hour);
        let am_pm = am_pm_text(now);
        let show_am_pm = self.ambient && !self.use_24_hour;

        let time_len = canvas.measure_text(&time, &paints.time);
        let mut time_offset = time_len / 2.0;
        if show_am_pm {
            time_offset += canvas.measure_text(am_pm, &paints.am_pm) / 2.0;
        }
        let time_x = center_x - time_offset;
        canvas.draw_text(&time, time_x, metrics.time_y, &paints.time);
        if show_am_pm {
            canvas.draw_text(am_pm, time_x + time_len + AM_PM_GAP, metrics.time_y, &paints.am_pm);
        }

        let date_paint = if self.ambient { &paints.date_ambient } else { &paints.date };
        let date = date_text(now);
        let date_x = center_x - canvas.measure_text(&date, date_paint) / 2.0;
        canvas.draw_text(&date, date_x, metrics.date_y, date_paint);

        if let Some((high, low, category)) = self.snapshot.complete() {
            canvas.draw_line(
                center_x - DIVIDER_HALF_WIDTH,
                metrics.divider_y,
                center_x + DIVIDER_HALF_WIDTH,
                metrics.divider_y,
                date_paint,
            );

            let weather_y = metrics.weather_y;
            let high_len = canvas.measure_text(high, &paints.max_temp);
            if self.ambient {
                let low_len = canvas.measure_text(low, &paints.min_temp_ambient);
                let x = center_x - (high_len + low_len + TEMP_GAP) / 2.0;
                canvas.draw_text(high, x, weather_y, &paints.max_temp);
                canvas.draw_text(low, x + high_len + TEMP_GAP, weather_y, &paints.min_temp_ambient);
            } else {
                let low_x = center_x + high_len / 2.0 + TEMP_GAP;
                canvas.draw_text(high, center_x - high_len / 2.0, weather_y, &paints.max_temp);
                canvas.draw_text(low, low_x, weather_y, &paints.min_temp);

                let icon = self.scaled_icon(category);
                let icon_x = center_x - (high_len / 2.0 + icon.width + ICON_GAP);
                canvas.draw_icon(&icon, icon_x, weather_y - icon.height);
            }
        }

        self.invalidated = false;
    }
}

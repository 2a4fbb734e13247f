//! Minimal stand-in for the watch host: makes the face visible, wires the
//! data source and drives the update timer.

use anyhow::Result;
use std::{io::Write, time::Duration};
use watchface_core::{
    Bounds, RecordingCanvas, TimeSource, WatchFace, WeatherDataSource, clock::next_tick_delay,
    request_weather_or_log,
};

const AMBIENT_UPDATE_RATE_MS: i64 = 60_000;

/// Delay until the next redraw: whole seconds while the timer runs,
/// otherwise the next minute boundary.
pub fn next_frame_delay(face: &WatchFace, now_ms: i64) -> Duration {
    let delay_ms = if face.should_timer_be_running() {
        next_tick_delay(now_ms)
    } else {
        AMBIENT_UPDATE_RATE_MS - now_ms.rem_euclid(AMBIENT_UPDATE_RATE_MS)
    };
    Duration::from_millis(delay_ms as u64)
}

/// Run `ticks` timer ticks, writing every redrawn frame to `out`.
pub async fn run(
    face: &mut WatchFace,
    mut source: Option<&mut dyn WeatherDataSource>,
    clock: &dyn TimeSource,
    bounds: Bounds,
    ticks: u32,
    out: &mut dyn Write,
) -> Result<()> {
    face.on_visibility_changed(true);

    if let Some(source) = source.as_deref_mut() {
        match source.connect().await {
            Ok(()) => request_weather_or_log(source).await,
            Err(err) => tracing::warn!(error = %err, "failed to connect weather data source"),
        }
    }

    for tick in 0..ticks {
        if let Some(source) = source.as_deref_mut().filter(|s| s.is_connected()) {
            match source.poll_events().await {
                Ok(events) => face.on_data_events(&events),
                Err(err) => tracing::warn!(error = %err, "failed to read weather data"),
            }
        }

        let now = clock.now();
        if face.take_invalidated() {
            let mut canvas = RecordingCanvas::new();
            face.draw(&mut canvas, bounds, &now);

            writeln!(out, "-- frame {tick} @ {}", now.to_rfc3339())?;
            for command in canvas.commands() {
                writeln!(out, "   {command}")?;
            }
        }

        tokio::time::sleep(next_frame_delay(face, now.timestamp_millis())).await;
        face.on_time_tick();
    }

    face.on_visibility_changed(false);
    if let Some(source) = source.as_deref_mut() {
        source.disconnect().await;
    }

    Ok(())
}

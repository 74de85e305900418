//! Animated pulse next to each endpoint.
//!
//! The height of the wave is a pure function of status and latency; only
//! the phase moves with the clock, so every frame of a given endpoint
//! looks the same at the same instant.

use std::f64::consts::TAU;

use apiwatch_core::Status;
use ratatui::style::Style;
use ratatui::text::Span;

use crate::theme;

const GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Glyphs drawn per pulse cell.
pub const PULSE_WIDTH: usize = 6;

/// One full wave per period.
const PERIOD_MS: i64 = 1_600;

/// Fraction of a wave between neighbouring glyphs.
const SAMPLE_SHIFT: f64 = 0.125;

/// Latency at or above which an UP endpoint pulses at its weakest.
const SLOW_LATENCY_SECS: f64 = 2.0;

/// Wave height in `0.0..=1.0`.
///
/// UP pulses strongly, weaker as latency grows. DOWN keeps a faint
/// flutter. UNKNOWN is flat.
pub fn pulse_amplitude(status: Status, latency: Option<f64>) -> f64 {
    match status {
        Status::Up => match latency {
            Some(secs) if secs.is_finite() && secs >= 0.0 => {
                (1.0 - secs / SLOW_LATENCY_SECS).clamp(0.3, 1.0)
            }
            _ => 0.5,
        },
        Status::Down => 0.2,
        Status::Unknown => 0.0,
    }
}

/// Glyph for one sample of the wave. `phase` is in radians.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn pulse_glyph(amplitude: f64, phase: f64) -> char {
    let level = amplitude.clamp(0.0, 1.0) * (0.5 + 0.5 * phase.sin());
    let idx = (level * 7.0).round().clamp(0.0, 7.0) as usize;
    GLYPHS.get(idx).copied().unwrap_or('▁')
}

/// Phase for `now_ms`, offset by sample position so the wave travels.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn phase_at(now_ms: i64, sample: usize) -> f64 {
    let t = now_ms.rem_euclid(PERIOD_MS) as f64 / PERIOD_MS as f64;
    (t - sample as f64 * SAMPLE_SHIFT) * TAU
}

pub fn pulse_text(status: Status, latency: Option<f64>, now_ms: i64) -> String {
    let amplitude = pulse_amplitude(status, latency);
    (0..PULSE_WIDTH)
        .map(|i| pulse_glyph(amplitude, phase_at(now_ms, i)))
        .collect()
}

pub fn pulse_span(status: Status, latency: Option<f64>, now_ms: i64) -> Span<'static> {
    Span::styled(
        pulse_text(status, latency, now_ms),
        Style::default().fg(theme::status_color(status)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amplitude_by_status() {
        assert!((pulse_amplitude(Status::Up, Some(0.05)) - 0.975).abs() < 1e-9);
        assert!((pulse_amplitude(Status::Up, Some(10.0)) - 0.3).abs() < 1e-9);
        assert!((pulse_amplitude(Status::Up, None) - 0.5).abs() < 1e-9);
        assert!((pulse_amplitude(Status::Down, Some(0.1)) - 0.2).abs() < 1e-9);
        assert!(pulse_amplitude(Status::Unknown, Some(0.1)).abs() < 1e-9);
    }

    #[test]
    fn faster_is_taller() {
        let fast = pulse_amplitude(Status::Up, Some(0.1));
        let slow = pulse_amplitude(Status::Up, Some(1.2));
        assert!(fast > slow);
    }

    #[test]
    fn unknown_is_flat() {
        let text = pulse_text(Status::Unknown, None, 12_345);
        assert_eq!(text, "▁".repeat(PULSE_WIDTH));
    }

    #[test]
    fn same_instant_same_frame() {
        let a = pulse_text(Status::Up, Some(0.2), 987_654);
        let b = pulse_text(Status::Up, Some(0.2), 987_654);
        assert_eq!(a, b);
        assert_eq!(a.chars().count(), PULSE_WIDTH);
    }

    #[test]
    fn glyph_extremes() {
        assert_eq!(pulse_glyph(1.0, std::f64::consts::FRAC_PI_2), '█');
        assert_eq!(pulse_glyph(1.0, -std::f64::consts::FRAC_PI_2), '▁');
        assert_eq!(pulse_glyph(0.0, 1.0), '▁');
    }
}

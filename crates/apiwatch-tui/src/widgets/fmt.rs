//! Latency and time formatting helpers.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

/// Placeholder for values the prober has not filled in yet.
pub const MISSING: &str = "—";

/// Latency given in seconds, shown as `"87 ms"` or `"1.24 s"`.
pub fn fmt_latency(latency: Option<f64>) -> String {
    match latency {
        Some(secs) if secs.is_finite() && secs >= 0.0 => {
            if secs < 1.0 {
                format!("{:.0} ms", secs * 1000.0)
            } else {
                format!("{secs:.2} s")
            }
        }
        _ => MISSING.to_owned(),
    }
}

/// Compact relative time, e.g. `"12s ago"`, `"3m ago"`, `"2h ago"`.
pub fn fmt_ago(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return "never".to_owned();
    };
    let secs = (now - at).num_seconds();
    if secs < 1 {
        return "just now".to_owned();
    }
    #[allow(clippy::cast_sign_loss, clippy::as_conversions)]
    let secs = secs as u64;
    // Keep only the largest unit
    let rounded = match secs {
        0..60 => secs,
        60..3_600 => secs / 60 * 60,
        3_600..86_400 => secs / 3_600 * 3_600,
        _ => secs / 86_400 * 86_400,
    };
    format!("{} ago", humantime::format_duration(Duration::from_secs(rounded)))
}

/// Absolute timestamp in local time.
pub fn fmt_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || MISSING.to_owned(),
        |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Truncate to `max` characters, marking the cut with `…`.
pub fn clip(text: &str, max: usize) -> String {
    let single_line: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if single_line.chars().count() <= max {
        return single_line;
    }
    let mut clipped: String = single_line.chars().take(max.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

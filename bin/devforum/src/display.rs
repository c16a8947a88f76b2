//! Human-readable labels for counts and ages.

use chrono::{DateTime, Utc};

/// `1247` → `1.2k`, `156000` → `156.0k`, `2500000` → `2.5M`. Thresholds apply
/// to the magnitude, so `-1500` → `-1.5k`.
pub fn format_count(n: i64) -> String {
    let abs = n.unsigned_abs();
    if abs >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if abs >= 1_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Whole hours, else whole minutes, else "just now".
pub fn format_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - created_at;
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();
    if hours > 0 {
        format!("{hours}h ago")
    } else if minutes > 0 {
        format!("{minutes}m ago")
    } else {
        "just now".to_string()
    }
}

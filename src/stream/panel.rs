//! Text of the live stream panel: one row per subscription.

use std::fmt::Write;
use std::time::{Duration, Instant};

use super::subscription::Subscription;

/// Width reserved for the channel name.
const CHANNEL_COLUMN: usize = 10;

/// Format one subscription for display at `now`.
pub fn format_row(sub: &Subscription, now: Instant) -> String {
    let mut row = format!("{:<width$}", sub.channel(), width = CHANNEL_COLUMN);
    let Some(agg) = sub.latest() else {
        row.push_str("waiting for data");
        return row;
    };

    for (label, value) in [("O", agg.open), ("H", agg.high), ("L", agg.low), ("C", agg.close)] {
        if let Some(value) = value {
            let _ = write!(row, "{label} {}  ", format_price(value));
        }
    }
    if let Some(volume) = agg.volume {
        let _ = write!(row, "V {volume:.0}  ");
    }
    if let Some(vwap) = agg.vwap {
        let _ = write!(row, "VWAP {}  ", format_price(vwap));
    }
    if let (Some(close), Some(previous)) = (agg.close, sub.previous_close()) {
        row.push_str(&format_change(close, previous));
        row.push_str("  ");
    }
    if let Some(updated) = sub.last_update() {
        row.push_str(&format_age(now.saturating_duration_since(updated)));
    }
    row.truncate(row.trim_end().len());
    row
}

/// True when the subscription has data that is older than `stale_after`.
pub fn is_stale(sub: &Subscription, now: Instant, stale_after: Duration) -> bool {
    sub.last_update()
        .is_some_and(|t| now.saturating_duration_since(t) > stale_after)
}

/// Prices below 10 get four decimals, others two.
pub fn format_price(value: f64) -> String {
    if value.abs() < 10.0 {
        format!("{value:.4}")
    } else {
        format!("{value:.2}")
    }
}

/// `+0.0012 (+0.27%)`
pub fn format_change(close: f64, previous: f64) -> String {
    let change = close - previous;
    let sign = if change < 0.0 { '-' } else { '+' };
    let magnitude = format_price(change.abs());
    if previous == 0.0 {
        return format!("{sign}{magnitude}");
    }
    let percent = change.abs() / previous.abs() * 100.0;
    format!("{sign}{magnitude} ({sign}{percent:.2}%)")
}

/// `42s ago`, `3m ago`, `2h ago`
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3_600)
    }
}

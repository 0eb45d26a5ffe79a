//! Locally ticking delivery countdown.
//!
//! The countdown baseline is derived from server data exactly once per order
//! id and then decremented locally at 1 Hz. Subsequent polls never rewrite
//! it while the same order stays active — a noisy server estimate must not
//! make the visible timer jump backward or forward.

use crate::config::OrderTrackingConfig;
use chrono::{DateTime, Utc};
use order_client_types::Order;

/// Lower clamp bound for the server ETA, in minutes.
pub const ESTIMATE_MIN_MINUTES: i64 = 10;
/// Upper clamp bound for the server ETA, in minutes.
///
/// Defensive bound against obviously-wrong values (e.g. a field mistakenly
/// carrying seconds). The estimate's unit is always minutes on the wire.
pub const ESTIMATE_MAX_MINUTES: i64 = 60;

/// Derived countdown state. Not authoritative — purely a function of the
/// order snapshot it was initialized from plus elapsed local ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountdownState {
    /// Seconds left, `None` when no countdown is active.
    pub remaining_seconds: Option<u64>,
    /// Order id the baseline was computed for. Stays set for the lifetime
    /// of that order id so initialization happens at most once per id.
    pub initialized_for: Option<String>,
}

impl CountdownState {
    /// Compute the countdown baseline for an order entering the
    /// countdown-eligible window.
    ///
    /// 1. Server ETA minutes (or the configured default when absent),
    ///    clamped to `[ESTIMATE_MIN_MINUTES, ESTIMATE_MAX_MINUTES]`.
    /// 2. Converted to seconds.
    /// 3. Minus seconds already elapsed since `assigned_at`, floored at 0.
    pub(crate) fn initialize(order: &Order, config: &OrderTrackingConfig, now: DateTime<Utc>) -> Self {
        let estimate = order
            .estimated_delivery_minutes
            .unwrap_or(config.default_estimated_minutes)
            .clamp(ESTIMATE_MIN_MINUTES, ESTIMATE_MAX_MINUTES);
        let mut seconds = (estimate * 60) as u64;

        if let Some(assigned_at) = order.assigned_at {
            let elapsed = (now - assigned_at).num_seconds().max(0) as u64;
            seconds = seconds.saturating_sub(elapsed);
        }

        Self {
            remaining_seconds: Some(seconds),
            initialized_for: Some(order.id.clone()),
        }
    }

    /// One local tick: decrement by a second, floored at zero.
    pub fn tick(&mut self) {
        if let Some(remaining) = self.remaining_seconds.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }
}

/// Render remaining seconds for display: `m:ss`, or "arriving soon" once
/// the countdown has run out.
pub fn format_remaining(remaining_seconds: u64) -> String {
    if remaining_seconds == 0 {
        "arriving soon".to_string()
    } else {
        format!("{}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
    }
}

//! Tracking worker configuration.

use tokio::time::Duration;

/// Configuration for polling cadence, countdown derivation, and side-action
/// validation bounds.
///
/// # Fields
///
/// - `poll_interval`: active-order poll cadence (default: 10 s)
/// - `countdown_tick`: local countdown decrement cadence (default: 1 s)
/// - `default_estimated_minutes`: ETA used when the server omits one
///   (default: 45)
/// - `max_tip_amount`: upper bound for tip submission (default: 500)
#[derive(Debug, Clone)]
pub struct OrderTrackingConfig {
    /// How often to poll the active-order endpoint.
    pub poll_interval: Duration,
    /// How often the local countdown decrements.
    pub countdown_tick: Duration,
    /// Fallback ETA in minutes when the server estimate is absent.
    pub default_estimated_minutes: i64,
    /// Maximum accepted tip amount, in minor currency units.
    pub max_tip_amount: u32,
}

impl Default for OrderTrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10_000),
            countdown_tick: Duration::from_millis(1_000),
            default_estimated_minutes: 45,
            max_tip_amount: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = OrderTrackingConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.countdown_tick, Duration::from_secs(1));
        assert_eq!(config.default_estimated_minutes, 45);
        assert_eq!(config.max_tip_amount, 500);
    }
}

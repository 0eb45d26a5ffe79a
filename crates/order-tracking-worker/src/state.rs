//! Tracker state and the fetch-outcome state machine.
//!
//! All state transitions live here as pure functions of (state, outcome,
//! now) so the polling table, dismissal rules, and countdown lifecycle are
//! testable without timers or a transport.

use crate::config::OrderTrackingConfig;
use crate::countdown::{format_remaining, CountdownState};
use chrono::{DateTime, Utc};
use order_client_types::{Order, OrderStatus};
use tracing::{debug, info};

/// Classified result of one active-order fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// 404 — the valid "no active order" state, not an error.
    NotFound,
    /// 401 after the gateway already spent its one refresh-and-retry.
    Unauthorized,
    /// Any other non-2xx status.
    Failed { status: u16 },
    /// 2xx with an empty body.
    Empty,
    /// 2xx with an order snapshot.
    Snapshot(Order),
}

/// The synchronizer's full mutable state.
///
/// Owned exclusively by the worker; presentation layers read cloned
/// snapshots and never write. Writes happen only through the defined
/// operations (`apply_fetch_outcome`, `dismiss`, `resume`,
/// `tick_countdown`).
#[derive(Debug, Clone)]
pub struct TrackerState {
    /// Last authoritative order snapshot, absent when there is none.
    pub order: Option<Order>,
    /// Last fetch error, cleared by any successful fetch.
    pub error: Option<String>,
    /// Order id the user dismissed; honored only for that exact id.
    pub dismissed_order_id: Option<String>,
    /// Whether scheduled polls do any work.
    pub polling_enabled: bool,
    /// Derived delivery countdown.
    pub countdown: CountdownState,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            order: None,
            error: None,
            dismissed_order_id: None,
            polling_enabled: true,
            countdown: CountdownState::default(),
        }
    }
}

impl TrackerState {
    /// Apply one fetch outcome.
    ///
    /// | Outcome                                   | Effect                                        |
    /// |-------------------------------------------|-----------------------------------------------|
    /// | `NotFound`                                | order, dismissal, and error cleared           |
    /// | `Unauthorized`                            | order cleared                                 |
    /// | `Failed`                                  | error recorded, stale order left displayed    |
    /// | `Empty`                                   | order cleared                                 |
    /// | `Snapshot`, id == dismissed && delivered  | discarded, no state change                    |
    /// | `Snapshot`, id != dismissed id            | dismissal cleared, polling re-enabled, replace|
    /// | `Snapshot`, otherwise                     | order replaced wholesale                      |
    pub fn apply_fetch_outcome(
        &mut self,
        outcome: FetchOutcome,
        config: &OrderTrackingConfig,
        now: DateTime<Utc>,
    ) {
        match outcome {
            FetchOutcome::NotFound => {
                debug!("No active order");
                self.order = None;
                self.dismissed_order_id = None;
                self.error = None;
            }
            FetchOutcome::Unauthorized => {
                debug!("Active order fetch unauthorized after retry, clearing order");
                self.order = None;
            }
            FetchOutcome::Failed { status } => {
                // Stale-but-displayed: keep the last-known order visible.
                self.error = Some(format!("active order fetch failed: HTTP {}", status));
            }
            FetchOutcome::Empty => {
                self.order = None;
                self.error = None;
            }
            FetchOutcome::Snapshot(order) => {
                let dismissed = self.dismissed_order_id.as_deref() == Some(order.id.as_str());
                if dismissed && order.status == OrderStatus::Delivered {
                    // Dismissed order stays hidden until a new one exists.
                    debug!(order_id = %order.id, "Discarding snapshot of dismissed order");
                    return;
                }
                if self.dismissed_order_id.is_some() && !dismissed {
                    info!(order_id = %order.id, "New order observed, clearing dismissal");
                    self.dismissed_order_id = None;
                    self.polling_enabled = true;
                }
                self.order = Some(order);
                self.error = None;
            }
        }
        self.sync_countdown(config, now);
    }

    /// Dismiss the current order. Honored only when its status is exactly
    /// `delivered`; anything else is a no-op. Returns whether it took
    /// effect.
    pub fn dismiss(&mut self) -> bool {
        match &self.order {
            Some(order) if order.status == OrderStatus::Delivered => {
                info!(order_id = %order.id, "Order dismissed");
                self.dismissed_order_id = Some(order.id.clone());
                self.order = None;
                self.countdown = CountdownState::default();
                true
            }
            _ => {
                debug!("Dismiss ignored: no delivered order to dismiss");
                false
            }
        }
    }

    /// Clear dismissal and re-enable polling unconditionally (the user
    /// re-entered the tracking view intentionally).
    pub fn resume(&mut self) {
        self.dismissed_order_id = None;
        self.polling_enabled = true;
    }

    /// One local countdown tick.
    pub fn tick_countdown(&mut self) {
        self.countdown.tick();
    }

    /// Display string for the ETA.
    ///
    /// Active countdown renders as `m:ss` (or "arriving soon" at zero);
    /// with no countdown the raw server estimate in minutes is shown.
    pub fn display_eta(&self) -> Option<String> {
        match self.countdown.remaining_seconds {
            Some(remaining) => Some(format_remaining(remaining)),
            None => self
                .order
                .as_ref()
                .and_then(|order| order.estimated_delivery_minutes)
                .map(|minutes| format!("{} min", minutes)),
        }
    }

    /// Reconcile the countdown with the current order.
    ///
    /// The baseline is computed at most once per order id, on entry to a
    /// countdown-eligible status. Later snapshots of the same id never
    /// re-derive it; leaving the eligible window drops the remaining value
    /// but keeps the initialization marker so a noisy status regression
    /// cannot restart the timer.
    fn sync_countdown(&mut self, config: &OrderTrackingConfig, now: DateTime<Utc>) {
        match &self.order {
            Some(order) if order.status.countdown_eligible() => {
                if self.countdown.initialized_for.as_deref() != Some(order.id.as_str()) {
                    self.countdown = CountdownState::initialize(order, config, now);
                    debug!(
                        order_id = %order.id,
                        remaining = ?self.countdown.remaining_seconds,
                        "Countdown initialized"
                    );
                }
            }
            Some(order) => {
                if self.countdown.initialized_for.as_deref() == Some(order.id.as_str()) {
                    self.countdown.remaining_seconds = None;
                } else {
                    self.countdown = CountdownState::default();
                }
            }
            None => {
                self.countdown = CountdownState::default();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use order_client_types::OrderStatus;

    fn config() -> OrderTrackingConfig {
        OrderTrackingConfig::default()
    }

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            status,
            delivery_partner: None,
            assigned_at: None,
            estimated_delivery_minutes: Some(30),
            tip_amount: None,
            items: vec![],
            pricing: Default::default(),
            delivery_address: None,
        }
    }

    fn apply(state: &mut TrackerState, outcome: FetchOutcome) {
        state.apply_fetch_outcome(outcome, &config(), Utc::now());
    }

    // Scenario: 404 clears order, countdown, dismissal, and error.
    #[test]
    fn not_found_clears_everything() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Assigned)));
        state.error = Some("old error".to_string());
        state.dismissed_order_id = Some("ord-0".to_string());

        apply(&mut state, FetchOutcome::NotFound);
        assert!(state.order.is_none());
        assert!(state.error.is_none());
        assert!(state.dismissed_order_id.is_none());
        assert_eq!(state.countdown, CountdownState::default());
    }

    #[test]
    fn unauthorized_clears_order() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Preparing)));

        apply(&mut state, FetchOutcome::Unauthorized);
        assert!(state.order.is_none());
    }

    #[test]
    fn failed_fetch_keeps_stale_order_and_records_error() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Preparing)));

        apply(&mut state, FetchOutcome::Failed { status: 503 });
        assert_eq!(state.order.as_ref().unwrap().id, "ord-1");
        assert_eq!(
            state.error.as_deref(),
            Some("active order fetch failed: HTTP 503")
        );

        // A later good fetch clears the error.
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Assigning)));
        assert!(state.error.is_none());
    }

    #[test]
    fn empty_body_clears_order() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Preparing)));

        apply(&mut state, FetchOutcome::Empty);
        assert!(state.order.is_none());
    }

    #[test]
    fn snapshot_replaces_wholesale() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Preparing)));

        let mut updated = order("ord-1", OrderStatus::Assigning);
        updated.tip_amount = Some(50);
        apply(&mut state, FetchOutcome::Snapshot(updated));

        let current = state.order.as_ref().unwrap();
        assert_eq!(current.status, OrderStatus::Assigning);
        assert_eq!(current.tip_amount, Some(50));
    }

    #[test]
    fn dismiss_requires_delivered_status() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::OutForDelivery)));

        assert!(!state.dismiss());
        assert!(state.order.is_some());
        assert!(state.dismissed_order_id.is_none());
    }

    #[test]
    fn dismiss_with_no_order_is_a_noop() {
        let mut state = TrackerState::default();
        assert!(!state.dismiss());
    }

    // Scenario: delivered order dismissed → stays hidden while the same id
    // re-polls → a different id with any status becomes visible again.
    #[test]
    fn dismissal_filter_lifecycle() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Delivered)));

        assert!(state.dismiss());
        assert!(state.order.is_none());
        assert_eq!(state.dismissed_order_id.as_deref(), Some("ord-1"));

        // Same id, still delivered: discarded.
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Delivered)));
        assert!(state.order.is_none());
        assert_eq!(state.dismissed_order_id.as_deref(), Some("ord-1"));

        // Different id, any status: dismissal cleared, order visible.
        apply(&mut state, FetchOutcome::Snapshot(order("ord-2", OrderStatus::Preparing)));
        assert_eq!(state.order.as_ref().unwrap().id, "ord-2");
        assert!(state.dismissed_order_id.is_none());
        assert!(state.polling_enabled);
    }

    #[test]
    fn new_order_id_clears_dismissal_even_when_delivered() {
        let mut state = TrackerState::default();
        state.dismissed_order_id = Some("ord-1".to_string());

        apply(&mut state, FetchOutcome::Snapshot(order("ord-2", OrderStatus::Delivered)));
        assert_eq!(state.order.as_ref().unwrap().id, "ord-2");
        assert!(state.dismissed_order_id.is_none());
    }

    #[test]
    fn resume_clears_dismissal_and_enables_polling() {
        let mut state = TrackerState::default();
        state.dismissed_order_id = Some("ord-1".to_string());
        state.polling_enabled = false;

        state.resume();
        assert!(state.dismissed_order_id.is_none());
        assert!(state.polling_enabled);
    }

    #[test]
    fn countdown_initializes_on_entering_assigned() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Assigning)));
        assert!(state.countdown.remaining_seconds.is_none());

        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Assigned)));
        assert_eq!(state.countdown.remaining_seconds, Some(30 * 60));
        assert_eq!(state.countdown.initialized_for.as_deref(), Some("ord-1"));
    }

    // Re-polling the same order id never resets the countdown, even when
    // the server reports a different estimate.
    #[test]
    fn countdown_initialization_is_idempotent_per_order_id() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Assigned)));

        for _ in 0..90 {
            state.tick_countdown();
        }
        assert_eq!(state.countdown.remaining_seconds, Some(30 * 60 - 90));

        let mut noisy = order("ord-1", OrderStatus::Assigned);
        noisy.estimated_delivery_minutes = Some(55);
        apply(&mut state, FetchOutcome::Snapshot(noisy));
        assert_eq!(state.countdown.remaining_seconds, Some(30 * 60 - 90));

        let mut en_route = order("ord-1", OrderStatus::OutForDelivery);
        en_route.estimated_delivery_minutes = Some(12);
        apply(&mut state, FetchOutcome::Snapshot(en_route));
        assert_eq!(state.countdown.remaining_seconds, Some(30 * 60 - 90));
    }

    #[test]
    fn countdown_resets_when_order_id_changes() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Assigned)));
        for _ in 0..60 {
            state.tick_countdown();
        }

        let mut next = order("ord-2", OrderStatus::Assigned);
        next.estimated_delivery_minutes = Some(15);
        apply(&mut state, FetchOutcome::Snapshot(next));
        assert_eq!(state.countdown.remaining_seconds, Some(15 * 60));
        assert_eq!(state.countdown.initialized_for.as_deref(), Some("ord-2"));
    }

    #[test]
    fn countdown_goes_absent_outside_eligible_statuses() {
        let mut state = TrackerState::default();
        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::OutForDelivery)));
        assert!(state.countdown.remaining_seconds.is_some());

        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Delivered)));
        assert!(state.countdown.remaining_seconds.is_none());
        // Marker survives so a status regression cannot restart the timer.
        assert_eq!(state.countdown.initialized_for.as_deref(), Some("ord-1"));

        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Assigned)));
        assert!(state.countdown.remaining_seconds.is_none());
    }

    // Scenario: estimate of 200 minutes entering `assigned` clamps to 3600
    // seconds, not 200 minutes' worth.
    #[test]
    fn oversized_estimate_clamps_on_transition() {
        let mut state = TrackerState::default();
        let mut o = order("ord-1", OrderStatus::Assigned);
        o.estimated_delivery_minutes = Some(200);
        apply(&mut state, FetchOutcome::Snapshot(o));
        assert_eq!(state.countdown.remaining_seconds, Some(3600));
    }

    #[test]
    fn countdown_accounts_for_elapsed_assignment_time() {
        let now = Utc::now();
        let mut state = TrackerState::default();
        let mut o = order("ord-1", OrderStatus::Assigned);
        o.assigned_at = Some(now - Duration::seconds(300));
        state.apply_fetch_outcome(FetchOutcome::Snapshot(o), &config(), now);
        assert_eq!(state.countdown.remaining_seconds, Some(30 * 60 - 300));
    }

    #[test]
    fn display_eta_prefers_countdown_then_raw_estimate() {
        let mut state = TrackerState::default();
        assert_eq!(state.display_eta(), None);

        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Preparing)));
        // No countdown yet: raw server estimate.
        assert_eq!(state.display_eta().as_deref(), Some("30 min"));

        apply(&mut state, FetchOutcome::Snapshot(order("ord-1", OrderStatus::Assigned)));
        assert_eq!(state.display_eta().as_deref(), Some("30:00"));

        state.countdown.remaining_seconds = Some(0);
        assert_eq!(state.display_eta().as_deref(), Some("arriving soon"));
    }
}

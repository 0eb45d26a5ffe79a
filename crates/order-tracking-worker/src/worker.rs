//! The background synchronizer itself: two timers plus the side actions.

use crate::config::OrderTrackingConfig;
use crate::error::{TrackingError, TrackingResult};
use crate::state::{FetchOutcome, TrackerState};
use auth_refresh_client::{ApiResponse, AuthGateway, Method};
use chrono::Utc;
use order_client_types::Order;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const ACTIVE_ORDER_PATH: &str = "/orders/active";

struct WorkerTasks {
    poll: JoinHandle<()>,
    countdown: JoinHandle<()>,
}

struct WorkerInner {
    gateway: AuthGateway,
    config: OrderTrackingConfig,
    state: RwLock<TrackerState>,
}

/// Background synchronizer for the single active order.
///
/// Owns all writes to [`TrackerState`]; callers read cloned snapshots.
/// `start`/`stop` bracket the tracking view's lifetime — the poll timer
/// and countdown timer only run in between, and `stop` cancels both so no
/// state mutation can land afterwards.
pub struct OrderTrackingWorker {
    inner: Arc<WorkerInner>,
    tasks: Mutex<Option<WorkerTasks>>,
}

impl OrderTrackingWorker {
    pub fn new(gateway: AuthGateway, config: OrderTrackingConfig) -> Self {
        Self {
            inner: Arc::new(WorkerInner {
                gateway,
                config,
                state: RwLock::new(TrackerState::default()),
            }),
            tasks: Mutex::new(None),
        }
    }

    /// Start both timers. The poll timer fires immediately and then every
    /// `poll_interval`; the countdown timer ticks every `countdown_tick`.
    /// No-op when already started.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock().expect("lock poisoned");
        if tasks.is_some() {
            debug!("Tracking worker already started");
            return;
        }
        info!(
            poll_interval_ms = self.inner.config.poll_interval.as_millis() as u64,
            "Starting order tracking worker"
        );

        let poll_inner = self.inner.clone();
        let poll = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_inner.config.poll_interval);
            loop {
                ticker.tick().await;
                poll_inner.poll_once().await;
            }
        });

        let countdown_inner = self.inner.clone();
        let countdown = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(countdown_inner.config.countdown_tick);
            // The first tick of an interval is immediate; skip it so the
            // countdown decrements only after a full tick has elapsed.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                countdown_inner.state.write().await.tick_countdown();
            }
        });

        *tasks = Some(WorkerTasks { poll, countdown });
    }

    /// Cancel both timers. Safe to call when not started.
    pub fn stop(&self) {
        if let Some(tasks) = self.tasks.lock().expect("lock poisoned").take() {
            info!("Stopping order tracking worker");
            tasks.poll.abort();
            tasks.countdown.abort();
        }
    }

    /// Clone of the current tracker state.
    pub async fn snapshot(&self) -> TrackerState {
        self.inner.state.read().await.clone()
    }

    /// Force an immediate fetch outside the poll cadence (pull-to-refresh,
    /// app foregrounding). Runs even while polling is disabled.
    pub async fn refresh_now(&self) {
        self.inner.fetch_and_apply().await;
    }

    /// Dismiss the current order; only honored for a delivered order.
    /// Returns whether the dismissal took effect.
    pub async fn dismiss(&self) -> bool {
        self.inner.state.write().await.dismiss()
    }

    /// Clear any dismissal and re-enable polling, then fetch immediately.
    pub async fn resume(&self) {
        self.inner.state.write().await.resume();
        self.inner.fetch_and_apply().await;
    }

    /// Submit a tip for an order. The amount is validated locally before
    /// any network traffic; on success the next poll picks up the updated
    /// snapshot.
    pub async fn add_tip(&self, order_id: &str, amount: u32) -> TrackingResult<()> {
        if amount == 0 || amount > self.inner.config.max_tip_amount {
            return Err(TrackingError::InvalidTip(amount));
        }

        let url = self
            .inner
            .gateway
            .url_for(&format!("/orders/{}/add-tip", order_id));
        let response = self
            .inner
            .gateway
            .authenticated_request(
                Method::Post,
                &url,
                &[],
                Some(json!({ "tip_amount": amount, "order_id": order_id })),
            )
            .await?;

        if !response.is_success() {
            return Err(TrackingError::Api {
                status: response.status,
                message: response.text(),
            });
        }
        info!(order_id = %order_id, amount = amount, "Tip submitted");
        Ok(())
    }

    /// Rate the delivery partner for an order. Rating must be 1..=5,
    /// checked locally before any network traffic.
    pub async fn rate_partner(&self, order_id: &str, rating: u8) -> TrackingResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(TrackingError::InvalidRating(rating));
        }

        let url = self
            .inner
            .gateway
            .url_for(&format!("/orders/{}/rate-partner", order_id));
        let response = self
            .inner
            .gateway
            .authenticated_request(
                Method::Post,
                &url,
                &[],
                Some(json!({ "partner_rating": rating, "order_id": order_id })),
            )
            .await?;

        if !response.is_success() {
            return Err(TrackingError::Api {
                status: response.status,
                message: response.text(),
            });
        }
        info!(order_id = %order_id, rating = rating, "Partner rated");
        Ok(())
    }
}

impl Drop for OrderTrackingWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl WorkerInner {
    /// One scheduled poll. Skipped entirely while polling is disabled.
    async fn poll_once(&self) {
        if !self.state.read().await.polling_enabled {
            debug!("Polling disabled, skipping tick");
            return;
        }
        self.fetch_and_apply().await;
    }

    /// Fetch the active order and fold the outcome into state. A transport
    /// error is recorded like a failed status: the stale order stays
    /// visible and the next tick runs regardless.
    async fn fetch_and_apply(&self) {
        match self.fetch_active_order().await {
            Ok(outcome) => {
                self.state
                    .write()
                    .await
                    .apply_fetch_outcome(outcome, &self.config, Utc::now());
            }
            Err(e) => {
                warn!(error = %e, "Active order fetch failed");
                self.state.write().await.error = Some(e.to_string());
            }
        }
    }

    async fn fetch_active_order(&self) -> TrackingResult<FetchOutcome> {
        let url = self.gateway.url_for(ACTIVE_ORDER_PATH);
        let response = self
            .gateway
            .authenticated_request(Method::Get, &url, &[], None)
            .await?;
        Self::classify(response)
    }

    fn classify(response: ApiResponse) -> TrackingResult<FetchOutcome> {
        match response.status {
            404 => Ok(FetchOutcome::NotFound),
            401 => Ok(FetchOutcome::Unauthorized),
            status if !(200..300).contains(&status) => Ok(FetchOutcome::Failed { status }),
            _ if response.is_empty_body() => Ok(FetchOutcome::Empty),
            _ => {
                let order: Order = response.json()?;
                Ok(FetchOutcome::Snapshot(order))
            }
        }
    }
}

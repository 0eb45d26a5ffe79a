//! # OrderTrackingWorker: live active-order synchronization
//!
//! The tracking worker keeps a near-real-time view of the user's single
//! active order by polling the backend through the authenticated gateway,
//! and derives a locally smooth delivery countdown from server timestamps.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────────┐     ┌──────────────┐
//! │   Backend    │◀────│ OrderTrackingWorker │◀────│ Presentation │
//! │ /orders/...  │     │  (poll + countdown  │     │  (read-only  │
//! └──────────────┘     │   + dismissal)      │     │   snapshot)  │
//!         ▲            └──────────┬──────────┘     └──────────────┘
//!         │                       │
//!  ┌──────┴──────┐         ┌──────▼──────┐
//!  │ AuthGateway │         │ TrackerState│
//!  │ (bearer +   │         │ (order, err,│
//!  │  refresh)   │         │  countdown) │
//!  └─────────────┘         └─────────────┘
//! ```
//!
//! ## Key behaviors
//!
//! - **Polling**: fixed 10 s interval, plus an immediate fetch on start.
//!   Every fetched snapshot replaces the order wholesale; there is no merge.
//!
//! - **Stale-but-displayed**: a failed poll records an error and keeps the
//!   last-known order visible; the next tick still runs.
//!
//! - **Dismissal**: a delivered order the user dismissed stays hidden until
//!   a different order id shows up, which clears the dismissal.
//!
//! - **Countdown**: the remaining-time baseline is computed once per order
//!   id when it enters `assigned`/`out_for_delivery` and then ticks down
//!   locally at 1 Hz — later polls never rewrite it, so noisy server
//!   estimates cannot make the timer jump.
//!
//! ## Lifecycle
//!
//! 1. Create with [`OrderTrackingWorker::new()`]
//! 2. Call [`OrderTrackingWorker::start()`] when the tracking view mounts
//! 3. Read state via [`OrderTrackingWorker::snapshot()`]
//! 4. Call [`OrderTrackingWorker::stop()`] on teardown — both timers are
//!    cancelled, nothing mutates state afterwards

mod config;
mod countdown;
mod error;
mod state;
mod worker;

pub use config::OrderTrackingConfig;
pub use countdown::{format_remaining, CountdownState};
pub use error::{TrackingError, TrackingResult};
pub use state::{FetchOutcome, TrackerState};
pub use worker::OrderTrackingWorker;

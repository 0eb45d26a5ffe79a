//! Authenticated HTTP gateway for the Swiftbite client.
//!
//! This crate provides:
//! - Bearer-token injection for every outbound REST call
//! - Transparent refresh-and-retry-once on 401 responses
//! - Single-flight token refresh (concurrent 401s share one refresh call)
//! - Session attach/detach lifecycle with a logout callback on hard failure
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │   Callers    │────▶│   AuthGateway   │────▶│   Backend   │
//! │ (tracking,   │     │ (bearer inject, │     │   (REST)    │
//! │  side ops)   │     │  401 → refresh) │     └─────────────┘
//! └──────────────┘     └────────┬────────┘
//!                               │
//!                        ┌──────▼──────┐
//!                        │   Session   │
//!                        │  (tokens)   │
//!                        └─────────────┘
//! ```
//!
//! The gateway is the sole mutator of the access token after login; every
//! other component only reads it through the shared [`SessionHandle`].

mod config;
mod error;
mod gateway;
mod session;
mod transport;

pub use config::ApiConfig;
pub use error::{AuthError, AuthResult};
pub use gateway::{AuthGateway, LogoutCallback};
pub use session::{Session, SessionHandle};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestExecutor, RequestExecutor};

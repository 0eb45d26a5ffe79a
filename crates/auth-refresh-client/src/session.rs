//! In-memory session token state.
//!
//! Tokens live in process memory only; persistence and the login/logout
//! lifecycle belong to the embedding application. The gateway takes a
//! [`SessionHandle`] via `attach_session` rather than reading a global,
//! so independent gateways can carry independent sessions.

use std::sync::{Arc, RwLock};

/// Bearer credentials for one authenticated session.
///
/// The gateway is the only component that writes `access_token` after
/// login (on a successful refresh); `refresh_token` is written only by the
/// login flow and cleared on teardown.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Short-lived access credential sent with each request.
    pub access_token: Option<String>,
    /// Long-lived credential used to mint new access tokens.
    pub refresh_token: Option<String>,
}

impl Session {
    /// Create a session from freshly issued tokens.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// Wrap the session in a shareable handle.
    pub fn into_handle(self) -> SessionHandle {
        Arc::new(RwLock::new(self))
    }

    /// Drop both tokens (logout / hard refresh failure).
    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
    }
}

/// Shared, mutable session reference.
///
/// Lock scope is always short and never held across an await.
pub type SessionHandle = Arc<RwLock<Session>>;

//! The authenticated request gateway.
//!
//! Every REST call the client makes goes through [`AuthGateway`], which
//! injects the bearer token, detects expiry (401), refreshes the token with
//! single-flight deduplication, and retries the original request exactly
//! once. The refresh state machine is deliberately small:
//!
//! ```text
//! Idle ──401──▶ Refreshing ──success/soft failure──▶ Idle
//!                    │
//!                    └──401/403 from refresh endpoint──▶ LoggedOut
//! ```
//!
//! Refresh is reactive only — the gateway never refreshes preemptively.

use crate::config::ApiConfig;
use crate::error::{AuthError, AuthResult};
use crate::session::SessionHandle;
use crate::transport::{ApiRequest, ApiResponse, Method, RequestExecutor};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

/// Callback invoked when the refresh token itself is rejected and the
/// session has been torn down. Typically routes to the app's logout flow.
pub type LogoutCallback = Box<dyn Fn() + Send + Sync>;

/// Refresh endpoint request body.
#[derive(Debug, Serialize)]
struct RefreshRequest {
    refresh_token: String,
}

/// Refresh endpoint success body.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Pending refresh shared by all concurrent callers.
type InflightRefresh = Shared<BoxFuture<'static, Option<String>>>;

struct Inner {
    executor: Arc<dyn RequestExecutor>,
    config: ApiConfig,
    /// Attached session, if any. `None` until `attach_session`.
    session: RwLock<Option<SessionHandle>>,
    /// In-flight refresh marker. Exactly one refresh is on the wire while
    /// this is `Some`; cleared on completion regardless of outcome.
    inflight: Mutex<Option<InflightRefresh>>,
    logout_callback: Mutex<Option<LogoutCallback>>,
}

/// Authenticated HTTP gateway.
///
/// Cheap to clone; clones share the same session, in-flight refresh state,
/// and executor.
#[derive(Clone)]
pub struct AuthGateway {
    inner: Arc<Inner>,
}

impl AuthGateway {
    /// Create a gateway over the given transport and backend config.
    pub fn new(executor: Arc<dyn RequestExecutor>, config: ApiConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                executor,
                config,
                session: RwLock::new(None),
                inflight: Mutex::new(None),
                logout_callback: Mutex::new(None),
            }),
        }
    }

    /// Attach the session this gateway authenticates with.
    ///
    /// Called by the login lifecycle. Until a session is attached, every
    /// authenticated call fails with [`AuthError::NotInitialized`].
    pub fn attach_session(&self, session: SessionHandle) {
        *self.inner.session.write().expect("lock poisoned") = Some(session);
    }

    /// Detach the current session (logout lifecycle).
    pub fn detach_session(&self) {
        *self.inner.session.write().expect("lock poisoned") = None;
    }

    /// Set a callback fired when the refresh token is rejected and the
    /// session is torn down.
    pub fn set_logout_callback(&self, callback: LogoutCallback) {
        *self.inner.logout_callback.lock().expect("lock poisoned") = Some(callback);
    }

    /// Absolute URL for an endpoint path on the configured backend.
    pub fn url_for(&self, path: &str) -> String {
        self.inner.config.url_for(path)
    }

    /// Perform an authenticated request.
    ///
    /// Injects `Authorization: Bearer <token>` and
    /// `Content-Type: application/json`, merging `headers` first — caller
    /// headers cannot override the bearer token.
    ///
    /// Any non-401 response is returned verbatim, success or not. A 401
    /// triggers the refresh protocol; with a new token the request is
    /// re-issued exactly once and that second response is returned whatever
    /// its status. If refresh yields no token the original 401 comes back.
    pub async fn authenticated_request(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> AuthResult<ApiResponse> {
        let session = self
            .inner
            .session
            .read()
            .expect("lock poisoned")
            .clone()
            .ok_or(AuthError::NotInitialized)?;

        let token = session
            .read()
            .expect("lock poisoned")
            .access_token
            .clone()
            .unwrap_or_default();

        let first = self.issue(method, url, headers, body.clone(), &token).await?;
        if first.status != 401 {
            return Ok(first);
        }

        debug!(url = %url, "Request unauthorized, invoking token refresh");
        match self.refresh_access_token().await {
            Some(new_token) => {
                // One retry only; the second response stands whatever it is.
                self.issue(method, url, headers, body, &new_token).await
            }
            None => Ok(first),
        }
    }

    /// Refresh the access token, deduplicating concurrent attempts.
    ///
    /// All callers that arrive while a refresh is pending attach to the same
    /// in-flight result; at most one refresh request is on the wire at any
    /// time. Returns the new access token, or `None` on any failure (the
    /// hard-failure path has already torn the session down by then).
    pub async fn refresh_access_token(&self) -> Option<String> {
        let pending = {
            let mut slot = self.inner.inflight.lock().expect("lock poisoned");
            if let Some(existing) = slot.as_ref() {
                debug!("Refresh already in flight, attaching to pending result");
                existing.clone()
            } else {
                let inner = self.inner.clone();
                let fut = async move {
                    let result = inner.perform_refresh().await;
                    // Clear the marker so a later 401 can start a fresh
                    // attempt; waiters already hold their own handle.
                    inner.inflight.lock().expect("lock poisoned").take();
                    result
                }
                .boxed()
                .shared();
                *slot = Some(fut.clone());
                fut
            }
        };

        pending.await
    }

    async fn issue(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<serde_json::Value>,
        token: &str,
    ) -> AuthResult<ApiResponse> {
        let mut merged: Vec<(String, String)> = headers
            .iter()
            .filter(|(name, _)| {
                !name.eq_ignore_ascii_case("authorization")
                    && !name.eq_ignore_ascii_case("content-type")
            })
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        merged.push(("Authorization".to_string(), format!("Bearer {}", token)));
        merged.push(("Content-Type".to_string(), "application/json".to_string()));

        self.inner
            .executor
            .execute(ApiRequest {
                method,
                url: url.to_string(),
                headers: merged,
                body,
            })
            .await
    }
}

impl Inner {
    /// Single refresh attempt against the refresh endpoint.
    async fn perform_refresh(&self) -> Option<String> {
        let session = self.session.read().expect("lock poisoned").clone()?;

        let refresh_token = session.read().expect("lock poisoned").refresh_token.clone();
        let Some(refresh_token) = refresh_token else {
            debug!("No refresh token available, skipping refresh");
            return None;
        };

        let request = ApiRequest {
            method: Method::Post,
            url: self.config.refresh_url(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: serde_json::to_value(RefreshRequest { refresh_token }).ok(),
        };

        let response = match self.executor.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh transport failure, session untouched");
                return None;
            }
        };

        match response.status {
            status if (200..300).contains(&status) => match response.json::<RefreshResponse>() {
                Ok(data) => {
                    session.write().expect("lock poisoned").access_token =
                        Some(data.access_token.clone());
                    info!("Access token refreshed");
                    Some(data.access_token)
                }
                Err(e) => {
                    warn!(error = %e, "Refresh response body malformed, session untouched");
                    None
                }
            },
            status @ (401 | 403) => {
                warn!(status = status, "Refresh token rejected, tearing down session");
                session.write().expect("lock poisoned").clear();
                if let Some(callback) = self.logout_callback.lock().expect("lock poisoned").as_ref()
                {
                    callback();
                }
                None
            }
            status => {
                warn!(
                    status = status,
                    "Token refresh failed transiently, session untouched"
                );
                None
            }
        }
    }
}

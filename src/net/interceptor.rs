//! Bearer attachment with refresh-and-retry on 401.
//!
//! Every API call goes through [`AuthInterceptor::execute`]. A 401 on a request
//! that carried a token triggers at most one refresh for that request; while a
//! refresh is in flight, every other failing request joins it instead of
//! starting its own (see [`AuthContext::refresh`]).

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod interceptor_test;

use std::rc::Rc;

use super::error::ClientError;
use super::http::{HttpRequest, HttpResponse, Transport};
use crate::state::auth::AuthContext;

#[derive(Clone)]
pub struct AuthInterceptor {
    auth: AuthContext,
    transport: Rc<dyn Transport>,
    on_auth_failure: Option<Rc<dyn Fn()>>,
}

impl AuthInterceptor {
    #[must_use]
    pub fn new(auth: AuthContext, transport: Rc<dyn Transport>) -> Self {
        Self { auth, transport, on_auth_failure: None }
    }

    /// Register the callback run when a refresh fails for a request, typically
    /// a redirect to the login view.
    #[must_use]
    pub fn with_failure_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_auth_failure = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// Send `request` with the current access token, refreshing and retrying
    /// once on 401. Non-401 responses are returned as-is for the caller to map.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Network`] from the transport
    /// - [`ClientError::NotAuthenticated`] for a 401 without a session, or a 401 on the retry
    /// - [`ClientError::RefreshFailed`] when the refresh itself fails
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let request = request.with_bearer(self.auth.access_token().as_deref());
        let resp = self.transport.send(request.clone()).await?;
        if resp.status != 401 {
            return Ok(resp);
        }
        let Some(sent_with) = request.bearer().map(str::to_owned) else {
            return Err(ClientError::NotAuthenticated);
        };

        let token = match self.auth.access_token() {
            Some(current) if current != sent_with => {
                log::debug!("access token changed while {} was in flight; retrying", request.url);
                current
            }
            _ => match self.auth.refresh().await {
                Ok(token) => token,
                Err(err @ ClientError::RefreshFailed(_)) => {
                    log::warn!("giving up on {}: {err}", request.url);
                    if let Some(callback) = &self.on_auth_failure {
                        callback();
                    }
                    return Err(err);
                }
                Err(err) => return Err(err),
            },
        };

        let url = request.url.clone();
        let retry = self.transport.send(request.with_bearer(Some(&token))).await?;
        if retry.status == 401 {
            log::warn!("retry of {url} rejected after refresh");
            return Err(ClientError::NotAuthenticated);
        }
        Ok(retry)
    }
}

//! Auth context: the single writer of session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `AuthContext` exists per browser tab. It is a cheap `Rc` handle that the
//! root component builds and injects into the interceptor, the API service, and
//! (via Leptos context) every page. Pages read the session; only this module
//! mutates it or the token store.
//!
//! CONCURRENCY
//! ===========
//! Everything runs on the single browser event loop. No `RefCell` borrow is held
//! across an `.await`. Concurrent refresh requests share one in-flight future, and
//! a session epoch guards against a slow refresh resurrecting a session that was
//! logged out (or replaced) while it was in flight.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use super::events::{AuthEvent, AuthEventBus, Subscription};
use super::session::{AuthPhase, Session};
use super::token_store::{StoredTokens, TokenKey, TokenStore};
use crate::config::ClientConfig;
use crate::net::api::{LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH};
use crate::net::error::ClientError;
use crate::net::http::{HttpRequest, Method, Transport};
use crate::net::types::{LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse, Role, UserInfo};
use crate::util::jwt;

/// Refresh outcome shared by every caller that asked while it was in flight.
pub type RefreshFuture = Shared<LocalBoxFuture<'static, Result<String, ClientError>>>;

#[derive(Clone)]
pub struct AuthContext {
    inner: Rc<AuthInner>,
}

struct AuthInner {
    config: ClientConfig,
    transport: Rc<dyn Transport>,
    store: TokenStore,
    events: AuthEventBus,
    session: RefCell<Session>,
    /// Bumped on every login and logout.
    epoch: Cell<u64>,
    inflight_refresh: RefCell<Option<(u64, RefreshFuture)>>,
}

impl AuthContext {
    /// Build the context and take the storage fast path: both tokens plus a
    /// user snapshot in storage restore an authenticated session without
    /// contacting the backend.
    #[must_use]
    pub fn new(config: ClientConfig, transport: Rc<dyn Transport>, store: TokenStore, events: AuthEventBus) -> Self {
        let session = restore_session(&store);
        if session.is_authenticated() {
            log::info!("restored session from storage");
        }
        Self {
            inner: Rc::new(AuthInner {
                config,
                transport,
                store,
                events,
                session: RefCell::new(session),
                epoch: Cell::new(0),
                inflight_refresh: RefCell::new(None),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn events(&self) -> &AuthEventBus {
        &self.inner.events
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.inner.session.borrow().phase
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.session.borrow().is_authenticated()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.inner.session.borrow().access_token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserInfo> {
        self.inner.session.borrow().user.clone()
    }

    #[must_use]
    pub fn user_role(&self) -> Option<Role> {
        self.inner.session.borrow().role()
    }

    /// Call `on_change` with a fresh snapshot after every phase transition.
    /// An `Err` from `on_change` is logged by the event bus.
    ///
    /// The subscription holds only a weak reference to the context.
    pub fn watch<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(Session) -> Result<(), ClientError> + 'static,
    {
        let weak = Rc::downgrade(&self.inner);
        self.inner.events.subscribe(move |event| {
            if !matches!(event, AuthEvent::PhaseChanged { .. }) {
                return Ok(());
            }
            match weak.upgrade() {
                Some(inner) => {
                    let snapshot = inner.session.borrow().clone();
                    on_change(snapshot)
                }
                None => Ok(()),
            }
        })
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] for a blank identifier or password (state unchanged)
    /// - [`ClientError::LoginInProgress`] while another login is running (state unchanged)
    /// - [`ClientError::InvalidCredentials`] / [`ClientError::Network`] and others from the
    ///   backend; the session moves to `FAILED` and nothing is persisted
    pub async fn login(&self, identifier: &str, password: &str) -> Result<UserInfo, ClientError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(ClientError::Validation("Please enter your username or email and password.".to_owned()));
        }
        self.transition(Session::begin_login)?;
        self.bump_epoch();
        self.inner.store.clear();
        log::info!("login attempt for {identifier}");

        match self.request_login(identifier, password).await {
            Ok(resp) => {
                let tokens = StoredTokens { access_token: resp.access_token, refresh_token: resp.refresh_token };
                self.inner.store.save(&tokens);
                self.inner.store.save_user(&resp.user);
                let user = resp.user;
                let snapshot = user.clone();
                self.transition(|s| s.complete_login(tokens, snapshot));
                log::info!("logged in as {} ({})", user.username, user.role.label());
                self.inner.events.publish(&AuthEvent::LoggedIn { user: user.clone() });
                Ok(user)
            }
            Err(err) => {
                log::warn!("login failed: {err}");
                self.transition(|s| s.fail_login(err.login_message()));
                Err(err)
            }
        }
    }

    /// End the session. Always clears storage; a no-op beyond that when
    /// already anonymous. The backend is told best-effort to blacklist the
    /// refresh token.
    pub async fn logout(&self) {
        let (was_active, access, refresh) = {
            let s = self.inner.session.borrow();
            (s.phase != AuthPhase::Anonymous, s.access_token.clone(), s.refresh_token.clone())
        };
        self.end_session();
        if !was_active {
            return;
        }
        log::info!("logged out");
        self.inner.events.publish(&AuthEvent::LoggedOut);

        if let Some(refresh) = refresh {
            if let Err(err) = self.notify_logout(access.as_deref(), &refresh).await {
                log::debug!("backend logout notification failed: {err}");
            }
        }
    }

    /// Obtain a new access token.
    ///
    /// Concurrent calls for the same session share one request. On failure the
    /// session is cleared and a single [`AuthEvent::AuthError`] is published.
    pub fn refresh(&self) -> RefreshFuture {
        let epoch = self.inner.epoch.get();
        {
            let slot = self.inner.inflight_refresh.borrow();
            if let Some((slot_epoch, pending)) = slot.as_ref() {
                if *slot_epoch == epoch {
                    log::debug!("joining in-flight token refresh");
                    return pending.clone();
                }
            }
        }

        let ctx = self.clone();
        let pending = async move {
            let result = ctx.run_refresh(epoch).await;
            let mut slot = ctx.inner.inflight_refresh.borrow_mut();
            if slot.as_ref().is_some_and(|(slot_epoch, _)| *slot_epoch == epoch) {
                *slot = None;
            }
            result
        }
        .boxed_local()
        .shared();
        *self.inner.inflight_refresh.borrow_mut() = Some((epoch, pending.clone()));
        pending
    }

    /// Start a refresh when the access token expires within the configured
    /// skew of `now_secs`. Returns `None` when no refresh is due.
    #[must_use]
    pub fn refresh_if_expiring(&self, now_secs: u64) -> Option<RefreshFuture> {
        let due = {
            let s = self.inner.session.borrow();
            s.phase == AuthPhase::Authenticated
                && s.access_token
                    .as_deref()
                    .is_some_and(|token| jwt::expires_within(token, now_secs, self.inner.config.refresh_skew_secs))
        };
        if due {
            log::debug!("access token near expiry; refreshing proactively");
            Some(self.refresh())
        } else {
            None
        }
    }

    async fn run_refresh(&self, epoch: u64) -> Result<String, ClientError> {
        let refresh_token = self.inner.session.borrow().refresh_token.clone();
        let Some(refresh_token) = refresh_token else {
            return Err(ClientError::NotAuthenticated);
        };
        if !self.transition(Session::begin_refresh) {
            return Err(ClientError::NotAuthenticated);
        }

        let outcome = self.request_refresh(&refresh_token).await;
        if self.inner.epoch.get() != epoch {
            log::info!("discarding refresh result for a superseded session");
            return Err(ClientError::NotAuthenticated);
        }

        match outcome {
            Ok(resp) => {
                self.inner.store.set(TokenKey::Access, &resp.access_token);
                if let Some(rotated) = &resp.refresh_token {
                    self.inner.store.set(TokenKey::Refresh, rotated);
                }
                let token = resp.access_token.clone();
                self.transition(|s| s.complete_refresh(resp.access_token, resp.refresh_token));
                log::info!("access token refreshed");
                self.inner.events.publish(&AuthEvent::TokenRefreshed { token: token.clone() });
                Ok(token)
            }
            Err(err) => {
                let reason = match err {
                    ClientError::RefreshFailed(reason) => reason,
                    other => other.to_string(),
                };
                log::warn!("token refresh failed: {reason}");
                self.end_session();
                self.inner.events.publish(&AuthEvent::AuthError { reason: reason.clone() });
                Err(ClientError::RefreshFailed(reason))
            }
        }
    }

    async fn request_login(&self, identifier: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let request = HttpRequest::new(Method::Post, self.inner.config.url(LOGIN_PATH))
            .json(&LoginRequest { identifier, password })?;
        let resp = self.inner.transport.send(request).await?;
        if resp.is_success() {
            return resp.json();
        }
        match resp.status {
            400 | 401 => Err(ClientError::InvalidCredentials),
            _ => Err(resp.into_error("Account")),
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let request = HttpRequest::new(Method::Post, self.inner.config.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })?;
        let resp = self.inner.transport.send(request).await?;
        if resp.is_success() {
            return resp.json();
        }
        Err(ClientError::RefreshFailed(format!("refresh rejected with status {}", resp.status)))
    }

    async fn notify_logout(&self, access: Option<&str>, refresh: &str) -> Result<(), ClientError> {
        let request = HttpRequest::new(Method::Post, self.inner.config.url(LOGOUT_PATH))
            .json(&LogoutRequest { refresh })?
            .with_bearer(access);
        let resp = self.inner.transport.send(request).await?;
        if resp.is_success() { Ok(()) } else { Err(resp.into_error("Session")) }
    }

    fn end_session(&self) {
        self.bump_epoch();
        self.inner.store.clear();
        self.transition(Session::clear);
    }

    fn bump_epoch(&self) {
        self.inner.epoch.set(self.inner.epoch.get().wrapping_add(1));
    }

    /// Apply a state-machine step and publish the phase change, if any, after
    /// the borrow is released.
    fn transition<R>(&self, step: impl FnOnce(&mut Session) -> R) -> R {
        let (from, to, out) = {
            let mut session = self.inner.session.borrow_mut();
            let from = session.phase;
            let out = step(&mut session);
            (from, session.phase, out)
        };
        if from != to {
            log::debug!("auth phase {from:?} -> {to:?}");
            self.inner.events.publish(&AuthEvent::PhaseChanged { from, to });
        }
        out
    }
}

fn restore_session(store: &TokenStore) -> Session {
    match (store.load(), store.load_user()) {
        (Some(tokens), Some(user)) => Session::restored(tokens, user),
        (Some(_), None) => {
            log::warn!("stored tokens without a user snapshot; starting anonymous");
            store.clear();
            Session::default()
        }
        (None, Some(_)) => {
            store.clear();
            Session::default()
        }
        (None, None) => Session::default(),
    }
}

//! Session state machine.
//!
//! ```text
//! ANONYMOUS ──login──▶ AUTHENTICATING ──ok──▶ AUTHENTICATED ──401/expiry──▶ REFRESHING
//!     ▲                     │                     │    ▲                        │
//!     │                     └──rejected──▶ FAILED │    └────────refreshed───────┘
//!     └──────────────logout / refresh failed──────┴─────────────────────────────┘
//! ```
//!
//! Transitions are pure methods on [`Session`]; the auth context performs the
//! I/O around them and publishes the resulting phase changes. `FAILED` behaves
//! like `ANONYMOUS` for the purpose of starting a new login.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::error::ClientError;
use crate::net::types::{Role, UserInfo};

use super::token_store::StoredTokens;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthPhase {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    Refreshing,
    Failed,
}

/// Current authentication state. Owned by the auth context.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub phase: AuthPhase,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserInfo>,
    /// User-visible message from the last failed login.
    pub error: Option<String>,
}

impl Session {
    /// Fast-path session rebuilt from storage without contacting the backend.
    #[must_use]
    pub fn restored(tokens: StoredTokens, user: UserInfo) -> Self {
        Self {
            phase: AuthPhase::Authenticated,
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            user: Some(user),
            error: None,
        }
    }

    /// Authenticated means a usable credential and a known user. `REFRESHING`
    /// counts: the session is still valid while a new token is fetched.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, AuthPhase::Authenticated | AuthPhase::Refreshing)
            && self.user.is_some()
            && self.access_token.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        if self.is_authenticated() { self.user.as_ref().map(|u| u.role) } else { None }
    }

    /// `ANONYMOUS`/`FAILED → AUTHENTICATING`.
    ///
    /// # Errors
    ///
    /// [`ClientError::LoginInProgress`] while a login is already running.
    pub fn begin_login(&mut self) -> Result<AuthPhase, ClientError> {
        if self.phase == AuthPhase::Authenticating {
            return Err(ClientError::LoginInProgress);
        }
        let from = self.phase;
        *self = Self { phase: AuthPhase::Authenticating, ..Self::default() };
        Ok(from)
    }

    /// `AUTHENTICATING → AUTHENTICATED`.
    pub fn complete_login(&mut self, tokens: StoredTokens, user: UserInfo) {
        *self = Self::restored(tokens, user);
    }

    /// `AUTHENTICATING → FAILED`. The session stays empty.
    pub fn fail_login(&mut self, message: String) {
        *self = Self { phase: AuthPhase::Failed, error: Some(message), ..Self::default() };
    }

    /// `AUTHENTICATED → REFRESHING`. Returns false when there is no session to refresh.
    pub fn begin_refresh(&mut self) -> bool {
        match self.phase {
            AuthPhase::Authenticated => {
                self.phase = AuthPhase::Refreshing;
                true
            }
            AuthPhase::Refreshing => true,
            _ => false,
        }
    }

    /// `REFRESHING → AUTHENTICATED` with the new access token (and rotated refresh token).
    pub fn complete_refresh(&mut self, access_token: String, refresh_token: Option<String>) {
        self.phase = AuthPhase::Authenticated;
        self.access_token = Some(access_token);
        if let Some(refresh) = refresh_token {
            self.refresh_token = Some(refresh);
        }
    }

    /// Back to `ANONYMOUS`; used by logout and by a failed refresh.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

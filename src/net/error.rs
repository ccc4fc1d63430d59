//! Client error taxonomy shared by auth, API, and page layers.
//!
//! ERROR HANDLING
//! ==============
//! Errors are `Clone` so one refresh outcome can be handed to every request
//! waiting on it. Pages never render `Display` directly; they render
//! [`ClientError::user_message`], which is phrased for the login form and the
//! inline alert banners.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The backend rejected the identifier/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The request never produced an HTTP response.
    #[error("network failure: {0}")]
    Network(String),

    /// A protected call was answered with 401 while a token was attached.
    #[error("access token expired")]
    TokenExpired,

    /// The refresh endpoint rejected the refresh token or was unreachable.
    /// Fatal to the session.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// No usable session exists for a call that needs one.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Form-level or backend 400 validation failure.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The session is valid but lacks permission (HTTP 403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// `login` was called while another login is still in flight.
    #[error("a login is already in progress")]
    LoginInProgress,

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// An auth event subscriber could not apply an event.
    #[error("auth event subscriber failed: {0}")]
    Subscriber(String),

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Text shown inline to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid username or password.".to_owned(),
            Self::Network(_) => "Unable to reach the server. Check your connection and try again.".to_owned(),
            Self::TokenExpired | Self::RefreshFailed(_) => "Your session has expired. Please log in again.".to_owned(),
            Self::NotAuthenticated => "You need to log in to continue.".to_owned(),
            Self::Validation(msg) | Self::Forbidden(msg) => msg.clone(),
            Self::NotFound(what) => format!("{what} not found."),
            Self::LoginInProgress => "Login already in progress.".to_owned(),
            Self::Http { status, message } => format!("Request failed ({status}): {message}"),
            Self::Decode(_) => "The server sent an unexpected response.".to_owned(),
            Self::Subscriber(_) => "Something went wrong. Please reload the page.".to_owned(),
        }
    }

    /// Message rendered by the login form. Always starts with `Login Failed`.
    #[must_use]
    pub fn login_message(&self) -> String {
        format!("Login Failed: {}", self.user_message())
    }
}

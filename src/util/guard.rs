//! Protected-route decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected view applies the same rule, computed here from the session
//! snapshot alone. Raw token storage is never consulted: the auth context
//! owns the session and is the only source of truth.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::routes::AppRoute;
use crate::state::session::Session;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/dashboard";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Not authenticated; go to the login view carrying the requested path.
    Login(String),
    /// Authenticated but the role may not see this view.
    Home,
}

impl GuardDecision {
    /// Where to navigate, or `None` to render the view.
    #[must_use]
    pub fn redirect_target(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::Login(target) => Some(target.clone()),
            Self::Home => Some(HOME_PATH.to_owned()),
        }
    }
}

/// Decide whether `requested` (path plus query) may render for `session`.
/// Role requirements come from the route table.
#[must_use]
pub fn decide(requested: &str, session: &Session) -> GuardDecision {
    if !session.is_authenticated() {
        log::debug!("guard: unauthenticated request for {requested}");
        return GuardDecision::Login(login_redirect_path(requested));
    }
    let required_roles = AppRoute::parse(requested).map_or(&[][..], |route| route.required_roles());
    match session.role() {
        Some(role) if required_roles.is_empty() || required_roles.contains(&role) => GuardDecision::Allow,
        role => {
            log::info!("guard: role {role:?} may not open {requested}");
            GuardDecision::Home
        }
    }
}

/// `/login?next=<encoded>`; the bare login path when nothing useful was requested.
#[must_use]
pub fn login_redirect_path(requested: &str) -> String {
    let worth_returning = AppRoute::parse(requested).is_some_and(|route| route.is_protected());
    if worth_returning {
        format!("{LOGIN_PATH}?next={}", urlencoding::encode(requested))
    } else {
        LOGIN_PATH.to_owned()
    }
}

/// Where to land after a successful login. Only internal, protected paths
/// are honoured; anything else (external URLs, the login view itself,
/// unknown paths) falls back to the dashboard.
#[must_use]
pub fn post_login_target(next: Option<&str>) -> String {
    let Some(raw) = next.filter(|n| !n.is_empty()) else {
        return HOME_PATH.to_owned();
    };
    let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), std::borrow::Cow::into_owned);
    let internal = decoded.starts_with('/') && !decoded.starts_with("//");
    if internal && AppRoute::parse(&decoded).is_some_and(|route| route.is_protected()) {
        decoded
    } else {
        HOME_PATH.to_owned()
    }
}

/// Join router location parts into the path-plus-query form used above.
#[must_use]
pub fn requested_path(pathname: &str, search: &str) -> String {
    let search = search.trim_start_matches('?');
    if search.is_empty() { pathname.to_owned() } else { format!("{pathname}?{search}") }
}

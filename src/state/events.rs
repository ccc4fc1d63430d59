//! Publish/subscribe channel for auth lifecycle events.
//!
//! DESIGN
//! ======
//! Delivery is synchronous and in subscription order. Publishing iterates a
//! snapshot of the handler list, so a handler may subscribe or unsubscribe
//! while an event is being delivered. Handlers report failure by returning
//! `Err`; the error is logged and later handlers still receive the event.
//! Panics are also caught, but only where unwinding exists (host builds);
//! on `wasm32-unknown-unknown` a panic aborts, so handlers must not panic.
//! Nothing is buffered: an event published with no subscribers is dropped.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use super::session::AuthPhase;
use crate::net::error::ClientError;
use crate::net::types::UserInfo;

#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
    /// Every session state-machine transition.
    PhaseChanged { from: AuthPhase, to: AuthPhase },
    LoggedIn { user: UserInfo },
    LoggedOut,
    TokenRefreshed { token: String },
    /// The session was lost (refresh failed); listeners should send the user to login.
    AuthError { reason: String },
}

impl AuthEvent {
    /// Variant name for logs. Never includes the payload, so tokens stay out of the console.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PhaseChanged { .. } => "PhaseChanged",
            Self::LoggedIn { .. } => "LoggedIn",
            Self::LoggedOut => "LoggedOut",
            Self::TokenRefreshed { .. } => "TokenRefreshed",
            Self::AuthError { .. } => "AuthError",
        }
    }
}

type Handler = Rc<dyn Fn(&AuthEvent) -> Result<(), ClientError>>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

#[derive(Clone, Default)]
pub struct AuthEventBus {
    inner: Rc<RefCell<Subscribers>>,
}

impl AuthEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It stays registered until [`Subscription::unsubscribe`].
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&AuthEvent) -> Result<(), ClientError> + 'static,
    {
        let mut subs = self.inner.borrow_mut();
        let id = subs.next_id;
        subs.next_id += 1;
        subs.handlers.push((id, Rc::new(handler)));
        Subscription { id, bus: Rc::downgrade(&self.inner) }
    }

    /// Deliver `event` to every current subscriber. Returns how many handlers
    /// returned `Ok`.
    pub fn publish(&self, event: &AuthEvent) -> usize {
        let snapshot: Vec<Handler> = self.inner.borrow().handlers.iter().map(|(_, h)| h.clone()).collect();
        if snapshot.is_empty() {
            log::debug!("auth event {} dropped, no subscribers", event.kind());
            return 0;
        }
        let mut delivered = 0;
        for handler in snapshot {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => log::warn!("auth event {} handler failed: {err}; continuing delivery", event.kind()),
                Err(_) => log::warn!("auth event {} handler panicked; continuing delivery", event.kind()),
            }
        }
        delivered
    }
}

/// Handle returned by [`AuthEventBus::subscribe`].
#[must_use = "dropping a Subscription keeps the handler registered; call unsubscribe() to detach it"]
pub struct Subscription {
    id: u64,
    bus: Weak<RefCell<Subscribers>>,
}

impl Subscription {
    /// Detach the handler. A no-op if the bus is already gone.
    pub fn unsubscribe(self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.borrow_mut().handlers.retain(|(id, _)| *id != self.id);
        }
    }
}

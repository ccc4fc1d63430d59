//! Client state: the session, its persistence, and page-level view state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` is the only writer of `session` and `token_store`. Pages observe the
//! session through a signal mirror and keep their own view state (`courses`).

pub mod auth;
pub mod courses;
pub mod events;
pub mod session;
pub mod token_store;

//! Utility helpers shared across pages and components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure routing and token logic lives here so it can be tested without a
//! browser; `fetch` is the one module that touches the reactive owner.

pub mod fetch;
pub mod guard;
pub mod jwt;
pub mod routes;

//! Networking: the transport seam, the auth interceptor and the REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` defines request/response values and the `Transport` trait,
//! `interceptor` attaches tokens and recovers from 401s, `api` exposes typed
//! endpoints, and `types` defines the wire schema.

pub mod api;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod types;

#[cfg(test)]
#[path = "fake_backend_test.rs"]
pub(crate) mod fake_backend;

//! Reusable UI components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the session mirror and services from Leptos context; they
//! never write the session.

pub mod nav_bar;
pub mod require_auth;
pub mod status;

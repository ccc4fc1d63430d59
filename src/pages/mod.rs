//! Route-level page components.
//!
//! Each page owns its fetch state and a cancel scope tied to its reactive
//! owner. Pages write the session only through the auth context.

pub mod course_detail;
pub mod course_edit;
pub mod course_tasks;
pub mod courses;
pub mod dashboard;
pub mod instructor;
pub mod login;
pub mod profile;
pub mod progress_tracking;
pub mod register;

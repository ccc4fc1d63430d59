//! Application route table.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::net::types::Role;

/// Roles allowed into instructor-only views.
pub const COURSE_EDITORS: &[Role] = &[Role::Instructor, Role::Admin];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppRoute {
    /// `/`, which redirects to the dashboard.
    Root,
    Login,
    Register,
    Dashboard,
    Profile,
    Courses,
    CourseDetail(String),
    CourseEdit(String),
    CourseTasks(String),
    ProgressTracking(String),
    Instructor,
}

impl AppRoute {
    /// Parse a path, ignoring any query string, fragment or trailing slash.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let path = raw.split(['?', '#']).next().unwrap_or_default();
        if !path.starts_with('/') {
            return None;
        }
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Self::Root,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["profile"] => Self::Profile,
            ["courses"] => Self::Courses,
            ["courses", id] => Self::CourseDetail((*id).to_owned()),
            ["courses", id, "edit"] => Self::CourseEdit((*id).to_owned()),
            ["courses", id, "tasks"] => Self::CourseTasks((*id).to_owned()),
            ["progress-tracking", id] => Self::ProgressTracking((*id).to_owned()),
            ["instructor"] => Self::Instructor,
            _ => return None,
        };
        Some(route)
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Root => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::Profile => "/profile".to_owned(),
            Self::Courses => "/courses".to_owned(),
            Self::CourseDetail(id) => format!("/courses/{id}"),
            Self::CourseEdit(id) => format!("/courses/{id}/edit"),
            Self::CourseTasks(id) => format!("/courses/{id}/tasks"),
            Self::ProgressTracking(id) => format!("/progress-tracking/{id}"),
            Self::Instructor => "/instructor".to_owned(),
        }
    }

    /// Whether the view needs a session.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Root | Self::Login | Self::Register)
    }

    /// Roles allowed in; empty means any authenticated user.
    #[must_use]
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            Self::CourseEdit(_) | Self::Instructor => COURSE_EDITORS,
            _ => &[],
        }
    }
}

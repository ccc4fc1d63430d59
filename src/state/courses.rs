//! Course catalog view state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The courses page loads the catalog and the user's enrollments together and
//! merges them here. Enrollment is not optimistic: a listing only flips to
//! enrolled after the backend confirms, and a failure leaves every listing as
//! it was.

#[cfg(test)]
#[path = "courses_test.rs"]
mod courses_test;

use std::collections::HashMap;

use crate::net::error::ClientError;
use crate::net::types::{Course, Enrollment, EnrollmentStatus};

pub const ENROLL_FAILED_MESSAGE: &str = "Failed to enroll in the course. Please try again later.";
pub const ALREADY_ENROLLED_MESSAGE: &str = "You are already enrolled in this course.";

#[derive(Clone, Debug, PartialEq)]
pub struct CourseListing {
    pub course: Course,
    pub status: EnrollmentStatus,
}

impl CourseListing {
    #[must_use]
    pub fn enrolled(&self) -> bool {
        self.status.is_enrolled()
    }
}

/// Join courses with enrollments by course id.
///
/// A course with several enrollment records counts as enrolled if any of
/// them is; otherwise the last record wins.
#[must_use]
pub fn merge_enrollments(courses: Vec<Course>, enrollments: &[Enrollment]) -> Vec<CourseListing> {
    let mut by_course: HashMap<&str, EnrollmentStatus> = HashMap::new();
    for enrollment in enrollments {
        let slot = by_course.entry(enrollment.course.as_str()).or_default();
        if !slot.is_enrolled() {
            *slot = enrollment.status;
        }
    }
    courses
        .into_iter()
        .map(|course| {
            let status = by_course.get(course.id.as_str()).copied().unwrap_or_default();
            CourseListing { course, status }
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogState {
    pub listings: Vec<CourseListing>,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    /// Course id with an enroll request in flight.
    pub enrolling: Option<String>,
}

impl CatalogState {
    #[must_use]
    pub fn loading() -> Self {
        Self { loading: true, ..Self::default() }
    }

    pub fn finish_load(&mut self, result: Result<Vec<CourseListing>, ClientError>) {
        self.loading = false;
        match result {
            Ok(listings) => {
                self.listings = listings;
                self.error = None;
            }
            Err(err) => self.error = Some(err.user_message()),
        }
    }

    #[must_use]
    pub fn listing(&self, course_id: &str) -> Option<&CourseListing> {
        self.listings.iter().find(|l| l.course.id == course_id)
    }

    /// Mark an enroll request as started. Returns false (and records why)
    /// when the course is already enrolled, unknown, or another request is
    /// still in flight.
    pub fn begin_enroll(&mut self, course_id: &str) -> bool {
        if self.enrolling.is_some() {
            return false;
        }
        match self.listing(course_id) {
            None => false,
            Some(listing) if listing.enrolled() => {
                self.notice = Some(ALREADY_ENROLLED_MESSAGE.to_owned());
                false
            }
            Some(_) => {
                self.enrolling = Some(course_id.to_owned());
                self.error = None;
                self.notice = None;
                true
            }
        }
    }

    pub fn finish_enroll(&mut self, course_id: &str, result: Result<String, ClientError>) {
        self.enrolling = None;
        match result {
            Ok(detail) => {
                if let Some(listing) = self.listings.iter_mut().find(|l| l.course.id == course_id) {
                    listing.status = EnrollmentStatus::Active;
                }
                self.notice = Some(detail);
            }
            Err(err) => {
                log::warn!("enroll in course {course_id} failed: {err}");
                self.error = Some(ENROLL_FAILED_MESSAGE.to_owned());
            }
        }
    }
}

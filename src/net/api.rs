//! REST API service for the learning-management backend.
//!
//! Every call goes through the [`AuthInterceptor`], so pages never touch
//! tokens. Responses are decoded at this boundary into the typed shapes in
//! [`super::types`]; list endpoints accept both paginated and bare arrays.
//!
//! ERROR HANDLING
//! ==============
//! Non-success statuses map onto [`ClientError`] via
//! [`HttpResponse::into_error`]. The two "list for a parent" endpoints treat
//! 404 as an empty list, since the backend answers 404 for a course without
//! tasks or an instructor without courses.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::de::DeserializeOwned;

use super::error::ClientError;
use super::http::{HttpRequest, HttpResponse, Method};
use super::interceptor::AuthInterceptor;
use super::types::{
    Course, CourseUpdate, EnrollResponse, Enrollment, LearningTask, ListPayload, ProgressPayload, ProgressReport,
    Registration, Role, UserInfo, normalize_progress,
};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const REGISTER_PATH: &str = "/auth/register";
pub const PROFILE_PATH: &str = "/auth/profile";
pub const PROGRESS_PATH: &str = "/api/v1/students/progress/";
pub const COURSES_PATH: &str = "/courses";
pub const ENROLLMENTS_PATH: &str = "/enrollments";
pub const INSTRUCTOR_COURSES_PATH: &str = "/courses/instructor/courses/";

fn course_path(course_id: &str) -> String {
    format!("/courses/{}", urlencoding::encode(course_id))
}

fn enroll_path(course_id: &str) -> String {
    format!("/courses/{}/enroll", urlencoding::encode(course_id))
}

fn course_tasks_path(course_id: &str) -> String {
    format!("/learning-tasks/course/{}/", urlencoding::encode(course_id))
}

fn student_progress_path(student_id: &str) -> String {
    format!("/api/v1/students/{}/progress/", urlencoding::encode(student_id))
}

#[derive(Clone)]
pub struct ApiService {
    interceptor: AuthInterceptor,
}

impl ApiService {
    #[must_use]
    pub fn new(interceptor: AuthInterceptor) -> Self {
        Self { interceptor }
    }

    /// Progress report for the logged-in student, normalised from either the
    /// structured or the legacy array payload.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] without a session, otherwise any
    /// request or decode failure.
    pub async fn fetch_progress(&self) -> Result<ProgressReport, ClientError> {
        let user = self.interceptor.auth().user().ok_or(ClientError::NotAuthenticated)?;
        let payload: ProgressPayload = self.get_json(PROGRESS_PATH, "Progress").await?;
        Ok(normalize_progress(payload, &user))
    }

    /// Progress report for one student, as viewed by an instructor.
    ///
    /// # Errors
    ///
    /// Any request or decode failure; 404 is [`ClientError::NotFound`].
    pub async fn fetch_student_progress(&self, student_id: &str) -> Result<ProgressReport, ClientError> {
        let fallback = UserInfo {
            id: student_id.to_owned(),
            username: student_id.to_owned(),
            display_name: None,
            email: None,
            role: Role::Student,
        };
        let payload: ProgressPayload = self.get_json(&student_progress_path(student_id), "Student progress").await?;
        Ok(normalize_progress(payload, &fallback))
    }

    /// # Errors
    ///
    /// Any request or decode failure.
    pub async fn fetch_courses(&self) -> Result<Vec<Course>, ClientError> {
        self.get_list(COURSES_PATH, "Courses").await
    }

    /// # Errors
    ///
    /// Any request or decode failure; an unknown id is [`ClientError::NotFound`].
    pub async fn fetch_course(&self, course_id: &str) -> Result<Course, ClientError> {
        self.get_json(&course_path(course_id), "Course").await
    }

    /// `PUT /courses/:id`; returns the course as stored by the backend.
    ///
    /// # Errors
    ///
    /// Any request or decode failure; field errors arrive as [`ClientError::Validation`].
    pub async fn update_course(&self, course_id: &str, update: &CourseUpdate) -> Result<Course, ClientError> {
        let request = HttpRequest::new(Method::Put, self.url(&course_path(course_id))).json(update)?;
        let resp = self.send(request, "Course").await?;
        resp.json()
    }

    /// Enroll the current user; returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Any request failure. The caller keeps its prior view state.
    pub async fn enroll(&self, course_id: &str) -> Result<String, ClientError> {
        let request = HttpRequest::new(Method::Post, self.url(&enroll_path(course_id)));
        let resp = self.send(request, "Course").await?;
        let detail = resp.json::<EnrollResponse>().ok().and_then(|r| r.detail);
        Ok(detail.unwrap_or_else(|| "Successfully enrolled in the course.".to_owned()))
    }

    /// # Errors
    ///
    /// Any request or decode failure.
    pub async fn fetch_enrollments(&self) -> Result<Vec<Enrollment>, ClientError> {
        self.get_list(ENROLLMENTS_PATH, "Enrollments").await
    }

    /// Tasks ordered by their `order` field; a course without tasks is empty.
    ///
    /// # Errors
    ///
    /// Any request or decode failure other than 404.
    pub async fn fetch_course_tasks(&self, course_id: &str) -> Result<Vec<LearningTask>, ClientError> {
        let mut tasks: Vec<LearningTask> = empty_on_not_found(self.get_list(&course_tasks_path(course_id), "Tasks").await)?;
        tasks.sort_by_key(|t| t.order);
        Ok(tasks)
    }

    /// # Errors
    ///
    /// Any request or decode failure other than 404.
    pub async fn fetch_instructor_courses(&self) -> Result<Vec<Course>, ClientError> {
        empty_on_not_found(self.get_list(INSTRUCTOR_COURSES_PATH, "Courses").await)
    }

    /// # Errors
    ///
    /// Any request or decode failure.
    pub async fn fetch_profile(&self) -> Result<UserInfo, ClientError> {
        self.get_json(PROFILE_PATH, "Profile").await
    }

    /// Create an account. Field errors from the backend arrive as
    /// [`ClientError::Validation`] carrying the first message.
    ///
    /// # Errors
    ///
    /// Any request failure.
    pub async fn register(&self, registration: &Registration) -> Result<(), ClientError> {
        let request = HttpRequest::new(Method::Post, self.url(REGISTER_PATH)).json(registration)?;
        self.send(request, "Account").await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        self.interceptor.auth().config().url(path)
    }

    async fn send(&self, request: HttpRequest, entity: &str) -> Result<HttpResponse, ClientError> {
        let resp = self.interceptor.execute(request).await?;
        if resp.is_success() { Ok(resp) } else { Err(resp.into_error(entity)) }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, entity: &str) -> Result<T, ClientError> {
        let resp = self.send(HttpRequest::new(Method::Get, self.url(path)), entity).await?;
        resp.json()
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, entity: &str) -> Result<Vec<T>, ClientError> {
        let payload: ListPayload<T> = self.get_json(path, entity).await?;
        Ok(payload.into_items())
    }
}

fn empty_on_not_found<T>(result: Result<Vec<T>, ClientError>) -> Result<Vec<T>, ClientError> {
    match result {
        Err(ClientError::NotFound(_)) => Ok(Vec::new()),
        other => other,
    }
}

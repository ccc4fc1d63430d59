//! Instructor course management: the courses the signed-in editor owns.

#[cfg(test)]
#[path = "instructor_test.rs"]
mod instructor_test;

use leptos::prelude::*;
use leptos_router::components::A;

use crate::app::{ServicesHandle, use_session};
use crate::components::status::render_fetch;
use crate::net::types::{Course, CourseStatus};
use crate::pages::course_detail::status_badge;
use crate::state::session::Session;
use crate::util::fetch::{FetchState, spawn_fetch, use_cancel_scope};
use crate::util::routes::AppRoute;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CourseCounts {
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
}

#[must_use]
pub fn course_counts(courses: &[Course]) -> CourseCounts {
    courses.iter().fold(CourseCounts { total: courses.len(), ..CourseCounts::default() }, |mut counts, course| {
        match course.status {
            CourseStatus::Published => counts.published += 1,
            CourseStatus::Draft => counts.drafts += 1,
            CourseStatus::Archived => {}
        }
        counts
    })
}

#[must_use]
pub fn counts_text(counts: CourseCounts) -> String {
    format!("{} courses · {} published · {} drafts", counts.total, counts.published, counts.drafts)
}

fn course_table(courses: Vec<Course>) -> impl IntoView {
    if courses.is_empty() {
        return view! {
            <div class="empty-state">
                <h6>"No courses yet"</h6>
                <p>"Courses you create will appear here."</p>
            </div>
        }
        .into_any();
    }
    let summary = counts_text(course_counts(&courses));
    view! {
        <p class="instructor-page__summary">{summary}</p>
        <table class="instructor-courses">
            <thead>
                <tr>
                    <th>"Title"</th>
                    <th>"Status"</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                {courses
                    .into_iter()
                    .map(|course| {
                        let badge = status_badge(&course);
                        let view_href = AppRoute::CourseDetail(course.id.clone()).path();
                        let edit_href = AppRoute::CourseEdit(course.id.clone()).path();
                        view! {
                            <tr>
                                <td><A href=view_href>{course.title}</A></td>
                                <td>{badge}</td>
                                <td><A href=edit_href>"Edit"</A></td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
    .into_any()
}

#[component]
pub fn InstructorPage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let session = use_session();
    let scope = use_cancel_scope();
    let courses = RwSignal::new(FetchState::<Vec<Course>>::Loading);

    let api = services.get_value().api;
    spawn_fetch(&scope, courses, async move { api.fetch_instructor_courses().await });

    let heading = move || format!("{} Courses", session.with(Session::role).unwrap_or_default().label());

    view! {
        <div class="instructor-page">
            <h4>{heading}</h4>
            {move || render_fetch(courses.get(), course_table)}
        </div>
    }
}

//! `/progress-tracking/:id`.
//!
//! The path parameter means different things per role. Students reach this
//! page from a dashboard card, so `:id` is one of their own courses and the
//! page narrows their report to it. Instructors and admins look up a student,
//! so `:id` is a student id and the page shows that student's whole report.

#[cfg(test)]
#[path = "progress_tracking_test.rs"]
mod progress_tracking_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use crate::app::{ServicesHandle, use_session};
use crate::components::status::render_fetch;
use crate::net::types::{CourseProgress, ProgressReport, Role};
use crate::pages::dashboard::{CourseProgressCard, stat_cards};
use crate::state::session::Session;
use crate::util::fetch::{FetchGeneration, FetchState, spawn_latest_fetch, use_cancel_scope};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressTarget {
    OwnCourse(String),
    Student(String),
}

impl ProgressTarget {
    #[must_use]
    pub fn resolve(role: Option<Role>, id: String) -> Self {
        if role.is_some_and(Role::can_edit_courses) { Self::Student(id) } else { Self::OwnCourse(id) }
    }
}

/// Keep only the courses matching `course_id`. Entries without an id never match.
#[must_use]
pub fn focus_course(report: ProgressReport, course_id: &str) -> ProgressReport {
    let courses = report.courses.into_iter().filter(|c| c.id.as_deref() == Some(course_id)).collect();
    ProgressReport { courses, ..report }
}

#[must_use]
pub fn report_heading(target: &ProgressTarget, report: &ProgressReport) -> String {
    match target {
        ProgressTarget::OwnCourse(_) => "Course Progress".to_owned(),
        ProgressTarget::Student(_) => format!("Progress for {}", report.user.display_label()),
    }
}

fn report_view(target: ProgressTarget, report: ProgressReport) -> impl IntoView {
    let heading = report_heading(&target, &report);
    let cards = matches!(target, ProgressTarget::Student(_)).then(|| stat_cards(&report.stats));
    let courses: Vec<CourseProgress> = report.courses;
    view! {
        <h4>{heading}</h4>
        {cards.map(|cards| view! {
            <div class="dashboard-overview__cards">
                {cards
                    .into_iter()
                    .map(|card| view! {
                        <div class="stat-card">
                            <span class="stat-card__label">{card.label}</span>
                            <span class="stat-card__value">{card.value}</span>
                        </div>
                    })
                    .collect_view()}
            </div>
        })}
        {if courses.is_empty() {
            view! {
                <div class="empty-state">
                    <h6>"No progress recorded yet"</h6>
                    <A href="/dashboard">"Back to dashboard"</A>
                </div>
            }
            .into_any()
        } else {
            courses
                .into_iter()
                .enumerate()
                .map(|(index, course)| view! { <CourseProgressCard course=course index=index/> })
                .collect_view()
                .into_any()
        }}
    }
}

#[component]
pub fn ProgressTrackingPage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let session = use_session();
    let params = use_params_map();
    let scope = use_cancel_scope();
    let report = RwSignal::new(FetchState::<ProgressReport>::Loading);
    let target = RwSignal::new(None::<ProgressTarget>);
    let generation = FetchGeneration::new();

    Effect::new(move || {
        let id = params.with(|p| p.get("id")).unwrap_or_default();
        let resolved = ProgressTarget::resolve(session.with_untracked(Session::role), id);
        target.set(Some(resolved.clone()));
        let api = services.get_value().api;
        spawn_latest_fetch(&scope, &generation, report, async move {
            match resolved {
                ProgressTarget::OwnCourse(course_id) => {
                    api.fetch_progress().await.map(|report| focus_course(report, &course_id))
                }
                ProgressTarget::Student(student_id) => api.fetch_student_progress(&student_id).await,
            }
        });
    });

    view! {
        <div class="progress-tracking-page">
            {move || {
                let current = target.get();
                render_fetch(report.get(), move |report| {
                    current.map(|target| report_view(target, report))
                })
            }}
        </div>
    }
}

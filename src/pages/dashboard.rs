//! Dashboard: the authenticated landing route.
//!
//! SYSTEM CONTEXT
//! ==============
//! Students see their learning overview built from the normalised progress
//! report. Instructors and admins get the same heading plus shortcuts into
//! course management; the progress section is student-only.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;
use leptos_router::components::A;

use crate::app::{ServicesHandle, use_session};
use crate::components::status::{ProgressIndicator, render_fetch};
use crate::net::types::{CourseProgress, OverallStats, ProgressReport, Role, UserInfo};
use crate::state::session::Session;
use crate::util::fetch::{FetchState, spawn_fetch, use_cancel_scope};
use crate::util::routes::AppRoute;

/// `"<Role> Dashboard"`.
#[must_use]
pub fn dashboard_heading(role: Option<Role>) -> String {
    format!("{} Dashboard", role.unwrap_or_default().label())
}

#[must_use]
pub fn welcome_text(user: &UserInfo) -> String {
    format!("Welcome back, {}!", user.display_label())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
}

/// The four overview cards. Missing numbers render as zero.
#[must_use]
pub fn stat_cards(stats: &OverallStats) -> Vec<StatCard> {
    vec![
        StatCard { label: "Enrolled Courses", value: stats.courses_enrolled.unwrap_or(0).to_string() },
        StatCard { label: "Completed Courses", value: stats.courses_completed.unwrap_or(0).to_string() },
        StatCard { label: "Overall Completion", value: format!("{}%", stats.completion_percentage.unwrap_or(0.0)) },
        StatCard {
            label: "Completed Tasks",
            value: format!("{}/{}", stats.completed_tasks.unwrap_or(0), stats.total_tasks.unwrap_or(0)),
        },
    ]
}

/// `"3/10"` for the course card footer.
#[must_use]
pub fn tasks_text(course: &CourseProgress) -> String {
    let (done, total) = course.tasks();
    format!("{done}/{total}")
}

/// Date part of an ISO-8601 timestamp.
#[must_use]
pub fn last_activity_text(course: &CourseProgress) -> Option<String> {
    let raw = course.last_activity.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(raw.split('T').next().unwrap_or(raw).to_owned())
}

#[component]
pub(crate) fn CourseProgressCard(course: CourseProgress, index: usize) -> impl IntoView {
    let title = course.title(index);
    let completion = course.completion();
    let tasks = tasks_text(&course);
    let last_activity = last_activity_text(&course);
    let href = course.id.clone().map(|id| AppRoute::ProgressTracking(id).path());
    view! {
        <div class="course-progress-card">
            <h6 class="course-progress-card__title">{title}</h6>
            <ProgressIndicator value=completion/>
            <p class="course-progress-card__tasks">
                <strong>"Tasks Completed: "</strong>
                {tasks}
            </p>
            {last_activity.map(|date| view! {
                <p class="course-progress-card__activity">
                    <strong>"Last Activity: "</strong>
                    {date}
                </p>
            })}
            {href.map(|href| view! { <A href=href>"Details"</A> })}
        </div>
    }
}

fn overview(report: ProgressReport) -> impl IntoView {
    let cards = stat_cards(&report.stats);
    let courses = report.courses;
    view! {
        <section class="dashboard-overview">
            <h5>"Learning Overview"</h5>
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
        </section>
        <section class="dashboard-courses">
            <h5>"Course Progress"</h5>
            {if courses.is_empty() {
                view! {
                    <div class="empty-state">
                        <h6>"No Course Progress Yet"</h6>
                        <p>"You have not started any courses yet. Enroll in courses to track your progress."</p>
                        <A href="/courses">"Browse courses"</A>
                    </div>
                }
                .into_any()
            } else {
                view! {
                    <div class="dashboard-courses__grid">
                        {courses
                            .into_iter()
                            .enumerate()
                            .map(|(index, course)| view! { <CourseProgressCard course=course index=index/> })
                            .collect_view()}
                    </div>
                }
                .into_any()
            }}
        </section>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let session = use_session();
    let scope = use_cancel_scope();
    let progress = RwSignal::new(FetchState::<ProgressReport>::Loading);

    let role = move || session.with(Session::role);
    let is_student = session.with_untracked(Session::role).is_none_or(|r| !r.can_edit_courses());
    if is_student {
        let api = services.get_value().api;
        spawn_fetch(&scope, progress, async move { api.fetch_progress().await });
    }

    let welcome = move || session.with(|s| s.user.as_ref().map(welcome_text).unwrap_or_default());

    view! {
        <div class="dashboard-page">
            <h4>{move || dashboard_heading(role())}</h4>
            <p class="dashboard-page__welcome">{welcome}</p>
            {if is_student {
                view! { <div>{move || render_fetch(progress.get(), overview)}</div> }.into_any()
            } else {
                view! {
                    <section class="dashboard-shortcuts">
                        <h5>"Course Management"</h5>
                        <A href="/instructor">"Manage your courses"</A>
                        <A href="/courses">"Browse the catalog"</A>
                    </section>
                }
                .into_any()
            }}
        </div>
    }
}

//! Single course view.

#[cfg(test)]
#[path = "course_detail_test.rs"]
mod course_detail_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use crate::app::{ServicesHandle, use_session};
use crate::components::status::render_fetch;
use crate::net::types::{Course, CourseStatus, Role, Visibility};
use crate::state::session::Session;
use crate::util::fetch::{FetchGeneration, FetchState, spawn_latest_fetch, use_cancel_scope};
use crate::util::routes::AppRoute;

/// Badge text such as `"Published · Public"`.
#[must_use]
pub fn status_badge(course: &Course) -> String {
    let status = match course.status {
        CourseStatus::Draft => "Draft",
        CourseStatus::Published => "Published",
        CourseStatus::Archived => "Archived",
    };
    let visibility = match course.visibility {
        Visibility::Private => "Private",
        Visibility::Public => "Public",
    };
    format!("{status} · {visibility}")
}

/// Whether to offer the edit link.
#[must_use]
pub fn can_edit(role: Option<Role>) -> bool {
    role.is_some_and(Role::can_edit_courses)
}

#[component]
pub fn CourseDetailPage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let session = use_session();
    let params = use_params_map();
    let scope = use_cancel_scope();
    let generation = FetchGeneration::new();
    let course = RwSignal::new(FetchState::<Course>::Loading);

    Effect::new(move || {
        let id = params.with(|p| p.get("id")).unwrap_or_default();
        let api = services.get_value().api;
        spawn_latest_fetch(&scope, &generation, course, async move { api.fetch_course(&id).await });
    });

    let editable = move || can_edit(session.with(Session::role));

    view! {
        <div class="course-detail-page">
            {move || render_fetch(course.get(), move |course| {
                let badge = status_badge(&course);
                let tasks_href = AppRoute::CourseTasks(course.id.clone()).path();
                let edit_href = AppRoute::CourseEdit(course.id.clone()).path();
                view! {
                    <h4>{course.title}</h4>
                    <span class="badge">{badge}</span>
                    {course.instructor.map(|name| view! { <p class="course-detail__instructor">"Instructor: " {name}</p> })}
                    <p class="course-detail__description">{course.description}</p>
                    <div class="course-detail__actions">
                        <A href=tasks_href>"Learning tasks"</A>
                        <Show when=editable>
                            <A href=edit_href.clone()>"Edit course"</A>
                        </Show>
                    </div>
                }
            })}
        </div>
    }
}

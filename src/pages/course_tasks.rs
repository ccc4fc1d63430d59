//! Learning tasks of one course, in syllabus order.

#[cfg(test)]
#[path = "course_tasks_test.rs"]
mod course_tasks_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use crate::app::ServicesHandle;
use crate::components::status::render_fetch;
use crate::net::types::LearningTask;
use crate::util::fetch::{FetchGeneration, FetchState, spawn_latest_fetch, use_cancel_scope};
use crate::util::routes::AppRoute;

/// `"1. Ownership"`; numbering follows list position, not the backend `order`.
#[must_use]
pub fn task_label(task: &LearningTask, index: usize) -> String {
    format!("{}. {}", index + 1, task.title)
}

#[must_use]
pub fn tasks_summary(count: usize) -> String {
    match count {
        0 => "No learning tasks yet".to_owned(),
        1 => "1 task".to_owned(),
        n => format!("{n} tasks"),
    }
}

fn task_list(tasks: Vec<LearningTask>) -> impl IntoView {
    let summary = tasks_summary(tasks.len());
    view! {
        <p class="course-tasks__summary">{summary}</p>
        <ol class="course-tasks__list">
            {tasks
                .into_iter()
                .enumerate()
                .map(|(index, task)| {
                    let label = task_label(&task, index);
                    let description = (!task.description.is_empty()).then_some(task.description);
                    view! {
                        <li class="course-task">
                            <h6>{label}</h6>
                            {description.map(|text| view! { <p>{text}</p> })}
                        </li>
                    }
                })
                .collect_view()}
        </ol>
    }
}

#[component]
pub fn CourseTasksPage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let params = use_params_map();
    let scope = use_cancel_scope();
    let generation = FetchGeneration::new();
    let tasks = RwSignal::new(FetchState::<Vec<LearningTask>>::Loading);

    let course_id = move || params.with(|p| p.get("id")).unwrap_or_default();

    Effect::new(move || {
        let id = course_id();
        let api = services.get_value().api;
        spawn_latest_fetch(&scope, &generation, tasks, async move { api.fetch_course_tasks(&id).await });
    });

    view! {
        <div class="course-tasks-page">
            <h4>"Learning Tasks"</h4>
            <A href=move || AppRoute::CourseDetail(course_id()).path()>"Back to course"</A>
            {move || render_fetch(tasks.get(), task_list)}
        </div>
    }
}

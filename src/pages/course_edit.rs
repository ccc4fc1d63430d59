//! Course editing for instructors and admins.
//!
//! The form starts from the stored course, validates locally, and only
//! leaves the page once the backend has accepted the `PUT`.

#[cfg(test)]
#[path = "course_edit_test.rs"]
mod course_edit_test;

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::app::{ServicesHandle, use_navigator, use_session};
use crate::components::status::{ErrorBanner, LoadingSpinner};
use crate::net::error::ClientError;
use crate::net::types::{Course, CourseStatus, CourseUpdate, Role, Visibility};
use crate::state::session::Session;
use crate::util::fetch::{FetchGeneration, FetchState, use_cancel_scope};

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save course details.";
pub const AFTER_SAVE_PATH: &str = "/instructor";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub status: CourseStatus,
    pub visibility: Visibility,
}

impl From<&Course> for CourseDraft {
    fn from(course: &Course) -> Self {
        Self {
            title: course.title.clone(),
            description: course.description.clone(),
            status: course.status,
            visibility: course.visibility,
        }
    }
}

impl CourseDraft {
    /// # Errors
    ///
    /// A form message when the title is blank.
    pub fn validate(&self) -> Result<CourseUpdate, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required.".to_owned());
        }
        Ok(CourseUpdate {
            title: title.to_owned(),
            description: self.description.trim().to_owned(),
            status: self.status,
            visibility: self.visibility,
        })
    }
}

#[must_use]
pub fn edit_heading(role: Option<Role>) -> &'static str {
    if role == Some(Role::Admin) { "Edit Course (Admin)" } else { "Edit Course (Instructor)" }
}

#[must_use]
pub fn save_error_text(err: &ClientError) -> String {
    format!("{SAVE_FAILED_MESSAGE} {}", err.user_message())
}

/// Status values offered by the form; archiving happens elsewhere.
pub const EDITABLE_STATUSES: [CourseStatus; 2] = [CourseStatus::Draft, CourseStatus::Published];
pub const VISIBILITIES: [Visibility; 2] = [Visibility::Private, Visibility::Public];

#[component]
pub fn CourseEditPage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let session = use_session();
    let navigator = use_navigator();
    let params = use_params_map();
    let scope = use_cancel_scope();

    let generation = FetchGeneration::new();
    let loaded = RwSignal::new(FetchState::<()>::Loading);
    let draft = RwSignal::new(CourseDraft::default());
    let saving = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    {
        let scope = scope.clone();
        Effect::new(move || {
            let id = params.with(|p| p.get("id")).unwrap_or_default();
            let api = services.get_value().api;
            let scope = scope.clone();
            let fetch = generation.run(async move { api.fetch_course(&id).await });
            loaded.set(FetchState::Loading);
            leptos::task::spawn_local(async move {
                let Some(Some(result)) = scope.run(fetch).await else {
                    return;
                };
                if let Ok(course) = &result {
                    draft.set(CourseDraft::from(course));
                }
                loaded.set(FetchState::from_result(result.map(|_| ())));
            });
        });
    }

    let on_save = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let update = match draft.with_untracked(CourseDraft::validate) {
            Ok(update) => update,
            Err(message) => {
                error.set(Some(message));
                return;
            }
        };
        saving.set(true);
        error.set(None);

        let id = params.with_untracked(|p| p.get("id")).unwrap_or_default();
        let api = services.get_value().api;
        let scope = scope.clone();
        leptos::task::spawn_local(async move {
            let Some(result) = scope.run(api.update_course(&id, &update)).await else {
                return;
            };
            saving.set(false);
            match result {
                Ok(course) => {
                    log::info!("saved course {}", course.id);
                    navigator.go(AFTER_SAVE_PATH);
                }
                Err(err) => {
                    log::warn!("saving course {id} failed: {err}");
                    error.set(Some(save_error_text(&err)));
                }
            }
        });
    };

    let form = move || {
        view! {
            <form class="course-edit-form" on:submit=on_save.clone()>
                <label>
                    "Title"
                    <input
                        type="text"
                        name="title"
                        prop:value=move || draft.with(|d| d.title.clone())
                        on:input=move |ev| draft.update(|d| d.title = event_target_value(&ev))
                    />
                </label>
                <label>
                    "Description"
                    <textarea
                        name="description"
                        rows="4"
                        prop:value=move || draft.with(|d| d.description.clone())
                        on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                    ></textarea>
                </label>
                <label>
                    "Status"
                    <select
                        name="status"
                        prop:value=move || draft.with(|d| d.status.as_str())
                        on:change=move |ev| {
                            if let Some(status) = CourseStatus::parse(&event_target_value(&ev)) {
                                draft.update(|d| d.status = status);
                            }
                        }
                    >
                        {EDITABLE_STATUSES
                            .into_iter()
                            .map(|s| view! { <option value=s.as_str()>{s.as_str()}</option> })
                            .collect_view()}
                    </select>
                </label>
                <label>
                    "Visibility"
                    <select
                        name="visibility"
                        prop:value=move || draft.with(|d| d.visibility.as_str())
                        on:change=move |ev| {
                            if let Some(visibility) = Visibility::parse(&event_target_value(&ev)) {
                                draft.update(|d| d.visibility = visibility);
                            }
                        }
                    >
                        {VISIBILITIES
                            .into_iter()
                            .map(|v| view! { <option value=v.as_str()>{v.as_str()}</option> })
                            .collect_view()}
                    </select>
                </label>
                <div class="course-edit-form__actions">
                    <button class="btn btn--primary" type="submit" disabled=move || saving.get()>
                        "Save"
                    </button>
                    <button class="btn" type="button" on:click=move |_| navigator.go(AFTER_SAVE_PATH)>
                        "Cancel"
                    </button>
                </div>
            </form>
        }
    };

    view! {
        <div class="course-edit-page">
            <h4>{move || edit_heading(session.with(Session::role))}</h4>
            {move || error.get().map(|message| view! { <ErrorBanner message=message/> })}
            {move || match loaded.get() {
                FetchState::Loading => view! { <LoadingSpinner/> }.into_any(),
                FetchState::Failed(message) => view! { <ErrorBanner message=message/> }.into_any(),
                FetchState::Ready(()) => form().into_any(),
            }}
            <Show when=move || saving.get()>
                <LoadingSpinner label="Saving..."/>
            </Show>
        </div>
    }
}

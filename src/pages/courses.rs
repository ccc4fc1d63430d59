//! Course catalog with enrollment.
//!
//! SYSTEM CONTEXT
//! ==============
//! Courses and enrollments load concurrently and join before the first
//! render. Enroll awaits the backend before touching the listing; on failure
//! the listing is unchanged and the failure message is shown inline.

#[cfg(test)]
#[path = "courses_test.rs"]
mod courses_test;

use leptos::prelude::*;
use leptos_router::components::A;

use crate::app::ServicesHandle;
use crate::components::status::{ErrorBanner, LoadingSpinner};
use crate::net::api::ApiService;
use crate::net::error::ClientError;
use crate::net::types::Course;
use crate::state::courses::{CatalogState, CourseListing, merge_enrollments};
use crate::util::fetch::use_cancel_scope;
use crate::util::routes::AppRoute;

/// Fetch courses and enrollments together and merge them.
///
/// # Errors
///
/// The first failure of either request.
pub async fn load_catalog(api: &ApiService) -> Result<Vec<CourseListing>, ClientError> {
    let (courses, enrollments) = futures::join!(api.fetch_courses(), api.fetch_enrollments());
    Ok(merge_enrollments(courses?, &enrollments?))
}

/// Label of the per-course action button.
#[must_use]
pub fn enroll_button_label(listing: &CourseListing, enrolling: Option<&str>) -> &'static str {
    if listing.enrolled() {
        "Enrolled"
    } else if enrolling == Some(listing.course.id.as_str()) {
        "Enrolling..."
    } else {
        "Enroll"
    }
}

/// Detail route of one catalog card.
#[must_use]
pub fn course_href(course_id: &str) -> String {
    AppRoute::CourseDetail(course_id.to_owned()).path()
}

#[component]
pub fn CoursesPage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let scope = use_cancel_scope();
    let catalog = RwSignal::new(CatalogState::loading());

    {
        let api = services.get_value().api;
        let scope = scope.clone();
        leptos::task::spawn_local(async move {
            if let Some(result) = scope.run(load_catalog(&api)).await {
                catalog.update(|c| c.finish_load(result));
            }
        });
    }

    let on_enroll = move |course_id: String| {
        let started = catalog.try_update(|c| c.begin_enroll(&course_id)).unwrap_or(false);
        if !started {
            return;
        }
        let api = services.get_value().api;
        let scope = scope.clone();
        leptos::task::spawn_local(async move {
            if let Some(result) = scope.run(api.enroll(&course_id)).await {
                catalog.update(|c| c.finish_enroll(&course_id, result));
            }
        });
    };
    let on_enroll = Callback::new(on_enroll);

    view! {
        <div class="courses-page">
            <h4>"Available Courses"</h4>
            {move || catalog.with(|c| c.error.clone()).map(|message| view! { <ErrorBanner message=message/> })}
            {move || catalog.with(|c| c.notice.clone()).map(|message| view! { <p class="alert alert--info">{message}</p> })}
            <Show when=move || !catalog.with(|c| c.loading) fallback=|| view! { <LoadingSpinner/> }>
                <div class="courses-page__grid">
                    {move || {
                        let state = catalog.get();
                        let enrolling = state.enrolling;
                        state
                            .listings
                            .into_iter()
                            .map(|listing| {
                                let label = enroll_button_label(&listing, enrolling.as_deref());
                                let disabled = listing.enrolled() || enrolling.is_some();
                                let href = course_href(&listing.course.id);
                                let Course { id, title, description, .. } = listing.course;
                                view! {
                                    <div class="course-card">
                                        <h6 class="course-card__title">
                                            <A href=href>{title}</A>
                                        </h6>
                                        <p class="course-card__description">{description}</p>
                                        <button
                                            class="btn course-card__enroll"
                                            disabled=disabled
                                            on:click=move |_| on_enroll.run(id.clone())
                                        >
                                            {label}
                                        </button>
                                    </div>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </Show>
        </div>
    }
}

//! Loading, error and progress indicators shared by every page.

#[cfg(test)]
#[path = "status_test.rs"]
mod status_test;

use leptos::prelude::*;

use crate::util::fetch::FetchState;

/// Clamp a completion value into `0..=100` and round to a whole percent.
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0).round() }
}

#[must_use]
pub fn percent_label(value: f64) -> String {
    format!("{}% Complete", clamp_percent(value))
}

#[component]
pub fn LoadingSpinner(#[prop(optional, into)] label: Option<String>) -> impl IntoView {
    let label = label.unwrap_or_else(|| "Loading...".to_owned());
    view! {
        <div class="loading-spinner" role="status">
            <span class="loading-spinner__label">{label}</span>
        </div>
    }
}

#[component]
pub fn ErrorBanner(#[prop(into)] message: String) -> impl IntoView {
    view! { <div class="alert alert--error" role="alert">{message}</div> }
}

/// Circular progress indicator.
#[component]
pub fn ProgressIndicator(value: f64, #[prop(optional, into)] label: Option<String>) -> impl IntoView {
    let percent = clamp_percent(value);
    let label = label.unwrap_or_else(|| percent_label(value));
    view! {
        <div class="progress-indicator" style=format!("--progress: {percent}")>
            <span class="progress-indicator__value">{format!("{percent}%")}</span>
            <span class="progress-indicator__label">{label}</span>
        </div>
    }
}

/// Spinner while loading, an error banner on failure, `ready` otherwise.
pub fn render_fetch<T, V>(state: FetchState<T>, ready: impl FnOnce(T) -> V) -> AnyView
where
    V: IntoView + 'static,
{
    match state {
        FetchState::Loading => view! { <LoadingSpinner/> }.into_any(),
        FetchState::Failed(message) => view! { <ErrorBanner message=message/> }.into_any(),
        FetchState::Ready(value) => ready(value).into_any(),
    }
}

//! Profile page for the logged-in user.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use leptos::prelude::*;

use crate::app::ServicesHandle;
use crate::components::status::render_fetch;
use crate::net::types::UserInfo;
use crate::util::fetch::{FetchState, spawn_fetch, use_cancel_scope};

/// Label/value rows shown on the profile card. Blank optional fields are skipped.
#[must_use]
pub fn profile_rows(user: &UserInfo) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Username", user.username.clone())];
    if let Some(name) = user.display_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        rows.push(("Name", name.to_owned()));
    }
    if let Some(email) = user.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        rows.push(("Email", email.to_owned()));
    }
    rows.push(("Role", user.role.label().to_owned()));
    rows
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let scope = use_cancel_scope();
    let profile = RwSignal::new(FetchState::<UserInfo>::Loading);

    let api = services.get_value().api;
    spawn_fetch(&scope, profile, async move { api.fetch_profile().await });

    view! {
        <div class="profile-page">
            <h4>"My Profile"</h4>
            {move || render_fetch(profile.get(), |user| view! {
                <dl class="profile-card">
                    {profile_rows(&user)
                        .into_iter()
                        .map(|(label, value)| view! {
                            <dt>{label}</dt>
                            <dd>{value}</dd>
                        })
                        .collect_view()}
                </dl>
            })}
        </div>
    }
}

//! Top navigation bar.

#[cfg(test)]
#[path = "nav_bar_test.rs"]
mod nav_bar_test;

use leptos::prelude::*;
use leptos_router::components::A;

use crate::app::{ServicesHandle, use_navigator, use_session};
use crate::net::types::Role;
use crate::state::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

const fn link(href: &'static str, label: &'static str) -> NavLink {
    NavLink { href, label }
}

/// Links for the current role; `None` is the anonymous visitor.
#[must_use]
pub fn nav_links(role: Option<Role>) -> Vec<NavLink> {
    let Some(role) = role else {
        return vec![link("/login", "Login"), link("/register", "Register")];
    };
    let mut links = vec![link("/dashboard", "Dashboard"), link("/courses", "Courses")];
    if role.can_edit_courses() {
        links.push(link("/instructor", "Instructor"));
    }
    links.push(link("/profile", "Profile"));
    links
}

#[component]
pub fn NavBar() -> impl IntoView {
    let session = use_session();
    let services = expect_context::<ServicesHandle>();
    let navigator = use_navigator();

    let on_logout = move |_| {
        let auth = services.get_value().auth;
        leptos::task::spawn_local(async move {
            auth.logout().await;
            navigator.go("/login");
        });
    };

    let user_label = move || {
        session.with(|s| s.user.as_ref().map(|u| format!("{} ({})", u.display_label(), u.role.label())))
    };

    view! {
        <nav class="nav-bar">
            <span class="nav-bar__brand">"Learning Platform"</span>
            <ul class="nav-bar__links">
                {move || {
                    nav_links(session.with(Session::role))
                        .into_iter()
                        .map(|l| view! { <li><A href=l.href>{l.label}</A></li> })
                        .collect_view()
                }}
            </ul>
            <Show when=move || session.with(Session::is_authenticated)>
                <span class="nav-bar__user">{move || user_label().unwrap_or_default()}</span>
                <button class="btn nav-bar__logout" on:click=on_logout>
                    "Logout"
                </button>
            </Show>
        </nav>
    }
}

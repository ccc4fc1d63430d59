//! Login page: username-or-email plus password.
//!
//! SYSTEM CONTEXT
//! ==============
//! Submitting calls the auth context directly. Navigation is driven by the
//! session mirror: once the session is authenticated (now or on arrival),
//! the page moves to the post-login target taken from `?next=`.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_query_map;

use crate::app::{ServicesHandle, use_navigator, use_session, use_session_notice};
use crate::components::status::LoadingSpinner;
use crate::net::error::ClientError;
use crate::state::session::Session;
use crate::util::fetch::use_cancel_scope;
use crate::util::guard::post_login_target;

/// Inline message for a failed attempt; always mentions "Login Failed".
#[must_use]
pub fn login_error_text(err: &ClientError) -> String {
    err.login_message()
}

/// Alert shown under the form. A rejection that left the session untouched
/// (blank field, login already running) is kept locally; a backend failure is
/// read from the session, which records it on the `FAILED` transition.
#[must_use]
pub fn login_alert(local: Option<&str>, session: &Session) -> Option<String> {
    local.map(str::to_owned).or_else(|| session.error.clone())
}

/// Submit is enabled once both fields have content.
#[must_use]
pub fn can_submit(identifier: &str, password: &str, busy: bool) -> bool {
    !busy && !identifier.trim().is_empty() && !password.is_empty()
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let session = use_session();
    let notice = use_session_notice();
    let navigator = use_navigator();
    let query = use_query_map();
    let scope = use_cancel_scope();

    let identifier = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    Effect::new(move || {
        if session.with(Session::is_authenticated) {
            let target = query.with_untracked(|q| post_login_target(q.get("next").as_deref()));
            navigator.go(&target);
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let identifier_value = identifier.get_untracked();
        let password_value = password.get_untracked();
        busy.set(true);
        error.set(None);
        notice.set(None);

        let auth = services.get_value().auth;
        let scope = scope.clone();
        // Not run through the scope: an aborted login would strand the session in AUTHENTICATING.
        leptos::task::spawn_local(async move {
            let result = auth.login(&identifier_value, &password_value).await;
            if scope.is_cancelled() {
                return;
            }
            busy.set(false);
            if let Err(err) = result {
                if session.with_untracked(|s| s.error.is_none()) {
                    error.set(Some(login_error_text(&err)));
                }
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Sign In"</h1>
                <Show when=move || notice.get().is_some()>
                    <p class="login-notice">{move || notice.get().unwrap_or_default()}</p>
                </Show>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        name="username_or_email"
                        autocomplete="username"
                        placeholder="Username or email"
                        prop:value=move || identifier.get()
                        on:input=move |ev| identifier.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        name="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button
                        class="login-button"
                        type="submit"
                        disabled=move || !can_submit(&identifier.get(), &password.get(), busy.get())
                    >
                        "Login"
                    </button>
                </form>
                <Show when=move || busy.get()>
                    <LoadingSpinner label="Signing in..."/>
                </Show>
                {move || {
                    session
                        .with(|s| login_alert(error.get().as_deref(), s))
                        .map(|message| view! { <p class="error-message" role="alert">{message}</p> })
                }}
                <p class="login-card__footer">
                    "No account yet? "
                    <A href="/register">"Register"</A>
                </p>
            </div>
        </div>
    }
}

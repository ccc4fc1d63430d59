//! Account registration page.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
use leptos_router::components::A;

use crate::app::{ServicesHandle, use_navigator};
use crate::components::status::{ErrorBanner, LoadingSpinner};
use crate::net::types::{Registration, Role};
use crate::util::fetch::use_cancel_scope;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub role: Role,
}

impl RegisterForm {
    /// Client-side checks before anything is sent.
    ///
    /// # Errors
    ///
    /// The first problem found, phrased for the form.
    pub fn validate(&self) -> Result<Registration, String> {
        let username = self.username.trim();
        let email = self.email.trim();
        if username.is_empty() || email.is_empty() || self.password.is_empty() || self.password2.is_empty() {
            return Err("All fields are required.".to_owned());
        }
        if !email.contains('@') {
            return Err("Enter a valid email address.".to_owned());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters."));
        }
        if self.password != self.password2 {
            return Err("Passwords do not match.".to_owned());
        }
        Ok(Registration {
            username: username.to_owned(),
            email: email.to_owned(),
            password: self.password.clone(),
            password2: self.password2.clone(),
            role: self.role,
        })
    }
}

/// Roles offered at sign-up. Admin accounts are created by the backend.
#[must_use]
pub fn selectable_roles() -> [Role; 2] {
    [Role::Student, Role::Instructor]
}

/// `<option>` value for a role; matches the wire spelling.
#[must_use]
pub fn role_value(role: Role) -> &'static str {
    match role {
        Role::Student => "student",
        Role::Instructor => "instructor",
        Role::Admin => "admin",
    }
}

/// Parse the role picker; anything unexpected registers a student.
#[must_use]
pub fn parse_role_choice(raw: &str) -> Role {
    if raw == role_value(Role::Instructor) { Role::Instructor } else { Role::Student }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let services = expect_context::<ServicesHandle>();
    let navigator = use_navigator();
    let scope = use_cancel_scope();

    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let password2 = RwSignal::new(String::new());
    let role = RwSignal::new(Role::Student);
    let busy = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let form = RegisterForm {
            username: username.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            password2: password2.get_untracked(),
            role: role.get_untracked(),
        };
        let registration = match form.validate() {
            Ok(registration) => registration,
            Err(message) => {
                error.set(Some(message));
                return;
            }
        };
        busy.set(true);
        error.set(None);

        let api = services.get_value().api;
        let scope = scope.clone();
        leptos::task::spawn_local(async move {
            let Some(result) = scope.run(api.register(&registration)).await else {
                return;
            };
            busy.set(false);
            match result {
                Ok(()) => {
                    log::info!("registered account {}", registration.username);
                    navigator.go("/login");
                }
                Err(err) => error.set(Some(err.user_message())),
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Create Account"</h1>
                <form class="login-form" on:submit=on_submit>
                    <input class="login-input" type="text" name="username" placeholder="Username"
                        prop:value=move || username.get() on:input=move |ev| username.set(event_target_value(&ev))/>
                    <input class="login-input" type="email" name="email" placeholder="Email"
                        prop:value=move || email.get() on:input=move |ev| email.set(event_target_value(&ev))/>
                    <input class="login-input" type="password" name="password" placeholder="Password"
                        prop:value=move || password.get() on:input=move |ev| password.set(event_target_value(&ev))/>
                    <input class="login-input" type="password" name="password2" placeholder="Confirm password"
                        prop:value=move || password2.get() on:input=move |ev| password2.set(event_target_value(&ev))/>
                    <select
                        class="login-input"
                        name="role"
                        on:change=move |ev| {
                            role.set(parse_role_choice(&event_target_value(&ev)));
                        }
                    >
                        {selectable_roles()
                            .into_iter()
                            .map(|role| {
                                view! { <option value=role_value(role)>{role.label()}</option> }
                            })
                            .collect_view()}
                    </select>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Register"
                    </button>
                </form>
                <Show when=move || busy.get()>
                    <LoadingSpinner label="Creating account..."/>
                </Show>
                {move || error.get().map(|message| view! { <ErrorBanner message=message/> })}
                <p class="login-card__footer">
                    "Already registered? "
                    <A href="/login">"Sign in"</A>
                </p>
            </div>
        </div>
    }
}

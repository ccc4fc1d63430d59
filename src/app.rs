//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` builds the one [`AuthContext`] for the tab, wires the interceptor and
//! API service around it, and injects them as [`ClientServices`]. The session
//! is mirrored into an `RwSignal<Session>` so views re-render on every phase
//! change; the mirror is read-only by convention, and all writes go through
//! the auth context.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::hooks::use_navigate;
use leptos_router::{
    NavigateOptions, ParamSegment, StaticSegment,
    components::{Redirect, Route, Router, Routes},
};

use crate::components::nav_bar::NavBar;
use crate::components::require_auth::RequireAuth;
use crate::config::ClientConfig;
use crate::net::api::ApiService;
use crate::net::error::ClientError;
use crate::net::http::Transport;
use crate::net::interceptor::AuthInterceptor;
use crate::pages::{
    course_detail::CourseDetailPage, course_edit::CourseEditPage, course_tasks::CourseTasksPage, courses::CoursesPage,
    dashboard::DashboardPage, instructor::InstructorPage, login::LoginPage, profile::ProfilePage,
    progress_tracking::ProgressTrackingPage, register::RegisterPage,
};
use crate::state::auth::AuthContext;
use crate::state::events::AuthEventBus;
use crate::state::session::Session;
use crate::state::token_store::TokenStore;

pub const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please log in again.";

/// Auth context and API service for the tab. `Rc`-based, so it lives in a
/// local `StoredValue` rather than directly in context.
#[derive(Clone)]
pub struct ClientServices {
    pub auth: AuthContext,
    pub api: ApiService,
}

impl ClientServices {
    /// `on_auth_failure` runs when a request's token refresh fails.
    pub fn new<F>(config: ClientConfig, transport: Rc<dyn Transport>, store: TokenStore, on_auth_failure: F) -> Self
    where
        F: Fn() + 'static,
    {
        let auth = AuthContext::new(config, transport.clone(), store, AuthEventBus::new());
        let interceptor = AuthInterceptor::new(auth.clone(), transport).with_failure_callback(on_auth_failure);
        Self { auth, api: ApiService::new(interceptor) }
    }
}

pub type ServicesHandle = StoredValue<ClientServices, LocalStorage>;

/// Message shown on the login view after a forced logout.
#[derive(Clone, Copy)]
pub struct SessionNotice(pub RwSignal<Option<String>>);

/// Read-only session mirror.
pub fn use_session() -> RwSignal<Session> {
    expect_context::<RwSignal<Session>>()
}

pub fn use_session_notice() -> RwSignal<Option<String>> {
    expect_context::<SessionNotice>().0
}

/// Router navigation as a `Copy` handle, usable from event handlers and
/// spawned tasks.
#[derive(Clone, Copy)]
pub struct Navigator(StoredValue<Box<dyn Fn(&str, NavigateOptions)>, LocalStorage>);

impl Navigator {
    pub fn go(&self, path: &str) {
        let navigated = self.0.try_with_value(|navigate| navigate(path, NavigateOptions::default()));
        if navigated.is_none() {
            log::debug!("navigation to {path} skipped; view already disposed");
        }
    }
}

/// Must be called inside the `<Router>`.
pub fn use_navigator() -> Navigator {
    let navigate: Box<dyn Fn(&str, NavigateOptions)> = Box::new(use_navigate());
    Navigator(StoredValue::new_local(navigate))
}

fn platform_transport() -> Rc<dyn Transport> {
    #[cfg(feature = "csr")]
    {
        Rc::new(crate::net::http::GlooTransport)
    }
    #[cfg(not(feature = "csr"))]
    {
        Rc::new(crate::net::http::OfflineTransport)
    }
}

/// Root application component.
///
/// Provides the services, the session mirror and the notice signal, then
/// sets up client-side routing with every protected view behind the guard.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let notice = RwSignal::new(None::<String>);
    let services = ClientServices::new(ClientConfig::from_env(), platform_transport(), TokenStore::platform_default(), move || {
        notice.set(Some(SESSION_EXPIRED_NOTICE.to_owned()));
    });

    let session = RwSignal::new(services.auth.session());
    // Registered for the lifetime of the tab.
    let _mirror = services.auth.watch(move |snapshot| match session.try_set(snapshot) {
        None => Ok(()),
        Some(_) => Err(ClientError::Subscriber("session mirror signal was disposed".to_owned())),
    });

    #[cfg(feature = "csr")]
    spawn_expiry_monitor(services.auth.clone(), notice);

    provide_context(StoredValue::new_local(services));
    provide_context(session);
    provide_context(SessionNotice(notice));

    view! {
        <Title text="Learning Platform"/>

        <Router>
            <NavBar/>
            <main class="app-main">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("") view=|| view! { <Redirect path="/dashboard"/> }/>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("register") view=RegisterPage/>
                    <Route
                        path=StaticSegment("dashboard")
                        view=|| view! { <RequireAuth><DashboardPage/></RequireAuth> }
                    />
                    <Route
                        path=StaticSegment("profile")
                        view=|| view! { <RequireAuth><ProfilePage/></RequireAuth> }
                    />
                    <Route
                        path=StaticSegment("courses")
                        view=|| view! { <RequireAuth><CoursesPage/></RequireAuth> }
                    />
                    <Route
                        path=(StaticSegment("courses"), ParamSegment("id"))
                        view=|| view! { <RequireAuth><CourseDetailPage/></RequireAuth> }
                    />
                    <Route
                        path=(StaticSegment("courses"), ParamSegment("id"), StaticSegment("edit"))
                        view=|| view! { <RequireAuth><CourseEditPage/></RequireAuth> }
                    />
                    <Route
                        path=(StaticSegment("courses"), ParamSegment("id"), StaticSegment("tasks"))
                        view=|| view! { <RequireAuth><CourseTasksPage/></RequireAuth> }
                    />
                    <Route
                        path=(StaticSegment("progress-tracking"), ParamSegment("id"))
                        view=|| view! { <RequireAuth><ProgressTrackingPage/></RequireAuth> }
                    />
                    <Route
                        path=StaticSegment("instructor")
                        view=|| view! { <RequireAuth><InstructorPage/></RequireAuth> }
                    />
                </Routes>
            </main>
        </Router>
    }
}

/// Proactively refresh the access token shortly before it expires.
#[cfg(feature = "csr")]
fn spawn_expiry_monitor(auth: AuthContext, notice: RwSignal<Option<String>>) {
    let interval = std::time::Duration::from_secs(auth.config().expiry_check_interval_secs);
    leptos::task::spawn_local(async move {
        loop {
            gloo_timers::future::sleep(interval).await;
            let Some(pending) = auth.refresh_if_expiring(unix_now_secs()) else {
                continue;
            };
            if let Err(err) = pending.await {
                log::warn!("proactive token refresh failed: {err}");
                if matches!(err, ClientError::RefreshFailed(_)) {
                    notice.set(Some(SESSION_EXPIRED_NOTICE.to_owned()));
                }
            }
        }
    });
}

#[cfg(feature = "csr")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unix_now_secs() -> u64 {
    (js_sys::Date::now() / 1000.0) as u64
}

//! Route guard wrapper.

use leptos::prelude::*;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_location;

use crate::app::use_session;
use crate::util::guard::{GuardDecision, decide, requested_path};

/// Render `children` only for an authenticated session whose role the route
/// table admits; otherwise redirect (to login with `?next=`, or home).
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let session = use_session();
    let location = use_location();
    let decision = Memo::new(move |_| {
        let requested = requested_path(&location.pathname.get(), &location.search.get());
        decide(&requested, &session.get())
    });

    move || match decision.get() {
        GuardDecision::Allow => children().into_any(),
        denied => {
            let target = denied.redirect_target().unwrap_or_default();
            view! { <Redirect path=target/> }.into_any()
        }
    }
}

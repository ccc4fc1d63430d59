use std::cell::Cell;
use std::rc::Rc;

use futures::executor::block_on;

use super::*;
use crate::net::fake_backend::{BASE, Harness};
use crate::net::http::Method;
use crate::state::events::AuthEvent;
use crate::state::session::AuthPhase;

fn get(path: &str) -> HttpRequest {
    HttpRequest::new(Method::Get, format!("{BASE}{path}"))
}

fn interceptor(h: &Harness) -> (AuthInterceptor, Rc<Cell<u32>>) {
    let failures = Rc::new(Cell::new(0));
    let counter = failures.clone();
    let interceptor = AuthInterceptor::new(h.auth.clone(), h.backend.clone())
        .with_failure_callback(move || counter.set(counter.get() + 1));
    (interceptor, failures)
}

#[test]
fn attaches_current_bearer_token() {
    let h = Harness::logged_in("student");
    let (api, _) = interceptor(&h);
    let resp = block_on(api.execute(get("/courses"))).unwrap();

    assert_eq!(resp.status, 200);
    let sent = h.backend.requests.borrow().last().cloned().unwrap();
    assert_eq!(sent.bearer(), Some("access-1"));
}

#[test]
fn replaces_stale_authorization_header() {
    let h = Harness::logged_in("student");
    let (api, _) = interceptor(&h);
    let request = get("/courses").with_bearer(Some("stale"));
    block_on(api.execute(request)).unwrap();

    let sent = h.backend.requests.borrow().last().cloned().unwrap();
    assert_eq!(sent.bearer(), Some("access-1"));
}

#[test]
fn non_auth_failures_pass_through() {
    let h = Harness::logged_in("student");
    let (api, _) = interceptor(&h);
    let resp = block_on(api.execute(get("/courses/99"))).unwrap();

    assert_eq!(resp.status, 404);
    assert_eq!(h.backend.refresh_calls.get(), 0);
}

#[test]
fn expired_token_is_refreshed_and_request_retried() {
    let h = Harness::logged_in("student");
    h.backend.expire_access();
    let (api, failures) = interceptor(&h);
    let resp = block_on(api.execute(get("/courses"))).unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(h.backend.refresh_calls.get(), 1);
    assert_eq!(h.backend.request_count(Method::Get, "/courses"), 2);
    let retried = h.backend.requests.borrow().last().cloned().unwrap();
    assert_eq!(retried.bearer(), Some("access-2"));
    assert_eq!(failures.get(), 0);
    assert_eq!(h.auth.phase(), AuthPhase::Authenticated);
}

#[test]
fn concurrent_401s_coalesce_into_one_refresh() {
    let h = Harness::logged_in("student");
    h.backend.expire_access();
    let (api, _) = interceptor(&h);
    let (courses, enrollments, tasks) = block_on(async {
        futures::join!(
            api.execute(get("/courses")),
            api.execute(get("/enrollments")),
            api.execute(get("/learning-tasks/course/1/"))
        )
    });

    assert_eq!(courses.unwrap().status, 200);
    assert_eq!(enrollments.unwrap().status, 200);
    assert_eq!(tasks.unwrap().status, 200);
    assert_eq!(h.backend.refresh_calls.get(), 1);
    assert_eq!(h.events_matching(|e| matches!(e, AuthEvent::TokenRefreshed { .. })), 1);
}

#[test]
fn request_that_raced_a_refresh_retries_without_refreshing_again() {
    let h = Harness::logged_in("student");
    h.backend.expire_access();
    let (api, _) = interceptor(&h);
    let (refreshed, resp) = block_on(async { futures::join!(h.auth.refresh(), api.execute(get("/courses"))) });

    assert_eq!(refreshed.unwrap(), "access-2");
    assert_eq!(resp.unwrap().status, 200);
    assert_eq!(h.backend.refresh_calls.get(), 1);
    assert_eq!(h.backend.request_count(Method::Get, "/courses"), 2);
}

#[test]
fn failed_refresh_invokes_callback_and_is_not_retried() {
    let h = Harness::logged_in("student");
    h.backend.expire_access();
    h.backend.revoke_refresh();
    let (api, failures) = interceptor(&h);
    let err = block_on(api.execute(get("/courses"))).unwrap_err();

    assert!(matches!(err, ClientError::RefreshFailed(_)));
    assert_eq!(failures.get(), 1);
    assert_eq!(h.backend.refresh_calls.get(), 1);
    assert_eq!(h.backend.request_count(Method::Get, "/courses"), 1);
    assert!(!h.auth.is_authenticated());
    assert!(h.storage.is_empty());
    assert_eq!(h.events_matching(|e| matches!(e, AuthEvent::AuthError { .. })), 1);
}

#[test]
fn concurrent_failures_publish_a_single_auth_error() {
    let h = Harness::logged_in("student");
    h.backend.expire_access();
    h.backend.revoke_refresh();
    let (api, failures) = interceptor(&h);
    let (a, b) = block_on(async { futures::join!(api.execute(get("/courses")), api.execute(get("/enrollments"))) });

    assert!(a.is_err());
    assert!(b.is_err());
    assert_eq!(h.backend.refresh_calls.get(), 1);
    assert_eq!(failures.get(), 2);
    assert_eq!(h.events_matching(|e| matches!(e, AuthEvent::AuthError { .. })), 1);
}

#[test]
fn unauthenticated_401_does_not_refresh() {
    let h = Harness::new();
    let (api, failures) = interceptor(&h);
    let err = block_on(api.execute(get("/courses"))).unwrap_err();

    assert_eq!(err, ClientError::NotAuthenticated);
    assert_eq!(h.backend.refresh_calls.get(), 0);
    assert_eq!(failures.get(), 0);
}

#[test]
fn second_401_after_refresh_is_not_authenticated() {
    let h = Harness::logged_in("student");
    h.backend.reject_bearer.set(true);
    let (api, _) = interceptor(&h);
    let err = block_on(api.execute(get("/courses"))).unwrap_err();

    assert_eq!(err, ClientError::NotAuthenticated);
    assert_eq!(h.backend.refresh_calls.get(), 1);
    assert_eq!(h.backend.request_count(Method::Get, "/courses"), 2);
}

#[test]
fn network_errors_are_not_retried() {
    let h = Harness::logged_in("student");
    h.backend.offline.set(true);
    let (api, _) = interceptor(&h);
    let err = block_on(api.execute(get("/courses"))).unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(h.backend.refresh_calls.get(), 0);
}

use super::*;
use crate::net::types::UserInfo;
use crate::state::session::AuthPhase;
use crate::state::token_store::StoredTokens;
use crate::net::types::Role;

fn session_for(role: Role) -> Session {
    let tokens = StoredTokens { access_token: "a".to_owned(), refresh_token: "r".to_owned() };
    let user = UserInfo { id: "1".to_owned(), username: "u".to_owned(), display_name: None, email: None, role };
    Session::restored(tokens, user)
}

// =============================================================
// decide
// =============================================================

#[test]
fn anonymous_profile_visit_redirects_to_login() {
    let decision = decide("/profile", &Session::default());
    assert_eq!(decision, GuardDecision::Login("/login?next=%2Fprofile".to_owned()));
}

#[test]
fn failed_login_state_is_not_authenticated() {
    let session = Session { phase: AuthPhase::Failed, error: Some("Login Failed".to_owned()), ..Session::default() };
    assert!(matches!(decide("/dashboard", &session), GuardDecision::Login(_)));
}

#[test]
fn authenticated_user_is_allowed() {
    assert_eq!(decide("/profile", &session_for(Role::Student)), GuardDecision::Allow);
}

#[test]
fn refreshing_session_is_still_allowed() {
    let mut session = session_for(Role::Student);
    assert!(session.begin_refresh());
    assert_eq!(decide("/courses", &session), GuardDecision::Allow);
}

#[test]
fn student_is_sent_home_from_instructor_views() {
    let decision = decide("/instructor", &session_for(Role::Student));
    assert_eq!(decision, GuardDecision::Home);
    assert_eq!(decision.redirect_target().as_deref(), Some("/dashboard"));
}

#[test]
fn instructor_and_admin_may_edit() {
    assert_eq!(decide("/courses/1/edit", &session_for(Role::Instructor)), GuardDecision::Allow);
    assert_eq!(decide("/courses/1/edit", &session_for(Role::Admin)), GuardDecision::Allow);
}

#[test]
fn role_requirement_ignores_query_string() {
    assert_eq!(decide("/instructor?tab=drafts", &session_for(Role::Student)), GuardDecision::Home);
    assert_eq!(decide("/courses/1/edit", &session_for(Role::Student)), GuardDecision::Home);
    assert_eq!(decide("/courses/1", &session_for(Role::Student)), GuardDecision::Allow);
}

#[test]
fn tokens_without_user_do_not_authenticate() {
    let session = Session {
        phase: AuthPhase::Authenticated,
        access_token: Some("a".to_owned()),
        refresh_token: Some("r".to_owned()),
        user: None,
        error: None,
    };
    assert!(matches!(decide("/dashboard", &session), GuardDecision::Login(_)));
}

// =============================================================
// Redirect targets
// =============================================================

#[test]
fn login_redirect_keeps_query_string() {
    assert_eq!(login_redirect_path("/courses?page=2"), "/login?next=%2Fcourses%3Fpage%3D2");
}

#[test]
fn login_redirect_drops_public_or_unknown_paths() {
    assert_eq!(login_redirect_path("/login"), "/login");
    assert_eq!(login_redirect_path("/nowhere"), "/login");
}

#[test]
fn post_login_target_round_trips_redirect() {
    let redirect = login_redirect_path("/courses/3/tasks");
    let next = redirect.strip_prefix("/login?next=").unwrap();
    assert_eq!(post_login_target(Some(next)), "/courses/3/tasks");
}

#[test]
fn post_login_target_accepts_decoded_value() {
    assert_eq!(post_login_target(Some("/profile")), "/profile");
}

#[test]
fn post_login_target_rejects_external_and_public_paths() {
    assert_eq!(post_login_target(None), "/dashboard");
    assert_eq!(post_login_target(Some("")), "/dashboard");
    assert_eq!(post_login_target(Some("https%3A%2F%2Fevil.example%2F")), "/dashboard");
    assert_eq!(post_login_target(Some("//evil.example/dashboard")), "/dashboard");
    assert_eq!(post_login_target(Some("/login")), "/dashboard");
    assert_eq!(post_login_target(Some("/")), "/dashboard");
}

#[test]
fn requested_path_joins_search() {
    assert_eq!(requested_path("/courses", ""), "/courses");
    assert_eq!(requested_path("/courses", "?page=2"), "/courses?page=2");
    assert_eq!(requested_path("/courses", "page=2"), "/courses?page=2");
}

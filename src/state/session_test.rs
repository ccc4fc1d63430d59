use super::*;

fn tokens() -> StoredTokens {
    StoredTokens { access_token: "a1".to_owned(), refresh_token: "r1".to_owned() }
}

fn user() -> UserInfo {
    UserInfo {
        id: "1".to_owned(),
        username: "instructor".to_owned(),
        display_name: None,
        email: None,
        role: Role::Instructor,
    }
}

fn authenticated() -> Session {
    let mut session = Session::default();
    session.begin_login().unwrap();
    session.complete_login(tokens(), user());
    session
}

#[test]
fn default_session_is_anonymous() {
    let session = Session::default();
    assert_eq!(session.phase, AuthPhase::Anonymous);
    assert!(!session.is_authenticated());
    assert_eq!(session.role(), None);
}

#[test]
fn login_success_authenticates() {
    let session = authenticated();
    assert_eq!(session.phase, AuthPhase::Authenticated);
    assert!(session.is_authenticated());
    assert_eq!(session.role(), Some(Role::Instructor));
    assert_eq!(session.access_token.as_deref(), Some("a1"));
}

#[test]
fn concurrent_login_rejected() {
    let mut session = Session::default();
    assert_eq!(session.begin_login(), Ok(AuthPhase::Anonymous));
    assert_eq!(session.begin_login(), Err(ClientError::LoginInProgress));
    assert_eq!(session.phase, AuthPhase::Authenticating);
}

#[test]
fn failed_login_keeps_session_empty() {
    let mut session = Session::default();
    session.begin_login().unwrap();
    session.fail_login("Login Failed: nope".to_owned());
    assert_eq!(session.phase, AuthPhase::Failed);
    assert!(!session.is_authenticated());
    assert!(session.access_token.is_none());
    assert!(session.user.is_none());
    assert_eq!(session.error.as_deref(), Some("Login Failed: nope"));
}

#[test]
fn login_allowed_again_after_failure() {
    let mut session = Session::default();
    session.begin_login().unwrap();
    session.fail_login("x".to_owned());
    assert_eq!(session.begin_login(), Ok(AuthPhase::Failed));
    assert!(session.error.is_none());
}

#[test]
fn refreshing_still_counts_as_authenticated() {
    let mut session = authenticated();
    assert!(session.begin_refresh());
    assert_eq!(session.phase, AuthPhase::Refreshing);
    assert!(session.is_authenticated());
}

#[test]
fn begin_refresh_requires_session() {
    let mut session = Session::default();
    assert!(!session.begin_refresh());
    assert_eq!(session.phase, AuthPhase::Anonymous);
}

#[test]
fn complete_refresh_keeps_refresh_token_unless_rotated() {
    let mut session = authenticated();
    session.begin_refresh();
    session.complete_refresh("a2".to_owned(), None);
    assert_eq!(session.phase, AuthPhase::Authenticated);
    assert_eq!(session.access_token.as_deref(), Some("a2"));
    assert_eq!(session.refresh_token.as_deref(), Some("r1"));

    session.begin_refresh();
    session.complete_refresh("a3".to_owned(), Some("r2".to_owned()));
    assert_eq!(session.refresh_token.as_deref(), Some("r2"));
}

#[test]
fn clear_resets_everything() {
    let mut session = authenticated();
    session.clear();
    assert_eq!(session, Session::default());
}

#[test]
fn authenticated_phase_without_user_is_not_authenticated() {
    let session = Session { phase: AuthPhase::Authenticated, access_token: Some("a".to_owned()), ..Session::default() };
    assert!(!session.is_authenticated());
}

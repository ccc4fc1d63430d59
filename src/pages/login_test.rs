use futures::executor::block_on;

use super::*;
use crate::net::fake_backend::Harness;

#[test]
fn invalid_credentials_message_mentions_login_failed() {
    let text = login_error_text(&ClientError::InvalidCredentials);
    assert!(text.contains("Login Failed"));
    assert!(text.contains("Invalid username or password."));
}

#[test]
fn network_failure_message_mentions_login_failed() {
    let text = login_error_text(&ClientError::Network("refused".to_owned()));
    assert!(text.starts_with("Login Failed"));
}

#[test]
fn submit_needs_both_fields_and_idle_form() {
    assert!(can_submit("instructor", "instructor123", false));
    assert!(!can_submit("  ", "instructor123", false));
    assert!(!can_submit("instructor", "", false));
    assert!(!can_submit("instructor", "instructor123", true));
}

#[test]
fn backend_rejection_is_read_from_session() {
    let h = Harness::new();
    let err = block_on(h.auth.login("invalid_user", "wrong_password")).unwrap_err();
    assert_eq!(err, ClientError::InvalidCredentials);

    let alert = login_alert(None, &h.auth.session()).unwrap();
    assert!(alert.starts_with("Login Failed"));
}

#[test]
fn local_rejection_wins_over_session() {
    let h = Harness::new();
    let err = block_on(h.auth.login("   ", "x")).unwrap_err();
    assert!(h.auth.session().error.is_none());

    let local = login_error_text(&err);
    assert_eq!(login_alert(Some(&local), &h.auth.session()), Some(local));
}

#[test]
fn no_alert_before_any_attempt() {
    assert_eq!(login_alert(None, &Session::default()), None);
}

use super::*;

#[test]
fn with_bearer_replaces_existing_authorization() {
    let req = HttpRequest::new(Method::Get, "http://api.test/courses")
        .with_bearer(Some("old"))
        .with_bearer(Some("new"));
    assert_eq!(req.bearer(), Some("new"));
    assert_eq!(req.headers.len(), 1);
}

#[test]
fn with_bearer_none_strips_header() {
    let req = HttpRequest::new(Method::Get, "http://api.test/courses")
        .with_bearer(Some("tok"))
        .with_bearer(None);
    assert_eq!(req.bearer(), None);
    assert!(req.headers.is_empty());
}

#[test]
fn json_sets_body_and_content_type() {
    let req = HttpRequest::new(Method::Post, "http://api.test/auth/login")
        .json(&serde_json::json!({ "identifier": "a" }))
        .unwrap();
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.body.as_deref(), Some(r#"{"identifier":"a"}"#));
}

#[test]
fn response_message_prefers_detail() {
    let body = r#"{"detail": "You are already enrolled in this course.", "error": "x"}"#;
    assert_eq!(response_message(body).as_deref(), Some("You are already enrolled in this course."));
}

#[test]
fn response_message_reads_field_errors() {
    let body = r#"{"title": ["This field is required."]}"#;
    assert_eq!(response_message(body).as_deref(), Some("title: This field is required."));
}

#[test]
fn response_message_non_json_is_none() {
    assert_eq!(response_message("<html>502</html>"), None);
}

#[test]
fn into_error_maps_statuses() {
    assert_eq!(
        HttpResponse::new(400, r#"{"detail":"bad"}"#).into_error("Course"),
        ClientError::Validation("bad".to_owned())
    );
    assert_eq!(HttpResponse::new(401, "").into_error("Course"), ClientError::TokenExpired);
    assert!(matches!(HttpResponse::new(403, "").into_error("Course"), ClientError::Forbidden(_)));
    assert_eq!(
        HttpResponse::new(404, "").into_error("Course"),
        ClientError::NotFound("Course".to_owned())
    );
    assert_eq!(
        HttpResponse::new(503, r#"{"error":"down"}"#).into_error("Course"),
        ClientError::Http { status: 503, message: "down".to_owned() }
    );
}

#[test]
fn offline_transport_fails_as_network_error() {
    let result = futures::executor::block_on(
        OfflineTransport.send(HttpRequest::new(Method::Get, "http://api.test/courses")),
    );
    assert!(matches!(result, Err(ClientError::Network(_))));
}

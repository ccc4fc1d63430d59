use super::*;

#[test]
fn badge_combines_status_and_visibility() {
    let course = Course {
        id: "1".to_owned(),
        title: "Rust 101".to_owned(),
        description: String::new(),
        status: CourseStatus::Published,
        visibility: Visibility::Private,
        instructor: None,
    };
    assert_eq!(status_badge(&course), "Published · Private");
}

#[test]
fn only_editors_get_edit_link() {
    assert!(can_edit(Some(Role::Instructor)));
    assert!(can_edit(Some(Role::Admin)));
    assert!(!can_edit(Some(Role::Student)));
    assert!(!can_edit(None));
}

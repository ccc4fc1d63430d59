use super::*;

#[test]
fn parses_every_route() {
    let cases = [
        ("/", AppRoute::Root),
        ("/login", AppRoute::Login),
        ("/register", AppRoute::Register),
        ("/dashboard", AppRoute::Dashboard),
        ("/profile", AppRoute::Profile),
        ("/courses", AppRoute::Courses),
        ("/courses/4", AppRoute::CourseDetail("4".to_owned())),
        ("/courses/4/edit", AppRoute::CourseEdit("4".to_owned())),
        ("/courses/4/tasks", AppRoute::CourseTasks("4".to_owned())),
        ("/progress-tracking/9", AppRoute::ProgressTracking("9".to_owned())),
        ("/instructor", AppRoute::Instructor),
    ];
    for (path, route) in cases {
        assert_eq!(AppRoute::parse(path), Some(route.clone()), "{path}");
        assert_eq!(route.path(), path);
    }
}

#[test]
fn ignores_query_and_trailing_slash() {
    assert_eq!(AppRoute::parse("/courses/?page=2"), Some(AppRoute::Courses));
    assert_eq!(AppRoute::parse("/profile#top"), Some(AppRoute::Profile));
}

#[test]
fn rejects_unknown_and_relative_paths() {
    assert_eq!(AppRoute::parse("/admin"), None);
    assert_eq!(AppRoute::parse("/courses/1/delete"), None);
    assert_eq!(AppRoute::parse("dashboard"), None);
    assert_eq!(AppRoute::parse("https://evil.example/dashboard"), None);
}

#[test]
fn only_auth_views_are_public() {
    assert!(!AppRoute::Login.is_protected());
    assert!(!AppRoute::Register.is_protected());
    assert!(AppRoute::Profile.is_protected());
    assert!(AppRoute::CourseDetail("1".to_owned()).is_protected());
}

#[test]
fn editing_views_require_instructor_or_admin() {
    assert_eq!(AppRoute::Instructor.required_roles(), COURSE_EDITORS);
    assert_eq!(AppRoute::CourseEdit("1".to_owned()).required_roles(), COURSE_EDITORS);
    assert!(AppRoute::Courses.required_roles().is_empty());
}

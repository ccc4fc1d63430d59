use super::*;
use crate::net::types::Visibility;

fn course(id: &str, status: CourseStatus) -> Course {
    Course {
        id: id.to_owned(),
        title: format!("Course {id}"),
        description: String::new(),
        status,
        visibility: Visibility::Private,
        instructor: None,
    }
}

#[test]
fn counts_split_by_status() {
    let courses = [
        course("1", CourseStatus::Published),
        course("2", CourseStatus::Draft),
        course("3", CourseStatus::Draft),
        course("4", CourseStatus::Archived),
    ];
    let counts = course_counts(&courses);
    assert_eq!(counts, CourseCounts { total: 4, published: 1, drafts: 2 });
    assert_eq!(counts_text(counts), "4 courses · 1 published · 2 drafts");
}

#[test]
fn empty_list_counts_zero() {
    assert_eq!(course_counts(&[]), CourseCounts::default());
}

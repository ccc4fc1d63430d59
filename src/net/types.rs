//! Wire DTOs for the learning-platform REST backend.
//!
//! DESIGN
//! ======
//! The backend is loose about shapes: ids arrive as numbers or strings, list
//! endpoints may or may not be paginated, and the progress endpoint has a
//! legacy bare-array form. Each of those is decoded here into a tagged type so
//! pages only ever see one canonical shape.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Account role as reported by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl Role {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Instructor => "Instructor",
            Self::Admin => "Admin",
        }
    }

    /// Instructors and admins may author course content.
    #[must_use]
    pub fn can_edit_courses(self) -> bool {
        matches!(self, Self::Instructor | Self::Admin)
    }
}

/// Snapshot of the logged-in user returned at login. Replaced wholesale, never patched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub username: String,
    #[serde(default, alias = "full_name")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserInfo {
    /// Display name when set and non-blank, otherwise the username.
    #[must_use]
    pub fn display_label(&self) -> &str {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access")]
    pub access_token: String,
    #[serde(alias = "refresh")]
    pub refresh_token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    #[serde(alias = "access")]
    pub access_token: String,
    /// Present when the backend rotates refresh tokens.
    #[serde(default, alias = "refresh")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub role: Role,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl CourseStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "private" => Some(Self::Private),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, alias = "creator_name")]
    pub instructor: Option<String>,
}

/// Body of `PUT /courses/:id`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourseUpdate {
    pub title: String,
    pub description: String,
    pub status: CourseStatus,
    pub visibility: Visibility,
}

/// Enrollment status of the user for one course.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    InProgress,
    Completed,
    Dropped,
    Closed,
    #[default]
    NotEnrolled,
    #[serde(other)]
    Other,
}

impl EnrollmentStatus {
    /// Only `active` and `in_progress` count as enrolled.
    #[must_use]
    pub fn is_enrolled(self) -> bool {
        matches!(self, Self::Active | Self::InProgress)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Enrollment {
    #[serde(deserialize_with = "deserialize_id")]
    pub course: String,
    #[serde(default)]
    pub status: EnrollmentStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EnrollResponse {
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LearningTask {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
}

/// A list endpoint response: DRF-paginated (`{results: [...]}`) or a bare array.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListPayload<T> {
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Paged { results: items } => items,
        }
    }
}

// =============================================================
// Progress
// =============================================================

/// Aggregate progress across all of a student's courses.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct OverallStats {
    #[serde(default, alias = "total_courses")]
    pub courses_enrolled: Option<u32>,
    #[serde(default, alias = "completed_courses")]
    pub courses_completed: Option<u32>,
    #[serde(default, alias = "overall_completion")]
    pub completion_percentage: Option<f64>,
    #[serde(default)]
    pub total_tasks: Option<u32>,
    #[serde(default, alias = "total_tasks_completed")]
    pub completed_tasks: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProgressSummary {
    #[serde(default)]
    pub completion_percentage: Option<f64>,
    #[serde(default)]
    pub completed_tasks: Option<u32>,
    #[serde(default)]
    pub total_tasks: Option<u32>,
}

/// Progress for one course. Accepts both the flat and the nested
/// (`progress_summary`) shapes.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "RawCourseProgress")]
pub struct CourseProgress {
    pub id: Option<String>,
    pub label: Option<String>,
    pub course_name: Option<String>,
    pub percentage: Option<f64>,
    pub completed_tasks: Option<u32>,
    pub total_tasks: Option<u32>,
    pub progress_summary: Option<ProgressSummary>,
    pub last_activity: Option<String>,
    pub enrollment_status: Option<EnrollmentStatus>,
}

/// Wire form of [`CourseProgress`]. Frontend and backend spellings are
/// separate fields so a record carrying both never trips serde's
/// duplicate-field check; the backend spelling wins.
#[derive(Deserialize)]
struct RawCourseProgress {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    course_id: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    course_title: Option<String>,
    #[serde(default)]
    percentage: Option<f64>,
    #[serde(default)]
    completed_tasks: Option<u32>,
    #[serde(default)]
    total_tasks: Option<u32>,
    #[serde(default)]
    progress_summary: Option<ProgressSummary>,
    #[serde(default)]
    last_activity: Option<String>,
    #[serde(default)]
    last_access: Option<String>,
    #[serde(default)]
    enrollment_status: Option<EnrollmentStatus>,
}

impl From<RawCourseProgress> for CourseProgress {
    fn from(raw: RawCourseProgress) -> Self {
        Self {
            id: raw.course_id.or(raw.id),
            label: raw.label,
            course_name: raw.course_title.or(raw.course_name),
            percentage: raw.percentage,
            completed_tasks: raw.completed_tasks,
            total_tasks: raw.total_tasks,
            progress_summary: raw.progress_summary,
            last_activity: raw.last_access.or(raw.last_activity),
            enrollment_status: raw.enrollment_status,
        }
    }
}

impl CourseProgress {
    /// Card title; falls back to a positional name.
    #[must_use]
    pub fn title(&self, index: usize) -> String {
        self.label
            .clone()
            .or_else(|| self.course_name.clone())
            .unwrap_or_else(|| format!("Course {}", index + 1))
    }

    #[must_use]
    pub fn key(&self, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("progress-{index}"))
    }

    #[must_use]
    pub fn completion(&self) -> f64 {
        self.percentage
            .or_else(|| self.progress_summary.as_ref().and_then(|s| s.completion_percentage))
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn tasks(&self) -> (u32, u32) {
        let summary = self.progress_summary.as_ref();
        let done = self.completed_tasks.or_else(|| summary.and_then(|s| s.completed_tasks));
        let total = self.total_tasks.or_else(|| summary.and_then(|s| s.total_tasks));
        (done.unwrap_or(0), total.unwrap_or(0))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct StructuredProgress {
    #[serde(default)]
    pub user_info: Option<UserInfo>,
    #[serde(default)]
    pub overall_stats: OverallStats,
    #[serde(default, deserialize_with = "deserialize_lenient_list")]
    pub courses: Vec<CourseProgress>,
}

/// Raw `GET /api/v1/students/progress/` body.
///
/// An array is the legacy form, an object the structured one. Both decode
/// their course lists leniently: a malformed entry is skipped, never fatal.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressPayload {
    Legacy(Vec<CourseProgress>),
    Structured(StructuredProgress),
}

impl<'de> Deserialize<'de> for ProgressPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Array(items) => Ok(Self::Legacy(lenient_courses(items))),
            value @ serde_json::Value::Object(_) => {
                serde_json::from_value(value).map(Self::Structured).map_err(D::Error::custom)
            }
            other => Err(D::Error::custom(format!("progress payload must be an array or object, got {other}"))),
        }
    }
}

/// Canonical progress shape rendered by the dashboard and progress pages.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressReport {
    pub user: UserInfo,
    pub stats: OverallStats,
    pub courses: Vec<CourseProgress>,
}

/// Collapse either payload form into one [`ProgressReport`].
///
/// `fallback_user` fills in `user_info` for the legacy form (and for a
/// structured payload that omits it).
#[must_use]
pub fn normalize_progress(payload: ProgressPayload, fallback_user: &UserInfo) -> ProgressReport {
    match payload {
        ProgressPayload::Legacy(courses) => {
            log::warn!("received legacy array progress payload; adapting ({} courses)", courses.len());
            let mut user = fallback_user.clone();
            user.display_name = Some(fallback_user.display_label().to_owned());
            let stats = OverallStats {
                courses_enrolled: Some(u32::try_from(courses.len()).unwrap_or(u32::MAX)),
                completion_percentage: Some(average_completion(&courses)),
                ..OverallStats::default()
            };
            ProgressReport { user, stats, courses }
        }
        ProgressPayload::Structured(progress) => ProgressReport {
            user: progress.user_info.unwrap_or_else(|| fallback_user.clone()),
            stats: progress.overall_stats,
            courses: progress.courses,
        },
    }
}

/// Mean completion across courses, rounded to a whole percent. Empty input is 0.
#[must_use]
pub fn average_completion(courses: &[CourseProgress]) -> f64 {
    if courses.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = courses.len() as f64;
    let sum: f64 = courses.iter().map(CourseProgress::completion).sum();
    (sum / count).round()
}

// =============================================================
// Lenient decoders
// =============================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Int(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = String::from(RawId::deserialize(deserializer)?);
    if id.is_empty() {
        return Err(D::Error::custom("empty id"));
    }
    Ok(id)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// Accept a list, skipping malformed entries; anything that is not an array
/// becomes empty.
fn deserialize_lenient_list<'de, D>(deserializer: D) -> Result<Vec<CourseProgress>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        log::error!("expected courses array in progress payload");
        return Ok(Vec::new());
    };
    Ok(lenient_courses(items))
}

fn lenient_courses(items: Vec<serde_json::Value>) -> Vec<CourseProgress> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<CourseProgress>(item) {
            Ok(course) => Some(course),
            Err(err) => {
                log::warn!("skipping malformed course progress entry: {err}");
                None
            }
        })
        .collect()
}

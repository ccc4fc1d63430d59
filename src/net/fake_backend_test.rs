//! Scripted in-memory backend shared by the auth, interceptor and API tests.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::error::ClientError;
use super::http::{HttpRequest, HttpResponse, Method, Transport};
use crate::config::ClientConfig;
use crate::state::auth::AuthContext;
use crate::state::events::{AuthEvent, AuthEventBus, Subscription};
use crate::state::token_store::{MemoryStorage, TokenStore};

pub const BASE: &str = "http://api.test";

/// Resolves on the second poll so concurrent sends interleave under `join!`.
struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub struct FakeBackend {
    /// Access token the backend currently accepts. Empty means none.
    pub valid_access: RefCell<String>,
    pub valid_refresh: RefCell<String>,
    pub rotate_refresh: Cell<bool>,
    pub refresh_calls: Cell<u32>,
    pub issued: Cell<u32>,
    pub offline: Cell<bool>,
    /// Reject every bearer token, even freshly issued ones.
    pub reject_bearer: Cell<bool>,
    pub enroll_fails: Cell<bool>,
    pub progress_body: RefCell<String>,
    pub enrollments: RefCell<Vec<(String, String)>>,
    pub requests: RefCell<Vec<HttpRequest>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            valid_access: RefCell::new(String::new()),
            valid_refresh: RefCell::new(String::new()),
            rotate_refresh: Cell::new(false),
            refresh_calls: Cell::new(0),
            issued: Cell::new(0),
            offline: Cell::new(false),
            reject_bearer: Cell::new(false),
            enroll_fails: Cell::new(false),
            progress_body: RefCell::new(
                json!({
                    "user_info": {"id": 2, "username": "student", "role": "student"},
                    "overall_stats": {"courses_enrolled": 1, "completion_percentage": 50.0},
                    "courses": [{"id": 1, "label": "Rust 101", "percentage": 50.0}]
                })
                .to_string(),
            ),
            enrollments: RefCell::new(vec![("1".to_owned(), "active".to_owned())]),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Invalidate the current access token so the next API call sees a 401.
    pub fn expire_access(&self) {
        self.valid_access.borrow_mut().clear();
    }

    pub fn revoke_refresh(&self) {
        self.valid_refresh.borrow_mut().clear();
    }

    pub fn request_count(&self, method: Method, path: &str) -> usize {
        let url = format!("{BASE}{path}");
        self.requests.borrow().iter().filter(|r| r.method == method && r.url == url).count()
    }

    fn issue_access(&self) -> String {
        let n = self.issued.get() + 1;
        self.issued.set(n);
        let token = format!("access-{n}");
        *self.valid_access.borrow_mut() = token.clone();
        token
    }

    fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let path = request.url.strip_prefix(BASE).unwrap_or(&request.url);
        let body: Value = request.body.as_deref().and_then(|b| serde_json::from_str(b).ok()).unwrap_or(Value::Null);

        match (request.method, path) {
            (Method::Post, "/auth/login") => return self.login(&body),
            (Method::Post, "/auth/refresh") => return self.refresh(&body),
            (Method::Post, "/auth/register") => return register(&body),
            _ => {}
        }

        let authorized = !self.reject_bearer.get()
            && request.bearer().is_some_and(|t| !t.is_empty() && t == self.valid_access.borrow().as_str());
        if !authorized {
            return reply(401, &json!({"detail": "Given token not valid for any token type"}));
        }

        match (request.method, path) {
            (Method::Post, "/auth/logout") => HttpResponse::new(205, ""),
            (Method::Get, "/auth/profile") => reply(200, &user_json("student")),
            (Method::Get, "/courses") => reply(200, &json!({"count": 3, "results": courses_json()})),
            (Method::Get, "/courses/1") => reply(200, &courses_json()[0]),
            (Method::Get, "/courses/99") => reply(404, &json!({"detail": "Not found."})),
            (Method::Put, "/courses/1") => {
                let mut course = body.clone();
                course["id"] = json!(1);
                reply(200, &course)
            }
            (Method::Get, "/enrollments") => {
                let list: Vec<Value> = self
                    .enrollments
                    .borrow()
                    .iter()
                    .map(|(course, status)| json!({"course": course, "status": status}))
                    .collect();
                reply(200, &Value::Array(list))
            }
            (Method::Get, "/api/v1/students/progress/") => HttpResponse::new(200, self.progress_body.borrow().clone()),
            (Method::Get, "/api/v1/students/7/progress/") => reply(
                200,
                &json!({
                    "user_info": {"id": 7, "username": "pupil", "role": "student"},
                    "overall_stats": {"total_courses": 2, "overall_completion": 25.0},
                    "courses": []
                }),
            ),
            (Method::Get, "/learning-tasks/course/1/") => reply(
                200,
                &json!([
                    {"id": 11, "title": "Ownership", "description": "Moves and borrows", "order": 1},
                    {"id": 12, "title": "Traits", "order": 2}
                ]),
            ),
            (Method::Get, "/courses/instructor/courses/") => reply(200, &json!({"results": [courses_json()[0].clone()]})),
            (Method::Post, enroll) if enroll.starts_with("/courses/") && enroll.ends_with("/enroll") => {
                if self.enroll_fails.get() {
                    return reply(500, &json!({"error": "database unavailable"}));
                }
                let id = enroll.trim_start_matches("/courses/").trim_end_matches("/enroll").to_owned();
                self.enrollments.borrow_mut().push((id, "active".to_owned()));
                reply(201, &json!({"detail": "Successfully enrolled in the course."}))
            }
            _ => reply(404, &json!({"detail": "Not found."})),
        }
    }

    fn login(&self, body: &Value) -> HttpResponse {
        let identifier = body["identifier"].as_str().unwrap_or_default();
        let password = body["password"].as_str().unwrap_or_default();
        let role = match (identifier, password) {
            ("instructor", "instructor123") => "instructor",
            ("student", "student123") => "student",
            ("admin", "adminpassword") => "admin",
            _ => return reply(401, &json!({"detail": "No active account found with the given credentials"})),
        };
        let access = self.issue_access();
        *self.valid_refresh.borrow_mut() = "refresh-1".to_owned();
        reply(200, &json!({"access": access, "refresh": "refresh-1", "user": user_json(role)}))
    }

    fn refresh(&self, body: &Value) -> HttpResponse {
        self.refresh_calls.set(self.refresh_calls.get() + 1);
        let presented = body["refresh_token"].as_str().unwrap_or_default();
        let valid = self.valid_refresh.borrow().clone();
        if valid.is_empty() || presented != valid {
            return reply(401, &json!({"detail": "Token is blacklisted"}));
        }
        let access = self.issue_access();
        if self.rotate_refresh.get() {
            let rotated = format!("refresh-{}", self.issued.get());
            *self.valid_refresh.borrow_mut() = rotated.clone();
            reply(200, &json!({"access": access, "refresh": rotated}))
        } else {
            reply(200, &json!({"access_token": access}))
        }
    }
}

#[async_trait(?Send)]
impl Transport for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        YieldNow(false).await;
        self.requests.borrow_mut().push(request.clone());
        if self.offline.get() {
            return Err(ClientError::Network("connection refused".to_owned()));
        }
        Ok(self.handle(&request))
    }
}

fn reply(status: u16, body: &Value) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}

fn register(body: &Value) -> HttpResponse {
    if body["username"] == "instructor" {
        return reply(400, &json!({"username": ["A user with that username already exists."]}));
    }
    reply(201, &json!({"id": 40, "username": body["username"], "role": body["role"]}))
}

pub fn user_json(role: &str) -> Value {
    let id = match role {
        "instructor" => 1,
        "admin" => 3,
        _ => 2,
    };
    json!({"id": id, "username": role, "full_name": format!("{role} user"), "email": format!("{role}@example.com"), "role": role})
}

fn courses_json() -> Vec<Value> {
    vec![
        json!({"id": 1, "title": "Rust 101", "description": "Intro", "status": "published", "visibility": "public", "creator_name": "instructor"}),
        json!({"id": 2, "title": "Async Rust", "status": "published", "visibility": "public"}),
        json!({"id": 3, "title": "Unsafe Rust", "status": "draft", "visibility": "private"}),
    ]
}

/// Auth context over a fake backend and in-memory storage, plus a recorder
/// of every published event.
pub struct Harness {
    pub backend: Rc<FakeBackend>,
    pub storage: Rc<MemoryStorage>,
    pub events: AuthEventBus,
    pub auth: AuthContext,
    pub log: Rc<RefCell<Vec<AuthEvent>>>,
    _recorder: Subscription,
}

impl Harness {
    pub fn new() -> Self {
        let backend = FakeBackend::new();
        let storage = Rc::new(MemoryStorage::new());
        let events = AuthEventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let recorder = events.subscribe(move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });
        let auth = AuthContext::new(config(), backend.clone(), TokenStore::new(storage.clone()), events.clone());
        Self { backend, storage, events, auth, log, _recorder: recorder }
    }

    pub fn logged_in(role: &str) -> Self {
        let harness = Self::new();
        let password = match role {
            "instructor" => "instructor123",
            "admin" => "adminpassword",
            _ => "student123",
        };
        futures::executor::block_on(harness.auth.login(role, password)).expect("login succeeds");
        harness.log.borrow_mut().clear();
        harness
    }

    pub fn store(&self) -> TokenStore {
        TokenStore::new(self.storage.clone())
    }

    /// A fresh context over the same storage, as after a page reload.
    pub fn reload(&self) -> AuthContext {
        AuthContext::new(config(), self.backend.clone(), self.store(), AuthEventBus::new())
    }

    pub fn events_matching(&self, pred: impl Fn(&AuthEvent) -> bool) -> usize {
        self.log.borrow().iter().filter(|e| pred(e)).count()
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::from_values(Some(BASE), None, None)
}

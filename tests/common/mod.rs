//! In-process stand-in for the to-do REST API, served by actix-web on a random local port.
//! Every request is recorded so tests can assert on what the client actually sent.

#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use actix_web::{rt, web, App, HttpRequest, HttpResponse, HttpServer};
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

use todo_client::api::ApiClient;
use todo_client::models::{Session, Task, TaskId, User};
use todo_client::storage::{MemoryStore, SessionStore};

pub const TOKEN: &str = "tok-alice";
pub const CSRF: &str = "csrf-abc";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub csrf: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub tasks: Vec<Task>,
    pub next_id: TaskId,
    pub requests: Vec<Recorded>,
    /// Answer every authorized endpoint with 401.
    pub revoked: bool,
    /// Answer `GET /api/todos/` with 500.
    pub fail_list: bool,
    /// Answer `POST /api/todos/` with 500.
    pub fail_create: bool,
    /// Answer `POST /api/todos/clear_completed/` with 500.
    pub fail_clear: bool,
    /// Value the server stores on PUT instead of the one sent.
    pub force_completed: Option<bool>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub state: Shared,
    pub base_url: Url,
    handle: ServerHandle,
}

impl MockServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState {
            next_id: 1,
            ..MockState::default()
        }));

        let data = web::Data::new(state.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/api/login/", web::post().to(login))
                .route("/api/register/", web::post().to(register))
                .route("/api/logout/", web::post().to(logout))
                .route("/api/todos/clear_completed/", web::post().to(clear_completed))
                .route("/api/todos/", web::get().to(list_tasks))
                .route("/api/todos/", web::post().to(create_task))
                .route("/api/todos/{id}/", web::put().to(update_task))
                .route("/api/todos/{id}/", web::delete().to(delete_task))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("Failed to bind mock server");

        let port = server.addrs()[0].port();
        let server = server.run();
        let handle = server.handle();
        rt::spawn(server);

        Self {
            state,
            base_url: Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap(),
            handle,
        }
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone(), Some(CSRF.to_string()))
    }

    pub fn seed(&self, title: &str, completed: bool, day: u32) -> Task {
        let mut state = self.state.lock().unwrap();
        let task = Task {
            id: state.next_id,
            title: title.to_string(),
            completed,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        };
        state.next_id += 1;
        state.tasks.push(task.clone());
        task
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn server_tasks(&self) -> Vec<Task> {
        self.state.lock().unwrap().tasks.clone()
    }

    pub fn set(&self, update: impl FnOnce(&mut MockState)) {
        update(&mut self.state.lock().unwrap());
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

pub fn signed_in_store() -> SessionStore<MemoryStore> {
    let mut sessions = SessionStore::new(MemoryStore::default());
    sessions
        .save(&Session {
            token: TOKEN.to_string(),
            user: User {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        })
        .unwrap();
    sessions
}

fn record(state: &Shared, req: &HttpRequest) {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.lock().unwrap().requests.push(Recorded {
        method: req.method().to_string(),
        path: req.path().to_string(),
        authorization: header("Authorization"),
        csrf: header("X-CSRFToken"),
    });
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "detail": "Invalid token." }))
}

/// Records the request and checks its token. `Err` carries the 401 to return.
fn authorize(state: &Shared, req: &HttpRequest) -> Result<(), HttpResponse> {
    record(state, req);
    let revoked = state.lock().unwrap().revoked;
    let expected = format!("Token {}", TOKEN);
    let sent = req.headers().get("Authorization").and_then(|v| v.to_str().ok());
    if revoked || sent != Some(expected.as_str()) {
        return Err(unauthorized());
    }
    Ok(())
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(
    state: web::Data<Shared>,
    req: HttpRequest,
    body: web::Json<Credentials>,
) -> HttpResponse {
    record(&state, &req);
    match (body.username.as_str(), body.password.as_str()) {
        ("alice", "secret") => HttpResponse::Ok().json(json!({
            "token": TOKEN,
            "user": { "username": "alice", "email": "alice@example.com" }
        })),
        // Success status with an error payload
        ("disabled", _) => HttpResponse::Ok().json(json!({ "error": "Account disabled" })),
        ("locked", _) => HttpResponse::Unauthorized().json(json!({ "error": "Account locked" })),
        ("silent", _) => HttpResponse::BadRequest().finish(),
        _ => HttpResponse::BadRequest().json(json!({ "error": "Invalid credentials" })),
    }
}

#[derive(Deserialize)]
struct Registration {
    username: String,
    email: String,
    password: String,
    password_confirm: String,
}

async fn register(
    state: web::Data<Shared>,
    req: HttpRequest,
    body: web::Json<Registration>,
) -> HttpResponse {
    record(&state, &req);
    if body.password != body.password_confirm {
        return HttpResponse::BadRequest()
            .json(json!({ "non_field_errors": ["Passwords don't match."] }));
    }
    if body.username == "conflict" {
        return HttpResponse::BadRequest().json(json!({
            "non_field_errors": ["Registration is closed.", "Try again later."]
        }));
    }
    if body.username == "broken" {
        return HttpResponse::InternalServerError()
            .content_type("text/html")
            .body("<h1>Server Error (500)</h1>");
    }
    if body.username == "odd" {
        return HttpResponse::BadRequest().json(json!({ "captcha": ["Required."] }));
    }
    if body.username == "taken" {
        return HttpResponse::BadRequest().json(json!({
            "username": ["A user with that username already exists."],
            "email": ["Enter a valid email address."]
        }));
    }
    if !body.email.contains('@') {
        return HttpResponse::BadRequest()
            .json(json!({ "email": ["Enter a valid email address."] }));
    }
    if body.password.len() < 8 {
        return HttpResponse::BadRequest().json(json!({
            "password": ["This password is too short.", "It must contain at least 8 characters."]
        }));
    }
    HttpResponse::Created().json(json!({ "username": body.username, "email": body.email }))
}

async fn logout(state: web::Data<Shared>, req: HttpRequest) -> HttpResponse {
    if let Err(resp) = authorize(&state, &req) {
        return resp;
    }
    HttpResponse::Ok().json(json!({ "message": "Successfully logged out." }))
}

async fn list_tasks(state: web::Data<Shared>, req: HttpRequest) -> HttpResponse {
    if let Err(resp) = authorize(&state, &req) {
        return resp;
    }
    let state = state.lock().unwrap();
    if state.fail_list {
        return HttpResponse::InternalServerError().finish();
    }
    let mut tasks = state.tasks.clone();
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    HttpResponse::Ok().json(tasks)
}

#[derive(Deserialize)]
struct NewTask {
    title: String,
    completed: bool,
}

async fn create_task(
    state: web::Data<Shared>,
    req: HttpRequest,
    body: web::Json<NewTask>,
) -> HttpResponse {
    if let Err(resp) = authorize(&state, &req) {
        return resp;
    }
    let mut state = state.lock().unwrap();
    if state.fail_create {
        return HttpResponse::InternalServerError().json(json!({ "detail": "Database unavailable" }));
    }
    // Every new task is one day younger than the newest existing one.
    let newest = state
        .tasks
        .iter()
        .map(|t| t.created_at)
        .max()
        .unwrap_or_else(|| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let created_at: DateTime<Utc> = newest + Duration::days(1);
    let task = Task {
        id: state.next_id,
        title: body.title.clone(),
        completed: body.completed,
        created_at,
    };
    state.next_id += 1;
    state.tasks.push(task.clone());
    HttpResponse::Created().json(task)
}

async fn update_task(
    state: web::Data<Shared>,
    req: HttpRequest,
    path: web::Path<TaskId>,
    body: web::Json<Task>,
) -> HttpResponse {
    if let Err(resp) = authorize(&state, &req) {
        return resp;
    }
    let id = path.into_inner();
    let mut state = state.lock().unwrap();
    let forced = state.force_completed;
    match state.tasks.iter_mut().find(|t| t.id == id) {
        Some(task) => {
            task.title = body.title.clone();
            task.completed = forced.unwrap_or(body.completed);
            HttpResponse::Ok().json(task.clone())
        }
        None => HttpResponse::NotFound().json(json!({ "detail": "Not found." })),
    }
}

async fn delete_task(
    state: web::Data<Shared>,
    req: HttpRequest,
    path: web::Path<TaskId>,
) -> HttpResponse {
    if let Err(resp) = authorize(&state, &req) {
        return resp;
    }
    let id = path.into_inner();
    let mut state = state.lock().unwrap();
    let before = state.tasks.len();
    state.tasks.retain(|t| t.id != id);
    if state.tasks.len() == before {
        return HttpResponse::NotFound().json(json!({ "detail": "Not found." }));
    }
    HttpResponse::NoContent().finish()
}

async fn clear_completed(state: web::Data<Shared>, req: HttpRequest) -> HttpResponse {
    if let Err(resp) = authorize(&state, &req) {
        return resp;
    }
    let mut state = state.lock().unwrap();
    if state.fail_clear {
        return HttpResponse::InternalServerError().finish();
    }
    state.tasks.retain(|t| !t.completed);
    HttpResponse::NoContent().finish()
}

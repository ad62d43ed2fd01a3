//! In-process stub of the marketplace backend used by the integration tests.
//!
//! Counters make "issued no network call" assertions possible; failure flags
//! drive the rollback paths.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use axum::extract::{Path, State};
use axum::http::{header::SET_COOKIE, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use venturelink::api::ApiClient;
use venturelink::config::Config;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

#[derive(Default)]
pub struct StubState {
    /// Every request that reaches the stub, fallback included.
    pub hits: AtomicUsize,
    pub browse_gets: AtomicUsize,
    pub startup_gets: AtomicUsize,
    pub request_posts: AtomicUsize,
    pub patch_hits: AtomicUsize,
    pub fail_saved_post: AtomicBool,
    pub fail_saved_delete: AtomicBool,
    pub fail_browse_once: AtomicBool,
    /// Makes every read endpoint answer 400, which the client never retries.
    pub fail_reads: AtomicBool,
    pub fail_profile_put: AtomicBool,
    /// Overrides the error body used when a saved post/delete fails.
    pub saved_error_body: Mutex<Option<Value>>,
    pub saved: Mutex<Vec<i64>>,
    pub requests: Mutex<Vec<Value>>,
    pub startups: Mutex<Vec<Value>>,
    pub founder_profile: Mutex<Value>,
    pub investor_profile: Mutex<Value>,
    pub last_csrf: Mutex<Option<String>>,
    next_request_id: AtomicI64,
}

pub struct StubBackend {
    pub state: Arc<StubState>,
    pub base: String,
}

pub async fn spawn_backend() -> StubBackend {
    spawn_backend_with(vec![
        startup_json(1, "Aurora Robotics", 100_000.0, 20_000.0, Some(10.0)),
        startup_json(2, "Verdant Labs", 50_000.0, 0.0, None),
    ])
    .await
}

pub async fn spawn_backend_with(startups: Vec<Value>) -> StubBackend {
    let state = Arc::new(StubState {
        startups: Mutex::new(startups),
        ..Default::default()
    });
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr: SocketAddr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub backend");
    });
    StubBackend {
        state,
        base: format!("http://{addr}/api/"),
    }
}

pub fn client_for(backend: &StubBackend) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(&Config::from_base(&backend.base)).expect("api client"))
}

/// Startup payload the way the backend serializes one; the goal rides as a
/// decimal string on purpose, the raised amount as a plain number.
pub fn startup_json(id: i64, name: &str, goal: f64, raised: f64, equity: Option<f64>) -> Value {
    json!({
        "id": id,
        "name": name,
        "industry": "Deep Tech",
        "stage": "Seed",
        "funding_goal": format!("{goal:.2}"),
        "amount_raised": raised,
        "equity": equity,
        "description": "",
        "website": "",
        "location": "Pune",
        "team_size": 4,
        "founder": 7,
        "created_at": "2024-04-10T15:30:45Z"
    })
}

pub fn request_json(id: i64, startup: &Value, amount: f64, status: &str) -> Value {
    json!({
        "id": id,
        "startup": startup,
        "investor": { "username": "ira", "full_name": "Ira Shah" },
        "amount": amount,
        "status": status,
        "created_at": "2024-05-01T09:00:00Z"
    })
}

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/signin/", post(signin))
        .route("/api/signup/", post(signup))
        .route("/api/signout/", post(signout))
        .route("/api/check-auth/", get(check_auth))
        .route("/api/investors/browse/", get(browse))
        .route(
            "/api/investors/saved/",
            get(saved_list).post(saved_post).delete(saved_delete),
        )
        .route("/api/investors/requests/", post(request_post))
        .route("/api/investors/founder/requests/", get(founder_requests))
        .route("/api/investors/founder/requests/{id}/", patch(decide_patch))
        .route("/api/investors/my-investments/", get(my_investments))
        .route("/api/startups/", get(owned_startups))
        .route(
            "/api/profiles/founder-profiles/me/",
            get(founder_profile_get).put(founder_profile_put),
        )
        .route(
            "/api/profiles/investor-profiles/me/",
            get(investor_profile_get).put(investor_profile_put),
        )
        .fallback(not_found)
        .with_state(state)
}

async fn signin(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let username = body.get("username").and_then(Value::as_str).unwrap_or("");
    if body.get("password").and_then(Value::as_str) == Some("wrong") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid credentials" })),
        )
            .into_response();
    }
    let role = if username.starts_with("founder") {
        "Founder"
    } else {
        "Investor"
    };
    (
        AppendHeaders([
            (SET_COOKIE, "csrftoken=stub-csrf; Path=/".to_string()),
            (SET_COOKIE, "sessionid=stub-session; Path=/".to_string()),
        ]),
        Json(json!({ "message": "Login successful", "role": role })),
    )
        .into_response()
}

async fn signup(State(state): State<Arc<StubState>>, Json(_): Json<Value>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "message": "User created successfully" }))
}

async fn signout(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "message": "Logged out successfully" }))
}

async fn check_auth(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "authenticated": true, "username": "ira", "role": "Investor" }))
}

fn reads_failing(state: &StubState) -> Option<axum::response::Response> {
    if state.fail_reads.load(Ordering::SeqCst) {
        Some((StatusCode::BAD_REQUEST, Json(json!({ "error": "boom" }))).into_response())
    } else {
        None
    }
}

fn profile_record(slot: &Mutex<Value>, defaults: Value) -> Value {
    let mut record = slot.lock().unwrap();
    if record.is_null() {
        *record = defaults;
    }
    record.clone()
}

fn profile_put(
    state: &StubState,
    slot: &Mutex<Value>,
    defaults: Value,
    body: Value,
) -> axum::response::Response {
    if state.fail_profile_put.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "linkedin": ["Enter a valid URL."] })),
        )
            .into_response();
    }
    let mut record = slot.lock().unwrap();
    if record.is_null() {
        *record = defaults;
    }
    if let (Some(target), Some(patch)) = (record.as_object_mut(), body.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(record.clone()).into_response()
}

async fn founder_profile_get(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = reads_failing(&state) {
        return resp;
    }
    Json(profile_record(&state.founder_profile, founder_profile_defaults())).into_response()
}

async fn founder_profile_put(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    profile_put(&state, &state.founder_profile, founder_profile_defaults(), body)
}

async fn investor_profile_get(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = reads_failing(&state) {
        return resp;
    }
    Json(profile_record(&state.investor_profile, investor_profile_defaults())).into_response()
}

async fn investor_profile_put(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    profile_put(&state, &state.investor_profile, investor_profile_defaults(), body)
}

fn founder_profile_defaults() -> Value {
    json!({ "id": 1, "user": 7, "bio": "", "linkedin": "", "experience": "" })
}

fn investor_profile_defaults() -> Value {
    json!({
        "id": 1,
        "user": 8,
        "bio": "",
        "linkedin": "",
        "investment_range_min": null,
        "investment_range_max": null,
        "industries_of_interest": "",
        "location": ""
    })
}

async fn browse(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.browse_gets.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = reads_failing(&state) {
        return resp;
    }
    if state.fail_browse_once.swap(false, Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "flaky" })),
        )
            .into_response();
    }
    Json(state.startups.lock().unwrap().clone()).into_response()
}

async fn saved_list(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = reads_failing(&state) {
        return resp;
    }
    let entries: Vec<Value> = state
        .saved
        .lock()
        .unwrap()
        .iter()
        .enumerate()
        .map(|(i, id)| json!({ "id": i as i64 + 1, "startup": id }))
        .collect();
    Json(entries).into_response()
}

fn saved_error(state: &StubState) -> Value {
    state
        .saved_error_body
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| json!({ "error": "could not save" }))
}

async fn saved_post(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_csrf.lock().unwrap() = headers
        .get("x-csrftoken")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if state.fail_saved_post.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(saved_error(&state))).into_response();
    }
    let id = body.get("startup").and_then(Value::as_i64).unwrap_or(0);
    state.saved.lock().unwrap().push(id);
    Json(json!({ "id": id, "startup": id })).into_response()
}

async fn saved_delete(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if state.fail_saved_delete.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(saved_error(&state))).into_response();
    }
    let id = body.get("startup").and_then(Value::as_i64).unwrap_or(0);
    state.saved.lock().unwrap().retain(|s| *s != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn request_post(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.request_posts.fetch_add(1, Ordering::SeqCst);
    *state.last_csrf.lock().unwrap() = headers
        .get("x-csrftoken")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let startup_id = body.get("startup_id").and_then(Value::as_i64).unwrap_or(0);
    let amount = body.get("amount").and_then(Value::as_f64).unwrap_or(0.0);
    let startup = state
        .startups
        .lock()
        .unwrap()
        .iter()
        .find(|s| s["id"] == json!(startup_id))
        .cloned();
    let Some(startup) = startup else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unknown startup" })),
        )
            .into_response();
    };
    let id = state.next_request_id.fetch_add(1, Ordering::SeqCst) + 1;
    let record = request_json(id, &startup, amount, "pending");
    state.requests.lock().unwrap().push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn founder_requests(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = reads_failing(&state) {
        return resp;
    }
    Json(state.requests.lock().unwrap().clone()).into_response()
}

async fn decide_patch(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.patch_hits.fetch_add(1, Ordering::SeqCst);
    let status = body
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let mut requests = state.requests.lock().unwrap();
    let Some(record) = requests.iter_mut().find(|r| r["id"] == json!(id)) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no such request" })),
        )
            .into_response();
    };
    record["status"] = json!(status);
    if status == "accepted" {
        let amount = record["amount"].as_f64().unwrap_or(0.0);
        let startup_id = record["startup"]["id"].as_i64().unwrap_or(0);
        let nested = record["startup"]["amount_raised"].as_f64().unwrap_or(0.0);
        record["startup"]["amount_raised"] = json!(nested + amount);
        let mut startups = state.startups.lock().unwrap();
        if let Some(s) = startups.iter_mut().find(|s| s["id"] == json!(startup_id)) {
            let raised = s["amount_raised"].as_f64().unwrap_or(0.0);
            s["amount_raised"] = json!(raised + amount);
        }
    }
    Json(record.clone()).into_response()
}

async fn my_investments(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = reads_failing(&state) {
        return resp;
    }
    let accepted: Vec<Value> = state
        .requests
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r["status"] == json!("accepted"))
        .cloned()
        .collect();
    Json(accepted).into_response()
}

async fn owned_startups(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.startup_gets.fetch_add(1, Ordering::SeqCst);
    if let Some(resp) = reads_failing(&state) {
        return resp;
    }
    Json(state.startups.lock().unwrap().clone()).into_response()
}

async fn not_found(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found" })),
    )
}

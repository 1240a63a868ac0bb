#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, body::Body};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Shared runtime for all tests in this binary
static RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

pub fn runtime() -> &'static tokio::runtime::Runtime {
    RT.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("Failed to create runtime")
    })
}

/// Secret the stub upstream signs and verifies its tokens with. The app
/// under test never sees it; only expiration is checked app-side.
pub const JWT_SECRET: &[u8] = b"stub-upstream-secret";

/// Mint an access-token JWT whose `exp` lies `offset_secs` from now.
pub fn mint_access_token(offset_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = json!({
        "sub": "user-1",
        "username": "tester",
        "exp": now + offset_secs,
    });
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET),
    )
    .unwrap()
}

/// A full credential carrier around the given access token.
pub fn carrier_with(access_token: &str) -> String {
    format!("Authentication={access_token}; Refresh=refresh-token-1")
}

/// How the stub answers `GET /auth/refresh`.
#[derive(Clone, Copy)]
pub enum RefreshMode {
    Accept,
    Reject,
}

pub struct StubState {
    pub refresh_mode: Mutex<RefreshMode>,
    pub refresh_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    /// Raw query strings of every GraphQL request, in arrival order
    pub graphql_queries: Mutex<Vec<String>>,
    /// Cookie header observed on the most recent GraphQL request
    pub last_graphql_cookie: Mutex<Option<String>>,
    pub todos: Mutex<Vec<Value>>,
}

impl StubState {
    pub fn graphql_calls(&self) -> usize {
        self.graphql_queries.lock().unwrap().len()
    }

    pub fn mutation_count(&self) -> usize {
        self.graphql_queries
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.starts_with("mutation"))
            .count()
    }

    pub fn todo_titles(&self) -> Vec<String> {
        self.todos
            .lock()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap_or("").to_string())
            .collect()
    }
}

/// Stub upstream API server bound to an OS-assigned port.
pub struct Upstream {
    pub addr: SocketAddr,
    pub state: Arc<StubState>,
}

impl Upstream {
    pub async fn start() -> Self {
        let state = Arc::new(StubState {
            refresh_mode: Mutex::new(RefreshMode::Accept),
            refresh_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            graphql_queries: Mutex::new(Vec::new()),
            last_graphql_cookie: Mutex::new(None),
            todos: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/auth/refresh", get(stub_refresh))
            .route("/auth/login", post(stub_login))
            .route("/auth/register", post(stub_register))
            .route("/auth/logout", post(stub_logout))
            .route("/graphql", post(stub_graphql))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub upstream");
        let addr = listener.local_addr().expect("Failed to get local address");

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self { addr, state }
    }

    pub fn endpoint(&self) -> url::Url {
        url::Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    pub fn reject_refresh(&self) {
        *self.state.refresh_mode.lock().unwrap() = RefreshMode::Reject;
    }

    pub fn seed_todo(&self, id: &str, title: &str, is_completed: bool, created_at: &str) {
        self.state.todos.lock().unwrap().push(json!({
            "id": id,
            "title": title,
            "isCompleted": is_completed,
            "createdAt": created_at,
        }));
    }
}

fn profile_body() -> Value {
    json!({
        "id": "user-1",
        "username": "tester",
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-01T00:00:00.000Z",
    })
}

/// The cookie pair a real auth server would attach on login/refresh.
fn auth_cookie_headers() -> HeaderMap {
    let access = mint_access_token(300);
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        format!("Authentication={access}; HttpOnly; Path=/; Max-Age=300")
            .parse()
            .unwrap(),
    );
    headers.append(
        header::SET_COOKIE,
        "Refresh=refresh-token-2; HttpOnly; Path=/; Max-Age=604800"
            .parse()
            .unwrap(),
    );
    headers
}

fn cleared_cookie_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        "Authentication=; HttpOnly; Path=/; Max-Age=0".parse().unwrap(),
    );
    headers.append(
        header::SET_COOKIE,
        "Refresh=; HttpOnly; Path=/; Max-Age=0".parse().unwrap(),
    );
    headers
}

fn unauthorized_body() -> Json<Value> {
    Json(json!({ "statusCode": 401, "message": "Unauthorized" }))
}

async fn stub_refresh(State(state): State<Arc<StubState>>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    match *state.refresh_mode.lock().unwrap() {
        RefreshMode::Accept => (auth_cookie_headers(), Json(profile_body())).into_response(),
        RefreshMode::Reject => (StatusCode::UNAUTHORIZED, unauthorized_body()).into_response(),
    }
}

async fn stub_login(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    if body["username"] == "tester" && body["password"] == "secret12" {
        (auth_cookie_headers(), Json(profile_body())).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, unauthorized_body()).into_response()
    }
}

async fn stub_register(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.register_calls.fetch_add(1, Ordering::SeqCst);
    if body["username"] == "taken" {
        (
            StatusCode::CONFLICT,
            Json(json!({ "statusCode": 409, "message": "Username already exists" })),
        )
            .into_response()
    } else {
        (StatusCode::CREATED, Json(profile_body())).into_response()
    }
}

async fn stub_logout(State(state): State<Arc<StubState>>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    (cleared_cookie_headers(), Json(json!({}))).into_response()
}

/// Verify the access-token cookie the way the real upstream would: full
/// signature check against the stub secret plus expiration.
fn cookie_is_authorized(cookie: &str) -> bool {
    let first = cookie.split(';').next().unwrap_or("").trim();
    let token = match first.split_once('=') {
        Some((_, value)) => value,
        None => first,
    };
    jsonwebtoken::decode::<Value>(
        token,
        &DecodingKey::from_secret(JWT_SECRET),
        &Validation::new(Algorithm::HS256),
    )
    .is_ok()
}

async fn stub_graphql(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or("").to_string();
    state.graphql_queries.lock().unwrap().push(query.clone());

    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_graphql_cookie.lock().unwrap() = cookie.clone();

    if !cookie.as_deref().map(cookie_is_authorized).unwrap_or(false) {
        return Json(json!({ "errors": [{ "message": "Unauthorized" }] }));
    }

    if query.contains("GetTodos") {
        let todos = state.todos.lock().unwrap().clone();
        return Json(json!({ "data": { "todos": todos } }));
    }
    if query.contains("Whoami") {
        return Json(json!({ "data": { "whoAmI": { "id": "user-1", "username": "tester" } } }));
    }
    if query.contains("CreateTodo") {
        let title = body["variables"]["title"].as_str().unwrap_or("").to_string();
        let mut todos = state.todos.lock().unwrap();
        let len = todos.len();
        let id = format!("todo-{}", len + 1);
        todos.push(json!({
            "id": id,
            "title": title,
            "isCompleted": false,
            "createdAt": format!("2024-06-01T00:00:0{}.000Z", len),
        }));
        return Json(json!({ "data": { "createTodo": { "id": id } } }));
    }
    if query.contains("UpdateTodo") {
        let input = &body["variables"]["updateTodoInput"];
        let id = input["id"].as_str().unwrap_or("");
        let mut todos = state.todos.lock().unwrap();
        for todo in todos.iter_mut() {
            if todo["id"] == id {
                if let Some(title) = input["title"].as_str() {
                    todo["title"] = json!(title);
                }
                if let Some(is_completed) = input["isCompleted"].as_bool() {
                    todo["isCompleted"] = json!(is_completed);
                }
            }
        }
        return Json(json!({ "data": { "updateTodo": { "id": id } } }));
    }
    if query.contains("RemoveTodo") {
        let id = body["variables"]["id"].as_str().unwrap_or("").to_string();
        state.todos.lock().unwrap().retain(|todo| todo["id"] != id.as_str());
        return Json(json!({ "data": { "removeTodo": { "id": id } } }));
    }

    Json(json!({ "errors": [{ "message": "Unknown operation" }] }))
}

/// Build the app under test against the given stub upstream.
pub fn app_for(upstream: &Upstream) -> Router {
    magpie::create_app(&magpie::ServerConfig {
        upstream_endpoint: upstream.endpoint(),
    })
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn form_request(uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    // Test values stay URL-safe apart from spaces
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.replace(' ', "+")))
        .collect::<Vec<_>>()
        .join("&");

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

pub fn set_cookie_values(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

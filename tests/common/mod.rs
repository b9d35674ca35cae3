use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use ledger_server::{
    AppState, api_router, auth::hash_password, constants::*, database, models::TransactionKind,
};
use time::Duration;
use tower::util::ServiceExt;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};
use uuid::Uuid;

#[derive(Clone)]
pub struct TestConfig {
    pub temp_dir_path: String,
}

impl TestConfig {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let temp_dir_path = temp_dir.path().to_string_lossy().to_string();
        std::mem::forget(temp_dir);
        Ok(Self { temp_dir_path })
    }

    pub fn data_path(&self) -> String {
        self.temp_dir_path.clone()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn setup_test_app() -> anyhow::Result<TestApp> {
    let test_config = TestConfig::new()?;

    let data_path = test_config.data_path();
    std::fs::create_dir_all(&data_path)?;

    let main_db = database::init_main_db(&data_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize main database: {}", e))?;

    let app_state = AppState { main_db };

    let store = MemoryStore::default();

    let session_secret = "test_secret_key_at_least_64_chars_long_test_secret_key_at_least_64_";
    let session_key = Key::try_from(session_secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid session secret: {}", e))?;

    let session_layer = SessionManagerLayer::new(store)
        .with_secure(false)
        .with_name(SESSION_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_EXPIRY_DAYS)))
        .with_signed(session_key);

    let router = api_router()
        .layer(session_layer)
        .with_state(app_state.clone());

    Ok(TestApp {
        router,
        state: app_state,
    })
}

pub async fn create_test_user(
    app_state: &AppState,
    username: &str,
    password: &str,
) -> anyhow::Result<String> {
    let hash = hash_password(password)
        .map_err(|(_, e)| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let user_id = Uuid::new_v4().to_string();

    let conn = app_state.main_db.write().await;
    conn.execute(
        "INSERT INTO users (id, name, password_hash) VALUES (?, ?, ?)",
        (user_id.as_str(), username, hash.as_str()),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create test user: {}", e))?;

    Ok(user_id)
}

pub async fn login_user(app: &Router, username: &str, password: &str) -> anyhow::Result<String> {
    let payload = serde_json::json!({
        "username": username,
        "password": password
    });

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .map_err(|e| anyhow::anyhow!("Failed to build request: {}", e))?;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to execute request: {}", e))?;

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v: &axum::http::HeaderValue| v.to_str().ok())
        .ok_or_else(|| anyhow::anyhow!("No session cookie in response"))?;

    Ok(set_cookie.to_string())
}

/// Create a user and log them in, returning `(user_id, cookie)`
#[allow(dead_code)]
pub async fn logged_in_user(
    test_app: &TestApp,
    username: &str,
) -> anyhow::Result<(String, String)> {
    let user_id = create_test_user(&test_app.state, username, "password123").await?;
    let cookie = login_user(&test_app.router, username, "password123").await?;
    Ok((user_id, cookie))
}

#[allow(dead_code)]
pub async fn auth_request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: &str,
) -> anyhow::Result<(StatusCode, String)> {
    send(app, method, uri, cookie, Body::empty()).await
}

#[allow(dead_code)]
pub async fn auth_json_request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: &str,
    payload: serde_json::Value,
) -> anyhow::Result<(StatusCode, String)> {
    send(app, method, uri, cookie, Body::from(payload.to_string())).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: &str,
    body: Body,
) -> anyhow::Result<(StatusCode, String)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("cookie", cookie)
        .body(body)
        .map_err(|e| anyhow::anyhow!("Failed to build request: {}", e))?;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to execute request: {}", e))?;

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read response body: {}", e))?;
    let body_str = String::from_utf8(body.to_vec())?;

    Ok((status, body_str))
}

/// POST one transaction of `kind` and return the status and body
#[allow(dead_code)]
pub async fn add_transaction(
    app: &Router,
    cookie: &str,
    kind: &str,
    payload: serde_json::Value,
) -> anyhow::Result<(StatusCode, String)> {
    auth_json_request(app, "POST", &format!("/transactions/{}", kind), cookie, payload).await
}

/// Raw row count of `kind` owned by the user
#[allow(dead_code)]
pub async fn count_rows(
    conn: &libsql::Connection,
    kind: TransactionKind,
    user_id: &str,
) -> anyhow::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE user_id = ?", kind.table());
    let mut rows = conn.query(&sql, [user_id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| anyhow::anyhow!("COUNT(*) returned no row"))?;
    Ok(row.get::<i64>(0)?)
}

mod common;

use axum::http::StatusCode;
use common::{auth_json_request, auth_request, create_test_user, login_user, setup_test_app};
use serde_json::{Value, json};

#[tokio::test]
async fn register_then_login_and_fetch_current_user() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;

    let (status, body) = auth_json_request(
        &test_app.router,
        "POST",
        "/auth/register",
        "",
        json!({ "username": "testuser", "password": "testpassword" }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let registered: Value = serde_json::from_str(&body)?;
    assert_eq!(registered["username"], "testuser");
    assert!(registered.get("password_hash").is_none());

    let cookie = login_user(&test_app.router, "testuser", "testpassword").await?;

    let (status, body) = auth_request(&test_app.router, "GET", "/auth/me", &cookie).await?;
    assert_eq!(status, StatusCode::OK);
    let me: Value = serde_json::from_str(&body)?;
    assert_eq!(me["username"], "testuser");
    assert_eq!(me["id"], registered["id"]);

    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;
    create_test_user(&test_app.state, "taken_name", "password123").await?;

    let (status, _) = auth_json_request(
        &test_app.router,
        "POST",
        "/auth/register",
        "",
        json!({ "username": "taken_name", "password": "another-password" }),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn register_rejects_short_credentials() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;

    for payload in [
        json!({ "username": "abc", "password": "password123" }),
        json!({ "username": "valid_user", "password": "123" }),
        json!({ "username": "   ", "password": "password123" }),
    ] {
        let (status, _) =
            auth_json_request(&test_app.router, "POST", "/auth/register", "", payload).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_unauthorized() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;
    create_test_user(&test_app.state, "alice", "right-password").await?;

    for payload in [
        json!({ "username": "alice", "password": "wrong-password" }),
        json!({ "username": "nobody", "password": "right-password" }),
    ] {
        let (status, body) =
            auth_json_request(&test_app.router, "POST", "/auth/login", "", payload).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid username or password"));
    }

    Ok(())
}

#[tokio::test]
async fn logout_ends_the_session() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;
    create_test_user(&test_app.state, "leaving", "password123").await?;
    let cookie = login_user(&test_app.router, "leaving", "password123").await?;

    let (status, _) = auth_request(&test_app.router, "POST", "/auth/logout", &cookie).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = auth_request(&test_app.router, "GET", "/auth/me", &cookie).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_session() -> anyhow::Result<()> {
    let test_app = setup_test_app().await?;

    let (status, _) = auth_request(&test_app.router, "GET", "/auth/me", "").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = auth_json_request(
        &test_app.router,
        "POST",
        "/transactions/expense",
        "",
        json!({ "amount": 10, "currency": "USD", "date": "2023-01-05" }),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = auth_request(
        &test_app.router,
        "GET",
        "/transactions/income/total?start_date=2023-01-01&end_date=2023-01-31",
        "",
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

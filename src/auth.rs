use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::{Json, extract::State, http::StatusCode};
use password_hash::rand_core::OsRng;
use tower_sessions::Session;
use uuid::Uuid;

use crate::AppState;
use crate::constants::*;
use crate::models::{LoginPayload, PublicUser, RegisterPayload, User};
use crate::utils::{db_error, db_error_with_context, validate_string_length};

pub fn validate_username(username: &str) -> Result<(), (StatusCode, String)> {
    validate_string_length(username, "Username", MAX_USERNAME_LENGTH)?;
    if username.trim().chars().count() < MIN_USERNAME_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Username must be at least {} characters",
                MIN_USERNAME_LENGTH
            ),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), (StatusCode, String)> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, (StatusCode, String)> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to hash password".to_string(),
            )
        })
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Resolve the logged-in user from the session, or reject with 401
pub async fn get_current_user(session: &Session) -> Result<PublicUser, (StatusCode, String)> {
    let user: Option<PublicUser> = session.get(SESSION_USER_KEY).await.map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ERR_INVALID_SESSION.to_string(),
        )
    })?;

    user.ok_or_else(|| (StatusCode::UNAUTHORIZED, ERR_UNAUTHORIZED.to_string()))
}

async fn find_user_by_name(
    app_state: &AppState,
    username: &str,
) -> Result<Option<User>, (StatusCode, String)> {
    let conn = app_state.main_db.read().await;
    let mut rows = conn
        .query(
            "SELECT id, name, password_hash FROM users WHERE name = ?",
            [username],
        )
        .await
        .map_err(|_| db_error_with_context("failed to look up user"))?;

    let Some(row) = rows.next().await.map_err(|_| db_error())? else {
        return Ok(None);
    };

    Ok(Some(User {
        id: row
            .get(0)
            .map_err(|_| db_error_with_context("invalid user data"))?,
        username: row
            .get(1)
            .map_err(|_| db_error_with_context("invalid user data"))?,
        password_hash: row
            .get(2)
            .map_err(|_| db_error_with_context("invalid user data"))?,
    }))
}

pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    validate_username(&payload.username)?;
    validate_password(&payload.password)?;
    let username = payload.username.trim().to_string();

    if find_user_by_name(&app_state, &username).await?.is_some() {
        return Err((StatusCode::CONFLICT, "Username already exists".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user_id = Uuid::new_v4().to_string();

    let conn = app_state.main_db.write().await;
    conn.execute(
        "INSERT INTO users (id, name, password_hash) VALUES (?, ?, ?)",
        (user_id.as_str(), username.as_str(), password_hash.as_str()),
    )
    .await
    .map_err(|e| {
        // Lost a race against a concurrent registration of the same name
        if e.to_string().contains("UNIQUE") {
            (StatusCode::CONFLICT, "Username already exists".to_string())
        } else {
            db_error_with_context("user creation failed")
        }
    })?;

    tracing::info!(%user_id, %username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(PublicUser {
            id: user_id,
            username,
        }),
    ))
}

pub async fn login(
    State(app_state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    let user = find_user_by_name(&app_state, payload.username.trim()).await?;

    let Some(user) = user.filter(|u| verify_password(&payload.password, &u.password_hash)) else {
        tracing::debug!(username = %payload.username.trim(), "rejected login");
        return Err((
            StatusCode::UNAUTHORIZED,
            ERR_INVALID_CREDENTIALS.to_string(),
        ));
    };

    let public_user = PublicUser::from(user);
    session
        .cycle_id()
        .await
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, ERR_INVALID_SESSION.to_string()))?;
    session
        .insert(SESSION_USER_KEY, &public_user)
        .await
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, ERR_INVALID_SESSION.to_string()))?;

    tracing::info!(user_id = %public_user.id, "user logged in");
    Ok((StatusCode::OK, Json(public_user)))
}

pub async fn me(session: Session) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;
    Ok((StatusCode::OK, Json(user)))
}

pub async fn logout(session: Session) -> Result<StatusCode, (StatusCode, String)> {
    let user = get_current_user(&session).await?;
    session
        .flush()
        .await
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, ERR_INVALID_SESSION.to_string()))?;

    tracing::info!(user_id = %user.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

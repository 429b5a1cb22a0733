use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rusqlite::params;
use serde::Deserialize;
use validator::Validate;

use crate::auth::{password, session};
use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::extractors::{extract_session_token, CurrentUser};
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -- Cookie helpers --

fn session_cookie(auth: &AuthConfig, token: &str) -> String {
    let max_age_secs = auth.session_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        auth.cookie_name, token, max_age_secs
    )
}

fn clear_session_cookie(auth: &AuthConfig) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        auth.cookie_name
    )
}

fn signed_in(auth: &AuthConfig, token: &str, user: &CurrentUser) -> Response {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(auth, token))],
        Json(serde_json::json!({ "user": user, "token": token })),
    )
        .into_response()
}

/// A unique-constraint failure on insert means the email is taken.
fn email_conflict(err: rusqlite::Error) -> AppError {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            AppError::BadRequest("Email is already registered".into())
        }
        other => other.into(),
    }
}

// -- Handlers --

/// POST /auth/register — create an account and sign it in
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    let req = RegisterRequest {
        email: req.email.trim().to_lowercase(),
        name: req.name.trim().to_string(),
        ..req
    };
    req.validate()?;

    let password_hash = password::hash(&req.password, state.config.auth.bcrypt_cost)?;
    let user_id = uuid::Uuid::now_v7().to_string();

    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO users (id, email, name, image, password_hash) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, req.email, req.name, req.image, password_hash],
    )
    .map_err(email_conflict)?;
    tracing::info!("Registered user {}", user_id);

    let token = session::create_session(&conn, &user_id, state.config.auth.session_hours)?;
    let user = CurrentUser {
        id: user_id,
        name: req.name,
        image: req.image,
    };

    Ok(signed_in(&state.config.auth, &token, &user))
}

/// POST /auth/login — exchange email and password for a session
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let email = req.email.trim().to_lowercase();
    let conn = state.db.get()?;

    let found = conn.query_row(
        "SELECT id, name, image, password_hash FROM users WHERE email = ?1",
        params![email],
        |row| {
            Ok((
                CurrentUser {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    image: row.get(2)?,
                },
                row.get::<_, Option<String>>(3)?,
            ))
        },
    );

    let (user, hash) = match found {
        Ok(found) => found,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Err(AppError::Unauthorized),
        Err(e) => return Err(e.into()),
    };

    let verified = hash
        .as_deref()
        .map(|hash| password::verify(&req.password, hash))
        .unwrap_or(false);
    if !verified {
        tracing::warn!("Failed login for {}", email);
        return Err(AppError::Unauthorized);
    }

    let token = session::create_session(&conn, &user.id, state.config.auth.session_hours)?;
    Ok(signed_in(&state.config.auth, &token, &user))
}

/// POST /auth/logout — end the current session
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Response> {
    if let Some(token) = extract_session_token(&headers, &state.config.auth.cookie_name) {
        let conn = state.db.get()?;
        session::delete_session(&conn, token)?;
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie(&state.config.auth))],
        Json(serde_json::json!({ "status": "ok" })),
    )
        .into_response())
}

/// GET /auth/me — the signed-in user
pub async fn me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

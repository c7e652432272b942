//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout and the current user.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use pantry_planner_core::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{port_error_response, HandlerError};
use crate::web::middleware::{session_id_from_headers, SESSION_COOKIE};
use crate::web::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// Trims and lower-cases an email, rejecting obviously malformed ones.
pub fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err("A valid email is required".to_string()),
    }
}

pub fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ))
    } else {
        Ok(())
    }
}

fn session_cookie(session_id: &str, ttl: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        ttl.num_seconds()
    )
}

fn cleared_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    )
}

/// Creates an auth session for `user_id` and returns the matching `Set-Cookie` value.
async fn start_session(state: &AppState, user_id: Uuid) -> Result<String, HandlerError> {
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);
    let expires_at = Utc::now() + ttl;

    state
        .users
        .create_auth_session(&auth_session_id, user_id, expires_at)
        .await
        .map_err(|e| port_error_response("Failed to create session", e))?;

    Ok(session_cookie(&auth_session_id, ttl))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    // 1. Validate input
    let email = normalize_email(&req.email).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    check_password(&req.password).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    // 2. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
        })?
        .to_string();

    // 3. Create user in database
    let user = state
        .users
        .create_user_with_email(&email, &password_hash, name)
        .await
        .map_err(|e| port_error_response("Failed to create user", e))?;
    info!(user_id = %user.user_id, "New user signed up");

    // 4. Start a session and hand back the cookie
    let cookie = start_session(&state, user.user_id).await?;
    let response = AuthResponse {
        user_id: user.user_id,
        email: user.email,
        name: user.name,
    };

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /api/auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        )
    };

    // 1. Get user by email
    let email = normalize_email(&req.email).map_err(|_| invalid())?;
    let user_creds = match state.users.get_user_by_email(&email).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => return Err(invalid()),
        Err(e) => return Err(port_error_response("Failed to look up user", e)),
    };

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(invalid());
    }

    // 3. Start a session
    let cookie = start_session(&state, user_creds.user_id).await?;
    let user = state
        .users
        .get_user_by_id(user_creds.user_id)
        .await
        .map_err(|e| port_error_response("Failed to load user", e))?;

    let response = AuthResponse {
        user_id: user.user_id,
        email: user.email,
        name: user.name,
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /api/auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    let auth_session_id = session_id_from_headers(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state
        .users
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| port_error_response("Failed to logout", e))?;

    Ok((StatusCode::OK, [(header::SET_COOKIE, cleared_session_cookie())]))
}

/// GET /api/auth/me - The signed-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let user = state
        .users
        .get_user_by_id(user_id)
        .await
        .map_err(|e| port_error_response("Failed to load user", e))?;

    Ok(Json(AuthResponse {
        user_id: user.user_id,
        email: user.email,
        name: user.name,
    }))
}

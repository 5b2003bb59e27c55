//! Authentication handlers

use axum::{extract::{rejection::FormRejection, State}, Form, Json};
use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use jsonwebtoken::{encode, Header, EncodingKey};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};
use validator::Validate;

use crate::{AppState, AppError, AppResult};
use crate::middleware::auth::UserContext;
use crate::models::{User, UserInfo, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Cookie carrying the session JWT
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // User ID
    pub email: String,    // User email
    pub exp: usize,       // Expiration timestamp
    pub iat: usize,       // Issued at
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    body: Result<Form<RegisterRequest>, FormRejection>,
) -> AppResult<Json<RegisterResponse>> {
    let Form(req) = body?;
    req.validate()?;

    // Check if email already exists
    if User::find_by_email(&state.pool, &req.email).await?.is_some() {
        return Err(AppError::AlreadyExists("Email already registered".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    // a concurrent registration can still hit the UNIQUE constraint
    let user = User::create(&state.pool, &req.name, &req.email, &password_hash)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::AlreadyExists(_) => {
                AppError::AlreadyExists("Email already registered".to_string())
            }
            other => other,
        })?;

    tracing::info!(user_id = user.id, "New user registered: {}", user.email);

    Ok(Json(RegisterResponse {
        user_id: user.id,
        email: user.email,
    }))
}

/// Login endpoint; issues the session cookie
pub async fn login(
    State(state): State<AppState>,
    body: Result<Form<LoginRequest>, FormRejection>,
) -> AppResult<(HeaderMap, Json<LoginResponse>)> {
    let Form(req) = body?;
    let user = User::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::InternalError("Invalid password hash".to_string()))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| {
            tracing::warn!(user_id = user.id, "Failed login attempt");
            AppError::InvalidCredentials
        })?;

    let token = generate_jwt(&user, &state.config.jwt_secret, state.config.jwt_expiration_hours)?;

    let cookie = session_cookie(
        &token,
        state.config.jwt_expiration_hours * 3600,
        state.config.is_production(),
    );
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    tracing::info!(user_id = user.id, "User logged in");

    Ok((headers, Json(LoginResponse {
        token,
        user: user.to_info(),
    })))
}

/// Logout: expire the session cookie
pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<serde_json::Value>) {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, session_cookie("", 0, state.config.is_production()));

    (headers, Json(serde_json::json!({ "logged_out": true })))
}

/// Current user's dashboard data
pub async fn dashboard(
    State(state): State<AppState>,
    user: UserContext,
) -> AppResult<Json<UserInfo>> {
    let record = User::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(record.to_info()))
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(e.to_string()))
}

/// Generate JWT token
fn generate_jwt(user: &User, secret: &str, expiration_hours: u64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours as i64);

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes())
    ).map_err(|e| AppError::InternalError(e.to_string()))
}

fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> HeaderValue {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    // JWTs are base64url + dots, always a valid header value
    HeaderValue::from_str(&cookie)
        .unwrap_or_else(|_| HeaderValue::from_static("session=; Path=/; Max-Age=0"))
}

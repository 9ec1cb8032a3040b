use axum::{
    extract::{FromRef, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookies::{self, CookieOptions, REFRESH_COOKIE},
        dto::{Identity, LoginRequest, PublicUser, RegisterRequest},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{is_unique_violation, ApiError, FieldError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.as_deref().map(str::trim);

    let mut errors = Vec::new();
    if !is_valid_email(&payload.email) {
        errors.push(FieldError {
            field: "email",
            message: "must be a valid email address",
        });
    }
    if payload.password.len() < 6 {
        errors.push(FieldError {
            field: "password",
            message: "must be at least 6 characters",
        });
    }
    // A name may be omitted, but not supplied blank.
    if name == Some("") {
        errors.push(FieldError {
            field: "name",
            message: "must not be blank when provided",
        });
    }
    if !errors.is_empty() {
        warn!("register validation failed");
        return Err(ApiError::Validation(errors));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already used"));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, &hash, name)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Email already used")
            } else {
                ApiError::Database(e)
            }
        })?;

    let keys = JwtKeys::from_ref(&state);
    let tokens = keys.sign_pair(user.id, &user.email)?;
    let mut headers = HeaderMap::new();
    cookies::set_auth_cookies(&mut headers, &tokens, &CookieOptions::from_ref(&state));

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        headers,
        Json(PublicUser {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation(vec![FieldError {
            field: "email",
            message: "must be a valid email address",
        }]));
    }

    // Unknown email and wrong password take the same exit.
    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };
    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let tokens = keys.sign_pair(user.id, &user.email)?;
    let mut headers = HeaderMap::new();
    cookies::set_auth_cookies(&mut headers, &tokens, &CookieOptions::from_ref(&state));

    info!(user_id = %user.id, "user logged in");
    Ok((
        headers,
        Json(PublicUser {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
    ))
}

/// Clears both cookies unconditionally; idempotent, no store access.
#[instrument(skip(state))]
async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    cookies::clear_auth_cookies(&mut headers, state.config.cookie_secure);
    (headers, Json(json!({ "ok": true })))
}

#[instrument(skip(state, headers))]
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = cookies::get_cookie(&headers, REFRESH_COOKIE).ok_or(ApiError::NoRefreshToken)?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(&token).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        ApiError::InvalidRefreshToken
    })?;

    // Tokens are re-issued from the refresh claims alone; the credential
    // store is not consulted here.
    let tokens = keys.sign_pair(claims.sub, &claims.email)?;
    let mut out = HeaderMap::new();
    cookies::set_auth_cookies(&mut out, &tokens, &CookieOptions::from_ref(&state));

    info!(user_id = %claims.sub, "session refreshed");
    Ok((out, Json(json!({ "ok": true }))))
}

/// Identity comes straight from the verified token, not the store.
async fn me(user: CurrentUser) -> Json<Identity> {
    Json(Identity {
        id: user.id,
        email: user.email,
    })
}

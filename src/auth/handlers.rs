use axum::{
    extract::{FromRef, State},
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenResponse},
        extractors::ACCESS_TOKEN_COOKIE,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    users::{
        dto::UserResponse,
        repo::{NewUser, User},
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

// Emails are compared case-sensitively; input is only trimmed.

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.email = payload.email.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            email: payload.email,
            password_hash: hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
            other_name: payload.other_name,
            phone: payload.phone,
            birthday: payload.birthday,
            city: payload.city,
            additional_info: payload.additional_info,
            is_admin: false,
        },
    )
    .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<TokenResponse>), ApiError> {
    payload.email = payload.email.trim().to_string();

    // One message and status for unknown email and wrong password,
    // so login cannot be used to enumerate accounts.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.email)?;

    let mut headers = HeaderMap::new();
    let cookie =
        access_token_cookie(&token, keys.ttl.as_secs(), state.config.auth.cookie_secure)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;
    headers.insert(SET_COOKIE, cookie);

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok((
        headers,
        Json(TokenResponse {
            access_token: token,
            token_type: "bearer",
        }),
    ))
}

/// `HttpOnly` session cookie carrying the signed token.
fn access_token_cookie(
    token: &str,
    max_age_secs: u64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{ACCESS_TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("user@nodot"));
    }

    #[test]
    fn cookie_has_session_attributes() {
        let value = access_token_cookie("tok123", 1800, false).unwrap();
        let cookie = value.to_str().unwrap();
        assert!(cookie.starts_with("access_token=tok123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=1800"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn cookie_secure_flag_is_config_driven() {
        let value = access_token_cookie("tok123", 1800, true).unwrap();
        assert!(value.to_str().unwrap().ends_with("; Secure"));
    }
}

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::{auth::jwt::JwtKeys, error::ApiError, state::AppState, users::repo::User};

/// Cookie carrying the session token. The cookie is the only supported
/// transport; bearer headers are deliberately not accepted.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Principal resolved from the session cookie.
pub struct CurrentUser(pub User);

/// Principal that additionally passed the admin gate.
pub struct AdminUser(pub User);

/// Pull the session token out of the `Cookie` header, if present.
pub(crate) fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == ACCESS_TOKEN_COOKIE {
            return Some(val.to_string());
        }
    }
    None
}

/// Admin gate: identity for admins, `Forbidden` otherwise.
///
/// Operates on an already-resolved principal; performs no store access.
pub fn require_admin(user: User) -> Result<User, ApiError> {
    if user.is_admin {
        Ok(user)
    } else {
        Err(ApiError::Forbidden)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_access_token(&parts.headers)
            .ok_or(ApiError::Unauthenticated("Not authenticated"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "session token rejected");
            ApiError::Unauthenticated("Invalid credentials")
        })?;

        let user = User::find_by_email(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(subject = %claims.sub, "token subject has no user record");
                ApiError::Unauthenticated("User not found")
            })?;

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(AdminUser(require_admin(user)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use time::OffsetDateTime;

    fn sample_user(is_admin: bool) -> User {
        User {
            id: 1,
            email: "user@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            first_name: "Sample".into(),
            last_name: "User".into(),
            other_name: None,
            phone: None,
            birthday: None,
            city: None,
            additional_info: None,
            is_admin,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token_from_single_cookie() {
        let headers = headers_with_cookie("access_token=abc.def.ghi");
        assert_eq!(
            extract_access_token(&headers).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn extracts_token_among_other_cookies() {
        let headers =
            headers_with_cookie("theme=dark; access_token=abc.def.ghi; lang=en");
        assert_eq!(
            extract_access_token(&headers).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(extract_access_token(&HeaderMap::new()), None);
    }

    #[test]
    fn unrelated_cookies_yield_none() {
        let headers = headers_with_cookie("theme=dark; lang=en");
        assert_eq!(extract_access_token(&headers), None);
    }

    #[test]
    fn require_admin_passes_admin_through_unchanged() {
        let user = sample_user(true);
        let passed = require_admin(user).expect("admin should pass");
        assert_eq!(passed.id, 1);
        assert_eq!(passed.email, "user@example.com");
        assert!(passed.is_admin);
    }

    #[test]
    fn require_admin_rejects_regular_user() {
        let err = require_admin(sample_user(false)).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }
}

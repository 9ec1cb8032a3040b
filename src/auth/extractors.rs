use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::{
    cookies::{get_cookie, ACCESS_COOKIE},
    jwt::JwtKeys,
};
use crate::error::ApiError;

/// Identity decoded from the access-token cookie. This is the single verify
/// path for gated routes; `/auth/me` reuses it rather than re-implementing
/// cookie parsing.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token =
            get_cookie(&parts.headers, ACCESS_COOKIE).ok_or(ApiError::Unauthenticated)?;
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "access token rejected");
            ApiError::InvalidToken
        })?;
        Ok(CurrentUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::{header::COOKIE, HeaderValue, Request};

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(c) = cookie {
            builder = builder.header(COOKIE, HeaderValue::from_str(c).unwrap());
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthenticated() {
        let state = AppState::fake();
        let mut parts = parts_with_cookie(None);
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let state = AppState::fake();
        let mut parts = parts_with_cookie(Some("access_token=garbage"));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[tokio::test]
    async fn valid_cookie_yields_identity() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id, "me@example.com").expect("sign");
        let cookie = format!("access_token={token}");
        let mut parts = parts_with_cookie(Some(&cookie));
        let user = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(user.id, user_id);
        assert_eq!(user.email, "me@example.com");
    }
}

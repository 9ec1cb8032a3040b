use std::time::Duration;

use axum::{
    extract::FromRef,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
};

use super::jwt::TokenPair;
use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cookie lifetimes mirror the token TTLs so the cookie and the embedded
/// expiry stay in sync by construction.
#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
    pub secure: bool,
}

impl FromRef<AppState> for CookieOptions {
    fn from_ref(state: &AppState) -> Self {
        Self {
            access_max_age: state.config.jwt.access_ttl,
            refresh_max_age: state.config.jwt.refresh_ttl,
            secure: state.config.cookie_secure,
        }
    }
}

fn build_cookie(name: &str, value: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn append(headers: &mut HeaderMap, cookie: String) {
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.append(SET_COOKIE, value);
    }
}

/// Sets both session cookies on the outgoing response headers.
pub fn set_auth_cookies(headers: &mut HeaderMap, tokens: &TokenPair, opts: &CookieOptions) {
    append(
        headers,
        build_cookie(ACCESS_COOKIE, &tokens.access, opts.access_max_age, opts.secure),
    );
    append(
        headers,
        build_cookie(
            REFRESH_COOKIE,
            &tokens.refresh,
            opts.refresh_max_age,
            opts.secure,
        ),
    );
}

/// Expires both session cookies immediately.
pub fn clear_auth_cookies(headers: &mut HeaderMap, secure: bool) {
    append(headers, build_cookie(ACCESS_COOKIE, "", Duration::ZERO, secure));
    append(headers, build_cookie(REFRESH_COOKIE, "", Duration::ZERO, secure));
}

/// Reads a cookie value from an incoming request's Cookie header.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> CookieOptions {
        CookieOptions {
            access_max_age: Duration::from_secs(900),
            refresh_max_age: Duration::from_secs(604_800),
            secure: false,
        }
    }

    fn pair() -> TokenPair {
        TokenPair {
            access: "tok-a".into(),
            refresh: "tok-r".into(),
        }
    }

    fn set_cookie_values(headers: &HeaderMap) -> Vec<String> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn sets_both_cookies_with_expected_attributes() {
        let mut headers = HeaderMap::new();
        set_auth_cookies(&mut headers, &pair(), &opts());
        let values = set_cookie_values(&headers);
        assert_eq!(values.len(), 2);
        assert!(values[0].starts_with("access_token=tok-a;"));
        assert!(values[0].contains("Max-Age=900"));
        assert!(values[1].starts_with("refresh_token=tok-r;"));
        assert!(values[1].contains("Max-Age=604800"));
        for v in &values {
            assert!(v.contains("HttpOnly"));
            assert!(v.contains("SameSite=Lax"));
            assert!(v.contains("Path=/"));
            assert!(!v.contains("Secure"));
        }
    }

    #[test]
    fn secure_flag_is_appended_when_enabled() {
        let mut headers = HeaderMap::new();
        let secure = CookieOptions {
            secure: true,
            ..opts()
        };
        set_auth_cookies(&mut headers, &pair(), &secure);
        for v in set_cookie_values(&headers) {
            assert!(v.ends_with("; Secure"));
        }
    }

    #[test]
    fn clear_expires_both_cookies() {
        let mut headers = HeaderMap::new();
        clear_auth_cookies(&mut headers, false);
        let values = set_cookie_values(&headers);
        assert_eq!(values.len(), 2);
        assert!(values[0].starts_with("access_token=;"));
        assert!(values[1].starts_with("refresh_token=;"));
        for v in &values {
            assert!(v.contains("Max-Age=0"));
        }
    }

    #[test]
    fn get_cookie_finds_value_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            get_cookie(&headers, ACCESS_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE), None);
    }

    #[test]
    fn get_cookie_handles_missing_header() {
        assert_eq!(get_cookie(&HeaderMap::new(), ACCESS_COOKIE), None);
    }
}

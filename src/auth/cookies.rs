use axum::http::{header, HeaderMap, HeaderValue};
use cookie::Cookie;

use crate::config::SecurityConfig;

pub const SESSION_COOKIE: &str = "session";

/// Set-Cookie value carrying the session token
pub fn build_session_cookie(token: &str, security: &SecurityConfig) -> Option<HeaderValue> {
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(cookie::SameSite::Lax)
        .path("/")
        .max_age(cookie::time::Duration::hours(security.session_expiry_hours as i64))
        .secure(security.cookie_secure)
        .build();

    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// Set-Cookie value that expires the session cookie
pub fn build_clear_cookie() -> HeaderValue {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(cookie::SameSite::Lax)
        .path("/")
        .max_age(cookie::time::Duration::ZERO)
        .build();

    HeaderValue::from_str(&cookie.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("session=; Path=/; Max-Age=0"))
}

/// Session token from the cookie, falling back to a Bearer header for API clients
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_cookie(headers, SESSION_COOKIE).filter(|t| !t.is_empty()) {
        return Some(token);
    }

    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header_value in headers.get_all(header::COOKIE) {
        let Ok(cookie_str) = header_value.to_str() else {
            continue;
        };
        for c in Cookie::split_parse(cookie_str.to_string()).flatten() {
            if c.name() == name {
                return Some(c.value().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn prefers_cookie_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session=abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("xyz"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn session_cookie_is_http_only() {
        let security = AppConfig::in_memory("secret").security;
        let value = build_session_cookie("tok", &security).unwrap();
        let text = value.to_str().unwrap();
        assert!(text.starts_with("session=tok"));
        assert!(text.contains("HttpOnly"));

        let cleared = build_clear_cookie();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }
}

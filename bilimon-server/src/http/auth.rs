//! Admin session gate
//!
//! One admin account from configuration. The session token is the md5 hex
//! digest of `user:password`, carried either in the `bilimon_session` cookie
//! or as `Authorization: Bearer <token>`. With no account configured the gate
//! lets everything through.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::envelope::{ok, ApiResult, Envelope};
use super::error::ApiError;
use super::extractors::ApiJson;
use super::server::AppState;

pub const SESSION_COOKIE: &str = "bilimon_session";

#[derive(Clone, Default)]
pub struct AuthGate {
    admin: Option<(String, String)>,
    token: Option<String>,
}

impl AuthGate {
    /// Gate for the given account; either half missing disables it
    pub fn new(user: Option<String>, password: Option<String>) -> Self {
        match (user, password) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                let token = session_token(&user, &password);
                Self {
                    admin: Some((user, password)),
                    token: Some(token),
                }
            }
            _ => Self::default(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn required(&self) -> bool {
        self.token.is_some()
    }

    pub fn login(&self, user: &str, password: &str) -> Option<&str> {
        match (&self.admin, &self.token) {
            (Some((u, p)), Some(token)) if u == user && p == password => Some(token),
            _ => None,
        }
    }

    /// Whether the request carries the session token
    pub fn authenticated(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return true;
        };
        presented_tokens(headers).any(|t| t == expected)
    }
}

pub fn session_token(user: &str, password: &str) -> String {
    format!("{:x}", md5::compute(format!("{user}:{password}")))
}

fn presented_tokens<'a>(headers: &'a HeaderMap) -> impl Iterator<Item = &'a str> + 'a {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let cookies = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .filter(|(name, _)| name.trim() == SESSION_COOKIE)
        .map(|(_, value)| value.trim());

    bearer.into_iter().chain(cookies)
}

/// Middleware for protected routes
pub async fn require_session(
    State(gate): State<AuthGate>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if gate.authenticated(request.headers()) {
        return next.run(request).await;
    }
    tracing::debug!(path = %request.uri().path(), "rejected unauthenticated request");
    ApiError::Unauthorized.into_response()
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub required: bool,
}

/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    if !state.auth.required() {
        return Ok(Json(Envelope::message("authentication not required")).into_response());
    }
    let token = state
        .auth
        .login(&req.username, &req.password)
        .ok_or(ApiError::Unauthorized)?;

    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    let mut response = Json(Envelope::message("logged in")).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    tracing::info!(user = %req.username, "admin logged in");
    Ok(response)
}

/// GET /api/auth/check
async fn check(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<SessionStatus> {
    ok(SessionStatus {
        authenticated: state.auth.authenticated(&headers),
        required: state.auth.required(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/check", get(check))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(name, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn disabled_gate_admits_everything() {
        let gate = AuthGate::new(Some("admin".into()), None);
        assert!(!gate.required());
        assert!(gate.authenticated(&HeaderMap::new()));
    }

    #[test]
    fn token_is_md5_of_account() {
        assert_eq!(session_token("admin", "secret"), format!("{:x}", md5::compute("admin:secret")));
        assert_eq!(session_token("a", "b").len(), 32);
    }

    #[test]
    fn cookie_and_bearer_are_accepted() {
        let gate = AuthGate::new(Some("admin".into()), Some("secret".into()));
        let token = session_token("admin", "secret");
        assert!(gate.required());
        assert!(!gate.authenticated(&HeaderMap::new()));
        assert!(gate.authenticated(&headers(
            header::COOKIE,
            &format!("theme=dark; {SESSION_COOKIE}={token}")
        )));
        assert!(gate.authenticated(&headers(header::AUTHORIZATION, &format!("Bearer {token}"))));
        assert!(!gate.authenticated(&headers(header::AUTHORIZATION, "Bearer nope")));
    }

    #[test]
    fn login_checks_both_halves() {
        let gate = AuthGate::new(Some("admin".into()), Some("secret".into()));
        assert!(gate.login("admin", "secret").is_some());
        assert!(gate.login("admin", "wrong").is_none());
        assert!(gate.login("root", "secret").is_none());
    }
}

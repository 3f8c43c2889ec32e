//! HTTP basic authentication middleware.

use crate::responses::AppError;
use axum::{
    body::Body,
    extract::State,
    http::{header::WWW_AUTHENTICATE, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tessera_config::SecurityConfig;
use tessera_core::TesseraError;
use tracing::debug;

const CHALLENGE: &str = "Basic realm=\"Restricted\"";

/// Expected credentials for the protected routes.
#[derive(Clone)]
pub struct BasicAuthState {
    credentials: Arc<(String, String)>,
}

impl BasicAuthState {
    /// Creates the state from explicit credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Arc::new((username.into(), password.into())),
        }
    }

    /// Creates the state from the security configuration.
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.basic_auth_username.clone(),
            config.basic_auth_password.clone(),
        )
    }

    /// Compares both fields in constant time and never short-circuits.
    fn matches(&self, basic: &Basic) -> bool {
        let (username, password) = self.credentials.as_ref();
        let username_ok = basic.username().as_bytes().ct_eq(username.as_bytes());
        let password_ok = basic.password().as_bytes().ct_eq(password.as_bytes());
        (username_ok & password_ok).into()
    }
}

impl std::fmt::Debug for BasicAuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthState")
            .field("username", &self.credentials.0)
            .finish_non_exhaustive()
    }
}

/// Rejects requests without valid basic-auth credentials.
///
/// Returns 401 with a `WWW-Authenticate` challenge.
pub async fn basic_auth_middleware(
    State(state): State<BasicAuthState>,
    auth: Option<TypedHeader<Authorization<Basic>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match auth {
        Some(TypedHeader(Authorization(basic))) if state.matches(&basic) => next.run(request).await,
        Some(_) => {
            debug!("Rejected basic auth credentials");
            unauthorized("Invalid credentials")
        }
        None => unauthorized("Missing credentials"),
    }
}

fn unauthorized(message: &str) -> Response {
    let mut response = AppError(TesseraError::unauthorized(message)).into_response();
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    response
}

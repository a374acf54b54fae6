//! API key authentication
//!
//! Bearer token check on every non-public path. Settings arrive as an
//! `Arc<Settings>` request extension.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bbq_assistant_config::{AuthConfig, Settings};

static AUTH_DISABLED_WARNED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, PartialEq, Eq)]
enum AuthCheck {
    Disabled,
    PublicPath,
    ConfigError(&'static str),
    CheckKey(String),
}

/// `/` only matches the root itself; other entries match as prefixes
fn is_public_path(public_paths: &[String], path: &str) -> bool {
    public_paths.iter().any(|p| {
        if p == "/" {
            path == "/"
        } else {
            path == p || path.starts_with(&format!("{}/", p.trim_end_matches('/')))
        }
    })
}

fn check_auth_config(auth: &AuthConfig, path: &str) -> AuthCheck {
    if !auth.enabled {
        if !AUTH_DISABLED_WARNED.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                "API authentication is disabled. Set BBQ_ASSISTANT__SERVER__AUTH__ENABLED=true for production."
            );
        }
        return AuthCheck::Disabled;
    }

    if is_public_path(&auth.public_paths, path) {
        return AuthCheck::PublicPath;
    }

    match &auth.api_key {
        Some(key) if !key.is_empty() => AuthCheck::CheckKey(key.clone()),
        _ => AuthCheck::ConfigError("Auth is enabled but no API key is configured"),
    }
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Requires `Authorization: Bearer <api_key>` when auth is enabled
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let settings = match request.extensions().get::<Arc<Settings>>() {
        Some(settings) => settings.clone(),
        None => {
            tracing::error!("Settings extension not found in request");
            return reject(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error");
        }
    };

    match check_auth_config(&settings.server.auth, request.uri().path()) {
        AuthCheck::Disabled | AuthCheck::PublicPath => next.run(request).await,
        AuthCheck::ConfigError(msg) => {
            tracing::error!("{}", msg);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Server authentication not configured")
        }
        AuthCheck::CheckKey(expected_key) => {
            let provided = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());

            match provided.as_deref().map(|h| h.strip_prefix("Bearer ")) {
                Some(Some(key)) => {
                    if constant_time_compare(key.as_bytes(), expected_key.as_bytes()) {
                        next.run(request).await
                    } else {
                        tracing::warn!(
                            forwarded_for = ?request.headers().get("X-Forwarded-For"),
                            "Invalid API key"
                        );
                        reject(StatusCode::UNAUTHORIZED, "Invalid API key")
                    }
                }
                Some(None) => reject(
                    StatusCode::BAD_REQUEST,
                    "Invalid Authorization header format. Expected: Bearer <token>",
                ),
                None => reject(StatusCode::UNAUTHORIZED, "Missing Authorization header"),
            }
        }
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

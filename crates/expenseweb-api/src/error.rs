//! Error types for expenseweb-api

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use expenseweb_core::CoreError;
use thiserror::Error;

use crate::{base_html, error_box, is_htmx_request};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Session missing or expired; the user is sent to `login_url`
    #[error("Unauthorized")]
    Unauthorized { login_url: String, htmx: bool },

    #[error("Backend error: {message}")]
    Backend { message: String, htmx: bool },
}

impl ApiError {
    /// Map a backend failure for the current request
    pub fn from_core(error: CoreError, login_url: &str, headers: &HeaderMap) -> Self {
        let htmx = is_htmx_request(headers);
        match error {
            CoreError::Unauthorized => ApiError::Unauthorized {
                login_url: login_url.to_string(),
                htmx,
            },
            other => ApiError::Backend {
                message: other.to_string(),
                htmx,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized { login_url, htmx: true } => {
                let mut response = StatusCode::OK.into_response();
                if let Ok(value) = HeaderValue::from_str(&login_url) {
                    response.headers_mut().insert("hx-redirect", value);
                }
                response
            }
            ApiError::Unauthorized { login_url, htmx: false } => {
                Redirect::to(&login_url).into_response()
            }
            ApiError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                Html(error_box("Not found", &resource)),
            )
                .into_response(),
            ApiError::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                Html(error_box("Bad request", &message)),
            )
                .into_response(),
            // HTMX only swaps 2xx bodies, so fragments report failure in-band
            ApiError::Backend { message, htmx: true } => {
                Html(error_box("Request failed", &message)).into_response()
            }
            ApiError::Backend { message, htmx: false } => (
                StatusCode::BAD_GATEWAY,
                Html(base_html("Error", &error_box("Request failed", &message))),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_redirects() {
        let headers = HeaderMap::new();
        let response = ApiError::from_core(CoreError::Unauthorized, "/login", &headers).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[test]
    fn test_unauthorized_htmx_uses_hx_redirect() {
        let mut headers = HeaderMap::new();
        headers.insert("hx-request", HeaderValue::from_static("true"));
        let response = ApiError::from_core(CoreError::Unauthorized, "/login", &headers).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["hx-redirect"], "/login");
    }

    #[test]
    fn test_backend_failure_status() {
        let err = CoreError::Transport {
            message: "connection refused".to_string(),
        };
        let response = ApiError::from_core(err, "/login", &HeaderMap::new()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}

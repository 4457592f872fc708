//! HTTP front-end server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::dashboard: dashboard page, transaction list, charts
//! - routes::transactions: add/edit form instances
//! - routes::banks: link, refresh and import actions

pub mod error;
pub mod forms;
pub mod routes;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use expenseweb_config::Config;
use expenseweb_core::{CoreError, FinanceBackend, Session};
use expenseweb_utils::escape_html;
use serde::Serialize;
use tokio::net::TcpListener;

pub use error::ApiError;
pub use forms::FormRegistry;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn FinanceBackend>,
    pub forms: FormRegistry,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn FinanceBackend>) -> Self {
        Self {
            config,
            backend,
            forms: FormRegistry::default(),
        }
    }

    /// Session credential for the backend, taken from the browser's cookies.
    ///
    /// Only the configured session cookie is forwarded; with no name
    /// configured the whole `Cookie` header is.
    pub fn session(&self, headers: &HeaderMap) -> Session {
        let raw = match headers.get("cookie").and_then(|v| v.to_str().ok()) {
            Some(raw) => raw,
            None => return Session::anonymous(),
        };
        let name = self.config.backend.session_cookie.as_str();
        if name.is_empty() {
            return Session::new(raw);
        }
        raw.split(';')
            .map(str::trim)
            .find(|pair| pair.split_once('=').map(|(k, _)| k == name).unwrap_or(false))
            .map(Session::new)
            .unwrap_or_else(Session::anonymous)
    }

    /// Map a backend failure for this request
    pub fn fail(&self, error: CoreError, headers: &HeaderMap) -> ApiError {
        ApiError::from_core(error, &self.config.backend.login_url, headers)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::banks::{
        htmx_import_form, htmx_import_submit, htmx_link_form, htmx_link_submit, htmx_refresh_link,
    };
    use routes::dashboard::{htmx_transactions_list, page_dashboard};
    use routes::transactions::{
        htmx_add_form, htmx_category_change, htmx_edit_form, htmx_form_close, htmx_form_submit,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/categories", get(api_categories))
        // Pages
        .route("/", get(page_dashboard))
        .route("/dashboard", get(page_dashboard))
        // HTMX partial routes
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/add", get(htmx_add_form))
        .route("/transactions/:id/edit", get(htmx_edit_form))
        .route("/forms/:form_id/category", post(htmx_category_change))
        .route("/forms/:form_id/submit", post(htmx_form_submit))
        .route("/forms/:form_id", delete(htmx_form_close))
        .route("/banks/link", get(htmx_link_form).post(htmx_link_submit))
        .route("/banks/refresh", post(htmx_refresh_link))
        .route("/banks/import", get(htmx_import_form).post(htmx_import_submit))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    open_forms: usize,
    saved_forms: u64,
}

/// Health check endpoint
async fn health_check(state: axum::extract::State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        open_forms: state.forms.len().await,
        saved_forms: state.forms.saved_count(),
    })
}

/// Category taxonomy (JSON passthrough)
async fn api_categories(
    state: axum::extract::State<AppState>,
    headers: HeaderMap,
) -> Response {
    let session = state.session(&headers);
    match state.backend.all_categories(&session).await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => {
            let status = match e {
                CoreError::Unauthorized => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(e.to_details())).into_response()
        }
    }
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Expenses</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
    <div id="modal-container"></div>
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Top navigation bar
pub fn nav_bar(current_path: &str) -> String {
    let links = [("/dashboard", "Dashboard")];

    let mut nav = String::from("<nav class='bg-white border-b px-6 py-3 flex items-center gap-6'><h1 class='text-xl font-bold text-indigo-600'>Expenses</h1><ul class='flex gap-2'>");
    for (path, label) in &links {
        let is_active = current_path == *path || (current_path == "/" && *path == "/dashboard");
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        nav.push_str(&format!(
            "<li><a href='{}' class='px-3 py-2 rounded-lg {}'>{}</a></li>",
            path, active_class, label
        ));
    }
    nav.push_str("</ul></nav>");
    nav
}

/// Check if request is from HTMX (partial page update)
pub(crate) fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!("<main class='p-6'>{}</main>", inner_content)
    } else {
        base_html(title, &format!("{}<main class='p-6'>{}</main>", nav_bar(current_path), inner_content))
    }
}

/// Red failure box used for in-band errors
pub fn error_box(title: &str, message: &str) -> String {
    format!(
        "<div class='bg-red-50 border border-red-200 rounded-lg p-4'><div class='flex items-center gap-2'><span class='text-red-600'>✗</span><span class='font-medium text-red-800'>{}</span></div><p class='text-sm text-red-600 mt-1'>{}</p></div>",
        escape_html(title),
        escape_html(message)
    )
}

/// Green confirmation box
pub fn success_box(title: &str, message: &str) -> String {
    format!(
        "<div class='bg-green-50 border border-green-200 rounded-lg p-4'><div class='flex items-center gap-2'><span class='text-green-600'>✓</span><span class='font-medium text-green-800'>{}</span></div><p class='text-sm text-green-600 mt-1'>{}</p></div>",
        escape_html(title),
        escape_html(message)
    )
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until the process is stopped.
pub async fn start_server(config: Config, backend: Arc<dyn FinanceBackend>) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    log::info!("Backend at {}", config.backend_url());

    let router = create_router(AppState::new(config, backend));
    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting expenseweb on http://{}", addr);

    axum::serve(listener, router).await?;
    log::info!("Server stopped");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use expenseweb_core::memory::MemoryBackend;
    use expenseweb_core::{Category, DashboardTransaction};
    use tower::ServiceExt;

    pub const COOKIE: &str = "theme=dark; session=abc123";

    pub fn taxonomy() -> Vec<Category> {
        vec![
            Category::new("Food", &["Groceries", "Dining"]),
            Category::new("Rent", &["Mortgage"]),
        ]
    }

    pub fn dinner() -> DashboardTransaction {
        DashboardTransaction {
            id: Some("tx-1".to_string()),
            booking_date: Some("2024-03-02".to_string()),
            amount: Some(25.0),
            currency: Some("EUR".to_string()),
            remittance_information_unstructured: Some("Dinner".to_string()),
            transaction_type: Some("expense".to_string()),
            category: Some("Food".to_string()),
            sub_category: Some("Dining".to_string()),
            ..Default::default()
        }
    }

    pub fn app() -> (AppState, Arc<MemoryBackend>) {
        let memory = Arc::new(MemoryBackend::new(taxonomy()));
        memory.require_cookie("session=abc123");
        memory.insert(dinner());
        let backend: Arc<dyn FinanceBackend> = memory.clone();
        (AppState::new(Config::default(), backend), memory)
    }

    pub async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("cookie", COOKIE)
            .header("hx-request", "true")
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("cookie", COOKIE)
            .header("hx-request", "true")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{app, get, send, COOKIE};
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    #[test]
    fn test_session_picks_configured_cookie() {
        let (state, _) = app();
        let mut headers = HeaderMap::new();
        headers.insert("cookie", COOKIE.parse().unwrap());
        assert_eq!(state.session(&headers).cookie(), Some("session=abc123"));

        headers.insert("cookie", "theme=dark".parse().unwrap());
        assert_eq!(state.session(&headers), Session::anonymous());
        assert_eq!(state.session(&HeaderMap::new()), Session::anonymous());
    }

    #[test]
    fn test_page_response_partial_vs_full() {
        let mut headers = HeaderMap::new();
        let full = page_response(&headers, "Dashboard", "/", "<p>hi</p>");
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(full.contains("htmx.org"));

        headers.insert("hx-request", "true".parse().unwrap());
        let partial = page_response(&headers, "Dashboard", "/", "<p>hi</p>");
        assert_eq!(partial, "<main class='p-6'><p>hi</p></main>");
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = app();
        let (status, _, body) = send(&state, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"status\":\"ok\""));
        assert!(body.contains("\"saved_forms\":0"));
    }

    #[tokio::test]
    async fn test_api_categories() {
        let (state, _) = app();
        let (status, _, body) = send(&state, get("/api/categories")).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json[0]["_id"], "Food");

        let anonymous = Request::builder().uri("/api/categories").body(Body::empty()).unwrap();
        let (status, _, body) = send(&state, anonymous).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHORIZED"));
    }
}

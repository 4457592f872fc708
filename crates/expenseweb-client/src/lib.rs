//! HTTP client for the finance REST backend
//!
//! `HttpBackend` implements `FinanceBackend` over plain HTTP with hyper. The
//! browser's `Cookie` header is forwarded on every call; a 401 from the
//! backend becomes `CoreError::Unauthorized`.

pub mod error;

use async_trait::async_trait;
use expenseweb_config::Config;
use expenseweb_core::{
    Category, CoreResult, DashboardData, FinanceBackend, ImportRequest, ImportResult,
    LinkBankRequest, RefreshLinkResult, Session, TransactionDocument,
};
use hyper::client::HttpConnector;
use hyper::header::{ACCEPT, CONTENT_TYPE, COOKIE};
use hyper::{Body, Client, Method, Request, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::ClientError;

/// Longest error body echoed back to the user
const MAX_ERROR_BODY: usize = 300;

/// Backend reached over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    client: Client<HttpConnector>,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.backend_url())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, session: &Session) -> Result<T, ClientError> {
        self.send(Method::GET, path, session, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        session: &Session,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let payload = match body {
            Some(b) => Some(serde_json::to_vec(b)?),
            None => None,
        };
        self.send(Method::POST, path, session, payload).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        session: &Session,
        payload: Option<Vec<u8>>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let uri: Uri = url.parse().map_err(|_| ClientError::InvalidUri { uri: url.clone() })?;

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(ACCEPT, "application/json");
        if let Some(cookie) = session.cookie() {
            builder = builder.header(COOKIE, cookie);
        }
        let request = match payload {
            Some(bytes) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(bytes))?,
            None => builder.body(Body::empty())?,
        };

        log::debug!("{} {}", method, url);
        let response = self.client.request(request).await?;
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await?;

        if status == StatusCode::UNAUTHORIZED {
            log::info!("{} {} -> 401", method, url);
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let message = error_message(&bytes);
            log::warn!("{} {} -> {}: {}", method, url, status.as_u16(), message);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        // Some endpoints answer with an empty body
        if bytes.is_empty() {
            return Ok(serde_json::from_slice(b"{}")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Pull `{"error": "..."}` out of a failure body, else the raw text
fn error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return message.to_string();
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.chars().count() > MAX_ERROR_BODY {
        let cut: String = text.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

#[async_trait]
impl FinanceBackend for HttpBackend {
    async fn all_categories(&self, session: &Session) -> CoreResult<Vec<Category>> {
        Ok(self.get("/all_categories", session).await?)
    }

    async fn add_transaction(
        &self,
        session: &Session,
        document: &TransactionDocument,
    ) -> CoreResult<serde_json::Value> {
        Ok(self.post("/add_expense", session, Some(document)).await?)
    }

    async fn edit_transaction(
        &self,
        session: &Session,
        id: &str,
        document: &TransactionDocument,
    ) -> CoreResult<serde_json::Value> {
        let path = format!("/edit_expense/{}", urlencoding::encode(id));
        Ok(self.post(&path, session, Some(document)).await?)
    }

    async fn dashboard(&self, session: &Session) -> CoreResult<DashboardData> {
        Ok(self.get("/dashboard", session).await?)
    }

    async fn link_bank(
        &self,
        session: &Session,
        request: &LinkBankRequest,
    ) -> CoreResult<serde_json::Value> {
        Ok(self.post("/banks/link_bank", session, Some(request)).await?)
    }

    async fn refresh_link(&self, session: &Session) -> CoreResult<RefreshLinkResult> {
        Ok(self
            .post::<serde_json::Value, _>("/banks/refresh_link", session, None)
            .await?)
    }

    async fn import_transactions(
        &self,
        session: &Session,
        request: &ImportRequest,
    ) -> CoreResult<ImportResult> {
        Ok(self.post("/banks/import", session, Some(request)).await?)
    }
}

//! Finance backend seam
//!
//! The web layer talks to the REST backend through this trait; tests plug in
//! an in-memory implementation.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::models::{
    Category, DashboardData, ImportRequest, ImportResult, LinkBankRequest, RefreshLinkResult,
    TransactionDocument,
};

/// Session credential forwarded on every backend call (the raw `Cookie` header)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session(Option<String>);

impl Session {
    pub fn new(cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        if cookie.trim().is_empty() {
            Session(None)
        } else {
            Session(Some(cookie))
        }
    }

    pub fn anonymous() -> Self {
        Session(None)
    }

    pub fn cookie(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Operations the front-end needs from the backend
#[async_trait]
pub trait FinanceBackend: Send + Sync {
    /// `GET /all_categories`
    async fn all_categories(&self, session: &Session) -> CoreResult<Vec<Category>>;

    /// `POST /add_expense`
    async fn add_transaction(
        &self,
        session: &Session,
        document: &TransactionDocument,
    ) -> CoreResult<serde_json::Value>;

    /// `POST /edit_expense/{id}`
    async fn edit_transaction(
        &self,
        session: &Session,
        id: &str,
        document: &TransactionDocument,
    ) -> CoreResult<serde_json::Value>;

    /// `GET /dashboard`
    async fn dashboard(&self, session: &Session) -> CoreResult<DashboardData>;

    /// `POST /banks/link_bank`
    async fn link_bank(
        &self,
        session: &Session,
        request: &LinkBankRequest,
    ) -> CoreResult<serde_json::Value>;

    /// `POST /banks/refresh_link`
    async fn refresh_link(&self, session: &Session) -> CoreResult<RefreshLinkResult>;

    /// `POST /banks/import`
    async fn import_transactions(
        &self,
        session: &Session,
        request: &ImportRequest,
    ) -> CoreResult<ImportResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_cookie_is_anonymous() {
        assert_eq!(Session::new("   "), Session::anonymous());
        assert_eq!(Session::new("session=abc").cookie(), Some("session=abc"));
    }
}

//! In-memory backend for tests
//!
//! Behaves like the REST backend closely enough to drive the controller and
//! the web layer without a network: categories, stored rows, and switches to
//! make calls fail.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{FinanceBackend, Session};
use crate::error::{CoreError, CoreResult};
use crate::models::{
    Category, ChartData, DashboardData, DashboardTransaction, DashboardUser, ImportRequest,
    ImportResult, LinkBankRequest, RefreshLinkResult, TransactionDocument,
};

#[derive(Default)]
struct MemoryState {
    categories: Vec<Category>,
    categories_fail: bool,
    submit_failure: Option<u16>,
    required_cookie: Option<String>,
    rows: Vec<DashboardTransaction>,
    chart_data: ChartData,
    documents: Vec<TransactionDocument>,
    link_requests: Vec<LinkBankRequest>,
    imports: Vec<ImportRequest>,
    calls: Vec<String>,
    next_id: u64,
}

pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                categories,
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Make `GET /all_categories` answer 500
    pub fn fail_categories(&self) {
        self.lock().categories_fail = true;
    }

    /// Make add/edit answer with `status`
    pub fn fail_submits(&self, status: u16) {
        self.lock().submit_failure = Some(status);
    }

    /// Answer 401 unless the session cookie matches
    pub fn require_cookie(&self, cookie: &str) {
        self.lock().required_cookie = Some(cookie.to_string());
    }

    pub fn insert(&self, row: DashboardTransaction) {
        self.lock().rows.push(row);
    }

    pub fn set_chart_data(&self, chart_data: ChartData) {
        self.lock().chart_data = chart_data;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn last_document(&self) -> Option<TransactionDocument> {
        self.lock().documents.last().cloned()
    }

    pub fn dashboard_rows(&self) -> Vec<DashboardTransaction> {
        self.lock().rows.clone()
    }

    pub fn link_requests(&self) -> Vec<LinkBankRequest> {
        self.lock().link_requests.clone()
    }

    pub fn imports(&self) -> Vec<ImportRequest> {
        self.lock().imports.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self, session: &Session, call: String) -> CoreResult<std::sync::MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(required) = &state.required_cookie {
            if session.cookie() != Some(required.as_str()) {
                return Err(CoreError::Unauthorized);
            }
        }
        Ok(state)
    }
}

fn apply_document(row: &mut DashboardTransaction, doc: &TransactionDocument) {
    fn set(target: &mut Option<String>, value: &Option<String>) {
        if value.is_some() {
            *target = value.clone();
        }
    }
    set(&mut row.transaction_id, &doc.transaction_id);
    set(&mut row.end_to_end_id, &doc.end_to_end_id);
    set(&mut row.booking_date, &doc.booking_date);
    set(&mut row.debtor_name, &doc.debtor_name);
    set(&mut row.creditor_name, &doc.creditor_name);
    set(&mut row.remittance_information_unstructured, &doc.remittance_information_unstructured);
    set(&mut row.proprietary_bank_transaction_code, &doc.proprietary_bank_transaction_code);
    set(&mut row.internal_transaction_id, &doc.internal_transaction_id);
    set(&mut row.category, &doc.category);
    set(&mut row.sub_category, &doc.sub_category);
    if doc.debtor_account.is_some() {
        row.debtor_account = doc.debtor_account.clone();
    }
    if doc.creditor_account.is_some() {
        row.creditor_account = doc.creditor_account.clone();
    }
    row.amount = Some(doc.transaction_amount.amount);
    row.currency = Some(doc.transaction_amount.currency.clone());
    row.transaction_amount = None;
    row.transaction_type = Some(doc.transaction_type.to_string());
}

#[async_trait]
impl FinanceBackend for MemoryBackend {
    async fn all_categories(&self, session: &Session) -> CoreResult<Vec<Category>> {
        let state = self.enter(session, "GET /all_categories".to_string())?;
        if state.categories_fail {
            return Err(CoreError::BackendStatus {
                status: 500,
                message: "categories unavailable".to_string(),
            });
        }
        Ok(state.categories.clone())
    }

    async fn add_transaction(
        &self,
        session: &Session,
        document: &TransactionDocument,
    ) -> CoreResult<serde_json::Value> {
        let mut state = self.enter(session, "POST /add_expense".to_string())?;
        if let Some(status) = state.submit_failure {
            return Err(CoreError::BackendStatus {
                status,
                message: "rejected".to_string(),
            });
        }
        let id = format!("mem-{}", state.next_id);
        state.next_id += 1;
        let mut row = DashboardTransaction {
            id: Some(id.clone()),
            ..Default::default()
        };
        apply_document(&mut row, document);
        state.rows.push(row);
        state.documents.push(document.clone());
        Ok(serde_json::json!({ "success": true, "id": id }))
    }

    async fn edit_transaction(
        &self,
        session: &Session,
        id: &str,
        document: &TransactionDocument,
    ) -> CoreResult<serde_json::Value> {
        let mut state = self.enter(session, format!("POST /edit_expense/{}", id))?;
        if let Some(status) = state.submit_failure {
            return Err(CoreError::BackendStatus {
                status,
                message: "rejected".to_string(),
            });
        }
        state.documents.push(document.clone());
        match state.rows.iter_mut().find(|r| r.id.as_deref() == Some(id)) {
            Some(row) => {
                apply_document(row, document);
                Ok(serde_json::json!({ "success": true }))
            }
            None => Err(CoreError::BackendStatus {
                status: 404,
                message: "Expense not found".to_string(),
            }),
        }
    }

    async fn dashboard(&self, session: &Session) -> CoreResult<DashboardData> {
        let state = self.enter(session, "GET /dashboard".to_string())?;
        Ok(DashboardData {
            user: Some(DashboardUser {
                id: "memory".to_string(),
            }),
            transactions: state.rows.clone(),
            chart_data: state.chart_data.clone(),
        })
    }

    async fn link_bank(
        &self,
        session: &Session,
        request: &LinkBankRequest,
    ) -> CoreResult<serde_json::Value> {
        let mut state = self.enter(session, "POST /banks/link_bank".to_string())?;
        state.link_requests.push(request.clone());
        Ok(serde_json::json!({ "success": true }))
    }

    async fn refresh_link(&self, session: &Session) -> CoreResult<RefreshLinkResult> {
        self.enter(session, "POST /banks/refresh_link".to_string())?;
        Ok(RefreshLinkResult {
            success: true,
            accounts: serde_json::json!({ "accounts": ["acc-1"] }),
            agreement: serde_json::json!({ "id": "agr-1" }),
        })
    }

    async fn import_transactions(
        &self,
        session: &Session,
        request: &ImportRequest,
    ) -> CoreResult<ImportResult> {
        let mut state = self.enter(session, "POST /banks/import".to_string())?;
        state.imports.push(request.clone());
        Ok(ImportResult {
            success: true,
            imported: 0,
        })
    }
}

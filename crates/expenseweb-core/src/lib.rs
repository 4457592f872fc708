//! Core transaction model and form logic
//!
//! - models: categories, transactions, dashboard and bank payloads
//! - taxonomy: category to sub-category cascade
//! - form: editable fields and the partial update document
//! - controller: add/edit form state machine
//! - backend: the `FinanceBackend` trait implemented by the HTTP client

pub mod backend;
pub mod controller;
pub mod error;
pub mod form;
pub mod models;
pub mod taxonomy;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use backend::{FinanceBackend, Session};
pub use controller::{
    Applied, FormEvent, PendingLoad, PendingSubmit, SubmitOutcome,
    TransactionFormController,
};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use form::{TransactionFields, DEFAULT_CURRENCY};
pub use models::{
    AccountRef, Amount, Category, CategoryDataset, ChartData, DashboardData,
    DashboardTransaction, ImportRequest, ImportResult, LinkBankRequest, RefreshLinkResult,
    Transaction, TransactionDocument, WireAmount,
};
pub use taxonomy::derive_sub_category_options;
pub use types::{FormMode, TransactionType};

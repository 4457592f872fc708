//! Route modules for the front-end server
//!
//! - dashboard: dashboard page, transaction list fragment, charts
//! - transactions: add/edit modal forms backed by form controllers
//! - banks: link bank, refresh link status, import transactions
//!
//! Each module has:
//! - api.rs: handlers (pages, HTMX endpoints)
//! - page.rs: HTML rendering

pub mod banks;
pub mod dashboard;
pub mod transactions;

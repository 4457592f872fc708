//! Dashboard routes - transaction list and spending charts
//!
//! The list container re-fetches itself whenever a form save or an import
//! fires the `transactions-changed` event.

pub mod api;
pub mod page;

pub use api::{htmx_transactions_list, page_dashboard};

//! Dashboard endpoints
//!
//! - page_dashboard: full page (or main area for HTMX)
//! - htmx_transactions_list: list fragment, re-fetched on `transactions-changed`

use axum::response::Html;

use super::page::{render_dashboard, render_transaction_list};
use crate::{page_response, ApiError, AppState};

/// Dashboard page
pub async fn page_dashboard(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Html<String>, ApiError> {
    let session = state.session(&headers);
    let data = state
        .backend
        .dashboard(&session)
        .await
        .map_err(|e| state.fail(e, &headers))?;
    log::debug!("Dashboard with {} transactions", data.transactions.len());

    let inner_content = render_dashboard(&data, state.config.currency.decimal_places as usize);
    Ok(Html(page_response(&headers, "Dashboard", "/dashboard", &inner_content)))
}

/// HTMX: transaction list
pub async fn htmx_transactions_list(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Html<String>, ApiError> {
    let session = state.session(&headers);
    let data = state
        .backend
        .dashboard(&session)
        .await
        .map_err(|e| state.fail(e, &headers))?;

    Ok(Html(render_transaction_list(
        &data.transactions(),
        state.config.currency.decimal_places as usize,
    )))
}

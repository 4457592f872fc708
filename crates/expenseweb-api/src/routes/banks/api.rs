//! Bank endpoints - HTMX fragments

use axum::response::{Html, IntoResponse, Response};
use chrono::{Duration, Local};
use expenseweb_core::{CoreError, ImportRequest, LinkBankRequest};
use expenseweb_utils::{escape_html, parse_form_body, parse_form_pairs};

use super::page::{render_import_modal, render_link_modal};
use crate::routes::transactions::api::TRANSACTIONS_CHANGED;
use crate::{error_box, success_box, AppState};

/// HTMX: link-bank modal
pub async fn htmx_link_form(state: axum::extract::State<AppState>) -> Html<String> {
    Html(render_link_modal(&state.config.bank_link))
}

/// HTMX: request a bank link
pub async fn htmx_link_submit(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    body: String,
) -> Response {
    let request = match link_request(&state, &body) {
        Ok(request) => request,
        Err(message) => return Html(error_box("Invalid input", &message)).into_response(),
    };

    let session = state.session(&headers);
    match state.backend.link_bank(&session, &request).await {
        Ok(response) => {
            log::info!("Bank link requested for {}", request.institution_id);
            let mut html = success_box("Bank link requested", "Finish the authorisation with your bank.");
            if let Some(link) = response.get("link").and_then(|l| l.as_str()) {
                html.push_str(&format!(
                    "<a href='{}' target='_blank' rel='noopener' class='mt-2 inline-block text-indigo-600 underline'>Continue at your bank</a>",
                    escape_html(link)
                ));
            }
            Html(html).into_response()
        }
        Err(e) => bank_failure(&state, &headers, "Link failed", e),
    }
}

fn link_request(state: &AppState, body: &str) -> Result<LinkBankRequest, String> {
    let defaults = &state.config.bank_link;
    let pairs = parse_form_pairs(body);
    let value = |key: &str, default: &str| {
        pairs
            .iter()
            .rev()
            .find(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_else(|| default.to_string())
    };

    let institution_id = value("institution_id", &defaults.institution_id);
    let max_historical_days = value("max_historical_days", &defaults.max_historical_days);
    let access_valid_for_days = value("access_valid_for_days", &defaults.access_valid_for_days);
    for (field, days) in [
        ("max_historical_days", &max_historical_days),
        ("access_valid_for_days", &access_valid_for_days),
    ] {
        match days.parse::<u32>() {
            Ok(n) if n > 0 => {}
            _ => return Err(format!("{} must be a positive number of days", field)),
        }
    }

    let access_scope: Vec<String> = pairs
        .iter()
        .filter(|(k, _)| k == "access_scope")
        .map(|(_, v)| v.clone())
        .collect();
    if access_scope.is_empty() {
        return Err("Select at least one access scope".to_string());
    }

    Ok(LinkBankRequest {
        institution_id,
        max_historical_days,
        access_valid_for_days,
        access_scope,
    })
}

/// HTMX: refresh link status
pub async fn htmx_refresh_link(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Response {
    let session = state.session(&headers);
    match state.backend.refresh_link(&session).await {
        Ok(result) => {
            let accounts = result
                .accounts
                .get("accounts")
                .and_then(|a| a.as_array())
                .or_else(|| result.accounts.as_array())
                .map(|a| a.len())
                .unwrap_or(0);
            log::info!("Link refreshed, {} account(s)", accounts);
            (
                [("hx-trigger", TRANSACTIONS_CHANGED)],
                Html(success_box("Link status refreshed", &format!("{} linked account(s).", accounts))),
            )
                .into_response()
        }
        Err(e) => bank_failure(&state, &headers, "Refresh failed", e),
    }
}

/// HTMX: import modal, defaulting to the configured history window
pub async fn htmx_import_form(state: axum::extract::State<AppState>) -> Html<String> {
    let days: i64 = state.config.bank_link.max_historical_days.parse().unwrap_or(90);
    let today = Local::now().date_naive();
    let from = today - Duration::days(days);
    Html(render_import_modal(
        &from.format("%Y-%m-%d").to_string(),
        &today.format("%Y-%m-%d").to_string(),
    ))
}

/// HTMX: import transactions for a date window
pub async fn htmx_import_submit(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    body: String,
) -> Response {
    let params = parse_form_body(&body);
    let date_from = params.get("date_from").map(|s| s.as_str()).unwrap_or("");
    let date_to = params.get("date_to").map(|s| s.as_str()).unwrap_or("");

    let request = match ImportRequest::new(date_from, date_to) {
        Ok(request) => request,
        Err(e) => return Html(error_box("Invalid dates", &e.to_string())).into_response(),
    };

    let session = state.session(&headers);
    match state.backend.import_transactions(&session, &request).await {
        Ok(result) => {
            log::info!(
                "Imported {} transactions ({} to {})",
                result.imported,
                request.date_from,
                request.date_to
            );
            (
                [("hx-trigger", TRANSACTIONS_CHANGED)],
                Html(success_box("Import finished", &format!("Imported {} transactions.", result.imported))),
            )
                .into_response()
        }
        Err(e) => bank_failure(&state, &headers, "Import failed", e),
    }
}

fn bank_failure(state: &AppState, headers: &axum::http::HeaderMap, title: &str, error: CoreError) -> Response {
    if error.is_unauthorized() {
        return state.fail(error, headers).into_response();
    }
    log::log!(error.severity().log_level(), "{}: {}", title, error);
    Html(error_box(title, &error.to_string())).into_response()
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_link_form_and_submit() {
        let (state, memory) = app();
        let (status, _, html) = send(&state, get("/banks/link")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("ING_INGBNL2A"));

        let body = "institution_id=REVOLUT_REVOGB21&max_historical_days=30&access_valid_for_days=&access_scope=balances&access_scope=transactions";
        let (_, _, html) = send(&state, post_form("/banks/link", body)).await;
        assert!(html.contains("Bank link requested"));

        let sent = memory.link_requests();
        assert_eq!(sent[0].institution_id, "REVOLUT_REVOGB21");
        assert_eq!(sent[0].max_historical_days, "30");
        assert_eq!(sent[0].access_valid_for_days, "180");
        assert_eq!(sent[0].access_scope, vec!["balances", "transactions"]);
    }

    #[tokio::test]
    async fn test_link_requires_scope() {
        let (state, memory) = app();
        let (_, _, html) = send(&state, post_form("/banks/link", "institution_id=X")).await;
        assert!(html.contains("Select at least one access scope"));
        assert!(memory.link_requests().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_fires_event() {
        let (state, _) = app();
        let (_, headers, html) = send(&state, post_form("/banks/refresh", "")).await;
        assert_eq!(headers["hx-trigger"], "transactions-changed");
        assert!(html.contains("1 linked account(s)."));
    }

    #[tokio::test]
    async fn test_import_validates_dates() {
        let (state, memory) = app();

        let (_, _, html) = send(&state, post_form("/banks/import", "date_from=2024-02-01&date_to=")).await;
        assert!(html.contains("Invalid dates"));

        let (_, _, html) = send(&state, post_form("/banks/import", "date_from=2024-02-10&date_to=2024-02-01")).await;
        assert!(html.contains("Invalid dates"));
        assert!(memory.imports().is_empty());

        let (_, headers, html) = send(&state, post_form("/banks/import", "date_from=2024-02-01&date_to=2024-02-29")).await;
        assert_eq!(headers["hx-trigger"], "transactions-changed");
        assert!(html.contains("Imported 0 transactions."));
        assert_eq!(memory.imports()[0].date_to, "2024-02-29");
    }

    #[tokio::test]
    async fn test_import_form_defaults() {
        let (state, _) = app();
        let (_, _, html) = send(&state, get("/banks/import")).await;
        assert!(html.contains("name='date_from'"));
        assert!(html.contains("Import Transactions"));
    }
}

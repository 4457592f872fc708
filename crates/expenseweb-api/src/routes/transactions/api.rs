//! Transaction form endpoints - HTMX fragments
//!
//! Endpoints:
//! - htmx_add_form: open an add form instance (modal)
//! - htmx_edit_form: open an edit form instance for a dashboard record
//! - htmx_category_change: re-derive sub-categories after a category change
//! - htmx_form_submit: save; success fires `transactions-changed`
//! - htmx_form_close: close an instance without saving

use std::collections::HashMap;

use axum::extract::Path;
use axum::response::{Html, IntoResponse, Response};
use expenseweb_core::{
    CoreError, CoreResult, FormMode, SubmitOutcome, TransactionFormController, TransactionType,
};
use expenseweb_utils::parse_form_body;

use super::page::{render_modal, render_sub_category_select};
use crate::{error_box, ApiError, AppState};

/// Event fired after a successful save; the dashboard list listens for it
pub const TRANSACTIONS_CHANGED: &str = "transactions-changed";

fn new_form(state: &AppState, mode: FormMode, headers: &axum::http::HeaderMap) -> TransactionFormController {
    TransactionFormController::new(mode, state.backend.clone(), state.session(headers))
        .with_default_currency(&state.config.currency.default_currency)
}

fn form_not_found(form_id: &str) -> ApiError {
    ApiError::NotFound {
        resource: format!("form {} (it may have been closed)", form_id),
    }
}

/// HTMX: open an add form
pub async fn htmx_add_form(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Html<String> {
    let mut form = new_form(&state, FormMode::Add, &headers);
    form.load_categories().await;

    let form_id = state.forms.open(form).await;
    log::debug!("Opened add form {}", form_id);
    Html(render_open_form(&state, &form_id).await)
}

/// HTMX: open an edit form populated from the dashboard record `id`
pub async fn htmx_edit_form(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let session = state.session(&headers);
    let data = state
        .backend
        .dashboard(&session)
        .await
        .map_err(|e| state.fail(e, &headers))?;

    let record = data.find_transaction(&id);
    if record.is_none() {
        log::warn!("Transaction {} not on the dashboard, opening an empty edit form", id);
    }

    let mut form = new_form(&state, FormMode::Edit, &headers);
    form.load_categories().await;
    form.set_record(record);

    let form_id = state.forms.open(form).await;
    log::debug!("Opened edit form {} for {}", form_id, id);
    Ok(Html(render_open_form(&state, &form_id).await))
}

async fn render_open_form(state: &AppState, form_id: &str) -> String {
    state
        .forms
        .with_form(form_id, |form| render_modal(form_id, form))
        .await
        .unwrap_or_else(|| error_box("Form unavailable", "The form was closed before it opened."))
}

/// HTMX: category changed; returns the new sub-category select
pub async fn htmx_category_change(
    state: axum::extract::State<AppState>,
    Path(form_id): Path<String>,
    body: String,
) -> Result<Html<String>, ApiError> {
    let params = parse_form_body(&body);
    let category = params.get("category").map(|s| s.as_str()).unwrap_or("");

    state
        .forms
        .with_form(&form_id, |form| {
            // The sub-category the user had picked belongs to the old options
            if let Some(sub_category) = params.get("sub_category") {
                form.select_sub_category(sub_category);
            }
            form.select_category(category);
            render_sub_category_select(&form_id, form)
        })
        .await
        .map(Html)
        .ok_or_else(|| form_not_found(&form_id))
}

/// HTMX: submit a form
pub async fn htmx_form_submit(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    Path(form_id): Path<String>,
    body: String,
) -> Response {
    let params = parse_form_body(&body);
    let session = state.session(&headers);

    let begun = state
        .forms
        .with_form(&form_id, |form| {
            form.set_session(session);
            apply_fields(form, &params)?;
            form.begin_submit()
        })
        .await;

    let pending = match begun {
        None => return form_not_found(&form_id).into_response(),
        Some(Err(e)) => return submit_failure(&state, &headers, e),
        Some(Ok(None)) => {
            return Html(error_box("Nothing to save", "No transaction is selected for editing.")).into_response()
        }
        Some(Ok(Some(pending))) => pending,
    };

    // Lock released while the backend works
    let result = pending.send().await;

    let finished = state
        .forms
        .with_form(&form_id, |form| form.finish_submit(pending.ticket(), result))
        .await;

    match finished {
        Some(Ok(SubmitOutcome::Saved { .. })) => {
            state.forms.remove(&form_id).await;
            (
                [
                    ("hx-trigger", TRANSACTIONS_CHANGED.to_string()),
                    ("hx-retarget", format!("#modal-{}", form_id)),
                    ("hx-reswap", "outerHTML".to_string()),
                ],
                Html(String::new()),
            )
                .into_response()
        }
        Some(Ok(SubmitOutcome::Stale)) | Some(Ok(SubmitOutcome::Skipped)) | None => {
            log::debug!("Form {} went away before its submit finished", form_id);
            Html(String::new()).into_response()
        }
        Some(Err(e)) => submit_failure(&state, &headers, e),
    }
}

/// HTMX: close a form
pub async fn htmx_form_close(
    state: axum::extract::State<AppState>,
    Path(form_id): Path<String>,
) -> Html<String> {
    state.forms.close(&form_id).await;
    Html(String::new())
}

/// Copy posted values into the form. The record id is never taken from
/// the request.
fn apply_fields(form: &mut TransactionFormController, params: &HashMap<String, String>) -> CoreResult<()> {
    fn take(params: &HashMap<String, String>, key: &str, target: &mut String) {
        if let Some(value) = params.get(key) {
            *target = value.trim().to_string();
        }
    }

    let fields = form.fields_mut();
    take(params, "transaction_id", &mut fields.transaction_id);
    take(params, "end_to_end_id", &mut fields.end_to_end_id);
    take(params, "booking_date", &mut fields.booking_date);
    take(params, "debtor_name", &mut fields.debtor_name);
    take(params, "debtor_iban", &mut fields.debtor_iban);
    take(params, "creditor_name", &mut fields.creditor_name);
    take(params, "creditor_iban", &mut fields.creditor_iban);
    take(params, "remittance_info", &mut fields.remittance_info);
    take(params, "bank_transaction_code", &mut fields.bank_transaction_code);
    take(params, "internal_transaction_id", &mut fields.internal_transaction_id);
    if let Some(currency) = params.get("currency") {
        fields.currency = currency.trim().to_uppercase();
    }
    if let Some(amount) = params.get("amount") {
        fields.set_amount_text(amount)?;
    }
    if let Some(kind) = params.get("transaction_type") {
        fields.transaction_type = kind
            .parse::<TransactionType>()
            .map_err(|message| CoreError::ValidationError {
                field: "transactionType".to_string(),
                message,
            })?;
    }

    if let Some(category) = params.get("category") {
        form.select_category(category);
    }
    // A disabled select is not posted, which means no sub-category
    let sub_category = params.get("sub_category").map(|s| s.as_str()).unwrap_or("");
    form.select_sub_category(sub_category);
    Ok(())
}

fn submit_failure(state: &AppState, headers: &axum::http::HeaderMap, error: CoreError) -> Response {
    match error {
        CoreError::Unauthorized => state.fail(error, headers).into_response(),
        CoreError::ValidationError { field, message } => {
            Html(error_box("Invalid input", &format!("{}: {}", field, message))).into_response()
        }
        CoreError::SubmitInFlight => {
            Html(error_box("Already saving", "Wait for the current save to finish.")).into_response()
        }
        CoreError::FormClosed => Html(error_box("Form closed", "Open the form again to save.")).into_response(),
        other => Html(error_box("Save failed", &other.to_string())).into_response(),
    }
}

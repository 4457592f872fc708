//! Transaction form controller
//!
//! Owns the add/edit form state of one form instance: the scalar fields, the
//! category snapshot fetched at mount, and the derived sub-category choices.
//!
//! Backend I/O is split into `begin_*` (state change, returns a pending
//! request) and `finish_*` (applies the result). A host that keeps the
//! controller behind a lock performs the request in between without holding
//! the lock. Every pending request carries a ticket; results for a closed form
//! or a superseded ticket are dropped.

use std::sync::Arc;

use crate::backend::{FinanceBackend, Session};
use crate::error::{CoreError, CoreResult};
use crate::form::{TransactionFields, DEFAULT_CURRENCY};
use crate::models::{Category, Transaction, TransactionDocument};
use crate::taxonomy::derive_sub_category_options;
use crate::types::FormMode;

/// Notification sent to listeners registered with [`TransactionFormController::on_event`]
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// The backend accepted the submit; the caller should refresh its list
    Saved {
        mode: FormMode,
        record_id: Option<String>,
        response: serde_json::Value,
    },
    /// The form was closed without saving
    Closed,
}

/// Result of a finished submit
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Saved; the form is cleared and closed
    Saved { record_id: Option<String> },
    /// Edit without a target record, nothing sent
    Skipped,
    /// Response arrived for a closed form or an old ticket and was ignored
    Stale,
}

/// Whether a finished request changed the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    Stale,
}

/// Where a submit goes
#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmitTarget {
    Create,
    Update(String),
}

/// Category fetch ready to run
pub struct PendingLoad {
    ticket: u64,
    backend: Arc<dyn FinanceBackend>,
    session: Session,
}

impl PendingLoad {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub async fn fetch(&self) -> CoreResult<Vec<Category>> {
        self.backend.all_categories(&self.session).await
    }
}

/// Submit ready to run
pub struct PendingSubmit {
    ticket: u64,
    backend: Arc<dyn FinanceBackend>,
    session: Session,
    target: SubmitTarget,
    document: TransactionDocument,
}

impl PendingSubmit {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub async fn send(&self) -> CoreResult<serde_json::Value> {
        match &self.target {
            SubmitTarget::Create => {
                self.backend
                    .add_transaction(&self.session, &self.document)
                    .await
            }
            SubmitTarget::Update(id) => {
                self.backend
                    .edit_transaction(&self.session, id, &self.document)
                    .await
            }
        }
    }
}

type Listener = Box<dyn Fn(&FormEvent) + Send + Sync>;

/// State of one add or edit form instance
pub struct TransactionFormController {
    mode: FormMode,
    backend: Arc<dyn FinanceBackend>,
    session: Session,
    default_currency: String,
    record: Option<Transaction>,
    fields: TransactionFields,
    categories: Vec<Category>,
    selected_category: String,
    sub_category_options: Vec<String>,
    selected_sub_category: String,
    categories_requested: bool,
    categories_loaded: bool,
    load_ticket: Option<u64>,
    submit_ticket: Option<u64>,
    next_ticket: u64,
    open: bool,
    listeners: Vec<Listener>,
}

impl TransactionFormController {
    pub fn new(mode: FormMode, backend: Arc<dyn FinanceBackend>, session: Session) -> Self {
        Self {
            mode,
            backend,
            session,
            default_currency: DEFAULT_CURRENCY.to_string(),
            record: None,
            fields: TransactionFields::empty(DEFAULT_CURRENCY),
            categories: Vec::new(),
            selected_category: String::new(),
            sub_category_options: Vec::new(),
            selected_sub_category: String::new(),
            categories_requested: false,
            categories_loaded: false,
            load_ticket: None,
            submit_ticket: None,
            next_ticket: 1,
            open: true,
            listeners: Vec::new(),
        }
    }

    /// Currency used for records that carry none
    pub fn with_default_currency(mut self, currency: &str) -> Self {
        self.default_currency = currency.to_string();
        if self.record.is_none() {
            self.fields.currency = currency.to_string();
        }
        self
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True while a submit is outstanding; hosts disable the submit control
    pub fn is_submitting(&self) -> bool {
        self.submit_ticket.is_some()
    }

    pub fn record(&self) -> Option<&Transaction> {
        self.record.as_ref()
    }

    pub fn fields(&self) -> &TransactionFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut TransactionFields {
        &mut self.fields
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn sub_category_options(&self) -> &[String] {
        &self.sub_category_options
    }

    pub fn selected_sub_category(&self) -> &str {
        &self.selected_sub_category
    }

    /// Replace the credential used for later requests
    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    /// Register a listener for saved/closed notifications
    pub fn on_event<F>(&mut self, listener: F)
    where
        F: Fn(&FormEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ==================== Record population ====================

    /// Point an edit form at a record; `None` makes the form inert.
    ///
    /// Only a change of record repopulates the fields, so user edits survive
    /// a repeated call with the same record. The stored category pair is
    /// reconciled once categories have loaded, whichever comes first.
    pub fn set_record(&mut self, record: Option<Transaction>) {
        if self.mode == FormMode::Add {
            log::debug!("Ignoring record for add form");
            return;
        }
        if self.record == record {
            return;
        }

        match &record {
            Some(tx) => {
                self.fields = TransactionFields::from_transaction(tx, &self.default_currency);
                self.selected_category = tx.category.clone().unwrap_or_default();
                self.selected_sub_category = tx.sub_category.clone().unwrap_or_default();
            }
            None => {
                self.fields = TransactionFields::empty(&self.default_currency);
                self.selected_category.clear();
                self.selected_sub_category.clear();
            }
        }
        self.record = record;
        self.rederive();
    }

    // ==================== Category selection ====================

    pub fn select_category(&mut self, category: &str) {
        self.selected_category = category.to_string();
        self.rederive();
    }

    /// Choose a sub-category; values outside the current options clear it
    pub fn select_sub_category(&mut self, sub_category: &str) {
        if self.sub_category_options.iter().any(|s| s == sub_category) {
            self.selected_sub_category = sub_category.to_string();
        } else {
            self.selected_sub_category.clear();
        }
    }

    fn rederive(&mut self) {
        // Nothing to reconcile against until the fetch finishes; a populated
        // pair is held as stored
        if !self.categories_loaded {
            self.sub_category_options.clear();
            return;
        }
        let (options, reconciled) = derive_sub_category_options(
            &self.categories,
            &self.selected_category,
            &self.selected_sub_category,
        );
        self.sub_category_options = options;
        self.selected_sub_category = reconciled;
    }

    // ==================== Category loading ====================

    /// Start the once-per-mount category fetch. `None` if it was already
    /// started or the form is closed.
    pub fn begin_load_categories(&mut self) -> Option<PendingLoad> {
        if !self.open || self.categories_requested {
            return None;
        }
        self.categories_requested = true;
        let ticket = self.issue_ticket();
        self.load_ticket = Some(ticket);
        Some(PendingLoad {
            ticket,
            backend: Arc::clone(&self.backend),
            session: self.session.clone(),
        })
    }

    /// Apply the category fetch result. A failure leaves the list empty.
    pub fn finish_load_categories(
        &mut self,
        ticket: u64,
        result: CoreResult<Vec<Category>>,
    ) -> Applied {
        if !self.open || self.load_ticket != Some(ticket) {
            log::debug!("Dropping stale category response (ticket {})", ticket);
            return Applied::Stale;
        }
        self.load_ticket = None;
        self.categories_loaded = true;

        match result {
            Ok(categories) => {
                log::debug!("Loaded {} categories", categories.len());
                self.categories = categories;
            }
            Err(e) => {
                log::warn!("Could not load categories, continuing without them: {}", e);
                self.categories.clear();
            }
        }
        self.rederive();
        Applied::Applied
    }

    /// Fetch categories and apply them in one step
    pub async fn load_categories(&mut self) -> Applied {
        match self.begin_load_categories() {
            Some(pending) => {
                let result = pending.fetch().await;
                self.finish_load_categories(pending.ticket, result)
            }
            None => Applied::Stale,
        }
    }

    // ==================== Submit ====================

    /// Validate and build the pending submit.
    ///
    /// Returns `Ok(None)` for an edit form with no identified record.
    pub fn begin_submit(&mut self) -> CoreResult<Option<PendingSubmit>> {
        if !self.open {
            return Err(CoreError::FormClosed);
        }
        if self.submit_ticket.is_some() {
            return Err(CoreError::SubmitInFlight);
        }

        let target = match self.mode {
            FormMode::Add => SubmitTarget::Create,
            FormMode::Edit => {
                let id = self.fields.id.trim();
                if id.is_empty() {
                    log::warn!("Edit submitted with no transaction selected, ignoring");
                    return Ok(None);
                }
                SubmitTarget::Update(id.to_string())
            }
        };

        self.fields.validate()?;

        let document = self
            .fields
            .to_document(&self.selected_category, &self.selected_sub_category);
        let ticket = self.issue_ticket();
        self.submit_ticket = Some(ticket);

        Ok(Some(PendingSubmit {
            ticket,
            backend: Arc::clone(&self.backend),
            session: self.session.clone(),
            target,
            document,
        }))
    }

    /// Apply a submit result. On failure the fields stay as they were and
    /// the form stays open; on success listeners are notified and the form
    /// is cleared and closed.
    pub fn finish_submit(
        &mut self,
        ticket: u64,
        result: CoreResult<serde_json::Value>,
    ) -> CoreResult<SubmitOutcome> {
        if !self.open || self.submit_ticket != Some(ticket) {
            log::debug!("Dropping stale submit response (ticket {})", ticket);
            return Ok(SubmitOutcome::Stale);
        }
        self.submit_ticket = None;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::log!(e.severity().log_level(), "Failed to save {} form: {}", self.mode, e);
                return Err(e);
            }
        };

        let record_id = match self.mode {
            FormMode::Edit => Some(self.fields.id.clone()),
            FormMode::Add => response
                .get("id")
                .or_else(|| response.get("_id"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        };
        log::info!("Saved transaction ({} form, id {:?})", self.mode, record_id);

        self.emit(&FormEvent::Saved {
            mode: self.mode,
            record_id: record_id.clone(),
            response,
        });
        self.clear();
        self.open = false;

        Ok(SubmitOutcome::Saved { record_id })
    }

    /// Submit and apply the result in one step
    pub async fn submit(&mut self) -> CoreResult<SubmitOutcome> {
        match self.begin_submit()? {
            Some(pending) => {
                let result = pending.send().await;
                self.finish_submit(pending.ticket, result)
            }
            None => Ok(SubmitOutcome::Skipped),
        }
    }

    // ==================== Lifecycle ====================

    /// Close without saving; late responses are ignored afterwards
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.load_ticket = None;
        self.submit_ticket = None;
        self.emit(&FormEvent::Closed);
    }

    fn clear(&mut self) {
        self.record = None;
        self.fields = TransactionFields::empty(&self.default_currency);
        self.selected_category.clear();
        self.selected_sub_category.clear();
        self.sub_category_options.clear();
    }

    fn issue_ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn emit(&self, event: &FormEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

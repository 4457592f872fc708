//! Open form instances, keyed by form id
//!
//! Each add/edit modal owns one `TransactionFormController`. The lock is
//! only held for state changes; backend I/O runs between the controller's
//! `begin_*` and `finish_*` calls with the lock released.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use expenseweb_core::{FormEvent, TransactionFormController};
use expenseweb_utils::generate_id;
use tokio::sync::RwLock;

/// Modals abandoned without closing are evicted oldest first past this
const MAX_OPEN_FORMS: usize = 256;

#[derive(Default)]
struct Forms {
    by_id: HashMap<String, TransactionFormController>,
    order: VecDeque<String>,
}

/// Shared registry of open form instances
#[derive(Clone, Default)]
pub struct FormRegistry {
    inner: Arc<RwLock<Forms>>,
    saved: Arc<AtomicU64>,
}

impl FormRegistry {
    /// Register a form and return its new id
    pub async fn open(&self, mut form: TransactionFormController) -> String {
        let id = generate_id();

        let saved = Arc::clone(&self.saved);
        let form_id = id.clone();
        form.on_event(move |event| match event {
            FormEvent::Saved { mode, record_id, .. } => {
                saved.fetch_add(1, Ordering::Relaxed);
                log::debug!("Form {} saved ({} form, id {:?})", form_id, mode, record_id);
            }
            FormEvent::Closed => log::debug!("Form {} closed", form_id),
        });

        let mut forms = self.inner.write().await;

        while forms.by_id.len() >= MAX_OPEN_FORMS {
            let Some(oldest) = forms.order.pop_front() else { break };
            if let Some(mut evicted) = forms.by_id.remove(&oldest) {
                log::debug!("Evicting abandoned form {}", oldest);
                evicted.close();
            }
        }

        forms.order.push_back(id.clone());
        forms.by_id.insert(id.clone(), form);
        id
    }

    /// Run `f` against an open form; `None` if the id is unknown
    pub async fn with_form<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut TransactionFormController) -> R,
    ) -> Option<R> {
        let mut forms = self.inner.write().await;
        forms.by_id.get_mut(id).map(f)
    }

    /// Take a form out of the registry without closing it
    pub async fn remove(&self, id: &str) -> Option<TransactionFormController> {
        let mut forms = self.inner.write().await;
        forms.order.retain(|o| o != id);
        forms.by_id.remove(id)
    }

    /// Close and drop a form. Returns false if it was not open.
    pub async fn close(&self, id: &str) -> bool {
        match self.remove(id).await {
            Some(mut form) => {
                form.close();
                true
            }
            None => false,
        }
    }

    /// Forms saved since startup
    pub fn saved_count(&self) -> u64 {
        self.saved.load(Ordering::Relaxed)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.by_id.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expenseweb_core::memory::MemoryBackend;
    use expenseweb_core::{FinanceBackend, FormMode, Session, SubmitOutcome};

    fn form() -> TransactionFormController {
        let backend: Arc<dyn FinanceBackend> = Arc::new(MemoryBackend::new(Vec::new()));
        TransactionFormController::new(FormMode::Add, backend, Session::anonymous())
    }

    #[tokio::test]
    async fn test_open_and_close() {
        let registry = FormRegistry::default();
        let id = registry.open(form()).await;

        assert!(registry.contains(&id).await);
        assert_eq!(registry.with_form(&id, |f| f.mode()).await, Some(FormMode::Add));

        assert!(registry.close(&id).await);
        assert!(!registry.close(&id).await);
        assert_eq!(registry.with_form(&id, |f| f.mode()).await, None);
    }

    #[tokio::test]
    async fn test_saves_counted_through_form_events() {
        let registry = FormRegistry::default();
        let saved = registry.open(form()).await;
        let abandoned = registry.open(form()).await;

        let mut form = registry.remove(&saved).await.unwrap();
        assert!(matches!(form.submit().await, Ok(SubmitOutcome::Saved { .. })));
        assert!(registry.close(&abandoned).await);

        assert_eq!(registry.saved_count(), 1);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_oldest_form_evicted_at_capacity() {
        let registry = FormRegistry::default();
        let first = registry.open(form()).await;
        for _ in 1..MAX_OPEN_FORMS {
            registry.open(form()).await;
        }
        assert_eq!(registry.len().await, MAX_OPEN_FORMS);

        let newest = registry.open(form()).await;
        assert_eq!(registry.len().await, MAX_OPEN_FORMS);
        assert!(!registry.contains(&first).await);
        assert!(registry.contains(&newest).await);
    }
}

use metrics_exporter_prometheus::PrometheusHandle;
use sailors_open::config::FlowConfig;
use sailors_open::registration::{
    CatalogError, ConfirmationNotice, ConfirmationPublisher, NoticeError, QuestionCatalog,
    RegistrationId, RegistrationRecord, RegistrationRepository, RepositoryError,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<QuestionCatalog>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRegistrationRepository {
    records: Arc<Mutex<HashMap<RegistrationId, RegistrationRecord>>>,
}

impl RegistrationRepository for InMemoryRegistrationRepository {
    fn insert(&self, record: RegistrationRecord) -> Result<RegistrationRecord, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))?;
        if guard.contains_key(&record.registration_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.registration_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RegistrationId) -> Result<Option<RegistrationRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    /// Oldest registrations first.
    fn list(&self, limit: usize) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))?;
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|left, right| {
            left.submitted_at
                .cmp(&right.submitted_at)
                .then_with(|| left.registration_id.cmp(&right.registration_id))
        });
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryConfirmationPublisher {
    events: Arc<Mutex<Vec<ConfirmationNotice>>>,
}

impl ConfirmationPublisher for InMemoryConfirmationPublisher {
    fn publish(&self, notice: ConfirmationNotice) -> Result<(), NoticeError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NoticeError::Transport("notice outbox lock poisoned".to_string()))?;
        debug!(
            registration_id = %notice.registration_id.0,
            template = %notice.template,
            "confirmation queued"
        );
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryConfirmationPublisher {
    pub(crate) fn events(&self) -> Vec<ConfirmationNotice> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Configured catalog file when one is named, otherwise the built-in questions.
pub(crate) fn load_catalog(config: &FlowConfig) -> Result<QuestionCatalog, CatalogError> {
    match &config.question_catalog {
        Some(path) => {
            let catalog = QuestionCatalog::from_path(path)?;
            info!(path = %path.display(), questions = catalog.len(), "loaded question catalog");
            Ok(catalog)
        }
        None => Ok(QuestionCatalog::standard()),
    }
}

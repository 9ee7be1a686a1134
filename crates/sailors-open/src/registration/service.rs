use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::assessment::{assess, validate_answers, AnswerViolation};
use super::domain::{RegistrationId, RegistrationReceipt, RegistrationSubmission};
use super::draft::{DraftViolation, RegistrationDraft};
use super::flow::{RegistrationBackend, SubmissionError};
use super::questions::QuestionCatalog;
use super::quiz::QuizAnswerSet;
use super::repository::{
    ConfirmationNotice, ConfirmationPublisher, RegistrationRecord, RegistrationRepository,
    RepositoryError,
};

/// Registration backend composing validation, assessment, storage and confirmations.
pub struct RegistrationService<R, N> {
    catalog: Arc<QuestionCatalog>,
    repository: Arc<R>,
    notices: Arc<N>,
}

static REGISTRATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_registration_id() -> RegistrationId {
    let id = REGISTRATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RegistrationId(format!("reg-{id:06}"))
}

impl<R, N> RegistrationService<R, N>
where
    R: RegistrationRepository + 'static,
    N: ConfirmationPublisher + 'static,
{
    pub fn new(catalog: Arc<QuestionCatalog>, repository: Arc<R>, notices: Arc<N>) -> Self {
        Self {
            catalog,
            repository,
            notices,
        }
    }

    pub fn catalog(&self) -> &Arc<QuestionCatalog> {
        &self.catalog
    }

    /// Validate, assess and store a registration, then send its confirmation.
    ///
    /// A failed confirmation is logged but does not undo the stored registration.
    pub fn submit(
        &self,
        submission: RegistrationSubmission,
    ) -> Result<RegistrationRecord, RegistrationServiceError> {
        let RegistrationSubmission { mut draft, answers } = submission;
        draft.validate()?;
        draft.discard_unused_partner();
        validate_answers(&self.catalog, &answers)?;

        let assessment = assess(&self.catalog, &answers);
        let record = RegistrationRecord {
            registration_id: next_registration_id(),
            draft,
            answers,
            assessment,
            submitted_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            registration_id = %stored.registration_id.0,
            market = %stored.draft.market,
            "registration stored"
        );

        if let Err(err) = self.notices.publish(confirmation_for(&stored)) {
            warn!(
                registration_id = %stored.registration_id.0,
                error = %err,
                "confirmation notice not delivered"
            );
        }

        Ok(stored)
    }

    pub fn get(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<RegistrationRecord, RegistrationServiceError> {
        let record = self
            .repository
            .fetch(registration_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn roster(&self, limit: usize) -> Result<Vec<RegistrationRecord>, RegistrationServiceError> {
        Ok(self.repository.list(limit)?)
    }
}

impl<R, N> RegistrationBackend for RegistrationService<R, N>
where
    R: RegistrationRepository + 'static,
    N: ConfirmationPublisher + 'static,
{
    fn submit_registration(
        &self,
        draft: &RegistrationDraft,
        answers: &QuizAnswerSet,
    ) -> Result<RegistrationReceipt, SubmissionError> {
        let submission = RegistrationSubmission {
            draft: draft.clone(),
            answers: answers.clone(),
        };

        match self.submit(submission) {
            Ok(record) => Ok(record.receipt()),
            Err(err @ (RegistrationServiceError::Draft(_) | RegistrationServiceError::Answers(_))) => {
                Err(SubmissionError::Rejected(err.to_string()))
            }
            Err(err @ RegistrationServiceError::Repository(RepositoryError::Conflict)) => {
                Err(SubmissionError::Rejected(err.to_string()))
            }
            Err(RegistrationServiceError::Repository(err)) => {
                Err(SubmissionError::Unavailable(err.to_string()))
            }
        }
    }
}

fn confirmation_for(record: &RegistrationRecord) -> ConfirmationNotice {
    let mut details = BTreeMap::new();
    details.insert("full_name".to_string(), record.draft.full_name.clone());
    details.insert("email".to_string(), record.draft.email.clone());
    details.insert(
        "categories".to_string(),
        record.draft.category_labels().join(", "),
    );
    details.insert(
        "location".to_string(),
        format!("{} / {}", record.draft.market, record.draft.city),
    );
    if record.draft.requires_partner() {
        details.insert(
            "partner_email".to_string(),
            record.draft.partner_email.clone(),
        );
    }
    if let Some(level) = record.assessment.suggested_level {
        details.insert("suggested_level".to_string(), level.label().to_string());
    }

    ConfirmationNotice {
        template: "registration_confirmed".to_string(),
        registration_id: record.registration_id.clone(),
        details,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationServiceError {
    #[error(transparent)]
    Draft(#[from] DraftViolation),
    #[error(transparent)]
    Answers(#[from] AnswerViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

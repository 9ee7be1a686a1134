use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::registration::catalog::{Category, SkillLevel};
use crate::registration::domain::{RegistrationId, RegistrationReceipt, RegistrationSubmission};
use crate::registration::draft::RegistrationDraft;
use crate::registration::flow::{RegistrationBackend, RegistrationFlow, SubmissionError};
use crate::registration::questions::{Question, QuestionCatalog, QuestionOption};
use crate::registration::quiz::QuizAnswerSet;
use crate::registration::repository::{
    ConfirmationNotice, ConfirmationPublisher, NoticeError, RegistrationRecord,
    RegistrationRepository, RepositoryError,
};
use crate::registration::{registration_router, RegistrationService};

pub(super) fn standard_catalog() -> Arc<QuestionCatalog> {
    Arc::new(QuestionCatalog::standard())
}

/// Five single-select questions with three options each.
pub(super) fn single_select_catalog() -> Arc<QuestionCatalog> {
    let questions = (1..=5)
        .map(|id| Question {
            id,
            prompt: format!("Question {id}"),
            multi_select: false,
            options: (1..=3)
                .map(|option| QuestionOption {
                    id: format!("s{id}-o{option}"),
                    tag: None,
                    label: format!("Option {option}"),
                })
                .collect(),
        })
        .collect();
    Arc::new(QuestionCatalog::new(questions).expect("valid catalog"))
}

pub(super) fn singles_draft() -> RegistrationDraft {
    let mut draft = RegistrationDraft {
        full_name: "Jane Wang".to_string(),
        email: "Jane.W@sea.com".to_string(),
        self_reported_level: Some(SkillLevel::Intermediate),
        ..RegistrationDraft::default()
    };
    draft.set_market("Singapore");
    draft.toggle_category(Category::WomensSingles);
    draft
}

pub(super) fn doubles_draft() -> RegistrationDraft {
    let mut draft = singles_draft();
    draft.toggle_category(Category::MixedDoubles);
    draft.partner_name = "Wei Chen".to_string();
    draft.partner_email = "wei.chen@sea.com".to_string();
    draft
}

/// Answers for the standard catalog: mid-range single-select choices plus two goals.
pub(super) fn standard_answers() -> QuizAnswerSet {
    let mut quiz = crate::registration::MatchmakerQuiz::new(standard_catalog());
    for option in ["q1-o3", "q2-o2", "q3-o2", "q4-o2", "q5-o2", "q5-o4"] {
        quiz.select_option(option).expect("known option");
    }
    quiz.answers().clone()
}

pub(super) fn submission() -> RegistrationSubmission {
    RegistrationSubmission {
        draft: doubles_draft(),
        answers: standard_answers(),
    }
}

/// Flow already past the details step, using the given backend-free catalog.
pub(super) fn flow_in_matchmaker(catalog: Arc<QuestionCatalog>) -> RegistrationFlow {
    let mut flow = RegistrationFlow::new(catalog);
    *flow.draft_mut().expect("info step") = singles_draft();
    flow.begin_matchmaker().expect("valid draft");
    flow
}

pub(super) fn build_service() -> (
    RegistrationService<MemoryRepository, MemoryNotices>,
    Arc<MemoryRepository>,
    Arc<MemoryNotices>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notices = Arc::new(MemoryNotices::default());
    let service = RegistrationService::new(standard_catalog(), repository.clone(), notices.clone());
    (service, repository, notices)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<RegistrationId, RegistrationRecord>>>,
}

impl RegistrationRepository for MemoryRepository {
    fn insert(&self, record: RegistrationRecord) -> Result<RegistrationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.registration_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.registration_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RegistrationId) -> Result<Option<RegistrationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|left, right| left.registration_id.cmp(&right.registration_id));
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<ConfirmationNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<ConfirmationNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl ConfirmationPublisher for MemoryNotices {
    fn publish(&self, notice: ConfirmationNotice) -> Result<(), NoticeError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct OfflineNotices;

impl ConfirmationPublisher for OfflineNotices {
    fn publish(&self, _notice: ConfirmationNotice) -> Result<(), NoticeError> {
        Err(NoticeError::Transport("smtp relay down".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl RegistrationRepository for UnavailableRepository {
    fn insert(&self, _record: RegistrationRecord) -> Result<RegistrationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &RegistrationId) -> Result<Option<RegistrationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _limit: usize) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct ConflictRepository;

impl RegistrationRepository for ConflictRepository {
    fn insert(&self, _record: RegistrationRecord) -> Result<RegistrationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &RegistrationId) -> Result<Option<RegistrationRecord>, RepositoryError> {
        Ok(None)
    }

    fn list(&self, _limit: usize) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

/// Backend that fails the first `failures` submissions, then accepts.
pub(super) struct FlakyBackend {
    failures: usize,
    attempts: AtomicUsize,
    pub(super) submitted: Mutex<Vec<(RegistrationDraft, QuizAnswerSet)>>,
}

impl FlakyBackend {
    pub(super) fn new(failures: usize) -> Self {
        Self {
            failures,
            attempts: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn accepting() -> Self {
        Self::new(0)
    }

    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl RegistrationBackend for FlakyBackend {
    fn submit_registration(
        &self,
        draft: &RegistrationDraft,
        answers: &QuizAnswerSet,
    ) -> Result<RegistrationReceipt, SubmissionError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(SubmissionError::Unavailable("gateway timeout".to_string()));
        }

        self.submitted
            .lock()
            .expect("backend mutex poisoned")
            .push((draft.clone(), answers.clone()));
        Ok(RegistrationReceipt {
            registration_id: RegistrationId(format!("test-{attempt}")),
            categories: draft.categories.iter().copied().collect(),
            suggested_level: Some(SkillLevel::Intermediate),
        })
    }
}

pub(super) struct RejectingBackend;

impl RegistrationBackend for RejectingBackend {
    fn submit_registration(
        &self,
        _draft: &RegistrationDraft,
        _answers: &QuizAnswerSet,
    ) -> Result<RegistrationReceipt, SubmissionError> {
        Err(SubmissionError::Rejected("registration window closed".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: RegistrationService<MemoryRepository, MemoryNotices>,
) -> axum::Router {
    registration_router(Arc::new(service))
}

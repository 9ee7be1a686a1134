//! Tournament registration: the details form, the matchmaker quiz and the backend
//! that stores finished registrations.

pub mod assessment;
pub mod catalog;
pub mod domain;
pub mod draft;
pub mod flow;
pub mod questions;
pub mod quiz;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use assessment::{assess, validate_answers, AnswerViolation, SkillAssessment};
pub use catalog::{Category, CategoryFamily, Market, SkillLevel, MARKETS};
pub use domain::{RegistrationId, RegistrationReceipt, RegistrationSubmission};
pub use draft::{DraftViolation, RegistrationDraft};
pub use flow::{
    FlowError, FlowNotice, FlowStep, NoticeKind, RegistrationBackend, RegistrationFlow,
    SubmissionError,
};
pub use questions::{CatalogError, Question, QuestionCatalog, QuestionOption};
pub use quiz::{MatchmakerQuiz, QuizAnswer, QuizAnswerSet, QuizError, QuizSignal};
pub use repository::{
    ConfirmationNotice, ConfirmationPublisher, NoticeError, RegistrationRecord,
    RegistrationRepository, RegistrationView, RepositoryError,
};
pub use roster::{roster_csv, write_roster, RosterError};
pub use router::registration_router;
pub use service::{RegistrationService, RegistrationServiceError};

use serde::{Deserialize, Serialize};

use super::catalog::{Category, SkillLevel};
use super::draft::RegistrationDraft;
use super::quiz::QuizAnswerSet;

/// Identifier wrapper for stored registrations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub String);

/// Everything the page collected, as handed to the registration backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSubmission {
    pub draft: RegistrationDraft,
    #[serde(default)]
    pub answers: QuizAnswerSet,
}

/// Acknowledgement returned by the backend once a registration is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub registration_id: RegistrationId,
    pub categories: Vec<Category>,
    pub suggested_level: Option<SkillLevel>,
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assessment::SkillAssessment;
use super::catalog::{Category, SkillLevel};
use super::domain::{RegistrationId, RegistrationReceipt};
use super::draft::RegistrationDraft;
use super::quiz::QuizAnswerSet;

/// Stored registration with the matchmaker outcome attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub registration_id: RegistrationId,
    pub draft: RegistrationDraft,
    pub answers: QuizAnswerSet,
    pub assessment: SkillAssessment,
    pub submitted_at: DateTime<Utc>,
}

impl RegistrationRecord {
    pub fn receipt(&self) -> RegistrationReceipt {
        RegistrationReceipt {
            registration_id: self.registration_id.clone(),
            categories: self.draft.categories.iter().copied().collect(),
            suggested_level: self.assessment.suggested_level,
        }
    }

    pub fn view(&self) -> RegistrationView {
        let partner_name = if self.draft.requires_partner() {
            Some(self.draft.partner_name.clone())
        } else {
            None
        };

        RegistrationView {
            registration_id: self.registration_id.clone(),
            full_name: self.draft.full_name.clone(),
            market: self.draft.market.clone(),
            city: self.draft.city.clone(),
            categories: self.draft.categories.iter().copied().collect(),
            partner_name,
            self_reported_level: self.draft.self_reported_level,
            suggested_level: self.assessment.suggested_level,
            submitted_at: self.submitted_at,
        }
    }
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait RegistrationRepository: Send + Sync {
    fn insert(&self, record: RegistrationRecord) -> Result<RegistrationRecord, RepositoryError>;
    fn fetch(&self, id: &RegistrationId) -> Result<Option<RegistrationRecord>, RepositoryError>;
    fn list(&self, limit: usize) -> Result<Vec<RegistrationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound confirmation hook (e-mail, chat bot, organiser dashboard).
pub trait ConfirmationPublisher: Send + Sync {
    fn publish(&self, notice: ConfirmationNotice) -> Result<(), NoticeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationNotice {
    pub template: String,
    pub registration_id: RegistrationId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}

/// Public projection of a registration; contact emails stay private.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationView {
    pub registration_id: RegistrationId,
    pub full_name: String,
    pub market: String,
    pub city: String,
    pub categories: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_reported_level: Option<SkillLevel>,
    pub suggested_level: Option<SkillLevel>,
    pub submitted_at: DateTime<Utc>,
}

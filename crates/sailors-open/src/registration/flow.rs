//! Registration flow controller: `info -> matchmaker -> success`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::RegistrationReceipt;
use super::draft::{DraftViolation, RegistrationDraft};
use super::questions::QuestionCatalog;
use super::quiz::{MatchmakerQuiz, QuizAnswerSet, QuizError, QuizSignal};

/// Coarse step of the registration page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    #[default]
    Info,
    Matchmaker,
    Success,
}

impl FlowStep {
    pub const fn label(self) -> &'static str {
        match self {
            FlowStep::Info => "info",
            FlowStep::Matchmaker => "matchmaker",
            FlowStep::Success => "success",
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Integration point that stores a finished registration.
pub trait RegistrationBackend: Send + Sync {
    fn submit_registration(
        &self,
        draft: &RegistrationDraft,
        answers: &QuizAnswerSet,
    ) -> Result<RegistrationReceipt, SubmissionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("registration service unavailable: {0}")]
    Unavailable(String),
    #[error("registration rejected: {0}")]
    Rejected(String),
}

impl SubmissionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmissionError::Unavailable(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("{action} is not available on the {step} step")]
    WrongStep {
        action: &'static str,
        step: FlowStep,
    },
    #[error(transparent)]
    Validation(#[from] DraftViolation),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Validation,
    Retryable,
    Rejected,
}

/// Non-fatal message shown above the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNotice {
    pub kind: NoticeKind,
    pub message: String,
}

pub struct RegistrationFlow {
    step: FlowStep,
    draft: RegistrationDraft,
    quiz: MatchmakerQuiz,
    notice: Option<FlowNotice>,
    receipt: Option<RegistrationReceipt>,
}

impl RegistrationFlow {
    pub fn new(catalog: Arc<QuestionCatalog>) -> Self {
        Self {
            step: FlowStep::Info,
            draft: RegistrationDraft::default(),
            quiz: MatchmakerQuiz::new(catalog),
            notice: None,
            receipt: None,
        }
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn quiz(&self) -> &MatchmakerQuiz {
        &self.quiz
    }

    pub fn answers(&self) -> &QuizAnswerSet {
        self.quiz.answers()
    }

    pub fn notice(&self) -> Option<&FlowNotice> {
        self.notice.as_ref()
    }

    pub fn receipt(&self) -> Option<&RegistrationReceipt> {
        self.receipt.as_ref()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.quiz.progress_fraction()
    }

    /// Editable draft; only reachable while collecting details.
    pub fn draft_mut(&mut self) -> Result<&mut RegistrationDraft, FlowError> {
        self.expect_step(FlowStep::Info, "editing registration details")?;
        Ok(&mut self.draft)
    }

    pub fn begin_matchmaker(&mut self) -> Result<FlowStep, FlowError> {
        self.expect_step(FlowStep::Info, "starting the matchmaker")?;

        if let Err(violation) = self.draft.validate() {
            debug!(%violation, "registration details incomplete");
            self.notice = Some(FlowNotice {
                kind: NoticeKind::Validation,
                message: violation.to_string(),
            });
            return Err(FlowError::Validation(violation));
        }

        self.notice = None;
        self.step = FlowStep::Matchmaker;
        debug!(
            question = self.quiz.current_index(),
            "entered matchmaker step"
        );
        Ok(self.step)
    }

    pub fn select_option<B>(&mut self, option_id: &str, backend: &B) -> Result<FlowStep, FlowError>
    where
        B: RegistrationBackend + ?Sized,
    {
        self.expect_step(FlowStep::Matchmaker, "answering a question")?;
        let signal = self.quiz.select_option(option_id)?;
        self.apply(signal, backend)
    }

    /// Explicit "Next" / "Finish". On the last question this submits (or retries).
    pub fn advance<B>(&mut self, backend: &B) -> Result<FlowStep, FlowError>
    where
        B: RegistrationBackend + ?Sized,
    {
        self.expect_step(FlowStep::Matchmaker, "moving to the next question")?;
        let signal = self.quiz.advance();
        self.apply(signal, backend)
    }

    pub fn retreat(&mut self) -> Result<FlowStep, FlowError> {
        self.expect_step(FlowStep::Matchmaker, "going back")?;
        if self.quiz.retreat() == QuizSignal::ExitedToPrevious {
            self.step = FlowStep::Info;
            debug!("left matchmaker for registration details");
        }
        Ok(self.step)
    }

    /// Leave the confirmation and begin a fresh registration.
    pub fn start_over(&mut self) -> Result<FlowStep, FlowError> {
        self.expect_step(FlowStep::Success, "starting over")?;
        self.draft.clear();
        self.quiz.reset();
        self.notice = None;
        self.receipt = None;
        self.step = FlowStep::Info;
        Ok(self.step)
    }

    /// Confirmation copy echoing the registered categories.
    pub fn confirmation_message(&self) -> Option<String> {
        if self.step != FlowStep::Success {
            return None;
        }

        let categories = self.draft.category_labels().join(", ");
        let pairing = match self.receipt.as_ref().and_then(|receipt| receipt.suggested_level) {
            Some(level) => format!(
                "Based on your answers we will pair you with {} opponents.",
                level.label().to_ascii_lowercase()
            ),
            None => {
                "We will pair you with the best opponents for your skill level.".to_string()
            }
        };

        Some(format!(
            "You're all set! You are registered for {categories}. {pairing}"
        ))
    }

    fn apply<B>(&mut self, signal: QuizSignal, backend: &B) -> Result<FlowStep, FlowError>
    where
        B: RegistrationBackend + ?Sized,
    {
        match signal {
            QuizSignal::Completed => self.submit(backend),
            QuizSignal::ExitedToPrevious => {
                self.step = FlowStep::Info;
                Ok(self.step)
            }
            QuizSignal::Stayed | QuizSignal::Advanced { .. } => Ok(self.step),
        }
    }

    fn submit<B>(&mut self, backend: &B) -> Result<FlowStep, FlowError>
    where
        B: RegistrationBackend + ?Sized,
    {
        match backend.submit_registration(&self.draft, self.quiz.answers()) {
            Ok(receipt) => {
                info!(
                    registration_id = %receipt.registration_id.0,
                    categories = receipt.categories.len(),
                    "registration completed"
                );
                self.receipt = Some(receipt);
                self.notice = None;
                self.step = FlowStep::Success;
                Ok(self.step)
            }
            Err(err) => {
                warn!(error = %err, retryable = err.is_retryable(), "registration submission failed");
                let kind = if err.is_retryable() {
                    NoticeKind::Retryable
                } else {
                    NoticeKind::Rejected
                };
                let message = if err.is_retryable() {
                    format!("{err}. Your answers are saved, please press Finish to try again.")
                } else {
                    err.to_string()
                };
                self.notice = Some(FlowNotice { kind, message });
                Err(FlowError::Submission(err))
            }
        }
    }

    fn expect_step(&self, expected: FlowStep, action: &'static str) -> Result<(), FlowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(FlowError::WrongStep {
                action,
                step: self.step,
            })
        }
    }
}

use serde::{Deserialize, Serialize};

use super::catalog::SkillLevel;
use super::questions::QuestionCatalog;
use super::quiz::{QuizAnswer, QuizAnswerSet};

const INTERMEDIATE_THRESHOLD: f32 = 1.0 / 3.0;
const ADVANCED_THRESHOLD: f32 = 2.0 / 3.0;

/// Contribution of one answered question to the suggested tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentComponent {
    pub question_id: u32,
    pub option_id: String,
    pub weight: f32,
    pub notes: String,
}

/// Skill tier inferred from the matchmaker answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub suggested_level: Option<SkillLevel>,
    pub mean_weight: Option<f32>,
    pub components: Vec<AssessmentComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerViolation {
    #[error("answer recorded for question index {0}, which does not exist")]
    UnknownQuestion(usize),
    #[error("option '{option_id}' is not offered for question {question_id}")]
    UnknownOption { question_id: u32, option_id: String },
    #[error("question {question_id} expects {expected} answer")]
    ShapeMismatch {
        question_id: u32,
        expected: &'static str,
    },
}

/// Check every recorded answer against the catalog it claims to answer.
pub fn validate_answers(
    catalog: &QuestionCatalog,
    answers: &QuizAnswerSet,
) -> Result<(), AnswerViolation> {
    for (index, answer) in answers.iter() {
        let question = catalog
            .get(index)
            .ok_or(AnswerViolation::UnknownQuestion(index))?;

        let selected: Vec<&str> = match (answer, question.multi_select) {
            (QuizAnswer::Single(option_id), false) => vec![option_id.as_str()],
            (QuizAnswer::Multiple(option_ids), true) => {
                option_ids.iter().map(String::as_str).collect()
            }
            (_, multi_select) => {
                return Err(AnswerViolation::ShapeMismatch {
                    question_id: question.id,
                    expected: if multi_select {
                        "a multi-select"
                    } else {
                        "a single-select"
                    },
                });
            }
        };

        if let Some(unknown) = selected
            .into_iter()
            .find(|option_id| question.option(option_id).is_none())
        {
            return Err(AnswerViolation::UnknownOption {
                question_id: question.id,
                option_id: unknown.to_string(),
            });
        }
    }

    Ok(())
}

/// Score single-select answers by how far down the option list they sit.
///
/// Options are authored from least to most experienced, so the first option weighs 0 and
/// the last weighs 1. Multi-select questions describe goals rather than ability and are
/// left out.
pub fn assess(catalog: &QuestionCatalog, answers: &QuizAnswerSet) -> SkillAssessment {
    let mut components = Vec::new();

    for (index, answer) in answers.iter() {
        let (Some(question), QuizAnswer::Single(option_id)) = (catalog.get(index), answer) else {
            continue;
        };
        if question.multi_select {
            continue;
        }
        let Some(position) = question.position_of(option_id) else {
            continue;
        };

        let span = question.options.len().saturating_sub(1);
        let weight = if span == 0 {
            0.0
        } else {
            position as f32 / span as f32
        };

        components.push(AssessmentComponent {
            question_id: question.id,
            option_id: option_id.clone(),
            weight,
            notes: format!(
                "option {} of {} on question {}",
                position + 1,
                question.options.len(),
                question.id
            ),
        });
    }

    let mean_weight = if components.is_empty() {
        None
    } else {
        let total: f32 = components.iter().map(|component| component.weight).sum();
        Some(total / components.len() as f32)
    };

    SkillAssessment {
        suggested_level: mean_weight.map(level_for),
        mean_weight,
        components,
    }
}

fn level_for(mean_weight: f32) -> SkillLevel {
    if mean_weight < INTERMEDIATE_THRESHOLD {
        SkillLevel::Beginner
    } else if mean_weight < ADVANCED_THRESHOLD {
        SkillLevel::Intermediate
    } else {
        SkillLevel::Advanced
    }
}

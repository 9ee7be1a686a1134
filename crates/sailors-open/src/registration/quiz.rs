//! Matchmaker quiz state: the current question and the answers collected so far.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::questions::{Question, QuestionCatalog};

/// Recorded answer for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizAnswer {
    Single(String),
    Multiple(BTreeSet<String>),
}

impl QuizAnswer {
    pub fn contains(&self, option_id: &str) -> bool {
        match self {
            QuizAnswer::Single(selected) => selected == option_id,
            QuizAnswer::Multiple(selected) => selected.contains(option_id),
        }
    }
}

/// Answers keyed by zero-based question index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizAnswerSet {
    answers: BTreeMap<usize, QuizAnswer>,
}

impl QuizAnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<&QuizAnswer> {
        self.answers.get(&index)
    }

    pub fn insert(&mut self, index: usize, answer: QuizAnswer) -> Option<QuizAnswer> {
        self.answers.insert(index, answer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &QuizAnswer)> {
        self.answers.iter().map(|(index, answer)| (*index, answer))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    fn toggle(&mut self, index: usize, option_id: &str) {
        let entry = self
            .answers
            .entry(index)
            .or_insert_with(|| QuizAnswer::Multiple(BTreeSet::new()));
        match entry {
            QuizAnswer::Multiple(selected) => {
                if !selected.remove(option_id) {
                    selected.insert(option_id.to_string());
                }
            }
            QuizAnswer::Single(_) => {
                *entry = QuizAnswer::Multiple(BTreeSet::from([option_id.to_string()]));
            }
        }
    }
}

/// What the quiz asks of its parent after an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizSignal {
    Stayed,
    Advanced { index: usize },
    Completed,
    ExitedToPrevious,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("option '{option_id}' is not offered for question {question_id}")]
    UnknownOption { question_id: u32, option_id: String },
}

#[derive(Debug, Clone)]
pub struct MatchmakerQuiz {
    catalog: Arc<QuestionCatalog>,
    current: usize,
    answers: QuizAnswerSet,
}

impl MatchmakerQuiz {
    pub fn new(catalog: Arc<QuestionCatalog>) -> Self {
        Self {
            catalog,
            current: 0,
            answers: QuizAnswerSet::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<QuestionCatalog> {
        &self.catalog
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.catalog.questions()[self.current]
    }

    pub fn answers(&self) -> &QuizAnswerSet {
        &self.answers
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.catalog.len()
    }

    /// Record a choice for the current question.
    ///
    /// Multi-select questions toggle and stay put; single-select questions record the
    /// choice and move on (or complete on the last question).
    pub fn select_option(&mut self, option_id: &str) -> Result<QuizSignal, QuizError> {
        let question = self.current_question();
        if question.option(option_id).is_none() {
            return Err(QuizError::UnknownOption {
                question_id: question.id,
                option_id: option_id.to_string(),
            });
        }

        if question.multi_select {
            self.answers.toggle(self.current, option_id);
            return Ok(QuizSignal::Stayed);
        }

        self.answers
            .insert(self.current, QuizAnswer::Single(option_id.to_string()));
        Ok(self.advance())
    }

    /// Move past the current question. A multi-select question left untouched is recorded
    /// as an empty selection.
    pub fn advance(&mut self) -> QuizSignal {
        if self.current_question().multi_select && self.answers.get(self.current).is_none() {
            self.answers
                .insert(self.current, QuizAnswer::Multiple(BTreeSet::new()));
        }

        if self.is_last_question() {
            QuizSignal::Completed
        } else {
            self.current += 1;
            QuizSignal::Advanced {
                index: self.current,
            }
        }
    }

    pub fn retreat(&mut self) -> QuizSignal {
        if self.current == 0 {
            QuizSignal::ExitedToPrevious
        } else {
            self.current -= 1;
            QuizSignal::Stayed
        }
    }

    pub fn progress_fraction(&self) -> f64 {
        (self.current + 1) as f64 / self.catalog.len() as f64
    }

    /// Whether the option should render as selected for the current question.
    pub fn is_selected(&self, option_id: &str) -> bool {
        self.answers
            .get(self.current)
            .map(|answer| answer.contains(option_id))
            .unwrap_or(false)
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.answers.clear();
    }
}

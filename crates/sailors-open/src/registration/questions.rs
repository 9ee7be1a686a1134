use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Single answer choice shown for a matchmaker question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    #[serde(default)]
    pub multi_select: bool,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.id == option_id)
    }

    pub fn position_of(&self, option_id: &str) -> Option<usize> {
        self.options.iter().position(|option| option.id == option_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("question catalog must contain at least one question")]
    Empty,
    #[error("question {question_id} has no options")]
    NoOptions { question_id: u32 },
    #[error("question {question_id} lists option '{option_id}' more than once")]
    DuplicateOption { question_id: u32, option_id: String },
    #[error("unable to read question catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("question catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered, immutable list of matchmaker questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        for question in &questions {
            if question.options.is_empty() {
                return Err(CatalogError::NoOptions {
                    question_id: question.id,
                });
            }

            let mut seen = HashSet::new();
            for option in &question.options {
                if !seen.insert(option.id.as_str()) {
                    return Err(CatalogError::DuplicateOption {
                        question_id: question.id,
                        option_id: option.id.clone(),
                    });
                }
            }
        }

        Ok(Self { questions })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let questions: Vec<Question> = serde_json::from_reader(reader)?;
        Self::new(questions)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn option(&self, index: usize, option_id: &str) -> Option<&QuestionOption> {
        self.get(index).and_then(|question| question.option(option_id))
    }

    /// The five questions asked on the registration page.
    pub fn standard() -> Self {
        let questions = vec![
            question(
                1,
                "1. What is your history with the racket?",
                false,
                vec![
                    tagged(
                        "q1-o1",
                        "Fresh Start",
                        "I have never played, or I haven't picked up a racket in years. I'm here for the laughs and the snacks!",
                    ),
                    tagged(
                        "q1-o2",
                        "Casual Cruiser",
                        "I play occasionally (maybe on holidays or once every few months). I can usually get the ball over the net.",
                    ),
                    tagged(
                        "q1-o3",
                        "Regular Hitter",
                        "I play once a week or more. I'm comfortable with rallies and know my way around the court.",
                    ),
                    tagged(
                        "q1-o4",
                        "Competitive Edge",
                        "I play in a league or have had professional coaching. I'm ready for a high-intensity match.",
                    ),
                ],
            ),
            question(
                2,
                "2. How do you feel about the rules of the game?",
                false,
                vec![
                    plain(
                        "q2-o1",
                        "\"Wait, how do we count points again?\" (I'll need a friendly guide!)",
                    ),
                    plain(
                        "q2-o2",
                        "I know the basics: Love, 15, 30, 40... and I know where to stand.",
                    ),
                    plain(
                        "q2-o3",
                        "I'm a pro. I know all about tie-breakers, deuce-advantage, and court lines.",
                    ),
                ],
            ),
            question(
                3,
                "3. Choose your \"Tournament Spirit\"",
                false,
                vec![
                    plain(
                        "q3-o1",
                        "The Socialite: I'm here to take photos, meet people from other departments, and enjoy the \"breather\" from work.",
                    ),
                    plain(
                        "q3-o2",
                        "The Sporty Soul: I want a bit of a workout and some friendly rallies, but the score doesn't really matter.",
                    ),
                    plain(
                        "q3-o3",
                        "The Challenger: I love the thrill of the game and I'm looking for a fair, competitive match-up.",
                    ),
                ],
            ),
            question(
                4,
                "4. If a ball is flying toward you at high speed, you are most likely to:",
                false,
                vec![
                    plain("q4-o1", "Laugh, duck, and hope for the best!"),
                    plain("q4-o2", "Attempt a return and see where it lands."),
                    plain("q4-o3", "Adjust my feet and aim for a cross-court winner."),
                ],
            ),
            question(
                5,
                "5. What would make this event a \"Win\" for you? (Select all that apply)",
                true,
                vec![
                    plain("q5-o1", "Not hitting my partner with the ball."),
                    plain(
                        "q5-o2",
                        "Making at least three new friends from other countries/offices.",
                    ),
                    plain("q5-o3", "Winning a few games or a set."),
                    plain("q5-o4", "Enjoying the post-match celebrations!"),
                ],
            ),
        ];

        Self { questions }
    }
}

fn question(id: u32, prompt: &str, multi_select: bool, options: Vec<QuestionOption>) -> Question {
    Question {
        id,
        prompt: prompt.to_string(),
        multi_select,
        options,
    }
}

fn tagged(id: &str, tag: &str, label: &str) -> QuestionOption {
    QuestionOption {
        id: id.to_string(),
        tag: Some(tag.to_string()),
        label: label.to_string(),
    }
}

fn plain(id: &str, label: &str) -> QuestionOption {
    QuestionOption {
        id: id.to_string(),
        tag: None,
        label: label.to_string(),
    }
}

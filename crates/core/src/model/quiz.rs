use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of multiple-choice options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizQuestionError {
    #[error("question text must not be blank")]
    EmptyQuestion,

    #[error("expected {OPTIONS_PER_QUESTION} options, got {len}")]
    OptionCount { len: usize },

    #[error("option {index} must not be blank")]
    EmptyOption { index: usize },

    #[error("option {option:?} appears more than once")]
    DuplicateOption { option: String },

    #[error("correct answer {answer:?} is not one of the options")]
    AnswerNotInOptions { answer: String },
}

/// Unvalidated question, as produced by the content generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionDraft {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestionDraft {
    /// Validate and normalize into an immutable `QuizQuestion`.
    ///
    /// Surrounding whitespace is trimmed from every field before the checks.
    ///
    /// # Errors
    ///
    /// Returns `QuizQuestionError` if the question is blank, the option count is not
    /// exactly four, an option is blank or duplicated, or the correct answer is not
    /// one of the options.
    pub fn validate(self) -> Result<QuizQuestion, QuizQuestionError> {
        let question = self.question.trim().to_owned();
        if question.is_empty() {
            return Err(QuizQuestionError::EmptyQuestion);
        }

        let len = self.options.len();
        let options: [String; OPTIONS_PER_QUESTION] = self
            .options
            .into_iter()
            .map(|opt| opt.trim().to_owned())
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| QuizQuestionError::OptionCount { len })?;

        for (index, option) in options.iter().enumerate() {
            if option.is_empty() {
                return Err(QuizQuestionError::EmptyOption { index });
            }
            if options[..index].contains(option) {
                return Err(QuizQuestionError::DuplicateOption {
                    option: option.clone(),
                });
            }
        }

        let correct_answer = self.correct_answer.trim().to_owned();
        if !options.contains(&correct_answer) {
            return Err(QuizQuestionError::AnswerNotInOptions {
                answer: correct_answer,
            });
        }

        Ok(QuizQuestion {
            question,
            options,
            correct_answer,
            explanation: self.explanation.trim().to_owned(),
        })
    }
}

/// A validated multiple-choice question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    question: String,
    options: [String; OPTIONS_PER_QUESTION],
    correct_answer: String,
    explanation: String,
}

impl QuizQuestion {
    /// Convenience constructor that goes through `QuizQuestionDraft::validate`.
    ///
    /// # Errors
    ///
    /// See `QuizQuestionDraft::validate`.
    pub fn new<I, S>(
        question: impl Into<String>,
        options: I,
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Result<Self, QuizQuestionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QuizQuestionDraft {
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_answer: correct_answer.into(),
            explanation: explanation.into(),
        }
        .validate()
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Exact comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

impl<'de> Deserialize<'de> for QuizQuestion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        QuizQuestionDraft::deserialize(deserializer)?
            .validate()
            .map_err(serde::de::Error::custom)
    }
}

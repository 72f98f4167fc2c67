use learnflow_core::model::{QuizQuestion, Score};

use super::progress::QuizProgress;
use crate::error::QuizSessionError;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Where a quiz session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Waiting for an answer to the current question.
    Answering,
    /// An answer was accepted and its feedback is on screen.
    ShowingFeedback,
    /// Every question has been answered. Terminal until restarted.
    Finished,
}

/// Feedback for an accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: String,
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: String,
}

/// Result of leaving the feedback phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Moved on to the question at `index`.
    Next { index: usize },
    /// The last question was answered; `final_score` is `100 × correct / total`.
    Finished { final_score: Score },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Pure quiz state machine over an ordered, non-empty list of questions.
///
/// Timing lives in `QuizRunner`; this type only enforces the
/// `Answering → ShowingFeedback → Answering | Finished` transitions and scoring.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current: usize,
    correct: usize,
    phase: QuizPhase,
    feedback: Option<AnswerFeedback>,
}

impl QuizSession {
    /// Start a session at the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` if no questions are provided.
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, QuizSessionError> {
        if questions.is_empty() {
            return Err(QuizSessionError::Empty);
        }
        Ok(Self {
            questions,
            current: 0,
            correct: 0,
            phase: QuizPhase::Answering,
            feedback: None,
        })
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Number of correct answers so far.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// The question being answered or reviewed. `None` once finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match self.phase {
            QuizPhase::Finished => None,
            _ => self.questions.get(self.current),
        }
    }

    /// Feedback for the last accepted answer while it is on screen.
    #[must_use]
    pub fn feedback(&self) -> Option<&AnswerFeedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == QuizPhase::Finished
    }

    /// `100 × correct / total` over the whole quiz.
    #[must_use]
    pub fn score_percent(&self) -> f64 {
        self.score().map_or(0.0, Score::value)
    }

    // `new` rejects empty quizzes and `correct` grows at most once per question.
    fn score(&self) -> Option<Score> {
        Score::from_ratio(self.correct, self.questions.len()).ok()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let answered = match self.phase {
            QuizPhase::Answering => self.current,
            QuizPhase::ShowingFeedback => self.current + 1,
            QuizPhase::Finished => self.questions.len(),
        };
        QuizProgress {
            total: self.questions.len(),
            answered,
            correct: self.correct,
            is_finished: self.is_finished(),
        }
    }

    /// Submit an answer for the current question.
    ///
    /// Only the first submission per question counts. Returns `None` when the
    /// session is not in `Answering`.
    pub fn submit_answer(&mut self, answer: &str) -> Option<&AnswerFeedback> {
        if self.phase != QuizPhase::Answering {
            return None;
        }
        let question = self.questions.get(self.current)?;
        let correct = question.is_correct(answer);
        if correct {
            self.correct += 1;
        }
        self.feedback = Some(AnswerFeedback {
            selected: answer.to_owned(),
            correct,
            correct_answer: question.correct_answer().to_owned(),
            explanation: question.explanation().to_owned(),
        });
        self.phase = QuizPhase::ShowingFeedback;
        self.feedback.as_ref()
    }

    /// Leave the feedback phase. Returns `None` unless feedback is showing.
    pub fn advance(&mut self) -> Option<Advance> {
        if self.phase != QuizPhase::ShowingFeedback {
            return None;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.feedback = None;
            self.phase = QuizPhase::Answering;
            Some(Advance::Next {
                index: self.current,
            })
        } else {
            let final_score = self.score()?;
            self.phase = QuizPhase::Finished;
            Some(Advance::Finished { final_score })
        }
    }

    /// Reset to the first question with a zero score.
    pub fn restart(&mut self) {
        self.current = 0;
        self.correct = 0;
        self.feedback = None;
        self.phase = QuizPhase::Answering;
    }
}

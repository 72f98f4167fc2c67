mod engine;
mod progress;
mod runner;

// Public API of the quiz subsystem.
pub use crate::error::QuizSessionError;
pub use engine::{Advance, AnswerFeedback, QuizPhase, QuizSession};
pub use progress::QuizProgress;
pub use runner::{CompletionCallback, QuizRunner};

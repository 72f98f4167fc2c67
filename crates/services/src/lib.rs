#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod generation;
pub mod identity;
pub mod progress;
pub mod quiz;

pub use learnflow_core::Clock;

pub use app_services::{AppServices, CourseQuiz};
pub use config::{AppConfig, GenerationConfig};
pub use error::{
    AppServicesError, ConfigError, GenerationError, ProgressError, ProgressLoadError,
    QuizSessionError,
};
pub use generation::{ChatCompletionsBackend, ContentGenerationService, GenerationBackend};
pub use identity::IdentityContext;
pub use progress::{CompletionOutcome, IdentityWatch, ProgressStore};
pub use quiz::{Advance, AnswerFeedback, QuizPhase, QuizProgress, QuizRunner, QuizSession};

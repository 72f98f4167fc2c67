use std::sync::Arc;
use std::time::Duration;

use learnflow_core::model::{CourseId, QuizQuestion};
use storage::repository::Storage;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::Clock;
use crate::config::AppConfig;
use crate::error::{AppServicesError, ProgressError, QuizSessionError};
use crate::generation::ContentGenerationService;
use crate::identity::IdentityContext;
use crate::progress::{CompletionOutcome, IdentityWatch, ProgressStore};
use crate::quiz::QuizRunner;

/// Assembles app-facing services around one identity context.
///
/// The progress store follows the identity for as long as any clone of the
/// services is alive. Construction spawns onto the current tokio runtime.
#[derive(Clone)]
pub struct AppServices {
    identity: IdentityContext,
    progress: Arc<ProgressStore>,
    generation: Arc<ContentGenerationService>,
    feedback_delay: Duration,
    _identity_watch: Arc<IdentityWatch>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(config: &AppConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        Ok(Self::from_storage(
            storage,
            ContentGenerationService::from_config(config.generation.clone()),
            config,
            clock,
        ))
    }

    /// Build services backed by in-memory storage.
    #[must_use]
    pub fn in_memory(config: &AppConfig, clock: Clock) -> Self {
        Self::from_storage(
            Storage::in_memory(),
            ContentGenerationService::from_config(config.generation.clone()),
            config,
            clock,
        )
    }

    /// Build services from already constructed parts.
    #[must_use]
    pub fn from_storage(
        storage: Storage,
        generation: ContentGenerationService,
        config: &AppConfig,
        clock: Clock,
    ) -> Self {
        let identity = IdentityContext::new();
        let progress = Arc::new(ProgressStore::new(clock, Arc::clone(&storage.progress)));
        let watch = progress.watch_identity(&identity);
        Self {
            identity,
            progress,
            generation: Arc::new(generation),
            feedback_delay: config.feedback_delay,
            _identity_watch: Arc::new(watch),
        }
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn generation(&self) -> Arc<ContentGenerationService> {
        Arc::clone(&self.generation)
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    /// Start a quiz whose result is recorded against `course_id` when it finishes.
    ///
    /// The returned [`CourseQuiz`] reports how the durable write went.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` if no questions are provided and
    /// `QuizSessionError::NoRuntime` outside a tokio runtime.
    pub fn start_course_quiz(
        &self,
        course_id: CourseId,
        questions: Vec<QuizQuestion>,
    ) -> Result<CourseQuiz, QuizSessionError> {
        let progress = Arc::clone(&self.progress);
        let (tx, rx) = oneshot::channel();
        let runner = QuizRunner::tracked(questions, self.feedback_delay, move |score| {
            tokio::spawn(async move {
                let result = progress.complete_course(course_id.clone(), score).await;
                match &result {
                    Ok(outcome) => debug!(course = %course_id, ?outcome, "quiz result recorded"),
                    Err(err) => warn!(course = %course_id, error = %err, "quiz result not recorded"),
                }
                // The caller may have stopped listening.
                let _ = tx.send(result);
            });
        })?;
        Ok(CourseQuiz {
            runner,
            completion: Some(rx),
        })
    }

    /// Start a standalone practice quiz. Nothing is recorded.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` if no questions are provided.
    pub fn start_practice_quiz(
        &self,
        questions: Vec<QuizQuestion>,
    ) -> Result<QuizRunner, QuizSessionError> {
        QuizRunner::practice(questions, self.feedback_delay)
    }
}

/// A running course quiz plus the outcome of recording its result.
pub struct CourseQuiz {
    runner: QuizRunner,
    completion: Option<oneshot::Receiver<Result<CompletionOutcome, ProgressError>>>,
}

impl CourseQuiz {
    #[must_use]
    pub fn runner(&self) -> &QuizRunner {
        &self.runner
    }

    /// Wait for the quiz to finish and its result to be written.
    ///
    /// Returns `None` when the outcome was already taken or the quiz can no longer
    /// finish.
    pub async fn completion(&mut self) -> Option<Result<CompletionOutcome, ProgressError>> {
        let rx = self.completion.take()?;
        rx.await.ok()
    }
}

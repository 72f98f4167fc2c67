use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use learnflow_core::model::{QuizQuestion, Score};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use super::engine::{Advance, AnswerFeedback, QuizPhase, QuizSession};
use super::progress::QuizProgress;
use crate::error::QuizSessionError;

/// Receives the final score when a tracked quiz finishes.
pub type CompletionCallback = Box<dyn FnOnce(Score) + Send + 'static>;

enum Mode {
    /// No callback; the quiz can be restarted.
    Practice,
    /// Reports completion once. The slot is emptied when the callback fires.
    Tracked(Option<CompletionCallback>),
}

struct Inner {
    session: QuizSession,
    mode: Mode,
    /// Identifies the live scheduled advance. Any other value is stale.
    schedule: u64,
    pending_advance: Option<JoinHandle<()>>,
}

impl Inner {
    /// Invalidate the scheduled advance even if its timer already fired.
    fn cancel_pending(&mut self) {
        self.schedule += 1;
        if let Some(handle) = self.pending_advance.take() {
            handle.abort();
        }
    }
}

/// Drives a `QuizSession` in real time.
///
/// After an accepted answer the feedback stays up for `feedback_delay`, then a
/// timer task advances the session. Dropping the runner invalidates that timer,
/// so a torn-down quiz never advances or reports completion.
///
/// Runners capture the tokio runtime they are built on and spawn their timers there.
pub struct QuizRunner {
    inner: Arc<Mutex<Inner>>,
    runtime: Handle,
    feedback_delay: Duration,
}

impl QuizRunner {
    pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_secs(3);

    /// Quiz whose completion is reported once through `on_finish`. Restart is unavailable.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` if no questions are provided and
    /// `QuizSessionError::NoRuntime` outside a tokio runtime.
    pub fn tracked<F>(
        questions: Vec<QuizQuestion>,
        feedback_delay: Duration,
        on_finish: F,
    ) -> Result<Self, QuizSessionError>
    where
        F: FnOnce(Score) + Send + 'static,
    {
        Self::with_mode(
            questions,
            feedback_delay,
            Mode::Tracked(Some(Box::new(on_finish))),
        )
    }

    /// Standalone practice quiz. Nothing is reported and restart is allowed.
    ///
    /// # Errors
    ///
    /// See [`Self::tracked`].
    pub fn practice(
        questions: Vec<QuizQuestion>,
        feedback_delay: Duration,
    ) -> Result<Self, QuizSessionError> {
        Self::with_mode(questions, feedback_delay, Mode::Practice)
    }

    fn with_mode(
        questions: Vec<QuizQuestion>,
        feedback_delay: Duration,
        mode: Mode,
    ) -> Result<Self, QuizSessionError> {
        let session = QuizSession::new(questions)?;
        let runtime = Handle::try_current().map_err(|_| QuizSessionError::NoRuntime)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                session,
                mode,
                schedule: 0,
                pending_advance: None,
            })),
            runtime,
            feedback_delay,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.lock().session.phase()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.lock().session.current_index()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<QuizQuestion> {
        self.lock().session.current_question().cloned()
    }

    #[must_use]
    pub fn feedback(&self) -> Option<AnswerFeedback> {
        self.lock().session.feedback().cloned()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        self.lock().session.progress()
    }

    #[must_use]
    pub fn score_percent(&self) -> f64 {
        self.lock().session.score_percent()
    }

    /// Submit an answer and schedule the advance.
    ///
    /// Returns `None` when the answer was ignored because the current question
    /// was already answered or the quiz is finished.
    pub fn submit_answer(&self, answer: &str) -> Option<AnswerFeedback> {
        let mut inner = self.lock();
        let feedback = inner.session.submit_answer(answer)?.clone();
        debug!(
            index = inner.session.current_index(),
            correct = feedback.correct,
            "quiz answer accepted"
        );

        inner.cancel_pending();
        let token = inner.schedule;
        let weak = Arc::downgrade(&self.inner);
        let delay = self.feedback_delay;
        inner.pending_advance = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            advance_after_feedback(&weak, token);
        }));
        Some(feedback)
    }

    /// Reset a practice quiz to its first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::RestartUnavailable` for tracked quizzes.
    pub fn restart(&self) -> Result<(), QuizSessionError> {
        let mut inner = self.lock();
        if matches!(inner.mode, Mode::Tracked(_)) {
            return Err(QuizSessionError::RestartUnavailable);
        }
        inner.cancel_pending();
        inner.session.restart();
        Ok(())
    }

    /// Abort a scheduled advance, if any. The quiz stays where it is.
    pub fn cancel(&self) {
        self.lock().cancel_pending();
    }
}

impl Drop for QuizRunner {
    fn drop(&mut self) {
        self.lock().cancel_pending();
    }
}

fn advance_after_feedback(inner: &Weak<Mutex<Inner>>, token: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let finished = {
        let mut guard = inner.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.schedule != token {
            debug!("skipping cancelled quiz advance");
            return;
        }
        guard.pending_advance = None;
        match guard.session.advance() {
            Some(Advance::Finished { final_score }) => {
                let callback = match &mut guard.mode {
                    Mode::Tracked(slot) => slot.take(),
                    Mode::Practice => None,
                };
                debug!(final_score = final_score.value(), "quiz finished");
                callback.map(|callback| (callback, final_score))
            }
            Some(Advance::Next { index }) => {
                debug!(index, "quiz advanced");
                None
            }
            None => None,
        }
    };

    // Runs outside the lock so the callback may inspect the runner.
    if let Some((callback, final_score)) = finished {
        callback(final_score);
    }
}

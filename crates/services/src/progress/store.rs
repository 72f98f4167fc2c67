use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use learnflow_core::model::{
    CompletedCourse, CourseId, ProgressDocument, ProgressSnapshot, Score, UserId,
};
use storage::repository::ProgressRepository;
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::{ProgressError, ProgressLoadError};

/// What `ProgressStore::complete_course` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// A new entry was durably written and is now reflected locally.
    Recorded,
    /// The course was already completed; the stored score was kept.
    AlreadyCompleted,
}

struct StoreState {
    user: Option<UserId>,
    /// Bumped on every user switch. Responses tagged with an older value are dropped.
    generation: u64,
    courses: ProgressDocument,
    loading: bool,
}

/// Local, observable mirror of the signed-in user's durable progress document.
///
/// Reads never fail from the caller's point of view: a failed load leaves an empty
/// set and is logged. Writes go to the repository first and are reflected locally
/// only once confirmed.
pub struct ProgressStore {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
    state: Mutex<StoreState>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            repo,
            state: Mutex::new(StoreState {
                user: None,
                generation: 0,
                courses: ProgressDocument::new(),
                loading: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserId> {
        self.lock().user.clone()
    }

    /// Whether a load for the current user is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Point the store at a different user without loading.
    ///
    /// Switching clears the local set immediately and invalidates any load still in
    /// flight for the previous user. Switching to the same user is a no-op.
    /// Returns the generation now in effect.
    pub fn switch_user(&self, user: Option<UserId>) -> u64 {
        let mut state = self.lock();
        if state.user == user {
            return state.generation;
        }
        state.generation += 1;
        state.loading = user.is_some();
        state.user = user;
        state.courses = ProgressDocument::new();
        state.generation
    }

    /// Switch to `user` and load their document.
    pub async fn set_user(&self, user: Option<UserId>) {
        self.switch_user(user);
        self.load().await;
    }

    /// Refresh the local set from the current user's durable document.
    ///
    /// A missing document leaves only what this store has confirmed since the
    /// switch, which is nothing for a fresh user. A failed read yields an empty set.
    /// Entries confirmed while the read was in flight survive it. A response that
    /// arrives after the user has changed is discarded.
    pub async fn load(&self) {
        let (user, generation) = {
            let mut state = self.lock();
            let Some(user) = state.user.clone() else {
                state.courses = ProgressDocument::new();
                state.loading = false;
                return;
            };
            state.loading = true;
            (user, state.generation)
        };

        let result = self.repo.get_progress(&user).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(user = %user, "discarding stale progress load");
            return;
        }
        state.loading = false;
        match result {
            Ok(Some(mut doc)) => {
                // Completions confirmed while the read was in flight are durable too.
                for course in state.courses.courses() {
                    doc.append_if_absent(course.clone());
                }
                debug!(user = %user, completed = doc.len(), "progress loaded");
                state.courses = doc;
            }
            Ok(None) => {
                debug!(user = %user, "no progress document yet");
            }
            Err(source) => {
                let err = ProgressLoadError { user, source };
                warn!(error = %err, "falling back to empty progress");
                state.courses = ProgressDocument::new();
            }
        }
    }

    /// Durably record that the current user completed `course_id` with `score`.
    ///
    /// Re-reads the durable document first; an existing entry for the course is
    /// kept as-is. Otherwise the entry is appended atomically, creating the
    /// document if needed, and only then reflected locally.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::SignedOut` when no user is signed in and
    /// `ProgressError::Write` when the durable read or write fails. Local state is
    /// untouched on error.
    pub async fn complete_course(
        &self,
        course_id: CourseId,
        score: Score,
    ) -> Result<CompletionOutcome, ProgressError> {
        let (user, generation) = {
            let state = self.lock();
            let user = state.user.clone().ok_or(ProgressError::SignedOut)?;
            (user, state.generation)
        };

        let durable = self
            .repo
            .get_progress(&user)
            .await
            .map_err(ProgressError::Write)?;
        if let Some(doc) = &durable {
            if doc.contains(&course_id) {
                debug!(user = %user, course = %course_id, "course already completed");
                self.reconcile(generation, doc);
                return Ok(CompletionOutcome::AlreadyCompleted);
            }
        }

        let entry = CompletedCourse::new(course_id, score, self.clock.now());
        let outcome = self
            .repo
            .append_course(&user, &entry)
            .await
            .map_err(|err| {
                warn!(user = %user, course = %entry.course_id, error = %err, "progress write failed");
                ProgressError::Write(err)
            })?;

        if !outcome.was_written() {
            // Another writer got there between the read and the append.
            if let Ok(Some(doc)) = self.repo.get_progress(&user).await {
                self.reconcile(generation, &doc);
            }
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        info!(
            user = %user,
            course = %entry.course_id,
            score = entry.score.value(),
            "course completed"
        );
        let mut state = self.lock();
        if state.generation == generation {
            state.courses.append_if_absent(entry);
        }
        Ok(CompletionOutcome::Recorded)
    }

    fn reconcile(&self, generation: u64, durable: &ProgressDocument) {
        let mut state = self.lock();
        if state.generation != generation {
            return;
        }
        for course in durable.courses() {
            state.courses.append_if_absent(course.clone());
        }
    }

    /// Local lookup only; never touches the repository.
    #[must_use]
    pub fn is_course_completed(&self, course_id: &CourseId) -> bool {
        self.lock().courses.contains(course_id)
    }

    /// Mean score over the local set, recomputed on every call. `0.0` when empty.
    #[must_use]
    pub fn average_score(&self) -> f64 {
        self.lock().courses.average_score()
    }

    #[must_use]
    pub fn completed_courses(&self) -> Vec<CompletedCourse> {
        self.lock().courses.courses().to_vec()
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.lock().courses.snapshot()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::CourseId;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("score must be a finite percentage in [0, 100], got {0}")]
    OutOfRange(f64),

    #[error("cannot score an empty quiz")]
    NoQuestions,

    #[error("correct answers ({correct}) exceed question count ({total})")]
    TooManyCorrect { correct: usize, total: usize },
}

/// Percentage score in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub const MAX: f64 = 100.0;

    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` for non-finite values or values outside `[0, 100]`.
    pub fn new(value: f64) -> Result<Self, ScoreError> {
        if value.is_finite() && (0.0..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoreError::OutOfRange(value))
        }
    }

    /// `100 × correct / total`.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::NoQuestions` when `total` is zero and
    /// `ScoreError::TooManyCorrect` when `correct > total`.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_ratio(correct: usize, total: usize) -> Result<Self, ScoreError> {
        if total == 0 {
            return Err(ScoreError::NoQuestions);
        }
        if correct > total {
            return Err(ScoreError::TooManyCorrect { correct, total });
        }
        Self::new(Self::MAX * correct as f64 / total as f64)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = ScoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(value: Score) -> Self {
        value.0
    }
}

/// A (course, score) pair marking that a learner finished the quiz for that course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCourse {
    pub course_id: CourseId,
    pub score: Score,
    /// When the completion was confirmed. Older documents do not carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletedCourse {
    #[must_use]
    pub fn new(course_id: CourseId, score: Score, completed_at: DateTime<Utc>) -> Self {
        Self {
            course_id,
            score,
            completed_at: Some(completed_at),
        }
    }
}

/// Per-user progress document: the ordered list of completed courses.
///
/// Course ids are unique. When rebuilding from persisted rows the first entry for a
/// course wins and later duplicates are dropped, matching first-writer-wins semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDocument {
    #[serde(default, deserialize_with = "dedup_courses")]
    completed_courses: Vec<CompletedCourse>,
}

fn dedup_courses<'de, D>(deserializer: D) -> Result<Vec<CompletedCourse>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<CompletedCourse>::deserialize(deserializer)?;
    Ok(ProgressDocument::from_courses(raw).completed_courses)
}

impl ProgressDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_courses(courses: impl IntoIterator<Item = CompletedCourse>) -> Self {
        let mut doc = Self::new();
        for course in courses {
            doc.append_if_absent(course);
        }
        doc
    }

    /// Append unless an entry for the same course already exists.
    ///
    /// Returns `true` when the entry was appended.
    pub fn append_if_absent(&mut self, course: CompletedCourse) -> bool {
        if self.contains(&course.course_id) {
            return false;
        }
        self.completed_courses.push(course);
        true
    }

    #[must_use]
    pub fn contains(&self, course_id: &CourseId) -> bool {
        self.get(course_id).is_some()
    }

    #[must_use]
    pub fn get(&self, course_id: &CourseId) -> Option<&CompletedCourse> {
        self.completed_courses
            .iter()
            .find(|c| &c.course_id == course_id)
    }

    #[must_use]
    pub fn courses(&self) -> &[CompletedCourse] {
        &self.completed_courses
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.completed_courses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed_courses.is_empty()
    }

    /// Mean of all scores, `0.0` when there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_score(&self) -> f64 {
        if self.completed_courses.is_empty() {
            return 0.0;
        }
        let total: f64 = self.completed_courses.iter().map(|c| c.score.value()).sum();
        total / self.completed_courses.len() as f64
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed_count: self.len(),
            average_score: self.average_score(),
        }
    }
}

/// Dashboard figures derived from a progress document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub completed_count: usize,
    pub average_score: f64,
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an identifier is blank.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} must not be blank")]
pub struct IdError {
    kind: &'static str,
}

impl IdError {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

fn non_blank(kind: &'static str, raw: String) -> Result<String, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError { kind });
    }
    if trimmed.len() == raw.len() {
        Ok(raw)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Identity of an authenticated learner, as supplied by the identity provider.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId`.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the id is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        non_blank("UserId", id.into()).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a course: a skill name or a generated-roadmap sentinel.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseId(String);

impl CourseId {
    pub const ROADMAP_PREFIX: &'static str = "roadmap:";

    /// Creates a new `CourseId`.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the id is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        non_blank("CourseId", id.into()).map(Self)
    }

    /// Sentinel course id for the quiz attached to a generated roadmap.
    ///
    /// The goal is slugged so that the same goal always maps to the same course.
    #[must_use]
    pub fn roadmap(goal: &str) -> Self {
        let mut slug = String::with_capacity(goal.len());
        for ch in goal.trim().chars() {
            if ch.is_alphanumeric() {
                slug.extend(ch.to_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        if slug.is_empty() {
            slug.push_str("untitled");
        }
        Self(format!("{}{slug}", Self::ROADMAP_PREFIX))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_roadmap(&self) -> bool {
        self.0.starts_with(Self::ROADMAP_PREFIX)
    }
}

// ─── Conversions ───────────────────────────────────────────────────────────────

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CourseId> for String {
    fn from(value: CourseId) -> Self {
        value.0
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for CourseId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Debug for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CourseId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        let err = UserId::new("   ").unwrap_err();
        assert_eq!(err.kind(), "UserId");
        assert!("".parse::<CourseId>().is_err());
    }

    #[test]
    fn ids_are_trimmed() {
        let id = CourseId::new("  React ").unwrap();
        assert_eq!(id.as_str(), "React");
        assert_eq!(id.to_string(), "React");
    }

    #[test]
    fn roadmap_sentinel_is_stable_slug() {
        let id = CourseId::roadmap("  Become a Full-Stack   developer! ");
        assert_eq!(id.as_str(), "roadmap:become-a-full-stack-developer");
        assert!(id.is_roadmap());
        assert_eq!(id, CourseId::roadmap("become a full stack developer"));
        assert!(!CourseId::new("React").unwrap().is_roadmap());
    }

    #[test]
    fn roadmap_sentinel_for_symbol_only_goal() {
        assert_eq!(CourseId::roadmap("!!!").as_str(), "roadmap:untitled");
    }

    #[test]
    fn serde_rejects_blank_course_id() {
        let ok: CourseId = serde_json::from_str("\"SQL\"").unwrap();
        assert_eq!(ok.as_str(), "SQL");
        assert!(serde_json::from_str::<CourseId>("\" \"").is_err());
    }
}

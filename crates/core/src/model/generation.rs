//! Request and response records exchanged with the content generator.
//!
//! Requests are validated on construction. Responses arrive as `*Draft` values
//! deserialized from the model's JSON and become usable only through
//! [`ResponseDraft::validate`]; nothing is partially accepted.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::{QuizQuestion, QuizQuestionDraft, QuizQuestionError};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RequestError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("unknown {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("response is not valid JSON for this schema: {0}")]
    Malformed(String),

    #[error("{field} must not be blank")]
    BlankField { field: &'static str },

    #[error("{field} must not be empty")]
    EmptyList { field: &'static str },

    #[error("{field} contains an invalid URL: {url}")]
    InvalidUrl { field: &'static str, url: String },

    #[error("quiz question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuizQuestionError,
    },
}

/// A deserializable model response that must be validated before use.
pub trait ResponseDraft: DeserializeOwned {
    type Output;

    /// # Errors
    ///
    /// Returns `SchemaError` when the response violates the declared schema.
    fn validate(self) -> Result<Self::Output, SchemaError>;
}

fn required(field: &'static str, value: &str, min: usize) -> Result<String, RequestError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RequestError::Blank { field });
    }
    if trimmed.chars().count() < min {
        return Err(RequestError::TooShort { field, min });
    }
    Ok(trimmed.to_owned())
}

fn non_blank(field: &'static str, value: String) -> Result<String, SchemaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::BlankField { field });
    }
    Ok(trimmed.to_owned())
}

fn web_url(field: &'static str, raw: &str) -> Result<Url, SchemaError> {
    let invalid = || SchemaError::InvalidUrl {
        field,
        url: raw.to_owned(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(invalid()),
    }
}

fn validate_quiz(
    field: &'static str,
    drafts: Vec<QuizQuestionDraft>,
) -> Result<Vec<QuizQuestion>, SchemaError> {
    if drafts.is_empty() {
        return Err(SchemaError::EmptyList { field });
    }
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft
                .validate()
                .map_err(|source| SchemaError::InvalidQuestion { index, source })
        })
        .collect()
}

//
// ─── ENUMS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl RoadmapLength {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl FromStr for RoadmapLength {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(RequestError::UnknownVariant {
                field: "desiredRoadmapLength",
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RoadmapLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(RequestError::UnknownVariant {
                field: "desiredDifficulty",
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── REQUESTS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapRequest {
    goal: String,
    current_skills: String,
    length: RoadmapLength,
}

impl RoadmapRequest {
    pub const GOAL_MIN_CHARS: usize = 5;
    pub const SKILLS_MIN_CHARS: usize = 2;

    /// # Errors
    ///
    /// Returns `RequestError` if the goal or skill list is blank or too short.
    pub fn new(goal: &str, current_skills: &str, length: RoadmapLength) -> Result<Self, RequestError> {
        Ok(Self {
            goal: required("goal", goal, Self::GOAL_MIN_CHARS)?,
            current_skills: required("currentSkills", current_skills, Self::SKILLS_MIN_CHARS)?,
            length,
        })
    }

    #[must_use]
    pub fn goal(&self) -> &str {
        &self.goal
    }

    #[must_use]
    pub fn current_skills(&self) -> &str {
        &self.current_skills
    }

    #[must_use]
    pub fn length(&self) -> RoadmapLength {
        self.length
    }
}

/// A request that only carries a topic: quiz generation and resource lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRequest {
    topic: String,
}

impl TopicRequest {
    /// # Errors
    ///
    /// Returns `RequestError::Blank` if the topic is blank.
    pub fn new(topic: &str) -> Result<Self, RequestError> {
        Ok(Self {
            topic: required("topic", topic, 1)?,
        })
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    learning_progress: String,
    interests: String,
    difficulty: Difficulty,
}

impl ProjectRequest {
    pub const PROGRESS_MIN_CHARS: usize = 5;
    pub const INTERESTS_MIN_CHARS: usize = 2;

    /// # Errors
    ///
    /// Returns `RequestError` if the progress description or interests are too short.
    pub fn new(
        learning_progress: &str,
        interests: &str,
        difficulty: Difficulty,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            learning_progress: required(
                "learningProgress",
                learning_progress,
                Self::PROGRESS_MIN_CHARS,
            )?,
            interests: required("interests", interests, Self::INTERESTS_MIN_CHARS)?,
            difficulty,
        })
    }

    #[must_use]
    pub fn learning_progress(&self) -> &str {
        &self.learning_progress
    }

    #[must_use]
    pub fn interests(&self) -> &str {
        &self.interests
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorRequest {
    question: String,
}

impl TutorRequest {
    /// # Errors
    ///
    /// Returns `RequestError::Blank` if the question is blank.
    pub fn new(question: &str) -> Result<Self, RequestError> {
        Ok(Self {
            question: required("question", question, 1)?,
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }
}

//
// ─── RESPONSES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub title: String,
    pub url: Url,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceDraft {
    #[serde(default)]
    pub title: String,
    pub url: String,
}

fn validate_resources(
    field: &'static str,
    drafts: Vec<ResourceDraft>,
) -> Result<Vec<Resource>, SchemaError> {
    drafts
        .into_iter()
        .map(|d| -> Result<Resource, SchemaError> {
            Ok(Resource {
                title: non_blank(field, d.title)?,
                url: web_url(field, &d.url)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStep {
    pub title: String,
    pub description: String,
    pub key_concepts: Vec<String>,
    pub resources: Vec<Resource>,
    pub youtube_links: Vec<Resource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStepDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub resources: Vec<ResourceDraft>,
    #[serde(default)]
    pub youtube_links: Vec<ResourceDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub title: String,
    pub introduction: String,
    pub steps: Vec<RoadmapStep>,
    pub conclusion: String,
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapDraft {
    pub title: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub steps: Vec<RoadmapStepDraft>,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default)]
    pub quiz: Vec<QuizQuestionDraft>,
}

impl ResponseDraft for RoadmapDraft {
    type Output = Roadmap;

    fn validate(self) -> Result<Roadmap, SchemaError> {
        if self.steps.is_empty() {
            return Err(SchemaError::EmptyList { field: "steps" });
        }
        let steps = self
            .steps
            .into_iter()
            .map(|step| -> Result<RoadmapStep, SchemaError> {
                Ok(RoadmapStep {
                    title: non_blank("steps.title", step.title)?,
                    description: step.description.trim().to_owned(),
                    key_concepts: step
                        .key_concepts
                        .into_iter()
                        .map(|c| c.trim().to_owned())
                        .filter(|c| !c.is_empty())
                        .collect(),
                    resources: validate_resources("steps.resources", step.resources)?,
                    youtube_links: validate_resources("steps.youtubeLinks", step.youtube_links)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Roadmap {
            title: non_blank("title", self.title)?,
            introduction: self.introduction.trim().to_owned(),
            steps,
            conclusion: self.conclusion.trim().to_owned(),
            quiz: validate_quiz("quiz", self.quiz)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedQuiz {
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedQuizDraft {
    #[serde(default)]
    pub quiz: Vec<QuizQuestionDraft>,
}

impl ResponseDraft for GeneratedQuizDraft {
    type Output = GeneratedQuiz;

    fn validate(self) -> Result<GeneratedQuiz, SchemaError> {
        Ok(GeneratedQuiz {
            quiz: validate_quiz("quiz", self.quiz)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResources {
    pub resources: Vec<Resource>,
    pub youtube_links: Vec<Resource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResourcesDraft {
    #[serde(default)]
    pub resources: Vec<ResourceDraft>,
    #[serde(default)]
    pub youtube_links: Vec<ResourceDraft>,
}

impl ResponseDraft for LearningResourcesDraft {
    type Output = LearningResources;

    fn validate(self) -> Result<LearningResources, SchemaError> {
        Ok(LearningResources {
            resources: validate_resources("resources", self.resources)?,
            youtube_links: validate_resources("youtubeLinks", self.youtube_links)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecommendations {
    pub project_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecommendationsDraft {
    #[serde(default)]
    pub project_recommendations: Vec<String>,
}

impl ResponseDraft for ProjectRecommendationsDraft {
    type Output = ProjectRecommendations;

    fn validate(self) -> Result<ProjectRecommendations, SchemaError> {
        let project_recommendations = self
            .project_recommendations
            .into_iter()
            .map(|p| non_blank("projectRecommendations", p))
            .collect::<Result<Vec<_>, _>>()?;
        if project_recommendations.is_empty() {
            return Err(SchemaError::EmptyList {
                field: "projectRecommendations",
            });
        }
        Ok(ProjectRecommendations {
            project_recommendations,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TutorAnswer {
    pub answer: String,
    pub resources: Vec<Url>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TutorAnswerDraft {
    pub answer: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl ResponseDraft for TutorAnswerDraft {
    type Output = TutorAnswer;

    fn validate(self) -> Result<TutorAnswer, SchemaError> {
        Ok(TutorAnswer {
            answer: non_blank("answer", self.answer)?,
            resources: self
                .resources
                .iter()
                .map(|raw| web_url("resources", raw))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question_json(answer: &str) -> String {
        format!(
            r#"{{"question":"What is JSX?","options":["A","B","C","D"],"correctAnswer":"{answer}","explanation":"because"}}"#
        )
    }

    #[test]
    fn roadmap_request_enforces_form_minimums() {
        assert!(RoadmapRequest::new("Become a data engineer", "SQL", RoadmapLength::Long).is_ok());
        assert_eq!(
            RoadmapRequest::new("Web", "HTML", RoadmapLength::Short).unwrap_err(),
            RequestError::TooShort {
                field: "goal",
                min: RoadmapRequest::GOAL_MIN_CHARS
            }
        );
        assert_eq!(
            RoadmapRequest::new("Learn Rust well", "  ", RoadmapLength::Short).unwrap_err(),
            RequestError::Blank {
                field: "currentSkills"
            }
        );
    }

    #[test]
    fn project_request_enforces_form_minimums() {
        assert!(ProjectRequest::new("Finished HTML", "AI", Difficulty::Beginner).is_ok());
        assert!(matches!(
            ProjectRequest::new("HTML", "AI", Difficulty::Beginner).unwrap_err(),
            RequestError::TooShort { field: "learningProgress", .. }
        ));
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("LONG".parse::<RoadmapLength>().unwrap(), RoadmapLength::Long);
        assert_eq!(" advanced".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert!("epic".parse::<RoadmapLength>().is_err());
        assert_eq!(Difficulty::default().to_string(), "intermediate");
    }

    #[test]
    fn quiz_draft_rejects_empty_and_invalid_questions() {
        let empty: GeneratedQuizDraft = serde_json::from_str(r#"{"quiz":[]}"#).unwrap();
        assert_eq!(
            empty.validate().unwrap_err(),
            SchemaError::EmptyList { field: "quiz" }
        );

        let json = format!(r#"{{"quiz":[{},{}]}}"#, question_json("A"), question_json("Z"));
        let draft: GeneratedQuizDraft = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            draft.validate().unwrap_err(),
            SchemaError::InvalidQuestion { index: 1, .. }
        ));
    }

    #[test]
    fn resources_require_web_urls() {
        let json = r#"{"resources":[{"title":"MDN","url":"https://developer.mozilla.org"}],
                       "youtubeLinks":[{"title":"Video","url":"ftp://example.com"}]}"#;
        let draft: LearningResourcesDraft = serde_json::from_str(json).unwrap();
        assert!(matches!(
            draft.validate().unwrap_err(),
            SchemaError::InvalidUrl { field: "youtubeLinks", .. }
        ));
    }

    #[test]
    fn roadmap_draft_validates_nested_content() {
        let json = format!(
            r#"{{"title":"Rust","introduction":"intro","steps":[
                {{"title":"Ownership","description":"d","keyConcepts":["borrowing"," "],
                  "resources":[{{"title":"Book","url":"https://doc.rust-lang.org/book/"}}],
                  "youtubeLinks":[{{"title":"Search","url":"https://www.youtube.com/results?search_query=rust"}}]}}
            ],"conclusion":"done","quiz":[{}]}}"#,
            question_json("B")
        );
        let roadmap = serde_json::from_str::<RoadmapDraft>(&json)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(roadmap.steps.len(), 1);
        assert_eq!(roadmap.steps[0].key_concepts, vec!["borrowing".to_string()]);
        assert_eq!(roadmap.quiz.len(), 1);
    }

    #[test]
    fn roadmap_without_steps_is_rejected() {
        let draft: RoadmapDraft = serde_json::from_str(r#"{"title":"x","steps":[]}"#).unwrap();
        assert_eq!(
            draft.validate().unwrap_err(),
            SchemaError::EmptyList { field: "steps" }
        );
    }

    #[test]
    fn tutor_answer_requires_text() {
        let draft: TutorAnswerDraft =
            serde_json::from_str(r#"{"answer":"  ","resources":[]}"#).unwrap();
        assert_eq!(
            draft.validate().unwrap_err(),
            SchemaError::BlankField { field: "answer" }
        );
    }

    #[test]
    fn project_recommendations_must_not_be_empty() {
        let draft: ProjectRecommendationsDraft =
            serde_json::from_str(r#"{"projectRecommendations":[]}"#).unwrap();
        assert!(draft.validate().is_err());
    }
}

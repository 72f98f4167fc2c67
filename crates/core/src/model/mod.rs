pub mod generation;
mod ids;
mod progress;
mod quiz;
mod skill;

pub use generation::{
    Difficulty, GeneratedQuiz, GeneratedQuizDraft, LearningResources, LearningResourcesDraft,
    ProjectRecommendations, ProjectRecommendationsDraft, ProjectRequest, RequestError, Resource,
    ResponseDraft, Roadmap, RoadmapDraft, RoadmapLength, RoadmapRequest, RoadmapStep,
    SchemaError, TopicRequest, TutorAnswer, TutorAnswerDraft, TutorRequest,
};
pub use ids::{CourseId, IdError, UserId};
pub use progress::{CompletedCourse, ProgressDocument, ProgressSnapshot, Score, ScoreError};
pub use quiz::{OPTIONS_PER_QUESTION, QuizQuestion, QuizQuestionDraft, QuizQuestionError};
pub use skill::{SKILL_CATALOG, Skill, search_skills};

use std::sync::Arc;

use learnflow_core::model::{
    GeneratedQuiz, GeneratedQuizDraft, LearningResources, LearningResourcesDraft,
    ProjectRecommendations, ProjectRecommendationsDraft, ProjectRequest, ResponseDraft, Roadmap,
    RoadmapDraft, RoadmapRequest, SchemaError, TopicRequest, TutorAnswer, TutorAnswerDraft,
    TutorRequest,
};
use tracing::{debug, warn};

use super::client::{ChatCompletionsBackend, GenerationBackend};
use super::prompts;
use crate::config::GenerationConfig;
use crate::error::GenerationError;

/// Typed front for the content generator.
///
/// Every response is parsed and validated against its schema before it is
/// returned; a partially valid response is rejected as a whole.
#[derive(Clone)]
pub struct ContentGenerationService {
    backend: Option<Arc<dyn GenerationBackend>>,
}

impl ContentGenerationService {
    #[must_use]
    pub fn new(backend: Option<Arc<dyn GenerationBackend>>) -> Self {
        Self { backend }
    }

    /// Build a chat-completions backed service, or a disabled one without config.
    #[must_use]
    pub fn from_config(config: Option<GenerationConfig>) -> Self {
        let backend = config.map(|config| {
            Arc::new(ChatCompletionsBackend::new(config)) as Arc<dyn GenerationBackend>
        });
        Self::new(backend)
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// # Errors
    ///
    /// Returns `GenerationError` when generation is disabled, the backend fails, or
    /// the response does not match the roadmap schema.
    pub async fn generate_roadmap(
        &self,
        request: &RoadmapRequest,
    ) -> Result<Roadmap, GenerationError> {
        self.run::<RoadmapDraft>("roadmap", prompts::roadmap(request))
            .await
    }

    /// # Errors
    ///
    /// See [`Self::generate_roadmap`].
    pub async fn generate_quiz(
        &self,
        request: &TopicRequest,
    ) -> Result<GeneratedQuiz, GenerationError> {
        self.run::<GeneratedQuizDraft>("quiz", prompts::quiz(request))
            .await
    }

    /// # Errors
    ///
    /// See [`Self::generate_roadmap`].
    pub async fn learning_resources(
        &self,
        request: &TopicRequest,
    ) -> Result<LearningResources, GenerationError> {
        self.run::<LearningResourcesDraft>("resources", prompts::resources(request))
            .await
    }

    /// # Errors
    ///
    /// See [`Self::generate_roadmap`].
    pub async fn recommend_projects(
        &self,
        request: &ProjectRequest,
    ) -> Result<ProjectRecommendations, GenerationError> {
        self.run::<ProjectRecommendationsDraft>("projects", prompts::projects(request))
            .await
    }

    /// # Errors
    ///
    /// See [`Self::generate_roadmap`].
    pub async fn answer_question(
        &self,
        request: &TutorRequest,
    ) -> Result<TutorAnswer, GenerationError> {
        self.run::<TutorAnswerDraft>("tutor", prompts::tutor(request))
            .await
    }

    async fn run<D: ResponseDraft>(
        &self,
        flow: &'static str,
        prompt: String,
    ) -> Result<D::Output, GenerationError> {
        let backend = self.backend.as_ref().ok_or(GenerationError::Disabled)?;
        debug!(flow, "requesting generated content");
        let raw = backend.complete_json(&prompt).await?;

        let validated = serde_json::from_str::<D>(strip_code_fence(&raw))
            .map_err(|err| SchemaError::Malformed(err.to_string()))
            .and_then(ResponseDraft::validate);
        match validated {
            Ok(output) => Ok(output),
            Err(err) => {
                warn!(flow, error = %err, "generated content rejected");
                Err(err.into())
            }
        }
    }
}

/// Some models wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use learnflow_core::model::{
    Difficulty, ProjectRequest, RoadmapLength, RoadmapRequest, SchemaError, TopicRequest,
    TutorRequest,
};
use services::{ContentGenerationService, GenerationBackend, GenerationError};

/// Replays canned responses and records the prompts it was given.
#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn replying(replies: impl IntoIterator<Item = Result<String, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn complete_json(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

fn service(backend: &Arc<ScriptedBackend>) -> ContentGenerationService {
    ContentGenerationService::new(Some(Arc::clone(backend) as Arc<dyn GenerationBackend>))
}

const QUESTION: &str = r#"{"question":"2+2?","options":["3","4","5","6"],"correctAnswer":"4","explanation":"basic arithmetic"}"#;

#[tokio::test]
async fn roadmap_is_parsed_and_validated() {
    let json = format!(
        r#"{{"title":"Web Developer Roadmap","introduction":"Start here.",
            "steps":[{{"title":"HTML","description":"Markup","keyConcepts":["tags"," "],
                      "resources":[{{"title":"MDN","url":"https://developer.mozilla.org"}}],
                      "youtubeLinks":[]}}],
            "conclusion":"Keep going.","quiz":[{QUESTION}]}}"#
    );
    let backend = ScriptedBackend::replying([Ok(json)]);
    let request =
        RoadmapRequest::new("Become a web developer", "HTML, CSS", RoadmapLength::Short).unwrap();

    let roadmap = service(&backend).generate_roadmap(&request).await.unwrap();
    assert_eq!(roadmap.title, "Web Developer Roadmap");
    assert_eq!(roadmap.steps[0].key_concepts, vec!["tags".to_owned()]);
    assert_eq!(roadmap.quiz.len(), 1);
    assert_eq!(roadmap.quiz[0].correct_answer(), "4");
    assert!(backend.prompts.lock().unwrap()[0].contains("Become a web developer"));
}

#[tokio::test]
async fn fenced_quiz_response_is_accepted() {
    let backend = ScriptedBackend::replying([Ok(format!("```json\n{{\"quiz\":[{QUESTION}]}}\n```"))]);
    let quiz = service(&backend)
        .generate_quiz(&TopicRequest::new("Arithmetic").unwrap())
        .await
        .unwrap();
    assert_eq!(quiz.quiz[0].question(), "2+2?");
}

#[tokio::test]
async fn invalid_question_rejects_whole_quiz() {
    let bad = r#"{"question":"1+1?","options":["1","2","3"],"correctAnswer":"2","explanation":""}"#;
    let backend = ScriptedBackend::replying([Ok(format!(r#"{{"quiz":[{QUESTION},{bad}]}}"#))]);
    let err = service(&backend)
        .generate_quiz(&TopicRequest::new("Arithmetic").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Schema(SchemaError::InvalidQuestion { index: 1, .. })
    ));
}

#[tokio::test]
async fn non_json_reply_is_a_schema_error() {
    let backend = ScriptedBackend::replying([Ok("Sure! Here are some projects.".to_owned())]);
    let request = ProjectRequest::new("Finished HTML and CSS", "games", Difficulty::Beginner).unwrap();
    let err = service(&backend)
        .recommend_projects(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Schema(SchemaError::Malformed(_))));
}

#[tokio::test]
async fn resources_require_web_urls() {
    let backend = ScriptedBackend::replying([
        Ok(r#"{"resources":[{"title":"Docs","url":"https://doc.rust-lang.org"}],
              "youtubeLinks":[{"title":"Intro","url":"https://www.youtube.com/watch?v=abc"}]}"#
            .to_owned()),
        Ok(r#"{"resources":[{"title":"Local","url":"file:///etc/passwd"}]}"#.to_owned()),
    ]);
    let service = service(&backend);
    let topic = TopicRequest::new("Rust").unwrap();

    let found = service.learning_resources(&topic).await.unwrap();
    assert_eq!(found.resources[0].url.host_str(), Some("doc.rust-lang.org"));
    assert_eq!(found.youtube_links.len(), 1);

    let err = service.learning_resources(&topic).await.unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Schema(SchemaError::InvalidUrl { .. })
    ));
}

#[tokio::test]
async fn tutor_answer_and_backend_errors_pass_through() {
    let backend = ScriptedBackend::replying([
        Ok(r#"{"answer":"Ownership means one owner.","resources":["https://doc.rust-lang.org/book/"]}"#.to_owned()),
        Err(GenerationError::RateLimited),
    ]);
    let service = service(&backend);
    let question = TutorRequest::new("What is ownership?").unwrap();

    let answer = service.answer_question(&question).await.unwrap();
    assert_eq!(answer.answer, "Ownership means one owner.");
    assert_eq!(answer.resources.len(), 1);

    assert!(matches!(
        service.answer_question(&question).await,
        Err(GenerationError::RateLimited)
    ));
}

async fn roadmap_for(
    service: &ContentGenerationService,
    goal: &str,
) -> Result<String, GenerationError> {
    let request = RoadmapRequest::new(goal, "none yet", RoadmapLength::Medium)?;
    Ok(service.generate_roadmap(&request).await?.title)
}

#[tokio::test]
async fn short_goal_is_rejected_before_any_call() {
    let backend = ScriptedBackend::replying([]);
    let err = roadmap_for(&service(&backend), "web").await.unwrap_err();
    assert!(matches!(err, GenerationError::InvalidRequest(_)));
    assert!(backend.prompts.lock().unwrap().is_empty());
}

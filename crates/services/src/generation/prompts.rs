use learnflow_core::model::{ProjectRequest, RoadmapRequest, TopicRequest, TutorRequest};

const QUESTION_SHAPE: &str = r#"{"question": string, "options": [string, string, string, string], "correctAnswer": string (one of options), "explanation": string}"#;
const RESOURCE_SHAPE: &str = r#"{"title": string, "url": string (http or https)}"#;

pub(super) fn roadmap(request: &RoadmapRequest) -> String {
    format!(
        "Create a {length} learning roadmap.\n\
         Goal: {goal}\n\
         Current skills: {skills}\n\n\
         Respond with JSON of the form:\n\
         {{\"title\": string, \"introduction\": string, \"steps\": [{{\"title\": string, \
         \"description\": string, \"keyConcepts\": [string], \"resources\": [{RESOURCE_SHAPE}], \
         \"youtubeLinks\": [{RESOURCE_SHAPE}]}}], \"conclusion\": string, \
         \"quiz\": [{QUESTION_SHAPE}]}}\n\
         Include 10 quiz questions covering the whole roadmap.",
        length = request.length(),
        goal = request.goal(),
        skills = request.current_skills(),
    )
}

pub(super) fn quiz(request: &TopicRequest) -> String {
    format!(
        "Write 10 multiple-choice questions about {topic}.\n\
         Respond with JSON of the form: {{\"quiz\": [{QUESTION_SHAPE}]}}",
        topic = request.topic(),
    )
}

pub(super) fn resources(request: &TopicRequest) -> String {
    format!(
        "Suggest learning resources for {topic}: articles, documentation and YouTube videos.\n\
         Respond with JSON of the form: \
         {{\"resources\": [{RESOURCE_SHAPE}], \"youtubeLinks\": [{RESOURCE_SHAPE}]}}",
        topic = request.topic(),
    )
}

pub(super) fn projects(request: &ProjectRequest) -> String {
    format!(
        "Recommend {difficulty} practice projects.\n\
         Learning progress: {progress}\n\
         Interests: {interests}\n\n\
         Respond with JSON of the form: {{\"projectRecommendations\": [string]}}",
        difficulty = request.difficulty(),
        progress = request.learning_progress(),
        interests = request.interests(),
    )
}

pub(super) fn tutor(request: &TutorRequest) -> String {
    format!(
        "Answer this learner's question clearly, with examples where useful:\n\
         {question}\n\n\
         Respond with JSON of the form: {{\"answer\": string, \"resources\": [string (url)]}}",
        question = request.question(),
    )
}

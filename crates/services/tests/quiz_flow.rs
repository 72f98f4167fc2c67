use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use learnflow_core::model::{CompletedCourse, CourseId, ProgressDocument, QuizQuestion, UserId};
use learnflow_core::time::fixed_clock;
use services::{
    AppConfig, AppServices, CompletionOutcome, ContentGenerationService, ProgressError, QuizPhase,
    QuizSessionError,
};
use storage::repository::{AppendOutcome, ProgressRepository, Storage, StorageError};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn arithmetic() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::new("2+2?", ["3", "4", "5", "6"], "4", "basic arithmetic").unwrap(),
        QuizQuestion::new("3+3?", ["5", "6", "7", "8"], "6", "still arithmetic").unwrap(),
    ]
}

async fn settle() {
    // Paused clock: sleeping lets every ready task run before time moves.
    tokio::time::sleep(Duration::from_millis(1)).await;
}

async fn signed_in(id: &str) -> AppServices {
    let services = AppServices::in_memory(&AppConfig::default(), fixed_clock());
    services.identity().sign_in(UserId::new(id).unwrap());
    settle().await;
    services
}

/// Reads an empty document and rejects every write.
struct ReadOnlyRepository;

#[async_trait]
impl ProgressRepository for ReadOnlyRepository {
    async fn get_progress(&self, _user: &UserId) -> Result<Option<ProgressDocument>, StorageError> {
        Ok(None)
    }

    async fn append_course(
        &self,
        _user: &UserId,
        _course: &CompletedCourse,
    ) -> Result<AppendOutcome, StorageError> {
        Err(StorageError::Connection("read-only replica".into()))
    }
}

#[tokio::test(start_paused = true)]
async fn finished_course_quiz_is_recorded() {
    init_tracing();
    let services = signed_in("learner-1").await;

    let course = CourseId::new("JavaScript").unwrap();
    let mut quiz = services
        .start_course_quiz(course.clone(), arithmetic())
        .unwrap();
    let runner = quiz.runner();

    let feedback = runner.submit_answer("4").unwrap();
    assert!(feedback.correct);
    assert_eq!(feedback.explanation, "basic arithmetic");
    assert!(runner.submit_answer("3").is_none());

    tokio::time::sleep(services.feedback_delay() + Duration::from_millis(10)).await;
    assert_eq!(runner.phase(), QuizPhase::Answering);
    assert_eq!(runner.current_index(), 1);

    runner.submit_answer("7");
    let outcome = quiz.completion().await.expect("quiz finished");
    assert_eq!(outcome.unwrap(), CompletionOutcome::Recorded);
    assert_eq!(quiz.runner().phase(), QuizPhase::Finished);

    let progress = services.progress();
    assert!(progress.is_course_completed(&course));
    assert_eq!(progress.average_score(), 50.0);
    assert_eq!(progress.current_user(), Some(UserId::new("learner-1").unwrap()));
}

#[tokio::test(start_paused = true)]
async fn single_question_quiz_scores_full_marks() {
    init_tracing();
    let services = signed_in("learner-2").await;

    let course = CourseId::roadmap("Become a web developer");
    let mut questions = arithmetic();
    questions.truncate(1);
    let mut quiz = services.start_course_quiz(course.clone(), questions).unwrap();
    quiz.runner().submit_answer("4");
    quiz.completion().await.expect("quiz finished").unwrap();

    let completed = services.progress().completed_courses();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].course_id, course);
    assert_eq!(completed[0].score.value(), 100.0);
}

#[tokio::test(start_paused = true)]
async fn repeated_course_quiz_keeps_first_result() {
    init_tracing();
    let services = signed_in("learner-5").await;
    let course = CourseId::new("React").unwrap();

    let attempts = [
        ("4", CompletionOutcome::Recorded),
        ("3", CompletionOutcome::AlreadyCompleted),
    ];
    for (answer, expected) in attempts {
        let mut questions = arithmetic();
        questions.truncate(1);
        let mut quiz = services.start_course_quiz(course.clone(), questions).unwrap();
        quiz.runner().submit_answer(answer);
        assert_eq!(quiz.completion().await.expect("quiz finished").unwrap(), expected);
    }
    assert_eq!(services.progress().average_score(), 100.0);
}

#[tokio::test(start_paused = true)]
async fn failed_write_reaches_the_caller() {
    init_tracing();
    let storage = Storage {
        progress: Arc::new(ReadOnlyRepository),
    };
    let services = AppServices::from_storage(
        storage,
        ContentGenerationService::disabled(),
        &AppConfig::default(),
        fixed_clock(),
    );
    services.identity().sign_in(UserId::new("learner-6").unwrap());
    settle().await;

    let course = CourseId::new("Docker").unwrap();
    let mut questions = arithmetic();
    questions.truncate(1);
    let mut quiz = services.start_course_quiz(course.clone(), questions).unwrap();
    quiz.runner().submit_answer("4");

    let result = quiz.completion().await.expect("quiz finished");
    assert!(matches!(result, Err(ProgressError::Write(_))));
    assert!(!services.progress().is_course_completed(&course));
    assert!(quiz.completion().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn practice_quiz_records_nothing_and_restarts() {
    init_tracing();
    let services = signed_in("learner-3").await;

    let runner = services.start_practice_quiz(arithmetic()).unwrap();
    for answer in ["4", "6"] {
        runner.submit_answer(answer);
        tokio::time::sleep(services.feedback_delay() * 2).await;
    }
    assert_eq!(runner.phase(), QuizPhase::Finished);
    assert_eq!(runner.score_percent(), 100.0);
    assert!(services.progress().completed_courses().is_empty());

    runner.restart().unwrap();
    assert_eq!(runner.phase(), QuizPhase::Answering);
    assert_eq!(runner.progress().answered, 0);
}

#[tokio::test(start_paused = true)]
async fn quiz_torn_down_mid_feedback_records_nothing() {
    init_tracing();
    let services = signed_in("learner-4").await;

    let mut questions = arithmetic();
    questions.truncate(1);
    let quiz = services
        .start_course_quiz(CourseId::new("SQL").unwrap(), questions)
        .unwrap();
    quiz.runner().submit_answer("4");
    drop(quiz);
    tokio::time::sleep(services.feedback_delay() * 2).await;

    assert!(services.progress().completed_courses().is_empty());
}

#[tokio::test]
async fn empty_quiz_cannot_start() {
    let services = AppServices::in_memory(&AppConfig::default(), fixed_clock());
    assert!(matches!(
        services.start_practice_quiz(Vec::new()),
        Err(QuizSessionError::Empty)
    ));
}

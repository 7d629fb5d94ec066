//! End-to-end session tests against the shipped question bank.
//!
//! These drive the engine through the presenter trait the same way the
//! terminal does, then feed the saved log back into training.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use adaptest_classifier::bootstrap::bootstrap_examples;
use adaptest_classifier::history::load_history_dir;
use adaptest_classifier::mock::ScriptedPredictor;
use adaptest_classifier::training::{collect_examples, train, TrainingOptions};
use adaptest_core::engine::{run_session, AssessmentEngine, EngineConfig};
use adaptest_core::model::{QuestionBank, Tier};
use adaptest_core::parser::parse_question_bank;
use adaptest_core::report::{session_log_path, SessionLog, SessionSummary};
use adaptest_core::scoring::possible_points;
use adaptest_core::selection::EndReason;
use adaptest_core::session::{AnswerFeedback, PresentedQuestion};
use adaptest_core::traits::{Presenter, PresenterEvent};
use async_trait::async_trait;

fn general_bank() -> QuestionBank {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../question-banks/general.json");
    parse_question_bank(&path).unwrap()
}

/// Answers every question, right or wrong depending on `correct`.
struct Student {
    correct: bool,
    served: Vec<(u32, Tier)>,
    finished: Option<SessionSummary>,
}

impl Student {
    fn new(correct: bool) -> Self {
        Self {
            correct,
            served: Vec::new(),
            finished: None,
        }
    }
}

#[async_trait]
impl Presenter for Student {
    async fn ask(&mut self, question: &PresentedQuestion) -> anyhow::Result<PresenterEvent> {
        self.served.push((question.question.id, question.difficulty()));
        let index = question
            .choices
            .iter()
            .position(|c| question.question.is_correct(c) == self.correct)
            .unwrap();
        Ok(PresenterEvent::Selected(index))
    }

    fn on_answer(&mut self, _feedback: &AnswerFeedback) {}

    fn on_finish(&mut self, summary: &SessionSummary) {
        self.finished = Some(summary.clone());
    }
}

fn config(seed: u64) -> EngineConfig {
    EngineConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

#[tokio::test]
async fn strong_student_climbs_to_high() {
    let bank = general_bank();
    let predictor = Arc::new(ScriptedPredictor::repeating(Tier::High));
    let mut engine = AssessmentEngine::new(&bank, predictor.clone(), "strong", config(1));
    let mut student = Student::new(true);

    let summary = run_session(&mut engine, &mut student).await.unwrap();

    // One MEDIUM opener, then every HIGH question, then the HIGH pool runs dry.
    assert_eq!(summary.answered, 7);
    assert_eq!(summary.correct_count, 7);
    assert_eq!(summary.end_reason, EndReason::PredictedTierExhausted(Tier::High));
    assert_eq!(summary.determined, Some(Tier::High));
    assert_eq!(summary.score, 3 + 6 * 5);
    assert_eq!(summary.possible_score, 2 + 6 * 3);
    assert_eq!(student.served[0].1, Tier::Medium);
    assert!(student.served[1..].iter().all(|&(_, t)| t == Tier::High));
    assert_eq!(predictor.call_count(), 7);
    assert_eq!(student.finished.unwrap().id, summary.id);
}

#[tokio::test]
async fn weak_student_drops_to_low() {
    let bank = general_bank();
    let predictor = Arc::new(ScriptedPredictor::repeating(Tier::Low));
    let mut engine = AssessmentEngine::new(&bank, predictor, "weak", config(2));
    let mut student = Student::new(false);

    let summary = run_session(&mut engine, &mut student).await.unwrap();

    assert_eq!(summary.answered, 7);
    assert_eq!(summary.correct_count, 0);
    assert_eq!(summary.score, -1 + 6 * -2);
    assert_eq!(summary.end_reason, EndReason::PredictedTierExhausted(Tier::Low));

    let records = engine.state().records();
    assert_eq!(records[0].predicted_difficulty, Tier::Medium);
    assert!(records[1..].iter().all(|r| r.predicted_difficulty == Tier::Low));
}

#[tokio::test]
async fn trained_tree_session_invariants() {
    let bank = general_bank();
    let outcome = train(&bootstrap_examples(), &TrainingOptions::default()).unwrap();
    let mut engine = AssessmentEngine::new(&bank, Arc::new(outcome.model), "tree", config(3));
    let mut student = Student::new(true);

    let summary = run_session(&mut engine, &mut student).await.unwrap();
    assert!(summary.end_reason.is_completed());
    assert_eq!(summary.predictor, "decision_tree");

    let records = engine.state().records();
    assert_eq!(records.len() as u32, summary.answered);

    let mut seen = HashSet::new();
    for r in records {
        assert!(seen.insert((r.question_id, r.difficulty)), "question served twice");
    }

    let expected: u32 = records.iter().map(|r| possible_points(r.difficulty)).sum();
    assert_eq!(summary.possible_score, expected);
}

#[tokio::test]
async fn saved_session_feeds_training() {
    let bank = general_bank();
    let predictor = Arc::new(ScriptedPredictor::new([Tier::Low, Tier::Medium, Tier::High, Tier::High]));
    let mut engine = AssessmentEngine::new(&bank, predictor, "Round Trip", config(4));
    let mut student = Student::new(true);

    // The script runs out on the fifth answer.
    let err = run_session(&mut engine, &mut student).await.unwrap_err();
    assert!(err.to_string().contains("predictor failed"));
    let summary = student.finished.clone().unwrap();
    assert_eq!(summary.end_reason, EndReason::PredictorFailed);
    assert_eq!(summary.answered, 5);

    let dir = tempfile::tempdir().unwrap();
    let path = session_log_path(dir.path(), "Round Trip");
    engine.log().save_json(&path).unwrap();
    assert!(path.ends_with("round_trip_answers.json"));

    let reloaded = SessionLog::load_json(&path).unwrap();
    assert_eq!(reloaded.records, engine.state().records());

    let history = load_history_dir(dir.path()).unwrap();
    assert_eq!(history.examples.len(), 5);
    assert!(history.examples.iter().any(|e| e.label == Tier::Medium));

    let collected = collect_examples(Some(dir.path()), true).unwrap();
    assert_eq!(collected.examples.len(), 17);
    assert_eq!(collected.from_history(), 5);
    let outcome = train(&collected.examples, &TrainingOptions::default()).unwrap();
    assert_eq!(outcome.examples, 17);
    assert_eq!(outcome.evaluation.unwrap().test_samples, 4);
}

#[tokio::test]
async fn empty_bank_session() {
    let bank = QuestionBank::default();
    let predictor = Arc::new(ScriptedPredictor::repeating(Tier::Medium));
    let mut engine = AssessmentEngine::new(&bank, predictor.clone(), "nobody", config(5));
    let mut student = Student::new(true);

    let summary = run_session(&mut engine, &mut student).await.unwrap();
    assert_eq!(summary.end_reason, EndReason::EmptyBank);
    assert_eq!(summary.answered, 0);
    assert!(student.served.is_empty());
    assert_eq!(predictor.call_count(), 0);
}

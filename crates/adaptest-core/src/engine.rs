//! Adaptive assessment engine.
//!
//! Serves questions, scores answers, asks the predictor for the next tier,
//! and drives a [`Presenter`] through a whole session.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::error::QuizError;
use crate::features;
use crate::model::{AnswerRecord, Outcome, QuestionBank};
use crate::pool::QuestionPools;
use crate::report::{SessionLog, SessionSummary};
use crate::selection::{self, EndReason};
use crate::session::{display_choices, AnswerFeedback, PresentedQuestion, SessionState, DEFAULT_CHOICES_SHOWN};
use crate::traits::{DifficultyPredictor, Presenter, PresenterEvent};

/// Configuration for the assessment engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Choices put on screen per question.
    pub choices_shown: usize,
    /// Consecutive equal predictions needed to call the ability determined.
    pub stability_window: usize,
    /// Seed for pool and choice shuffling. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            choices_shown: DEFAULT_CHOICES_SHOWN,
            stability_window: 3,
            seed: None,
        }
    }
}

/// Runs one adaptive session over a question bank.
pub struct AssessmentEngine {
    state: SessionState,
    predictor: Arc<dyn DifficultyPredictor>,
    rng: StdRng,
    config: EngineConfig,
    id: Uuid,
    test_taker: String,
    started_at: DateTime<Utc>,
}

impl AssessmentEngine {
    /// Shuffle the bank into pools and prepare an empty session.
    pub fn new(
        bank: &QuestionBank,
        predictor: Arc<dyn DifficultyPredictor>,
        test_taker: impl Into<String>,
        config: EngineConfig,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let pools = QuestionPools::shuffled(bank, &mut rng);
        Self::with_pools(pools, predictor, test_taker, config, rng)
    }

    /// Start from pre-built pools (e.g. unshuffled, for tests).
    pub fn with_pools(
        pools: QuestionPools,
        predictor: Arc<dyn DifficultyPredictor>,
        test_taker: impl Into<String>,
        config: EngineConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            state: SessionState::new(pools),
            predictor,
            rng,
            config,
            id: Uuid::new_v4(),
            test_taker: test_taker.into(),
            started_at: Utc::now(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&PresentedQuestion> {
        self.state.current()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Serve the first question, cascading MEDIUM → LOW → HIGH.
    ///
    /// Returns `None` and finishes the session if the bank is empty.
    /// Calling it again after the first question is served is a no-op.
    pub fn start(&mut self) -> Option<&PresentedQuestion> {
        if self.state.is_finished() {
            return None;
        }
        if self.state.questions_served() == 0 {
            tracing::info!("session {} started for {}", self.id, self.test_taker);
            match selection::select_initial(self.state.pools_mut()) {
                Some(question) => {
                    let choices = display_choices(&question, self.config.choices_shown, &mut self.rng);
                    self.state.serve(question, choices);
                }
                None => {
                    self.state.finish(EndReason::EmptyBank);
                    return None;
                }
            }
        }
        self.state.current()
    }

    /// Answer the displayed question, timing it from when it was shown.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerFeedback, QuizError> {
        let elapsed = self
            .state
            .current()
            .map(PresentedQuestion::elapsed_secs)
            .unwrap_or_default();
        self.answer_timed(choice, elapsed)
    }

    /// Answer the displayed question with an externally measured time.
    pub fn answer_timed(&mut self, choice: usize, time_taken: f64) -> Result<AnswerFeedback, QuizError> {
        if self.state.is_finished() {
            return Err(QuizError::SessionFinished);
        }
        let current = self.state.current().ok_or(QuizError::NoActiveQuestion)?;
        let selected = current
            .choices
            .get(choice)
            .cloned()
            .ok_or(QuizError::InvalidChoice {
                index: choice,
                available: current.choices.len(),
            })?;
        let outcome = Outcome::from(current.question.is_correct(&selected));
        let features = features::encode(outcome, current.difficulty(), time_taken)?;

        let Some(presented) = self.state.take_current() else {
            return Err(QuizError::NoActiveQuestion);
        };
        let question = presented.question;

        tracing::info!(
            "question {} ({}): answered '{}', expected '{}', {outcome} in {time_taken:.2}s",
            question.id,
            question.difficulty,
            selected,
            question.correct_answer
        );

        let score_delta = self.state.scoreboard_mut().apply(question.difficulty, outcome);
        let record = AnswerRecord {
            question_id: question.id,
            selected_answer: selected,
            result: outcome,
            difficulty: question.difficulty,
            time_taken,
            predicted_difficulty: presented.predicted_for,
        };
        self.state.push_record(record.clone());

        let mut next_tier = None;
        if self.state.pools().all_empty() {
            self.state.finish(EndReason::BankExhausted);
        } else {
            let tier = match self.predictor.predict(&features) {
                Ok(tier) => tier,
                Err(e) => {
                    tracing::error!("predictor '{}' failed: {e}", self.predictor.name());
                    self.state.finish(EndReason::PredictorFailed);
                    return Err(e.into());
                }
            };
            tracing::debug!("predicted next tier: {tier}");
            self.state.record_prediction(tier);
            next_tier = Some(tier);

            match selection::select_next(self.state.pools_mut(), tier) {
                Some(next) => {
                    let choices = display_choices(&next, self.config.choices_shown, &mut self.rng);
                    self.state.serve(next, choices);
                }
                None => self.state.finish(EndReason::PredictedTierExhausted(tier)),
            }
        }

        let board = self.state.scoreboard();
        Ok(AnswerFeedback {
            record,
            correct_answer: question.correct_answer,
            score_delta,
            score: board.score,
            possible_score: board.possible_score,
            next_tier,
            end: self.state.end_reason(),
        })
    }

    /// Quit the session, discarding unfinished answers.
    pub fn abort(&mut self) {
        tracing::info!("session {} aborted by {}", self.id, self.test_taker);
        self.state.discard();
    }

    /// Snapshot of the session for reporting.
    pub fn summary(&self) -> SessionSummary {
        let board = self.state.scoreboard();
        SessionSummary {
            id: self.id,
            test_taker: self.test_taker.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            score: board.score,
            possible_score: board.possible_score,
            correct_count: board.correct_count,
            answered: board.answered,
            total_questions: self.state.total_questions(),
            end_reason: self.state.end_reason().unwrap_or(EndReason::InProgress),
            determined: self.state.determined_tier(self.config.stability_window),
            predictor: self.predictor.name().to_string(),
        }
    }

    /// The answer log accumulated so far.
    pub fn log(&self) -> SessionLog {
        SessionLog::new(self.state.records().to_vec())
    }
}

/// Drive a session to its end through a presenter.
///
/// Invalid choice indices are reported back and the same question is asked
/// again. Predictor and presenter failures stop the session and are returned
/// as errors, after the presenter has been shown what was answered up to
/// that point. Answers given before the failure are kept.
pub async fn run_session(engine: &mut AssessmentEngine, presenter: &mut dyn Presenter) -> Result<SessionSummary> {
    engine.start();

    while let Some(question) = engine.current().cloned() {
        let event = match presenter.ask(&question).await {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("presenter failed on question {}: {e:#}", question.number);
                engine.state.finish(EndReason::PresenterFailed);
                presenter.on_finish(&engine.summary());
                return Err(e);
            }
        };
        match event {
            PresenterEvent::Abort => {
                engine.abort();
                break;
            }
            PresenterEvent::Selected(index) => match engine.answer(index) {
                Ok(feedback) => presenter.on_answer(&feedback),
                Err(QuizError::InvalidChoice { index, available }) => {
                    presenter.on_invalid_choice(index, available);
                }
                Err(e) => {
                    presenter.on_finish(&engine.summary());
                    return Err(e.into());
                }
            },
        }
    }

    let summary = engine.summary();
    presenter.on_finish(&summary);
    Ok(summary)
}

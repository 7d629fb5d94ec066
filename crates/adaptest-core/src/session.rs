//! Session state: pools, answer history, score, and the latest prediction.
//!
//! The engine is the only writer. Presenters read [`PresentedQuestion`]
//! and report an index; nothing here knows how questions are displayed.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{AnswerRecord, AnswerValue, Question, Tier};
use crate::pool::QuestionPools;
use crate::scoring::Scoreboard;
use crate::selection::EndReason;

/// Number of answer choices put on screen.
pub const DEFAULT_CHOICES_SHOWN: usize = 4;

/// The question currently on screen.
#[derive(Debug, Clone)]
pub struct PresentedQuestion {
    /// 1-based position in the session.
    pub number: u32,
    /// The drawn question.
    pub question: Question,
    /// Displayed choices, in display order.
    pub choices: Vec<AnswerValue>,
    /// Tier the predictor chose before this question was served.
    pub predicted_for: Tier,
    /// When the question was put on screen.
    pub served_at: Instant,
}

impl PresentedQuestion {
    pub fn prompt(&self) -> &str {
        &self.question.prompt
    }

    pub fn difficulty(&self) -> Tier {
        self.question.difficulty
    }

    /// Wall-clock seconds since the question was displayed.
    pub fn elapsed_secs(&self) -> f64 {
        self.served_at.elapsed().as_secs_f64()
    }
}

/// Result of one answered question, for the presenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    /// The appended log entry.
    pub record: AnswerRecord,
    /// The right answer, for display after a miss.
    pub correct_answer: AnswerValue,
    /// Change applied to the score.
    pub score_delta: i64,
    /// Score after this answer.
    pub score: i64,
    /// Possible score after this answer.
    pub possible_score: u32,
    /// Tier predicted for the next question, if the predictor was consulted.
    pub next_tier: Option<Tier>,
    /// Set when this answer ended the session.
    pub end: Option<EndReason>,
}

/// Pick the choices to display: up to `count` candidates, always including
/// the correct answer, in random order.
pub fn display_choices<R: Rng + ?Sized>(
    question: &Question,
    count: usize,
    rng: &mut R,
) -> Vec<AnswerValue> {
    let mut distractors: Vec<AnswerValue> = question
        .choices
        .iter()
        .filter(|c| !question.is_correct(c))
        .cloned()
        .collect();
    distractors.shuffle(rng);
    distractors.truncate(count.saturating_sub(1));

    let mut shown = distractors;
    shown.push(question.correct_answer.clone());
    shown.shuffle(rng);
    shown
}

/// Mutable aggregate for one test run.
#[derive(Debug)]
pub struct SessionState {
    pools: QuestionPools,
    records: Vec<AnswerRecord>,
    scoreboard: Scoreboard,
    predicted_difficulty: Tier,
    predictions: Vec<Tier>,
    questions_served: u32,
    total_questions: usize,
    current: Option<PresentedQuestion>,
    end: Option<EndReason>,
}

impl SessionState {
    pub fn new(pools: QuestionPools) -> Self {
        let total_questions = pools.remaining();
        Self {
            pools,
            records: Vec::new(),
            scoreboard: Scoreboard::default(),
            predicted_difficulty: Tier::SEED,
            predictions: Vec::new(),
            questions_served: 0,
            total_questions,
            current: None,
            end: None,
        }
    }

    pub fn pools(&self) -> &QuestionPools {
        &self.pools
    }

    pub(crate) fn pools_mut(&mut self) -> &mut QuestionPools {
        &mut self.pools
    }

    /// Answer log in the order answers were given.
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub(crate) fn scoreboard_mut(&mut self) -> &mut Scoreboard {
        &mut self.scoreboard
    }

    /// Latest prediction, or the seed tier before any answer.
    pub fn predicted_difficulty(&self) -> Tier {
        self.predicted_difficulty
    }

    /// Every tier the predictor returned, oldest first.
    pub fn predictions(&self) -> &[Tier] {
        &self.predictions
    }

    pub fn questions_served(&self) -> u32 {
        self.questions_served
    }

    /// Bank size when the session started.
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn current(&self) -> Option<&PresentedQuestion> {
        self.current.as_ref()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    /// The tier the last `window` predictions agree on, if they do.
    pub fn determined_tier(&self, window: usize) -> Option<Tier> {
        if window == 0 || self.predictions.len() < window {
            return None;
        }
        let recent = &self.predictions[self.predictions.len() - window..];
        let first = recent[0];
        recent.iter().all(|&t| t == first).then_some(first)
    }

    pub(crate) fn serve(&mut self, question: Question, choices: Vec<AnswerValue>) -> &PresentedQuestion {
        self.questions_served += 1;
        tracing::debug!(
            "serving question {} (id {}, {})",
            self.questions_served,
            question.id,
            question.difficulty
        );
        self.current.insert(PresentedQuestion {
            number: self.questions_served,
            question,
            choices,
            predicted_for: self.predicted_difficulty,
            served_at: Instant::now(),
        })
    }

    pub(crate) fn take_current(&mut self) -> Option<PresentedQuestion> {
        self.current.take()
    }

    pub(crate) fn push_record(&mut self, record: AnswerRecord) {
        self.records.push(record);
    }

    pub(crate) fn record_prediction(&mut self, tier: Tier) {
        self.predicted_difficulty = tier;
        self.predictions.push(tier);
    }

    pub(crate) fn finish(&mut self, reason: EndReason) {
        if self.end.is_none() {
            tracing::info!("session finished: {reason}");
            self.current = None;
            self.end = Some(reason);
        }
    }

    /// Drop everything answered so far without scoring it.
    pub(crate) fn discard(&mut self) {
        self.records.clear();
        self.scoreboard = Scoreboard::default();
        self.predictions.clear();
        self.finish(EndReason::Aborted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionBank;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(choices: Vec<AnswerValue>, correct: AnswerValue) -> Question {
        Question {
            id: 1,
            difficulty: Tier::Medium,
            prompt: "pick".into(),
            correct_answer: correct,
            choices,
        }
    }

    #[test]
    fn display_choices_always_contains_answer() {
        let choices: Vec<AnswerValue> = (1..=8).map(AnswerValue::Integer).collect();
        let q = question(choices, AnswerValue::Integer(6));
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let shown = display_choices(&q, 4, &mut rng);
            assert_eq!(shown.len(), 4);
            assert_eq!(shown.iter().filter(|c| q.is_correct(c)).count(), 1);
        }
    }

    #[test]
    fn display_choices_with_exactly_four() {
        let choices: Vec<AnswerValue> = ["a", "b", "c", "d"].into_iter().map(AnswerValue::from).collect();
        let q = question(choices.clone(), AnswerValue::from("c"));
        let mut shown = display_choices(&q, 4, &mut StdRng::seed_from_u64(1));
        shown.sort_by_key(|c| c.to_string());
        assert_eq!(shown, choices);
    }

    #[test]
    fn determined_tier_needs_stable_window() {
        let mut state = SessionState::new(QuestionPools::ordered(&QuestionBank::default()));
        assert_eq!(state.predicted_difficulty(), Tier::Medium);
        assert_eq!(state.determined_tier(3), None);

        state.record_prediction(Tier::Low);
        state.record_prediction(Tier::High);
        state.record_prediction(Tier::High);
        assert_eq!(state.determined_tier(3), None);
        assert_eq!(state.determined_tier(2), Some(Tier::High));

        state.record_prediction(Tier::High);
        assert_eq!(state.determined_tier(3), Some(Tier::High));
        assert_eq!(state.determined_tier(0), None);
    }

    #[test]
    fn finish_is_sticky() {
        let mut state = SessionState::new(QuestionPools::default());
        state.finish(EndReason::BankExhausted);
        state.finish(EndReason::Aborted);
        assert_eq!(state.end_reason(), Some(EndReason::BankExhausted));
    }
}

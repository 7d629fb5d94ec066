//! Destructively consumed per-tier question pools.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::EmptyPoolError;
use crate::model::{Question, QuestionBank, Tier};

/// Three shuffled FIFO queues, one per tier. Never refilled.
#[derive(Debug, Clone, Default)]
pub struct QuestionPools {
    low: VecDeque<Question>,
    medium: VecDeque<Question>,
    high: VecDeque<Question>,
}

impl QuestionPools {
    /// Build pools from a bank, shuffling each tier independently.
    pub fn shuffled<R: Rng + ?Sized>(bank: &QuestionBank, rng: &mut R) -> Self {
        let mut shuffle = |questions: &[Question]| {
            let mut v = questions.to_vec();
            v.shuffle(&mut *rng);
            VecDeque::from(v)
        };
        Self {
            low: shuffle(&bank.low),
            medium: shuffle(&bank.medium),
            high: shuffle(&bank.high),
        }
    }

    /// Build pools that keep the bank's order.
    pub fn ordered(bank: &QuestionBank) -> Self {
        Self {
            low: bank.low.iter().cloned().collect(),
            medium: bank.medium.iter().cloned().collect(),
            high: bank.high.iter().cloned().collect(),
        }
    }

    fn queue(&self, tier: Tier) -> &VecDeque<Question> {
        match tier {
            Tier::Low => &self.low,
            Tier::Medium => &self.medium,
            Tier::High => &self.high,
        }
    }

    fn queue_mut(&mut self, tier: Tier) -> &mut VecDeque<Question> {
        match tier {
            Tier::Low => &mut self.low,
            Tier::Medium => &mut self.medium,
            Tier::High => &mut self.high,
        }
    }

    /// Remove and return the head of `tier`.
    pub fn take_next(&mut self, tier: Tier) -> Result<Question, EmptyPoolError> {
        self.queue_mut(tier).pop_front().ok_or(EmptyPoolError(tier))
    }

    pub fn is_empty(&self, tier: Tier) -> bool {
        self.queue(tier).is_empty()
    }

    pub fn len(&self, tier: Tier) -> usize {
        self.queue(tier).len()
    }

    /// Questions left across all tiers.
    pub fn remaining(&self) -> usize {
        Tier::ALL.iter().map(|&t| self.len(t)).sum()
    }

    pub fn all_empty(&self) -> bool {
        self.remaining() == 0
    }
}

//! adaptest-core — Adaptive assessment engine, data model, and scoring.
//!
//! This crate defines the question bank model, the answer feature codec,
//! the selection and scoring rules, and the engine that ties them to a
//! pluggable difficulty predictor.

pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod parser;
pub mod pool;
pub mod report;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod statistics;
pub mod traits;

//! Deterministic scoring engine for spoken interview answers.
//!
//! The engine takes a transcript, the question it answers, the spoken
//! duration, and an optional short history of prior attempts, and returns a
//! multi-dimensional [`scoring::ScoringResult`]. Everything is heuristic and
//! lexicon-based: no model calls, no I/O, no shared state. Identical inputs
//! always produce identical output, so the engine can be invoked from any
//! number of handler tasks without coordination.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;

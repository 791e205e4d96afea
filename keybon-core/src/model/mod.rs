//! Word-level n-gram model and everything that reads or writes it.
//!
//! - The model itself (`NGramModel`)
//! - Sliding-window training (`trainer`)
//! - Fingerprint-based deduplicated training (`dedup`)
//! - Per-context continuation tables (`State`)
//! - Word generation (`Generator`)

/// Sequence generation over a borrowed, read-only model.
///
/// Owns the rolling history and the random source; several generators can
/// share one model.
pub mod generator;

/// The n-gram model (`order >= 1`).
///
/// Holds the transition table and ingested fingerprints, enforces their
/// invariants, and exposes training, merging and persistence entry points.
pub mod ngram_model;

/// Sliding-window training over a token sequence.
pub mod trainer;

/// Content fingerprinting and the scratch-then-commit deduplicated training.
pub mod dedup;

/// Next-word selection strategies.
pub mod sampling;

/// Continuations observed after a single context, with weighted sampling.
/// This module is not exposed publicly.
pub(crate) mod state;

use std::io;

use thiserror::Error;

/// Errors returned by every fallible operation of the crate.
///
/// No operation logs and drops an error internally, and a failing call never
/// leaves a model partially updated.
#[derive(Debug, Error)]
pub enum Error {
	/// Invalid construction parameter (order < 1, bad settings value).
	#[error("invalid configuration: {0}")]
	Config(String),

	/// The model has no recorded transitions.
	#[error("model is empty")]
	EmptyModel,

	/// `Generator::next` was called before `Generator::start`.
	#[error("generator is not started")]
	NotStarted,

	/// The current context was never followed by any token in the corpus.
	#[error("no next words after '{context}'")]
	NoContinuation { context: String },

	/// The submitted content was already ingested; the model is unchanged.
	#[error("duplicate content: already processed ({fingerprint})")]
	DuplicateContent { fingerprint: String },

	/// A persisted model could not be decompressed, decoded or validated.
	#[error("corrupt model: {0}")]
	CorruptModel(String),

	/// A transition was recorded with a malformed history or word.
	#[error("invalid context: {0}")]
	InvalidContext(String),

	/// Two models of different order cannot be merged.
	#[error("order mismatch: self={expected}, other={found}")]
	OrderMismatch { expected: usize, found: usize },

	#[error(transparent)]
	Io(#[from] io::Error),

	/// The model could not be serialized while saving.
	#[error("failed to encode model: {0}")]
	Encode(#[from] serde_json::Error),
}

/// Shorthand used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ngram_model::NGramModel;
use super::sampling::Sampling;
use super::trainer::{CONTEXT_SEPARATOR, join_context};
use crate::error::{Error, Result};

/// Word generator over a trained [`NGramModel`].
///
/// # Responsibilities
/// - Keep its own rolling history of the last generated words
/// - Pick each next word among the continuations of that history
///
/// The model is only borrowed, so several generators can share one trained
/// model, each with an independent history. The generator never mutates the
/// model.
///
/// Generation is endless: the caller decides how many words to pull, either
/// with [`next_word`](Self::next_word) or through the `Iterator` impl
/// (`generator.take(n)`).
#[derive(Debug)]
pub struct Generator<'a, R = StdRng> {
	model: &'a NGramModel,
	rng: R,
	sampling: Sampling,
	history: VecDeque<String>,
	started: bool,
}

impl<'a> Generator<'a, StdRng> {
	/// Creates a generator whose randomness is seeded from the OS.
	pub fn from_entropy(model: &'a NGramModel) -> Self {
		Self::new(model, StdRng::from_os_rng())
	}

	/// Creates a reproducible generator: same model and seed, same words.
	pub fn seeded(model: &'a NGramModel, seed: u64) -> Self {
		Self::new(model, StdRng::seed_from_u64(seed))
	}
}

impl<'a, R: Rng> Generator<'a, R> {
	pub fn new(model: &'a NGramModel, rng: R) -> Self {
		Self {
			model,
			rng,
			sampling: Sampling::default(),
			history: VecDeque::new(),
			started: false,
		}
	}

	/// Replaces the sampling strategy (weighted by default).
	pub fn with_sampling(mut self, sampling: Sampling) -> Self {
		self.sampling = sampling;
		self
	}

	pub fn sampling(&self) -> Sampling {
		self.sampling
	}

	pub fn model(&self) -> &'a NGramModel {
		self.model
	}

	/// Current history, oldest word first.
	pub fn history(&self) -> impl Iterator<Item = &str> {
		self.history.iter().map(String::as_str)
	}

	pub fn is_started(&self) -> bool {
		self.started
	}

	/// Starts (or restarts) generation from the model's smallest context key.
	///
	/// # Errors
	/// Returns [`Error::EmptyModel`] if the model has no transitions.
	pub fn start(&mut self) -> Result<()> {
		let seed = self.model.seed_context().ok_or(Error::EmptyModel)?;
		self.history = seed.split(CONTEXT_SEPARATOR).map(str::to_owned).collect();
		self.started = true;
		Ok(())
	}

	/// Starts (or restarts) generation from a custom history.
	///
	/// The history does not have to be a recorded context; if it is not,
	/// the first call to `next_word` reports [`Error::NoContinuation`].
	///
	/// # Errors
	/// - [`Error::EmptyModel`] if the model has no transitions.
	/// - [`Error::InvalidContext`] if `history` is empty, longer than the
	///   model order, or holds something other than single words.
	pub fn start_from<S: AsRef<str>>(&mut self, history: &[S]) -> Result<()> {
		if self.model.is_empty() {
			return Err(Error::EmptyModel);
		}
		if history.is_empty() || history.len() > self.model.order() {
			return Err(Error::InvalidContext(format!(
				"seed must hold between 1 and {} words, got {}",
				self.model.order(),
				history.len()
			)));
		}
		let words: Vec<&str> = history.iter().map(|w| w.as_ref()).collect();
		if let Some(bad) = words.iter().find(|w| w.is_empty() || w.chars().any(char::is_whitespace)) {
			return Err(Error::InvalidContext(format!("'{bad}' is not a single word")));
		}

		self.history = words.into_iter().map(str::to_owned).collect();
		self.started = true;
		Ok(())
	}

	/// Produces the next word and slides the history.
	///
	/// # Errors
	/// - [`Error::EmptyModel`] if the model has no transitions.
	/// - [`Error::NotStarted`] before [`start`](Self::start).
	/// - [`Error::NoContinuation`] if the current history was never followed
	///   by any word; the history is left as is.
	pub fn next_word(&mut self) -> Result<String> {
		if self.model.is_empty() {
			return Err(Error::EmptyModel);
		}
		if !self.started {
			return Err(Error::NotStarted);
		}

		let context = join_context(self.history());
		let next = self
			.model
			.state(&context)
			.and_then(|state| state.predict(&mut self.rng, self.sampling))
			.ok_or(Error::NoContinuation { context })?
			.to_owned();

		self.history.pop_front();
		self.history.push_back(next.clone());
		Ok(next)
	}

	/// Pulls `words` words and joins them with single spaces.
	///
	/// Stops at the first error; the words produced before it are lost but
	/// the history has advanced past them.
	pub fn passage(&mut self, words: usize) -> Result<String> {
		let words = self.by_ref().take(words).collect::<Result<Vec<_>>>()?;
		Ok(words.join(" "))
	}
}

impl<R: Rng> Iterator for Generator<'_, R> {
	type Item = Result<String>;

	/// Never returns `None`; errors are yielded as items.
	fn next(&mut self) -> Option<Self::Item> {
		Some(self.next_word())
	}
}

use std::collections::{HashMap, VecDeque};
use std::io;

use log::debug;

use super::ngram_model::NGramModel;
use super::state::State;
use crate::error::Result;

/// Separator between the tokens of a context key.
pub const CONTEXT_SEPARATOR: char = ' ';

/// Joins tokens into a context key.
pub fn join_context<'a, I>(tokens: I) -> String
where
	I: IntoIterator<Item = &'a str>,
{
	let mut key = String::new();
	for token in tokens {
		if !key.is_empty() {
			key.push(CONTEXT_SEPARATOR);
		}
		key.push_str(token);
	}
	key
}

/// Scratch transition table filled by one training call.
///
/// Counting happens here, never in the live model, so the model only
/// changes once the whole token stream was read successfully.
#[derive(Debug, Default)]
pub(crate) struct Batch {
	pub(crate) states: HashMap<String, State>,
	pub(crate) tokens: usize,
}

impl Batch {
	pub(crate) fn transitions(&self) -> u64 {
		self.states.values().map(State::total).fold(0, u64::saturating_add)
	}
}

/// Sliding-window trainer.
///
/// Keeps the `order` most recent tokens. Once the window is full, every new
/// token is recorded as a continuation of the window, then the window slides.
#[derive(Debug)]
pub(crate) struct Trainer {
	order: usize,
	window: VecDeque<String>,
}

impl Trainer {
	pub(crate) fn new(order: usize) -> Self {
		Self { order, window: VecDeque::new() }
	}

	/// Tokens currently held by the window, oldest first.
	pub(crate) fn window(&self) -> impl Iterator<Item = &str> {
		self.window.iter().map(String::as_str)
	}

	fn feed(&mut self, token: String, batch: &mut Batch) {
		batch.tokens += 1;
		if self.window.len() == self.order {
			let key = join_context(self.window());
			batch.states.entry(key).or_default().add_transition(&token);
			self.window.pop_front();
		}
		self.window.push_back(token);
	}

	/// Counts every transition of `tokens` into a fresh batch.
	///
	/// Stops at the first read error; the partial batch is dropped.
	pub(crate) fn count<I>(mut self, tokens: I) -> io::Result<Batch>
	where
		I: IntoIterator<Item = io::Result<String>>,
	{
		let mut batch = Batch::default();
		for token in tokens {
			self.feed(token?, &mut batch);
		}
		Ok(batch)
	}
}

/// Trains `model` on a token sequence.
///
/// Sequences shorter than `order + 1` tokens record nothing. Counts add up
/// across calls. A read error leaves the model untouched.
pub fn ingest<I>(model: &mut NGramModel, tokens: I) -> Result<()>
where
	I: IntoIterator<Item = io::Result<String>>,
{
	let batch = Trainer::new(model.order()).count(tokens)?;
	debug!(
		"Counted {} transitions over {} tokens",
		batch.transitions(),
		batch.tokens
	);
	model.absorb(batch);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokens(words: &[&str]) -> Vec<io::Result<String>> {
		words.iter().map(|w| Ok(w.to_string())).collect()
	}

	#[test]
	fn join_context_uses_single_spaces() {
		assert_eq!(join_context(["the", "cat"]), "the cat");
		assert_eq!(join_context(["solo"]), "solo");
		assert_eq!(join_context(Vec::<&str>::new()), "");
	}

	#[test]
	fn window_warms_up_before_recording() {
		let batch = Trainer::new(3).count(tokens(&["a", "b", "c"])).unwrap();
		assert!(batch.states.is_empty());
		assert_eq!(batch.tokens, 3);

		let batch = Trainer::new(3).count(tokens(&["a", "b", "c", "d"])).unwrap();
		assert_eq!(batch.states.len(), 1);
		assert_eq!(batch.states["a b c"].count("d"), 1);
	}

	#[test]
	fn window_slides() {
		let mut trainer = Trainer::new(2);
		let mut batch = Batch::default();
		for word in ["x", "y", "z"] {
			trainer.feed(word.to_owned(), &mut batch);
		}
		assert_eq!(trainer.window().collect::<Vec<_>>(), ["y", "z"]);
		assert_eq!(batch.transitions(), 1);
	}

	#[test]
	fn scenario_contexts() {
		let mut model = NGramModel::new(2).unwrap();
		ingest(&mut model, tokens(&["the", "cat", "sat", "on", "the", "mat"])).unwrap();

		assert_eq!(model.context_count(), 4);
		assert_eq!(model.count("the cat", "sat"), 1);
		assert_eq!(model.count("cat sat", "on"), 1);
		assert_eq!(model.count("sat on", "the"), 1);
		assert_eq!(model.count("on the", "mat"), 1);
		assert_eq!(model.transition_total(), 4);
	}

	#[test]
	fn order_one_counts_bigrams() {
		let mut model = NGramModel::new(1).unwrap();
		ingest(&mut model, tokens(&["a", "b", "a", "b", "a"])).unwrap();
		assert_eq!(model.count("a", "b"), 2);
		assert_eq!(model.count("b", "a"), 2);
		assert_eq!(model.transition_total(), 4);
	}

	#[test]
	fn counts_accumulate_across_calls() {
		let mut model = NGramModel::new(1).unwrap();
		ingest(&mut model, tokens(&["a", "b"])).unwrap();
		ingest(&mut model, tokens(&["a", "b"])).unwrap();
		assert_eq!(model.count("a", "b"), 2);
	}

	#[test]
	fn window_does_not_carry_over_between_calls() {
		let mut model = NGramModel::new(1).unwrap();
		ingest(&mut model, tokens(&["a"])).unwrap();
		ingest(&mut model, tokens(&["b"])).unwrap();
		assert!(model.is_empty());
	}

	#[test]
	fn huge_order_records_nothing() {
		let mut model = NGramModel::new(usize::MAX).unwrap();
		ingest(&mut model, tokens(&["a", "b", "c"])).unwrap();
		assert!(model.is_empty());
	}

	#[test]
	fn read_error_leaves_model_untouched() {
		let mut model = NGramModel::new(1).unwrap();
		ingest(&mut model, tokens(&["a", "b"])).unwrap();
		let before = model.clone();

		let failing = vec![
			Ok("b".to_owned()),
			Ok("c".to_owned()),
			Err(io::Error::other("disk gone")),
		];
		assert!(ingest(&mut model, failing).is_err());
		assert_eq!(model, before);
	}
}

use std::collections::{BTreeSet, HashMap};
use std::io::{Read, Write};

use log::debug;

use super::dedup;
use super::state::State;
use super::trainer::{self, Batch, CONTEXT_SEPARATOR, join_context};
use crate::codec;
use crate::error::{Error, Result};
use crate::tokenizer::TextScanner;

/// Represents a word-level n-gram model.
///
/// The `NGramModel` maps a context (up to `order` words joined by a single
/// space) to the words observed right after it, with their counts, and
/// remembers the fingerprint of every corpus ingested through
/// [`ingest_deduped`](Self::ingest_deduped).
///
/// # Responsibilities
/// - Accumulate transition counts from training text
/// - Refuse to count the same corpus twice
/// - Serve read-only lookups to generators
/// - Merge with another model of the same order
///
/// # Invariants
/// - `order` is always >= 1 and never changes
/// - Each context key holds between 1 and `order` words
/// - All transition counts are >= 1
/// - Counts saturate at `u64::MAX` instead of wrapping
/// - Fingerprints are only ever added
///
/// Equality compares order, transitions and fingerprints, independently of
/// any iteration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NGramModel {
	/// Maximum number of words used as context
	order: usize,

	/// Mapping from a context key to its continuations
	states: HashMap<String, State>,

	/// SHA-256 (hex) of every deduplicated corpus
	fingerprints: BTreeSet<String>,
}

impl NGramModel {
	/// Creates an empty model of the given order.
	///
	/// # Errors
	/// Returns [`Error::Config`] if `order < 1`.
	pub fn new(order: usize) -> Result<Self> {
		if order < 1 {
			return Err(Error::Config("order must be greater than 0".to_owned()));
		}
		Ok(Self { order, states: HashMap::new(), fingerprints: BTreeSet::new() })
	}

	/// Rebuilds a model from its parts, checking every invariant.
	///
	/// Used by the codec; any violation is reported as the message of the
	/// returned error.
	pub(crate) fn from_parts<S, F>(order: usize, states: S, fingerprints: F) -> std::result::Result<Self, String>
	where
		S: IntoIterator<Item = (String, State)>,
		F: IntoIterator<Item = String>,
	{
		if order < 1 {
			return Err(format!("order must be greater than 0, got {order}"));
		}

		let mut model = Self { order, states: HashMap::new(), fingerprints: BTreeSet::new() };
		for (key, state) in states {
			if state.is_empty() {
				return Err(format!("context '{key}' has no continuations"));
			}
			let words = context_words(&key).ok_or_else(|| format!("malformed context '{key}'"))?;
			if words > order {
				return Err(format!("context '{key}' is longer than order {order}"));
			}
			if let Some((next, _)) = state.iter().find(|(next, _)| !is_word(next)) {
				return Err(format!("malformed continuation '{next}' after '{key}'"));
			}
			if state.checked_total().is_none() {
				return Err(format!("counts after '{key}' overflow"));
			}
			model.states.insert(key, state);
		}
		for fingerprint in fingerprints {
			if !dedup::is_fingerprint(&fingerprint) {
				return Err(format!("malformed fingerprint '{fingerprint}'"));
			}
			model.fingerprints.insert(fingerprint);
		}
		Ok(model)
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// An empty model has no transitions, i.e. it is untrained.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Number of distinct contexts.
	pub fn context_count(&self) -> usize {
		self.states.len()
	}

	/// Sum of every transition count.
	pub fn transition_total(&self) -> u64 {
		self.states.values().map(State::total).fold(0, u64::saturating_add)
	}

	/// How many times `next` followed `context`.
	pub fn count(&self, context: &str, next: &str) -> u64 {
		self.states.get(context).map_or(0, |state| state.count(next))
	}

	/// Continuations of `context`, sorted by word.
	pub fn continuations(&self, context: &str) -> Option<impl Iterator<Item = (&str, u64)>> {
		self.states.get(context).map(State::iter)
	}

	pub(crate) fn state(&self, context: &str) -> Option<&State> {
		self.states.get(context)
	}

	/// Context keys, in no particular order.
	pub fn contexts(&self) -> impl Iterator<Item = &str> {
		self.states.keys().map(String::as_str)
	}

	/// `(context, state)` pairs sorted by context.
	pub(crate) fn sorted_states(&self) -> Vec<(&str, &State)> {
		let mut states: Vec<_> = self.states.iter().map(|(k, s)| (k.as_str(), s)).collect();
		states.sort_unstable_by(|a, b| a.0.cmp(b.0));
		states
	}

	/// Lexicographically smallest context key, the deterministic starting
	/// point of generation. `None` when the model is empty.
	pub fn seed_context(&self) -> Option<&str> {
		self.states.keys().min().map(String::as_str)
	}

	/// Ingested fingerprints, sorted.
	pub fn fingerprints(&self) -> impl Iterator<Item = &str> {
		self.fingerprints.iter().map(String::as_str)
	}

	pub fn has_fingerprint(&self, fingerprint: &str) -> bool {
		self.fingerprints.contains(fingerprint)
	}

	pub(crate) fn record_fingerprint(&mut self, fingerprint: String) {
		self.fingerprints.insert(fingerprint);
	}

	/// Commits a scratch batch into the live table.
	pub(crate) fn absorb(&mut self, batch: Batch) {
		for (key, state) in batch.states {
			match self.states.get_mut(&key) {
				Some(existing) => existing.merge(&state),
				None => {
					if !state.is_empty() {
						self.states.insert(key, state);
					}
				}
			}
		}
	}

	/// Records one transition `history -> word`.
	///
	/// # Errors
	/// Returns [`Error::InvalidContext`] if `history` is empty or longer than
	/// the order, or if any word is empty or contains whitespace.
	pub fn add<S: AsRef<str>>(&mut self, history: &[S], word: &str) -> Result<()> {
		if history.is_empty() {
			return Err(Error::InvalidContext("history is empty".to_owned()));
		}
		if history.len() > self.order {
			return Err(Error::InvalidContext(format!(
				"history of {} words is longer than order {}",
				history.len(),
				self.order
			)));
		}
		if let Some(bad) = history.iter().map(|w| w.as_ref()).chain([word]).find(|w| !is_word(w)) {
			return Err(Error::InvalidContext(format!("'{bad}' is not a single word")));
		}

		let key = join_context(history.iter().map(|w| w.as_ref()));
		self.states.entry(key).or_default().add_transition(word);
		Ok(())
	}

	/// Trains the model on raw text, using the default [`TextScanner`].
	///
	/// Nothing prevents the same text from being counted twice; see
	/// [`ingest_deduped`](Self::ingest_deduped).
	pub fn ingest<R: Read>(&mut self, reader: R) -> Result<()> {
		self.ingest_with(&TextScanner::new(), reader)
	}

	pub fn ingest_with<R: Read>(&mut self, scanner: &TextScanner, reader: R) -> Result<()> {
		trainer::ingest(self, scanner.scan(reader))
	}

	/// Trains the model on raw text at most once per distinct content.
	///
	/// # Errors
	/// Returns [`Error::DuplicateContent`] if the same bytes were already
	/// ingested; the model is left unchanged.
	pub fn ingest_deduped<R: Read>(&mut self, reader: R) -> Result<()> {
		self.ingest_deduped_with(&TextScanner::new(), reader)
	}

	pub fn ingest_deduped_with<R: Read>(&mut self, scanner: &TextScanner, reader: R) -> Result<()> {
		dedup::ingest_deduped(self, scanner, reader)
	}

	/// Merges another model into this one.
	///
	/// Counts of matching transitions are summed, fingerprints are united.
	///
	/// # Errors
	/// Returns [`Error::OrderMismatch`] if the orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order {
			return Err(Error::OrderMismatch { expected: self.order, found: other.order });
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state);
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}
		self.fingerprints.extend(other.fingerprints.iter().cloned());
		debug!("Merged {} contexts into model", other.states.len());

		Ok(())
	}

	/// Writes the compressed model to `writer`.
	pub fn save<W: Write>(&self, writer: W) -> Result<()> {
		codec::save(self, writer)
	}

	/// Reads a model previously written by [`save`](Self::save).
	///
	/// # Errors
	/// Returns [`Error::CorruptModel`] on any decompression, decoding or
	/// validation failure.
	pub fn load<R: Read>(reader: R) -> Result<Self> {
		codec::load(reader)
	}
}

/// A word is non-empty and carries no whitespace.
fn is_word(word: &str) -> bool {
	!word.is_empty() && !word.chars().any(char::is_whitespace)
}

/// Number of words in a well-formed context key.
fn context_words(key: &str) -> Option<usize> {
	let mut words = 0;
	for word in key.split(CONTEXT_SEPARATOR) {
		if !is_word(word) {
			return None;
		}
		words += 1;
	}
	Some(words)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn order_must_be_positive() {
		assert!(matches!(NGramModel::new(0), Err(Error::Config(_))));
		let model = NGramModel::new(3).unwrap();
		assert_eq!(model.order(), 3);
		assert!(model.is_empty());
		assert_eq!(model.seed_context(), None);
	}

	#[test]
	fn add_validates_history() {
		let mut model = NGramModel::new(2).unwrap();
		let empty: [&str; 0] = [];
		assert!(matches!(model.add(&empty, "x"), Err(Error::InvalidContext(_))));
		assert!(matches!(model.add(&["a", "b", "c"], "x"), Err(Error::InvalidContext(_))));
		assert!(matches!(model.add(&["a b"], "x"), Err(Error::InvalidContext(_))));
		assert!(matches!(model.add(&["a"], ""), Err(Error::InvalidContext(_))));
		assert!(model.is_empty());

		model.add(&["a"], "x").unwrap();
		model.add(&["a", "b"], "x").unwrap();
		model.add(&["a", "b"], "x").unwrap();
		assert_eq!(model.count("a", "x"), 1);
		assert_eq!(model.count("a b", "x"), 2);
	}

	#[test]
	fn seed_context_is_smallest_key() {
		let mut model = NGramModel::new(2).unwrap();
		model.ingest(&b"the cat sat on the mat"[..]).unwrap();
		assert_eq!(model.seed_context(), Some("cat sat"));
	}

	#[test]
	fn continuations_are_sorted() {
		let mut model = NGramModel::new(1).unwrap();
		model.ingest(&b"a z a b a m a b"[..]).unwrap();
		let next: Vec<_> = model.continuations("a").unwrap().collect();
		assert_eq!(next, [("b", 2), ("m", 1), ("z", 1)]);
		assert!(model.continuations("q").is_none());
	}

	#[test]
	fn merge_sums_counts_and_fingerprints() {
		let mut left = NGramModel::new(1).unwrap();
		left.ingest_deduped(&b"a b"[..]).unwrap();
		let mut right = NGramModel::new(1).unwrap();
		right.ingest_deduped(&b"a b c"[..]).unwrap();

		left.merge(&right).unwrap();
		assert_eq!(left.count("a", "b"), 2);
		assert_eq!(left.count("b", "c"), 1);
		assert_eq!(left.fingerprints().count(), 2);
	}

	#[test]
	fn merge_rejects_other_orders() {
		let mut left = NGramModel::new(1).unwrap();
		left.ingest(&b"a b"[..]).unwrap();
		let before = left.clone();
		let right = NGramModel::new(2).unwrap();
		assert!(matches!(
			left.merge(&right),
			Err(Error::OrderMismatch { expected: 1, found: 2 })
		));
		assert_eq!(left, before);
	}

	#[test]
	fn equality_ignores_insertion_order() {
		let mut left = NGramModel::new(1).unwrap();
		left.add(&["a"], "b").unwrap();
		left.add(&["c"], "d").unwrap();
		let mut right = NGramModel::new(1).unwrap();
		right.add(&["c"], "d").unwrap();
		right.add(&["a"], "b").unwrap();
		assert_eq!(left, right);

		right.add(&["a"], "b").unwrap();
		assert_ne!(left, right);
	}

	#[test]
	fn from_parts_checks_invariants() {
		let state = |w: &str| [(w.to_owned(), 1u64)].into_iter().collect::<State>();
		let none = Vec::<String>::new;
		let no_states = Vec::<(String, State)>::new;

		assert!(NGramModel::from_parts(0, no_states(), none()).is_err());
		assert!(NGramModel::from_parts(1, vec![("a b".to_owned(), state("c"))], none()).is_err());
		assert!(NGramModel::from_parts(2, vec![("a  b".to_owned(), state("c"))], none()).is_err());
		assert!(NGramModel::from_parts(2, vec![("".to_owned(), state("c"))], none()).is_err());
		assert!(NGramModel::from_parts(2, vec![("a".to_owned(), State::new())], none()).is_err());
		assert!(NGramModel::from_parts(2, vec![("a".to_owned(), state("c d"))], none()).is_err());
		assert!(NGramModel::from_parts(2, no_states(), vec!["nothex".to_owned()]).is_err());

		let model = NGramModel::from_parts(2, vec![("a b".to_owned(), state("c"))], none()).unwrap();
		assert_eq!(model.count("a b", "c"), 1);
	}
}

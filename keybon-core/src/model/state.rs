use std::collections::BTreeMap;

use rand::Rng;

use super::sampling::Sampling;

/// Represents a state in an n-gram model.
///
/// A `State` stores every token observed right after one context key,
/// together with how many times it was observed.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - Each occurrence count is strictly positive
/// - Counts and their total saturate at `u64::MAX`
/// - Transitions are kept sorted by token, which is the canonical order
///   used by sampling
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
	/// Example: { "cat" => 42, "dog" => 3 }
	transitions: BTreeMap<String, u64>,
}

impl State {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one more occurrence of `next`.
	pub fn add_transition(&mut self, next: &str) {
		self.add_occurrences(next, 1);
	}

	/// Adds `occurrence` observations of `next`. A zero count is ignored so
	/// no entry is ever stored with a zero count.
	pub fn add_occurrences(&mut self, next: &str, occurrence: u64) {
		if occurrence == 0 {
			return;
		}
		match self.transitions.get_mut(next) {
			Some(count) => *count = count.saturating_add(occurrence),
			None => {
				self.transitions.insert(next.to_owned(), occurrence);
			}
		}
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Occurrences of `next` after this state, 0 if never seen.
	pub fn count(&self, next: &str) -> u64 {
		self.transitions.get(next).copied().unwrap_or(0)
	}

	/// Sum of all occurrence counts, saturating at `u64::MAX`.
	pub fn total(&self) -> u64 {
		self.transitions.values().fold(0, |total, count| total.saturating_add(*count))
	}

	/// Exact sum of all occurrence counts, `None` if it does not fit a `u64`.
	pub fn checked_total(&self) -> Option<u64> {
		self.transitions.values().try_fold(0u64, |total, count| total.checked_add(*count))
	}

	/// Transitions in canonical (token-sorted) order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.transitions.iter().map(|(token, count)| (token.as_str(), *count))
	}

	/// Picks the next token.
	///
	/// Both strategies walk the transitions in token order, so a seeded
	/// `rng` always yields the same sequence.
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng>(&self, rng: &mut R, sampling: Sampling) -> Option<&str> {
		if self.transitions.is_empty() {
			return None;
		}

		match sampling {
			Sampling::Weighted => {
				let total = self.total();
				if total == 0 {
					return None;
				}

				// Cumulative subtraction selects the bucket holding `r`.
				// A saturated total only shrinks the range, a bucket is still found.
				let mut r = rng.random_range(0..total);
				for (next, occurrence) in &self.transitions {
					if r < *occurrence {
						return Some(next.as_str());
					}
					r -= occurrence;
				}
				None
			}
			Sampling::Uniform => {
				let index = rng.random_range(0..self.transitions.len());
				self.transitions.keys().nth(index).map(String::as_str)
			}
		}
	}

	/// Merges another state into this one, summing occurrence counts.
	pub fn merge(&mut self, other: &Self) {
		for (next, occurrence) in &other.transitions {
			self.add_occurrences(next, *occurrence);
		}
	}
}

impl FromIterator<(String, u64)> for State {
	fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
		let mut state = State::new();
		for (next, occurrence) in iter {
			state.add_occurrences(&next, occurrence);
		}
		state
	}
}

use serde::{Deserialize, Serialize};

/// Strategy used by the generator to pick the next token among the
/// continuations recorded for the current context.
///
/// # Variants
/// - `Weighted`: probability proportional to the recorded count (default).
/// - `Uniform`: every recorded continuation is equally likely, whatever
///   its count. Produces more varied, less corpus-like text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
	#[default]
	Weighted,
	Uniform,
}

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::io::{MODEL_EXTENSION, build_output_path};
use crate::model::sampling::Sampling;
use crate::tokenizer::ScannerConfig;

/// Settings for a program that trains a model and generates practice text.
///
/// Every field is optional in the JSON form; missing fields take the
/// defaults below.
///
/// ```json
/// {"order": 3, "length": 40, "sampling": "uniform", "seed": 7}
/// ```
///
/// # Invariants
/// - `order >= 1`
/// - `length >= 1`
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	/// N-gram order, used only when a new model is created.
	order: usize,

	/// Number of words to generate.
	length: usize,

	/// Lowercase words while training.
	pub lowercase: bool,

	/// Next-word selection strategy.
	pub sampling: Sampling,

	/// Fixed random seed for reproducible passages; entropy when `None`.
	pub seed: Option<u64>,

	/// Training corpus.
	pub corpus: PathBuf,

	/// Model file; defaults to the corpus path with the model extension.
	pub model: Option<PathBuf>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			order: 2,
			length: 25,
			lowercase: true,
			sampling: Sampling::Weighted,
			seed: None,
			corpus: PathBuf::from("./data/corpus.txt"),
			model: None,
		}
	}
}

impl Settings {
	/// Parses JSON settings and validates them.
	///
	/// # Errors
	/// Returns [`Error::Config`] for malformed JSON, anything but an object,
	/// unknown fields or out-of-range values.
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		let value: serde_json::Value = serde_json::from_reader(reader).map_err(|e| Error::Config(e.to_string()))?;
		// Derived sequence support would read `[]` as all defaults
		if !value.is_object() {
			return Err(Error::Config("settings must be a JSON object".to_owned()));
		}
		let settings: Settings = serde_json::from_value(value).map_err(|e| Error::Config(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Reads settings from a JSON file.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::from_reader(BufReader::new(File::open(path)?))
	}

	fn validate(&self) -> Result<()> {
		if self.order < 1 {
			return Err(Error::Config("order must be greater than 0".to_owned()));
		}
		if self.length < 1 {
			return Err(Error::Config("length must be greater than 0".to_owned()));
		}
		Ok(())
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Sets the n-gram order.
	///
	/// # Errors
	/// Returns an error if `order < 1`.
	pub fn set_order(&mut self, order: usize) -> Result<()> {
		if order < 1 {
			return Err(Error::Config("order must be greater than 0".to_owned()));
		}
		self.order = order;
		Ok(())
	}

	pub fn length(&self) -> usize {
		self.length
	}

	/// Sets the number of words to generate.
	///
	/// # Errors
	/// Returns an error if `length < 1`.
	pub fn set_length(&mut self, length: usize) -> Result<()> {
		if length < 1 {
			return Err(Error::Config("length must be greater than 0".to_owned()));
		}
		self.length = length;
		Ok(())
	}

	pub fn scanner_config(&self) -> ScannerConfig {
		ScannerConfig { lowercase: self.lowercase }
	}

	/// Model file to load from and save to.
	pub fn model_path(&self) -> Result<PathBuf> {
		match &self.model {
			Some(path) => Ok(path.clone()),
			None => Ok(build_output_path(&self.corpus, MODEL_EXTENSION)?),
		}
	}
}

//! Model persistence.
//!
//! A model is written as a JSON document
//!
//! ```json
//! {"order":2,"data":{"the cat":{"sat":1}},"hashes":["e3b0c442..."]}
//! ```
//!
//! compressed as a single zstd frame with a content checksum. Contexts,
//! words and fingerprints are written in sorted order, so saving the same
//! model always produces the same bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ngram_model::NGramModel;
use crate::model::state::State;

/// zstd level used when saving; 0 selects the library default.
pub const COMPRESSION_LEVEL: i32 = 0;

/// Borrowed view of a model, as written to disk.
#[derive(Serialize)]
struct ModelFileRef<'a> {
	order: usize,
	data: BTreeMap<&'a str, BTreeMap<&'a str, u64>>,
	hashes: Vec<&'a str>,
}

impl<'a> From<&'a NGramModel> for ModelFileRef<'a> {
	fn from(model: &'a NGramModel) -> Self {
		let data = model
			.sorted_states()
			.into_iter()
			.map(|(context, state)| (context, state.iter().collect()))
			.collect();
		Self {
			order: model.order(),
			data,
			hashes: model.fingerprints().collect(),
		}
	}
}

/// Owned model document, as read from disk.
///
/// `hashes` may be missing or `null` in files written before deduplication
/// existed.
#[derive(Deserialize)]
struct ModelFile {
	order: usize,
	data: BTreeMap<String, BTreeMap<String, u64>>,
	#[serde(default)]
	hashes: Option<BTreeSet<String>>,
}

impl ModelFile {
	/// Validates the document and builds the model it describes.
	fn into_model(self) -> std::result::Result<NGramModel, String> {
		let mut states: Vec<(String, State)> = Vec::with_capacity(self.data.len());
		for (context, next) in self.data {
			if let Some((word, _)) = next.iter().find(|(_, count)| **count == 0) {
				return Err(format!("zero count for '{word}' after '{context}'"));
			}
			states.push((context, next.into_iter().collect()));
		}
		NGramModel::from_parts(self.order, states, self.hashes.unwrap_or_default())
	}
}

/// Serializes `model` and writes it, compressed, to `writer`.
///
/// The compressor is finished and `writer` flushed before returning.
pub fn save<W: Write>(model: &NGramModel, writer: W) -> Result<()> {
	let file = ModelFileRef::from(model);
	// Encoded up front so sink failures surface as `Error::Io`
	let payload = serde_json::to_vec(&file)?;

	let mut encoder = zstd::stream::write::Encoder::new(writer, COMPRESSION_LEVEL)?;
	encoder.include_checksum(true)?;
	encoder.write_all(&payload)?;
	let mut writer = encoder.finish()?;
	writer.flush()?;

	debug!(
		"Saved model (order {}, {} contexts, {} fingerprints)",
		file.order,
		file.data.len(),
		file.hashes.len()
	);
	Ok(())
}

/// Reads a model written by [`save`].
///
/// # Errors
/// Every decompression, decoding or validation failure is reported as
/// [`Error::CorruptModel`].
pub fn load<R: Read>(reader: R) -> Result<NGramModel> {
	let decoder = zstd::stream::read::Decoder::new(reader)?;
	let file: ModelFile = serde_json::from_reader(decoder).map_err(|e| Error::CorruptModel(e.to_string()))?;
	let model = file.into_model().map_err(Error::CorruptModel)?;

	info!(
		"Loaded model (order {}, {} contexts, {} transitions)",
		model.order(),
		model.context_count(),
		model.transition_total()
	);
	Ok(model)
}

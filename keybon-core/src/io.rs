use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::model::ngram_model::NGramModel;

/// Extension of saved model files.
pub const MODEL_EXTENSION: &str = "kbm";

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/input.txt` + `"kbm"` → `data/input.kbm`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Lists the model files (`.kbm`) directly inside a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_models<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension().is_some_and(|ext| ext == MODEL_EXTENSION) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

/// Saves `model` to `path`, creating or truncating the file.
pub fn save_to_path<P: AsRef<Path>>(model: &NGramModel, path: P) -> Result<()> {
	let path = path.as_ref();
	let file = File::create(path)?;
	model.save(BufWriter::new(file))?;
	debug!("Model written to {}", path.display());
	Ok(())
}

/// Loads a model from `path`.
///
/// A missing or unreadable file is an I/O error; unreadable content is a
/// corrupt model.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<NGramModel> {
	let file = File::open(path)?;
	NGramModel::load(BufReader::new(file))
}

/// Loads the model at `path` if the file exists, otherwise creates an empty
/// model of the given order.
///
/// The order of an existing model wins over `order`.
pub fn load_or_create<P: AsRef<Path>>(path: P, order: usize) -> Result<NGramModel> {
	let path = path.as_ref();
	if path.exists() {
		let model = load_from_path(path)?;
		if model.order() != order {
			debug!(
				"Keeping order {} of {} (requested {order})",
				model.order(),
				path.display()
			);
		}
		Ok(model)
	} else {
		NGramModel::new(order)
	}
}

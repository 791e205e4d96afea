use std::io::{self, BufRead, BufReader, Read};

/// Normalization options for [`TextScanner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScannerConfig {
	/// Lowercase every emitted word.
	pub lowercase: bool,
}

impl Default for ScannerConfig {
	fn default() -> Self {
		Self { lowercase: true }
	}
}

/// Splits a byte stream into normalized words.
///
/// A word is a maximal run of alphabetic characters (UTF-8 decoded). Every
/// other character, as well as any malformed UTF-8 sequence, acts as a
/// boundary and is discarded.
///
/// ```
/// use keybon_core::tokenizer::TextScanner;
///
/// let words: Vec<String> = TextScanner::new()
/// 	.scan("Hello, World! 42 times".as_bytes())
/// 	.collect::<Result<_, _>>()
/// 	.unwrap();
/// assert_eq!(words, ["hello", "world", "times"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TextScanner {
	config: ScannerConfig,
}

impl TextScanner {
	/// Creates a scanner with the default configuration (lowercasing on).
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: ScannerConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> ScannerConfig {
		self.config
	}

	pub fn set_config(&mut self, config: ScannerConfig) {
		self.config = config;
	}

	/// Wraps `reader` in a `BufReader` and returns the lazy word sequence.
	pub fn scan<R: Read>(&self, reader: R) -> Words<BufReader<R>> {
		self.scan_buffered(BufReader::new(reader))
	}

	/// Same as [`scan`](Self::scan) for a reader that is already buffered.
	pub fn scan_buffered<R: BufRead>(&self, reader: R) -> Words<R> {
		Words {
			reader,
			run: Run::new(self.config.lowercase),
			done: false,
		}
	}
}

/// Lazy sequence of words produced by [`TextScanner`].
///
/// Yields `Err` once if the underlying reader fails, then stops.
pub struct Words<R> {
	reader: R,
	run: Run,
	done: bool,
}

impl<R: BufRead> Iterator for Words<R> {
	type Item = io::Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		loop {
			let buf = match self.reader.fill_buf() {
				Ok(buf) => buf,
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => {
					self.done = true;
					return Some(Err(e));
				}
			};

			if buf.is_empty() {
				// A multi-byte sequence cut by EOF is a boundary
				self.done = true;
				self.run.pending.clear();
				return self.run.boundary().map(Ok);
			}

			let mut used = 0;
			let mut found = None;
			for &byte in buf {
				used += 1;
				if let Some(word) = self.run.push(byte) {
					found = Some(word);
					break;
				}
			}
			self.reader.consume(used);

			if let Some(word) = found {
				return Some(Ok(word));
			}
		}
	}
}

/// Word under construction plus an incomplete UTF-8 sequence, if any.
struct Run {
	lowercase: bool,
	word: String,
	pending: Vec<u8>,
}

impl Run {
	fn new(lowercase: bool) -> Self {
		Self { lowercase, word: String::new(), pending: Vec::with_capacity(4) }
	}

	/// Feeds one byte; returns the word it terminated, if any.
	fn push(&mut self, byte: u8) -> Option<String> {
		if self.pending.is_empty() {
			if byte.is_ascii() {
				if byte.is_ascii_alphabetic() {
					self.letter(byte as char);
					return None;
				}
				return self.boundary();
			}
			if sequence_len(byte).is_some() {
				self.pending.push(byte);
				return None;
			}
			// Stray continuation byte or invalid lead byte
			return self.boundary();
		}

		if byte & 0xC0 != 0x80 {
			// Sequence interrupted before completion
			self.pending.clear();
			let ended = self.boundary();
			let next = self.push(byte);
			return ended.or(next);
		}

		self.pending.push(byte);
		if Some(self.pending.len()) != sequence_len(self.pending[0]) {
			return None;
		}

		let decoded = std::str::from_utf8(&self.pending)
			.ok()
			.and_then(|s| s.chars().next());
		self.pending.clear();
		match decoded {
			Some(c) if c.is_alphabetic() => {
				self.letter(c);
				None
			}
			_ => self.boundary(),
		}
	}

	fn letter(&mut self, c: char) {
		if self.lowercase {
			self.word.extend(c.to_lowercase());
		} else {
			self.word.push(c);
		}
	}

	fn boundary(&mut self) -> Option<String> {
		if self.word.is_empty() {
			None
		} else {
			Some(std::mem::take(&mut self.word))
		}
	}
}

/// Length of the UTF-8 sequence introduced by a lead byte.
fn sequence_len(lead: u8) -> Option<usize> {
	match lead {
		0xC2..=0xDF => Some(2),
		0xE0..=0xEF => Some(3),
		0xF0..=0xF4 => Some(4),
		_ => None,
	}
}

use std::io::{self, Read};

use log::{debug, info};
use sha2::{Digest, Sha256};

use super::ngram_model::NGramModel;
use super::trainer::Trainer;
use crate::error::{Error, Result};
use crate::tokenizer::TextScanner;

/// Length of a hex-encoded content fingerprint.
pub const FINGERPRINT_LEN: usize = 64;

/// Reader tee: hashes every byte it hands to the consumer.
pub struct FingerprintReader<R> {
	inner: R,
	hasher: Sha256,
	bytes: u64,
}

impl<R: Read> FingerprintReader<R> {
	pub fn new(inner: R) -> Self {
		Self { inner, hasher: Sha256::new(), bytes: 0 }
	}

	/// Number of bytes hashed so far.
	pub fn bytes_read(&self) -> u64 {
		self.bytes
	}

	/// Hashes whatever the consumer left unread, then returns the
	/// lowercase hex digest of the whole stream.
	pub fn finish(mut self) -> io::Result<String> {
		io::copy(&mut self, &mut io::sink())?;
		Ok(format!("{:x}", self.hasher.finalize()))
	}
}

impl<R: Read> Read for FingerprintReader<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let n = self.inner.read(buf)?;
		self.hasher.update(&buf[..n]);
		self.bytes += n as u64;
		Ok(n)
	}
}

/// Fingerprint of an in-memory corpus, as recorded by [`ingest_deduped`].
pub fn fingerprint(content: &[u8]) -> String {
	format!("{:x}", Sha256::digest(content))
}

/// Whether `candidate` looks like a fingerprint (64 lowercase hex digits).
pub fn is_fingerprint(candidate: &str) -> bool {
	candidate.len() == FINGERPRINT_LEN
		&& candidate.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Trains `model` on `reader` unless the exact same bytes were ingested
/// before.
///
/// The corpus is hashed while it is tokenized and counted into a scratch
/// table. Only then is the fingerprint checked: a new one commits the counts
/// and is recorded, a known one drops the counts and returns
/// [`Error::DuplicateContent`]. Either way the model changes all at once or
/// not at all.
pub fn ingest_deduped<R: Read>(model: &mut NGramModel, scanner: &TextScanner, reader: R) -> Result<()> {
	let mut tee = FingerprintReader::new(reader);
	let batch = Trainer::new(model.order()).count(scanner.scan(&mut tee))?;
	let size = tee.bytes_read();
	let fingerprint = tee.finish()?;

	if model.has_fingerprint(&fingerprint) {
		debug!("Discarding {} counted transitions, content {fingerprint} already ingested", batch.transitions());
		return Err(Error::DuplicateContent { fingerprint });
	}

	info!(
		"Ingested {size} bytes ({} tokens, {} transitions) as {fingerprint}",
		batch.tokens,
		batch.transitions()
	);
	model.absorb(batch);
	model.record_fingerprint(fingerprint);
	Ok(())
}

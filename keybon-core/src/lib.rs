//! Word-level n-gram text generation for typing practice.
//!
//! This crate learns word-transition frequencies from training text and
//! generates new word sequences by sampling from them:
//! - Streaming tokenization of raw text into normalized words
//! - Sliding-window training, optionally deduplicated by content fingerprint
//! - Weighted (or uniform) sampling with an injected random source
//! - Compact, compressed persistence of trained models
//!
//! ```
//! use keybon_core::{Generator, NGramModel};
//!
//! let mut model = NGramModel::new(2)?;
//! model.ingest_deduped("the cat sat on the mat".as_bytes())?;
//!
//! let mut bytes = Vec::new();
//! model.save(&mut bytes)?;
//! let model = NGramModel::load(bytes.as_slice())?;
//!
//! let mut generator = Generator::seeded(&model, 7);
//! generator.start()?;
//! assert_eq!(generator.passage(3)?, "on the mat");
//! # Ok::<(), keybon_core::Error>(())
//! ```

/// Error type shared by every module.
pub mod error;

/// Raw text to normalized words.
pub mod tokenizer;

/// N-gram model, training and generation.
pub mod model;

/// Compressed, self-describing model persistence.
pub mod codec;

/// File helpers around the codec (model paths, listing, loading, saving).
pub mod io;

/// Settings for programs driving the model.
pub mod config;

pub use error::{Error, Result};
pub use model::generator::Generator;
pub use model::ngram_model::NGramModel;
pub use model::sampling::Sampling;
pub use tokenizer::{ScannerConfig, TextScanner};

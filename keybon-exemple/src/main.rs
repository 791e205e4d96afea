use std::fs::File;
use std::path::Path;

use keybon_core::config::Settings;
use keybon_core::io::{load_or_create, save_to_path};
use keybon_core::{Error, Generator, TextScanner};
use log::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows training and persistence details
    env_logger::init();

    // Optional settings file, every field has a default
    // (order, length, lowercase, sampling, seed, corpus, model)
    let settings_path = Path::new("./data/keybon.json");
    let settings = if settings_path.exists() {
        Settings::from_path(settings_path)?
    } else {
        Settings::default()
    };

    // Load the saved model if there is one, otherwise start from scratch.
    // The order only matters for a new model.
    let model_path = settings.model_path()?;
    let mut model = load_or_create(&model_path, settings.order())?;

    // Train on the corpus. Training twice on the same file is refused
    // and leaves the model unchanged, so running this again is harmless.
    if settings.corpus.exists() {
        let scanner = TextScanner::with_config(settings.scanner_config());
        match model.ingest_deduped_with(&scanner, File::open(&settings.corpus)?) {
            Ok(()) => info!("Trained on {}", settings.corpus.display()),
            Err(Error::DuplicateContent { .. }) => {
                info!("{} was already learned, skipping", settings.corpus.display())
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        warn!("No corpus at {}", settings.corpus.display());
    }

    save_to_path(&model, &model_path)?;

    // Several generators can share the same trained model
    let mut generator = match settings.seed {
        Some(seed) => Generator::seeded(&model, seed),
        None => Generator::from_entropy(&model),
    }
    .with_sampling(settings.sampling);

    // Start from the smallest context; restart whenever the chain reaches
    // a context that was only seen at the end of the corpus
    generator.start()?;
    let mut words = Vec::with_capacity(settings.length());
    while words.len() < settings.length() {
        match generator.next_word() {
            Ok(word) => words.push(word),
            Err(Error::NoContinuation { context }) => {
                info!("Dead end after '{context}', restarting");
                generator.start()?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("{}", words.join(" "));
    Ok(())
}

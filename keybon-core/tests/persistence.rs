use keybon_core::{Error, NGramModel};
use proptest::prelude::*;

fn model(order: usize, corpora: &[String], extra: &[(Vec<String>, String)]) -> NGramModel {
	let mut model = NGramModel::new(order).unwrap();
	for corpus in corpora {
		// Identical corpora are legitimately rejected the second time
		match model.ingest_deduped(corpus.as_bytes()) {
			Ok(()) | Err(Error::DuplicateContent { .. }) => {}
			Err(e) => panic!("unexpected error: {e}"),
		}
	}
	for (history, word) in extra {
		if history.len() <= order {
			model.add(history.as_slice(), word).unwrap();
		}
	}
	model
}

fn word() -> impl Strategy<Value = String> {
	"[a-zé]{1,6}"
}

proptest! {
	#[test]
	fn load_inverts_save(
		order in 1usize..4,
		corpora in prop::collection::vec("[a-z ]{0,40}", 0..4),
		extra in prop::collection::vec((prop::collection::vec(word(), 1..4), word()), 0..6),
	) {
		let model = model(order, &corpora, &extra);
		let mut bytes = Vec::new();
		model.save(&mut bytes).unwrap();
		let loaded = NGramModel::load(bytes.as_slice()).unwrap();
		prop_assert_eq!(loaded, model);
	}

	#[test]
	fn damaged_streams_never_panic(
		corpus in "[a-z ]{0,80}",
		position in any::<prop::sample::Index>(),
		mask in 1u8..=255,
		cut in any::<prop::sample::Index>(),
	) {
		let model = model(2, &[corpus], &[]);
		let mut bytes = Vec::new();
		model.save(&mut bytes).unwrap();

		let truncated = &bytes[..cut.index(bytes.len())];
		prop_assert!(matches!(NGramModel::load(truncated), Err(Error::CorruptModel(_))));

		let mut flipped = bytes.clone();
		flipped[position.index(bytes.len())] ^= mask;
		// A damaged stream either fails cleanly or, in the astronomically
		// unlikely checksum collision, still decodes into a valid model
		match NGramModel::load(flipped.as_slice()) {
			Ok(_) | Err(Error::CorruptModel(_)) => {}
			Err(e) => return Err(TestCaseError::fail(e.to_string())),
		}
	}
}

#[test]
fn empty_model_round_trips() {
	let model = NGramModel::new(1).unwrap();
	let mut bytes = Vec::new();
	model.save(&mut bytes).unwrap();
	assert_eq!(NGramModel::load(bytes.as_slice()).unwrap(), model);
}

#[test]
fn fingerprints_survive_reload_and_still_deduplicate() {
	let mut model = NGramModel::new(2).unwrap();
	model.ingest_deduped(&b"practice makes perfect practice makes progress"[..]).unwrap();

	let mut bytes = Vec::new();
	model.save(&mut bytes).unwrap();
	let mut reloaded = NGramModel::load(bytes.as_slice()).unwrap();

	let err = reloaded
		.ingest_deduped(&b"practice makes perfect practice makes progress"[..])
		.unwrap_err();
	assert!(matches!(err, Error::DuplicateContent { .. }));
	assert_eq!(reloaded, model);
}

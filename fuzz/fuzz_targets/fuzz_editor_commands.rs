//! Fuzz target for the editing controller.
//!
//! Decodes the input into a command stream with the same generator the
//! background fuzzer uses and checks editor invariants after each command.

#![no_main]

use libfuzzer_sys::fuzz_target;
use paraedit::editor::random_command;
use paraedit::{Document, Editor, EditorOptions, MonospaceMetrics};
use rand::SeedableRng;
use rand::rngs::StdRng;

fuzz_target!(|data: &[u8]| {
    let (seed, text) = match data.split_first_chunk::<8>() {
        Some((seed, rest)) => (u64::from_le_bytes(*seed), rest),
        None => return,
    };
    let Ok(doc) = Document::from_utf8(text) else {
        return;
    };
    let mut editor = Editor::with_metrics(
        doc,
        EditorOptions::default().viewport(200, 100),
        Box::new(MonospaceMetrics::new(8, 16)),
    );
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..200 {
        editor.dispatch(random_command(&mut rng));
        editor.assert_invariants();
    }
});

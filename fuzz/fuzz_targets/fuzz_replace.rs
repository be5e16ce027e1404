//! Fuzz target for document replace and undo.
//!
//! Applies arbitrary edits, including malformed UTF-8 and out-of-range
//! positions, and checks that undoing every accepted edit restores the
//! original bytes.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use paraedit::{Document, Pg, Range};

#[derive(Arbitrary, Debug)]
struct Edit {
    from: (u8, u8),
    to: (u8, u8),
    bytes: Vec<u8>,
}

#[derive(Arbitrary, Debug)]
struct Input {
    initial: String,
    edits: Vec<Edit>,
}

fn pg((pn, gp): (u8, u8)) -> Pg {
    Pg::new(i32::from(pn), i32::from(gp))
}

fuzz_target!(|input: Input| {
    let Ok(mut doc) = Document::from_utf8(input.initial.as_bytes()) else {
        return;
    };
    let original = doc.to_string();

    let mut accepted = 0;
    for edit in input.edits.iter().take(64) {
        let before = doc.to_string();
        match doc.replace(Range::new(pg(edit.from), pg(edit.to)), &edit.bytes) {
            Ok(x) => {
                accepted += 1;
                assert!(doc.text().contains(x.from) && doc.text().contains(x.to));
            }
            // Rejected edits never touch the text
            Err(_) => assert_eq!(doc.to_string(), before),
        }
    }

    assert_eq!(doc.undo_depth(), accepted);
    while doc.undo() {}
    assert_eq!(doc.to_string(), original);
});

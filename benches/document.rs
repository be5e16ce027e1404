//! Document and editor performance benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{Criterion, criterion_group, criterion_main};
use paraedit::{Document, Editor, EditorOptions, KeyCode, KeyEvent, KeyModifiers, Pg, Range};
use std::hint::black_box;

fn sample(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("line {i}: the quick brown fox jumps over the lazy dog"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn document_parse(c: &mut Criterion) {
    let small = sample(10);
    let large = sample(10_000);

    c.bench_function("document_parse_10_lines", |b| {
        b.iter(|| Document::parse(black_box(small.as_bytes())));
    });

    c.bench_function("document_parse_10k_lines", |b| {
        b.iter(|| Document::parse(black_box(large.as_bytes())));
    });
}

fn document_replace(c: &mut Criterion) {
    let text = sample(1_000);

    c.bench_function("document_insert_char", |b| {
        let mut doc = Document::from_utf8(text.as_bytes()).unwrap_or_default();
        let at = Range::caret(Pg::new(500, 10));
        b.iter(|| doc.replace(black_box(at), black_box(b"x")));
    });

    c.bench_function("document_insert_then_undo_paragraphs", |b| {
        let mut doc = Document::from_utf8(text.as_bytes()).unwrap_or_default();
        let at = Range::caret(Pg::new(10, 5));
        b.iter(|| {
            let _ = doc.replace(at, black_box(b"one\ntwo\nthree"));
            doc.undo()
        });
    });

    c.bench_function("document_save", |b| {
        let doc = Document::from_utf8(text.as_bytes()).unwrap_or_default();
        let mut buf = vec![0u8; text.len() + 1];
        b.iter(|| doc.save(Some(black_box(buf.as_mut_slice()))));
    });
}

fn editor_typing(c: &mut Criterion) {
    let text = sample(1_000);

    c.bench_function("editor_type_char", |b| {
        let doc = Document::from_utf8(text.as_bytes()).unwrap_or_default();
        let mut editor = Editor::new(doc, EditorOptions::default());
        editor.move_to(Pg::new(500, 0));
        b.iter(|| editor.character(black_box('x')));
    });

    c.bench_function("editor_page_down", |b| {
        let doc = Document::from_utf8(text.as_bytes()).unwrap_or_default();
        let mut editor = Editor::new(doc, EditorOptions::default());
        b.iter(|| {
            editor.key_pressed(KeyEvent::key(KeyCode::PageDown));
            if editor.selection().to == editor.document().text().end() {
                editor.key_home(KeyModifiers::CTRL);
            }
        });
    });
}

criterion_group!(benches, document_parse, document_replace, editor_typing);
criterion_main!(benches);

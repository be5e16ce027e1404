//! Snapshot tests for word-wrapped layout.
//!
//! Each snapshot lists one run per line as
//! `paragraph.run gp=<first glyph> px=<width> |<run text>|`.

mod common;

use paraedit::{LayoutCache, Mapper, MonospaceMetrics, Pr, Text, TextMeasure};

fn dump(source: &str, width: i32, metrics: &dyn TextMeasure) -> String {
    let text = Text::from_str(source);
    let mut cache = LayoutCache::new(text.np(), width);
    let mut scroll = Pr::default();
    let mut mapper = Mapper::new(&text, &mut cache, metrics, &mut scroll, 480);

    let mut lines = Vec::new();
    for pn in 0..text.np() {
        let s = text.paragraph(pn).as_str();
        for (rn, run) in mapper.runs(pn as i32).iter().enumerate() {
            lines.push(format!(
                "{pn}.{rn} gp={:<2} px={:<3} |{}|",
                run.gp,
                run.pixels,
                &s[run.bp..run.bp + run.bytes]
            ));
        }
    }
    lines.join("\n")
}

#[test]
fn test_wrap_prose_at_twenty_columns() {
    common::setup_test_logging();
    eprintln!("[TEST] Wrapping two paragraphs and a blank line at 160px");
    let metrics = MonospaceMetrics::new(8, 16);
    let out = dump(
        "The quick brown fox jumps over the lazy dog.\n\nSphinx of black quartz, judge my vow.",
        160,
        &metrics,
    );
    insta::assert_snapshot!(out, @r"
    0.0 gp=0  px=160 |The quick brown fox |
    0.1 gp=20 px=160 |jumps over the lazy |
    0.2 gp=40 px=32  |dog.|
    1.0 gp=0  px=0   ||
    2.0 gp=0  px=128 |Sphinx of black |
    2.1 gp=16 px=136 |quartz, judge my |
    2.2 gp=33 px=32  |vow.|
    ");
}

#[test]
fn test_wrap_wide_glyphs_without_spaces() {
    common::setup_test_logging();
    eprintln!("[TEST] Wrapping double-width glyphs at 40px");
    let metrics = MonospaceMetrics::new(8, 16);
    let out = dump("漢字かな交じり文", 40, &metrics);
    insta::assert_snapshot!(out, @r"
    0.0 gp=0  px=32  |漢字|
    0.1 gp=2  px=32  |かな|
    0.2 gp=4  px=32  |交じ|
    0.3 gp=6  px=32  |り文|
    ");
}

#[test]
fn test_glyph_wider_than_wrap_width_gets_own_run() {
    common::setup_test_logging();
    eprintln!("[TEST] A glyph wider than the wrap width still advances");
    let metrics = MonospaceMetrics::new(8, 16);
    let out = dump("漢a", 8, &metrics);
    insta::assert_snapshot!(out, @r"
    0.0 gp=0  px=16  |漢|
    0.1 gp=1  px=8   |a|
    ");
}

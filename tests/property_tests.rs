//! Property-based invariant tests for the screen engine.
//!
//! Verifies:
//! 1. Arbitrary byte streams never panic and keep the cursor inside the grid
//! 2. Splitting a stream at any point gives the same screen as feeding it whole
//! 3. `SGR 0` always restores the default pen
//! 4. Printing fewer runes than the width advances the cursor by the count
//! 5. Printing exactly the width sets pending wrap without moving rows
//! 6. History keeps at most its capacity, in push order

use mochi_screen::core::Glyph;
use mochi_screen::Terminal;
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

/// Bytes biased towards escape-sequence framing
fn arb_stream() -> impl Strategy<Value = Vec<u8>> {
    let byte = prop_oneof![
        4 => 0x20u8..0x7f,
        1 => Just(0x1bu8),
        1 => Just(b'['),
        1 => Just(b';'),
        1 => prop::sample::select(vec![b'\r', b'\n', b'\t', 0x08, 0x07]),
        1 => any::<u8>(),
    ];
    prop::collection::vec(byte, 0..512)
}

fn arb_sgr_code() -> impl Strategy<Value = u16> {
    prop_oneof![
        0u16..=9,
        21u16..=29,
        30u16..=49,
        90u16..=107,
        Just(38),
        Just(48),
        0u16..=300,
    ]
}

fn printable_line(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::char::range('a', 'z'), 1..max).prop_map(|v| v.into_iter().collect())
}

proptest! {
    #[test]
    fn arbitrary_input_keeps_cursor_in_bounds(data in arb_stream(), cols in 1usize..40, rows in 1usize..12) {
        let mut term = Terminal::new(cols, rows, 50).unwrap();
        term.feed(&data);
        prop_assert!(term.cursor().col < cols);
        prop_assert!(term.cursor().row < rows);
        prop_assert!(term.screen().history().len() <= 50);
    }

    #[test]
    fn split_feed_matches_whole_feed(data in arb_stream(), split in any::<prop::sample::Index>()) {
        let at = split.index(data.len() + 1);

        let mut whole = Terminal::new(20, 6, 20).unwrap();
        whole.feed(&data);

        let mut parts = Terminal::new(20, 6, 20).unwrap();
        parts.feed(&data[..at]);
        parts.feed(&data[at..]);

        prop_assert!(whole.snapshot().content_equals(&parts.snapshot()));
        prop_assert_eq!(whole.cursor(), parts.cursor());
    }

    #[test]
    fn sgr_reset_restores_default_pen(codes in prop::collection::vec(arb_sgr_code(), 1..12)) {
        let mut term = Terminal::new(10, 2, 0).unwrap();
        let params: Vec<String> = codes.iter().map(u16::to_string).collect();
        term.feed(format!("\x1b[{}m\x1b[0m", params.join(";")).as_bytes());
        prop_assert_eq!(term.cursor().pen, Glyph::default());
    }

    #[test]
    fn short_text_advances_cursor(text in printable_line(30)) {
        let mut term = Terminal::new(30, 3, 0).unwrap();
        term.feed(text.as_bytes());
        prop_assert_eq!(term.cursor().col, text.len());
        prop_assert!(!term.cursor().pending_wrap);
    }

    #[test]
    fn full_width_text_sets_pending_wrap(cols in 1usize..60) {
        let mut term = Terminal::new(cols, 3, 0).unwrap();
        term.feed("x".repeat(cols).as_bytes());
        prop_assert_eq!(term.cursor().row, 0);
        prop_assert_eq!(term.cursor().col, cols - 1);
        prop_assert!(term.cursor().pending_wrap);
    }

    #[test]
    fn history_is_bounded_and_ordered(capacity in 1usize..20, lines in 1usize..60) {
        let rows = 3;
        let mut term = Terminal::new(10, rows, capacity).unwrap();
        for i in 0..lines {
            term.feed(format!("{}\r\n", i).as_bytes());
        }

        let scrolled = (lines + 1).saturating_sub(rows);
        let kept = scrolled.min(capacity);
        prop_assert_eq!(term.screen().history().len(), kept);

        let texts: Vec<String> = term.screen().history().iter().map(|l| l.text()).collect();
        let expected: Vec<String> = (scrolled - kept..scrolled).map(|i| i.to_string()).collect();
        prop_assert_eq!(texts, expected);
    }
}

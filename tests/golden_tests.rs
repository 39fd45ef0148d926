//! Golden tests for the terminal parser and screen model
//!
//! These tests feed recorded byte streams through the full engine and
//! check the resulting screen state: text, colours, cursor and history.

use mochi_screen::core::{Color, Glyph, SelectionType, SnapMode, Snapshot};
use mochi_screen::parser::CSI_ARGS_MAX;
use mochi_screen::Terminal;

fn terminal(cols: usize, rows: usize) -> Terminal {
    Terminal::new(cols, rows, 1000).unwrap()
}

/// Get the text content of a view row
fn row_text(term: &Terminal, row: usize) -> String {
    term.line(row).map(|line| line.text()).unwrap_or_default()
}

fn cursor(term: &Terminal) -> (usize, usize) {
    (term.cursor().row, term.cursor().col)
}

#[test]
fn test_hello_world_colors() {
    let mut term = terminal(80, 24);
    term.feed(b"Hello\x1b[31mWorld\x1b[0m\n");

    assert_eq!(row_text(&term, 0), "HelloWorld");
    let line = term.line(0).unwrap();
    for col in 0..5 {
        assert_eq!(line.glyph(col).unwrap().fg, Color::Default);
    }
    for col in 5..10 {
        assert_eq!(line.glyph(col).unwrap().fg, Color::RED);
    }
    // LF keeps the column unless LNM is set
    assert_eq!(cursor(&term), (1, 10));
}

#[test]
fn test_hello_world_with_newline_mode() {
    let mut term = terminal(80, 24);
    term.feed(b"\x1b[20hHello\x1b[31mWorld\x1b[0m\n");
    assert_eq!(row_text(&term, 0), "HelloWorld");
    assert_eq!(cursor(&term), (1, 0));
}

#[test]
fn test_clear_and_home() {
    let mut term = terminal(80, 24);
    term.feed(b"some\r\ntext \x1b[44mwith background");
    term.feed(b"\x1b[0m\x1b[2J\x1b[H");

    for row in 0..24 {
        let line = term.line(row).unwrap();
        assert!(line.glyphs().iter().all(|g| *g == Glyph::default()), "row {} not blank", row);
    }
    assert_eq!(cursor(&term), (0, 0));
}

#[test]
fn test_clear_then_redraw_matches_fresh_screen() {
    let screen_content = b"\x1b[1;1Hfirst\x1b[2;3H\x1b[32msecond\x1b[0m\x1b[24;80HX";

    let mut used = terminal(80, 24);
    used.feed(b"\x1b[7mgarbage everywhere\r\n\x1b[0mmore\x1b[5;5Hstuff");
    used.feed(b"\x1b[2J");
    used.feed(screen_content);

    let mut fresh = terminal(80, 24);
    fresh.feed(screen_content);

    assert!(used.snapshot().content_equals(&fresh.snapshot()));
}

#[test]
fn test_history_after_thirty_lines() {
    let mut term = terminal(80, 24);
    for i in 0..30 {
        term.feed(format!("line{}\r\n", i).as_bytes());
    }

    // 30 newlines on 24 rows scroll 7 lines into history
    assert_eq!(term.screen().history().len(), 7);
    assert_eq!(row_text(&term, 0), "line7");

    // Oldest at the largest offset
    for i in 0..7 {
        let line = term.line_at(0, 7 - i).unwrap();
        assert_eq!(line.text(), format!("line{}", i));
    }
    // Scrolled fully back, the first rows show the first lines in order
    for i in 0..6 {
        assert_eq!(term.line_at(i, 7).unwrap().text(), format!("line{}", i));
    }
}

#[test]
fn test_history_capacity_evicts_oldest() {
    let mut term = Terminal::new(10, 2, 5).unwrap();
    for i in 0..10 {
        term.feed(format!("{}\r\n", i).as_bytes());
    }
    // 10 newlines on 2 rows: 9 scrolled off, 5 kept
    assert_eq!(term.screen().history().len(), 5);
    let kept: Vec<String> = term.screen().history().iter().map(|l| l.text()).collect();
    assert_eq!(kept, vec!["4", "5", "6", "7", "8"]);
}

#[test]
fn test_malformed_csi_leaves_grid_untouched() {
    let mut term = terminal(80, 24);
    term.feed(b"ok");
    let before = term.snapshot();

    let params = vec!["1"; CSI_ARGS_MAX + 4].join(";");
    term.feed(format!("\x1b[{}H", params).as_bytes());
    assert!(term.snapshot().content_equals(&before));
    assert_eq!(cursor(&term), (0, 2));

    term.feed(b"!");
    assert_eq!(row_text(&term, 0), "ok!");
}

#[test]
fn test_line_wrapping() {
    let mut term = terminal(80, 24);
    term.feed("A".repeat(80).as_bytes());
    assert_eq!(cursor(&term), (0, 79));
    assert!(term.cursor().pending_wrap);

    term.feed(b"BBBBB");
    assert_eq!(row_text(&term, 0).len(), 80);
    assert_eq!(row_text(&term, 1), "BBBBB");
    assert!(term.line(0).unwrap().is_wrapped());
}

#[test]
fn test_autowrap_off_overwrites_last_column() {
    let mut term = terminal(5, 2);
    term.feed(b"\x1b[?7labcdefg");
    assert_eq!(row_text(&term, 0), "abcdg");
    assert_eq!(cursor(&term).0, 0);
}

#[test]
fn test_wide_characters() {
    let mut term = terminal(5, 2);
    term.feed("ab世界".as_bytes());
    // The second wide rune does not fit and wraps
    assert_eq!(row_text(&term, 0), "ab世");
    assert_eq!(row_text(&term, 1), "界");
    let line = term.line(0).unwrap();
    assert!(line.glyph(2).unwrap().is_wide());
    assert!(line.glyph(3).unwrap().is_wide_continuation());
}

#[test]
fn test_tabs() {
    let mut term = terminal(40, 2);
    term.feed(b"a\tb\tc");
    assert_eq!(term.line(0).unwrap().glyph(8).unwrap().c, 'b');
    assert_eq!(term.line(0).unwrap().glyph(16).unwrap().c, 'c');

    term.feed(b"\x1b[3g\r\x1b[5C\x1bH\r\tX");
    assert_eq!(term.line(0).unwrap().glyph(5).unwrap().c, 'X');
}

#[test]
fn test_chunk_boundary_parsing() {
    let input = "\x1b[1;31mRed\x1b[0m \u{4e16} \x1b]2;title\x07done".as_bytes();

    let mut whole = terminal(20, 3);
    whole.feed(input);

    let mut split = terminal(20, 3);
    for byte in input {
        split.feed(std::slice::from_ref(byte));
    }

    assert!(whole.snapshot().content_equals(&split.snapshot()));
    assert_eq!(split.title(), "title");
}

#[test]
fn test_scroll_region_keeps_history_clean() {
    let mut term = terminal(10, 5);
    term.feed(b"top\x1b[2;4r\x1b[4;1H1\n2\n3\n");
    assert_eq!(row_text(&term, 0), "top");
    assert_eq!(term.screen().history().len(), 0);
}

#[test]
fn test_alternate_screen_does_not_feed_history() {
    let mut term = terminal(10, 3);
    term.feed(b"\x1b[?1049h");
    for i in 0..10 {
        term.feed(format!("{}\r\n", i).as_bytes());
    }
    assert_eq!(term.screen().history().len(), 0);
    term.feed(b"\x1b[?1049l");
    assert_eq!(row_text(&term, 0), "");
}

#[test]
fn test_selection_across_history() {
    let mut term = terminal(10, 3);
    term.feed(b"alpha\r\nbeta\r\ngamma\r\ndelta");
    // "alpha" is now in history
    term.scroll(1);
    assert_eq!(row_text(&term, 0), "alpha");

    term.start_selection(0, 0, SnapMode::None);
    term.extend_selection(1, 3, SelectionType::Regular, true);
    assert_eq!(term.selection_text().as_deref(), Some("alpha\nbeta"));
}

#[test]
fn test_selection_survives_scroll_into_history() {
    let mut term = terminal(10, 3);
    term.feed(b"one\r\ntwo\r\nthree");
    term.start_selection(1, 0, SnapMode::None);
    term.extend_selection(1, 2, SelectionType::Regular, true);
    assert_eq!(term.selection_text().as_deref(), Some("two"));
    assert_eq!(term.screen().selection().rows(), Some((1, 1)));

    // Two lines scroll off: the selection moves up by two rows
    term.feed(b"\r\n\r\n");
    assert_eq!(term.screen().history().len(), 2);
    assert_eq!(term.screen().selection().rows(), Some((-1, -1)));
    assert_eq!(term.selection_text().as_deref(), Some("two"));

    term.scroll(1);
    assert_eq!(row_text(&term, 0), "two");
    assert!(term.screen().is_selected(0, 1));
}

#[test]
fn test_resize_narrower_than_selection_clears_it() {
    let mut term = terminal(20, 3);
    term.feed(b"hello world");
    term.start_selection(0, 12, SnapMode::None);
    term.extend_selection(0, 15, SelectionType::Regular, true);
    assert!(term.selection_text().is_some());

    term.resize(10, 3).unwrap();
    assert_eq!(term.selection_text(), None);
}

#[test]
fn test_resize_preserves_unaffected_selection() {
    let mut term = terminal(20, 3);
    term.feed(b"hello world");
    term.start_selection(0, 0, SnapMode::None);
    term.extend_selection(0, 4, SelectionType::Regular, true);
    assert_eq!(term.selection_text().as_deref(), Some("hello"));

    term.resize(15, 3).unwrap();
    assert_eq!(term.selection_text().as_deref(), Some("hello"));
}

#[test]
fn test_snapshot_json_roundtrip() {
    let mut term = terminal(20, 4);
    term.feed(b"\x1b]2;snap\x07\x1b[1;32mgreen\x1b[0m\r\nplain");
    let snapshot = term.snapshot();
    let json = snapshot.to_json().unwrap();
    let restored = Snapshot::from_json(&json).unwrap();

    assert!(snapshot.content_equals(&restored));
    assert_eq!(restored.title, "snap");
    assert_eq!(restored.to_text(), "green\nplain\n");
}

#[test]
fn test_deterministic_snapshots() {
    let input = b"\x1b[2J\x1b[H\x1b[1mBold\x1b[0m\r\n\x1b[4mUnder\x1b[0m\x1b[10;10H\x1b[7mRev";
    let mut a = terminal(40, 12);
    let mut b = terminal(40, 12);
    a.feed(input);
    b.feed(input);
    assert_eq!(a.snapshot().to_json().unwrap(), b.snapshot().to_json().unwrap());
}

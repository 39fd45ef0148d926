//! Screen benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mochi_screen::core::{Screen, DEFAULT_TAB_WIDTH};
use mochi_screen::Terminal;

fn bench_screen_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    let text: Vec<char> = "Hello, World! ".repeat(100).chars().collect();

    group.bench_function("print_chars", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24, 0, DEFAULT_TAB_WIDTH);
            for &c in &text {
                screen.print(c);
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Scrolling into a full history ring
    let input: String = (0..2000).map(|i| format!("Line {}: Some text content here\r\n", i)).collect();
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("scroll_into_history", |b| {
        b.iter(|| {
            let mut term = Terminal::new(80, 24, 1000).unwrap();
            term.feed(black_box(input.as_bytes()));
            black_box(term.screen().history().len())
        })
    });

    group.finish();
}

fn bench_screen_csi(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    let input = "\x1b[H\x1b[2J\x1b[1;31mHello\x1b[0m".repeat(100);

    group.bench_function("csi_apply", |b| {
        b.iter(|| {
            let mut term = Terminal::new(80, 24, 0).unwrap();
            term.feed(black_box(input.as_bytes()));
            black_box(term.is_dirty())
        })
    });

    group.finish();
}

fn bench_screen_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("resize", |b| {
        b.iter(|| {
            let mut term = Terminal::new(80, 24, 1000).unwrap();
            term.feed("Hello, World!\r\n".repeat(40).as_bytes());
            term.resize(120, 40).unwrap();
            term.resize(80, 24).unwrap();
            term.resize(132, 50).unwrap();
            black_box(term.cursor().row)
        })
    });

    group.finish();
}

fn bench_screen_full_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // A full-screen repaint, like an editor opening
    let mut setup_input = String::new();
    for row in 1..=24 {
        setup_input.push_str(&format!("\x1b[{};1H", row));
        setup_input.push_str(&"X".repeat(80));
    }
    group.throughput(Throughput::Bytes(setup_input.len() as u64));

    group.bench_function("full_redraw", |b| {
        b.iter(|| {
            let mut term = Terminal::new(80, 24, 0).unwrap();
            term.feed(black_box(setup_input.as_bytes()));
            black_box(term.dirty_rows())
        })
    });

    group.finish();
}

fn bench_selection_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    let mut term = Terminal::new(80, 24, 1000).unwrap();
    term.feed("the quick brown fox jumps over the lazy dog\r\n".repeat(500).as_bytes());
    term.scroll(200);
    term.start_selection(0, 0, mochi_screen::core::SnapMode::Line);
    term.extend_selection(23, 79, mochi_screen::core::SelectionType::Regular, true);

    group.bench_function("selection_text", |b| b.iter(|| black_box(term.selection_text())));

    group.finish();
}

criterion_group!(
    benches,
    bench_screen_print,
    bench_screen_scroll,
    bench_screen_csi,
    bench_screen_resize,
    bench_screen_full_redraw,
    bench_selection_text
);

criterion_main!(benches);

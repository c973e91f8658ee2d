//! Scrollback and screen benchmarks.
//!
//! Appending at capacity must stay O(evicted) so typing latency does not
//! depend on how much output the session holds.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use optionterm::screen::diff::{render_diff, DiffState};
use optionterm::{Attrs, Frame, OutputBuffer};

fn filled_buffer(capacity: usize) -> OutputBuffer {
    let mut buffer = OutputBuffer::new(capacity, 256).with_viewport_height(50);
    for i in 0..capacity {
        buffer.append(&format!(":  line {i} of some option chain output"));
    }
    buffer
}

fn append_at_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_at_capacity");
    for capacity in [1_000usize, 10_000, 100_000] {
        let mut buffer = filled_buffer(capacity);
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| buffer.append(black_box(":  SPY 450.12 450.55 449.80 450.31")));
        });
    }
    group.finish();
}

fn append_multiline(c: &mut Criterion) {
    let block: String = (0..40).map(|i| format!(":  strike {i}\n")).collect();
    let mut buffer = filled_buffer(10_000);
    c.bench_function("append_40_lines_at_capacity", |b| {
        b.iter(|| buffer.append(black_box(&block)));
    });
}

fn search_backward(c: &mut Criterion) {
    let buffer = filled_buffer(10_000);
    c.bench_function("find_backward_miss_10000", |b| {
        b.iter(|| buffer.find_backward(black_box("not present"), None));
    });
}

fn diff_one_changed_row(c: &mut Criterion) {
    let mut current = Frame::new(200, 50);
    for y in 0..50 {
        current.set_str(0, y, &format!(":  row {y} ").repeat(10), Attrs::empty(), current.area());
    }
    let mut next = current.clone();
    next.set_str(0, 25, "AM.SPY    C 450.31  V 12000  2s ago", Attrs::DIM, next.area());

    c.bench_function("diff_200x50_one_row", |b| {
        b.iter(|| {
            let mut output = Vec::with_capacity(4096);
            let mut state = DiffState::new();
            render_diff(black_box(&current), black_box(&next), &mut output, &mut state)
        });
    });
}

criterion_group!(
    benches,
    append_at_capacity,
    append_multiline,
    search_backward,
    diff_one_changed_row
);
criterion_main!(benches);

//! # Frame Benchmark
//!
//! Cost of one full frame: input capture, widget calls, batching and output.
//!
//! Run with: `cargo bench --package vellum_ui`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vellum_ui::{
    widget, Cond, Context, ErrorPolicy, FontAtlas, InputState, TextureId, UiConfig, Vec2,
    WindowFlags,
};

fn context() -> Context {
    let config = UiConfig {
        error_policy: ErrorPolicy::Recover,
        ..UiConfig::default()
    };
    Context::new(config, FontAtlas::monospace(TextureId(1), 7.0, 13.0))
}

/// A list window of `rows` rows, each a label, a checkbox and a slider.
fn list_frame(ctx: &mut Context, input: &mut InputState, rows: usize, values: &mut [(bool, f32)]) {
    ctx.begin_frame(input, 1.0 / 60.0);
    ctx.set_next_window_pos(Vec2::ZERO, Cond::Always);
    ctx.set_next_window_size(Vec2::new(640.0, 720.0), Cond::Always);
    ctx.window("List", WindowFlags::NONE, |ctx| {
        for (i, (flag, value)) in values.iter_mut().enumerate().take(rows) {
            ctx.with_id_int(i as u64, |ctx| {
                widget::text(ctx, "row");
                ctx.same_line();
                widget::checkbox(ctx, "##on", flag);
                ctx.same_line();
                widget::slider_float(ctx, "##value", value, 0.0, 1.0);
            });
        }
    });
    black_box(ctx.end_frame().draw_data.vertex_count());
}

fn bench_list_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_frame");

    for rows in [10, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            let mut ctx = context();
            let mut input = InputState::new();
            input.set_mouse_pos(100.0, 100.0);
            let mut values = vec![(false, 0.5); rows];
            // warm the window and state store
            list_frame(&mut ctx, &mut input, rows, &mut values);
            b.iter(|| list_frame(&mut ctx, &mut input, rows, &mut values));
        });
    }

    group.finish();
}

fn bench_empty_frame(c: &mut Criterion) {
    let mut ctx = context();
    let mut input = InputState::new();
    c.bench_function("empty_frame", |b| {
        b.iter(|| {
            ctx.begin_frame(&mut input, 1.0 / 60.0);
            black_box(ctx.end_frame().frame_index)
        });
    });
}

fn bench_id_hashing(c: &mut Criterion) {
    let mut ctx = context();
    let mut input = InputState::new();
    ctx.begin_frame(&mut input, 1.0 / 60.0);
    c.bench_function("get_id_nested", |b| {
        b.iter(|| {
            ctx.with_id("panel", |ctx| {
                ctx.with_id_int(black_box(42), |ctx| black_box(ctx.get_id("Apply##row")))
            })
        });
    });
    ctx.end_frame();
}

criterion_group!(benches, bench_empty_frame, bench_list_frame, bench_id_hashing);
criterion_main!(benches);

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the rectangle stabilizer in the quadscan-scan crate.
// Feeds a synthetic jittering detection stream through a full-size window.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use quadscan_core::{Affine, Point, Quadrilateral, Rect, Size};
use quadscan_scan::RectangleStabilizer;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// One second of 30 fps frames: a document wobbling by a few pixels, with
/// every tenth frame missing.
fn bench_observe_stream(c: &mut Criterion) {
    let doc = Quadrilateral::from_rect(&Rect::new(Point::new(120.0, 80.0), Size::new(900.0, 1300.0)));
    let frames: Vec<Option<Quadrilateral>> = (0..30)
        .map(|i| {
            if i % 10 == 9 {
                None
            } else {
                let wobble = (i % 7) as f64 - 3.0;
                Some(doc.apply(&Affine::translate(wobble, -wobble)))
            }
        })
        .collect();

    c.bench_function("stabilizer observe (30 frames)", |b| {
        b.iter(|| {
            let mut stabilizer = RectangleStabilizer::default();
            for frame in &frames {
                black_box(stabilizer.observe(black_box(*frame)));
            }
        });
    });
}

/// Rescoring cost with a larger window.
fn bench_wide_window(c: &mut Criterion) {
    let config = quadscan_core::StabilizerConfig {
        max_window_size: 32,
        ..Default::default()
    };
    let doc = Quadrilateral::from_rect(&Rect::new(Point::new(0.0, 0.0), Size::new(500.0, 700.0)));

    c.bench_function("stabilizer observe (window 32)", |b| {
        let mut stabilizer = RectangleStabilizer::new(config.clone()).expect("valid config");
        b.iter(|| black_box(stabilizer.observe(Some(black_box(doc)))));
    });
}

criterion_group!(benches, bench_observe_stream, bench_wide_window);
criterion_main!(benches);

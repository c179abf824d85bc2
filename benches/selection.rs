use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scan_gate::{
    filter_by_focus, select, BarcodeCandidate, BarcodeFormat, FocusArea, Rect, SelectionStrategy,
};

fn grid_candidates(count: usize) -> Vec<BarcodeCandidate> {
    (0..count)
        .map(|i| {
            let x = (i % 10) as f32 * 40.0;
            let y = (i / 10) as f32 * 40.0;
            let size = 10.0 + (i * 7 % 25) as f32;
            BarcodeCandidate::new(
                format!("code-{i}"),
                BarcodeFormat::Code128,
                Rect::new(x, y, x + size, y + size),
            )
        })
        .collect()
}

fn bench_focus_filter(c: &mut Criterion) {
    let candidates = grid_candidates(64);
    let focus = FocusArea::enabled(Rect::new(50.0, 50.0, 250.0, 250.0));
    c.bench_function("focus_filter_64", |b| {
        b.iter(|| filter_by_focus(black_box(&candidates), black_box(&focus)))
    });
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    for count in [4usize, 32, 128] {
        let candidates = grid_candidates(count);
        for strategy in [SelectionStrategy::Biggest, SelectionStrategy::SortByBiggest] {
            group.bench_with_input(
                BenchmarkId::new(strategy.as_str(), count),
                &candidates,
                |b, candidates| b.iter(|| select(black_box(candidates), strategy)),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_focus_filter, bench_strategies);
criterion_main!(benches);

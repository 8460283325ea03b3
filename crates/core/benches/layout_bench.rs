use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use quire_core::converter::PDFLayoutAnalyzer;
use quire_core::interp::PathSegment;
use quire_core::layout::{LAParams, LTChar, LTItem, LTPage};
use quire_core::model::PDFGraphicState;
use quire_core::utils::{MATRIX_IDENTITY, Rect};

const PAGE_BBOX: Rect = (0.0, 0.0, 612.0, 792.0);

/// Deterministic jitter so runs are comparable.
struct XorShift64(u64);

impl XorShift64 {
    fn next_f64(&mut self, lo: f64, hi: f64) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        lo + (self.0 >> 11) as f64 / (1u64 << 53) as f64 * (hi - lo)
    }
}

/// A table-like page: ruled cells, each holding two short lines of text.
fn synthetic_page(cells: usize, seed: u64) -> (Vec<Vec<PathSegment>>, Vec<LTChar>) {
    let mut rng = XorShift64(seed | 1);
    let mut paths = Vec::with_capacity(cells);
    let mut chars = Vec::with_capacity(cells * 16);
    for i in 0..cells {
        let x = 36.0 + (i % 3) as f64 * 180.0;
        let y = 740.0 - (i / 3) as f64 * 30.0;
        paths.push(vec![
            PathSegment::MoveTo(x, y),
            PathSegment::LineTo(x + 170.0, y),
            PathSegment::LineTo(x + 170.0, y + 28.0),
            PathSegment::LineTo(x, y + 28.0),
            PathSegment::ClosePath,
            PathSegment::MoveTo(x, y + 14.0),
            PathSegment::LineTo(x + 170.0, y + 14.0),
        ]);
        for line in 0..2 {
            let y0 = y + 2.0 + line as f64 * 12.0 + rng.next_f64(0.0, 0.5);
            for ch in 0..8 {
                let x0 = x + 4.0 + ch as f64 * 6.0;
                chars.push(LTChar::with_bbox((x0, y0, x0 + 6.0, y0 + 10.0), "a", "Helvetica"));
            }
        }
    }
    (paths, chars)
}

fn bench_paint_and_analyze(c: &mut Criterion) {
    let gstate = PDFGraphicState::new();
    let laparams = LAParams::default();
    let mut group = c.benchmark_group("layout_page");

    for &cells in &[30usize, 60, 120] {
        let (paths, chars) = synthetic_page(cells, cells as u64);
        group.throughput(Throughput::Elements(cells as u64));

        group.bench_with_input(BenchmarkId::new("paint_path", cells), &paths, |b, paths| {
            b.iter(|| {
                let mut analyzer = PDFLayoutAnalyzer::new(None, 1);
                analyzer.begin_page(PAGE_BBOX, MATRIX_IDENTITY);
                for path in paths {
                    analyzer
                        .paint_path(&gstate, true, false, false, path)
                        .expect("page is open");
                }
                black_box(analyzer.end_page().expect("balanced page").items().len());
            })
        });

        group.bench_with_input(BenchmarkId::new("analyze", cells), &chars, |b, chars| {
            b.iter(|| {
                let mut page = LTPage::new(1, PAGE_BBOX);
                for ch in chars {
                    page.add(LTItem::Char(ch.clone()));
                }
                page.analyze(&laparams);
                black_box(page.items().len());
            })
        });
    }

    group.finish();
}

criterion_group!(layout_benches, bench_paint_and_analyze);
criterion_main!(layout_benches);

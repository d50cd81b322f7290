use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gifcut::Document;

const CHECKER: &[u8] = include_bytes!("../res/checker.gif") as &[u8];

fn build_checker(crit: &mut Criterion) {
    let doc = Document::from_bytes(CHECKER);
    crit.bench_function("build", |b| b.iter(|| black_box(&doc).to_bytes()));
    crit.bench_function("build_comments", |b| {
        b.iter(|| black_box(&doc).builder().with_comments(true).build())
    });
}

fn join_checker(crit: &mut Criterion) {
    let source = Document::from_bytes(CHECKER);
    crit.bench_function("add_image", |b| {
        b.iter(|| {
            let mut doc = Document::from_bytes(CHECKER);
            doc.add_image(black_box(&source), 1, 1);
            doc.set_animation(5, false, true);
            doc.to_bytes()
        })
    });
}

criterion_group!(benches, build_checker, join_checker);
criterion_main!(benches);

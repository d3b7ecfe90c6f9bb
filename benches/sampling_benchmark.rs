/// Benchmarks for timestamp sampling and ledger appends
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use git_backdate::date_range::DateRange;
use git_backdate::ledger::CommitLedger;
use git_backdate::sampler::TimestampSampler;
use tempfile::TempDir;

fn benchmark_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling");

    for start in ["2025-01-01", "2020-01-01", "2000-01-01"] {
        let range = DateRange::validate(start).expect("valid start date");
        let mut sampler = TimestampSampler::seeded(42);

        group.bench_with_input(BenchmarkId::new("sample", start), &range, |b, range| {
            b.iter(|| black_box(sampler.sample(black_box(range)).canonical()));
        });
    }

    group.finish();
}

fn benchmark_ledger_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger");
    group.sample_size(20);

    for existing in [0usize, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("append", existing),
            &existing,
            |b, &existing| {
                let dir = TempDir::new().unwrap();
                let ledger = CommitLedger::new(dir.path().join("ledger.json"));
                for _ in 0..existing {
                    ledger.append("2024-12-20 10:00:00 +0000").unwrap();
                }

                b.iter(|| ledger.append(black_box("2024-12-21 11:30:00 +0000")).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_sampling, benchmark_ledger_append);
criterion_main!(benches);

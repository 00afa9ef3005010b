//! Classification throughput benchmarks.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mail_triage::classifier::{run_batch, RuleClassifier};
use mail_triage::keywords::KeywordSets;
use mail_triage::record::Record;
use tokio::runtime::Runtime;

fn record(id: usize, subject: &str, preview: &str) -> Record {
    Record {
        id: id.to_string(),
        subject: subject.to_string(),
        sender: "colleague@example.com".to_string(),
        preview: preview.to_string(),
        timestamp: "2024-03-01T09:00:00Z".to_string(),
    }
}

fn sample_batch(size: usize) -> Vec<Record> {
    (0..size)
        .map(|i| match i % 4 {
            0 => record(i, "Could you review the draft?", "need your feedback by Friday"),
            1 => record(i, "Weekly newsletter", "unsubscribe at the bottom"),
            2 => record(i, "Quarterly review decision", "board approval pending"),
            _ => record(i, "Random chatter", "nothing actionable in here"),
        })
        .collect()
}

fn benchmark_single_record(c: &mut Criterion) {
    let classifier = RuleClassifier::new(&KeywordSets::default());
    let records = sample_batch(4);

    let mut group = c.benchmark_group("classify_single_record");
    group.throughput(Throughput::Elements(1));

    group.bench_function("keyword_match", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % records.len();
            classifier.classify_record(&records[i])
        });
    });

    group.bench_function("default_path", |b| {
        let unmatched = record(0, "Random chatter", "nothing actionable in here");
        b.iter(|| classifier.classify_record(&unmatched));
    });

    group.finish();
}

fn benchmark_batches(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let classifier = RuleClassifier::new(&KeywordSets::default());

    let mut group = c.benchmark_group("classify_batch");

    for batch_size in [10_u64, 50, 100] {
        let records = sample_batch(batch_size as usize);
        group.throughput(Throughput::Elements(batch_size));
        group.bench_with_input(
            BenchmarkId::new("batch", batch_size),
            &records,
            |b, records| {
                b.iter(|| rt.block_on(run_batch(&classifier, records)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_single_record, benchmark_batches);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;

use ashbridge::commitment::{self, verify_membership};
use ashbridge::types::BurnRecord;

const N: usize = 10_000;

// deterministic data
fn gen_records(n: usize) -> Vec<BurnRecord> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let addr: u128 = rng.gen();
        let base: u64 = rng.gen_range(0..1_000_000);
        out.push(BurnRecord {
            holder_address: format!("0x{addr:040x}"),
            token_ids: (base..base + 25).collect(),
            source_tx_hash: format!("0x{i:064x}"),
            timestamp: 1_700_000_000 + i as u64,
            redeemed: false,
        });
    }
    out
}

fn bench_commit_epoch(c: &mut Criterion) {
    let records = gen_records(N);

    let mut group = c.benchmark_group("commit_epoch");
    group.sample_size(10); // each iteration hashes the full epoch
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(8));

    group.bench_function(BenchmarkId::new("build", N), |b| {
        b.iter_batched(
            || records.clone(),
            |records| {
                let batch = commitment::build(&records).unwrap();
                black_box(batch.root);
            },
            BatchSize::LargeInput,
        )
    });

    group.bench_function(BenchmarkId::new("verify_all", N), |b| {
        let batch = commitment::build(&records).unwrap();
        b.iter(|| {
            for proof in batch.proofs_by_key.values() {
                black_box(verify_membership(&batch.root, &proof.leaf, &proof.siblings));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_commit_epoch);
criterion_main!(benches);

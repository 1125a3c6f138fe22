use connpool_stats::stats::{document_from_json, DocValue, RawDocument};
use connpool_stats::{aggregate_pools, HostToShardMap};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn host_doc(seed: u64) -> DocValue {
    let mut doc = RawDocument::new();
    doc.insert("inUse".to_string(), DocValue::UInt64(seed % 3));
    doc.insert("available".to_string(), DocValue::UInt64(seed % 7));
    doc.insert("created".to_string(), DocValue::UInt64(seed));
    doc.insert("refreshing".to_string(), DocValue::Int32(0));
    doc.insert("reqQueueLimit".to_string(), DocValue::Int32(0));
    DocValue::Document(doc)
}

/// 8 pools x 3 shards x 3 members
fn cluster() -> (RawDocument, HostToShardMap) {
    let mut pools = RawDocument::new();
    let mut map = HostToShardMap::new();

    for p in 0..8u64 {
        let mut pool = document_from_json(r#"{"poolInUse": 1, "poolAvailable": 9, "poolCreated": 27}"#)
            .unwrap()
            .unwrap();
        for shard in 0..3u64 {
            for member in 0..3u64 {
                let host = format!("10.0.{}.{}:27017", shard, member);
                map.insert(host.clone(), format!("shard{}", shard));
                pool.insert(host, host_doc(p * 100 + shard * 10 + member));
            }
        }
        pools.insert(format!("pool-{}", p), DocValue::Document(pool));
    }

    (pools, map)
}

fn bench_aggregate(c: &mut Criterion) {
    let (pools, map) = cluster();

    c.bench_function("aggregate_pools/grouped", |b| {
        b.iter(|| aggregate_pools(black_box(&pools), Some(black_box(&map))))
    });
    c.bench_function("aggregate_pools/by_host", |b| {
        b.iter(|| aggregate_pools(black_box(&pools), None))
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);

//! Shard Aggregation
//!
//! Walks a `pools` document, decodes every pool, and folds each pool's
//! per-host counters into per-shard sums using the host-to-shard lookup
//! derived from cluster topology.
//!
//! Without a lookup the pools are returned keyed by raw host address, which
//! exposition treats no differently from shard names.

use std::collections::BTreeMap;

use super::host::HostConnStats;
use super::pool::{decode_pool_stats, PoolConnStats};
use super::value::{DocValue, RawDocument};
use crate::topology::HostToShardMap;

/// Shard key for hosts the lookup does not know about
pub const OTHER_SHARD: &str = "other";

/// Decoded pools by pool name. Pools that failed to decode are absent.
pub type AggregationResult = BTreeMap<String, PoolConnStats>;

/// Decode and group every pool in `pools`.
///
/// Returns `None` for an empty document. Malformed pools are logged and
/// skipped; they never abort the batch.
pub fn analyze_pools(
    pools: &RawDocument,
    host_to_shard: Option<&HostToShardMap>,
) -> Option<AggregationResult> {
    if pools.is_empty() {
        return None;
    }

    let host_to_shard = host_to_shard.filter(|map| !map.is_empty());
    if host_to_shard.is_none() {
        tracing::debug!("no host-to-shard map, pools stay keyed by host");
    }

    let mut result = AggregationResult::new();
    for (pool_name, value) in pools {
        if pool_name.is_empty() || value.is_null() {
            continue;
        }
        if !matches!(value, DocValue::Document(_)) {
            tracing::warn!(
                pool = %pool_name,
                kind = value.type_name(),
                "pool entry is not a document, skipping"
            );
            continue;
        }

        let Some(mut pool) = decode_pool_stats(value) else {
            continue;
        };
        if let Some(map) = host_to_shard {
            pool.shard_status = group_by_shard(&pool.shard_status, map);
        }
        result.insert(pool_name.clone(), pool);
    }

    Some(result)
}

/// Like [`analyze_pools`], but an empty document yields an empty result
pub fn aggregate_pools(
    pools: &RawDocument,
    host_to_shard: Option<&HostToShardMap>,
) -> AggregationResult {
    analyze_pools(pools, host_to_shard).unwrap_or_default()
}

/// Re-key per-host counters by shard name, summing hosts of the same shard.
///
/// Hosts missing from the lookup are summed under [`OTHER_SHARD`]. A host
/// that maps to an empty shard name is dropped.
pub fn group_by_shard(
    by_host: &BTreeMap<String, HostConnStats>,
    host_to_shard: &HostToShardMap,
) -> BTreeMap<String, HostConnStats> {
    let mut by_shard: BTreeMap<String, HostConnStats> = BTreeMap::new();

    for (host, stats) in by_host {
        if host.is_empty() {
            continue;
        }
        let shard = match host_to_shard.get(host) {
            Some(name) if name.is_empty() => {
                tracing::debug!(host = %host, "host maps to an empty shard name, dropping");
                continue;
            }
            Some(name) => name.as_str(),
            None => OTHER_SHARD,
        };

        by_shard
            .entry(shard.to_string())
            .and_modify(|acc| *acc += stats)
            .or_insert(*stats);
    }

    by_shard
}

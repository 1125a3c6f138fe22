//! Exposition of decoded statistics as tagged series.
//!
//! Pool series carry `pool:<name>`; per-shard series additionally carry
//! `set:<key>`, where the key is a shard name or, in degraded mode, a raw
//! host address. Both are emitted the same way.

use super::recorder::MetricsRecorder;
use crate::stats::{
    ApCounters, ConnPoolStats, PoolConnStats, ShardConnPoolStats, ShardingStatistics,
};
use crate::topology::TopologySummary;

const CONN_POOL: &str = "connpoolstats";
const SHARD_CONN_POOL: &str = "sc_stats";
const TOPOLOGY: &str = "sharding";
const CATALOG_CACHE: &str = "catalog_cache";
const AP_COUNTERS: &str = "ap_counters_total";

/// Export a `connPoolStats` snapshot
pub fn export_conn_pool_stats(stats: &ConnPoolStats, metrics: &dyn MetricsRecorder) {
    let name = |suffix: &str| format!("{}.{}", CONN_POOL, suffix);

    metrics.gauge(&name("connection_sync"), stats.num_client_connections, &[]);
    metrics.gauge(&name("connections_scoped_sync"), stats.num_a_scoped_connections, &[]);
    metrics.gauge(&name("connections_in_use"), stats.total_in_use, &[]);
    metrics.gauge(&name("connections_available"), stats.total_available, &[]);
    metrics.counter(&name("connections_created_total"), stats.total_created, &[]);
    metrics.gauge(&name("connections_refreshing"), stats.total_refreshing, &[]);
    metrics.gauge(&name("req_queue_limit"), stats.total_req_queue_limit, &[]);

    for (set, rs) in &stats.replica_sets {
        if set.is_empty() {
            continue;
        }
        let set_tag = format!("name:{}", set);
        metrics.gauge(&name("refresh_limit"), rs.refresh_limiter, &[&set_tag]);
    }

    for (pool_name, pool) in &stats.pools {
        if pool_name.is_empty() {
            continue;
        }
        export_pool(CONN_POOL, pool_name, pool, metrics);
    }
}

/// Export a `shardConnPoolStats` snapshot
pub fn export_shard_conn_pool_stats(stats: &ShardConnPoolStats, metrics: &dyn MetricsRecorder) {
    let name = |suffix: &str| format!("{}.{}", SHARD_CONN_POOL, suffix);

    metrics.gauge(&name("in_use"), stats.total_in_use, &[]);
    metrics.gauge(&name("available"), stats.total_available, &[]);
    metrics.counter(&name("created_total"), stats.total_created, &[]);

    if let Some(global) = &stats.global_pool {
        export_pool(SHARD_CONN_POOL, crate::stats::GLOBAL_POOL, global, metrics);
    }
}

/// Export shard, chunk, database and collection counts
pub fn export_topology(summary: &TopologySummary, metrics: &dyn MetricsRecorder) {
    let name = |suffix: &str| format!("{}.{}", TOPOLOGY, suffix);

    metrics.gauge(&name("shards_total"), summary.total_shards as f64, &[]);
    metrics.gauge(&name("shards_draining"), summary.draining_shards as f64, &[]);
    metrics.gauge(&name("chunks_total"), summary.total_chunks, &[]);
    for (shard, chunks) in &summary.shard_chunks {
        let shard_tag = format!("shard:{}", shard);
        metrics.gauge(&name("shard_chunks_total"), *chunks, &[&shard_tag]);
    }
    metrics.gauge(
        &name("databases_total"),
        summary.partitioned_databases,
        &["type:partitioned"],
    );
    metrics.gauge(
        &name("databases_total"),
        summary.unpartitioned_databases,
        &["type:unpartitioned"],
    );
    metrics.gauge(&name("collections_total"), summary.total_collections, &[]);
}

/// Export the routing-table cache counters
pub fn export_sharding_statistics(stats: &ShardingStatistics, metrics: &dyn MetricsRecorder) {
    let name = |suffix: &str| format!("{}.{}", CATALOG_CACHE, suffix);
    let cache = &stats.catalog_cache;

    metrics.gauge(&name("num_database_entries"), cache.num_database_entries, &[]);
    metrics.gauge(&name("num_collection_entries"), cache.num_collection_entries, &[]);
    metrics.counter(&name("count_stale_config_errors"), cache.count_stale_config_errors, &[]);
    metrics.counter(
        &name("total_refresh_wait_time_micros"),
        cache.total_refresh_wait_time_micros,
        &[],
    );
    metrics.gauge(
        &name("num_active_incremental_refreshes"),
        cache.num_active_incremental_refreshes,
        &[],
    );
    metrics.counter(
        &name("count_incremental_refreshes_started"),
        cache.count_incremental_refreshes_started,
        &[],
    );
    metrics.gauge(&name("num_active_full_refreshes"), cache.num_active_full_refreshes, &[]);
    metrics.counter(
        &name("count_full_refreshes_started"),
        cache.count_full_refreshes_started,
        &[],
    );
    metrics.counter(&name("count_failed_refreshes"), cache.count_failed_refreshes, &[]);
}

/// Export `apCounters`, one counter series per `type`
pub fn export_ap_counters(counters: &ApCounters, metrics: &dyn MetricsRecorder) {
    for (label, value) in counters.labeled() {
        let type_tag = format!("type:{}", label);
        metrics.counter(AP_COUNTERS, value, &[&type_tag]);
    }
}

fn export_pool(prefix: &str, pool_name: &str, pool: &PoolConnStats, metrics: &dyn MetricsRecorder) {
    let name = |suffix: &str| format!("{}.{}", prefix, suffix);
    let pool_tag = format!("pool:{}", pool_name);
    let tags = [pool_tag.as_str()];

    metrics.gauge(&name("in_use_in_pool"), pool.pool_in_use, &tags);
    metrics.gauge(&name("available_in_pool"), pool.pool_available, &tags);
    metrics.counter(&name("created_in_pool_total"), pool.pool_created, &tags);
    metrics.gauge(&name("refreshing_in_pool"), pool.pool_refreshing, &tags);
    metrics.gauge(&name("req_queue_limit_in_pool"), pool.pool_req_queue_limit, &tags);

    for (set, shard) in &pool.shard_status {
        if set.is_empty() {
            continue;
        }
        let set_tag = format!("set:{}", set);
        let tags = [set_tag.as_str(), pool_tag.as_str()];

        metrics.gauge(&name("in_use_preshard"), shard.in_use, &tags);
        metrics.gauge(&name("available_preshard"), shard.available, &tags);
        metrics.counter(&name("created_preshard_total"), shard.created, &tags);
        metrics.gauge(&name("refreshing_preshard"), shard.refreshing, &tags);
        metrics.gauge(&name("req_queue_limit_preshard"), shard.req_queue_limit, &tags);
    }
}

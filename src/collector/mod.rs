//! Collection Cycle
//!
//! One cycle fetches the shard metadata, both pool-statistics replies and
//! `serverStatus` concurrently and waits for all of them. The pool
//! statistics are then decoded and grouped with the host-to-shard map
//! derived from the shard records. A group whose fetch or decode fails is
//! left empty for the cycle; the others are still reported.

mod source;

pub use source::{
    FileSource, SourceError, StatsSource, CHUNKS_FILE, COLLECTIONS_FILE, CONN_POOL_STATS_FILE,
    DATABASES_FILE, SERVER_STATUS_FILE, SHARDS_FILE, SHARD_CONN_POOL_STATS_FILE,
};

use serde::Serialize;

use crate::observability::{
    export_ap_counters, export_conn_pool_stats, export_shard_conn_pool_stats,
    export_sharding_statistics, export_topology, MetricsRecorder,
};
use crate::stats::{ConnPoolStats, ServerStatus, ShardConnPoolStats};
use crate::topology::{build_host_to_shard_map, HostToShardMap, TopologySummary};

/// Everything one cycle produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    pub topology: Option<TopologySummary>,
    pub conn_pool_stats: Option<ConnPoolStats>,
    pub shard_conn_pool_stats: Option<ShardConnPoolStats>,
    pub server_status: Option<ServerStatus>,
}

impl ClusterSnapshot {
    /// True when no group produced data
    pub fn is_empty(&self) -> bool {
        self.topology.is_none()
            && self.conn_pool_stats.is_none()
            && self.shard_conn_pool_stats.is_none()
            && self.server_status.is_none()
    }

    /// Send every available group to the recorder
    pub fn export(&self, metrics: &dyn MetricsRecorder) {
        if let Some(topology) = &self.topology {
            export_topology(topology, metrics);
        }
        if let Some(stats) = &self.conn_pool_stats {
            export_conn_pool_stats(stats, metrics);
        }
        if let Some(stats) = &self.shard_conn_pool_stats {
            export_shard_conn_pool_stats(stats, metrics);
        }
        if let Some(status) = &self.server_status {
            if let Some(stats) = &status.sharding_statistics {
                export_sharding_statistics(stats, metrics);
            }
            if let Some(counters) = &status.ap_counters {
                export_ap_counters(counters, metrics);
            }
        }
    }
}

/// Runs collection cycles against a source
pub struct Collector<S: StatsSource> {
    source: S,
}

impl<S: StatsSource> Collector<S> {
    pub fn new(source: S) -> Self {
        Collector { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one collection cycle
    pub async fn collect(&self) -> ClusterSnapshot {
        let (shards, chunks, databases, collections, conn_pool, shard_conn_pool, server_status) =
            tokio::join!(
                self.source.shards(),
                self.source.shard_chunks(),
                self.source.database_totals(),
                self.source.sharded_collections(),
                self.source.conn_pool_stats(),
                self.source.shard_conn_pool_stats(),
                self.source.server_status(),
            );

        let (summary, host_to_shard) = match shards {
            Ok(shards) => {
                let map = build_host_to_shard_map(&shards).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "no host-to-shard map, grouping by host");
                    HostToShardMap::new()
                });
                (Some(TopologySummary::from_records(&shards)), map)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch shard topology");
                (None, HostToShardMap::new())
            }
        };

        let chunks = fetched(chunks, "chunk counts");
        let databases = fetched(databases, "database totals");
        let collections = fetched(collections, "sharded collection count");

        let topology = if summary.is_none()
            && chunks.is_none()
            && databases.is_none()
            && collections.is_none()
        {
            None
        } else {
            let mut summary = summary.unwrap_or_default();
            if let Some(chunks) = &chunks {
                summary = summary.with_chunks(chunks);
            }
            if let Some(databases) = &databases {
                summary = summary.with_databases(databases);
            }
            if let Some(collections) = collections {
                summary = summary.with_collections(collections);
            }
            Some(summary)
        };

        let conn_pool_stats = conn_pool
            .map_err(|e| tracing::error!(error = %e, "failed to fetch connPoolStats"))
            .ok()
            .and_then(|reply| {
                ConnPoolStats::decode(&reply, Some(&host_to_shard))
                    .map_err(|e| tracing::error!(error = %e, "failed to decode connPoolStats"))
                    .ok()
            });

        let shard_conn_pool_stats = shard_conn_pool
            .map_err(|e| tracing::error!(error = %e, "failed to fetch shardConnPoolStats"))
            .ok()
            .and_then(|reply| {
                ShardConnPoolStats::decode(&reply, Some(&host_to_shard))
                    .map_err(|e| tracing::error!(error = %e, "failed to decode shardConnPoolStats"))
                    .ok()
            });

        let server_status = server_status
            .map_err(|e| tracing::error!(error = %e, "failed to fetch serverStatus"))
            .ok()
            .and_then(|reply| {
                ServerStatus::decode(&reply)
                    .map_err(|e| tracing::error!(error = %e, "failed to decode serverStatus"))
                    .ok()
            });

        tracing::debug!(
            hosts = host_to_shard.len(),
            pools = conn_pool_stats.as_ref().map_or(0, |s| s.pools.len()),
            "collection cycle finished"
        );

        ClusterSnapshot {
            topology,
            conn_pool_stats,
            shard_conn_pool_stats,
            server_status,
        }
    }
}

fn fetched<T>(result: Result<T, SourceError>, what: &str) -> Option<T> {
    result
        .map_err(|e| tracing::error!(error = %e, "failed to fetch {}", what))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{simulated_metrics, SimulatedMetrics};
    use crate::stats::{document_from_json, RawDocument};
    use crate::topology::{DatabaseTotal, ShardChunkInfo, ShardTopologyRecord};

    #[derive(Default)]
    struct FixtureSource {
        shards: Option<Vec<ShardTopologyRecord>>,
        chunks: Option<Vec<ShardChunkInfo>>,
        databases: Option<Vec<DatabaseTotal>>,
        collections: Option<f64>,
        conn_pool: Option<&'static str>,
        shard_conn_pool: Option<&'static str>,
        server_status: Option<&'static str>,
    }

    fn load(text: Option<&'static str>, what: &'static str) -> Result<RawDocument, SourceError> {
        text.and_then(|t| document_from_json(t).ok().flatten())
            .ok_or(SourceError::Unavailable(what))
    }

    impl StatsSource for FixtureSource {
        async fn conn_pool_stats(&self) -> Result<RawDocument, SourceError> {
            load(self.conn_pool, "connPoolStats")
        }

        async fn shard_conn_pool_stats(&self) -> Result<RawDocument, SourceError> {
            load(self.shard_conn_pool, "shardConnPoolStats")
        }

        async fn server_status(&self) -> Result<RawDocument, SourceError> {
            load(self.server_status, "serverStatus")
        }

        async fn shards(&self) -> Result<Vec<ShardTopologyRecord>, SourceError> {
            self.shards.clone().ok_or(SourceError::Unavailable("shards"))
        }

        async fn shard_chunks(&self) -> Result<Vec<ShardChunkInfo>, SourceError> {
            self.chunks.clone().ok_or(SourceError::Unavailable("chunks"))
        }

        async fn database_totals(&self) -> Result<Vec<DatabaseTotal>, SourceError> {
            self.databases.clone().ok_or(SourceError::Unavailable("databases"))
        }

        async fn sharded_collections(&self) -> Result<f64, SourceError> {
            self.collections.ok_or(SourceError::Unavailable("collections"))
        }
    }

    const CONN_POOL: &str = r#"{
        "totalInUse": 1,
        "pools": {"global": {"poolInUse": 1, "a:1": {"inUse": 1}, "b:1": {"inUse": 2}, "z:9": {"inUse": 4}}},
        "ok": 1
    }"#;

    const SERVER_STATUS: &str = r#"{
        "shardingStatistics": {"catalogCache": {"numDatabaseEntries": 3, "countFailedRefreshes": 2}},
        "apCounters": {"readAp": 7, "write_slowlog": 1},
        "ok": 1
    }"#;

    #[tokio::test]
    async fn test_collect_groups_by_shard() {
        let collector = Collector::new(FixtureSource {
            shards: Some(vec![
                ShardTopologyRecord::new("shard1", "rs1/a:1,b:1"),
                ShardTopologyRecord::new("shard2", "rs2/c:1").with_draining(true),
            ]),
            conn_pool: Some(CONN_POOL),
            shard_conn_pool: Some(r#"{"ok": 0}"#),
            ..Default::default()
        });

        let snapshot = collector.collect().await;

        let topology = snapshot.topology.unwrap();
        assert_eq!(topology.total_shards, 2);
        assert_eq!(topology.draining_shards, 1);

        let global = &snapshot.conn_pool_stats.as_ref().unwrap().pools["global"];
        assert_eq!(global.shard_status.len(), 2);
        assert_eq!(global.shard_status["rs1"].in_use, 3.0);
        assert_eq!(global.shard_status["other"].in_use, 4.0);

        assert!(snapshot.shard_conn_pool_stats.is_none());
        assert!(snapshot.server_status.is_none());
    }

    #[tokio::test]
    async fn test_collect_without_topology_keeps_hosts() {
        let collector = Collector::new(FixtureSource {
            conn_pool: Some(CONN_POOL),
            ..Default::default()
        });

        let snapshot = collector.collect().await;
        assert!(snapshot.topology.is_none());

        let global = &snapshot.conn_pool_stats.as_ref().unwrap().pools["global"];
        assert_eq!(global.shard_status.len(), 3);
        assert!(global.shard_status.contains_key("z:9"));
    }

    #[tokio::test]
    async fn test_collect_topology_counts() {
        let collector = Collector::new(FixtureSource {
            shards: Some(vec![
                ShardTopologyRecord::new("shard1", "rs1/a:1"),
                ShardTopologyRecord::new("shard2", "rs2/b:1"),
            ]),
            chunks: Some(vec![ShardChunkInfo {
                shard: "shard1".into(),
                chunks: 30.0,
            }]),
            databases: Some(vec![
                DatabaseTotal {
                    partitioned: true,
                    total: 2.0,
                },
                DatabaseTotal {
                    partitioned: false,
                    total: 4.0,
                },
            ]),
            collections: Some(6.0),
            server_status: Some(SERVER_STATUS),
            ..Default::default()
        });

        let snapshot = collector.collect().await;

        let topology = snapshot.topology.as_ref().unwrap();
        assert_eq!(topology.total_chunks, 30.0);
        assert_eq!(topology.shard_chunks["shard2"], 0.0);
        assert_eq!(topology.partitioned_databases, 2.0);
        assert_eq!(topology.unpartitioned_databases, 4.0);
        assert_eq!(topology.total_collections, 6.0);

        let status = snapshot.server_status.unwrap();
        let cache = status.sharding_statistics.unwrap().catalog_cache;
        assert_eq!(cache.num_database_entries, 3.0);
        assert_eq!(cache.count_failed_refreshes, 2.0);
        assert_eq!(status.ap_counters.unwrap().read_ap, 7.0);
    }

    #[tokio::test]
    async fn test_topology_from_counts_alone() {
        let collector = Collector::new(FixtureSource {
            collections: Some(2.0),
            ..Default::default()
        });

        let topology = collector.collect().await.topology.unwrap();
        assert_eq!(topology.total_shards, 0);
        assert_eq!(topology.total_collections, 2.0);
        assert!(topology.shard_chunks.is_empty());
    }

    #[tokio::test]
    async fn test_total_failure_is_an_empty_snapshot() {
        let collector = Collector::new(FixtureSource::default());

        let snapshot = collector.collect().await;
        assert!(snapshot.is_empty());

        let metrics = SimulatedMetrics::new();
        snapshot.export(&metrics);
        assert!(metrics.get_recorded().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_export() {
        let collector = Collector::new(FixtureSource {
            shards: Some(vec![ShardTopologyRecord::new("shard1", "rs1/a:1")]),
            conn_pool: Some(CONN_POOL),
            server_status: Some(SERVER_STATUS),
            ..Default::default()
        });
        assert!(collector.source().server_status.is_some());

        let metrics = simulated_metrics();
        collector.collect().await.export(metrics.as_ref());

        assert_eq!(metrics.value_of("sharding.shards_total", &[]), Some(1.0));
        assert_eq!(
            metrics.value_of("connpoolstats.in_use_preshard", &["set:rs1", "pool:global"]),
            Some(1.0)
        );
        assert_eq!(
            metrics.value_of("catalog_cache.num_database_entries", &[]),
            Some(3.0)
        );
        assert_eq!(metrics.value_of("ap_counters_total", &["type:readap"]), Some(7.0));
    }
}

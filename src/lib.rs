pub mod collector;
pub mod config;
pub mod observability;
pub mod stats;
pub mod topology;

pub use collector::{ClusterSnapshot, Collector, FileSource, StatsSource};
pub use config::{CollectorConfig, ConfigError};
pub use stats::{
    aggregate_pools, analyze_pools, AggregationResult, ConnPoolStats, DocValue, HostConnStats,
    PoolConnStats, RawDocument, ServerStatus, ShardConnPoolStats,
};
pub use topology::{
    build_host_to_shard_map, parse_shard_hosts, DatabaseTotal, HostToShardMap, ShardChunkInfo,
    ShardTopologyRecord, TopologySummary,
};

//! Connection-Pool Statistics Decoding
//!
//! Turns schema-less monitoring documents into typed, shard-grouped
//! statistics:
//!
//! - **value**: the dynamic document model
//! - **normalize**: lenient numeric widening to `f64`
//! - **host** / **pool**: typed decoders for one host and one pool
//! - **aggregate**: per-shard regrouping of every pool
//! - **command**: whole `connPoolStats` / `shardConnPoolStats` replies
//! - **server_status**: catalog cache and `apCounters` sections of `serverStatus`
//!
//! Nothing here performs I/O or keeps state between calls. A malformed
//! field, host or pool is logged and dropped at the smallest unit that
//! contains it.

mod aggregate;
mod command;
mod host;
mod normalize;
mod pool;
mod server_status;
mod value;

pub use aggregate::{aggregate_pools, analyze_pools, group_by_shard, AggregationResult, OTHER_SHARD};
pub use command::{ConnPoolStats, ReplicaSetStats, ShardConnPoolStats, StatsError, GLOBAL_POOL};
pub use host::{decode_host_stats, HostConnStats};
pub use normalize::{convert_fallback, to_f64};
pub use pool::{decode_pool_stats, is_host_key, PoolConnStats};
pub use server_status::{ApCounters, CatalogCache, ServerStatus, ShardingStatistics};
pub use value::{document_from_json, DocValue, RawDocument};

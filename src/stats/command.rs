//! Decoders for whole monitoring command responses
//!
//! `connPoolStats` and `shardConnPoolStats` replies carry a handful of
//! totals next to the open-ended `pools` document. Totals are read
//! leniently through the normalizer; pools go through shard aggregation.

use serde::Serialize;
use std::collections::BTreeMap;

use super::aggregate::{analyze_pools, AggregationResult};
use super::normalize::to_f64;
use super::pool::PoolConnStats;
use super::value::{DocValue, RawDocument};
use crate::topology::HostToShardMap;

/// Name of the pool reported by `shardConnPoolStats`
pub const GLOBAL_POOL: &str = "global";

/// Error type for command response decoding
#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    /// The server answered with `ok` other than 1
    CommandFailed { command: &'static str, ok: f64 },
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsError::CommandFailed { command, ok } => {
                write!(f, "{} failed: ok = {}", command, ok)
            }
        }
    }
}

impl std::error::Error for StatsError {}

/// Per replica set refresh limiter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSetStats {
    pub refresh_limiter: f64,
}

/// Decoded `connPoolStats` reply
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnPoolStats {
    pub num_client_connections: f64,
    pub num_a_scoped_connections: f64,
    pub total_in_use: f64,
    pub total_available: f64,
    pub total_created: f64,
    pub total_refreshing: f64,
    pub total_req_queue_limit: f64,
    pub pools: AggregationResult,
    pub replica_sets: BTreeMap<String, ReplicaSetStats>,
}

impl ConnPoolStats {
    pub fn decode(
        reply: &RawDocument,
        host_to_shard: Option<&HostToShardMap>,
    ) -> Result<Self, StatsError> {
        check_ok("connPoolStats", reply)?;

        Ok(ConnPoolStats {
            num_client_connections: number(reply, "numClientConnections"),
            num_a_scoped_connections: number(reply, "numAScopedConnections"),
            total_in_use: number(reply, "totalInUse"),
            total_available: number(reply, "totalAvailable"),
            total_created: number(reply, "totalCreated"),
            total_refreshing: number(reply, "totalRefreshing"),
            total_req_queue_limit: number(reply, "totalReqQueueLimit"),
            pools: pools(reply, host_to_shard).unwrap_or_default(),
            replica_sets: replica_sets(reply),
        })
    }
}

/// Decoded `shardConnPoolStats` reply
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardConnPoolStats {
    pub total_in_use: f64,
    pub total_available: f64,
    pub total_created: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_pool: Option<PoolConnStats>,
}

impl ShardConnPoolStats {
    pub fn decode(
        reply: &RawDocument,
        host_to_shard: Option<&HostToShardMap>,
    ) -> Result<Self, StatsError> {
        check_ok("shardConnPoolStats", reply)?;

        let global_pool = pools(reply, host_to_shard).and_then(|mut p| p.remove(GLOBAL_POOL));

        Ok(ShardConnPoolStats {
            total_in_use: number(reply, "totalInUse"),
            total_available: number(reply, "totalAvailable"),
            total_created: number(reply, "totalCreated"),
            global_pool,
        })
    }
}

pub(super) fn check_ok(command: &'static str, reply: &RawDocument) -> Result<(), StatsError> {
    let ok = number(reply, "ok");
    if ok as i64 != 1 {
        return Err(StatsError::CommandFailed { command, ok });
    }
    Ok(())
}

pub(super) fn number(doc: &RawDocument, key: &str) -> f64 {
    doc.get(key).map(to_f64).unwrap_or(0.0)
}

fn pools(reply: &RawDocument, host_to_shard: Option<&HostToShardMap>) -> Option<AggregationResult> {
    match reply.get("pools") {
        None | Some(DocValue::Null) => None,
        Some(DocValue::Document(pools)) => analyze_pools(pools, host_to_shard),
        Some(other) => {
            tracing::warn!(kind = other.type_name(), "pools field is not a document");
            None
        }
    }
}

fn replica_sets(reply: &RawDocument) -> BTreeMap<String, ReplicaSetStats> {
    let Some(sets) = reply.get("replicaSets").and_then(DocValue::as_document) else {
        return BTreeMap::new();
    };

    sets.iter()
        .filter(|(name, _)| !name.is_empty())
        .filter_map(|(name, value)| {
            let doc = value.as_document()?;
            let refresh_limiter = doc.get("refreshLimiter").map(to_f64).unwrap_or(0.0);
            Some((name.clone(), ReplicaSetStats { refresh_limiter }))
        })
        .collect()
}

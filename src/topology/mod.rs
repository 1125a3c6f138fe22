//! Shard Topology
//!
//! Parses shard records from cluster metadata and inverts their member
//! lists into the host-to-shard lookup used by shard aggregation. Chunk,
//! database and collection counts from the config metadata are folded into
//! [`TopologySummary`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Physical host address to logical shard name
pub type HostToShardMap = HashMap<String, String>;

/// One shard as described by cluster metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTopologyRecord {
    #[serde(rename = "_id")]
    pub shard_name: String,
    /// Member list, `setName/host1:port,host2:port` for replica-set shards
    #[serde(rename = "host")]
    pub host_field: String,
    #[serde(default)]
    pub draining: bool,
}

impl ShardTopologyRecord {
    pub fn new(shard_name: impl Into<String>, host_field: impl Into<String>) -> Self {
        ShardTopologyRecord {
            shard_name: shard_name.into(),
            host_field: host_field.into(),
            draining: false,
        }
    }

    pub fn with_draining(mut self, draining: bool) -> Self {
        self.draining = draining;
        self
    }
}

/// Error type for topology handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Host field is not of the form `setName/host1,host2`
    InvalidShardHost(String),
    /// Topology source returned no shards
    NoShards,
}

impl std::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::InvalidShardHost(host) => write!(f, "invalid shard host: {:?}", host),
            TopologyError::NoShards => write!(f, "no shard info available"),
        }
    }
}

impl std::error::Error for TopologyError {}

/// Split a replica-set host field into its set name and member addresses.
///
/// A bare single-host address (no `/`) is rejected as well; callers skip
/// such shards.
pub fn parse_shard_hosts(host: &str) -> Result<(String, Vec<String>), TopologyError> {
    let invalid = || TopologyError::InvalidShardHost(host.to_string());

    let (set_name, members) = host.split_once('/').ok_or_else(invalid)?;
    if set_name.is_empty() {
        return Err(invalid());
    }

    let members: Vec<String> = members
        .split(',')
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    if members.is_empty() {
        return Err(invalid());
    }

    Ok((set_name.to_string(), members))
}

/// Invert shard member lists into a host lookup.
///
/// Records with an unparseable host field are logged and skipped. When two
/// shards claim the same address the first one wins.
pub fn build_host_to_shard_map(
    shards: &[ShardTopologyRecord],
) -> Result<HostToShardMap, TopologyError> {
    if shards.is_empty() {
        return Err(TopologyError::NoShards);
    }

    let mut map = HostToShardMap::new();
    for shard in shards {
        if shard.host_field.is_empty() {
            continue;
        }
        let (set_name, members) = match parse_shard_hosts(&shard.host_field) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(shard = %shard.shard_name, error = %e, "skipping shard");
                continue;
            }
        };
        for member in members {
            map.entry(member).or_insert_with(|| set_name.clone());
        }
    }

    tracing::debug!(hosts = map.len(), shards = shards.len(), "built host-to-shard map");
    Ok(map)
}

/// Chunk count of one shard, as grouped from the chunk metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardChunkInfo {
    #[serde(rename = "_id")]
    pub shard: String,
    #[serde(rename = "count")]
    pub chunks: f64,
}

/// Number of databases with the given partitioned flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseTotal {
    #[serde(rename = "_id")]
    pub partitioned: bool,
    pub total: f64,
}

/// Shard, chunk, database and collection counts for the topology gauges
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySummary {
    pub total_shards: usize,
    pub draining_shards: usize,
    pub total_chunks: f64,
    pub shard_chunks: BTreeMap<String, f64>,
    pub partitioned_databases: f64,
    pub unpartitioned_databases: f64,
    pub total_collections: f64,
}

impl TopologySummary {
    pub fn from_records(shards: &[ShardTopologyRecord]) -> Self {
        TopologySummary {
            total_shards: shards.len(),
            draining_shards: shards.iter().filter(|s| s.draining).count(),
            shard_chunks: shards.iter().map(|s| (s.shard_name.clone(), 0.0)).collect(),
            ..Default::default()
        }
    }

    /// Per-shard chunk counts. Known shards without chunks stay at zero and
    /// the total is the sum over all shards.
    pub fn with_chunks(mut self, chunks: &[ShardChunkInfo]) -> Self {
        for info in chunks {
            if info.shard.is_empty() {
                continue;
            }
            *self.shard_chunks.entry(info.shard.clone()).or_insert(0.0) += info.chunks;
        }
        self.total_chunks = self.shard_chunks.values().sum();
        self
    }

    pub fn with_databases(mut self, totals: &[DatabaseTotal]) -> Self {
        self.partitioned_databases = 0.0;
        self.unpartitioned_databases = 0.0;
        for t in totals {
            if t.partitioned {
                self.partitioned_databases += t.total;
            } else {
                self.unpartitioned_databases += t.total;
            }
        }
        self
    }

    pub fn with_collections(mut self, total: f64) -> Self {
        self.total_collections = total;
        self
    }
}

//! Statistics sources
//!
//! A source fetches raw monitoring replies and shard metadata. The
//! collector only sees this trait, so the same cycle runs against a live
//! cluster client, captured files, or an in-memory fixture.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::stats::{document_from_json, to_f64, RawDocument};
use crate::topology::{DatabaseTotal, ShardChunkInfo, ShardTopologyRecord};

pub const CONN_POOL_STATS_FILE: &str = "conn_pool_stats.json";
pub const SHARD_CONN_POOL_STATS_FILE: &str = "shard_conn_pool_stats.json";
pub const SERVER_STATUS_FILE: &str = "server_status.json";
pub const SHARDS_FILE: &str = "shards.json";
pub const CHUNKS_FILE: &str = "chunks.json";
pub const DATABASES_FILE: &str = "databases.json";
pub const COLLECTIONS_FILE: &str = "collections.json";

/// Error returned when a fetch fails
#[derive(Debug)]
pub enum SourceError {
    /// Underlying read failed
    Io(PathBuf, std::io::Error),
    /// Payload is not valid JSON of the expected shape
    Decode(PathBuf, String),
    /// Source has nothing for this group
    Unavailable(&'static str),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(path, e) => write!(f, "failed to read {}: {}", path.display(), e),
            SourceError::Decode(path, e) => {
                write!(f, "failed to decode {}: {}", path.display(), e)
            }
            SourceError::Unavailable(what) => write!(f, "{} unavailable", what),
        }
    }
}

impl std::error::Error for SourceError {}

/// Fetches the raw inputs of one collection cycle
pub trait StatsSource: Send + Sync {
    /// Reply of the `connPoolStats` command
    fn conn_pool_stats(&self) -> impl Future<Output = Result<RawDocument, SourceError>> + Send;

    /// Reply of the `shardConnPoolStats` command
    fn shard_conn_pool_stats(
        &self,
    ) -> impl Future<Output = Result<RawDocument, SourceError>> + Send;

    /// Reply of the `serverStatus` command
    fn server_status(&self) -> impl Future<Output = Result<RawDocument, SourceError>> + Send;

    /// Shard records from cluster metadata
    fn shards(&self) -> impl Future<Output = Result<Vec<ShardTopologyRecord>, SourceError>> + Send;

    /// Chunk counts grouped by owning shard
    fn shard_chunks(&self) -> impl Future<Output = Result<Vec<ShardChunkInfo>, SourceError>> + Send;

    /// Database counts grouped by the partitioned flag
    fn database_totals(
        &self,
    ) -> impl Future<Output = Result<Vec<DatabaseTotal>, SourceError>> + Send;

    /// Number of sharded collections
    fn sharded_collections(&self) -> impl Future<Output = Result<f64, SourceError>> + Send;
}

/// Reads captured replies from a directory of JSON files
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSource { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read(&self, name: &str) -> Result<(PathBuf, String), SourceError> {
        let path = self.dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok((path, text)),
            Err(e) => Err(SourceError::Io(path, e)),
        }
    }

    async fn read_document(&self, name: &str) -> Result<RawDocument, SourceError> {
        let (path, text) = self.read(name).await?;
        match document_from_json(&text) {
            Ok(Some(doc)) => Ok(doc),
            Ok(None) => Err(SourceError::Decode(path, "top level is not an object".into())),
            Err(e) => Err(SourceError::Decode(path, e.to_string())),
        }
    }

    async fn read_records<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, SourceError> {
        let (path, text) = self.read(name).await?;
        serde_json::from_str(&text).map_err(|e| SourceError::Decode(path, e.to_string()))
    }
}

impl StatsSource for FileSource {
    async fn conn_pool_stats(&self) -> Result<RawDocument, SourceError> {
        self.read_document(CONN_POOL_STATS_FILE).await
    }

    async fn shard_conn_pool_stats(&self) -> Result<RawDocument, SourceError> {
        self.read_document(SHARD_CONN_POOL_STATS_FILE).await
    }

    async fn server_status(&self) -> Result<RawDocument, SourceError> {
        self.read_document(SERVER_STATUS_FILE).await
    }

    async fn shards(&self) -> Result<Vec<ShardTopologyRecord>, SourceError> {
        self.read_records(SHARDS_FILE).await
    }

    async fn shard_chunks(&self) -> Result<Vec<ShardChunkInfo>, SourceError> {
        self.read_records(CHUNKS_FILE).await
    }

    async fn database_totals(&self) -> Result<Vec<DatabaseTotal>, SourceError> {
        self.read_records(DATABASES_FILE).await
    }

    /// `collections.json` holds `{"count": n}`
    async fn sharded_collections(&self) -> Result<f64, SourceError> {
        let doc = self.read_document(COLLECTIONS_FILE).await?;
        Ok(doc.get("count").map(to_f64).unwrap_or(0.0))
    }
}

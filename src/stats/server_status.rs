//! `serverStatus` sections reported by a router
//!
//! Only the catalog cache (under `shardingStatistics`) and the `apCounters`
//! section are decoded; the rest of the reply is ignored. A section that is
//! absent or not a document is left out of the result.

use serde::Serialize;

use super::command::{check_ok, number, StatsError};
use super::value::{DocValue, RawDocument};

/// Routing-table cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCache {
    pub num_database_entries: f64,
    pub num_collection_entries: f64,
    pub count_stale_config_errors: f64,
    pub total_refresh_wait_time_micros: f64,
    pub num_active_incremental_refreshes: f64,
    pub count_incremental_refreshes_started: f64,
    pub num_active_full_refreshes: f64,
    pub count_full_refreshes_started: f64,
    pub count_failed_refreshes: f64,
}

impl CatalogCache {
    pub fn decode(doc: &RawDocument) -> Self {
        CatalogCache {
            num_database_entries: number(doc, "numDatabaseEntries"),
            num_collection_entries: number(doc, "numCollectionEntries"),
            count_stale_config_errors: number(doc, "countStaleConfigErrors"),
            total_refresh_wait_time_micros: number(doc, "totalRefreshWaitTimeMicros"),
            num_active_incremental_refreshes: number(doc, "numActiveIncrementalRefreshes"),
            count_incremental_refreshes_started: number(doc, "countIncrementalRefreshesStarted"),
            num_active_full_refreshes: number(doc, "numActiveFullRefreshes"),
            count_full_refreshes_started: number(doc, "countFullRefreshesStarted"),
            count_failed_refreshes: number(doc, "countFailedRefreshes"),
        }
    }
}

/// The `shardingStatistics` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardingStatistics {
    pub catalog_cache: CatalogCache,
}

impl ShardingStatistics {
    pub fn decode(doc: &RawDocument) -> Self {
        ShardingStatistics {
            catalog_cache: section(doc, "catalogCache")
                .map(CatalogCache::decode)
                .unwrap_or_default(),
        }
    }
}

/// Analytical-read and slow-log counters of the `apCounters` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApCounters {
    pub read_ap: f64,
    pub read_tp: f64,
    pub error_ap_executor_pool: f64,
    pub read_slow_log: f64,
    pub read_ap_slow_log: f64,
    pub read_d_slow_log: f64,
    pub read_ap_d_slow_log: f64,
    pub read_un_slow_log: f64,
    pub write_slow_log: f64,
    pub fam_slow_log: f64,
    pub cmd_slow_log: f64,
    pub limit_for_legacy: f64,
    pub limit_for_asio_req_q: f64,
    pub limit_for_refresh: f64,
}

impl ApCounters {
    pub fn decode(doc: &RawDocument) -> Self {
        ApCounters {
            read_ap: number(doc, "readAp"),
            read_tp: number(doc, "readTp"),
            error_ap_executor_pool: number(doc, "error_apexecutor_pool"),
            read_slow_log: number(doc, "read_slowlog"),
            read_ap_slow_log: number(doc, "read_ap_slowlog"),
            read_d_slow_log: number(doc, "read_d_slowlog"),
            read_ap_d_slow_log: number(doc, "read_ap_d_slowlog"),
            read_un_slow_log: number(doc, "read_un_slowlog"),
            write_slow_log: number(doc, "write_slowlog"),
            fam_slow_log: number(doc, "fam_slowlog"),
            cmd_slow_log: number(doc, "cmd_slowlog"),
            limit_for_legacy: number(doc, "limitForLegacy"),
            limit_for_asio_req_q: number(doc, "limitForAsioReqQ"),
            limit_for_refresh: number(doc, "limitForRefresh"),
        }
    }

    /// Counter values paired with their exported `type` label
    pub fn labeled(&self) -> [(&'static str, f64); 14] {
        [
            ("readap", self.read_ap),
            ("readtp", self.read_tp),
            ("error_ap_exec", self.error_ap_executor_pool),
            ("r_s_l", self.read_slow_log),
            ("r_a_s_l", self.read_ap_slow_log),
            ("r_d_s_l", self.read_d_slow_log),
            ("r_a_d_s_l", self.read_ap_d_slow_log),
            ("r_un_s_l", self.read_un_slow_log),
            ("w_s_l", self.write_slow_log),
            ("c_s_l", self.cmd_slow_log),
            ("f_s_l", self.fam_slow_log),
            ("limitForLegacy", self.limit_for_legacy),
            ("limitForAsioReqQ", self.limit_for_asio_req_q),
            ("limitForRefresh", self.limit_for_refresh),
        ]
    }
}

/// Decoded `serverStatus` reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharding_statistics: Option<ShardingStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ap_counters: Option<ApCounters>,
}

impl ServerStatus {
    pub fn decode(reply: &RawDocument) -> Result<Self, StatsError> {
        check_ok("serverStatus", reply)?;

        Ok(ServerStatus {
            sharding_statistics: section(reply, "shardingStatistics").map(ShardingStatistics::decode),
            ap_counters: section(reply, "apCounters").map(ApCounters::decode),
        })
    }
}

fn section<'a>(doc: &'a RawDocument, key: &str) -> Option<&'a RawDocument> {
    match doc.get(key)? {
        DocValue::Document(section) => Some(section),
        DocValue::Null => None,
        other => {
            tracing::warn!(section = key, kind = other.type_name(), "section is not a document");
            None
        }
    }
}

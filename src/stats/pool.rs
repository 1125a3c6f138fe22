//! Per-pool connection counters

use serde::Serialize;
use std::collections::BTreeMap;

use super::host::{decode_host_stats, HostConnStats};
use super::normalize::to_f64;
use super::value::DocValue;

/// One named connection pool and its per-member breakdown.
///
/// `shard_status` is keyed by raw host address straight out of the decoder
/// and by shard name once grouped. Keys are opaque labels either way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConnStats {
    pub pool_in_use: f64,
    pub pool_available: f64,
    pub pool_created: f64,
    pub pool_refreshing: f64,
    pub pool_req_queue_limit: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub shard_status: BTreeMap<String, HostConnStats>,
}

/// True when a pool key names a member host rather than a pool counter
#[inline]
pub fn is_host_key(key: &str) -> bool {
    key.contains(':')
}

/// Decode one pool sub-document.
///
/// Returns `None` for `Null`, an empty document, or a value that is not a
/// document at all. Within a pool, a bad host entry only drops that entry.
pub fn decode_pool_stats(value: &DocValue) -> Option<PoolConnStats> {
    let doc = match value {
        DocValue::Null => return None,
        DocValue::Document(doc) if doc.is_empty() => return None,
        DocValue::Document(doc) => doc,
        other => {
            tracing::warn!(kind = other.type_name(), "pool stats entry is not a document");
            return None;
        }
    };

    let mut pool = PoolConnStats::default();
    for (key, value) in doc {
        match key.as_str() {
            "" => continue,
            "poolInUse" => pool.pool_in_use = to_f64(value),
            "poolAvailable" => pool.pool_available = to_f64(value),
            "poolCreated" => pool.pool_created = to_f64(value),
            "poolRefreshing" => pool.pool_refreshing = to_f64(value),
            "poolReqQueueLimit" => pool.pool_req_queue_limit = to_f64(value),
            host if is_host_key(host) => {
                if let Some(stats) = decode_host_stats(value) {
                    pool.shard_status.insert(host.to_string(), stats);
                }
            }
            _ => tracing::warn!(key = %key, value = ?value, "invalid pool stats key"),
        }
    }
    Some(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::value::document_from_json;

    const POOL: &str = r#"{
        "poolInUse" : 1,
        "poolAvailable" : 3,
        "poolCreated" : 614,
        "poolRefreshing" : 0,
        "poolReqQueueLimit" : 0,
        "10.34.62.46:15350" : {"inUse" : 0, "available" : 1, "created" : 66, "refreshing" : 0, "reqQueueLimit" : 0},
        "10.34.60.45:15350" : {"inUse" : 0, "available" : 1, "created" : 56, "refreshing" : 0, "reqQueueLimit" : 0},
        "10.34.60.43:15350" : {"inUse" : 1, "available" : 1, "created" : 492, "refreshing" : 0, "reqQueueLimit" : 0}
    }"#;

    fn parse(text: &str) -> DocValue {
        DocValue::Document(document_from_json(text).unwrap().unwrap())
    }

    #[test]
    fn test_decode_pool_stats() {
        let pool = decode_pool_stats(&parse(POOL)).unwrap();

        assert_eq!(pool.pool_in_use, 1.0);
        assert_eq!(pool.pool_available, 3.0);
        assert_eq!(pool.pool_created, 614.0);
        assert_eq!(pool.pool_refreshing, 0.0);
        assert_eq!(pool.pool_req_queue_limit, 0.0);
        assert_eq!(pool.shard_status.len(), 3);

        for host in ["10.34.62.46:15350", "10.34.60.45:15350", "10.34.60.43:15350"] {
            assert!(pool.shard_status.contains_key(host), "missing {}", host);
        }
        assert_eq!(pool.shard_status["10.34.60.43:15350"].created, 492.0);
    }

    #[test]
    fn test_malformed_host_entry_is_isolated() {
        let pool = decode_pool_stats(&parse(
            r#"{"poolInUse": 2, "h1:1": 17, "h2:1": {"inUse": 4}, "h3:1": null}"#,
        ))
        .unwrap();

        assert_eq!(pool.pool_in_use, 2.0);
        assert_eq!(pool.shard_status.len(), 1);
        assert_eq!(pool.shard_status["h2:1"].in_use, 4.0);
    }

    #[test]
    fn test_unknown_scalar_keys_are_skipped() {
        let pool = decode_pool_stats(&parse(r#"{"poolInUse": 1, "poolLeased": 5}"#)).unwrap();
        assert_eq!(pool.pool_in_use, 1.0);
        assert!(pool.shard_status.is_empty());
    }

    #[test]
    fn test_empty_or_missing_pool() {
        assert_eq!(decode_pool_stats(&DocValue::Null), None);
        assert_eq!(decode_pool_stats(&parse("{}")), None);
        assert_eq!(decode_pool_stats(&DocValue::Bool(true)), None);
    }

    #[test]
    fn test_is_host_key() {
        assert!(is_host_key("10.0.0.1:27017"));
        assert!(is_host_key("[::1]:27017"));
        assert!(!is_host_key("poolInUse"));
    }
}

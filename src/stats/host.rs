//! Per-host connection counters

use serde::Serialize;
use std::ops::{Add, AddAssign};

use super::normalize::to_f64;
use super::value::DocValue;

/// Connection-pool counters for one host (or, after grouping, one shard)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConnStats {
    pub in_use: f64,
    pub available: f64,
    pub created: f64,
    pub refreshing: f64,
    pub req_queue_limit: f64,
}

impl HostConnStats {
    /// Pairwise sum with another record; an absent operand leaves `self` as is
    pub fn combine(self, other: Option<&HostConnStats>) -> HostConnStats {
        match other {
            Some(other) => self + *other,
            None => self,
        }
    }
}

impl Add for HostConnStats {
    type Output = HostConnStats;

    fn add(self, rhs: HostConnStats) -> HostConnStats {
        HostConnStats {
            in_use: self.in_use + rhs.in_use,
            available: self.available + rhs.available,
            created: self.created + rhs.created,
            refreshing: self.refreshing + rhs.refreshing,
            req_queue_limit: self.req_queue_limit + rhs.req_queue_limit,
        }
    }
}

impl AddAssign<&HostConnStats> for HostConnStats {
    fn add_assign(&mut self, rhs: &HostConnStats) {
        *self = *self + *rhs;
    }
}

/// Decode one host sub-document.
///
/// `Null` yields `None` silently. A value that is not a document is logged
/// and yields `None`, leaving sibling hosts unaffected. Unknown keys are
/// logged and skipped.
pub fn decode_host_stats(value: &DocValue) -> Option<HostConnStats> {
    let doc = match value {
        DocValue::Null => return None,
        DocValue::Document(doc) => doc,
        other => {
            tracing::warn!(kind = other.type_name(), "host stats entry is not a document");
            return None;
        }
    };

    let mut stats = HostConnStats::default();
    for (key, value) in doc {
        match key.as_str() {
            "" => continue,
            "inUse" => stats.in_use = to_f64(value),
            "available" => stats.available = to_f64(value),
            "created" => stats.created = to_f64(value),
            "refreshing" => stats.refreshing = to_f64(value),
            "reqQueueLimit" => stats.req_queue_limit = to_f64(value),
            _ => tracing::warn!(key = %key, value = ?value, "invalid host stats key"),
        }
    }
    Some(stats)
}

//! Node identity and health (spec §3.3).

use crate::ids::{NodeId, RegionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    Active,
    Inactive,
    Suspicious,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub node_id: NodeId,
    pub pub_key: Vec<u8>,
    pub status: NodeStatus,
    /// Monotonic; bumped every time this node restarts with fresh
    /// ephemeral state, so peers can distinguish a stale LSA from a
    /// post-restart one sharing the same version counter (spec §3.3).
    pub incarnation: u64,
    pub last_seen: DateTime<Utc>,
    pub platform: String,
    pub version: String,
    pub region_id: Option<RegionId>,
    pub address: String,
    pub port: u16,
}

impl Node {
    /// A health check observing `status` transitions — never lets a
    /// `Failed` node silently resurrect without its incarnation moving
    /// forward (spec §3.3 "mutated by health checks").
    pub fn observe_status(&mut self, status: NodeStatus, observed_at: DateTime<Utc>) {
        if self.status == NodeStatus::Failed && status != NodeStatus::Failed {
            self.incarnation += 1;
        }
        self.status = status;
        self.last_seen = observed_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        Node {
            node_id: NodeId::from("node-a"),
            pub_key: vec![1, 2, 3],
            status: NodeStatus::Active,
            incarnation: 1,
            last_seen: Utc::now(),
            platform: "linux/amd64".into(),
            version: "1.0.0".into(),
            region_id: None,
            address: "10.0.0.1".into(),
            port: 7000,
        }
    }

    #[test]
    fn recovering_from_failed_bumps_incarnation() {
        let mut n = node();
        n.observe_status(NodeStatus::Failed, Utc::now());
        assert_eq!(n.incarnation, 1);
        n.observe_status(NodeStatus::Active, Utc::now());
        assert_eq!(n.incarnation, 2);
    }

    #[test]
    fn non_recovery_transitions_dont_bump_incarnation() {
        let mut n = node();
        n.observe_status(NodeStatus::Suspicious, Utc::now());
        assert_eq!(n.incarnation, 1);
    }
}

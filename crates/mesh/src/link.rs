//! Peer links and their live metrics (spec §3.3).

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStatus {
    Up,
    Degraded,
    Down,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkMetrics {
    pub latency_ms: f64,
    pub bandwidth_mbps: f64,
    pub loss_fraction: f64,
    pub utilization_fraction: f64,
}

/// An unordered peer pair, normalized so `(a, b)` and `(b, a)` compare
/// equal and hash identically (spec §3.3: "`(ANode,BNode)` (unordered)").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    a_node: NodeId,
    b_node: NodeId,
    pub metrics: LinkMetrics,
    pub status: LinkStatus,
}

impl Link {
    pub fn new(a: NodeId, b: NodeId, metrics: LinkMetrics, status: LinkStatus) -> Self {
        if a <= b {
            Self {
                a_node: a,
                b_node: b,
                metrics,
                status,
            }
        } else {
            Self {
                a_node: b,
                b_node: a,
                metrics,
                status,
            }
        }
    }

    pub fn endpoints(&self) -> (&NodeId, &NodeId) {
        (&self.a_node, &self.b_node)
    }

    pub fn other(&self, from: &NodeId) -> Option<&NodeId> {
        if &self.a_node == from {
            Some(&self.b_node)
        } else if &self.b_node == from {
            Some(&self.a_node)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> LinkMetrics {
        LinkMetrics {
            latency_ms: 10.0,
            bandwidth_mbps: 1000.0,
            loss_fraction: 0.0,
            utilization_fraction: 0.1,
        }
    }

    #[test]
    fn endpoint_order_is_normalized() {
        let a = NodeId::from("b-node");
        let b = NodeId::from("a-node");
        let link = Link::new(a.clone(), b.clone(), metrics(), LinkStatus::Up);
        assert_eq!(link.endpoints(), (&b, &a));
    }

    #[test]
    fn other_resolves_regardless_of_construction_order() {
        let a = NodeId::from("node-1");
        let b = NodeId::from("node-2");
        let link = Link::new(a.clone(), b.clone(), metrics(), LinkStatus::Up);
        assert_eq!(link.other(&a), Some(&b));
        assert_eq!(link.other(&b), Some(&a));
    }
}

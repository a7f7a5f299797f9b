//! Convergent topology derived from accepted LSAs (spec §3.3, §4.4.3): an
//! arena + index graph (spec §9 design note) — nodes and links live in
//! flat maps, referenced by [`NodeId`] everywhere else.

use crate::ids::NodeId;
use crate::link::LinkMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A monotonically versioned serialized graph (spec §3.3
/// `TopologySnapshot`), used for cold-join and LSA-history compaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    pub version: u64,
    /// Directed weighted adjacency: `node_id -> [(peer, metrics)]`. Stored
    /// directed even though links are unordered at the wire level, since a
    /// probe's measured latency/loss can differ by direction.
    pub adjacency: HashMap<NodeId, Vec<(NodeId, LinkMetrics)>>,
}

impl TopologySnapshot {
    pub fn apply_lsa(&mut self, version: u64, node_id: NodeId, links: Vec<(NodeId, LinkMetrics)>) {
        self.adjacency.insert(node_id, links);
        self.version = self.version.max(version);
    }

    pub fn neighbors(&self, node_id: &NodeId) -> &[(NodeId, LinkMetrics)] {
        self.adjacency
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Route cost, monotone in latency and loss (spec §4.4.3, §9 open
/// question 1: "this spec requires only monotonicity in latency/loss").
/// Bandwidth and utilization temper the cost but never invert the
/// ordering latency/loss impose.
pub fn route_cost(metrics: &LinkMetrics) -> f64 {
    let congestion_penalty = 1.0 + metrics.utilization_fraction.clamp(0.0, 1.0);
    let bandwidth_discount = 1.0 / (1.0 + (metrics.bandwidth_mbps.max(0.0) / 1000.0));
    (metrics.latency_ms.max(0.0) * congestion_penalty * bandwidth_discount)
        + metrics.loss_fraction.clamp(0.0, 1.0) * 1000.0
}

/// Dijkstra over the directed adjacency using [`route_cost`] as edge
/// weight. Ties are broken per spec §4.4.6: lower latency first, then
/// higher bandwidth, then lexicographic node ID — applied when expanding
/// equal-cost candidates so the result is deterministic.
pub fn shortest_paths(topology: &TopologySnapshot, source: &NodeId) -> HashMap<NodeId, (f64, NodeId)> {
    use std::cmp::Ordering;
    use std::collections::BinaryHeap;

    #[derive(PartialEq)]
    struct Candidate {
        cost: f64,
        latency_ms: f64,
        bandwidth_mbps: f64,
        node: NodeId,
        next_hop: NodeId,
    }
    impl Eq for Candidate {}
    impl Ord for Candidate {
        fn cmp(&self, other: &Self) -> Ordering {
            // BinaryHeap is a max-heap; invert for a min-heap on cost, then
            // break ties by lower latency, then higher bandwidth, then node id.
            other
                .cost
                .partial_cmp(&self.cost)
                .unwrap_or(Ordering::Equal)
                .then_with(|| other.latency_ms.partial_cmp(&self.latency_ms).unwrap_or(Ordering::Equal))
                .then_with(|| self.bandwidth_mbps.partial_cmp(&other.bandwidth_mbps).unwrap_or(Ordering::Equal))
                .then_with(|| other.node.cmp(&self.node))
        }
    }
    impl PartialOrd for Candidate {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let mut best: HashMap<NodeId, (f64, NodeId)> = HashMap::new();
    let mut heap = BinaryHeap::new();

    for (peer, metrics) in topology.neighbors(source) {
        heap.push(Candidate {
            cost: route_cost(metrics),
            latency_ms: metrics.latency_ms,
            bandwidth_mbps: metrics.bandwidth_mbps,
            node: peer.clone(),
            next_hop: peer.clone(),
        });
    }

    while let Some(Candidate {
        cost,
        node,
        next_hop,
        ..
    }) = heap.pop()
    {
        if let Some((existing_cost, _)) = best.get(&node) {
            if *existing_cost <= cost {
                continue;
            }
        }
        best.insert(node.clone(), (cost, next_hop.clone()));

        for (peer, metrics) in topology.neighbors(&node) {
            if peer == source {
                continue;
            }
            let extended = cost + route_cost(metrics);
            heap.push(Candidate {
                cost: extended,
                latency_ms: metrics.latency_ms,
                bandwidth_mbps: metrics.bandwidth_mbps,
                node: peer.clone(),
                next_hop: next_hop.clone(),
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(latency_ms: f64, loss: f64) -> LinkMetrics {
        LinkMetrics {
            latency_ms,
            bandwidth_mbps: 1000.0,
            loss_fraction: loss,
            utilization_fraction: 0.0,
        }
    }

    #[test]
    fn higher_latency_never_produces_lower_cost() {
        let low = route_cost(&metrics(5.0, 0.0));
        let high = route_cost(&metrics(50.0, 0.0));
        assert!(high > low);
    }

    #[test]
    fn higher_loss_never_produces_lower_cost() {
        let low = route_cost(&metrics(5.0, 0.0));
        let high = route_cost(&metrics(5.0, 0.1));
        assert!(high > low);
    }

    #[test]
    fn shortest_paths_prefers_lower_latency_route() {
        let mut topology = TopologySnapshot::default();
        topology.apply_lsa(
            1,
            NodeId::from("a"),
            vec![
                (NodeId::from("b"), metrics(100.0, 0.0)),
                (NodeId::from("c"), metrics(5.0, 0.0)),
            ],
        );
        topology.apply_lsa(1, NodeId::from("c"), vec![(NodeId::from("b"), metrics(5.0, 0.0))]);

        let paths = shortest_paths(&topology, &NodeId::from("a"));
        let (_, next_hop) = paths.get(&NodeId::from("b")).unwrap();
        assert_eq!(next_hop, &NodeId::from("c"));
    }
}

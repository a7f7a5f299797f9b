//! Routing table (spec §4.4.6): a `destination -> next-hop` map,
//! recomputed on every committed topology change and on local link probe
//! updates.

use crate::ids::NodeId;
use crate::topology::{shortest_paths, TopologySnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An opaque route payload the caller's transport layer interprets (spec
/// §4.4.6: "an opaque JSON value").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub next_hop: NodeId,
    pub cost: f64,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: HashMap<NodeId, Route>,
}

impl RoutingTable {
    /// Recomputes every route from `source`'s perspective against the
    /// current topology. Called on committed topology changes and local
    /// link probe updates (spec §4.4.6).
    pub fn recompute(&mut self, topology: &TopologySnapshot, source: &NodeId) {
        let paths = shortest_paths(topology, source);
        self.routes = paths
            .into_iter()
            .map(|(destination, (cost, next_hop))| {
                (
                    destination,
                    Route {
                        next_hop,
                        cost,
                        payload: serde_json::Value::Null,
                    },
                )
            })
            .collect();
    }

    pub fn route_to(&self, destination: &NodeId) -> Option<&Route> {
        self.routes.get(destination)
    }

    pub fn destinations(&self) -> impl Iterator<Item = &NodeId> {
        self.routes.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkMetrics;

    #[test]
    fn recompute_reflects_a_new_topology() {
        let mut topology = TopologySnapshot::default();
        let metrics = LinkMetrics {
            latency_ms: 10.0,
            bandwidth_mbps: 500.0,
            loss_fraction: 0.0,
            utilization_fraction: 0.0,
        };
        topology.apply_lsa(1, NodeId::from("a"), vec![(NodeId::from("b"), metrics)]);

        let mut table = RoutingTable::default();
        table.recompute(&topology, &NodeId::from("a"));
        assert!(table.route_to(&NodeId::from("b")).is_some());
        assert!(table.route_to(&NodeId::from("z")).is_none());
    }
}

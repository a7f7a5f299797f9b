//! Link-state advertisements and flooding (spec §3.3, §4.4.3).

use crate::ids::NodeId;
use crate::link::LinkMetrics;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One node's outgoing links as of a point in time, content-hashed so
/// receivers can detect a no-op rebroadcast (spec §3.3 `LSAVersion`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkStateAdvertisement {
    pub node_id: NodeId,
    pub version: u64,
    pub links: Vec<(NodeId, LinkMetrics)>,
}

impl LinkStateAdvertisement {
    pub fn content_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.node_id.as_str().as_bytes());
        hasher.update(self.version.to_be_bytes());
        let mut links = self.links.clone();
        links.sort_by(|a, b| a.0.cmp(&b.0));
        for (peer, metrics) in &links {
            hasher.update(peer.as_str().as_bytes());
            hasher.update(metrics.latency_ms.to_be_bytes());
            hasher.update(metrics.bandwidth_mbps.to_be_bytes());
            hasher.update(metrics.loss_fraction.to_be_bytes());
            hasher.update(metrics.utilization_fraction.to_be_bytes());
        }
        hasher.finalize().into()
    }
}

/// What a node has persisted about one peer's LSA stream: the highest
/// version accepted, plus its content hash (spec §3.3 `LSAVersion`).
#[derive(Debug, Clone, Default)]
pub struct LsaRecord {
    pub version: u64,
    pub content_hash: [u8; 32],
}

/// The flood rule (spec §4.4.3): receive → if version > stored, persist
/// and rebroadcast to all peers except the sender; else drop. Returns
/// `true` when the LSA was newly accepted (and therefore should be
/// rebroadcast), `false` when it was a stale duplicate.
pub fn accept_lsa(stored: &mut std::collections::HashMap<NodeId, LsaRecord>, lsa: &LinkStateAdvertisement) -> bool {
    let current = stored.get(&lsa.node_id).map(|r| r.version).unwrap_or(0);
    if lsa.version > current {
        stored.insert(
            lsa.node_id.clone(),
            LsaRecord {
                version: lsa.version,
                content_hash: lsa.content_hash(),
            },
        );
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lsa(node: &str, version: u64) -> LinkStateAdvertisement {
        LinkStateAdvertisement {
            node_id: NodeId::from(node),
            version,
            links: vec![(
                NodeId::from("peer"),
                LinkMetrics {
                    latency_ms: 5.0,
                    bandwidth_mbps: 100.0,
                    loss_fraction: 0.0,
                    utilization_fraction: 0.2,
                },
            )],
        }
    }

    #[test]
    fn strictly_greater_version_is_accepted_and_floods() {
        let mut stored = std::collections::HashMap::new();
        assert!(accept_lsa(&mut stored, &lsa("a", 1)));
        assert!(accept_lsa(&mut stored, &lsa("a", 7)));
        assert_eq!(stored.get(&NodeId::from("a")).unwrap().version, 7);
    }

    #[test]
    fn stale_or_equal_version_is_dropped() {
        let mut stored = std::collections::HashMap::new();
        assert!(accept_lsa(&mut stored, &lsa("a", 7)));
        assert!(!accept_lsa(&mut stored, &lsa("a", 7)));
        assert!(!accept_lsa(&mut stored, &lsa("a", 3)));
    }
}

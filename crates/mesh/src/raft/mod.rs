//! Raft consensus bindings (spec §4.4.4): one Mesh Control Group (MCG) per
//! mesh governs node/link/topology membership, and one Data Stream Group
//! (DSG) backs every `Qos::Critical` stream needing linearizable commit
//! ordering. Both groups run the same [`types::TypeConfig`]; callers
//! start one [`types::MeshRaft`] per group they participate in.

pub mod network;
pub mod storage;
pub mod types;

use self::network::{LoopbackNetworkFactory, NetworkRegistry};
use self::storage::GroupMemStorage;
use self::types::{raft_node_id, MeshRaft, RaftNodeId};
use crate::error::{MeshError, Result};
use crate::ids::NodeId;
use crate::storage::Store;
use openraft::storage::Adaptor;
use openraft::BasicNode;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Bootstraps one raft group's [`MeshRaft`] instance against `store`,
/// wired through `registry` for in-process transport, and spawns the task
/// that drains its inbound RPC channel.
pub async fn start_group(
    node_id: &NodeId,
    store: Arc<Store>,
    registry: NetworkRegistry,
    config: Arc<openraft::Config>,
) -> Result<(MeshRaft, RaftNodeId)> {
    let raft_node_id = raft_node_id(node_id);
    let (log_store, state_machine) = Adaptor::new(GroupMemStorage::new(store));
    let network = LoopbackNetworkFactory {
        registry: registry.clone(),
    };

    let raft = MeshRaft::new(raft_node_id, config, network, log_store, state_machine)
        .await
        .map_err(|err| MeshError::Internal(format!("failed to start raft group: {err}")))?;

    let inbound = registry.register(raft_node_id);
    tokio::spawn(network::run_inbound(raft.clone(), inbound));

    Ok((raft, raft_node_id))
}

/// Initializes a fresh group's membership from the full peer set; call
/// once, from whichever peer has the lowest raft node id, the same
/// bootstrap convention the workspace's other raft integration uses to
/// avoid every node racing to call `initialize`.
pub async fn initialize_if_lowest(raft: &MeshRaft, this_id: RaftNodeId, peers: &[(RaftNodeId, String)]) -> Result<()> {
    let lowest = peers.iter().map(|(id, _)| *id).min().unwrap_or(this_id);
    if this_id != lowest {
        return Ok(());
    }
    let members: BTreeMap<RaftNodeId, BasicNode> = peers
        .iter()
        .map(|(id, addr)| (*id, BasicNode { addr: addr.clone() }))
        .collect();
    match raft.initialize(members).await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::debug!(error = %err, "raft group already initialized");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn a_single_node_group_elects_itself_leader() {
        let store = Arc::new(Store::new());
        let registry = NetworkRegistry::new();
        let node_id = NodeId::from("node-a");

        let config = Arc::new(
            openraft::Config {
                heartbeat_interval: 50,
                election_timeout_min: 150,
                election_timeout_max: 300,
                ..Default::default()
            }
            .validate()
            .expect("valid raft config"),
        );

        let (raft, this_id) = start_group(&node_id, store, registry, config).await.unwrap();
        initialize_if_lowest(&raft, this_id, &[(this_id, "node-a".to_string())])
            .await
            .unwrap();

        let mut metrics = raft.metrics();
        let became_leader = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                if metrics.borrow().current_leader == Some(this_id) {
                    return;
                }
                if metrics.changed().await.is_err() {
                    return;
                }
            }
        })
        .await;
        assert!(became_leader.is_ok(), "single-node group should elect itself leader");
    }
}

//! openraft type configuration for the mesh's two replicated group kinds
//! (spec §4.4.4): the Mesh Control Group (MCG, one per mesh, governs
//! topology/membership) and a Data Stream Group (DSG, one per
//! `Qos::Critical` stream). Both run the same `TypeConfig`; which group a
//! log belongs to is carried in [`GroupId`](crate::ids::GroupId), not in
//! the type parameter.
//!
//! openraft's `NodeId` bound requires `Copy`, which this crate's own
//! [`crate::ids::NodeId`] (a `String` newtype, used everywhere else in the
//! mesh) deliberately doesn't have. Rather than relax that newtype, raft
//! gets its own numeric ID derived deterministically from the mesh
//! `NodeId`, the same way the workspace's load-test raft integration
//! derives a `u64` from a human-readable identifier.

use crate::ids::{GroupId, NodeId};
use crate::link::{Link, LinkMetrics};
use crate::node::Node;
use crate::storage::Store;
use crate::stream::{CommittedSeq, Stream};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::io::Cursor;

pub type RaftNodeId = u64;

/// Derives a stable raft node id from a mesh [`NodeId`].
pub fn raft_node_id(node_id: &NodeId) -> RaftNodeId {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    node_id.hash(&mut hasher);
    hasher.finish()
}

/// The command replicated through a group's raft log. Applying one mutates
/// the shared [`Store`] (spec §4.4.1/§4.4.4: "raft entries are the only
/// path by which nodes/links/streams/committed offsets change on a
/// follower").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MeshCommand {
    UpsertNode(Node),
    UpsertLink {
        a: NodeId,
        b: NodeId,
        metrics: LinkMetrics,
        status: crate::link::LinkStatus,
    },
    PutStream(Stream),
    AdvanceCommittedSeq {
        stream_id: crate::ids::StreamId,
        node_id: NodeId,
        seq: CommittedSeq,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshCommandAck {
    pub applied: bool,
    pub error: Option<String>,
}

impl MeshCommandAck {
    pub fn ok() -> Self {
        Self {
            applied: true,
            error: None,
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            applied: false,
            error: Some(error.to_string()),
        }
    }
}

/// Applies a committed [`MeshCommand`] to `store`. Shared by the state
/// machine (normal replay) and by snapshot installation's replay path.
pub fn apply_command(store: &Store, command: &MeshCommand) -> MeshCommandAck {
    let result = match command {
        MeshCommand::UpsertNode(node) => store.upsert_node(node),
        MeshCommand::UpsertLink { a, b, metrics, status } => {
            store.upsert_link(&Link::new(a.clone(), b.clone(), *metrics, *status))
        }
        MeshCommand::PutStream(stream) => store.put_stream(stream),
        MeshCommand::AdvanceCommittedSeq { stream_id, node_id, seq } => {
            store.advance_committed_seq(stream_id, node_id, *seq)
        }
    };
    match result {
        Ok(()) => MeshCommandAck::ok(),
        Err(err) => MeshCommandAck::failed(err),
    }
}

openraft::declare_raft_types!(
    pub TypeConfig:
        D = MeshCommand,
        R = MeshCommandAck,
        NodeId = RaftNodeId,
        Node = openraft::BasicNode,
        Entry = openraft::Entry<TypeConfig>,
        SnapshotData = Cursor<Vec<u8>>,
        AsyncRuntime = openraft::TokioRuntime,
);

pub type MeshRaft = openraft::Raft<TypeConfig>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raft_node_id_is_stable_for_the_same_mesh_node_id() {
        let a = raft_node_id(&NodeId::from("node-1"));
        let b = raft_node_id(&NodeId::from("node-1"));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_mesh_node_ids_almost_certainly_hash_differently() {
        let a = raft_node_id(&NodeId::from("node-1"));
        let b = raft_node_id(&NodeId::from("node-2"));
        assert_ne!(a, b);
    }

    #[test]
    fn group_ids_are_just_opaque_strings_unrelated_to_raft_node_ids() {
        let group = GroupId::from("mcg");
        assert_eq!(group.as_str(), "mcg");
    }
}

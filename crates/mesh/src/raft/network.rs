//! In-process raft transport: nodes register an inbound channel in a
//! shared [`NetworkRegistry`] and reach each other by looking a peer's
//! channel up by [`RaftNodeId`]. A real deployment carries these RPCs over
//! the mesh's own wire protocol (spec §6.1 `FrameKind::Raft*`); this
//! registry is what this crate's own single-process tests and any
//! in-process multi-node demo wire against, the same role an
//! `ExampleNetwork` plays in openraft's own test suites.

use super::types::{RaftNodeId, TypeConfig};
use openraft::error::{InstallSnapshotError, RPCError, RaftError, Unreachable};
use openraft::network::{RPCOption, RaftNetwork, RaftNetworkFactory};
use openraft::raft::{
    AppendEntriesRequest, AppendEntriesResponse, InstallSnapshotRequest, InstallSnapshotResponse,
    VoteRequest, VoteResponse,
};
use openraft::{AnyError, BasicNode};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

pub(crate) enum Rpc {
    AppendEntries(
        AppendEntriesRequest<TypeConfig>,
        oneshot::Sender<AppendEntriesResponse<RaftNodeId>>,
    ),
    Vote(VoteRequest<RaftNodeId>, oneshot::Sender<VoteResponse<RaftNodeId>>),
    InstallSnapshot(
        InstallSnapshotRequest<TypeConfig>,
        oneshot::Sender<InstallSnapshotResponse<RaftNodeId>>,
    ),
}

/// Shared directory of reachable raft nodes within this process.
#[derive(Clone, Default)]
pub struct NetworkRegistry {
    inboxes: Arc<RwLock<HashMap<RaftNodeId, mpsc::UnboundedSender<Rpc>>>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node_id` and returns the receiver its raft instance
    /// should poll; call once per node at startup.
    pub fn register(&self, node_id: RaftNodeId) -> mpsc::UnboundedReceiver<Rpc> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inboxes.write().insert(node_id, tx);
        rx
    }

    pub fn unregister(&self, node_id: RaftNodeId) {
        self.inboxes.write().remove(&node_id);
    }
}

fn unreachable(msg: impl std::fmt::Display) -> Unreachable {
    Unreachable::new(&AnyError::error(msg.to_string()))
}

/// Drives one registered node's raft instance against inbound RPCs.
/// Spawn this once per node alongside its [`super::types::MeshRaft`].
pub async fn run_inbound(raft: super::types::MeshRaft, mut rx: mpsc::UnboundedReceiver<Rpc>) {
    while let Some(rpc) = rx.recv().await {
        match rpc {
            Rpc::AppendEntries(req, reply) => {
                if let Ok(resp) = raft.append_entries(req).await {
                    let _ = reply.send(resp);
                }
            }
            Rpc::Vote(req, reply) => {
                if let Ok(resp) = raft.vote(req).await {
                    let _ = reply.send(resp);
                }
            }
            Rpc::InstallSnapshot(req, reply) => {
                if let Ok(resp) = raft.install_snapshot(req).await {
                    let _ = reply.send(resp);
                }
            }
        }
    }
}

pub struct LoopbackNetwork {
    target: RaftNodeId,
    registry: NetworkRegistry,
}

impl RaftNetwork<TypeConfig> for LoopbackNetwork {
    async fn append_entries(
        &mut self,
        rpc: AppendEntriesRequest<TypeConfig>,
        _option: RPCOption,
    ) -> Result<AppendEntriesResponse<RaftNodeId>, RPCError<RaftNodeId, BasicNode, RaftError<RaftNodeId>>> {
        let inboxes = self.registry.inboxes.read();
        let sender = inboxes
            .get(&self.target)
            .cloned()
            .ok_or_else(|| RPCError::Unreachable(unreachable(format!("no inbox for {}", self.target))))?;
        drop(inboxes);
        let (tx, rx) = oneshot::channel();
        sender
            .send(Rpc::AppendEntries(rpc, tx))
            .map_err(|_| RPCError::Unreachable(unreachable("peer inbox closed")))?;
        rx.await.map_err(|_| RPCError::Unreachable(unreachable("peer dropped the reply channel")))
    }

    async fn vote(
        &mut self,
        rpc: VoteRequest<RaftNodeId>,
        _option: RPCOption,
    ) -> Result<VoteResponse<RaftNodeId>, RPCError<RaftNodeId, BasicNode, RaftError<RaftNodeId>>> {
        let inboxes = self.registry.inboxes.read();
        let sender = inboxes
            .get(&self.target)
            .cloned()
            .ok_or_else(|| RPCError::Unreachable(unreachable(format!("no inbox for {}", self.target))))?;
        drop(inboxes);
        let (tx, rx) = oneshot::channel();
        sender
            .send(Rpc::Vote(rpc, tx))
            .map_err(|_| RPCError::Unreachable(unreachable("peer inbox closed")))?;
        rx.await.map_err(|_| RPCError::Unreachable(unreachable("peer dropped the reply channel")))
    }

    async fn install_snapshot(
        &mut self,
        rpc: InstallSnapshotRequest<TypeConfig>,
        _option: RPCOption,
    ) -> Result<
        InstallSnapshotResponse<RaftNodeId>,
        RPCError<RaftNodeId, BasicNode, RaftError<RaftNodeId, InstallSnapshotError>>,
    > {
        let inboxes = self.registry.inboxes.read();
        let sender = inboxes
            .get(&self.target)
            .cloned()
            .ok_or_else(|| RPCError::Unreachable(unreachable(format!("no inbox for {}", self.target))))?;
        drop(inboxes);
        let (tx, rx) = oneshot::channel();
        sender
            .send(Rpc::InstallSnapshot(rpc, tx))
            .map_err(|_| RPCError::Unreachable(unreachable("peer inbox closed")))?;
        rx.await.map_err(|_| RPCError::Unreachable(unreachable("peer dropped the reply channel")))
    }
}

pub struct LoopbackNetworkFactory {
    pub registry: NetworkRegistry,
}

impl RaftNetworkFactory<TypeConfig> for LoopbackNetworkFactory {
    type Network = LoopbackNetwork;

    async fn new_client(&mut self, target: RaftNodeId, _node: &BasicNode) -> Self::Network {
        LoopbackNetwork {
            target,
            registry: self.registry.clone(),
        }
    }
}

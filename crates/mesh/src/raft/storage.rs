//! In-memory `openraft::storage::RaftStorage` (v1 API) for a single raft
//! group, wrapped by `Adaptor::new` into the v2 `RaftLogStorage` +
//! `RaftStateMachine` split `Raft::new` expects. Applying a committed
//! entry delegates to [`crate::raft::types::apply_command`] against the
//! group's shared [`Store`](crate::storage::Store).

use super::types::{apply_command, MeshCommandAck, RaftNodeId, TypeConfig};
use crate::storage::Store;
use openraft::storage::{Adaptor, RaftLogReader, RaftSnapshotBuilder, RaftStorage};
use openraft::{
    BasicNode, Entry, LogId, LogState, RaftLogId, Snapshot, SnapshotMeta, StorageError,
    StoredMembership, Vote,
};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::ops::RangeBounds;
use std::sync::Arc;

pub struct GroupMemStorage {
    store: Arc<Store>,
    vote: Option<Vote<RaftNodeId>>,
    log: BTreeMap<u64, Entry<TypeConfig>>,
    last_purged: Option<LogId<RaftNodeId>>,
    last_applied: Option<LogId<RaftNodeId>>,
    last_membership: StoredMembership<RaftNodeId, BasicNode>,
    snapshot: Option<Snapshot<TypeConfig>>,
}

impl GroupMemStorage {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            vote: None,
            log: BTreeMap::new(),
            last_purged: None,
            last_applied: None,
            last_membership: StoredMembership::default(),
            snapshot: None,
        }
    }

    pub fn into_split(self) -> (Adaptor<TypeConfig, Self>, Adaptor<TypeConfig, Self>)
    where
        Self: Sized,
    {
        Adaptor::new(self)
    }
}

pub struct GroupLogReader {
    log: BTreeMap<u64, Entry<TypeConfig>>,
}

impl RaftLogReader<TypeConfig> for GroupLogReader {
    async fn try_get_log_entries<RB>(
        &mut self,
        range: RB,
    ) -> Result<Vec<Entry<TypeConfig>>, StorageError<RaftNodeId>>
    where
        RB: RangeBounds<u64> + Clone + std::fmt::Debug + Send,
    {
        Ok(self.log.range(range).map(|(_, e)| e.clone()).collect())
    }
}

impl RaftLogReader<TypeConfig> for GroupMemStorage {
    async fn try_get_log_entries<RB>(
        &mut self,
        range: RB,
    ) -> Result<Vec<Entry<TypeConfig>>, StorageError<RaftNodeId>>
    where
        RB: RangeBounds<u64> + Clone + std::fmt::Debug + Send,
    {
        Ok(self.log.range(range).map(|(_, e)| e.clone()).collect())
    }
}

pub struct GroupSnapshotBuilder {
    last_applied: Option<LogId<RaftNodeId>>,
    last_membership: StoredMembership<RaftNodeId, BasicNode>,
}

impl RaftSnapshotBuilder<TypeConfig> for GroupSnapshotBuilder {
    async fn build_snapshot(&mut self) -> Result<Snapshot<TypeConfig>, StorageError<RaftNodeId>> {
        // The state machine here is just `Store`, which already persists
        // everything that matters; a snapshot for this reference
        // implementation is a marker, not a full state dump, since a
        // late-joining follower is expected to replay from the mesh's own
        // TopologySnapshot (spec §4.4.3) rather than a raft-level one.
        let snap_id = self
            .last_applied
            .map(|id| format!("{}-{}", id.leader_id, id.index))
            .unwrap_or_else(|| "0".to_string());
        Ok(Snapshot {
            meta: SnapshotMeta {
                last_log_id: self.last_applied,
                last_membership: self.last_membership.clone(),
                snapshot_id: snap_id,
            },
            snapshot: Box::new(Cursor::new(Vec::new())),
        })
    }
}

impl RaftStorage<TypeConfig> for GroupMemStorage {
    type LogReader = GroupLogReader;
    type SnapshotBuilder = GroupSnapshotBuilder;

    async fn save_vote(&mut self, vote: &Vote<RaftNodeId>) -> Result<(), StorageError<RaftNodeId>> {
        self.vote = Some(*vote);
        Ok(())
    }

    async fn read_vote(&mut self) -> Result<Option<Vote<RaftNodeId>>, StorageError<RaftNodeId>> {
        Ok(self.vote)
    }

    async fn get_log_state(&mut self) -> Result<LogState<TypeConfig>, StorageError<RaftNodeId>> {
        let last = self.log.values().next_back().map(|e| *e.get_log_id());
        Ok(LogState {
            last_purged_log_id: self.last_purged,
            last_log_id: last,
        })
    }

    async fn save_committed(
        &mut self,
        _committed: Option<LogId<RaftNodeId>>,
    ) -> Result<(), StorageError<RaftNodeId>> {
        Ok(())
    }

    async fn read_committed(&mut self) -> Result<Option<LogId<RaftNodeId>>, StorageError<RaftNodeId>> {
        Ok(self.last_applied)
    }

    async fn get_log_reader(&mut self) -> Self::LogReader {
        GroupLogReader {
            log: self.log.clone(),
        }
    }

    async fn append_to_log<I>(&mut self, entries: I) -> Result<(), StorageError<RaftNodeId>>
    where
        I: IntoIterator<Item = Entry<TypeConfig>> + Send,
    {
        for entry in entries {
            self.log.insert(entry.get_log_id().index, entry);
        }
        Ok(())
    }

    async fn delete_conflict_logs_since(
        &mut self,
        log_id: LogId<RaftNodeId>,
    ) -> Result<(), StorageError<RaftNodeId>> {
        self.log.retain(|&idx, _| idx < log_id.index);
        Ok(())
    }

    async fn purge_logs_upto(&mut self, log_id: LogId<RaftNodeId>) -> Result<(), StorageError<RaftNodeId>> {
        self.log.retain(|&idx, _| idx > log_id.index);
        self.last_purged = Some(log_id);
        Ok(())
    }

    async fn last_applied_state(
        &mut self,
    ) -> Result<(Option<LogId<RaftNodeId>>, StoredMembership<RaftNodeId, BasicNode>), StorageError<RaftNodeId>> {
        Ok((self.last_applied, self.last_membership.clone()))
    }

    async fn apply_to_state_machine(
        &mut self,
        entries: &[Entry<TypeConfig>],
    ) -> Result<Vec<MeshCommandAck>, StorageError<RaftNodeId>> {
        let mut responses = Vec::with_capacity(entries.len());
        for entry in entries {
            self.last_applied = Some(*entry.get_log_id());
            match &entry.payload {
                openraft::EntryPayload::Blank => responses.push(MeshCommandAck::ok()),
                openraft::EntryPayload::Normal(command) => {
                    responses.push(apply_command(&self.store, command));
                }
                openraft::EntryPayload::Membership(membership) => {
                    self.last_membership = StoredMembership::new(Some(*entry.get_log_id()), membership.clone());
                    responses.push(MeshCommandAck::ok());
                }
            }
        }
        Ok(responses)
    }

    async fn get_snapshot_builder(&mut self) -> Self::SnapshotBuilder {
        GroupSnapshotBuilder {
            last_applied: self.last_applied,
            last_membership: self.last_membership.clone(),
        }
    }

    async fn begin_receiving_snapshot(&mut self) -> Result<Box<Cursor<Vec<u8>>>, StorageError<RaftNodeId>> {
        Ok(Box::new(Cursor::new(Vec::new())))
    }

    async fn install_snapshot(
        &mut self,
        meta: &SnapshotMeta<RaftNodeId, BasicNode>,
        _snapshot: Box<Cursor<Vec<u8>>>,
    ) -> Result<(), StorageError<RaftNodeId>> {
        self.last_applied = meta.last_log_id;
        self.last_membership = meta.last_membership.clone();
        Ok(())
    }

    async fn get_current_snapshot(&mut self) -> Result<Option<Snapshot<TypeConfig>>, StorageError<RaftNodeId>> {
        Ok(self.snapshot.clone())
    }
}

//! Inbox: the receiver half of exactly-once delivery (spec §4.4.5,
//! testable property 4 "receiver deduplicates by message id before
//! delivering to the application"). A message already present and marked
//! processed is dropped silently; one present but unprocessed is
//! redelivered to the application (the sender may not have seen the ack).

use crate::ids::{MessageId, NodeId, StreamId};
use crate::storage::{InboxRow, Store};
use crate::stream::CommittedSeq;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// First time this `(stream, message)` pair has been seen; caller
    /// should hand it to the application and then call
    /// [`mark_processed`].
    Deliver,
    /// Already delivered and processed; drop without reprocessing.
    Duplicate,
}

pub fn receive(
    store: &Store,
    stream_id: &StreamId,
    message_id: &MessageId,
    src_node: &NodeId,
    payload: Vec<u8>,
    received_at: DateTime<Utc>,
) -> crate::error::Result<ReceiveOutcome> {
    if let Some(existing) = store.inbox_get(stream_id, message_id)? {
        return Ok(if existing.processed.is_some() {
            ReceiveOutcome::Duplicate
        } else {
            ReceiveOutcome::Deliver
        });
    }
    store.inbox_insert(&InboxRow {
        stream_id: stream_id.clone(),
        message_id: message_id.clone(),
        src_node: src_node.clone(),
        payload,
        received: received_at,
        processed: None,
    })?;
    Ok(ReceiveOutcome::Deliver)
}

/// Marks `(stream_id, message_id)` processed and, per spec §4.4.5's
/// receiver pipeline, advances this node's `StreamOffset.CommittedSeq` for
/// the stream by one so the inbox path (not just the raft
/// `AdvanceCommittedSeq` command) keeps the offset monotonically moving.
pub fn mark_processed(
    store: &Store,
    stream_id: &StreamId,
    message_id: &MessageId,
    node_id: &NodeId,
    processed_at: DateTime<Utc>,
) -> crate::error::Result<()> {
    store.inbox_mark_processed(stream_id, message_id, processed_at)?;
    let next = CommittedSeq(store.committed_seq(stream_id, node_id)?.0 + 1);
    store.advance_committed_seq(stream_id, node_id, next)
}

/// Retention sweep: rows processed before `horizon` are eligible for
/// removal (spec §4.4.5 "the inbox is compacted once the sender's outbox
/// for that message is empty, bounding its growth").
pub fn gc(store: &Store, horizon: DateTime<Utc>) -> crate::error::Result<u64> {
    store.inbox_gc(horizon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_delivery_is_delivered_and_redelivery_before_ack_is_also_delivered() {
        let store = Store::new();
        let stream_id = StreamId::from("s1");
        let message_id = MessageId::from("m1");
        let src = NodeId::from("node-a");

        let first = receive(&store, &stream_id, &message_id, &src, b"p".to_vec(), Utc::now()).unwrap();
        assert_eq!(first, ReceiveOutcome::Deliver);

        // Sender didn't see the ack and resent; not yet marked processed.
        let second = receive(&store, &stream_id, &message_id, &src, b"p".to_vec(), Utc::now()).unwrap();
        assert_eq!(second, ReceiveOutcome::Deliver);
    }

    #[test]
    fn redelivery_after_processing_is_a_duplicate() {
        let store = Store::new();
        let stream_id = StreamId::from("s1");
        let message_id = MessageId::from("m1");
        let src = NodeId::from("node-a");
        let local = NodeId::from("node-b");

        receive(&store, &stream_id, &message_id, &src, b"p".to_vec(), Utc::now()).unwrap();
        mark_processed(&store, &stream_id, &message_id, &local, Utc::now()).unwrap();

        let redelivered = receive(&store, &stream_id, &message_id, &src, b"p".to_vec(), Utc::now()).unwrap();
        assert_eq!(redelivered, ReceiveOutcome::Duplicate);
    }

    #[test]
    fn marking_processed_advances_the_committed_seq_monotonically() {
        let store = Store::new();
        let stream_id = StreamId::from("s1");
        let src = NodeId::from("node-a");
        let local = NodeId::from("node-b");

        assert_eq!(store.committed_seq(&stream_id, &local).unwrap(), CommittedSeq(0));

        let first = MessageId::from("m1");
        receive(&store, &stream_id, &first, &src, b"p".to_vec(), Utc::now()).unwrap();
        mark_processed(&store, &stream_id, &first, &local, Utc::now()).unwrap();
        assert_eq!(store.committed_seq(&stream_id, &local).unwrap(), CommittedSeq(1));

        let second = MessageId::from("m2");
        receive(&store, &stream_id, &second, &src, b"p".to_vec(), Utc::now()).unwrap();
        mark_processed(&store, &stream_id, &second, &local, Utc::now()).unwrap();
        assert_eq!(store.committed_seq(&stream_id, &local).unwrap(), CommittedSeq(2));
    }

    #[test]
    fn gc_only_removes_processed_rows_older_than_the_horizon() {
        let store = Store::new();
        let old_stream = StreamId::from("s1");
        let fresh_stream = StreamId::from("s2");
        let message_id = MessageId::from("m1");
        let src = NodeId::from("node-a");
        let local = NodeId::from("node-b");

        receive(&store, &old_stream, &message_id, &src, b"p".to_vec(), Utc::now()).unwrap();
        mark_processed(&store, &old_stream, &message_id, &local, Utc::now() - chrono::Duration::hours(2)).unwrap();

        receive(&store, &fresh_stream, &message_id, &src, b"p".to_vec(), Utc::now()).unwrap();

        let removed = gc(&store, Utc::now() - chrono::Duration::hours(1)).unwrap();
        assert_eq!(removed, 1);
        assert!(store.inbox_get(&old_stream, &message_id).unwrap().is_none());
        assert!(store.inbox_get(&fresh_stream, &message_id).unwrap().is_some());
    }
}

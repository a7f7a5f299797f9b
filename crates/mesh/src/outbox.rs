//! Outbox dispatcher: the sender half of exactly-once delivery (spec
//! §4.4.5, testable property 4 "sender retains a message until acked").
//! Shaped after `anchor::replication::run_polling_replication`'s
//! tick-drain-dispatch-backoff loop, generalized from a single drain
//! source to one row per `(stream, message, destination)`.

use crate::delivery::{DeliveryLogEntry, DeliveryState};
use crate::ids::{MessageId, NodeId, StreamId};
use crate::storage::{OutboxRow, OutboxStatus, Store};
use crate::stream::backoff_delay;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// The transport a dispatcher hands payloads to; implemented by whatever
/// carries frames over the wire (spec §6.1 `FrameKind`), mocked in this
/// crate's own tests to simulate lost acks.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, dst: &NodeId, stream_id: &StreamId, message_id: &MessageId, payload: &[u8]) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct OutboxConfig {
    pub tick_interval: Duration,
    pub batch_size: usize,
    pub base_backoff: Duration,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            batch_size: 256,
            base_backoff: Duration::from_millis(100),
        }
    }
}

pub fn enqueue(
    store: &Store,
    stream_id: &StreamId,
    message_id: &MessageId,
    src_node: &NodeId,
    dst_node: &NodeId,
    payload: Vec<u8>,
) -> crate::error::Result<()> {
    store.outbox_insert(&OutboxRow {
        stream_id: stream_id.clone(),
        message_id: message_id.clone(),
        src_node: src_node.clone(),
        dst_node: dst_node.clone(),
        payload,
        next_attempt: Utc::now(),
        attempts: 0,
        status: OutboxStatus::Pending,
    })
}

/// Drains one batch of due rows and attempts delivery. A message is only
/// removed from the outbox on a successful send (spec §4.4.5: "retained
/// until the destination acknowledges receipt"), and that removal is
/// always paired with a `state=done` delivery-log entry (testable
/// property 7) in the same call; exhausting the retry budget instead marks
/// the row failed and logs `state=failed`. A QoS-less cap here is derived
/// from the stream's own `Qos::max_retries` when the caller passes one,
/// and `Critical` streams (`max_retries() == None`) are retried forever
/// rather than marked failed.
pub async fn drain_once(
    store: &Store,
    transport: &dyn Transport,
    config: &OutboxConfig,
    max_retries: Option<u32>,
) -> crate::error::Result<usize> {
    let due = store.outbox_due(Utc::now(), config.batch_size)?;
    let mut delivered = 0;
    for row in due {
        let ok = transport
            .send(&row.dst_node, &row.stream_id, &row.message_id, &row.payload)
            .await;
        if ok {
            store.outbox_mark_sent(&row.stream_id, &row.message_id, &row.dst_node)?;
            // spec §4.4.5/testable property 7: a payload is only dropped from
            // the outbox once a `state=done` delivery-log row exists for it.
            store.append_delivery_log(&DeliveryLogEntry {
                stream_id: row.stream_id.clone(),
                message_id: row.message_id.clone(),
                src_node: row.src_node.clone(),
                dst_node: row.dst_node.clone(),
                state: DeliveryState::Done,
            })?;
            delivered += 1;
            continue;
        }

        let exceeded = max_retries.is_some_and(|limit| row.attempts + 1 >= limit);
        if exceeded {
            tracing::warn!(
                stream_id = %row.stream_id,
                message_id = %row.message_id,
                dst_node = %row.dst_node,
                attempts = row.attempts + 1,
                "outbox row exhausted its retry budget"
            );
            store.outbox_fail(&row.stream_id, &row.message_id, &row.dst_node)?;
            store.append_delivery_log(&DeliveryLogEntry {
                stream_id: row.stream_id.clone(),
                message_id: row.message_id.clone(),
                src_node: row.src_node.clone(),
                dst_node: row.dst_node.clone(),
                state: DeliveryState::Failed,
            })?;
        } else {
            let next_attempt = Utc::now()
                + chrono::Duration::from_std(backoff_delay(row.attempts, config.base_backoff))
                    .unwrap_or(chrono::Duration::seconds(30));
            store.outbox_retry(&row.stream_id, &row.message_id, &row.dst_node, next_attempt)?;
        }
    }
    Ok(delivered)
}

/// Long-running dispatcher task; cancellation-safe, stopped by cancelling
/// `cancel` (mirrors `anchor::replication::ReplicationHandle`'s explicit
/// stop contract rather than relying on `Drop`).
pub async fn run_outbox_dispatcher(
    store: Arc<Store>,
    transport: Arc<dyn Transport>,
    config: OutboxConfig,
    max_retries: Option<u32>,
    cancel: tokio_util::sync::CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(config.tick_interval) => {}
        }
        if cancel.is_cancelled() {
            return;
        }
        if let Err(err) = drain_once(&store, transport.as_ref(), &config, max_retries).await {
            tracing::error!(error = %err, "outbox dispatch tick failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct FlakyTransport {
        fail_first_n: Mutex<u32>,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn send(&self, _dst: &NodeId, _stream_id: &StreamId, _message_id: &MessageId, _payload: &[u8]) -> bool {
            let mut remaining = self.fail_first_n.lock();
            if *remaining > 0 {
                *remaining -= 1;
                false
            } else {
                true
            }
        }
    }

    #[tokio::test]
    async fn message_is_retained_until_acknowledged() {
        let store = Store::new();
        let stream_id = StreamId::from("s1");
        let message_id = MessageId::from("m1");
        let src = NodeId::from("node-a");
        let dst = NodeId::from("node-b");
        enqueue(&store, &stream_id, &message_id, &src, &dst, b"payload".to_vec()).unwrap();

        let transport = FlakyTransport {
            fail_first_n: Mutex::new(3),
        };
        let config = OutboxConfig {
            tick_interval: Duration::from_millis(1),
            batch_size: 10,
            base_backoff: Duration::from_millis(1),
        };

        for _ in 0..3 {
            drain_once(&store, &transport, &config, None).await.unwrap();
            assert!(!store.outbox_is_empty(&stream_id).unwrap());
            assert!(store.delivery_log_state(&stream_id, &message_id, &dst).unwrap().is_none());
        }
        let delivered = drain_once(&store, &transport, &config, None).await.unwrap();
        assert_eq!(delivered, 1);
        assert!(store.outbox_is_empty(&stream_id).unwrap());
        assert_eq!(
            store.delivery_log_state(&stream_id, &message_id, &dst).unwrap(),
            Some(DeliveryState::Done)
        );
    }

    #[tokio::test]
    async fn exhausting_retries_marks_the_row_failed_instead_of_retrying_forever() {
        let store = Store::new();
        let stream_id = StreamId::from("s1");
        let message_id = MessageId::from("m1");
        let src = NodeId::from("node-a");
        let dst = NodeId::from("node-b");
        enqueue(&store, &stream_id, &message_id, &src, &dst, b"payload".to_vec()).unwrap();

        struct AlwaysFails;
        #[async_trait]
        impl Transport for AlwaysFails {
            async fn send(&self, _: &NodeId, _: &StreamId, _: &MessageId, _: &[u8]) -> bool {
                false
            }
        }
        let config = OutboxConfig {
            tick_interval: Duration::from_millis(1),
            batch_size: 10,
            base_backoff: Duration::from_millis(1),
        };
        for _ in 0..2 {
            drain_once(&store, &AlwaysFails, &config, Some(2)).await.unwrap();
        }
        // outbox_due only returns Pending rows; once Failed, it's not due again.
        assert!(store.outbox_due(Utc::now(), 10).unwrap().is_empty());
        assert_eq!(
            store.delivery_log_state(&stream_id, &message_id, &dst).unwrap(),
            Some(DeliveryState::Failed)
        );
    }
}

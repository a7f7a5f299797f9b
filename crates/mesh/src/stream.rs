//! Streams and their QoS-derived delivery policy (spec §3.3, §4.4.5).

use crate::ids::{MessageId, NodeId, StreamId, TenantId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Qos {
    Low,
    Normal,
    High,
    Critical,
}

impl Qos {
    /// Exactly-once delivery (dedup'd at the inbox, never dropped from
    /// the outbox before ack) applies only at `Critical` (spec §4.4.5
    /// table).
    pub fn is_exactly_once(&self) -> bool {
        matches!(self, Qos::Critical)
    }

    /// FIFO ordering per `(stream, dst)` is required at `High` and above
    /// (spec §4.4.5 table; testable property 5 says "for QoS ≥ High").
    pub fn requires_fifo(&self) -> bool {
        matches!(self, Qos::High | Qos::Critical)
    }

    pub fn max_retries(&self) -> Option<u32> {
        match self {
            Qos::Critical => None, // retried until acknowledged, never dropped.
            Qos::High => Some(8),
            Qos::Normal => Some(4),
            Qos::Low => Some(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub stream_id: StreamId,
    pub tenant_id: TenantId,
    pub src_node: NodeId,
    pub dst_nodes: Vec<NodeId>,
    pub qos: Qos,
    pub priority: i32,
}

/// `(StreamID, NodeID) -> CommittedSeq`, monotone non-decreasing (spec
/// §3.3 `StreamOffset`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CommittedSeq(pub u64);

/// A pending write awaiting dispatch, generated so retries of the same
/// logical send reuse the same [`MessageId`] (spec §4.4.5 "Dedup key").
pub struct PendingSend {
    pub message_id: MessageId,
    pub payload: Vec<u8>,
}

/// Backoff schedule for outbox retries (spec §4.4.5), built on
/// `exponential_backoff::Backoff` rather than a hand-rolled doubling.
pub fn outbox_backoff(base: Duration) -> exponential_backoff::Backoff {
    let mut backoff = exponential_backoff::Backoff::new(u32::MAX, base, Duration::from_secs(30));
    // Jitter is applied by the dispatcher loop itself (see `dispatcher::run_jittered`),
    // so the schedule here stays deterministic.
    backoff.set_jitter(0.0);
    backoff
}

pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    outbox_backoff(base)
        .next(attempt)
        .unwrap_or(Duration::from_secs(30))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_critical_is_exactly_once() {
        assert!(Qos::Critical.is_exactly_once());
        assert!(!Qos::High.is_exactly_once());
        assert!(!Qos::Normal.is_exactly_once());
        assert!(!Qos::Low.is_exactly_once());
    }

    #[test]
    fn fifo_required_at_high_and_above() {
        assert!(Qos::Critical.requires_fifo());
        assert!(Qos::High.requires_fifo());
        assert!(!Qos::Normal.requires_fifo());
        assert!(!Qos::Low.requires_fifo());
    }

    #[test]
    fn backoff_grows_exponentially() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(0, base), Duration::from_millis(100));
        assert_eq!(backoff_delay(1, base), Duration::from_millis(200));
        assert_eq!(backoff_delay(3, base), Duration::from_millis(800));
    }
}

//! Delivery log: forward-only state transitions per message, except the
//! explicit `failed -> processing` retry (spec §3.3 `DeliveryLog`).

use crate::ids::{MessageId, NodeId, StreamId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryState {
    Received,
    Processing,
    Done,
    Failed,
}

impl DeliveryState {
    /// Spec §3.3: "State transitions are forward-only except
    /// `failed→processing` on retry."
    pub fn can_transition_to(self, next: DeliveryState) -> bool {
        use DeliveryState::*;
        match (self, next) {
            (Received, Processing) => true,
            (Processing, Done) | (Processing, Failed) => true,
            (Failed, Processing) => true,
            (same, next) if same == next => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryLogEntry {
    pub stream_id: StreamId,
    pub message_id: MessageId,
    pub src_node: NodeId,
    pub dst_node: NodeId,
    pub state: DeliveryState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use DeliveryState::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(Received.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Done));
        assert!(Processing.can_transition_to(Failed));
    }

    #[test]
    fn failed_may_retry_into_processing() {
        assert!(Failed.can_transition_to(Processing));
    }

    #[test]
    fn backward_transitions_are_rejected() {
        assert!(!Done.can_transition_to(Processing));
        assert!(!Processing.can_transition_to(Received));
        assert!(!Failed.can_transition_to(Done));
    }
}

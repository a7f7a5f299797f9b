//! Wire frame header (spec §6.1): every frame on a mesh control/data
//! channel carries one of these tags. Frames are carried over
//! length-prefixed `tonic` streaming RPCs; this module defines only the
//! header and payload envelope, not the generated gRPC service code (no
//! `.proto`/`build.rs` is checked in, since this crate ships the kernel
//! contract without a concrete transport binding).

use crate::ids::{GroupId, MessageId, NodeId, StreamId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Lsa,
    RaftAppend,
    RaftVote,
    StreamChunk,
    StreamAck,
    Admin,
}

/// One framed unit on the wire: a `kind` tag plus an opaque,
/// already-serialized payload (the LSA, raft RPC, stream chunk, etc.). The
/// payload is kept as raw bytes here rather than as a typed union so this
/// module stays free of a dependency on `raft`/`lsa`/`stream` payload
/// shapes evolving independently of the envelope itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub kind: FrameKind,
    pub src_node: NodeId,
    #[serde(default)]
    pub dst_node: Option<NodeId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub stream_id: Option<StreamId>,
    #[serde(default)]
    pub message_id: Option<MessageId>,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn lsa(src_node: NodeId, payload: Vec<u8>) -> Self {
        Self {
            kind: FrameKind::Lsa,
            src_node,
            dst_node: None,
            group_id: None,
            stream_id: None,
            message_id: None,
            payload,
        }
    }

    pub fn raft(kind: FrameKind, src_node: NodeId, group_id: GroupId, payload: Vec<u8>) -> Self {
        debug_assert!(matches!(kind, FrameKind::RaftAppend | FrameKind::RaftVote));
        Self {
            kind,
            src_node,
            dst_node: None,
            group_id: Some(group_id),
            stream_id: None,
            message_id: None,
            payload,
        }
    }

    pub fn stream_chunk(
        src_node: NodeId,
        dst_node: NodeId,
        stream_id: StreamId,
        message_id: MessageId,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            kind: FrameKind::StreamChunk,
            src_node,
            dst_node: Some(dst_node),
            group_id: None,
            stream_id: Some(stream_id),
            message_id: Some(message_id),
            payload,
        }
    }

    pub fn stream_ack(src_node: NodeId, dst_node: NodeId, stream_id: StreamId, message_id: MessageId) -> Self {
        Self {
            kind: FrameKind::StreamAck,
            src_node,
            dst_node: Some(dst_node),
            group_id: None,
            stream_id: Some(stream_id),
            message_id: Some(message_id),
            payload: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_stream_chunk_roundtrips_through_json() {
        let frame = Frame::stream_chunk(
            NodeId::from("node-a"),
            NodeId::from("node-b"),
            StreamId::from("s1"),
            MessageId::from("m1"),
            b"payload".to_vec(),
        );
        let json = serde_json::to_string(&frame).unwrap();
        let decoded: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.kind, FrameKind::StreamChunk);
        assert_eq!(decoded.stream_id, Some(StreamId::from("s1")));
    }

    #[test]
    fn frame_kind_tags_serialize_as_snake_case() {
        let json = serde_json::to_string(&FrameKind::RaftAppend).unwrap();
        assert_eq!(json, "\"raft_append\"");
    }
}

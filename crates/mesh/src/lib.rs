//! Mesh fabric: node/link health, link-state flooding, topology and
//! routing, Raft-backed membership and stream consensus, QoS-aware
//! delivery with exactly-once outbox/inbox plumbing, and mesh credential
//! management (spec §3–§6). Depends on nothing else in this workspace
//! (SPEC_FULL §2): every identifier crossing this crate's boundary is one
//! of its own newtypes in [`ids`].

pub mod credentials;
pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod inbox;
pub mod link;
pub mod lsa;
pub mod node;
pub mod outbox;
pub mod raft;
pub mod routing;
pub mod storage;
pub mod stream;
pub mod topology;
pub mod wire;

pub use credentials::{MeshCertificateAuthority, PemIdentity, SessionClaims, TenantSecretCache};
pub use delivery::{DeliveryLogEntry, DeliveryState};
pub use error::{ErrorKind, MeshError, Result};
pub use ids::{GroupId, MeshId, MessageId, NodeId, RegionId, StreamId, TenantId};
pub use link::{Link, LinkMetrics, LinkStatus};
pub use lsa::{accept_lsa, LinkStateAdvertisement, LsaRecord};
pub use node::{Node, NodeStatus};
pub use routing::{Route, RoutingTable};
pub use storage::Store;
pub use stream::{CommittedSeq, PendingSend, Qos, Stream};
pub use topology::{route_cost, shortest_paths, TopologySnapshot};
pub use wire::{Frame, FrameKind};

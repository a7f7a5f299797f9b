//! Soft identifiers over the metadata store (spec §3's "Soft identifiers
//! ... are opaque strings"), newtyped per spec.md §9's "arena + index"
//! design note and SPEC_FULL §3's expansion so a tenant ID can't be passed
//! where a workspace ID is expected. Backed by `Uuid`, mirroring
//! `models::Id`'s newtype-over-bytes shape one level up from a bare
//! `String`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(TenantId);
entity_id!(WorkspaceId);
entity_id!(InstanceId);
entity_id!(DatabaseId);
entity_id!(PolicyId);
entity_id!(SessionId);
entity_id!(ResourceContainerId);
entity_id!(ResourceItemId);

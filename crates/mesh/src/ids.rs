//! Soft identifiers crossing the mesh boundary (spec §3.3, §6.2). Mesh
//! depends on nothing else in the workspace (SPEC_FULL §2), so these are
//! distinct newtypes from `metadata`'s/`anchor`'s IDs even where the
//! underlying value (a tenant ID) is the same opaque string in practice.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

opaque_id!(NodeId);
opaque_id!(MeshId);
opaque_id!(RegionId);
opaque_id!(TenantId);
opaque_id!(GroupId);
opaque_id!(StreamId);
opaque_id!(MessageId);

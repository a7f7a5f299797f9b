//! Soft identifiers crossing the anchor boundary (spec §3.4, §6.2): opaque
//! strings, newtyped so a tenant ID can never be passed where an instance
//! ID is expected. Mirrors `models::Id`'s newtype-over-bytes shape, minus
//! the fixed-width encoding since these IDs originate outside this crate.

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

opaque_id!(TenantId);
opaque_id!(InstanceId);
opaque_id!(DatabaseId);

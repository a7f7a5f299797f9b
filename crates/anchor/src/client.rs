//! Live handles bound by the connection lifecycle (spec §3.4, §4.2.1).

use crate::ids::{DatabaseId, InstanceId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A live handle to one external database instance. `is_connected` is the
/// flag spec §3.4 calls out explicitly; it's atomic because `Close` may
/// race a dispatcher loop still draining in-flight work (spec §4.2.1:
/// "`Close` sets `IsConnected=0` atomically").
#[derive(Clone)]
pub struct InstanceClient {
    pub instance_id: InstanceId,
    pub bound_port: u16,
    is_connected: Arc<AtomicBool>,
}

impl InstanceClient {
    pub fn new(instance_id: InstanceId, bound_port: u16) -> Self {
        Self {
            instance_id,
            bound_port,
            is_connected: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.is_connected.store(false, Ordering::SeqCst);
    }
}

/// A live handle to a single database/collection/catalog reachable through
/// an [`InstanceClient`] (spec §3.4 `DatabaseClient`).
#[derive(Clone)]
pub struct DatabaseClient {
    pub database_id: DatabaseId,
    pub instance: InstanceClient,
}

impl DatabaseClient {
    pub fn new(database_id: DatabaseId, instance: InstanceClient) -> Self {
        Self {
            database_id,
            instance,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.instance.is_connected()
    }

    pub fn close(&self) {
        self.instance.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_visible_through_cloned_handles() {
        let instance = InstanceClient::new(InstanceId::from("inst-1"), 5432);
        let database = DatabaseClient::new(DatabaseId::from("db-1"), instance.clone());
        assert!(database.is_connected());
        instance.close();
        assert!(!database.is_connected());
    }
}

//! Scenario S3 (spec §8): a vector-store config with port=8443 and
//! SSL=false, where the remote answers 404 on the probe path at 8443 but
//! 200 at its default port, must end up bound to the default port with
//! the client marked connected.

use anchor::{connect_with_fallback, ProbeOutcome};
use std::time::Duration;
use unified_model::DatabaseType;

#[tokio::test]
async fn vector_store_probe_falls_back_to_default_port() {
    let config = anchor::InstanceConfig {
        database_type: DatabaseType::Vector,
        host: "vector-store.internal".to_string(),
        port: Some(8443),
        username: "svc".to_string(),
        password: String::new(),
        tunnel: None,
        connect_timeout: Duration::from_secs(5),
    };

    let bound_port = connect_with_fallback(&config, Duration::from_secs(1), |port| async move {
        if port == 8000 {
            ProbeOutcome::Connected
        } else {
            ProbeOutcome::NotFound
        }
    })
    .await
    .expect("fallback probe should succeed on the default port");

    assert_eq!(bound_port, 8000);

    let client = anchor::InstanceClient::new(anchor::InstanceId::from("inst-vec-1"), bound_port);
    assert!(client.is_connected());
}

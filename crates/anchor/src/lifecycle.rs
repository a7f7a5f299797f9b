//! Connection lifecycle (spec §4.2.1): port defaulting, SSL/TLS option
//! derivation, and the cheap-probe-then-fallback-port dance behind
//! scenario S3.

use crate::config::InstanceConfig;
use crate::error::{AdapterError, Result};
use std::time::Duration;

/// TLS knobs derived from [`InstanceConfig`], independent of any one
/// driver's TLS type (spec §4.2.1: "SSL is enabled by presence of
/// `SSL=true`; client certificates are loaded if both cert and key are
/// supplied; `InsecureSkipVerify` is derived from `SSLRejectUnauthorized`").
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    pub enabled: bool,
    pub client_cert: Option<(String, String)>,
    pub insecure_skip_verify: bool,
}

impl TlsOptions {
    pub fn derive(ssl: bool, reject_unauthorized: bool, cert: Option<String>, key: Option<String>) -> Self {
        let client_cert = match (cert, key) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        };
        Self {
            enabled: ssl,
            client_cert,
            insecure_skip_verify: !reject_unauthorized,
        }
    }
}

/// The outcome of a cheap connectivity probe against one candidate port.
pub enum ProbeOutcome {
    Connected,
    /// Probe failed with a shape indicating "not found" (e.g. HTTP 404, or
    /// an engine-specific "no such database" error) rather than a network
    /// failure — the only shape spec §4.2.1/§9 open question 4 permits a
    /// same-host retry on the default port for.
    NotFound,
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

/// Tries each of `config.candidate_ports()` in order via `probe`, stopping
/// at the first success. Mirrors scenario S3: a 404-shaped failure on a
/// non-default port falls through to the next candidate; any other
/// failure is reported unmodified without trying further ports.
pub async fn connect_with_fallback<P, Fut>(
    config: &InstanceConfig,
    dial_timeout: Duration,
    mut probe: P,
) -> Result<u16>
where
    P: FnMut(u16) -> Fut,
    Fut: std::future::Future<Output = ProbeOutcome>,
{
    let candidates = config.candidate_ports();
    let mut tried = Vec::new();

    for port in &candidates {
        tried.push(*port);
        let outcome = tokio::time::timeout(dial_timeout, probe(*port)).await;
        match outcome {
            Ok(ProbeOutcome::Connected) => return Ok(*port),
            Ok(ProbeOutcome::NotFound) => continue,
            Ok(ProbeOutcome::Failed(source)) => {
                return Err(AdapterError::ConnectionFailed {
                    instance: config.host.clone(),
                    source,
                })
            }
            Err(_elapsed) => {
                return Err(AdapterError::ConnectionFailed {
                    instance: config.host.clone(),
                    source: Box::new(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("dial to {}:{port} exceeded {dial_timeout:?}", config.host),
                    )),
                })
            }
        }
    }

    Err(AdapterError::AllPortsExhausted {
        instance: config.host.clone(),
        ports: tried,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use unified_model::DatabaseType;

    fn config(port: Option<u16>) -> InstanceConfig {
        InstanceConfig {
            database_type: DatabaseType::Vector,
            host: "vectors.internal".to_string(),
            port,
            username: "svc".to_string(),
            password: String::new(),
            tunnel: None,
            connect_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn falls_back_to_default_port_on_not_found() {
        let config = config(Some(8443));
        let bound = connect_with_fallback(&config, Duration::from_secs(1), |port| async move {
            if port == 8443 {
                ProbeOutcome::NotFound
            } else if port == 19530 {
                ProbeOutcome::Connected
            } else {
                ProbeOutcome::NotFound
            }
        })
        .await
        .unwrap();
        assert_eq!(bound, 19530);
    }

    #[tokio::test]
    async fn non_not_found_failure_does_not_try_further_ports() {
        let config = config(Some(8443));
        let err = connect_with_fallback(&config, Duration::from_secs(1), |_port| async move {
            ProbeOutcome::Failed(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            )))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AdapterError::ConnectionFailed { .. }));
    }

    #[tokio::test]
    async fn exhausting_all_candidates_is_reported() {
        let config = config(Some(8443));
        let err = connect_with_fallback(&config, Duration::from_secs(1), |_port| async move {
            ProbeOutcome::NotFound
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AdapterError::AllPortsExhausted { .. }));
    }
}

//! Connection configuration for an anchor instance (spec §4.2): endpoint,
//! credentials, and an optional SSH tunnel.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unified_model::DatabaseType;

/// Connects `DatabaseType` to the port a fresh instance is expected to
/// listen on before any override or probe has run (spec §4.2 "default
/// port table").
pub fn default_port(database_type: DatabaseType) -> u16 {
    match database_type {
        DatabaseType::Relational => 5432,
        DatabaseType::Columnar => 9000,
        DatabaseType::Document => 27017,
        DatabaseType::KeyValue => 6379,
        DatabaseType::Graph => 7687,
        DatabaseType::TimeSeries => 8086,
        DatabaseType::Vector => 19530,
        DatabaseType::Search => 9200,
    }
}

/// A handful of alternate ports each paradigm is commonly deployed on,
/// tried in order when the configured port can't be reached (spec §4.2
/// "instance connection lifecycle", scenario S3).
pub fn fallback_ports(database_type: DatabaseType) -> &'static [u16] {
    match database_type {
        DatabaseType::Relational => &[5432, 3306, 1433],
        DatabaseType::Columnar => &[9000, 8123],
        DatabaseType::Document => &[27017],
        DatabaseType::KeyValue => &[6379, 11211],
        DatabaseType::Graph => &[7687, 7474],
        DatabaseType::TimeSeries => &[8086, 9090],
        DatabaseType::Vector => &[19530, 8000],
        DatabaseType::Search => &[9200, 9243],
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SshTunnelConfig {
    /// `ssh://user@host[:port]` of the bastion to tunnel through.
    pub ssh_endpoint: String,
    #[schemars(schema_with = "private_key_schema")]
    pub private_key: String,
}

fn private_key_schema(_gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
    serde_json::from_value(serde_json::json!({
        "title": "SSH Private Key",
        "type": "string",
        "multiline": true,
        "secret": true
    }))
    .unwrap()
}

/// Endpoint and credentials for a single database instance (spec §4.2
/// `InstanceConfig`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InstanceConfig {
    pub database_type: DatabaseType,
    pub host: String,
    /// Configured port, if the operator knows it. When absent the
    /// paradigm's [`default_port`] is tried first, then [`fallback_ports`].
    #[serde(default)]
    pub port: Option<u16>,
    pub username: String,
    #[schemars(skip)]
    pub password: String,
    #[serde(default)]
    pub tunnel: Option<SshTunnelConfig>,
    /// Maximum time to wait for a TCP connect before trying the next
    /// candidate port.
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: std::time::Duration,
}

fn default_connect_timeout() -> std::time::Duration {
    std::time::Duration::from_secs(5)
}

impl InstanceConfig {
    /// The ordered list of ports a connection attempt should try: the
    /// explicit `port` if set, else the paradigm default followed by its
    /// fallbacks, de-duplicated in encounter order.
    pub fn candidate_ports(&self) -> Vec<u16> {
        let mut ports = Vec::new();
        if let Some(explicit) = self.port {
            ports.push(explicit);
        } else {
            ports.push(default_port(self.database_type));
        }
        for &fallback in fallback_ports(self.database_type) {
            if !ports.contains(&fallback) {
                ports.push(fallback);
            }
        }
        ports
    }
}

/// A single database/schema/catalog reachable through an [`InstanceConfig`]
/// (spec §4.2 `DatabaseConfig`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DatabaseConfig {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_port_is_tried_before_defaults() {
        let config = InstanceConfig {
            database_type: DatabaseType::Relational,
            host: "db.internal".to_string(),
            port: Some(6000),
            username: "svc".to_string(),
            password: String::new(),
            tunnel: None,
            connect_timeout: default_connect_timeout(),
        };
        let ports = config.candidate_ports();
        assert_eq!(ports[0], 6000);
        assert!(ports.contains(&5432));
    }

    #[test]
    fn unset_port_starts_from_paradigm_default() {
        let config = InstanceConfig {
            database_type: DatabaseType::Document,
            host: "docs.internal".to_string(),
            port: None,
            username: "svc".to_string(),
            password: String::new(),
            tunnel: None,
            connect_timeout: default_connect_timeout(),
        };
        assert_eq!(config.candidate_ports(), vec![27017]);
    }
}

//! SSH tunnel establishment ahead of the connection probe (spec §4.2.1,
//! SPEC_FULL §4.2 expansion): spawns `ssh -N -L` as a child process and
//! watches its stderr for the line that signals the tunnel is ready.

use crate::config::SshTunnelConfig;
use crate::error::{AdapterError, Result};
use std::os::unix::fs::PermissionsExt;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

/// A running local forward; `local_port` is what the adapter should dial
/// instead of `forward_host`/`forward_port` once [`SshTunnel::establish`]
/// returns.
pub struct SshTunnel {
    local_port: u16,
    process: Child,
}

impl SshTunnel {
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Spawns `ssh -L local_port:forward_host:forward_port`, waits for the
    /// tunnel to report readiness on stderr, and returns the handle. Tears
    /// down on drop if not explicitly stopped first.
    pub async fn establish(
        config: &SshTunnelConfig,
        forward_host: &str,
        forward_port: u16,
        local_port: u16,
    ) -> Result<Self> {
        let mut key_path = std::env::temp_dir();
        key_path.push(format!("anchor-ssh-key-{local_port}"));
        tokio::fs::write(&key_path, config.private_key.as_bytes())
            .await
            .map_err(AdapterError::Io)?;
        tokio::fs::set_permissions(&key_path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(AdapterError::Io)?;

        let args = vec![
            "-T".to_string(),
            "-v".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking no".to_string(),
            "-o".to_string(),
            "AddressFamily inet".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
            "-i".to_string(),
            key_path.to_string_lossy().into_owned(),
            "-N".to_string(),
            "-L".to_string(),
            format!("{local_port}:{forward_host}:{forward_port}"),
            config.ssh_endpoint.clone(),
        ];

        tracing::debug!(endpoint = %config.ssh_endpoint, local_port, "establishing ssh tunnel");
        let mut child = Command::new("ssh")
            .args(args)
            .stderr(Stdio::piped())
            .spawn()
            .map_err(AdapterError::Io)?;

        let stderr = child
            .stderr
            .take()
            .expect("stderr was piped at spawn time");
        let mut lines = BufReader::new(stderr).lines();

        while let Some(line) = lines.next_line().await.map_err(AdapterError::Io)? {
            if line.contains("Entering interactive session.") {
                tracing::debug!("ssh tunnel ready");
                return Ok(Self {
                    local_port,
                    process: child,
                });
            }
            if line.contains("Permission denied") || line.contains("Network is unreachable") {
                let _ = child.kill().await;
                return Err(AdapterError::Tunnel(line));
            }
        }

        tracing::warn!("ssh tunnel stderr closed before readiness signal");
        Ok(Self {
            local_port,
            process: child,
        })
    }

    pub async fn stop(mut self) -> Result<()> {
        match self.process.kill().await {
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            other => other.map_err(AdapterError::Io),
        }
    }
}

use std::{collections::BTreeMap, fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SSH_PORT: u16 = 22;

const REDACTED_VALUE: &str = "<REDACTED>";

/// Host name to IP address, ordered by host name so rendered inventories
/// are stable between runs.
pub type HostMap = BTreeMap<String, String>;

/// Everything a client tells us about the cluster it wants initialized or
/// deployed. One value is decoded per request and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterConfig {
    pub masters: HostMap,
    pub nodes: HostMap,
    pub first_master_hostname: String,
    pub ssh_user: String,
    pub ssh_pass: String,
    pub ssh_port: u16,
    pub network_adapter: String,
    pub keepalived_vip: String,
    pub service_network: String,
    pub pod_network: String,
    #[serde(rename = "loadBalancerIP")]
    pub load_balancer_ip: String,
    pub nfs_dir: String,
    #[serde(rename = "nfsServerIP")]
    pub nfs_server_ip: String,
    pub os_type: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            masters: HostMap::new(),
            nodes: HostMap::new(),
            first_master_hostname: String::new(),
            ssh_user: String::new(),
            ssh_pass: String::new(),
            ssh_port: DEFAULT_SSH_PORT,
            network_adapter: String::new(),
            keepalived_vip: String::new(),
            service_network: String::new(),
            pod_network: String::new(),
            load_balancer_ip: String::new(),
            nfs_dir: String::new(),
            nfs_server_ip: String::new(),
            os_type: String::new(),
        }
    }
}

impl ClusterConfig {
    /// Decode and validate a request body. Used where a bad payload must be
    /// rejected before anything runs.
    pub fn decode(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config = serde_json::from_slice::<ClusterConfig>(bytes)?;
        config.validate()?;

        Ok(config)
    }

    /// Decode a request body, falling back to the default configuration if
    /// the body is absent, malformed or invalid.
    pub fn try_decode(bytes: &[u8]) -> Self {
        match Self::decode(bytes) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to decode cluster config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_hosts("masters", &self.masters)?;
        validate_hosts("nodes", &self.nodes)?;

        if self.ssh_port == 0 {
            return Err(ConfigError::InvalidSshPort);
        }

        Ok(())
    }

    /// Write a pretty printed copy of this config, mostly so operators can
    /// see what the last request asked for.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        Ok(())
    }
}

fn validate_hosts(group: &'static str, hosts: &HostMap) -> Result<(), ConfigError> {
    for (host, address) in hosts {
        if host.trim().is_empty() {
            return Err(ConfigError::BlankHostName { group });
        }
        if address.trim().is_empty() {
            return Err(ConfigError::BlankHostAddress {
                group,
                host: host.clone(),
            });
        }
    }

    Ok(())
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ssh_pass = if self.ssh_pass.is_empty() {
            ""
        } else {
            REDACTED_VALUE
        };

        f.debug_struct("ClusterConfig")
            .field("masters", &self.masters)
            .field("nodes", &self.nodes)
            .field("first_master_hostname", &self.first_master_hostname)
            .field("ssh_user", &self.ssh_user)
            .field("ssh_pass", &ssh_pass)
            .field("ssh_port", &self.ssh_port)
            .field("network_adapter", &self.network_adapter)
            .field("keepalived_vip", &self.keepalived_vip)
            .field("service_network", &self.service_network)
            .field("pod_network", &self.pod_network)
            .field("load_balancer_ip", &self.load_balancer_ip)
            .field("nfs_dir", &self.nfs_dir)
            .field("nfs_server_ip", &self.nfs_server_ip)
            .field("os_type", &self.os_type)
            .finish()
    }
}

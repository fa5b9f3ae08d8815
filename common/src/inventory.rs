//! Rendering of a [`ClusterConfig`] into an ansible inventory and writing it
//! somewhere `ansible-playbook` can read it.
//!
//! Two formats are supported, the classic INI layout:
//!
//! ```text
//! [masters]
//! m1 ansible_host=10.0.0.1
//!
//! [nodes]
//! n1 ansible_host=10.0.0.2
//!
//! [all:vars]
//! ansible_ssh_port=22
//! ansible_ssh_user=root
//! ```
//!
//! and the structured YAML/JSON layout, written as JSON:
//!
//! ```text
//! all:
//!     children:
//!         masters:
//!             hosts:
//!                 m1:
//!                     ansible_host: 10.0.0.1
//!         nodes:
//!             hosts: {}
//!     vars:
//!         ansible_ssh_port: 22
//! ```

use std::{
    collections::BTreeMap,
    fs,
    io::Write as _,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::TempPath;

use crate::{
    cluster_config::{ClusterConfig, HostMap},
    error::InventoryError,
};

pub const MASTERS_GROUP: &str = "masters";
pub const NODES_GROUP: &str = "nodes";

pub const DEFAULT_INVENTORY_PATH: &str = "/etc/ansible/hosts";

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum InventoryFormat {
    /// `[group]` sections with `host ansible_host=ip` lines
    Ini,
    /// The structured host/group/vars document
    Json,
}

impl InventoryFormat {
    fn extension(&self) -> &'static str {
        match self {
            InventoryFormat::Ini => ".ini",
            InventoryFormat::Json => ".json",
        }
    }
}

/// Where the rendered inventory goes and how long it lives.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum InventoryPolicy {
    /// A fresh temporary file per run, removed once the run is over.
    Ephemeral,
    /// A fixed, well-known path which is left in place after the run.
    Persistent,
}

/// The ansible view of a cluster: two host groups and a set of variables
/// shared by every host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    masters: HostMap,
    nodes: HostMap,
    ssh_port: u16,
    vars: Vec<(&'static str, String)>,
}

impl Inventory {
    pub fn from_config(config: &ClusterConfig) -> Self {
        let optional_vars = [
            ("ansible_ssh_user", &config.ssh_user),
            ("ansible_ssh_pass", &config.ssh_pass),
            ("first_master_hostname", &config.first_master_hostname),
            ("network_adapter", &config.network_adapter),
            ("keepalived_vip", &config.keepalived_vip),
            ("service_network", &config.service_network),
            ("pod_network", &config.pod_network),
            ("load_balancer_ip", &config.load_balancer_ip),
            ("nfs_dir", &config.nfs_dir),
            ("nfs_server_ip", &config.nfs_server_ip),
            ("os_type", &config.os_type),
        ];

        let vars = optional_vars
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key, value.clone()))
            .collect();

        Self {
            masters: config.masters.clone(),
            nodes: config.nodes.clone(),
            ssh_port: config.ssh_port,
            vars,
        }
    }

    pub fn render(&self, format: InventoryFormat) -> Result<String, InventoryError> {
        match format {
            InventoryFormat::Ini => Ok(self.to_ini()),
            InventoryFormat::Json => self.to_json(),
        }
    }

    pub fn to_ini(&self) -> String {
        let mut lines = Vec::new();

        for (group, hosts) in [(MASTERS_GROUP, &self.masters), (NODES_GROUP, &self.nodes)] {
            lines.push(format!("[{group}]"));
            lines.extend(
                hosts
                    .iter()
                    .map(|(host, address)| format!("{host} ansible_host={address}")),
            );
            lines.push(String::new());
        }

        lines.push("[all:vars]".to_string());
        lines.push(format!("ansible_ssh_port={}", self.ssh_port));
        lines.extend(self.vars.iter().map(|(key, value)| format!("{key}={value}")));

        let mut ini = lines.join("\n");
        ini.push('\n');
        ini
    }

    pub fn to_json(&self) -> Result<String, InventoryError> {
        let mut vars = Map::new();
        vars.insert("ansible_ssh_port".into(), Value::from(self.ssh_port));
        for (key, value) in &self.vars {
            vars.insert((*key).into(), Value::from(value.as_str()));
        }

        let children = [(MASTERS_GROUP, &self.masters), (NODES_GROUP, &self.nodes)]
            .into_iter()
            .map(|(group, hosts)| {
                let hosts = hosts
                    .iter()
                    .map(|(host, address)| {
                        (
                            host.as_str(),
                            HostVars {
                                ansible_host: address,
                            },
                        )
                    })
                    .collect();

                (group, HostGroup { hosts })
            })
            .collect();

        let inventory = StructuredInventory {
            all: AllGroup { children, vars },
        };

        Ok(serde_json::to_string_pretty(&inventory)?)
    }
}

#[derive(Serialize)]
struct StructuredInventory<'a> {
    all: AllGroup<'a>,
}

#[derive(Serialize)]
struct AllGroup<'a> {
    children: BTreeMap<&'static str, HostGroup<'a>>,
    vars: Map<String, Value>,
}

#[derive(Serialize)]
struct HostGroup<'a> {
    hosts: BTreeMap<&'a str, HostVars<'a>>,
}

#[derive(Serialize)]
struct HostVars<'a> {
    ansible_host: &'a str,
}

/// Resolved inventory destination for a pipeline.
#[derive(Debug, Clone)]
pub struct InventoryLocation {
    pub policy: InventoryPolicy,
    pub format: InventoryFormat,
    /// Only used by [`InventoryPolicy::Persistent`]
    pub path: PathBuf,
}

impl InventoryLocation {
    pub fn write(&self, inventory: &Inventory) -> Result<InventoryFile, InventoryError> {
        let contents = inventory.render(self.format)?;

        match self.policy {
            InventoryPolicy::Ephemeral => {
                let mut file = tempfile::Builder::new()
                    .prefix("inventory-")
                    .suffix(self.format.extension())
                    .tempfile()?;

                file.write_all(contents.as_bytes())?;
                file.flush()?;

                Ok(InventoryFile::Ephemeral(file.into_temp_path()))
            }
            InventoryPolicy::Persistent => {
                if let Some(parent) = self.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                fs::write(&self.path, contents)?;

                Ok(InventoryFile::Persistent(self.path.clone()))
            }
        }
    }
}

/// A written inventory. Ephemeral inventories are deleted when this value is
/// dropped.
#[derive(Debug)]
pub enum InventoryFile {
    Ephemeral(TempPath),
    Persistent(PathBuf),
}

impl InventoryFile {
    pub fn path(&self) -> &Path {
        match self {
            InventoryFile::Ephemeral(path) => path,
            InventoryFile::Persistent(path) => path,
        }
    }
}

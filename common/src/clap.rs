use std::{path::PathBuf, time::Duration};

use clap::Args;

use crate::inventory::{InventoryFormat, InventoryLocation, InventoryPolicy, DEFAULT_INVENTORY_PATH};

pub const DEFAULT_PLAYBOOK_DIR: &str = "./ansiblePlaybook";
pub const DEFAULT_ANSIBLE_CONFIG_DESTINATION: &str = "/etc/ansible/ansible.cfg";
pub const DEFAULT_HELM_SOURCE: &str = "./pkg/helm";
pub const DEFAULT_HELM_INSTALL_DIR: &str = "/usr/local/bin";
pub const DEFAULT_SETTLE_DELAY_MS: &str = "1000";

/// Everything the initialize and deploy pipelines need to know about the
/// machine they run on. Fixed at process start.
#[derive(Args, Clone, Debug)]
pub struct PipelineConfig {
    /// Directory holding the ansible playbooks, one `<step>.yaml` per step
    #[clap(long, env = "PLAYBOOK_DIR", default_value = DEFAULT_PLAYBOOK_DIR)]
    pub playbook_dir: PathBuf,
    /// Whether the inventory is a temporary file removed after each run, or a
    /// fixed file which is left in place
    #[clap(long, env = "INVENTORY_POLICY", default_value = "persistent")]
    pub inventory_policy: InventoryPolicy,
    /// Where persistent inventories are written
    #[clap(long, env = "INVENTORY_PATH", default_value = DEFAULT_INVENTORY_PATH)]
    pub inventory_path: PathBuf,
    #[clap(long, env = "INVENTORY_FORMAT", default_value = "ini")]
    pub inventory_format: InventoryFormat,
    #[clap(long, default_value = "ansible-playbook")]
    pub ansible_playbook_program: String,
    #[clap(long, default_value = "kubectl")]
    pub kubectl_program: String,
    /// Package manager used to install ansible when it is missing
    #[clap(long, default_value = "yum")]
    pub package_manager_program: String,
    /// The ansible.cfg installed before initializing. Defaults to the one
    /// next to the playbooks
    #[clap(long)]
    pub ansible_config_source: Option<PathBuf>,
    #[clap(long, default_value = DEFAULT_ANSIBLE_CONFIG_DESTINATION)]
    pub ansible_config_destination: PathBuf,
    /// Bundled helm binary, copied into place when helm is not on the PATH
    #[clap(long, env = "HELM_SOURCE", default_value = DEFAULT_HELM_SOURCE)]
    pub helm_source: PathBuf,
    #[clap(long, default_value = DEFAULT_HELM_INSTALL_DIR)]
    pub helm_install_dir: PathBuf,
    /// Add-on manifest applied with kubectl after deploying, in the order given.
    /// Can be repeated
    #[clap(long = "addon-manifest")]
    pub addon_manifests: Vec<PathBuf>,
    /// Milliseconds to wait before each external command
    #[clap(long, env = "SETTLE_DELAY_MS", default_value = DEFAULT_SETTLE_DELAY_MS)]
    pub settle_delay_ms: u64,
}

impl PipelineConfig {
    pub fn inventory_location(&self) -> InventoryLocation {
        InventoryLocation {
            policy: self.inventory_policy,
            format: self.inventory_format,
            path: self.inventory_path.clone(),
        }
    }

    pub fn ansible_config_source(&self) -> PathBuf {
        self.ansible_config_source
            .clone()
            .unwrap_or_else(|| self.playbook_dir.join("ansible.cfg"))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl PipelineConfig {
    /// Ephemeral JSON inventories, no settle delay and two add-on manifests.
    pub fn for_tests() -> Self {
        Self {
            playbook_dir: PathBuf::from("/opt/playbooks"),
            inventory_policy: InventoryPolicy::Ephemeral,
            inventory_path: PathBuf::from(DEFAULT_INVENTORY_PATH),
            inventory_format: InventoryFormat::Json,
            ansible_playbook_program: "ansible-playbook".into(),
            kubectl_program: "kubectl".into(),
            package_manager_program: "yum".into(),
            ansible_config_source: None,
            ansible_config_destination: PathBuf::from(DEFAULT_ANSIBLE_CONFIG_DESTINATION),
            helm_source: PathBuf::from("/opt/pkg/helm"),
            helm_install_dir: PathBuf::from(DEFAULT_HELM_INSTALL_DIR),
            addon_manifests: vec![
                PathBuf::from("/opt/manifests/cilium.yaml"),
                PathBuf::from("/opt/manifests/nfs-csi.yaml"),
            ],
            settle_delay_ms: 0,
        }
    }
}

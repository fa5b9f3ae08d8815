use std::sync::Arc;

use super::{Action, Pipeline, PipelineKind, Step};
use crate::{clap::PipelineConfig, command::CommandRunner};

/// Container runtime, load balancing and then the kubernetes control plane.
pub const DEPLOY_PLAYBOOKS: [&str; 6] = [
    "installContainerd",
    "installNginx",
    "installKeepalived",
    "installKubeInit",
    "installKubeJoin",
    "installKubePost",
];

impl Pipeline {
    pub fn deploy(config: &PipelineConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let helm = Action::InstallBinary {
            binary: "helm".into(),
            source: config.helm_source.clone(),
            install_dir: config.helm_install_dir.clone(),
        };

        let addons = config
            .addon_manifests
            .iter()
            .map(|manifest| Action::ApplyManifest {
                kubectl: config.kubectl_program.clone(),
                manifest: manifest.clone(),
            });

        Self {
            kind: PipelineKind::Deploy,
            preparation: Vec::new(),
            steps: Step::sequence(&DEPLOY_PLAYBOOKS),
            post_actions: std::iter::once(helm).chain(addons).collect(),
            inventory: config.inventory_location(),
            ansible_playbook_program: config.ansible_playbook_program.clone(),
            playbook_dir: config.playbook_dir.clone(),
            runner,
        }
    }
}

use std::sync::Arc;

use super::{Action, Pipeline, PipelineKind, Step};
use crate::{clap::PipelineConfig, command::CommandRunner};

/// Node preparation, in the order the playbooks depend on each other.
pub const INITIALIZE_PLAYBOOKS: [&str; 12] = [
    "initConfigureHostname",
    "initUpdateEtcHosts",
    "initDisableServices",
    "initDisableSELinux",
    "initDisableSwap",
    "initUpdateSSHDConfig",
    "initUpdateLimitsConf",
    "initUpdateModulesConfig",
    "initConfigureTimeSync",
    "initConfigureSoftwareSources",
    "initInstallIPVS",
    "initConfigureKernel",
];

impl Pipeline {
    pub fn initialize(config: &PipelineConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let preparation = vec![
            Action::InstallPackages {
                binary: "ansible".into(),
                package_manager: config.package_manager_program.clone(),
                packages: vec!["epel-release".into(), "ansible".into()],
            },
            Action::CopyFile {
                label: "ansible configuration".into(),
                source: config.ansible_config_source(),
                destination: config.ansible_config_destination.clone(),
            },
        ];

        Self {
            kind: PipelineKind::Initialize,
            preparation,
            steps: Step::sequence(&INITIALIZE_PLAYBOOKS),
            post_actions: Vec::new(),
            inventory: config.inventory_location(),
            ansible_playbook_program: config.ansible_playbook_program.clone(),
            playbook_dir: config.playbook_dir.clone(),
            runner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cluster_config::ClusterConfig, command::testing::FakeCommandRunner,
        progress::testing::RecordingProgressReporter,
    };

    #[test]
    fn total_counts_preparation_inventory_and_final_report() {
        let pipeline = Pipeline::initialize(
            &PipelineConfig::for_tests(),
            Arc::new(FakeCommandRunner::new()),
        );

        assert_eq!(pipeline.kind(), PipelineKind::Initialize);
        assert_eq!(pipeline.steps().len(), 12);
        assert_eq!(pipeline.total_steps(), 2 + 1 + 12 + 1);
    }

    #[test]
    fn prepares_ansible_before_the_first_playbook() {
        let runner = Arc::new(FakeCommandRunner::new());
        let pipeline = Pipeline::initialize(&PipelineConfig::for_tests(), runner.clone());
        let mut reporter = RecordingProgressReporter::new(pipeline.total_steps());

        pipeline
            .run(&ClusterConfig::default(), &mut reporter)
            .unwrap();

        let lines = runner.executed_lines();
        assert_eq!(lines[0], "yum install epel-release -y");
        assert_eq!(lines[1], "yum install ansible -y");
        assert_eq!(
            lines[2],
            "cp -f /opt/playbooks/ansible.cfg /etc/ansible/ansible.cfg"
        );
        assert!(lines[3].ends_with("initConfigureHostname.yaml"));

        let messages: Vec<&str> = reporter
            .messages
            .iter()
            .map(|message| message.message.as_str())
            .collect();
        assert_eq!(
            &messages[..4],
            &[
                "Checking ansible installation",
                "Copying ansible configuration",
                "Generating ansible inventory",
                "Running initConfigureHostname (1/12)",
            ]
        );
    }

    #[test]
    fn ansible_configuration_is_copied_even_when_ansible_is_installed() {
        let runner = Arc::new(FakeCommandRunner::new().with_available("ansible"));
        let pipeline = Pipeline::initialize(&PipelineConfig::for_tests(), runner.clone());
        let mut reporter = RecordingProgressReporter::new(pipeline.total_steps());

        pipeline
            .run(&ClusterConfig::default(), &mut reporter)
            .unwrap();

        assert_eq!(
            runner.executed_lines()[0],
            "cp -f /opt/playbooks/ansible.cfg /etc/ansible/ansible.cfg"
        );
    }
}

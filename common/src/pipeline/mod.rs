//! Linear, fail-fast pipelines of ansible playbooks.
//!
//! A run goes through four phases, reporting progress before each unit of
//! work:
//!
//! 1. preparation actions (e.g. making sure ansible is installed)
//! 2. inventory generation
//! 3. the playbook steps, in their static order
//! 4. post-pipeline actions (e.g. installing helm, applying add-on manifests)
//!
//! The first failure ends the run. Nothing is retried or rolled back.

mod action;
mod deploy;
mod initialize;
mod step;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

pub use action::Action;
pub use deploy::DEPLOY_PLAYBOOKS;
pub use initialize::INITIALIZE_PLAYBOOKS;
pub use step::Step;
use strum::Display;

use crate::{
    cluster_config::ClusterConfig,
    command::CommandRunner,
    error::PipelineError,
    inventory::{Inventory, InventoryLocation},
    progress::ProgressReporter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PipelineKind {
    Initialize,
    Deploy,
}

impl PipelineKind {
    pub fn completed_message(&self) -> &'static str {
        match self {
            PipelineKind::Initialize => "Cluster initialization complete",
            PipelineKind::Deploy => "Cluster deployment complete",
        }
    }

    pub fn failed_message(&self, error: &PipelineError) -> String {
        match self {
            PipelineKind::Initialize => format!("Cluster initialization failed: {error}"),
            PipelineKind::Deploy => format!("Cluster deployment failed: {error}"),
        }
    }
}

pub struct Pipeline {
    kind: PipelineKind,
    preparation: Vec<Action>,
    steps: Vec<Step>,
    post_actions: Vec<Action>,
    inventory: InventoryLocation,
    ansible_playbook_program: String,
    playbook_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl Pipeline {
    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn playbook_dir(&self) -> &Path {
        &self.playbook_dir
    }

    /// Number of progress reports a successful run makes.
    pub fn total_steps(&self) -> u32 {
        // One report for the inventory and one once everything is done
        let bookkeeping = self.preparation.len() + 1 + self.post_actions.len() + 1;

        (self.steps.len() + bookkeeping) as u32
    }

    pub fn run<R>(&self, config: &ClusterConfig, reporter: &mut R) -> Result<(), PipelineError>
    where
        R: ProgressReporter + ?Sized,
    {
        tracing::info!("Starting cluster {}", self.kind);

        for action in &self.preparation {
            self.run_action(action, reporter)?;
        }

        reporter.report_progress("Generating ansible inventory");
        // Dropping the file at the end of the run removes ephemeral inventories
        let inventory = self.inventory.write(&Inventory::from_config(config))?;
        tracing::info!("Inventory written to {}", inventory.path().display());

        for step in &self.steps {
            reporter.report_progress(&step.describe());

            let command = step.command(
                &self.ansible_playbook_program,
                &self.playbook_dir,
                inventory.path(),
            );

            self.runner
                .execute(&command)
                .map_err(|source| PipelineError::Step {
                    step: step.name.clone(),
                    source,
                })?;
        }

        for action in &self.post_actions {
            self.run_action(action, reporter)?;
        }

        reporter.report_progress(self.kind.completed_message());
        tracing::info!("Cluster {} completed successfully", self.kind);

        Ok(())
    }

    fn run_action<R>(&self, action: &Action, reporter: &mut R) -> Result<(), PipelineError>
    where
        R: ProgressReporter + ?Sized,
    {
        reporter.report_progress(&action.describe());

        action
            .run(self.runner.as_ref())
            .map_err(|source| PipelineError::Step {
                step: action.name(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clap::PipelineConfig,
        command::testing::FakeCommandRunner,
        progress::{testing::RecordingProgressReporter, ProgressKind},
    };

    fn cluster() -> ClusterConfig {
        let mut config = ClusterConfig {
            ssh_user: "root".into(),
            ..Default::default()
        };
        config.masters.insert("m1".into(), "10.0.0.1".into());
        config.nodes.insert("n1".into(), "10.0.0.2".into());
        config
    }

    fn run(
        pipeline: &Pipeline,
        config: &ClusterConfig,
    ) -> (Result<(), PipelineError>, RecordingProgressReporter) {
        let mut reporter = RecordingProgressReporter::new(pipeline.total_steps());
        let result = pipeline.run(config, &mut reporter);
        (result, reporter)
    }

    fn playbook_runs(runner: &FakeCommandRunner) -> Vec<String> {
        runner
            .executed()
            .into_iter()
            .filter(|command| command.program == "ansible-playbook")
            .filter_map(|command| command.args.last().cloned())
            .collect()
    }

    #[test]
    fn initialize_runs_every_playbook_in_order() {
        let runner = Arc::new(FakeCommandRunner::new().with_available("ansible"));
        let pipeline = Pipeline::initialize(&PipelineConfig::for_tests(), runner.clone());

        let (result, reporter) = run(&pipeline, &cluster());

        result.unwrap();
        let expected: Vec<String> = INITIALIZE_PLAYBOOKS
            .iter()
            .map(|name| format!("{name}.yaml"))
            .collect();
        assert_eq!(playbook_runs(&runner), expected);

        let last = reporter.messages.last().unwrap();
        assert_eq!(last.message, "Cluster initialization complete");
        assert_eq!(last.step, pipeline.total_steps());
    }

    #[test]
    fn step_counter_increases_by_one_up_to_total() {
        let runner = Arc::new(FakeCommandRunner::new());
        let pipeline = Pipeline::deploy(&PipelineConfig::for_tests(), runner);

        let (result, reporter) = run(&pipeline, &cluster());

        result.unwrap();
        for (i, message) in reporter.messages.iter().enumerate() {
            assert_eq!(message.step, i as u32 + 1);
            assert_eq!(message.total, pipeline.total_steps());
            assert_eq!(message.kind, ProgressKind::Progress);
        }
        assert_eq!(reporter.messages.len() as u32, pipeline.total_steps());
    }

    #[test]
    fn total_does_not_depend_on_installed_tools() {
        let config = PipelineConfig::for_tests();

        for runner in [
            FakeCommandRunner::new(),
            FakeCommandRunner::new().with_available("ansible"),
        ] {
            let pipeline = Pipeline::initialize(&config, Arc::new(runner));
            let (result, reporter) = run(&pipeline, &cluster());

            result.unwrap();
            assert_eq!(reporter.messages.len() as u32, pipeline.total_steps());
        }
    }

    #[test]
    fn failing_step_stops_the_pipeline() {
        let runner = Arc::new(FakeCommandRunner::new().failing_on("installKeepalived.yaml"));
        let pipeline = Pipeline::deploy(&PipelineConfig::for_tests(), runner.clone());

        let (result, reporter) = run(&pipeline, &cluster());

        let err = result.unwrap_err();
        assert_eq!(err.failed_step(), Some("installKeepalived"));
        assert!(err.to_string().contains("installKeepalived"));
        assert!(err.to_string().contains("simulated failure"));

        assert_eq!(
            playbook_runs(&runner),
            vec![
                "installContainerd.yaml",
                "installNginx.yaml",
                "installKeepalived.yaml"
            ]
        );
        // No helm install or manifests once a playbook failed
        assert!(runner
            .executed()
            .iter()
            .all(|command| command.program == "ansible-playbook"));

        let last = reporter.messages.last().unwrap();
        assert_eq!(last.message, "Running installKeepalived (3/6)");
        assert!(last.step < pipeline.total_steps());
    }

    #[test]
    fn failing_post_action_is_named() {
        let runner = Arc::new(FakeCommandRunner::new().failing_on("/opt/manifests/cilium.yaml"));
        let pipeline = Pipeline::deploy(&PipelineConfig::for_tests(), runner.clone());

        let (result, _) = run(&pipeline, &cluster());

        let err = result.unwrap_err();
        assert_eq!(err.failed_step(), Some("apply cilium.yaml"));
        assert!(!runner
            .executed_lines()
            .iter()
            .any(|line| line.contains("nfs-csi.yaml")));
    }

    #[test]
    fn failing_preparation_skips_inventory_and_playbooks() {
        let runner = Arc::new(FakeCommandRunner::new().failing_on("ansible"));
        let pipeline = Pipeline::initialize(&PipelineConfig::for_tests(), runner.clone());

        let (result, reporter) = run(&pipeline, &cluster());

        let err = result.unwrap_err();
        assert_eq!(err.failed_step(), Some("install ansible"));
        assert!(playbook_runs(&runner).is_empty());
        assert_eq!(reporter.messages.len(), 1);
    }

    #[test]
    fn empty_cluster_is_accepted() {
        let runner = Arc::new(FakeCommandRunner::new());
        let pipeline = Pipeline::deploy(&PipelineConfig::for_tests(), runner.clone());

        let (result, _) = run(&pipeline, &ClusterConfig::default());

        result.unwrap();
        assert_eq!(playbook_runs(&runner).len(), DEPLOY_PLAYBOOKS.len());
    }

    #[test]
    fn ephemeral_inventory_is_passed_explicitly_and_removed() {
        let runner = Arc::new(FakeCommandRunner::new());
        let pipeline = Pipeline::deploy(&PipelineConfig::for_tests(), runner.clone());

        let (result, _) = run(&pipeline, &cluster());
        result.unwrap();

        let inventory_paths: Vec<PathBuf> = runner
            .executed()
            .into_iter()
            .filter(|command| command.program == "ansible-playbook")
            .map(|command| PathBuf::from(&command.args[1]))
            .collect();

        assert_eq!(inventory_paths.len(), DEPLOY_PLAYBOOKS.len());
        assert!(inventory_paths.windows(2).all(|pair| pair[0] == pair[1]));
        assert!(!inventory_paths[0].exists());
    }

    #[test]
    fn ephemeral_inventory_is_removed_after_a_failed_run() {
        let runner = Arc::new(FakeCommandRunner::new().failing_on("installKubeInit.yaml"));
        let pipeline = Pipeline::deploy(&PipelineConfig::for_tests(), runner.clone());

        let (result, _) = run(&pipeline, &cluster());
        assert_eq!(result.unwrap_err().failed_step(), Some("installKubeInit"));

        let failed = runner
            .executed()
            .into_iter()
            .find(|command| command.args.last().map(String::as_str) == Some("installKubeInit.yaml"))
            .unwrap();
        assert_eq!(failed.args[0], "-i");

        let inventory = PathBuf::from(&failed.args[1]);
        assert!(inventory.extension().is_some_and(|extension| extension == "json"));
        assert!(!inventory.exists());
    }

    #[test]
    fn persistent_inventory_is_left_for_later_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::for_tests();
        config.inventory_policy = crate::inventory::InventoryPolicy::Persistent;
        config.inventory_format = crate::inventory::InventoryFormat::Ini;
        config.inventory_path = dir.path().join("hosts");

        let runner = Arc::new(FakeCommandRunner::new().with_available("ansible"));
        let pipeline = Pipeline::initialize(&config, runner);

        let (result, _) = run(&pipeline, &cluster());
        result.unwrap();

        let written = std::fs::read_to_string(dir.path().join("hosts")).unwrap();
        assert!(written.contains("m1 ansible_host=10.0.0.1"));
        assert!(written.contains("n1 ansible_host=10.0.0.2"));
    }
}

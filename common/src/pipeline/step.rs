use std::path::Path;

use crate::command::CommandSpec;

/// One playbook of a pipeline, with its position in the static sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub index: usize,
    pub total: usize,
}

impl Step {
    pub fn sequence(playbooks: &[&str]) -> Vec<Step> {
        playbooks
            .iter()
            .enumerate()
            .map(|(index, name)| Step {
                name: name.to_string(),
                index,
                total: playbooks.len(),
            })
            .collect()
    }

    pub fn playbook_file(&self) -> String {
        format!("{}.yaml", self.name)
    }

    pub fn describe(&self) -> String {
        format!("Running {} ({}/{})", self.name, self.index + 1, self.total)
    }

    pub fn command(&self, program: &str, playbook_dir: &Path, inventory: &Path) -> CommandSpec {
        CommandSpec::new(program)
            .arg("-i")
            .path_arg(inventory)
            .arg(self.playbook_file())
            .current_dir(playbook_dir)
    }
}

use std::path::{Path, PathBuf};

use crate::{
    command::{CommandRunner, CommandSpec},
    error::CommandError,
};

/// Fixed bookkeeping work done around the playbook steps of a pipeline.
///
/// Every action reports exactly once, even when there turns out to be
/// nothing to do, so the step total of a run never depends on the state of
/// the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Install packages with the system package manager, unless `binary` is
    /// already on the `PATH`.
    InstallPackages {
        binary: String,
        package_manager: String,
        packages: Vec<String>,
    },
    /// Copy a bundled executable into `install_dir`, unless `binary` is
    /// already on the `PATH`.
    InstallBinary {
        binary: String,
        source: PathBuf,
        install_dir: PathBuf,
    },
    /// Copy a bundled file over `destination`.
    CopyFile {
        label: String,
        source: PathBuf,
        destination: PathBuf,
    },
    /// `kubectl apply -f <manifest>`
    ApplyManifest { kubectl: String, manifest: PathBuf },
}

impl Action {
    /// Short name used to annotate failures.
    pub fn name(&self) -> String {
        match self {
            Action::InstallPackages { binary, .. } => format!("install {binary}"),
            Action::InstallBinary { binary, .. } => format!("install {binary}"),
            Action::CopyFile { label, .. } => format!("copy {label}"),
            Action::ApplyManifest { manifest, .. } => {
                format!("apply {}", manifest_name(manifest))
            }
        }
    }

    /// Progress message reported before the action runs.
    pub fn describe(&self) -> String {
        match self {
            Action::InstallPackages { binary, .. } => {
                format!("Checking {binary} installation")
            }
            Action::InstallBinary { binary, .. } => format!("Installing {binary}"),
            Action::CopyFile { label, .. } => format!("Copying {label}"),
            Action::ApplyManifest { manifest, .. } => {
                format!("Applying add-on {}", manifest_name(manifest))
            }
        }
    }

    pub fn run(&self, runner: &dyn CommandRunner) -> Result<(), CommandError> {
        match self {
            Action::InstallPackages {
                binary,
                package_manager,
                packages,
            } => {
                if runner.is_available(binary) {
                    tracing::info!("{} is already installed", binary);
                    return Ok(());
                }

                for package in packages {
                    tracing::info!("Installing {}", package);
                    let command = CommandSpec::new(package_manager)
                        .arg("install")
                        .arg(package)
                        .arg("-y");
                    runner.execute(&command)?;
                }

                tracing::info!("{} installed successfully", binary);
            }
            Action::InstallBinary {
                binary,
                source,
                install_dir,
            } => {
                if runner.is_available(binary) {
                    tracing::info!("{} is already installed", binary);
                    return Ok(());
                }

                tracing::info!("{} not found, installing", binary);
                runner.execute(&copy_command(source, install_dir))?;
                tracing::info!("{} installed successfully", binary);
            }
            Action::CopyFile {
                source,
                destination,
                ..
            } => {
                runner.execute(&copy_command(source, destination))?;
            }
            Action::ApplyManifest { kubectl, manifest } => {
                let command = CommandSpec::new(kubectl)
                    .arg("apply")
                    .arg("-f")
                    .path_arg(manifest);
                runner.execute(&command)?;
            }
        }

        Ok(())
    }
}

fn copy_command(source: &Path, destination: &Path) -> CommandSpec {
    CommandSpec::new("cp")
        .arg("-f")
        .path_arg(source)
        .path_arg(destination)
}

fn manifest_name(manifest: &Path) -> String {
    manifest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| manifest.to_string_lossy().into_owned())
}

//! Git submodule synchronization.
//!
//! Shells out to `git submodule update --init` in the project root. Success
//! or failure is read from the exit status only; git's own output goes
//! straight to the terminal.

use std::process::Command;

use tracing::{debug, info, instrument};

use docmake_shared::{DocmakeError, ProjectRoot, Result, SubmodulesConfig};

use crate::process::{display_command, exit_code, run_inherited};

/// Brings subordinate components under the root up to date.
pub trait SubmoduleSync {
    /// Synchronize submodules beneath `root`. Any failure is fatal to the launch.
    fn sync(&self, root: &ProjectRoot) -> Result<()>;
}

/// `git submodule update --init` backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitSubmodules {
    git: String,
    recursive: bool,
    paths: Vec<String>,
}

impl GitSubmodules {
    /// Arguments passed to git, after the program name.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["submodule", "update", "--init"]
            .into_iter()
            .map(String::from)
            .collect();
        if self.recursive {
            args.push("--recursive".into());
        }
        if !self.paths.is_empty() {
            args.push("--".into());
            args.extend(self.paths.iter().cloned());
        }
        args
    }
}

impl From<&SubmodulesConfig> for GitSubmodules {
    fn from(config: &SubmodulesConfig) -> Self {
        Self {
            git: config.git.clone(),
            recursive: config.recursive,
            paths: config.paths.clone(),
        }
    }
}

impl SubmoduleSync for GitSubmodules {
    #[instrument(skip_all, fields(root = %root))]
    fn sync(&self, root: &ProjectRoot) -> Result<()> {
        let args = self.args();
        let shown = display_command(&self.git, &args);
        info!(command = %shown, "synchronizing submodules");

        let mut command = Command::new(&self.git);
        command.args(&args).current_dir(root.as_path());

        let status = run_inherited(command)?;
        if !status.success() {
            let code = exit_code(status);
            debug!(code, "submodule sync failed");
            return Err(DocmakeError::SubmoduleSync {
                command: shown,
                code,
            });
        }

        Ok(())
    }
}

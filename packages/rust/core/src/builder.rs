//! Delegated documentation builder.
//!
//! The builder is an external program. docmake appends the project root to
//! its fixed arguments, forwards any extra CLI arguments after that, and
//! passes the `[site]` declaration through the environment.

use std::collections::BTreeMap;
use std::process::Command;

use tracing::{debug, info, instrument};

use docmake_shared::{DocmakeError, ProjectConfig, ProjectRoot, Result, SiteConfig};

use crate::process::{display_command, exit_code, run_inherited};

/// Environment variable holding the project root for the builder.
pub const ROOT_ENV: &str = "DOCMAKE_ROOT";

/// Environment variable holding the `[site]` section as JSON.
pub const SITE_CONFIG_ENV: &str = "DOCMAKE_SITE_CONFIG";

/// The external routine that actually renders documentation.
pub trait BuildRoutine {
    /// Build the documentation rooted at `root`.
    ///
    /// Returns the builder's exit code on success (always 0 for process builders).
    fn build(&self, root: &ProjectRoot, forwarded_args: &[String]) -> Result<i32>;
}

/// Builder backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
    fixed_args: Vec<String>,
    env: BTreeMap<String, String>,
    site_json: Option<String>,
}

impl CommandBuilder {
    /// Build from `[program, args...]`.
    pub fn new(command_line: &[String]) -> Result<Self> {
        let (program, fixed_args) = command_line.split_first().ok_or_else(|| {
            DocmakeError::config(
                "no builder configured; set `builder` in the [launcher] section of docmake.toml",
            )
        })?;

        if program.trim().is_empty() {
            return Err(DocmakeError::config("launcher.builder program is empty"));
        }

        Ok(Self {
            program: program.clone(),
            fixed_args: fixed_args.to_vec(),
            env: BTreeMap::new(),
            site_json: None,
        })
    }

    /// Build from a loaded project config, carrying its env and site declaration.
    pub fn from_config(config: &ProjectConfig) -> Result<Self> {
        Ok(Self::new(&config.launcher.builder)?
            .with_env(config.launcher.env.clone())
            .with_site(&config.site)?)
    }

    /// Extra environment variables for the builder process.
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Hand the site declaration to the builder as JSON.
    pub fn with_site(mut self, site: &SiteConfig) -> Result<Self> {
        let json = serde_json::to_string(site)
            .map_err(|e| DocmakeError::config(format!("failed to encode site config: {e}")))?;
        self.site_json = Some(json);
        Ok(self)
    }

    /// Full argument list: fixed args, then the root, then forwarded args.
    pub fn args(&self, root: &ProjectRoot, forwarded_args: &[String]) -> Vec<String> {
        let mut args = self.fixed_args.clone();
        args.push(root.to_string());
        args.extend(forwarded_args.iter().cloned());
        args
    }

    fn command(&self, root: &ProjectRoot, forwarded_args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(self.args(root, forwarded_args))
            .envs(&self.env)
            .env(ROOT_ENV, root.as_path());
        if let Some(json) = &self.site_json {
            command.env(SITE_CONFIG_ENV, json);
        }
        command
    }
}

impl BuildRoutine for CommandBuilder {
    #[instrument(skip_all, fields(root = %root, program = %self.program))]
    fn build(&self, root: &ProjectRoot, forwarded_args: &[String]) -> Result<i32> {
        let shown = display_command(&self.program, &self.args(root, forwarded_args));
        info!(command = %shown, "delegating to documentation builder");

        let status = run_inherited(self.command(root, forwarded_args))?;
        let code = exit_code(status);
        if !status.success() {
            debug!(code, "builder failed");
            return Err(DocmakeError::DelegatedBuild {
                command: shown,
                code,
            });
        }

        Ok(code)
    }
}

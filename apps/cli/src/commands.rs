//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docmake_core::builder::CommandBuilder;
use docmake_core::entrypoint::launch;
use docmake_core::submodules::GitSubmodules;
use docmake_shared::{
    LaunchOptions, ProjectConfig, ProjectRoot, config_file_path, init_config, load_config,
    validate_site,
};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docmake: build documentation through a shared builder.
#[derive(Parser)]
#[command(
    name = "docmake",
    version,
    about = "Resolve a documentation project from its entry script and run its builder.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build the documentation project that contains ENTRY.
    ///
    /// Works as a shebang: `#!/usr/bin/env -S docmake run`. docmake's own
    /// flags go before ENTRY; everything after it belongs to the builder.
    Run {
        /// Run `git submodule update --init` first, overriding docmake.toml.
        #[arg(long, conflicts_with = "no_sync_submodules")]
        sync_submodules: bool,

        /// Skip submodule sync, overriding docmake.toml.
        #[arg(long)]
        no_sync_submodules: bool,

        /// Entry script (its directory is the project root), then arguments
        /// forwarded verbatim to the builder.
        #[arg(
            value_name = "ENTRY",
            env = "DOCMAKE_ENTRY",
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        command_line: Vec<String>,
    },

    /// Print the project root resolved from ENTRY.
    Root {
        /// Entry script; its directory is the project root.
        #[arg(env = "DOCMAKE_ENTRY")]
        entry: PathBuf,
    },

    /// Project configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default docmake.toml.
    Init {
        /// Directory to write into (defaults to the current directory).
        dir: Option<PathBuf>,

        /// Overwrite an existing docmake.toml.
        #[arg(long)]
        force: bool,
    },
    /// Show the resolved configuration for the project containing ENTRY.
    Show {
        #[arg(env = "DOCMAKE_ENTRY")]
        entry: PathBuf,

        /// Print JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },
    /// Validate docmake.toml for the project containing ENTRY.
    Check {
        #[arg(env = "DOCMAKE_ENTRY")]
        entry: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so builder output on stdout stays untouched.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docmake=warn",
        1 => "docmake=info",
        2 => "docmake=debug",
        _ => "docmake=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command and turn its result into the process exit code.
pub(crate) fn run(cli: Cli) -> Result<ExitCode> {
    dispatch(cli).map(|code| ExitCode::from(exit_status_byte(code)))
}

fn dispatch(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Run {
            sync_submodules,
            no_sync_submodules,
            command_line,
        } => {
            let sync = match (sync_submodules, no_sync_submodules) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let (entry, args) = split_entry(command_line)?;
            cmd_run(&entry, sync, args)
        }
        Command::Root { entry } => cmd_root(&entry),
        Command::Config { action } => match action {
            ConfigAction::Init { dir, force } => cmd_config_init(dir.as_deref(), force),
            ConfigAction::Show { entry, json } => cmd_config_show(&entry, json),
            ConfigAction::Check { entry } => cmd_config_check(&entry),
        },
    }
}

/// Separate the entry script from the arguments forwarded to the builder.
fn split_entry(mut command_line: Vec<String>) -> Result<(PathBuf, Vec<String>)> {
    if command_line.is_empty() {
        return Err(eyre!("missing entry script"));
    }
    let entry = PathBuf::from(command_line.remove(0));
    Ok((entry, command_line))
}

/// Clamp a subprocess exit code into the range a process can report.
fn exit_status_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_run(entry: &Path, sync: Option<bool>, args: Vec<String>) -> Result<i32> {
    let root = ProjectRoot::from_entry_in_cwd(entry)?;
    let config = load_config(&root)?;
    validate_site(&root, &config.site)?;

    let options = LaunchOptions::from(&config)
        .with_sync_override(sync)
        .with_forwarded_args(args);

    let submodules = GitSubmodules::from(&config.submodules);
    let builder = CommandBuilder::from_config(&config)?;

    info!(
        root = %root,
        sync = options.sync_submodules,
        forwarded = options.forwarded_args.len(),
        "launching documentation build"
    );

    match launch(&root, &options, &submodules, &builder) {
        Ok(outcome) => Ok(outcome.exit_code),
        Err(e) => match e.passthrough_exit_code() {
            // The subprocess already printed its own diagnostics.
            Some(code) => {
                debug!(error = %e, "forwarding subprocess exit code");
                Ok(code)
            }
            None => Err(e.into()),
        },
    }
}

fn cmd_root(entry: &Path) -> Result<i32> {
    let root = ProjectRoot::from_entry_in_cwd(entry)?;
    println!("{root}");
    Ok(0)
}

fn cmd_config_init(dir: Option<&Path>, force: bool) -> Result<i32> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };
    let path = init_config(&dir, force)?;
    println!("Config initialized at: {}", path.display());
    Ok(0)
}

fn cmd_config_show(entry: &Path, json: bool) -> Result<i32> {
    let root = ProjectRoot::from_entry_in_cwd(entry)?;
    let config: ProjectConfig = load_config(&root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", toml::to_string_pretty(&config)?);
    }
    Ok(0)
}

fn cmd_config_check(entry: &Path) -> Result<i32> {
    let root = ProjectRoot::from_entry_in_cwd(entry)?;
    let path = config_file_path(&root);
    if !path.exists() {
        return Err(eyre!(
            "no docmake.toml found in '{root}'; run `docmake config init {root}` to create one"
        ));
    }

    let config = load_config(&root)?;
    validate_site(&root, &config.site)?;
    CommandBuilder::new(&config.launcher.builder)?;

    println!("{} is valid", path.display());
    Ok(0)
}

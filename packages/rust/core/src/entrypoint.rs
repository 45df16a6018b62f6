//! The build entrypoint: resolve root → optional submodule sync → delegate.

use std::time::{Duration, Instant};

use tracing::{info, instrument};

use docmake_shared::{LaunchOptions, ProjectRoot, Result};

use crate::builder::BuildRoutine;
use crate::submodules::SubmoduleSync;

/// Result of a successful launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Exit code reported by the builder.
    pub exit_code: i32,
    /// Whether submodules were synchronized first.
    pub synced: bool,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Run the launch sequence for an already-resolved root.
///
/// 1. Sync submodules, if `options.sync_submodules` is set
/// 2. Invoke the builder exactly once with the root
///
/// Failures from either step are returned untouched; nothing is retried.
#[instrument(skip_all, fields(root = %root, sync = options.sync_submodules))]
pub fn launch(
    root: &ProjectRoot,
    options: &LaunchOptions,
    submodules: &dyn SubmoduleSync,
    builder: &dyn BuildRoutine,
) -> Result<BuildOutcome> {
    let start = Instant::now();

    if options.sync_submodules {
        submodules.sync(root)?;
    }

    let exit_code = builder.build(root, &options.forwarded_args)?;

    let outcome = BuildOutcome {
        exit_code,
        synced: options.sync_submodules,
        elapsed: start.elapsed(),
    };
    info!(elapsed_ms = outcome.elapsed.as_millis() as u64, "documentation build finished");

    Ok(outcome)
}

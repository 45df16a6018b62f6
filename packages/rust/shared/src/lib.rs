//! Shared types, error model, and configuration for docmake.
//!
//! This crate is the foundation depended on by the other docmake crates.
//! It provides:
//! - [`DocmakeError`]: the unified error type
//! - [`ProjectRoot`]: the resolved project root
//! - Configuration ([`ProjectConfig`], [`LaunchOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    CONFIG_FILE_NAME, LauncherConfig, LaunchOptions, LintConfig, ProjectConfig, SiteConfig,
    SubmodulesConfig, config_file_path, init_config, load_config, load_config_from,
    validate_site,
};
pub use error::{DocmakeError, Result};
pub use types::{ProjectRoot, normalize_lexically};

//! Project configuration for docmake.
//!
//! Each documentation project carries a `docmake.toml` next to its entry
//! script. CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DocmakeError, Result};
use crate::types::ProjectRoot;

/// Configuration file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "docmake.toml";

static DOCUMENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]{1,7}$").expect("valid document id regex"));

// ---------------------------------------------------------------------------
// Config structs (matching docmake.toml schema)
// ---------------------------------------------------------------------------

/// Top-level project config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// How to invoke the delegated build routine.
    #[serde(default)]
    pub launcher: LauncherConfig,

    /// Submodule synchronization before the build.
    #[serde(default)]
    pub submodules: SubmodulesConfig,

    /// Site declaration handed to the builder.
    #[serde(default)]
    pub site: SiteConfig,
}

/// `[launcher]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Builder program followed by its fixed arguments.
    #[serde(default)]
    pub builder: Vec<String>,

    /// Extra environment variables for the builder process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// `[submodules]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmodulesConfig {
    /// Run `git submodule update --init` before building.
    #[serde(default)]
    pub sync: bool,

    /// Version-control program to invoke.
    #[serde(default = "default_git")]
    pub git: String,

    /// Also initialize nested submodules.
    #[serde(default)]
    pub recursive: bool,

    /// Restrict the update to these paths (relative to the root).
    #[serde(default)]
    pub paths: Vec<String>,
}

impl Default for SubmodulesConfig {
    fn default() -> Self {
        Self {
            sync: false,
            git: default_git(),
            recursive: false,
            paths: Vec::new(),
        }
    }
}

fn default_git() -> String {
    "git".into()
}

/// `[site]` section. Interpreted by the builder, only validated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    /// Directory holding the document sources, relative to the root.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Builder extensions to enable, in order.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Substitutions data file, relative to `source_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitutions_path: Option<String>,

    /// Target-names data file, relative to `source_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_names_path: Option<String>,

    /// Short uppercase identifier used to prefix paragraph ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default)]
    pub theme_path: Vec<String>,

    #[serde(default)]
    pub theme_options: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_short_title: Option<String>,

    #[serde(default)]
    pub templates_path: Vec<String>,

    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    #[serde(default)]
    pub lint: LintConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            project: None,
            author: None,
            copyright: None,
            source_dir: default_source_dir(),
            extensions: Vec::new(),
            substitutions_path: None,
            target_names_path: None,
            document_id: None,
            theme: None,
            theme_path: Vec::new(),
            theme_options: BTreeMap::new(),
            html_title: None,
            html_short_title: None,
            templates_path: Vec::new(),
            exclude_patterns: Vec::new(),
            lint: LintConfig::default(),
        }
    }
}

fn default_source_dir() -> String {
    "src".into()
}

/// `[site.lint]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintConfig {
    /// Documents whose section titles must be sorted.
    #[serde(default)]
    pub alphabetical_section_titles: Vec<String>,

    /// Documents exempt from paragraph ids.
    #[serde(default)]
    pub no_paragraph_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Launch options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime launch options, merged from the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Synchronize submodules before building.
    pub sync_submodules: bool,
    /// Arguments forwarded after the root path.
    pub forwarded_args: Vec<String>,
}

impl From<&ProjectConfig> for LaunchOptions {
    fn from(config: &ProjectConfig) -> Self {
        Self {
            sync_submodules: config.submodules.sync,
            forwarded_args: Vec::new(),
        }
    }
}

impl LaunchOptions {
    /// Apply a CLI `--sync-submodules`/`--no-sync-submodules` override.
    pub fn with_sync_override(mut self, sync: Option<bool>) -> Self {
        if let Some(sync) = sync {
            self.sync_submodules = sync;
        }
        self
    }

    /// Arguments to forward verbatim to the builder.
    pub fn with_forwarded_args(mut self, args: Vec<String>) -> Self {
        self.forwarded_args = args;
        self
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file for a project root.
pub fn config_file_path(root: &ProjectRoot) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the project config. Returns defaults if the file does not exist.
pub fn load_config(root: &ProjectRoot) -> Result<ProjectConfig> {
    let path = config_file_path(root);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(ProjectConfig::default());
    }

    load_config_from(&path)
}

/// Load the project config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocmakeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocmakeError::config(format!("failed to parse {}: {e}", path.display())))
}

const DEFAULT_CONFIG: &str = r#"# docmake project configuration.

[launcher]
# Program and fixed arguments of the documentation builder.
# The project root is appended, followed by any forwarded arguments.
builder = ["uv", "run", "docs-make"]

[submodules]
# Run `git submodule update --init` in the project root before building.
sync = false

[site]
project = "Documentation"
source_dir = "src"
extensions = []
"#;

/// Write a default `docmake.toml` into `dir`. Returns the path to the created file.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DocmakeError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(DocmakeError::config(format!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        )));
    }

    std::fs::write(&path, DEFAULT_CONFIG).map_err(|e| DocmakeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

// ---------------------------------------------------------------------------
// Site validation
// ---------------------------------------------------------------------------

/// Check the `[site]` declaration for mistakes the builder would choke on.
///
/// Referenced data files that do not exist are only noted at debug level;
/// the builder owns them and may generate them.
pub fn validate_site(root: &ProjectRoot, site: &SiteConfig) -> Result<()> {
    if let Some(project) = &site.project {
        if project.trim().is_empty() {
            return Err(DocmakeError::validation("site.project must not be empty"));
        }
    }

    if let Some(id) = &site.document_id {
        if !DOCUMENT_ID_RE.is_match(id) {
            return Err(DocmakeError::validation(format!(
                "site.document_id '{id}' must be 2-8 uppercase letters or digits, starting with a letter"
            )));
        }
    }

    let mut seen = std::collections::HashSet::new();
    for ext in &site.extensions {
        if ext.trim().is_empty() {
            return Err(DocmakeError::validation("site.extensions contains an empty name"));
        }
        if !seen.insert(ext.as_str()) {
            return Err(DocmakeError::validation(format!(
                "site.extensions lists '{ext}' more than once"
            )));
        }
    }

    check_relative("site.source_dir", &site.source_dir)?;
    let source_dir = root.join(&site.source_dir);

    for (field, value) in [
        ("site.substitutions_path", &site.substitutions_path),
        ("site.target_names_path", &site.target_names_path),
    ] {
        let Some(value) = value else { continue };
        check_relative(field, value)?;
        let path = source_dir.join(value);
        if !path.exists() {
            tracing::debug!(field, ?path, "referenced data file does not exist");
        }
    }

    Ok(())
}

fn check_relative(field: &str, value: &str) -> Result<()> {
    let path = Path::new(value);
    if value.is_empty() || path.is_absolute() {
        return Err(DocmakeError::validation(format!(
            "{field} '{value}' must be a non-empty relative path"
        )));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(DocmakeError::validation(format!(
            "{field} '{value}' must not leave the project root"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_in(dir: &Path) -> ProjectRoot {
        ProjectRoot::from_entry(&dir.join("make"), dir).expect("resolve root")
    }

    #[test]
    fn missing_config_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(&root_in(dir.path())).expect("load");
        assert!(!config.submodules.sync);
        assert_eq!(config.submodules.git, "git");
        assert!(config.launcher.builder.is_empty());
        assert_eq!(config.site.source_dir, "src");
    }

    #[test]
    fn config_with_all_sections() {
        let toml_str = r#"
[launcher]
builder = ["uv", "run", "make-docs"]
env = { DOCS_OFFLINE = "1" }

[submodules]
sync = true
recursive = true
paths = ["shared"]

[site]
project = "CriticalUp Documentation"
extensions = ["toctrees", "qualification", "myst_parser"]
substitutions_path = "sphinx-substitutions.toml"
document_id = "CUD"
theme = "ferrocene"
theme_path = ["../shared/themes"]
theme_options = { license = "MIT or Apache 2.0" }

[site.lint]
alphabetical_section_titles = ["glossary"]
no_paragraph_ids = ["index"]
"#;
        let config: ProjectConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.launcher.builder, ["uv", "run", "make-docs"]);
        assert_eq!(config.launcher.env["DOCS_OFFLINE"], "1");
        assert!(config.submodules.sync);
        assert!(config.submodules.recursive);
        assert_eq!(config.submodules.git, "git");
        assert_eq!(config.site.extensions.len(), 3);
        assert_eq!(config.site.theme_options["license"], "MIT or Apache 2.0");
        assert_eq!(config.site.lint.no_paragraph_ids, ["index"]);
    }

    #[test]
    fn malformed_config_names_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[submodules]\nsync = \"yes\"\n")
            .expect("write");
        let err = load_config(&root_in(dir.path())).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn default_config_template_parses() {
        let config: ProjectConfig = toml::from_str(DEFAULT_CONFIG).expect("parse template");
        assert_eq!(config.launcher.builder[0], "uv");
        assert!(!config.submodules.sync);
        assert_eq!(config.site.project.as_deref(), Some("Documentation"));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = init_config(dir.path(), false).expect("init");
        assert!(path.exists());

        let err = init_config(dir.path(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        std::fs::write(&path, "# edited\n").expect("write");
        init_config(dir.path(), true).expect("forced init");
        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.contains("[launcher]"));
    }

    #[test]
    fn launch_options_cli_overrides_config() {
        let mut config = ProjectConfig::default();
        config.submodules.sync = true;

        let opts = LaunchOptions::from(&config);
        assert!(opts.sync_submodules);

        let opts = opts.with_sync_override(Some(false));
        assert!(!opts.sync_submodules);

        let opts = opts
            .with_sync_override(None)
            .with_forwarded_args(vec!["--serve".into()]);
        assert!(!opts.sync_submodules);
        assert_eq!(opts.forwarded_args, ["--serve"]);
    }

    #[test]
    fn demo_project_config_is_valid() {
        let demo = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../demos/handbook");
        let root = root_in(&demo);
        let config = load_config(&root).expect("load demo config");
        assert!(config.submodules.sync);
        assert_eq!(config.site.document_id.as_deref(), Some("HBK"));
        validate_site(&root, &config.site).expect("demo site is valid");
    }

    #[test]
    fn site_validation_rules() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = root_in(dir.path());

        let mut site = SiteConfig {
            project: Some("Docs".into()),
            document_id: Some("CUD".into()),
            extensions: vec!["a".into(), "b".into()],
            substitutions_path: Some("missing.toml".into()),
            ..SiteConfig::default()
        };
        validate_site(&root, &site).expect("valid site");

        site.document_id = Some("cud".into());
        assert!(validate_site(&root, &site).is_err());
        site.document_id = Some("CUD".into());

        site.extensions.push("a".into());
        let err = validate_site(&root, &site).unwrap_err();
        assert!(err.to_string().contains("more than once"));
        site.extensions.pop();

        site.target_names_path = Some("../outside.toml".into());
        let err = validate_site(&root, &site).unwrap_err();
        assert!(err.to_string().contains("must not leave"));
        site.target_names_path = None;

        site.source_dir = "/abs/src".into();
        assert!(validate_site(&root, &site).is_err());
        site.source_dir = "src".into();

        site.project = Some("  ".into());
        assert!(validate_site(&root, &site).is_err());
    }
}

//! Matrix configuration (`blogger-matrix.toml`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::versions::VersionRange;
use crate::io::checker::CleanupPolicy;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "blogger-matrix.toml";

/// Matrix configuration (TOML).
///
/// Every section is optional. Missing fields default to the layout the
/// blogging client's source tree uses: `../src` holds the client and
/// `gdata_installs/<version>/lib/python` holds each library install.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatrixConfig {
    pub tool: ToolConfig,
    pub library: LibraryConfig,
    pub versions: VersionRange,
    pub post: PostConfig,
    pub checkpoint: CheckpointConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    /// Program and leading arguments; `blogger <task> ...` is appended.
    pub command: Vec<String>,
    /// Working directory for every invocation.
    pub workdir: PathBuf,
    /// Kill an invocation after this many seconds. `0` waits forever.
    pub command_timeout_secs: u64,
    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            command: vec!["python".to_string(), "google.py".to_string()],
            workdir: PathBuf::from("../src"),
            command_timeout_secs: 0,
            output_limit_bytes: 100_000,
        }
    }
}

impl ToolConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory holding one install per version.
    pub installs_dir: PathBuf,
    /// Module directory inside each install.
    pub subpath: PathBuf,
    /// Module-search-path variable the client reads.
    pub env_var: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            installs_dir: PathBuf::from("gdata_installs"),
            subpath: PathBuf::from("lib/python"),
            env_var: "PYTHONPATH".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PostConfig {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            title: "example post title".to_string(),
            body: "example post body".to_string(),
            tags: vec!["tag1".to_string(), "tag2".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Noun used in mismatch reports, e.g. "expected 1 blog post(s)".
    pub label: String,
    pub expected_exit_code: i32,
    pub cleanup: CleanupPolicy,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            label: "blog post".to_string(),
            expected_exit_code: 0,
            cleanup: CleanupPolicy::Always,
        }
    }
}

impl MatrixConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tool.command.is_empty() || self.tool.command[0].trim().is_empty() {
            return Err(anyhow!("tool.command must be a non-empty array"));
        }
        if self.tool.output_limit_bytes == 0 {
            return Err(anyhow!("tool.output_limit_bytes must be > 0"));
        }
        if self.library.env_var.trim().is_empty() || self.library.env_var.contains('=') {
            return Err(anyhow!(
                "library.env_var must be a non-empty name without '='"
            ));
        }
        if self.post.title.trim().is_empty() {
            return Err(anyhow!("post.title must be non-empty"));
        }
        if self.checkpoint.label.trim().is_empty() {
            return Err(anyhow!("checkpoint.label must be non-empty"));
        }
        self.versions.validate()?;
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `MatrixConfig::default()`.
pub fn load_config(path: &Path) -> Result<MatrixConfig> {
    if !path.exists() {
        let cfg = MatrixConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<MatrixConfig> {
    let cfg: MatrixConfig = toml::from_str(contents).context("parse config toml")?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, MatrixConfig::default());
        assert_eq!(cfg.versions.len(), 17);
        assert_eq!(cfg.tool.timeout(), None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = parse_config(
            r#"
[tool]
command = ["./google.py"]
command_timeout_secs = 90

[versions]
last = 3

[checkpoint]
cleanup = "on_mismatch"
"#,
        )
        .expect("parse");
        assert_eq!(cfg.tool.command, vec!["./google.py"]);
        assert_eq!(cfg.tool.workdir, PathBuf::from("../src"));
        assert_eq!(cfg.tool.timeout(), Some(Duration::from_secs(90)));
        assert_eq!(cfg.versions.len(), 3);
        assert_eq!(cfg.versions.prefix, "gdata-2.0.");
        assert_eq!(cfg.checkpoint.cleanup, CleanupPolicy::OnMismatch);
        assert_eq!(cfg.library.env_var, "PYTHONPATH");
    }

    #[test]
    fn rejects_empty_tool_command() {
        let err = parse_config("[tool]\ncommand = []\n").expect_err("invalid");
        assert!(err.to_string().contains("tool.command"));
    }

    #[test]
    fn rejects_blank_title() {
        let err = parse_config("[post]\ntitle = \"  \"\n").expect_err("invalid");
        assert!(err.to_string().contains("post.title"));
    }

    #[test]
    fn rejects_env_var_with_equals() {
        let err = parse_config("[library]\nenv_var = \"A=B\"\n").expect_err("invalid");
        assert!(err.to_string().contains("library.env_var"));
    }

    #[test]
    fn rejects_prefix_with_path_separator() {
        let err = parse_config("[versions]\nprefix = \"gdata/2.0.\"\n").expect_err("invalid");
        assert!(err.to_string().contains("versions.prefix"));

        let err = parse_config("[versions]\nprefix = 'gdata\\2.0.'\n").expect_err("invalid");
        assert!(err.to_string().contains("path separators"));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = MatrixConfig::default();
        let encoded = toml::to_string_pretty(&cfg).expect("serialize");
        let decoded = parse_config(&encoded).expect("parse");
        assert_eq!(decoded, cfg);
    }
}

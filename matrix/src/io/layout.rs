//! Per-version environment and working directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::types::VersionIdentifier;
use crate::io::config::MatrixConfig;
use crate::io::invoker::Invocation;

/// Where the client lives and where each library version is installed.
///
/// Relative paths are resolved against the base directory once, so every
/// binding is independent of the child's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub tool_dir: PathBuf,
    pub installs_dir: PathBuf,
    pub library_subpath: PathBuf,
    pub env_var: String,
}

/// Environment applied to every invocation made for one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    pub version: VersionIdentifier,
    pub env_var: String,
    /// Module-search path for `version`. Not checked for existence.
    pub library_path: PathBuf,
    pub workdir: PathBuf,
}

impl Layout {
    pub fn from_config(cfg: &MatrixConfig, base_dir: &Path) -> Self {
        Self {
            tool_dir: resolve(base_dir, &cfg.tool.workdir),
            installs_dir: resolve(base_dir, &cfg.library.installs_dir),
            library_subpath: cfg.library.subpath.clone(),
            env_var: cfg.library.env_var.clone(),
        }
    }

    pub fn library_path(&self, version: &VersionIdentifier) -> PathBuf {
        self.installs_dir
            .join(version.as_str())
            .join(&self.library_subpath)
    }

    pub fn bind(&self, version: &VersionIdentifier) -> EnvBinding {
        EnvBinding {
            version: version.clone(),
            env_var: self.env_var.clone(),
            library_path: self.library_path(version),
            workdir: self.tool_dir.clone(),
        }
    }
}

impl EnvBinding {
    pub fn invocation(&self, args: Vec<String>) -> Invocation {
        let mut env = BTreeMap::new();
        env.insert(
            self.env_var.clone(),
            self.library_path.to_string_lossy().into_owned(),
        );
        Invocation {
            args,
            workdir: self.workdir.clone(),
            env,
        }
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

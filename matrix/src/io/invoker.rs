//! Invocation abstraction for the blogging client.
//!
//! The [`Invoker`] trait decouples the matrix loop from the real client
//! process. Tests use scripted invokers that simulate a blog in memory.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::core::commands::render;
use crate::io::config::ToolConfig;
use crate::io::process::{CommandOutcome, run_command};

/// One client invocation: `blogger ...` arguments plus the environment to run them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub args: Vec<String>,
    pub workdir: PathBuf,
    /// Variables set on top of the inherited environment.
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// Shell-style rendering of the client arguments.
    pub fn display(&self) -> String {
        render(&self.args)
    }

    /// The client subcommand, e.g. `list`.
    pub fn task(&self) -> Option<&str> {
        self.args.get(1).map(String::as_str)
    }

    /// Value following `flag`, if present.
    pub fn flag(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(String::as_str)
    }
}

/// Abstraction over how the client is run.
pub trait Invoker {
    /// Run the invocation to completion. Errors only when it cannot be run at all;
    /// a non-zero exit is reported through [`CommandOutcome`].
    fn invoke(&self, invocation: &Invocation) -> Result<CommandOutcome>;
}

/// Invoker that spawns the configured client command.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    program: Vec<String>,
    timeout: Option<Duration>,
    output_limit_bytes: usize,
}

impl ProcessInvoker {
    pub fn new(
        program: Vec<String>,
        timeout: Option<Duration>,
        output_limit_bytes: usize,
    ) -> Result<Self> {
        if program.is_empty() || program[0].trim().is_empty() {
            bail!("client command must be non-empty");
        }
        Ok(Self {
            program,
            timeout,
            output_limit_bytes,
        })
    }

    pub fn from_config(cfg: &ToolConfig) -> Result<Self> {
        Self::new(cfg.command.clone(), cfg.timeout(), cfg.output_limit_bytes)
    }
}

impl Invoker for ProcessInvoker {
    #[instrument(skip_all, fields(task = ?invocation.task()))]
    fn invoke(&self, invocation: &Invocation) -> Result<CommandOutcome> {
        debug!(command = %invocation.display(), workdir = %invocation.workdir.display(), "invoking client");
        let mut cmd = Command::new(&self.program[0]);
        cmd.args(&self.program[1..])
            .args(&invocation.args)
            .current_dir(&invocation.workdir)
            .envs(&invocation.env);
        run_command(cmd, self.timeout, self.output_limit_bytes).with_context(|| {
            format!(
                "run {} {} in {}",
                self.program.join(" "),
                invocation.display(),
                invocation.workdir.display()
            )
        })
    }
}

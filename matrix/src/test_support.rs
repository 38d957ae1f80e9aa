//! Test-only helpers: a blogging client simulated in memory.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Result;

use crate::core::types::RunConfiguration;
use crate::io::config::PostConfig;
use crate::io::invoker::{Invocation, Invoker};
use crate::io::process::CommandOutcome;

/// Run configuration with the default post title, body and tags.
pub fn run_configuration(username: &str, blog_name: &str) -> RunConfiguration {
    let post = PostConfig::default();
    RunConfiguration {
        username: username.to_string(),
        blog_name: blog_name.to_string(),
        post_title: post.title,
        post_body: post.body,
        tags: post.tags,
    }
}

/// Invoker that keeps posts per blog in memory and records every call.
///
/// `list` prints one line per post whose title matches `--title`, `post` adds
/// one, `delete` removes all matching ones, `tag` always succeeds. Any call
/// whose environment points into a broken version's directory fails with
/// exit code 1, as a client that cannot import its library would.
#[derive(Debug, Default)]
pub struct ScriptedInvoker {
    posts: RefCell<BTreeMap<String, Vec<String>>>,
    calls: RefCell<Vec<Invocation>>,
    broken_versions: BTreeSet<String>,
    failing_auth: bool,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broken_version(mut self, version: &str) -> Self {
        self.broken_versions.insert(version.to_string());
        self
    }

    pub fn with_failing_auth(mut self) -> Self {
        self.failing_auth = true;
        self
    }

    /// Seed a post left behind by an earlier run.
    pub fn with_existing_post(self, blog: &str, title: &str) -> Self {
        self.posts
            .borrow_mut()
            .entry(blog.to_string())
            .or_default()
            .push(title.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Calls rendered as shell-style command lines.
    pub fn rendered_calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Invocation::display).collect()
    }

    pub fn auth_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.args.iter().any(|arg| arg == "--force-auth"))
            .count()
    }

    pub fn posts(&self, blog: &str) -> Vec<String> {
        self.posts
            .borrow()
            .get(blog)
            .cloned()
            .unwrap_or_default()
    }

    fn is_broken(&self, invocation: &Invocation) -> bool {
        invocation.env.values().any(|value| {
            Path::new(value).components().any(|component| {
                self.broken_versions
                    .contains(&*component.as_os_str().to_string_lossy())
            })
        })
    }
}

impl Invoker for ScriptedInvoker {
    fn invoke(&self, invocation: &Invocation) -> Result<CommandOutcome> {
        self.calls.borrow_mut().push(invocation.clone());

        if self.is_broken(invocation) {
            return Ok(CommandOutcome::completed(
                1,
                "",
                "ImportError: No module named gdata",
            ));
        }
        if invocation.args.iter().any(|arg| arg == "--force-auth") {
            let code = if self.failing_auth { 1 } else { 0 };
            return Ok(CommandOutcome::completed(code, "", ""));
        }

        let blog = invocation.flag("--blog").unwrap_or_default().to_string();
        let title = invocation.flag("--title").unwrap_or_default().to_string();
        let mut posts = self.posts.borrow_mut();
        let entries = posts.entry(blog).or_default();
        let outcome = match invocation.task() {
            Some("list") => {
                let stdout: String = entries
                    .iter()
                    .filter(|entry| **entry == title)
                    .map(|entry| format!("{entry}\n"))
                    .collect();
                CommandOutcome::completed(0, stdout, "")
            }
            Some("post") => {
                entries.push(title);
                CommandOutcome::completed(0, "", "")
            }
            Some("delete") => {
                entries.retain(|entry| *entry != title);
                CommandOutcome::completed(0, "", "")
            }
            Some("tag") => CommandOutcome::completed(0, "", ""),
            other => CommandOutcome::completed(2, "", format!("unknown task {other:?}")),
        };
        Ok(outcome)
    }
}

//! Shared value types for a matrix run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything a run needs to address the blog, fixed once arguments are validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    /// Account passed to the forced-auth invocation (`-u`).
    pub username: String,
    /// Blog every invocation targets (`--blog`).
    pub blog_name: String,
    /// Title of the post created, tagged, listed and deleted in each version.
    pub post_title: String,
    pub post_body: String,
    /// Tags applied in order; rendered as a single comma-separated value.
    pub tags: Vec<String>,
}

/// Library version directory name, e.g. `gdata-2.0.7`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionIdentifier(String);

impl VersionIdentifier {
    pub fn new(prefix: &str, number: u32) -> Self {
        Self(format!("{prefix}{number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number of matching posts a checkpoint expects the list command to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedCount(pub u32);

/// Fire-and-forget blog mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Post,
    Tag,
    Delete,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Post => "post",
            Operation::Tag => "tag",
            Operation::Delete => "delete",
        }
    }
}

//! Declarative per-version step table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{ExpectedCount, Operation, VersionIdentifier};

/// One entry of the table replayed against every library version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Step {
    /// Assert the number of posts matching the run's title.
    Checkpoint(ExpectedCount),
    /// Run a mutation without inspecting its result.
    Mutate(Operation),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Checkpoint(expected) => write!(f, "count=={}", expected.0),
            Step::Mutate(operation) => f.write_str(operation.name()),
        }
    }
}

/// count==0, post, count==1, tag, delete, count==0
pub fn default_steps() -> Vec<Step> {
    vec![
        Step::Checkpoint(ExpectedCount(0)),
        Step::Mutate(Operation::Post),
        Step::Checkpoint(ExpectedCount(1)),
        Step::Mutate(Operation::Tag),
        Step::Mutate(Operation::Delete),
        Step::Checkpoint(ExpectedCount(0)),
    ]
}

/// Render the version x step table, one line per version.
pub fn render_plan<I>(versions: I, steps: &[Step]) -> Vec<String>
where
    I: IntoIterator<Item = VersionIdentifier>,
{
    let sequence = steps
        .iter()
        .map(Step::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    versions
        .into_iter()
        .map(|version| format!("{version}: {sequence}"))
        .collect()
}

//! Compatibility-matrix integration test for a command-line blogging client.
//!
//! For every version of the client's data-access library, the matrix points
//! the client at that version through a module-search-path variable, then
//! replays a fixed step table of `blogger` invocations and asserts the number
//! of matching posts at each checkpoint.
//!
//! - **[`core`]**: Pure, deterministic logic (argument validation, version
//!   expansion, auth transitions, the step table, command construction).
//! - **[`io`]**: Side-effecting operations (configuration, process execution,
//!   checkpoint assertions, result capture).
//!
//! [`run`] drives the loop; [`cli`] and [`report`] back the binary's commands.

pub mod cli;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod report;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

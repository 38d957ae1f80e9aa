//! Stable exit codes for `blogger-matrix` commands.

/// Command succeeded; for `run`, every checkpoint of every version passed.
pub const OK: i32 = 0;
/// Missing argument, invalid configuration, or an invocation that could not be spawned.
pub const INVALID: i32 = 1;
/// `run` finished but at least one checkpoint did not match.
pub const MISMATCH: i32 = 2;

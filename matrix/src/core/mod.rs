//! Deterministic, pure logic shared by the matrix runner.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod args;
pub mod auth;
pub mod commands;
pub mod count;
pub mod outcome;
pub mod plan;
pub mod types;
pub mod versions;

//! I/O helpers for matrix commands.

pub mod checker;
pub mod config;
pub mod invoker;
pub mod layout;
pub mod process;
pub mod results;

//! Command-line front end.
//!
//! The binary inspects and validates configurations offline: it resolves
//! layouts against a monitor list, lists hotkey bindings and manages the
//! configuration file.

pub mod commands;
pub mod output;

pub use commands::{Cli, Commands};

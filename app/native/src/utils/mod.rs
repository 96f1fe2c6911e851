//! Small shared helpers.

pub mod thread;

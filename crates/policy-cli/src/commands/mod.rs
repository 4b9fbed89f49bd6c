//! Command implementations for policy-cli

pub mod copy;

pub use copy::{connect, run_copy};

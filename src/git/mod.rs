//! Thin wrappers around the `git` command line: commit selection and
//! `format-patch` materialization.

pub mod command;
pub mod patches;
pub mod range;

pub use command::Git;

//! `patchroll`: export git history as patch-form text archives.
//!
//! Each commit is materialized with `git format-patch`, reduced to a record
//! (from its `Subject:` line to the end), and appended to size-capped
//! `{YYYY-MM-DD}-{part}.txt` files. Single patch files can also be turned
//! into one `{YYYYMMDDhhmmss}_{subject}.txt` file each.

pub mod config;
pub mod error;
pub mod export;
pub mod git;
pub mod model;
pub mod parser;

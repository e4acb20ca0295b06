//! Core data model types: patch messages, records, and commits.

pub mod commit;
pub mod record;

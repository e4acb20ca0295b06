//! Output side: record file names, rolling output files, single-record
//! files, and the end-to-end export.

pub mod archive;
pub mod filename;
pub mod rolling;
pub mod single;

//! Patch parsing: header scanning, date normalization, and record extraction.

pub mod date;
pub mod header;
pub mod patch;

//! Utility modules

pub mod text;

pub use text::{copy_delimited, merge_adjacent, trim_whitespace};

//! Version parsing and bumping.

pub mod bump;

pub use bump::{apply_bump, parse_version, BumpKind};

//! Infrastructure layer: git access and file system stores.

pub mod filesystem;
pub mod git;

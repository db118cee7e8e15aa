//! Shared error type and result alias.

pub mod error;
pub mod result;

pub use error::RepomgrError;
pub use result::RepomgrResult;

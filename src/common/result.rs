use crate::common::error::RepomgrError;

/// Result alias used throughout the crate.
pub type RepomgrResult<T> = Result<T, RepomgrError>;

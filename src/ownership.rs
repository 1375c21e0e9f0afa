//! Ownership guard for mutating operations.
//!
//! This is a coarse guard against deleting somebody else's data by accident:
//! the operator's user name has to appear somewhere in the path. It is not an
//! access control mechanism; the store's own authorization stays in charge.

use crate::errors::{CoreError, Result};

/// Returns true when `owner` appears in `path`. An empty owner owns nothing.
pub fn check_ownership(path: &str, owner: &str) -> bool {
    !owner.is_empty() && path.contains(owner)
}

/// Fails with `PermissionDenied` unless [`check_ownership`] passes.
pub fn require_ownership(path: &str, owner: &str) -> Result<()> {
    if check_ownership(path, owner) {
        tracing::debug!("{owner} tries to modify {path}");
        Ok(())
    } else {
        Err(CoreError::permission_denied(path, owner))
    }
}

use std::fmt;

/// Remote operation an error is attributed to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Operation {
    Ping,
    Stat,
    List,
    DeleteFile,
    RemoveDirectory,
    Move,
    MakeDirectory,
    CopyIn,
    CopyOut,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Stat => "stat",
            Self::List => "dirlist",
            Self::DeleteFile => "rm",
            Self::RemoveDirectory => "rmdir",
            Self::Move => "mv",
            Self::MakeDirectory => "mkdir",
            Self::CopyIn => "copy in",
            Self::CopyOut => "copy out",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse failure taxonomy handed to presentation layers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    InvalidPath,
    NotFound,
    PermissionDenied,
    RemoteFailure,
    Cancelled,
}

/// Shared error type for the traversal engine and every store backend.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// A base or relative path is malformed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The remote path does not exist.
    #[error("{op} failed: {path} does not exist")]
    NotFound { op: Operation, path: String },

    /// The ownership precondition of a mutating operation failed.
    #[error("permission denied: user {owner:?} was not found in {path}")]
    PermissionDenied { path: String, owner: String },

    /// Transport or backend failure, including "directory not empty".
    #[error("{op} failed on {path}: {message}")]
    RemoteFailure {
        op: Operation,
        path: String,
        message: String,
    },

    /// An entry whose flags classify as neither file nor directory.
    #[error("unrecognized entry {path} (flags {flags}), refusing to continue")]
    Unclassifiable { path: String, flags: u32 },

    /// The walk went deeper than the configured limit.
    #[error("maximum traversal depth {limit} exceeded at {path}")]
    DepthExceeded { path: String, limit: usize },

    /// The cancel token fired before the next remote call.
    #[error("cancelled before {op} on {path}")]
    Cancelled { op: Operation, path: String },
}

impl CoreError {
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath(message.into())
    }

    pub fn not_found(op: Operation, path: impl Into<String>) -> Self {
        Self::NotFound {
            op,
            path: path.into(),
        }
    }

    pub fn remote(op: Operation, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteFailure {
            op,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn permission_denied(path: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::PermissionDenied {
            path: path.into(),
            owner: owner.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPath(_) => ErrorKind::InvalidPath,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::RemoteFailure { .. } | Self::Unclassifiable { .. } | Self::DepthExceeded { .. } => {
                ErrorKind::RemoteFailure
            }
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Path the failure was observed on, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::InvalidPath(_) => None,
            Self::NotFound { path, .. }
            | Self::PermissionDenied { path, .. }
            | Self::RemoteFailure { path, .. }
            | Self::Unclassifiable { path, .. }
            | Self::DepthExceeded { path, .. }
            | Self::Cancelled { path, .. } => Some(path),
        }
    }

    /// Promotes a `NotFound` below the walk root into a `RemoteFailure`.
    ///
    /// A descendant vanishing mid-walk means the tree changed under us, which
    /// callers must not confuse with the root itself being absent.
    pub(crate) fn into_descendant_failure(self) -> Self {
        match self {
            Self::NotFound { op, path } => Self::remote(op, path, "vanished during traversal"),
            other => other,
        }
    }
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_collapse_into_remote_failure() {
        let err = CoreError::Unclassifiable {
            path: "/store/a".into(),
            flags: 4,
        };
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        let err = CoreError::DepthExceeded {
            path: "/store/a/".into(),
            limit: 3,
        };
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
    }

    #[test]
    fn descendant_not_found_becomes_remote_failure() {
        let err = CoreError::not_found(Operation::List, "/store/a/b/").into_descendant_failure();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        assert_eq!(err.path(), Some("/store/a/b/"));
    }

    #[test]
    fn messages_name_operation_and_path() {
        let err = CoreError::remote(Operation::RemoveDirectory, "/store/a/", "directory not empty");
        assert_eq!(
            err.to_string(),
            "rmdir failed on /store/a/: directory not empty"
        );
    }
}

//! Error taxonomy.
//!
//! Every failure of the link procedure maps to one `LinkError` variant, and
//! each variant maps to a process exit code so scripts driving `oalink` can
//! tell a usage mistake from a missing file or a failed write.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkError>;

#[derive(Debug, Error)]
pub enum LinkError {
    /// A required argument was absent or empty.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// The technology file destination name is empty or not a bare file name.
    #[error("invalid technology file destination name {0:?}: expected a non-empty file name")]
    InvalidDestination(String),

    /// The cell name is empty or not a bare directory name.
    #[error("invalid cell name {0:?}: expected a single directory name")]
    InvalidCellName(String),

    /// The library path has no usable final segment.
    #[error("cannot derive a library name from {}", .0.display())]
    InvalidLibraryName(PathBuf),

    #[error("{what} does not exist: {}", .path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    /// Environment configuration needed for this run is not set.
    #[error("{0}")]
    Environment(String),

    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LinkError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        LinkError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LinkError::MissingArgument(_)
            | LinkError::InvalidDestination(_)
            | LinkError::InvalidCellName(_)
            | LinkError::InvalidLibraryName(_) => 2,
            LinkError::MissingInput { .. } => 3,
            LinkError::Io { .. } => 4,
            LinkError::Environment(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_category() {
        let missing = LinkError::MissingInput {
            what: "technology file",
            path: PathBuf::from("/tech/subC.tech"),
        };
        let io = LinkError::io(
            "append to",
            "/ws/lib.defs",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );

        assert_eq!(LinkError::MissingArgument("--library").exit_code(), 2);
        assert_eq!(missing.exit_code(), 3);
        assert_eq!(io.exit_code(), 4);
        assert_eq!(LinkError::Environment("HPEESOF_DIR".into()).exit_code(), 5);
    }

    #[test]
    fn messages_name_the_offending_path() {
        let err = LinkError::MissingInput {
            what: "source library",
            path: PathBuf::from("/libs/myrf"),
        };
        assert_eq!(err.to_string(), "source library does not exist: /libs/myrf");
    }
}

use std::path::PathBuf;

use thiserror::Error;

use super::model::SnapshotYear;

/// Failure to produce a snapshot table. Fatal for the session: the
/// dashboard shows the message and renders nothing else.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("{year} snapshot not found at {}", .path.display())]
    Missing { year: SnapshotYear, path: PathBuf },

    #[error("{year} snapshot at {} could not be read: {source}", .path.display())]
    Unreadable {
        year: SnapshotYear,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{year} snapshot at {} is malformed: {reason}", .path.display())]
    Malformed {
        year: SnapshotYear,
        path: PathBuf,
        reason: String,
    },

    #[error("{year} snapshot at {} contains no rows", .path.display())]
    Empty { year: SnapshotYear, path: PathBuf },
}

impl DataSourceError {
    pub fn year(&self) -> SnapshotYear {
        match self {
            DataSourceError::Missing { year, .. }
            | DataSourceError::Unreadable { year, .. }
            | DataSourceError::Malformed { year, .. }
            | DataSourceError::Empty { year, .. } => *year,
        }
    }
}

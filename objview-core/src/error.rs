//! Error types for OBJ scene loading

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for scene loading operations
pub type Result<T> = std::result::Result<T, ObjError>;

/// Which bounded table an insertion or lookup refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Objects,
    Vertices,
    TextureVertices,
    Faces,
    FaceVertices,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Objects => "objects",
            Table::Vertices => "vertices",
            Table::TextureVertices => "texture vertices",
            Table::Faces => "faces",
            Table::FaceVertices => "face vertices",
        };
        f.write_str(name)
    }
}

/// Error types for OBJ parsing and scene construction
#[derive(Error, Debug)]
pub enum ObjError {
    /// The scene file does not exist
    #[error("Scene file not found: {path:?}")]
    FileNotFound { path: PathBuf },

    /// IO error while reading the scene
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum length
    #[error("Line {line}: length {length} exceeds maximum of {max}")]
    LineTooLong { line: usize, length: usize, max: usize },

    /// A record could not be parsed
    #[error("Line {line}: malformed '{record}' record: {reason}")]
    Malformed {
        line: usize,
        record: &'static str,
        reason: String,
    },

    /// An object name exceeded the configured maximum length
    #[error("Line {line}: object name '{name}' exceeds {max} characters")]
    NameTooLong { line: usize, name: String, max: usize },

    /// A bounded table is full
    #[error("Line {line}: too many {table} (capacity {capacity})")]
    CapacityExceeded {
        line: usize,
        table: Table,
        capacity: usize,
    },

    /// A face refers to an entry that does not exist
    #[error("Line {line}: {table} index {index} out of range ({count} defined)")]
    IndexOutOfRange {
        line: usize,
        table: Table,
        index: i64,
        count: usize,
    },
}

impl ObjError {
    /// Line number the error was reported at, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ObjError::FileNotFound { .. } | ObjError::Io(_) => None,
            ObjError::LineTooLong { line, .. }
            | ObjError::Malformed { line, .. }
            | ObjError::NameTooLong { line, .. }
            | ObjError::CapacityExceeded { line, .. }
            | ObjError::IndexOutOfRange { line, .. } => Some(*line),
        }
    }
}

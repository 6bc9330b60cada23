use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ManagedFileError>;

#[derive(Error, Debug)]
pub enum ManagedFileError {
    #[error("No file is bound to this handle")]
    Unbound,
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Not a regular file: {}", .0.display())]
    NotRegularFile(PathBuf),
    #[error("Failed to create {}: {source}", .path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Read error: {0}")]
    Read(#[source] std::io::Error),
    #[error("Write error: {0}")]
    Write(#[source] std::io::Error),
    #[error("Decoding error: {0}")]
    Decode(String),
    #[error("Value is not serializable: {0}")]
    NotSerializable(String),
    #[error("Close error: {0}")]
    Close(#[source] std::io::Error),
    #[error("Read cursor has been terminated")]
    CursorClosed,
}

impl ManagedFileError {
    /// Classify an error raised while decoding from a read stream:
    /// running out of bytes means the data does not match what was asked
    /// for, anything else is a genuine I/O failure.
    pub(crate) fn from_decode_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                Self::Decode("not enough data left to decode value".to_owned())
            }
            std::io::ErrorKind::InvalidData => Self::Decode(err.to_string()),
            _ => Self::Read(err),
        }
    }

    pub fn is_unbound(&self) -> bool {
        matches!(self, Self::Unbound)
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<serde_json::Error> for ManagedFileError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Read(err.into())
        } else {
            Self::Decode(err.to_string())
        }
    }
}

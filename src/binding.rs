use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{ManagedFileError, Result};

/// A path that denoted a regular file at the moment it was bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    path: PathBuf,
    created: bool,
}

impl Binding {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file was created by the bind itself.
    pub fn created(&self) -> bool {
        self.created
    }
}

/// Resolve `path` to a regular file, creating an empty one
/// when it is missing and `create_if_missing` is set.
pub fn bind(
    path: impl AsRef<Path>,
    create_if_missing: bool,
) -> Result<Binding> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(Binding {
            path: path.to_path_buf(),
            created: false,
        }),
        Ok(_) => Err(ManagedFileError::NotRegularFile(path.to_path_buf())),
        Err(err) if err.kind() == ErrorKind::NotFound && create_if_missing => {
            create_empty(path)
        }
        Err(_) => Err(ManagedFileError::NotFound(path.to_path_buf())),
    }
}

fn create_empty(path: &Path) -> Result<Binding> {
    // Appending keeps whatever another process may have created meanwhile.
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| ManagedFileError::CreateFailed {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!("created empty file {}", path.display());

    Ok(Binding {
        path: path.to_path_buf(),
        created: true,
    })
}

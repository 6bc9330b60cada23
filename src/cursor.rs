use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::value::{TypedValue, ValueKind};
use crate::{ManagedFileError, Result};

/// Observable state of the typed read cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Unopened,
    Open,
    Closed,
}

/// Counts the bytes handed out by the inner reader.
struct CountingReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}

enum Stage {
    Unopened,
    Open(CountingReader<BufReader<File>>),
    Closed,
}

/// Sequential decoder over one bound file.
///
/// The cursor keeps its own descriptor and read buffer, so bytes written
/// to the file after it was opened may or may not be observed by later
/// reads, and a truncation is never observed for bytes already buffered.
pub(crate) struct ReadCursor {
    stage: Stage,
}

impl ReadCursor {
    pub fn new() -> Self {
        Self {
            stage: Stage::Unopened,
        }
    }

    pub fn state(&self) -> CursorState {
        match self.stage {
            Stage::Unopened => CursorState::Unopened,
            Stage::Open(_) => CursorState::Open,
            Stage::Closed => CursorState::Closed,
        }
    }

    /// Bytes consumed since the cursor was opened.
    pub fn position(&self) -> Option<u64> {
        match &self.stage {
            Stage::Open(reader) => Some(reader.consumed),
            _ => None,
        }
    }

    /// Open the cursor at the start of `path`. Opening an open cursor
    /// is a no-op; a closed cursor cannot be reopened.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        match self.stage {
            Stage::Open(_) => Ok(()),
            Stage::Closed => Err(ManagedFileError::CursorClosed),
            Stage::Unopened => {
                let file = File::open(path).map_err(ManagedFileError::Read)?;
                self.stage = Stage::Open(CountingReader {
                    inner: BufReader::new(file),
                    consumed: 0,
                });
                log::debug!("read cursor opened on {}", path.display());
                Ok(())
            }
        }
    }

    /// Run `decode` on the cursor's stream, opening it first if needed.
    pub fn read_with<T>(
        &mut self,
        path: &Path,
        decode: impl FnOnce(&mut dyn Read) -> Result<T>,
    ) -> Result<T> {
        self.open(path)?;
        match &mut self.stage {
            Stage::Open(reader) => decode(reader),
            _ => Err(ManagedFileError::CursorClosed),
        }
    }

    pub fn read_value(
        &mut self,
        path: &Path,
        kind: ValueKind,
    ) -> Result<TypedValue> {
        self.read_with(path, |reader| TypedValue::decode(kind, reader))
    }

    /// Release the descriptor. Returns whether the cursor was open.
    pub fn close(&mut self) -> bool {
        let previous = std::mem::replace(&mut self.stage, Stage::Closed);
        matches!(previous, Stage::Open(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    fn encoded(values: &[TypedValue]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|v| v.encode().unwrap())
            .collect()
    }

    #[test]
    fn lifecycle() {
        let dir = TempDir::new("cursor_lifecycle").unwrap();
        let path = dir.path().join("typed.bin");
        fs::write(&path, encoded(&[TypedValue::Int(1), TypedValue::Int(2)]))
            .unwrap();

        let mut cursor = ReadCursor::new();
        assert_eq!(cursor.state(), CursorState::Unopened);
        assert_eq!(cursor.position(), None);

        assert_eq!(
            cursor.read_value(&path, ValueKind::Int).unwrap(),
            TypedValue::Int(1)
        );
        assert_eq!(cursor.state(), CursorState::Open);
        assert_eq!(cursor.position(), Some(4));

        assert!(cursor.close());
        assert!(!cursor.close());
        assert_eq!(cursor.state(), CursorState::Closed);
        assert!(matches!(
            cursor.read_value(&path, ValueKind::Int),
            Err(ManagedFileError::CursorClosed)
        ));
    }

    #[test]
    fn failed_decode_does_not_rewind() {
        let dir = TempDir::new("cursor_no_rewind").unwrap();
        let path = dir.path().join("typed.bin");
        fs::write(&path, [0u8, 0, 0, 9, 1, 2]).unwrap();

        let mut cursor = ReadCursor::new();
        cursor.open(&path).unwrap();
        cursor.read_value(&path, ValueKind::Int).unwrap();

        let err = cursor
            .read_value(&path, ValueKind::Int)
            .unwrap_err();
        assert!(err.is_decode());
        assert_eq!(cursor.position(), Some(6));
    }

    #[test]
    fn open_missing_file_is_read_error() {
        let dir = TempDir::new("cursor_missing").unwrap();
        let mut cursor = ReadCursor::new();

        let err = cursor
            .open(&dir.path().join("missing.bin"))
            .unwrap_err();
        assert!(matches!(err, ManagedFileError::Read(_)));
        assert_eq!(cursor.state(), CursorState::Unopened);
    }
}

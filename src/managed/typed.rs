use std::io::Read;

use super::{ManagedFile, WriteMode};
use crate::cursor::CursorState;
use crate::value::{self, TypedValue, ValueKind};
use crate::{ManagedFileError, Result};

impl ManagedFile {
    /// Decode the next value of `kind` at the read cursor, opening the
    /// cursor first if this is the first typed read of the binding.
    ///
    /// Values written after the cursor was opened may not be seen, and
    /// a truncating write can leave the cursor decoding stale bytes.
    /// Call [`ManagedFile::set_file`] to start over from a fresh cursor.
    pub fn read_value(&self, kind: ValueKind) -> Result<TypedValue> {
        self.read_typed(|reader| TypedValue::decode(kind, reader))
    }

    pub fn read_string(&self) -> Result<String> {
        self.read_typed(|reader| value::decode_string(reader))
    }

    pub fn read_int(&self) -> Result<i32> {
        self.read_typed(|reader| value::decode_int(reader))
    }

    pub fn read_float(&self) -> Result<f32> {
        self.read_typed(|reader| value::decode_float(reader))
    }

    pub fn read_double(&self) -> Result<f64> {
        self.read_typed(|reader| value::decode_double(reader))
    }

    fn read_typed<T>(
        &self,
        decode: impl FnOnce(&mut dyn Read) -> Result<T>,
    ) -> Result<T> {
        self.guarded("typed read", |handle| {
            let path = handle.path()?.to_path_buf();
            handle.cursor.read_with(&path, decode)
        })
    }

    /// Encode `value` through its own stream. An open read cursor is
    /// not affected.
    pub fn write_typed(
        &self,
        value: impl Into<TypedValue>,
        mode: WriteMode,
    ) -> Result<()> {
        let value = value.into();
        self.guarded("typed write", |handle| {
            handle.path()?;
            let bytes = value.encode().map_err(ManagedFileError::Write)?;
            handle.write_bytes(&bytes, mode)
        })
    }

    /// Release the read cursor. Calling it again, or on a handle whose
    /// cursor never opened, does nothing.
    pub fn terminate(&self) {
        let mut handle = self.lock();
        if handle.cursor.close() {
            log::debug!("{}: read cursor terminated", handle.options.label);
        }
    }

    pub fn cursor_state(&self) -> CursorState {
        self.lock().cursor.state()
    }

    /// Bytes consumed by the read cursor, if it is open.
    pub fn cursor_position(&self) -> Option<u64> {
        self.lock().cursor.position()
    }
}

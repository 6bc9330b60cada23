mod copy;
mod object;
mod text;
mod typed;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::binding::{self, Binding};
use crate::cursor::ReadCursor;
use crate::diagnostics::{LogSink, WarningSink};
use crate::options::FileOptions;
use crate::{ManagedFileError, Result};

pub use text::{Terminator, TextWrite};

/// Whether a write keeps the bytes already in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Append,
    Truncate,
}

impl WriteMode {
    fn open_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            WriteMode::Append => options.append(true),
            WriteMode::Truncate => options.write(true).truncate(true),
        };
        options.create(true);
        options
    }
}

/// State protected by the handle's lock.
struct Handle {
    options: FileOptions,
    binding: Option<Binding>,
    cursor: ReadCursor,
    sink: Arc<dyn WarningSink>,
    /// Notices not yet handed to the sink; delivered after unlocking.
    pending: Vec<String>,
}

impl Handle {
    fn path(&self) -> Result<&Path> {
        self.binding
            .as_ref()
            .map(Binding::path)
            .ok_or(ManagedFileError::Unbound)
    }

    fn report(&mut self, message: &str) {
        if self.options.allow_diagnostics {
            self.pending
                .push(format!("{}: {}", self.options.label, message));
        }
    }

    /// Drop the current binding, then bind `path` with a fresh cursor.
    fn rebind(&mut self, path: &Path, create_if_missing: bool) -> Result<()> {
        if self.cursor.close() {
            log::debug!(
                "{}: read cursor released before rebinding",
                self.options.label
            );
        }
        self.binding = None;
        self.cursor = ReadCursor::new();

        let binding = binding::bind(path, create_if_missing)?;
        log::debug!(
            "{}: bound to {} (created: {})",
            self.options.label,
            binding.path().display(),
            binding.created()
        );
        self.binding = Some(binding);

        if self.options.eager_cursor {
            let path = self.path()?.to_path_buf();
            if let Err(err) = self.cursor.open(&path) {
                self.report(&format!("could not open read cursor: {}", err));
            }
        }
        Ok(())
    }

    /// Write `bytes` through a stream scoped to this call.
    fn write_bytes(&mut self, bytes: &[u8], mode: WriteMode) -> Result<()> {
        let path = self.path()?.to_path_buf();
        let mut file = mode
            .open_options()
            .open(&path)
            .map_err(ManagedFileError::Write)?;
        file.write_all(bytes)
            .map_err(ManagedFileError::Write)?;
        file.flush().map_err(ManagedFileError::Write)?;

        if self.options.sync_on_close {
            if let Err(err) = file.sync_all() {
                self.report(&ManagedFileError::Close(err).to_string());
            }
        }

        log::info!(
            "{}: {} bytes written to {} ({:?})",
            self.options.label,
            bytes.len(),
            path.display(),
            mode
        );
        Ok(())
    }
}

/// A thread-safe handle on one file, readable and writable as text,
/// as a sequence of typed values or as serialized objects.
///
/// Every operation holds the handle's lock from opening its stream until
/// closing it, so calls made through the same handle never interleave.
/// Nothing protects a sequence of calls as a whole, nor other handles and
/// processes using the same path.
pub struct ManagedFile {
    handle: Mutex<Handle>,
}

impl ManagedFile {
    /// Bind `path`, reporting failures through the `log` facade.
    /// A failed bind yields an unbound handle.
    pub fn new(path: impl AsRef<Path>, options: FileOptions) -> Self {
        Self::new_with_sink(path, options, Arc::new(LogSink))
    }

    pub fn new_with_sink(
        path: impl AsRef<Path>,
        options: FileOptions,
        sink: Arc<dyn WarningSink>,
    ) -> Self {
        let file = Self::detached(options, sink);
        let create = file.lock().options.create_if_missing;
        // The failure has been reported, the handle just stays unbound.
        let _ = file.set_file(path, create);
        file
    }

    /// Bind `path`, returning the bind error instead of an unbound handle.
    pub fn open(path: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
        Self::open_with_sink(path, options, Arc::new(LogSink))
    }

    pub fn open_with_sink(
        path: impl AsRef<Path>,
        options: FileOptions,
        sink: Arc<dyn WarningSink>,
    ) -> Result<Self> {
        let file = Self::detached(options, sink);
        let create = file.lock().options.create_if_missing;
        file.set_file(path, create)?;
        Ok(file)
    }

    /// A handle with no file; every I/O operation fails with `Unbound`
    /// until [`ManagedFile::set_file`] succeeds.
    pub fn unbound(options: FileOptions) -> Self {
        Self::unbound_with_sink(options, Arc::new(LogSink))
    }

    pub fn unbound_with_sink(
        options: FileOptions,
        sink: Arc<dyn WarningSink>,
    ) -> Self {
        let file = Self::detached(options, sink);
        let mut handle = file.lock();
        handle.report("no file has been bound to this handle");
        Self::deliver(handle);
        file
    }

    fn detached(options: FileOptions, sink: Arc<dyn WarningSink>) -> Self {
        Self {
            handle: Mutex::new(Handle {
                options,
                binding: None,
                cursor: ReadCursor::new(),
                sink,
                pending: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Handle> {
        // Operations leave the handle consistent even when they fail,
        // so a panic elsewhere does not make it unusable.
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the lock, then hand the queued notices to the sink, so a
    /// sink is free to call back into this handle.
    fn deliver(mut handle: MutexGuard<'_, Handle>) {
        let notices = std::mem::take(&mut handle.pending);
        let sink = Arc::clone(&handle.sink);
        drop(handle);
        for notice in notices {
            sink.report(&notice);
        }
    }

    /// Run `operation` under the lock, reporting its failure.
    fn guarded<T>(
        &self,
        name: &str,
        operation: impl FnOnce(&mut Handle) -> Result<T>,
    ) -> Result<T> {
        let mut handle = self.lock();
        let result = operation(&mut *handle);
        if let Err(err) = &result {
            handle.report(&format!("{} failed: {}", name, err));
        }
        Self::deliver(handle);
        result
    }

    /// Rebind the handle to `path`. Any open read cursor is released
    /// first; on failure the handle is left unbound.
    pub fn set_file(
        &self,
        path: impl AsRef<Path>,
        create_if_missing: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        self.guarded("bind", |handle| handle.rebind(path, create_if_missing))
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.lock()
            .binding
            .as_ref()
            .map(|binding| binding.path().to_path_buf())
    }

    pub fn is_bound(&self) -> bool {
        self.lock().binding.is_some()
    }

    pub fn options(&self) -> FileOptions {
        self.lock().options.clone()
    }

    pub fn set_diagnostics(&self, allow: bool) {
        self.lock().options.allow_diagnostics = allow;
    }

    pub fn set_sink(&self, sink: Arc<dyn WarningSink>) {
        self.lock().sink = sink;
    }
}

impl Drop for ManagedFile {
    fn drop(&mut self) {
        let handle = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if handle.cursor.close() {
            log::debug!(
                "{}: read cursor was not terminated, released on drop",
                handle.options.label
            );
        }
    }
}

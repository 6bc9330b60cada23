use serde::{Deserialize, Serialize};

pub const DEFAULT_LABEL: &str = "managed-file";

/// Configuration of a [`ManagedFile`](crate::ManagedFile) handle.
///
/// Every field has a default, so a partial JSON document is enough to
/// deserialize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    /// Label for logging
    pub label: String,
    /// Create an empty file when the bound path does not exist
    pub create_if_missing: bool,
    /// Report failures through the handle's warning sink
    pub allow_diagnostics: bool,
    /// Open the typed read cursor as soon as the file is bound,
    /// instead of on the first typed read
    pub eager_cursor: bool,
    /// Flush written data to the device before closing each write stream
    pub sync_on_close: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_owned(),
            create_if_missing: false,
            allow_diagnostics: true,
            eager_cursor: true,
            sync_on_close: false,
        }
    }
}

impl FileOptions {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn with_diagnostics(mut self, allow: bool) -> Self {
        self.allow_diagnostics = allow;
        self
    }

    pub fn with_eager_cursor(mut self, eager: bool) -> Self {
        self.eager_cursor = eager;
        self
    }

    pub fn with_sync_on_close(mut self, sync: bool) -> Self {
        self.sync_on_close = sync;
        self
    }
}

use super::{ManagedFile, TextWrite};
use crate::Result;

impl ManagedFile {
    /// Replace the contents of `target` with the text of this file.
    ///
    /// The two handles are locked one after the other. When the read
    /// fails, `target` is left untouched.
    pub fn copy_into(&self, target: &ManagedFile) -> Result<()> {
        let text = self.read_all()?;
        target.write(&text, TextWrite::truncate().without_terminator())
    }

    /// Replace the contents of this file with the text of `source`.
    pub fn copy_from(&self, source: &ManagedFile) -> Result<()> {
        source.copy_into(self)
    }
}

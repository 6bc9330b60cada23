use std::fs;

use super::{ManagedFile, WriteMode};
use crate::{ManagedFileError, Result};

pub const LINE_TERMINATOR: &str = "\n";

/// Whether a text write ends with a line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminator {
    #[default]
    Newline,
    None,
}

/// Per-call policy of a text write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextWrite {
    pub mode: WriteMode,
    pub terminator: Terminator,
}

impl TextWrite {
    /// Append a line: the policy of [`ManagedFile::write_line`].
    pub fn line() -> Self {
        Self::default()
    }

    pub fn truncate() -> Self {
        Self {
            mode: WriteMode::Truncate,
            terminator: Terminator::Newline,
        }
    }

    pub fn without_terminator(mut self) -> Self {
        self.terminator = Terminator::None;
        self
    }
}

impl ManagedFile {
    /// Read the whole file as text, every line followed by `\n`.
    pub fn read_all(&self) -> Result<String> {
        self.guarded("text read", |handle| {
            let mut text = String::new();
            for line in read_lines(handle.path()?)? {
                text.push_str(&line);
                text.push_str(LINE_TERMINATOR);
            }
            Ok(text)
        })
    }

    /// Read the whole file as text, split into lines.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        self.guarded("text read", |handle| read_lines(handle.path()?))
    }

    pub fn write(&self, text: &str, policy: TextWrite) -> Result<()> {
        self.guarded("text write", |handle| {
            let mut buf = String::with_capacity(text.len() + 1);
            buf.push_str(text);
            if policy.terminator == Terminator::Newline {
                buf.push_str(LINE_TERMINATOR);
            }
            handle.write_bytes(buf.as_bytes(), policy.mode)
        })
    }

    pub fn write_line(&self, text: &str) -> Result<()> {
        self.write(text, TextWrite::line())
    }

    /// Discard the file contents.
    pub fn clear(&self) -> Result<()> {
        self.write("", TextWrite::truncate().without_terminator())
    }
}

fn read_lines(path: &std::path::Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(ManagedFileError::Read)?;
    Ok(split_lines(&String::from_utf8_lossy(&bytes)))
}

/// Split on `\n`, `\r\n` or a lone `\r`. A trailing line without
/// terminator is kept, an empty one is not.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => lines.push(std::mem::take(&mut current)),
            '\r' => {
                chars.next_if_eq(&'\n');
                lines.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

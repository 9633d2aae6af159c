//! Line-oriented text buffer
//!
//! `TextDocument` holds a file as an ordered list of lines and supports one
//! mutation, `replace`, which swaps a contiguous range of lines for any
//! number of new ones. Every rewrite of the Podfile goes through it.
//!
//! Lines are split on `\n` only, so `to_string` reproduces the original
//! bytes exactly: a trailing newline becomes a final empty line and `\r`
//! characters stay attached to their line. Lines spliced into a document
//! whose first line ends in `\r\n` are given the same ending.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// An ordered, mutable sequence of text lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    lines: Vec<String>,
}

impl TextDocument {
    /// Split `content` into lines.
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    /// Read a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Write the whole document back to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the document's lines end in `\r\n`, judged by its first line.
    pub fn uses_crlf(&self) -> bool {
        self.lines.len() > 1 && self.lines[0].ends_with('\r')
    }

    /// Replace `count` lines starting at `start` with `new_lines`.
    ///
    /// `start == len()` with `count == 0` appends. Any range reaching past
    /// the end of the document is rejected and leaves the document as it
    /// was.
    pub fn replace<I, S>(&mut self, start: usize, count: usize, new_lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let len = self.lines.len();
        let end = start.checked_add(count).filter(|end| *end <= len);
        let Some(end) = end else {
            return Err(Error::Splice { start, count, len });
        };

        let crlf = self.uses_crlf();
        self.lines
            .splice(start..end, new_lines.into_iter().map(Into::into));

        if crlf {
            let added = self.lines.len() + count - len;
            // Appending turns the old last line into a terminated one.
            let first = if start == len { start.saturating_sub(1) } else { start };
            let upper = (start + added).min(self.lines.len().saturating_sub(1));
            for line in self.lines.iter_mut().take(upper).skip(first) {
                if !line.ends_with('\r') {
                    line.push('\r');
                }
            }
        }
        Ok(())
    }

    /// Insert `new_lines` before line `index`.
    pub fn insert<I, S>(&mut self, index: usize, new_lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace(index, 0, new_lines)
    }
}

impl fmt::Display for TextDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

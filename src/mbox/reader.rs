use std::{borrow::Cow, fs, ops::Range, path::Path};

use super::{MboxError, is_quoted_separator, is_separator};

/// An archive read into memory, with the byte ranges of its messages.
///
/// Messages are unquoted only when handed out, so the archive is held once.
#[derive(Debug, PartialEq, Eq)]
pub struct Mbox {
    content: Vec<u8>,
    messages: Vec<Range<usize>>,
}

impl Mbox {
    pub fn open(path: &Path) -> Result<Self, MboxError> {
        let content = fs::read(path).map_err(|source| MboxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(content).map_err(|line| MboxError::MissingSeparator {
            path: path.to_path_buf(),
            line,
        })
    }

    /// Splits `content` into messages, failing with the line number of the first line that
    /// belongs to no message.
    fn parse(content: Vec<u8>) -> Result<Self, usize> {
        let mut messages = Vec::new();
        let mut start = None;
        let mut offset = 0;
        for (number, line) in content.split_inclusive(|b| *b == b'\n').enumerate() {
            if is_separator(line) {
                if let Some(start) = start {
                    messages.push(trim(&content, start..offset));
                }
                start = Some(offset + line.len());
            } else if start.is_none() && !line.trim_ascii().is_empty() {
                return Err(number + 1);
            }
            offset += line.len();
        }
        if let Some(start) = start {
            messages.push(trim(&content, start..offset));
        }
        Ok(Self { content, messages })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The messages in archive order. Only messages with quoted `From ` lines are copied.
    pub fn messages(&self) -> impl Iterator<Item = Cow<'_, [u8]>> {
        self.messages
            .iter()
            .map(|range| unquote(&self.content[range.clone()]))
    }
}

/// Drops the blank line that separates a message from the next `From ` line.
fn trim(content: &[u8], mut message: Range<usize>) -> Range<usize> {
    if content[message.clone()].ends_with(b"\n") {
        message.end -= 1;
    }
    message
}

fn unquote(message: &[u8]) -> Cow<'_, [u8]> {
    let lines = || message.split_inclusive(|b| *b == b'\n');
    if !lines().any(is_quoted_separator) {
        return Cow::Borrowed(message);
    }
    let mut unquoted = Vec::with_capacity(message.len());
    for line in lines() {
        if is_quoted_separator(line) {
            unquoted.extend_from_slice(&line[1..]);
        } else {
            unquoted.extend_from_slice(line);
        }
    }
    Cow::Owned(unquoted)
}

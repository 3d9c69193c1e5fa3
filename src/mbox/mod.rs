//! Single file mail archives in the mboxrd flavour.
//!
//! Every message starts with a `From ` separator line. Body lines that would be mistaken for a
//! separator, including already quoted ones (`>From `, `>>From `, ...), get one more `>` when
//! written and lose it again when read, so archived messages come back byte for byte.

mod reader;
mod writer;

use std::{io, path::PathBuf};

use thiserror::Error;

pub use reader::Mbox;
pub use writer::MboxWriter;

#[derive(Debug, Error)]
pub enum MboxError {
    #[error("cannot access archive {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archive {} does not start with a From line (line {line})", path.display())]
    MissingSeparator { path: PathBuf, line: usize },
}

fn is_separator(line: &[u8]) -> bool {
    line.starts_with(b"From ")
}

/// Whether `line` is `From ` preceded by any number of `>`.
fn is_quoted_separator(line: &[u8]) -> bool {
    let quotes = line.iter().take_while(|b| **b == b'>').count();
    quotes > 0 && is_separator(&line[quotes..])
}

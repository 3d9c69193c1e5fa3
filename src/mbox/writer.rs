use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use log::{debug, trace};

use super::{MboxError, is_quoted_separator, is_separator};

/// Appends messages to an archive file, creating it if necessary.
///
/// Messages are buffered; only [`MboxWriter::close`] guarantees that they reached the disk.
#[derive(Debug)]
pub struct MboxWriter {
    path: PathBuf,
    file: BufWriter<File>,
    written: usize,
}

impl MboxWriter {
    pub fn open(path: &Path) -> Result<Self, MboxError> {
        debug!("opening archive {}", path.display());
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| MboxError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn append(&mut self, message: &[u8]) -> Result<(), MboxError> {
        self.write_message(message).map_err(|source| MboxError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.written += 1;
        trace!("appended message {} to {}", self.written, self.path.display());
        Ok(())
    }

    fn write_message(&mut self, message: &[u8]) -> std::io::Result<()> {
        let now = jiff::Timestamp::now().strftime("%a %b %e %H:%M:%S %Y");
        writeln!(self.file, "From MAILER-DAEMON {now}")?;
        for line in message.split_inclusive(|b| *b == b'\n') {
            if is_separator(line) || is_quoted_separator(line) {
                self.file.write_all(b">")?;
            }
            self.file.write_all(line)?;
        }
        if !message.ends_with(b"\n") {
            self.file.write_all(b"\n")?;
        }
        self.file.write_all(b"\n")
    }

    pub fn close(self) -> Result<(), MboxError> {
        let path = self.path;
        let file = self
            .file
            .into_inner()
            .map_err(|e| MboxError::Io {
                path: path.clone(),
                source: e.into_error(),
            })?;
        file.sync_all().map_err(|source| MboxError::Io { path, source })
    }
}

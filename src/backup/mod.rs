mod compress;
mod fetch;
mod layout;

use std::{fs, io, path::PathBuf};

use log::{debug, info};
use mail_parser::MessageParser;
use thiserror::Error;

pub use compress::CompressError;
pub use compress::compress_directory;
pub use fetch::fetch_with_retry;
pub use layout::BackupLayout;
pub use layout::default_archive;

use crate::{
    imap::{SendCommand, SeqNum, Session, SessionError},
    mbox::{MboxError, MboxWriter},
    report::{Skipped, record},
    retry::RetryPolicy,
};

#[derive(Debug, Error)]
pub enum BackupError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("cannot decode message {id}")]
    Decode { id: SeqNum },
    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Archive(#[from] MboxError),
    #[error("cannot compress backup")]
    Compress(#[from] CompressError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMail {
    pub id: SeqNum,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct BackupReport {
    pub saved: Vec<SavedMail>,
    pub skipped: Vec<Skipped>,
}

/// Copies every message of one mailbox into single files, an mbox archive and a zip file.
pub struct Backup<'a> {
    mailbox: &'a str,
    layout: &'a BackupLayout,
    retry: RetryPolicy,
}

impl<'a> Backup<'a> {
    pub fn new(mailbox: &'a str, layout: &'a BackupLayout, retry: RetryPolicy) -> Self {
        Self {
            mailbox,
            layout,
            retry,
        }
    }

    /// Runs the backup and logs out afterwards, whether the backup succeeded or not.
    pub async fn run_and_logout<T: SendCommand>(
        &self,
        mut session: Session<T>,
    ) -> Result<BackupReport, BackupError> {
        let outcome = self.run(&mut session).await;
        session.finish(outcome).await
    }

    pub async fn run<T: SendCommand>(
        &self,
        session: &mut Session<T>,
    ) -> Result<BackupReport, BackupError> {
        let mailbox = session.select(self.mailbox).await?;
        debug!(
            "{} reports {} messages, {} recent, uid validity {:?}, flags {:?}",
            mailbox.name(),
            mailbox.exists(),
            mailbox.recent(),
            mailbox.uid_validity(),
            mailbox.flags()
        );
        let ids = session.search_all().await?;
        info!("Total emails to back up: {}", ids.len());

        let directory = self.layout.directory();
        self.layout
            .create_directory()
            .map_err(|source| BackupError::Write {
                path: directory.clone(),
                source,
            })?;
        let mut archive = MboxWriter::open(self.layout.archive())?;

        let mut report = BackupReport::default();
        for (position, id) in ids.into_iter().enumerate() {
            let index = position + 1;
            let raw = match fetch_with_retry(session, id, &self.retry).await {
                Ok(raw) => raw,
                Err(reason) => {
                    record(
                        &mut report.skipped,
                        Skipped {
                            position: index,
                            id: Some(id),
                            reason,
                        },
                    );
                    continue;
                }
            };

            let saved = SavedMail {
                id,
                path: self.save(index, id, &raw)?,
            };
            info!("Saved: {}", saved.path.display());
            archive.append(&raw)?;
            debug!("archived message {} in {}", saved.id, archive.path().display());
            report.saved.push(saved);
        }
        debug!("{} messages appended to archive", archive.written());
        archive.close()?;

        let packed = compress_directory(directory, self.layout.zip())?;
        info!(
            "{packed} emails have been compressed into {}",
            self.layout.zip().display()
        );
        info!(
            "backup finished: {} saved, {} skipped, archive at {}",
            report.saved.len(),
            report.skipped.len(),
            self.layout.archive().display()
        );
        Ok(report)
    }

    fn save(&self, index: usize, id: SeqNum, raw: &[u8]) -> Result<PathBuf, BackupError> {
        let message = MessageParser::default()
            .parse(raw)
            .ok_or(BackupError::Decode { id })?;
        let path = self.layout.mail_path(index, message.subject());
        fs::write(&path, raw).map_err(|source| BackupError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

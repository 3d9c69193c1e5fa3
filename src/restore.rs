use std::path::Path;

use log::{error, info, warn};

use crate::{
    imap::{SendCommand, Session},
    mbox::{Mbox, MboxError},
    report::{SkipReason, Skipped, record},
};

#[derive(Debug, Default)]
pub struct RestoreReport {
    pub total: usize,
    pub uploaded: usize,
    pub skipped: Vec<Skipped>,
    /// Whether the target mailbox could be selected at all.
    pub selected: bool,
}

/// Uploads every message of an mbox archive into one mailbox.
pub struct Restore<'a> {
    mailbox: &'a str,
    archive: &'a Path,
}

impl<'a> Restore<'a> {
    pub fn new(mailbox: &'a str, archive: &'a Path) -> Self {
        Self { mailbox, archive }
    }

    /// Runs the restore and logs out afterwards, whether the restore succeeded or not.
    pub async fn run_and_logout<T: SendCommand>(
        &self,
        mut session: Session<T>,
    ) -> Result<RestoreReport, MboxError> {
        let outcome = self.run(&mut session).await;
        session.finish(outcome).await
    }

    pub async fn run<T: SendCommand>(
        &self,
        session: &mut Session<T>,
    ) -> Result<RestoreReport, MboxError> {
        let archive = Mbox::open(self.archive)?;
        let mut report = RestoreReport {
            total: archive.len(),
            ..RestoreReport::default()
        };
        info!("Total emails to restore: {}", report.total);
        if archive.is_empty() {
            warn!("{} contains no messages", self.archive.display());
        }

        match session.select(self.mailbox).await {
            Ok(mailbox) if mailbox.readonly() => {
                warn!("{} is read-only, uploads will likely fail", mailbox.name());
            }
            Ok(_) => {}
            Err(e) => {
                error!("cannot select {}: {e}", self.mailbox);
                return Ok(report);
            }
        }
        report.selected = true;

        for (position, message) in archive.messages().enumerate() {
            let index = position + 1;
            info!("Uploading email {index}/{}", report.total);
            match session.append(self.mailbox, &message).await {
                Ok(()) => {
                    info!("Uploaded email {index}");
                    report.uploaded += 1;
                }
                Err(e) => record(
                    &mut report.skipped,
                    Skipped {
                        position: index,
                        id: None,
                        reason: SkipReason::AppendFailed {
                            error: e.to_string(),
                        },
                    },
                ),
            }
        }
        info!(
            "restore finished: {} of {} uploaded, {} skipped",
            report.uploaded,
            report.total,
            report.skipped.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroU32, path::PathBuf, time::Duration};

    use assertables::*;
    use rstest::*;
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::{
        backup::{Backup, BackupLayout},
        imap::mock_connection::{logged_in_session, responses},
        logging::captured_log,
        mbox::MboxWriter,
        retry::{Backoff, RetryPolicy},
    };

    const MESSAGES: [&[u8]; 3] = [
        b"Subject: one\r\n\r\nFrom the start\r\n",
        b"Subject: two\r\n\r\n>From quoted\r\n",
        b"Subject: three\r\n\r\n3\r\n",
    ];

    struct TestArchive {
        _dir: TempDir,
        path: PathBuf,
    }

    #[fixture]
    fn archive() -> TestArchive {
        let dir = assert_ok!(tempdir());
        let path = dir.path().join("user_example_com_INBOX.mbox");
        let mut writer = assert_ok!(MboxWriter::open(&path));
        for message in MESSAGES {
            assert_ok!(writer.append(message));
        }
        assert_ok!(writer.close());
        TestArchive { _dir: dir, path }
    }

    #[rstest]
    #[tokio::test]
    async fn test_restore_uploads_in_archive_order(archive: TestArchive) {
        let (session, sent) = logged_in_session([
            Ok(responses::select_ok(0)),
            Ok(responses::ok()),
            Ok(responses::ok()),
            Ok(responses::ok()),
            Ok(responses::logout()),
        ])
        .await;

        let report = assert_ok!(
            Restore::new("INBOX", &archive.path)
                .run_and_logout(session)
                .await
        );

        assert!(report.selected);
        assert_eq!(report.total, 3);
        assert_eq!(report.uploaded, 3);
        assert!(report.skipped.is_empty());
        let sent = sent.borrow();
        assert_eq!(sent.literals, MESSAGES.map(<[u8]>::to_vec));
        assert_eq!(sent.count("APPEND \"INBOX\""), 3);
        assert_eq!(sent.count("LOGOUT"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_failed_append_is_skipped(archive: TestArchive) {
        captured_log::capture();
        let (mut session, sent) = logged_in_session([
            Ok(responses::select_ok(0)),
            Ok(responses::ok()),
            Ok(responses::no("quota exceeded")),
            Ok(responses::ok()),
        ])
        .await;

        let report = assert_ok!(Restore::new("INBOX", &archive.path).run(&mut session).await);

        assert_eq!(report.uploaded, 2);
        assert_eq!(report.skipped.len(), 1);
        let skipped = &report.skipped[0];
        assert_eq!(skipped.position, 2);
        assert_eq!(skipped.id, None);
        assert!(matches!(skipped.reason, SkipReason::AppendFailed { .. }));
        assert_eq!(sent.borrow().count("APPEND"), 3);
        assert_eq!(captured_log::warnings_containing("skipped"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_failed_select_returns_early_and_logs_out(archive: TestArchive) {
        let (session, sent) = logged_in_session([
            Ok(responses::no("no such mailbox")),
            Ok(responses::logout()),
        ])
        .await;

        let report = assert_ok!(
            Restore::new("INBOX", &archive.path)
                .run_and_logout(session)
                .await
        );

        assert!(!report.selected);
        assert_eq!(report.total, 3);
        assert_eq!(report.uploaded, 0);
        assert_eq!(sent.borrow().count("APPEND"), 0);
        assert_eq!(sent.borrow().count("LOGOUT"), 1);
    }

    #[tokio::test]
    async fn test_missing_archive_is_error_and_still_logs_out() {
        let dir = assert_ok!(tempdir());
        let (session, sent) = logged_in_session([Ok(responses::logout())]).await;

        let result = Restore::new("INBOX", &dir.path().join("missing.mbox"))
            .run_and_logout(session)
            .await;

        assert!(matches!(result, Err(MboxError::Io { .. })));
        assert_eq!(sent.borrow().count("SELECT"), 0);
        assert_eq!(sent.borrow().count("LOGOUT"), 1);
    }

    #[tokio::test]
    async fn test_backup_then_restore_uploads_same_messages() {
        let dir = assert_ok!(tempdir());
        let layout = BackupLayout::new(dir.path(), "user@example.com");
        let retry = RetryPolicy::new(
            assert_some!(NonZeroU32::new(1)),
            Duration::ZERO,
            Backoff::Fixed,
        );
        let (session, _) = logged_in_session([
            Ok(responses::select_ok(3)),
            Ok(responses::search(&[2, 3, 1])),
            Ok(responses::fetch(2, MESSAGES[1])),
            Ok(responses::fetch(3, MESSAGES[2])),
            Ok(responses::fetch(1, MESSAGES[0])),
            Ok(responses::logout()),
        ])
        .await;
        assert_ok!(
            Backup::new("INBOX", &layout, retry)
                .run_and_logout(session)
                .await
        );

        let (session, sent) = logged_in_session([
            Ok(responses::select_ok(0)),
            Ok(responses::ok()),
            Ok(responses::ok()),
            Ok(responses::ok()),
            Ok(responses::logout()),
        ])
        .await;
        let report = assert_ok!(
            Restore::new("INBOX", layout.archive())
                .run_and_logout(session)
                .await
        );

        assert_eq!(report.uploaded, 3);
        let mut uploaded = sent.borrow().literals.clone();
        uploaded.sort();
        let mut original = MESSAGES.map(<[u8]>::to_vec).to_vec();
        original.sort();
        assert_eq!(uploaded, original);
    }
}

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use derive_getters::Getters;

/// Longest subject prefix that ends up in a file name, in characters.
pub const SUBJECT_LIMIT: usize = 50;
const NO_SUBJECT: &str = "No_Subject";

/// Where a backup of one account is written.
#[derive(Debug, Getters, Clone, PartialEq, Eq)]
pub struct BackupLayout {
    directory: PathBuf,
    archive: PathBuf,
    zip: PathBuf,
}

impl BackupLayout {
    pub fn new(output_dir: &Path, account: &str) -> Self {
        let account = sanitize_account(account);
        Self {
            directory: output_dir.join(format!("backup_{account}")),
            archive: archive_path(output_dir, &account),
            zip: output_dir.join(format!("{account}_backup.zip")),
        }
    }

    pub fn create_directory(&self) -> io::Result<()> {
        fs::create_dir_all(&self.directory)
    }

    pub fn mail_path(&self, index: usize, subject: Option<&str>) -> PathBuf {
        self.directory.join(mail_filename(index, subject))
    }
}

/// Default archive location for `account`, used by both backup and restore.
pub fn default_archive(output_dir: &Path, account: &str) -> PathBuf {
    archive_path(output_dir, &sanitize_account(account))
}

fn archive_path(output_dir: &Path, sanitized_account: &str) -> PathBuf {
    output_dir.join(format!("{sanitized_account}_INBOX.mbox"))
}

pub fn sanitize_account(account: &str) -> String {
    account.replace(['@', '.'], "_")
}

/// `email_<index>_<subject>.eml`, where the subject keeps alphanumeric characters only.
///
/// The index makes names unique within one backup, however similar the subjects are.
pub fn mail_filename(index: usize, subject: Option<&str>) -> String {
    let subject: String = match subject {
        Some(subject) if !subject.is_empty() => subject
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .take(SUBJECT_LIMIT)
            .collect(),
        _ => NO_SUBJECT.to_string(),
    };
    format!("email_{index}_{subject}.eml")
}

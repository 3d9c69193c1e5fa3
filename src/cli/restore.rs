use std::path::PathBuf;

use anyhow::{Context as _, Result};
use log::warn;

use crate::{
    config::{Config, Credentials},
    restore::Restore,
};

/// Uploads `archive`, or the configured or backed up archive, into the configured mailbox.
pub fn restore(
    config: &Config,
    credentials: &Credentials,
    archive: Option<PathBuf>,
) -> Result<()> {
    let archive = archive.unwrap_or_else(|| config.archive_for(credentials.user()));
    super::runtime()?.block_on(async {
        let session = super::login(config, credentials).await?;
        let report = Restore::new(config.mailbox(), &archive)
            .run_and_logout(session)
            .await
            .with_context(|| format!("cannot restore from {}", archive.display()))?;
        if !report.selected {
            warn!("nothing restored into {}", config.mailbox());
        }
        Ok(())
    })
}

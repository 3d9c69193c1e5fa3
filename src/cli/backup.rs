use anyhow::{Context as _, Result};

use crate::{
    backup::{Backup, BackupLayout},
    config::{Config, Credentials},
};

pub fn backup(config: &Config, credentials: &Credentials) -> Result<()> {
    let layout = BackupLayout::new(config.output_dir(), credentials.user());
    super::runtime()?.block_on(async {
        let session = super::login(config, credentials).await?;
        Backup::new(config.mailbox(), &layout, config.retry())
            .run_and_logout(session)
            .await
            .with_context(|| format!("backup of {} failed", config.mailbox()))?;
        Ok(())
    })
}

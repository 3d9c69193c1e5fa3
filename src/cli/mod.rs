mod backup;
mod restore;

use anyhow::{Context as _, Result};
use log::debug;
use tokio::runtime::Runtime;

use crate::{
    Args, Command,
    config::{Config, Credentials},
    imap::{Client, Connection, Session},
    logging,
};

pub fn run(args: &Args) -> Result<()> {
    let config = Config::load(args.config.clone()).context("cannot load configuration")?;
    let user = args.user.as_deref().or(config.user().as_deref());
    let credentials = Credentials::resolve(user, config.password_cmd().as_deref())
        .context("cannot determine credentials")?;
    logging::set_account(credentials.user());

    match &args.command {
        Command::Backup => backup::backup(&config, &credentials),
        Command::Restore { archive } => restore::restore(&config, &credentials, archive.clone()),
    }
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()
        .context("cannot build tokio runtime")
}

async fn login(config: &Config, credentials: &Credentials) -> Result<Session<Connection>> {
    let client = Client::connect(config.host(), config.port(), config.timeout())
        .await
        .with_context(|| format!("cannot connect to {}:{}", config.host(), config.port()))?;
    let session = client
        .login(credentials.user(), credentials.password())
        .await
        .with_context(|| format!("cannot log in as {}", credentials.user()))?;
    debug!("server capabilities: {:?}", session.capabilities());
    Ok(session)
}

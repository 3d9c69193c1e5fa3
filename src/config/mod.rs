mod auth;

use std::{env, fs, io, path::PathBuf, process::ExitStatus, time::Duration};

use derive_getters::Getters;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::retry::RetryPolicy;

pub use auth::Credentials;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    NoConfigHome,
    #[error("cannot read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("password_cmd is empty")]
    EmptyPasswordCmd,
    #[error("cannot run password_cmd `{cmd}`")]
    PasswordCmd {
        cmd: String,
        #[source]
        source: io::Error,
    },
    #[error("password_cmd `{cmd}` failed with {status}")]
    PasswordCmdFailed { cmd: String, status: ExitStatus },
    #[error("password_cmd `{cmd}` did not print a password")]
    NoPassword { cmd: String },
    #[error("cannot read credentials from stdin")]
    Prompt(#[source] io::Error),
    #[error("no account given")]
    NoAccount,
}

#[derive(Debug, Deserialize, Getters)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    host: String,
    port: u16,
    #[getter(skip)]
    timeout_secs: u64,
    mailbox: String,
    output_dir: PathBuf,
    #[getter(skip)]
    archive: Option<PathBuf>,
    user: Option<String>,
    password_cmd: Option<String>,
    #[getter(skip)]
    retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "imap.hostinger.com".to_string(),
            port: 993,
            timeout_secs: 1200,
            mailbox: "INBOX".to_string(),
            output_dir: PathBuf::from("."),
            archive: None,
            user: None,
            password_cmd: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Loads `file`, or the default location when `file` is `None`.
    ///
    /// Only an explicitly given file has to exist.
    pub fn load(file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let (path, required) = match file {
            Some(path) => (path, true),
            None => (default_location()?, false),
        };
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if !required && e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The archive to restore from unless one is given on the command line.
    pub fn archive_for(&self, account: &str) -> PathBuf {
        self.archive
            .clone()
            .unwrap_or_else(|| crate::backup::default_archive(&self.output_dir, account))
    }
}

fn default_location() -> Result<PathBuf, ConfigError> {
    location_below(
        env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        env::var_os("HOME").map(PathBuf::from),
    )
    .ok_or(ConfigError::NoConfigHome)
}

fn location_below(config_home: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    let mut location = config_home
        .filter(|dir| !dir.as_os_str().is_empty())
        .or_else(|| home.map(|home| home.join(".config")))?;
    location.push(env!("CARGO_PKG_NAME"));
    location.push("config.toml");
    Some(location)
}

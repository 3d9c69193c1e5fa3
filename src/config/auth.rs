use std::{
    fmt::Debug,
    io::{self, BufRead, Write},
    process::Command,
};

use derive_getters::Getters;
use log::debug;

use super::ConfigError;

#[derive(Getters)]
pub struct Credentials {
    user: String,
    #[getter(skip)]
    password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<password>")
            .finish()
    }
}

impl Credentials {
    /// Takes what is configured and asks on stdin for the rest.
    pub fn resolve(user: Option<&str>, password_cmd: Option<&str>) -> Result<Self, ConfigError> {
        let stdin = io::stdin();
        Self::resolve_with(user, password_cmd, &mut stdin.lock(), &mut io::stdout())
    }

    fn resolve_with(
        user: Option<&str>,
        password_cmd: Option<&str>,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<Self, ConfigError> {
        let user = match user {
            Some(user) => user.to_string(),
            None => prompt("Enter your email address: ", input, output)?,
        };
        if user.is_empty() {
            return Err(ConfigError::NoAccount);
        }
        let password = match password_cmd {
            Some(cmd) => run_password_cmd(cmd)?,
            None => prompt("Enter your password: ", input, output)?,
        };
        Ok(Self { user, password })
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

fn prompt(
    question: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<String, ConfigError> {
    output
        .write_all(question.as_bytes())
        .and_then(|()| output.flush())
        .map_err(ConfigError::Prompt)?;
    let mut answer = String::new();
    input.read_line(&mut answer).map_err(ConfigError::Prompt)?;
    Ok(answer.trim().to_string())
}

fn run_password_cmd(password_cmd: &str) -> Result<String, ConfigError> {
    let mut cmd_parts = password_cmd.split(' ').filter(|part| !part.is_empty());
    let mut cmd = Command::new(cmd_parts.next().ok_or(ConfigError::EmptyPasswordCmd)?);
    cmd.args(cmd_parts);
    debug!("running password_cmd {cmd:?}");
    let output = cmd.output().map_err(|source| ConfigError::PasswordCmd {
        cmd: password_cmd.to_string(),
        source,
    })?;
    if !output.status.success() {
        return Err(ConfigError::PasswordCmdFailed {
            cmd: password_cmd.to_string(),
            status: output.status,
        });
    }

    let password = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
    if password.is_empty() {
        return Err(ConfigError::NoPassword {
            cmd: password_cmd.to_string(),
        });
    }
    Ok(password)
}

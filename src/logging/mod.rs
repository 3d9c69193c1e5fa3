#[cfg(test)]
pub mod captured_log;
mod connected_to_journal;

use std::{
    io::{self, Write as _},
    sync::OnceLock,
};

use anstyle::{AnsiColor, Effects, Style};
use connected_to_journal::connected_to_journal;
use env_logger::{Env, Target};
use log::Level;

static ACCOUNT: OnceLock<String> = OnceLock::new();

/// Installs the global logger on stdout.
///
/// `RUST_LOG` overrides the default `info` filter. Lines carry the account once
/// [`set_account`] was called.
pub fn init() {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(target());
    if connected_to_journal(io::stdout()) {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "<{}>{}{}: {}",
                journal_priority(record.level()),
                account_tag(),
                record.target(),
                record.args()
            )
        });
    } else {
        let subtle = AnsiColor::BrightBlack.on_default();
        builder.format(move |buf, record| {
            let level_style = level_style(record.level());
            write!(
                buf,
                "{subtle}[{subtle:#}{:.3} {level_style}{}{level_style:#} {}{}",
                jiff::Timestamp::now(),
                record.level(),
                account_tag(),
                record.target(),
            )?;
            if let Some(line) = record.line() {
                write!(buf, ":{line}")?;
            }
            writeln!(buf, "{subtle}]{subtle:#} {}", record.args())
        });
    }
    builder.init();
}

fn target() -> Target {
    Target::Stdout
}

/// Tags every following line with `account`. Only the first call has an effect.
pub fn set_account(account: &str) {
    let _ = ACCOUNT.set(format!("{account} "));
}

fn account_tag() -> &'static str {
    ACCOUNT.get().map_or("", String::as_str)
}

/// syslog priority understood by journald in `<N>` prefixes.
fn journal_priority(level: Level) -> u8 {
    match level {
        Level::Error => 3,
        Level::Warn => 4,
        Level::Info => 6,
        Level::Debug | Level::Trace => 7,
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::Error => AnsiColor::Red.on_default().effects(Effects::BOLD),
        Level::Warn => AnsiColor::Yellow.on_default(),
        Level::Info => AnsiColor::Green.on_default(),
        Level::Debug => AnsiColor::Blue.on_default(),
        Level::Trace => AnsiColor::Cyan.on_default(),
    }
}

use std::fmt::Display;

use log::warn;

use crate::imap::SeqNum;

/// Why a message did not make it through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    FetchExhausted { attempts: u32, error: String },
    AppendFailed { error: String },
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FetchExhausted { attempts, error } => {
                write!(f, "fetch failed {attempts} times, last error: {error}")
            }
            SkipReason::AppendFailed { error } => write!(f, "append failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// 1-based position in the server listing or the archive.
    pub position: usize,
    pub id: Option<SeqNum>,
    pub reason: SkipReason,
}

impl Display for Skipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "email {}", self.position)?;
        if let Some(id) = self.id {
            write!(f, " (message {id})")?;
        }
        write!(f, " skipped, {}", self.reason)
    }
}

/// Logs `skipped` and adds it to `skips`. Every skip is logged here and nowhere else.
pub fn record(skips: &mut Vec<Skipped>, skipped: Skipped) {
    warn!("{skipped}");
    skips.push(skipped);
}

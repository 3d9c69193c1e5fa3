use imap_proto::{Response, ResponseCode, Status};

use crate::imap::{ConnectionError, codec::ResponseData};

/// The tagged response that completes a command.
#[derive(Debug)]
pub struct Completion<'a> {
    pub status: &'a Status,
    pub code: Option<&'a ResponseCode<'static>>,
    pub information: &'a str,
}

impl Completion<'_> {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, Status::Ok)
    }
}

pub fn completion(responses: &[ResponseData]) -> Result<Completion<'_>, ConnectionError> {
    match responses.last() {
        Some(Response::Done {
            status,
            code,
            information,
            ..
        }) => Ok(Completion {
            status,
            code: code.as_ref(),
            information: information.as_deref().unwrap_or_default(),
        }),
        _ => Err(ConnectionError::Closed),
    }
}

/// Wraps `value` in an IMAP quoted string.
pub fn quoted(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

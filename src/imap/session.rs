use imap_proto::{AttributeValue, MailboxDatum, Response, ResponseCode, Status};
use log::{debug, trace, warn};
use thiserror::Error;

use crate::imap::{
    ConnectionError, Mailbox, MailboxBuilder, SendCommand, SeqNum,
    capability::{Capabilities, Capability},
    codec::ResponseData,
    response::{completion, quoted},
};

/// An authenticated connection.
///
/// The server keeps at most one mailbox selected per connection. `Session` mirrors that state in
/// `selected`, so commands which only make sense inside a mailbox fail with
/// [`SessionError::NotSelected`] before anything is sent.
#[derive(Debug)]
pub struct Session<T: SendCommand> {
    connection: T,
    capabilities: Capabilities,
    selected: Option<Mailbox>,
}

impl<T: SendCommand> Session<T> {
    pub(super) fn new(connection: T, capabilities: Capabilities) -> Self {
        Self {
            connection,
            capabilities,
            selected: None,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn selected(&self) -> Option<&Mailbox> {
        self.selected.as_ref()
    }

    pub async fn select(&mut self, mailbox: &str) -> Result<&Mailbox, SessionError> {
        let command = format!("SELECT {}", quoted(mailbox));
        debug!("{command}");
        // a failed SELECT leaves the connection without selected mailbox
        self.selected = None;
        let responses = self.connection.send(&command).await?;
        let done = completion(&responses)?;
        if !done.is_ok() {
            return Err(SessionError::rejected("SELECT", done.information));
        }

        let mut new_mailbox = MailboxBuilder::default();
        new_mailbox.name(mailbox);
        if let Some(ResponseCode::ReadOnly) = done.code {
            new_mailbox.readonly(true);
        }
        for response in &responses {
            match response {
                Response::MailboxData(MailboxDatum::Flags(cows)) => {
                    new_mailbox.flags(cows.iter().map(ToString::to_string).collect());
                }
                Response::MailboxData(MailboxDatum::Exists(exists)) => {
                    new_mailbox.exists(*exists);
                }
                Response::MailboxData(MailboxDatum::Recent(recent)) => {
                    new_mailbox.recent(*recent);
                }
                Response::Data {
                    status: Status::Ok,
                    code: Some(ResponseCode::UidValidity(validity)),
                    ..
                } => {
                    new_mailbox.uid_validity(*validity);
                }
                Response::Done { .. } => {}
                _ => {
                    trace!("ignoring response to SELECT {response:?}");
                }
            }
        }

        let selected = new_mailbox
            .build()
            .map_err(|e| SessionError::Malformed(format!("SELECT {mailbox}: {e}")))?;
        trace!("selected_mailbox = {selected:?}");
        Ok(&*self.selected.insert(selected))
    }

    fn ensure_selected(&self) -> Result<&Mailbox, SessionError> {
        self.selected.as_ref().ok_or(SessionError::NotSelected)
    }

    /// Lists every message of the selected mailbox, in the order the server reports them.
    pub async fn search_all(&mut self) -> Result<Vec<SeqNum>, SessionError> {
        self.ensure_selected()?;
        let command = "SEARCH ALL";
        debug!("{command}");
        let responses = self.connection.send(command).await?;
        let done = completion(&responses)?;
        if !done.is_ok() {
            return Err(SessionError::rejected("SEARCH", done.information));
        }

        let mut ids = Vec::new();
        for response in &responses {
            if let Response::MailboxData(MailboxDatum::Search(numbers)) = response {
                for number in numbers {
                    match SeqNum::try_from(number) {
                        Ok(id) => ids.push(id),
                        Err(e) => warn!("ignoring search result {number}: {e}"),
                    }
                }
            }
        }
        Ok(ids)
    }

    /// Fetches the complete raw message `id` of the selected mailbox.
    pub async fn fetch_raw(&mut self, id: SeqNum) -> Result<Vec<u8>, SessionError> {
        self.ensure_selected()?;
        let command = format!("FETCH {id} (RFC822)");
        debug!("{command}");
        let responses = self.connection.send(&command).await?;
        let done = completion(&responses)?;
        if !done.is_ok() {
            return Err(SessionError::rejected("FETCH", done.information));
        }

        let wanted = u32::from(id);
        responses
            .into_iter()
            .find_map(|response| match response {
                Response::Fetch(number, attributes) if number == wanted => {
                    attributes.into_iter().find_map(|attribute| match attribute {
                        AttributeValue::Rfc822(Some(content)) => Some(content.into_owned()),
                        _ => None,
                    })
                }
                _ => None,
            })
            .ok_or(SessionError::MissingContent { id })
    }

    /// Appends `message` to `mailbox`, which does not need to be selected.
    pub async fn append(&mut self, mailbox: &str, message: &[u8]) -> Result<(), SessionError> {
        let command = format!("APPEND {}", quoted(mailbox));
        debug!("{command} <{} bytes>", message.len());
        let synchronizing = !self.capabilities.contains(Capability::LiteralPlus);
        let responses = self
            .connection
            .send_literal(&command, message, synchronizing)
            .await?;
        let done = completion(&responses)?;
        if done.is_ok() {
            Ok(())
        } else {
            Err(SessionError::rejected("APPEND", done.information))
        }
    }

    /// Logs out whatever `outcome` is and hands `outcome` back.
    ///
    /// A failing logout is only logged, it never replaces the outcome of the work done before.
    pub async fn finish<R>(self, outcome: R) -> R {
        if let Err(e) = self.logout().await {
            warn!("logout failed: {e}");
        }
        outcome
    }

    pub async fn logout(mut self) -> Result<(), SessionError> {
        debug!("LOGOUT");
        let responses = self.connection.send("LOGOUT").await?;
        let done = completion(&responses)?;
        if done.is_ok() {
            Ok(())
        } else {
            Err(SessionError::rejected("LOGOUT", done.information))
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("{command} rejected by server: {information}")]
    Rejected {
        command: &'static str,
        information: String,
    },
    #[error("no mailbox selected")]
    NotSelected,
    #[error("server sent no content for message {id}")]
    MissingContent { id: SeqNum },
    #[error("malformed server response: {0}")]
    Malformed(String),
}

impl SessionError {
    fn rejected(command: &'static str, information: &str) -> Self {
        Self::Rejected {
            command,
            information: information.to_string(),
        }
    }
}

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use imap_proto::{Capability, Response, ResponseCode, Status};

use crate::imap::{Client, Session, codec::ResponseData};

use super::{ConnectionError, SendCommand};

#[derive(Debug, Default)]
pub struct SentCommands {
    pub commands: Vec<String>,
    pub literals: Vec<Vec<u8>>,
}

impl SentCommands {
    pub fn count(&self, command: &str) -> usize {
        self.commands
            .iter()
            .filter(|sent| sent.starts_with(command))
            .count()
    }
}

/// Replays one scripted answer per command and records what was sent.
#[derive(Debug)]
pub struct MockConnection {
    script: VecDeque<Result<Vec<ResponseData>, ConnectionError>>,
    sent: Rc<RefCell<SentCommands>>,
}

impl MockConnection {
    pub fn new(
        script: impl IntoIterator<Item = Result<Vec<ResponseData>, ConnectionError>>,
    ) -> (Self, Rc<RefCell<SentCommands>>) {
        let sent = Rc::new(RefCell::new(SentCommands::default()));
        (
            Self {
                script: script.into_iter().collect(),
                sent: sent.clone(),
            },
            sent,
        )
    }

    fn next_answer(&mut self) -> Result<Vec<ResponseData>, ConnectionError> {
        self.script.pop_front().unwrap_or(Err(ConnectionError::Closed))
    }
}

impl SendCommand for MockConnection {
    async fn send(&mut self, command: &str) -> Result<Vec<ResponseData>, ConnectionError> {
        self.sent.borrow_mut().commands.push(command.to_string());
        self.next_answer()
    }

    async fn send_literal(
        &mut self,
        command: &str,
        literal: &[u8],
        _synchronizing: bool,
    ) -> Result<Vec<ResponseData>, ConnectionError> {
        {
            let mut sent = self.sent.borrow_mut();
            sent.commands.push(command.to_string());
            sent.literals.push(literal.to_vec());
        }
        self.next_answer()
    }
}

/// A logged in session on top of a [`MockConnection`] replaying `script`.
///
/// The login exchange is not part of the returned command log.
pub async fn logged_in_session(
    script: impl IntoIterator<Item = Result<Vec<ResponseData>, ConnectionError>>,
) -> (Session<MockConnection>, Rc<RefCell<SentCommands>>) {
    let login = std::iter::once(Ok(responses::ok()));
    let (connection, sent) = MockConnection::new(login.chain(script));
    let greeting = Response::Data {
        status: Status::Ok,
        code: Some(ResponseCode::Capabilities(vec![Capability::Imap4rev1])),
        information: None,
    };
    let session = Client::new(connection, &greeting)
        .login("user@example.com", "password")
        .await
        .expect("scripted login should succeed");
    sent.borrow_mut().commands.clear();
    (session, sent)
}

pub mod responses {
    use std::borrow::Cow;

    use imap_proto::{AttributeValue, MailboxDatum, RequestId, Response, Status};

    use crate::imap::codec::ResponseData;

    pub fn done(status: Status, information: &'static str) -> ResponseData {
        Response::Done {
            tag: RequestId("0000".to_string()),
            status,
            code: None,
            information: Some(Cow::Borrowed(information)),
        }
    }

    pub fn ok() -> Vec<ResponseData> {
        vec![done(Status::Ok, "completed")]
    }

    pub fn no(information: &'static str) -> Vec<ResponseData> {
        vec![done(Status::No, information)]
    }

    pub fn select_ok(exists: u32) -> Vec<ResponseData> {
        vec![
            Response::MailboxData(MailboxDatum::Exists(exists)),
            Response::MailboxData(MailboxDatum::Recent(0)),
            done(Status::Ok, "[READ-WRITE] Select completed"),
        ]
    }

    pub fn search(ids: &[u32]) -> Vec<ResponseData> {
        vec![
            Response::MailboxData(MailboxDatum::Search(ids.to_vec())),
            done(Status::Ok, "Search completed"),
        ]
    }

    pub fn fetch(id: u32, content: &[u8]) -> Vec<ResponseData> {
        vec![
            Response::Fetch(
                id,
                vec![AttributeValue::Rfc822(Some(Cow::Owned(content.to_vec())))],
            ),
            done(Status::Ok, "Fetch completed"),
        ]
    }

    pub fn logout() -> Vec<ResponseData> {
        vec![
            Response::Data {
                status: Status::Bye,
                code: None,
                information: Some(Cow::Borrowed("Logging out")),
            },
            done(Status::Ok, "Logout completed"),
        ]
    }
}

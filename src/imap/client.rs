use std::time::Duration;

use imap_proto::{Response, ResponseCode};
use log::{debug, trace};
use thiserror::Error;

use crate::imap::{
    Connection, ConnectionError, SendCommand, Session,
    capability::{Capabilities, Capability},
    codec::ResponseData,
    response::{completion, quoted},
};

/// A connection that has not authenticated yet.
pub struct Client<T: SendCommand> {
    connection: T,
    capabilities: Option<Capabilities>,
}

impl Client<Connection> {
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, ConnectionError> {
        let (connection, greeting) = Connection::connect_to(host, port, timeout).await?;
        Ok(Self::new(connection, &greeting))
    }
}

impl<T: SendCommand> Client<T> {
    pub fn new(connection: T, greeting: &ResponseData) -> Self {
        let capabilities = if let Response::Data {
            code: Some(ResponseCode::Capabilities(caps)),
            ..
        } = greeting
        {
            Some(Capabilities::from_response(caps))
        } else {
            trace!("greeting carries no capabilities");
            None
        };
        Self {
            connection,
            capabilities,
        }
    }

    async fn request_capabilities(&mut self) -> Result<Capabilities, ConnectionError> {
        debug!("CAPABILITY");
        let responses = self.connection.send("CAPABILITY").await?;
        let capabilities = responses
            .iter()
            .find_map(|response| match response {
                Response::Capabilities(caps) => Some(Capabilities::from_response(caps)),
                _ => None,
            })
            .unwrap_or_default();
        Ok(capabilities)
    }

    pub async fn login(mut self, username: &str, password: &str) -> Result<Session<T>, LoginError> {
        let mut capabilities = match self.capabilities {
            Some(capabilities) => capabilities,
            None => self.request_capabilities().await?,
        };
        if capabilities.contains(Capability::LoginDisabled) {
            return Err(LoginError::Disabled);
        }

        debug!("LOGIN <user> <password>");
        let command = format!("LOGIN {} {}", quoted(username), quoted(password));
        let responses = self.connection.send(&command).await?;
        let done = completion(&responses)?;
        if !done.is_ok() {
            return Err(LoginError::Rejected(done.information.to_string()));
        }
        // servers commonly announce the post-login capabilities right away
        if let Some(ResponseCode::Capabilities(caps)) = done.code {
            capabilities = Capabilities::from_response(caps);
        }
        debug!("logged in as {username}");

        Ok(Session::new(self.connection, capabilities))
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("username or password rejected: {0}")]
    Rejected(String),
    #[error("server does not allow LOGIN on this connection")]
    Disabled,
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use assertables::*;
    use imap_proto::{RequestId, Status};
    use rstest::*;

    use super::*;
    use crate::imap::connection::mock_connection::{MockConnection, responses};

    fn greeting(caps: Vec<imap_proto::Capability<'static>>) -> ResponseData {
        Response::Data {
            status: Status::Ok,
            code: Some(ResponseCode::Capabilities(caps)),
            information: Some(Cow::Borrowed("ready")),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_returns_session_when_login_ok() {
        let (connection, sent) = MockConnection::new([Ok(vec![Response::Done {
            tag: RequestId("0000".to_owned()),
            status: Status::Ok,
            code: Some(ResponseCode::Capabilities(vec![
                imap_proto::Capability::Imap4rev1,
                imap_proto::Capability::Atom(Cow::Borrowed("LITERAL+")),
            ])),
            information: Some(Cow::Borrowed("Logged in")),
        }])]);
        let client = Client::new(
            connection,
            &greeting(vec![imap_proto::Capability::Imap4rev1]),
        );

        let session = assert_ok!(client.login("me@example.com", "se\"cret").await);

        assert!(session.capabilities().contains(Capability::LiteralPlus));
        assert_eq!(
            sent.borrow().commands,
            vec!["LOGIN \"me@example.com\" \"se\\\"cret\"".to_string()]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_error_when_login_no() {
        let (connection, _) = MockConnection::new([Ok(responses::no(
            "[AUTHENTICATIONFAILED] Authentication failed.",
        ))]);
        let client = Client::new(
            connection,
            &greeting(vec![imap_proto::Capability::Imap4rev1]),
        );

        let result = client.login("name", "password").await;

        assert!(matches!(result, Err(LoginError::Rejected(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_refused_when_login_disabled() {
        let (connection, sent) = MockConnection::new([]);
        let client = Client::new(
            connection,
            &greeting(vec![imap_proto::Capability::Atom(Cow::Borrowed(
                "LOGINDISABLED",
            ))]),
        );

        let result = client.login("name", "password").await;

        assert!(matches!(result, Err(LoginError::Disabled)));
        assert!(sent.borrow().commands.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_capabilities_requested_when_greeting_has_none() {
        let (connection, sent) = MockConnection::new([
            Ok(vec![
                Response::Capabilities(vec![imap_proto::Capability::Imap4rev1]),
                responses::done(Status::Ok, "Capability completed"),
            ]),
            Ok(responses::ok()),
        ]);
        let greeting = Response::Data {
            status: Status::Ok,
            code: None,
            information: Some(Cow::Borrowed("ready")),
        };
        let client = Client::new(connection, &greeting);

        let session = assert_ok!(client.login("name", "password").await);

        assert!(session.capabilities().contains(Capability::Imap4rev1));
        assert_eq!(sent.borrow().count("CAPABILITY"), 1);
        assert_eq!(sent.borrow().count("LOGIN"), 1);
    }
}

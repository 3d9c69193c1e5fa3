use std::{borrow::Cow, time::Duration};

use futures::{SinkExt as _, StreamExt as _};
use imap_proto::{Request, RequestId, Response, Status};
use log::{debug, trace};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    time::timeout,
};
use tokio_native_tls::{TlsConnector, TlsStream, native_tls};
use tokio_util::codec::Framed;

use crate::imap::{
    codec::{ImapCodec, ResponseData},
    tag_generator::TagGenerator,
};

use super::{ConnectionError, SendCommand};

/// TLS connection to an IMAP server.
///
/// Every exchange with the server, including connecting, is bounded by the timeout given to
/// [`Connection::connect_to`]. Responses still arriving for an exchange that timed out carry an
/// older tag and are dropped by the next exchange.
///
/// A response that cannot be parsed ends the connection: every later exchange fails with
/// [`ConnectionError::Closed`].
pub struct Connection<S = TlsStream<TcpStream>> {
    stream: Framed<S, ImapCodec>,
    tag_generator: TagGenerator,
    timeout: Duration,
}

impl Connection {
    pub async fn connect_to(
        host: &str,
        port: u16,
        timeout_after: Duration,
    ) -> Result<(Self, ResponseData), ConnectionError> {
        timeout(timeout_after, Self::do_connect(host, port, timeout_after))
            .await
            .map_err(|_| ConnectionError::Timeout(timeout_after))?
    }

    async fn do_connect(
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<(Self, ResponseData), ConnectionError> {
        debug!("connecting to {host}:{port}");
        let tls = TlsConnector::from(native_tls::TlsConnector::new()?);
        let stream = TcpStream::connect((host, port)).await?;
        let stream = tls.connect(host, stream).await?;

        let mut stream = Framed::new(stream, ImapCodec);

        let greeting = stream.next().await.ok_or(ConnectionError::Closed)??;
        trace!("greeting = {greeting:?}");
        if let Response::Data {
            status: Status::Bye,
            information,
            ..
        } = &greeting
        {
            return Err(ConnectionError::Rejected(
                information.as_deref().unwrap_or_default().to_string(),
            ));
        }

        Ok((Self::from_framed(stream, timeout), greeting))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    fn from_framed(stream: Framed<S, ImapCodec>, timeout: Duration) -> Self {
        Self {
            stream,
            tag_generator: TagGenerator::default(),
            timeout,
        }
    }

    async fn write(&mut self, tag: &str, data: &[u8]) -> Result<(), ConnectionError> {
        let request = Request(Cow::Borrowed(tag.as_bytes()), Cow::Borrowed(data));
        self.stream.send(&request).await?;
        Ok(())
    }

    async fn read(&mut self) -> Result<ResponseData, ConnectionError> {
        Ok(self.stream.next().await.ok_or(ConnectionError::Closed)??)
    }

    async fn read_until_tagged(
        &mut self,
        tag: &str,
        mut responses: Vec<ResponseData>,
    ) -> Result<Vec<ResponseData>, ConnectionError> {
        loop {
            let response = self.read().await?;
            match tagged(tag, &response) {
                Tagged::Current => {
                    responses.push(response);
                    return Ok(responses);
                }
                Tagged::Stale => {}
                Tagged::Untagged => responses.push(response),
            }
        }
    }

    async fn exchange(
        &mut self,
        command: &str,
        literal: Option<(&[u8], bool)>,
    ) -> Result<Vec<ResponseData>, ConnectionError> {
        let tag = self.tag_generator.next();
        trace!("{tag}: sending");
        let mut responses = Vec::new();
        match literal {
            None => self.write(&tag, command.as_bytes()).await?,
            Some((literal, true)) => {
                let announcement = format!("{command} {{{}}}", literal.len());
                self.write(&tag, announcement.as_bytes()).await?;
                loop {
                    let response = self.read().await?;
                    if let Response::Continue { .. } = response {
                        trace!("{tag}: server ready for literal");
                        break;
                    }
                    // the server may refuse the literal right away
                    match tagged(&tag, &response) {
                        Tagged::Current => {
                            responses.push(response);
                            return Ok(responses);
                        }
                        Tagged::Stale => {}
                        Tagged::Untagged => responses.push(response),
                    }
                }
                self.write("", literal).await?;
            }
            Some((literal, false)) => {
                let mut data = format!("{command} {{{}+}}\r\n", literal.len()).into_bytes();
                data.extend_from_slice(literal);
                self.write(&tag, &data).await?;
            }
        }
        self.read_until_tagged(&tag, responses).await
    }
}

enum Tagged {
    Current,
    /// Completion of an earlier exchange that was abandoned, usually after a timeout.
    Stale,
    Untagged,
}

fn tagged(tag: &str, response: &ResponseData) -> Tagged {
    let Response::Done {
        tag: RequestId(received),
        status,
        information,
        ..
    } = response
    else {
        return Tagged::Untagged;
    };
    if received == tag {
        trace!("{received} {status:?} {information:?}");
        Tagged::Current
    } else {
        debug!("dropping late completion {received} {status:?} {information:?}, waiting for {tag}");
        Tagged::Stale
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> SendCommand for Connection<S> {
    async fn send(&mut self, command: &str) -> Result<Vec<ResponseData>, ConnectionError> {
        let limit = self.timeout;
        timeout(limit, self.exchange(command, None))
            .await
            .map_err(|_| ConnectionError::Timeout(limit))?
    }

    async fn send_literal(
        &mut self,
        command: &str,
        literal: &[u8],
        synchronizing: bool,
    ) -> Result<Vec<ResponseData>, ConnectionError> {
        let limit = self.timeout;
        timeout(limit, self.exchange(command, Some((literal, synchronizing))))
            .await
            .map_err(|_| ConnectionError::Timeout(limit))?
    }
}

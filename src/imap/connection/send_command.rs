use std::{io, time::Duration};

use thiserror::Error;
use tokio_native_tls::native_tls;

use crate::imap::codec::ResponseData;

/// Transport seam between the protocol logic in [`Session`](crate::imap::Session) and the
/// network.
///
/// Both methods send one tagged command and return every response received for it, in order,
/// ending with the tagged completion response.
pub trait SendCommand {
    async fn send(&mut self, command: &str) -> Result<Vec<ResponseData>, ConnectionError>;

    /// Sends `command` followed by `literal` as an IMAP literal.
    ///
    /// With `synchronizing` the server has to acknowledge the literal size with a continuation
    /// request before the data is sent, otherwise the literal is announced as `{n+}` and sent
    /// right away.
    async fn send_literal(
        &mut self,
        command: &str,
        literal: &[u8],
        synchronizing: bool,
    ) -> Result<Vec<ResponseData>, ConnectionError>;
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("network error")]
    Io(#[from] io::Error),
    #[error("tls handshake failed")]
    Tls(#[from] native_tls::Error),
    #[error("server did not answer within {0:?}")]
    Timeout(Duration),
    #[error("server closed the connection")]
    Closed,
    #[error("server rejected connection: {0}")]
    Rejected(String),
}

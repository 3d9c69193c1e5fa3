mod capability;
mod client;
mod codec;
mod connection;
mod mailbox;
mod response;
mod seq_num;
mod session;
mod tag_generator;

pub use client::Client;
pub use connection::Connection;
pub use connection::ConnectionError;
pub use connection::SendCommand;
pub use mailbox::Mailbox;
pub use mailbox::MailboxBuilder;
pub use seq_num::SeqNum;
pub use session::Session;
pub use session::SessionError;

#[cfg(test)]
pub use connection::mock_connection;

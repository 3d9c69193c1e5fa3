#[expect(clippy::module_inception)]
mod connection;
#[cfg(test)]
pub mod mock_connection;
mod send_command;

pub use connection::Connection;
pub use send_command::ConnectionError;
pub use send_command::SendCommand;

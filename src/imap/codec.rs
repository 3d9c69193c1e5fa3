use std::io;

use bytes::{Buf as _, BufMut as _, BytesMut};
use imap_proto::{Request, Response};
use tokio_util::codec::{Decoder, Encoder};

/// A fully parsed server response that no longer borrows from the read buffer.
pub type ResponseData = Response<'static>;

#[derive(Debug, Default)]
pub struct ImapCodec;

impl Decoder for ImapCodec {
    type Item = ResponseData;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if buf.is_empty() {
            return Ok(None);
        }
        let (consumed, response) = match Response::from_bytes(&buf[..]) {
            Ok((remaining, response)) => (buf.len() - remaining.len(), response.into_owned()),
            // literals arrive in several reads, wait for the rest
            Err(nom::Err::Incomplete(_)) => return Ok(None),
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
                let line_end = e
                    .input
                    .iter()
                    .position(|b| *b == b'\n')
                    .unwrap_or(e.input.len());
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "unparsable response ({:?}) at {:?}",
                        e.code,
                        String::from_utf8_lossy(&e.input[..line_end])
                    ),
                ));
            }
        };
        buf.advance(consumed);
        Ok(Some(response))
    }
}

impl Encoder<&Request<'_>> for ImapCodec {
    type Error = io::Error;

    fn encode(&mut self, request: &Request<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let Request(tag, command) = request;
        dst.reserve(tag.len() + command.len() + 3);
        // continuation data is sent without a tag
        if !tag.is_empty() {
            dst.put_slice(tag);
            dst.put_u8(b' ');
        }
        dst.put_slice(command);
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

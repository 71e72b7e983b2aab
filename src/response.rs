//! raw server response
use std::{io::Write, ops::Deref};

///Everything the server sent before closing the connection.
///
///The bytes are kept exactly as received; nothing is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    raw: Vec<u8>,
}

impl Response {
    ///Returns received bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    ///Consumes the response, returning received bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    ///Writes received bytes to `writer` unchanged and flushes it.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.raw)?;
        writer.flush()
    }
}

impl From<Vec<u8>> for Response {
    fn from(raw: Vec<u8>) -> Self {
        Response { raw }
    }
}

impl Deref for Response {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.raw
    }
}

impl AsRef<[u8]> for Response {
    fn as_ref(&self) -> &[u8] {
        &self.raw
    }
}

//! Line-oriented transport: one command per input line, one reply per
//! output line block.

use super::{IncomingMessage, Transport};
use crate::error::{ClaimerError, Result};
use std::io::{BufRead, Write};

/// Channel name reported for every line-transport message.
pub const LINE_CHANNEL: &str = "stdin";

/// Reads commands from any `BufRead` as a fixed user and writes replies to
/// any `Write`. The binary wires it to stdin/stdout.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
    user: String,
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    pub fn new(reader: R, writer: W, user: impl Into<String>) -> Self {
        Self {
            reader,
            writer,
            user: user.into(),
        }
    }
}

impl<R: BufRead, W: Write> Transport for LineTransport<R, W> {
    fn next_message(&mut self) -> Result<Option<IncomingMessage>> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| ClaimerError::Io(format!("failed to read command: {}", e)))?;
            if read == 0 {
                return Ok(None);
            }

            let text = line.trim();
            if !text.is_empty() {
                return Ok(Some(IncomingMessage {
                    text: text.to_string(),
                    channel: LINE_CHANNEL.to_string(),
                    user: self.user.clone(),
                }));
            }
        }
    }

    fn post_message(&mut self, _channel: &str, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", text)
            .and_then(|_| self.writer.flush())
            .map_err(|e| ClaimerError::Io(format!("failed to write reply: {}", e)))
    }
}

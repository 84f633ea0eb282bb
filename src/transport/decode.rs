//! Incremental decoding of a top-level JSON array.
//!
//! Page bodies arrive as a stream of byte chunks. The decoder splits them into
//! the raw bytes of each top-level element so items can be handed out before
//! the whole page has been received.

use crate::transport::TransportError;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeArray,
    InArray,
    AfterArray,
}

/// Splits a JSON array body into its elements, chunk by chunk.
///
/// Only the array structure is checked here; each element is validated when
/// it is deserialized.
#[derive(Debug)]
pub struct JsonArrayDecoder {
    position: Position,
    depth: usize,
    in_string: bool,
    escaped: bool,
    after_comma: bool,
    current: Vec<u8>,
}

impl Default for JsonArrayDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonArrayDecoder {
    pub fn new() -> Self {
        Self {
            position: Position::BeforeArray,
            depth: 0,
            in_string: false,
            escaped: false,
            after_comma: false,
            current: Vec::new(),
        }
    }

    /// Feed one chunk, returning every element completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut complete = Vec::new();
        for &b in chunk {
            match self.position {
                Position::BeforeArray => match b {
                    b'[' => self.position = Position::InArray,
                    // UTF-8 byte order mark
                    0xEF | 0xBB | 0xBF => {}
                    b if b.is_ascii_whitespace() => {}
                    other => {
                        return Err(malformed(format!(
                            "expected a JSON array, found '{}'",
                            other as char
                        )))
                    }
                },
                Position::AfterArray => {
                    if !b.is_ascii_whitespace() {
                        return Err(malformed("unexpected data after the JSON array"));
                    }
                }
                Position::InArray => self.consume(b, &mut complete)?,
            }
        }
        Ok(complete)
    }

    /// Signal end of input. An empty body counts as an empty array.
    pub fn finish(&mut self) -> Result<()> {
        match self.position {
            Position::InArray => Err(malformed("JSON array was not terminated")),
            Position::BeforeArray | Position::AfterArray => Ok(()),
        }
    }

    fn consume(&mut self, b: u8, complete: &mut Vec<Vec<u8>>) -> Result<()> {
        if self.in_string {
            self.current.push(b);
            if self.escaped {
                self.escaped = false;
            } else if b == b'\\' {
                self.escaped = true;
            } else if b == b'"' {
                self.in_string = false;
            }
            return Ok(());
        }

        match b {
            b'"' => {
                self.in_string = true;
                self.current.push(b);
            }
            b'[' | b'{' => {
                self.depth += 1;
                self.current.push(b);
            }
            b']' | b'}' if self.depth > 0 => {
                self.depth -= 1;
                self.current.push(b);
            }
            b']' => {
                if self.after_comma && self.current.iter().all(u8::is_ascii_whitespace) {
                    return Err(malformed("trailing comma in JSON array"));
                }
                self.take_element(complete);
                self.position = Position::AfterArray;
            }
            b'}' => return Err(malformed("unbalanced '}' in JSON array")),
            b',' if self.depth == 0 => {
                if self.current.iter().all(u8::is_ascii_whitespace) {
                    return Err(malformed("empty element in JSON array"));
                }
                self.take_element(complete);
                self.after_comma = true;
            }
            b if b.is_ascii_whitespace() && self.depth == 0 && self.current.is_empty() => {}
            _ => self.current.push(b),
        }
        Ok(())
    }

    fn take_element(&mut self, complete: &mut Vec<Vec<u8>>) {
        let mut element = std::mem::take(&mut self.current);
        while element.last().is_some_and(u8::is_ascii_whitespace) {
            element.pop();
        }
        if !element.is_empty() {
            complete.push(element);
        }
    }
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::Transport(TransportError::Other(msg.into()))
}

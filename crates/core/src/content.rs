//! Content stream parsing.
//!
//! A content stream is a sequence of operands followed by an operator
//! keyword. [`ContentParser`] groups them into [`Operation`]s, skipping
//! inline images (`BI ... ID ... EI`) as a unit. Damaged streams are
//! resynchronized rather than aborted; a byte that cannot be tokenized is
//! skipped and parsing continues.

use tracing::debug;

use crate::error::ExtractError;
use crate::lexer::{Token, is_whitespace};
use crate::object::Object;
use crate::parser::ObjectParser;

/// One content stream operation: `operands... operator`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: String,
    pub operands: Vec<Object>,
}

pub struct ContentParser<'a> {
    data: &'a [u8],
    parser: ObjectParser<'a>,
    operands: Vec<Object>,
}

impl<'a> ContentParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ContentParser {
            data,
            parser: ObjectParser::new(data),
            operands: Vec::new(),
        }
    }

    /// Skips past the error position so parsing can continue. Returns false
    /// once the end of the stream is reached.
    fn recover(&mut self, err: &ExtractError) -> bool {
        let pos = self.parser.pos();
        if pos >= self.data.len() {
            return false;
        }
        debug!("content stream error at offset {pos}: {err}; resyncing");
        self.parser = ObjectParser::with_pos(self.data, pos + 1);
        true
    }

    /// Consumes an inline image: the dict entries up to `ID`, then the
    /// binary data up to the end marker. The data ends at `~>` when the
    /// inline filter is ASCII85, otherwise at an `EI` keyword followed by
    /// whitespace.
    fn skip_inline_image(&mut self) {
        let mut entries: Vec<Object> = Vec::new();
        loop {
            match self.parser.token() {
                Ok(Some((_, Token::Keyword(kw)))) if kw == "ID" => break,
                Ok(Some((_, Token::Keyword(_)))) => {}
                Ok(Some(t)) => {
                    self.parser.unread(t);
                    match self.parser.next_object() {
                        Ok(Some(obj)) => entries.push(obj),
                        Ok(None) => return,
                        Err(err) => {
                            if !self.recover(&err) {
                                return;
                            }
                        }
                    }
                }
                Ok(None) => return,
                Err(err) => {
                    if !self.recover(&err) {
                        return;
                    }
                }
            }
        }

        let eos: &[u8] = if inline_filter_is_ascii85(&entries) {
            b"~>"
        } else {
            b"EI"
        };

        let mut pos = self.parser.pos();
        while pos < self.data.len() && is_whitespace(self.data[pos]) {
            pos += 1;
        }
        let resume = match find_marker(self.data, pos, eos) {
            Some(hit) => {
                let after = hit + eos.len();
                // One trailing whitespace byte belongs to the image data.
                if after < self.data.len() { after + 1 } else { after }
            }
            None => {
                debug!("inline image without end marker; skipping rest of stream");
                self.data.len()
            }
        };
        self.parser = ObjectParser::with_pos(self.data, resume);
    }
}

impl Iterator for ContentParser<'_> {
    type Item = Operation;

    fn next(&mut self) -> Option<Operation> {
        loop {
            match self.parser.token() {
                Ok(Some((_, Token::Keyword(kw)))) => match kw.as_str() {
                    "BI" => {
                        self.operands.clear();
                        self.skip_inline_image();
                    }
                    // Seen standalone only when an ASCII85 end marker already
                    // terminated the image data.
                    "EI" => {}
                    _ => {
                        return Some(Operation {
                            operator: kw,
                            operands: std::mem::take(&mut self.operands),
                        });
                    }
                },
                Ok(Some(t)) => {
                    self.parser.unread(t);
                    match self.parser.next_object() {
                        Ok(Some(obj)) => self.operands.push(obj),
                        Ok(None) => return None,
                        Err(err) => {
                            if !self.recover(&err) {
                                return None;
                            }
                        }
                    }
                }
                Ok(None) => return None,
                Err(err) => {
                    if !self.recover(&err) {
                        return None;
                    }
                }
            }
        }
    }
}

/// Inline image dicts abbreviate `/Filter` as `/F`; both spellings occur.
fn inline_filter_is_ascii85(entries: &[Object]) -> bool {
    let mut pairs = entries.chunks_exact(2);
    let filter = pairs.find_map(|pair| match (&pair[0], &pair[1]) {
        (Object::Name(key), value) if key == "F" || key == "Filter" => Some(value),
        _ => None,
    });
    let first = match filter {
        Some(Object::Array(items)) => items.first(),
        other => other,
    };
    matches!(first, Some(Object::Name(n)) if n == "A85" || n == "ASCII85Decode")
}

/// Finds `marker` at or after `start`, requiring whitespace or end of data
/// directly behind it.
fn find_marker(data: &[u8], start: usize, marker: &[u8]) -> Option<usize> {
    let mut i = start;
    while i + marker.len() <= data.len() {
        if data[i..].starts_with(marker) {
            let after = i + marker.len();
            if after >= data.len() || is_whitespace(data[after]) {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

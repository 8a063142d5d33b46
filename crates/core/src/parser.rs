//! Object-level parser: builds [`Object`]s from tokens.
//!
//! In document context an integer pair followed by `R` reads as an indirect
//! reference, which takes two tokens of lookahead; unconsumed lookahead is
//! pushed back on a small stack.

use bytes::Bytes;

use crate::error::{ExtractError, Result};
use crate::lexer::{Lexer, Token};
use crate::object::{Dict, ObjRef, Object, StreamObject};

const MAX_NESTING: usize = 128;

pub struct ObjectParser<'a> {
    lexer: Lexer<'a>,
    pending: Vec<(usize, Token)>,
}

impl<'a> ObjectParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_pos(data, 0)
    }

    pub fn with_pos(data: &'a [u8], pos: usize) -> Self {
        ObjectParser {
            lexer: Lexer::with_pos(data, pos),
            pending: Vec::new(),
        }
    }

    /// Cursor position of the underlying lexer. Only meaningful when no
    /// lookahead is pending.
    pub fn pos(&self) -> usize {
        self.lexer.pos()
    }

    pub(crate) fn token(&mut self) -> Result<Option<(usize, Token)>> {
        if let Some(t) = self.pending.pop() {
            return Ok(Some(t));
        }
        self.lexer.next_token()
    }

    pub(crate) fn unread(&mut self, t: (usize, Token)) {
        self.pending.push(t);
    }

    /// Next complete object, or `None` at end of input.
    pub fn next_object(&mut self) -> Result<Option<Object>> {
        self.next_value(0)
    }

    fn next_value(&mut self, depth: usize) -> Result<Option<Object>> {
        if depth > MAX_NESTING {
            return Err(ExtractError::Syntax(
                "objects nested too deeply".to_string(),
            ));
        }
        let Some((pos, token)) = self.token()? else {
            return Ok(None);
        };
        let obj = match token {
            Token::Integer(i) => self.maybe_reference(i)?,
            Token::Real(r) => Object::Real(r),
            Token::Name(n) => Object::Name(n),
            Token::Str(s) => Object::Str(s),
            Token::Boolean(b) => Object::Boolean(b),
            Token::Null => Object::Null,
            Token::ArrayOpen => self.finish_array(depth)?,
            Token::DictOpen => self.finish_dict(depth)?,
            Token::ArrayClose | Token::DictClose => {
                return Err(ExtractError::Syntax(format!(
                    "unexpected closing delimiter at offset {pos}"
                )));
            }
            Token::Keyword(kw) => {
                return Err(ExtractError::Syntax(format!(
                    "unexpected keyword '{kw}' at offset {pos}"
                )));
            }
        };
        Ok(Some(obj))
    }

    /// `<int> <int> R` reads as a reference; anything else unwinds the
    /// lookahead and yields the plain integer.
    fn maybe_reference(&mut self, first: i64) -> Result<Object> {
        let Some(second) = self.token()? else {
            return Ok(Object::Integer(first));
        };
        if let (p1, Token::Integer(genno)) = &second {
            let (p1, genno) = (*p1, *genno);
            let Some(third) = self.token()? else {
                self.unread(second);
                return Ok(Object::Integer(first));
            };
            if matches!(&third.1, Token::Keyword(kw) if kw == "R")
                && (0..=u32::MAX as i64).contains(&first)
                && (0..=u16::MAX as i64).contains(&genno)
            {
                return Ok(Object::Reference(ObjRef::new(first as u32, genno as u16)));
            }
            self.unread(third);
            self.unread((p1, Token::Integer(genno)));
        } else {
            self.unread(second);
        }
        Ok(Object::Integer(first))
    }

    fn finish_array(&mut self, depth: usize) -> Result<Object> {
        let mut items = Vec::new();
        loop {
            let Some(t) = self.token()? else {
                return Err(ExtractError::UnexpectedEof);
            };
            if matches!(t.1, Token::ArrayClose) {
                return Ok(Object::Array(items));
            }
            self.unread(t);
            match self.next_value(depth + 1)? {
                Some(obj) => items.push(obj),
                None => return Err(ExtractError::UnexpectedEof),
            }
        }
    }

    fn finish_dict(&mut self, depth: usize) -> Result<Object> {
        let mut dict = Dict::new();
        loop {
            let Some((pos, token)) = self.token()? else {
                return Err(ExtractError::UnexpectedEof);
            };
            match token {
                Token::DictClose => return Ok(Object::Dict(dict)),
                Token::Name(key) => {
                    let value = self
                        .next_value(depth + 1)?
                        .ok_or(ExtractError::UnexpectedEof)?;
                    dict.insert(key, value);
                }
                _ => {
                    return Err(ExtractError::Syntax(format!(
                        "dict key must be a name (offset {pos})"
                    )));
                }
            }
        }
    }

    pub(crate) fn expect_keyword(&mut self, expected: &str) -> Result<()> {
        match self.token()? {
            Some((_, Token::Keyword(kw))) if kw == expected => Ok(()),
            Some((pos, other)) => Err(ExtractError::Syntax(format!(
                "expected '{expected}' at offset {pos}, found {other:?}"
            ))),
            None => Err(ExtractError::UnexpectedEof),
        }
    }

    pub(crate) fn expect_integer(&mut self) -> Result<i64> {
        match self.token()? {
            Some((_, Token::Integer(i))) => Ok(i),
            Some((pos, other)) => Err(ExtractError::Syntax(format!(
                "expected integer at offset {pos}, found {other:?}"
            ))),
            None => Err(ExtractError::UnexpectedEof),
        }
    }
}

/// Parses the indirect object starting at `pos` (`<id> <gen> obj ... endobj`).
///
/// Stream bodies need the document for `/Length` indirection, supplied as a
/// lookup closure; when the length is absent, indirect but unresolvable, or
/// provably wrong, the body is recovered by scanning for `endstream`.
pub fn parse_indirect_at(
    data: &Bytes,
    pos: usize,
    resolve_len: &dyn Fn(ObjRef) -> Option<i64>,
) -> Result<(ObjRef, Object)> {
    let mut parser = ObjectParser::with_pos(data, pos);
    let id = parser.expect_integer()?;
    let genno = parser.expect_integer()?;
    if !(0..=u32::MAX as i64).contains(&id) || !(0..=u16::MAX as i64).contains(&genno) {
        return Err(ExtractError::Syntax(format!(
            "invalid object header at offset {pos}"
        )));
    }
    let objref = ObjRef::new(id as u32, genno as u16);
    parser.expect_keyword("obj")?;

    // An empty body (`obj endobj`) reads as null.
    let body = match parser.token()? {
        Some(t @ (_, Token::Keyword(_))) => {
            parser.unread(t);
            Object::Null
        }
        Some(t) => {
            parser.unread(t);
            parser
                .next_value(0)?
                .ok_or(ExtractError::UnexpectedEof)?
        }
        None => return Err(ExtractError::UnexpectedEof),
    };

    match parser.token()? {
        Some((_, Token::Keyword(kw))) if kw == "stream" => {
            let Object::Dict(dict) = body else {
                return Err(ExtractError::Syntax(format!(
                    "stream without attribute dict (object {id})"
                )));
            };
            let raw = read_stream_data(data, &mut parser, &dict, resolve_len)?;
            Ok((
                objref,
                Object::Stream(Box::new(StreamObject { dict, raw })),
            ))
        }
        // `endobj` may be absent in damaged files; the body already parsed.
        _ => Ok((objref, body)),
    }
}

/// Reads the raw bytes between `stream` and `endstream`, leaving the parser
/// positioned after `endstream`.
fn read_stream_data<'a>(
    data: &'a Bytes,
    parser: &mut ObjectParser<'a>,
    dict: &Dict,
    resolve_len: &dyn Fn(ObjRef) -> Option<i64>,
) -> Result<Bytes> {
    let mut lexer = Lexer::with_pos(data, parser.pos());
    lexer.skip_eol();
    let start = lexer.pos();

    let declared = match dict.get("Length") {
        Some(Object::Integer(n)) => Some(*n),
        Some(Object::Reference(r)) => resolve_len(*r),
        _ => None,
    };

    let end = declared
        .and_then(|len| usize::try_from(len).ok())
        .map(|len| start.saturating_add(len))
        .filter(|&end| end <= data.len() && endstream_follows(data, end));
    let end = match end {
        Some(end) => end,
        None => scan_for_endstream(data, start)?,
    };

    // Position after the endstream keyword.
    let mut tail = Lexer::with_pos(data, end);
    tail.skip_whitespace();
    let after = tail.pos() + b"endstream".len();
    let mut rest = ObjectParser::with_pos(data, after.min(data.len()));
    let resume = match rest.token()? {
        Some((_, Token::Keyword(kw))) if kw == "endobj" => rest.pos(),
        Some((tpos, _)) => tpos,
        None => data.len(),
    };
    *parser = ObjectParser::with_pos(data, resume);

    Ok(data.slice(start..end))
}

fn endstream_follows(data: &[u8], mut pos: usize) -> bool {
    while pos < data.len() && crate::lexer::is_whitespace(data[pos]) {
        pos += 1;
    }
    data[pos..].starts_with(b"endstream")
}

/// Finds the next `endstream` keyword and backs off one EOL sequence.
fn scan_for_endstream(data: &[u8], start: usize) -> Result<usize> {
    let haystack = &data[start..];
    let found = haystack
        .windows(b"endstream".len())
        .position(|w| w == b"endstream")
        .ok_or_else(|| ExtractError::Syntax("missing endstream keyword".to_string()))?;
    let mut end = start + found;
    if end > start && data[end - 1] == b'\n' {
        end -= 1;
        if end > start && data[end - 1] == b'\r' {
            end -= 1;
        }
    } else if end > start && data[end - 1] == b'\r' {
        end -= 1;
    }
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(data: &[u8]) -> Object {
        ObjectParser::new(data).next_object().unwrap().unwrap()
    }

    #[test]
    fn test_reference_lookahead() {
        assert_eq!(
            parse_one(b"12 0 R"),
            Object::Reference(ObjRef::new(12, 0))
        );
        // Two integers not followed by R stay integers.
        let mut parser = ObjectParser::new(b"12 0 obj");
        assert_eq!(parser.next_object().unwrap(), Some(Object::Integer(12)));
        assert_eq!(parser.next_object().unwrap(), Some(Object::Integer(0)));
    }

    #[test]
    fn test_array_with_references() {
        let obj = parse_one(b"[1 0 R 2 0 R 7]");
        let items = obj.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Object::Reference(ObjRef::new(1, 0)));
        assert_eq!(items[2], Object::Integer(7));
    }

    #[test]
    fn test_nested_dict() {
        let obj = parse_one(b"<< /A << /B [1 2] >> /C (x) >>");
        let dict = obj.as_dict().unwrap();
        let inner = dict["A"].as_dict().unwrap();
        assert_eq!(inner["B"].as_array().unwrap().len(), 2);
        assert_eq!(dict["C"], Object::Str(b"x".to_vec()));
    }

    #[test]
    fn test_dict_key_must_be_name() {
        let mut parser = ObjectParser::new(b"<< (oops) 1 >>");
        assert!(parser.next_object().is_err());
    }

    #[test]
    fn test_indirect_plain_object() {
        let data = Bytes::from_static(b"7 0 obj\n(hello)\nendobj\n");
        let (objref, obj) = parse_indirect_at(&data, 0, &|_| None).unwrap();
        assert_eq!(objref, ObjRef::new(7, 0));
        assert_eq!(obj, Object::Str(b"hello".to_vec()));
    }

    #[test]
    fn test_indirect_stream_with_length() {
        let data = Bytes::from_static(
            b"5 0 obj\n<< /Length 11 >>\nstream\nhello world\nendstream\nendobj\n",
        );
        let (objref, obj) = parse_indirect_at(&data, 0, &|_| None).unwrap();
        assert_eq!(objref, ObjRef::new(5, 0));
        let stream = obj.as_stream().unwrap();
        assert_eq!(&stream.raw[..], b"hello world");
    }

    #[test]
    fn test_stream_with_wrong_length_rescans() {
        let data = Bytes::from_static(
            b"5 0 obj\n<< /Length 3 >>\nstream\nhello world\nendstream\nendobj\n",
        );
        let (_, obj) = parse_indirect_at(&data, 0, &|_| None).unwrap();
        assert_eq!(&obj.as_stream().unwrap().raw[..], b"hello world");
    }

    #[test]
    fn test_stream_with_indirect_length() {
        let data = Bytes::from_static(
            b"5 0 obj\n<< /Length 9 0 R >>\nstream\nabc\nendstream\nendobj\n",
        );
        let (_, obj) = parse_indirect_at(&data, 0, &|r| {
            (r == ObjRef::new(9, 0)).then_some(3)
        })
        .unwrap();
        assert_eq!(&obj.as_stream().unwrap().raw[..], b"abc");
    }

    #[test]
    fn test_empty_body_reads_null() {
        let data = Bytes::from_static(b"3 0 obj endobj");
        let (_, obj) = parse_indirect_at(&data, 0, &|_| None).unwrap();
        assert_eq!(obj, Object::Null);
    }
}

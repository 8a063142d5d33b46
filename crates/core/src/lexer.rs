//! Byte-level tokenizer for PDF syntax.
//!
//! Shared by the object parser, the content-stream parser, and the ToUnicode
//! CMap parser. Follows the character classes of ISO 32000 7.2: whitespace
//! is {NUL, TAB, LF, FF, CR, SPACE}, delimiters are `( ) < > [ ] { } / %`,
//! and `%` comments run to end of line.

use crate::error::{ExtractError, Result};

/// One lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Integer(i64),
    Real(f64),
    /// `/Name` with `#xx` escapes decoded.
    Name(String),
    /// Literal `(...)` or hex `<...>` string, already unescaped.
    Str(Vec<u8>),
    Boolean(bool),
    Null,
    ArrayOpen,
    ArrayClose,
    DictOpen,
    DictClose,
    /// Any other bareword (`obj`, `R`, `Tj`, ...) or a brace.
    Keyword(String),
}

pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\x00' | b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

pub fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

pub fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Tokenizer over a byte slice with an explicit cursor.
///
/// The cursor is exposed so callers can jump to xref offsets and read raw
/// stream bytes between tokens.
pub struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Lexer { data, pos: 0 }
    }

    pub fn with_pos(data: &'a [u8], pos: usize) -> Self {
        Lexer { data, pos }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Skips whitespace and `%` comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(b) = self.peek() {
                    if b == b'\r' || b == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Consumes one end-of-line sequence (CRLF, LF, or CR) if present.
    ///
    /// Used after the `stream` keyword, where the PDF spec requires an
    /// EOL before the raw data.
    pub fn skip_eol(&mut self) {
        match self.peek() {
            Some(b'\r') => {
                self.pos += 1;
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            Some(b'\n') => self.pos += 1,
            _ => {}
        }
    }

    /// Next token, or `None` at end of input. The returned offset is the
    /// position of the token's first byte.
    pub fn next_token(&mut self) -> Result<Option<(usize, Token)>> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        let token = match b {
            b'/' => {
                self.pos += 1;
                Token::Name(self.read_name())
            }
            b'(' => {
                self.pos += 1;
                Token::Str(self.read_literal_string(start)?)
            }
            b'<' => {
                if self.data.get(self.pos + 1) == Some(&b'<') {
                    self.pos += 2;
                    Token::DictOpen
                } else {
                    self.pos += 1;
                    Token::Str(self.read_hex_string(start)?)
                }
            }
            b'>' => {
                if self.data.get(self.pos + 1) == Some(&b'>') {
                    self.pos += 2;
                    Token::DictClose
                } else {
                    return Err(ExtractError::Lex {
                        pos: start,
                        msg: "unexpected '>'".to_string(),
                    });
                }
            }
            b'[' => {
                self.pos += 1;
                Token::ArrayOpen
            }
            b']' => {
                self.pos += 1;
                Token::ArrayClose
            }
            b'{' | b'}' => {
                self.pos += 1;
                Token::Keyword((b as char).to_string())
            }
            b')' => {
                return Err(ExtractError::Lex {
                    pos: start,
                    msg: "unmatched ')'".to_string(),
                });
            }
            _ => {
                let word = self.read_bareword();
                classify_bareword(word)
            }
        };
        Ok(Some((start, token)))
    }

    fn read_bareword(&mut self) -> &'a [u8] {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_regular(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.data[start..self.pos]
    }

    /// Name body after the `/`. A `#` followed by two hex digits decodes to
    /// one byte; a bare `#` is kept as-is.
    fn read_name(&mut self) -> String {
        let mut out = Vec::new();
        while let Some(b) = self.peek() {
            if !is_regular(b) {
                break;
            }
            if b == b'#'
                && let (Some(hi), Some(lo)) = (
                    self.data.get(self.pos + 1).copied().and_then(hex_digit),
                    self.data.get(self.pos + 2).copied().and_then(hex_digit),
                )
            {
                out.push(hi << 4 | lo);
                self.pos += 3;
            } else {
                out.push(b);
                self.pos += 1;
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Literal string body after the opening paren. Handles nested parens,
    /// the standard escapes, 1-3 digit octal escapes, line continuations,
    /// and CR/CRLF normalization to LF.
    fn read_literal_string(&mut self, start: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => {
                    let Some(esc) = self.peek() else { break };
                    self.pos += 1;
                    match esc {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'(' | b')' | b'\\' => out.push(esc),
                        b'0'..=b'7' => {
                            let mut value = (esc - b'0') as u16;
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        value = value * 8 + (d - b'0') as u16;
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            out.push(value as u8);
                        }
                        // Backslash before EOL continues the line.
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        b'\n' => {}
                        other => out.push(other),
                    }
                }
                // Unescaped EOL inside a string reads as LF.
                b'\r' => {
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                    out.push(b'\n');
                }
                _ => out.push(b),
            }
        }
        Err(ExtractError::Lex {
            pos: start,
            msg: "unterminated string".to_string(),
        })
    }

    /// Hex string body after the `<`. Whitespace and stray bytes are
    /// ignored; an odd final digit is padded with zero.
    fn read_hex_string(&mut self, start: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut pending: Option<u8> = None;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'>' {
                if let Some(hi) = pending {
                    out.push(hi << 4);
                }
                return Ok(out);
            }
            if let Some(d) = hex_digit(b) {
                match pending.take() {
                    Some(hi) => out.push(hi << 4 | d),
                    None => pending = Some(d),
                }
            }
        }
        Err(ExtractError::Lex {
            pos: start,
            msg: "unterminated hex string".to_string(),
        })
    }
}

fn classify_bareword(word: &[u8]) -> Token {
    match word {
        b"true" => return Token::Boolean(true),
        b"false" => return Token::Boolean(false),
        b"null" => return Token::Null,
        _ => {}
    }
    if let Some(token) = parse_number(word) {
        return token;
    }
    Token::Keyword(String::from_utf8_lossy(word).into_owned())
}

fn parse_number(word: &[u8]) -> Option<Token> {
    let body = match word.first() {
        Some(b'+') | Some(b'-') => &word[1..],
        _ => word,
    };
    if body.is_empty() {
        return None;
    }
    let mut dots = 0usize;
    for &b in body {
        match b {
            b'0'..=b'9' => {}
            b'.' => dots += 1,
            _ => return None,
        }
    }
    if dots > 1 || body == b"." {
        return None;
    }
    let text = std::str::from_utf8(word).ok()?;
    if dots == 0 {
        if let Ok(i) = text.parse::<i64>() {
            return Some(Token::Integer(i));
        }
    }
    text.parse::<f64>().ok().map(Token::Real)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(data: &[u8]) -> Vec<Token> {
        let mut lexer = Lexer::new(data);
        let mut out = Vec::new();
        while let Some((_, t)) = lexer.next_token().unwrap() {
            out.push(t);
        }
        out
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens(b"1 -2 +30 4. .5 -.75 16.34"),
            vec![
                Token::Integer(1),
                Token::Integer(-2),
                Token::Integer(30),
                Token::Real(4.0),
                Token::Real(0.5),
                Token::Real(-0.75),
                Token::Real(16.34),
            ]
        );
    }

    #[test]
    fn test_huge_integer_becomes_real() {
        let huge = b"99999999999999999999";
        match &tokens(huge)[0] {
            Token::Real(r) => assert!(*r > 1e19),
            other => panic!("unexpected token: {other:?}"),
        }
    }

    #[test]
    fn test_names_with_hex_escapes() {
        assert_eq!(
            tokens(b"/Type /A#42 /lime#20green /#23odd"),
            vec![
                Token::Name("Type".to_string()),
                Token::Name("AB".to_string()),
                Token::Name("lime green".to_string()),
                Token::Name("#odd".to_string()),
            ]
        );
    }

    #[test]
    fn test_literal_strings() {
        assert_eq!(
            tokens(b"(simple) (nested (parens) kept) (esc \\(x\\) \\n\\t)"),
            vec![
                Token::Str(b"simple".to_vec()),
                Token::Str(b"nested (parens) kept".to_vec()),
                Token::Str(b"esc (x) \n\t".to_vec()),
            ]
        );
    }

    #[test]
    fn test_string_octal_and_continuation() {
        assert_eq!(
            tokens(b"(\\101\\102) (a\\\nb) (\\0053)"),
            vec![
                Token::Str(b"AB".to_vec()),
                Token::Str(b"ab".to_vec()),
                Token::Str(b"\x053".to_vec()),
            ]
        );
    }

    #[test]
    fn test_string_eol_normalization() {
        assert_eq!(tokens(b"(a\r\nb\rc)"), vec![Token::Str(b"a\nb\nc".to_vec())]);
    }

    #[test]
    fn test_hex_strings() {
        assert_eq!(
            tokens(b"<48656C6C6F> <48 65 6c> <9>"),
            vec![
                Token::Str(b"Hello".to_vec()),
                Token::Str(b"Hel".to_vec()),
                Token::Str(vec![0x90]),
            ]
        );
    }

    #[test]
    fn test_dict_and_array_delimiters() {
        assert_eq!(
            tokens(b"<< /Kids [1 0 R] >>"),
            vec![
                Token::DictOpen,
                Token::Name("Kids".to_string()),
                Token::ArrayOpen,
                Token::Integer(1),
                Token::Integer(0),
                Token::Keyword("R".to_string()),
                Token::ArrayClose,
                Token::DictClose,
            ]
        );
    }

    #[test]
    fn test_comments_and_keywords() {
        assert_eq!(
            tokens(b"% header comment\ntrue false null obj\n%%EOF"),
            vec![
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Null,
                Token::Keyword("obj".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_errors() {
        let mut lexer = Lexer::new(b"(never closed");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_skip_eol_variants() {
        for (input, rest) in [
            (&b"\r\nX"[..], b'X'),
            (&b"\nY"[..], b'Y'),
            (&b"\rZ"[..], b'Z'),
        ] {
            let mut lexer = Lexer::new(input);
            lexer.skip_eol();
            assert_eq!(input[lexer.pos()], rest);
        }
    }
}

//! Error types for PDF text extraction.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading, parsing, or extracting a document.
///
/// Variants fall into three families a caller can branch on: source access
/// (`SourceNotFound`, `Read`), document parsing (everything from `Lex` to
/// `Encrypted`), and destination output (`Write`).
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The source file does not exist.
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The source file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The destination file could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The tokenizer hit an invalid byte sequence.
    #[error("lex error at offset {pos}: {msg}")]
    Lex { pos: usize, msg: String },

    /// Input ended in the middle of a token or object.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// The document structure is invalid.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// An object had an unexpected type.
    #[error("expected {expected}, got {got}")]
    Type {
        expected: &'static str,
        got: &'static str,
    },

    /// A required dictionary key is absent.
    #[error("missing required key /{0}")]
    MissingKey(&'static str),

    /// An indirect object is not present in any xref section.
    #[error("object {0} not found")]
    MissingObject(u32),

    /// No usable cross-reference table was found.
    #[error("no valid xref table")]
    NoXref,

    /// A stream filter could not decode its data.
    #[error("decode error: {0}")]
    Decode(String),

    /// The document declares encryption, which is not supported.
    #[error("encrypted documents are not supported")]
    Encrypted,
}

pub type Result<T> = std::result::Result<T, ExtractError>;

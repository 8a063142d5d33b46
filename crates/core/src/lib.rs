//! gleaner-core - PDF text extraction.
//!
//! Parses a PDF's cross-reference structure, walks its page tree in
//! document order, interprets each page's content stream, and assembles
//! plain text. The one-call entry points live in [`extract`]; the layers
//! underneath (document, pages, fonts, interpreter, devices) are public
//! for callers that need more control.

pub mod content;
pub mod device;
pub mod document;
pub mod error;
pub mod extract;
pub mod filters;
pub mod font;
pub mod interp;
pub mod lexer;
pub mod matrix;
pub mod object;
pub mod page;
pub mod parser;

pub use device::{Device, TextDevice, TextItem};
pub use document::Document;
pub use error::{ExtractError, Result};
pub use extract::{extract_text, extract_to_file};
pub use font::Font;
pub use interp::{Interpreter, TextState};
pub use object::{Dict, ObjRef, Object, StreamObject};
pub use page::{Page, PageIter};

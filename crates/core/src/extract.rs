//! Whole-document text extraction.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::device::TextDevice;
use crate::document::Document;
use crate::error::{ExtractError, Result};
use crate::interp::Interpreter;

/// Extracts the text of every page, in document order.
///
/// Each page contributes its text followed by one newline, so an N-page
/// document yields N newline-terminated segments and a page without text
/// contributes a bare newline. A document with no pages yields the empty
/// string.
pub fn extract_text(data: impl Into<Bytes>) -> Result<String> {
    let doc = Document::load(data)?;
    let mut device = TextDevice::new();
    let mut interp = Interpreter::new(&doc, &mut device);
    let mut pages = 0usize;
    for page in doc.pages() {
        interp.process_page(&page)?;
        pages += 1;
    }
    debug!("extracted {pages} page(s)");
    Ok(device.into_text())
}

/// Reads `source`, extracts its text, and writes the result to `dest` as
/// UTF-8 in one shot, replacing any existing file.
///
/// `dest` is not touched unless extraction succeeds.
pub fn extract_to_file(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();
    let data = fs::read(source).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ExtractError::SourceNotFound(source.to_path_buf()),
        _ => ExtractError::Read {
            path: source.to_path_buf(),
            source: err,
        },
    })?;
    let text = extract_text(data)?;
    fs::write(dest, text).map_err(|err| ExtractError::Write {
        path: dest.to_path_buf(),
        source: err,
    })
}

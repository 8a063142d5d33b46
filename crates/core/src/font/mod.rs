//! Font loading and glyph-to-Unicode mapping.
//!
//! A font here is only what text extraction needs: how to split string
//! bytes into character codes, and how to turn each code into Unicode
//! text. Simple fonts read one byte per code through an encoding table;
//! Type0 fonts read two-byte big-endian codes and map them through a
//! ToUnicode CMap when one is present.

pub mod encoding;
mod glyphs;
mod tounicode;

pub use tounicode::UnicodeMap;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{ExtractError, Result};
use crate::object::{Dict, Object};
use encoding::get_encoding;

/// A loaded font, reduced to its text-extraction behavior.
#[derive(Debug)]
pub struct Font {
    name: String,
    /// Two-byte big-endian character codes (Type0) instead of one byte.
    wide: bool,
    code_map: Option<FxHashMap<u8, String>>,
    to_unicode: Option<UnicodeMap>,
    /// Character codes are Unicode scalars directly.
    identity_unicode: bool,
}

impl Font {
    /// Loads a font from its resource dictionary.
    pub fn load(doc: &Document, spec: &Dict) -> Result<Font> {
        let subtype = doc
            .resolve_key(spec, "Subtype")
            .and_then(|obj| obj.as_name().ok().map(str::to_owned))
            .unwrap_or_default();
        let name = doc
            .resolve_key(spec, "BaseFont")
            .and_then(|obj| obj.as_name().ok().map(str::to_owned))
            .unwrap_or_else(|| subtype.clone());

        if subtype == "Type0" {
            Self::load_type0(doc, spec, name)
        } else {
            Ok(Self::load_simple(doc, spec, name))
        }
    }

    /// Degraded font used when loading fails: one-byte codes through the
    /// standard encoding.
    pub fn fallback() -> Font {
        Font {
            name: "unknown".to_string(),
            wide: false,
            code_map: Some(get_encoding("StandardEncoding", None)),
            to_unicode: None,
            identity_unicode: false,
        }
    }

    fn load_simple(doc: &Document, spec: &Dict, name: String) -> Font {
        let mut base = "StandardEncoding".to_string();
        let mut diffs: Option<Vec<Object>> = None;
        match doc.resolve_key(spec, "Encoding") {
            Some(Object::Name(enc)) => base = enc,
            Some(Object::Dict(enc)) => {
                if let Some(obj) = doc.resolve_key(&enc, "BaseEncoding")
                    && let Ok(enc_name) = obj.as_name()
                {
                    base = enc_name.to_string();
                }
                if let Some(obj) = doc.resolve_key(&enc, "Differences")
                    && let Ok(entries) = obj.as_array()
                {
                    diffs = Some(entries.to_vec());
                }
            }
            _ => {}
        }
        Font {
            wide: false,
            code_map: Some(get_encoding(&base, diffs.as_deref())),
            to_unicode: load_unicode_stream(doc, spec, &name),
            identity_unicode: false,
            name,
        }
    }

    fn load_type0(doc: &Document, spec: &Dict, name: String) -> Result<Font> {
        // /Encoding names the code-to-CID CMap. Identity variants need no
        // table; everything else still decodes as two-byte codes here.
        match doc.resolve_key(spec, "Encoding") {
            None => {}
            Some(obj) => match obj.as_name() {
                Ok("Identity-H" | "Identity-V" | "DLIdent-H" | "DLIdent-V") => {}
                Ok(other) => {
                    warn!("font {name}: CMap /{other} not available, reading two-byte codes")
                }
                Err(_) => {
                    warn!("font {name}: embedded CMap ignored, reading two-byte codes")
                }
            },
        }

        let descendant = descendant_dict(doc, spec)?;

        let to_unicode = load_unicode_stream(doc, spec, &name);
        let mut identity_unicode = false;
        if to_unicode.is_none()
            && let Some(Object::Name(cmap_name)) = doc.resolve_key(spec, "ToUnicode")
            && cmap_name.contains("Identity")
        {
            identity_unicode = true;
        }

        if to_unicode.is_none() && !identity_unicode {
            // Identity-coded and unregistered fonts read the CID as a
            // Unicode scalar. Registry-ordered CJK fonts would need the
            // predefined CMap tables, which are not shipped.
            match cid_coding(doc, &descendant) {
                None => identity_unicode = true,
                Some(coding) if coding == "Adobe-Identity" || coding == "Adobe-UCS" => {
                    identity_unicode = true;
                }
                Some(coding) => {
                    debug!("font {name}: no ToUnicode for CID coding {coding}");
                }
            }
        }

        Ok(Font {
            name,
            wide: true,
            code_map: None,
            to_unicode,
            identity_unicode,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Splits a string's bytes into character codes. Wide fonts drop a
    /// trailing odd byte.
    pub fn decode(&self, bytes: &[u8]) -> Vec<u32> {
        if self.wide {
            bytes
                .chunks_exact(2)
                .map(|pair| u32::from(u16::from_be_bytes([pair[0], pair[1]])))
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        }
    }

    /// Unicode text for one character code. `None` means the code has no
    /// known mapping and renders as `(cid:N)`.
    pub fn to_unicode(&self, cid: u32) -> Option<String> {
        if let Some(map) = &self.to_unicode
            && let Some(text) = map.get(cid)
        {
            return Some(text);
        }
        if self.identity_unicode {
            return char::from_u32(cid).map(String::from);
        }
        if cid <= 0xff
            && let Some(map) = &self.code_map
            && let Some(text) = map.get(&(cid as u8))
        {
            return Some(text.clone());
        }
        None
    }
}

fn load_unicode_stream(doc: &Document, spec: &Dict, name: &str) -> Option<UnicodeMap> {
    let Some(Object::Stream(stream)) = doc.resolve_key(spec, "ToUnicode") else {
        return None;
    };
    match doc.decode_stream(&stream) {
        Ok(data) => {
            let map = UnicodeMap::parse(&data);
            if map.is_empty() {
                debug!("font {name}: ToUnicode stream has no mappings");
                None
            } else {
                Some(map)
            }
        }
        Err(err) => {
            debug!("font {name}: undecodable ToUnicode stream: {err}");
            None
        }
    }
}

fn descendant_dict(doc: &Document, spec: &Dict) -> Result<Dict> {
    let list = doc
        .resolve_key(spec, "DescendantFonts")
        .ok_or(ExtractError::MissingKey("DescendantFonts"))?;
    let first = list
        .as_array()?
        .first()
        .ok_or(ExtractError::MissingKey("DescendantFonts"))?;
    Ok(doc.resolve(first)?.as_dict()?.clone())
}

/// Registry and ordering of the descendant's `/CIDSystemInfo`, joined as
/// `Registry-Ordering`.
fn cid_coding(doc: &Document, descendant: &Dict) -> Option<String> {
    let info = doc.resolve_key(descendant, "CIDSystemInfo")?;
    let info = info.as_dict().ok()?;
    let registry = doc.resolve_key(info, "Registry")?;
    let registry = registry.as_str_bytes().ok()?;
    let ordering = doc.resolve_key(info, "Ordering")?;
    let ordering = ordering.as_str_bytes().ok()?;
    Some(format!(
        "{}-{}",
        String::from_utf8_lossy(registry).trim(),
        String::from_utf8_lossy(ordering).trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_font() -> Font {
        Font {
            name: "Test".to_string(),
            wide: false,
            code_map: Some(get_encoding("WinAnsiEncoding", None)),
            to_unicode: None,
            identity_unicode: false,
        }
    }

    #[test]
    fn test_simple_decode_and_map() {
        let font = simple_font();
        assert_eq!(font.decode(b"Hi"), vec![72, 105]);
        assert_eq!(font.to_unicode(72).as_deref(), Some("H"));
        assert_eq!(font.to_unicode(105).as_deref(), Some("i"));
        assert_eq!(font.to_unicode(1), None);
    }

    #[test]
    fn test_wide_decode() {
        let font = Font {
            name: "Test".to_string(),
            wide: true,
            code_map: None,
            to_unicode: None,
            identity_unicode: true,
        };
        assert_eq!(font.decode(b"\x00A\x00B"), vec![0x41, 0x42]);
        // A trailing odd byte is dropped.
        assert_eq!(font.decode(b"\x00A\x01"), vec![0x41]);
        assert_eq!(font.to_unicode(0x41).as_deref(), Some("A"));
        assert_eq!(font.to_unicode(0x4e2d).as_deref(), Some("\u{4e2d}"));
    }

    #[test]
    fn test_tounicode_stream_wins_then_falls_back() {
        let mut font = simple_font();
        font.to_unicode = Some(UnicodeMap::parse(b"1 beginbfchar <41> <005A> endbfchar"));
        assert_eq!(font.to_unicode(65).as_deref(), Some("Z"));
        // Codes missing from the CMap still resolve through the encoding.
        assert_eq!(font.to_unicode(66).as_deref(), Some("B"));
    }

    #[test]
    fn test_unmapped_wide_code() {
        let font = Font {
            name: "Test".to_string(),
            wide: true,
            code_map: None,
            to_unicode: None,
            identity_unicode: false,
        };
        assert_eq!(font.to_unicode(100), None);
    }

    #[test]
    fn test_fallback_font() {
        let font = Font::fallback();
        assert_eq!(font.decode(b"A"), vec![65]);
        assert_eq!(font.to_unicode(65).as_deref(), Some("A"));
    }
}

//! ToUnicode CMap parsing.
//!
//! A `/ToUnicode` stream is a PostScript-flavored CMap from character
//! codes to Unicode text. Only the mapping operators matter here:
//! `bfchar` and `bfrange` carry UTF-16BE string (or glyph name)
//! destinations, `cidchar` and `cidrange` carry integer code points.
//! Codespace declarations and resource bookkeeping are skipped.

use rustc_hash::FxHashMap;

use super::encoding::name_to_unicode;
use crate::content::ContentParser;
use crate::object::Object;

/// Per-range expansion is capped at 64K code points.
const MAX_SPAN: u32 = 0xffff;

/// Code-to-text mapping built from a ToUnicode CMap.
///
/// Single mappings live in a hash map; string-destination ranges are kept
/// unexpanded and resolved by incrementing the destination at lookup time.
#[derive(Debug, Default)]
pub struct UnicodeMap {
    single: FxHashMap<u32, String>,
    ranges: Vec<BfRange>,
}

#[derive(Debug)]
struct BfRange {
    start: u32,
    end: u32,
    dst: Vec<u8>,
}

impl UnicodeMap {
    /// Parses the decoded bytes of a `/ToUnicode` stream.
    ///
    /// Malformed entries are skipped; the result may be empty.
    pub fn parse(data: &[u8]) -> UnicodeMap {
        let mut map = UnicodeMap::default();
        for op in ContentParser::new(data) {
            match op.operator.as_str() {
                "endbfchar" => map.add_bfchars(&op.operands),
                "endbfrange" => map.add_bfranges(&op.operands),
                "endcidchar" => map.add_cidchars(&op.operands),
                "endcidrange" => map.add_cidranges(&op.operands),
                _ => {}
            }
        }
        map
    }

    /// Looks up the text for a character code.
    pub fn get(&self, cid: u32) -> Option<String> {
        if let Some(text) = self.single.get(&cid) {
            return Some(text.clone());
        }
        for range in &self.ranges {
            if cid < range.start || cid > range.end {
                continue;
            }
            // Increment the low four bytes of the destination by the
            // offset into the range, keeping any prefix bytes intact.
            let vlen = range.dst.len().min(4);
            let (prefix, var) = range.dst.split_at(range.dst.len() - vlen);
            let base = var.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
            let value = base.wrapping_add(cid - range.start);
            let mut bytes = prefix.to_vec();
            bytes.extend_from_slice(&value.to_be_bytes()[4 - vlen..]);
            return Some(utf16be_to_string(&bytes));
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.ranges.is_empty()
    }

    fn add_single(&mut self, cid: u32, text: String) {
        // A nbsp destination does not replace an existing plain space.
        if text == "\u{00a0}" && self.single.get(&cid).is_some_and(|cur| cur == " ") {
            return;
        }
        self.single.insert(cid, text);
    }

    fn add_bfchars(&mut self, operands: &[Object]) {
        for pair in operands.chunks_exact(2) {
            let Object::Str(src) = &pair[0] else { continue };
            let cid = fold_cid(src);
            match &pair[1] {
                Object::Str(dst) => self.add_single(cid, utf16be_to_string(dst)),
                Object::Name(name) => {
                    if let Some(text) = name_to_unicode(name) {
                        self.add_single(cid, text);
                    }
                }
                _ => {}
            }
        }
    }

    fn add_bfranges(&mut self, operands: &[Object]) {
        for triple in operands.chunks_exact(3) {
            let (Object::Str(lo), Object::Str(hi)) = (&triple[0], &triple[1]) else {
                continue;
            };
            let start = fold_cid(lo);
            let end = fold_cid(hi);
            match &triple[2] {
                Object::Str(dst) => self.ranges.push(BfRange {
                    start,
                    end,
                    dst: dst.clone(),
                }),
                Object::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        let cid = start.wrapping_add(i as u32);
                        match item {
                            Object::Str(dst) => self.add_single(cid, utf16be_to_string(dst)),
                            Object::Name(name) => {
                                if let Some(text) = name_to_unicode(name) {
                                    self.add_single(cid, text);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Object::Name(name) => {
                    if let Some(text) = name_to_unicode(name) {
                        for cid in start..=end.min(start.saturating_add(MAX_SPAN)) {
                            self.add_single(cid, text.clone());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn add_cidchars(&mut self, operands: &[Object]) {
        for pair in operands.chunks_exact(2) {
            let (Object::Str(src), Object::Integer(code)) = (&pair[0], &pair[1]) else {
                continue;
            };
            let Some(ch) = u32::try_from(*code).ok().and_then(char::from_u32) else {
                continue;
            };
            self.add_single(fold_cid(src), ch.to_string());
        }
    }

    fn add_cidranges(&mut self, operands: &[Object]) {
        for triple in operands.chunks_exact(3) {
            let (Object::Str(lo), Object::Str(hi), Object::Integer(code)) =
                (&triple[0], &triple[1], &triple[2])
            else {
                continue;
            };
            let start = fold_cid(lo);
            let end = fold_cid(hi);
            let Ok(base) = u32::try_from(*code) else { continue };
            if end < start {
                continue;
            }
            for offset in 0..=(end - start).min(MAX_SPAN) {
                if let Some(ch) = char::from_u32(base.wrapping_add(offset)) {
                    self.add_single(start + offset, ch.to_string());
                }
            }
        }
    }
}

/// Folds a source code string into an integer, big-endian. Codes longer
/// than four bytes keep only the low four.
fn fold_cid(bytes: &[u8]) -> u32 {
    let tail = &bytes[bytes.len().saturating_sub(4)..];
    tail.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

/// Decodes UTF-16BE leniently: unpaired surrogates and a trailing odd
/// byte are dropped.
fn utf16be_to_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    char::decode_utf16(units).filter_map(|unit| unit.ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"/CIDInit /ProcSet findresource begin\n\
12 dict begin\n\
begincmap\n\
/CMapName /Adobe-Identity-UCS def\n\
2 beginbfchar\n\
<0041> <0041>\n\
<0042> <00480069>\n\
endbfchar\n\
1 beginbfrange\n\
<0060> <0065> <0061>\n\
endbfrange\n\
endcmap\n\
CMapName currentdict /CMap defineresource pop\n\
end\nend\n";

    #[test]
    fn test_parse_bfchar_and_bfrange() {
        let map = UnicodeMap::parse(SAMPLE);
        assert!(!map.is_empty());
        assert_eq!(map.get(0x41).as_deref(), Some("A"));
        assert_eq!(map.get(0x42).as_deref(), Some("Hi"));
        assert_eq!(map.get(0x60).as_deref(), Some("a"));
        assert_eq!(map.get(0x63).as_deref(), Some("d"));
        assert_eq!(map.get(0x66), None);
    }

    #[test]
    fn test_bfrange_array_destination() {
        let data = b"1 beginbfrange <0000> <0002> [<0058> <0059> <005A>] endbfrange";
        let map = UnicodeMap::parse(data);
        assert_eq!(map.get(0).as_deref(), Some("X"));
        assert_eq!(map.get(1).as_deref(), Some("Y"));
        assert_eq!(map.get(2).as_deref(), Some("Z"));
    }

    #[test]
    fn test_bfrange_increments_surrogate_pair() {
        let data = b"1 beginbfrange <0000> <0001> <D83DDE00> endbfrange";
        let map = UnicodeMap::parse(data);
        assert_eq!(map.get(0).as_deref(), Some("\u{1f600}"));
        assert_eq!(map.get(1).as_deref(), Some("\u{1f601}"));
    }

    #[test]
    fn test_cid_operators() {
        let data = b"1 begincidchar <0041> 8364 endcidchar\n\
1 begincidrange <0050> <0052> 65 endcidrange";
        let map = UnicodeMap::parse(data);
        assert_eq!(map.get(0x41).as_deref(), Some("\u{20ac}"));
        assert_eq!(map.get(0x50).as_deref(), Some("A"));
        assert_eq!(map.get(0x52).as_deref(), Some("C"));
        assert_eq!(map.get(0x53), None);
    }

    #[test]
    fn test_name_destination() {
        let data = b"2 beginbfchar <0001> /Euro <0002> /notarealglyphname endbfchar";
        let map = UnicodeMap::parse(data);
        assert_eq!(map.get(1).as_deref(), Some("\u{20ac}"));
        assert_eq!(map.get(2), None);
    }

    #[test]
    fn test_nbsp_does_not_replace_space() {
        let data = b"2 beginbfchar <0003> <0020> <0003> <00A0> endbfchar";
        let map = UnicodeMap::parse(data);
        assert_eq!(map.get(3).as_deref(), Some(" "));
    }

    #[test]
    fn test_empty_input() {
        let map = UnicodeMap::parse(b"");
        assert!(map.is_empty());
        assert_eq!(map.get(0), None);
    }
}

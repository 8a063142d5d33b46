//! Simple-font encodings and Adobe glyph naming.
//!
//! Single-byte character codes map to Unicode through the base encoding
//! tables from PDF Reference D.1, optionally patched by a font's
//! `/Differences` array. Glyph names resolve per the Adobe Glyph List
//! conventions: `uniXXXX` and `uXXXX[XX]` forms, underscore-joined
//! components, and the built-in name table in [`super::glyphs`].

use rustc_hash::FxHashMap;

use super::glyphs;
use crate::object::Object;

/// Latin character set codes per base encoding.
/// Columns are [Standard, MacRoman, WinAnsi, PDFDoc]; -1 marks an absent code.
static LATIN_ENCODINGS: &[(&str, [i16; 4])] = &[
    ("A", [65, 65, 65, 65]),
    ("AE", [225, 174, 198, 198]),
    ("Aacute", [-1, 231, 193, 193]),
    ("Acircumflex", [-1, 229, 194, 194]),
    ("Adieresis", [-1, 128, 196, 196]),
    ("Agrave", [-1, 203, 192, 192]),
    ("Aring", [-1, 129, 197, 197]),
    ("Atilde", [-1, 204, 195, 195]),
    ("B", [66, 66, 66, 66]),
    ("C", [67, 67, 67, 67]),
    ("Ccedilla", [-1, 130, 199, 199]),
    ("D", [68, 68, 68, 68]),
    ("E", [69, 69, 69, 69]),
    ("Eacute", [-1, 131, 201, 201]),
    ("Ecircumflex", [-1, 230, 202, 202]),
    ("Edieresis", [-1, 232, 203, 203]),
    ("Egrave", [-1, 233, 200, 200]),
    ("Eth", [-1, -1, 208, 208]),
    ("Euro", [-1, -1, 128, 160]),
    ("F", [70, 70, 70, 70]),
    ("G", [71, 71, 71, 71]),
    ("H", [72, 72, 72, 72]),
    ("I", [73, 73, 73, 73]),
    ("Iacute", [-1, 234, 205, 205]),
    ("Icircumflex", [-1, 235, 206, 206]),
    ("Idieresis", [-1, 236, 207, 207]),
    ("Igrave", [-1, 237, 204, 204]),
    ("J", [74, 74, 74, 74]),
    ("K", [75, 75, 75, 75]),
    ("L", [76, 76, 76, 76]),
    ("Lslash", [232, -1, -1, 149]),
    ("M", [77, 77, 77, 77]),
    ("N", [78, 78, 78, 78]),
    ("Ntilde", [-1, 132, 209, 209]),
    ("O", [79, 79, 79, 79]),
    ("OE", [234, 206, 140, 150]),
    ("Oacute", [-1, 238, 211, 211]),
    ("Ocircumflex", [-1, 239, 212, 212]),
    ("Odieresis", [-1, 133, 214, 214]),
    ("Ograve", [-1, 241, 210, 210]),
    ("Oslash", [233, 175, 216, 216]),
    ("Otilde", [-1, 205, 213, 213]),
    ("P", [80, 80, 80, 80]),
    ("Q", [81, 81, 81, 81]),
    ("R", [82, 82, 82, 82]),
    ("S", [83, 83, 83, 83]),
    ("Scaron", [-1, -1, 138, 151]),
    ("T", [84, 84, 84, 84]),
    ("Thorn", [-1, -1, 222, 222]),
    ("U", [85, 85, 85, 85]),
    ("Uacute", [-1, 242, 218, 218]),
    ("Ucircumflex", [-1, 243, 219, 219]),
    ("Udieresis", [-1, 134, 220, 220]),
    ("Ugrave", [-1, 244, 217, 217]),
    ("V", [86, 86, 86, 86]),
    ("W", [87, 87, 87, 87]),
    ("X", [88, 88, 88, 88]),
    ("Y", [89, 89, 89, 89]),
    ("Yacute", [-1, -1, 221, 221]),
    ("Ydieresis", [-1, 217, 159, 152]),
    ("Z", [90, 90, 90, 90]),
    ("Zcaron", [-1, -1, 142, 153]),
    ("a", [97, 97, 97, 97]),
    ("aacute", [-1, 135, 225, 225]),
    ("acircumflex", [-1, 137, 226, 226]),
    ("acute", [194, 171, 180, 180]),
    ("adieresis", [-1, 138, 228, 228]),
    ("ae", [241, 190, 230, 230]),
    ("agrave", [-1, 136, 224, 224]),
    ("ampersand", [38, 38, 38, 38]),
    ("aring", [-1, 140, 229, 229]),
    ("asciicircum", [94, 94, 94, 94]),
    ("asciitilde", [126, 126, 126, 126]),
    ("asterisk", [42, 42, 42, 42]),
    ("at", [64, 64, 64, 64]),
    ("atilde", [-1, 139, 227, 227]),
    ("b", [98, 98, 98, 98]),
    ("backslash", [92, 92, 92, 92]),
    ("bar", [124, 124, 124, 124]),
    ("braceleft", [123, 123, 123, 123]),
    ("braceright", [125, 125, 125, 125]),
    ("bracketleft", [91, 91, 91, 91]),
    ("bracketright", [93, 93, 93, 93]),
    ("breve", [198, 249, -1, 24]),
    ("brokenbar", [-1, -1, 166, 166]),
    ("bullet", [183, 165, 149, 128]),
    ("c", [99, 99, 99, 99]),
    ("caron", [207, 255, -1, 25]),
    ("ccedilla", [-1, 141, 231, 231]),
    ("cedilla", [203, 252, 184, 184]),
    ("cent", [162, 162, 162, 162]),
    ("circumflex", [195, 246, 136, 26]),
    ("colon", [58, 58, 58, 58]),
    ("comma", [44, 44, 44, 44]),
    ("copyright", [-1, 169, 169, 169]),
    ("currency", [168, 219, 164, 164]),
    ("d", [100, 100, 100, 100]),
    ("dagger", [178, 160, 134, 129]),
    ("daggerdbl", [179, 224, 135, 130]),
    ("degree", [-1, 161, 176, 176]),
    ("dieresis", [200, 172, 168, 168]),
    ("divide", [-1, 214, 247, 247]),
    ("dollar", [36, 36, 36, 36]),
    ("dotaccent", [199, 250, -1, 27]),
    ("dotlessi", [245, 245, -1, 154]),
    ("e", [101, 101, 101, 101]),
    ("eacute", [-1, 142, 233, 233]),
    ("ecircumflex", [-1, 144, 234, 234]),
    ("edieresis", [-1, 145, 235, 235]),
    ("egrave", [-1, 143, 232, 232]),
    ("eight", [56, 56, 56, 56]),
    ("ellipsis", [188, 201, 133, 131]),
    ("emdash", [208, 209, 151, 132]),
    ("endash", [177, 208, 150, 133]),
    ("equal", [61, 61, 61, 61]),
    ("eth", [-1, -1, 240, 240]),
    ("exclam", [33, 33, 33, 33]),
    ("exclamdown", [161, 193, 161, 161]),
    ("f", [102, 102, 102, 102]),
    ("fi", [174, 222, -1, 147]),
    ("five", [53, 53, 53, 53]),
    ("fl", [175, 223, -1, 148]),
    ("florin", [166, 196, 131, 134]),
    ("four", [52, 52, 52, 52]),
    ("fraction", [164, 218, -1, 135]),
    ("g", [103, 103, 103, 103]),
    ("germandbls", [251, 167, 223, 223]),
    ("grave", [193, 96, 96, 96]),
    ("greater", [62, 62, 62, 62]),
    ("guillemotleft", [171, 199, 171, 171]),
    ("guillemotright", [187, 200, 187, 187]),
    ("guilsinglleft", [172, 220, 139, 136]),
    ("guilsinglright", [173, 221, 155, 137]),
    ("h", [104, 104, 104, 104]),
    ("hungarumlaut", [205, 253, -1, 28]),
    ("hyphen", [45, 45, 45, 45]),
    ("i", [105, 105, 105, 105]),
    ("iacute", [-1, 146, 237, 237]),
    ("icircumflex", [-1, 148, 238, 238]),
    ("idieresis", [-1, 149, 239, 239]),
    ("igrave", [-1, 147, 236, 236]),
    ("j", [106, 106, 106, 106]),
    ("k", [107, 107, 107, 107]),
    ("l", [108, 108, 108, 108]),
    ("less", [60, 60, 60, 60]),
    ("logicalnot", [-1, 194, 172, 172]),
    ("lslash", [248, -1, -1, 155]),
    ("m", [109, 109, 109, 109]),
    ("macron", [197, 248, 175, 175]),
    ("minus", [-1, -1, -1, 138]),
    ("mu", [-1, 181, 181, 181]),
    ("multiply", [-1, -1, 215, 215]),
    ("n", [110, 110, 110, 110]),
    ("nbspace", [-1, 202, 160, -1]),
    ("nine", [57, 57, 57, 57]),
    ("ntilde", [-1, 150, 241, 241]),
    ("numbersign", [35, 35, 35, 35]),
    ("o", [111, 111, 111, 111]),
    ("oacute", [-1, 151, 243, 243]),
    ("ocircumflex", [-1, 153, 244, 244]),
    ("odieresis", [-1, 154, 246, 246]),
    ("oe", [250, 207, 156, 156]),
    ("ogonek", [206, 254, -1, 29]),
    ("ograve", [-1, 152, 242, 242]),
    ("one", [49, 49, 49, 49]),
    ("onehalf", [-1, -1, 189, 189]),
    ("onequarter", [-1, -1, 188, 188]),
    ("onesuperior", [-1, -1, 185, 185]),
    ("ordfeminine", [227, 187, 170, 170]),
    ("ordmasculine", [235, 188, 186, 186]),
    ("oslash", [249, 191, 248, 248]),
    ("otilde", [-1, 155, 245, 245]),
    ("p", [112, 112, 112, 112]),
    ("paragraph", [182, 166, 182, 182]),
    ("parenleft", [40, 40, 40, 40]),
    ("parenright", [41, 41, 41, 41]),
    ("percent", [37, 37, 37, 37]),
    ("period", [46, 46, 46, 46]),
    ("periodcentered", [180, 225, 183, 183]),
    ("perthousand", [189, 228, 137, 139]),
    ("plus", [43, 43, 43, 43]),
    ("plusminus", [-1, 177, 177, 177]),
    ("q", [113, 113, 113, 113]),
    ("question", [63, 63, 63, 63]),
    ("questiondown", [191, 192, 191, 191]),
    ("quotedbl", [34, 34, 34, 34]),
    ("quotedblbase", [185, 227, 132, 140]),
    ("quotedblleft", [170, 210, 147, 141]),
    ("quotedblright", [186, 211, 148, 142]),
    ("quoteleft", [96, 212, 145, 143]),
    ("quoteright", [39, 213, 146, 144]),
    ("quotesinglbase", [184, 226, 130, 145]),
    ("quotesingle", [169, 39, 39, 39]),
    ("r", [114, 114, 114, 114]),
    ("registered", [-1, 168, 174, 174]),
    ("ring", [202, 251, -1, 30]),
    ("s", [115, 115, 115, 115]),
    ("scaron", [-1, -1, 154, 157]),
    ("section", [167, 164, 167, 167]),
    ("semicolon", [59, 59, 59, 59]),
    ("seven", [55, 55, 55, 55]),
    ("six", [54, 54, 54, 54]),
    ("slash", [47, 47, 47, 47]),
    ("space", [32, 32, 32, 32]),
    ("sterling", [163, 163, 163, 163]),
    ("t", [116, 116, 116, 116]),
    ("thorn", [-1, -1, 254, 254]),
    ("three", [51, 51, 51, 51]),
    ("threequarters", [-1, -1, 190, 190]),
    ("threesuperior", [-1, -1, 179, 179]),
    ("tilde", [196, 247, 152, 31]),
    ("trademark", [-1, 170, 153, 146]),
    ("two", [50, 50, 50, 50]),
    ("twosuperior", [-1, -1, 178, 178]),
    ("u", [117, 117, 117, 117]),
    ("uacute", [-1, 156, 250, 250]),
    ("ucircumflex", [-1, 158, 251, 251]),
    ("udieresis", [-1, 159, 252, 252]),
    ("ugrave", [-1, 157, 249, 249]),
    ("underscore", [95, 95, 95, 95]),
    ("v", [118, 118, 118, 118]),
    ("w", [119, 119, 119, 119]),
    ("x", [120, 120, 120, 120]),
    ("y", [121, 121, 121, 121]),
    ("yacute", [-1, -1, 253, 253]),
    ("ydieresis", [-1, 216, 255, 255]),
    ("yen", [165, 180, 165, 165]),
    ("z", [122, 122, 122, 122]),
    ("zcaron", [-1, -1, 158, 158]),
    ("zero", [48, 48, 48, 48]),
];

fn column(base: &str) -> usize {
    match base {
        "MacRomanEncoding" => 1,
        "WinAnsiEncoding" => 2,
        "PDFDocEncoding" => 3,
        // StandardEncoding, and the fallback for unrecognized names.
        _ => 0,
    }
}

/// Builds a code-to-text map for a named base encoding, patched by an
/// optional `/Differences` array.
///
/// A `/Differences` array alternates code positions and glyph names: each
/// integer sets the position for the names that follow, and each name
/// claims the current position and advances it by one. Entries that are
/// neither integers nor names, and names that resolve to nothing, are
/// skipped without disturbing the run.
pub fn get_encoding(base: &str, differences: Option<&[Object]>) -> FxHashMap<u8, String> {
    let col = column(base);
    let mut map = FxHashMap::default();
    for &(glyph, codes) in LATIN_ENCODINGS {
        let code = codes[col];
        if code < 0 {
            continue;
        }
        if let Some(text) = name_to_unicode(glyph) {
            map.insert(code as u8, text);
        }
    }
    if let Some(diffs) = differences {
        let mut at: Option<u8> = None;
        for entry in diffs {
            match entry {
                Object::Integer(n) => at = u8::try_from(*n).ok(),
                Object::Name(glyph) => {
                    if let Some(code) = at {
                        if let Some(text) = name_to_unicode(glyph) {
                            map.insert(code, text);
                        }
                        at = code.checked_add(1);
                    }
                }
                _ => {}
            }
        }
    }
    map
}

/// Resolves an Adobe glyph name to its Unicode text.
///
/// Applies the glyph naming convention: a suffix after `.` is stripped,
/// underscore-joined components resolve independently, and each component
/// is tried as `uni` + 4N hex digits (UTF-16 code units, surrogates
/// rejected), as `u` + 4 to 6 hex digits, and finally against the built-in
/// name table.
pub fn name_to_unicode(name: &str) -> Option<String> {
    let name = match name.find('.') {
        Some(dot) => &name[..dot],
        None => name,
    };
    if name.is_empty() || name == "notdef" {
        return None;
    }
    let mut out = String::new();
    for part in name.split('_') {
        out.push_str(&decode_component(part)?);
    }
    Some(out)
}

fn decode_component(part: &str) -> Option<String> {
    if let Some(hex) = part.strip_prefix("uni")
        && hex.len() >= 4
        && hex.len().is_multiple_of(4)
        && hex.bytes().all(|b| b.is_ascii_hexdigit())
    {
        let mut out = String::new();
        for unit in hex.as_bytes().chunks_exact(4) {
            let digits = std::str::from_utf8(unit).ok()?;
            let cp = u32::from_str_radix(digits, 16).ok()?;
            if (0xd800..=0xdfff).contains(&cp) {
                return None;
            }
            out.push(char::from_u32(cp)?);
        }
        return Some(out);
    }

    if let Some(hex) = part.strip_prefix('u')
        && (4..=6).contains(&hex.len())
        && hex.bytes().all(|b| b.is_ascii_hexdigit())
    {
        let cp = u32::from_str_radix(hex, 16).ok()?;
        return Some(char::from_u32(cp)?.to_string());
    }

    glyphs::glyph_to_char(part).map(|ch| ch.to_string())
}

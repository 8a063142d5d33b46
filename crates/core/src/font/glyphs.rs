//! Built-in Adobe glyph name table.
//!
//! Covers the Latin character set from PDF Reference D.1 plus the ligature,
//! Greek, and math/symbol names that commonly appear in `/Differences`
//! arrays. Names outside this table can still resolve through the `uniXXXX`
//! and `uXXXX` forms in [`super::encoding::name_to_unicode`].

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

static GLYPHS: &[(&str, char)] = &[
    // Latin set (PDF Reference D.1)
    ("A", 'A'),
    ("AE", '\u{00c6}'),
    ("Aacute", '\u{00c1}'),
    ("Acircumflex", '\u{00c2}'),
    ("Adieresis", '\u{00c4}'),
    ("Agrave", '\u{00c0}'),
    ("Aring", '\u{00c5}'),
    ("Atilde", '\u{00c3}'),
    ("B", 'B'),
    ("C", 'C'),
    ("Ccedilla", '\u{00c7}'),
    ("D", 'D'),
    ("E", 'E'),
    ("Eacute", '\u{00c9}'),
    ("Ecircumflex", '\u{00ca}'),
    ("Edieresis", '\u{00cb}'),
    ("Egrave", '\u{00c8}'),
    ("Eth", '\u{00d0}'),
    ("Euro", '\u{20ac}'),
    ("F", 'F'),
    ("G", 'G'),
    ("H", 'H'),
    ("I", 'I'),
    ("Iacute", '\u{00cd}'),
    ("Icircumflex", '\u{00ce}'),
    ("Idieresis", '\u{00cf}'),
    ("Igrave", '\u{00cc}'),
    ("J", 'J'),
    ("K", 'K'),
    ("L", 'L'),
    ("Lslash", '\u{0141}'),
    ("M", 'M'),
    ("N", 'N'),
    ("Ntilde", '\u{00d1}'),
    ("O", 'O'),
    ("OE", '\u{0152}'),
    ("Oacute", '\u{00d3}'),
    ("Ocircumflex", '\u{00d4}'),
    ("Odieresis", '\u{00d6}'),
    ("Ograve", '\u{00d2}'),
    ("Oslash", '\u{00d8}'),
    ("Otilde", '\u{00d5}'),
    ("P", 'P'),
    ("Q", 'Q'),
    ("R", 'R'),
    ("S", 'S'),
    ("Scaron", '\u{0160}'),
    ("T", 'T'),
    ("Thorn", '\u{00de}'),
    ("U", 'U'),
    ("Uacute", '\u{00da}'),
    ("Ucircumflex", '\u{00db}'),
    ("Udieresis", '\u{00dc}'),
    ("Ugrave", '\u{00d9}'),
    ("V", 'V'),
    ("W", 'W'),
    ("X", 'X'),
    ("Y", 'Y'),
    ("Yacute", '\u{00dd}'),
    ("Ydieresis", '\u{0178}'),
    ("Z", 'Z'),
    ("Zcaron", '\u{017d}'),
    ("a", 'a'),
    ("aacute", '\u{00e1}'),
    ("acircumflex", '\u{00e2}'),
    ("acute", '\u{00b4}'),
    ("adieresis", '\u{00e4}'),
    ("ae", '\u{00e6}'),
    ("agrave", '\u{00e0}'),
    ("ampersand", '&'),
    ("aring", '\u{00e5}'),
    ("asciicircum", '^'),
    ("asciitilde", '~'),
    ("asterisk", '*'),
    ("at", '@'),
    ("atilde", '\u{00e3}'),
    ("b", 'b'),
    ("backslash", '\\'),
    ("bar", '|'),
    ("braceleft", '{'),
    ("braceright", '}'),
    ("bracketleft", '['),
    ("bracketright", ']'),
    ("breve", '\u{02d8}'),
    ("brokenbar", '\u{00a6}'),
    ("bullet", '\u{2022}'),
    ("c", 'c'),
    ("caron", '\u{02c7}'),
    ("ccedilla", '\u{00e7}'),
    ("cedilla", '\u{00b8}'),
    ("cent", '\u{00a2}'),
    ("circumflex", '\u{02c6}'),
    ("colon", ':'),
    ("comma", ','),
    ("copyright", '\u{00a9}'),
    ("currency", '\u{00a4}'),
    ("d", 'd'),
    ("dagger", '\u{2020}'),
    ("daggerdbl", '\u{2021}'),
    ("degree", '\u{00b0}'),
    ("dieresis", '\u{00a8}'),
    ("divide", '\u{00f7}'),
    ("dollar", '$'),
    ("dotaccent", '\u{02d9}'),
    ("dotlessi", '\u{0131}'),
    ("e", 'e'),
    ("eacute", '\u{00e9}'),
    ("ecircumflex", '\u{00ea}'),
    ("edieresis", '\u{00eb}'),
    ("egrave", '\u{00e8}'),
    ("eight", '8'),
    ("ellipsis", '\u{2026}'),
    ("emdash", '\u{2014}'),
    ("endash", '\u{2013}'),
    ("equal", '='),
    ("eth", '\u{00f0}'),
    ("exclam", '!'),
    ("exclamdown", '\u{00a1}'),
    ("f", 'f'),
    ("fi", '\u{fb01}'),
    ("five", '5'),
    ("fl", '\u{fb02}'),
    ("florin", '\u{0192}'),
    ("four", '4'),
    ("fraction", '\u{2044}'),
    ("g", 'g'),
    ("germandbls", '\u{00df}'),
    ("grave", '`'),
    ("greater", '>'),
    ("guillemotleft", '\u{00ab}'),
    ("guillemotright", '\u{00bb}'),
    ("guilsinglleft", '\u{2039}'),
    ("guilsinglright", '\u{203a}'),
    ("h", 'h'),
    ("hungarumlaut", '\u{02dd}'),
    ("hyphen", '-'),
    ("i", 'i'),
    ("iacute", '\u{00ed}'),
    ("icircumflex", '\u{00ee}'),
    ("idieresis", '\u{00ef}'),
    ("igrave", '\u{00ec}'),
    ("j", 'j'),
    ("k", 'k'),
    ("l", 'l'),
    ("less", '<'),
    ("logicalnot", '\u{00ac}'),
    ("lslash", '\u{0142}'),
    ("m", 'm'),
    ("macron", '\u{00af}'),
    ("minus", '\u{2212}'),
    ("mu", '\u{00b5}'),
    ("multiply", '\u{00d7}'),
    ("n", 'n'),
    ("nbspace", '\u{00a0}'),
    ("nine", '9'),
    ("ntilde", '\u{00f1}'),
    ("numbersign", '#'),
    ("o", 'o'),
    ("oacute", '\u{00f3}'),
    ("ocircumflex", '\u{00f4}'),
    ("odieresis", '\u{00f6}'),
    ("oe", '\u{0153}'),
    ("ogonek", '\u{02db}'),
    ("ograve", '\u{00f2}'),
    ("one", '1'),
    ("onehalf", '\u{00bd}'),
    ("onequarter", '\u{00bc}'),
    ("onesuperior", '\u{00b9}'),
    ("ordfeminine", '\u{00aa}'),
    ("ordmasculine", '\u{00ba}'),
    ("oslash", '\u{00f8}'),
    ("otilde", '\u{00f5}'),
    ("p", 'p'),
    ("paragraph", '\u{00b6}'),
    ("parenleft", '('),
    ("parenright", ')'),
    ("percent", '%'),
    ("period", '.'),
    ("periodcentered", '\u{00b7}'),
    ("perthousand", '\u{2030}'),
    ("plus", '+'),
    ("plusminus", '\u{00b1}'),
    ("q", 'q'),
    ("question", '?'),
    ("questiondown", '\u{00bf}'),
    ("quotedbl", '"'),
    ("quotedblbase", '\u{201e}'),
    ("quotedblleft", '\u{201c}'),
    ("quotedblright", '\u{201d}'),
    ("quoteleft", '\u{2018}'),
    ("quoteright", '\u{2019}'),
    ("quotesinglbase", '\u{201a}'),
    ("quotesingle", '\''),
    ("r", 'r'),
    ("registered", '\u{00ae}'),
    ("ring", '\u{02da}'),
    ("s", 's'),
    ("scaron", '\u{0161}'),
    ("section", '\u{00a7}'),
    ("semicolon", ';'),
    ("seven", '7'),
    ("six", '6'),
    ("slash", '/'),
    ("space", ' '),
    ("sterling", '\u{00a3}'),
    ("t", 't'),
    ("thorn", '\u{00fe}'),
    ("three", '3'),
    ("threequarters", '\u{00be}'),
    ("threesuperior", '\u{00b3}'),
    ("tilde", '\u{02dc}'),
    ("trademark", '\u{2122}'),
    ("two", '2'),
    ("twosuperior", '\u{00b2}'),
    ("u", 'u'),
    ("uacute", '\u{00fa}'),
    ("ucircumflex", '\u{00fb}'),
    ("udieresis", '\u{00fc}'),
    ("ugrave", '\u{00f9}'),
    ("underscore", '_'),
    ("v", 'v'),
    ("w", 'w'),
    ("x", 'x'),
    ("y", 'y'),
    ("yacute", '\u{00fd}'),
    ("ydieresis", '\u{00ff}'),
    ("yen", '\u{00a5}'),
    ("z", 'z'),
    ("zcaron", '\u{017e}'),
    ("zero", '0'),
    // Ligatures
    ("ff", '\u{fb00}'),
    ("ffi", '\u{fb03}'),
    ("ffl", '\u{fb04}'),
    ("dotlessj", '\u{0237}'),
    // Greek (Symbol-style fonts encode these through /Differences)
    ("Alpha", '\u{0391}'),
    ("Beta", '\u{0392}'),
    ("Gamma", '\u{0393}'),
    ("Delta", '\u{0394}'),
    ("Epsilon", '\u{0395}'),
    ("Zeta", '\u{0396}'),
    ("Eta", '\u{0397}'),
    ("Theta", '\u{0398}'),
    ("Iota", '\u{0399}'),
    ("Kappa", '\u{039a}'),
    ("Lambda", '\u{039b}'),
    ("Mu", '\u{039c}'),
    ("Nu", '\u{039d}'),
    ("Xi", '\u{039e}'),
    ("Omicron", '\u{039f}'),
    ("Pi", '\u{03a0}'),
    ("Rho", '\u{03a1}'),
    ("Sigma", '\u{03a3}'),
    ("Tau", '\u{03a4}'),
    ("Upsilon", '\u{03a5}'),
    ("Phi", '\u{03a6}'),
    ("Chi", '\u{03a7}'),
    ("Psi", '\u{03a8}'),
    ("Omega", '\u{03a9}'),
    ("alpha", '\u{03b1}'),
    ("beta", '\u{03b2}'),
    ("gamma", '\u{03b3}'),
    ("delta", '\u{03b4}'),
    ("epsilon", '\u{03b5}'),
    ("zeta", '\u{03b6}'),
    ("eta", '\u{03b7}'),
    ("theta", '\u{03b8}'),
    ("iota", '\u{03b9}'),
    ("kappa", '\u{03ba}'),
    ("lambda", '\u{03bb}'),
    ("mugreek", '\u{03bc}'),
    ("nu", '\u{03bd}'),
    ("xi", '\u{03be}'),
    ("omicron", '\u{03bf}'),
    ("pi", '\u{03c0}'),
    ("rho", '\u{03c1}'),
    ("sigma", '\u{03c3}'),
    ("sigma1", '\u{03c2}'),
    ("tau", '\u{03c4}'),
    ("upsilon", '\u{03c5}'),
    ("phi", '\u{03c6}'),
    ("chi", '\u{03c7}'),
    ("psi", '\u{03c8}'),
    ("omega", '\u{03c9}'),
    // Math and arrows
    ("approxequal", '\u{2248}'),
    ("arrowdown", '\u{2193}'),
    ("arrowleft", '\u{2190}'),
    ("arrowright", '\u{2192}'),
    ("arrowup", '\u{2191}'),
    ("greaterequal", '\u{2265}'),
    ("infinity", '\u{221e}'),
    ("integral", '\u{222b}'),
    ("lessequal", '\u{2264}'),
    ("lozenge", '\u{25ca}'),
    ("notequal", '\u{2260}'),
    ("partialdiff", '\u{2202}'),
    ("product", '\u{220f}'),
    ("radical", '\u{221a}'),
    ("summation", '\u{2211}'),
];

static GLYPH_TO_CHAR: LazyLock<FxHashMap<&'static str, char>> =
    LazyLock::new(|| GLYPHS.iter().copied().collect());

/// Looks up a glyph name in the built-in table.
pub fn glyph_to_char(name: &str) -> Option<char> {
    GLYPH_TO_CHAR.get(name).copied()
}

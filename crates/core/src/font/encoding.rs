//! Simple-font encodings and glyph-name resolution.
//!
//! Glyph names follow the Adobe Glyph List conventions: `uniXXXX`,
//! `uXXXX[XX]`, ligatures joined with `_`, and variant suffixes after `.`.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

/// Upper half (0x80..=0xFF) of MacRomanEncoding.
const MAC_ROMAN_HIGH: &str = "ÄÅÇÉÑÖÜáàâäãåçéèêëíìîïñóòôöõúùûü†°¢£§•¶ß®©™´¨≠ÆØ∞±≤≥¥µ∂∑∏π∫ªºΩæø\
¿¡¬√ƒ≈∆«»…\u{a0}ÀÃÕŒœ–—“”‘’÷◊ÿŸ⁄€‹›ﬁﬂ‡·‚„‰ÂÊÁËÈÍÎÏÌÓÔ\u{f8ff}ÒÚÛÙıˆ˜¯˘˙˚¸˝˛ˇ";

/// 0x80..=0x9F of WinAnsiEncoding; unassigned slots are `None`.
const WIN_ANSI_80: [Option<char>; 32] = [
    Some('€'), None, Some('‚'), Some('ƒ'), Some('„'), Some('…'), Some('†'), Some('‡'),
    Some('ˆ'), Some('‰'), Some('Š'), Some('‹'), Some('Œ'), None, Some('Ž'), None,
    None, Some('‘'), Some('’'), Some('“'), Some('”'), Some('•'), Some('–'), Some('—'),
    Some('˜'), Some('™'), Some('š'), Some('›'), Some('œ'), None, Some('ž'), Some('Ÿ'),
];

/// Adobe glyph names that do not follow the `uniXXXX` pattern.
const GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '), ("exclam", '!'), ("quotedbl", '"'), ("numbersign", '#'),
    ("dollar", '$'), ("percent", '%'), ("ampersand", '&'), ("quotesingle", '\''),
    ("quoteright", '’'), ("parenleft", '('), ("parenright", ')'), ("asterisk", '*'),
    ("plus", '+'), ("comma", ','), ("hyphen", '-'), ("period", '.'), ("slash", '/'),
    ("zero", '0'), ("one", '1'), ("two", '2'), ("three", '3'), ("four", '4'),
    ("five", '5'), ("six", '6'), ("seven", '7'), ("eight", '8'), ("nine", '9'),
    ("colon", ':'), ("semicolon", ';'), ("less", '<'), ("equal", '='), ("greater", '>'),
    ("question", '?'), ("at", '@'), ("bracketleft", '['), ("backslash", '\\'),
    ("bracketright", ']'), ("asciicircum", '^'), ("underscore", '_'), ("grave", '`'),
    ("quoteleft", '‘'), ("braceleft", '{'), ("bar", '|'), ("braceright", '}'),
    ("asciitilde", '~'), ("exclamdown", '¡'), ("cent", '¢'), ("sterling", '£'),
    ("fraction", '⁄'), ("yen", '¥'), ("florin", 'ƒ'), ("section", '§'),
    ("currency", '¤'), ("quotedblleft", '“'), ("guillemotleft", '«'),
    ("guilsinglleft", '‹'), ("guilsinglright", '›'), ("fi", 'ﬁ'), ("fl", 'ﬂ'),
    ("endash", '–'), ("dagger", '†'), ("daggerdbl", '‡'), ("periodcentered", '·'),
    ("paragraph", '¶'), ("bullet", '•'), ("quotesinglbase", '‚'),
    ("quotedblbase", '„'), ("quotedblright", '”'), ("guillemotright", '»'),
    ("ellipsis", '…'), ("perthousand", '‰'), ("questiondown", '¿'), ("acute", '´'),
    ("circumflex", 'ˆ'), ("tilde", '˜'), ("macron", '¯'), ("breve", '˘'),
    ("dotaccent", '˙'), ("dieresis", '¨'), ("ring", '˚'), ("cedilla", '¸'),
    ("hungarumlaut", '˝'), ("ogonek", '˛'), ("caron", 'ˇ'), ("emdash", '—'),
    ("AE", 'Æ'), ("ae", 'æ'), ("ordfeminine", 'ª'), ("ordmasculine", 'º'),
    ("Lslash", 'Ł'), ("lslash", 'ł'), ("Oslash", 'Ø'), ("oslash", 'ø'),
    ("OE", 'Œ'), ("oe", 'œ'), ("dotlessi", 'ı'), ("germandbls", 'ß'),
    ("Euro", '€'), ("trademark", '™'), ("copyright", '©'), ("registered", '®'),
    ("degree", '°'), ("plusminus", '±'), ("multiply", '×'), ("divide", '÷'),
    ("mu", 'µ'), ("logicalnot", '¬'), ("brokenbar", '¦'), ("onehalf", '½'),
    ("onequarter", '¼'), ("threequarters", '¾'), ("onesuperior", '¹'),
    ("twosuperior", '²'), ("threesuperior", '³'), ("Eth", 'Ð'), ("eth", 'ð'),
    ("Thorn", 'Þ'), ("thorn", 'þ'), ("nbspace", '\u{a0}'), ("sfthyphen", '\u{ad}'),
    ("minus", '−'), ("notequal", '≠'), ("lessequal", '≤'), ("greaterequal", '≥'),
    ("infinity", '∞'), ("partialdiff", '∂'), ("summation", '∑'), ("product", '∏'),
    ("pi", 'π'), ("integral", '∫'), ("Omega", 'Ω'), ("radical", '√'),
    ("approxequal", '≈'), ("Delta", '∆'), ("lozenge", '◊'), ("Scaron", 'Š'),
    ("scaron", 'š'), ("Zcaron", 'Ž'), ("zcaron", 'ž'), ("Ydieresis", 'Ÿ'),
    ("ff", 'ﬀ'), ("ffi", 'ﬃ'), ("ffl", 'ﬄ'),
];

/// Accent suffixes used to spell Latin-1 letters (`Aacute`, `ccedilla`, ...).
const ACCENTED: &[(&str, &str, &str)] = &[
    ("grave", "AEIOU", "ÀÈÌÒÙ"),
    ("acute", "AEIOUY", "ÁÉÍÓÚÝ"),
    ("circumflex", "AEIOU", "ÂÊÎÔÛ"),
    ("tilde", "ANO", "ÃÑÕ"),
    ("dieresis", "AEIOU", "ÄËÏÖÜ"),
    ("ring", "A", "Å"),
    ("cedilla", "C", "Ç"),
];

static GLYPH_TO_CHAR: LazyLock<FxHashMap<String, char>> = LazyLock::new(|| {
    let mut map: FxHashMap<String, char> = GLYPH_NAMES
        .iter()
        .map(|&(name, ch)| (name.to_string(), ch))
        .collect();
    for &(suffix, bases, accented) in ACCENTED {
        for (base, upper) in bases.chars().zip(accented.chars()) {
            map.insert(format!("{base}{suffix}"), upper);
            let lower_base = base.to_ascii_lowercase();
            if let Some(lower) = upper.to_lowercase().next() {
                map.insert(format!("{lower_base}{suffix}"), lower);
            }
        }
    }
    map.insert("ydieresis".to_string(), 'ÿ');
    map
});

/// Base encodings a simple font can name in `/Encoding` or `/BaseEncoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseEncoding {
    #[default]
    Standard,
    WinAnsi,
    MacRoman,
}

impl BaseEncoding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(Self::Standard),
            "WinAnsiEncoding" => Some(Self::WinAnsi),
            "MacRomanEncoding" => Some(Self::MacRoman),
            _ => None,
        }
    }

    /// Character assigned to `code`, if any.
    pub fn to_char(self, code: u8) -> Option<char> {
        match self {
            Self::Standard => standard_char(code),
            Self::WinAnsi => match code {
                0x20..=0x7e => Some(code as char),
                0x80..=0x9f => WIN_ANSI_80[(code - 0x80) as usize],
                0xa0..=0xff => Some(code as char),
                _ => None,
            },
            Self::MacRoman => match code {
                0x20..=0x7e => Some(code as char),
                0x80..=0xff => MAC_ROMAN_HIGH.chars().nth((code - 0x80) as usize),
                _ => None,
            },
        }
    }

    /// Full code table for this encoding.
    pub fn table(self) -> FxHashMap<u8, String> {
        (0..=u8::MAX)
            .filter_map(|code| self.to_char(code).map(|ch| (code, ch.to_string())))
            .collect()
    }
}

fn standard_char(code: u8) -> Option<char> {
    let ch = match code {
        0x27 => '’',
        0x60 => '‘',
        0x20..=0x7e => code as char,
        0xa1 => '¡', 0xa2 => '¢', 0xa3 => '£', 0xa4 => '⁄', 0xa5 => '¥', 0xa6 => 'ƒ',
        0xa7 => '§', 0xa8 => '¤', 0xa9 => '\'', 0xaa => '“', 0xab => '«', 0xac => '‹',
        0xad => '›', 0xae => 'ﬁ', 0xaf => 'ﬂ', 0xb1 => '–', 0xb2 => '†', 0xb3 => '‡',
        0xb4 => '·', 0xb6 => '¶', 0xb7 => '•', 0xb8 => '‚', 0xb9 => '„', 0xba => '”',
        0xbb => '»', 0xbc => '…', 0xbd => '‰', 0xbf => '¿', 0xc1 => '`', 0xc2 => '´',
        0xc3 => 'ˆ', 0xc4 => '˜', 0xc5 => '¯', 0xc6 => '˘', 0xc7 => '˙', 0xc8 => '¨',
        0xca => '˚', 0xcb => '¸', 0xcd => '˝', 0xce => '˛', 0xcf => 'ˇ', 0xd0 => '—',
        0xe1 => 'Æ', 0xe3 => 'ª', 0xe8 => 'Ł', 0xe9 => 'Ø', 0xea => 'Œ', 0xeb => 'º',
        0xf1 => 'æ', 0xf5 => 'ı', 0xf8 => 'ł', 0xf9 => 'ø', 0xfa => 'œ', 0xfb => 'ß',
        _ => return None,
    };
    Some(ch)
}

/// Resolve a glyph name to its Unicode text.
pub fn name_to_unicode(name: &str) -> Option<String> {
    let name = name.split('.').next().unwrap_or_default();
    if name.is_empty() || name == "notdef" {
        return None;
    }
    if let Some(&ch) = GLYPH_TO_CHAR.get(name) {
        return Some(ch.to_string());
    }
    if name.contains('_') {
        return name
            .split('_')
            .map(component_to_unicode)
            .collect::<Option<String>>();
    }
    component_to_unicode(name)
}

fn component_to_unicode(name: &str) -> Option<String> {
    if let Some(&ch) = GLYPH_TO_CHAR.get(name) {
        return Some(ch.to_string());
    }
    if let Some(hex) = name.strip_prefix("uni")
        && !hex.is_empty()
        && hex.len().is_multiple_of(4)
        && hex.chars().all(|c| c.is_ascii_hexdigit())
    {
        let units = hex
            .as_bytes()
            .chunks(4)
            .map(|chunk| {
                std::str::from_utf8(chunk)
                    .ok()
                    .and_then(|s| u16::from_str_radix(s, 16).ok())
            })
            .collect::<Option<Vec<u16>>>()?;
        return char::decode_utf16(units).collect::<Result<String, _>>().ok();
    }
    if let Some(hex) = name.strip_prefix('u')
        && (4..=6).contains(&hex.len())
        && hex.chars().all(|c| c.is_ascii_hexdigit())
    {
        let cp = u32::from_str_radix(hex, 16).ok()?;
        return char::from_u32(cp).map(String::from);
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch.to_string()),
        _ => None,
    }
}

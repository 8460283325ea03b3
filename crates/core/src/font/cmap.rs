//! ToUnicode CMap parsing.
//!
//! A ToUnicode stream maps character codes to Unicode text through
//! `bfchar` and `bfrange` blocks. Only those blocks (and the codespace
//! declaration, used to learn the code width) are read; everything else in
//! the PostScript program is skipped.

use rustc_hash::FxHashMap;

/// Ranges wider than this are truncated instead of expanded.
const MAX_RANGE_SPAN: u32 = 0xFFFF;

/// CID to Unicode mapping.
#[derive(Debug, Default, Clone)]
pub struct UnicodeMap {
    cid2unichr: FxHashMap<u32, String>,
    /// Byte width of codes declared in `begincodespacerange`.
    code_len: Option<usize>,
}

impl UnicodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cid2unichr.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cid2unichr.len()
    }

    /// Code width declared by the codespace, if any.
    pub fn code_len(&self) -> Option<usize> {
        self.code_len
    }

    /// Add a mapping. A no-break space never replaces an existing plain space.
    pub fn add_cid2unichr(&mut self, cid: u32, unicode: String) {
        if unicode == "\u{a0}" && self.cid2unichr.get(&cid).is_some_and(|s| s == " ") {
            return;
        }
        self.cid2unichr.insert(cid, unicode);
    }

    pub fn get_unichr(&self, cid: u32) -> Option<&str> {
        self.cid2unichr.get(&cid).map(String::as_str)
    }

    /// Parse a decoded ToUnicode stream. Malformed entries are skipped.
    pub fn parse(data: &[u8]) -> Self {
        let mut map = Self::new();
        let tokens = tokenize(data);
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i] {
                Token::Keyword(k) if k == "begincodespacerange" => {
                    i += 1;
                    if let Some(Token::Hex(lo)) = tokens.get(i) {
                        map.code_len = Some(lo.len());
                    }
                    while i < tokens.len() && !tokens[i].is_keyword("endcodespacerange") {
                        i += 1;
                    }
                }
                Token::Keyword(k) if k == "beginbfchar" => {
                    i += 1;
                    while i + 1 < tokens.len() && !tokens[i].is_keyword("endbfchar") {
                        if let (Token::Hex(code), Token::Hex(dst)) = (&tokens[i], &tokens[i + 1]) {
                            map.add_cid2unichr(code_value(code), decode_utf16be(dst));
                            i += 2;
                        } else {
                            i += 1;
                        }
                    }
                }
                Token::Keyword(k) if k == "beginbfrange" => {
                    i += 1;
                    i = map.parse_bfrange(&tokens, i);
                }
                _ => {}
            }
            i += 1;
        }
        map
    }

    /// Read `bfrange` entries starting at `i`; returns the index of `endbfrange`.
    fn parse_bfrange(&mut self, tokens: &[Token], mut i: usize) -> usize {
        while i + 2 < tokens.len() && !tokens[i].is_keyword("endbfrange") {
            let (Token::Hex(lo), Token::Hex(hi)) = (&tokens[i], &tokens[i + 1]) else {
                i += 1;
                continue;
            };
            let start = code_value(lo);
            let end = code_value(hi).min(start.saturating_add(MAX_RANGE_SPAN));
            match &tokens[i + 2] {
                Token::Hex(dst) => {
                    for (offset, cid) in (start..=end).enumerate() {
                        self.add_cid2unichr(cid, decode_utf16be(&increment(dst, offset as u32)));
                    }
                    i += 3;
                }
                Token::ArrayStart => {
                    i += 3;
                    let mut cid = start;
                    while let Some(Token::Hex(dst)) = tokens.get(i) {
                        if cid <= end {
                            self.add_cid2unichr(cid, decode_utf16be(dst));
                        }
                        cid = cid.saturating_add(1);
                        i += 1;
                    }
                    if matches!(tokens.get(i), Some(Token::ArrayEnd)) {
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }
        i
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Keyword(String),
    Other,
}

impl Token {
    fn is_keyword(&self, word: &str) -> bool {
        matches!(self, Token::Keyword(k) if k == word)
    }
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'<' if data.get(i + 1) == Some(&b'<') => {
                tokens.push(Token::Other);
                i += 2;
            }
            b'<' => {
                let start = i + 1;
                let end = data[start..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(data.len(), |p| start + p);
                tokens.push(Token::Hex(hex_bytes(&data[start..end])));
                i = end + 1;
            }
            b'>' => {
                tokens.push(Token::Other);
                i += if data.get(i + 1) == Some(&b'>') { 2 } else { 1 };
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'(' => {
                // Literal strings carry registry names only; skip them whole.
                let mut depth = 0usize;
                while i < data.len() {
                    match data[i] {
                        b'\\' => i += 1,
                        b'(' => depth += 1,
                        b')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                tokens.push(Token::Other);
                i += 1;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                i += 1;
                while i < data.len() && !is_delimiter(data[i]) {
                    i += 1;
                }
                let word = String::from_utf8_lossy(&data[start..i]).into_owned();
                tokens.push(Token::Keyword(word));
            }
        }
    }
    tokens
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'<' | b'>' | b'[' | b']' | b'(' | b')' | b'%' | b'/')
}

/// Hex digits to bytes; whitespace is ignored and an odd trailing digit is padded with 0.
fn hex_bytes(digits: &[u8]) -> Vec<u8> {
    let nibbles: Vec<u8> = digits
        .iter()
        .filter_map(|&b| (b as char).to_digit(16).map(|d| d as u8))
        .collect();
    nibbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn code_value(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .rev()
        .take(4)
        .rev()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

/// Add `offset` to the last (up to four) bytes of `dst`, keeping its length.
fn increment(dst: &[u8], offset: u32) -> Vec<u8> {
    let split = dst.len().saturating_sub(4);
    let (prefix, var) = dst.split_at(split);
    let value = code_value(var).wrapping_add(offset);
    let packed = value.to_be_bytes();
    let mut out = prefix.to_vec();
    out.extend_from_slice(&packed[4 - var.len()..]);
    out
}

/// Decode UTF-16BE; unpaired surrogates become U+FFFD.
pub fn decode_utf16be(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

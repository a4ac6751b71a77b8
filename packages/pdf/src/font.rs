//! Font decoding for positioned glyph extraction.
//!
//! Only what table detection needs is modelled: how many bytes make up a
//! character code, what Unicode text a code maps to, and how far a glyph
//! advances. `ToUnicode` CMaps take priority; simple fonts without one fall
//! back to a WinAnsi/Latin-1 reading of the byte.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object};

use crate::content::{number, resolve};

/// Glyph width used when a font carries no usable metrics, in thousandths
/// of an em.
const DEFAULT_SIMPLE_WIDTH: f64 = 500.0;
/// Default `DW` of composite fonts.
const DEFAULT_CID_WIDTH: f64 = 1000.0;
/// Most codes a single `W` or `bfrange` range may cover.
const MAX_RANGE_SPAN: u32 = 256;

/// One decoded character code.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Unicode text for the code (may be empty when unmappable).
    pub text: String,
    /// Horizontal advance in thousandths of an em.
    pub width: f64,
    /// Whether this is the single-byte code 32, which receives word spacing.
    pub is_word_space: bool,
}

/// Decoding information for one font resource.
#[derive(Debug, Clone)]
pub struct Font {
    code_len: usize,
    to_unicode: Option<ToUnicode>,
    first_char: u32,
    widths: Vec<f64>,
    cid_widths: BTreeMap<u32, f64>,
    default_width: f64,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            code_len: 1,
            to_unicode: None,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: BTreeMap::new(),
            default_width: DEFAULT_SIMPLE_WIDTH,
        }
    }
}

impl Font {
    /// Reads a font dictionary.
    ///
    /// Never fails: anything malformed degrades to default metrics and the
    /// byte-wise fallback encoding.
    #[must_use]
    pub fn load(doc: &Document, dict: &Dictionary) -> Self {
        let is_composite = dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|name| name == b"Type0");

        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| match obj {
                Object::Stream(stream) => Some(
                    stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone()),
                ),
                _ => None,
            })
            .map(|data| ToUnicode::parse(&data));

        if is_composite {
            let descendant = dict
                .get(b"DescendantFonts")
                .ok()
                .and_then(|obj| resolve(doc, obj))
                .and_then(|obj| match obj {
                    Object::Array(items) => items.first(),
                    _ => None,
                })
                .and_then(|obj| resolve(doc, obj))
                .and_then(|obj| match obj {
                    Object::Dictionary(d) => Some(d),
                    _ => None,
                });

            let default_width = descendant
                .and_then(|d| d.get(b"DW").ok())
                .and_then(number)
                .unwrap_or(DEFAULT_CID_WIDTH);
            let cid_widths = descendant
                .and_then(|d| d.get(b"W").ok())
                .and_then(|obj| resolve(doc, obj))
                .map(|obj| parse_cid_widths(doc, obj))
                .unwrap_or_default();

            return Self {
                code_len: 2,
                to_unicode,
                first_char: 0,
                widths: Vec::new(),
                cid_widths,
                default_width,
            };
        }

        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(number)
            .and_then(code_operand)
            .unwrap_or(0);
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| match obj {
                Object::Array(items) => Some(
                    items
                        .iter()
                        .map(|item| {
                            resolve(doc, item)
                                .and_then(number)
                                .unwrap_or(DEFAULT_SIMPLE_WIDTH)
                        })
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default();

        Self {
            code_len: 1,
            to_unicode,
            first_char,
            widths,
            cid_widths: BTreeMap::new(),
            default_width: DEFAULT_SIMPLE_WIDTH,
        }
    }

    /// Splits a shown string into glyphs.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        bytes
            .chunks(self.code_len)
            .map(|chunk| {
                let code = chunk.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
                let text = self
                    .to_unicode
                    .as_ref()
                    .and_then(|map| map.get(code))
                    .map_or_else(|| self.fallback_text(code), str::to_owned);

                Glyph {
                    text,
                    width: self.width(code),
                    is_word_space: self.code_len == 1 && code == 32,
                }
            })
            .collect()
    }

    fn width(&self, code: u32) -> f64 {
        if self.code_len == 2 {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }

        code.checked_sub(self.first_char)
            .and_then(|idx| self.widths.get(idx as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    fn fallback_text(&self, code: u32) -> String {
        if self.code_len != 1 {
            return String::new();
        }
        u8::try_from(code)
            .ok()
            .and_then(win_ansi_char)
            .map(String::from)
            .unwrap_or_default()
    }
}

/// Parses a composite font `W` array: `c [w1 w2 ...]` or `cfirst clast w`.
fn parse_cid_widths(doc: &Document, obj: &Object) -> BTreeMap<u32, f64> {
    let mut widths = BTreeMap::new();
    let Object::Array(items) = obj else {
        return widths;
    };

    let mut i = 0;
    while i < items.len() {
        let Some(first) = number(&items[i]).and_then(code_operand) else {
            i += 1;
            continue;
        };

        match items.get(i + 1).and_then(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (code, w) in (first..=u32::MAX).zip(list) {
                    if let Some(w) = number(w) {
                        widths.insert(code, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let last = number(last).and_then(code_operand);
                if let (Some(last), Some(w)) = (last, items.get(i + 2).and_then(number)) {
                    for code in capped_range(first, last) {
                        widths.insert(code, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }

    widths
}

/// A numeric operand as a character code, when it is a valid one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn code_operand(n: f64) -> Option<u32> {
    if (0.0..=f64::from(u32::MAX)).contains(&n) {
        Some(n as u32)
    } else {
        None
    }
}

/// `first..=last`, truncated to [`MAX_RANGE_SPAN`] codes.
fn capped_range(first: u32, last: u32) -> std::ops::RangeInclusive<u32> {
    first..=last.min(first.saturating_add(MAX_RANGE_SPAN - 1))
}

/// Maps a single-byte code through WinAnsiEncoding.
fn win_ansi_char(byte: u8) -> Option<char> {
    let c = match byte {
        0x80 => '€',
        0x82 => '‚',
        0x83 => 'ƒ',
        0x84 => '„',
        0x85 => '…',
        0x86 => '†',
        0x87 => '‡',
        0x88 => 'ˆ',
        0x89 => '‰',
        0x8A => 'Š',
        0x8B => '‹',
        0x8C => 'Œ',
        0x8E => 'Ž',
        0x91 => '‘',
        0x92 => '’',
        0x93 => '“',
        0x94 => '”',
        0x95 => '•',
        0x96 => '–',
        0x97 => '—',
        0x98 => '˜',
        0x99 => '™',
        0x9A => 'š',
        0x9B => '›',
        0x9C => 'œ',
        0x9E => 'ž',
        0x9F => 'Ÿ',
        0x20..=0x7E | 0xA0..=0xFF => char::from(byte),
        0x09 | 0x0A | 0x0D => ' ',
        _ => return None,
    };
    Some(c)
}

/// A parsed `ToUnicode` CMap.
#[derive(Debug, Clone, Default)]
pub struct ToUnicode {
    map: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    Keyword(String),
}

impl ToUnicode {
    /// Parses the `bfchar` and `bfrange` sections of a CMap stream.
    #[must_use]
    pub fn parse(data: &[u8]) -> Self {
        let tokens = tokenize(data);
        let mut map = BTreeMap::new();
        let mut i = 0;

        while i < tokens.len() {
            match &tokens[i] {
                Token::Keyword(k) if k == "beginbfchar" => {
                    i += 1;
                    while i + 1 < tokens.len() {
                        match (&tokens[i], &tokens[i + 1]) {
                            (Token::Hex(src), Token::Hex(dst)) => {
                                map.insert(code_of(src), utf16_text(dst));
                                i += 2;
                            }
                            _ => break,
                        }
                    }
                }
                Token::Keyword(k) if k == "beginbfrange" => {
                    i += 1;
                    while i + 2 < tokens.len() {
                        let (Token::Hex(lo), Token::Hex(hi)) = (&tokens[i], &tokens[i + 1]) else {
                            break;
                        };
                        let (lo, hi) = (code_of(lo), code_of(hi));

                        match &tokens[i + 2] {
                            Token::Hex(dst) => {
                                for (offset, code) in capped_range(lo, hi).enumerate() {
                                    map.insert(code, offset_text(dst, offset));
                                }
                                i += 3;
                            }
                            Token::ArrayStart => {
                                i += 3;
                                let mut codes = capped_range(lo, hi);
                                while let Some(Token::Hex(dst)) = tokens.get(i) {
                                    if let Some(code) = codes.next() {
                                        map.insert(code, utf16_text(dst));
                                    }
                                    i += 1;
                                }
                                if matches!(tokens.get(i), Some(Token::ArrayEnd)) {
                                    i += 1;
                                }
                            }
                            _ => break,
                        }
                    }
                }
                _ => i += 1,
            }
        }

        Self { map }
    }

    /// Text for a character code.
    #[must_use]
    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < data.len() {
        match data[i] {
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let start = i + 1;
                let end = data[start..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(data.len(), |p| start + p);
                tokens.push(Token::Hex(hex_bytes(&data[start..end])));
                i = end + 1;
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b if b.is_ascii_alphabetic() => {
                let start = i;
                while i < data.len() && data[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                tokens.push(Token::Keyword(
                    String::from_utf8_lossy(&data[start..i]).into_owned(),
                ));
            }
            _ => i += 1,
        }
    }

    tokens
}

fn hex_bytes(hex: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = hex
        .iter()
        .filter_map(|&b| char::from(b).to_digit(16))
        .filter_map(|d| u8::try_from(d).ok())
        .collect();

    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [single] => u16::from(*single),
            _ => 0,
        })
        .collect()
}

fn utf16_text(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}

/// Destination text for the `offset`-th code of a `bfrange`: the last
/// UTF-16 unit is incremented.
fn offset_text(dst: &[u8], offset: usize) -> String {
    let mut units = utf16_units(dst);
    if let Some(last) = units.last_mut() {
        *last = last.wrapping_add(u16::try_from(offset).unwrap_or(u16::MAX));
    }
    String::from_utf16_lossy(&units)
}

//! Font dictionaries
//!
//! Splits shown strings into character codes and gives each code its advance
//! width and Unicode text. Simple fonts (Type1, TrueType, Type3) read one byte
//! per code through their base encoding and `Differences`. Composite Type0
//! fonts read codes through their CMap (`Identity-H` by default) and take
//! widths from the descendant CIDFont. A `ToUnicode` map, when present, wins
//! over both.

use std::collections::HashMap;

use adobe_cmap_parser::ByteMapping;
use encoding_rs::{Encoding, MACINTOSH, UTF_16BE, WINDOWS_1252};
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::{debug, warn};

use crate::objects::{get, number, numbers, resolve_dict};

/// Advance for a simple font that declares no width, in thousandths of an em.
const DEFAULT_GLYPH_WIDTH: f64 = 500.0;

/// `DW` default of a CIDFont.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Longest code a CMap codespace may define, in bytes.
const MAX_CODE_BYTES: usize = 4;

/// A character code and the number of bytes it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Code {
    pub value: u32,
    pub len: usize,
}

impl Code {
    /// Word spacing applies to the single-byte code 32 only.
    pub fn is_word_space(&self) -> bool {
        self.len == 1 && self.value == 32
    }
}

/// Byte ranges of a composite font's codespace and their CID mapping.
#[derive(Debug, Clone, PartialEq)]
struct CodeSpace {
    /// `(bytes, first, last)`
    ranges: Vec<(usize, u32, u32)>,
    /// `(first code, last code, first cid)`
    cids: Vec<(u32, u32, u32)>,
}

impl CodeSpace {
    fn identity() -> Self {
        Self {
            ranges: vec![(2, 0, 0xffff)],
            cids: vec![(0, 0xffff, 0)],
        }
    }

    fn from_mapping(mapping: &ByteMapping) -> Self {
        Self {
            ranges: mapping
                .codespace
                .iter()
                .map(|r| (r.width as usize, r.start, r.end))
                .collect(),
            cids: mapping
                .cid
                .iter()
                .map(|r| (r.src_code_lo, r.src_code_hi, r.dst_CID_lo))
                .collect(),
        }
    }

    /// Read the next code from `bytes`, growing it a byte at a time until it
    /// falls in a codespace range.
    fn next_code(&self, bytes: &[u8]) -> Option<Code> {
        let mut value = 0u32;
        for (i, &byte) in bytes.iter().take(MAX_CODE_BYTES).enumerate() {
            value = (value << 8) | u32::from(byte);
            let len = i + 1;
            if self
                .ranges
                .iter()
                .any(|&(width, lo, hi)| width == len && (lo..=hi).contains(&value))
            {
                return Some(Code { value, len });
            }
        }
        None
    }

    fn cid(&self, code: u32) -> Option<u32> {
        self.cids
            .iter()
            .find(|(lo, hi, _)| (*lo..=*hi).contains(&code))
            .map(|(lo, _, dst)| code - lo + dst)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Codes {
    /// One byte per code; the base encoding plus `Differences`.
    Simple(Vec<Option<char>>),
    Composite(CodeSpace),
}

/// What the interpreter needs to know about one font resource.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Font {
    codes: Codes,
    /// Keyed by code for simple fonts, by CID for composite ones.
    widths: HashMap<u32, f64>,
    default_width: f64,
    /// Glyph descent below the baseline, in thousandths of an em (negative).
    descent: f64,
    to_unicode: HashMap<u32, String>,
}

impl Font {
    pub fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let subtype = get(doc, font, b"Subtype").and_then(|o| o.as_name().ok());
        let to_unicode = to_unicode(doc, font);
        if subtype == Some(b"Type0".as_slice()) {
            Self::composite(doc, font, to_unicode)
        } else {
            Self::simple(doc, font, to_unicode)
        }
    }

    /// Stand-in for a font the page never defined.
    pub fn standard() -> Self {
        Self {
            codes: Codes::Simple(base_encoding(b"StandardEncoding")),
            widths: HashMap::new(),
            default_width: DEFAULT_GLYPH_WIDTH,
            descent: 0.0,
            to_unicode: HashMap::new(),
        }
    }

    fn simple(doc: &Document, font: &Dictionary, to_unicode: HashMap<u32, String>) -> Self {
        let first_char = get(doc, font, b"FirstChar")
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        let widths = get(doc, font, b"Widths")
            .and_then(|o| o.as_array().ok())
            .and_then(|a| numbers(doc, a))
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter(|(_, w)| *w > 0.0)
            .filter_map(|(i, w)| {
                let code = u32::try_from(first_char + i as i64).ok()?;
                Some((code, w))
            })
            .collect();
        let descriptor = get(doc, font, b"FontDescriptor").and_then(|o| o.as_dict().ok());
        let default_width = descriptor
            .and_then(|d| get(doc, d, b"MissingWidth"))
            .and_then(number)
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_GLYPH_WIDTH);

        Self {
            codes: Codes::Simple(simple_encoding(doc, font)),
            widths,
            default_width,
            descent: descent(doc, font, descriptor),
            to_unicode,
        }
    }

    fn composite(doc: &Document, font: &Dictionary, to_unicode: HashMap<u32, String>) -> Self {
        let codes = match get(doc, font, b"Encoding") {
            Some(Object::Name(name)) if name.starts_with(b"Identity-") => CodeSpace::identity(),
            Some(Object::Stream(stream)) => adobe_cmap_parser::get_byte_mapping(&contents(stream))
                .map(|mapping| CodeSpace::from_mapping(&mapping))
                .unwrap_or_else(|e| {
                    warn!(error = ?e, "unreadable font CMap, reading two-byte codes");
                    CodeSpace::identity()
                }),
            other => {
                warn!(encoding = ?other, "unsupported font CMap, reading two-byte codes");
                CodeSpace::identity()
            }
        };

        let descendant = get(doc, font, b"DescendantFonts")
            .and_then(|o| o.as_array().ok())
            .and_then(|a| a.first())
            .and_then(|o| resolve_dict(doc, o));
        let descriptor = descendant
            .and_then(|d| get(doc, d, b"FontDescriptor"))
            .and_then(|o| o.as_dict().ok());
        let default_width = descendant
            .and_then(|d| get(doc, d, b"DW"))
            .and_then(number)
            .unwrap_or(DEFAULT_CID_WIDTH);
        let widths = descendant
            .and_then(|d| get(doc, d, b"W"))
            .and_then(|o| o.as_array().ok())
            .map(|w| cid_widths(doc, w))
            .unwrap_or_default();

        Self {
            codes: Codes::Composite(codes),
            widths,
            default_width,
            descent: descent(doc, descendant.unwrap_or(font), descriptor),
            to_unicode,
        }
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<Code> {
        match &self.codes {
            Codes::Simple(_) => bytes
                .iter()
                .map(|&b| Code {
                    value: u32::from(b),
                    len: 1,
                })
                .collect(),
            Codes::Composite(space) => {
                let mut codes = Vec::with_capacity(bytes.len() / 2);
                let mut rest = bytes;
                while !rest.is_empty() {
                    match space.next_code(rest) {
                        Some(code) => {
                            codes.push(code);
                            rest = &rest[code.len..];
                        }
                        None => {
                            debug!(byte = rest[0], "byte outside codespace");
                            rest = &rest[1..];
                        }
                    }
                }
                codes
            }
        }
    }

    /// Advance of `code` in thousandths of an em.
    pub fn width(&self, code: u32) -> f64 {
        let key = match &self.codes {
            Codes::Simple(_) => Some(code),
            Codes::Composite(space) => space.cid(code),
        };
        key.and_then(|k| self.widths.get(&k).copied())
            .unwrap_or(self.default_width)
    }

    pub fn descent(&self) -> f64 {
        self.descent
    }

    /// Unicode text of `code`. Unmapped CIDs read as `(cid:N)`.
    pub fn text(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.get(&code) {
            return text.clone();
        }
        match &self.codes {
            Codes::Simple(table) => usize::try_from(code)
                .ok()
                .and_then(|i| table.get(i).copied().flatten())
                .or_else(|| u8::try_from(code).ok().map(char::from))
                .map(String::from)
                .unwrap_or_default(),
            Codes::Composite(space) => format!("(cid:{})", space.cid(code).unwrap_or(code)),
        }
    }
}

fn contents(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

fn to_unicode(doc: &Document, font: &Dictionary) -> HashMap<u32, String> {
    let Some(Object::Stream(stream)) = get(doc, font, b"ToUnicode") else {
        return HashMap::new();
    };
    match adobe_cmap_parser::get_unicode_map(&contents(stream)) {
        Ok(map) => map
            .into_iter()
            .filter_map(|(code, utf16)| {
                let text = UTF_16BE.decode_without_bom_handling_and_without_replacement(&utf16)?;
                Some((code, text.into_owned()))
            })
            .collect(),
        Err(e) => {
            warn!(error = ?e, "unreadable ToUnicode map");
            HashMap::new()
        }
    }
}

/// The `W` array of a CIDFont: `c [w1 w2 ...]` or `c_first c_last w`.
fn cid_widths(doc: &Document, w: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < w.len() {
        let Some(first) = w[i].as_i64().ok().and_then(|c| u32::try_from(c).ok()) else {
            break;
        };
        match w.get(i + 1) {
            Some(Object::Array(run)) => {
                for (cid, width) in (first..).zip(numbers(doc, run).unwrap_or_default()) {
                    widths.insert(cid, width);
                }
                i += 2;
            }
            Some(last) => {
                let last = last.as_i64().ok().and_then(|c| u32::try_from(c).ok());
                let width = w.get(i + 2).and_then(number);
                let (Some(last), Some(width)) = (last, width) else {
                    break;
                };
                for cid in first..=last {
                    widths.insert(cid, width);
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

/// `Descent` from the font descriptor, else the standard 14 font metrics.
fn descent(doc: &Document, font: &Dictionary, descriptor: Option<&Dictionary>) -> f64 {
    if let Some(value) = descriptor.and_then(|d| get(doc, d, b"Descent")).and_then(number) {
        return value.min(0.0);
    }
    let base = get(doc, font, b"BaseFont")
        .and_then(|o| o.as_name().ok())
        .unwrap_or_default();
    standard_descent(base)
}

fn standard_descent(base_font: &[u8]) -> f64 {
    // subset fonts carry a six-letter `ABCDEF+` tag
    let base_font = match base_font.iter().position(|&b| b == b'+') {
        Some(i) => &base_font[i + 1..],
        None => base_font,
    };
    if base_font.starts_with(b"Helvetica") || base_font.starts_with(b"Arial") {
        -207.0
    } else if base_font.starts_with(b"Times") {
        -217.0
    } else if base_font.starts_with(b"Courier") {
        -194.0
    } else {
        0.0
    }
}

fn simple_encoding(doc: &Document, font: &Dictionary) -> Vec<Option<char>> {
    match get(doc, font, b"Encoding") {
        Some(Object::Name(name)) => base_encoding(name),
        Some(Object::Dictionary(encoding)) => {
            let mut table = get(doc, encoding, b"BaseEncoding")
                .and_then(|o| o.as_name().ok())
                .map(base_encoding)
                .unwrap_or_else(|| base_encoding(b"StandardEncoding"));
            if let Some(differences) = get(doc, encoding, b"Differences").and_then(|o| o.as_array().ok()) {
                apply_differences(&mut table, differences);
            }
            table
        }
        _ => base_encoding(b"StandardEncoding"),
    }
}

/// One-byte table for a named base encoding.
fn base_encoding(name: &[u8]) -> Vec<Option<char>> {
    let codepage: &'static Encoding = match name {
        b"MacRomanEncoding" => MACINTOSH,
        _ => WINDOWS_1252,
    };
    let mut table: Vec<Option<char>> = (0..=255u8)
        .map(|b| codepage.decode_without_bom_handling(&[b]).0.chars().next())
        .collect();
    if name == b"StandardEncoding" {
        table[0x27] = Some('\u{2019}');
        table[0x60] = Some('\u{2018}');
    }
    table
}

/// `[code name name ... code name ...]`: each name takes the next code.
fn apply_differences(table: &mut [Option<char>], differences: &[Object]) {
    let mut code = 0usize;
    for item in differences {
        match item {
            Object::Integer(start) => code = usize::try_from(*start).unwrap_or(usize::MAX),
            Object::Name(name) => {
                if let (Some(slot), Some(c)) = (table.get_mut(code), glyph_char(name)) {
                    *slot = Some(c);
                }
                code = code.saturating_add(1);
            }
            _ => {}
        }
    }
}

/// Unicode for a glyph name: single letters, `uniXXXX`, `uXXXX` and the
/// printable ASCII names.
fn glyph_char(name: &[u8]) -> Option<char> {
    let name = std::str::from_utf8(name).ok()?;
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_ascii_alphabetic().then_some(c);
    }
    let hex = name
        .strip_prefix("uni")
        .filter(|h| h.len() == 4)
        .or_else(|| name.strip_prefix('u').filter(|h| (4..=6).contains(&h.len())));
    if let Some(c) = hex
        .and_then(|h| u32::from_str_radix(h, 16).ok())
        .and_then(char::from_u32)
    {
        return Some(c);
    }
    let c = match name {
        "space" | "nbspace" => ' ',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" | "minus" => '-',
        "period" => '.',
        "slash" => '/',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "asciicircum" => '^',
        "underscore" => '_',
        "grave" => '`',
        "braceleft" => '{',
        "bar" => '|',
        "braceright" => '}',
        "asciitilde" => '~',
        "quoteleft" => '\u{2018}',
        "quoteright" => '\u{2019}',
        "quotedblleft" => '\u{201c}',
        "quotedblright" => '\u{201d}',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "bullet" => '\u{2022}',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A `ToUnicode` CMap sending each `(cid, text)` pair through `bfchar`.
    pub(crate) fn to_unicode_cmap(entries: &[(u32, char)]) -> Vec<u8> {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );
        cmap.push_str(&format!("{} beginbfchar\n", entries.len()));
        for (cid, c) in entries {
            cmap.push_str(&format!("<{:04X}> <{:04X}>\n", cid, u32::from(*c)));
        }
        cmap.push_str(
            "endbfchar\nendcmap\nCMapName currentdict /CIDInit defineresource pop\nend\nend\n",
        );
        cmap.into_bytes()
    }

    /// Glyph ids for `text`, offset so they never coincide with the character codes.
    pub(crate) fn glyph_ids(text: &str) -> Vec<(u32, char)> {
        let mut ids: Vec<(u32, char)> = text.chars().map(|c| (u32::from(c) + 0x100, c)).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// `text` as the two-byte glyph ids of [`glyph_ids`].
    pub(crate) fn two_byte_codes(text: &str) -> Vec<u8> {
        text.chars()
            .flat_map(|c| ((u32::from(c) + 0x100) as u16).to_be_bytes())
            .collect()
    }

    /// Adds a Type0 Identity-H font with a ToUnicode map covering `text`;
    /// every glyph is 600 units wide except `M`.
    pub(crate) fn add_type0_font(doc: &mut Document, text: &str) -> lopdf::ObjectId {
        let to_unicode = doc.add_object(Stream::new(Dictionary::new(), to_unicode_cmap(&glyph_ids(text))));
        let descriptor = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("FontName", Object::Name(b"ABCDEF+Arial".to_vec())),
            ("Descent", Object::Integer(-200)),
        ]));
        let m = i64::from(u32::from('M') + 0x100);
        let descendant = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("BaseFont", Object::Name(b"ABCDEF+Arial".to_vec())),
            ("FontDescriptor", Object::Reference(descriptor)),
            ("DW", Object::Integer(600)),
            (
                "W",
                Object::Array(vec![
                    Object::Integer(m),
                    Object::Array(vec![Object::Integer(800)]),
                ]),
            ),
        ]));
        doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type0".to_vec())),
            ("BaseFont", Object::Name(b"ABCDEF+Arial".to_vec())),
            ("Encoding", Object::Name(b"Identity-H".to_vec())),
            ("DescendantFonts", Object::Array(vec![Object::Reference(descendant)])),
            ("ToUnicode", Object::Reference(to_unicode)),
        ]))
    }

    #[test]
    fn test_widths_from_font_dictionary() {
        let font = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("FirstChar", Object::Integer(65)),
            (
                "Widths",
                Object::Array(vec![Object::Integer(600), Object::Integer(700)]),
            ),
        ]);
        let doc = Document::with_version("1.5");
        let font = Font::from_dict(&doc, &font);
        assert_eq!(font.width(u32::from(b'A')), 600.0);
        assert_eq!(font.width(u32::from(b'B')), 700.0);
        assert_eq!(font.width(u32::from(b'C')), DEFAULT_GLYPH_WIDTH);
        assert_eq!(font.width(u32::from(b' ')), DEFAULT_GLYPH_WIDTH);
    }

    #[test]
    fn test_type0_font_reads_two_byte_codes() {
        let mut doc = Document::with_version("1.5");
        let id = add_type0_font(&mut doc, "March - 2021");
        let font = Font::from_dict(&doc, doc.get_dictionary(id).unwrap());

        let codes = font.codes(&two_byte_codes("March - 2021"));
        assert_eq!(codes.len(), 12);
        assert!(codes.iter().all(|c| c.len == 2 && !c.is_word_space()));

        let text: String = codes.iter().map(|c| font.text(c.value)).collect();
        assert_eq!(text, "March - 2021");
        assert_eq!(font.width(codes[0].value), 800.0);
        assert_eq!(font.width(codes[1].value), 600.0);
        assert_eq!(font.descent(), -200.0);
    }

    #[test]
    fn test_unmapped_cid_reads_as_placeholder() {
        let mut doc = Document::with_version("1.5");
        let id = add_type0_font(&mut doc, "A");
        let font = Font::from_dict(&doc, doc.get_dictionary(id).unwrap());
        assert_eq!(font.text(0x0007), "(cid:7)");
    }

    #[test]
    fn test_cid_width_ranges() {
        let doc = Document::with_version("1.5");
        let w = vec![
            Object::Integer(1),
            Object::Array(vec![Object::Integer(250), Object::Integer(300)]),
            Object::Integer(10),
            Object::Integer(12),
            Object::Integer(450),
        ];
        let widths = cid_widths(&doc, &w);
        assert_eq!(widths.len(), 5);
        assert_eq!(widths[&2], 300.0);
        assert_eq!(widths[&12], 450.0);
    }

    #[test]
    fn test_differences_override_base_encoding() {
        let font = Dictionary::from_iter(vec![
            ("Subtype", Object::Name(b"Type1".to_vec())),
            (
                "Encoding",
                Object::Dictionary(Dictionary::from_iter(vec![
                    ("BaseEncoding", Object::Name(b"WinAnsiEncoding".to_vec())),
                    (
                        "Differences",
                        Object::Array(vec![
                            Object::Integer(1),
                            Object::Name(b"two".to_vec()),
                            Object::Name(b"zero".to_vec()),
                            Object::Integer(0x80),
                            Object::Name(b"uni2116".to_vec()),
                        ]),
                    ),
                ])),
            ),
        ]);
        let doc = Document::with_version("1.5");
        let font = Font::from_dict(&doc, &font);
        let text: String = [1, 2, 0x41, 0x80, 0x93].iter().map(|c| font.text(*c)).collect();
        assert_eq!(text, "20A\u{2116}\u{201c}");
    }

    #[test]
    fn test_standard_font_descent() {
        let doc = Document::with_version("1.5");
        let helvetica = Dictionary::from_iter(vec![
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica-Bold".to_vec())),
        ]);
        assert_eq!(Font::from_dict(&doc, &helvetica).descent(), -207.0);
        let subset_times = Dictionary::from_iter(vec![
            ("Subtype", Object::Name(b"TrueType".to_vec())),
            ("BaseFont", Object::Name(b"QRSTUV+TimesNewRomanPSMT".to_vec())),
        ]);
        assert_eq!(Font::from_dict(&doc, &subset_times).descent(), -217.0);
        assert_eq!(Font::standard().descent(), 0.0);
    }
}

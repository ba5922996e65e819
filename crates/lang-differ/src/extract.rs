//! String-table extraction from bundle source.
//!
//! The scanner walks the source once, stepping over every string and
//! template literal, comment and regex literal so that text inside them is
//! never mistaken for a key or a quote. An entry is an UPPER_SNAKE key (bare or quoted) followed by `:`
//! and a string literal.

use std::collections::BTreeMap;

use crate::error::DiffError;
use crate::Result;

/// Key → decoded string value, ordered by key.
pub type StringTable = BTreeMap<String, String>;

/// Whether `key` follows the localized-string naming convention
/// (`[A-Z][A-Z0-9_]+`).
pub fn is_string_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    key.len() >= 2
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Extract every `KEY:"value"` entry from `source`.
///
/// Later duplicates win, as they would in an object literal.
pub fn extract_strings(source: &str) -> Result<StringTable> {
    let mut scanner = Scanner::new(source);
    let mut table = StringTable::new();

    while let Some(b) = scanner.peek() {
        match b {
            b'"' | b'\'' => {
                let key = scanner.read_literal()?;
                if is_string_key(&key) {
                    if let Some(value) = scanner.read_value()? {
                        table.insert(key, value);
                    }
                }
            }
            b'`' => {
                scanner.read_literal()?;
            }
            b'/' => scanner.skip_slash(),
            b if is_ident_start(b) => {
                let attached = scanner.follows_ident_or_dot();
                let ident = scanner.read_ident();
                if !attached && is_string_key(ident) {
                    let key = ident.to_string();
                    if let Some(value) = scanner.read_value()? {
                        table.insert(key, value);
                    }
                }
            }
            _ => scanner.bump(),
        }
    }

    Ok(table)
}

/// Keywords after which a `/` starts a regex literal.
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn follows_ident_or_dot(&self) -> bool {
        self.pos > 0 && {
            let prev = self.bytes[self.pos - 1];
            is_ident_byte(prev) || prev == b'.'
        }
    }

    fn read_ident(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if is_ident_byte(b)) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// At a `/`: skip a line or block comment, or a regex literal when the
    /// slash is in expression position. Otherwise it is division.
    fn skip_slash(&mut self) {
        match self.bytes.get(self.pos + 1) {
            Some(b'/') => {
                while !matches!(self.peek(), None | Some(b'\n')) {
                    self.pos += 1;
                }
            }
            Some(b'*') => {
                self.pos = match self.src[self.pos + 2..].find("*/") {
                    Some(end) => self.pos + 2 + end + 2,
                    None => self.bytes.len(),
                };
            }
            _ if self.regex_allowed() => {
                if let Some(end) = self.regex_end() {
                    self.pos = end;
                    while matches!(self.peek(), Some(b) if is_ident_byte(b)) {
                        self.pos += 1;
                    }
                } else {
                    self.pos += 1;
                }
            }
            _ => self.pos += 1,
        }
    }

    /// Whether the token before `pos` lets an expression start here.
    fn regex_allowed(&self) -> bool {
        let before = &self.bytes[..self.pos];
        let Some(end) = before.iter().rposition(|b| !b.is_ascii_whitespace()) else {
            return true;
        };
        let prev = before[end];
        if is_ident_byte(prev) {
            let start = before[..end]
                .iter()
                .rposition(|b| !is_ident_byte(*b))
                .map_or(0, |i| i + 1);
            return REGEX_KEYWORDS.contains(&&self.src[start..=end]);
        }
        b"(,=:[!&|?{};+-*%<>~^".contains(&prev)
    }

    /// Offset just past the closing `/` of a regex literal at `pos`, or
    /// `None` if the line ends first.
    fn regex_end(&self) -> Option<usize> {
        let mut i = self.pos + 1;
        let mut in_class = false;
        while let Some(&b) = self.bytes.get(i) {
            match b {
                b'\\' => i += 1,
                b'\n' | b'\r' => return None,
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => return Some(i + 1),
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// After a key: `:` then a string literal. Restores the position when
    /// no colon follows.
    fn read_value(&mut self) -> Result<Option<String>> {
        let resume = self.pos;
        self.skip_whitespace();
        if self.peek() != Some(b':') {
            self.pos = resume;
            return Ok(None);
        }
        self.pos += 1;
        self.skip_whitespace();
        match self.peek() {
            Some(b'"' | b'\'' | b'`') => self.read_literal().map(Some),
            _ => Ok(None),
        }
    }

    /// Read a quoted literal starting at the opening quote, decoding
    /// escapes. Template literals keep `${...}` text verbatim.
    fn read_literal(&mut self) -> Result<String> {
        let start = self.pos;
        let quote = self.bytes[start];
        self.pos += 1;

        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            let Some(b) = self.peek() else {
                return Err(DiffError::UnterminatedString { offset: start });
            };
            match b {
                b if b == quote => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                b'\\' => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    self.read_escape(&mut out, start)?;
                    run_start = self.pos;
                }
                b'\n' | b'\r' if quote != b'`' => {
                    return Err(DiffError::UnterminatedString { offset: start });
                }
                _ => self.pos += 1,
            }
        }
    }

    fn read_escape(&mut self, out: &mut String, literal_start: usize) -> Result<()> {
        let escape_at = self.pos - 1;
        let Some(b) = self.peek() else {
            return Err(DiffError::UnterminatedString {
                offset: literal_start,
            });
        };
        self.pos += 1;

        match b {
            b'n' => out.push('\n'),
            b't' => out.push('\t'),
            b'r' => out.push('\r'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'v' => out.push('\u{b}'),
            b'0' => out.push('\0'),
            // line continuation
            b'\n' => {}
            b'\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'x' => {
                let code = self.read_hex(2, escape_at)?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            b'u' => {
                let ch = self.read_unicode_escape(escape_at)?;
                out.push(ch);
            }
            _ => {
                // Unknown escapes stand for the character itself.
                let start = self.pos - 1;
                let ch = self.src[start..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.pos = start + ch.len_utf8();
                out.push(ch);
            }
        }
        Ok(())
    }

    fn read_hex(&mut self, digits: usize, escape_at: usize) -> Result<u32> {
        let end = self.pos + digits;
        let text = self
            .src
            .get(self.pos..end)
            .filter(|t| t.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or(DiffError::InvalidEscape { offset: escape_at })?;
        self.pos = end;
        u32::from_str_radix(text, 16).map_err(|_| DiffError::InvalidEscape { offset: escape_at })
    }

    /// `\uXXXX`, `\u{X...}`, and UTF-16 surrogate pairs written as two
    /// consecutive `\uXXXX` escapes.
    fn read_unicode_escape(&mut self, escape_at: usize) -> Result<char> {
        if self.peek() == Some(b'{') {
            self.pos += 1;
            let close = self.src[self.pos..]
                .find('}')
                .ok_or(DiffError::InvalidEscape { offset: escape_at })?;
            let digits = close;
            if digits == 0 || digits > 6 {
                return Err(DiffError::InvalidEscape { offset: escape_at });
            }
            let code = self.read_hex(digits, escape_at)?;
            self.pos += 1;
            return char::from_u32(code).ok_or(DiffError::InvalidEscape { offset: escape_at });
        }

        let unit = self.read_hex(4, escape_at)?;
        if !(0xD800..0xDC00).contains(&unit) {
            return Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
        }

        // high surrogate; pair it with a following low surrogate if present
        if self.src[self.pos..].starts_with("\\u") {
            let resume = self.pos;
            self.pos += 2;
            if let Ok(low) = self.read_hex(4, escape_at) {
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    return Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            self.pos = resume;
        }
        Ok(char::REPLACEMENT_CHARACTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_keys_extracted() {
        let table = extract_strings(r#"e.exports={OK:"Okay",CANCEL:"Cancel"}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["OK"], "Okay");
        assert_eq!(table["CANCEL"], "Cancel");
    }

    #[test]
    fn test_quoted_keys_and_single_quotes() {
        let table = extract_strings(r#"{"USER_SETTINGS":'User Settings', 'DONE' : "Done"}"#).unwrap();
        assert_eq!(table["USER_SETTINGS"], "User Settings");
        assert_eq!(table["DONE"], "Done");
    }

    #[test]
    fn test_lowercase_and_member_keys_ignored() {
        let table = extract_strings(r#"{a:"x",foo:"bar",x.BAR:"nope",Mixed_Case:"no"}"#).unwrap();
        assert!(table.is_empty(), "got {table:?}");
    }

    #[test]
    fn test_keys_inside_literals_ignored() {
        let table = extract_strings(r#"x="FAKE:\"no\"";y=`TPL:"no"`;{REAL:"yes"}"#).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["REAL"], "yes");
    }

    #[test]
    fn test_escapes_decoded() {
        let table =
            extract_strings(r#"{A_B:"line\nnext \"q\" \x41 é \u{1F600} 😀"}"#).unwrap();
        assert_eq!(table["A_B"], "line\nnext \"q\" A é 😀 😀");
    }

    #[test]
    fn test_non_ascii_values_preserved() {
        let table = extract_strings("{GREETING:\"こんにちは\"}").unwrap();
        assert_eq!(table["GREETING"], "こんにちは");
    }

    #[test]
    fn test_later_duplicate_wins() {
        let table = extract_strings(r#"{KEY:"first"},{KEY:"second"}"#).unwrap();
        assert_eq!(table["KEY"], "second");
    }

    #[test]
    fn test_non_string_values_skipped() {
        let table = extract_strings(r#"{COUNT:5,FLAG:!0,NAME:"n"}"#).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["NAME"], "n");
    }

    #[test]
    fn test_unterminated_literal_is_error() {
        let err = extract_strings(r#"{KEY:"open"#).unwrap_err();
        assert_eq!(err, DiffError::UnterminatedString { offset: 5 });
    }

    #[test]
    fn test_newline_in_quoted_literal_is_error() {
        let err = extract_strings("{KEY:\"a\nb\"}").unwrap_err();
        assert!(matches!(err, DiffError::UnterminatedString { .. }));
    }

    #[test]
    fn test_bad_hex_escape_is_error() {
        let err = extract_strings(r#"{KEY:"\xZZ"}"#).unwrap_err();
        assert!(matches!(err, DiffError::InvalidEscape { .. }));
    }

    #[test]
    fn test_quotes_in_comments_ignored() {
        let src = "/*! it's licensed */e.exports={HELLO:\"Hi\"};// don't\n{BYE:\"Bye\"}";
        let table = extract_strings(src).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["HELLO"], "Hi");
        assert_eq!(table["BYE"], "Bye");
    }

    #[test]
    fn test_commented_out_entries_ignored() {
        let table = extract_strings("{/* OLD:\"x\" */NEW:\"y\"}").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["NEW"], "y");
    }

    #[test]
    fn test_quotes_in_regex_literals_ignored() {
        let src = r#"a=b.replace(/'/g,"");c=/["'`]/.test(d);e.exports={HELLO:"Hi"}"#;
        let table = extract_strings(src).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["HELLO"], "Hi");
    }

    #[test]
    fn test_regex_class_may_contain_slash() {
        let src = r#"x=/[/']+/g;function f(){return /"/.test(s)}{KEY:"v"}"#;
        assert_eq!(extract_strings(src).unwrap()["KEY"], "v");
    }

    #[test]
    fn test_division_is_not_regex() {
        let table = extract_strings(r#"w=a/2,h=(b)/c;{RATIO:"1/2"}"#).unwrap();
        assert_eq!(table["RATIO"], "1/2");
    }

    #[test]
    fn test_is_string_key() {
        assert!(is_string_key("OK"));
        assert!(is_string_key("USER_SETTINGS_2"));
        assert!(!is_string_key("A"));
        assert!(!is_string_key("_PRIVATE"));
        assert!(!is_string_key("Ok"));
        assert!(!is_string_key(""));
    }
}

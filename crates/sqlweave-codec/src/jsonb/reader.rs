//! Streaming JSON token reader.
//!
//! The reader is a cursor over a borrowed buffer. The next significant byte
//! is classified through a 256-entry table; whitespace is stepped over as the
//! cursor advances and the buffer is never rewritten.

use crate::error::{CodecError, CodecResult};
use sqlweave_reflect::Value;
use std::collections::BTreeMap;

/// Classification of the first byte of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Invalid,
    String,
    Number,
    Boolean,
    Null,
    Array,
    Object,
    Whitespace,
}

const fn build_value_table() -> [JsonType; 256] {
    let mut table = [JsonType::Invalid; 256];
    table[b'"' as usize] = JsonType::String;
    table[b'-' as usize] = JsonType::Number;
    let mut c = b'0';
    while c <= b'9' {
        table[c as usize] = JsonType::Number;
        c += 1;
    }
    table[b't' as usize] = JsonType::Boolean;
    table[b'f' as usize] = JsonType::Boolean;
    table[b'n' as usize] = JsonType::Null;
    table[b'[' as usize] = JsonType::Array;
    table[b'{' as usize] = JsonType::Object;
    table[b' ' as usize] = JsonType::Whitespace;
    table[b'\r' as usize] = JsonType::Whitespace;
    table[b'\t' as usize] = JsonType::Whitespace;
    table[b'\n' as usize] = JsonType::Whitespace;
    table
}

static VALUE_TABLE: [JsonType; 256] = build_value_table();

fn is_whitespace(c: u8) -> bool {
    VALUE_TABLE[c as usize] == JsonType::Whitespace
}

/// Cursor over one JSON payload.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The whole underlying buffer.
    pub fn bytes(&self) -> &'a [u8] {
        self.buf
    }

    fn malformed(&self, message: impl Into<String>) -> CodecError {
        CodecError::malformed(self.pos, message)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.buf.len() && is_whitespace(self.buf[self.pos]) {
            self.pos += 1;
        }
    }

    /// Consume and return the next significant byte.
    pub fn next_token(&mut self) -> Option<u8> {
        self.skip_whitespace();
        let c = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(c)
    }

    /// Consume `expected` if it is the next significant byte.
    fn consume(&mut self, expected: u8) -> bool {
        self.skip_whitespace();
        if self.buf.get(self.pos) == Some(&expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Step back one byte. Never moves before the start of the buffer.
    pub fn unread_byte(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// Classify the next token without consuming it.
    pub fn peek_type(&mut self) -> JsonType {
        self.skip_whitespace();
        self.buf
            .get(self.pos)
            .map(|&c| VALUE_TABLE[c as usize])
            .unwrap_or(JsonType::Invalid)
    }

    /// Whether all significant input has been consumed.
    pub fn is_eof(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.buf.len()
    }

    /// Whether the next token is the `null` literal.
    pub fn is_null(&mut self) -> bool {
        self.skip_whitespace();
        self.buf[self.pos..].starts_with(b"null")
    }

    fn expect_literal(&mut self, rest: &[u8], what: &str) -> CodecResult<()> {
        if self.buf[self.pos..].starts_with(rest) {
            self.pos += rest.len();
            Ok(())
        } else {
            Err(self.malformed(format!("invalid {} literal", what)))
        }
    }

    /// Consume a `null` literal if one is next.
    pub fn read_null(&mut self) -> CodecResult<bool> {
        match self.next_token() {
            Some(b'n') => {
                self.expect_literal(b"ull", "null")?;
                Ok(true)
            }
            Some(_) => {
                self.unread_byte();
                Ok(false)
            }
            None => Ok(false),
        }
    }

    pub fn read_boolean(&mut self) -> CodecResult<bool> {
        match self.next_token() {
            Some(b't') => {
                self.expect_literal(b"rue", "boolean")?;
                Ok(true)
            }
            Some(b'f') => {
                self.expect_literal(b"alse", "boolean")?;
                Ok(false)
            }
            _ => Err(self.malformed("invalid boolean value")),
        }
    }

    /// Read a quoted string, unescaping escape sequences.
    pub fn read_string(&mut self) -> CodecResult<String> {
        if !self.consume(b'"') {
            return Err(self.malformed("expected string"));
        }

        let start = self.pos;
        let mut i = start;
        while i < self.buf.len() {
            match self.buf[i] {
                b'"' => {
                    let s = std::str::from_utf8(&self.buf[start..i])
                        .map_err(|_| CodecError::malformed(start, "invalid utf-8 in string"))?;
                    self.pos = i + 1;
                    return Ok(s.to_string());
                }
                b'\\' => return self.read_escaped_string(start, i),
                _ => i += 1,
            }
        }
        Err(CodecError::malformed(start, "unterminated string"))
    }

    fn read_escaped_string(&mut self, start: usize, first_escape: usize) -> CodecResult<String> {
        let mut out: Vec<u8> = self.buf[start..first_escape].to_vec();
        let mut i = first_escape;

        while i < self.buf.len() {
            match self.buf[i] {
                b'"' => {
                    self.pos = i + 1;
                    return String::from_utf8(out)
                        .map_err(|_| CodecError::malformed(start, "invalid utf-8 in string"));
                }
                b'\\' => {
                    let esc = *self
                        .buf
                        .get(i + 1)
                        .ok_or_else(|| CodecError::malformed(i, "unterminated escape"))?;
                    i += 2;
                    match esc {
                        b'"' => out.push(b'"'),
                        b'\\' => out.push(b'\\'),
                        b'/' => out.push(b'/'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'u' => {
                            let (ch, consumed) = self.read_unicode_escape(i)?;
                            i += consumed;
                            let mut tmp = [0u8; 4];
                            out.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
                        }
                        other => {
                            return Err(CodecError::malformed(
                                i - 1,
                                format!("invalid escape character {:?}", other as char),
                            ))
                        }
                    }
                }
                c => {
                    out.push(c);
                    i += 1;
                }
            }
        }
        Err(CodecError::malformed(start, "unterminated string"))
    }

    fn hex4(&self, at: usize) -> CodecResult<u32> {
        let digits = self
            .buf
            .get(at..at + 4)
            .ok_or_else(|| CodecError::malformed(at, "truncated unicode escape"))?;
        digits.iter().try_fold(0u32, |acc, &b| {
            let d = (b as char)
                .to_digit(16)
                .ok_or_else(|| CodecError::malformed(at, "invalid unicode escape"))?;
            Ok::<u32, CodecError>(acc << 4 | d)
        })
    }

    /// Decode the hex digits after `\u`, pairing surrogates. Returns the
    /// character and the number of bytes consumed from `at`.
    fn read_unicode_escape(&self, at: usize) -> CodecResult<(char, usize)> {
        let high = self.hex4(at)?;
        if (0xD800..0xDC00).contains(&high) {
            if self.buf.get(at + 4..at + 6) == Some(b"\\u".as_slice()) {
                let low = self.hex4(at + 6)?;
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                    return Ok((ch, 10));
                }
            }
            return Ok((char::REPLACEMENT_CHARACTER, 4));
        }
        Ok((char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER), 4))
    }

    /// Consume a numeric literal and return its text.
    pub fn read_number_span(&mut self) -> CodecResult<&'a str> {
        self.skip_whitespace();
        let start = self.pos;
        let buf = self.buf;
        let mut i = start;
        while i < buf.len() && matches!(buf[i], b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
            i += 1;
        }
        if i == start {
            return Err(self.malformed("expected number"));
        }
        if !is_json_number(&buf[start..i]) {
            return Err(CodecError::malformed(start, "invalid number"));
        }
        self.pos = i;
        // The span is ASCII by construction.
        std::str::from_utf8(&buf[start..i]).map_err(|_| CodecError::malformed(start, "invalid number"))
    }

    /// Read an integer literal at full width.
    pub fn read_integer(&mut self) -> CodecResult<i128> {
        let start = self.pos;
        let span = self.read_number_span()?;
        if span.contains(['.', 'e', 'E']) {
            return Err(CodecError::malformed(start, format!("expected integer, found {}", span)));
        }
        span.parse::<i128>().map_err(|e| match e.kind() {
            std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
                CodecError::Overflow {
                    value: span.to_string(),
                    target: "int".to_string(),
                }
            }
            _ => CodecError::malformed(start, format!("invalid integer {}", span)),
        })
    }

    pub fn read_float(&mut self) -> CodecResult<f64> {
        self.read_float_literal().map(|(_, f)| f)
    }

    /// Read a number as f64 along with its source text. A literal beyond the
    /// f64 range is `Overflow`.
    pub fn read_float_literal(&mut self) -> CodecResult<(&'a str, f64)> {
        let start = self.pos;
        let span = self.read_number_span()?;
        let f = span
            .parse::<f64>()
            .map_err(|_| CodecError::malformed(start, format!("invalid number {}", span)))?;
        if f.is_infinite() {
            return Err(CodecError::Overflow {
                value: span.to_string(),
                target: "float64".to_string(),
            });
        }
        Ok((span, f))
    }

    /// Iterate the elements of an array, handing the reader to `f` for each.
    pub fn read_array<F>(&mut self, mut f: F) -> CodecResult<()>
    where
        F: FnMut(&mut Reader<'a>) -> CodecResult<()>,
    {
        if !self.consume(b'[') {
            return Err(self.malformed("expected array"));
        }
        if self.consume(b']') {
            return Ok(());
        }

        loop {
            f(self)?;
            match self.next_token() {
                Some(b',') => continue,
                Some(b']') => return Ok(()),
                Some(_) => return Err(self.malformed("expected ',' or ']' in array")),
                None => return Err(self.malformed("unterminated array")),
            }
        }
    }

    /// Iterate the members of an object, handing the reader and key to `f`.
    pub fn read_object<F>(&mut self, mut f: F) -> CodecResult<()>
    where
        F: FnMut(&mut Reader<'a>, &str) -> CodecResult<()>,
    {
        if !self.consume(b'{') {
            return Err(self.malformed("expected object"));
        }
        if self.consume(b'}') {
            return Ok(());
        }

        loop {
            if self.is_eof() {
                return Err(self.malformed("unterminated object"));
            }
            let key = self.read_string()?;
            if !self.consume(b':') {
                return Err(self.malformed("expected ':' after object key"));
            }
            f(self, &key)?;
            match self.next_token() {
                Some(b',') => continue,
                Some(b'}') => return Ok(()),
                Some(_) => return Err(self.malformed("expected ',' or '}' in object")),
                None => return Err(self.malformed("unterminated object")),
            }
        }
    }

    /// Skip the next value of any type.
    pub fn skip(&mut self) -> CodecResult<()> {
        match self.peek_type() {
            JsonType::String => self.skip_string(),
            JsonType::Number => self.read_number_span().map(|_| ()),
            JsonType::Boolean => self.read_boolean().map(|_| ()),
            JsonType::Null => {
                self.read_null()?;
                Ok(())
            }
            JsonType::Array => self.skip_nested(b'[', b']', "array"),
            JsonType::Object => self.skip_nested(b'{', b'}', "object"),
            JsonType::Invalid | JsonType::Whitespace => {
                Err(self.malformed("unexpected character"))
            }
        }
    }

    pub fn skip_array(&mut self) -> CodecResult<()> {
        self.skip_nested(b'[', b']', "array")
    }

    pub fn skip_object(&mut self) -> CodecResult<()> {
        self.skip_nested(b'{', b'}', "object")
    }

    /// Skip a quoted string, honouring escaped quotes.
    pub fn skip_string(&mut self) -> CodecResult<()> {
        if !self.consume(b'"') {
            return Err(self.malformed("expected string"));
        }
        let start = self.pos;
        let mut i = start;
        while i < self.buf.len() {
            match self.buf[i] {
                b'\\' => i += 2,
                b'"' => {
                    self.pos = i + 1;
                    return Ok(());
                }
                _ => i += 1,
            }
        }
        Err(CodecError::malformed(start, "unterminated string"))
    }

    /// Skip a bracketed value by depth. Brackets inside strings do not count.
    fn skip_nested(&mut self, open: u8, close: u8, what: &str) -> CodecResult<()> {
        if !self.consume(open) {
            return Err(self.malformed(format!("expected {}", what)));
        }
        let start = self.pos - 1;
        let mut level = 1usize;

        while self.pos < self.buf.len() {
            let c = self.buf[self.pos];
            if c == b'"' {
                self.skip_string()?;
                continue;
            }
            self.pos += 1;
            if c == open {
                level += 1;
            } else if c == close {
                level -= 1;
                if level == 0 {
                    return Ok(());
                }
            }
        }
        Err(CodecError::malformed(start, format!("unterminated {}", what)))
    }

    /// Capture the next value's bytes, with whitespace outside strings dropped.
    pub fn read_bytes(&mut self) -> CodecResult<Vec<u8>> {
        self.skip_whitespace();
        let start = self.pos;
        self.skip()?;
        Ok(compact(&self.buf[start..self.pos]))
    }

    /// Read the next value into its generic dynamic form.
    ///
    /// Numbers become `Float`, arrays `List`, objects `Map`.
    pub fn read_value(&mut self) -> CodecResult<Value> {
        match self.peek_type() {
            JsonType::String => self.read_string().map(Value::String),
            JsonType::Number => self.read_float().map(Value::Float),
            JsonType::Boolean => self.read_boolean().map(Value::Bool),
            JsonType::Null => {
                self.read_null()?;
                Ok(Value::Null)
            }
            JsonType::Array => {
                let mut items = Vec::new();
                self.read_array(|it| {
                    items.push(it.read_value()?);
                    Ok(())
                })?;
                Ok(Value::List(items))
            }
            JsonType::Object => {
                let mut map = BTreeMap::new();
                self.read_object(|it, key| {
                    map.insert(key.to_string(), it.read_value()?);
                    Ok(())
                })?;
                Ok(Value::Map(map))
            }
            JsonType::Invalid | JsonType::Whitespace => Err(self.malformed("invalid json format")),
        }
    }
}

/// Drop insignificant whitespace outside strings.
pub fn compact(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for &c in input {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == b'\\' {
                escaped = true;
            } else if c == b'"' {
                in_string = false;
            }
            continue;
        }
        if is_whitespace(c) {
            continue;
        }
        if c == b'"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}

/// `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
fn is_json_number(span: &[u8]) -> bool {
    fn digits(s: &[u8], mut i: usize) -> usize {
        while i < s.len() && s[i].is_ascii_digit() {
            i += 1;
        }
        i
    }

    let mut i = usize::from(span.first().copied() == Some(b'-'));
    match span.get(i).copied() {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => i = digits(span, i),
        _ => return false,
    }
    if span.get(i).copied() == Some(b'.') {
        let end = digits(span, i + 1);
        if end == i + 1 {
            return false;
        }
        i = end;
    }
    if matches!(span.get(i).copied(), Some(b'e' | b'E')) {
        i += 1;
        if matches!(span.get(i).copied(), Some(b'+' | b'-')) {
            i += 1;
        }
        let end = digits(span, i);
        if end == i {
            return false;
        }
        i = end;
    }
    i == span.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(br#""a" "# => JsonType::String ; "string")]
    #[test_case(b"  -1" => JsonType::Number ; "number after whitespace")]
    #[test_case(b"true" => JsonType::Boolean ; "boolean")]
    #[test_case(b"\n null" => JsonType::Null ; "null")]
    #[test_case(b"[1]" => JsonType::Array ; "array")]
    #[test_case(b"{}" => JsonType::Object ; "object")]
    #[test_case(b"?" => JsonType::Invalid ; "invalid")]
    fn test_peek_type(input: &[u8]) -> JsonType {
        Reader::new(input).peek_type()
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut r = Reader::new(b"  true");
        r.peek_type();
        assert!(r.read_boolean().unwrap());
        assert!(r.is_eof());
    }

    #[test]
    fn test_unread_never_passes_start() {
        let mut r = Reader::new(b"x");
        r.unread_byte();
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_read_string_escapes() {
        let mut r = Reader::new(r#""a\"b\\c\/d\n\t\u00e9\ud83d\ude00 é""#.as_bytes());
        assert_eq!(r.read_string().unwrap(), "a\"b\\c/d\n\té😀 é");
    }

    #[test]
    fn test_unterminated_string_is_malformed() {
        let mut r = Reader::new(br#""abc"#);
        assert!(matches!(
            r.read_string(),
            Err(CodecError::MalformedInput { position: 1, .. })
        ));
    }

    #[test]
    fn test_skip_ignores_brackets_in_strings() {
        let mut r = Reader::new(br#"[ "]", "\"]", {"k": "}"} ] 7"#);
        r.skip_array().unwrap();
        assert_eq!(r.read_integer().unwrap(), 7);

        let mut r = Reader::new(br#"{"a": "{{", "b": ["}"]} true"#);
        r.skip_object().unwrap();
        assert!(r.read_boolean().unwrap());
    }

    #[test_case(b"[1, 2" ; "unterminated array")]
    #[test_case(b"{\"a\": 1" ; "unterminated object")]
    #[test_case(b"[\"]" ; "string swallows close")]
    fn test_skip_unterminated(input: &[u8]) {
        assert!(matches!(
            Reader::new(input).skip(),
            Err(CodecError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_read_object_and_array() {
        let mut r = Reader::new(br#" { "a" : [1, 2 ,3], "b": {} } "#);
        let mut keys = Vec::new();
        let mut sum = 0;
        r.read_object(|it, key| {
            keys.push(key.to_string());
            if key == "a" {
                it.read_array(|it| {
                    sum += it.read_integer()?;
                    Ok(())
                })
            } else {
                it.skip()
            }
        })
        .unwrap();

        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(sum, 6);
    }

    #[test]
    fn test_read_bytes_compacts_outside_strings() {
        let mut r = Reader::new(br#"{ "a b" : [ 1 , 2 ] } , 3"#);
        assert_eq!(r.read_bytes().unwrap(), br#"{"a b":[1,2]}"#.to_vec());
    }

    #[test]
    fn test_read_value_generic() {
        let mut r = Reader::new(br#"{"n": 1.5, "l": [true, null, "x"]}"#);
        let value = r.read_value().unwrap();

        let mut expected = BTreeMap::new();
        expected.insert("n".to_string(), Value::Float(1.5));
        expected.insert(
            "l".to_string(),
            Value::List(vec![Value::Bool(true), Value::Null, Value::from("x")]),
        );
        assert_eq!(value, Value::Map(expected));
    }

    #[test]
    fn test_read_integer_rejects_fraction() {
        assert!(matches!(
            Reader::new(b"1.5").read_integer(),
            Err(CodecError::MalformedInput { .. })
        ));
    }

    #[test_case(b"01" ; "leading zero")]
    #[test_case(b"-" ; "bare minus")]
    #[test_case(b"+1" ; "plus sign")]
    #[test_case(b"1." ; "empty fraction")]
    #[test_case(b".5" ; "missing integer part")]
    #[test_case(b"1e" ; "empty exponent")]
    #[test_case(b"1-2" ; "trailing sign")]
    fn test_number_grammar_rejects(input: &[u8]) {
        assert!(matches!(
            Reader::new(input).read_number_span(),
            Err(CodecError::MalformedInput { .. })
        ));
    }

    #[test_case(b"0" ; "zero")]
    #[test_case(b"-0.5" ; "negative fraction")]
    #[test_case(b"1.5E0" ; "upper exponent")]
    #[test_case(b"-2.5e-3" ; "signed exponent")]
    #[test_case(b"10E+2" ; "plus exponent")]
    fn test_number_grammar_accepts(input: &[u8]) {
        let span = Reader::new(input).read_number_span().unwrap();
        assert_eq!(span.as_bytes(), input);
    }

    #[test]
    fn test_float_beyond_f64_range_overflows() {
        assert!(matches!(
            Reader::new(b"1e400").read_float(),
            Err(CodecError::Overflow { value, .. }) if value == "1e400"
        ));
        assert_eq!(Reader::new(b"1e308").read_float().unwrap(), 1e308);
    }

    #[test_case(br#""\u+041""# ; "plus sign")]
    #[test_case(br#""\u 041""# ; "space")]
    #[test_case(br#""\u00G1""# ; "non hex")]
    fn test_unicode_escape_requires_hex_digits(input: &[u8]) {
        assert!(matches!(
            Reader::new(input).read_string(),
            Err(CodecError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_bad_literal() {
        assert!(Reader::new(b"tru").read_boolean().is_err());
        assert!(Reader::new(b"nul").read_null().is_err());
        assert!(!Reader::new(b"1").read_null().unwrap());
    }
}

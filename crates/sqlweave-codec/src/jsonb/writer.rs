//! Append-only JSON output buffer.

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Growable output buffer for encoders.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    pub fn write_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn write_null(&mut self) {
        self.buf.extend_from_slice(b"null");
    }

    /// Write `s` as a quoted, escaped string.
    pub fn write_quoted(&mut self, s: &str) {
        self.buf.push(b'"');
        self.write_escaped(s);
        self.buf.push(b'"');
    }

    /// Write `s` with JSON string escaping, without quotes.
    pub fn write_escaped(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let mut start = 0;

        for (i, &c) in bytes.iter().enumerate() {
            let escape: &[u8] = match c {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                b'\t' => b"\\t",
                0x08 => b"\\b",
                0x0c => b"\\f",
                c if c < 0x20 => {
                    self.buf.extend_from_slice(&bytes[start..i]);
                    self.buf.extend_from_slice(b"\\u00");
                    self.buf.push(HEX[(c >> 4) as usize]);
                    self.buf.push(HEX[(c & 0xf) as usize]);
                    start = i + 1;
                    continue;
                }
                _ => continue,
            };
            self.buf.extend_from_slice(&bytes[start..i]);
            self.buf.extend_from_slice(escape);
            start = i + 1;
        }
        self.buf.extend_from_slice(&bytes[start..]);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_quoted_escapes() {
        let mut w = Writer::new();
        w.write_quoted("a\"b\\c\nd\u{1}é");

        assert_eq!(w.as_bytes(), "\"a\\\"b\\\\c\\nd\\u0001é\"".as_bytes());
    }

    #[test]
    fn test_escaped_output_is_valid_json() {
        let input = "tab\there \u{7f} \"quoted\" \u{0}";
        let mut w = Writer::new();
        w.write_quoted(input);

        let parsed: String = serde_json::from_slice(w.as_bytes()).unwrap();
        assert_eq!(parsed, input);
    }
}

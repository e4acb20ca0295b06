//! Patch messages, header captures, and the records derived from them.

use std::borrow::Cow;
use std::fmt;

/// UTF-8 byte order mark, skipped when decoding as UTF-8.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A text encoding a patch file may be decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// Strict UTF-8.
    Utf8,
    /// GBK (decoded with the GB18030-compatible `encoding_rs` decoder).
    Gbk,
}

impl TextEncoding {
    /// Candidate decoders in the order they are tried.
    pub const CANDIDATES: [TextEncoding; 2] = [TextEncoding::Utf8, TextEncoding::Gbk];

    /// Decode `bytes` without replacement characters.
    ///
    /// Returns `None` if any byte sequence is malformed for this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            Self::Utf8 => std::str::from_utf8(strip_bom(bytes))
                .ok()
                .map(Cow::Borrowed),
            Self::Gbk => encoding_rs::GBK.decode_without_bom_handling_and_without_replacement(bytes),
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Gbk => "gbk",
        }
    }

    /// Number of leading bytes this encoding skips before the text starts.
    fn preamble_len(self, bytes: &[u8]) -> usize {
        match self {
            Self::Utf8 if bytes.starts_with(UTF8_BOM) => UTF8_BOM.len(),
            _ => 0,
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// One patch file decoded under a specific encoding.
///
/// Lines keep their terminators so slices of the text reproduce the file
/// verbatim. Neither encoding ever produces a `\n` byte inside a multi-byte
/// sequence, so line `n` of the text starts right after the `n`-th `\n` of
/// the raw bytes.
#[derive(Debug)]
pub struct PatchMessage<'a> {
    raw: &'a [u8],
    text: Cow<'a, str>,
    encoding: TextEncoding,
}

impl<'a> PatchMessage<'a> {
    /// Decode `raw` with `encoding`, or `None` if it is not valid in it.
    pub fn decode(raw: &'a [u8], encoding: TextEncoding) -> Option<Self> {
        let text = encoding.decode(raw)?;
        Some(Self {
            raw,
            text,
            encoding,
        })
    }

    /// The encoding this message was decoded with.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Lines of the decoded text, each including its `\n` if present.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split_inclusive('\n')
    }

    /// Decoded text from the start of line `index` to the end.
    pub fn text_from_line(&self, index: usize) -> &str {
        let start: usize = self.lines().take(index).map(str::len).sum();
        &self.text[start..]
    }

    /// Raw source bytes from the start of line `index` to the end.
    pub fn raw_from_line(&self, index: usize) -> &'a [u8] {
        let start = if index == 0 {
            self.encoding.preamble_len(self.raw)
        } else {
            self.raw
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == b'\n')
                .nth(index - 1)
                .map(|(pos, _)| pos + 1)
                .unwrap_or(self.raw.len())
        };
        &self.raw[start..]
    }
}

/// The two headers located in a patch message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCapture {
    /// Text after `Subject:`, trimmed.
    pub subject: String,
    /// Text after `Date:`, trimmed.
    pub date: String,
    /// Zero-based line index of the first `Subject:` line.
    pub subject_line_index: usize,
}

/// A commit date reduced to its wall-clock fields.
///
/// The `YYYYMMDDhhmmss` digits exactly as written in the header, each field
/// zero-padded to two digits. Fields are not checked against the calendar,
/// so `23:59:60` survives, and any timezone offset was dropped, not applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedDate(String);

impl NormalizedDate {
    pub(crate) fn from_fields(fields: [&str; 6]) -> Self {
        Self(fields.concat())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One extracted message, ready to be written.
#[derive(Debug, Clone)]
pub struct Record {
    /// Sanitized file name (`{date}_{subject}.txt`).
    pub name: String,

    /// Normalized commit date.
    pub date: NormalizedDate,

    /// The `Date:` header value as found in the message.
    pub raw_date: String,

    /// The `Subject:` header value as found in the message.
    pub subject: String,

    /// Encoding the source file was decoded with.
    pub encoding: TextEncoding,

    /// Decoded text from the `Subject:` line to end of file.
    pub body: String,

    /// Source bytes from the `Subject:` line to end of file, unmodified.
    pub raw_body: Vec<u8>,
}

impl Record {
    /// Render the record as it is appended to a rolling output file.
    ///
    /// A `Date:` line carries the commit date (it precedes `Subject:` in
    /// the source and is otherwise cut off), line endings become `\n`, and a
    /// blank line separates this record from the next.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.body.len() + self.raw_date.len() + 16);
        text.push_str("Date: ");
        text.push_str(&self.raw_date);
        text.push('\n');
        text.push_str(&self.body.replace("\r\n", "\n"));
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_rejects_gbk_bytes() {
        // "修复" in GBK
        let raw = [0xD0, 0xDE, 0xB8, 0xB4];
        assert!(TextEncoding::Utf8.decode(&raw).is_none());
        assert_eq!(TextEncoding::Gbk.decode(&raw).as_deref(), Some("修复"));
    }

    #[test]
    fn test_gbk_rejects_malformed() {
        // Lead byte with no trail byte
        assert!(TextEncoding::Gbk.decode(&[b'a', 0x81]).is_none());
    }

    #[test]
    fn test_raw_from_line() {
        let raw = b"From: a\nSubject: x\nbody\n";
        let msg = PatchMessage::decode(raw, TextEncoding::Utf8).unwrap();
        assert_eq!(msg.raw_from_line(0), raw);
        assert_eq!(msg.raw_from_line(1), b"Subject: x\nbody\n");
        assert_eq!(msg.text_from_line(1), "Subject: x\nbody\n");
        assert_eq!(msg.raw_from_line(9), b"");
    }

    #[test]
    fn test_raw_from_line_skips_bom() {
        let raw = b"\xEF\xBB\xBFSubject: x\n";
        let msg = PatchMessage::decode(raw, TextEncoding::Utf8).unwrap();
        assert_eq!(msg.raw_from_line(0), b"Subject: x\n");
        assert_eq!(msg.text_from_line(0), "Subject: x\n");
    }

    #[test]
    fn test_normalized_date_display() {
        let date = NormalizedDate::from_fields(["2025", "01", "02", "03", "04", "05"]);
        assert_eq!(date.to_string(), "20250102030405");
        assert_eq!(date.as_str(), "20250102030405");
    }

    #[test]
    fn test_record_to_text() {
        let record = Record {
            name: "n.txt".into(),
            date: NormalizedDate::from_fields(["1970", "01", "01", "00", "00", "00"]),
            raw_date: "Mon, 27 Oct 2025 18:00:20 +0800".into(),
            subject: "x".into(),
            encoding: TextEncoding::Utf8,
            body: "Subject: x\r\n\r\nbody".into(),
            raw_body: Vec::new(),
        };
        assert_eq!(
            record.to_text(),
            "Date: Mon, 27 Oct 2025 18:00:20 +0800\nSubject: x\n\nbody\n\n"
        );
    }
}

//! Header scanning for patch messages and RFC 2047 subject decoding.

use tracing::warn;

use crate::error::ExtractError;
use crate::model::record::HeaderCapture;

const SUBJECT_PREFIX: &str = "Subject:";
const DATE_PREFIX: &str = "Date:";

/// Find the first `Subject:` and first `Date:` line.
///
/// Leading whitespace is ignored when matching; the prefixes are
/// case-sensitive and must include the colon. Later occurrences of either
/// header are ignored.
pub fn scan_headers<'l>(
    lines: impl IntoIterator<Item = &'l str>,
) -> Result<HeaderCapture, ExtractError> {
    let mut subject: Option<(usize, String)> = None;
    let mut date: Option<String> = None;

    for (index, line) in lines.into_iter().enumerate() {
        let stripped = line.trim_start();
        if subject.is_none() && stripped.starts_with(SUBJECT_PREFIX) {
            subject = Some((index, header_value(line)));
        }
        if date.is_none() && stripped.starts_with(DATE_PREFIX) {
            date = Some(header_value(line));
        }
        if subject.is_some() && date.is_some() {
            break;
        }
    }

    let (subject_line_index, subject) = subject.ok_or(ExtractError::MissingSubject)?;
    let date = date.ok_or(ExtractError::MissingDate)?;
    Ok(HeaderCapture {
        subject,
        date,
        subject_line_index,
    })
}

/// Everything after the first `:`, trimmed.
fn header_value(line: &str) -> String {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// `git format-patch` writes non-ASCII subjects as
/// `=?UTF-8?q?=E4=BF=AE=E5=A4=8D?=`. Tokens that fail to decode are kept
/// as-is. Whitespace between two adjacent encoded words is dropped, but
/// only when the second one decodes.
pub fn decode_encoded_words(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;
    let mut last_was_encoded = false;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];
        let word = &remaining[start + 2..];
        match decode_one_word(word) {
            Some((text, consumed)) => {
                if !last_was_encoded || !before.trim().is_empty() {
                    result.push_str(before);
                }
                result.push_str(&text);
                remaining = &word[consumed..];
                last_was_encoded = true;
            }
            None => {
                result.push_str(before);
                result.push_str("=?");
                remaining = word;
                last_was_encoded = false;
            }
        }
    }

    result.push_str(remaining);
    result
}

/// Decode `charset?encoding?text?=` (the part after `=?`).
///
/// Returns the text and the number of bytes consumed.
fn decode_one_word(s: &str) -> Option<(String, usize)> {
    let (charset, rest) = s.split_once('?')?;
    let (encoding, rest) = rest.split_once('?')?;
    let end = rest.find("?=")?;
    let encoded = &rest[..end];
    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return None;
    }

    let bytes = match encoding {
        "B" | "b" => decode_base64(encoded)?,
        "Q" | "q" => decode_q(encoded),
        _ => return None,
    };

    let consumed = charset.len() + 1 + encoding.len() + 1 + end + 2;
    Some((decode_charset(charset, &bytes), consumed))
}

fn decode_base64(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 3 / 4);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;

    for c in input.bytes() {
        let val = match c {
            b'A'..=b'Z' => c - b'A',
            b'a'..=b'z' => c - b'a' + 26,
            b'0'..=b'9' => c - b'0' + 52,
            b'+' => 62,
            b'/' => 63,
            b'=' => break,
            b' ' | b'\t' | b'\r' | b'\n' => continue,
            _ => return None,
        };
        acc = (acc << 6) | u32::from(val);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
            acc &= (1 << bits) - 1;
        }
    }
    Some(out)
}

/// Q-encoding: `_` is a space, `=XX` is a byte.
fn decode_q(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => out.push(b' '),
            b'=' if i + 3 <= bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                if let Some(byte) = hex {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                out.push(b'=');
            }
            b => out.push(b),
        }
        i += 1;
    }
    out
}

fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    // RFC 2231 language suffix: "UTF-8*zh"
    let label = charset.split('*').next().unwrap_or(charset);
    match encoding_rs::Encoding::for_label(label.as_bytes()) {
        Some(encoding) => encoding.decode(bytes).0.into_owned(),
        None => {
            warn!(charset = label, "Unknown charset, falling back to UTF-8 lossy");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_format_patch_preamble() {
        let lines = [
            "From 1234abcd Mon Sep 17 00:00:00 2001\n",
            "From: Dev <dev@example.com>\n",
            "Date: Mon, 27 Oct 2025 18:00:20 +0800\n",
            "Subject: [PATCH] Fix crash\n",
            "\n",
            "body\n",
        ];
        let capture = scan_headers(lines).unwrap();
        assert_eq!(capture.subject, "[PATCH] Fix crash");
        assert_eq!(capture.date, "Mon, 27 Oct 2025 18:00:20 +0800");
        assert_eq!(capture.subject_line_index, 3);
    }

    #[test]
    fn test_scan_first_occurrence_wins() {
        let lines = [
            "Subject: first\n",
            "Date: 1 Jan 2024 00:00:00\n",
            "Subject: second\n",
            "Date: 2 Jan 2024 00:00:00\n",
        ];
        let capture = scan_headers(lines).unwrap();
        assert_eq!(capture.subject, "first");
        assert_eq!(capture.date, "1 Jan 2024 00:00:00");
        assert_eq!(capture.subject_line_index, 0);
    }

    #[test]
    fn test_scan_leading_whitespace() {
        let lines = ["  Date: 1 Jan 2024 00:00:00", "\tSubject:  spaced  "];
        let capture = scan_headers(lines).unwrap();
        assert_eq!(capture.subject, "spaced");
        assert_eq!(capture.subject_line_index, 1);
    }

    #[test]
    fn test_scan_case_sensitive() {
        let lines = ["subject: lower", "Date: 1 Jan 2024 00:00:00"];
        assert!(matches!(
            scan_headers(lines),
            Err(ExtractError::MissingSubject)
        ));
    }

    #[test]
    fn test_scan_requires_colon() {
        let lines = ["Subject here", "Date 1 Jan 2024"];
        assert!(matches!(
            scan_headers(lines),
            Err(ExtractError::MissingSubject)
        ));
    }

    #[test]
    fn test_scan_missing_date() {
        let lines = ["Subject: only a subject", "body"];
        assert!(matches!(scan_headers(lines), Err(ExtractError::MissingDate)));
    }

    #[test]
    fn test_scan_date_after_subject() {
        let lines = ["Subject: s", "x", "Date: 3 Feb 2024 01:02:03"];
        let capture = scan_headers(lines).unwrap();
        assert_eq!(capture.date, "3 Feb 2024 01:02:03");
    }

    #[test]
    fn test_decode_q_utf8_subject() {
        let input = "=?UTF-8?q?[PATCH]=20=E4=BF=AE=E5=A4=8D?=";
        assert_eq!(decode_encoded_words(input), "[PATCH] 修复");
    }

    #[test]
    fn test_decode_base64_subject() {
        assert_eq!(decode_encoded_words("=?UTF-8?B?SG9sYSBtdW5kbw==?="), "Hola mundo");
    }

    #[test]
    fn test_decode_adjacent_words() {
        let input = "=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?=";
        assert_eq!(decode_encoded_words(input), "Hola mundo");
    }

    #[test]
    fn test_decode_iso8859_q() {
        assert_eq!(decode_encoded_words("=?ISO-8859-1?Q?caf=E9?="), "café");
    }

    #[test]
    fn test_gap_kept_before_invalid_word() {
        assert_eq!(decode_encoded_words("=?UTF-8?q?a?= =?not"), "a =?not");
        assert_eq!(
            decode_encoded_words("=?UTF-8?q?a?= =?x?z?b?= =?UTF-8?q?c?="),
            "a =?x?z?b?= c"
        );
    }

    #[test]
    fn test_decode_plain_passthrough() {
        assert_eq!(decode_encoded_words("Fix a=?b bug"), "Fix a=?b bug");
        assert_eq!(decode_encoded_words("plain"), "plain");
    }
}

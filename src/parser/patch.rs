//! Record extraction from a single `git format-patch` file.

use std::path::Path;

use tracing::debug;

use crate::error::ExtractError;
use crate::export::filename::record_file_name;
use crate::model::record::{HeaderCapture, PatchMessage, Record, TextEncoding};
use crate::parser::date::normalize_date;
use crate::parser::header::{decode_encoded_words, scan_headers};

/// Knobs for record extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Resolve RFC 2047 encoded-words in the subject before naming the file.
    pub decode_subject: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            decode_subject: true,
        }
    }
}

/// Read a patch file and extract its record.
pub fn extract_record(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<Record, ExtractError> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|e| ExtractError::read(path, e))?;
    extract_record_from_bytes(&raw, options)
}

/// Extract a record from the raw bytes of a patch message.
///
/// The body runs from the first `Subject:` line to end of input; the
/// preamble before it is dropped.
pub fn extract_record_from_bytes(
    raw: &[u8],
    options: &ExtractOptions,
) -> Result<Record, ExtractError> {
    let (message, capture) = locate_headers(raw)?;

    let date = normalize_date(&capture.date).map_err(|reason| ExtractError::InvalidDate {
        raw: capture.date.clone(),
        reason,
    })?;

    let name = if options.decode_subject {
        record_file_name(&date.to_string(), &decode_encoded_words(&capture.subject))
    } else {
        record_file_name(&date.to_string(), &capture.subject)
    };

    let index = capture.subject_line_index;
    Ok(Record {
        name,
        date,
        encoding: message.encoding(),
        body: message.text_from_line(index).to_string(),
        raw_body: message.raw_from_line(index).to_vec(),
        raw_date: capture.date,
        subject: capture.subject,
    })
}

/// Decode `raw` with each candidate encoding until one yields both headers.
///
/// When every candidate fails, the header error of the first candidate that
/// decoded is returned; if none decoded, [`ExtractError::Undecodable`].
pub fn locate_headers(raw: &[u8]) -> Result<(PatchMessage<'_>, HeaderCapture), ExtractError> {
    let mut first_error: Option<ExtractError> = None;

    for encoding in TextEncoding::CANDIDATES {
        let Some(message) = PatchMessage::decode(raw, encoding) else {
            debug!(encoding = %encoding, "Message does not decode");
            continue;
        };
        match scan_headers(message.lines()) {
            Ok(capture) => return Ok((message, capture)),
            Err(e) => {
                debug!(encoding = %encoding, error = %e, "Headers not found");
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.unwrap_or_else(|| ExtractError::Undecodable {
        tried: TextEncoding::CANDIDATES
            .iter()
            .map(|e| e.label())
            .collect::<Vec<_>>()
            .join(", "),
    }))
}

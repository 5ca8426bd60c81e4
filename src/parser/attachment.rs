//! Attachment extraction from a single MIME part's `Content-Disposition`.

use std::collections::BTreeMap;

use mailparse::{MailHeaderMap, ParsedMail};
use tracing::trace;

use crate::error::{ParseError, Result};
use crate::model::attachment::Attachment;
use crate::parser::header::raw_value;
use crate::parser::mime::{decode_payload, mime_type};

const DISPOSITION_HEADER: &str = "Content-Disposition";

/// The part's `Content-Disposition` value, unfolded but not decoded.
pub fn disposition(part: &ParsedMail<'_>) -> Option<String> {
    part.headers.get_first_header(DISPOSITION_HEADER).map(raw_value)
}

/// Build an [`Attachment`] from a part whose disposition is `attachment` or
/// `inline`.
///
/// Returns `Ok(None)` when the part has no disposition or an unrecognised
/// one. Parameters are read from the `;`-separated tail of the header:
/// `attachment; filename="a.txt"` gives `params["filename"] == "a.txt"`.
///
/// # Errors
///
/// A parameter without `=` or a payload that cannot be decoded aborts the
/// whole message.
pub fn extract_attachment(part: &ParsedMail<'_>) -> Result<Option<Attachment>> {
    let Some(disposition) = disposition(part) else {
        return Ok(None);
    };

    let mut tokens = disposition.split(';');
    let kind = tokens.next().unwrap_or_default().trim();
    if !is_attachment_kind(kind) {
        trace!(disposition = %disposition, "Disposition is not an attachment, skipping part");
        return Ok(None);
    }

    let params = parse_params(tokens)?;
    let content = decode_payload(part)?;

    Ok(Some(Attachment {
        content_type: mime_type(part),
        size: content.len(),
        content,
        params,
    }))
}

fn is_attachment_kind(kind: &str) -> bool {
    kind.eq_ignore_ascii_case("attachment") || kind.eq_ignore_ascii_case("inline")
}

/// Parse `key=value` disposition parameters; later duplicates win.
///
/// Every token after the first `;` must contain `=`, so a blank token such
/// as the one left by a trailing `;` is rejected too.
fn parse_params<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<BTreeMap<String, String>> {
    tokens
        .map(|token| {
            let (key, value) =
                token
                    .split_once('=')
                    .ok_or_else(|| ParseError::DispositionParam {
                        param: token.trim().to_string(),
                    })?;
            Ok((
                key.trim().to_lowercase(),
                value.trim().trim_matches('"').to_string(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(raw: &str) -> Result<Option<Attachment>> {
        let part = mailparse::parse_mail(raw.as_bytes()).unwrap();
        extract_attachment(&part)
    }

    #[test]
    fn test_attachment_with_filename() {
        let att = extract(
            "Content-Type: text/plain\nContent-Disposition: attachment; filename=\"a.txt\"\n\ndata",
        )
        .unwrap()
        .unwrap();
        assert_eq!(att.content_type, "text/plain");
        assert_eq!(att.size, 4);
        assert_eq!(att.content, b"data");
        assert_eq!(att.params["filename"], "a.txt");
        assert_eq!(att.filename(), Some("a.txt"));
    }

    #[test]
    fn test_no_disposition() {
        assert!(extract("Content-Type: image/png\n\nxyz").unwrap().is_none());
    }

    #[test]
    fn test_unrecognised_disposition() {
        let raw = "Content-Type: text/plain\nContent-Disposition: form-data; name=x\n\nv";
        assert!(extract(raw).unwrap().is_none());
        let raw = "Content-Type: text/plain\nContent-Disposition: \n\nv";
        assert!(extract(raw).unwrap().is_none());
    }

    #[test]
    fn test_bare_inline() {
        let att = extract("Content-Type: image/gif\nContent-Disposition: INLINE\n\nGIF")
            .unwrap()
            .unwrap();
        assert_eq!(att.content_type, "image/gif");
        assert!(att.params.is_empty());
    }

    #[test]
    fn test_param_keys_lowercased_values_unquoted() {
        let raw = "Content-Type: application/pdf\n\
                   Content-Disposition: Attachment; FileName=\"Report Q1.pdf\" ; size=1024\n\
                   \n%PDF";
        let att = extract(raw).unwrap().unwrap();
        assert_eq!(att.params["filename"], "Report Q1.pdf");
        assert_eq!(att.params["size"], "1024");
        assert_eq!(att.params.len(), 2);
    }

    #[test]
    fn test_folded_disposition() {
        let raw = "Content-Type: text/csv\n\
                   Content-Disposition: attachment;\n \
                   filename=\"long.csv\"\n\na,b";
        let att = extract(raw).unwrap().unwrap();
        assert_eq!(att.filename(), Some("long.csv"));
    }

    #[test]
    fn test_param_without_equals_is_fatal() {
        let raw = "Content-Type: text/plain\nContent-Disposition: attachment; filename\n\ndata";
        let err = extract(raw).unwrap_err();
        assert!(matches!(err, ParseError::DispositionParam { ref param } if param == "filename"));
    }

    #[test]
    fn test_trailing_semicolon_is_fatal() {
        let raw = "Content-Type: application/pdf\n\
                   Content-Disposition: attachment; filename=\"x.pdf\";\n\n%PDF";
        let err = extract(raw).unwrap_err();
        assert!(matches!(err, ParseError::DispositionParam { ref param } if param.is_empty()));

        let raw = "Content-Type: application/pdf\n\
                   Content-Disposition: attachment;; filename=\"x.pdf\"\n\n%PDF";
        assert!(matches!(extract(raw), Err(ParseError::DispositionParam { .. })));
    }

    #[test]
    fn test_base64_payload_decoded() {
        let raw = "Content-Type: application/octet-stream\n\
                   Content-Transfer-Encoding: base64\n\
                   Content-Disposition: attachment; filename=d.bin\n\nZGF0YQ==\n";
        let att = extract(raw).unwrap().unwrap();
        assert_eq!(att.content, b"data");
        assert_eq!(att.size, 4);
    }

    #[test]
    fn test_invalid_base64_is_fatal() {
        let raw = "Content-Type: application/octet-stream\n\
                   Content-Transfer-Encoding: base64\n\
                   Content-Disposition: attachment; filename=d.bin\n\n!!!!not base64!!!!\n";
        assert!(matches!(extract(raw), Err(ParseError::Payload { .. })));
    }
}

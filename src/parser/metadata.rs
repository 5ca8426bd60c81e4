//! Whitelisted header extraction: decoded single-value fields and raw
//! pass-through headers.

use mailparse::MailHeader;

use crate::model::mail::HeaderField;
use crate::parser::header::{decode_mail_header, raw_value};

/// Header-derived fields of a [`crate::model::mail::ParsedEmail`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub subject: Option<String>,
    pub date: Option<String>,
    pub message_id: Option<String>,
    pub headers: Vec<HeaderField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderRole {
    Subject,
    Date,
    MessageId,
    /// Copied through undecoded.
    PassThrough,
}

/// Lookup table of the headers we keep, by lowercase name.
fn role_of(name: &str) -> Option<HeaderRole> {
    match name.trim().to_ascii_lowercase().as_str() {
        "subject" => Some(HeaderRole::Subject),
        "date" => Some(HeaderRole::Date),
        "message-id" => Some(HeaderRole::MessageId),
        "received-spf" | "mime-version" | "x-spam-status" | "x-spam-score" | "content-type" => {
            Some(HeaderRole::PassThrough)
        }
        _ => None,
    }
}

/// Collect the whitelisted headers of a message.
///
/// `Subject`, `Date` and `Message-ID` are RFC 2047 decoded; when repeated,
/// the last occurrence wins. Pass-through headers keep their raw value and
/// original name casing, and every occurrence is kept.
pub fn extract_metadata(headers: &[MailHeader<'_>], default_charset: &str) -> Metadata {
    headers.iter().fold(Metadata::default(), |mut meta, header| {
        let name = header.get_key();
        let Some(role) = role_of(&name) else {
            return meta;
        };

        let value = raw_value(header);
        match role {
            HeaderRole::Subject => meta.subject = Some(decode_mail_header(&value, default_charset)),
            HeaderRole::Date => meta.date = Some(decode_mail_header(&value, default_charset)),
            HeaderRole::MessageId => {
                meta.message_id = Some(decode_mail_header(&value, default_charset))
            }
            HeaderRole::PassThrough => meta.headers.push(HeaderField { name, value }),
        }
        meta
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::header::DEFAULT_CHARSET;

    fn extract(raw: &str) -> Metadata {
        let (headers, _) = mailparse::parse_headers(raw.as_bytes()).unwrap();
        extract_metadata(&headers, DEFAULT_CHARSET)
    }

    #[test]
    fn test_role_lookup_is_case_insensitive() {
        assert_eq!(role_of("SUBJECT"), Some(HeaderRole::Subject));
        assert_eq!(role_of("Message-Id"), Some(HeaderRole::MessageId));
        assert_eq!(role_of("X-Spam-Score"), Some(HeaderRole::PassThrough));
        assert_eq!(role_of("X-Mailer"), None);
    }

    #[test]
    fn test_single_value_fields_decoded() {
        let meta = extract(
            "Subject: =?UTF-8?B?SGVsbG8=?=\nDate: Thu, 04 Jan 2024 10:00:00 +0000\n\
             Message-ID: <abc@example.com>\n\n",
        );
        assert_eq!(meta.subject.as_deref(), Some("Hello"));
        assert_eq!(meta.date.as_deref(), Some("Thu, 04 Jan 2024 10:00:00 +0000"));
        assert_eq!(meta.message_id.as_deref(), Some("<abc@example.com>"));
    }

    #[test]
    fn test_later_single_value_overwrites() {
        let meta = extract("Subject: first\nsubject: second\n\n");
        assert_eq!(meta.subject.as_deref(), Some("second"));
    }

    #[test]
    fn test_pass_through_raw_and_cased() {
        let meta = extract(
            "MIME-Version: 1.0\nX-Spam-Status: No, score=-1.0\nx-spam-status: Yes\n\
             Content-Type: text/plain; charset=\"=?x?\"\nX-Mailer: test\n\n",
        );
        let names: Vec<&str> = meta.headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["MIME-Version", "X-Spam-Status", "x-spam-status", "Content-Type"]
        );
        assert_eq!(meta.headers[1].value, "No, score=-1.0");
        assert_eq!(meta.headers[3].value, "text/plain; charset=\"=?x?\"");
    }

    #[test]
    fn test_pass_through_not_decoded() {
        let meta = extract("Received-SPF: =?UTF-8?B?SGVsbG8=?=\n\n");
        assert_eq!(meta.headers[0].value, "=?UTF-8?B?SGVsbG8=?=");
        assert_eq!(meta.subject, None);
    }
}

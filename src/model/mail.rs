//! The parsed message record and its body type.

use chrono::{DateTime, Utc};

use super::address::Address;
use super::attachment::Attachment;

/// Structured, decoded view of one raw message.
///
/// Built in a single pass by [`crate::parser::mime::EmailParser`] and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ParsedEmail {
    /// The input text, retained verbatim.
    pub raw_email: String,

    /// Inline body payloads in MIME walk order.
    pub body: Body,

    /// Parts with an `attachment` or `inline` disposition, in walk order.
    pub attachments: Vec<Attachment>,

    /// Mailboxes from every `From:` header.
    pub sent_from: Vec<Address>,

    /// Mailboxes from every `To:` header.
    pub sent_to: Vec<Address>,

    /// Decoded `Subject:` (RFC 2047 encoded-words resolved).
    pub subject: Option<String>,

    /// Decoded `Date:` exactly as it appeared.
    pub date: Option<String>,

    /// Decoded `Message-ID:`.
    pub message_id: Option<String>,

    /// `date` converted to a timestamp, when it could be understood.
    pub parsed_date: Option<DateTime<Utc>>,

    /// Whitelisted headers with their raw, undecoded values.
    pub headers: Vec<HeaderField>,
}

impl ParsedEmail {
    /// Serialize the record as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Body payloads, each still in the charset of the part it came from.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Body {
    pub plain: Vec<Vec<u8>>,
    pub html: Vec<Vec<u8>>,
}

impl Body {
    /// `true` if neither a plain nor an HTML payload was found.
    pub fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.html.is_empty()
    }

    /// Plain payloads as text (lossy UTF-8), for display.
    pub fn plain_text(&self) -> Vec<String> {
        lossy(&self.plain)
    }

    /// HTML payloads as text (lossy UTF-8), for display.
    pub fn html_text(&self) -> Vec<String> {
        lossy(&self.html)
    }
}

fn lossy(payloads: &[Vec<u8>]) -> Vec<String> {
    payloads
        .iter()
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .collect()
}

/// A header copied through without decoding.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct HeaderField {
    /// Header name in the casing used by the message.
    pub name: String,
    /// Raw value with line folding removed and the ends trimmed. Encoded
    /// words are left as written.
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_text_accessors() {
        let body = Body {
            plain: vec![b"hello".to_vec()],
            html: vec![b"<p>hi</p>".to_vec()],
        };
        assert!(!body.is_empty());
        assert_eq!(body.plain_text(), vec!["hello".to_string()]);
        assert_eq!(body.html_text(), vec!["<p>hi</p>".to_string()]);
    }

    #[test]
    fn test_to_json_contains_fields() {
        let parsed = ParsedEmail {
            subject: Some("Hi".to_string()),
            ..Default::default()
        };
        let json = parsed.to_json().unwrap();
        assert!(json.contains("\"subject\": \"Hi\""));
        assert!(json.contains("\"parsed_date\": null"));
    }
}

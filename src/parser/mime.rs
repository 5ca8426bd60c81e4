//! MIME message parsing: tree walking, body routing, and attachment collection.

use mailparse::{MailHeaderMap, ParsedMail};
use tracing::{debug, trace};

use crate::config::{load_config, Config, ParserConfig};
use crate::error::{ParseError, Result};
use crate::model::attachment::Attachment;
use crate::model::mail::{Body, ParsedEmail};
use crate::parser::address::parse_address_headers;
use crate::parser::attachment::{disposition, extract_attachment};
use crate::parser::date::parse_date;
use crate::parser::header::raw_value;
use crate::parser::metadata::extract_metadata;

/// Turns raw RFC 5322 text into a [`ParsedEmail`].
///
/// Holds only configuration, so one parser can be shared freely between
/// threads.
#[derive(Debug, Clone, Default)]
pub struct EmailParser {
    config: ParserConfig,
}

impl EmailParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Build a parser from the `[parser]` section of a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.parser.clone())
    }

    /// Build a parser from the user's config file, or defaults if there is none.
    pub fn from_user_config() -> Self {
        Self::from_config(&load_config())
    }

    /// Charset used when an encoded-word names one we do not know.
    pub fn default_charset(&self) -> &str {
        &self.config.default_charset
    }

    /// Parse one complete message.
    ///
    /// # Errors
    ///
    /// Fails if the text is not a parseable message, if a part's transfer
    /// encoding cannot be reversed, or if an attachment's disposition
    /// parameters are malformed. No partial record is returned.
    pub fn parse(&self, raw: &str) -> Result<ParsedEmail> {
        let message = mailparse::parse_mail(raw.as_bytes()).map_err(ParseError::Structure)?;
        let charset = self.default_charset();

        let (body, attachments) = collect_content(&message)?;
        let metadata = extract_metadata(&message.headers, charset);
        let parsed_date = parse_date(metadata.date.as_deref());

        Ok(ParsedEmail {
            raw_email: raw.to_string(),
            body,
            attachments,
            sent_from: parse_address_headers(&header_values(&message, "From"), charset),
            sent_to: parse_address_headers(&header_values(&message, "To"), charset),
            subject: metadata.subject,
            date: metadata.date,
            message_id: metadata.message_id,
            parsed_date,
            headers: metadata.headers,
        })
    }
}

/// Parse one message with the default configuration.
///
/// See [`EmailParser::parse`].
pub fn parse_email(raw: &str) -> Result<ParsedEmail> {
    EmailParser::default().parse(raw)
}

/// Raw values of every occurrence of a header, in message order.
fn header_values(message: &ParsedMail<'_>, name: &str) -> Vec<String> {
    message
        .headers
        .get_all_headers(name)
        .into_iter()
        .map(raw_value)
        .collect()
}

/// Lowercase `type/subtype` of a part (`text/plain` when undeclared).
pub fn mime_type(part: &ParsedMail<'_>) -> String {
    part.ctype.mimetype.trim().to_lowercase()
}

/// Reverse a part's transfer encoding (base64, quoted-printable, …).
pub fn decode_payload(part: &ParsedMail<'_>) -> Result<Vec<u8>> {
    part.get_body_raw().map_err(|source| ParseError::Payload {
        content_type: mime_type(part),
        source,
    })
}

/// Pre-order iterator over every part of the tree, the root included.
pub fn walk<'a, 'b>(root: &'b ParsedMail<'a>) -> impl Iterator<Item = &'b ParsedMail<'a>> {
    let mut stack = vec![root];
    std::iter::from_fn(move || {
        let part = stack.pop()?;
        stack.extend(part.subparts.iter().rev());
        Some(part)
    })
}

const EMBEDDED_MESSAGE: &str = "message/rfc822";

/// Where a leaf part ends up in the record.
enum Routed {
    Plain(Vec<u8>),
    Html(Vec<u8>),
    Attachment(Attachment),
}

fn collect_content(message: &ParsedMail<'_>) -> Result<(Body, Vec<Attachment>)> {
    let mime = mime_type(message);
    let major = mime.split('/').next().unwrap_or_default();

    match major {
        "multipart" => collect_multipart(message),
        "message" if mime == EMBEDDED_MESSAGE => collect_multipart(message),
        // Any text subtype counts as the plain body here, text/calendar included.
        "text" => Ok((
            Body {
                plain: vec![decode_payload(message)?],
                html: Vec::new(),
            },
            Vec::new(),
        )),
        _ => {
            debug!(content_type = %mime, "Top-level part is neither multipart nor text, body left empty");
            Ok((Body::default(), Vec::new()))
        }
    }
}

fn collect_multipart(message: &ParsedMail<'_>) -> Result<(Body, Vec<Attachment>)> {
    let (body, attachments) = collect_parts(message)?;

    debug!(
        plain = body.plain.len(),
        html = body.html.len(),
        attachments = attachments.len(),
        "Walked multipart message"
    );
    Ok((body, attachments))
}

/// Route every leaf under `root` in pre-order. An embedded message that is
/// not disposed as a file is parsed and walked in its place.
fn collect_parts(root: &ParsedMail<'_>) -> Result<(Body, Vec<Attachment>)> {
    walk(root).filter(|part| !is_container(part)).try_fold(
        (Body::default(), Vec::new()),
        |(mut body, mut attachments), part| {
            if is_embedded_message(part) {
                let payload = decode_payload(part)?;
                let embedded = mailparse::parse_mail(&payload).map_err(ParseError::Structure)?;
                trace!("Descending into embedded message");
                let (inner_body, inner_attachments) = collect_parts(&embedded)?;
                body.plain.extend(inner_body.plain);
                body.html.extend(inner_body.html);
                attachments.extend(inner_attachments);
                return Ok((body, attachments));
            }

            match route_part(part)? {
                Some(Routed::Plain(payload)) => body.plain.push(payload),
                Some(Routed::Html(payload)) => body.html.push(payload),
                Some(Routed::Attachment(attachment)) => attachments.push(attachment),
                None => {}
            }
            Ok((body, attachments))
        },
    )
}

fn is_container(part: &ParsedMail<'_>) -> bool {
    !part.subparts.is_empty() || mime_type(part).starts_with("multipart/")
}

fn is_embedded_message(part: &ParsedMail<'_>) -> bool {
    mime_type(part) == EMBEDDED_MESSAGE && is_inline_body(disposition(part).as_deref())
}

fn route_part(part: &ParsedMail<'_>) -> Result<Option<Routed>> {
    let mime = mime_type(part);
    let disposition = disposition(part);
    let is_body = is_inline_body(disposition.as_deref());

    if mime == "text/plain" && is_body {
        return Ok(Some(Routed::Plain(decode_payload(part)?)));
    }
    if mime == "text/html" && is_body {
        return Ok(Some(Routed::Html(decode_payload(part)?)));
    }
    if disposition.is_some() {
        let attachment = extract_attachment(part)?;
        if attachment.is_none() {
            trace!(content_type = %mime, "Dropping part with unrecognised disposition");
        }
        return Ok(attachment.map(Routed::Attachment));
    }

    trace!(content_type = %mime, "Skipping part without disposition");
    Ok(None)
}

/// A body part has no disposition, or a bare `inline` one. The comparison
/// ignores ASCII case, so `INLINE` also counts. `inline` with parameters
/// (a named inline file) is treated as an attachment.
fn is_inline_body(disposition: Option<&str>) -> bool {
    disposition.is_none_or(|d| d.eq_ignore_ascii_case("inline"))
}

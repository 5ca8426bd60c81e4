//! RFC 5322 header values: unfolding and RFC 2047 encoded-word decoding.

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, GeneralPurpose};
use base64::Engine;
use encoding_rs::Encoding;
use mailparse::MailHeader;
use tracing::debug;

/// Charset assumed for header text that does not declare one.
pub const DEFAULT_CHARSET: &str = "us-ascii";

/// Encoded words in the wild often drop their `=` padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Return the raw value of a header, unfolded and trimmed. No decoding.
pub fn raw_value(header: &MailHeader<'_>) -> String {
    unfold(&String::from_utf8_lossy(header.get_value_raw()))
}

/// Unfold a header value (RFC 5322 §2.2.3): drop the line breaks, keep the
/// whitespace that follows them.
pub fn unfold(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    for line in raw.split('\n') {
        result.push_str(line.strip_suffix('\r').unwrap_or(line));
    }
    result.trim().to_string()
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `"Hola mundo"`
///
/// Encoded words naming an unknown charset are decoded with
/// `default_charset` instead. If any encoded word is malformed the value is
/// returned as written. Sequences naming an encoding other than B or Q are
/// not encoded words and stay as plain text. Decoded fragments are joined without a separator,
/// so words are only space-separated if the encoded text says so.
pub fn decode_mail_header(value: &str, default_charset: &str) -> String {
    let decoded = tokenize(value)
        .into_iter()
        .try_fold(String::with_capacity(value.len()), |mut out, token| {
            match token {
                Token::Plain(text) => out.push_str(text),
                Token::Encoded(word) => out.push_str(&decode_word(&word, default_charset)?),
            }
            Ok::<_, WordError>(out)
        });

    match decoded {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "Malformed encoded-word, keeping header value as written");
            value.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Token<'a> {
    Plain(&'a str),
    Encoded(EncodedWord<'a>),
}

#[derive(Debug, Clone, Copy)]
struct EncodedWord<'a> {
    charset: &'a str,
    encoding: WordEncoding,
    text: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WordEncoding {
    Base64,
    Quoted,
}

impl WordEncoding {
    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "B" | "b" => Some(Self::Base64),
            "Q" | "q" => Some(Self::Quoted),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum WordError {
    #[error("invalid base64 in encoded-word: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Split a value into encoded words and the plain runs between them.
fn tokenize(value: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut plain_start = 0;
    let mut search_from = 0;

    while let Some(found) = value[search_from..].find("=?") {
        let start = search_from + found;
        match parse_word(&value[start..]) {
            Some((word, consumed)) => {
                if start > plain_start {
                    tokens.push(Token::Plain(&value[plain_start..start]));
                }
                tokens.push(Token::Encoded(word));
                plain_start = start + consumed;
                search_from = plain_start;
            }
            None => search_from = start + 2,
        }
    }
    if plain_start < value.len() {
        tokens.push(Token::Plain(&value[plain_start..]));
    }

    // Whitespace between two encoded words is not part of the text (RFC 2047 §6.2)
    (0..tokens.len())
        .filter(|&i| !is_gap_between_words(&tokens, i))
        .map(|i| tokens[i])
        .collect()
}

fn is_gap_between_words(tokens: &[Token<'_>], i: usize) -> bool {
    let Token::Plain(text) = tokens[i] else {
        return false;
    };
    text.trim().is_empty()
        && i > 0
        && matches!(tokens[i - 1], Token::Encoded(_))
        && matches!(tokens.get(i + 1), Some(Token::Encoded(_)))
}

/// Parse `=?charset?encoding?text?=` at the start of `s`.
///
/// Returns the word and the number of bytes it spans.
fn parse_word(s: &str) -> Option<(EncodedWord<'_>, usize)> {
    let body = s.strip_prefix("=?")?;

    let first_q = body.find('?')?;
    let charset = &body[..first_q];

    let rest = &body[first_q + 1..];
    let second_q = rest.find('?')?;
    let encoding = WordEncoding::from_letter(&rest[..second_q])?;

    let rest = &rest[second_q + 1..];
    let end = rest.find("?=")?;
    let text = &rest[..end];

    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return None;
    }

    let consumed = 2 + first_q + 1 + second_q + 1 + end + 2;
    Some((
        EncodedWord {
            charset,
            encoding,
            text,
        },
        consumed,
    ))
}

fn decode_word(word: &EncodedWord<'_>, default_charset: &str) -> Result<String, WordError> {
    let bytes = match word.encoding {
        WordEncoding::Base64 => LENIENT_BASE64.decode(word.text)?,
        WordEncoding::Quoted => decode_q_encoding(word.text),
    };
    Ok(decode_charset(word.charset, &bytes, default_charset))
}

/// Decode Q-encoding (RFC 2047 §4.2): underscores → spaces, `=XX` → byte.
fn decode_q_encoding(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                result.push(b' ');
                i += 1;
            }
            b'=' => {
                match (hex_val(bytes.get(i + 1)), hex_val(bytes.get(i + 2))) {
                    (Some(hi), Some(lo)) => {
                        result.push((hi << 4) | lo);
                        i += 3;
                    }
                    _ => {
                        result.push(b'=');
                        i += 1;
                    }
                }
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }
    result
}

fn hex_val(byte: Option<&u8>) -> Option<u8> {
    match *byte? {
        b @ b'0'..=b'9' => Some(b - b'0'),
        b @ b'a'..=b'f' => Some(b - b'a' + 10),
        b @ b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode bytes using a named charset, falling back to `default_charset`.
fn decode_charset(charset: &str, bytes: &[u8], default_charset: &str) -> String {
    // RFC 2231 allows a language suffix: "utf-8*en"
    let label = charset.split('*').next().unwrap_or(charset);
    let encoding = match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => encoding,
        None => {
            debug!(
                charset = charset,
                default_charset = default_charset,
                "Unknown charset in encoded-word, using default"
            );
            default_encoding(default_charset)
        }
    };
    let (decoded, _) = encoding.decode_without_bom_handling(bytes);
    decoded.into_owned()
}

/// Resolve the default charset; Windows-1252 accepts every byte, so it is
/// the last resort.
fn default_encoding(default_charset: &str) -> &'static Encoding {
    Encoding::for_label(default_charset.trim().as_bytes()).unwrap_or(encoding_rs::WINDOWS_1252)
}

//! Mailbox-list parsing (RFC 2822 §3.4) for `From:`, `To:` and friends.
//!
//! Parsing is best-effort: malformed entries still produce an [`Address`]
//! instead of an error.

use crate::model::address::Address;
use crate::parser::header::decode_mail_header;

/// Parse every occurrence of an address header into one list.
///
/// The values are joined with `", "` first, so a repeated header behaves like
/// a single longer one. No values means no addresses.
pub fn parse_address_headers(values: &[String], default_charset: &str) -> Vec<Address> {
    if values.is_empty() {
        return Vec::new();
    }
    parse_address_list(&values.join(", "), default_charset)
}

/// Parse a comma-separated mailbox list.
///
/// Supported forms:
/// - `"user@domain.com"` and `"<user@domain.com>"`
/// - `"Display Name <user@domain.com>"`
/// - `"\"Last, First\" <user@domain.com>"`
/// - `"user@domain.com (Display Name)"`
/// - `"group: a@b.com, c@d.com;"` (flattened into its members)
///
/// Display names are passed through RFC 2047 decoding; addresses are kept as
/// written.
pub fn parse_address_list(raw: &str, default_charset: &str) -> Vec<Address> {
    split_mailboxes(raw)
        .iter()
        .filter_map(|entry| parse_mailbox(entry, default_charset))
        .collect()
}

/// Split a list on top-level `,` and `;`, dropping group names.
///
/// Separators inside quoted strings, comments and angle brackets are ignored.
fn split_mailboxes(raw: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut in_angle = false;
    let mut comment_depth = 0usize;

    for ch in raw.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes || comment_depth > 0 => {
                escaped = true;
                current.push(ch);
            }
            '"' if comment_depth == 0 => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            _ if in_quotes => current.push(ch),
            '(' => {
                comment_depth += 1;
                current.push(ch);
            }
            ')' if comment_depth > 0 => {
                comment_depth -= 1;
                current.push(ch);
            }
            _ if comment_depth > 0 => current.push(ch),
            '<' => {
                in_angle = true;
                current.push(ch);
            }
            '>' => {
                in_angle = false;
                current.push(ch);
            }
            _ if in_angle => current.push(ch),
            ',' | ';' => entries.push(std::mem::take(&mut current)),
            // "group-name:" opens a group; the name is not a mailbox
            ':' => current.clear(),
            _ => current.push(ch),
        }
    }
    entries.push(current);

    entries
}

/// Turn one list entry into an address, or `None` if it holds no address.
fn parse_mailbox(entry: &str, default_charset: &str) -> Option<Address> {
    let (text, comment) = strip_comments(entry);
    let text = text.trim();

    let (name_part, email) = match find_angle_addr(text) {
        Some((start, end)) => (&text[..start], &text[start + 1..end]),
        None => ("", text),
    };

    let email = email.trim();
    if email.is_empty() {
        return None;
    }

    let mut name = unquote(name_part);
    if name.is_empty() {
        name = comment.unwrap_or_default();
    }

    Some(Address {
        name: decode_mail_header(&name, default_charset),
        email: email.to_string(),
    })
}

/// Locate `<…>` outside quoted strings. A missing `>` runs to the end.
fn find_angle_addr(text: &str) -> Option<(usize, usize)> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => {
                let end = text[i..].find('>').map_or(text.len(), |e| i + e);
                return Some((i, end));
            }
            _ => {}
        }
    }
    None
}

/// Remove top-level `( … )` comments, returning the remaining text and the
/// comment contents (joined with spaces) if there were any.
fn strip_comments(entry: &str) -> (String, Option<String>) {
    let mut text = String::with_capacity(entry.len());
    let mut comments: Vec<String> = Vec::new();
    let mut current_comment = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in entry.chars() {
        if escaped {
            if depth > 0 {
                current_comment.push(ch);
            } else {
                text.push(ch);
            }
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => {
                escaped = true;
                text.push(ch);
            }
            '\\' if depth > 0 => escaped = true,
            '"' if depth == 0 => {
                in_quotes = !in_quotes;
                text.push(ch);
            }
            '(' if !in_quotes => {
                if depth > 0 {
                    current_comment.push(ch);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    comments.push(std::mem::take(&mut current_comment).trim().to_string());
                } else {
                    current_comment.push(ch);
                }
            }
            _ if depth > 0 => current_comment.push(ch),
            _ => text.push(ch),
        }
    }

    let comments: Vec<String> = comments.into_iter().filter(|c| !c.is_empty()).collect();
    let comment = if comments.is_empty() {
        None
    } else {
        Some(comments.join(" "))
    };
    (text, comment)
}

/// Drop the double quotes of quoted strings and resolve backslash escapes.
fn unquote(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
            '"' => {}
            _ => result.push(ch),
        }
    }
    result.trim().to_string()
}

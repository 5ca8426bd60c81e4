//! `mailsift`: decode raw RFC 5322 / MIME messages into structured records.
//!
//! This crate turns one raw message into a [`ParsedEmail`]: decoded subject,
//! date and message id, sender and recipient lists, plain and HTML body
//! payloads, and attachments with their disposition parameters.
//!
//! ```
//! let parsed = mailsift::parse_email("Subject: =?UTF-8?B?SGVsbG8=?=\n\nhello").unwrap();
//! assert_eq!(parsed.subject.as_deref(), Some("Hello"));
//! assert_eq!(parsed.body.plain, vec![b"hello".to_vec()]);
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod parser;

pub use error::{ParseError, Result};
pub use model::address::Address;
pub use model::attachment::Attachment;
pub use model::mail::{Body, HeaderField, ParsedEmail};
pub use parser::mime::{parse_email, EmailParser};

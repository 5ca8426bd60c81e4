//! Message parsing: header decoding, address lists, attachments, metadata,
//! dates, and the MIME walk that ties them together.

pub mod address;
pub mod attachment;
pub mod date;
pub mod header;
pub mod metadata;
pub mod mime;

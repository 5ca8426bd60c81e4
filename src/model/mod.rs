//! Output data model: the parsed message record, addresses, and attachments.

pub mod address;
pub mod attachment;
pub mod mail;

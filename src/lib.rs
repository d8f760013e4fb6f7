//! `addressparser` — permissive parsing of email address header fields.
//!
//! Turns raw `To` / `From` / `Cc` values into a list of mailboxes and groups.
//! Malformed input never fails: unbalanced quotes, stray colons and addresses
//! hidden in display names are recovered on a best-effort basis.
//!
//! The stages behind [`parse`] are exported too: [`tokenize`] a field,
//! [`split_segments`] on top-level separators, then [`reduce_tokens`] each
//! segment.
//!
//! ```
//! use addressparser::{parse, AddressEntry};
//!
//! let entries = parse("\"Last, First\" <first@example.com>, other@example.com");
//! assert_eq!(entries.len(), 2);
//! assert!(matches!(&entries[0], AddressEntry::Mailbox(m) if m.name == "Last, First"));
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod parser;

pub use error::{AddressError, Result};
pub use model::address::{AddressEntry, Group, Mailbox};
pub use parser::reducer::reduce_tokens;
pub use parser::tokenizer::{tokenize, Token, TokenKind};
pub use parser::{parse, parse_mailboxes, parse_with, split_segments, ParseOptions};

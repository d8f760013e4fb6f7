//! Address field parsing: tokenizer, segment splitting and reduction to entries.
//!
//! ```text
//! raw field ──tokenize──▶ tokens ──split on , ;──▶ segments ──reduce──▶ entries
//!                                                     ▲                  │
//!                                                     └── group body ────┘
//! ```

pub mod reducer;
pub mod tokenizer;

use tracing::{debug, warn};

use crate::error::{AddressError, Result};
use crate::model::address::{AddressEntry, Mailbox};
use reducer::reduce_tokens_with;
use tokenizer::{tokenize, Token};

/// Groups nested deeper than this are not parsed further. The remaining
/// body is kept as the name of a single mailbox.
pub const MAX_GROUP_NESTING: usize = 128;

/// Limits for [`parse_with`]. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject fields longer than this many bytes.
    pub max_input_len: Option<usize>,
    /// Reject fields whose groups nest deeper than this.
    pub max_group_depth: Option<usize>,
}

/// Parse an address field into mailboxes and groups.
///
/// Never fails: every input yields a (possibly empty) list. Group nesting
/// beyond [`MAX_GROUP_NESTING`] is flattened rather than recursed into.
///
/// Example: `"Name <address@domain>"` → `[Mailbox { name: "Name", address: "address@domain" }]`
pub fn parse(field: &str) -> Vec<AddressEntry> {
    // Without limits the bounded parser has no way to fail.
    parse_with(field, &ParseOptions::default()).unwrap_or_default()
}

/// Parse an address field, enforcing the given limits.
///
/// With default options this returns exactly `Ok(parse(field))`. The
/// [`MAX_GROUP_NESTING`] ceiling applies on top of `max_group_depth`.
pub fn parse_with(field: &str, options: &ParseOptions) -> Result<Vec<AddressEntry>> {
    if let Some(max) = options.max_input_len {
        if field.len() > max {
            warn!(len = field.len(), max, "Address field exceeds length limit");
            return Err(AddressError::InputTooLong {
                len: field.len(),
                max,
            });
        }
    }
    parse_at_depth(field, options, 0)
}

/// Parse a field and flatten groups into their member mailboxes.
pub fn parse_mailboxes(field: &str) -> Vec<Mailbox> {
    let entries = parse(field);
    entries
        .iter()
        .flat_map(AddressEntry::mailboxes)
        .cloned()
        .collect()
}

fn parse_at_depth(
    field: &str,
    options: &ParseOptions,
    depth: usize,
) -> Result<Vec<AddressEntry>> {
    let tokens = tokenize(field);
    let mut entries = Vec::new();

    for segment in split_segments(&tokens) {
        let reduced = reduce_tokens_with(segment, |body| {
            let next = depth + 1;
            if let Some(max) = options.max_group_depth {
                if next > max {
                    warn!(max, "Address group nesting exceeds limit");
                    return Err(AddressError::GroupTooDeep { max });
                }
            }
            if next > MAX_GROUP_NESTING {
                warn!(
                    max = MAX_GROUP_NESTING,
                    "Address group nesting too deep, keeping body as text"
                );
                return Ok(vec![Mailbox::new(body, "").into()]);
            }
            debug!(depth = next, "Parsing group body");
            parse_at_depth(body, options, next)
        })?;
        entries.extend(reduced);
    }

    Ok(entries)
}

/// Split tokens on top-level `,` and `;` operators, dropping empty segments.
///
/// Separators inside an open span never reach this point as operators: the
/// tokenizer has already folded them into text.
pub fn split_segments(tokens: &[Token]) -> Vec<&[Token]> {
    tokens
        .split(|t| t.is_operator(',') || t.is_operator(';'))
        .filter(|segment| !segment.is_empty())
        .collect()
}

//! Reduces the tokens of one top-level segment to address entries.
//!
//! Tokens are first sorted by position into text, `<address>`, `(comment)`
//! and `group:` buckets. Groups re-enter the top-level parser with their
//! body. Everything else goes through an ordered list of recovery steps that
//! try to find an address in free text, then a single mailbox is built.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use super::tokenizer::{trim_field, Token, TokenKind};
use crate::error::Result;
use crate::model::address::{AddressEntry, Group, Mailbox};

/// A text token that is nothing but an address. `U+FEFF` counts as
/// whitespace throughout, as it does for `trim_field`.
static BARE_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s\x{FEFF}]+@[^@\s\x{FEFF}]+$").expect("bare address regex")
});

/// An address embedded in free text, with its surrounding whitespace.
///
/// Word boundaries are ASCII-only: `x ü@b` holds no embedded address, and
/// `a@bü` yields `a@b`.
static EMBEDDED_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\s\x{FEFF}]*(?-u:\b)[^@\s\x{FEFF}]+@[^@\s\x{FEFF}]+(?-u:\b)[\s\x{FEFF}]*",
    )
    .expect("embedded address regex")
});

/// Which bucket text tokens currently land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Text,
    Address,
    Comment,
    Group,
}

/// Token values collected for one segment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Fields {
    text: Vec<String>,
    address: Vec<String>,
    comment: Vec<String>,
    group: Vec<String>,
    is_group: bool,
}

impl Fields {
    fn classify(tokens: &[Token]) -> Self {
        let mut fields = Self::default();
        let mut state = Field::Text;

        for token in tokens {
            match token.kind {
                TokenKind::Operator => {
                    state = match token.value.as_str() {
                        "<" => Field::Address,
                        "(" => Field::Comment,
                        ":" => {
                            fields.is_group = true;
                            Field::Group
                        }
                        _ => Field::Text,
                    };
                }
                TokenKind::Text if !token.value.is_empty() => {
                    let bucket = match state {
                        Field::Text => &mut fields.text,
                        Field::Address => &mut fields.address,
                        Field::Comment => &mut fields.comment,
                        Field::Group => &mut fields.group,
                    };
                    bucket.push(token.value.clone());
                }
                TokenKind::Text => {}
            }
        }

        fields
    }
}

/// A recovery step. Returns `true` if it changed anything.
type RecoveryStep = fn(&mut Fields) -> bool;

/// Applied in order to non-group segments. Each step checks its own
/// precondition, so later steps only act on what earlier ones left behind.
const RECOVERY_STEPS: [(&str, RecoveryStep); 4] = [
    ("bare_address", bare_address_from_text),
    ("embedded_address", embedded_address_from_text),
    ("comment_as_name", comment_as_name),
    ("last_address_wins", last_address_wins),
];

/// Use the comment as the name when there is no other text.
fn comment_as_name(fields: &mut Fields) -> bool {
    if fields.text.is_empty() && !fields.comment.is_empty() {
        fields.text = std::mem::take(&mut fields.comment);
        return true;
    }
    false
}

/// Take the last text token that is a bare `user@host` as the address.
fn bare_address_from_text(fields: &mut Fields) -> bool {
    if !fields.address.is_empty() || fields.text.is_empty() {
        return false;
    }
    match fields.text.iter().rposition(|t| BARE_ADDRESS.is_match(t)) {
        Some(idx) => {
            let address = fields.text.remove(idx);
            fields.address.push(address);
            true
        }
        None => false,
    }
}

/// Cut the first address-shaped run out of the last text token containing one.
fn embedded_address_from_text(fields: &mut Fields) -> bool {
    if !fields.address.is_empty() {
        return false;
    }
    for text in fields.text.iter_mut().rev() {
        let Some(found) = EMBEDDED_ADDRESS.find(text) else {
            continue;
        };
        let address = trim_field(found.as_str()).to_string();
        let remainder = format!("{} {}", &text[..found.start()], &text[found.end()..]);
        *text = trim_field(&remainder).to_string();
        fields.address.push(address);
        return true;
    }
    false
}

/// Keep only the last `<address>`. Earlier ones become bracketed name text,
/// so `<fake@x> <real@y>` delivers to `real@y`.
fn last_address_wins(fields: &mut Fields) -> bool {
    if fields.address.len() < 2 {
        return false;
    }
    let Some(last) = fields.address.pop() else {
        return false;
    };
    debug!(
        demoted = fields.address.len(),
        kept = %last,
        "Multiple addresses in one entry, keeping the last"
    );
    let demoted = std::mem::take(&mut fields.address);
    fields
        .text
        .extend(demoted.into_iter().map(|a| format!("<{a}>")));
    fields.address.push(last);
    true
}

/// Reduce one segment, re-entering the top-level parser for group bodies.
///
/// `parse_group` receives the group body re-joined with `,` and returns
/// its members.
pub(crate) fn reduce_tokens_with<F>(
    tokens: &[Token],
    parse_group: F,
) -> Result<Vec<AddressEntry>>
where
    F: FnOnce(&str) -> Result<Vec<AddressEntry>>,
{
    let mut fields = Fields::classify(tokens);
    comment_as_name(&mut fields);

    if fields.is_group {
        // http://tools.ietf.org/html/rfc2822#appendix-A.1.3
        let members = if fields.group.is_empty() {
            Vec::new()
        } else {
            parse_group(&fields.group.join(","))?
        };
        return Ok(vec![Group::new(fields.text.join(" "), members).into()]);
    }

    for (name, step) in RECOVERY_STEPS {
        if step(&mut fields) {
            trace!(step = name, "Address recovery step applied");
        }
    }

    let text = fields.text.join(" ");
    let address = fields.address.join(" ");

    // An address-less group segment yields nothing.
    if address.is_empty() && fields.is_group {
        return Ok(Vec::new());
    }

    Ok(vec![build_mailbox(text, address).into()])
}

/// Reduce the tokens of one top-level segment to address entries.
///
/// `tokens` should hold no top-level `,` or `;` operators; split a tokenized
/// field with [`crate::parser::split_segments`] first. Group bodies are parsed
/// with [`crate::parse`]. Returns a single mailbox or a single group.
///
/// ```
/// use addressparser::{reduce_tokens, tokenize, AddressEntry};
///
/// let entries = reduce_tokens(&tokenize("andris andris@tr.ee"));
/// assert_eq!(entries, vec![AddressEntry::mailbox("andris", "andris@tr.ee")]);
/// ```
pub fn reduce_tokens(tokens: &[Token]) -> Vec<AddressEntry> {
    reduce_tokens_with(tokens, |body| Ok(super::parse(body))).unwrap_or_default()
}

/// Fill whichever half is missing from the other, then split a value that
/// ended up in both: it is an address if it has an `@`, a name otherwise.
fn build_mailbox(text: String, address: String) -> Mailbox {
    let mut mailbox = Mailbox {
        address: if address.is_empty() {
            text.clone()
        } else {
            address.clone()
        },
        name: if text.is_empty() { address } else { text },
    };

    if mailbox.address == mailbox.name {
        if mailbox.address.contains('@') {
            mailbox.name.clear();
        } else {
            mailbox.address.clear();
        }
    }
    mailbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenizer::tokenize;

    fn fields_of(texts: &[&str]) -> Fields {
        Fields {
            text: texts.iter().map(|s| s.to_string()).collect(),
            ..Fields::default()
        }
    }

    fn reduce(input: &str) -> Vec<AddressEntry> {
        reduce_tokens(&tokenize(input))
    }

    #[test]
    fn test_classify_buckets() {
        let fields = Fields::classify(&tokenize("Name (note) <a@b> tail"));
        assert_eq!(fields.text, vec!["Name", "tail"]);
        assert_eq!(fields.comment, vec!["note"]);
        assert_eq!(fields.address, vec!["a@b"]);
        assert!(!fields.is_group);
    }

    #[test]
    fn test_classify_group() {
        let fields = Fields::classify(&tokenize("Team: a@b, c@d"));
        assert!(fields.is_group);
        assert_eq!(fields.text, vec!["Team"]);
        assert_eq!(fields.group, vec!["a@b, c@d"]);
    }

    #[test]
    fn test_bare_address_scans_from_end() {
        let mut fields = fields_of(&["first@x", "middle", "last@y"]);
        assert!(bare_address_from_text(&mut fields));
        assert_eq!(fields.address, vec!["last@y"]);
        assert_eq!(fields.text, vec!["first@x", "middle"]);
    }

    #[test]
    fn test_bare_address_requires_whole_token() {
        let mut fields = fields_of(&["name a@b"]);
        assert!(!bare_address_from_text(&mut fields));
        assert!(fields.address.is_empty());
    }

    #[test]
    fn test_bare_address_skipped_when_address_known() {
        let mut fields = fields_of(&["x@y"]);
        fields.address.push("a@b".to_string());
        assert!(!bare_address_from_text(&mut fields));
        assert_eq!(fields.text, vec!["x@y"]);
    }

    #[test]
    fn test_embedded_address_cut_from_text() {
        let mut fields = fields_of(&["andris andris@tr.ee"]);
        assert!(embedded_address_from_text(&mut fields));
        assert_eq!(fields.address, vec!["andris@tr.ee"]);
        assert_eq!(fields.text, vec!["andris"]);
    }

    #[test]
    fn test_embedded_address_middle_of_text() {
        let mut fields = fields_of(&["call a@b now"]);
        assert!(embedded_address_from_text(&mut fields));
        assert_eq!(fields.address, vec!["a@b"]);
        assert_eq!(fields.text, vec!["call now"]);
    }

    #[test]
    fn test_embedded_address_takes_only_first_match() {
        let mut fields = fields_of(&["one a@b two c@d three"]);
        assert!(embedded_address_from_text(&mut fields));
        assert_eq!(fields.address, vec!["a@b"]);
        assert_eq!(fields.text, vec!["one two c@d three"]);
    }

    #[test]
    fn test_embedded_address_last_token_wins() {
        let mut fields = fields_of(&["x a@b", "y c@d"]);
        assert!(embedded_address_from_text(&mut fields));
        assert_eq!(fields.address, vec!["c@d"]);
        assert_eq!(fields.text, vec!["x a@b", "y"]);
    }

    #[test]
    fn test_embedded_address_needs_ascii_word_boundary() {
        let mut fields = fields_of(&["x ü@b"]);
        assert!(!embedded_address_from_text(&mut fields));
        assert_eq!(fields.text, vec!["x ü@b"]);

        let mut fields = fields_of(&["x a@bü"]);
        assert!(embedded_address_from_text(&mut fields));
        assert_eq!(fields.address, vec!["a@b"]);
        assert_eq!(fields.text, vec!["x ü"]);
    }

    #[test]
    fn test_embedded_address_non_ascii_inside_local_part() {
        let mut fields = fields_of(&["name josé@x.com"]);
        assert!(embedded_address_from_text(&mut fields));
        assert_eq!(fields.address, vec!["josé@x.com"]);
        assert_eq!(fields.text, vec!["name"]);
    }

    #[test]
    fn test_byte_order_mark_separates_addresses() {
        let mut fields = fields_of(&["a@b\u{feff}c"]);
        assert!(!bare_address_from_text(&mut fields));

        let mut fields = fields_of(&["name\u{feff}a@b"]);
        assert!(embedded_address_from_text(&mut fields));
        assert_eq!(fields.address, vec!["a@b"]);
        assert_eq!(fields.text, vec!["name"]);
    }

    #[test]
    fn test_comment_as_name_only_without_text() {
        let mut fields = fields_of(&[]);
        fields.comment.push("note".to_string());
        assert!(comment_as_name(&mut fields));
        assert_eq!(fields.text, vec!["note"]);
        assert!(fields.comment.is_empty());

        let mut fields = fields_of(&["name"]);
        fields.comment.push("note".to_string());
        assert!(!comment_as_name(&mut fields));
    }

    #[test]
    fn test_last_address_wins_demotes_earlier() {
        let mut fields = fields_of(&["Name"]);
        fields.address = vec!["a@x".into(), "b@x".into(), "c@x".into()];
        assert!(last_address_wins(&mut fields));
        assert_eq!(fields.address, vec!["c@x"]);
        assert_eq!(fields.text, vec!["Name", "<a@x>", "<b@x>"]);
    }

    #[test]
    fn test_build_mailbox_splits_identical_values() {
        assert_eq!(build_mailbox(String::new(), "a@b".into()), Mailbox::new("", "a@b"));
        assert_eq!(build_mailbox("name".into(), String::new()), Mailbox::new("name", ""));
        assert_eq!(build_mailbox("a@b".into(), "a@b".into()), Mailbox::new("", "a@b"));
        assert_eq!(build_mailbox(String::new(), String::new()), Mailbox::new("", ""));
    }

    #[test]
    fn test_reduce_group_uses_callback() {
        let tokens = tokenize("Team: a@b, c@d");
        let mut seen = String::new();
        let entries = reduce_tokens_with(&tokens, |body| {
            seen = body.to_string();
            Ok(Vec::new())
        })
        .expect("reduce");
        assert_eq!(seen, "a@b, c@d");
        assert_eq!(entries, vec![AddressEntry::group("Team", vec![])]);
    }

    #[test]
    fn test_reduce_empty_group_skips_callback() {
        let tokens = tokenize("Team:");
        let entries =
            reduce_tokens_with(&tokens, |_| panic!("no body to parse")).expect("reduce");
        assert_eq!(entries, vec![AddressEntry::group("Team", vec![])]);
    }

    #[test]
    fn test_reduce_comment_name() {
        assert_eq!(
            reduce("andris@tr.ee (andris)"),
            vec![AddressEntry::mailbox("andris", "andris@tr.ee")]
        );
    }

    #[test]
    fn test_reduce_comment_ignored_when_text_present() {
        assert_eq!(
            reduce("andris@tr.ee (reinman) andris"),
            vec![AddressEntry::mailbox("andris", "andris@tr.ee")]
        );
    }

    #[test]
    fn test_reduce_only_operators() {
        assert_eq!(reduce("<>"), vec![AddressEntry::mailbox("", "")]);
    }
}

//! Parsed address entries: mailboxes and RFC 2822 §3.4 groups.

use serde::{Deserialize, Serialize};

/// A single mailbox.
///
/// Either field may be empty, but a parsed mailbox never carries the same
/// non-empty value in both.
///
/// # Examples
/// - `"Juan García <juan@ejemplo.com>"` → `name = "Juan García"`, `address = "juan@ejemplo.com"`
/// - `"user@example.com"` → `name = ""`, `address = "user@example.com"`
/// - `"Undisclosed"` → `name = "Undisclosed"`, `address = ""`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mailbox {
    /// The address as found in the field (`user@domain`), possibly empty.
    pub address: String,
    /// Human-readable display name, possibly empty.
    pub name: String,
}

/// A named list of entries, `Name: a@b, c@d;`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    /// Group display name. Empty when nothing preceded the `:`.
    pub name: String,
    /// Members in field order. May contain nested groups.
    pub group: Vec<AddressEntry>,
}

/// One entry of a parsed address field.
///
/// Serializes untagged, so a mailbox becomes `{"address": .., "name": ..}`
/// and a group `{"name": .., "group": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressEntry {
    Group(Group),
    Mailbox(Mailbox),
}

impl Mailbox {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }

    /// Format for display: `"Name <address>"`, or whichever half is present.
    ///
    /// Names containing separators or brackets are quoted so the output
    /// parses back to the same mailbox.
    pub fn display(&self) -> String {
        match (self.name.is_empty(), self.address.is_empty()) {
            (true, _) => self.address.clone(),
            (false, true) => quote_name(&self.name),
            (false, false) => format!("{} <{}>", quote_name(&self.name), self.address),
        }
    }
}

/// Quote a display name if it holds an operator character or a backslash.
fn quote_name(name: &str) -> String {
    if !name.contains(['"', '(', ')', ',', ':', ';', '<', '>', '\\']) {
        return name.to_string();
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for ch in name.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

impl Group {
    pub fn new(name: impl Into<String>, group: Vec<AddressEntry>) -> Self {
        Self {
            name: name.into(),
            group,
        }
    }
}

impl AddressEntry {
    /// Shorthand for a mailbox entry.
    pub fn mailbox(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self::Mailbox(Mailbox::new(name, address))
    }

    /// Shorthand for a group entry.
    pub fn group(name: impl Into<String>, members: Vec<AddressEntry>) -> Self {
        Self::Group(Group::new(name, members))
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// Display name of the mailbox or group.
    pub fn name(&self) -> &str {
        match self {
            Self::Mailbox(m) => &m.name,
            Self::Group(g) => &g.name,
        }
    }

    /// All mailboxes reachable from this entry, depth-first in field order.
    pub fn mailboxes(&self) -> Vec<&Mailbox> {
        let mut out = Vec::new();
        collect_mailboxes(self, &mut out);
        out
    }
}

fn collect_mailboxes<'a>(entry: &'a AddressEntry, out: &mut Vec<&'a Mailbox>) {
    match entry {
        AddressEntry::Mailbox(m) => out.push(m),
        AddressEntry::Group(g) => {
            for member in &g.group {
                collect_mailboxes(member, out);
            }
        }
    }
}

impl From<Mailbox> for AddressEntry {
    fn from(m: Mailbox) -> Self {
        Self::Mailbox(m)
    }
}

impl From<Group> for AddressEntry {
    fn from(g: Group) -> Self {
        Self::Group(g)
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", quote_name(&self.name))?;
        for (i, member) in self.group.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{member}")?;
        }
        write!(f, ";")
    }
}

impl std::fmt::Display for AddressEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mailbox(m) => std::fmt::Display::fmt(m, f),
            Self::Group(g) => std::fmt::Display::fmt(g, f),
        }
    }
}

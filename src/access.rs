//! Allow-list gate applied before every command.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

/// Opaque requester identity supplied by the transport.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for Identity {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for Identity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Allow-list entry as written in config: `42` or `"42"`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IdentityEntry {
    Numeric(i64),
    Text(String),
}

impl From<IdentityEntry> for Identity {
    fn from(entry: IdentityEntry) -> Self {
        match entry {
            IdentityEntry::Numeric(id) => Identity::from(id),
            IdentityEntry::Text(raw) => Identity::new(raw),
        }
    }
}

/// Immutable set of identities permitted to issue commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    members: BTreeSet<Identity>,
}

impl AllowList {
    pub fn new(members: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            members: members
                .into_iter()
                .filter(|id| !id.as_str().is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated list such as `ALLOWED_USERS=42,1001`.
    ///
    /// Blank segments are skipped.
    pub fn parse_csv(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(Identity::new),
        )
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.members.contains(identity)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// Membership test evaluated ahead of any runtime call or reply content.
#[derive(Debug, Clone)]
pub struct AccessGate {
    allow_list: AllowList,
}

impl AccessGate {
    pub fn new(allow_list: AllowList) -> Self {
        Self { allow_list }
    }

    /// An empty allow-list authorizes nobody.
    pub fn is_authorized(&self, identity: &Identity) -> bool {
        self.allow_list.contains(identity)
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_fails_closed() {
        let gate = AccessGate::new(AllowList::default());
        assert!(!gate.is_authorized(&Identity::from(42)));
        assert!(!gate.is_authorized(&Identity::new("")));
    }

    #[test]
    fn membership_is_exact() {
        let gate = AccessGate::new(AllowList::new([Identity::from(42)]));
        assert!(gate.is_authorized(&Identity::from(42)));
        assert!(gate.is_authorized(&Identity::new(" 42 ")));
        assert!(!gate.is_authorized(&Identity::from(420)));
        assert!(!gate.is_authorized(&Identity::from(99)));
    }

    #[test]
    fn csv_parsing_skips_blank_segments() {
        let list = AllowList::parse_csv("42, ,1001,");
        assert_eq!(list.len(), 2);
        assert!(list.contains(&Identity::from(1001)));
        assert!(AllowList::parse_csv("").is_empty());
    }

    #[test]
    fn numeric_and_text_entries_normalize_alike() {
        let a = Identity::from(IdentityEntry::Numeric(7));
        let b = Identity::from(IdentityEntry::Text("7".into()));
        assert_eq!(a, b);
    }
}

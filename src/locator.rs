//! Resource locators - names for the contacts collection and single contacts
//!
//! Format: `content://addressbook/contacts` or `content://addressbook/contacts/<id>`
//!
//! Examples:
//! - `content://addressbook/contacts` (every contact)
//! - `content://addressbook/contacts/42` (the contact with id 42)

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Fixed namespace identifying this data source
pub const AUTHORITY: &str = "content://addressbook";

/// Path segment naming the contacts table
pub const CONTACTS_TABLE: &str = "contacts";

/// What a locator refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// The whole contacts table
    Collection,
    /// One contact row
    Item(i64),
}

/// A parsed resource locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locator {
    kind: ResourceKind,
}

impl Locator {
    /// Locator for the whole collection
    pub fn collection() -> Self {
        Self { kind: ResourceKind::Collection }
    }

    /// Locator for one contact.
    ///
    /// Any `i64` is accepted; its string form always resolves back to the
    /// same item, and ids below 1 simply match no row.
    pub fn item(id: i64) -> Self {
        Self { kind: ResourceKind::Item(id) }
    }

    /// Parse a locator string
    pub fn parse(locator: &str) -> Result<Self> {
        resolve(locator).map(|kind| Self { kind })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Contact id for item locators
    pub fn id(&self) -> Option<i64> {
        match self.kind {
            ResourceKind::Item(id) => Some(id),
            ResourceKind::Collection => None,
        }
    }

    /// The locator one level up; `None` for the collection
    pub fn parent(&self) -> Option<Locator> {
        match self.kind {
            ResourceKind::Item(_) => Some(Locator::collection()),
            ResourceKind::Collection => None,
        }
    }

    /// True when `other` is this locator or lies beneath it.
    ///
    /// The collection contains every item; an item contains only itself.
    pub fn contains(&self, other: &Locator) -> bool {
        match self.kind {
            ResourceKind::Collection => true,
            ResourceKind::Item(_) => self == other,
        }
    }

    /// Convert to locator string
    pub fn to_locator_string(&self) -> String {
        match self.kind {
            ResourceKind::Collection => format!("{}/{}", AUTHORITY, CONTACTS_TABLE),
            ResourceKind::Item(id) => format!("{}/{}/{}", AUTHORITY, CONTACTS_TABLE, id),
        }
    }
}

/// Classify a locator string.
///
/// Pure function with no shared state. Anything that is neither the
/// collection form nor `<collection>/<decimal id>` is `Error::InvalidLocator`.
/// The id is ASCII digits with an optional leading `-`.
pub fn resolve(locator: &str) -> Result<ResourceKind> {
    let invalid = || Error::InvalidLocator(locator.to_string());

    let path = locator
        .strip_prefix(AUTHORITY)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(invalid)?;

    let mut segments = path.split('/');
    if segments.next() != Some(CONTACTS_TABLE) {
        return Err(invalid());
    }

    match (segments.next(), segments.next()) {
        (None, _) => Ok(ResourceKind::Collection),
        (Some(id), None) if is_decimal(id) => {
            let id: i64 = id.parse().map_err(|_| invalid())?;
            Ok(ResourceKind::Item(id))
        }
        _ => Err(invalid()),
    }
}

fn is_decimal(segment: &str) -> bool {
    let digits = segment.strip_prefix('-').unwrap_or(segment);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_locator_string())
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<ResourceKind> for Locator {
    fn from(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

impl Serialize for Locator {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_locator_string())
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Locator::parse(&s).map_err(serde::de::Error::custom)
    }
}

//! Contact types
//!
//! A contact is one row of the `contacts` table: an engine-assigned `id`
//! plus seven optional text fields.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Columns of the `contacts` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Id,
    Name,
    Phone,
    Email,
    Street,
    City,
    State,
    Zip,
}

impl Column {
    /// Get the SQL column name
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Phone => "phone",
            Column::Email => "email",
            Column::Street => "street",
            Column::City => "city",
            Column::State => "state",
            Column::Zip => "zip",
        }
    }

    /// All columns in table order
    pub fn all() -> &'static [Column] {
        &[
            Column::Id,
            Column::Name,
            Column::Phone,
            Column::Email,
            Column::Street,
            Column::City,
            Column::State,
            Column::Zip,
        ]
    }

    /// Whether the column holds text (everything except `id`)
    pub fn is_text(&self) -> bool {
        !matches!(self, Column::Id)
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Column::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownColumn(s.to_string()))
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The non-id fields of a contact.
///
/// Every field may be absent or empty; neither is a storage error. Updates
/// write all seven fields, so a `None` here clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl ContactFields {
    /// Fields with only a name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// True when the name contains something other than whitespace.
    ///
    /// This is the add/edit form's only validation rule.
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Value of a text column; `None` for `Column::Id`
    pub fn get(&self, column: Column) -> Option<&str> {
        match column {
            Column::Id => None,
            Column::Name => self.name.as_deref(),
            Column::Phone => self.phone.as_deref(),
            Column::Email => self.email.as_deref(),
            Column::Street => self.street.as_deref(),
            Column::City => self.city.as_deref(),
            Column::State => self.state.as_deref(),
            Column::Zip => self.zip.as_deref(),
        }
    }

    /// Replace a text column's value. Setting `Column::Id` is a no-op.
    pub fn set(&mut self, column: Column, value: Option<String>) {
        let slot = match column {
            Column::Id => return,
            Column::Name => &mut self.name,
            Column::Phone => &mut self.phone,
            Column::Email => &mut self.email,
            Column::Street => &mut self.street,
            Column::City => &mut self.city,
            Column::State => &mut self.state,
            Column::Zip => &mut self.zip,
        };
        *slot = value;
    }
}

/// A persisted contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Engine-assigned identifier, stable for the contact's lifetime
    pub id: i64,
    #[serde(flatten)]
    pub fields: ContactFields,
}

impl Contact {
    pub fn new(id: i64, fields: ContactFields) -> Self {
        Self { id, fields }
    }

    /// Display name, empty when unset
    pub fn name(&self) -> &str {
        self.fields.name.as_deref().unwrap_or("")
    }
}

//! Delivery addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::id::{AddressId, UserId};

/// Errors that can occur when validating an [`AddressDraft`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    /// One or more required fields are empty.
    #[error("address fields must not be empty: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// A stored delivery address.
///
/// A user's first address is created with `is_default = true`, every later one
/// with `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Address {
    /// Build a new address record from a validated draft.
    #[must_use]
    pub fn from_draft(
        draft: AddressDraft,
        id: AddressId,
        user_id: UserId,
        is_default: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            name: draft.name,
            street: draft.street,
            city: draft.city,
            state: draft.state,
            zip_code: draft.zip_code,
            country: draft.country,
            is_default,
            created_at,
            extra: Map::new(),
        }
    }

    /// Single-line rendering (e.g. for listings).
    #[must_use]
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {}, {} {}, {}",
            self.name, self.street, self.city, self.state, self.zip_code, self.country
        )
    }
}

/// Pending new-address form data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl AddressDraft {
    /// Check that every required field is filled in.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingFields`] naming every empty field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AddressError::MissingFields(missing))
        }
    }
}

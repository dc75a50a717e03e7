//! Address records and the fixed set of editable fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Opaque record identifier. Assigned by the repository, never by the client.
///
/// Always textual on the wire. Deserialises from either a JSON string or a
/// JSON integer since address services commonly emit numeric keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AddressId(String);

impl AddressId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AddressId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AddressId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for AddressId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for AddressId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Signed(n) => Self(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown address field: {0:?}")]
pub struct ParseFieldError(pub String);

/// The editable fields of an address. `id` is not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressField {
    FullName,
    Phone,
    Street,
    Landmark,
    PinCode,
    City,
    State,
}

impl AddressField {
    pub const ALL: [AddressField; 7] = [
        AddressField::FullName,
        AddressField::Phone,
        AddressField::Street,
        AddressField::Landmark,
        AddressField::PinCode,
        AddressField::City,
        AddressField::State,
    ];

    /// Wire name (camelCase JSON key).
    pub const fn as_str(self) -> &'static str {
        match self {
            AddressField::FullName => "fullName",
            AddressField::Phone => "phone",
            AddressField::Street => "street",
            AddressField::Landmark => "landmark",
            AddressField::PinCode => "pinCode",
            AddressField::City => "city",
            AddressField::State => "state",
        }
    }

    /// Form label.
    pub const fn label(self) -> &'static str {
        match self {
            AddressField::FullName => "Full Name",
            AddressField::Phone => "Phone Number",
            AddressField::Street => "Road / Street",
            AddressField::Landmark => "Landmark",
            AddressField::PinCode => "Pincode",
            AddressField::City => "City",
            AddressField::State => "State",
        }
    }

    /// Free-text fields are whitespace-trimmed on submission. `phone` and
    /// `pinCode` are carried verbatim, `state` is a picked value.
    pub const fn is_free_text(self) -> bool {
        matches!(
            self,
            AddressField::FullName
                | AddressField::Street
                | AddressField::Landmark
                | AddressField::City
        )
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts wire names, snake_case names, and the `roadStreet` form alias.
impl FromStr for AddressField {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fullName" | "full_name" => Ok(AddressField::FullName),
            "phone" => Ok(AddressField::Phone),
            "street" | "roadStreet" | "road_street" => Ok(AddressField::Street),
            "landmark" => Ok(AddressField::Landmark),
            "pinCode" | "pin_code" => Ok(AddressField::PinCode),
            "city" => Ok(AddressField::City),
            "state" => Ok(AddressField::State),
            other => Err(ParseFieldError(other.to_string())),
        }
    }
}

/// The seven textual fields of an address.
///
/// This is also the shape of a form [`Draft`]: phone and pin code stay text to
/// keep leading zeros and avoid locale-dependent number parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub pin_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

/// Transient per-form copy of an address's fields.
pub type Draft = AddressFields;

impl AddressFields {
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::FullName => &self.full_name,
            AddressField::Phone => &self.phone,
            AddressField::Street => &self.street,
            AddressField::Landmark => &self.landmark,
            AddressField::PinCode => &self.pin_code,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
        }
    }

    pub fn get_mut(&mut self, field: AddressField) -> &mut String {
        match field {
            AddressField::FullName => &mut self.full_name,
            AddressField::Phone => &mut self.phone,
            AddressField::Street => &mut self.street,
            AddressField::Landmark => &mut self.landmark,
            AddressField::PinCode => &mut self.pin_code,
            AddressField::City => &mut self.city,
            AddressField::State => &mut self.state,
        }
    }

    pub fn set(&mut self, field: AddressField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// True when every field is the empty string.
    pub fn is_empty(&self) -> bool {
        AddressField::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

/// A persisted address as returned by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub id: AddressId,
    #[serde(flatten)]
    pub fields: AddressFields,
}

impl AddressRecord {
    pub fn new(id: impl Into<AddressId>, fields: AddressFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Body of an add request. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewAddress(pub AddressFields);

impl NewAddress {
    /// Normalise a creation draft for submission.
    ///
    /// Free-text fields are trimmed; `phone`, `pinCode`, and `state` travel
    /// exactly as entered. Region membership is not checked here.
    pub fn from_draft(draft: &Draft) -> Self {
        let mut fields = draft.clone();
        for field in AddressField::ALL {
            if field.is_free_text() {
                let value = fields.get_mut(field);
                let trimmed = value.trim();
                if trimmed.len() != value.len() {
                    *value = trimmed.to_string();
                }
            }
        }
        Self(fields)
    }

    pub fn fields(&self) -> &AddressFields {
        &self.0
    }

    pub fn into_record(self, id: impl Into<AddressId>) -> AddressRecord {
        AddressRecord::new(id, self.0)
    }
}

//! Partial-update payload sent to the repository's `edit` operation.

use serde::{Deserialize, Serialize};

use crate::address::{AddressField, AddressFields, AddressId};

/// `{ addressId, <changed-field>: newValue, ... }`.
///
/// Only fields that differ from the baseline are present; absent fields are
/// omitted from the JSON entirely. A payload carrying nothing but
/// `addressId` is a valid no-op update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    pub address_id: AddressId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl UpdatePayload {
    /// A payload that changes nothing.
    pub fn new(address_id: AddressId) -> Self {
        Self {
            address_id,
            full_name: None,
            phone: None,
            street: None,
            landmark: None,
            pin_code: None,
            city: None,
            state: None,
        }
    }

    fn slot(&self, field: AddressField) -> &Option<String> {
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

    fn slot_mut(&mut self, field: AddressField) -> &mut Option<String> {
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

    pub fn get(&self, field: AddressField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: AddressField, value: impl ToString) {
        *self.slot_mut(field) = Some(value.to_string());
    }

    /// Fields carried by this payload, in declaration order.
    pub fn changed_fields(&self) -> Vec<AddressField> {
        AddressField::ALL
            .into_iter()
            .filter(|f| self.slot(*f).is_some())
            .collect()
    }

    pub fn is_noop(&self) -> bool {
        AddressField::ALL.iter().all(|f| self.slot(*f).is_none())
    }

    /// Overwrite the carried fields on `fields`, leaving the rest untouched.
    ///
    /// Applying the same payload again yields the same result.
    pub fn apply_to(&self, fields: &mut AddressFields) {
        for field in AddressField::ALL {
            if let Some(value) = self.slot(field) {
                fields.set(field, value.clone());
            }
        }
    }
}

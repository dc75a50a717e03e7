//! Draft values for a single form session.

use crate::address::{AddressField, Draft};

/// Holds the in-progress values of one form: the new-address form or a
/// single record's edit form. Never touches the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStore {
    draft: Draft,
}

impl FieldStore {
    /// An all-empty draft, as used by the creation form.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded from `seed`, as used when entering edit mode.
    pub fn seeded(seed: &Draft) -> Self {
        let mut store = Self::new();
        store.initialize(seed);
        store
    }

    /// Replace the draft with an owned copy of `seed`.
    pub fn initialize(&mut self, seed: &Draft) {
        self.draft = seed.clone();
    }

    /// Replace one field. Any value is accepted, including the empty string;
    /// non-string widget output is coerced to text here.
    pub fn set(&mut self, field: AddressField, value: impl ToString) {
        self.draft.set(field, value.to_string());
    }

    pub fn get(&self, field: AddressField) -> &str {
        self.draft.get(field)
    }

    /// Back to an all-empty draft.
    pub fn reset(&mut self) {
        self.draft = Draft::default();
    }

    pub fn snapshot(&self) -> &Draft {
        &self.draft
    }

    pub fn is_empty(&self) -> bool {
        self.draft.is_empty()
    }
}

//! Minimal partial-update computation.
//!
//! Compares an edit draft against the record as it was when editing began
//! and emits only the fields that changed. The record id always travels as
//! `addressId` and is never treated as an editable field.

use crate::address::{AddressField, AddressRecord, Draft};
use crate::payload::UpdatePayload;

/// Compute the [`UpdatePayload`] turning `baseline` into `draft`.
///
/// A field is included iff its draft text differs from the baseline text.
/// Comparison is exact: whitespace changes and clearing a field both count.
pub fn diff(baseline: &AddressRecord, draft: &Draft) -> UpdatePayload {
    let mut payload = UpdatePayload::new(baseline.id.clone());
    for field in AddressField::ALL {
        let new = draft.get(field);
        if new != baseline.fields.get(field) {
            payload.set(field, new);
        }
    }
    tracing::debug!(
        address_id = %baseline.id,
        changed = payload.changed_fields().len(),
        "computed address diff"
    );
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{AddressFields, AddressId};

    fn baseline() -> AddressRecord {
        AddressRecord::new(
            "1",
            AddressFields {
                full_name: "A".into(),
                phone: "111".into(),
                city: "X".into(),
                state: "Goa".into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn single_field_change() {
        let base = baseline();
        let mut draft = base.fields.clone();
        draft.city = "Y".into();

        let payload = diff(&base, &draft);
        assert_eq!(payload.address_id, AddressId::from("1"));
        assert_eq!(payload.changed_fields(), vec![AddressField::City]);
        assert_eq!(payload.get(AddressField::City), Some("Y"));
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"addressId":"1","city":"Y"}"#
        );
    }

    #[test]
    fn identical_draft_is_noop() {
        let base = baseline();
        let payload = diff(&base, &base.fields);
        assert!(payload.is_noop());
        assert_eq!(payload.address_id, base.id);
    }

    #[test]
    fn membership_matches_inequality() {
        let base = baseline();
        let mut draft = base.fields.clone();
        draft.full_name = "A ".into();
        draft.phone = "".into();
        draft.landmark = "".into();
        draft.state = "Goa".into();

        let payload = diff(&base, &draft);
        for field in AddressField::ALL {
            let differs = draft.get(field) != base.fields.get(field);
            assert_eq!(payload.get(field).is_some(), differs, "field {field}");
            if differs {
                assert_eq!(payload.get(field), Some(draft.get(field)));
            }
        }
        assert_eq!(
            payload.changed_fields(),
            vec![AddressField::FullName, AddressField::Phone]
        );
    }

    #[test]
    fn every_field_changed() {
        let base = baseline();
        let draft = AddressFields {
            full_name: "B".into(),
            phone: "222".into(),
            street: "s".into(),
            landmark: "l".into(),
            pin_code: "0".into(),
            city: "Y".into(),
            state: "Assam".into(),
        };
        let payload = diff(&base, &draft);
        assert_eq!(payload.changed_fields(), AddressField::ALL.to_vec());
    }

    #[test]
    fn applying_twice_equals_once() {
        let base = baseline();
        let mut draft = base.fields.clone();
        draft.city = "Y".into();
        draft.pin_code = "403001".into();
        let payload = diff(&base, &draft);

        let mut once = base.fields.clone();
        payload.apply_to(&mut once);
        let mut twice = once.clone();
        payload.apply_to(&mut twice);

        assert_eq!(once, draft);
        assert_eq!(once, twice);
    }
}

//! Tri-state field for partial updates: omitted, explicitly null, or set.
//!
//! On the wire an update body may leave a field out (keep the stored value),
//! send `null` (clear it), or send a value (replace it). `Option<T>` collapses
//! the first two, so update DTOs and change sets carry `Patch<T>` instead.
//!
//! Fields must be declared with `#[serde(default)]` (or the container must be)
//! so that an omitted key deserializes to [`Patch::Absent`], and with
//! `#[serde(skip_serializing_if = "Patch::is_absent")]` so that serializing
//! preserves the omission.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Null => Patch::Null,
            Self::Value(v) => Patch::Value(v),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Null => Patch::Null,
            Self::Value(v) => Patch::Value(f(v)),
        }
    }

    /// Fallible [`Patch::map`]; only a present value goes through `f`.
    pub fn try_map<U, E, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Result<Patch<U>, E> {
        Ok(match self {
            Self::Absent => Patch::Absent,
            Self::Null => Patch::Null,
            Self::Value(v) => Patch::Value(f(v)?),
        })
    }

    /// Narrow to a change on a non-nullable column.
    ///
    /// Returns `None` for `Null`; callers validate that case away first.
    pub fn into_required(self) -> Option<Option<T>> {
        match self {
            Self::Absent => Some(None),
            Self::Null => None,
            Self::Value(v) => Some(Some(v)),
        }
    }

    /// Apply to a nullable slot.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Self::Absent => {}
            Self::Null => *slot = None,
            Self::Value(v) => *slot = Some(v),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; omission goes through `Default`.
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Value(v) => serializer.serialize_some(v),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Body {
        #[serde(skip_serializing_if = "Patch::is_absent")]
        note: Patch<String>,
        #[serde(skip_serializing_if = "Patch::is_absent")]
        count: Patch<i32>,
    }

    #[test]
    fn omitted_null_and_value_are_distinct() {
        let omitted: Body = serde_json::from_str("{}").unwrap();
        let null: Body = serde_json::from_str(r#"{"note": null}"#).unwrap();
        let set: Body = serde_json::from_str(r#"{"note": "hi"}"#).unwrap();

        assert_eq!(omitted.note, Patch::Absent);
        assert_eq!(null.note, Patch::Null);
        assert_eq!(set.note, Patch::Value("hi".to_string()));
    }

    #[test]
    fn serialization_preserves_omission_and_null() {
        let body = Body {
            note: Patch::Null,
            count: Patch::Absent,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.as_object().unwrap().contains_key("note"));
        assert!(json["note"].is_null());
        assert!(!json.as_object().unwrap().contains_key("count"));

        let back: Body = serde_json::from_value(json).unwrap();
        assert_eq!(back.note, Patch::Null);
        assert_eq!(back.count, Patch::Absent);
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = serde_json::from_str::<Body>(r#"{"count": "ten"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn apply_to_nullable_slot() {
        let mut slot = Some("old".to_string());
        Patch::Absent.apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("old"));

        Patch::Value("new".to_string()).apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("new"));

        Patch::Null.apply_to(&mut slot);
        assert_eq!(slot, None);
    }

    #[test]
    fn into_required_rejects_null() {
        assert_eq!(Patch::<i32>::Absent.into_required(), Some(None));
        assert_eq!(Patch::Value(3).into_required(), Some(Some(3)));
        assert_eq!(Patch::<i32>::Null.into_required(), None);
    }

    #[test]
    fn try_map_skips_absent_and_null() {
        let calls = std::cell::Cell::new(0);
        let f = |v: i32| -> Result<i32, ()> {
            calls.set(calls.get() + 1);
            Ok(v * 2)
        };
        assert_eq!(Patch::Absent.try_map(f), Ok(Patch::Absent));
        assert_eq!(Patch::Null.try_map(f), Ok(Patch::Null));
        assert_eq!(Patch::Value(4).try_map(f), Ok(Patch::Value(8)));
        assert_eq!(calls.get(), 1);
    }
}

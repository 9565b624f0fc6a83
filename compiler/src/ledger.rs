use std::collections::BTreeSet;

use serde::Serialize;

pub fn input_registration(name: &str) -> String {
    format!("RegisterInput{}", name)
}

pub fn payload_registration(name: &str) -> String {
    format!("RegisterPayload{}", name)
}

pub fn enum_registration(name: &str) -> String {
    format!("Register{}", name)
}

pub fn operations_registration(service: &str) -> String {
    format!("Register{}Operations", service)
}

/// Names of every registration entry point produced by one run. The renderer
/// invokes each of them exactly once from the aggregate initializer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    names: BTreeSet<String>,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger::default()
    }

    /// Records `name`; returns `false` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut ledger = Ledger::new();
        assert!(ledger.insert(input_registration("Widget")));
        assert_eq!(ledger.len(), 1);

        assert!(!ledger.insert("RegisterInputWidget"));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains("RegisterInputWidget"));
    }

    #[test]
    fn test_registration_names() {
        assert_eq!(payload_registration("Widget"), "RegisterPayloadWidget");
        assert_eq!(enum_registration("Region"), "RegisterRegion");
        assert_eq!(operations_registration("WidgetService"), "RegisterWidgetServiceOperations");
    }

    #[test]
    fn test_serializes_as_sorted_list() {
        let mut ledger = Ledger::new();
        ledger.insert("RegisterPayloadWidget");
        ledger.insert("RegisterInputWidget");
        let json = serde_json::to_string(&ledger).expect("serialize failed");
        assert_eq!(json, r#"["RegisterInputWidget","RegisterPayloadWidget"]"#);
    }
}

use gqlbind_schema::EnumDescriptor;

use crate::{
    ledger::{enum_registration, Ledger},
    type_mapper::declared_name,
    types::{EnumDef, EnumValueDef},
};

/// Values keep their declaration order and declared numbers.
pub fn lower_enum(enumeration: &EnumDescriptor, ledger: &mut Ledger) -> EnumDef {
    let declared = declared_name(&enumeration.path);
    let registration = enum_registration(&declared);
    ledger.insert(registration.clone());

    EnumDef {
        full_name: enumeration.path.full_name(),
        declared_name: declared,
        registration,
        values: enumeration
            .values
            .iter()
            .map(|value| EnumValueDef {
                literal: value.name.clone(),
                ordinal: value.number,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_mapper::fixtures;

    #[test]
    fn test_ordinals_are_not_renumbered() {
        let pool = fixtures::widgets();
        let region = pool.enumeration("acme.common.Region").expect("missing Region");

        let mut ledger = Ledger::new();
        let lowered = lower_enum(region, &mut ledger);

        assert_eq!(lowered.declared_name, "Region");
        assert_eq!(lowered.registration, "RegisterRegion");
        let values: Vec<(&str, i32)> = lowered
            .values
            .iter()
            .map(|value| (value.literal.as_str(), value.ordinal))
            .collect();
        assert_eq!(values, vec![("REGION_UNSPECIFIED", 0), ("US", 1), ("EU", 5)]);
        assert!(ledger.contains("RegisterRegion"));
    }

    #[test]
    fn test_nested_enum_name() {
        let pool = fixtures::widgets();
        let finish = pool.enumeration("acme.widgets.Widget.Finish").expect("missing Finish");

        let mut ledger = Ledger::new();
        let lowered = lower_enum(finish, &mut ledger);
        assert_eq!(lowered.declared_name, "Widget_Finish");
        assert_eq!(lowered.full_name, "acme.widgets.Widget.Finish");
        assert!(ledger.contains("RegisterWidget_Finish"));
    }
}

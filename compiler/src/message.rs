//! Message lowering: one input object and one output object per message.

use std::collections::BTreeSet;

use gqlbind_schema::MessageDescriptor;

use crate::{
    directives::MessageDirectives,
    error::BindError,
    ledger::{input_registration, payload_registration, Ledger},
    oneof::{input_bindings, union_accessor},
    type_mapper::{declared_name, TypeMapper},
    types::{
        BindingRule, FieldBinding, InputAccess, InputDef, MapBinding, MapCodec, OutputAccess,
        OutputDef,
    },
    utils::{lower_camel_case, strip_request_suffix, upper_camel_case},
};

/// Fields of a message split by where they end up. Oneof members are left
/// to the oneof lowering.
#[derive(Debug, Default)]
pub(crate) struct LoweredFields {
    pub fields:     Vec<FieldBinding>,
    pub map_fields: Vec<MapBinding>,
}

/// Schema name of the input object, evaluated strictly in order: rename,
/// query request shape, plain name.
pub fn input_schema_name(
    message: &MessageDescriptor,
    request_names: &BTreeSet<String>,
    directives: &MessageDirectives,
) -> String {
    if let Some(rename) = &directives.rename {
        return format!("{}Input", rename);
    }
    let name = declared_name(&message.path);
    if request_names.contains(&message.full_name()) {
        return format!("{}Input", strip_request_suffix(&name));
    }
    format!("{}Input", name)
}

pub fn output_schema_name(message: &MessageDescriptor, directives: &MessageDirectives) -> String {
    match &directives.rename {
        Some(rename) => rename.clone(),
        None => declared_name(&message.path),
    }
}

/// `None` for skipped messages.
pub fn lower_input(
    mapper: &TypeMapper,
    message: &MessageDescriptor,
    request_names: &BTreeSet<String>,
    directives: &MessageDirectives,
    ledger: &mut Ledger,
) -> Result<Option<InputDef>, BindError> {
    if directives.skip {
        return Ok(None);
    }

    let declared = declared_name(&message.path);
    let lowered = lower_fields(mapper, message, &message.package())?;
    let union_fields = message
        .oneofs
        .iter()
        .flat_map(|oneof| input_bindings(mapper.pool(), message, oneof))
        .collect();

    let registration = input_registration(&declared);
    ledger.insert(registration.clone());

    Ok(Some(InputDef {
        registered_schema_name: input_schema_name(message, request_names, directives),
        full_name: message.full_name(),
        declared_name: declared,
        registration,
        fields: lowered.fields,
        map_fields: lowered.map_fields,
        union_fields,
    }))
}

/// `None` for skipped messages.
pub fn lower_output(
    mapper: &TypeMapper,
    message: &MessageDescriptor,
    directives: &MessageDirectives,
    ledger: &mut Ledger,
) -> Result<Option<OutputDef>, BindError> {
    if directives.skip {
        return Ok(None);
    }

    let declared = declared_name(&message.path);
    let lowered = lower_fields(mapper, message, &message.package())?;
    let union_fields = message
        .oneofs
        .iter()
        .map(|oneof| union_accessor(mapper.pool(), message, oneof))
        .collect();

    let registration = payload_registration(&declared);
    ledger.insert(registration.clone());

    Ok(Some(OutputDef {
        registered_schema_name: output_schema_name(message, directives),
        full_name: message.full_name(),
        declared_name: declared,
        registration,
        fields: lowered.fields,
        map_fields: lowered.map_fields,
        union_fields,
    }))
}

/// Accessors of a value held by reference: identifiers unwrap and wrap,
/// well-known types coerce, everything else is assigned as is.
pub(crate) fn value_access(rule: &BindingRule) -> (InputAccess, OutputAccess) {
    match rule {
        BindingRule::Identifier => (InputAccess::IdentifierValue, OutputAccess::IdentifierWrap),
        BindingRule::WellKnown(well_known) => (
            InputAccess::Coerce(well_known.input_coercion().to_string()),
            OutputAccess::Coerce(well_known.output_coercion().to_string()),
        ),
        BindingRule::Map | BindingRule::OneofMember | BindingRule::Plain => {
            (InputAccess::Assign, OutputAccess::Read)
        }
    }
}

/// Bindings of every non-oneof field, with types seen from `from_package`.
pub(crate) fn lower_fields(
    mapper: &TypeMapper,
    message: &MessageDescriptor,
    from_package: &str,
) -> Result<LoweredFields, BindError> {
    let mut lowered = LoweredFields::default();

    for field in message.non_oneof_fields() {
        let rule = mapper.classify(message, field)?;
        let type_ref = mapper.map_field_type_from(from_package, message, field)?;
        let public_name = lower_camel_case(&field.name);
        let internal_name = upper_camel_case(&field.name);

        let (input_access, output_access) = match rule {
            BindingRule::Map => {
                let key = type_ref.map_key().cloned().ok_or_else(|| BindError::UnrecognizedWireKind {
                    field: format!("{}.{}", message.full_name(), field.name),
                    kind:  "map without key".to_string(),
                })?;
                lowered.map_fields.push(MapBinding {
                    public_name,
                    internal_name,
                    key,
                    value: type_ref.element(),
                    codec: MapCodec::Base64Json,
                });
                continue;
            }
            BindingRule::Plain if !type_ref.is_repeated() && !type_ref.pointerish => {
                (InputAccess::Deref, OutputAccess::Read)
            }
            // non_oneof_fields never yields these
            BindingRule::OneofMember => continue,
            _ => value_access(&rule),
        };

        lowered.fields.push(FieldBinding {
            public_name,
            internal_name,
            type_ref,
            rule,
            input_access,
            output_access,
        });
    }

    Ok(lowered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CompilerOptions,
        directives::resolve_message_directives,
        type_mapper::fixtures,
        types::{TypeKind, TypeRef, WellKnownType},
    };
    use gqlbind_schema::DescriptorPool;

    const REQUESTS: &str = r#"{"file": [{"name": "a.proto", "package": "a", "messageType": [
        {"name": "CreateWidgetReq", "field": [{"name": "name", "number": 1, "type": "TYPE_STRING"}]},
        {"name": "CreateGadgetReq", "options": {"[graphql.name]": "Foo"}, "field": [
            {"name": "name", "number": 1, "type": "TYPE_STRING"}
        ]}
    ]}]}"#;

    fn binding<'d>(fields: &'d [FieldBinding], public_name: &str) -> &'d FieldBinding {
        fields
            .iter()
            .find(|field| field.public_name == public_name)
            .unwrap_or_else(|| panic!("missing binding {}", public_name))
    }

    #[test]
    fn test_input_schema_name_order() {
        let pool = DescriptorPool::from_json(REQUESTS).expect("from_json failed");
        let options = CompilerOptions::default();

        let widget = pool.message("a.CreateWidgetReq").expect("missing message");
        let plain = resolve_message_directives(widget, &options).expect("resolve failed");
        let as_request: BTreeSet<String> = ["a.CreateWidgetReq".to_string()].into();

        assert_eq!(input_schema_name(widget, &as_request, &plain), "CreateWidgetInput");
        assert_eq!(input_schema_name(widget, &BTreeSet::new(), &plain), "CreateWidgetReqInput");

        let gadget = pool.message("a.CreateGadgetReq").expect("missing message");
        let renamed = resolve_message_directives(gadget, &options).expect("resolve failed");
        let as_request: BTreeSet<String> = ["a.CreateGadgetReq".to_string()].into();

        assert_eq!(input_schema_name(gadget, &as_request, &renamed), "FooInput");
        assert_eq!(input_schema_name(gadget, &BTreeSet::new(), &renamed), "FooInput");
        assert_eq!(output_schema_name(gadget, &renamed), "Foo");
    }

    #[test]
    fn test_lower_input_routes_each_rule() {
        let pool = fixtures::widgets();
        let options = CompilerOptions::default();
        let mapper = TypeMapper::new(&pool, &options);
        let widget = pool.message("acme.widgets.Widget").expect("missing Widget");
        let directives = resolve_message_directives(widget, &options).expect("resolve failed");

        let mut ledger = Ledger::new();
        let input = lower_input(&mapper, widget, &BTreeSet::new(), &directives, &mut ledger)
            .expect("lower failed")
            .expect("Widget is not skipped");

        assert_eq!(input.registered_schema_name, "WidgetInput");
        assert_eq!(input.registration, "RegisterInputWidget");

        let id = binding(&input.fields, "id");
        assert_eq!(id.rule, BindingRule::Identifier);
        assert_eq!(id.input_access, InputAccess::IdentifierValue);

        let name = binding(&input.fields, "name");
        assert_eq!(name.input_access, InputAccess::Deref);

        let owner = binding(&input.fields, "owner");
        assert_eq!(owner.input_access, InputAccess::Assign);
        assert_eq!(owner.internal_name, "Owner");

        let created = binding(&input.fields, "createdAt");
        assert_eq!(created.rule, BindingRule::WellKnown(WellKnownType::Timestamp));
        assert_eq!(created.input_access, InputAccess::Coerce("timestamp_from_scalar".into()));

        // maps and oneof members never land in the plain list
        assert!(input.fields.iter().all(|field| field.public_name != "labels"));
        assert!(input.fields.iter().all(|field| field.rule != BindingRule::OneofMember));
        assert_eq!(input.map_fields.len(), 1);
        assert_eq!(input.union_fields.len(), 2);
        assert_eq!(input.union_fields[1].public_name, "widgetPattern");
    }

    #[test]
    fn test_map_value_matches_plain_field() {
        let pool = fixtures::widgets();
        let options = CompilerOptions::default();
        let mapper = TypeMapper::new(&pool, &options);
        let widget = pool.message("acme.widgets.Widget").expect("missing Widget");

        let lowered = lower_fields(&mapper, widget, "acme.widgets").expect("lower failed");
        assert_eq!(lowered.map_fields.len(), 1);

        let labels = &lowered.map_fields[0];
        assert_eq!(labels.public_name, "labels");
        assert_eq!(labels.key, TypeRef::scalar("string"));
        assert_eq!(labels.value, binding(&lowered.fields, "texture").type_ref);
        assert_eq!(labels.value.kind, TypeKind::Message);
    }

    #[test]
    fn test_lower_output_exposes_unions() {
        let pool = fixtures::widgets();
        let options = CompilerOptions::default();
        let mapper = TypeMapper::new(&pool, &options);
        let widget = pool.message("acme.widgets.Widget").expect("missing Widget");
        let directives = resolve_message_directives(widget, &options).expect("resolve failed");

        let mut ledger = Ledger::new();
        let output = lower_output(&mapper, widget, &directives, &mut ledger)
            .expect("lower failed")
            .expect("Widget is not skipped");

        assert_eq!(output.registered_schema_name, "Widget");
        assert_eq!(output.registration, "RegisterPayloadWidget");
        assert_eq!(binding(&output.fields, "id").output_access, OutputAccess::IdentifierWrap);
        assert_eq!(output.union_fields.len(), 1);
        assert_eq!(output.union_fields[0].union_name, "UnionWidgetAppearance");
    }

    #[test]
    fn test_nested_message_names() {
        let pool = fixtures::widgets();
        let options = CompilerOptions::default();
        let mapper = TypeMapper::new(&pool, &options);
        let part = pool.message("acme.widgets.Widget.Part").expect("missing Part");
        let directives = resolve_message_directives(part, &options).expect("resolve failed");

        let mut ledger = Ledger::new();
        let input = lower_input(&mapper, part, &BTreeSet::new(), &directives, &mut ledger)
            .expect("lower failed")
            .expect("Part is not skipped");
        assert_eq!(input.declared_name, "Widget_Part");
        assert_eq!(input.registered_schema_name, "Widget_PartInput");
        assert!(ledger.contains("RegisterInputWidget_Part"));
    }

    #[test]
    fn test_skipped_message_contributes_nothing() {
        let pool = fixtures::widgets();
        let options = CompilerOptions::default();
        let mapper = TypeMapper::new(&pool, &options);
        let internal = pool.message("acme.widgets.Internal").expect("missing Internal");
        let directives = resolve_message_directives(internal, &options).expect("resolve failed");
        assert!(directives.skip);

        let mut ledger = Ledger::new();
        assert!(lower_input(&mapper, internal, &BTreeSet::new(), &directives, &mut ledger)
            .expect("lower failed")
            .is_none());
        assert!(lower_output(&mapper, internal, &directives, &mut ledger)
            .expect("lower failed")
            .is_none());
        assert!(ledger.is_empty());
    }
}

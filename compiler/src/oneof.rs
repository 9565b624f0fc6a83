//! Oneof lowering: one union per (message, oneof) pair plus a single-field
//! wrapper declaration per alternative in each direction.

use gqlbind_schema::{DescriptorPool, FieldDescriptor, MessageDescriptor, OneofDescriptor};

use crate::{
    error::BindError,
    ledger::{input_registration, payload_registration, Ledger},
    type_mapper::{declared_name, TypeMapper},
    types::{
        BindingRule, FieldBinding, InputAccess, OneofGroup, OutputAccess, TypeRef, UnionAccessor,
        UnionCase, UnionVariant, VariantInputDef, VariantOutputDef,
    },
    utils::{lower_camel_case, upper_camel_case},
};

pub fn union_name(message: &MessageDescriptor, oneof: &OneofDescriptor) -> String {
    format!("Union{}{}", declared_name(&message.path), upper_camel_case(&oneof.name))
}

/// Generated type holding one alternative, e.g. `Widget_Color`. Gets a
/// trailing `_` when a type nested in `message` already owns that name.
pub fn wrapper_type(pool: &DescriptorPool, message: &MessageDescriptor, field: &FieldDescriptor) -> String {
    let variant = upper_camel_case(&field.name);
    let wrapper = format!("{}_{}", declared_name(&message.path), variant);

    let nested = format!("{}.{}", message.full_name(), variant);
    if pool.message(&nested).is_some() || pool.enumeration(&nested).is_some() {
        return wrapper + "_";
    }
    wrapper
}

/// Schema name of an alternative's declarations, e.g. `widgetColor` or
/// `widgetPartShade` for a message nested in `Widget`.
pub fn variant_schema_name(message: &MessageDescriptor, field: &FieldDescriptor) -> String {
    format!("{}{}", lower_camel_case(&declared_name(&message.path)), upper_camel_case(&field.name))
}

/// Name of the selector field the alternatives are stored in.
pub fn selector(oneof: &OneofDescriptor) -> String {
    upper_camel_case(&oneof.name)
}

pub fn lower_oneof(
    mapper: &TypeMapper,
    message: &MessageDescriptor,
    oneof: &OneofDescriptor,
    ledger: &mut Ledger,
) -> Result<OneofGroup, BindError> {
    let union = UnionVariant {
        union_name:        union_name(message, oneof),
        member_type_names: message
            .oneof_fields(oneof)
            .map(|field| wrapper_type(mapper.pool(), message, field))
            .collect(),
    };

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for field in message.oneof_fields(oneof) {
        let wrapper = wrapper_type(mapper.pool(), message, field);
        let value_type = mapper.map_field_type(message, field)?;

        let input_registration = input_registration(&wrapper);
        ledger.insert(input_registration.clone());
        inputs.push(VariantInputDef {
            wrapper_type:      wrapper.clone(),
            schema_name:       variant_schema_name(message, field),
            registration:      input_registration,
            field_public_name: lower_camel_case(&field.name),
            target_name:       upper_camel_case(&field.name),
            value_type:        value_type.clone(),
        });

        let output_registration = payload_registration(&wrapper);
        ledger.insert(output_registration.clone());
        outputs.push(VariantOutputDef {
            wrapper_type:      wrapper,
            schema_name:       variant_schema_name(message, field),
            registration:      output_registration,
            field_public_name: lower_camel_case(&field.name),
            value_name:        upper_camel_case(&field.name),
            value_type,
        });
    }

    Ok(OneofGroup {
        message: message.full_name(),
        oneof: oneof.name.clone(),
        union,
        inputs,
        outputs,
    })
}

/// Fields the parent input object exposes for `oneof`, one per alternative.
/// Setting any of them overwrites the selector.
pub fn input_bindings(
    pool: &DescriptorPool,
    message: &MessageDescriptor,
    oneof: &OneofDescriptor,
) -> Vec<FieldBinding> {
    message
        .oneof_fields(oneof)
        .map(|field| FieldBinding {
            public_name:   variant_schema_name(message, field),
            internal_name: upper_camel_case(&field.name),
            type_ref:      TypeRef::oneof_wrapper(&wrapper_type(pool, message, field)),
            rule:          BindingRule::OneofMember,
            input_access:  InputAccess::ReplaceSelector {
                selector: selector(oneof),
            },
            output_access: OutputAccess::UnionMatch,
        })
        .collect()
}

/// Consolidated output accessor of `oneof`; the trailing `Unset` arm covers
/// a message with no alternative set.
pub fn union_accessor(
    pool: &DescriptorPool,
    message: &MessageDescriptor,
    oneof: &OneofDescriptor,
) -> UnionAccessor {
    let mut cases: Vec<UnionCase> = message
        .oneof_fields(oneof)
        .map(|field| UnionCase::Variant {
            wrapper_type: wrapper_type(pool, message, field),
        })
        .collect();
    cases.push(UnionCase::Unset);

    UnionAccessor {
        public_name: lower_camel_case(&oneof.name),
        selector: selector(oneof),
        union_name: union_name(message, oneof),
        cases,
    }
}

//! Service lowering: query and mutation operations for every exposed method.

use std::collections::BTreeSet;

use gqlbind_schema::{MessageDescriptor, MethodDescriptor, ServiceDescriptor};
use tracing::{trace, warn};

use crate::{
    config::CompilerOptions,
    directives::{resolve_message_directives, resolve_method_directives, Exposure},
    error::{BindError, Diagnostics},
    ledger::{input_registration, operations_registration, payload_registration, Ledger},
    message::{lower_fields, value_access},
    oneof::{selector, wrapper_type},
    type_mapper::TypeMapper,
    types::{
        Argument, ArgumentConversion, BindingRule, FieldBinding, MapCodec, MapDecode,
        MutationDef, MutationInputDef, OneofMerge, PayloadDef, QueryDef,
        RequestAssignment, ResponseAccessor, ServiceDef, TypeRef,
    },
    utils::{lower_camel_case, quote, upper_camel_case},
};

/// Field of the payload holding the backing call's response.
pub const PAYLOAD_FIELD: &str = "payload";

/// Full names of the request messages of every query of `service`. Methods
/// with undecodable directives are left out; lowering reports them.
pub fn request_names(service: &ServiceDescriptor, options: &CompilerOptions) -> BTreeSet<String> {
    service
        .methods
        .iter()
        .filter(|method| {
            resolve_method_directives(service, method, options)
                .ok()
                .and_then(|directives| directives.exposure(&method.name).ok().flatten())
                .map_or(false, |exposure| matches!(exposure, Exposure::Query(_)))
        })
        .map(|method| method.input_type.clone())
        .collect()
}

/// Lower every method of `service`. Errors of individual methods are
/// collected and reported together.
pub fn lower_service(
    mapper: &TypeMapper,
    service: &ServiceDescriptor,
    ledger: &mut Ledger,
) -> Result<ServiceDef, BindError> {
    let mut queries = Vec::new();
    let mut mutations = Vec::new();
    let mut diagnostics = Diagnostics::default();

    for method in &service.methods {
        let element = format!("{}.{}", service.full_name(), method.name);
        let exposure = resolve_method_directives(service, method, mapper.options())
            .and_then(|directives| directives.exposure(&element));

        let lowered = match exposure {
            Ok(None) => {
                warn!("{} is not exposed: no query or mutation name", element);
                continue;
            }
            Ok(Some(Exposure::Query(field_name))) => {
                lower_query(mapper, service, method, &element, field_name).map(|query| queries.push(query))
            }
            Ok(Some(Exposure::Mutation(field_name))) => {
                lower_mutation(mapper, service, method, &element, field_name, ledger)
                    .map(|mutation| mutations.push(mutation))
            }
            Err(e) => Err(e),
        };
        if let Err(e) = lowered {
            diagnostics.push(e);
        }
    }
    diagnostics.into_result()?;

    Ok(ServiceDef {
        name: service.name.clone(),
        full_name: service.full_name(),
        registration: operations_registration(&service.name),
        queries,
        mutations,
    })
}

/// Request and response messages of `method`; a skipped response message
/// cannot be returned.
fn endpoints<'p>(
    mapper: &TypeMapper<'p>,
    method: &MethodDescriptor,
    element: &str,
) -> Result<(&'p MessageDescriptor, &'p MessageDescriptor), BindError> {
    let pool = mapper.pool();
    let request = pool
        .message(&method.input_type)
        .ok_or_else(|| BindError::UnknownType(method.input_type.clone()))?;
    let response = pool
        .message(&method.output_type)
        .ok_or_else(|| BindError::UnknownType(method.output_type.clone()))?;

    if resolve_message_directives(response, mapper.options())?.skip {
        return Err(BindError::conflict(
            element,
            format!("returns the skipped message {}", quote(&method.output_type)),
        ));
    }
    Ok((request, response))
}

/// How an argument of `rule` is turned into the request's value.
fn conversion(rule: &BindingRule) -> ArgumentConversion {
    match rule {
        BindingRule::Identifier => ArgumentConversion::IdentifierValue,
        BindingRule::WellKnown(well_known) => ArgumentConversion::Coerce(well_known.input_coercion().to_string()),
        BindingRule::Map | BindingRule::OneofMember | BindingRule::Plain => ArgumentConversion::Direct,
    }
}

/// `wrapper` qualified the same way as the request type it belongs to.
fn qualified_wrapper(request_type: &TypeRef, wrapper: String) -> String {
    match &request_type.qualifier {
        Some(qualifier) => format!("{}.{}", qualifier, wrapper),
        None => wrapper,
    }
}

fn lower_query(
    mapper: &TypeMapper,
    service: &ServiceDescriptor,
    method: &MethodDescriptor,
    element: &str,
    field_name: String,
) -> Result<QueryDef, BindError> {
    let (request, _) = endpoints(mapper, method, element)?;
    let package = &service.package;
    let request_type = mapper.map_message_ref(&method.input_type, package)?;
    let return_type = mapper.map_message_ref(&method.output_type, package)?;

    let mut arguments = Vec::with_capacity(request.fields.len());
    let mut request_construction = Vec::new();
    let mut oneof_merges = Vec::new();
    let mut map_decodes = Vec::new();
    let mut seen = BTreeSet::new();

    for field in &request.fields {
        let name = upper_camel_case(&field.name);
        if !seen.insert(name.clone()) {
            return Err(BindError::conflict(
                element,
                format!("argument {} is declared more than once", quote(&name)),
            ));
        }
        let type_ref = mapper.map_field_type_from(package, request, field)?;

        // every alternative is its own nullable argument
        if let Some(oneof) = request.oneof_of(field) {
            oneof_merges.push(OneofMerge {
                source:        name.clone(),
                selector:      selector(oneof),
                wrapper_type:  qualified_wrapper(&request_type, wrapper_type(mapper.pool(), request, field)),
                variant_field: name.clone(),
                conversion:    conversion(&mapper.classify_value(request, field)?),
            });
            arguments.push(Argument {
                name,
                public_name: lower_camel_case(&field.name),
                type_ref,
                nullable: true,
            });
            continue;
        }

        let rule = mapper.classify(request, field)?;
        if let BindingRule::Map = rule {
            let key = type_ref.map_key().cloned().ok_or_else(|| BindError::UnrecognizedWireKind {
                field: format!("{}.{}", request.full_name(), field.name),
                kind:  "map without key".to_string(),
            })?;
            map_decodes.push(MapDecode {
                argument: name.clone(),
                target:   name.clone(),
                key,
                value:    type_ref.element(),
                codec:    MapCodec::Base64Json,
            });
            arguments.push(Argument {
                name,
                public_name: lower_camel_case(&field.name),
                type_ref: TypeRef::opaque_map(),
                nullable: true,
            });
            continue;
        }

        request_construction.push(RequestAssignment {
            target:     name.clone(),
            argument:   name.clone(),
            conversion: conversion(&rule),
        });
        arguments.push(Argument {
            name,
            public_name: lower_camel_case(&field.name),
            nullable: type_ref.pointerish,
            type_ref,
        });
    }

    trace!("query {} on {}", field_name, element);
    Ok(QueryDef {
        field_name,
        method_name: method.name.clone(),
        request_type,
        arguments,
        request_construction,
        oneof_merges,
        map_decodes,
        return_type,
    })
}

fn lower_mutation(
    mapper: &TypeMapper,
    service: &ServiceDescriptor,
    method: &MethodDescriptor,
    element: &str,
    field_name: String,
    ledger: &mut Ledger,
) -> Result<MutationDef, BindError> {
    let (request, _) = endpoints(mapper, method, element)?;
    let package = &service.package;
    let request_type = mapper.map_message_ref(&method.input_type, package)?;
    let payload_type = mapper.map_message_ref(&method.output_type, package)?;
    let correlation_field = mapper.options().correlation_field.clone();

    let lowered = lower_fields(mapper, request, package)?;

    let mut oneof_fields = Vec::new();
    let mut oneof_merges = Vec::new();
    for oneof in &request.oneofs {
        for field in request.oneof_fields(oneof) {
            let name = upper_camel_case(&field.name);
            let rule = mapper.classify_value(request, field)?;
            let (input_access, output_access) = value_access(&rule);
            oneof_merges.push(OneofMerge {
                source:        name.clone(),
                selector:      selector(oneof),
                wrapper_type:  qualified_wrapper(&request_type, wrapper_type(mapper.pool(), request, field)),
                variant_field: name.clone(),
                conversion:    conversion(&rule),
            });
            oneof_fields.push(FieldBinding {
                public_name:   lower_camel_case(&field.name),
                internal_name: name,
                type_ref:      mapper.map_field_type_from(package, request, field)?,
                rule:          BindingRule::OneofMember,
                input_access,
                output_access,
            });
        }
    }

    let input_name = format!("{}Input", upper_camel_case(&method.name));
    let input = MutationInputDef {
        registration: input_registration(&input_name),
        type_name: input_name,
        fields: lowered.fields,
        map_fields: lowered.map_fields,
        oneof_fields,
        correlation_field: correlation_field.clone(),
    };

    let payload_name = format!("{}Payload", upper_camel_case(&method.name));
    let payload = PayloadDef {
        registration: payload_registration(&payload_name),
        type_name: payload_name,
        payload_type,
        correlation_field: correlation_field.clone(),
    };

    ledger.insert(input.registration.clone());
    ledger.insert(payload.registration.clone());

    trace!("mutation {} on {}", field_name, element);
    Ok(MutationDef {
        field_name,
        method_name: method.name.clone(),
        request_type,
        request_field_copies: request.non_oneof_fields().map(|field| upper_camel_case(&field.name)).collect(),
        oneof_merges,
        input,
        payload,
        response: ResponseAccessor {
            payload_field: PAYLOAD_FIELD.to_string(),
            correlation_field,
        },
    })
}

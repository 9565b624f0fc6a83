//! Per-element directives read from descriptor annotations.
//!
//! Every resolver is total: an absent annotation yields the default directive.
//! A present annotation that cannot be decoded is a `MalformedDirective`.

use gqlbind_schema::{
    FieldDescriptor, FileDescriptor, MessageDescriptor, MethodDescriptor, OptionsJson,
    ServiceDescriptor,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::CompilerOptions,
    error::BindError,
    utils::{is_identifier, quote},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileDirectives {
    pub skip: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageDirectives {
    pub skip:   bool,
    pub rename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldDirectives {
    /// Treat the field as an identifier even though it is not named `id`.
    pub identifier: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodDirectives {
    pub query_name:    Option<String>,
    pub mutation_name: Option<String>,
}

/// How a method is exposed on the graph API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exposure {
    Query(String),
    Mutation(String),
}

impl MethodDirectives {
    /// `None` when the method is not exposed; a conflict when both a query and
    /// a mutation name are declared.
    pub fn exposure(&self, element: &str) -> Result<Option<Exposure>, BindError> {
        match (&self.query_name, &self.mutation_name) {
            (None, None) => Ok(None),
            (Some(query), None) => Ok(Some(Exposure::Query(query.clone()))),
            (None, Some(mutation)) => Ok(Some(Exposure::Mutation(mutation.clone()))),
            (Some(query), Some(mutation)) => Err(BindError::conflict(
                element,
                format!(
                    "declares both query {} and mutation {}",
                    quote(query),
                    quote(mutation)
                ),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDirectiveJson {
    #[serde(default)]
    query:    Option<String>,
    #[serde(default)]
    mutation: Option<String>,
}

pub fn resolve_file_directives(
    file: &FileDescriptor,
    options: &CompilerOptions,
) -> Result<FileDirectives, BindError> {
    Ok(FileDirectives {
        skip: bool_directive(&file.options, options, "file_skip", &file.name)?,
    })
}

pub fn resolve_message_directives(
    message: &MessageDescriptor,
    options: &CompilerOptions,
) -> Result<MessageDirectives, BindError> {
    let element = message.full_name();
    Ok(MessageDirectives {
        skip:   bool_directive(&message.options, options, "skip", &element)?,
        rename: name_directive(&message.options, options, "name", &element)?,
    })
}

pub fn resolve_field_directives(
    message: &MessageDescriptor,
    field: &FieldDescriptor,
    options: &CompilerOptions,
) -> Result<FieldDirectives, BindError> {
    let element = format!("{}.{}", message.full_name(), field.name);
    Ok(FieldDirectives {
        identifier: bool_directive(&field.options, options, "id", &element)?,
    })
}

pub fn resolve_method_directives(
    service: &ServiceDescriptor,
    method: &MethodDescriptor,
    options: &CompilerOptions,
) -> Result<MethodDirectives, BindError> {
    let element = format!("{}.{}", service.full_name(), method.name);
    let key = options.directive_key("schema");

    let Some(value) = method.options.get(&key) else {
        return Ok(MethodDirectives::default());
    };
    let decoded: SchemaDirectiveJson = serde_json::from_value(value.clone())
        .map_err(|e| BindError::malformed(&element, &key, e.to_string()))?;

    Ok(MethodDirectives {
        query_name:    checked_name(decoded.query, &element, &key)?,
        mutation_name: checked_name(decoded.mutation, &element, &key)?,
    })
}

fn bool_directive(
    annotations: &OptionsJson,
    options: &CompilerOptions,
    name: &str,
    element: &str,
) -> Result<bool, BindError> {
    let key = options.directive_key(name);
    match annotations.get(&key) {
        None => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) => Err(BindError::malformed(
            element,
            &key,
            format!("expected a boolean but found {}", other),
        )),
    }
}

fn name_directive(
    annotations: &OptionsJson,
    options: &CompilerOptions,
    name: &str,
    element: &str,
) -> Result<Option<String>, BindError> {
    let key = options.directive_key(name);
    match annotations.get(&key) {
        None => Ok(None),
        Some(Value::String(text)) => checked_name(Some(text.clone()), element, &key),
        Some(other) => Err(BindError::malformed(
            element,
            &key,
            format!("expected a string but found {}", other),
        )),
    }
}

/// Empty names count as unset; anything else must be a valid identifier.
fn checked_name(name: Option<String>, element: &str, key: &str) -> Result<Option<String>, BindError> {
    match name {
        None => Ok(None),
        Some(name) if name.is_empty() => Ok(None),
        Some(name) if is_identifier(&name) => Ok(Some(name)),
        Some(name) => Err(BindError::malformed(
            element,
            key,
            format!("{} is not a valid identifier", quote(&name)),
        )),
    }
}

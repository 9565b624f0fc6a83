use gqlbind_schema::{
    Cardinality, DescriptorPool, FieldDescriptor, FieldType, MessageDescriptor, ScalarType,
    TypePath,
};

use crate::{
    config::CompilerOptions,
    directives::resolve_field_directives,
    error::BindError,
    types::{BindingRule, TypeRef, WellKnownType},
};

/// Target scalar of a wire scalar. Every integer encoding maps to its natural
/// width.
pub fn scalar_name(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Bool => "bool",
        ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32 => "int32",
        ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64 => "int64",
        ScalarType::Uint32 | ScalarType::Fixed32 => "uint32",
        ScalarType::Uint64 | ScalarType::Fixed64 => "uint64",
        ScalarType::Float  => "float32",
        ScalarType::Double => "float64",
        ScalarType::String => "string",
        ScalarType::Bytes  => "bytes",
    }
}

/// Name a message or enum is declared under in generated code; nested types
/// join their enclosing names with `_`.
pub fn declared_name(path: &TypePath) -> String {
    path.local_name()
}

pub struct TypeMapper<'a> {
    pool:    &'a DescriptorPool,
    options: &'a CompilerOptions,
}

impl<'a> TypeMapper<'a> {
    pub fn new(pool: &'a DescriptorPool, options: &'a CompilerOptions) -> TypeMapper<'a> {
        TypeMapper { pool, options }
    }

    pub fn pool(&self) -> &'a DescriptorPool {
        self.pool
    }

    pub fn options(&self) -> &'a CompilerOptions {
        self.options
    }

    /// Singular fields named `id` (any case), or carrying the `id` directive.
    pub fn is_identifier(
        &self,
        message: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<bool, BindError> {
        if !field.is_singular() {
            return Ok(false);
        }
        if field.name.eq_ignore_ascii_case("id") {
            return Ok(true);
        }
        Ok(resolve_field_directives(message, field, self.options)?.identifier)
    }

    /// Pick the single binding rule of `field`, in priority order.
    pub fn classify(
        &self,
        message: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<BindingRule, BindError> {
        if self.is_identifier(message, field)? {
            return Ok(BindingRule::Identifier);
        }
        if field.oneof_index.is_some() {
            return Ok(BindingRule::OneofMember);
        }
        self.classify_value(message, field)
    }

    /// Rule for the value `field` carries, ignoring oneof membership. Used
    /// for alternatives, which convert their value like any other field.
    pub fn classify_value(
        &self,
        message: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<BindingRule, BindError> {
        if self.is_identifier(message, field)? {
            return Ok(BindingRule::Identifier);
        }
        if field.is_map() {
            return Ok(BindingRule::Map);
        }
        if let FieldType::Message(target) = &field.field_type {
            if let Some(well_known) = WellKnownType::from_full_name(target) {
                return Ok(BindingRule::WellKnown(well_known));
            }
        }
        Ok(BindingRule::Plain)
    }

    /// Type of `field` as seen from its declaring message.
    pub fn map_field_type(
        &self,
        message: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<TypeRef, BindError> {
        self.map_field_type_from(&message.package(), message, field)
    }

    /// Type of `field` as seen from code living in `from_package`.
    pub fn map_field_type_from(
        &self,
        from_package: &str,
        message: &MessageDescriptor,
        field: &FieldDescriptor,
    ) -> Result<TypeRef, BindError> {
        if self.is_identifier(message, field)? {
            return Ok(TypeRef::identifier(&self.options.identifier_scalar));
        }

        let element = format!("{}.{}", message.full_name(), field.name);
        match &field.cardinality {
            Cardinality::Singular => self.map_element(&element, &field.field_type, from_package),
            Cardinality::Repeated => {
                Ok(self.map_element(&element, &field.field_type, from_package)?.repeated())
            }
            Cardinality::Map { key, value } => {
                let key = match key {
                    FieldType::Scalar(scalar) => TypeRef::scalar(scalar_name(*scalar)),
                    other => {
                        return Err(BindError::UnrecognizedWireKind {
                            field: element,
                            kind:  format!("map key {:?}", other),
                        })
                    }
                };
                Ok(self.map_element(&element, value, from_package)?.mapped(key))
            }
        }
    }

    /// Reference to the message `full_name` from code living in `from_package`.
    pub fn map_message_ref(&self, full_name: &str, from_package: &str) -> Result<TypeRef, BindError> {
        self.map_element(full_name, &FieldType::Message(full_name.to_string()), from_package)
    }

    fn map_element(
        &self,
        element: &str,
        field_type: &FieldType,
        from_package: &str,
    ) -> Result<TypeRef, BindError> {
        match field_type {
            FieldType::Scalar(scalar) => Ok(TypeRef::scalar(scalar_name(*scalar))),
            FieldType::Message(full_name) => {
                if let Some(well_known) = WellKnownType::from_full_name(full_name) {
                    return Ok(TypeRef::well_known(well_known));
                }
                let target = self
                    .pool
                    .message(full_name)
                    .ok_or_else(|| BindError::UnknownType(full_name.clone()))?;
                let qualifier = self.qualifier(&target.path, &target.file, from_package)?;
                Ok(TypeRef::message(&declared_name(&target.path), qualifier))
            }
            FieldType::Enum(full_name) => {
                let target = self
                    .pool
                    .enumeration(full_name)
                    .ok_or_else(|| BindError::UnknownType(full_name.clone()))?;
                let qualifier = self.qualifier(&target.path, &target.file, from_package)?;
                Ok(TypeRef::enumeration(&declared_name(&target.path), qualifier))
            }
            FieldType::Group(full_name) => Err(BindError::UnrecognizedWireKind {
                field: element.to_string(),
                kind:  format!("group {}", full_name),
            }),
        }
    }

    /// Module of `path` when it lives outside `from_package`. Nested siblings
    /// share their parent's package and are never qualified.
    fn qualifier(
        &self,
        path: &TypePath,
        file: &str,
        from_package: &str,
    ) -> Result<Option<String>, BindError> {
        if path.package() == from_package {
            return Ok(None);
        }
        let file = self
            .pool
            .file(file)
            .ok_or_else(|| BindError::UnknownType(path.full_name()))?;
        Ok(Some(file.module(&self.options.default_module)))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use gqlbind_schema::DescriptorPool;

    pub const WIDGETS: &str = include_str!("../tests/fixtures/widgets.json");

    pub fn widgets() -> DescriptorPool {
        DescriptorPool::from_json(WIDGETS).expect("fixture must load")
    }
}

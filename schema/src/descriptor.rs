use serde::Serialize;

use crate::json::{EnumRepr, OptionsJson};
use crate::path::TypePath;

/// Scalar wire types. Several encodings share one natural width, which is all
/// the compiler cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScalarType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

/// Declared wire kind of a field as it appears in the descriptor, before the
/// referenced type name is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    Scalar(ScalarType),
    Message,
    Enum,
    Group,
}

impl WireKind {
    /// Decodes `TYPE_*` names and their `FieldDescriptorProto.Type` numbers.
    pub fn parse(repr: &EnumRepr) -> Option<WireKind> {
        let number = match repr {
            EnumRepr::Number(number) => *number,
            EnumRepr::Name(name) => match name.as_str() {
                "TYPE_DOUBLE"   => 1,
                "TYPE_FLOAT"    => 2,
                "TYPE_INT64"    => 3,
                "TYPE_UINT64"   => 4,
                "TYPE_INT32"    => 5,
                "TYPE_FIXED64"  => 6,
                "TYPE_FIXED32"  => 7,
                "TYPE_BOOL"     => 8,
                "TYPE_STRING"   => 9,
                "TYPE_GROUP"    => 10,
                "TYPE_MESSAGE"  => 11,
                "TYPE_BYTES"    => 12,
                "TYPE_UINT32"   => 13,
                "TYPE_ENUM"     => 14,
                "TYPE_SFIXED32" => 15,
                "TYPE_SFIXED64" => 16,
                "TYPE_SINT32"   => 17,
                "TYPE_SINT64"   => 18,
                _ => return None,
            },
        };

        let kind = match number {
            1  => WireKind::Scalar(ScalarType::Double),
            2  => WireKind::Scalar(ScalarType::Float),
            3  => WireKind::Scalar(ScalarType::Int64),
            4  => WireKind::Scalar(ScalarType::Uint64),
            5  => WireKind::Scalar(ScalarType::Int32),
            6  => WireKind::Scalar(ScalarType::Fixed64),
            7  => WireKind::Scalar(ScalarType::Fixed32),
            8  => WireKind::Scalar(ScalarType::Bool),
            9  => WireKind::Scalar(ScalarType::String),
            10 => WireKind::Group,
            11 => WireKind::Message,
            12 => WireKind::Scalar(ScalarType::Bytes),
            13 => WireKind::Scalar(ScalarType::Uint32),
            14 => WireKind::Enum,
            15 => WireKind::Scalar(ScalarType::Sfixed32),
            16 => WireKind::Scalar(ScalarType::Sfixed64),
            17 => WireKind::Scalar(ScalarType::Sint32),
            18 => WireKind::Scalar(ScalarType::Sint64),
            _ => return None,
        };
        Some(kind)
    }
}

/// Resolved field type. Message, enum and group references carry the
/// fully-qualified name of their target (no leading dot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Scalar(ScalarType),
    Message(String),
    Enum(String),
    Group(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Cardinality {
    Singular,
    Repeated,
    Map { key: FieldType, value: FieldType },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name:        String,
    pub number:      i32,
    pub json_name:   Option<String>,
    pub field_type:  FieldType,
    pub cardinality: Cardinality,
    /// Index into the owning message's real (non-synthetic) oneofs.
    pub oneof_index: Option<usize>,
    pub options:     OptionsJson,
}

impl FieldDescriptor {
    pub fn is_singular(&self) -> bool {
        matches!(self.cardinality, Cardinality::Singular)
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self.cardinality, Cardinality::Repeated)
    }

    pub fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map { .. })
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.field_type, FieldType::Message(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneofDescriptor {
    pub name:    String,
    pub index:   usize,
    pub options: OptionsJson,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    pub path:    TypePath,
    /// Name of the declaring file.
    pub file:    String,
    pub fields:  Vec<FieldDescriptor>,
    pub oneofs:  Vec<OneofDescriptor>,
    pub options: OptionsJson,
}

impl MessageDescriptor {
    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn full_name(&self) -> String {
        self.path.full_name()
    }

    pub fn package(&self) -> String {
        self.path.package()
    }

    pub fn oneof_fields(&self, oneof: &OneofDescriptor) -> impl Iterator<Item = &FieldDescriptor> {
        let index = oneof.index;
        self.fields
            .iter()
            .filter(move |field| field.oneof_index == Some(index))
    }

    pub fn non_oneof_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| field.oneof_index.is_none())
    }

    pub fn oneof_of(&self, field: &FieldDescriptor) -> Option<&OneofDescriptor> {
        field.oneof_index.and_then(|index| self.oneofs.get(index))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDescriptor {
    pub name:    String,
    pub number:  i32,
    pub options: OptionsJson,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub path:    TypePath,
    pub file:    String,
    pub values:  Vec<EnumValueDescriptor>,
    pub options: OptionsJson,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub name:             String,
    pub input_type:       String,
    pub output_type:      String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub options:          OptionsJson,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    pub name:    String,
    pub file:    String,
    pub package: String,
    pub methods: Vec<MethodDescriptor>,
    pub options: OptionsJson,
}

impl ServiceDescriptor {
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileDescriptor {
    pub name:       String,
    pub package:    String,
    pub go_package: Option<String>,
    pub options:    OptionsJson,
    /// Fully-qualified names of every message declared in the file, parents
    /// before their nested messages. Map entry messages are not listed.
    pub messages:   Vec<String>,
    /// Fully-qualified names of every enum, top-level and nested.
    pub enums:      Vec<String>,
    pub services:   Vec<ServiceDescriptor>,
}

impl FileDescriptor {
    /// Module name code in other packages uses to qualify this file's types:
    /// the last path segment of `goPackage` (ignoring any `;alias`), or
    /// `default` when the option is absent.
    pub fn module(&self, default: &str) -> String {
        match &self.go_package {
            Some(go_package) => {
                let import_path = go_package.split(';').next().unwrap_or_default();
                import_path
                    .rsplit('/')
                    .next()
                    .filter(|segment| !segment.is_empty())
                    .unwrap_or(default)
                    .to_string()
            }
            None => default.to_string(),
        }
    }
}

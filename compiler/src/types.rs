//! Binding declarations produced by one compiler run.
//!
//! Everything here is built once from the descriptor pool, never mutated
//! afterwards, and handed to a renderer as-is.

use serde::Serialize;

pub const MAP_SCALAR: &str = "Map";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WellKnownType {
    Timestamp,
    Duration,
    FieldMask,
}

impl WellKnownType {
    pub fn from_full_name(full_name: &str) -> Option<WellKnownType> {
        match full_name.trim_start_matches('.') {
            "google.protobuf.Timestamp" => Some(WellKnownType::Timestamp),
            "google.protobuf.Duration"  => Some(WellKnownType::Duration),
            "google.protobuf.FieldMask" => Some(WellKnownType::FieldMask),
            _ => None,
        }
    }

    pub fn scalar_name(self) -> &'static str {
        match self {
            WellKnownType::Timestamp => "Timestamp",
            WellKnownType::Duration  => "Duration",
            WellKnownType::FieldMask => "FieldMask",
        }
    }

    /// Converts the exposed scalar into the wire message.
    pub fn input_coercion(self) -> &'static str {
        match self {
            WellKnownType::Timestamp => "timestamp_from_scalar",
            WellKnownType::Duration  => "duration_from_scalar",
            WellKnownType::FieldMask => "field_mask_from_scalar",
        }
    }

    /// Converts the wire message into the exposed scalar.
    pub fn output_coercion(self) -> &'static str {
        match self {
            WellKnownType::Timestamp => "timestamp_to_scalar",
            WellKnownType::Duration  => "duration_to_scalar",
            WellKnownType::FieldMask => "field_mask_to_scalar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeKind {
    Identifier,
    Scalar,
    Message,
    Enum,
    WellKnown(WellKnownType),
    OneofWrapper,
    OpaqueMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RefCardinality {
    Single,
    Repeated,
    /// Keyed collection; the `TypeRef` carrying this describes the values.
    Mapped { key: Box<TypeRef> },
}

/// Target type expression of a field, argument or return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub kind:        TypeKind,
    pub base_name:   String,
    /// Module of the referenced type when it lives in another package.
    pub qualifier:   Option<String>,
    pub cardinality: RefCardinality,
    /// Embedded messages are passed by reference.
    pub pointerish:  bool,
}

impl TypeRef {
    fn single(kind: TypeKind, base_name: &str, qualifier: Option<String>, pointerish: bool) -> TypeRef {
        TypeRef {
            kind,
            base_name: base_name.to_string(),
            qualifier,
            cardinality: RefCardinality::Single,
            pointerish,
        }
    }

    pub fn identifier(scalar: &str) -> TypeRef {
        TypeRef::single(TypeKind::Identifier, scalar, None, false)
    }

    pub fn scalar(name: &str) -> TypeRef {
        TypeRef::single(TypeKind::Scalar, name, None, false)
    }

    pub fn well_known(well_known: WellKnownType) -> TypeRef {
        TypeRef::single(TypeKind::WellKnown(well_known), well_known.scalar_name(), None, false)
    }

    pub fn message(base_name: &str, qualifier: Option<String>) -> TypeRef {
        TypeRef::single(TypeKind::Message, base_name, qualifier, true)
    }

    pub fn enumeration(base_name: &str, qualifier: Option<String>) -> TypeRef {
        TypeRef::single(TypeKind::Enum, base_name, qualifier, false)
    }

    pub fn oneof_wrapper(wrapper_type: &str) -> TypeRef {
        TypeRef::single(TypeKind::OneofWrapper, wrapper_type, None, true)
    }

    /// Opaque string scalar carrying an encoded map.
    pub fn opaque_map() -> TypeRef {
        TypeRef::single(TypeKind::OpaqueMap, MAP_SCALAR, None, false)
    }

    pub fn repeated(self) -> TypeRef {
        TypeRef {
            cardinality: RefCardinality::Repeated,
            ..self
        }
    }

    pub fn mapped(self, key: TypeRef) -> TypeRef {
        TypeRef {
            cardinality: RefCardinality::Mapped { key: Box::new(key) },
            ..self
        }
    }

    /// The same type with its cardinality dropped.
    pub fn element(&self) -> TypeRef {
        TypeRef {
            cardinality: RefCardinality::Single,
            ..self.clone()
        }
    }

    pub fn map_key(&self) -> Option<&TypeRef> {
        match &self.cardinality {
            RefCardinality::Mapped { key } => Some(key.as_ref()),
            _ => None,
        }
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self.cardinality, RefCardinality::Repeated)
    }

    /// `module.Name` or `Name`.
    pub fn qualified_name(&self) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{}.{}", qualifier, self.base_name),
            None => self.base_name.clone(),
        }
    }
}

/// Exactly one rule applies to each field, chosen in declaration order of the
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BindingRule {
    Identifier,
    OneofMember,
    Map,
    WellKnown(WellKnownType),
    Plain,
}

/// Encoding of maps crossing the API boundary: standard base64 (padded) of
/// the UTF-8 JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MapCodec {
    Base64Json,
}

/// How an input value lands on the request-side struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InputAccess {
    /// Pass the value through unchanged.
    Assign,
    /// Unwrap a nullable scalar.
    Deref,
    /// Take the raw value out of the identifier scalar.
    IdentifierValue,
    Coerce(String),
    /// Overwrite the parent's oneof selector with this alternative.
    ReplaceSelector { selector: String },
    DecodeMap(MapCodec),
}

/// How a response-side value is exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OutputAccess {
    Read,
    IdentifierWrap,
    Coerce(String),
    EncodeMap(MapCodec),
    /// Exhaustive match over the set alternative, see [`UnionAccessor`].
    UnionMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldBinding {
    /// Name exposed on the graph API.
    pub public_name:   String,
    /// Name of the field on the generated struct.
    pub internal_name: String,
    pub type_ref:      TypeRef,
    pub rule:          BindingRule,
    pub input_access:  InputAccess,
    pub output_access: OutputAccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapBinding {
    pub public_name:   String,
    pub internal_name: String,
    pub key:           TypeRef,
    pub value:         TypeRef,
    pub codec:         MapCodec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionVariant {
    pub union_name:        String,
    pub member_type_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UnionCase {
    Variant { wrapper_type: String },
    /// No alternative is set; the accessor yields an absent value.
    Unset,
}

/// Consolidated output accessor of a oneof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionAccessor {
    pub public_name: String,
    pub selector:    String,
    pub union_name:  String,
    pub cases:       Vec<UnionCase>,
}

/// Single-field input object wrapping one oneof alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantInputDef {
    pub wrapper_type:      String,
    pub schema_name:       String,
    pub registration:      String,
    pub field_public_name: String,
    pub target_name:       String,
    pub value_type:        TypeRef,
}

/// Object exposing the value wrapped by one oneof alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantOutputDef {
    pub wrapper_type:      String,
    pub schema_name:       String,
    pub registration:      String,
    pub field_public_name: String,
    pub value_name:        String,
    pub value_type:        TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneofGroup {
    pub message: String,
    pub oneof:   String,
    pub union:   UnionVariant,
    pub inputs:  Vec<VariantInputDef>,
    pub outputs: Vec<VariantOutputDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDef {
    pub declared_name:          String,
    pub full_name:              String,
    pub registered_schema_name: String,
    pub registration:           String,
    pub fields:                 Vec<FieldBinding>,
    pub map_fields:             Vec<MapBinding>,
    pub union_fields:           Vec<FieldBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDef {
    pub declared_name:          String,
    pub full_name:              String,
    pub registered_schema_name: String,
    pub registration:           String,
    pub fields:                 Vec<FieldBinding>,
    pub map_fields:             Vec<MapBinding>,
    pub union_fields:           Vec<UnionAccessor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValueDef {
    pub literal: String,
    pub ordinal: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDef {
    pub declared_name: String,
    pub full_name:     String,
    pub registration:  String,
    pub values:        Vec<EnumValueDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Argument {
    /// Field name on the generated argument struct.
    pub name:        String,
    pub public_name: String,
    pub type_ref:    TypeRef,
    pub nullable:    bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ArgumentConversion {
    Direct,
    IdentifierValue,
    Coerce(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestAssignment {
    pub target:     String,
    pub argument:   String,
    pub conversion: ArgumentConversion,
}

/// Attaches a oneof alternative to the outgoing request when it was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneofMerge {
    pub source:        String,
    pub selector:      String,
    pub wrapper_type:  String,
    pub variant_field: String,
    pub conversion:    ArgumentConversion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapDecode {
    pub argument: String,
    pub target:   String,
    pub key:      TypeRef,
    pub value:    TypeRef,
    pub codec:    MapCodec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDef {
    pub field_name:           String,
    pub method_name:          String,
    pub request_type:         TypeRef,
    pub arguments:            Vec<Argument>,
    pub request_construction: Vec<RequestAssignment>,
    pub oneof_merges:         Vec<OneofMerge>,
    pub map_decodes:          Vec<MapDecode>,
    /// The backing call's result is returned unchanged.
    pub return_type:          TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationInputDef {
    pub type_name:         String,
    pub registration:      String,
    pub fields:            Vec<FieldBinding>,
    pub map_fields:        Vec<MapBinding>,
    pub oneof_fields:      Vec<FieldBinding>,
    pub correlation_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadDef {
    pub type_name:         String,
    pub registration:      String,
    pub payload_type:      TypeRef,
    pub correlation_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseAccessor {
    pub payload_field:     String,
    pub correlation_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationDef {
    pub field_name:           String,
    pub method_name:          String,
    pub request_type:         TypeRef,
    pub input:                MutationInputDef,
    pub payload:              PayloadDef,
    pub request_field_copies: Vec<String>,
    pub oneof_merges:         Vec<OneofMerge>,
    pub response:             ResponseAccessor,
}

impl MutationDef {
    pub fn input_type_name(&self) -> &str {
        &self.input.type_name
    }

    pub fn payload_type_name(&self) -> &str {
        &self.payload.type_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDef {
    pub name:         String,
    pub full_name:    String,
    /// Installer of the service's operations; takes a client, so it is not a
    /// ledger entry.
    pub registration: String,
    pub queries:      Vec<QueryDef>,
    pub mutations:    Vec<MutationDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_builders() {
        let part = TypeRef::message("Widget_Part", None);
        assert!(part.pointerish);
        assert_eq!(part.qualified_name(), "Widget_Part");

        let parts = part.clone().repeated();
        assert!(parts.is_repeated());
        assert_eq!(parts.element(), part);

        let labels = part.clone().mapped(TypeRef::scalar("string"));
        assert_eq!(labels.map_key(), Some(&TypeRef::scalar("string")));
        assert_eq!(labels.element(), part);
    }

    #[test]
    fn test_well_known_types() {
        assert_eq!(
            WellKnownType::from_full_name(".google.protobuf.Timestamp"),
            Some(WellKnownType::Timestamp)
        );
        assert_eq!(WellKnownType::from_full_name("google.protobuf.Any"), None);

        let field_mask = TypeRef::well_known(WellKnownType::FieldMask);
        assert_eq!(field_mask.base_name, "FieldMask");
        assert!(!field_mask.pointerish);
    }

    #[test]
    fn test_qualified_name() {
        let owner = TypeRef::message("Owner", Some("common".into()));
        assert_eq!(owner.qualified_name(), "common.Owner");
    }
}

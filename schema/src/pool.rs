use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::{
    descriptor::{
        Cardinality, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldType,
        FileDescriptor, MessageDescriptor, MethodDescriptor, OneofDescriptor, ServiceDescriptor,
        WireKind,
    },
    error::SchemaError,
    json::{
        DescriptorSetJson, EnumDescriptorJson, EnumRepr, FieldDescriptorJson, FileDescriptorJson,
        MessageDescriptorJson,
    },
    path::TypePath,
};

/// Package whose files are only generated when explicitly requested.
pub const WELL_KNOWN_PACKAGE: &str = "google.protobuf";

/// Immutable, fully-resolved view of a descriptor set.
#[derive(Debug, Clone, Default)]
pub struct DescriptorPool {
    files:     Vec<FileDescriptor>,
    messages:  BTreeMap<String, MessageDescriptor>,
    enums:     BTreeMap<String, EnumDescriptor>,
    targets:   BTreeSet<String>,
    parameter: Option<String>,
}

impl DescriptorPool {
    /// Parse descriptor-set JSON and resolve it.
    pub fn from_json(text: &str) -> Result<DescriptorPool, SchemaError> {
        let set: DescriptorSetJson = serde_json::from_str(text)?;
        DescriptorPool::from_descriptor_set(&set)
    }

    /// Resolve every type reference of `set`. Fails on the first undefined or
    /// duplicated type.
    pub fn from_descriptor_set(set: &DescriptorSetJson) -> Result<DescriptorPool, SchemaError> {
        let mut loader = Loader::default();

        // 1) Index every declaration so references can be resolved in any order
        for file in &set.file {
            let package = file.package.clone().unwrap_or_default();
            for message in &file.message_type {
                let name = required(message.name.as_ref(), "message", file_name(file))?;
                loader.index_message(TypePath::new(&package, name), message)?;
            }
            for enumeration in &file.enum_type {
                let name = required(enumeration.name.as_ref(), "enum", file_name(file))?;
                loader.index_enum(&TypePath::new(&package, name))?;
            }
        }

        // 2) Build the resolved tree
        let mut pool = DescriptorPool {
            parameter: set.parameter.clone(),
            ..DescriptorPool::default()
        };
        for file in &set.file {
            let resolved = loader.build_file(file, &mut pool)?;
            pool.files.push(resolved);
        }

        // 3) Pick the files to generate
        if set.file_to_generate.is_empty() {
            pool.targets = pool
                .files
                .iter()
                .filter(|file| file.package != WELL_KNOWN_PACKAGE)
                .map(|file| file.name.clone())
                .collect();
        } else {
            for target in &set.file_to_generate {
                if pool.file(target).is_none() {
                    return Err(SchemaError::UnknownTarget(target.clone()));
                }
                pool.targets.insert(target.clone());
            }
        }

        Ok(pool)
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&FileDescriptor> {
        self.files.iter().find(|file| file.name == name)
    }

    /// Files the caller asked to generate, in descriptor-set order.
    pub fn target_files(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.files
            .iter()
            .filter(move |file| self.targets.contains(&file.name))
    }

    pub fn is_target(&self, file: &str) -> bool {
        self.targets.contains(file)
    }

    /// Look up a message by fully-qualified name; a leading dot is accepted.
    pub fn message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.messages.get(full_name.trim_start_matches('.'))
    }

    pub fn enumeration(&self, full_name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(full_name.trim_start_matches('.'))
    }

    pub fn messages(&self) -> impl Iterator<Item = &MessageDescriptor> {
        self.messages.values()
    }

    /// Generator parameter string carried by a code generator request.
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Message,
    MapEntry,
    Enum,
}

#[derive(Default)]
struct Loader<'a> {
    kinds:       BTreeMap<String, DeclKind>,
    map_entries: BTreeMap<String, &'a MessageDescriptorJson>,
}

impl<'a> Loader<'a> {
    fn declare(&mut self, path: &TypePath, kind: DeclKind) -> Result<(), SchemaError> {
        let full_name = path.full_name();
        if self.kinds.insert(full_name.clone(), kind).is_some() {
            return Err(SchemaError::DuplicateType(full_name));
        }
        Ok(())
    }

    fn index_message(
        &mut self,
        path: TypePath,
        message: &'a MessageDescriptorJson,
    ) -> Result<(), SchemaError> {
        if message.is_map_entry() {
            self.declare(&path, DeclKind::MapEntry)?;
            self.map_entries.insert(path.full_name(), message);
        } else {
            self.declare(&path, DeclKind::Message)?;
        }

        for nested in &message.nested_type {
            let name = required(nested.name.as_ref(), "message", &path.full_name())?;
            self.index_message(path.child(name), nested)?;
        }
        for enumeration in &message.enum_type {
            let name = required(enumeration.name.as_ref(), "enum", &path.full_name())?;
            self.index_enum(&path.child(name))?;
        }
        Ok(())
    }

    fn index_enum(&mut self, path: &TypePath) -> Result<(), SchemaError> {
        self.declare(path, DeclKind::Enum)
    }

    fn build_file(
        &self,
        file: &FileDescriptorJson,
        pool: &mut DescriptorPool,
    ) -> Result<FileDescriptor, SchemaError> {
        let name = required(file.name.as_ref(), "file", "descriptor set")?.to_string();
        let package = file.package.clone().unwrap_or_default();
        let options = file.options.clone().unwrap_or_default();
        let go_package = options
            .get("goPackage")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut resolved = FileDescriptor {
            name,
            package: package.clone(),
            go_package,
            options,
            messages: Vec::new(),
            enums: Vec::new(),
            services: Vec::new(),
        };

        for message in &file.message_type {
            let message_name = required(message.name.as_ref(), "message", &resolved.name)?;
            self.build_message(TypePath::new(&package, message_name), message, &mut resolved, pool)?;
        }
        for enumeration in &file.enum_type {
            let enum_name = required(enumeration.name.as_ref(), "enum", &resolved.name)?;
            self.build_enum(TypePath::new(&package, enum_name), enumeration, &mut resolved, pool)?;
        }

        for service in &file.service {
            let service_name = required(service.name.as_ref(), "service", &resolved.name)?.to_string();
            let mut methods = Vec::with_capacity(service.method.len());
            for method in &service.method {
                let method_name = required(method.name.as_ref(), "method", &service_name)?.to_string();
                let referrer = format!("{}.{}", service_name, method_name);
                methods.push(MethodDescriptor {
                    input_type:       self.resolve_message(&referrer, method.input_type.as_deref())?,
                    output_type:      self.resolve_message(&referrer, method.output_type.as_deref())?,
                    name:             method_name,
                    client_streaming: method.client_streaming,
                    server_streaming: method.server_streaming,
                    options:          method.options.clone().unwrap_or_default(),
                });
            }
            resolved.services.push(ServiceDescriptor {
                name:    service_name,
                file:    resolved.name.clone(),
                package: package.clone(),
                methods,
                options: service.options.clone().unwrap_or_default(),
            });
        }

        Ok(resolved)
    }

    fn build_message(
        &self,
        path: TypePath,
        message: &MessageDescriptorJson,
        file: &mut FileDescriptor,
        pool: &mut DescriptorPool,
    ) -> Result<(), SchemaError> {
        if message.is_map_entry() {
            return Ok(());
        }
        let full_name = path.full_name();

        // proto3 `optional` fields live in synthetic single-field oneofs that
        // are not real alternatives
        let synthetic: BTreeSet<i32> = message
            .field
            .iter()
            .filter(|field| field.proto3_optional)
            .filter_map(|field| field.oneof_index)
            .collect();

        let mut oneofs = Vec::new();
        let mut renumbered: BTreeMap<i32, usize> = BTreeMap::new();
        for (declared, oneof) in message.oneof_decl.iter().enumerate() {
            let declared = declared as i32;
            if synthetic.contains(&declared) {
                continue;
            }
            let name = required(oneof.name.as_ref(), "oneof", &full_name)?;
            renumbered.insert(declared, oneofs.len());
            oneofs.push(OneofDescriptor {
                name:    name.to_string(),
                index:   oneofs.len(),
                options: oneof.options.clone().unwrap_or_default(),
            });
        }

        let mut fields = Vec::with_capacity(message.field.len());
        for field in &message.field {
            let mut resolved = self.build_field(&full_name, field)?;
            resolved.oneof_index = match field.oneof_index {
                Some(_) if field.proto3_optional => None,
                Some(index) => match renumbered.get(&index) {
                    Some(real) => Some(*real),
                    None => {
                        return Err(SchemaError::InvalidOneofIndex {
                            field: format!("{}.{}", full_name, resolved.name),
                            index,
                        })
                    }
                },
                None => None,
            };
            fields.push(resolved);
        }

        file.messages.push(full_name.clone());
        pool.messages.insert(
            full_name,
            MessageDescriptor {
                path: path.clone(),
                file: file.name.clone(),
                fields,
                oneofs,
                options: message.options.clone().unwrap_or_default(),
            },
        );

        for nested in &message.nested_type {
            let name = required(nested.name.as_ref(), "message", &path.full_name())?;
            self.build_message(path.child(name), nested, file, pool)?;
        }
        for enumeration in &message.enum_type {
            let name = required(enumeration.name.as_ref(), "enum", &path.full_name())?;
            self.build_enum(path.child(name), enumeration, file, pool)?;
        }
        Ok(())
    }

    fn build_enum(
        &self,
        path: TypePath,
        enumeration: &EnumDescriptorJson,
        file: &mut FileDescriptor,
        pool: &mut DescriptorPool,
    ) -> Result<(), SchemaError> {
        let full_name = path.full_name();
        let mut values = Vec::with_capacity(enumeration.value.len());
        for (position, value) in enumeration.value.iter().enumerate() {
            let name = required(value.name.as_ref(), "enum value", &full_name)?;
            values.push(EnumValueDescriptor {
                name:    name.to_string(),
                number:  value.number.unwrap_or(position as i32),
                options: value.options.clone().unwrap_or_default(),
            });
        }

        file.enums.push(full_name.clone());
        pool.enums.insert(
            full_name,
            EnumDescriptor {
                path,
                file: file.name.clone(),
                values,
                options: enumeration.options.clone().unwrap_or_default(),
            },
        );
        Ok(())
    }

    fn build_field(
        &self,
        owner: &str,
        field: &FieldDescriptorJson,
    ) -> Result<FieldDescriptor, SchemaError> {
        let name = required(field.name.as_ref(), "field", owner)?;
        let qualified = format!("{}.{}", owner, name);

        let wire = match &field.type_ {
            Some(repr) => Some(WireKind::parse(repr).ok_or_else(|| SchemaError::UnknownFieldType {
                field: qualified.clone(),
                kind:  repr.to_string(),
            })?),
            None => None,
        };
        let field_type = self.resolve_field_type(&qualified, wire, field.type_name.as_deref())?;

        let cardinality = match (&field_type, is_repeated(field.label.as_ref())) {
            (FieldType::Message(target), true) if self.map_entries.contains_key(target) => {
                self.map_cardinality(target)?
            }
            (_, true) => Cardinality::Repeated,
            (_, false) => Cardinality::Singular,
        };

        Ok(FieldDescriptor {
            name: name.to_string(),
            number: field.number.unwrap_or_default(),
            json_name: field.json_name.clone(),
            field_type,
            cardinality,
            oneof_index: None,
            options: field.options.clone().unwrap_or_default(),
        })
    }

    fn map_cardinality(&self, entry_name: &str) -> Result<Cardinality, SchemaError> {
        let entry = self.map_entries.get(entry_name).ok_or_else(|| SchemaError::UnresolvedType {
            referrer:  entry_name.to_string(),
            type_name: entry_name.to_string(),
        })?;

        let slot = |number: i32| -> Result<FieldType, SchemaError> {
            let field = entry
                .field
                .iter()
                .find(|field| field.number == Some(number))
                .ok_or_else(|| SchemaError::MissingName {
                    what:    if number == 1 { "key" } else { "value" },
                    context: entry_name.to_string(),
                })?;
            Ok(self.build_field(entry_name, field)?.field_type)
        };

        Ok(Cardinality::Map {
            key:   slot(1)?,
            value: slot(2)?,
        })
    }

    fn resolve_field_type(
        &self,
        referrer: &str,
        wire: Option<WireKind>,
        type_name: Option<&str>,
    ) -> Result<FieldType, SchemaError> {
        if let Some(WireKind::Scalar(scalar)) = wire {
            return Ok(FieldType::Scalar(scalar));
        }

        let Some(type_name) = type_name else {
            return Err(SchemaError::UnknownFieldType {
                field: referrer.to_string(),
                kind:  "<missing>".to_string(),
            });
        };
        let full_name = type_name.trim_start_matches('.').to_string();

        match (wire, self.kinds.get(&full_name).copied()) {
            (Some(WireKind::Group), Some(DeclKind::Message)) => Ok(FieldType::Group(full_name)),
            (Some(WireKind::Message) | None, Some(DeclKind::Message | DeclKind::MapEntry)) => {
                Ok(FieldType::Message(full_name))
            }
            (Some(WireKind::Enum) | None, Some(DeclKind::Enum)) => Ok(FieldType::Enum(full_name)),
            _ => Err(SchemaError::UnresolvedType {
                referrer:  referrer.to_string(),
                type_name: full_name,
            }),
        }
    }

    fn resolve_message(&self, referrer: &str, type_name: Option<&str>) -> Result<String, SchemaError> {
        match self.resolve_field_type(referrer, Some(WireKind::Message), type_name)? {
            FieldType::Message(full_name) => Ok(full_name),
            _ => Err(SchemaError::UnresolvedType {
                referrer:  referrer.to_string(),
                type_name: type_name.unwrap_or_default().to_string(),
            }),
        }
    }
}

fn is_repeated(label: Option<&EnumRepr>) -> bool {
    match label {
        Some(EnumRepr::Name(name)) => name == "LABEL_REPEATED",
        Some(EnumRepr::Number(number)) => *number == 3,
        None => false,
    }
}

fn file_name(file: &FileDescriptorJson) -> &str {
    file.name.as_deref().unwrap_or("<unnamed file>")
}

fn required<'s>(
    name: Option<&'s String>,
    what: &'static str,
    context: &str,
) -> Result<&'s str, SchemaError> {
    match name {
        Some(name) if !name.is_empty() => Ok(name.as_str()),
        _ => Err(SchemaError::MissingName {
            what,
            context: context.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ScalarType;

    const SAMPLE: &str = r#"{
        "file": [
            {
                "name": "google/protobuf/timestamp.proto",
                "package": "google.protobuf",
                "messageType": [{"name": "Timestamp", "field": [
                    {"name": "seconds", "number": 1, "type": "TYPE_INT64"}
                ]}]
            },
            {
                "name": "shop.proto",
                "package": "shop",
                "options": {"goPackage": "github.com/acme/shop;shoppb"},
                "messageType": [{
                    "name": "Order",
                    "field": [
                        {"name": "id", "number": 1, "type": "TYPE_STRING"},
                        {"name": "items", "number": 2, "label": "LABEL_REPEATED", "type": "TYPE_MESSAGE", "typeName": ".shop.Order.Item"},
                        {"name": "notes", "number": 3, "label": "LABEL_REPEATED", "type": "TYPE_MESSAGE", "typeName": ".shop.Order.NotesEntry"},
                        {"name": "state", "number": 4, "type": "TYPE_ENUM", "typeName": ".shop.Order.State"},
                        {"name": "email", "number": 5, "type": "TYPE_STRING", "oneofIndex": 1},
                        {"name": "phone", "number": 6, "type": "TYPE_STRING", "oneofIndex": 1},
                        {"name": "memo", "number": 7, "type": "TYPE_STRING", "oneofIndex": 0, "proto3Optional": true},
                        {"name": "placed", "number": 8, "type": "TYPE_MESSAGE", "typeName": ".google.protobuf.Timestamp"}
                    ],
                    "nestedType": [
                        {"name": "Item", "field": [{"name": "sku", "number": 1, "type": "TYPE_STRING"}]},
                        {"name": "NotesEntry", "options": {"mapEntry": true}, "field": [
                            {"name": "key", "number": 1, "type": "TYPE_STRING"},
                            {"name": "value", "number": 2, "type": "TYPE_INT32"}
                        ]}
                    ],
                    "enumType": [{"name": "State", "value": [{"name": "OPEN", "number": 0}, {"name": "SHIPPED", "number": 4}]}],
                    "oneofDecl": [{"name": "_memo"}, {"name": "contact"}]
                }],
                "service": [{"name": "Orders", "method": [
                    {"name": "GetOrder", "inputType": ".shop.Order", "outputType": ".shop.Order"}
                ]}]
            }
        ]
    }"#;

    fn load() -> DescriptorPool {
        DescriptorPool::from_json(SAMPLE).expect("from_json failed")
    }

    #[test]
    fn test_targets_exclude_well_known_files() {
        let pool = load();
        let targets: Vec<&str> = pool.target_files().map(|file| file.name.as_str()).collect();
        assert_eq!(targets, vec!["shop.proto"]);
        assert!(!pool.is_target("google/protobuf/timestamp.proto"));
    }

    #[test]
    fn test_messages_are_listed_parent_first_without_map_entries() {
        let pool = load();
        let file = pool.file("shop.proto").expect("missing file");
        assert_eq!(file.messages, vec!["shop.Order".to_string(), "shop.Order.Item".to_string()]);
        assert_eq!(file.enums, vec!["shop.Order.State".to_string()]);
        assert!(pool.message("shop.Order.NotesEntry").is_none());
        assert_eq!(file.module("pb"), "shop");
    }

    #[test]
    fn test_field_resolution() {
        let pool = load();
        let order = pool.message(".shop.Order").expect("missing Order");

        assert_eq!(order.fields[0].field_type, FieldType::Scalar(ScalarType::String));
        assert_eq!(order.fields[1].cardinality, Cardinality::Repeated);
        assert_eq!(order.fields[1].field_type, FieldType::Message("shop.Order.Item".into()));
        assert_eq!(
            order.fields[2].cardinality,
            Cardinality::Map {
                key:   FieldType::Scalar(ScalarType::String),
                value: FieldType::Scalar(ScalarType::Int32),
            }
        );
        assert_eq!(order.fields[3].field_type, FieldType::Enum("shop.Order.State".into()));
        assert_eq!(
            order.fields[7].field_type,
            FieldType::Message("google.protobuf.Timestamp".into())
        );
    }

    #[test]
    fn test_synthetic_oneofs_are_dropped() {
        let pool = load();
        let order = pool.message("shop.Order").expect("missing Order");
        assert_eq!(order.oneofs.len(), 1);
        assert_eq!(order.oneofs[0].name, "contact");
        assert_eq!(order.oneofs[0].index, 0);

        let members: Vec<&str> = order
            .oneof_fields(&order.oneofs[0])
            .map(|field| field.name.as_str())
            .collect();
        assert_eq!(members, vec!["email", "phone"]);

        let memo = order.fields.iter().find(|field| field.name == "memo").expect("missing memo");
        assert_eq!(memo.oneof_index, None);
    }

    #[test]
    fn test_enum_values_keep_declared_numbers() {
        let pool = load();
        let state = pool.enumeration("shop.Order.State").expect("missing State");
        assert_eq!(state.path.local_name(), "Order_State");
        assert_eq!(state.values[1].name, "SHIPPED");
        assert_eq!(state.values[1].number, 4);
    }

    #[test]
    fn test_unresolved_reference() {
        let text = r#"{"file": [{"name": "a.proto", "package": "a", "messageType": [{
            "name": "A",
            "field": [{"name": "b", "number": 1, "type": "TYPE_MESSAGE", "typeName": ".a.B"}]
        }]}]}"#;
        let err = DescriptorPool::from_json(text).unwrap_err();
        assert!(
            matches!(err, SchemaError::UnresolvedType { ref type_name, .. } if type_name == "a.B"),
            "expected an UnresolvedType but got {:?}",
            err
        );
    }

    #[test]
    fn test_duplicate_type() {
        let text = r#"{"file": [
            {"name": "a.proto", "package": "a", "messageType": [{"name": "A"}]},
            {"name": "b.proto", "package": "a", "messageType": [{"name": "A"}]}
        ]}"#;
        let err = DescriptorPool::from_json(text).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType(ref name) if name == "a.A"));
    }

    #[test]
    fn test_unknown_target() {
        let text = r#"{"fileToGenerate": ["missing.proto"], "file": []}"#;
        let err = DescriptorPool::from_json(text).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownTarget(_)));
    }

    #[test]
    fn test_group_fields_load() {
        let text = r#"{"file": [{"name": "a.proto", "package": "a", "messageType": [
            {"name": "A", "field": [{"name": "g", "number": 1, "type": "TYPE_GROUP", "typeName": ".a.G"}]},
            {"name": "G"}
        ]}]}"#;
        let pool = DescriptorPool::from_json(text).expect("from_json failed");
        let a = pool.message("a.A").expect("missing A");
        assert_eq!(a.fields[0].field_type, FieldType::Group("a.G".into()));
    }
}

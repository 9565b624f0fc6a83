//! Raw protoc/buf JSON form of a descriptor set.
//!
//! Only the subset the compiler needs is modelled. Custom annotations are kept
//! as the raw `options` map, where extensions show up under bracketed keys such
//! as `"[graphql.skip]": true`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

pub type OptionsJson = BTreeMap<String, Value>;

/// Either a `FileDescriptorSet` (`file`) or a code generator request
/// (`protoFile`, `fileToGenerate`, `parameter`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorSetJson {
    #[serde(default, alias = "protoFile")]
    pub file:             Vec<FileDescriptorJson>,
    #[serde(default)]
    pub file_to_generate: Vec<String>,
    #[serde(default)]
    pub parameter:        Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptorJson {
    pub name:         Option<String>,
    pub package:      Option<String>,
    #[serde(default)]
    pub message_type: Vec<MessageDescriptorJson>,
    #[serde(default)]
    pub enum_type:    Vec<EnumDescriptorJson>,
    #[serde(default)]
    pub service:      Vec<ServiceDescriptorJson>,
    #[serde(default)]
    pub options:      Option<OptionsJson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDescriptorJson {
    pub name:        Option<String>,
    #[serde(default)]
    pub field:       Vec<FieldDescriptorJson>,
    #[serde(default)]
    pub nested_type: Vec<MessageDescriptorJson>,
    #[serde(default)]
    pub enum_type:   Vec<EnumDescriptorJson>,
    #[serde(default)]
    pub oneof_decl:  Vec<OneofDescriptorJson>,
    #[serde(default)]
    pub options:     Option<OptionsJson>,
}

impl MessageDescriptorJson {
    pub fn is_map_entry(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|options| options.get("mapEntry"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Enum-valued descriptor fields arrive either by name (`"TYPE_STRING"`) or by
/// number (`9`), depending on the tool that produced the JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumRepr {
    Name(String),
    Number(i32),
}

impl fmt::Display for EnumRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumRepr::Name(name)     => f.write_str(name),
            EnumRepr::Number(number) => write!(f, "{}", number),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptorJson {
    pub name:            Option<String>,
    pub number:          Option<i32>,
    pub label:           Option<EnumRepr>,
    #[serde(rename = "type")]
    pub type_:           Option<EnumRepr>,
    pub type_name:       Option<String>,
    pub json_name:       Option<String>,
    pub oneof_index:     Option<i32>,
    #[serde(default)]
    pub proto3_optional: bool,
    #[serde(default)]
    pub options:         Option<OptionsJson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OneofDescriptorJson {
    pub name:    Option<String>,
    #[serde(default)]
    pub options: Option<OptionsJson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumDescriptorJson {
    pub name:    Option<String>,
    #[serde(default)]
    pub value:   Vec<EnumValueDescriptorJson>,
    #[serde(default)]
    pub options: Option<OptionsJson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumValueDescriptorJson {
    pub name:    Option<String>,
    pub number:  Option<i32>,
    #[serde(default)]
    pub options: Option<OptionsJson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDescriptorJson {
    pub name:    Option<String>,
    #[serde(default)]
    pub method:  Vec<MethodDescriptorJson>,
    #[serde(default)]
    pub options: Option<OptionsJson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptorJson {
    pub name:             Option<String>,
    pub input_type:       Option<String>,
    pub output_type:      Option<String>,
    #[serde(default)]
    pub client_streaming: bool,
    #[serde(default)]
    pub server_streaming: bool,
    #[serde(default)]
    pub options:          Option<OptionsJson>,
}

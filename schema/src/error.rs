use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Descriptor JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing {what} name in {context}")]
    MissingName {
        what:    &'static str,
        context: String,
    },

    #[error("The type \"{0}\" is defined twice")]
    DuplicateType(String),

    #[error("Unknown field type {kind} for field \"{field}\"")]
    UnknownFieldType {
        field: String,
        kind:  String,
    },

    #[error("The type \"{type_name}\" referenced by \"{referrer}\" is not defined")]
    UnresolvedType {
        referrer:  String,
        type_name: String,
    },

    #[error("Field \"{field}\" refers to undeclared oneof #{index}")]
    InvalidOneofIndex {
        field: String,
        index: i32,
    },

    #[error("File \"{0}\" is listed for generation but is not part of the descriptor set")]
    UnknownTarget(String),
}

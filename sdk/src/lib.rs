//! gqlbind
//!
//! This crate bundles the binding compiler for use from other tools.
//!
//! - `compile` / `compile_json` and the binding declarations (re-exported from compiler)
//! - `lower_to_json` for a one-call descriptor set → JSON run, `to_json` for bindings at hand
//! - `encode_map` / `decode_map`, the runtime half of the opaque map encoding

pub mod map_codec;

pub use gqlbind_compiler::{
    compile, compile_json, resolve_options, BindError, Bindings, CompilerOptions, Ledger,
};
pub use gqlbind_schema::{DescriptorPool, SchemaError};
pub use map_codec::{decode_map, encode_map, MapCodecError};

/// Lower descriptor-set JSON into pretty-printed binding JSON.
pub fn lower_to_json(text: &str, options: CompilerOptions) -> Result<String, BindError> {
    let bindings = compile_json(text, options)?;
    to_json(&bindings)
}

/// Pretty-printed JSON of one run's bindings.
pub fn to_json(bindings: &Bindings) -> Result<String, BindError> {
    serde_json::to_string_pretty(bindings).map_err(|e| BindError::Schema(SchemaError::Json(e)))
}

pub mod types {
    pub use gqlbind_compiler::types::*;
}

pub mod error {
    pub use gqlbind_compiler::error::{BindError, Diagnostics};
    pub use gqlbind_schema::SchemaError;
}

pub mod schema {
    pub use gqlbind_schema::*;
}

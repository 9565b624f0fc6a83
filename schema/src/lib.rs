//! Resolved protobuf descriptor model for the gqlbind compiler.
//!
//! The input is a descriptor set in protoc/buf JSON form (or a code generator
//! request carrying one). Loading indexes every declaration and resolves all
//! type references, producing an immutable tree the compiler walks.
//!
//! ```
//! use gqlbind_schema::*;
//!
//! let pool = DescriptorPool::from_json(r#"{"file": [{
//!     "name": "point.proto",
//!     "package": "geo",
//!     "messageType": [{"name": "Point", "field": [
//!         {"name": "x", "number": 1, "type": "TYPE_FLOAT"},
//!         {"name": "y", "number": 2, "type": "TYPE_FLOAT"}
//!     ]}]
//! }]}"#).unwrap();
//!
//! let point = pool.message("geo.Point").unwrap();
//! assert_eq!(point.fields[1].field_type, FieldType::Scalar(ScalarType::Float));
//! assert_eq!(point.path.local_name(), "Point");
//! ```

pub mod descriptor;
pub mod error;
pub mod json;
pub mod path;
pub mod pool;

pub use descriptor::*;
pub use error::SchemaError;
pub use json::{DescriptorSetJson, OptionsJson};
pub use path::TypePath;
pub use pool::{DescriptorPool, WELL_KNOWN_PACKAGE};

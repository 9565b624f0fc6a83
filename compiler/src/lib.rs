//! gqlbind-compiler
//!
//! This crate implements:
//!  1) Directive resolution from descriptor annotations (`directives`),
//!  2) The type mapper (`type_mapper`): scalar table, well-known types,
//!     cross-module qualification and nested names,
//!  3) Message, oneof, enum and service lowering into binding declarations,
//!  4) The registration ledger and a binding verifier (duplicate names),
//!  5) The run driver (`compile`) and error types (`BindError`).

pub mod error;
pub mod config;
pub mod types;
pub mod utils;
pub mod directives;
pub mod ledger;
pub mod type_mapper;
pub mod oneof;
pub mod message;
pub mod enums;
pub mod service;
pub mod verifier;
pub mod compiler;

pub use compiler::{compile, compile_json, resolve_options, Bindings};
pub use config::CompilerOptions;
pub use error::{BindError, Diagnostics};
pub use ledger::Ledger;
pub use verifier::verify_bindings;

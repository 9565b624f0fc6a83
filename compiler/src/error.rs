use std::fmt;

use gqlbind_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Malformed directive {directive} on {element}: {reason}")]
    MalformedDirective {
        element:   String,
        directive: String,
        reason:    String,
    },

    #[error("Unrecognized wire kind {kind} for field {field}")]
    UnrecognizedWireKind {
        field: String,
        kind:  String,
    },

    #[error("The type {0} is not defined")]
    UnknownType(String),

    #[error("Configuration conflict on {element}: {reason}")]
    Conflict {
        element: String,
        reason:  String,
    },

    #[error("Invalid generator parameter {0}")]
    InvalidParameter(String),

    #[error("{0}")]
    Multiple(Diagnostics),
}

impl BindError {
    pub(crate) fn conflict(element: impl Into<String>, reason: impl Into<String>) -> BindError {
        BindError::Conflict {
            element: element.into(),
            reason:  reason.into(),
        }
    }

    pub(crate) fn malformed(
        element: impl Into<String>,
        directive: impl Into<String>,
        reason: impl Into<String>,
    ) -> BindError {
        BindError::MalformedDirective {
            element:   element.into(),
            directive: directive.into(),
            reason:    reason.into(),
        }
    }

    /// Individual errors, flattening a `Multiple`.
    pub fn errors(&self) -> Vec<&BindError> {
        match self {
            BindError::Multiple(diagnostics) => diagnostics.0.iter().collect(),
            other => vec![other],
        }
    }
}

/// Every error gathered during one run, reported together.
#[derive(Debug, Default)]
pub struct Diagnostics(pub Vec<BindError>);

impl Diagnostics {
    pub fn push(&mut self, error: BindError) {
        match error {
            BindError::Multiple(nested) => self.0.extend(nested.0),
            other => self.0.push(other),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing was collected, the lone error when there is one,
    /// `BindError::Multiple` otherwise.
    pub fn into_result(mut self) -> Result<(), BindError> {
        match self.0.len() {
            0 => Ok(()),
            1 => Err(self.0.remove(0)),
            _ => Err(BindError::Multiple(self)),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} problems found:", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

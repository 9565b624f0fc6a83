use serde::{Deserialize, Serialize};

use crate::{error::BindError, utils::quote};

/// Knobs that change names the compiler emits, never its rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Extension namespace of the directives, e.g. `graphql` for `[graphql.skip]`.
    pub directive_namespace: String,
    /// Module used to qualify types from files without a `goPackage` option.
    pub default_module:      String,
    /// Scalar name of identifier fields.
    pub identifier_scalar:   String,
    /// Input and payload field echoing the client-supplied mutation token.
    pub correlation_field:   String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            directive_namespace: "graphql".to_string(),
            default_module:      "pb".to_string(),
            identifier_scalar:   "ID".to_string(),
            correlation_field:   "clientMutationId".to_string(),
        }
    }
}

impl CompilerOptions {
    /// Apply a protoc-style parameter string (`key=value,key=value`) on top of
    /// `self`. Unknown keys and empty values are rejected.
    pub fn with_parameter(mut self, parameter: &str) -> Result<CompilerOptions, BindError> {
        for part in parameter.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let Some((key, value)) = part.split_once('=') else {
                return Err(BindError::InvalidParameter(format!(
                    "{} is not of the form key=value",
                    quote(part)
                )));
            };
            let (key, value) = (key.trim(), value.trim());
            if value.is_empty() {
                return Err(BindError::InvalidParameter(format!("{} has no value", quote(key))));
            }

            let slot = match key {
                "namespace" | "directive_namespace" => &mut self.directive_namespace,
                "default_module"                    => &mut self.default_module,
                "identifier_scalar"                 => &mut self.identifier_scalar,
                "correlation_field"                 => &mut self.correlation_field,
                _ => {
                    return Err(BindError::InvalidParameter(format!(
                        "unknown key {}",
                        quote(key)
                    )))
                }
            };
            *slot = value.to_string();
        }
        Ok(self)
    }

    /// Bracketed option key of directive `name`, e.g. `[graphql.skip]`.
    pub fn directive_key(&self, name: &str) -> String {
        format!("[{}.{}]", self.directive_namespace, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_overrides() {
        let options = CompilerOptions::default()
            .with_parameter("namespace=jaal, default_module=types,,")
            .expect("with_parameter failed");
        assert_eq!(options.directive_namespace, "jaal");
        assert_eq!(options.default_module, "types");
        assert_eq!(options.identifier_scalar, "ID");
        assert_eq!(options.directive_key("skip"), "[jaal.skip]");
    }

    #[test]
    fn test_parameter_errors() {
        for bad in ["namespace", "color=blue", "default_module="] {
            let err = CompilerOptions::default().with_parameter(bad).unwrap_err();
            assert!(
                matches!(err, BindError::InvalidParameter(_)),
                "expected InvalidParameter for {} but got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_deserialize_partial_options() {
        let options: CompilerOptions =
            serde_json::from_str(r#"{"correlation_field": "requestToken"}"#).expect("deserialize failed");
        assert_eq!(options.correlation_field, "requestToken");
        assert_eq!(options.directive_namespace, "graphql");
    }
}

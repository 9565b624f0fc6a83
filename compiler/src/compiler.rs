use std::collections::BTreeSet;

use gqlbind_schema::{DescriptorPool, FileDescriptor};
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    config::CompilerOptions,
    directives::{resolve_file_directives, resolve_message_directives},
    enums::lower_enum,
    error::{BindError, Diagnostics},
    ledger::Ledger,
    message::{lower_input, lower_output},
    oneof::lower_oneof,
    service::{lower_service, request_names},
    type_mapper::TypeMapper,
    types::{EnumDef, InputDef, OneofGroup, OutputDef, ServiceDef},
    verifier::verify_into,
};

/// Everything one run produces, handed to a renderer as-is.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Bindings {
    pub inputs:   Vec<InputDef>,
    pub outputs:  Vec<OutputDef>,
    pub oneofs:   Vec<OneofGroup>,
    pub enums:    Vec<EnumDef>,
    pub services: Vec<ServiceDef>,
    pub ledger:   Ledger,
}

/// Apply the generator parameter carried by `pool` on top of `base`.
pub fn resolve_options(pool: &DescriptorPool, base: CompilerOptions) -> Result<CompilerOptions, BindError> {
    match pool.parameter() {
        Some(parameter) => base.with_parameter(parameter),
        None => Ok(base),
    }
}

/// Parse a descriptor set, apply its parameter and lower it.
pub fn compile_json(text: &str, base: CompilerOptions) -> Result<Bindings, BindError> {
    let pool = DescriptorPool::from_json(text)?;
    let options = resolve_options(&pool, base)?;
    compile(&pool, &options)
}

/// Lower every target file of `pool`. All errors, including verifier
/// conflicts, are reported together.
pub fn compile(pool: &DescriptorPool, options: &CompilerOptions) -> Result<Bindings, BindError> {
    let mapper = TypeMapper::new(pool, options);
    let mut bindings = Bindings::default();
    let mut diagnostics = Diagnostics::default();

    // 1) Files to lower; skipped files stay referenceable
    let mut files: Vec<&FileDescriptor> = Vec::new();
    for file in pool.target_files() {
        match resolve_file_directives(file, options) {
            Ok(directives) if directives.skip => debug!("skipping {}", file.name),
            Ok(_) => files.push(file),
            Err(e) => diagnostics.push(e),
        }
    }

    // 2) Messages used as query requests get the shortened input name
    let requests: BTreeSet<String> = files
        .iter()
        .flat_map(|file| file.services.iter())
        .flat_map(|service| request_names(service, options))
        .collect();

    // 3) Lower
    for file in &files {
        debug!("lowering {}", file.name);
        if let Err(e) = lower_file(&mapper, file, &requests, &mut bindings) {
            diagnostics.push(e);
        }
    }

    // 4) Verify
    verify_into(&bindings, &mut diagnostics);
    diagnostics.into_result()?;

    debug!(
        "lowered {} inputs, {} outputs, {} enums, {} services ({} registrations)",
        bindings.inputs.len(),
        bindings.outputs.len(),
        bindings.enums.len(),
        bindings.services.len(),
        bindings.ledger.len()
    );
    Ok(bindings)
}

fn lower_file(
    mapper: &TypeMapper,
    file: &FileDescriptor,
    requests: &BTreeSet<String>,
    bindings: &mut Bindings,
) -> Result<(), BindError> {
    let pool = mapper.pool();
    let mut diagnostics = Diagnostics::default();

    for full_name in &file.messages {
        let Some(message) = pool.message(full_name) else {
            diagnostics.push(BindError::UnknownType(full_name.clone()));
            continue;
        };
        trace!("message {}", full_name);

        let lowered = resolve_message_directives(message, mapper.options()).and_then(|directives| {
            let input = lower_input(mapper, message, requests, &directives, &mut bindings.ledger)?;
            let output = lower_output(mapper, message, &directives, &mut bindings.ledger)?;
            let mut oneofs = Vec::new();
            if !directives.skip {
                for oneof in &message.oneofs {
                    oneofs.push(lower_oneof(mapper, message, oneof, &mut bindings.ledger)?);
                }
            }
            Ok((input, output, oneofs))
        });

        match lowered {
            Ok((input, output, oneofs)) => {
                bindings.inputs.extend(input);
                bindings.outputs.extend(output);
                bindings.oneofs.extend(oneofs);
            }
            Err(e) => diagnostics.push(e),
        }
    }

    for full_name in &file.enums {
        match pool.enumeration(full_name) {
            Some(enumeration) => {
                trace!("enum {}", full_name);
                bindings.enums.push(lower_enum(enumeration, &mut bindings.ledger));
            }
            None => diagnostics.push(BindError::UnknownType(full_name.clone())),
        }
    }

    for service in &file.services {
        debug!("lowering service {}", service.full_name());
        match lower_service(mapper, service, &mut bindings.ledger) {
            Ok(lowered) => bindings.services.push(lowered),
            Err(e) => diagnostics.push(e),
        }
    }

    diagnostics.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_mapper::fixtures;

    #[test]
    fn test_parameter_is_applied() {
        let text = r#"{"parameter": "namespace=jaal", "file": [{"name": "a.proto", "package": "a",
            "messageType": [
                {"name": "Hidden", "options": {"[jaal.skip]": true}},
                {"name": "Shown", "options": {"[graphql.skip]": true}}
            ]}]}"#;
        let bindings = compile_json(text, CompilerOptions::default()).expect("compile failed");
        let names: Vec<&str> = bindings.outputs.iter().map(|output| output.declared_name.as_str()).collect();
        assert_eq!(names, vec!["Shown"]);
    }

    #[test]
    fn test_invalid_parameter() {
        let text = r#"{"parameter": "flavor=vanilla", "file": []}"#;
        let err = compile_json(text, CompilerOptions::default()).unwrap_err();
        assert!(matches!(err, BindError::InvalidParameter(_)));
    }

    #[test]
    fn test_errors_are_reported_together() {
        let text = r#"{"file": [{"name": "a.proto", "package": "a",
            "messageType": [
                {"name": "A", "options": {"[graphql.skip]": "yes"}},
                {"name": "B", "options": {"[graphql.name]": "not valid"}},
                {"name": "C", "field": [{"name": "g", "number": 1, "type": "TYPE_GROUP", "typeName": ".a.C.G"}],
                 "nestedType": [{"name": "G"}]}
            ]}]}"#;
        let err = compile_json(text, CompilerOptions::default()).unwrap_err();
        let errors = err.errors();
        assert_eq!(errors.len(), 3, "unexpected errors: {}", err);
        assert!(matches!(errors[0], BindError::MalformedDirective { .. }));
        assert!(matches!(errors[1], BindError::MalformedDirective { .. }));
        assert!(matches!(errors[2], BindError::UnrecognizedWireKind { .. }));
    }

    #[test]
    fn test_skipped_files_are_not_lowered() {
        let pool = fixtures::widgets();
        let bindings = compile(&pool, &CompilerOptions::default()).expect("compile failed");
        assert!(bindings.inputs.iter().all(|input| input.full_name != "acme.widgets.Legacy"));
        assert!(bindings.outputs.iter().all(|output| !output.full_name.starts_with("google.")));
    }
}

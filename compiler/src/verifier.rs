use std::collections::HashMap;

use crate::{
    compiler::Bindings,
    error::{BindError, Diagnostics},
    utils::quote,
};

/// Names sharing one schema namespace, remembering who declared each.
struct Namespace {
    kind:     &'static str,
    declared: HashMap<String, String>,
}

impl Namespace {
    fn new(kind: &'static str) -> Namespace {
        Namespace {
            kind,
            declared: HashMap::new(),
        }
    }

    fn declare(&mut self, name: &str, owner: &str, diagnostics: &mut Diagnostics) {
        match self.declared.get(name) {
            Some(first) => diagnostics.push(BindError::conflict(
                owner,
                format!(
                    "the {} {} is already declared by {}",
                    self.kind,
                    quote(name),
                    first
                ),
            )),
            None => {
                self.declared.insert(name.to_string(), owner.to_string());
            }
        }
    }
}

/// Returns `Ok(())` if no two declarations claim the same schema name, or
/// every conflict found otherwise.
pub fn verify_bindings(bindings: &Bindings) -> Result<(), BindError> {
    let mut diagnostics = Diagnostics::default();
    verify_into(bindings, &mut diagnostics);
    diagnostics.into_result()
}

pub(crate) fn verify_into(bindings: &Bindings, diagnostics: &mut Diagnostics) {
    let mut inputs = Namespace::new("input object");
    let mut objects = Namespace::new("object");
    let mut queries = Namespace::new("query");
    let mut mutations = Namespace::new("mutation");

    // 1) Input objects
    for input in &bindings.inputs {
        inputs.declare(&input.registered_schema_name, &input.full_name, diagnostics);
    }
    for group in &bindings.oneofs {
        let owner = format!("{}.{}", group.message, group.oneof);
        for variant in &group.inputs {
            inputs.declare(&variant.schema_name, &owner, diagnostics);
        }
    }

    // 2) Objects and unions
    for output in &bindings.outputs {
        objects.declare(&output.registered_schema_name, &output.full_name, diagnostics);
    }
    for group in &bindings.oneofs {
        let owner = format!("{}.{}", group.message, group.oneof);
        objects.declare(&group.union.union_name, &owner, diagnostics);
        for variant in &group.outputs {
            objects.declare(&variant.schema_name, &owner, diagnostics);
        }
    }

    // 3) Operations, including the declarations mutations add
    for service in &bindings.services {
        for query in &service.queries {
            let owner = format!("{}.{}", service.full_name, query.method_name);
            queries.declare(&query.field_name, &owner, diagnostics);
        }
        for mutation in &service.mutations {
            let owner = format!("{}.{}", service.full_name, mutation.method_name);
            mutations.declare(&mutation.field_name, &owner, diagnostics);
            inputs.declare(mutation.input_type_name(), &owner, diagnostics);
            objects.declare(mutation.payload_type_name(), &owner, diagnostics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ledger::Ledger,
        types::{InputDef, QueryDef, ServiceDef, TypeRef},
    };

    fn input(full_name: &str, schema_name: &str) -> InputDef {
        InputDef {
            declared_name:          full_name.rsplit('.').next().unwrap_or(full_name).to_string(),
            full_name:              full_name.to_string(),
            registered_schema_name: schema_name.to_string(),
            registration:           format!("RegisterInput{}", schema_name),
            fields:                 Vec::new(),
            map_fields:             Vec::new(),
            union_fields:           Vec::new(),
        }
    }

    fn query(method_name: &str, field_name: &str) -> QueryDef {
        QueryDef {
            field_name:           field_name.to_string(),
            method_name:          method_name.to_string(),
            request_type:         TypeRef::message("Req", None),
            arguments:            Vec::new(),
            request_construction: Vec::new(),
            oneof_merges:         Vec::new(),
            map_decodes:          Vec::new(),
            return_type:          TypeRef::message("Res", None),
        }
    }

    fn service(name: &str, queries: Vec<QueryDef>) -> ServiceDef {
        ServiceDef {
            name:         name.to_string(),
            full_name:    format!("a.{}", name),
            registration: format!("Register{}Operations", name),
            queries,
            mutations:    Vec::new(),
        }
    }

    #[test]
    fn test_distinct_names_pass() {
        let bindings = Bindings {
            inputs: vec![input("a.Widget", "WidgetInput"), input("a.Gadget", "GadgetInput")],
            services: vec![service("A", vec![query("Get", "widget")])],
            ..Bindings::default()
        };
        assert!(verify_bindings(&bindings).is_ok());
    }

    #[test]
    fn test_duplicate_input_schema_name() {
        // `GetWidgetReq` as a query request and a plain `GetWidget` both end up as `GetWidgetInput`
        let bindings = Bindings {
            inputs: vec![input("a.GetWidgetReq", "GetWidgetInput"), input("a.GetWidget", "GetWidgetInput")],
            ledger: Ledger::new(),
            ..Bindings::default()
        };
        let err = verify_bindings(&bindings).unwrap_err();
        assert!(
            matches!(err, BindError::Conflict { ref element, ref reason }
                if element == "a.GetWidget" && reason.contains("a.GetWidgetReq")),
            "expected a Conflict but got {:?}",
            err
        );
    }

    #[test]
    fn test_duplicate_query_names_across_services() {
        let bindings = Bindings {
            services: vec![
                service("A", vec![query("Get", "widget")]),
                service("B", vec![query("Fetch", "widget"), query("List", "widgets")]),
            ],
            ..Bindings::default()
        };
        let err = verify_bindings(&bindings).unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert!(err.to_string().contains("a.B.Fetch"));
    }
}

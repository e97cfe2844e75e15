use serde_json::{json, Value};
use stockflow_core::model::ModelDocument;
use stockflow_core::{catalog, validate, Domain, Validator, Violation, ViolationKind};

fn doc(value: Value) -> ModelDocument {
    ModelDocument::from_value(value).unwrap()
}

fn kinds(violations: &[Violation]) -> Vec<ViolationKind> {
    violations.iter().map(|v| v.kind).collect()
}

fn hiring(equation: &str) -> Value {
    json!({
        "name": "Hiring",
        "description": "Juniors hired against a target",
        "stocks": [{"id": "junior_engineers", "name": "Juniors", "initial_value": 10}],
        "flows": [{"id": "hiring_rate", "name": "Hiring", "to_stock": "junior_engineers", "equation": equation}],
        "parameters": [{"id": "hiring_target", "name": "Target", "value": 5}]
    })
}

#[test]
fn test_accepted_model_gets_domain_defaults() {
    let model = validate("AERODIN", &doc(hiring("hiring_target"))).unwrap();
    assert_eq!(model.domain(), Domain::Aerodin);
    assert_eq!(model.time().end, 60.0);
    assert_eq!(model.document().company.as_deref(), Some("aerodin"));
}

#[test]
fn test_closed_world_rejects_foreign_identifier() {
    let mut value = hiring("hiring_target");
    value["stocks"][0]["id"] = json!("battery_inventory");
    value["flows"][0]["to_stock"] = json!("battery_inventory");

    let violations = validate("aerodin", &doc(value)).unwrap_err();
    let v = violations.iter().find(|v| v.kind == ViolationKind::IdentifierNotAllowed).unwrap();
    assert_eq!(v.offending_id.as_deref(), Some("battery_inventory"));
    assert!(v.related.iter().any(|id| id == "skilled_engineers"));

    let euro = validate("euromotion", &doc(hiring("hiring_target"))).unwrap_err();
    assert!(euro.iter().all(|v| v.kind == ViolationKind::IdentifierNotAllowed));
}

#[test]
fn test_unknown_references_are_named() {
    let violations = validate("aerodin", &doc(hiring("hiring_target * ghost_factor + t"))).unwrap_err();
    assert_eq!(kinds(&violations), vec![ViolationKind::UnknownReference]);
    assert_eq!(violations[0].offending_id.as_deref(), Some("hiring_rate"));
    assert_eq!(violations[0].related, vec!["ghost_factor".to_string()]);
}

#[test]
fn test_undeclared_endpoint() {
    let mut value = hiring("hiring_target");
    value["flows"][0]["from_stock"] = json!("skilled_engineers");
    let violations = validate("aerodin", &doc(value)).unwrap_err();
    assert_eq!(kinds(&violations), vec![ViolationKind::UnknownReference]);
    assert_eq!(violations[0].related, vec!["skilled_engineers".to_string()]);
}

#[test]
fn test_forbidden_edge() {
    let value = json!({
        "name": "Knowledge sale",
        "description": "Turning research directly into cash",
        "stocks": [
            {"id": "rd_knowledge", "name": "Knowledge", "initial_value": 100},
            {"id": "cash_reserves", "name": "Cash", "initial_value": 0}
        ],
        "flows": [{
            "id": "revenue", "name": "Revenue",
            "from_stock": "rd_knowledge", "to_stock": "cash_reserves",
            "equation": "rd_knowledge * 0.1"
        }]
    });
    let violations = validate("aerodin", &doc(value)).unwrap_err();
    assert_eq!(kinds(&violations), vec![ViolationKind::ForbiddenEdge]);
    assert_eq!(violations[0].related, vec!["rd_knowledge".to_string(), "cash_reserves".to_string()]);
}

#[test]
fn test_forbidden_words_are_whole_tokens() {
    let violations = validate("aerodin", &doc(hiring("hiring_target * random(1)"))).unwrap_err();
    assert!(kinds(&violations).contains(&ViolationKind::ForbiddenFunction));

    let mut value = hiring("deployment_readiness_index");
    value["auxiliaries"] = json!([{"id": "deployment_readiness_index", "name": "Readiness", "equation": "hiring_target / 2"}]);
    assert!(validate("aerodin", &doc(value)).is_ok());
}

#[test]
fn test_mandatory_intermediate() {
    let value = json!({
        "name": "Shortcut",
        "description": "Programs appear without regulatory review",
        "stocks": [{"id": "active_defense_programs", "name": "Programs", "initial_value": 1}],
        "flows": [{"id": "program_approval_rate", "name": "Approvals", "to_stock": "active_defense_programs", "equation": "1"}]
    });
    let violations = validate("aerodin", &doc(value)).unwrap_err();
    assert_eq!(kinds(&violations), vec![ViolationKind::MissingMandatoryIntermediate]);
}

#[test]
fn test_required_dependency() {
    let entry = catalog::get("euromotion_growth").unwrap();
    let mut document = entry.document().unwrap();
    document.flows.iter_mut().find(|f| f.id == "vehicle_output_rate").unwrap().equation =
        "installed_production_capacity * production_efficiency".into();

    let violations = Validator::new(Domain::Euromotion).validate(&document).unwrap_err();
    assert_eq!(kinds(&violations), vec![ViolationKind::MissingRequiredDependency]);
    assert_eq!(
        violations[0].related,
        vec!["battery_inventory".to_string(), "semiconductor_inventory".to_string()]
    );
}

#[test]
fn test_cycle_between_auxiliaries() {
    let mut value = hiring("total_workforce");
    value["auxiliaries"] = json!([
        {"id": "total_workforce", "name": "Total", "equation": "workforce_gap + junior_engineers"},
        {"id": "workforce_gap", "name": "Gap", "equation": "hiring_target - total_workforce"}
    ]);
    let violations = validate("aerodin", &doc(value)).unwrap_err();
    assert_eq!(kinds(&violations), vec![ViolationKind::DependencyCycle]);
    let mut related = violations[0].related.clone();
    related.sort();
    assert_eq!(related, vec!["total_workforce".to_string(), "workforce_gap".to_string()]);
}

#[test]
fn test_all_violations_reported_together() {
    let value = json!({
        "name": "",
        "description": "short",
        "stocks": [
            {"id": "junior_engineers", "name": "Juniors", "initial_value": -1},
            {"id": "battery_inventory", "name": "Batteries", "initial_value": 1}
        ],
        "flows": [
            {"id": "hiring_rate", "name": "Hiring", "to_stock": "junior_engineers", "equation": "exec(1) + nowhere"},
            {"id": "attrition_rate", "name": "Attrition", "equation": "1"}
        ],
        "time": {"start": 0, "end": 10, "dt": 2}
    });
    let violations = validate("aerodin", &doc(value)).unwrap_err();
    let found = kinds(&violations);
    for expected in [
        ViolationKind::StructuralError,
        ViolationKind::IdentifierNotAllowed,
        ViolationKind::UnknownReference,
        ViolationKind::ForbiddenFunction,
    ] {
        assert!(found.contains(&expected), "missing {:?} in {:#?}", expected, violations);
    }
    // name, description, initial value, degenerate flow and dt at least.
    assert!(found.iter().filter(|k| **k == ViolationKind::StructuralError).count() >= 5);
}

#[test]
fn test_function_used_as_value_is_reported_with_other_violations() {
    let mut value = hiring("abs + 1");
    value["description"] = json!("short");
    let violations = validate("aerodin", &doc(value)).unwrap_err();

    assert_eq!(kinds(&violations), vec![ViolationKind::StructuralError, ViolationKind::UnknownReference]);
    assert_eq!(violations[1].offending_id.as_deref(), Some("hiring_rate"));
    assert_eq!(violations[1].related, vec!["abs".to_string()]);
}

#[test]
fn test_unknown_domain() {
    let violations = validate("nowhere", &doc(hiring("hiring_target"))).unwrap_err();
    assert_eq!(kinds(&violations), vec![ViolationKind::UnknownDomain]);
    assert_eq!(violations[0].related, vec!["aerodin".to_string(), "euromotion".to_string()]);
}

#[test]
fn test_unknown_fields_fail_to_parse() {
    let mut value = hiring("hiring_target");
    value["stocks"][0]["colour"] = json!("red");
    assert!(ModelDocument::from_value(value).is_err());
}

#[test]
fn test_document_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    let model = validate("aerodin", &doc(hiring("hiring_target"))).unwrap();
    model.document().save(&path).unwrap();

    let loaded = ModelDocument::load(&path).unwrap();
    assert_eq!(&loaded, model.document());
    assert!(validate("aerodin", &loaded).is_ok());
}

#[test]
fn test_violations_serialize_snake_case() {
    let violations = validate("aerodin", &doc(hiring("ghost"))).unwrap_err();
    let json = serde_json::to_value(&violations).unwrap();
    assert_eq!(json[0]["kind"], "unknown_reference");
    assert_eq!(json[0]["offending_id"], "hiring_rate");
}

//! Integration tests for the catalogue-to-artifacts pipeline.
//!
//! These exercise the whole flow the instrgen binary drives: register a
//! catalogue, validate it, emit the four artifacts, and check the
//! cross-artifact guarantees the downstream compiler relies on.

use instrgen::schema::{Catalogue, Entry, MemberKind, OperandKind, OperandRole};
use instrgen::{emit, validate, SchemaError};

/// Helper building a small but representative catalogue.
fn sample_catalogue() -> Catalogue {
    let mut bb = Catalogue::new();
    bb.declare_value("WeightVar").unwrap();
    bb.new_instr("AllocActivation")
        .add_member(MemberKind::TypeRef, "Ty")
        .set_type("Ty")
        .register()
        .unwrap();
    bb.new_instr("Copy")
        .add_operand("Dest", OperandKind::Out)
        .add_operand("Src", OperandKind::In)
        .set_type("Src")
        .register()
        .unwrap();
    bb.new_instr("ElementAdd")
        .add_operand("Dest", OperandKind::Out)
        .add_operand("LHS", OperandKind::In)
        .add_operand("RHS", OperandKind::In)
        .inplace_operands(&["Dest", "LHS", "RHS"])
        .add_gradient_instr(&[], &["Dest", "LHS", "RHS"])
        .register()
        .unwrap();
    bb.new_instr("Relu")
        .add_operand("Dest", OperandKind::Out)
        .add_operand("Src", OperandKind::In)
        .inplace_operands(&["Dest", "Src"])
        .add_gradient_instr(&["Dest"], &["Dest", "Src"])
        .register()
        .unwrap();
    bb
}

/// Position of each instruction's fragment within one artifact.
fn positions(haystack: &str, needles: &[String]) -> Vec<usize> {
    needles
        .iter()
        .map(|needle| {
            haystack
                .find(needle)
                .unwrap_or_else(|| panic!("artifact missing fragment: '{needle}'"))
        })
        .collect()
}

fn assert_sorted(positions: &[usize], artifact: &str) {
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "{artifact} emits entities out of catalogue order: {positions:?}"
    );
}

#[test]
fn emission_is_deterministic() {
    let catalogue = sample_catalogue();
    let validated = validate::validate(&catalogue).unwrap();
    let first = emit::emit(&validated);
    let second = emit::emit(&validated);
    assert_eq!(first, second);
}

#[test]
fn all_four_streams_agree_on_entity_set_and_order() {
    let catalogue = sample_catalogue();
    let instr_names: Vec<String> = catalogue.instrs().map(|i| i.name.clone()).collect();
    assert_eq!(
        instr_names,
        [
            "AllocActivation",
            "Copy",
            "ElementAdd",
            "ElementAddGrad",
            "Relu",
            "ReluGrad",
        ]
    );

    let artifacts = emit::emit(&validate::validate(&catalogue).unwrap());

    let decl_needles: Vec<String> = instr_names
        .iter()
        .map(|n| format!("pub struct {n}Inst"))
        .collect();
    let impl_needles: Vec<String> = instr_names
        .iter()
        .map(|n| format!("impl {n}Inst"))
        .collect();
    let def_needles: Vec<String> = instr_names
        .iter()
        .map(|n| format!("def_instr!({n}Inst, {n});"))
        .collect();
    let builder_needles: Vec<String> = [
        "pub fn create_alloc_activation(",
        "pub fn create_copy(",
        "pub fn create_element_add(",
        "pub fn create_element_add_grad(",
        "pub fn create_relu(",
        "pub fn create_relu_grad(",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    for (artifact, needles) in [
        (&artifacts.decls, &decl_needles),
        (&artifacts.impls, &impl_needles),
        (&artifacts.defs, &def_needles),
        (&artifacts.builder, &builder_needles),
    ] {
        // Each instruction appears exactly once, in catalogue order.
        for needle in needles {
            assert_eq!(artifact.matches(needle.as_str()).count(), 1);
        }
        assert_sorted(&positions(artifact, needles), "artifact");
    }
}

#[test]
fn element_add_scenario_derives_the_expected_gradient() {
    let catalogue = sample_catalogue();
    let names: Vec<&str> = catalogue.entries().iter().map(Entry::name).collect();
    let add = names.iter().position(|n| *n == "ElementAdd").unwrap();
    assert_eq!(names[add + 1], "ElementAddGrad");

    let grad = catalogue.instr("ElementAddGrad").unwrap();
    assert!(grad.auto_generated);
    assert_eq!(grad.operands.len(), 3);
    assert!(grad
        .operands
        .iter()
        .all(|op| op.kind == OperandKind::InOut && op.role == OperandRole::Gradient));
    assert_eq!(
        grad.operands.iter().map(|op| op.name.as_str()).collect::<Vec<_>>(),
        ["Dest", "LHS", "RHS"]
    );
    assert!(!grad
        .operands
        .iter()
        .any(|op| op.kind == OperandKind::In));
}

#[test]
fn empty_descriptor_fails_validation_not_emission() {
    let mut bb = Catalogue::new();
    bb.new_instr("Nop").register().unwrap();
    let err = validate::validate(&bb).unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnresolvedResultType {
            instr: "Nop".to_string(),
        }
    );
}

#[test]
fn values_never_reach_the_builder_stream() {
    let catalogue = sample_catalogue();
    let artifacts = emit::emit(&validate::validate(&catalogue).unwrap());
    assert!(artifacts.decls.contains("pub struct WeightVar;"));
    assert!(artifacts.impls.contains("impl WeightVar {}"));
    assert!(artifacts.defs.contains("def_value!(WeightVar);"));
    assert!(!artifacts.builder.contains("WeightVar"));
}

#[test]
fn factory_parameters_follow_declaration_order() {
    let catalogue = sample_catalogue();
    let artifacts = emit::emit(&validate::validate(&catalogue).unwrap());
    assert!(artifacts.builder.contains(
        "pub fn create_element_add(&mut self, dest: Value, lhs: Value, rhs: Value) -> InstrHandle {"
    ));
    // Gradient accumulators keep the base name under a _grad suffix.
    assert!(artifacts.builder.contains(
        "pub fn create_relu_grad(&mut self, dest: Value, dest_grad: Value, src_grad: Value) -> InstrHandle {"
    ));
}

#[test]
fn duplicate_catalogue_names_fail_validation() {
    // new_instr rejects duplicates at registration; validation re-checks
    // the assembled catalogue as its first rule.
    let mut bb = Catalogue::new();
    bb.declare_value("WeightVar").unwrap();
    assert_eq!(
        bb.declare_value("WeightVar").unwrap_err(),
        SchemaError::DuplicateName {
            name: "WeightVar".to_string(),
            owner: "catalogue".to_string(),
        }
    );
}

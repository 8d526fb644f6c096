// This module runs the whole-catalogue validation pass that gates emission. It checks,
// in a fixed order and short-circuiting on the first failure: global name uniqueness,
// per-descriptor operand/member name uniqueness, in-place group resolution and
// direction compatibility, gradient-operand resolution (a redundant safety net behind
// derivation's own checks), and result-type resolvability. Validation is pure: it never
// mutates the catalogue. On success it hands back Validated, a read-only borrow wrapper
// that is the only input the emission engine accepts, so the "frozen after validation"
// phase boundary is enforced by the type system rather than by convention.

//! Catalogue validation.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{Catalogue, Entry, InstrDescriptor, OperandRole};

/// A validated, frozen view of a catalogue.
///
/// Only obtainable through [`validate`]; emission takes this type, so an
/// unvalidated catalogue cannot reach the output stage.
#[derive(Debug, Clone, Copy)]
pub struct Validated<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> Validated<'a> {
    pub fn catalogue(&self) -> &'a Catalogue {
        self.catalogue
    }

    pub fn entries(&self) -> &'a [Entry] {
        self.catalogue.entries()
    }
}

/// Validate a fully assembled catalogue.
pub fn validate(catalogue: &Catalogue) -> SchemaResult<Validated<'_>> {
    // Rule order is fixed: each rule runs over the whole catalogue
    // before the next one starts.
    check_global_names(catalogue)?;
    for instr in catalogue.instrs() {
        check_local_names(instr)?;
    }
    for instr in catalogue.instrs() {
        check_in_place(instr)?;
    }
    for instr in catalogue.instrs() {
        check_gradient(instr)?;
    }
    for instr in catalogue.instrs() {
        // Resolvability only; the resolved value is recomputed at
        // emission time.
        instr.resolve_result()?;
    }
    log::debug!("validated catalogue ({} entries)", catalogue.entries().len());
    Ok(Validated { catalogue })
}

fn check_global_names(catalogue: &Catalogue) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for entry in catalogue.entries() {
        if !seen.insert(entry.name()) {
            return Err(SchemaError::DuplicateName {
                name: entry.name().to_string(),
                owner: "catalogue".to_string(),
            });
        }
    }
    Ok(())
}

fn check_local_names(instr: &InstrDescriptor) -> SchemaResult<()> {
    let mut seen: HashSet<(&str, OperandRole)> = HashSet::new();
    for operand in &instr.operands {
        if !seen.insert((operand.name.as_str(), operand.role)) {
            return Err(SchemaError::DuplicateName {
                name: operand.name.clone(),
                owner: instr.name.clone(),
            });
        }
    }
    for member in &instr.members {
        let collides = instr.operand(&member.name).is_some()
            || !seen.insert((member.name.as_str(), OperandRole::Value));
        if collides {
            return Err(SchemaError::DuplicateName {
                name: member.name.clone(),
                owner: instr.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_in_place(instr: &InstrDescriptor) -> SchemaResult<()> {
    for group in &instr.in_place {
        if group.operands.len() < 2 {
            return Err(SchemaError::InPlaceTooSmall {
                instr: instr.name.clone(),
            });
        }
        for name in &group.operands {
            if instr.operand(name).is_none() {
                return Err(SchemaError::InPlaceUnresolved {
                    instr: instr.name.clone(),
                    name: name.clone(),
                });
            }
        }
        let writable = group.operands.iter().any(|name| {
            instr
                .operand(name)
                .map(|op| op.kind.is_writable())
                .unwrap_or(false)
        });
        if !writable {
            return Err(SchemaError::InPlaceReadOnly {
                instr: instr.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_gradient(instr: &InstrDescriptor) -> SchemaResult<()> {
    let Some(spec) = &instr.gradient else {
        return Ok(());
    };
    if spec.updates.is_empty() {
        return Err(SchemaError::EmptyGradientTarget {
            instr: instr.name.clone(),
        });
    }
    for name in spec.reads.iter().chain(&spec.updates) {
        if instr.operand(name).is_none() {
            return Err(SchemaError::InvalidGradientOperand {
                instr: instr.name.clone(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}

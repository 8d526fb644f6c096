// This module synthesizes the backward companion of a forward instruction descriptor
// from its gradient specification. Derivation is structural, not user-supplied: the
// forward descriptor says which operands the backward computation reads and which
// gradient accumulators it updates, and everything else about the derived descriptor
// follows from convention. The derived instruction is named "<forward>Grad", reads the
// named forward values through In operands, accumulates through InOut operands that
// keep the base operand name under the Gradient role, inherits no members, no in-place
// groups, and no result-type expression, and resolves to a void result. Derivation
// runs synchronously at registration time and the result is appended to the catalogue
// immediately after its forward sibling.

//! Gradient derivation for backward-pass instructions.

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{GradientSpec, InstrDescriptor, Operand, OperandKind};

/// Suffix appended to a forward instruction's name for its derived
/// gradient sibling.
pub const GRAD_SUFFIX: &str = "Grad";

/// Derive the backward instruction descriptor for `forward`.
///
/// Fails with [`SchemaError::EmptyGradientTarget`] when the spec updates
/// nothing and with [`SchemaError::InvalidGradientOperand`] when a spec
/// name does not resolve to an operand of the forward descriptor
/// (member names are not operands).
pub fn derive(forward: &InstrDescriptor, spec: &GradientSpec) -> SchemaResult<InstrDescriptor> {
    if spec.updates.is_empty() {
        return Err(SchemaError::EmptyGradientTarget {
            instr: forward.name.clone(),
        });
    }

    let mut operands = Vec::with_capacity(spec.reads.len() + spec.updates.len());
    for name in &spec.reads {
        resolve_operand(forward, name)?;
        operands.push(Operand::new(name, OperandKind::In));
    }
    for name in &spec.updates {
        resolve_operand(forward, name)?;
        operands.push(Operand::gradient(name, OperandKind::InOut));
    }

    let name = format!("{}{}", forward.name, GRAD_SUFFIX);
    log::debug!(
        "derived '{}' from '{}' ({} reads, {} updates)",
        name,
        forward.name,
        spec.reads.len(),
        spec.updates.len()
    );

    Ok(InstrDescriptor {
        name,
        operands,
        members: Vec::new(),
        result: None,
        in_place: Vec::new(),
        extra_methods: Vec::new(),
        gradient: None,
        auto_generated: true,
    })
}

fn resolve_operand(forward: &InstrDescriptor, name: &str) -> SchemaResult<()> {
    if forward.operand(name).is_none() {
        return Err(SchemaError::InvalidGradientOperand {
            instr: forward.name.clone(),
            name: name.to_string(),
        });
    }
    Ok(())
}

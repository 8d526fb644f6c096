//! Instruction operands and their access directions.

use std::fmt;

/// Access direction of an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// Read-only input.
    In,
    /// Write-only output.
    Out,
    /// Read and written in place.
    InOut,
}

impl OperandKind {
    /// Whether the operand's storage may be written.
    pub fn is_writable(&self) -> bool {
        matches!(self, OperandKind::Out | OperandKind::InOut)
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandKind::In => "In",
            OperandKind::Out => "Out",
            OperandKind::InOut => "InOut",
        };
        f.write_str(name)
    }
}

/// Role an operand plays on its instruction.
///
/// Hand-written descriptors only ever declare `Value` operands. Gradient
/// derivation synthesizes `Gradient`-role operands that keep the base
/// name of the forward operand they accumulate for; the role, not a
/// renamed identifier, is what tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandRole {
    /// The operand carries the instruction's forward value.
    Value,
    /// The operand is a gradient accumulator for the named value.
    Gradient,
}

/// A named instruction input/output with a direction and a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub name: String,
    pub kind: OperandKind,
    pub role: OperandRole,
}

impl Operand {
    /// A plain value operand, the only kind registration can declare.
    pub fn new(name: &str, kind: OperandKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            role: OperandRole::Value,
        }
    }

    /// A gradient-accumulator operand, used by gradient derivation.
    pub fn gradient(name: &str, kind: OperandKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            role: OperandRole::Gradient,
        }
    }
}

//! Typed configuration members attached to instruction descriptors.
//!
//! A member is a named scalar or vector field that configures an
//! instruction (kernel size, padding, a shuffle mask) as opposed to a
//! runtime operand. The set of member kinds is closed: adding a kind is
//! a schema change, not something a catalogue can do at registration
//! time.

use std::fmt;

/// The closed set of member kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// An element-count or dimension value.
    SizeT,
    /// A floating-point scalar.
    Float,
    /// An unsigned integer scalar.
    Unsigned,
    /// A reference to a type object.
    TypeRef,
    /// A vector of element counts.
    VectorSizeT,
    /// A vector of unsigned integers.
    VectorUnsigned,
}

impl MemberKind {
    /// The Rust spelling of this kind in the generated artifacts.
    pub fn rust_type(&self) -> &'static str {
        match self {
            MemberKind::SizeT => "usize",
            MemberKind::Float => "f32",
            MemberKind::Unsigned => "u32",
            MemberKind::TypeRef => "Type",
            MemberKind::VectorSizeT => "Vec<usize>",
            MemberKind::VectorUnsigned => "Vec<u32>",
        }
    }

    /// Whether generated accessors return this kind by reference.
    ///
    /// Scalars are returned by value; type references and vectors borrow
    /// the stored field.
    pub fn returns_by_ref(&self) -> bool {
        matches!(
            self,
            MemberKind::TypeRef | MemberKind::VectorSizeT | MemberKind::VectorUnsigned
        )
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberKind::SizeT => "SizeT",
            MemberKind::Float => "Float",
            MemberKind::Unsigned => "Unsigned",
            MemberKind::TypeRef => "TypeRef",
            MemberKind::VectorSizeT => "VectorSizeT",
            MemberKind::VectorUnsigned => "VectorUnsigned",
        };
        f.write_str(name)
    }
}

/// A named, typed configuration field on an instruction descriptor.
///
/// Members are created when a descriptor registers them and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
}

impl Member {
    pub fn new(kind: MemberKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

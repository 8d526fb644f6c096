//! instrgen - Schema-driven IR source generation.
//!
//! instrgen consumes a declarative catalogue of instruction descriptors
//! and emits four synchronized source artifacts from that single source
//! of truth: type declarations, implementations, an enumeration listing,
//! and a fluent builder API.
//!
//! # Primary Usage
//!
//! ```
//! use instrgen::schema::{Catalogue, OperandKind};
//! use instrgen::{emit, validate};
//!
//! let mut catalogue = Catalogue::new();
//! catalogue.declare_value("WeightVar")?;
//! catalogue
//!     .new_instr("Copy")
//!     .add_operand("Dest", OperandKind::Out)
//!     .add_operand("Src", OperandKind::In)
//!     .set_type("Src")
//!     .register()?;
//!
//! let validated = validate::validate(&catalogue)?;
//! let artifacts = emit::emit(&validated);
//! assert!(artifacts.defs.contains("def_instr!(CopyInst, Copy);"));
//! # Ok::<(), instrgen::SchemaError>(())
//! ```
//!
//! # Architecture
//!
//! - [`schema`] - Instruction descriptors, members, operands, catalogue
//! - [`gradient`] - Derivation of backward-pass descriptors
//! - [`validate`] - Whole-catalogue invariant checking
//! - [`emit`] - Single-pass rendering of the four artifacts
//! - [`error`] - Error taxonomy shared by all stages

pub mod emit;
pub mod error;
pub mod gradient;
pub mod schema;
pub mod validate;

// Re-export common types.
pub use emit::Artifacts;
pub use error::{SchemaError, SchemaResult};
pub use schema::{
    Catalogue, Entry, GradientSpec, InPlaceGroup, InstrBuilder, InstrDescriptor, Member,
    MemberKind, Operand, OperandKind, OperandRole, ResolvedResult, ResultType, ValueDecl,
};
pub use validate::Validated;

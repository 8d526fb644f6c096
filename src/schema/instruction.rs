// This module defines the instruction descriptor, the aggregate entity of the schema:
// an ordered operand list, an ordered member list, optional in-place aliasing groups,
// an optional explicit result-type expression, opaque extra-method fragments, and an
// optional gradient specification. Descriptors are built incrementally through the
// chainable InstrBuilder, which is scoped strictly to construction time: each call
// checks its arguments against what is already registered (duplicate names, unknown
// references) and records the first failure, and register() either surfaces that
// failure or freezes the descriptor into an immutable value, runs gradient derivation,
// and appends the results to the catalogue. After registration a descriptor is never
// mutated again.

//! Instruction descriptors and their construction-time builder.

use crate::error::{SchemaError, SchemaResult};
use crate::gradient;
use crate::schema::catalogue::Catalogue;
use crate::schema::member::{Member, MemberKind};
use crate::schema::operand::{Operand, OperandKind, OperandRole};

/// Which operands a derived gradient instruction reads and updates.
///
/// `reads` names forward operands whose values the backward computation
/// needs; `updates` names forward operands whose gradient accumulators
/// the backward computation writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientSpec {
    pub reads: Vec<String>,
    pub updates: Vec<String>,
}

/// A set of operand names permitted to alias the same storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InPlaceGroup {
    pub operands: Vec<String>,
}

/// An explicit result-type expression, referencing a registered entity
/// by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultType {
    /// The type stored in a member field (typically a `TypeRef`).
    Member(String),
    /// The type carried by an operand's value.
    Operand(String),
}

/// A result type after resolution against the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedResult {
    Member(String),
    Operand(String),
    /// The instruction describes an effect, not a value. Only derived
    /// gradient instructions resolve to this.
    Void,
}

/// Declarative specification of one IR instruction's shape.
///
/// Immutable once registered into a [`Catalogue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrDescriptor {
    pub name: String,
    pub operands: Vec<Operand>,
    pub members: Vec<Member>,
    pub result: Option<ResultType>,
    pub in_place: Vec<InPlaceGroup>,
    pub extra_methods: Vec<String>,
    pub gradient: Option<GradientSpec>,
    /// True only for descriptors produced by gradient derivation.
    pub auto_generated: bool,
}

impl InstrDescriptor {
    /// Look up a value-role operand by name.
    pub fn operand(&self, name: &str) -> Option<&Operand> {
        self.operands
            .iter()
            .find(|op| op.role == OperandRole::Value && op.name == name)
    }

    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Resolve the instruction's result type.
    ///
    /// Derived gradient instructions describe an accumulation effect and
    /// resolve to [`ResolvedResult::Void`]. Otherwise the explicit
    /// expression wins, falling back to the first declared operand as
    /// the canonical result. An explicit expression whose referent is
    /// not declared on this descriptor fails with
    /// [`SchemaError::UnknownReference`]; the builder rejects those at
    /// call time, and validation re-checks here.
    pub fn resolve_result(&self) -> SchemaResult<ResolvedResult> {
        if self.auto_generated {
            return Ok(ResolvedResult::Void);
        }
        if let Some(result) = &self.result {
            let (name, declared) = match result {
                ResultType::Member(name) => (name, self.member(name).is_some()),
                ResultType::Operand(name) => (name, self.operand(name).is_some()),
            };
            if !declared {
                return Err(SchemaError::UnknownReference {
                    instr: self.name.clone(),
                    name: name.clone(),
                });
            }
            return Ok(match result {
                ResultType::Member(name) => ResolvedResult::Member(name.clone()),
                ResultType::Operand(name) => ResolvedResult::Operand(name.clone()),
            });
        }
        match self.operands.first() {
            Some(op) => Ok(ResolvedResult::Operand(op.name.clone())),
            None => Err(SchemaError::UnresolvedResultType {
                instr: self.name.clone(),
            }),
        }
    }
}

/// Builder for one instruction descriptor, created by
/// [`Catalogue::new_instr`].
///
/// Calls may be chained in any order except that `set_type` and
/// `inplace_operands` must follow the registration of the names they
/// reference. The first failing call poisons the builder; later calls
/// are no-ops and [`register`](Self::register) reports the recorded
/// error.
pub struct InstrBuilder<'a> {
    catalogue: &'a mut Catalogue,
    descriptor: InstrDescriptor,
    error: Option<SchemaError>,
}

impl<'a> InstrBuilder<'a> {
    pub(crate) fn new(catalogue: &'a mut Catalogue, name: &str) -> Self {
        log::debug!("new instruction descriptor '{name}'");
        Self {
            catalogue,
            descriptor: InstrDescriptor {
                name: name.to_string(),
                operands: Vec::new(),
                members: Vec::new(),
                result: None,
                in_place: Vec::new(),
                extra_methods: Vec::new(),
                gradient: None,
                auto_generated: false,
            },
            error: None,
        }
    }

    fn poison(&mut self, error: SchemaError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn name_in_use(&self, name: &str) -> bool {
        self.descriptor.operand(name).is_some() || self.descriptor.member(name).is_some()
    }

    /// Add a named operand with an access direction.
    pub fn add_operand(mut self, name: &str, kind: OperandKind) -> Self {
        if self.error.is_some() {
            return self;
        }
        if self.name_in_use(name) {
            let owner = self.descriptor.name.clone();
            self.poison(SchemaError::DuplicateName {
                name: name.to_string(),
                owner,
            });
            return self;
        }
        self.descriptor.operands.push(Operand::new(name, kind));
        self
    }

    /// Add a typed configuration member.
    pub fn add_member(mut self, kind: MemberKind, name: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if self.name_in_use(name) {
            let owner = self.descriptor.name.clone();
            self.poison(SchemaError::DuplicateName {
                name: name.to_string(),
                owner,
            });
            return self;
        }
        self.descriptor.members.push(Member::new(kind, name));
        self
    }

    /// Set the result type to the type of a previously registered member
    /// or operand.
    pub fn set_type(mut self, name: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let result = if self.descriptor.member(name).is_some() {
            ResultType::Member(name.to_string())
        } else if self.descriptor.operand(name).is_some() {
            ResultType::Operand(name.to_string())
        } else {
            let instr = self.descriptor.name.clone();
            self.poison(SchemaError::UnknownReference {
                instr,
                name: name.to_string(),
            });
            return self;
        };
        self.descriptor.result = Some(result);
        self
    }

    /// Declare a group of previously registered operands as mutually
    /// aliasable.
    pub fn inplace_operands(mut self, names: &[&str]) -> Self {
        if self.error.is_some() {
            return self;
        }
        for name in names {
            if self.descriptor.operand(name).is_none() {
                let instr = self.descriptor.name.clone();
                self.poison(SchemaError::InPlaceUnresolved {
                    instr,
                    name: name.to_string(),
                });
                return self;
            }
        }
        self.descriptor.in_place.push(InPlaceGroup {
            operands: names.iter().map(|n| n.to_string()).collect(),
        });
        self
    }

    /// Attach a gradient specification, triggering derivation of a
    /// companion backward instruction at registration time.
    pub fn add_gradient_instr(mut self, reads: &[&str], updates: &[&str]) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.descriptor.gradient = Some(GradientSpec {
            reads: reads.iter().map(|n| n.to_string()).collect(),
            updates: updates.iter().map(|n| n.to_string()).collect(),
        });
        self
    }

    /// Attach an opaque method fragment, emitted verbatim into the
    /// implementation artifact. The engine never parses the fragment,
    /// only rejects empty ones.
    pub fn add_extra_method(mut self, fragment: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if fragment.trim().is_empty() {
            let instr = self.descriptor.name.clone();
            self.poison(SchemaError::EmptyExtraMethod { instr });
            return self;
        }
        self.descriptor.extra_methods.push(fragment.to_string());
        self
    }

    /// Finalize the descriptor and append it to the catalogue.
    ///
    /// Runs gradient derivation if a specification was attached; the
    /// derived descriptor lands immediately after this one in the
    /// catalogue order.
    pub fn register(self) -> SchemaResult<()> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let descriptor = self.descriptor;
        let derived = match &descriptor.gradient {
            Some(spec) => Some(gradient::derive(&descriptor, spec)?),
            None => None,
        };
        self.catalogue.push_instrs(descriptor, derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_operand_name_is_rejected() {
        let mut catalogue = Catalogue::new();
        let result = catalogue
            .new_instr("Copy")
            .add_operand("Dest", OperandKind::Out)
            .add_operand("Dest", OperandKind::In)
            .register();
        assert_eq!(
            result,
            Err(SchemaError::DuplicateName {
                name: "Dest".to_string(),
                owner: "Copy".to_string(),
            })
        );
        assert!(catalogue.entries().is_empty());
    }

    #[test]
    fn member_and_operand_share_a_namespace() {
        let mut catalogue = Catalogue::new();
        let result = catalogue
            .new_instr("Splat")
            .add_operand("Value", OperandKind::Out)
            .add_member(MemberKind::Float, "Value")
            .register();
        assert!(matches!(result, Err(SchemaError::DuplicateName { .. })));
    }

    #[test]
    fn set_type_requires_a_prior_registration() {
        let mut catalogue = Catalogue::new();
        let result = catalogue
            .new_instr("TensorView")
            .set_type("Ty")
            .add_member(MemberKind::TypeRef, "Ty")
            .register();
        assert_eq!(
            result,
            Err(SchemaError::UnknownReference {
                instr: "TensorView".to_string(),
                name: "Ty".to_string(),
            })
        );
    }

    #[test]
    fn set_type_prefers_members_over_operands() {
        let mut catalogue = Catalogue::new();
        catalogue
            .new_instr("AllocActivation")
            .add_member(MemberKind::TypeRef, "Ty")
            .set_type("Ty")
            .register()
            .unwrap();
        let instr = catalogue.instr("AllocActivation").unwrap();
        assert_eq!(instr.result, Some(ResultType::Member("Ty".to_string())));
    }

    #[test]
    fn inplace_group_must_follow_its_referents() {
        let mut catalogue = Catalogue::new();
        let result = catalogue
            .new_instr("Relu")
            .add_operand("Dest", OperandKind::Out)
            .inplace_operands(&["Dest", "Src"])
            .add_operand("Src", OperandKind::In)
            .register();
        assert_eq!(
            result,
            Err(SchemaError::InPlaceUnresolved {
                instr: "Relu".to_string(),
                name: "Src".to_string(),
            })
        );
    }

    #[test]
    fn empty_extra_method_is_rejected() {
        let mut catalogue = Catalogue::new();
        let result = catalogue
            .new_instr("DebugPrint")
            .add_operand("Src", OperandKind::In)
            .add_extra_method("   ")
            .register();
        assert_eq!(
            result,
            Err(SchemaError::EmptyExtraMethod {
                instr: "DebugPrint".to_string(),
            })
        );
    }

    #[test]
    fn poisoned_builder_reports_the_first_error_only() {
        let mut catalogue = Catalogue::new();
        let result = catalogue
            .new_instr("Broken")
            .set_type("Missing")
            .add_operand("Dest", OperandKind::Out)
            .add_operand("Dest", OperandKind::Out)
            .register();
        assert_eq!(
            result,
            Err(SchemaError::UnknownReference {
                instr: "Broken".to_string(),
                name: "Missing".to_string(),
            })
        );
    }

    #[test]
    fn result_falls_back_to_the_first_operand() {
        let mut catalogue = Catalogue::new();
        catalogue
            .new_instr("Copy")
            .add_operand("Dest", OperandKind::Out)
            .add_operand("Src", OperandKind::In)
            .register()
            .unwrap();
        let instr = catalogue.instr("Copy").unwrap();
        assert_eq!(
            instr.resolve_result(),
            Ok(ResolvedResult::Operand("Dest".to_string()))
        );
    }

    #[test]
    fn no_operands_and_no_type_cannot_resolve() {
        let descriptor = InstrDescriptor {
            name: "Empty".to_string(),
            operands: Vec::new(),
            members: Vec::new(),
            result: None,
            in_place: Vec::new(),
            extra_methods: Vec::new(),
            gradient: None,
            auto_generated: false,
        };
        assert_eq!(
            descriptor.resolve_result(),
            Err(SchemaError::UnresolvedResultType {
                instr: "Empty".to_string(),
            })
        );
    }
}

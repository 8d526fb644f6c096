// This module defines the catalogue, the ordered aggregate of everything one generation
// run declares: standalone value declarations and instruction descriptors, kept in
// registration order. The catalogue is the single explicitly owned piece of state that
// the driver threads through registration, validation, and emission. It enforces global
// name uniqueness at registration time (derived gradient descriptors included, so two
// instructions can never silently share a "...Grad" name) and becomes write-once,
// read-many after validation: the emission engine only ever borrows it.

//! The ordered catalogue of values and instruction descriptors.

use crate::error::{SchemaError, SchemaResult};
use crate::schema::instruction::{InstrBuilder, InstrDescriptor};

/// A named storage declaration that participates in operand references
/// but is not an instruction (e.g. a weight variable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDecl {
    pub name: String,
}

/// One catalogue entry, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Value(ValueDecl),
    Instr(InstrDescriptor),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::Value(v) => &v.name,
            Entry::Instr(i) => &i.name,
        }
    }
}

/// The complete, ordered collection of declared values and instructions
/// for one generation run.
#[derive(Debug, Default)]
pub struct Catalogue {
    entries: Vec<Entry>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a standalone value kind.
    pub fn declare_value(&mut self, name: &str) -> SchemaResult<()> {
        self.check_unique(name)?;
        log::debug!("declare value '{name}'");
        self.entries.push(Entry::Value(ValueDecl {
            name: name.to_string(),
        }));
        Ok(())
    }

    /// Start building a new instruction descriptor.
    pub fn new_instr(&mut self, name: &str) -> InstrBuilder<'_> {
        InstrBuilder::new(self, name)
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate the instruction descriptors in registration order.
    pub fn instrs(&self) -> impl Iterator<Item = &InstrDescriptor> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Instr(instr) => Some(instr),
            Entry::Value(_) => None,
        })
    }

    /// Look up an instruction descriptor by name.
    pub fn instr(&self, name: &str) -> Option<&InstrDescriptor> {
        self.instrs().find(|instr| instr.name == name)
    }

    fn check_unique(&self, name: &str) -> SchemaResult<()> {
        if self.entries.iter().any(|entry| entry.name() == name) {
            return Err(SchemaError::DuplicateName {
                name: name.to_string(),
                owner: "catalogue".to_string(),
            });
        }
        Ok(())
    }

    /// Append a finalized descriptor and, atomically with it, its
    /// derived gradient sibling. Nothing is appended if either name
    /// collides.
    pub(crate) fn push_instrs(
        &mut self,
        descriptor: InstrDescriptor,
        derived: Option<InstrDescriptor>,
    ) -> SchemaResult<()> {
        self.check_unique(&descriptor.name)?;
        if let Some(grad) = &derived {
            if grad.name == descriptor.name {
                return Err(SchemaError::DuplicateName {
                    name: grad.name.clone(),
                    owner: "catalogue".to_string(),
                });
            }
            self.check_unique(&grad.name)?;
        }
        self.push_one(descriptor);
        if let Some(grad) = derived {
            self.push_one(grad);
        }
        Ok(())
    }

    fn push_one(&mut self, descriptor: InstrDescriptor) {
        log::debug!(
            "register instruction '{}' ({} operands, {} members{})",
            descriptor.name,
            descriptor.operands.len(),
            descriptor.members.len(),
            if descriptor.auto_generated {
                ", derived"
            } else {
                ""
            }
        );
        self.entries.push(Entry::Instr(descriptor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::operand::OperandKind;

    #[test]
    fn registration_order_is_preserved() {
        let mut catalogue = Catalogue::new();
        catalogue.declare_value("WeightVar").unwrap();
        catalogue
            .new_instr("Copy")
            .add_operand("Dest", OperandKind::Out)
            .add_operand("Src", OperandKind::In)
            .register()
            .unwrap();
        let names: Vec<&str> = catalogue.entries().iter().map(Entry::name).collect();
        assert_eq!(names, ["WeightVar", "Copy"]);
    }

    #[test]
    fn value_and_instruction_names_collide_globally() {
        let mut catalogue = Catalogue::new();
        catalogue.declare_value("Copy").unwrap();
        let result = catalogue
            .new_instr("Copy")
            .add_operand("Dest", OperandKind::Out)
            .register();
        assert!(matches!(result, Err(SchemaError::DuplicateName { .. })));
    }

    #[test]
    fn derived_gradient_name_collision_is_an_error() {
        let mut catalogue = Catalogue::new();
        catalogue
            .new_instr("ReluGrad")
            .add_operand("Dest", OperandKind::Out)
            .register()
            .unwrap();
        let result = catalogue
            .new_instr("Relu")
            .add_operand("Dest", OperandKind::Out)
            .add_operand("Src", OperandKind::In)
            .add_gradient_instr(&["Dest"], &["Dest", "Src"])
            .register();
        assert_eq!(
            result,
            Err(SchemaError::DuplicateName {
                name: "ReluGrad".to_string(),
                owner: "catalogue".to_string(),
            })
        );
        // The forward descriptor must not be left half-registered.
        assert!(catalogue.instr("Relu").is_none());
    }
}

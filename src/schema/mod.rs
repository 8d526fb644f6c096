// This module serves as the hub for the instruction schema model, the single source
// of truth every generated artifact is derived from. It organizes the model leaf-first:
// member kinds and members, operands with directions and roles, instruction descriptors
// with their construction-time builder, and the ordered catalogue that owns everything
// for one generation run. The re-exports below form the registration API the driver
// consumes: declare_value and new_instr on Catalogue, and the chainable add_operand /
// add_member / set_type / inplace_operands / add_gradient_instr / add_extra_method
// calls on InstrBuilder.

//! Schema model for instruction descriptors.

pub mod catalogue;
pub mod instruction;
pub mod member;
pub mod operand;

pub use catalogue::{Catalogue, Entry, ValueDecl};
pub use instruction::{
    GradientSpec, InPlaceGroup, InstrBuilder, InstrDescriptor, ResolvedResult, ResultType,
};
pub use member::{Member, MemberKind};
pub use operand::{Operand, OperandKind, OperandRole};

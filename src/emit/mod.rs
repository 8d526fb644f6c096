// This module renders a validated catalogue into the four generated artifacts: type
// declarations, implementations, the enumeration listing, and the fluent builder API.
// Emission is a single deterministic forward pass: each catalogue entry is visited
// exactly once and appends its fragment to every stream it participates in, so the
// four artifacts can never diverge in entity order or count. Instruction descriptors
// produce a struct declaration (operands with direction, members with kind), an
// accessor impl carrying any verbatim extra-method fragments, one enumeration line,
// and one factory taking operands then members in declared order. Value declarations
// produce the lighter declaration/implementation/enumeration triad and no factory.
// The pass is pure: it borrows the catalogue read-only and builds strings, leaving
// file handling to the driver, which writes nothing unless the whole pass succeeded.

//! Emission of the four generated artifacts.

pub mod formatter;

use crate::schema::{Entry, InstrDescriptor, Operand, OperandRole, ResolvedResult, ValueDecl};
use crate::validate::Validated;
use formatter::Formatter;

/// Leading banner on every generated artifact.
const BANNER: &str = "// Generated by instrgen. Do not edit.";

/// The four generated artifacts of one emission pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Type declarations for every value and instruction.
    pub decls: String,
    /// Accessor implementations and extra-method fragments.
    pub impls: String,
    /// The enumeration listing tagging runtime kinds.
    pub defs: String,
    /// Factory functions of the fluent builder API.
    pub builder: String,
}

struct Streams {
    decls: Formatter,
    impls: Formatter,
    defs: Formatter,
    builder: Formatter,
}

/// Render all four artifacts from a validated catalogue.
///
/// Deterministic: the same catalogue always renders to byte-identical
/// output.
pub fn emit(validated: &Validated<'_>) -> Artifacts {
    let mut streams = Streams {
        decls: Formatter::new(),
        impls: Formatter::new(),
        defs: Formatter::new(),
        builder: Formatter::new(),
    };
    streams.decls.line(BANNER);
    streams.impls.line(BANNER);
    streams.defs.line(BANNER);
    streams.builder.line(BANNER);
    streams.builder.blank();
    streams.builder.line("impl IrBuilder {");
    streams.builder.indent_push();

    for entry in validated.entries() {
        log::trace!("emitting '{}'", entry.name());
        match entry {
            Entry::Value(value) => emit_value(value, &mut streams),
            Entry::Instr(instr) => emit_instr(instr, &mut streams),
        }
    }

    streams.builder.indent_pop();
    streams.builder.line("}");
    Artifacts {
        decls: streams.decls.finish(),
        impls: streams.impls.finish(),
        defs: streams.defs.finish(),
        builder: streams.builder.finish(),
    }
}

fn emit_value(value: &ValueDecl, streams: &mut Streams) {
    let name = &value.name;
    streams.decls.blank();
    streams.decls.doc_comment(&format!("{name} storage value."));
    streams.decls.line(&format!("pub struct {name};"));

    streams.impls.blank();
    streams.impls.line(&format!("impl {name} {{}}"));

    streams.defs.line(&format!("def_value!({name});"));
}

fn emit_instr(instr: &InstrDescriptor, streams: &mut Streams) {
    let struct_name = format!("{}Inst", instr.name);
    emit_instr_decl(instr, &struct_name, &mut streams.decls);
    emit_instr_impl(instr, &struct_name, &mut streams.impls);
    streams
        .defs
        .line(&format!("def_instr!({struct_name}, {});", instr.name));
    emit_instr_factory(instr, &struct_name, &mut streams.builder);
}

fn emit_instr_decl(instr: &InstrDescriptor, struct_name: &str, fmt: &mut Formatter) {
    fmt.blank();
    fmt.doc_comment(&format!("{} instruction.", instr.name));
    for group in &instr.in_place {
        fmt.doc_comment(&format!("May alias: {}.", group.operands.join(", ")));
    }
    if instr.operands.is_empty() && instr.members.is_empty() {
        fmt.line(&format!("pub struct {struct_name};"));
        return;
    }
    fmt.indent_with(&format!("pub struct {struct_name} {{"), "}", |fmt| {
        for operand in &instr.operands {
            fmt.doc_comment(&operand_doc(operand));
            fmt.line(&format!("{}: Value,", field_name(operand)));
        }
        for member in &instr.members {
            fmt.doc_comment(&format!("{} member.", member.kind));
            fmt.line(&format!(
                "{}: {},",
                snake_case(&member.name),
                member.kind.rust_type()
            ));
        }
    });
}

fn emit_instr_impl(instr: &InstrDescriptor, struct_name: &str, fmt: &mut Formatter) {
    fmt.blank();
    fmt.indent_with(&format!("impl {struct_name} {{"), "}", |fmt| {
        for operand in &instr.operands {
            let field = field_name(operand);
            fmt.line(&format!(
                "pub fn {field}(&self) -> &Value {{ &self.{field} }}"
            ));
        }
        for member in &instr.members {
            let field = snake_case(&member.name);
            let ty = member.kind.rust_type();
            if member.kind.returns_by_ref() {
                fmt.line(&format!("pub fn {field}(&self) -> &{ty} {{ &self.{field} }}"));
            } else {
                fmt.line(&format!("pub fn {field}(&self) -> {ty} {{ self.{field} }}"));
            }
        }
        emit_result_ty(instr, fmt);
        for fragment in &instr.extra_methods {
            fmt.blank();
            fmt.multiline(fragment);
        }
    });
}

fn emit_result_ty(instr: &InstrDescriptor, fmt: &mut Formatter) {
    // Validated catalogues always resolve; a void result emits nothing.
    let resolved = instr.resolve_result().unwrap_or(ResolvedResult::Void);
    match resolved {
        ResolvedResult::Operand(name) => {
            fmt.line(&format!(
                "pub fn result_ty(&self) -> Type {{ self.{}.ty() }}",
                snake_case(&name)
            ));
        }
        ResolvedResult::Member(name) => {
            fmt.line(&format!(
                "pub fn result_ty(&self) -> Type {{ self.{}.clone() }}",
                snake_case(&name)
            ));
        }
        ResolvedResult::Void => {}
    }
}

fn emit_instr_factory(instr: &InstrDescriptor, struct_name: &str, fmt: &mut Formatter) {
    let mut params = vec!["&mut self".to_string()];
    for operand in &instr.operands {
        params.push(format!("{}: Value", field_name(operand)));
    }
    for member in &instr.members {
        params.push(format!(
            "{}: {}",
            snake_case(&member.name),
            member.kind.rust_type()
        ));
    }

    fmt.blank();
    fmt.doc_comment(&format!("Create a {} instruction.", instr.name));
    let signature = format!(
        "pub fn create_{}({}) -> InstrHandle {{",
        snake_case(&instr.name),
        params.join(", ")
    );
    fmt.indent_with(&signature, "}", |fmt| {
        if instr.operands.is_empty() && instr.members.is_empty() {
            fmt.line(&format!("let inst = {struct_name};"));
        } else {
            fmt.indent_with(&format!("let inst = {struct_name} {{"), "};", |fmt| {
                for operand in &instr.operands {
                    fmt.line(&format!("{},", field_name(operand)));
                }
                for member in &instr.members {
                    fmt.line(&format!("{},", snake_case(&member.name)));
                }
            });
        }
        fmt.line("self.insert(inst.into())");
    });
}

fn operand_doc(operand: &Operand) -> String {
    match operand.role {
        OperandRole::Value => format!("{} operand.", operand.kind),
        OperandRole::Gradient => {
            format!("{} gradient accumulator for {}.", operand.kind, operand.name)
        }
    }
}

/// Field and parameter identifier for an operand; gradient-role operands
/// keep the base name and gain a `_grad` suffix so the two roles can
/// coexist on one generated struct.
fn field_name(operand: &Operand) -> String {
    match operand.role {
        OperandRole::Value => snake_case(&operand.name),
        OperandRole::Gradient => format!("{}_grad", snake_case(&operand.name)),
    }
}

/// Convert a registered CamelCase name to a snake_case identifier.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let after_lower = i > 0 && (chars[i - 1].is_ascii_lowercase() || chars[i - 1].is_ascii_digit());
            let before_lower =
                i > 0 && i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase();
            if after_lower || before_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

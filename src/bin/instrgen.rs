//! Instruction descriptor generator binary.
//!
//! Registers the stock instruction catalogue, validates it, and writes
//! the four generated artifacts to the requested destinations. Nothing
//! is written unless validation and emission both succeed.

use clap::Parser;
use instrgen::schema::MemberKind::{Float, SizeT, TypeRef, Unsigned, VectorSizeT, VectorUnsigned};
use instrgen::schema::OperandKind::{In, InOut, Out};
use instrgen::schema::Catalogue;
use instrgen::{emit, validate, SchemaResult};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "instrgen", about = "Generate IR instruction sources from the schema catalogue")]
struct Args {
    /// Destination for the generated type declarations.
    decls: PathBuf,
    /// Destination for the generated implementations.
    impls: PathBuf,
    /// Destination for the enumeration listing.
    defs: PathBuf,
    /// Destination for the builder API.
    builder: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut catalogue = Catalogue::new();
    if let Err(e) = register_all(&mut catalogue) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    let validated = match validate::validate(&catalogue) {
        Ok(validated) => validated,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let artifacts = emit::emit(&validated);

    println!(
        "Writing instr descriptors to:\n\t{}\n\t{}\n\t{}\n\t{}",
        args.decls.display(),
        args.impls.display(),
        args.defs.display(),
        args.builder.display()
    );
    fs::write(&args.decls, &artifacts.decls)?;
    fs::write(&args.impls, &artifacts.impls)?;
    fs::write(&args.defs, &artifacts.defs)?;
    fs::write(&args.builder, &artifacts.builder)?;
    log::info!("generated {} catalogue entries", validated.entries().len());
    Ok(())
}

/// Register the stock instruction catalogue.
fn register_all(bb: &mut Catalogue) -> SchemaResult<()> {
    // ========================================================================
    // Memory / Buffer Management
    // ========================================================================

    bb.declare_value("WeightVar")?;

    bb.new_instr("AllocActivation")
        .add_member(TypeRef, "Ty")
        .set_type("Ty")
        .register()?;

    bb.new_instr("TensorView")
        .add_operand("Src", In)
        .add_member(TypeRef, "Ty")
        .set_type("Ty")
        .register()?;

    bb.new_instr("DeallocActivation")
        .add_operand("Src", Out)
        .add_extra_method(
            "pub fn alloc(&self) -> &AllocActivationInst {\n    self.src.as_alloc_activation()\n}",
        )
        .set_type("Src")
        .register()?;

    bb.new_instr("Copy")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .set_type("Src")
        .register()?;

    // ========================================================================
    // Convolution / Pool / FC
    // ========================================================================

    bb.new_instr("Convolution")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_operand("Filter", In)
        .add_operand("Bias", In)
        .add_member(SizeT, "Kernel")
        .add_member(SizeT, "Stride")
        .add_member(SizeT, "Pad")
        .add_member(SizeT, "Depth")
        .add_gradient_instr(&["Src", "Filter"], &["Dest", "Src", "Filter", "Bias"])
        .register()?;

    bb.new_instr("PoolMax")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_operand("SrcXY", InOut)
        .add_member(SizeT, "Kernel")
        .add_member(SizeT, "Stride")
        .add_member(SizeT, "Pad")
        .add_gradient_instr(&["Dest", "SrcXY"], &["Dest", "Src"])
        .register()?;

    bb.new_instr("PoolAvg")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_member(SizeT, "Kernel")
        .add_member(SizeT, "Stride")
        .add_member(SizeT, "Pad")
        .add_gradient_instr(&["Dest"], &["Dest", "Src"])
        .register()?;

    bb.new_instr("FullyConnected")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_operand("Filter", In)
        .add_operand("Bias", In)
        .add_member(SizeT, "Depth")
        .add_gradient_instr(&["Src", "Filter"], &["Dest", "Src", "Filter", "Bias"])
        .register()?;

    // ========================================================================
    // Normalization
    // ========================================================================

    bb.new_instr("BatchNormalization")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_operand("Scale", In)
        .add_operand("Bias", In)
        .add_operand("Mean", In)
        .add_operand("Var", In)
        .add_member(SizeT, "ChannelIdx")
        .add_member(Float, "Epsilon")
        .add_member(Float, "Momentum")
        .inplace_operands(&["Dest", "Src"])
        .add_gradient_instr(
            &["Src", "Scale", "Mean", "Var"],
            &["Dest", "Src", "Scale", "Bias"],
        )
        .register()?;

    bb.new_instr("LocalResponseNormalization")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_operand("Scale", Out)
        .add_member(SizeT, "HalfWindowSize")
        .add_member(Float, "Alpha")
        .add_member(Float, "Beta")
        .add_member(Float, "K")
        .set_type("Src")
        .inplace_operands(&["Dest", "Src"])
        .add_gradient_instr(&["Dest", "Src", "Scale"], &["Dest", "Src"])
        .register()?;

    // ========================================================================
    // Loss operations
    // ========================================================================

    bb.new_instr("SoftMax")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_operand("E", InOut)
        .add_operand("Selected", In)
        .inplace_operands(&["Dest", "Src"])
        .add_gradient_instr(&["Src", "E", "Selected"], &["Src"])
        .register()?;

    // ========================================================================
    // Arithmetic
    // ========================================================================

    // Matrix multiplication between Filter and every matrix in the
    // batch; the result keeps the batch dimension.
    bb.new_instr("BatchedMatMul")
        .add_operand("Dest", Out)
        .add_operand("Batch", In)
        .add_operand("Filter", In)
        .register()?;

    // Accumulates the batch layers into a tensor without the batch
    // dimension.
    bb.new_instr("BatchedReduceAdd")
        .add_operand("Dest", Out)
        .add_operand("Batch", In)
        .register()?;

    // Adds the Slice operand to each slice in the batch.
    bb.new_instr("BatchedAdd")
        .add_operand("Dest", Out)
        .add_operand("Batch", In)
        .add_operand("Slice", In)
        .inplace_operands(&["Dest", "Batch"])
        .register()?;

    bb.new_instr("ElementAdd")
        .add_operand("Dest", Out)
        .add_operand("LHS", In)
        .add_operand("RHS", In)
        .inplace_operands(&["Dest", "LHS", "RHS"])
        .add_gradient_instr(&[], &["Dest", "LHS", "RHS"])
        .register()?;

    bb.new_instr("ElementSub")
        .add_operand("Dest", Out)
        .add_operand("LHS", In)
        .add_operand("RHS", In)
        .inplace_operands(&["Dest", "LHS", "RHS"])
        .add_gradient_instr(&[], &["Dest", "LHS", "RHS"])
        .register()?;

    bb.new_instr("ElementMul")
        .add_operand("Dest", Out)
        .add_operand("LHS", In)
        .add_operand("RHS", In)
        .inplace_operands(&["Dest", "LHS", "RHS"])
        .add_gradient_instr(&["LHS", "RHS"], &["Dest", "LHS", "RHS"])
        .register()?;

    bb.new_instr("ElementDiv")
        .add_operand("Dest", Out)
        .add_operand("LHS", In)
        .add_operand("RHS", In)
        .inplace_operands(&["Dest", "LHS", "RHS"])
        .add_gradient_instr(&["LHS", "RHS"], &["Dest", "LHS", "RHS"])
        .register()?;

    // ========================================================================
    // Non-linearities
    // ========================================================================

    bb.new_instr("Relu")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .inplace_operands(&["Dest", "Src"])
        .add_gradient_instr(&["Dest"], &["Dest", "Src"])
        .register()?;

    bb.new_instr("Sigmoid")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .inplace_operands(&["Dest", "Src"])
        .add_gradient_instr(&["Dest"], &["Dest", "Src"])
        .register()?;

    bb.new_instr("Tanh")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .inplace_operands(&["Dest", "Src"])
        .add_gradient_instr(&["Dest"], &["Dest", "Src"])
        .register()?;

    // ========================================================================
    // Shape transformations
    // ========================================================================

    bb.new_instr("Reshape")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_member(VectorSizeT, "Dims")
        .register()?;

    bb.new_instr("Transpose")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_member(VectorUnsigned, "Shuffle")
        .register()?;

    bb.new_instr("Splat")
        .add_member(Float, "Value")
        .add_operand("Dest", Out)
        .register()?;

    bb.new_instr("InsertTensor")
        .add_operand("Dest", InOut)
        .add_operand("Src", In)
        .add_member(VectorSizeT, "Offsets")
        .register()?;

    bb.new_instr("ExtractTensor")
        .add_operand("Dest", Out)
        .add_operand("Src", In)
        .add_member(VectorSizeT, "Offsets")
        .register()?;

    // ========================================================================
    // Instructions used for network training
    // ========================================================================

    bb.new_instr("SGD")
        .add_operand("Gradient", In)
        .add_operand("Weight", InOut)
        .add_operand("Gsum", InOut)
        .add_member(Float, "L1Decay")
        .add_member(Float, "L2Decay")
        .add_member(Float, "LearningRate")
        .add_member(Float, "Momentum")
        .add_member(Unsigned, "BatchSize")
        .register()?;

    // ========================================================================
    // Instructions used for debugging/profiling/printing
    // ========================================================================

    bb.new_instr("DebugPrint").add_operand("Src", In).register()?;

    Ok(())
}

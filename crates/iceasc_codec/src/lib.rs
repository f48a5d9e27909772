//! Reader and writer for iCE40 ASC configuration text.
//!
//! The load path validates the text into a [`BitLattice`] and rebuilds the
//! placed and routed netlist from it: cells on their bels, active pips, and
//! nets with their drivers and users. The store path computes the bits of a
//! netlist and writes them back out in the fixed tile layout.
//!
//! # Usage
//!
//! ```ignore
//! let ctx = iceasc_codec::parse_str(&text)?;
//! let again = iceasc_codec::store_to_string(&ctx)?;
//! ```

#![warn(missing_docs)]

pub mod block_map;
pub mod codes;
pub mod compare;
pub mod drivers;
pub mod error;
pub mod lattice;
pub mod options;
pub mod reconstruct;
pub mod serialize;
pub mod tokenizer;

pub use block_map::{block_map, BlockMap, BlockMapError};
pub use compare::{compare_netlists, Mismatch};
pub use drivers::{check_driver_uniqueness, DriverViolation};
pub use error::{CodecError, DecodeError, EncodeError, FormatError, FormatErrorKind};
pub use lattice::BitLattice;
pub use options::CodecOptions;
pub use tokenizer::{read_document, AscDocument, NetAnnotation, ReadOutcome};

use iceasc_diagnostics::{Diagnostic, DiagnosticSink, Location};
use iceasc_netlist::Context;
use std::io::{BufRead, BufWriter, Write};

/// Reads ASC text into a new context for the device it names.
pub fn parse<R: BufRead>(reader: R) -> Result<Context, CodecError> {
    parse_with(reader, &CodecOptions::default(), &DiagnosticSink::new())
}

/// [`parse`] with explicit options and a sink for non-fatal observations.
pub fn parse_with<R: BufRead>(
    reader: R,
    options: &CodecOptions,
    sink: &DiagnosticSink,
) -> Result<Context, CodecError> {
    let doc = match read_document(reader, None)? {
        ReadOutcome::Document(doc) => doc,
        ReadOutcome::WrongTarget(chip) => {
            return Err(iceasc_common::InternalError::new(format!(
                "unconstrained read rejected device {chip}"
            ))
            .into())
        }
    };
    let mut ctx = Context::new(doc.chip.clone())?;
    reconstruct::reconstruct(&mut ctx, &doc.lattice, &doc.annotations, options, sink)?;
    Ok(ctx)
}

/// Reads ASC text into an existing context.
///
/// Returns `Ok(false)` without touching the netlist when the text targets a
/// device the context's chip cannot take. On error the context holds a
/// partial netlist and should be discarded.
pub fn load<R: BufRead>(ctx: &mut Context, reader: R) -> Result<bool, CodecError> {
    load_with(ctx, reader, &CodecOptions::default(), &DiagnosticSink::new())
}

/// [`load`] with explicit options and a sink for non-fatal observations.
pub fn load_with<R: BufRead>(
    ctx: &mut Context,
    reader: R,
    options: &CodecOptions,
    sink: &DiagnosticSink,
) -> Result<bool, CodecError> {
    let expected = ctx.chip().clone();
    match read_document(reader, Some(&expected))? {
        ReadOutcome::WrongTarget(found) => {
            sink.emit(
                Diagnostic::note(
                    codes::TARGET_MISMATCH,
                    format!("text targets {found}, context holds {expected}"),
                    Location::None,
                )
                .with_note("the context was left unchanged"),
            );
            Ok(false)
        }
        ReadOutcome::Document(doc) => {
            reconstruct::reconstruct(ctx, &doc.lattice, &doc.annotations, options, sink)?;
            Ok(true)
        }
    }
}

/// Writes the netlist of `ctx` as ASC text.
pub fn store<W: Write>(ctx: &Context, writer: W) -> Result<(), CodecError> {
    store_with(ctx, writer, &CodecOptions::default(), &DiagnosticSink::new())
}

/// [`store`] with explicit options and a sink for non-fatal observations.
pub fn store_with<W: Write>(
    ctx: &Context,
    writer: W,
    options: &CodecOptions,
    sink: &DiagnosticSink,
) -> Result<(), CodecError> {
    let lattice = serialize::encode(ctx, sink)?;
    let mut out = BufWriter::new(writer);
    serialize::write_text(ctx, &lattice, options, &mut out)?;
    out.flush()?;
    Ok(())
}

/// [`parse`] from a string.
pub fn parse_str(text: &str) -> Result<Context, CodecError> {
    parse(text.as_bytes())
}

/// [`load`] from a string.
pub fn load_str(ctx: &mut Context, text: &str) -> Result<bool, CodecError> {
    load(ctx, text.as_bytes())
}

/// [`store`] into a string.
pub fn store_to_string(ctx: &Context) -> Result<String, CodecError> {
    let mut out = Vec::new();
    store(ctx, &mut out)?;
    String::from_utf8(out).map_err(|e| iceasc_common::InternalError::new(e.to_string()).into())
}

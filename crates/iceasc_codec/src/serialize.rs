//! Netlist to configuration bits, and bits to ASC text.

use crate::codes;
use crate::error::{CodecError, EncodeError};
use crate::lattice::BitLattice;
use crate::options::CodecOptions;
use iceasc_arch::layout::names;
use iceasc_arch::{BitField, ChipDb, LutPermutation, PipId};
use iceasc_common::{BitVector, InternalError};
use iceasc_diagnostics::{Diagnostic, DiagnosticSink, Location};
use iceasc_netlist::{Cell, CellKind, Context, PullupResistor, RAM_INIT_WIDTH, RAM_INIT_WORDS};
use std::collections::HashMap;
use std::io::Write;

/// Who set a configuration bit.
#[derive(Debug, Clone, Copy)]
enum Owner {
    Field(&'static str),
    Pip(PipId),
}

/// Writes bits into a lattice, refusing to flip a bit someone else set.
struct BitWriter<'a> {
    db: &'a ChipDb,
    lattice: BitLattice,
    owners: HashMap<(u32, u32, u8, u8), (bool, Owner)>,
}

impl<'a> BitWriter<'a> {
    fn new(db: &'a ChipDb) -> Self {
        Self {
            db,
            lattice: BitLattice::new(*db.grid()),
            owners: HashMap::new(),
        }
    }

    fn put(&mut self, at: (u32, u32, u8, u8), value: bool, owner: Owner) -> Result<(), CodecError> {
        if let Some(&(previous, other)) = self.owners.get(&at) {
            if previous != value {
                return Err(match (owner, other) {
                    (Owner::Pip(pip), Owner::Pip(other)) => EncodeError::PipConflict {
                        pip: self.db.pip_name(pip),
                        other: self.db.pip_name(other),
                    }
                    .into(),
                    (Owner::Field(field), Owner::Field(_)) => EncodeError::TileSettingConflict {
                        x: at.0,
                        y: at.1,
                        field,
                    }
                    .into(),
                    _ => InternalError::new(format!(
                        "bit ({}, {}) of tile ({}, {}) shared by a pip and a field",
                        at.2, at.3, at.0, at.1
                    ))
                    .into(),
                });
            }
        }
        self.owners.insert(at, (value, owner));
        self.lattice.set(at.0, at.1, at.2, at.3, value)?;
        Ok(())
    }

    fn field(&mut self, cell: &Cell, field: &BitField, value: u64) -> Result<(), CodecError> {
        if field.width() < 64 && value >> field.width() != 0 {
            return Err(EncodeError::ParamOutOfRange {
                cell: cell.name.clone(),
                param: field.name.to_string(),
                value: value.to_string(),
            }
            .into());
        }
        for (i, bit) in field.bits.iter().enumerate() {
            let at = (bit.x, bit.y, bit.row, bit.col);
            self.put(at, (value >> i) & 1 == 1, Owner::Field(field.name))?;
        }
        Ok(())
    }

    fn pip(&mut self, pip: PipId) -> Result<(), CodecError> {
        for bit in self.db.pip_bits(pip) {
            self.put((bit.x, bit.y, bit.row, bit.col), bit.value, Owner::Pip(pip))?;
        }
        Ok(())
    }
}

/// Computes the configuration bits of a placed and routed netlist.
pub fn encode(ctx: &Context, sink: &DiagnosticSink) -> Result<BitLattice, CodecError> {
    let db = ctx.db();
    let mut writer = BitWriter::new(db);
    for (_, cell) in ctx.cells() {
        encode_cell(ctx, &mut writer, cell)?;
    }
    for (_, net) in ctx.nets() {
        if net.is_unrouted() {
            if net.driver.is_some() || !net.users.is_empty() {
                sink.emit(Diagnostic::warning(
                    codes::UNROUTED_NET,
                    format!("net {} has no routing and is not written", net.name),
                    Location::Net(net.name.clone()),
                ));
            }
            continue;
        }
        for nw in net.wires.values() {
            let Some(pip) = nw.pip else {
                continue;
            };
            if db.pip(pip).dst != nw.wire {
                return Err(EncodeError::PipWireMismatch {
                    net: net.name.clone(),
                    wire: db.wire_name(nw.wire),
                    pip: db.pip_name(pip),
                }
                .into());
            }
            writer.pip(pip)?;
        }
    }
    Ok(writer.lattice)
}

fn encode_cell(ctx: &Context, writer: &mut BitWriter<'_>, cell: &Cell) -> Result<(), CodecError> {
    if cell.is_ground() {
        return Ok(());
    }
    let db = ctx.db();
    let bel = cell.bel.ok_or_else(|| EncodeError::Unplaced {
        cell: cell.name.clone(),
    })?;
    let info = db.bel(bel);
    if cell.kind.bel_kind() != info.kind {
        return Err(EncodeError::KindMismatch {
            cell: cell.name.clone(),
            cell_type: cell.kind.type_name(),
            bel: info.name.clone(),
        }
        .into());
    }
    let layout = db.bel_layout(bel);
    let field = |name: &str| {
        layout
            .field(name)
            .ok_or_else(|| InternalError::new(format!("{} has no field {name}", info.name)))
    };
    let out_of_range = |param: &str, value: String| EncodeError::ParamOutOfRange {
        cell: cell.name.clone(),
        param: param.to_string(),
        value,
    };

    match &cell.kind {
        CellKind::Lc(p) => {
            let lut = LutPermutation::for_site(db.family(), info.z).encode(p.lut_init);
            writer.field(cell, field(names::LUT_INIT)?, u64::from(lut))?;
            writer.field(cell, field(names::CARRY_ENABLE)?, u64::from(p.carry_enable))?;
            writer.field(cell, field(names::DFF_ENABLE)?, u64::from(p.dff_enable))?;
            writer.field(cell, field(names::SET_NORESET)?, u64::from(p.set_noreset))?;
            writer.field(cell, field(names::ASYNC_SR)?, u64::from(p.async_sr))?;
            writer.field(cell, field(names::NEG_CLK)?, u64::from(p.neg_clk))?;
            match layout.field(names::CIN_SET) {
                Some(cin) => writer.field(cell, cin, u64::from(p.cin_set))?,
                None if p.cin_set => return Err(out_of_range(names::CIN_SET, "1".into()).into()),
                None => {}
            }
        }
        CellKind::Io(p) => {
            writer.field(cell, field(names::PIN_TYPE)?, u64::from(p.pin_type))?;
            writer.field(cell, field(names::NEG_TRIGGER)?, u64::from(p.neg_trigger))?;
            writer.field(cell, field(names::PULLUP_OFF)?, u64::from(!p.pullup))?;
            writer.field(cell, field(names::IO_ENABLE)?, 1)?;
            writer.field(cell, field(names::LVDS)?, u64::from(p.lvds))?;
            match layout.field(names::PULLUP_RESISTOR) {
                Some(resistor) => writer.field(cell, resistor, p.pullup_resistor.code())?,
                None if p.pullup_resistor != PullupResistor::R100k => {
                    let value = p.pullup_resistor.name().to_string();
                    return Err(out_of_range(names::PULLUP_RESISTOR, value).into());
                }
                None => {}
            }
        }
        CellKind::Ram(p) => {
            writer.field(cell, field(names::NEG_CLK_W)?, u64::from(p.neg_clk_w))?;
            writer.field(cell, field(names::NEG_CLK_R)?, u64::from(p.neg_clk_r))?;
            writer.field(cell, field(names::WRITE_MODE)?, u64::from(p.write_mode))?;
            writer.field(cell, field(names::READ_MODE)?, u64::from(p.read_mode))?;
            writer.field(cell, field(names::POWER_UP)?, 1)?;
            if p.init.len() != RAM_INIT_WORDS {
                return Err(out_of_range("INIT", format!("{} words", p.init.len())).into());
            }
            for (index, word) in p.init.iter().enumerate() {
                if word.width() != RAM_INIT_WIDTH {
                    return Err(out_of_range(&format!("INIT_{index:X}"), word.to_string()).into());
                }
                writer.lattice.set_ram_word(info.x, info.y, index, word.clone())?;
            }
        }
        CellKind::Dsp(_) | CellKind::Pll(_) | CellKind::Hfosc(_) | CellKind::RgbaDrv(_) => {
            if let CellKind::Pll(p) = &cell.kind {
                if !(1..=5).contains(&p.pll_type) {
                    return Err(out_of_range(names::PLLTYPE, p.pll_type.to_string()).into());
                }
            }
            for f in layout.fields() {
                let value = match (f.name, &cell.kind) {
                    (names::ENABLE, _) => 1,
                    (names::FEEDBACK_PATH, CellKind::Pll(p)) => p.feedback_path.code(),
                    (name, kind) => kind
                        .get_param(name)
                        .and_then(|v| v.as_int())
                        .ok_or_else(|| {
                            InternalError::new(format!("{} has no integer {name}", kind.type_name()))
                        })?,
                };
                writer.field(cell, f, value)?;
            }
        }
        CellKind::Gb | CellKind::Lfosc | CellKind::Warmboot => {}
    }
    Ok(())
}

/// Writes `lattice` as ASC text for the device of `ctx`.
pub fn write_text<W: Write>(
    ctx: &Context,
    lattice: &BitLattice,
    options: &CodecOptions,
    out: &mut W,
) -> Result<(), CodecError> {
    match &options.comment {
        Some(comment) => writeln!(out, ".comment {comment}")?,
        None => writeln!(out, ".comment")?,
    }
    let chip = ctx.chip();
    writeln!(out, ".device {} {}", chip.device_token(), chip.package)?;

    let mut line = String::new();
    for (x, y, tile) in lattice.grid().tiles() {
        writeln!(out, ".{tile} {x} {y}")?;
        for row in 0..tile.rows() {
            line.clear();
            match lattice.row(x, y, row) {
                Some(bits) => line.extend(bits.iter().map(|b| if b { '1' } else { '0' })),
                None => line.extend(std::iter::repeat('0').take(tile.cols())),
            }
            writeln!(out, "{line}")?;
        }
    }

    let mut rams: Vec<(u32, u32)> = ctx
        .cells()
        .filter(|(_, cell)| matches!(cell.kind, CellKind::Ram(_)))
        .filter_map(|(_, cell)| cell.bel)
        .map(|bel| {
            let info = ctx.db().bel(bel);
            (info.y, info.x)
        })
        .collect();
    rams.sort_unstable();
    let zero = BitVector::new(RAM_INIT_WIDTH);
    for (y, x) in rams {
        writeln!(out, ".ram_data {x} {y}")?;
        let words = lattice.ram_words(x, y).unwrap_or_default();
        for index in 0..RAM_INIT_WORDS {
            writeln!(out, "{}", words.get(index).unwrap_or(&zero).to_hex_string())?;
        }
    }

    if options.annotations {
        let db = ctx.db();
        let mut nets: Vec<_> = ctx.nets().map(|(_, net)| net).filter(|n| !n.is_unrouted()).collect();
        nets.sort_by(|a, b| a.name.cmp(&b.name));
        for net in nets {
            writeln!(out, ".net {}", net.name)?;
            for nw in net.wires.values() {
                match nw.pip {
                    Some(pip) => writeln!(out, ".wire {} {}", db.wire_name(nw.wire), db.pip_name(pip))?,
                    None => writeln!(out, ".wire {} -", db.wire_name(nw.wire))?,
                }
            }
        }
    }
    Ok(())
}

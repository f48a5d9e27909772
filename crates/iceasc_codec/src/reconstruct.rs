//! Netlist reconstruction from configuration bits.
//!
//! The pass runs once over a complete lattice:
//!
//! 1. every bel with a non-empty configuration becomes a cell named after
//!    its bel;
//! 2. every pip whose control bits all match joins its two wires;
//! 3. configless bels touching a joined wire become cells;
//! 4. fixed LUT input pips join when the LUT they feed is a cell;
//! 5. carry links between chained logic cells become single-wire groups;
//! 6. each group becomes a net, named after its source wire;
//! 7. cell pins on net wires become the driver and users.

use crate::codes;
use crate::error::{CodecError, DecodeError};
use crate::lattice::BitLattice;
use crate::options::CodecOptions;
use crate::tokenizer::NetAnnotation;
use iceasc_arch::layout::names;
use iceasc_arch::{
    BelId, BelInfo, BelKind, BelLayout, ChipDb, Family, LutPermutation, PinDir, PipId, WireId,
    WireKind,
};
use iceasc_diagnostics::{Diagnostic, DiagnosticSink, Location};
use iceasc_netlist::{
    CellKind, Context, IoParams, LcParams, NetId, NetlistError, ParamValue, PullupResistor,
    RamParams,
};
use petgraph::unionfind::UnionFind;
use std::collections::{BTreeMap, HashMap};

/// Rebuilds the netlist of `ctx` from `lattice`, replacing its contents.
pub fn reconstruct(
    ctx: &mut Context,
    lattice: &BitLattice,
    annotations: &[NetAnnotation],
    options: &CodecOptions,
    sink: &DiagnosticSink,
) -> Result<(), CodecError> {
    ctx.clear_netlist();
    let db = ChipDb::for_family(ctx.chip().family())?;

    for bel in db.bel_ids() {
        let info = db.bel(bel);
        if info.kind.is_configless() {
            continue;
        }
        if let Some(kind) = decode_bel(db.family(), lattice, info, &db.bel_layout(bel))? {
            place(ctx, bel, info, kind)?;
        }
    }

    let mut groups = Groups::new(db.wire_count());
    for pip in db.pip_ids() {
        if db.pip(pip).is_fixed() {
            continue;
        }
        if db.pip_bits(pip).iter().all(|bit| lattice.matches(bit)) {
            groups.join(&db, pip);
        }
    }

    for bel in db.bel_ids() {
        let info = db.bel(bel);
        if info.kind.is_configless() && info.pins.iter().any(|p| groups.contains(p.wire)) {
            place(ctx, bel, info, CellKind::default_for(info.kind))?;
        }
    }

    for pip in db.pip_ids() {
        let info = db.pip(pip);
        if !info.is_fixed() || !groups.contains(info.src) {
            continue;
        }
        let feeds_cell = db
            .wire_bel_pins(info.dst)
            .any(|(bel, pin)| pin.dir == PinDir::Input && ctx.bel_cell(bel).is_some());
        if feeds_cell {
            groups.join(&db, pip);
        }
    }

    for wire in carry_links(ctx, &db) {
        groups.mark(wire);
    }

    let nets = build_nets(ctx, &db, &groups)?;
    connect_pins(ctx, &db, &nets, sink)?;

    if options.apply_net_names {
        apply_annotations(ctx, annotations, sink)?;
    }
    Ok(())
}

/// Connectivity groups over all wires of a device.
struct Groups {
    sets: UnionFind<usize>,
    member: Vec<bool>,
    uphill: HashMap<WireId, PipId>,
}

impl Groups {
    fn new(wires: usize) -> Self {
        Self {
            sets: UnionFind::new(wires),
            member: vec![false; wires],
            uphill: HashMap::new(),
        }
    }

    fn mark(&mut self, wire: WireId) {
        self.member[wire.as_raw() as usize] = true;
    }

    fn contains(&self, wire: WireId) -> bool {
        self.member[wire.as_raw() as usize]
    }

    fn join(&mut self, db: &ChipDb, pip: PipId) {
        let info = db.pip(pip);
        self.mark(info.src);
        self.mark(info.dst);
        self.sets
            .union(info.src.as_raw() as usize, info.dst.as_raw() as usize);
        self.uphill.insert(info.dst, pip);
    }

    /// Member wires per group, in wire order.
    fn members(&self) -> BTreeMap<usize, Vec<WireId>> {
        let mut groups: BTreeMap<usize, Vec<WireId>> = BTreeMap::new();
        for (index, _) in self.member.iter().enumerate().filter(|(_, m)| **m) {
            groups
                .entry(self.sets.find(index))
                .or_default()
                .push(WireId::from_raw(index as u32));
        }
        groups
    }
}

fn place(ctx: &mut Context, bel: BelId, info: &BelInfo, kind: CellKind) -> Result<(), CodecError> {
    let cell = ctx.add_cell(info.name.clone(), kind)?;
    ctx.bind_bel(cell, bel)?;
    let attrs = &mut ctx.cell_mut(cell).attrs;
    attrs.insert("X".to_string(), info.x.to_string());
    attrs.insert("Y".to_string(), info.y.to_string());
    attrs.insert("Z".to_string(), info.z.to_string());
    Ok(())
}

/// Decodes the configuration of one bel; `None` when the bel is unused.
fn decode_bel(
    family: Family,
    lattice: &BitLattice,
    info: &BelInfo,
    layout: &BelLayout,
) -> Result<Option<CellKind>, DecodeError> {
    let read = |name: &str| {
        layout
            .field(name)
            .map_or(0, |field| lattice.read_field(&field.bits))
    };
    let flag = |name: &str| read(name) != 0;
    let undefined = |field: &'static str, value: u64| DecodeError {
        x: info.x,
        y: info.y,
        bel: info.name.clone(),
        field,
        value,
    };

    let kind = match info.kind {
        BelKind::Lc => {
            let raw = read(names::LUT_INIT) as u16;
            let params = LcParams {
                lut_init: LutPermutation::for_site(family, info.z).decode(raw),
                neg_clk: flag(names::NEG_CLK),
                carry_enable: flag(names::CARRY_ENABLE),
                dff_enable: flag(names::DFF_ENABLE),
                set_noreset: flag(names::SET_NORESET),
                async_sr: flag(names::ASYNC_SR),
                cin_set: flag(names::CIN_SET),
            };
            let used = raw != 0
                || params.carry_enable
                || params.dff_enable
                || params.set_noreset
                || params.async_sr
                || params.cin_set;
            if !used {
                return Ok(None);
            }
            CellKind::Lc(params)
        }
        BelKind::Io => {
            if !flag(names::IO_ENABLE) {
                return Ok(None);
            }
            let pullup_resistor = match layout.field(names::PULLUP_RESISTOR) {
                Some(field) => {
                    let code = lattice.read_field(&field.bits);
                    PullupResistor::from_code(code)
                        .ok_or_else(|| undefined(names::PULLUP_RESISTOR, code))?
                }
                None => PullupResistor::R100k,
            };
            CellKind::Io(IoParams {
                pin_type: read(names::PIN_TYPE) as u8,
                neg_trigger: flag(names::NEG_TRIGGER),
                pullup: !flag(names::PULLUP_OFF),
                lvds: flag(names::LVDS),
                pullup_resistor,
            })
        }
        BelKind::Ram => {
            if !flag(names::POWER_UP) {
                return Ok(None);
            }
            let mut params = RamParams {
                neg_clk_r: flag(names::NEG_CLK_R),
                neg_clk_w: flag(names::NEG_CLK_W),
                write_mode: read(names::WRITE_MODE) as u8,
                read_mode: read(names::READ_MODE) as u8,
                ..RamParams::default()
            };
            if let Some(words) = lattice.ram_words(info.x, info.y) {
                params.init = words.to_vec();
            }
            CellKind::Ram(params)
        }
        BelKind::Pll => {
            let pll_type = read(names::PLLTYPE);
            match pll_type {
                0 => return Ok(None),
                1..=5 => {}
                other => return Err(undefined(names::PLLTYPE, other)),
            }
            named_fields(CellKind::default_for(info.kind), lattice, layout, &undefined)?
        }
        BelKind::Dsp | BelKind::Hfosc | BelKind::RgbaDrv => {
            if !flag(names::ENABLE) {
                return Ok(None);
            }
            named_fields(CellKind::default_for(info.kind), lattice, layout, &undefined)?
        }
        BelKind::Gb | BelKind::Lfosc | BelKind::Warmboot => return Ok(None),
    };
    Ok(Some(kind))
}

/// Fills every field except the enable through the name-based parameter
/// interface.
fn named_fields(
    mut kind: CellKind,
    lattice: &BitLattice,
    layout: &BelLayout,
    undefined: &dyn Fn(&'static str, u64) -> DecodeError,
) -> Result<CellKind, DecodeError> {
    for field in layout.fields() {
        if field.name == names::ENABLE {
            continue;
        }
        let value = lattice.read_field(&field.bits);
        kind.set_param(field.name, &ParamValue::Int(value))
            .map_err(|_| undefined(field.name, value))?;
    }
    Ok(kind)
}

/// Carry wires between two chained logic cells of one tile.
fn carry_links(ctx: &Context, db: &ChipDb) -> Vec<WireId> {
    let carries = |bel: BelId| {
        ctx.bel_cell(bel)
            .is_some_and(|cell| matches!(&ctx.cell(cell).kind, CellKind::Lc(p) if p.carry_enable))
    };
    let mut links = Vec::new();
    for (_, cell) in ctx.cells() {
        let (Some(bel), CellKind::Lc(params)) = (cell.bel, &cell.kind) else {
            continue;
        };
        if !params.carry_enable {
            continue;
        }
        let info = db.bel(bel);
        let next = db.bels_at(info.x, info.y).iter().copied().find(|&b| {
            let next = db.bel(b);
            next.kind == BelKind::Lc && next.z == info.z + 1
        });
        if next.is_some_and(carries) {
            if let Some(wire) = db.bel_pin_wire(bel, "COUT") {
                links.push(wire);
            }
        }
    }
    links
}

/// Turns groups into nets, ordered by source wire.
fn build_nets(
    ctx: &mut Context,
    db: &ChipDb,
    groups: &Groups,
) -> Result<Vec<(NetId, Vec<WireId>)>, CodecError> {
    let mut sourced: Vec<(WireId, Vec<WireId>)> = groups
        .members()
        .into_values()
        .map(|wires| {
            let source = wires
                .iter()
                .copied()
                .find(|w| !groups.uphill.contains_key(w))
                .unwrap_or(wires[0]);
            (source, wires)
        })
        .collect();
    sourced.sort_by_key(|(source, _)| *source);

    let mut nets = Vec::with_capacity(sourced.len());
    for (source, wires) in sourced {
        let net = ctx.add_net(format!("net${}", db.wire_name(source)))?;
        for &wire in &wires {
            ctx.bind_wire(net, wire, groups.uphill.get(&wire).copied())?;
        }
        if is_unused_lc_output(ctx, db, source) {
            ctx.set_net_constant(net, true);
        }
        nets.push((net, wires));
    }
    Ok(nets)
}

/// Whether `wire` is the output of a logic cell that holds no cell; such a
/// net carries the cell's constant zero.
fn is_unused_lc_output(ctx: &Context, db: &ChipDb, wire: WireId) -> bool {
    db.wire_kind(wire) == WireKind::LutffOut
        && db
            .wire_bel_pins(wire)
            .any(|(bel, _)| db.bel(bel).kind == BelKind::Lc && ctx.bel_cell(bel).is_none())
}

fn connect_pins(
    ctx: &mut Context,
    db: &ChipDb,
    nets: &[(NetId, Vec<WireId>)],
    sink: &DiagnosticSink,
) -> Result<(), CodecError> {
    for (net, wires) in nets {
        for &wire in wires {
            for (bel, pin) in db.wire_bel_pins(wire) {
                let Some(cell) = ctx.bel_cell(bel) else {
                    continue;
                };
                let port = db.pin_name(pin);
                match ctx.connect_port(cell, port, *net) {
                    Ok(()) => {}
                    Err(NetlistError::MultipleDrivers { net: name }) => {
                        let info = db.bel(bel);
                        sink.emit(
                            Diagnostic::warning(
                                codes::EXTRA_DRIVER,
                                format!("{} drives net {name}, which already has a driver", info.name),
                                Location::Bel {
                                    x: info.x,
                                    y: info.y,
                                    name: info.name.clone(),
                                },
                            )
                            .with_note(format!("port {port} left unconnected")),
                        );
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
    Ok(())
}

fn apply_annotations(
    ctx: &mut Context,
    annotations: &[NetAnnotation],
    sink: &DiagnosticSink,
) -> Result<(), CodecError> {
    for annotation in annotations {
        let net = annotation
            .wires
            .iter()
            .find_map(|&(wire, _)| ctx.wire_net(wire));
        let Some(net) = net else {
            sink.emit(Diagnostic::warning(
                codes::STALE_ANNOTATION,
                format!("annotated net {} matches no routed net", annotation.name),
                Location::Line(annotation.line),
            ));
            continue;
        };
        if ctx.net(net).name == annotation.name {
            continue;
        }
        match ctx.rename_net(net, annotation.name.clone()) {
            Ok(()) => {}
            Err(NetlistError::DuplicateNet(name)) => {
                sink.emit(Diagnostic::warning(
                    codes::ANNOTATION_CONFLICT,
                    format!("net name {name} is already in use"),
                    Location::Line(annotation.line),
                ));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

//! Structural equivalence of two netlists on the same device.
//!
//! A netlist written out and read back is not identical to the one that was
//! written: net and cell names change, LUT input wires only reappear where a
//! cell reads them, and global clock users of logic cells may gain
//! companions that shared the routing. [`compare_netlists`] checks equality
//! modulo exactly those differences and reports the first real one.

use iceasc_arch::Family;
use iceasc_netlist::{Cell, CellKind, Context, Net, NetId};
use std::collections::HashSet;

/// The first difference found between two netlists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
    /// The netlists target different families.
    #[error("device families differ: {reference} and {loaded}")]
    Family {
        /// Family of the reference netlist.
        reference: Family,
        /// Family of the loaded netlist.
        loaded: Family,
    },
    /// Different numbers of routed nets.
    #[error("{reference} routed nets in the reference, {loaded} after loading")]
    NetCount {
        /// Reference count.
        reference: usize,
        /// Loaded count.
        loaded: usize,
    },
    /// A wire of a reference net is unbound or belongs to another net.
    #[error("wire {wire} of net '{net}' is not part of the same loaded net")]
    WireNet {
        /// Reference net name.
        net: String,
        /// Wire name.
        wire: String,
    },
    /// A wire reached through a different pip.
    #[error("wire {wire} of net '{net}' is driven differently")]
    WirePip {
        /// Reference net name.
        net: String,
        /// Wire name.
        wire: String,
    },
    /// Different drivers.
    #[error("net '{net}' has a different driver")]
    Driver {
        /// Reference net name.
        net: String,
    },
    /// A reference user missing from the loaded net.
    #[error("net '{net}' lost user {bel}.{port}")]
    MissingUser {
        /// Reference net name.
        net: String,
        /// Bel of the user cell.
        bel: String,
        /// Port name.
        port: String,
    },
    /// A loaded user without a reference counterpart.
    #[error("net '{net}' gained user {bel}.{port}")]
    ExtraUser {
        /// Reference net name.
        net: String,
        /// Bel of the user cell.
        bel: String,
        /// Port name.
        port: String,
    },
    /// Different numbers of configured cells.
    #[error("{reference} cells in the reference, {loaded} after loading")]
    CellCount {
        /// Reference count.
        reference: usize,
        /// Loaded count.
        loaded: usize,
    },
    /// A reference cell whose bel holds nothing or a different type.
    #[error("cell '{cell}' has no counterpart of type {cell_type} on {bel}")]
    CellType {
        /// Reference cell name.
        cell: String,
        /// Reference cell type.
        cell_type: &'static str,
        /// Bel name.
        bel: String,
    },
    /// A parameter that changed value.
    #[error("cell '{cell}' changed {param} from {reference} to {loaded}")]
    Param {
        /// Reference cell name.
        cell: String,
        /// Parameter name.
        param: &'static str,
        /// Rendered reference value.
        reference: String,
        /// Rendered loaded value.
        loaded: String,
    },
    /// A reference cell that is not placed.
    #[error("cell '{cell}' is not placed")]
    Unplaced {
        /// Reference cell name.
        cell: String,
    },
}

/// Checks that `loaded` describes the same design as `reference`.
pub fn compare_netlists(reference: &Context, loaded: &Context) -> Result<(), Mismatch> {
    let (rf, lf) = (reference.chip().family(), loaded.chip().family());
    if rf != lf {
        return Err(Mismatch::Family {
            reference: rf,
            loaded: lf,
        });
    }

    let routed = |ctx: &Context| ctx.nets().filter(|(_, n)| !n.is_unrouted()).count();
    let (rn, ln) = (routed(reference), routed(loaded));
    if rn != ln {
        return Err(Mismatch::NetCount {
            reference: rn,
            loaded: ln,
        });
    }
    for (_, net) in reference.nets().filter(|(_, n)| !n.is_unrouted()) {
        compare_net(reference, loaded, net)?;
    }
    compare_cells(reference, loaded)
}

/// Compares one reference net with the loaded net sharing its first
/// reliable wire. A net made only of LUT input wires has no such wire and is
/// skipped; the net counts still account for it.
fn compare_net(reference: &Context, loaded: &Context, net: &Net) -> Result<(), Mismatch> {
    let db = reference.db();
    let wire_err = |wire| Mismatch::WireNet {
        net: net.name.clone(),
        wire: db.wire_name(wire),
    };
    let Some(anchor) = net
        .wires
        .keys()
        .copied()
        .find(|&w| reference.is_identity_reliable(w))
    else {
        return Ok(());
    };
    let target = loaded.wire_net(anchor).ok_or_else(|| wire_err(anchor))?;
    let loaded_net = loaded.net(target);

    for nw in net.wires.values() {
        if !reference.is_identity_reliable(nw.wire) {
            continue;
        }
        let counterpart = loaded_net.wires.get(&nw.wire).ok_or_else(|| wire_err(nw.wire))?;
        if counterpart.pip != nw.pip {
            return Err(Mismatch::WirePip {
                net: net.name.clone(),
                wire: db.wire_name(nw.wire),
            });
        }
    }

    compare_driver(reference, loaded, net, target)?;
    compare_users(reference, loaded, net, target)
}

fn bel_of(ctx: &Context, cell: &Cell) -> Option<String> {
    cell.bel.map(|bel| ctx.db().bel(bel).name.clone())
}

fn compare_driver(reference: &Context, loaded: &Context, net: &Net, target: NetId) -> Result<(), Mismatch> {
    let expected = net
        .driver
        .as_ref()
        .map(|d| reference.cell(d.cell))
        .filter(|cell| !cell.is_ground())
        .map(|cell| bel_of(reference, cell));
    let actual = loaded
        .net(target)
        .driver
        .as_ref()
        .map(|d| bel_of(loaded, loaded.cell(d.cell)));
    if expected != actual {
        return Err(Mismatch::Driver {
            net: net.name.clone(),
        });
    }
    Ok(())
}

fn compare_users(reference: &Context, loaded: &Context, net: &Net, target: NetId) -> Result<(), Mismatch> {
    let mut expected = HashSet::new();
    for user in &net.users {
        let cell = reference.cell(user.cell);
        if cell.is_ground() {
            continue;
        }
        let bel = bel_of(reference, cell).ok_or_else(|| Mismatch::Unplaced {
            cell: cell.name.clone(),
        })?;
        expected.insert((bel, user.port.clone()));
    }

    let mut found = HashSet::new();
    for user in &loaded.net(target).users {
        let cell = loaded.cell(user.cell);
        let bel = bel_of(loaded, cell).unwrap_or_else(|| cell.name.clone());
        let key = (bel, user.port.clone());
        if expected.contains(&key) {
            found.insert(key);
        } else if !(matches!(cell.kind, CellKind::Lc(_)) && is_global_port(&user.port)) {
            return Err(Mismatch::ExtraUser {
                net: net.name.clone(),
                bel: key.0,
                port: key.1,
            });
        }
    }
    if let Some((bel, port)) = expected.into_iter().find(|k| !found.contains(k)) {
        return Err(Mismatch::MissingUser {
            net: net.name.clone(),
            bel,
            port,
        });
    }
    Ok(())
}

/// Logic cell ports fed by the tile-wide global muxes.
fn is_global_port(port: &str) -> bool {
    matches!(port, "CLK" | "CEN" | "SR")
}

/// Cells that take part in the cell comparison. Ground cells, warm boot and
/// the low-frequency oscillator leave no bits of their own; the LED driver
/// IP is not modelled, so only the RGB driver represents that block.
fn counted(cell: &Cell) -> bool {
    !cell.is_ground() && !matches!(cell.kind, CellKind::Warmboot | CellKind::Lfosc)
}

fn compare_cells(reference: &Context, loaded: &Context) -> Result<(), Mismatch> {
    let count = |ctx: &Context| ctx.cells().filter(|(_, c)| counted(c)).count();
    let (rc, lc) = (count(reference), count(loaded));
    if rc != lc {
        return Err(Mismatch::CellCount {
            reference: rc,
            loaded: lc,
        });
    }

    let family = reference.chip().family();
    for (_, cell) in reference.cells().filter(|(_, c)| counted(c)) {
        let bel = cell.bel.ok_or_else(|| Mismatch::Unplaced {
            cell: cell.name.clone(),
        })?;
        let other = loaded
            .bel_cell(bel)
            .map(|id| loaded.cell(id))
            .filter(|other| other.kind.type_name() == cell.kind.type_name())
            .ok_or_else(|| Mismatch::CellType {
                cell: cell.name.clone(),
                cell_type: cell.kind.type_name(),
                bel: reference.db().bel(bel).name.clone(),
            })?;
        for &param in cell.kind.param_names() {
            if param == "PULLUP_RESISTOR" {
                let lvds = matches!(&cell.kind, CellKind::Io(p) if p.lvds);
                if family != Family::F5k || lvds {
                    continue;
                }
            }
            let (a, b) = (cell.kind.get_param(param), other.kind.get_param(param));
            if a != b {
                let render = |v: Option<iceasc_netlist::ParamValue>| v.map_or_else(|| "-".into(), |v| v.to_string());
                return Err(Mismatch::Param {
                    cell: cell.name.clone(),
                    param,
                    reference: render(a),
                    loaded: render(b),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_str, store_to_string};
    use iceasc_arch::{Chip, ChipArgs};
    use iceasc_netlist::{IoParams, LcParams};

    fn ctx() -> Context {
        Context::new(ChipArgs::new(Chip::Hx1k, "tq144").unwrap()).unwrap()
    }

    fn place(ctx: &mut Context, name: &str, bel: &str, kind: CellKind) -> iceasc_netlist::CellId {
        let cell = ctx.add_cell(name, kind).unwrap();
        let bel = ctx.db().find_bel(bel).unwrap();
        ctx.bind_bel(cell, bel).unwrap();
        cell
    }

    fn design() -> Context {
        let mut ctx = ctx();
        let a = place(&mut ctx, "a", "X1/Y1/lc0", CellKind::Lc(LcParams {
            lut_init: 0x5555,
            ..LcParams::default()
        }));
        let b = place(&mut ctx, "b", "X1/Y1/lc2", CellKind::Lc(LcParams {
            lut_init: 0x00ff,
            dff_enable: true,
            ..LcParams::default()
        }));
        let net = ctx.add_net("link").unwrap();
        ctx.connect_port(a, "O", net).unwrap();
        ctx.connect_port(b, "I0", net).unwrap();
        let db = ctx.db();
        let out = db.find_wire("X1/Y1/lutff_0/out").unwrap();
        let local = db.find_pip("X1/Y1/lutff_0/out.->X1/Y1/local_g0_0").unwrap();
        let input = db.find_pip("X1/Y1/local_g0_0.->X1/Y1/lutff_2/in_0").unwrap();
        let lut = db.find_pip("X1/Y1/lutff_2/in_0.->X1/Y1/lutff_2/in_0_lut").unwrap();
        ctx.bind_wire(net, out, None).unwrap();
        for pip in [local, input, lut] {
            ctx.bind_pip(net, pip).unwrap();
        }
        ctx
    }

    #[test]
    fn a_design_matches_its_reload() {
        let reference = design();
        let loaded = parse_str(&store_to_string(&reference).unwrap()).unwrap();
        assert_eq!(compare_netlists(&reference, &loaded), Ok(()));
    }

    #[test]
    fn parameter_changes_are_found() {
        let reference = design();
        let mut loaded = parse_str(&store_to_string(&reference).unwrap()).unwrap();
        let b = loaded.find_cell("X1/Y1/lc2").unwrap();
        if let CellKind::Lc(p) = &mut loaded.cell_mut(b).kind {
            p.set_noreset = true;
        }
        let err = compare_netlists(&reference, &loaded).unwrap_err();
        assert!(matches!(err, Mismatch::Param { param: "SET_NORESET", .. }));
    }

    #[test]
    fn missing_cells_are_found() {
        let mut reference = design();
        place(&mut reference, "pin", "X0/Y1/io0", CellKind::Io(IoParams::default()));
        let loaded = parse_str(&store_to_string(&design()).unwrap()).unwrap();
        let err = compare_netlists(&reference, &loaded).unwrap_err();
        assert_eq!(err, Mismatch::CellCount { reference: 3, loaded: 2 });
    }

    #[test]
    fn families_must_agree() {
        let other = Context::new(ChipArgs::new(Chip::Up5k, "sg48").unwrap()).unwrap();
        assert!(matches!(compare_netlists(&ctx(), &other), Err(Mismatch::Family { .. })));
    }

    #[test]
    fn nets_of_lut_inputs_alone_are_skipped() {
        let mut reference = ctx();
        let net = reference.add_net("stub").unwrap();
        let lut_in = reference.db().find_wire("X1/Y1/lutff_3/in_1_lut").unwrap();
        reference.bind_wire(net, lut_in, None).unwrap();
        let loaded = ctx();
        assert_eq!(compare_net(&reference, &loaded, reference.net(net)), Ok(()));
        assert!(matches!(
            compare_netlists(&reference, &loaded),
            Err(Mismatch::NetCount { reference: 1, loaded: 0 })
        ));
    }

    #[test]
    fn pullup_resistor_only_counts_on_ultraplus() {
        let mut a = ctx();
        let mut b = ctx();
        place(&mut a, "p", "X0/Y1/io0", CellKind::Io(IoParams {
            pullup_resistor: iceasc_netlist::PullupResistor::R10k,
            ..IoParams::default()
        }));
        place(&mut b, "p", "X0/Y1/io0", CellKind::Io(IoParams::default()));
        assert_eq!(compare_netlists(&a, &b), Ok(()));
    }
}

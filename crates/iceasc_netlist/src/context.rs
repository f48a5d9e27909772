//! The netlist context: arenas of cells and nets bound to a chip database.

use crate::cell::{Cell, CellKind, Port};
use crate::error::NetlistError;
use crate::ids::{CellId, NetId};
use crate::net::{Net, NetWire, PortRef};
use iceasc_arch::{BelId, ChipArgs, ChipDb, PinDir, PipId, WireId, WireKind};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A placed and routed netlist for one device.
///
/// Cells and nets live in arenas addressed by [`CellId`] and [`NetId`].
/// Placement and routing are mirrored in reverse maps so a bel, wire or pip
/// can be asked for its owner; the context keeps both directions in step.
#[derive(Debug, Clone)]
pub struct Context {
    chip: ChipArgs,
    db: Arc<ChipDb>,
    cells: Vec<Cell>,
    nets: Vec<Net>,
    cell_by_name: HashMap<String, CellId>,
    net_by_name: HashMap<String, NetId>,
    bel_to_cell: HashMap<BelId, CellId>,
    wire_to_net: HashMap<WireId, NetId>,
    pip_to_net: HashMap<PipId, NetId>,
}

impl Context {
    /// Creates an empty netlist for `chip`.
    pub fn new(chip: ChipArgs) -> Result<Self, NetlistError> {
        let db = ChipDb::for_family(chip.family())?;
        Ok(Self {
            chip,
            db,
            cells: Vec::new(),
            nets: Vec::new(),
            cell_by_name: HashMap::new(),
            net_by_name: HashMap::new(),
            bel_to_cell: HashMap::new(),
            wire_to_net: HashMap::new(),
            pip_to_net: HashMap::new(),
        })
    }

    /// The target device.
    pub fn chip(&self) -> &ChipArgs {
        &self.chip
    }

    /// The chip database.
    pub fn db(&self) -> &ChipDb {
        &self.db
    }

    /// Removes every cell and net, keeping the device.
    pub fn clear_netlist(&mut self) {
        self.cells.clear();
        self.nets.clear();
        self.cell_by_name.clear();
        self.net_by_name.clear();
        self.bel_to_cell.clear();
        self.wire_to_net.clear();
        self.pip_to_net.clear();
    }

    // --- cells ---

    /// Adds an unplaced cell.
    pub fn add_cell(&mut self, name: impl Into<String>, kind: CellKind) -> Result<CellId, NetlistError> {
        let name = name.into();
        if self.cell_by_name.contains_key(&name) {
            return Err(NetlistError::DuplicateCell(name));
        }
        let id = CellId::from_raw(self.cells.len() as u32);
        self.cell_by_name.insert(name.clone(), id);
        self.cells.push(Cell {
            name,
            kind,
            bel: None,
            attrs: BTreeMap::new(),
            ports: BTreeMap::new(),
        });
        Ok(id)
    }

    /// The cell with the given ID.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    /// Mutable access to a cell's kind and attributes.
    ///
    /// Placement and connectivity must go through [`Context::bind_bel`] and
    /// [`Context::connect_port`].
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.index()]
    }

    /// All cells with their IDs.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (CellId::from_raw(i as u32), c))
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Looks up a cell by name.
    pub fn find_cell(&self, name: &str) -> Option<CellId> {
        self.cell_by_name.get(name).copied()
    }

    /// The cell placed on `bel`.
    pub fn bel_cell(&self, bel: BelId) -> Option<CellId> {
        self.bel_to_cell.get(&bel).copied()
    }

    /// Places a cell, moving it if it was already placed.
    pub fn bind_bel(&mut self, cell: CellId, bel: BelId) -> Result<(), NetlistError> {
        let info = self.db.bel(bel);
        let c = &self.cells[cell.index()];
        if c.kind.bel_kind() != info.kind {
            return Err(NetlistError::BelKindMismatch {
                cell: c.name.clone(),
                cell_type: c.kind.type_name(),
                bel: info.name.clone(),
            });
        }
        if let Some(&other) = self.bel_to_cell.get(&bel) {
            if other != cell {
                return Err(NetlistError::BelOccupied {
                    bel: info.name.clone(),
                    cell: self.cells[other.index()].name.clone(),
                });
            }
        }
        if let Some(old) = c.bel {
            self.bel_to_cell.remove(&old);
        }
        self.bel_to_cell.insert(bel, cell);
        self.cells[cell.index()].bel = Some(bel);
        Ok(())
    }

    // --- nets ---

    /// Adds an empty net.
    pub fn add_net(&mut self, name: impl Into<String>) -> Result<NetId, NetlistError> {
        let name = name.into();
        if self.net_by_name.contains_key(&name) {
            return Err(NetlistError::DuplicateNet(name));
        }
        let id = NetId::from_raw(self.nets.len() as u32);
        self.net_by_name.insert(name.clone(), id);
        self.nets.push(Net::new(name));
        Ok(id)
    }

    /// The net with the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    /// All nets with their IDs.
    pub fn nets(&self) -> impl Iterator<Item = (NetId, &Net)> {
        self.nets
            .iter()
            .enumerate()
            .map(|(i, n)| (NetId::from_raw(i as u32), n))
    }

    /// Number of nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Looks up a net by name.
    pub fn find_net(&self, name: &str) -> Option<NetId> {
        self.net_by_name.get(name).copied()
    }

    /// Renames a net.
    pub fn rename_net(&mut self, net: NetId, name: impl Into<String>) -> Result<(), NetlistError> {
        let name = name.into();
        if self.net_by_name.get(&name).is_some_and(|&n| n != net) {
            return Err(NetlistError::DuplicateNet(name));
        }
        let old = std::mem::replace(&mut self.nets[net.index()].name, name.clone());
        self.net_by_name.remove(&old);
        self.net_by_name.insert(name, net);
        Ok(())
    }

    /// Marks a net as carrying the implicit logic-cell constant.
    pub fn set_net_constant(&mut self, net: NetId, constant: bool) {
        self.nets[net.index()].constant = constant;
    }

    /// Connects a cell port to a net.
    ///
    /// The direction comes from the port's pin on the cell kind's bel: an
    /// output becomes the net's driver, an input one of its users.
    pub fn connect_port(&mut self, cell: CellId, port: &str, net: NetId) -> Result<(), NetlistError> {
        let c = &self.cells[cell.index()];
        let dir = c
            .kind
            .bel_kind()
            .pin_dir(port)
            .ok_or_else(|| NetlistError::UnknownPort {
                cell: c.name.clone(),
                port: port.to_string(),
            })?;
        if c.ports.get(port).is_some_and(|p| p.net.is_some()) {
            return Err(NetlistError::PortConnected {
                cell: c.name.clone(),
                port: port.to_string(),
            });
        }
        let port_ref = PortRef {
            cell,
            port: port.to_string(),
        };
        let n = &mut self.nets[net.index()];
        match dir {
            PinDir::Output => {
                if n.driver.is_some() {
                    return Err(NetlistError::MultipleDrivers {
                        net: n.name.clone(),
                    });
                }
                n.driver = Some(port_ref);
            }
            PinDir::Input => n.users.push(port_ref),
        }
        self.cells[cell.index()]
            .ports
            .insert(port.to_string(), Port { dir, net: Some(net) });
        Ok(())
    }

    // --- routing ---

    /// Binds a wire to a net, optionally with the pip driving it.
    pub fn bind_wire(&mut self, net: NetId, wire: WireId, pip: Option<PipId>) -> Result<(), NetlistError> {
        if let Some(&owner) = self.wire_to_net.get(&wire) {
            if owner != net {
                return Err(NetlistError::WireBound {
                    wire: self.db.wire_name(wire),
                    net: self.nets[owner.index()].name.clone(),
                });
            }
        }
        if let Some(pip) = pip {
            if self.db.pip(pip).dst != wire {
                return Err(NetlistError::PipMismatch {
                    pip: self.db.pip_name(pip),
                    wire: self.db.wire_name(wire),
                });
            }
            if let Some(&owner) = self.pip_to_net.get(&pip) {
                if owner != net {
                    return Err(NetlistError::PipBound {
                        pip: self.db.pip_name(pip),
                        net: self.nets[owner.index()].name.clone(),
                    });
                }
            }
        }
        let previous = self.nets[net.index()]
            .wires
            .insert(wire, NetWire { wire, pip });
        if let Some(old) = previous.and_then(|w| w.pip) {
            self.pip_to_net.remove(&old);
        }
        if let Some(pip) = pip {
            self.pip_to_net.insert(pip, net);
        }
        self.wire_to_net.insert(wire, net);
        Ok(())
    }

    /// Binds `pip` and its destination wire to `net`.
    pub fn bind_pip(&mut self, net: NetId, pip: PipId) -> Result<(), NetlistError> {
        let dst = self.db.pip(pip).dst;
        self.bind_wire(net, dst, Some(pip))
    }

    /// The net a wire is bound to.
    pub fn wire_net(&self, wire: WireId) -> Option<NetId> {
        self.wire_to_net.get(&wire).copied()
    }

    /// The net a pip is bound to.
    pub fn pip_net(&self, pip: PipId) -> Option<NetId> {
        self.pip_to_net.get(&pip).copied()
    }

    /// Whether `wire` identifies the same net across two reconstructions of
    /// one configuration.
    ///
    /// LUT input wires behind the fixed input pips are only bound when a
    /// configured cell reads them, so they may appear in one netlist and not
    /// in the other.
    pub fn is_identity_reliable(&self, wire: WireId) -> bool {
        self.db.wire_kind(wire) != WireKind::LutffInLut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::LcParams;
    use iceasc_arch::Chip;

    fn ctx() -> Context {
        Context::new(ChipArgs::new(Chip::Hx1k, "tq144").unwrap()).unwrap()
    }

    fn lut(ctx: &mut Context, name: &str, bel: &str) -> CellId {
        let kind = CellKind::Lc(LcParams {
            lut_init: 0x00ff,
            ..LcParams::default()
        });
        let cell = ctx.add_cell(name, kind).unwrap();
        let bel = ctx.db().find_bel(bel).unwrap();
        ctx.bind_bel(cell, bel).unwrap();
        cell
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut ctx = ctx();
        ctx.add_cell("a", CellKind::Gb).unwrap();
        assert!(matches!(ctx.add_cell("a", CellKind::Gb), Err(NetlistError::DuplicateCell(_))));
        ctx.add_net("n").unwrap();
        assert!(matches!(ctx.add_net("n"), Err(NetlistError::DuplicateNet(_))));
    }

    #[test]
    fn bel_binding_checks_kind_and_occupancy() {
        let mut ctx = ctx();
        let a = lut(&mut ctx, "a", "X1/Y1/lc0");
        let b = ctx.add_cell("b", CellKind::Lc(LcParams::default())).unwrap();
        let bel = ctx.db().find_bel("X1/Y1/lc0").unwrap();
        assert!(matches!(ctx.bind_bel(b, bel), Err(NetlistError::BelOccupied { .. })));
        assert_eq!(ctx.bel_cell(bel), Some(a));

        let io = ctx.db().find_bel("X0/Y1/io0").unwrap();
        assert!(matches!(ctx.bind_bel(b, io), Err(NetlistError::BelKindMismatch { .. })));

        let other = ctx.db().find_bel("X1/Y1/lc1").unwrap();
        ctx.bind_bel(a, other).unwrap();
        assert_eq!(ctx.bel_cell(bel), None);
        assert_eq!(ctx.bel_cell(other), Some(a));
    }

    #[test]
    fn ports_follow_pin_directions() {
        let mut ctx = ctx();
        let a = lut(&mut ctx, "a", "X1/Y1/lc0");
        let b = lut(&mut ctx, "b", "X1/Y1/lc1");
        let n = ctx.add_net("n").unwrap();
        ctx.connect_port(a, "O", n).unwrap();
        ctx.connect_port(b, "I2", n).unwrap();
        let net = ctx.net(n);
        assert_eq!(net.driver.as_ref().map(|d| d.cell), Some(a));
        assert_eq!(net.users.len(), 1);
        assert!(matches!(ctx.connect_port(b, "O", n), Err(NetlistError::MultipleDrivers { .. })));
        assert!(matches!(ctx.connect_port(b, "I2", n), Err(NetlistError::PortConnected { .. })));
        assert!(matches!(ctx.connect_port(b, "Q", n), Err(NetlistError::UnknownPort { .. })));
    }

    #[test]
    fn wire_binding_keeps_reverse_maps() {
        let mut ctx = ctx();
        let n = ctx.add_net("n").unwrap();
        let m = ctx.add_net("m").unwrap();
        let out = ctx.db().find_wire("X1/Y1/lutff_0/out").unwrap();
        let pip = ctx.db().find_pip("X1/Y1/lutff_0/out.->X1/Y1/local_g0_0").unwrap();
        ctx.bind_wire(n, out, None).unwrap();
        ctx.bind_pip(n, pip).unwrap();
        let local = ctx.db().pip(pip).dst;
        assert_eq!(ctx.wire_net(local), Some(n));
        assert_eq!(ctx.pip_net(pip), Some(n));
        assert!(matches!(ctx.bind_wire(m, out, None), Err(NetlistError::WireBound { .. })));
        assert!(matches!(ctx.bind_wire(m, out, Some(pip)), Err(NetlistError::WireBound { .. })));
        let other = ctx.db().find_wire("X1/Y1/local_g1_0").unwrap();
        assert!(matches!(ctx.bind_wire(m, other, Some(pip)), Err(NetlistError::PipMismatch { .. })));
    }

    #[test]
    fn rename_and_clear() {
        let mut ctx = ctx();
        let n = ctx.add_net("n").unwrap();
        ctx.add_net("taken").unwrap();
        assert!(ctx.rename_net(n, "taken").is_err());
        ctx.rename_net(n, "clk").unwrap();
        assert_eq!(ctx.find_net("clk"), Some(n));
        assert_eq!(ctx.find_net("n"), None);
        ctx.clear_netlist();
        assert_eq!(ctx.net_count(), 0);
        assert_eq!(ctx.find_net("clk"), None);
    }

    #[test]
    fn identity_reliability() {
        let ctx = ctx();
        let lut_in = ctx.db().find_wire("X1/Y1/lutff_0/in_1_lut").unwrap();
        let input = ctx.db().find_wire("X1/Y1/lutff_0/in_1").unwrap();
        assert!(!ctx.is_identity_reliable(lut_in));
        assert!(ctx.is_identity_reliable(input));
    }
}

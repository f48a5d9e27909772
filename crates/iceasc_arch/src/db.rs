//! The chip database: every wire, pip and bel of a family.
//!
//! The database is generated procedurally from the tile grid. It is built
//! once per family and shared read-only behind an [`Arc`]; see
//! [`ChipDb::for_family`].

use crate::bel::{pin_specs, BelInfo, BelKind, BelPin, PinWire};
use crate::chip::Family;
use crate::error::ArchError;
use crate::ids::{BelId, PipId, WireId};
use crate::layout::{self, BelLayout};
use crate::pip::{select_width, ConfigBit, PipControl, PipInfo, PIP_SEPARATOR};
use crate::tile::{Grid, TileType};
use crate::wire::{format_wire_name, split_wire_name, WireInfo, WireKind};
use iceasc_common::{IceResult, Ident, Interner, InternalError, NameTable};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Read-only routing and placement database for one family.
#[derive(Debug)]
pub struct ChipDb {
    grid: Grid,
    names: NameTable,
    wires: Vec<WireInfo>,
    wire_index: HashMap<(u32, u32, Ident), WireId>,
    uphill: Vec<Vec<PipId>>,
    downhill: Vec<Vec<PipId>>,
    pips: Vec<PipInfo>,
    bels: Vec<BelInfo>,
    bel_index: HashMap<String, BelId>,
    tile_bels: HashMap<(u32, u32), Vec<BelId>>,
    wire_pins: HashMap<WireId, Vec<(BelId, usize)>>,
}

static CACHE: OnceLock<Mutex<HashMap<Family, Arc<ChipDb>>>> = OnceLock::new();

impl ChipDb {
    /// Returns the shared database for `family`, building it on first use.
    pub fn for_family(family: Family) -> IceResult<Arc<ChipDb>> {
        let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(db) = cache.get(&family) {
            return Ok(Arc::clone(db));
        }
        let db = Arc::new(ChipDb::build(family)?);
        cache.insert(family, Arc::clone(&db));
        Ok(db)
    }

    /// Builds a fresh database for `family` without caching it.
    pub fn build(family: Family) -> IceResult<ChipDb> {
        let mut builder = Builder::new(family);
        builder.add_wires();
        builder.add_pips();
        builder.add_bels()?;
        Ok(builder.finish())
    }

    /// The family this database describes.
    pub fn family(&self) -> Family {
        self.grid.family()
    }

    /// The tile grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Tile type at (x, y).
    pub fn tile_type(&self, x: u32, y: u32) -> Option<TileType> {
        self.grid.tile_type(x, y)
    }

    // --- wires ---

    /// Number of wires.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Iterates over all wire IDs.
    pub fn wire_ids(&self) -> impl Iterator<Item = WireId> {
        (0..self.wires.len() as u32).map(WireId::from_raw)
    }

    /// The record of a wire.
    pub fn wire(&self, wire: WireId) -> &WireInfo {
        &self.wires[wire.index()]
    }

    /// The type tag of a wire.
    pub fn wire_kind(&self, wire: WireId) -> WireKind {
        self.wires[wire.index()].kind
    }

    /// Tile-local part of a wire name.
    pub fn wire_local_name(&self, wire: WireId) -> &str {
        self.names.resolve(self.wires[wire.index()].name)
    }

    /// Full wire name, `X{x}/Y{y}/{local}`.
    pub fn wire_name(&self, wire: WireId) -> String {
        let info = &self.wires[wire.index()];
        format_wire_name(info.x, info.y, self.names.resolve(info.name))
    }

    /// Looks up a wire by tile and local name.
    pub fn wire_at(&self, x: u32, y: u32, local: &str) -> Option<WireId> {
        let name = self.names.get(local)?;
        self.wire_index.get(&(x, y, name)).copied()
    }

    /// Looks up a wire by full name.
    pub fn find_wire(&self, name: &str) -> Result<WireId, ArchError> {
        split_wire_name(name)
            .and_then(|(x, y, local)| self.wire_at(x, y, local))
            .ok_or_else(|| ArchError::UnknownWire(name.to_string()))
    }

    // --- pips ---

    /// Number of pips.
    pub fn pip_count(&self) -> usize {
        self.pips.len()
    }

    /// Iterates over all pip IDs.
    pub fn pip_ids(&self) -> impl Iterator<Item = PipId> {
        (0..self.pips.len() as u32).map(PipId::from_raw)
    }

    /// The record of a pip.
    pub fn pip(&self, pip: PipId) -> &PipInfo {
        &self.pips[pip.index()]
    }

    /// Pips driving `wire`.
    pub fn pips_uphill(&self, wire: WireId) -> &[PipId] {
        &self.uphill[wire.index()]
    }

    /// Pips driven by `wire`.
    pub fn pips_downhill(&self, wire: WireId) -> &[PipId] {
        &self.downhill[wire.index()]
    }

    /// The pip from `src` to `dst`, if there is one.
    pub fn pip_between(&self, src: WireId, dst: WireId) -> Option<PipId> {
        self.pips_uphill(dst)
            .iter()
            .copied()
            .find(|&p| self.pips[p.index()].src == src)
    }

    /// Full pip name, `<src>.-><dst>`.
    pub fn pip_name(&self, pip: PipId) -> String {
        let info = &self.pips[pip.index()];
        format!(
            "{}{PIP_SEPARATOR}{}",
            self.wire_name(info.src),
            self.wire_name(info.dst)
        )
    }

    /// Looks up a pip by full name.
    pub fn find_pip(&self, name: &str) -> Result<PipId, ArchError> {
        let unknown = || ArchError::UnknownPip(name.to_string());
        let (src, dst) = name.split_once(PIP_SEPARATOR).ok_or_else(unknown)?;
        let src = self.find_wire(src).map_err(|_| unknown())?;
        let dst = self.find_wire(dst).map_err(|_| unknown())?;
        self.pip_between(src, dst).ok_or_else(unknown)
    }

    /// The control bits that must hold for `pip` to be on. Empty for fixed
    /// pips.
    pub fn pip_bits(&self, pip: PipId) -> Vec<ConfigBit> {
        let info = &self.pips[pip.index()];
        let dst = &self.wires[info.dst.index()];
        info.control
            .map(|c| c.bits(dst.x, dst.y))
            .unwrap_or_default()
    }

    // --- bels ---

    /// Number of bels.
    pub fn bel_count(&self) -> usize {
        self.bels.len()
    }

    /// Iterates over all bel IDs.
    pub fn bel_ids(&self) -> impl Iterator<Item = BelId> {
        (0..self.bels.len() as u32).map(BelId::from_raw)
    }

    /// The record of a bel.
    pub fn bel(&self, bel: BelId) -> &BelInfo {
        &self.bels[bel.index()]
    }

    /// Looks up a bel by full name.
    pub fn find_bel(&self, name: &str) -> Result<BelId, ArchError> {
        self.bel_index
            .get(name)
            .copied()
            .ok_or_else(|| ArchError::UnknownBel(name.to_string()))
    }

    /// Bels located in tile (x, y).
    pub fn bels_at(&self, x: u32, y: u32) -> &[BelId] {
        self.tile_bels.get(&(x, y)).map_or(&[][..], Vec::as_slice)
    }

    /// Name of a bel pin.
    pub fn pin_name(&self, pin: &BelPin) -> &str {
        self.names.resolve(pin.name)
    }

    /// The wire under a named pin of `bel`.
    pub fn bel_pin_wire(&self, bel: BelId, pin: &str) -> Option<WireId> {
        self.bels[bel.index()]
            .pins
            .iter()
            .find(|p| self.names.resolve(p.name) == pin)
            .map(|p| p.wire)
    }

    /// Bel pins attached to `wire`.
    pub fn wire_bel_pins(&self, wire: WireId) -> impl Iterator<Item = (BelId, &BelPin)> + '_ {
        self.wire_pins
            .get(&wire)
            .into_iter()
            .flatten()
            .map(|&(bel, index)| (bel, &self.bels[bel.index()].pins[index]))
    }

    /// Configuration fields of `bel`.
    pub fn bel_layout(&self, bel: BelId) -> BelLayout {
        layout::bel_layout(self.family(), &self.bels[bel.index()])
    }
}

/// Tile-local wire table of a tile type.
fn tile_wires(tile: TileType, pll_host: bool) -> Vec<(String, WireKind)> {
    let mut wires = Vec::new();
    for g in 0..2 {
        for k in 0..8 {
            wires.push((format!("local_g{g}_{k}"), WireKind::Local));
        }
    }
    for dir in ["h", "v"] {
        for k in 0..8 {
            wires.push((format!("span4_{dir}_{k}"), WireKind::Span));
        }
    }
    let pin = |name: String| (name, WireKind::BelPin);
    match tile {
        TileType::Logic | TileType::Dsp0 | TileType::Dsp1 | TileType::Dsp2 | TileType::Dsp3 => {
            let logic = tile == TileType::Logic;
            for z in 0..8 {
                for j in 0..4 {
                    wires.push((format!("lutff_{z}/in_{j}"), WireKind::LutffIn));
                    if logic {
                        wires.push((format!("lutff_{z}/in_{j}_lut"), WireKind::LutffInLut));
                    }
                }
                wires.push((format!("lutff_{z}/out"), WireKind::LutffOut));
                if logic {
                    wires.push((format!("lutff_{z}/cout"), WireKind::LutffCout));
                }
            }
            if logic {
                wires.push(("carry_in_mux".to_string(), WireKind::CarryIn));
            }
            for g in ["clk", "cen", "s_r"] {
                wires.push((format!("lutff_global/{g}"), WireKind::Clock));
            }
        }
        TileType::Io => {
            for z in 0..2 {
                for p in ["D_IN_0", "D_IN_1", "D_OUT_0", "D_OUT_1", "OUT_ENB"] {
                    wires.push(pin(format!("io_{z}/{p}")));
                }
            }
            for g in ["inclk", "outclk", "cen"] {
                wires.push((format!("io_global/{g}"), WireKind::Clock));
            }
            wires.push(("fabout".to_string(), WireKind::General));
            if pll_host {
                for p in ["referenceclk", "resetb", "bypass", "outcorea", "lock"] {
                    wires.push(pin(format!("pll/{p}")));
                }
            }
        }
        TileType::RamBottom | TileType::RamTop => {
            let top = tile == TileType::RamTop;
            let base = if top { 8 } else { 0 };
            for n in base..base + 8 {
                wires.push(pin(format!("ram/RDATA_{n}")));
            }
            for input in ram_inputs(top) {
                wires.push(pin(format!("ram/{input}")));
            }
            let clock = if top { "ram/RCLK" } else { "ram/WCLK" };
            wires.push((clock.to_string(), WireKind::Clock));
        }
        TileType::IpCon => {
            for n in 0..5 {
                wires.push(pin(format!("ip/in_{n}")));
            }
            wires.push(pin("ip/out_0".to_string()));
        }
    }
    wires
}

/// Routed data inputs of a RAM half, in mux order.
fn ram_inputs(top: bool) -> Vec<String> {
    let mut inputs = Vec::new();
    let (data, addr, enable, clock_enable) = if top {
        (8..16, "RADDR", "RE", "RCLKE")
    } else {
        (0..8, "WADDR", "WE", "WCLKE")
    };
    for n in data {
        inputs.push(format!("WDATA_{n}"));
    }
    for n in 0..11 {
        inputs.push(format!("{addr}_{n}"));
    }
    inputs.push(enable.to_string());
    inputs.push(clock_enable.to_string());
    inputs
}

struct Builder {
    grid: Grid,
    interner: Interner,
    wires: Vec<WireInfo>,
    wire_index: HashMap<(u32, u32, Ident), WireId>,
    pips: Vec<PipInfo>,
    uphill: Vec<Vec<PipId>>,
    downhill: Vec<Vec<PipId>>,
    bels: Vec<BelInfo>,
    bel_index: HashMap<String, BelId>,
    tile_bels: HashMap<(u32, u32), Vec<BelId>>,
    wire_pins: HashMap<WireId, Vec<(BelId, usize)>>,
}

impl Builder {
    fn new(family: Family) -> Self {
        Self {
            grid: Grid::new(family),
            interner: Interner::new(),
            wires: Vec::new(),
            wire_index: HashMap::new(),
            pips: Vec::new(),
            uphill: Vec::new(),
            downhill: Vec::new(),
            bels: Vec::new(),
            bel_index: HashMap::new(),
            tile_bels: HashMap::new(),
            wire_pins: HashMap::new(),
        }
    }

    fn finish(self) -> ChipDb {
        ChipDb {
            grid: self.grid,
            names: self.interner.freeze(),
            wires: self.wires,
            wire_index: self.wire_index,
            uphill: self.uphill,
            downhill: self.downhill,
            pips: self.pips,
            bels: self.bels,
            bel_index: self.bel_index,
            tile_bels: self.tile_bels,
            wire_pins: self.wire_pins,
        }
    }

    fn add_wire(&mut self, x: u32, y: u32, local: &str, kind: WireKind) {
        let name = self.interner.get_or_intern(local);
        let id = WireId::from_raw(self.wires.len() as u32);
        self.wires.push(WireInfo { x, y, name, kind });
        self.wire_index.insert((x, y, name), id);
        self.uphill.push(Vec::new());
        self.downhill.push(Vec::new());
    }

    fn wire(&self, x: u32, y: u32, local: &str) -> Option<WireId> {
        let name = self.interner.get(local)?;
        self.wire_index.get(&(x, y, name)).copied()
    }

    fn neighbour(&self, x: u32, y: u32, dx: i32, dy: i32) -> Option<(u32, u32)> {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        self.grid.tile_type(nx, ny).map(|_| (nx, ny))
    }

    /// The wire fed into neighbouring local tracks as "output k" of a tile.
    fn out_wire(&self, x: u32, y: u32, k: u32) -> Option<WireId> {
        let local = match self.grid.tile_type(x, y)? {
            TileType::Logic | TileType::Dsp0 | TileType::Dsp1 | TileType::Dsp2 | TileType::Dsp3 => {
                format!("lutff_{k}/out")
            }
            TileType::Io => format!("io_{}/D_IN_{}", k % 2, (k / 2) % 2),
            TileType::RamBottom => format!("ram/RDATA_{k}"),
            TileType::RamTop => format!("ram/RDATA_{}", 8 + k),
            TileType::IpCon if k == 0 => "ip/out_0".to_string(),
            TileType::IpCon => return None,
        };
        self.wire(x, y, &local)
    }

    fn global(&self, n: u32) -> Option<WireId> {
        self.wire(0, 0, &format!("glb_netwk_{n}"))
    }

    fn add_pip(&mut self, src: WireId, dst: WireId, control: Option<PipControl>) {
        let id = PipId::from_raw(self.pips.len() as u32);
        self.pips.push(PipInfo { src, dst, control });
        self.uphill[dst.index()].push(id);
        self.downhill[src.index()].push(id);
    }

    /// Adds one pip per present candidate; absent candidates keep their
    /// select code unused.
    fn add_mux(&mut self, dst: Option<WireId>, row: u8, col: u8, candidates: &[Option<WireId>]) {
        let Some(dst) = dst else { return };
        let sel_bits = select_width(candidates.len());
        for (index, src) in candidates.iter().enumerate() {
            if let Some(src) = *src {
                let control = PipControl {
                    row,
                    col,
                    sel_bits,
                    index: index as u8,
                };
                self.add_pip(src, dst, Some(control));
            }
        }
    }

    fn add_wires(&mut self) {
        for n in 0..8 {
            self.add_wire(0, 0, &format!("glb_netwk_{n}"), WireKind::Global);
        }
        let pll = self.grid.pll_tile();
        let tiles: Vec<_> = self.grid.tiles().collect();
        for (x, y, tile) in tiles {
            for (local, kind) in tile_wires(tile, pll == Some((x, y))) {
                self.add_wire(x, y, &local, kind);
            }
        }
    }

    fn add_pips(&mut self) {
        let tiles: Vec<_> = self.grid.tiles().collect();
        for (x, y, tile) in tiles {
            self.add_routing_pips(x, y, tile);
            match tile {
                TileType::Logic | TileType::Dsp0 | TileType::Dsp1 | TileType::Dsp2 | TileType::Dsp3 => {
                    self.add_lutff_pips(x, y, tile == TileType::Logic)
                }
                TileType::Io => self.add_io_pips(x, y),
                TileType::RamBottom | TileType::RamTop => {
                    self.add_ram_pips(x, y, tile == TileType::RamTop)
                }
                TileType::IpCon => self.add_ip_pips(x, y),
            }
        }
    }

    fn locals(&self, x: u32, y: u32, group: u32) -> Vec<Option<WireId>> {
        (0..8)
            .map(|k| self.wire(x, y, &format!("local_g{group}_{k}")))
            .collect()
    }

    fn neighbour_out(&self, x: u32, y: u32, dx: i32, dy: i32, k: u32) -> Option<WireId> {
        let (nx, ny) = self.neighbour(x, y, dx, dy)?;
        self.out_wire(nx, ny, k)
    }

    fn add_routing_pips(&mut self, x: u32, y: u32, tile: TileType) {
        let (local_col, span_col) = if tile == TileType::Io {
            (layout::IO_LOCAL_COL, layout::IO_SPAN_COL)
        } else {
            (layout::LOCAL_COL, layout::SPAN_COL)
        };
        let above_pll = self.grid.pll_tile().map(|(px, py)| (px, py + 1)) == Some((x, y));
        for k in 0..8u32 {
            let span_h = self.wire(x, y, &format!("span4_h_{k}"));
            let span_v = self.wire(x, y, &format!("span4_v_{k}"));
            let extra = if above_pll && k < 2 {
                let pin = if k == 0 { "pll/outcorea" } else { "pll/lock" };
                self.wire(x, y - 1, pin)
            } else {
                self.wire(x, y, &format!("span4_h_{}", (k + 4) % 8))
            };
            let candidates = [
                span_h,
                span_v,
                self.out_wire(x, y, k),
                self.neighbour_out(x, y, -1, 0, k),
                self.neighbour_out(x, y, 1, 0, k),
                self.neighbour_out(x, y, 0, -1, k),
                self.neighbour_out(x, y, 0, 1, k),
                extra,
            ];
            for g in 0..2u32 {
                let dst = self.wire(x, y, &format!("local_g{g}_{k}"));
                self.add_mux(dst, (g * 8 + k) as u8, local_col, &candidates);
            }

            let span_at = |b: &Self, dx: i32, dy: i32, dir: &str| {
                b.neighbour(x, y, dx, dy)
                    .and_then(|(nx, ny)| b.wire(nx, ny, &format!("span4_{dir}_{k}")))
            };
            let h_candidates = [
                span_at(self, -1, 0, "h"),
                span_at(self, 1, 0, "h"),
                span_v,
                self.out_wire(x, y, k),
            ];
            self.add_mux(span_h, k as u8, span_col, &h_candidates);
            let v_candidates = [
                span_at(self, 0, -1, "v"),
                span_at(self, 0, 1, "v"),
                span_h,
                self.out_wire(x, y, k),
            ];
            self.add_mux(span_v, (8 + k) as u8, span_col, &v_candidates);
        }
    }

    /// Candidates of a clock-enable (`odd` globals) or set/reset (even
    /// globals) mux.
    fn control_candidates(&self, x: u32, y: u32, odd: bool) -> Vec<Option<WireId>> {
        let first = if odd { 1 } else { 0 };
        let local_base = if odd { 4 } else { 6 };
        let mut candidates: Vec<_> = (0..4).map(|i| self.global(first + 2 * i)).collect();
        for g in 0..2 {
            for k in local_base..local_base + 2 {
                candidates.push(self.wire(x, y, &format!("local_g{g}_{k}")));
            }
        }
        candidates
    }

    fn clock_candidates(&self) -> Vec<Option<WireId>> {
        (0..8).map(|n| self.global(n)).collect()
    }

    fn add_lutff_pips(&mut self, x: u32, y: u32, logic: bool) {
        for z in 0..8u32 {
            for j in 0..4u32 {
                let dst = self.wire(x, y, &format!("lutff_{z}/in_{j}"));
                let candidates = self.locals(x, y, (z + j) % 2);
                let row = (2 * z + j / 2) as u8;
                let col = layout::LC_INPUT_COL + (j % 2) as u8 * 4;
                self.add_mux(dst, row, col, &candidates);
                if logic {
                    let lut = self.wire(x, y, &format!("lutff_{z}/in_{j}_lut"));
                    if let (Some(src), Some(lut)) = (dst, lut) {
                        self.add_pip(src, lut, None);
                    }
                }
            }
        }
        let clocks = self.clock_candidates();
        let cen = self.control_candidates(x, y, true);
        let sr = self.control_candidates(x, y, false);
        let col = layout::GLOBAL_MUX_COL;
        self.add_mux(self.wire(x, y, "lutff_global/clk"), 0, col, &clocks);
        self.add_mux(self.wire(x, y, "lutff_global/cen"), 1, col, &cen);
        self.add_mux(self.wire(x, y, "lutff_global/s_r"), 2, col, &sr);

        if logic && y > 0 && self.grid.tile_type(x, y - 1) == Some(TileType::Logic) {
            let src = self.wire(x, y - 1, "lutff_7/cout");
            let (row, col) = layout::CARRY_PIP;
            self.add_mux(self.wire(x, y, "carry_in_mux"), row, col, &[src]);
        }
    }

    fn add_io_pips(&mut self, x: u32, y: u32) {
        let col = layout::IO_PIN_COL;
        for z in 0..2u32 {
            for (offset, pin) in ["D_OUT_0", "D_OUT_1", "OUT_ENB"].into_iter().enumerate() {
                let row = (8 * z) as u8 + offset as u8;
                let candidates = self.locals(x, y, row as u32 % 2);
                self.add_mux(self.wire(x, y, &format!("io_{z}/{pin}")), row, col, &candidates);
            }
        }
        let global_col = layout::IO_GLOBAL_COL;
        let clocks = self.clock_candidates();
        let cen = self.control_candidates(x, y, true);
        let fabric = self.locals(x, y, 0);
        self.add_mux(self.wire(x, y, "io_global/inclk"), 0, global_col, &clocks);
        self.add_mux(self.wire(x, y, "io_global/outclk"), 1, global_col, &clocks);
        self.add_mux(self.wire(x, y, "io_global/cen"), 2, global_col, &cen);
        self.add_mux(self.wire(x, y, "fabout"), 3, global_col, &fabric);

        if self.grid.pll_tile() == Some((x, y)) {
            for (row, pin) in [(5u8, "referenceclk"), (6, "resetb"), (7, "bypass")] {
                let candidates = self.locals(x, y, row as u32 % 2);
                self.add_mux(self.wire(x, y, &format!("pll/{pin}")), row, col, &candidates);
            }
        }
    }

    fn add_ram_pips(&mut self, x: u32, y: u32, top: bool) {
        let clocks = self.clock_candidates();
        let clock = if top { "ram/RCLK" } else { "ram/WCLK" };
        self.add_mux(self.wire(x, y, clock), 0, layout::GLOBAL_MUX_COL, &clocks);
        for (n, input) in ram_inputs(top).into_iter().enumerate() {
            let candidates = self.locals(x, y, n as u32 % 2);
            let row = (n / 3) as u8;
            let col = layout::RAM_INPUT_COL + (n % 3) as u8 * 4;
            self.add_mux(self.wire(x, y, &format!("ram/{input}")), row, col, &candidates);
        }
    }

    fn add_ip_pips(&mut self, x: u32, y: u32) {
        for n in 0..5u32 {
            let candidates = self.locals(x, y, n % 2);
            let dst = self.wire(x, y, &format!("ip/in_{n}"));
            self.add_mux(dst, n as u8, layout::IP_INPUT_COL, &candidates);
        }
    }

    fn add_bel(&mut self, x: u32, y: u32, z: u32, kind: BelKind) -> IceResult<()> {
        let id = BelId::from_raw(self.bels.len() as u32);
        let name = format_wire_name(x, y, &kind.local_name(z));
        let mut pins = Vec::new();
        for spec in pin_specs(kind, z) {
            let wire = match &spec.wire {
                PinWire::Local { dy, name } => self.wire(x, y + dy, name),
                PinWire::Global(n) => self.global(*n),
            };
            let wire = wire.ok_or_else(|| {
                InternalError::new(format!("bel {name}: pin {} has no wire", spec.name))
            })?;
            self.wire_pins
                .entry(wire)
                .or_default()
                .push((id, pins.len()));
            pins.push(BelPin {
                name: self.interner.get_or_intern(&spec.name),
                dir: spec.dir,
                wire,
            });
        }
        self.bel_index.insert(name.clone(), id);
        self.tile_bels.entry((x, y)).or_default().push(id);
        self.bels.push(BelInfo {
            x,
            y,
            z,
            kind,
            name,
            pins,
        });
        Ok(())
    }

    fn add_bels(&mut self) -> IceResult<()> {
        let (width, height) = (self.grid.width(), self.grid.height());
        let globals = self.grid.global_buffer_tiles();
        let pll = self.grid.pll_tile();
        let ultraplus = self.grid.family() == Family::F5k;
        let tiles: Vec<_> = self.grid.tiles().collect();
        for (x, y, tile) in tiles {
            match tile {
                TileType::Logic => {
                    for z in 0..8 {
                        self.add_bel(x, y, z, BelKind::Lc)?;
                    }
                }
                TileType::Io => {
                    for z in 0..2 {
                        self.add_bel(x, y, z, BelKind::Io)?;
                    }
                    for (g, &at) in globals.iter().enumerate() {
                        if at == (x, y) {
                            self.add_bel(x, y, g as u32, BelKind::Gb)?;
                        }
                    }
                    if pll == Some((x, y)) {
                        self.add_bel(x, y, 0, BelKind::Pll)?;
                    }
                }
                TileType::RamBottom => self.add_bel(x, y, 0, BelKind::Ram)?,
                TileType::Dsp0 => self.add_bel(x, y, 0, BelKind::Dsp)?,
                TileType::IpCon if ultraplus => {
                    let kind = match (x, y) {
                        (0, _) if y == height - 2 => Some(BelKind::Hfosc),
                        (0, _) if y == height - 3 => Some(BelKind::RgbaDrv),
                        (0, _) if y == height - 4 => Some(BelKind::Warmboot),
                        _ if x == width - 1 && y == height - 2 => Some(BelKind::Lfosc),
                        _ => None,
                    };
                    if let Some(kind) = kind {
                        self.add_bel(x, y, 0, kind)?;
                    }
                }
                TileType::RamTop
                | TileType::Dsp1
                | TileType::Dsp2
                | TileType::Dsp3
                | TileType::IpCon => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{is_tile_wide, names};
    use std::collections::HashMap;

    fn db(family: Family) -> Arc<ChipDb> {
        ChipDb::for_family(family).unwrap()
    }

    #[test]
    fn cache_returns_same_instance() {
        let a = db(Family::F384);
        let b = db(Family::F384);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn wire_names_roundtrip() {
        let db = db(Family::F1k);
        let w = db.find_wire("X1/Y1/lutff_3/out").unwrap();
        assert_eq!(db.wire_name(w), "X1/Y1/lutff_3/out");
        assert_eq!(db.wire_kind(w), WireKind::LutffOut);
        assert_eq!(db.wire_local_name(w), "lutff_3/out");
        assert!(db.find_wire("X0/Y0/lutff_3/out").is_err());
        let glb = db.find_wire("X0/Y0/glb_netwk_5").unwrap();
        assert_eq!(db.wire_kind(glb), WireKind::Global);
    }

    #[test]
    fn pip_names_roundtrip() {
        let db = db(Family::F1k);
        let src = db.find_wire("X1/Y1/local_g0_2").unwrap();
        let dst = db.find_wire("X1/Y1/lutff_0/in_0").unwrap();
        let pip = db.pip_between(src, dst).unwrap();
        let name = db.pip_name(pip);
        assert_eq!(name, "X1/Y1/local_g0_2.->X1/Y1/lutff_0/in_0");
        assert_eq!(db.find_pip(&name).unwrap(), pip);
        assert!(db.find_pip("X1/Y1/local_g0_2").is_err());
    }

    #[test]
    fn fixed_lut_pips() {
        let db = db(Family::F1k);
        let src = db.find_wire("X2/Y2/lutff_5/in_3").unwrap();
        let dst = db.find_wire("X2/Y2/lutff_5/in_3_lut").unwrap();
        let pip = db.pip_between(src, dst).unwrap();
        assert!(db.pip(pip).is_fixed());
        assert!(db.pip_bits(pip).is_empty());
        assert_eq!(db.pips_uphill(dst), &[pip]);
    }

    #[test]
    fn carry_pip_crosses_tiles() {
        let db = db(Family::F1k);
        let src = db.find_wire("X1/Y1/lutff_7/cout").unwrap();
        let dst = db.find_wire("X1/Y2/carry_in_mux").unwrap();
        let pip = db.pip_between(src, dst).unwrap();
        let bits = db.pip_bits(pip);
        assert_eq!(bits.len(), 1);
        assert_eq!((bits[0].x, bits[0].y, bits[0].row, bits[0].col), (1, 2, 1, 50));
        // the bottom logic row has no cell below it
        let bottom = db.find_wire("X1/Y1/carry_in_mux").unwrap();
        assert!(db.pips_uphill(bottom).is_empty());
    }

    #[test]
    fn neighbour_outputs_reach_locals() {
        let db = db(Family::F1k);
        let src = db.find_wire("X2/Y2/lutff_3/out").unwrap();
        let dst = db.find_wire("X1/Y2/local_g1_3").unwrap();
        assert!(db.pip_between(src, dst).is_some());
        let io_out = db.find_wire("X0/Y2/io_1/D_IN_0").unwrap();
        let local = db.find_wire("X1/Y2/local_g0_1").unwrap();
        assert!(db.pip_between(io_out, local).is_some());
    }

    #[test]
    fn bels_and_pins() {
        let db = db(Family::F1k);
        let lc = db.find_bel("X1/Y1/lc0").unwrap();
        assert_eq!(db.bel(lc).kind, BelKind::Lc);
        assert_eq!(db.bels_at(1, 1).len(), 8);
        let o = db.bel_pin_wire(lc, "O").unwrap();
        assert_eq!(db.wire_name(o), "X1/Y1/lutff_0/out");
        let users: Vec<_> = db.wire_bel_pins(o).map(|(b, p)| (b, db.pin_name(p).to_string())).collect();
        assert_eq!(users, vec![(lc, "O".to_string())]);

        let ram = db.find_bel("X3/Y1/ram").unwrap();
        let raddr = db.bel_pin_wire(ram, "RADDR_0").unwrap();
        assert_eq!(db.wire_name(raddr), "X3/Y2/ram/RADDR_0");

        assert!(db.find_bel("X0/Y30/hfosc").is_err());
    }

    #[test]
    fn ultraplus_ip_bels() {
        let db = db(Family::F5k);
        for name in ["X0/Y30/hfosc", "X25/Y30/lfosc", "X0/Y28/warmboot", "X0/Y29/rgba_drv", "X0/Y5/mac16", "X13/Y0/pll"] {
            assert!(db.find_bel(name).is_ok(), "{name}");
        }
        let dsp = db.find_bel("X25/Y15/mac16").unwrap();
        let o = db.bel_pin_wire(dsp, "O_31").unwrap();
        assert_eq!(db.wire_name(o), "X25/Y18/lutff_7/out");
    }

    #[test]
    fn global_buffers_drive_networks() {
        let db = db(Family::F1k);
        let glb = db.find_wire("X0/Y0/glb_netwk_3").unwrap();
        let drivers: Vec<_> = db.wire_bel_pins(glb).collect();
        assert_eq!(drivers.len(), 1);
        assert_eq!(db.bel(drivers[0].0).kind, BelKind::Gb);
        assert!(db.pips_uphill(glb).is_empty());
    }

    /// Every configuration bit belongs to at most one mux or bel field,
    /// apart from tile-wide fields shared between slots.
    #[test]
    fn no_bit_has_two_owners() {
        for family in Family::ALL {
            let db = ChipDb::build(family).unwrap();
            let mut owners: HashMap<(u32, u32, u8, u8), String> = HashMap::new();
            let mut claim = |x: u32, y: u32, row: u8, col: u8, owner: String| {
                let tile = db.tile_type(x, y).unwrap();
                assert!((row as usize) < tile.rows() && (col as usize) < tile.cols(), "{owner} out of tile");
                if let Some(prev) = owners.insert((x, y, row, col), owner.clone()) {
                    assert_eq!(prev, owner, "bit ({x},{y}) B{row}[{col}] shared");
                }
            };
            for pip in db.pip_ids() {
                let dst = db.pip(pip).dst;
                for bit in db.pip_bits(pip) {
                    claim(bit.x, bit.y, bit.row, bit.col, format!("mux {}", db.wire_name(dst)));
                }
            }
            for bel in db.bel_ids() {
                for field in db.bel_layout(bel).fields() {
                    let owner = if is_tile_wide(field.name) {
                        format!("{} {} {}", field.name, db.bel(bel).x, db.bel(bel).y)
                    } else {
                        format!("{} {}", db.bel(bel).name, field.name)
                    };
                    for bit in &field.bits {
                        claim(bit.x, bit.y, bit.row, bit.col, owner.clone());
                    }
                }
            }
            assert!(owners.len() > 1000);
        }
    }

    #[test]
    fn lc_layout_has_lut() {
        let db = db(Family::F384);
        let lc = db.find_bel("X2/Y3/lc6").unwrap();
        let layout = db.bel_layout(lc);
        let lut = layout.field(names::LUT_INIT).unwrap();
        assert!(lut.bits.iter().all(|b| (12..14).contains(&b.row)));
    }
}

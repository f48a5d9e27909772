//! Line-level reader and validator for ASC text.
//!
//! The reader is a small state machine over trimmed, non-empty lines. A
//! directive (a line starting with `.`) closes whatever block is open and
//! may open a new one; any other line is data for the open block. The first
//! broken rule aborts reading with a [`FormatError`].

use crate::error::{CodecError, FormatError, FormatErrorKind};
use crate::lattice::BitLattice;
use iceasc_arch::{ChipArgs, ChipDb, PipId, TileType, WireId};
use iceasc_common::BitVector;
use iceasc_netlist::{RAM_INIT_WIDTH, RAM_INIT_WORDS};
use std::collections::HashSet;
use std::io::BufRead;
use std::sync::Arc;

/// Hex digits per `.ram_data` row.
const RAM_ROW_DIGITS: usize = (RAM_INIT_WIDTH / 4) as usize;

/// A `.net` record with its `.wire` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetAnnotation {
    /// Net name as written.
    pub name: String,
    /// Line of the `.net` record.
    pub line: usize,
    /// Wires with their optional uphill pip.
    pub wires: Vec<(WireId, Option<PipId>)>,
}

/// Everything a well-formed ASC text carries.
#[derive(Debug, Clone)]
pub struct AscDocument {
    /// The selected device.
    pub chip: ChipArgs,
    /// Tile bits and RAM contents.
    pub lattice: BitLattice,
    /// Net annotations, in text order.
    pub annotations: Vec<NetAnnotation>,
}

/// Result of reading a text against an expected device.
#[derive(Debug, Clone)]
pub enum ReadOutcome {
    /// The text was read completely.
    Document(AscDocument),
    /// The text targets an incompatible device; reading stopped at the
    /// `.device` line.
    WrongTarget(ChipArgs),
}

/// Reads and validates ASC text.
///
/// With `expected` set, a `.device` line naming an incompatible device ends
/// reading early with [`ReadOutcome::WrongTarget`].
pub fn read_document<R: BufRead>(
    reader: R,
    expected: Option<&ChipArgs>,
) -> Result<ReadOutcome, CodecError> {
    let mut state = Reader::new(expected);
    let mut last_line = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        last_line = index + 1;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if let Some(chip) = state.line(last_line, text)? {
            return Ok(ReadOutcome::WrongTarget(chip));
        }
    }
    state.finish(last_line + 1).map(ReadOutcome::Document)
}

/// The block the next data line belongs to.
#[derive(Debug)]
enum Block {
    Idle,
    Comment,
    Tile {
        x: u32,
        y: u32,
        tile: TileType,
        header: (usize, String),
        rows: usize,
    },
    RamData {
        x: u32,
        y: u32,
        header: (usize, String),
        rows: usize,
    },
    Net,
}

struct Device {
    chip: ChipArgs,
    db: Arc<ChipDb>,
    lattice: BitLattice,
}

struct Reader<'a> {
    expected: Option<&'a ChipArgs>,
    device: Option<Device>,
    block: Block,
    tile_seen: bool,
    tiles: HashSet<(u32, u32)>,
    ram_blocks: HashSet<(u32, u32)>,
    annotations: Vec<NetAnnotation>,
}

impl<'a> Reader<'a> {
    fn new(expected: Option<&'a ChipArgs>) -> Self {
        Self {
            expected,
            device: None,
            block: Block::Idle,
            tile_seen: false,
            tiles: HashSet::new(),
            ram_blocks: HashSet::new(),
            annotations: Vec::new(),
        }
    }

    /// Handles one line; `Some` when the text turned out to target another
    /// device.
    fn line(&mut self, line: usize, text: &str) -> Result<Option<ChipArgs>, CodecError> {
        if text.starts_with('.') {
            self.directive(line, text)
        } else {
            self.data(line, text)?;
            Ok(None)
        }
    }

    fn finish(mut self, end: usize) -> Result<AscDocument, CodecError> {
        self.close_block()?;
        let device = self
            .device
            .ok_or_else(|| FormatError::new(FormatErrorKind::NoDevice, end, ""))?;
        Ok(AscDocument {
            chip: device.chip,
            lattice: device.lattice,
            annotations: self.annotations,
        })
    }

    fn close_block(&mut self) -> Result<(), FormatError> {
        match std::mem::replace(&mut self.block, Block::Idle) {
            Block::Tile {
                tile, header, rows, ..
            } if rows < tile.rows() => {
                Err(FormatError::new(FormatErrorKind::MissingRow, header.0, &header.1))
            }
            Block::RamData { header, rows, .. } if rows < RAM_INIT_WORDS => {
                Err(FormatError::new(FormatErrorKind::MissingRow, header.0, &header.1))
            }
            _ => Ok(()),
        }
    }

    fn device(&self, line: usize, text: &str) -> Result<&Device, FormatError> {
        self.device
            .as_ref()
            .ok_or_else(|| FormatError::new(FormatErrorKind::NoDevice, line, text))
    }

    fn directive(&mut self, line: usize, text: &str) -> Result<Option<ChipArgs>, CodecError> {
        let mut parts = text.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        let err = |kind| FormatError::new(kind, line, text);

        // `.wire` continues the open net block
        if name != ".wire" || !matches!(self.block, Block::Net) {
            self.close_block()?;
        }

        match name {
            ".comment" => self.block = Block::Comment,
            ".sym" => {}
            ".device" => return self.select_device(line, text, &args),
            ".ram_data" => {
                let (x, y) = self.coords(line, text, &args)?;
                let device = self.device(line, text)?;
                if device.lattice.grid().tile_type(x, y) != Some(TileType::RamBottom) {
                    return Err(err(FormatErrorKind::TileTypeMismatch).into());
                }
                if !self.ram_blocks.insert((x, y)) {
                    return Err(err(FormatErrorKind::DuplicateTile).into());
                }
                self.tile_seen = true;
                self.block = Block::RamData {
                    x,
                    y,
                    header: (line, text.to_string()),
                    rows: 0,
                };
            }
            ".net" => {
                self.device(line, text)?;
                let net_name = text[name.len()..].trim();
                if net_name.is_empty() {
                    return Err(err(FormatErrorKind::MissingNetName).into());
                }
                self.annotations.push(NetAnnotation {
                    name: net_name.to_string(),
                    line,
                    wires: Vec::new(),
                });
                self.block = Block::Net;
            }
            ".wire" => self.wire(line, text, &args)?,
            _ => {
                let tile = name
                    .strip_prefix('.')
                    .and_then(|n| n.strip_suffix("_tile"))
                    .and_then(TileType::from_header_kind)
                    .ok_or_else(|| err(FormatErrorKind::UnknownDirective))?;
                let (x, y) = self.coords(line, text, &args)?;
                let device = self.device(line, text)?;
                if device.lattice.grid().tile_type(x, y) != Some(tile) {
                    return Err(err(FormatErrorKind::TileTypeMismatch).into());
                }
                if !self.tiles.insert((x, y)) {
                    return Err(err(FormatErrorKind::DuplicateTile).into());
                }
                self.tile_seen = true;
                self.block = Block::Tile {
                    x,
                    y,
                    tile,
                    header: (line, text.to_string()),
                    rows: 0,
                };
            }
        }
        Ok(None)
    }

    fn select_device(
        &mut self,
        line: usize,
        text: &str,
        args: &[&str],
    ) -> Result<Option<ChipArgs>, CodecError> {
        let err = |kind| FormatError::new(kind, line, text);
        if self.tile_seen {
            return Err(err(FormatErrorKind::DeviceAfterTile).into());
        }
        if self.device.is_some() {
            return Err(err(FormatErrorKind::MultipleDevices).into());
        }
        let token = args
            .first()
            .ok_or_else(|| err(FormatErrorKind::UnknownDevice))?;
        let chip = ChipArgs::resolve(token, args.get(1).copied())
            .map_err(|_| err(FormatErrorKind::UnknownDevice))?;
        if let Some(expected) = self.expected {
            if !expected.is_compatible(&chip) {
                return Ok(Some(chip));
            }
        }
        let db = ChipDb::for_family(chip.family())?;
        let lattice = BitLattice::new(*db.grid());
        self.device = Some(Device { chip, db, lattice });
        Ok(None)
    }

    /// Parses the two tile coordinates of a header.
    fn coords(&self, line: usize, text: &str, args: &[&str]) -> Result<(u32, u32), FormatError> {
        let err = |kind| FormatError::new(kind, line, text);
        let device = self.device(line, text)?;
        if args.len() < 2 {
            return Err(err(FormatErrorKind::MissingCoord));
        }
        let mut coords = [0u32; 2];
        for (slot, arg) in coords.iter_mut().zip(args) {
            let value: i64 = arg
                .parse()
                .map_err(|_| err(FormatErrorKind::InvalidNumber))?;
            if value < 0 {
                return Err(err(FormatErrorKind::NegativeCoord));
            }
            *slot = u32::try_from(value).map_err(|_| err(FormatErrorKind::CoordOutOfRange))?;
        }
        let [x, y] = coords;
        if device.lattice.grid().tile_type(x, y).is_none() {
            return Err(err(FormatErrorKind::CoordOutOfRange));
        }
        Ok((x, y))
    }

    fn wire(&mut self, line: usize, text: &str, args: &[&str]) -> Result<(), FormatError> {
        let err = |kind| FormatError::new(kind, line, text);
        let device = self.device(line, text)?;
        if !matches!(self.block, Block::Net) {
            return Err(err(FormatErrorKind::WireOutsideNet));
        }
        let name = args
            .first()
            .ok_or_else(|| err(FormatErrorKind::MissingWireId))?;
        let wire = device
            .db
            .find_wire(name)
            .map_err(|_| err(FormatErrorKind::UnknownWire))?;
        let pip = match args.get(1) {
            None | Some(&"-") => None,
            Some(pip) => {
                let pip = device
                    .db
                    .find_pip(pip)
                    .map_err(|_| err(FormatErrorKind::UnknownPip))?;
                if device.db.pip(pip).dst != wire {
                    return Err(err(FormatErrorKind::UnknownPip));
                }
                Some(pip)
            }
        };
        if let Some(net) = self.annotations.last_mut() {
            net.wires.push((wire, pip));
        }
        Ok(())
    }

    fn data(&mut self, line: usize, text: &str) -> Result<(), CodecError> {
        let err = |kind| FormatError::new(kind, line, text);
        match &mut self.block {
            Block::Comment => Ok(()),
            Block::Tile {
                x, y, tile, rows, ..
            } => {
                if *rows == tile.rows() {
                    return Err(err(FormatErrorKind::ExtraRow).into());
                }
                if text.chars().any(|c| c != '0' && c != '1') {
                    return Err(err(FormatErrorKind::WrongSymbol).into());
                }
                check_width(text.len(), tile.cols()).map_err(err)?;
                let mut bits = BitVector::new(tile.cols() as u32);
                for (col, c) in text.bytes().enumerate() {
                    bits.set(col as u32, c == b'1');
                }
                let (x, y, row) = (*x, *y, *rows);
                *rows += 1;
                if let Some(device) = &mut self.device {
                    device.lattice.set_row(x, y, row, bits)?;
                }
                Ok(())
            }
            Block::RamData { x, y, rows, .. } => {
                if *rows == RAM_INIT_WORDS {
                    return Err(err(FormatErrorKind::ExtraRow).into());
                }
                if !text.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(err(FormatErrorKind::WrongSymbol).into());
                }
                check_width(text.len(), RAM_ROW_DIGITS).map_err(err)?;
                let word = BitVector::from_hex_str(RAM_INIT_WIDTH, text)
                    .map_err(|_| err(FormatErrorKind::WrongSymbol))?;
                let (x, y, index) = (*x, *y, *rows);
                *rows += 1;
                if let Some(device) = &mut self.device {
                    device.lattice.set_ram_word(x, y, index, word)?;
                }
                Ok(())
            }
            Block::Idle | Block::Net => {
                self.device(line, text)?;
                Err(err(FormatErrorKind::UnexpectedLine).into())
            }
        }
    }
}

fn check_width(len: usize, expected: usize) -> Result<(), FormatErrorKind> {
    match len.cmp(&expected) {
        std::cmp::Ordering::Less => Err(FormatErrorKind::RowTooShort),
        std::cmp::Ordering::Greater => Err(FormatErrorKind::RowTooLong),
        std::cmp::Ordering::Equal => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<AscDocument, CodecError> {
        match read_document(text.as_bytes(), None)? {
            ReadOutcome::Document(doc) => Ok(doc),
            ReadOutcome::WrongTarget(chip) => panic!("unexpected target {chip}"),
        }
    }

    fn rows(count: usize, width: usize) -> String {
        let row = "0".repeat(width);
        (0..count).map(|_| format!("{row}\n")).collect()
    }

    #[test]
    fn minimal_document() {
        let text = format!(".comment hello\nanything here\n.device 1k\n.logic_tile 1 1\n{}", rows(16, 54));
        let doc = read(&text).unwrap();
        assert_eq!(doc.chip.package, "tq144");
        assert!(doc.lattice.row(1, 1, 15).is_some());
    }

    #[test]
    fn row_bits_are_column_indexed() {
        let mut text = String::from(".device 1k\n.io_tile 0 1\n");
        text.push_str("100000000000000001\n");
        text.push_str(&rows(15, 18));
        let doc = read(&text).unwrap();
        assert!(doc.lattice.get(0, 1, 0, 0));
        assert!(doc.lattice.get(0, 1, 0, 17));
        assert!(!doc.lattice.get(0, 1, 0, 1));
    }

    #[test]
    fn ram_data_rows_are_hex_words() {
        let mut text = String::from(".device 1k\n.ram_data 3 1\n");
        text.push_str(&format!("{}{}\n", "0".repeat(63), "a"));
        text.push_str(&rows(15, 64));
        let doc = read(&text).unwrap();
        let words = doc.lattice.ram_words(3, 1).unwrap();
        assert_eq!(words[0].to_u64(), 0xa);
    }

    #[test]
    fn missing_rows_are_reported_at_the_header() {
        let text = format!(".device 1k\n.logic_tile 1 1\n{}.logic_tile 2 1\n", rows(3, 54));
        let err = read(&text).unwrap_err();
        match err {
            CodecError::Format(e) => {
                assert_eq!(e.kind, FormatErrorKind::MissingRow);
                assert_eq!(e.line, 2);
                assert_eq!(e.text, ".logic_tile 1 1");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn annotations_resolve_wires_and_pips() {
        let text = ".device 1k\n.net n\n.wire X1/Y1/lutff_0/out -\n.wire X1/Y1/local_g0_0 X1/Y1/lutff_0/out.->X1/Y1/local_g0_0\n";
        let doc = read(text).unwrap();
        assert_eq!(doc.annotations.len(), 1);
        let net = &doc.annotations[0];
        assert_eq!(net.name, "n");
        assert_eq!(net.line, 2);
        assert_eq!(net.wires.len(), 2);
        assert!(net.wires[0].1.is_none());
        assert!(net.wires[1].1.is_some());
    }

    #[test]
    fn pip_must_drive_its_wire() {
        let text = ".device 1k\n.net n\n.wire X1/Y1/local_g0_1 X1/Y1/lutff_0/out.->X1/Y1/local_g0_0\n";
        assert_eq!(read(text).unwrap_err().format_kind(), Some(FormatErrorKind::UnknownPip));
    }

    #[test]
    fn tile_checks() {
        let cases = [
            (".device 1k\n.io_tile 1 1\n", FormatErrorKind::TileTypeMismatch),
            (".device 1k\n.logic_tile 1 x\n", FormatErrorKind::InvalidNumber),
            (".device 1k\n.logic_tile 0 0\n", FormatErrorKind::CoordOutOfRange),
            (".device 1k\n.ram_data 1 1\n", FormatErrorKind::TileTypeMismatch),
            (".device 1k\n.foo_tile 1 1\n", FormatErrorKind::UnknownDirective),
            (".device 1k\n.bogus\n", FormatErrorKind::UnknownDirective),
            (".device 1k\n0101\n", FormatErrorKind::UnexpectedLine),
            (".device 1k\n.wire X1/Y1/local_g0_0\n", FormatErrorKind::WireOutsideNet),
            (".device 1k\n.net n\n.wire X99/Y1/local_g0_0\n", FormatErrorKind::UnknownWire),
        ];
        for (text, kind) in cases {
            assert_eq!(read(text).unwrap_err().format_kind(), Some(kind), "{text}");
        }
    }

    #[test]
    fn duplicate_tiles_are_rejected() {
        let block = format!(".logic_tile 1 1\n{}", rows(16, 54));
        let text = format!(".device 1k\n{block}{block}");
        assert_eq!(read(&text).unwrap_err().format_kind(), Some(FormatErrorKind::DuplicateTile));
    }

    #[test]
    fn wrong_target_stops_at_the_device_line() {
        let expected = ChipArgs::resolve("5k", Some("sg48")).unwrap();
        let text = ".device 1k tq144\n.logic_tile 1 1\ngarbage\n";
        match read_document(text.as_bytes(), Some(&expected)).unwrap() {
            ReadOutcome::WrongTarget(chip) => assert_eq!(chip.device_token(), "1k"),
            ReadOutcome::Document(_) => panic!("expected a target mismatch"),
        }
    }
}

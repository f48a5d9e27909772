//! Order-insensitive view of ASC text for comparing two outputs.

use std::collections::BTreeMap;

/// Every block of a document keyed by its header line, with its body lines.
pub type BlockMap = BTreeMap<String, Vec<String>>;

/// A header that occurs twice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: duplicate block `{header}`")]
pub struct BlockMapError {
    /// 1-based line of the second occurrence.
    pub line: usize,
    /// The repeated header.
    pub header: String,
}

/// Splits ASC text into its blocks.
///
/// Empty lines and `.sym` lines are dropped, and `.comment` blocks are left
/// out entirely, so two documents that differ only in comments, symbol
/// tables or block order map to the same value.
pub fn block_map(text: &str) -> Result<BlockMap, BlockMapError> {
    let mut map = BlockMap::new();
    let mut current: Option<String> = None;
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(".sym") {
            continue;
        }
        if line.starts_with('.') {
            if line == ".comment" || line.starts_with(".comment ") {
                current = None;
                continue;
            }
            if map.insert(line.to_string(), Vec::new()).is_some() {
                return Err(BlockMapError {
                    line: index + 1,
                    header: line.to_string(),
                });
            }
            current = Some(line.to_string());
            continue;
        }
        if let Some(body) = current.as_ref().and_then(|key| map.get_mut(key)) {
            body.push(line.to_string());
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_ignore_order_and_comments() {
        let a = ".comment one\nhello\n.device 1k\n.io_tile 1 0\n01\n\n.sym 3 foo\n.logic_tile 1 1\n11\n";
        let b = ".device 1k\n.logic_tile 1 1\n11\n.comment two\n.io_tile 1 0\n01\n";
        assert_eq!(block_map(a).unwrap(), block_map(b).unwrap());
        let map = block_map(a).unwrap();
        assert_eq!(map[".io_tile 1 0"], vec!["01".to_string()]);
        assert!(map[".device 1k"].is_empty());
    }

    #[test]
    fn duplicate_headers_are_errors() {
        let err = block_map(".io_tile 1 0\n0\n.io_tile 1 0\n1\n").unwrap_err();
        assert_eq!(err.line, 3);
    }
}

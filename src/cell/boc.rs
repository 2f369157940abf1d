//! Bag-of-cells serialization.
//!
//! Layout (single root, no cache bits):
//!
//! ```text
//! b5ee9c72 | flags+size_bytes | off_bytes | cells | roots=1 | absent=0
//!          | tot_cells_size | root_index=0 | [index] | cells... | [crc32c LE]
//! ```
//!
//! Identical subtrees are stored once. Cells are ordered root first, in the
//! reverse of a post-order walk that visits references last to first.

use std::collections::{HashMap, HashSet};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Serialize, Deserialize};

use crate::cell::Cell;

const BOC_MAGIC: u32 = 0xb5ee9c72;

/// Serialization switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BocOptions {
    /// Append a CRC32-C checksum
    pub crc32: bool,
    /// Include the cell offset index
    pub index: bool,
}

impl Default for BocOptions {
    fn default() -> Self {
        Self { crc32: true, index: false }
    }
}

impl Cell {
    /// Serialize this cell tree into a bag of cells.
    pub fn to_boc(&self, opts: &BocOptions) -> Vec<u8> {
        let nodes = self.nodes();
        let (order, position) = topological_order(self);
        let cells_num = order.len();

        let size_bytes = byte_width(cells_num as u64);
        let mut ends = Vec::with_capacity(cells_num);
        let mut total_cell_size = 0u64;
        for &i in &order {
            let node = &nodes[i];
            total_cell_size +=
                (2 + (node.bits().len() + 7) / 8 + node.refs().len() * size_bytes) as u64;
            ends.push(total_cell_size);
        }
        let offset_bytes = byte_width(total_cell_size);

        let mut out = Vec::with_capacity(total_cell_size as usize + 32);
        let mut word = [0u8; 4];
        BigEndian::write_u32(&mut word, BOC_MAGIC);
        out.extend_from_slice(&word);

        let flags = ((opts.index as u8) << 7) | ((opts.crc32 as u8) << 6) | size_bytes as u8;
        out.push(flags);
        out.push(offset_bytes as u8);
        put_uint(&mut out, cells_num as u64, size_bytes);
        put_uint(&mut out, 1, size_bytes);
        put_uint(&mut out, 0, size_bytes);
        put_uint(&mut out, total_cell_size, offset_bytes);
        put_uint(&mut out, 0, size_bytes);

        if opts.index {
            for &end in &ends {
                put_uint(&mut out, end, offset_bytes);
            }
        }

        for &i in &order {
            let node = &nodes[i];
            out.extend_from_slice(&node.descriptors());
            out.extend_from_slice(&node.bits().padded_bytes());
            for &r in node.refs() {
                put_uint(&mut out, position[nodes[r].hash()] as u64, size_bytes);
            }
        }

        if opts.crc32 {
            LittleEndian::write_u32(&mut word, crc32c(&out));
            out.extend_from_slice(&word);
        }

        out
    }

    /// Serialize into a standard base64 bag of cells.
    pub fn to_boc_base64(&self, opts: &BocOptions) -> String {
        base64::encode(self.to_boc(opts))
    }
}

/// Unique nodes in serialization order, plus the position of each hash.
fn topological_order(cell: &Cell) -> (Vec<usize>, HashMap<[u8; 32], usize>) {
    let nodes = cell.nodes();
    let root = nodes.len() - 1;

    let mut seen: HashSet<[u8; 32]> = HashSet::new();
    let mut post_order = Vec::new();
    let mut stack = vec![(root, nodes[root].refs().len())];
    seen.insert(*nodes[root].hash());

    while let Some(top) = stack.last_mut() {
        if top.1 > 0 {
            top.1 -= 1;
            let child = nodes[top.0].refs()[top.1];
            if seen.insert(*nodes[child].hash()) {
                stack.push((child, nodes[child].refs().len()));
            }
        } else {
            post_order.push(top.0);
            stack.pop();
        }
    }

    post_order.reverse();
    let position = post_order
        .iter()
        .enumerate()
        .map(|(pos, &i)| (*nodes[i].hash(), pos))
        .collect();
    (post_order, position)
}

/// Bytes needed to store `n`, at least one.
fn byte_width(n: u64) -> usize {
    let bits = 64 - n.leading_zeros() as usize;
    ((bits + 7) / 8).max(1)
}

fn put_uint(out: &mut Vec<u8>, value: u64, bytes: usize) {
    let mut buf = [0u8; 8];
    BigEndian::write_uint(&mut buf, value, bytes);
    out.extend_from_slice(&buf[..bytes]);
}

/// CRC-32C (Castagnoli)
pub fn crc32c(data: &[u8]) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0x82f6_3b78 } else { crc >> 1 };
        }
    }
    crc ^ 0xffff_ffff
}

//! Cells: bounded bit containers with up to four child references.
//!
//! A [`Cell`] owns its whole subtree as a flat arena. Children always sit at
//! lower indices than their parent and the root is the last node, so hashes
//! and depths are computed once, in index order, when the cell is built.
//!
//! The representation hash follows the TON ordinary-cell layout:
//!
//! `sha256(d1 || d2 || padded_data || depth(ref_i) as u16 BE... || hash(ref_i)...)`
//!
//! with `d1 = refs count` and `d2 = ceil(bits / 8) + floor(bits / 8)`.

pub mod bits;
pub mod builder;
pub mod boc;

use std::fmt;

use crate::crypto::sha256;

pub use bits::BitString;
pub use builder::Builder;
pub use boc::BocOptions;

/// Maximum payload size of a cell, in bits
pub const MAX_BITS: usize = 1023;

/// Maximum number of child references of a cell
pub const MAX_REFS: usize = 4;

#[derive(Clone)]
pub(crate) struct Node {
    bits: BitString,
    refs: Vec<usize>,
    hash: [u8; 32],
    depth: u16,
}

impl Node {
    /// The two descriptor bytes `d1`, `d2`
    pub(crate) fn descriptors(&self) -> [u8; 2] {
        let len = self.bits.len();
        [self.refs.len() as u8, ((len + 7) / 8 + len / 8) as u8]
    }

    pub(crate) fn bits(&self) -> &BitString {
        &self.bits
    }

    pub(crate) fn refs(&self) -> &[usize] {
        &self.refs
    }

    pub(crate) fn hash(&self) -> &[u8; 32] {
        &self.hash
    }
}

/// An immutable cell tree.
#[derive(Clone)]
pub struct Cell {
    nodes: Vec<Node>,
}

impl Cell {
    /// A cell with no payload and no references
    pub fn empty() -> Self {
        Self::from_parts(BitString::new(), Vec::new())
    }

    /// Assemble a cell from a payload and owned children. Bounds are
    /// enforced by [`Builder`].
    pub(crate) fn from_parts(bits: BitString, children: Vec<Cell>) -> Self {
        debug_assert!(bits.len() <= MAX_BITS && children.len() <= MAX_REFS);

        let total = children.iter().map(|c| c.nodes.len()).sum::<usize>() + 1;
        let mut nodes = Vec::with_capacity(total);
        let mut roots = Vec::with_capacity(children.len());

        for child in children {
            let offset = nodes.len();
            for mut node in child.nodes {
                for r in node.refs.iter_mut() {
                    *r += offset;
                }
                nodes.push(node);
            }
            roots.push(nodes.len() - 1);
        }

        let mut node = Node { bits, refs: roots, hash: [0u8; 32], depth: 0 };
        let (hash, depth) = representation_hash(&node, &nodes);
        node.hash = hash;
        node.depth = depth;
        nodes.push(node);

        Self { nodes }
    }

    fn root_index(&self) -> usize {
        self.nodes.len() - 1
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// View of the root node
    pub fn root(&self) -> CellRef<'_> {
        CellRef { cell: self, index: self.root_index() }
    }

    /// Representation hash of the root
    pub fn hash(&self) -> [u8; 32] {
        self.nodes[self.root_index()].hash
    }

    /// Longest reference chain below the root
    pub fn depth(&self) -> u16 {
        self.nodes[self.root_index()].depth
    }

    pub fn bits(&self) -> &BitString {
        &self.nodes[self.root_index()].bits
    }

    pub fn refs_count(&self) -> usize {
        self.nodes[self.root_index()].refs.len()
    }

    /// Child `i` of the root
    pub fn reference(&self, i: usize) -> Option<CellRef<'_>> {
        self.root().reference(i)
    }

    /// Number of nodes in the tree, duplicates included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn representation_hash(node: &Node, arena: &[Node]) -> ([u8; 32], u16) {
    let mut repr = Vec::with_capacity(2 + 128 + node.refs.len() * 34);
    repr.extend_from_slice(&node.descriptors());
    repr.extend_from_slice(&node.bits.padded_bytes());

    let mut depth = 0u16;
    for &r in &node.refs {
        let child = &arena[r];
        repr.extend_from_slice(&child.depth.to_be_bytes());
        depth = depth.max(child.depth + 1);
    }
    for &r in &node.refs {
        repr.extend_from_slice(&arena[r].hash);
    }

    (sha256(&repr), depth)
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for Cell {}

/// Borrowed view of one node inside a [`Cell`].
#[derive(Clone, Copy)]
pub struct CellRef<'a> {
    cell: &'a Cell,
    index: usize,
}

impl<'a> CellRef<'a> {
    fn node(&self) -> &'a Node {
        &self.cell.nodes[self.index]
    }

    pub fn bits(&self) -> &'a BitString {
        &self.node().bits
    }

    pub fn hash(&self) -> [u8; 32] {
        self.node().hash
    }

    pub fn depth(&self) -> u16 {
        self.node().depth
    }

    pub fn refs_count(&self) -> usize {
        self.node().refs.len()
    }

    pub fn reference(&self, i: usize) -> Option<CellRef<'a>> {
        self.node()
            .refs
            .get(i)
            .map(|&index| CellRef { cell: self.cell, index })
    }

    pub fn references(&self) -> impl Iterator<Item = CellRef<'a>> + 'a {
        let cell = self.cell;
        self.node().refs.iter().map(move |&index| CellRef { cell, index })
    }
}

impl fmt::Display for Cell {
    /// Fift-style dump, one node per line, children indented by one space.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.root_index(), 0usize)];
        let mut first = true;
        while let Some((index, indent)) = stack.pop() {
            let node = &self.nodes[index];
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{:indent$}x{{{}}}", "", node.bits.to_fift_hex(), indent = indent)?;
            for &r in node.refs.iter().rev() {
                stack.push((r, indent + 1));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({}, hash={})", self.bits().to_fift_hex(), hex::encode(self.hash()))
    }
}

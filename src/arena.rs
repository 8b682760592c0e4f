//! Fixed-capacity node storage shared by two growth zones.
//!
//! Keys, values and labels are allocated from the low end upward in
//! declaration order. Sections are allocated from the high end downward, so
//! the most recently declared section always sits at the lowest occupied
//! index of the backward zone. Both zones draw from the same capacity and
//! nothing is ever relocated; a reset is two counter writes.

use crate::ErrorKind;

#[cfg(test)]
#[path = "./arena_tests.rs"]
mod tests;

/// Index of a [`Node`] inside the storage handed to a
/// [`Context`](crate::Context).
///
/// Ids of keys, values and labels are invalidated by the next call to
/// [`Context::parse`](crate::Context::parse); re-query after every call.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the storage slice.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a [`Node`] was lexed from.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum NodeKind {
    /// `[name]` header, or the implicit unnamed section at the top of a document.
    Section,
    /// The `label` part of a `[name:label]` header.
    Label,
    /// The name on the left of `=`.
    Key,
    /// The text on the right of `=`.
    Value,
}

/// One lexical unit. Positions are stored relative to the line table so a node
/// is 16 bytes regardless of document size.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) used: bool,
    pub(crate) len: u16,
    pub(crate) line: u32,
    pub(crate) column: u32,
    pub(crate) next: u32,
}

const NO_NODE: u32 = u32::MAX;

const _: () = assert!(std::mem::size_of::<Node>() == 16);

impl Node {
    /// Placeholder value for initialising node storage.
    pub const EMPTY: Node = Node {
        kind: NodeKind::Value,
        used: false,
        len: 0,
        line: 0,
        column: 0,
        next: NO_NODE,
    };

    #[inline]
    pub(crate) fn new(kind: NodeKind, line: u32, column: u32, len: u16) -> Self {
        Node {
            kind,
            used: false,
            len,
            line,
            column,
            next: NO_NODE,
        }
    }

    #[inline]
    pub(crate) fn set_next(&mut self, next: Option<NodeId>) {
        self.next = match next {
            Some(id) => id.0,
            None => NO_NODE,
        };
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Whether a lookup or binding has consumed this node.
    #[inline]
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Length of the token in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index into the line table of the line the token starts on.
    #[inline]
    pub fn line_index(&self) -> usize {
        self.line as usize
    }

    /// Byte offset of the token within its line.
    #[inline]
    pub fn column(&self) -> usize {
        self.column as usize
    }

    /// The following node in the owning section's chain.
    #[inline]
    pub fn next(&self) -> Option<NodeId> {
        if self.next == NO_NODE {
            None
        } else {
            Some(NodeId(self.next))
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::EMPTY
    }
}

pub(crate) struct NodeArena<'a> {
    nodes: &'a mut [Node],
    forward: u32,
    backward: u32,
}

impl<'a> NodeArena<'a> {
    pub fn new(nodes: &'a mut [Node]) -> Self {
        NodeArena {
            nodes,
            forward: 0,
            backward: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        u32::try_from(self.nodes.len()).unwrap_or(u32::MAX)
    }

    #[inline]
    pub fn used_forward(&self) -> u32 {
        self.forward
    }

    #[inline]
    pub fn used_backward(&self) -> u32 {
        self.backward
    }

    /// Allocates a node in the zone its kind belongs to.
    pub fn alloc(&mut self, node: Node) -> Result<NodeId, ErrorKind> {
        let capacity = self.capacity();
        if self.forward + self.backward >= capacity {
            return Err(ErrorKind::NodeCapacity);
        }
        let index = if node.kind == NodeKind::Section {
            self.backward += 1;
            capacity - self.backward
        } else {
            self.forward += 1;
            self.forward - 1
        };
        self.nodes[index as usize] = node;
        Ok(NodeId(index))
    }

    /// Releases every node allocated after the counts were `(forward, backward)`.
    #[inline]
    pub fn rollback(&mut self, forward: u32, backward: u32) {
        debug_assert!(forward <= self.forward && backward <= self.backward);
        self.forward = forward;
        self.backward = backward;
    }

    pub fn reset(&mut self) {
        self.forward = 0;
        self.backward = 0;
    }

    /// Returns `true` if `id` refers to a node allocated since the last reset.
    #[inline]
    pub fn is_live(&self, id: NodeId) -> bool {
        id.0 < self.forward || self.is_section_slot(id)
    }

    #[inline]
    fn is_section_slot(&self, id: NodeId) -> bool {
        let capacity = self.capacity();
        id.0 < capacity && id.0 >= capacity - self.backward
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if self.is_live(id) {
            Some(&self.nodes[id.index()])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.is_live(id) {
            Some(&mut self.nodes[id.index()])
        } else {
            None
        }
    }

    /// The first declared section still in storage.
    pub fn oldest_section(&self) -> Option<NodeId> {
        if self.backward == 0 {
            None
        } else {
            Some(NodeId(self.capacity() - 1))
        }
    }

    /// The most recently declared section.
    pub fn newest_section(&self) -> Option<NodeId> {
        if self.backward == 0 {
            None
        } else {
            Some(NodeId(self.capacity() - self.backward))
        }
    }

    /// The section declared after `id`.
    pub fn section_after(&self, id: NodeId) -> Option<NodeId> {
        if self.is_section_slot(id) && id.0 > self.capacity() - self.backward {
            Some(NodeId(id.0 - 1))
        } else {
            None
        }
    }

    /// The section declared before `id`.
    pub fn section_before(&self, id: NodeId) -> Option<NodeId> {
        if self.is_section_slot(id) && id.0 + 1 < self.capacity() {
            Some(NodeId(id.0 + 1))
        } else {
            None
        }
    }
}

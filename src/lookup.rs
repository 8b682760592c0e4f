//! Name lookups and document traversal.
//!
//! Every successful lookup marks the node it returns as used, which is what
//! [`Context::validate`] later checks for.

use crate::arena::{NodeId, NodeKind};
use crate::context::Context;
use crate::parser::{is_blank, is_name_byte};

#[cfg(test)]
#[path = "./lookup_tests.rs"]
mod tests;

impl<'a> Context<'a> {
    /// Finds the most recently declared section called `name` and marks it used.
    ///
    /// An empty `name` finds the unnamed section holding the keys that precede
    /// the first header. When a header is repeated the last declaration wins.
    pub fn section(&mut self, name: &[u8]) -> Option<NodeId> {
        let mut cursor = self.arena.newest_section();
        while let Some(id) = cursor {
            if self.text(id) == name {
                self.mark_used(id);
                return Some(id);
            }
            cursor = self.arena.section_before(id);
        }
        None
    }

    /// Like [`Context::section`] but also requires the header's label to be
    /// `label` (`None` matches only unlabelled headers).
    pub fn section_with_label(&mut self, name: &[u8], label: Option<&[u8]>) -> Option<NodeId> {
        let mut cursor = self.arena.newest_section();
        while let Some(id) = cursor {
            if self.text(id) == name {
                if self.label_text(id) == label {
                    self.mark_used(id);
                    return Some(id);
                }
            }
            cursor = self.arena.section_before(id);
        }
        None
    }

    /// Finds the first key called `name` in `section` and marks it used.
    pub fn key(&mut self, section: NodeId, name: &[u8]) -> Option<NodeId> {
        let mut cursor = self.first_key(section);
        while let Some(id) = cursor {
            let node = *self.node(id)?;
            match node.kind() {
                NodeKind::Key => {
                    if self.text(id) == name {
                        self.mark_used(id);
                        return Some(id);
                    }
                }
                NodeKind::Value => {}
                NodeKind::Section | NodeKind::Label => return None,
            }
            cursor = node.next();
        }
        None
    }

    /// The value assigned to `key`, or `None` for a bare key.
    pub fn value(&self, key: NodeId) -> Option<NodeId> {
        let node = self.node(key)?;
        if node.kind() != NodeKind::Key {
            return None;
        }
        let next = node.next()?;
        match self.kind(next) {
            Some(NodeKind::Value) => Some(next),
            _ => None,
        }
    }

    /// The label of a `[name:label]` header.
    pub fn label(&self, section: NodeId) -> Option<NodeId> {
        let node = self.node(section)?;
        if node.kind() != NodeKind::Section {
            return None;
        }
        let next = node.next()?;
        match self.kind(next) {
            Some(NodeKind::Label) => Some(next),
            _ => None,
        }
    }

    /// The label text of a `[name:label]` header.
    ///
    /// Unlike [`Context::label`] this also works for a section carried into a
    /// resumed call whose label node was dropped for lack of storage; the text
    /// is then read back from the header line.
    pub fn label_text(&self, section: NodeId) -> Option<&'a [u8]> {
        if let Some(label) = self.label(section) {
            return Some(self.text(label));
        }
        if self.kind(section) != Some(NodeKind::Section) || self.len(section) == Some(0) {
            return None;
        }
        let span = self.span(section)?;
        let rest = self.text.get(span.end as usize..)?;
        let mut i = 0;
        while rest.get(i).is_some_and(|&b| is_blank(b)) {
            i += 1;
        }
        if rest.get(i) != Some(&b':') {
            return None;
        }
        i += 1;
        while rest.get(i).is_some_and(|&b| is_blank(b)) {
            i += 1;
        }
        let start = i;
        while rest.get(i).is_some_and(|&b| is_name_byte(b)) {
            i += 1;
        }
        if i == start { None } else { Some(&rest[start..i]) }
    }

    /// Steps through sections oldest to newest. `None` starts the walk.
    ///
    /// Does not mark anything used.
    pub fn next_section(&self, prev: Option<NodeId>) -> Option<NodeId> {
        match prev {
            None => self.arena.oldest_section(),
            Some(id) => self.arena.section_after(id),
        }
    }

    /// Steps through sections newest to oldest. `None` starts the walk.
    pub fn prev_section(&self, next: Option<NodeId>) -> Option<NodeId> {
        match next {
            None => self.arena.newest_section(),
            Some(id) => self.arena.section_before(id),
        }
    }

    /// Iterates over the sections in declaration order.
    pub fn sections(&self) -> Sections<'_, 'a> {
        Sections {
            ctx: self,
            next: self.arena.oldest_section(),
        }
    }

    /// Iterates over the keys of a section in declaration order, without
    /// marking them used.
    pub fn keys(&self, section: NodeId) -> Keys<'_, 'a> {
        Keys {
            ctx: self,
            next: self.first_key(section),
        }
    }

    /// The unnamed section of a document that starts with a header.
    pub(crate) fn is_implicit_empty(&self, section: NodeId) -> bool {
        self.len(section) == Some(0) && self.first_key(section).is_none()
    }

    /// First node after the header (and its label).
    pub(crate) fn first_key(&self, section: NodeId) -> Option<NodeId> {
        let node = self.node(section)?;
        if node.kind() != NodeKind::Section {
            return None;
        }
        let next = node.next()?;
        match self.node(next)?.kind() {
            NodeKind::Label => self.node(next)?.next(),
            _ => Some(next),
        }
    }
}

/// Iterator returned by [`Context::sections`].
pub struct Sections<'c, 'a> {
    ctx: &'c Context<'a>,
    next: Option<NodeId>,
}

impl Iterator for Sections<'_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ctx.next_section(Some(current));
        Some(current)
    }
}

/// Iterator returned by [`Context::keys`], yielding `(key, value)` pairs.
pub struct Keys<'c, 'a> {
    ctx: &'c Context<'a>,
    next: Option<NodeId>,
}

impl Iterator for Keys<'_, '_> {
    type Item = (NodeId, Option<NodeId>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.next?;
            let node = self.ctx.node(id)?;
            self.next = node.next();
            match node.kind() {
                NodeKind::Key => return Some((id, self.ctx.value(id))),
                NodeKind::Value => continue,
                NodeKind::Section | NodeKind::Label => {
                    self.next = None;
                    return None;
                }
            }
        }
    }
}

//! Unused node sweep.

use crate::arena::NodeKind;
use crate::context::Context;
use crate::error::ErrorKind;

#[cfg(test)]
#[path = "./validate_tests.rs"]
mod tests;

impl Context<'_> {
    /// Reports every section and key that no lookup or binding consumed.
    ///
    /// Sections are visited newest first. The unnamed section is not reported
    /// when no keys precede the first header. Returns `true` if the context
    /// holds no errors at all afterwards.
    pub fn validate(&mut self) -> bool {
        let mut cursor = self.prev_section(None);
        while let Some(section) = cursor {
            cursor = self.prev_section(Some(section));
            if !self.is_used(section) && !self.is_implicit_empty(section) {
                self.add_error(section, ErrorKind::UnusedSection);
            }

            let mut key = self.first_key(section);
            while let Some(id) = key {
                let node = match self.node(id) {
                    Some(node) => *node,
                    None => break,
                };
                key = node.next();
                match node.kind() {
                    NodeKind::Key if !node.is_used() => {
                        self.add_error(id, ErrorKind::UnusedField);
                    }
                    NodeKind::Key | NodeKind::Value => {}
                    NodeKind::Section | NodeKind::Label => break,
                }
            }
        }
        trace!(errors = self.error_count(), "validated");
        !self.has_errors()
    }
}

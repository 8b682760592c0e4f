//! Caller-provided table of line start offsets.

use crate::ErrorKind;

#[cfg(test)]
#[path = "./lines_tests.rs"]
mod tests;

/// Byte offsets of the lines seen by the current parse call, in scan order.
///
/// Entry `0` may be a line carried over from a previous call (the line of the
/// section that was open when that call ran out of room), so absolute line
/// numbers are tracked separately for it: entry `0` is line `first_line`, and
/// entry `i > 0` is line `line_base + i`.
pub(crate) struct LineTable<'a> {
    offsets: &'a mut [u32],
    len: u32,
    first_line: u32,
    line_base: u32,
}

impl<'a> LineTable<'a> {
    pub fn new(offsets: &'a mut [u32]) -> Self {
        LineTable {
            offsets,
            len: 0,
            first_line: 0,
            line_base: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn reset(&mut self) {
        self.len = 0;
        self.first_line = 0;
        self.line_base = 0;
    }

    /// Records the start of a new line, returning its index.
    pub fn push(&mut self, offset: u32) -> Result<u32, ErrorKind> {
        let index = self.len;
        debug_assert!(index == 0 || self.offsets[index as usize - 1] < offset);
        match self.offsets.get_mut(index as usize) {
            Some(slot) => {
                *slot = offset;
                self.len += 1;
                Ok(index)
            }
            None => Err(ErrorKind::LineCapacity),
        }
    }

    /// Starts a resumed call: entry `0` is the carried section's line, and the
    /// scan continues at `resume_offset`, which is absolute line `resume_line`.
    ///
    /// Returns the index of the line the scan continues on.
    pub fn seed(
        &mut self,
        section_offset: u32,
        section_line: u32,
        resume_offset: u32,
        resume_line: u32,
    ) -> Result<u32, ErrorKind> {
        self.reset();
        let first = match self.push(section_offset) {
            Ok(index) => index,
            Err(e) => return Err(e),
        };
        self.first_line = section_line;
        if resume_offset == section_offset {
            self.line_base = section_line;
            return Ok(first);
        }
        self.line_base = resume_line - 1;
        self.push(resume_offset)
    }

    /// Byte offset of the start of line `index`.
    #[inline]
    pub fn offset(&self, index: u32) -> u32 {
        self.offsets[index as usize]
    }

    /// Absolute, zero-based line number of entry `index`.
    #[inline]
    pub fn number(&self, index: u32) -> u32 {
        if index == 0 {
            self.first_line
        } else {
            self.line_base + index
        }
    }
}

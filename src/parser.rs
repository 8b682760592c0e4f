// Deliberately avoid `?` operator throughout this module for compile-time
// performance: explicit match/if-let prevents the compiler from generating
// From::from conversion and drop-glue machinery at every call site.
#![allow(clippy::question_mark)]

use crate::{
    Span,
    arena::{Node, NodeId, NodeKind},
    context::{Context, Resume},
    error::{Error, ErrorKind},
};

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;

/// State of the line automaton.
///
/// Between calls the parser only ever rests in [`LexState::LineStart`] (ready
/// for the next line) or [`LexState::Rejected`] (a syntax error ended the
/// document), which is what [`Context::state`] reports. The other states only
/// exist while a line is being scanned inside a single call.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum LexState {
    /// At the first byte of a line.
    LineStart,
    /// Inside a `#` or `;` comment.
    Comment,
    /// Inside a key name.
    KeyName,
    /// Whitespace after a key name, before `=` or the end of the line.
    AfterKey,
    /// Whitespace after `=`.
    BeforeValue,
    /// Inside a value, which runs to the end of the line.
    Value,
    /// After `[`.
    SectionOpen,
    /// Inside a section name.
    SectionName,
    /// Whitespace after a section name.
    AfterSectionName,
    /// After the `:` of a labelled header.
    LabelOpen,
    /// Inside a label.
    LabelName,
    /// Whitespace after a label.
    AfterLabel,
    /// After `]`, or after a carriage return at the start of a line. Only
    /// whitespace may follow before the end of the line.
    LineEnd,
    /// A syntax error was reported. Only [`Context::reset`] leaves this state.
    Rejected,
}

#[inline]
pub(crate) fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-')
}

#[inline]
pub(crate) fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0b | 0x0c | b'\r')
}

// ---------------------------------------------------------------------------
// Lightweight internal error -- zero-sized, no drop glue.
// When a method returns Err(ParseError), the full error details have already
// been written into Scanner::error_kind / Scanner::error_span.
// ---------------------------------------------------------------------------

#[derive(Copy, Clone)]
struct ParseError;

/// Single pass over the bytes of one parse call.
struct Scanner<'s, 'a> {
    ctx: &'s mut Context<'a>,
    bytes: &'a [u8],
    cursor: u32,
    state: LexState,
    /// Start of the token being scanned.
    mark: u32,

    /// Line table index, start offset and absolute number of the current line.
    line: u32,
    line_start: u32,
    line_number: u32,

    // Committed document position.
    section: NodeId,
    label: Option<NodeId>,
    tail: NodeId,
    /// Arena counts at the start of the current line.
    marks: (u32, u32),

    // Nodes of the line being scanned, linked in when the line ends.
    key: Option<NodeId>,
    value: Option<NodeId>,
    header: Option<NodeId>,
    header_label: Option<NodeId>,

    error_kind: Option<ErrorKind>,
    error_span: Span,
}

impl<'s, 'a> Scanner<'s, 'a> {
    #[cold]
    fn set_error(&mut self, kind: ErrorKind, start: u32, end: u32) -> ParseError {
        self.error_kind = Some(kind);
        self.error_span = Span::new(start, end);
        ParseError
    }

    #[cold]
    fn syntax(&mut self, at: u32) -> ParseError {
        let end = if (at as usize) < self.bytes.len() { at + 1 } else { at };
        self.set_error(ErrorKind::Syntax, at, end)
    }

    fn take_error(&mut self) -> Error {
        let kind = match self.error_kind.take() {
            Some(kind) => kind,
            None => ErrorKind::Syntax,
        };
        let span = self.error_span;
        let column = span.start.saturating_sub(self.line_start) as usize;
        Error {
            kind,
            span,
            line_info: Some((self.line_number as usize, column)),
        }
    }

    /// Allocates a node for the token between `mark` and the cursor.
    fn emit(&mut self, kind: NodeKind) -> Result<NodeId, ParseError> {
        let len = self.cursor - self.mark;
        if len > u16::MAX as u32 {
            return Err(self.syntax(self.mark));
        }
        let node = Node::new(kind, self.line, self.mark - self.line_start, len as u16);
        match self.ctx.arena.alloc(node) {
            Ok(id) => Ok(id),
            Err(kind) => Err(self.set_error(kind, self.mark, self.cursor)),
        }
    }

    fn emit_key(&mut self) -> Result<(), ParseError> {
        match self.emit(NodeKind::Key) {
            Ok(id) => {
                self.key = Some(id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn emit_value(&mut self) -> Result<(), ParseError> {
        match self.emit(NodeKind::Value) {
            Ok(id) => {
                self.value = Some(id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn emit_section(&mut self) -> Result<(), ParseError> {
        match self.emit(NodeKind::Section) {
            Ok(id) => {
                self.header = Some(id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn emit_label(&mut self) -> Result<(), ParseError> {
        match self.emit(NodeKind::Label) {
            Ok(id) => {
                self.header_label = Some(id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn link(&mut self, from: NodeId, to: Option<NodeId>) {
        if let Some(node) = self.ctx.arena.get_mut(from) {
            node.set_next(to);
        }
    }

    /// Links the nodes of the finished line into the document.
    fn commit(&mut self) {
        if let Some(section) = self.header.take() {
            let label = self.header_label.take();
            self.link(section, label);
            self.section = section;
            self.label = label;
            self.tail = match label {
                Some(label) => label,
                None => section,
            };
        }
        if let Some(key) = self.key.take() {
            let value = self.value.take();
            self.link(self.tail, Some(key));
            self.link(key, value);
            self.tail = match value {
                Some(value) => value,
                None => key,
            };
        }
        self.marks = (
            self.ctx.arena.used_forward(),
            self.ctx.arena.used_backward(),
        );
    }

    /// Handles the newline at the cursor.
    fn end_line(&mut self) -> Result<(), ParseError> {
        self.commit();
        self.state = LexState::LineStart;
        let next = self.cursor + 1;
        if next as usize >= self.bytes.len() {
            return Ok(());
        }
        self.line_start = next;
        self.line_number += 1;
        match self.ctx.lines.push(next) {
            Ok(index) => {
                self.line = index;
                Ok(())
            }
            Err(kind) => Err(self.set_error(kind, next, next)),
        }
    }

    fn step(&mut self, b: u8) -> Result<(), ParseError> {
        let at = self.cursor;
        match self.state {
            LexState::LineStart => match b {
                b'\n' => return self.end_line(),
                b'#' | b';' => self.state = LexState::Comment,
                b'[' => self.state = LexState::SectionOpen,
                b'\r' => self.state = LexState::LineEnd,
                _ if is_name_byte(b) => {
                    self.mark = at;
                    self.state = LexState::KeyName;
                }
                _ => return Err(self.syntax(at)),
            },
            LexState::Comment => {
                if b == b'\n' {
                    return self.end_line();
                }
            }
            LexState::KeyName => {
                if is_name_byte(b) {
                    return Ok(());
                }
                let next = match b {
                    b'=' => LexState::BeforeValue,
                    b'\n' => LexState::LineStart,
                    _ if is_blank(b) => LexState::AfterKey,
                    _ => return Err(self.syntax(at)),
                };
                if let Err(e) = self.emit_key() {
                    return Err(e);
                }
                if b == b'\n' {
                    return self.end_line();
                }
                self.state = next;
            }
            LexState::AfterKey => match b {
                b'=' => self.state = LexState::BeforeValue,
                b'\n' => return self.end_line(),
                _ if is_blank(b) => {}
                _ => return Err(self.syntax(at)),
            },
            LexState::BeforeValue => match b {
                b'\n' => {
                    self.mark = at;
                    if let Err(e) = self.emit_value() {
                        return Err(e);
                    }
                    return self.end_line();
                }
                _ if is_blank(b) => {}
                _ => {
                    self.mark = at;
                    self.state = LexState::Value;
                }
            },
            LexState::Value => {
                if b == b'\n' {
                    if let Err(e) = self.emit_value() {
                        return Err(e);
                    }
                    return self.end_line();
                }
            }
            LexState::SectionOpen => match b {
                _ if is_blank(b) => {}
                _ if is_name_byte(b) => {
                    self.mark = at;
                    self.state = LexState::SectionName;
                }
                _ => return Err(self.syntax(at)),
            },
            LexState::SectionName => {
                if is_name_byte(b) {
                    return Ok(());
                }
                let next = match b {
                    b':' => LexState::LabelOpen,
                    b']' => LexState::LineEnd,
                    _ if is_blank(b) => LexState::AfterSectionName,
                    _ => return Err(self.syntax(at)),
                };
                if let Err(e) = self.emit_section() {
                    return Err(e);
                }
                self.state = next;
            }
            LexState::AfterSectionName => match b {
                b':' => self.state = LexState::LabelOpen,
                b']' => self.state = LexState::LineEnd,
                _ if is_blank(b) => {}
                _ => return Err(self.syntax(at)),
            },
            LexState::LabelOpen => match b {
                _ if is_blank(b) => {}
                _ if is_name_byte(b) => {
                    self.mark = at;
                    self.state = LexState::LabelName;
                }
                _ => return Err(self.syntax(at)),
            },
            LexState::LabelName => {
                if is_name_byte(b) {
                    return Ok(());
                }
                let next = match b {
                    b']' => LexState::LineEnd,
                    _ if is_blank(b) => LexState::AfterLabel,
                    _ => return Err(self.syntax(at)),
                };
                if let Err(e) = self.emit_label() {
                    return Err(e);
                }
                self.state = next;
            }
            LexState::AfterLabel => match b {
                b']' => self.state = LexState::LineEnd,
                _ if is_blank(b) => {}
                _ => return Err(self.syntax(at)),
            },
            LexState::LineEnd => match b {
                b'\n' => return self.end_line(),
                _ if is_blank(b) => {}
                _ => return Err(self.syntax(at)),
            },
            LexState::Rejected => return Err(self.syntax(at)),
        }
        Ok(())
    }

    /// End of input terminates the last line like a newline would.
    fn finish(&mut self) -> Result<(), ParseError> {
        let emitted = match self.state {
            LexState::LineStart
            | LexState::Comment
            | LexState::AfterKey
            | LexState::LineEnd => Ok(()),
            LexState::KeyName => self.emit_key(),
            LexState::BeforeValue => {
                self.mark = self.cursor;
                self.emit_value()
            }
            LexState::Value => self.emit_value(),
            LexState::SectionOpen
            | LexState::SectionName
            | LexState::AfterSectionName
            | LexState::LabelOpen
            | LexState::LabelName
            | LexState::AfterLabel
            | LexState::Rejected => Err(self.syntax(self.cursor)),
        };
        if let Err(e) = emitted {
            return Err(e);
        }
        self.commit();
        self.state = LexState::LineStart;
        Ok(())
    }

    fn run(&mut self) -> Result<(), ParseError> {
        let bytes = self.bytes;
        while let Some(&b) = bytes.get(self.cursor as usize) {
            if let Err(e) = self.step(b) {
                return Err(e);
            }
            self.cursor += 1;
        }
        self.finish()
    }

    /// Turns the outcome of [`Scanner::run`] into the state for the next call.
    fn conclude(mut self, result: Result<(), ParseError>) -> Result<(), Error> {
        if result.is_ok() {
            trace!(
                nodes = self.ctx.node_count(),
                lines = self.ctx.lines.len(),
                "document complete"
            );
            self.ctx.resume = Resume::START;
            return Ok(());
        }
        let error = self.take_error();
        if error.kind.is_capacity() {
            // Drop whatever the unfinished line allocated and restart it next call.
            self.ctx.arena.rollback(self.marks.0, self.marks.1);
            self.ctx.resume = Resume {
                state: LexState::LineStart,
                offset: self.line_start,
                line: self.line_number,
                section: Some(self.section),
                label: self.label,
            };
            debug!(
                kind = %error.kind,
                offset = self.line_start,
                line = self.line_number,
                "storage exhausted, parse can be resumed"
            );
        } else {
            self.ctx.resume = Resume {
                state: LexState::Rejected,
                offset: error.span.start,
                line: self.line_number,
                section: None,
                label: None,
            };
            debug!(offset = error.span.start, "syntax error, document rejected");
            self.ctx.log(None, error);
        }
        Err(error)
    }
}

/// Section, label, key and value.
const CARRY_LABEL_MIN_NODES: u32 = 4;

/// Where a call starts scanning.
struct Start {
    offset: u32,
    line: u32,
    line_number: u32,
    section: NodeId,
    label: Option<NodeId>,
}

impl<'a> Context<'a> {
    /// Parses `text`, or continues parsing it after a capacity error.
    ///
    /// Every call releases the nodes of the previous one, so any [`NodeId`]
    /// obtained earlier must be looked up again afterwards. The section that
    /// was open when a previous call ran out of storage is carried over
    /// together with its used flag. Its label node is carried only when the
    /// storage holds at least four nodes; [`Context::label_text`] finds the
    /// label either way.
    ///
    /// On [`ErrorKind::NodeCapacity`] or [`ErrorKind::LineCapacity`] the nodes
    /// of every complete line scanned so far stay queryable; process them,
    /// then call `parse` again with the same `text`. A line that does not fit
    /// into empty storage fails the same way on every call.
    ///
    /// On [`ErrorKind::Syntax`] the document is rejected and every later call
    /// fails until [`Context::reset`].
    pub fn parse(&mut self, text: &'a [u8]) -> Result<(), Error> {
        if self.resume.state == LexState::Rejected {
            let at = self.resume.offset;
            return Err(Error::from((ErrorKind::Syntax, Span::new(at, at))));
        }
        if text.len() >= u32::MAX as usize {
            return Err(Error::from(ErrorKind::FileTooLarge));
        }
        self.errors.clear();
        self.text = text;

        let resume = self.resume;
        let carried = match resume.section {
            Some(section) => self.carry(section, resume.label),
            None => None,
        };
        let seeded = match carried {
            Some((section, label)) => self.reseed(section, label, resume),
            None => self.start_document(),
        };
        let start = match seeded {
            Ok(start) => start,
            Err(kind) => {
                debug!(kind = %kind, "storage too small to start parsing");
                return Err(Error::from(kind));
            }
        };
        trace!(
            offset = start.offset,
            line = start.line_number,
            resumed = resume.section.is_some(),
            "parse"
        );

        let mut scanner = Scanner {
            bytes: text,
            cursor: start.offset,
            state: LexState::LineStart,
            mark: start.offset,
            line: start.line,
            line_start: start.offset,
            line_number: start.line_number,
            section: start.section,
            label: start.label,
            tail: match start.label {
                Some(label) => label,
                None => start.section,
            },
            marks: (self.arena.used_forward(), self.arena.used_backward()),
            key: None,
            value: None,
            header: None,
            header_label: None,
            error_kind: None,
            error_span: Span::default(),
            ctx: self,
        };
        let result = scanner.run();
        scanner.conclude(result)
    }

    /// Copies the open section (and label) out of storage along with the
    /// absolute position of their line, before the arena is reset.
    fn carry(
        &self,
        section: NodeId,
        label: Option<NodeId>,
    ) -> Option<((Node, u32, u32), Option<Node>)> {
        let node = match self.arena.get(section) {
            Some(node) => *node,
            None => return None,
        };
        let line = (self.lines.offset(node.line), self.lines.number(node.line));
        let label = match label {
            Some(label) => self.arena.get(label).copied(),
            None => None,
        };
        Some(((node, line.0, line.1), label))
    }

    fn start_document(&mut self) -> Result<Start, ErrorKind> {
        self.arena.reset();
        self.lines.reset();
        if let Err(kind) = self.lines.push(0) {
            return Err(kind);
        }
        // Keys before the first header belong to an unnamed section.
        let section = match self.arena.alloc(Node::new(NodeKind::Section, 0, 0, 0)) {
            Ok(id) => id,
            Err(kind) => return Err(kind),
        };
        Ok(Start {
            offset: 0,
            line: 0,
            line_number: 0,
            section,
            label: None,
        })
    }

    fn reseed(
        &mut self,
        (mut section, line_offset, line_number): (Node, u32, u32),
        label: Option<Node>,
        resume: Resume,
    ) -> Result<Start, ErrorKind> {
        let offset = resume.offset.min(self.text.len() as u32);
        // The label node is only carried when a section, its label and a full
        // assignment fit together. Otherwise it is read back from the header.
        let label = if self.arena.capacity() >= CARRY_LABEL_MIN_NODES {
            label
        } else {
            None
        };
        // Fail before touching storage so the carried section survives.
        let nodes = 1 + label.is_some() as u32;
        if self.arena.capacity() < nodes {
            return Err(ErrorKind::NodeCapacity);
        }
        let lines = if offset == line_offset { 1 } else { 2 };
        if self.lines.capacity() < lines {
            return Err(ErrorKind::LineCapacity);
        }
        self.arena.reset();
        let line = match self.lines.seed(line_offset, line_number, offset, resume.line) {
            Ok(line) => line,
            Err(kind) => return Err(kind),
        };
        section.line = 0;
        section.set_next(None);
        let section = match self.arena.alloc(section) {
            Ok(id) => id,
            Err(kind) => return Err(kind),
        };
        let label = match label {
            Some(mut label) => {
                label.line = 0;
                label.set_next(None);
                match self.arena.alloc(label) {
                    Ok(id) => Some(id),
                    Err(kind) => return Err(kind),
                }
            }
            None => None,
        };
        if let Some(label) = label
            && let Some(node) = self.arena.get_mut(section)
        {
            node.set_next(Some(label));
        }
        Ok(Start {
            offset,
            line,
            line_number: resume.line,
            section,
            label,
        })
    }
}

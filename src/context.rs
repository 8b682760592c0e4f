//! Parse state that outlives a single [`Context::parse`] call.

use crate::arena::{Node, NodeArena, NodeId, NodeKind};
use crate::error::{Error, ErrorKind, ErrorLog};
use crate::lines::LineTable;
use crate::parser::LexState;
use crate::span::Span;

#[cfg(test)]
#[path = "./context_tests.rs"]
mod tests;

/// Where the next [`Context::parse`] call picks up.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Resume {
    pub state: LexState,
    /// Absolute byte offset into the document.
    pub offset: u32,
    /// Absolute line number of `offset`.
    pub line: u32,
    /// The section that was open when the previous call returned.
    pub section: Option<NodeId>,
    pub label: Option<NodeId>,
}

impl Resume {
    pub const START: Resume = Resume {
        state: LexState::LineStart,
        offset: 0,
        line: 0,
        section: None,
        label: None,
    };
}

/// Parser state over caller-provided node and line storage.
///
/// A `Context` never allocates: every node lives in the `nodes` slice and every
/// line offset in the `lines` slice passed to [`Context::new`]. When either
/// runs out, [`Context::parse`] returns a capacity error and the next call
/// continues where this one stopped.
///
/// ```
/// use ini_spanner::{Context, Node};
///
/// let mut nodes = [Node::EMPTY; 32];
/// let mut lines = [0u32; 16];
/// let mut ctx = Context::new(&mut nodes, &mut lines);
///
/// ctx.parse(b"[server]\nport = 8080\n")?;
/// let server = ctx.section(b"server").unwrap();
/// let port = ctx.key(server, b"port").unwrap();
/// assert_eq!(ctx.read::<u16>(port)?, 8080);
/// # Ok::<(), ini_spanner::Error>(())
/// ```
pub struct Context<'a> {
    pub(crate) text: &'a [u8],
    pub(crate) arena: NodeArena<'a>,
    pub(crate) lines: LineTable<'a>,
    pub(crate) resume: Resume,
    pub(crate) errors: ErrorLog,
}

impl<'a> Context<'a> {
    /// Creates a context that stores up to `nodes.len()` nodes and
    /// `lines.len()` line offsets per parse call.
    pub fn new(nodes: &'a mut [Node], lines: &'a mut [u32]) -> Self {
        Context {
            text: &[],
            arena: NodeArena::new(nodes),
            lines: LineTable::new(lines),
            resume: Resume::START,
            errors: ErrorLog::new(),
        }
    }

    /// Forgets the current document so the next [`Context::parse`] starts a
    /// new one. Required after a syntax error.
    pub fn reset(&mut self) {
        self.resume = Resume::START;
        self.arena.reset();
        self.lines.reset();
        self.errors.clear();
        self.text = &[];
    }

    /// The buffer passed to the most recent [`Context::parse`] call.
    #[inline]
    pub fn source(&self) -> &'a [u8] {
        self.text
    }

    /// Node storage size.
    #[inline]
    pub fn node_capacity(&self) -> usize {
        self.arena.capacity() as usize
    }

    /// Line table size.
    #[inline]
    pub fn line_capacity(&self) -> usize {
        self.lines.capacity()
    }

    /// Number of nodes allocated by the current call, sections included.
    #[inline]
    pub fn node_count(&self) -> usize {
        (self.arena.used_forward() + self.arena.used_backward()) as usize
    }

    /// The automaton state the next call resumes in.
    #[inline]
    pub fn state(&self) -> LexState {
        self.resume.state
    }

    /// Absolute byte offset the next call resumes at.
    #[inline]
    pub fn resume_offset(&self) -> usize {
        self.resume.offset as usize
    }

    /// Returns `true` if the next [`Context::parse`] call continues the
    /// current document rather than starting a new one.
    pub fn is_resumable(&self) -> bool {
        self.resume.section.is_some() && self.resume.state != LexState::Rejected
    }

    /// Errors recorded since the start of the last parse call.
    #[inline]
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Total number of errors, including those the log had no room for.
    #[inline]
    pub fn error_count(&self) -> usize {
        self.errors.total()
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the node behind `id` if it is still valid.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Kind of the node behind `id`.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.arena.get(id).map(Node::kind)
    }

    /// Whether the node has been consumed by a lookup or binding.
    pub fn is_used(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(Node::is_used)
    }

    /// Absolute byte offset of the node's first byte.
    pub fn offset(&self, id: NodeId) -> Option<usize> {
        let node = self.arena.get(id)?;
        Some(self.lines.offset(node.line) as usize + node.column as usize)
    }

    /// Zero-based absolute line number of the node.
    pub fn line(&self, id: NodeId) -> Option<usize> {
        let node = self.arena.get(id)?;
        Some(self.lines.number(node.line) as usize)
    }

    /// Zero-based byte column of the node within its line.
    pub fn column(&self, id: NodeId) -> Option<usize> {
        self.arena.get(id).map(Node::column)
    }

    /// Length of the node's token in bytes.
    pub fn len(&self, id: NodeId) -> Option<usize> {
        self.arena.get(id).map(Node::len)
    }

    /// Byte span of the node within [`Context::source`].
    pub fn span(&self, id: NodeId) -> Option<Span> {
        let node = self.arena.get(id)?;
        let start = self.lines.offset(node.line) + node.column;
        Some(Span::new(start, start + node.len as u32))
    }

    /// The source bytes of the node, or an empty slice if `id` is stale.
    pub fn text(&self, id: NodeId) -> &'a [u8] {
        let text = self.text;
        match self.span(id) {
            Some(span) => text.get(std::ops::Range::<usize>::from(span)).unwrap_or(&[]),
            None => &[],
        }
    }

    /// Exact byte comparison of a node's text. An absent node equals nothing.
    pub fn eq(&self, id: Option<NodeId>, bytes: &[u8]) -> bool {
        match id {
            Some(id) => self.node(id).is_some() && self.text(id) == bytes,
            None => false,
        }
    }

    /// Builds an [`Error`] positioned on the node.
    pub fn error_at(&self, id: NodeId, kind: ErrorKind) -> Error {
        match self.arena.get(id) {
            Some(node) => {
                let start = self.lines.offset(node.line) + node.column;
                Error {
                    kind,
                    span: Span::new(start, start + node.len as u32),
                    line_info: Some((self.lines.number(node.line) as usize, node.column as usize)),
                }
            }
            None => Error::from(kind),
        }
    }

    /// Records an error against a node and returns it.
    ///
    /// Use this for application-level checks so they are rendered together
    /// with parse and binding errors.
    pub fn add_error(&mut self, id: NodeId, kind: ErrorKind) -> Error {
        let error = self.error_at(id, kind);
        self.log(Some(id), error);
        error
    }

    #[inline]
    pub(crate) fn log(&mut self, node: Option<NodeId>, error: Error) {
        if !self.errors.push(node, error) {
            trace!(total = self.errors.total(), "error log full, counting only");
        }
    }

    /// Marks a node as consumed. The flag is only cleared by the next parse call.
    #[inline]
    pub(crate) fn mark_used(&mut self, id: NodeId) {
        if let Some(node) = self.arena.get_mut(id) {
            node.used = true;
        }
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("nodes", &self.node_count())
            .field("node_capacity", &self.node_capacity())
            .field("lines", &self.lines.len())
            .field("state", &self.resume.state)
            .field("offset", &self.resume.offset)
            .field("errors", &self.errors)
            .finish()
    }
}

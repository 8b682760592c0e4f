#![allow(clippy::question_mark)]
use crate::Span;
use crate::arena::NodeId;
use std::fmt::{self, Debug, Display};

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;

/// Number of errors a [`Context`](crate::Context) keeps for rendering.
///
/// Further errors are still counted, see [`ErrorLog::total`].
pub const ERROR_LOG_CAPACITY: usize = 10;

/// Error produced while parsing, converting, binding or validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    /// The error kind
    pub kind: ErrorKind,
    /// The span where the error occurs.
    pub span: Span,
    /// Zero-based absolute line and column of `span.start`, when the error was
    /// raised against a parsed node.
    pub line_info: Option<(usize, usize)>,
}

impl std::error::Error for Error {}

impl From<(ErrorKind, Span)> for Error {
    fn from((kind, span): (ErrorKind, Span)) -> Self {
        Self {
            kind,
            span,
            line_info: None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            span: Span::default(),
            line_info: None,
        }
    }
}

/// The closed set of failures the parser and binding layer can report.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input does not match the line grammar.
    Syntax,

    /// The node storage handed to the context is full.
    ///
    /// Recoverable: call [`Context::parse`](crate::Context::parse) again to
    /// continue from the start of the line that did not fit.
    NodeCapacity,

    /// The line table handed to the context is full. Recoverable like
    /// [`ErrorKind::NodeCapacity`].
    LineCapacity,

    /// The input is larger than the maximum supported size of 4GiB.
    FileTooLarge,

    /// A string value does not fit the destination buffer.
    StringTooLarge,

    /// A value is not one of the accepted boolean spellings.
    BoolFormat,

    /// A value is not an integer in the requested base.
    IntegerFormat,

    /// An integer is below the minimum of its destination.
    IntegerTooSmall,

    /// An integer is above the maximum of its destination.
    IntegerTooLarge,

    /// A negative integer was bound to an unsigned destination.
    IntegerNegative,

    /// A value is not a floating point number.
    NumberFormat,

    /// A field descriptor names a type/width pair that cannot be assigned.
    InvalidType,

    /// A section was never looked up or bound.
    UnusedSection,

    /// A key was never looked up or bound.
    UnusedField,

    /// The section loader rejected a section.
    MissingSection,

    /// No field descriptor matches a key.
    MissingField,
}

impl ErrorKind {
    /// Returns `true` for the errors after which parsing may be resumed.
    #[inline]
    pub fn is_capacity(self) -> bool {
        matches!(self, Self::NodeCapacity | Self::LineCapacity)
    }

    /// Human readable message, as printed by the diagnostics renderer.
    pub fn message(self) -> &'static str {
        match self {
            Self::Syntax => "invalid syntax",
            Self::NodeCapacity => "node buffer full",
            Self::LineCapacity => "line buffer full",
            Self::FileTooLarge => "file is too large (maximum 4GiB)",
            Self::StringTooLarge => "string value too large",
            Self::BoolFormat => "invalid boolean format",
            Self::IntegerFormat => "invalid integer format",
            Self::IntegerTooSmall => "integer too small",
            Self::IntegerTooLarge => "integer too large",
            Self::IntegerNegative => "integer must be unsigned",
            Self::NumberFormat => "invalid number format",
            Self::InvalidType => "invalid type",
            Self::UnusedSection => "unsupported section",
            Self::UnusedField => "unsupported field",
            Self::MissingSection => "missing section",
            Self::MissingField => "missing field",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Syntax => "syntax",
            Self::NodeCapacity => "node-capacity",
            Self::LineCapacity => "line-capacity",
            Self::FileTooLarge => "file-too-large",
            Self::StringTooLarge => "string-too-large",
            Self::BoolFormat => "bool-format",
            Self::IntegerFormat => "integer-format",
            Self::IntegerTooSmall => "integer-too-small",
            Self::IntegerTooLarge => "integer-too-large",
            Self::IntegerNegative => "integer-negative",
            Self::NumberFormat => "number-format",
            Self::InvalidType => "invalid-type",
            Self::UnusedSection => "unused-section",
            Self::UnusedField => "unused-field",
            Self::MissingSection => "missing-section",
            Self::MissingField => "missing-field",
        };
        f.write_str(text)
    }
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((line, column)) = self.line_info {
            if let Err(err) = write!(f, "{}:{}: ", line + 1, column + 1) {
                return Err(err);
            }
        }
        f.write_str(self.kind.message())
    }
}

/// One entry of the [`ErrorLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggedError {
    /// The node the error is anchored to, if it was raised against one.
    /// Only valid until the next call to [`Context::parse`](crate::Context::parse).
    pub node: Option<NodeId>,
    /// The error itself, with its position resolved at the time it was logged.
    pub error: Error,
}

impl LoggedError {
    const EMPTY: LoggedError = LoggedError {
        node: None,
        error: Error {
            kind: ErrorKind::Syntax,
            span: Span { start: 0, end: 0 },
            line_info: None,
        },
    };

    fn position(&self) -> (usize, usize) {
        self.error.line_info.unwrap_or((0, 0))
    }
}

/// Bounded, lossy error accumulator.
///
/// Stores the first [`ERROR_LOG_CAPACITY`] errors and counts the rest.
#[derive(Clone)]
pub struct ErrorLog {
    entries: [LoggedError; ERROR_LOG_CAPACITY],
    total: u32,
}

impl ErrorLog {
    /// Creates an empty log.
    pub const fn new() -> Self {
        Self {
            entries: [LoggedError::EMPTY; ERROR_LOG_CAPACITY],
            total: 0,
        }
    }

    /// Records an error. Returns `false` if it was only counted.
    pub fn push(&mut self, node: Option<NodeId>, error: Error) -> bool {
        let index = self.total as usize;
        self.total = self.total.saturating_add(1);
        match self.entries.get_mut(index) {
            Some(slot) => {
                *slot = LoggedError { node, error };
                true
            }
            None => false,
        }
    }

    /// Number of errors reported, including those that were not stored.
    #[inline]
    pub fn total(&self) -> usize {
        self.total as usize
    }

    /// Number of stored errors.
    #[inline]
    pub fn len(&self) -> usize {
        self.total().min(ERROR_LOG_CAPACITY)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Returns `true` if errors were counted but dropped.
    #[inline]
    pub fn overflowed(&self) -> bool {
        self.total() > ERROR_LOG_CAPACITY
    }

    /// The stored errors in the order they were reported.
    #[inline]
    pub fn entries(&self) -> &[LoggedError] {
        &self.entries[..self.len()]
    }

    /// The first error reported, if any.
    pub fn first(&self) -> Option<&LoggedError> {
        self.entries().first()
    }

    /// Copy of the stored errors ordered by source position.
    pub(crate) fn sorted(&self) -> ([LoggedError; ERROR_LOG_CAPACITY], usize) {
        let mut copy = self.entries;
        let len = self.len();
        copy[..len].sort_by_key(LoggedError::position);
        (copy, len)
    }

    pub fn clear(&mut self) {
        self.total = 0;
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLog")
            .field("entries", &self.entries())
            .field("total", &self.total)
            .finish()
    }
}

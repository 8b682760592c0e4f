//! A bounded-memory INI parser that can pause and resume.
//!
//! The caller hands a [`Context`] two slices: node storage and a line table.
//! Parsing never allocates beyond them. When either fills up,
//! [`Context::parse`] returns a capacity error, the lines scanned so far stay
//! queryable, and the next call picks up at the start of the line that did not
//! fit, with the open section carried over.
//!
//! Every node keeps its position, so errors from conversions, bindings and the
//! unused-key sweep point at the exact source bytes.
//!
//! # Examples
//!
//! ```
//! use ini_spanner::{Context, ErrorKind, Node};
//!
//! let text = b"\
//! name = demo
//!
//! [limits]
//! max-open = 0x40
//! timeout = 2.5
//! ";
//!
//! let mut nodes = [Node::EMPTY; 16];
//! let mut lines = [0u32; 8];
//! let mut ctx = Context::new(&mut nodes, &mut lines);
//! ctx.parse(text)?;
//!
//! let global = ctx.section(b"").unwrap();
//! let name = ctx.key(global, b"name").unwrap();
//! assert_eq!(ctx.read::<&str>(name)?, "demo");
//!
//! let limits = ctx.section(b"limits").unwrap();
//! let max_open = ctx.key(limits, b"max-open").unwrap();
//! assert_eq!(ctx.read::<u32>(max_open)?, 64);
//!
//! // `timeout` was never looked up.
//! assert!(!ctx.validate());
//! assert_eq!(ctx.errors().first().unwrap().error.kind, ErrorKind::UnusedField);
//! # Ok::<(), ini_spanner::Error>(())
//! ```
//!
//! # Resuming
//!
//! ```
//! use ini_spanner::{Context, Node};
//!
//! let text = b"[a]\nx = 1\ny = 2\nz = 3\n";
//! let mut nodes = [Node::EMPTY; 4];
//! let mut lines = [0u32; 8];
//! let mut ctx = Context::new(&mut nodes, &mut lines);
//!
//! let mut seen = Vec::new();
//! loop {
//!     let result = ctx.parse(text);
//!     if let Some(a) = ctx.section(b"a") {
//!         for (key, _) in ctx.keys(a) {
//!             seen.push(ctx.text(key));
//!         }
//!     }
//!     match result {
//!         Ok(()) => break,
//!         Err(e) if e.kind.is_capacity() => continue,
//!         Err(e) => return Err(e),
//!     }
//! }
//! assert_eq!(seen, [&b"x"[..], b"y", b"z"]);
//! # Ok::<(), ini_spanner::Error>(())
//! ```

#[macro_use]
mod tracing_macros;

mod arena;
mod bind;
mod context;
mod convert;
mod error;
mod lines;
mod lookup;
mod parser;
mod report;
mod span;
mod validate;

pub use arena::{Node, NodeId, NodeKind};
pub use bind::{BindSection, Bindable, Field, Section, SectionLoader, Slot, ValueType, assign};
pub use context::Context;
pub use convert::{
    FromToken, copy_str, narrow_signed, narrow_unsigned, parse_bool, parse_f64, parse_int,
};
pub use error::{ERROR_LOG_CAPACITY, Error, ErrorKind, ErrorLog, LoggedError};
pub use lookup::{Keys, Sections};
pub use parser::LexState;
pub use span::{Span, Spanned};

#[cfg(feature = "serde")]
pub mod impl_serde;

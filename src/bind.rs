//! Descriptor-driven binding of section keys into Rust structs.
//!
//! A [`Field`] names a key and knows how to reach the matching member of a
//! target struct; a [`Section`] pairs a field table with a target. The
//! [`SectionLoader`] given to [`Context::bind`] decides which section of the
//! document goes where.
//!
//! ```
//! use ini_spanner::{Context, Field, Node, Section, SectionLoader, BindSection, ErrorKind, field};
//!
//! #[derive(Default)]
//! struct Server {
//!     port: u16,
//!     verbose: bool,
//! }
//!
//! static SERVER: &[Field<Server>] = &[field!(Server, port), field!(Server, verbose)];
//!
//! struct Loader<'t> {
//!     server: Section<'t, Server>,
//! }
//!
//! impl SectionLoader for Loader<'_> {
//!     fn load(&mut self, name: &[u8], _label: Option<&[u8]>) -> Result<&mut dyn BindSection, ErrorKind> {
//!         match name {
//!             b"server" => Ok(&mut self.server),
//!             _ => Err(ErrorKind::MissingSection),
//!         }
//!     }
//! }
//!
//! let mut nodes = [Node::EMPTY; 16];
//! let mut lines = [0u32; 8];
//! let mut ctx = Context::new(&mut nodes, &mut lines);
//! ctx.parse(b"[server]\nport = 8080\nverbose = yes\n")?;
//!
//! let mut server = Server::default();
//! let mut loader = Loader { server: Section::new(SERVER, &mut server) };
//! assert!(ctx.bind(&mut loader));
//! drop(loader);
//! assert_eq!(server.port, 8080);
//! assert!(server.verbose);
//! # Ok::<(), ini_spanner::Error>(())
//! ```

#![allow(clippy::question_mark)]

use crate::arena::{NodeId, NodeKind};
use crate::context::Context;
use crate::convert::{copy_str, narrow_signed, narrow_unsigned, parse_bool, parse_f64, parse_int};
use crate::error::ErrorKind;

#[cfg(test)]
#[path = "./bind_tests.rs"]
mod tests;

/// The semantic type a [`Field`] expects its value to have.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ValueType {
    /// Raw text, into a `String` or a zero-terminated byte buffer.
    String,
    Bool,
    /// Signed integer, prefix-detected radix.
    Signed,
    /// Unsigned integer, prefix-detected radix. Negative values are rejected.
    Unsigned,
    /// Floating point.
    Number,
    /// The value node itself, without conversion.
    Node,
}

/// A typed, borrowed destination for one converted value.
#[derive(Debug)]
pub enum Slot<'t> {
    Text(&'t mut [u8]),
    String(&'t mut String),
    Bool(&'t mut bool),
    I8(&'t mut i8),
    I16(&'t mut i16),
    I32(&'t mut i32),
    I64(&'t mut i64),
    U8(&'t mut u8),
    U16(&'t mut u16),
    U32(&'t mut u32),
    U64(&'t mut u64),
    F32(&'t mut f32),
    F64(&'t mut f64),
    Node(&'t mut Option<NodeId>),
}

/// A struct member type that [`field!`](crate::field) can bind to.
pub trait Bindable {
    const TYPE: ValueType;
    /// Size of the destination in bytes.
    const WIDTH: usize;
    fn slot(&mut self) -> Slot<'_>;
}

macro_rules! bindable {
    ($($ty:ty => $kind:ident, $variant:ident;)+) => {$(
        impl Bindable for $ty {
            const TYPE: ValueType = ValueType::$kind;
            const WIDTH: usize = std::mem::size_of::<$ty>();
            fn slot(&mut self) -> Slot<'_> {
                Slot::$variant(self)
            }
        }
    )+};
}

bindable! {
    bool => Bool, Bool;
    i8 => Signed, I8;
    i16 => Signed, I16;
    i32 => Signed, I32;
    i64 => Signed, I64;
    u8 => Unsigned, U8;
    u16 => Unsigned, U16;
    u32 => Unsigned, U32;
    u64 => Unsigned, U64;
    f32 => Number, F32;
    f64 => Number, F64;
}

impl Bindable for String {
    const TYPE: ValueType = ValueType::String;
    const WIDTH: usize = std::mem::size_of::<String>();
    fn slot(&mut self) -> Slot<'_> {
        Slot::String(self)
    }
}

impl<const N: usize> Bindable for [u8; N] {
    const TYPE: ValueType = ValueType::String;
    const WIDTH: usize = N;
    fn slot(&mut self) -> Slot<'_> {
        Slot::Text(self)
    }
}

impl Bindable for Option<NodeId> {
    const TYPE: ValueType = ValueType::Node;
    const WIDTH: usize = std::mem::size_of::<Option<NodeId>>();
    fn slot(&mut self) -> Slot<'_> {
        Slot::Node(self)
    }
}

/// Describes how the key `name` is stored in a `T`.
pub struct Field<T> {
    pub name: &'static str,
    pub ty: ValueType,
    /// Destination size in bytes.
    pub width: usize,
    accessor: for<'t> fn(&'t mut T) -> Slot<'t>,
}

impl<T> Field<T> {
    /// Builds a descriptor by hand. A `ty`/`width` pair that does not match
    /// the slot returned by `accessor` fails with [`ErrorKind::InvalidType`]
    /// when a key is bound.
    pub const fn raw(
        name: &'static str,
        ty: ValueType,
        width: usize,
        accessor: for<'t> fn(&'t mut T) -> Slot<'t>,
    ) -> Self {
        Field {
            name,
            ty,
            width,
            accessor,
        }
    }

    #[doc(hidden)]
    pub const fn member<V: Bindable>(
        name: &'static str,
        _project: for<'t> fn(&'t mut T) -> &'t mut V,
        accessor: for<'t> fn(&'t mut T) -> Slot<'t>,
    ) -> Self {
        Field::raw(name, V::TYPE, V::WIDTH, accessor)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("width", &self.width)
            .finish()
    }
}

/// Builds a [`Field`] for a struct member, keyed by the member name or by an
/// explicit key.
///
/// ```
/// # use ini_spanner::{Field, ValueType, field};
/// struct Limits { max_open: u32 }
/// let f: Field<Limits> = field!(Limits, max_open, "max-open");
/// assert_eq!(f.ty, ValueType::Unsigned);
/// assert_eq!(f.width, 4);
/// ```
#[macro_export]
macro_rules! field {
    ($ty:ty, $member:ident) => {
        $crate::field!($ty, $member, stringify!($member))
    };
    ($ty:ty, $member:ident, $name:expr) => {
        $crate::Field::<$ty>::member(
            $name,
            |target| &mut target.$member,
            |target| $crate::Bindable::slot(&mut target.$member),
        )
    };
}

fn expect_width(width: usize, size: usize) -> Result<(), ErrorKind> {
    if width == size {
        Ok(())
    } else {
        Err(ErrorKind::InvalidType)
    }
}

macro_rules! set {
    ($dest:expr, $value:expr) => {
        match $value {
            Ok(v) => {
                *$dest = v;
                Ok(())
            }
            Err(e) => Err(e),
        }
    };
}

/// Converts `token` as `ty` and stores it in `slot`.
///
/// `value` is the node the token came from, stored as-is for
/// [`ValueType::Node`].
pub fn assign(
    ty: ValueType,
    width: usize,
    slot: Slot<'_>,
    token: &[u8],
    value: Option<NodeId>,
) -> Result<(), ErrorKind> {
    let size = match &slot {
        Slot::Text(buf) => buf.len(),
        Slot::String(_) => std::mem::size_of::<String>(),
        Slot::Bool(_) => 1,
        Slot::I8(_) | Slot::U8(_) => 1,
        Slot::I16(_) | Slot::U16(_) => 2,
        Slot::I32(_) | Slot::U32(_) | Slot::F32(_) => 4,
        Slot::I64(_) | Slot::U64(_) | Slot::F64(_) => 8,
        Slot::Node(_) => std::mem::size_of::<Option<NodeId>>(),
    };
    if let Err(e) = expect_width(width, size) {
        return Err(e);
    }
    match (ty, slot) {
        (ValueType::String, Slot::Text(buf)) => match copy_str(token, buf) {
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        },
        (ValueType::String, Slot::String(dest)) => {
            dest.clear();
            dest.push_str(&String::from_utf8_lossy(token));
            Ok(())
        }
        (ValueType::Bool, Slot::Bool(dest)) => set!(dest, parse_bool(token)),
        (ValueType::Signed, slot) => {
            let parsed = match parse_int(token, 0) {
                Ok(i) => i,
                Err(e) => return Err(e),
            };
            match slot {
                Slot::I8(dest) => set!(dest, narrow_signed(parsed)),
                Slot::I16(dest) => set!(dest, narrow_signed(parsed)),
                Slot::I32(dest) => set!(dest, narrow_signed(parsed)),
                Slot::I64(dest) => set!(dest, narrow_signed(parsed)),
                _ => Err(ErrorKind::InvalidType),
            }
        }
        (ValueType::Unsigned, slot) => {
            let parsed = match parse_int(token, 0) {
                Ok(i) => i,
                Err(e) => return Err(e),
            };
            match slot {
                Slot::U8(dest) => set!(dest, narrow_unsigned(parsed)),
                Slot::U16(dest) => set!(dest, narrow_unsigned(parsed)),
                Slot::U32(dest) => set!(dest, narrow_unsigned(parsed)),
                Slot::U64(dest) => set!(dest, narrow_unsigned(parsed)),
                _ => Err(ErrorKind::InvalidType),
            }
        }
        (ValueType::Number, Slot::F64(dest)) => set!(dest, parse_f64(token)),
        (ValueType::Number, Slot::F32(dest)) => match parse_f64(token) {
            Ok(f) => {
                *dest = f as f32;
                Ok(())
            }
            Err(e) => Err(e),
        },
        (ValueType::Node, Slot::Node(dest)) => {
            *dest = value;
            Ok(())
        }
        _ => Err(ErrorKind::InvalidType),
    }
}

/// A bind target for one section.
pub trait BindSection {
    /// Stores the value of the key `name`. Fails with
    /// [`ErrorKind::MissingField`] if the key is unknown.
    fn assign(&mut self, name: &[u8], token: &[u8], value: Option<NodeId>) -> Result<(), ErrorKind>;
}

/// A field table paired with the struct it fills.
pub struct Section<'t, T> {
    fields: &'t [Field<T>],
    target: &'t mut T,
}

impl<'t, T> Section<'t, T> {
    pub fn new(fields: &'t [Field<T>], target: &'t mut T) -> Self {
        Section { fields, target }
    }

    /// Looks up the descriptor for `name`.
    pub fn field(&self, name: &[u8]) -> Option<&'t Field<T>> {
        self.fields.iter().find(|f| f.name.as_bytes() == name)
    }
}

impl<T> BindSection for Section<'_, T> {
    fn assign(&mut self, name: &[u8], token: &[u8], value: Option<NodeId>) -> Result<(), ErrorKind> {
        let field = match self.field(name) {
            Some(field) => field,
            None => return Err(ErrorKind::MissingField),
        };
        let slot = (field.accessor)(self.target);
        assign(field.ty, field.width, slot, token, value)
    }
}

/// Chooses the bind target for each section of a document.
pub trait SectionLoader {
    /// Returns the target for the section `name` (with its label, if any), or
    /// the error to report against the section header, typically
    /// [`ErrorKind::MissingSection`].
    fn load(&mut self, name: &[u8], label: Option<&[u8]>)
    -> Result<&mut dyn BindSection, ErrorKind>;
}

impl<'a> Context<'a> {
    /// Binds every key of `section` into `target`.
    ///
    /// Marks the section and every bound key used. Each failure is logged:
    /// unknown keys at the key, conversion errors at the value (or at the key
    /// when it has no value). Returns `false` if anything failed.
    pub fn bind_section(&mut self, section: NodeId, target: &mut dyn BindSection) -> bool {
        if self.kind(section) != Some(NodeKind::Section) {
            return false;
        }
        self.mark_used(section);
        let mut ok = true;
        let mut cursor = self.first_key(section);
        while let Some(id) = cursor {
            let node = match self.node(id) {
                Some(node) => *node,
                None => break,
            };
            cursor = node.next();
            match node.kind() {
                NodeKind::Key => {}
                NodeKind::Value => continue,
                NodeKind::Section | NodeKind::Label => break,
            }
            let value = self.value(id);
            let token = match value {
                Some(value) => self.text(value),
                None => &[],
            };
            match target.assign(self.text(id), token, value) {
                Ok(()) => self.mark_used(id),
                Err(kind) => {
                    ok = false;
                    let anchor = match (kind, value) {
                        (ErrorKind::MissingField, _) | (_, None) => id,
                        (_, Some(value)) => value,
                    };
                    trace!(kind = %kind, "key rejected");
                    self.add_error(anchor, kind);
                }
            }
        }
        ok
    }

    /// Runs `loader` over every section, oldest first, binding the keys of
    /// each section it accepts.
    ///
    /// The unnamed section is skipped when no keys precede the first header.
    /// Returns `false` if any section or key was rejected.
    pub fn bind<L: SectionLoader + ?Sized>(&mut self, loader: &mut L) -> bool {
        let mut ok = true;
        let mut cursor = self.next_section(None);
        while let Some(section) = cursor {
            cursor = self.next_section(Some(section));
            if self.is_implicit_empty(section) {
                continue;
            }
            let name = self.text(section);
            let label = self.label_text(section);
            match loader.load(name, label) {
                Ok(target) => {
                    if !self.bind_section(section, target) {
                        ok = false;
                    }
                }
                Err(kind) => {
                    ok = false;
                    debug!(
                        section = %String::from_utf8_lossy(name),
                        kind = %kind,
                        "section rejected"
                    );
                    self.add_error(section, kind);
                }
            }
        }
        ok
    }
}

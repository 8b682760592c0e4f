#![cfg_attr(docsrs, doc(cfg(feature = "serde")))]

//! Provides [`serde::Serialize`] support for spans and errors, so diagnostics
//! can be handed to tooling as structured data.

use crate::{Error, ErrorKind, Span, Spanned};
use serde::ser::{SerializeStruct, Serializer};

impl<T> serde::Serialize for Spanned<T>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl serde::Serialize for Span {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Span", 2)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end)?;
        state.end()
    }
}

/// Serialized as its kebab-case code, e.g. `"integer-too-large"`.
impl serde::Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (line, column) = match self.line_info {
            Some((line, column)) => (Some(line + 1), Some(column + 1)),
            None => (None, None),
        };
        let mut state = serializer.serialize_struct("Error", 5)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("message", self.kind.message())?;
        state.serialize_field("span", &self.span)?;
        state.serialize_field("line", &line)?;
        state.serialize_field("column", &column)?;
        state.end()
    }
}

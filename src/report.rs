//! Human readable rendering of errors and documents.

use crate::arena::NodeId;
use crate::context::Context;
use crate::span::Span;
use std::fmt;
use std::io::{self, Write};

#[cfg(test)]
#[path = "./report_tests.rs"]
mod tests;

#[derive(Copy, Clone)]
enum Tone {
    Location,
    Error,
    Range,
}

#[cfg(feature = "color")]
impl Tone {
    fn style(self) -> anstyle::Style {
        use anstyle::{AnsiColor, Style};
        match self {
            Tone::Location => Style::new().bold(),
            Tone::Error => AnsiColor::Red.on_default().bold(),
            Tone::Range => AnsiColor::Green.on_default().bold(),
        }
    }
}

fn paint<W: Write + ?Sized>(
    out: &mut W,
    color: bool,
    tone: Tone,
    args: fmt::Arguments<'_>,
) -> io::Result<()> {
    #[cfg(feature = "color")]
    if color {
        let style = tone.style();
        return write!(out, "{}{}{}", style.render(), args, style.render_reset());
    }
    let _ = (color, tone);
    out.write_fmt(args)
}

impl Context<'_> {
    /// Writes every logged error sorted by position, then a summary line.
    ///
    /// Each error is printed as `path:line:col: error: message`, followed by
    /// the source line and a `^` underline below the offending bytes. Nothing
    /// is written when the log is empty. `color` adds terminal styling.
    pub fn write_errors<W: Write + ?Sized>(
        &self,
        path: &str,
        out: &mut W,
        color: bool,
    ) -> io::Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let (sorted, len) = self.errors.sorted();
        for entry in &sorted[..len] {
            let error = entry.error;
            self.render(
                out,
                path,
                error.line_info,
                error.span,
                format_args!("{}", error.kind.message()),
                color,
            )?;
        }
        let shown = len;
        let total = self.errors.total();
        if shown < total {
            writeln!(out, "showing {shown} of {total} errors")
        } else if shown == 1 {
            writeln!(out, "showing 1 error")
        } else {
            writeln!(out, "showing {shown} errors")
        }
    }

    /// Writes the error log to standard error, styled when it is a terminal.
    pub fn eprint_errors(&self, path: &str) -> io::Result<()> {
        #[cfg(feature = "color")]
        {
            let mut out = anstream::stderr().lock();
            self.write_errors(path, &mut out, true)
        }
        #[cfg(not(feature = "color"))]
        {
            let mut out = io::stderr().lock();
            self.write_errors(path, &mut out, false)
        }
    }

    /// Writes a one-off message pointing at `node`, in the same format as
    /// [`Context::write_errors`].
    pub fn write_error<W: Write + ?Sized>(
        &self,
        node: NodeId,
        path: &str,
        out: &mut W,
        color: bool,
        message: fmt::Arguments<'_>,
    ) -> io::Result<()> {
        let position = match (self.line(node), self.column(node)) {
            (Some(line), Some(column)) => Some((line, column)),
            _ => None,
        };
        let span = self.span(node).unwrap_or_default();
        self.render(out, path, position, span, message, color)
    }

    fn render<W: Write + ?Sized>(
        &self,
        out: &mut W,
        path: &str,
        position: Option<(usize, usize)>,
        span: Span,
        message: fmt::Arguments<'_>,
        color: bool,
    ) -> io::Result<()> {
        let Some((line, column)) = position else {
            paint(out, color, Tone::Location, format_args!("{path}: "))?;
            paint(out, color, Tone::Error, format_args!("error: "))?;
            return writeln!(out, "{message}");
        };
        paint(
            out,
            color,
            Tone::Location,
            format_args!("{}:{}:{}: ", path, line + 1, column + 1),
        )?;
        paint(out, color, Tone::Error, format_args!("error: "))?;
        writeln!(out, "{message}")?;

        let text = self.text;
        let start = (span.start as usize).saturating_sub(column).min(text.len());
        let end = match text[start..].iter().position(|&b| b == b'\n') {
            Some(n) => start + n,
            None => text.len(),
        };
        let source = &text[start..end];
        out.write_all(b"    ")?;
        out.write_all(source)?;
        out.write_all(b"\n    ")?;
        for &b in source.iter().take(column) {
            if b == b'\t' {
                out.write_all(b"        ")?;
            } else {
                out.write_all(b" ")?;
            }
        }
        let width = (span.len() as usize).max(1);
        paint(
            out,
            color,
            Tone::Range,
            format_args!("{:^<width$}", "", width = width),
        )?;
        out.write_all(b"\n")
    }

    /// Writes the parsed document back out in normalised form.
    ///
    /// Headers print as `[name]` or `[name:label]`, keys as `key = value` (or
    /// a bare `key`), with a blank line after each non-empty section.
    pub fn write_document<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        for section in self.sections() {
            let name = self.text(section);
            if !name.is_empty() {
                out.write_all(b"[")?;
                out.write_all(name)?;
                if let Some(label) = self.label_text(section) {
                    out.write_all(b":")?;
                    out.write_all(label)?;
                }
                out.write_all(b"]\n")?;
            }
            let mut count = 0;
            for (key, value) in self.keys(section) {
                count += 1;
                out.write_all(self.text(key))?;
                if let Some(value) = value {
                    out.write_all(b" = ")?;
                    out.write_all(self.text(value))?;
                }
                out.write_all(b"\n")?;
            }
            if !name.is_empty() || count > 0 {
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

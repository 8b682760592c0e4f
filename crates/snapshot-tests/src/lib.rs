#![allow(missing_docs)]

use ini_spanner::{Context, Node, NodeId};
use std::fmt::Write;

/// Node storage generous enough for every document in these tests.
pub const NODES: usize = 256;
pub const LINES: usize = 128;

/// Parses `text` and hands the context to `f`, panicking with the rendered
/// errors if parsing fails.
pub fn parsed<R>(name: &str, text: &str, f: impl FnOnce(&mut Context<'_>) -> R) -> R {
    let mut nodes = vec![Node::EMPTY; NODES];
    let mut lines = vec![0u32; LINES];
    let mut ctx = Context::new(&mut nodes, &mut lines);
    if ctx.parse(text.as_bytes()).is_err() {
        panic!("unexpected parse errors:\n{}", emit_errors(name, &ctx));
    }
    f(&mut ctx)
}

/// Renders the error log without color.
pub fn emit_errors(name: &str, ctx: &Context<'_>) -> String {
    let mut out = Vec::new();
    ctx.write_errors(name, &mut out, false)
        .expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&out).into_owned()
}

fn describe_node(ctx: &Context<'_>, id: NodeId) -> String {
    format!(
        "`{}` {}:{}",
        String::from_utf8_lossy(ctx.text(id)),
        ctx.line(id).map_or(0, |l| l + 1),
        ctx.column(id).map_or(0, |c| c + 1),
    )
}

/// One line per section and key with its 1-based position.
pub fn emit_spans(ctx: &Context<'_>) -> String {
    let mut out = String::new();
    for section in ctx.sections() {
        let _ = write!(out, "section {}", describe_node(ctx, section));
        if let Some(label) = ctx.label(section) {
            let _ = write!(out, " label {}", describe_node(ctx, label));
        }
        out.push('\n');
        for (key, value) in ctx.keys(section) {
            let _ = write!(out, "  key {}", describe_node(ctx, key));
            if let Some(value) = value {
                let _ = write!(out, " = {}", describe_node(ctx, value));
            }
            out.push('\n');
        }
    }
    out
}

/// Renders the document back out in normalised form.
pub fn emit_document(ctx: &Context<'_>) -> String {
    let mut out = Vec::new();
    ctx.write_document(&mut out)
        .expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&out).into_owned()
}

/// Parses a valid document and snapshots the position of every node.
#[macro_export]
macro_rules! valid {
    ($name:ident, $ini:literal, @$spans:literal) => {
        #[test]
        fn $name() {
            $crate::parsed(stringify!($name), $ini, |ctx| {
                let spans = $crate::emit_spans(ctx);
                insta::assert_snapshot!(spans, @$spans);
            });
        }
    };
}

/// Parses an invalid document and snapshots the rendered syntax error.
#[macro_export]
macro_rules! invalid {
    ($name:ident, $ini:literal, @$error:literal) => {
        #[test]
        fn $name() {
            let mut nodes = vec![ini_spanner::Node::EMPTY; $crate::NODES];
            let mut lines = vec![0u32; $crate::LINES];
            let mut ctx = ini_spanner::Context::new(&mut nodes, &mut lines);
            let err = ctx.parse($ini.as_bytes()).unwrap_err();
            assert_eq!(err.kind, ini_spanner::ErrorKind::Syntax);
            let error = $crate::emit_errors(concat!(stringify!($name), ".ini"), &ctx);
            insta::assert_snapshot!(error, @$error);
        }
    };
}

use super::*;
use crate::{ERROR_LOG_CAPACITY, Node};

fn unused(ctx: &Context<'_>) -> Vec<(ErrorKind, Vec<u8>)> {
    ctx.errors()
        .entries()
        .iter()
        .map(|e| (e.error.kind, ctx.text(e.node.unwrap()).to_vec()))
        .collect()
}

#[test]
fn queried_keys_are_not_reported() {
    let text = b"[a]\nx = 1\ny = 2\n\n[b]\nz = 3\n";
    let mut nodes = [Node::EMPTY; 16];
    let mut lines = [0u32; 8];
    let mut ctx = Context::new(&mut nodes, &mut lines);
    ctx.parse(text).unwrap();

    let a = ctx.section(b"a").unwrap();
    for name in [&b"x"[..], b"y"] {
        let key = ctx.key(a, name).unwrap();
        ctx.read::<u8>(key).unwrap();
    }
    assert!(!ctx.validate());
    assert_eq!(
        unused(&ctx),
        [
            (ErrorKind::UnusedSection, b"b".to_vec()),
            (ErrorKind::UnusedField, b"z".to_vec()),
        ]
    );
    let section = ctx.errors().first().unwrap().error;
    assert_eq!(section.line_info, Some((4, 1)));
}

#[test]
fn used_section_with_unused_keys() {
    let text = b"lead = 1\n[a]\nx = 1\nflag\ny = 2\n";
    let mut nodes = [Node::EMPTY; 16];
    let mut lines = [0u32; 8];
    let mut ctx = Context::new(&mut nodes, &mut lines);
    ctx.parse(text).unwrap();

    let a = ctx.section(b"a").unwrap();
    ctx.key(a, b"y").unwrap();
    assert!(!ctx.validate());
    // Newest section first, keys in declaration order.
    assert_eq!(
        unused(&ctx),
        [
            (ErrorKind::UnusedField, b"x".to_vec()),
            (ErrorKind::UnusedField, b"flag".to_vec()),
            (ErrorKind::UnusedSection, b"".to_vec()),
            (ErrorKind::UnusedField, b"lead".to_vec()),
        ]
    );
}

#[test]
fn implicit_unnamed_section_is_ignored() {
    let text = b"# only headers below\n[a]\nx = 1\n";
    let mut nodes = [Node::EMPTY; 8];
    let mut lines = [0u32; 8];
    let mut ctx = Context::new(&mut nodes, &mut lines);
    ctx.parse(text).unwrap();

    let a = ctx.section(b"a").unwrap();
    ctx.key(a, b"x").unwrap();
    assert!(ctx.validate());
    assert!(ctx.errors().is_empty());
}

#[test]
fn earlier_errors_fail_validation() {
    let text = b"[a]\nx = nope\n";
    let mut nodes = [Node::EMPTY; 8];
    let mut lines = [0u32; 8];
    let mut ctx = Context::new(&mut nodes, &mut lines);
    ctx.parse(text).unwrap();

    let a = ctx.section(b"a").unwrap();
    let x = ctx.key(a, b"x").unwrap();
    assert!(ctx.read_bool(x).is_err());
    assert!(!ctx.validate());
    assert_eq!(ctx.error_count(), 1);
}

#[test]
fn overflow_is_counted() {
    let mut text = String::from("[s]\n");
    for i in 0..25 {
        text.push_str(&format!("key{i} = {i}\n"));
    }
    let mut nodes = [Node::EMPTY; 64];
    let mut lines = [0u32; 32];
    let mut ctx = Context::new(&mut nodes, &mut lines);
    ctx.parse(text.as_bytes()).unwrap();

    assert!(!ctx.validate());
    let log = ctx.errors();
    assert_eq!(log.total(), 26);
    assert_eq!(log.len(), ERROR_LOG_CAPACITY);
    assert!(log.overflowed());
    assert_eq!(log.first().unwrap().error.kind, ErrorKind::UnusedSection);
    assert_eq!(ctx.text(log.entries()[1].node.unwrap()), b"key0");
}

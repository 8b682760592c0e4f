#![allow(dead_code)]

use ini_spanner::{BindSection, Context, ErrorKind, Field, Section, SectionLoader, field};
use snapshot_tests::{emit_document, emit_errors, parsed};

#[derive(Debug, Default)]
struct Server {
    host: String,
    port: u16,
    workers: u8,
    verbose: bool,
}

static SERVER: &[Field<Server>] = &[
    field!(Server, host),
    field!(Server, port),
    field!(Server, workers),
    field!(Server, verbose),
];

#[derive(Debug, Default)]
struct Limits {
    max_open: u32,
    ratio: f64,
    name: [u8; 8],
}

static LIMITS: &[Field<Limits>] = &[
    field!(Limits, max_open, "max-open"),
    field!(Limits, ratio),
    field!(Limits, name),
];

struct Loader<'t> {
    server: Section<'t, Server>,
    limits: Section<'t, Limits>,
}

impl SectionLoader for Loader<'_> {
    fn load(
        &mut self,
        name: &[u8],
        _label: Option<&[u8]>,
    ) -> Result<&mut dyn BindSection, ErrorKind> {
        match name {
            b"server" => Ok(&mut self.server),
            b"limits" => Ok(&mut self.limits),
            _ => Err(ErrorKind::MissingSection),
        }
    }
}

fn bind(ctx: &mut Context<'_>) -> (bool, Server, Limits) {
    let mut server = Server::default();
    let mut limits = Limits::default();
    let ok = ctx.bind(&mut Loader {
        server: Section::new(SERVER, &mut server),
        limits: Section::new(LIMITS, &mut limits),
    });
    (ok, server, limits)
}

#[test]
fn binds_every_section() {
    let text = "\
[server]
host = example.org
port = 0x1f90
workers = 4
verbose = on

[limits]
max-open = 1024
ratio = 0.75
name = edge
";
    parsed("binds_every_section", text, |ctx| {
        let (ok, server, limits) = bind(ctx);
        assert!(ok, "{}", emit_errors("binds_every_section", ctx));
        assert!(ctx.validate());
        insta::assert_debug_snapshot!(server, @r#"
        Server {
            host: "example.org",
            port: 8080,
            workers: 4,
            verbose: true,
        }
        "#);
        pretty_assertions::assert_eq!(limits.max_open, 1024);
        pretty_assertions::assert_eq!(limits.ratio, 0.75);
        pretty_assertions::assert_eq!(&limits.name, b"edge\0\0\0\0");
    });
}

#[test]
fn bind_errors() {
    let text = "\
[server]
host = example.org
port = 70000
workers = -1
verbose = maybe
colour = red

[limits]
max-open = 0x
ratio = 1.5x
name = too-long-for-it

[cache]
size = 10
";
    parsed("bind_errors", text, |ctx| {
        let (ok, server, _) = bind(ctx);
        assert!(!ok);
        pretty_assertions::assert_eq!(server.host, "example.org");
        let errors = emit_errors("bind_errors.ini", ctx);
        insta::assert_snapshot!(errors, @r"
bind_errors.ini:3:8: error: integer too large
    port = 70000
           ^^^^^
bind_errors.ini:4:11: error: integer must be unsigned
    workers = -1
              ^^
bind_errors.ini:5:11: error: invalid boolean format
    verbose = maybe
              ^^^^^
bind_errors.ini:6:1: error: missing field
    colour = red
    ^^^^^^
bind_errors.ini:9:12: error: invalid integer format
    max-open = 0x
               ^^
bind_errors.ini:10:9: error: invalid number format
    ratio = 1.5x
            ^^^^
bind_errors.ini:11:8: error: string value too large
    name = too-long-for-it
           ^^^^^^^^^^^^^^^
bind_errors.ini:13:2: error: missing section
    [cache]
     ^^^^^
showing 8 errors
");
    });
}

#[test]
fn unused_nodes_as_json() {
    parsed("unused", "[a]\nx = 1\ny = 2\n\n[b]\nz = 3\n", |ctx| {
        let a = ctx.section(b"a").unwrap();
        for name in [&b"x"[..], b"y"] {
            let key = ctx.key(a, name).unwrap();
            ctx.read::<u32>(key).unwrap();
        }
        assert!(!ctx.validate());
        let errors: Vec<_> = ctx.errors().entries().iter().map(|e| e.error).collect();
        insta::assert_json_snapshot!(errors, @r#"
        [
          {
            "kind": "unused-section",
            "message": "unsupported section",
            "span": {
              "start": 18,
              "end": 19
            },
            "line": 5,
            "column": 2
          },
          {
            "kind": "unused-field",
            "message": "unsupported field",
            "span": {
              "start": 21,
              "end": 22
            },
            "line": 6,
            "column": 1
          }
        ]
        "#);
    });
}

#[test]
fn normalised_document() {
    let text = "top=1\n[server : main]\nhost   =   example.org\n\n; comment\nflag\n[empty]\n";
    parsed("normalised_document", text, |ctx| {
        let document = emit_document(ctx);
        insta::assert_snapshot!(document, @r"
top = 1

[server:main]
host = example.org
flag

[empty]
");
    });
}

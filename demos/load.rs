//! Loads an INI file into typed settings using fixed-size storage.
//!
//! ```text
//! cargo run --example load -- path/to/app.ini
//! ```
//!
//! Without an argument a built-in document is used.

use ini_spanner::{BindSection, Context, ErrorKind, Field, Node, Section, SectionLoader, field};

/// Upper bound on `parse` calls for one file.
const MAX_CALLS: usize = 4096;

const SAMPLE: &str = "\
; application settings
name = demo

[server]
host = 127.0.0.1
port = 8080
workers = 4

[log]
level = info
color = yes
";

#[derive(Debug, Default)]
struct Server {
    host: String,
    port: u16,
    workers: u8,
}

static SERVER: &[Field<Server>] = &[
    field!(Server, host),
    field!(Server, port),
    field!(Server, workers),
];

#[derive(Debug, Default)]
struct Log {
    level: [u8; 16],
    color: bool,
}

static LOG: &[Field<Log>] = &[field!(Log, level), field!(Log, color)];

#[derive(Debug, Default)]
struct Global {
    name: String,
}

static GLOBAL: &[Field<Global>] = &[field!(Global, name)];

struct Settings<'t> {
    global: Section<'t, Global>,
    server: Section<'t, Server>,
    log: Section<'t, Log>,
}

impl SectionLoader for Settings<'_> {
    fn load(
        &mut self,
        name: &[u8],
        _label: Option<&[u8]>,
    ) -> Result<&mut dyn BindSection, ErrorKind> {
        match name {
            b"" => Ok(&mut self.global),
            b"server" => Ok(&mut self.server),
            b"log" => Ok(&mut self.log),
            _ => Err(ErrorKind::MissingSection),
        }
    }
}

fn main() {
    let (path, text) = match std::env::args().nth(1) {
        Some(path) => match std::fs::read(&path) {
            Ok(text) => (path, text),
            Err(err) => {
                eprintln!("{path}: {err}");
                std::process::exit(2);
            }
        },
        None => ("<sample>".to_owned(), SAMPLE.as_bytes().to_vec()),
    };

    // Deliberately small: large files are parsed a few lines at a time.
    let mut nodes = [Node::EMPTY; 12];
    let mut lines = [0u32; 8];
    let mut ctx = Context::new(&mut nodes, &mut lines);

    let mut global = Global::default();
    let mut server = Server::default();
    let mut log = Log::default();
    let mut settings = Settings {
        global: Section::new(GLOBAL, &mut global),
        server: Section::new(SERVER, &mut server),
        log: Section::new(LOG, &mut log),
    };

    let mut calls = 0;
    let mut ok = true;
    let mut complete = false;
    while calls < MAX_CALLS {
        calls += 1;
        let resumed_at = ctx.resume_offset();
        let result = ctx.parse(&text);
        if let Err(err) = &result {
            if !err.kind.is_capacity() {
                ok = false;
                break;
            }
        }
        ok &= ctx.bind(&mut settings);
        ok &= ctx.validate();
        if !ok {
            break;
        }
        match result {
            Ok(()) => {
                complete = true;
                break;
            }
            // The same line failed again: it can never fit.
            Err(err) if ctx.resume_offset() == resumed_at => {
                eprintln!("{path}: line at byte {resumed_at} does not fit: {err}");
                std::process::exit(1);
            }
            Err(_) => {}
        }
    }
    drop(settings);

    if ok && !complete {
        eprintln!("{path}: gave up after {calls} calls");
        std::process::exit(1);
    }
    if !ok {
        let _ = ctx.eprint_errors(&path);
        std::process::exit(1);
    }

    let level_len = log.level.iter().position(|&b| b == 0).unwrap_or(0);
    println!("parsed {path} in {calls} call(s)");
    println!("name    = {}", global.name);
    println!("server  = {}:{} ({} workers)", server.host, server.port, server.workers);
    println!(
        "log     = {} (color: {})",
        String::from_utf8_lossy(&log.level[..level_len]),
        log.color
    );
}

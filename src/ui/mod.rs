use colored::*;
use lazy_static::lazy_static;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
    Debug,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Debug => "debug",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Level::Info => "[*]",
            Level::Success => "[+]",
            Level::Warn | Level::Error => "[!]",
            Level::Debug => "[debug]",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Level::Error | Level::Warn)
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

lazy_static! {
    static ref RENDERER: RwLock<Renderer> = RwLock::new(Renderer::default());
}

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

pub fn init(format: OutputFormat, color: bool) {
    if let Ok(mut r) = RENDERER.write() {
        r.format = format;
        r.color = color;
    }
    // also covers text colored outside the renderer
    if color {
        colored::control::unset_override();
    } else {
        colored::control::set_override(false);
    }
}

pub fn get_output_format() -> OutputFormat {
    current().format
}

fn current() -> Renderer {
    RENDERER
        .read()
        .map(|r| r.clone())
        .unwrap_or_default()
}

pub const SEPARATOR_LIGHT: &str = "─";

#[derive(Serialize)]
struct Event<'a> {
    level: &'a str,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

fn colorize(level: Level, s: &str, enable: bool) -> String {
    if !enable {
        return s.to_string();
    }
    match level {
        Level::Info => s.normal().to_string(),
        Level::Success => s.green().bold().to_string(),
        Level::Warn => s.yellow().bold().to_string(),
        Level::Error => s.red().bold().to_string(),
        Level::Debug => s.cyan().to_string(),
    }
}

fn strip_ansi(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b && i + 1 < bytes.len() && bytes[i + 1] == b'[' {
            i += 2;
            // CSI sequences end with a byte in '@'..='~'
            while i < bytes.len() {
                let b = bytes[i];
                i += 1;
                if (b'@'..=b'~').contains(&b) {
                    break;
                }
            }
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Render one event line without writing it. Returns `None` for debug events
/// while debug mode is off.
fn render(level: Level, code: &str, message: &str, data: Option<serde_json::Value>) -> Option<String> {
    if level == Level::Debug && !is_debug_enabled() {
        return None;
    }

    let r = current();
    match r.format {
        OutputFormat::Text => {
            let line = format!("{} {}", level.prefix(), message);
            Some(colorize(level, &line, r.color))
        }
        OutputFormat::Json => {
            let clean_msg = strip_ansi(message);
            let ev = Event {
                level: level.as_str(),
                code,
                message: &clean_msg,
                data,
            };
            serde_json::to_string(&ev).ok()
        }
    }
}

/// Write a structured event. `code` is a stable dotted identifier such as
/// `download.failed`; it only shows up in JSON output.
pub fn emit(level: Level, code: &str, message: &str, data: Option<serde_json::Value>) {
    let Some(line) = render(level, code, message, data) else {
        return;
    };
    if level.to_stderr() {
        let _ = writeln!(io::stderr(), "{}", line);
    } else {
        let mut out = io::stdout();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

pub fn separator() {
    let r = current();
    // keep JSON output parseable line by line
    if matches!(r.format, OutputFormat::Json) {
        return;
    }
    let _ = writeln!(io::stdout(), "{}", SEPARATOR_LIGHT.repeat(60));
}

pub mod prelude {
    pub use super::{Level, OutputFormat, emit, get_output_format, separator};
}

use anyhow::Error;
use std::io::{self, Write};

use crate::core::Report;
use crate::engine::CONNECTION_FAILURE_HEADLINE;
use crate::exit::ExitError;

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = stderr.write_all(render_error(err).as_bytes());
}

/// The error and its causes, one message each. `ExitError` only tags the exit
/// code and displays as the error it wraps, so it is left out of the chain.
pub fn render_error(err: &Error) -> String {
    let mut messages = err
        .chain()
        .filter(|e| !e.is::<ExitError>())
        .map(|e| e.to_string());

    let mut s = String::new();
    let Some(first) = messages.next() else {
        return format!("error: {err}\n");
    };
    s.push_str(&format!("error: {first}\n"));

    let mut causes = messages.peekable();
    if causes.peek().is_some() {
        s.push_str("caused by:\n");
        for cause in causes {
            s.push_str(&format!("  - {cause}\n"));
        }
    }
    s
}

pub fn print_connection_failure() {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{CONNECTION_FAILURE_HEADLINE}");
}

pub fn print_report(report: &Report) {
    let mut out = io::stdout().lock();
    let _ = out.write_all(render_report(report).as_bytes());
}

/// Headline, then one line per finding, newest first.
pub fn render_report(report: &Report) -> String {
    let mut s = String::new();
    s.push_str(&report.headline);
    s.push('\n');
    for line in &report.lines {
        s.push_str(line);
        s.push('\n');
    }
    s
}

//! Terminal progress for pipeline stages.
//!
//! Item progress is redrawn in place on one line and throttled; stage
//! lifecycle lines are always printed.

use lockcheck_core::progress::ProgressReporter;
use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

struct Console<W> {
    out: W,
    last_print: Option<Instant>,
    /// A `\r`-redrawn progress line is on screen and needs a newline before the next message.
    line_open: bool,
}

pub struct ConsoleReporter<W = io::Stderr> {
    console: Mutex<Console<W>>,
    interval: Duration,
}

impl ConsoleReporter<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr(), PROGRESS_INTERVAL)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, interval: Duration) -> Self {
        Self {
            console: Mutex::new(Console {
                out,
                last_print: None,
                line_open: false,
            }),
            interval,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.console
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .out
    }

    fn line(&self, msg: fmt::Arguments<'_>) {
        let mut c = self.console.lock().unwrap_or_else(|e| e.into_inner());
        if c.line_open {
            let _ = writeln!(c.out);
            c.line_open = false;
        }
        let _ = writeln!(c.out, "{}", msg);
        let _ = c.out.flush();
    }
}

impl<W: Write + Send> ProgressReporter for ConsoleReporter<W> {
    fn stage_start(&self, title: &str) {
        self.line(format_args!("  {} ...", title));
    }

    fn item_done(&self, title: &str, completed: usize, total: usize) {
        let mut c = self.console.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let due = c
            .last_print
            .map_or(true, |last| now.duration_since(last) >= self.interval);
        if !due && completed < total {
            return;
        }
        let pct = if total == 0 { 100 } else { completed * 100 / total };
        let _ = write!(c.out, "\r  {}: {}/{} ({}%)", title, completed, total, pct);
        let _ = c.out.flush();
        c.last_print = Some(now);
        c.line_open = true;
    }

    fn stage_succeeded(&self, title: &str) {
        self.line(format_args!("[ok] {}", title));
    }

    fn stage_failed(&self, title: &str, error: &dyn fmt::Display) {
        self.line(format_args!("[failed] {}: {}", title, error));
    }

    fn stage_skipped(&self, title: &str) {
        self.line(format_args!("[skipped] {}", title));
    }
}

//! Single-line progress output for long runs.

use std::io::{self, Write};

/// Format a ratio as a percentage with two decimals, e.g. `0.125` → `12.50%`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// The progress line `count/max (pp.pp%)`.
pub fn progress_line(count: usize, max: usize) -> String {
    let ratio = if max == 0 {
        1.0
    } else {
        count as f64 / max as f64
    };
    format!("{}/{} ({})", count, max, format_percent(ratio))
}

/// Rewrites one terminal line in place as work advances.
pub struct Progress<W: Write> {
    out: W,
    max: usize,
}

impl<W: Write> Progress<W> {
    pub fn new(out: W, max: usize) -> Self {
        Self { out, max }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn update(&mut self, count: usize) -> io::Result<()> {
        write!(self.out, "\r\x1b[2K{}", progress_line(count, self.max))?;
        self.out.flush()
    }

    /// End the progress line.
    pub fn finish(mut self) -> io::Result<W> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(self.out)
    }
}

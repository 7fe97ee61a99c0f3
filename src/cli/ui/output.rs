use console::style;

use crate::output::SummaryLine;
use crate::types::classification::antiguedad;

pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Suppress everything except errors
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    pub fn field(&self, label: &str, value: &str) {
        if !self.quiet {
            println!("  {:<10} {}", style(label).dim(), value);
        }
    }

    /// Counts per `ANTIGUEDAD` value, errors in red
    pub fn summary(&self, lines: &[SummaryLine]) {
        if self.quiet {
            return;
        }

        self.section("Resumen");
        for line in lines {
            let label = if line.antiguedad == antiguedad::ERROR {
                style(line.antiguedad.as_str()).red()
            } else {
                style(line.antiguedad.as_str()).cyan()
            };
            println!("  {:<16} {:>4}  ({:.0}%)", label, line.count, line.percent);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

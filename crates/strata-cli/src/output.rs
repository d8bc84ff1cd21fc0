//! Output management and formatting.

use std::io::{self, IsTerminal};

use console::{Term, pad_str, Alignment};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // Explicit flag first, then the configured format, then TTY detection.
        let requested = match args.output_format {
            OutputFormat::Auto => match config.output.format.as_str() {
                "json" => OutputFormat::Json,
                "plain" => OutputFormat::Plain,
                _ => OutputFormat::Auto,
            },
            other => other,
        };
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}") // ℹ
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Two-column row with the key padded to `width`.
    pub fn row(&self, key: &str, value: &str, width: usize) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let key = pad_str(key, width, Alignment::Left, None);
        let line = if self.no_color {
            format!("  {key}  {value}")
        } else {
            format!("  {}  {}", key.bold(), value.dimmed())
        };
        self.term.write_line(&line)
    }

    /// Pretty JSON to stdout. Never suppressed: scripts depend on it.
    pub fn json(&self, value: &impl Serialize) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }

    /// `true` when machine-readable JSON was requested.
    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::AppConfig;

    fn args(quiet: bool, no_color: bool, format: OutputFormat) -> GlobalArgs {
        GlobalArgs {
            verbose: 0,
            quiet,
            no_color,
            config: None,
            directory: None,
            output_format: format,
        }
    }

    fn make_manager(quiet: bool, no_color: bool, format: OutputFormat) -> OutputManager {
        OutputManager::new(&args(quiet, no_color, format), &AppConfig::default())
    }

    #[test]
    fn quiet_suppresses_print() {
        let out = make_manager(true, true, OutputFormat::Plain);
        assert!(out.print("hello").is_ok());
    }

    #[test]
    fn human_format_keeps_color() {
        assert!(make_manager(false, false, OutputFormat::Human).supports_color());
        assert!(!make_manager(false, true, OutputFormat::Human).supports_color());
    }

    #[test]
    fn plain_format_drops_color() {
        assert!(!make_manager(false, false, OutputFormat::Plain).supports_color());
    }

    #[test]
    fn flag_beats_configured_format() {
        let mut config = AppConfig::default();
        config.output.format = "json".into();

        let out = OutputManager::new(&args(false, false, OutputFormat::Plain), &config);
        assert_eq!(out.format(), OutputFormat::Plain);

        let out = OutputManager::new(&args(false, false, OutputFormat::Auto), &config);
        assert!(out.is_json());
    }
}

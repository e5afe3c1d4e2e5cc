//! Output formatting module

pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use styles::Styles;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", format!("{key:<13}").style(self.styles.dim));
        }
    }

    /// Print a framed warning box. Never suppressed: it explains a refusal.
    pub fn warning_box(&self, title: &str, lines: &[String]) {
        println!();
        for line in render_box(title, lines) {
            println!("  {}", line.style(self.styles.warning));
        }
        println!();
    }
}

/// Frame `lines` in a rounded box with `title` on the top border.
#[must_use]
pub fn render_box(title: &str, lines: &[String]) -> Vec<String> {
    let title = format!(" ⚠ {title} ");
    let inner = lines
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(title.chars().count() + 2))
        .max()
        .unwrap_or(0)
        + 2;

    let mut out = Vec::with_capacity(lines.len() + 2);
    let rest = inner.saturating_sub(title.chars().count() + 1);
    out.push(format!("╭─{title}{}╮", "─".repeat(rest)));
    for line in lines {
        let pad = inner - line.chars().count();
        out.push(format!("│{line}{}│", " ".repeat(pad)));
    }
    out.push(format!("╰{}╯", "─".repeat(inner)));
    out
}

/// Shorten an agent id for display: first 8 characters and `...`.
#[must_use]
pub fn truncate_id(id: &str) -> String {
    if id.is_empty() {
        return "(none)".to_string();
    }
    if id.chars().count() <= 8 {
        return id.to_string();
    }
    let head: String = id.chars().take(8).collect();
    format!("{head}...")
}

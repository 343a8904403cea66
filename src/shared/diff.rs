//! Unified diff utilities for displaying text differences.

use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use crossterm::tty::IsTty;
use similar::{ChangeTag, TextDiff};

/// When to colorize output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Color when the output stream is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn use_color(self) -> bool {
        self.use_color_on(io::stdout().is_tty())
    }

    /// Like [`ColorMode::use_color`], for output written to stderr.
    pub fn use_color_on_stderr(self) -> bool {
        self.use_color_on(io::stderr().is_tty())
    }

    fn use_color_on(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Clone, Copy)]
enum Paint {
    Bold,
    Fg(Color),
    Plain,
}

fn paint(line: &str, paint: Paint, use_color: bool) -> String {
    if !use_color {
        return line.to_string();
    }
    match paint {
        Paint::Bold => line.bold().to_string(),
        Paint::Fg(color) => line.with(color).to_string(),
        Paint::Plain => line.to_string(),
    }
}

/// Write a unified diff from `old` (labelled `from`) to `new` (labelled `to`).
///
/// Both sides are compared as if they ended with a newline. A
/// `\ No newline at end of file` marker follows the hunks only when the two
/// sides disagree on the final newline; when that is the only difference,
/// just the headers and `Only trailing newline differs` are written.
///
/// Returns whether anything was written.
pub fn write_unified_diff<W: Write>(
    writer: &mut W,
    old: &str,
    new: &str,
    from: &str,
    to: &str,
    use_color: bool,
) -> io::Result<bool> {
    let old_has_newline = old.ends_with('\n');
    let new_has_newline = new.ends_with('\n');
    let old_norm = if old_has_newline {
        old.to_string()
    } else {
        format!("{old}\n")
    };
    let new_norm = if new_has_newline {
        new.to_string()
    } else {
        format!("{new}\n")
    };

    let newline_differs = old_has_newline != new_has_newline;
    let header = |writer: &mut W| -> io::Result<()> {
        writeln!(writer, "{}", paint(&format!("--- {from}"), Paint::Bold, use_color))?;
        writeln!(writer, "{}", paint(&format!("+++ {to}"), Paint::Bold, use_color))
    };
    let cyan = Paint::Fg(Color::Cyan);

    if old_norm == new_norm {
        if newline_differs {
            header(writer)?;
            writeln!(writer, "{}", paint("Only trailing newline differs", cyan, use_color))?;
            return Ok(true);
        }
        return Ok(false);
    }

    header(writer)?;
    let diff = TextDiff::from_lines(&old_norm, &new_norm);
    let mut unified = diff.unified_diff();
    unified.context_radius(3).missing_newline_hint(false);
    for hunk in unified.iter_hunks() {
        writeln!(writer, "{}", paint(&hunk.header().to_string(), cyan, use_color))?;
        for change in hunk.iter_changes() {
            let (sign, style) = match change.tag() {
                ChangeTag::Delete => ("-", Paint::Fg(Color::Red)),
                ChangeTag::Insert => ("+", Paint::Fg(Color::Green)),
                ChangeTag::Equal => (" ", Paint::Plain),
            };
            let line = format!("{sign}{}", change.value().trim_end_matches('\n'));
            writeln!(writer, "{}", paint(&line, style, use_color))?;
        }
    }
    if newline_differs {
        writeln!(writer, "{}", paint("\\ No newline at end of file", cyan, use_color))?;
    }
    Ok(true)
}

/// Print a unified diff to stdout.
/// Ignores BrokenPipe errors (e.g., when piped to `head`).
pub fn print_unified_diff(
    old: &str,
    new: &str,
    from: &str,
    to: &str,
    use_color: bool,
) -> anyhow::Result<bool> {
    ignore_broken_pipe(write_unified_diff(&mut io::stdout(), old, new, from, to, use_color))
}

/// [`print_unified_diff`] for stderr.
pub fn eprint_unified_diff(
    old: &str,
    new: &str,
    from: &str,
    to: &str,
    use_color: bool,
) -> anyhow::Result<bool> {
    ignore_broken_pipe(write_unified_diff(&mut io::stderr(), old, new, from, to, use_color))
}

fn ignore_broken_pipe(result: io::Result<bool>) -> anyhow::Result<bool> {
    match result {
        Ok(written) => Ok(written),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(true),
        Err(e) => Err(e.into()),
    }
}

/// Format a unified diff as a string.
pub fn format_unified_diff(old: &str, new: &str, from: &str, to: &str, use_color: bool) -> String {
    let mut output = Vec::new();
    // write_unified_diff only fails on I/O errors, Vec<u8> won't fail
    let _ = write_unified_diff(&mut output, old, new, from, to, use_color);
    String::from_utf8(output).unwrap_or_default()
}

/// `text` in `color`, or unchanged without color.
pub fn colored(text: &str, color: Color, use_color: bool) -> String {
    paint(text, Paint::Fg(color), use_color)
}

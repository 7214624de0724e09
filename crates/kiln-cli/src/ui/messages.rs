//! Status messages. All of them go to stderr; stdout carries command output.

use owo_colors::{OwoColorize, Style};

use super::colors_enabled;

fn styled(style: Style) -> Style {
    if colors_enabled() {
        style
    } else {
        Style::new()
    }
}

/// Print a success message.
///
/// ```no_run
/// use kiln_cli::ui::success;
///
/// success("Configuration is valid");
/// ```
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".style(styled(Style::new().green().bold())), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".style(styled(Style::new().blue().bold())), message);
}

/// Print a warning. The message itself is highlighted too.
pub fn warning(message: &str) {
    let yellow = styled(Style::new().yellow());
    eprintln!("{} {}", "⚠".style(yellow.bold()), message.style(yellow));
}

pub fn error(message: &str) {
    let red = styled(Style::new().red());
    eprintln!("{} {}", "✗".style(red.bold()), message.style(red));
}

/// One indented detail line under a previous message.
pub fn detail(label: &str, value: &str) {
    eprintln!("  {} {}", label.style(styled(Style::new().dimmed())), value);
}

//! Terminal utilities for colored output.

use std::io::{self, IsTerminal};

/// Check if stdout is attached to a terminal.
pub fn in_controlling_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Decide whether output should be colored.
///
/// Color is disabled by `--no-color`, by a non-empty `NO_COLOR`, or when
/// stdout is not a terminal.
pub fn should_color(no_color_flag: bool, no_color_env: Option<&str>) -> bool {
    if no_color_flag {
        return false;
    }
    if no_color_env.map(|v| !v.is_empty()).unwrap_or(false) {
        return false;
    }
    in_controlling_terminal()
}

/// Apply the color decision globally for the `colored` crate.
pub fn configure_color(no_color_flag: bool) {
    let env = std::env::var("NO_COLOR").ok();
    colored::control::set_override(should_color(no_color_flag, env.as_deref()));
}

/// Horizontal rule used to frame report sections.
pub fn rule(width: usize) -> String {
    "-".repeat(width)
}

//! Display primitives shared by CLI command output.

pub mod table;

pub use table::{list_table, render_list};

use console::style;

/// Render a success action result.
pub fn action_success(message: &str) -> String {
    format!("{} {}", style("\u{2713}").green().bold(), message)
}

/// Render a failure action result.
pub fn action_failure(message: &str) -> String {
    format!("{} {}", style("\u{2717}").red().bold(), message)
}

/// Format a salary for display.
pub fn format_salary(salary: f64) -> String {
    format!("{salary:.2}")
}

//! Command-line interface: argument grammar, command implementations and
//! output rendering.

pub mod commands;
pub mod display;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use crate::cli::display::action_failure;

/// Print an error in the active output mode without exiting.
pub fn report_error(err: &anyhow::Error, json_mode: bool) {
    if json_mode {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": chain,
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{}", action_failure(&format!("{err:#}")));
    }
}

/// Report a fatal command error and exit with a failure status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    tracing::debug!(error = ?err, "command failed");
    report_error(&err, json_mode);
    std::process::exit(1);
}

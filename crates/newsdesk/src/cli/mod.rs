//! Command-line interface module.

mod commands;
mod content;
mod run;

pub use commands::{Cli, Commands, ContentCommands, OutputFormat};
pub use content::handle_content_command;
pub use run::{migrate, run_coordinator};

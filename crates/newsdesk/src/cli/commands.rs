//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Newsdesk - content lifecycle coordinator from draft to posted
#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(about = "Content lifecycle coordinator: moderated publishing from draft to posted", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the coordinator server
    Run {
        /// Path to the coordinator TOML configuration
        #[arg(long, default_value = "newsdesk.toml")]
        config: PathBuf,
    },

    /// Apply pending database migrations
    Migrate,

    /// Content moderation commands
    #[command(subcommand)]
    Content(ContentCommands),
}

/// Content moderation subcommands
#[derive(Subcommand, Debug)]
pub enum ContentCommands {
    /// List items awaiting approval
    Pending,

    /// List recent items
    List {
        /// Status filter (draft, pending_approval, approved, posted, rejected)
        #[arg(long)]
        status: Option<String>,

        /// Maximum number of items to display
        #[arg(long, default_value = "20")]
        limit: i64,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Show one item
    Show {
        /// ID of the content item
        id: i32,
    },

    /// Show the audit trail for one item
    Trail {
        /// ID of the content item
        id: i32,
    },

    /// Approve an item for posting
    Approve {
        /// ID of the content item
        id: i32,

        /// Name recorded as the reviewer
        #[arg(long)]
        moderator: String,

        /// Target platforms, comma separated; empty keeps the item's own
        #[arg(long, value_delimiter = ',')]
        platforms: Vec<String>,
    },

    /// Edit an item's publication fields before it posts
    Edit {
        /// ID of the content item
        id: i32,

        /// Name recorded as the editor
        #[arg(long)]
        moderator: String,

        /// Replacement publication title
        #[arg(long)]
        title: Option<String>,

        /// Replacement publication text
        #[arg(long)]
        text: Option<String>,

        /// Replacement target platforms, comma separated
        #[arg(long, value_delimiter = ',')]
        platforms: Option<Vec<String>>,
    },

    /// Reject an item with a reason
    Reject {
        /// ID of the content item
        id: i32,

        /// Name recorded as the reviewer
        #[arg(long)]
        moderator: String,

        /// Why the item was rejected
        #[arg(long)]
        reason: String,
    },

    /// Item counts per status
    Stats,
}

/// Output format options
#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

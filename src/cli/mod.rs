//! CLI module - Command-line interface for Polypack
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Polypack - Plastic Packaging Business Manager
/// Rate tables, change history and staff accounts
#[derive(Parser)]
#[command(name = "polypack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web API server
    #[command(alias = "-d", alias = "--daemon", alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Print the current rate table
    #[command(alias = "ls")]
    Rates,

    /// Show recent rate changes
    #[command(alias = "h")]
    History {
        /// Number of entries to show
        #[arg(default_value = "5")]
        limit: usize,
    },

    /// List user accounts
    #[command(alias = "u")]
    Users,
}

pub use commands::*;

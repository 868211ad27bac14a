//! Command-line interface for docfiler.
//!
//! This module provides the CLI structure and output rendering for the
//! `docfile` binary.

mod commands;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, CreateCommand, DeleteCommand, DocumentArgs, ListCommand, OutputFormat,
    SearchCommand, ServeCommand, ShowCommand, StatsCommand, StatusArg, TypesCommand,
    UpdateCommand,
};

use crate::logging::Verbosity;

/// docfile - File and find office documents
///
/// Keeps gate passes, job cards, invoices, asset movements and score cards
/// as typed records with generated document codes, and serves them over a
/// JSON HTTP API.
#[derive(Debug, Parser)]
#[command(name = "docfile")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all documents
    List(ListCommand),

    /// Show one document
    Show(ShowCommand),

    /// Create a document
    Create(CreateCommand),

    /// Change some or all of a document's contents
    Update(UpdateCommand),

    /// Delete a document
    Delete(DeleteCommand),

    /// Search documents
    Search(SearchCommand),

    /// Show dashboard statistics
    Stats(StatsCommand),

    /// List document types, or show one type's fields
    Types(TypesCommand),

    /// Load sample documents into an empty store
    Seed,

    /// Run the HTTP API server
    Serve(ServeCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// Whether the command works against the document store.
    #[must_use]
    pub fn needs_store(&self) -> bool {
        !matches!(self, Self::Types(_) | Self::Config(_))
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

//! Command-line interface for the RSVP service.
//!
//! This module provides the CLI structure for the `rsvp` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ExportCommand, InvitationCommand, InvitationTypeArg, ServeCommand,
    SetupCommand, SummaryCommand,
};

/// rsvp - Collect event RSVPs and review them
///
/// Serves the guest RSVP API and the organizer dashboard API, and offers the
/// same organizer operations from the command line.
#[derive(Debug, Parser)]
#[command(name = "rsvp")]
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
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Prepare the database
    Setup(SetupCommand),

    /// Manage invitations
    #[command(subcommand)]
    Invitation(InvitationCommand),

    /// Export current responses
    Export(ExportCommand),

    /// Show response totals
    Summary(SummaryCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

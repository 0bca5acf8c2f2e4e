//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::InvitationType;
use crate::report::ExportFormat;
use crate::setup::SetupAction;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind, overriding the configuration
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Setup command arguments.
#[derive(Debug, Args)]
pub struct SetupCommand {
    /// What to run
    #[arg(value_enum, default_value = "full-setup")]
    pub action: SetupAction,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Invitation management commands.
#[derive(Debug, Subcommand)]
pub enum InvitationCommand {
    /// List invitations, newest first
    List {
        /// Only invitations whose name or e-mail contains this text
        query: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add an invitation
    Add {
        /// Primary guest name
        name: String,

        /// Contact e-mail
        email: String,

        /// Number of guests allowed
        #[arg(short = 's', long, default_value = "1")]
        party_size: u32,

        /// Which events the party may attend
        #[arg(short = 't', long = "type", value_enum, default_value = "standard")]
        invitation_type: InvitationTypeArg,

        /// Explicit identifier
        #[arg(long)]
        id: Option<String>,
    },

    /// Find an invitation the way a guest would
    Find {
        /// Part of the primary guest name
        name: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete an invitation and its responses
    Remove {
        /// Invitation identifier
        id: String,
    },
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Summary command arguments.
#[derive(Debug, Args)]
pub struct SummaryCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Invitation type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InvitationTypeArg {
    /// Ceremony weekend
    Standard,
    /// Adds the Monday brunch
    Family,
    /// Adds Friday bowling
    BridalParty,
    /// Standard access with a companion
    PlusOne,
}

impl From<InvitationTypeArg> for InvitationType {
    fn from(arg: InvitationTypeArg) -> Self {
        match arg {
            InvitationTypeArg::Standard => Self::Standard,
            InvitationTypeArg::Family => Self::Family,
            InvitationTypeArg::BridalParty => Self::BridalParty,
            InvitationTypeArg::PlusOne => Self::PlusOne,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_type_arg_conversion() {
        assert_eq!(
            InvitationType::from(InvitationTypeArg::Standard),
            InvitationType::Standard
        );
        assert_eq!(
            InvitationType::from(InvitationTypeArg::BridalParty),
            InvitationType::BridalParty
        );
        assert_eq!(
            InvitationType::from(InvitationTypeArg::PlusOne),
            InvitationType::PlusOne
        );
    }

    #[test]
    fn test_invitation_type_arg_names_match_storage() {
        for arg in InvitationTypeArg::value_variants() {
            let name = arg.to_possible_value().unwrap();
            assert_eq!(name.get_name(), InvitationType::from(*arg).as_str());
        }
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}

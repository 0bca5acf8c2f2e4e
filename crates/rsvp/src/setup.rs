//! Database setup actions shared by the admin API and the CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// A setup step an organizer can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SetupAction {
    /// Verify the database answers queries.
    #[value(name = "check-connection", alias = "check")]
    CheckConnection,
    /// Create any missing tables and indexes.
    #[value(name = "initialize", alias = "init")]
    Initialize,
    /// Insert sample invitations into an empty database.
    Seed,
    /// All of the above, in order.
    #[value(name = "full-setup", alias = "full")]
    FullSetup,
}

impl SetupAction {
    /// Wire name of the action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CheckConnection => "check-connection",
            Self::Initialize => "initialize",
            Self::Seed => "seed",
            Self::FullSetup => "full-setup",
        }
    }
}

impl fmt::Display for SetupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetupAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "check-connection" => Ok(Self::CheckConnection),
            "initialize" => Ok(Self::Initialize),
            "seed" => Ok(Self::Seed),
            "full-setup" => Ok(Self::FullSetup),
            _ => Err(Error::invalid("Invalid action")),
        }
    }
}

/// Outcome of a setup action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    /// Always `true`; failures surface as errors.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Invitations inserted by a seed step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeded: Option<usize>,
    /// Step reports, for a full setup only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<FullSetupDetails>>,
}

impl SetupReport {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            seeded: None,
            details: None,
        }
    }
}

/// Per-step reports for [`SetupAction::FullSetup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct FullSetupDetails {
    pub connection: SetupReport,
    pub initialization: SetupReport,
    pub seeding: SetupReport,
}

/// Run a setup action.
///
/// Every action is idempotent; seeding an already populated database is a
/// successful no-op.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or written.
pub fn run(storage: &Storage, action: SetupAction) -> Result<SetupReport> {
    info!("Running setup action: {}", action);

    match action {
        SetupAction::CheckConnection => {
            storage.check_connection()?;
            Ok(SetupReport::ok("Database connection successful"))
        }
        SetupAction::Initialize => {
            storage.initialize()?;
            Ok(SetupReport::ok("Database initialized successfully"))
        }
        SetupAction::Seed => {
            let seeded = storage.seed_sample_data()?;
            let mut report = if seeded == 0 {
                SetupReport::ok("Sample data already exists")
            } else {
                SetupReport::ok("Sample data seeded successfully")
            };
            report.seeded = Some(seeded);
            Ok(report)
        }
        SetupAction::FullSetup => {
            let connection = run(storage, SetupAction::CheckConnection)?;
            let initialization = run(storage, SetupAction::Initialize)?;
            let seeding = run(storage, SetupAction::Seed)?;

            let mut report = SetupReport::ok("Database fully initialized with sample data");
            report.seeded = seeding.seeded;
            report.details = Some(Box::new(FullSetupDetails {
                connection,
                initialization,
                seeding,
            }));
            Ok(report)
        }
    }
}

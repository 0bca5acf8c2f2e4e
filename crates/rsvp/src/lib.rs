//! `rsvp` - RSVP collection for a multi-day event
//!
//! Guests look up their invitation by name and submit who is coming, which
//! events they attend, their entrée and dietary needs. Every submission is
//! kept; the newest one counts. Organizers review current responses, totals
//! and exports through an admin API or the `rsvp` CLI.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod server;
pub mod setup;
pub mod storage;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use report::{ExportFormat, ResponseGroup, Summary};
pub use server::{create_router, AppState};
pub use storage::{Storage, StorageStats};

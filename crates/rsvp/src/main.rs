//! `rsvp` - CLI and server for the RSVP service
//!
//! This binary runs the HTTP server and the organizer's command-line tools.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs;

use anyhow::Context;
use clap::Parser;

use rsvp::cli::{
    Cli, Command, ConfigCommand, ExportCommand, InvitationCommand, ServeCommand, SetupCommand,
};
use rsvp::model::{Invitation, NewInvitation};
use rsvp::{init_logging, report, server, setup, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config commands load the file themselves so they can report errors
    let load = || Config::load_from(cli.config.clone());

    match cli.command {
        Command::Serve(cmd) => handle_serve(load()?, cmd).await,
        Command::Setup(cmd) => handle_setup(&load()?, &cmd),
        Command::Invitation(cmd) => handle_invitation(&load()?, cmd),
        Command::Export(cmd) => handle_export(&load()?, &cmd),
        Command::Summary(cmd) => handle_summary(&load()?, cmd.json),
        Command::Config(cmd) => handle_config(cli.config.clone(), cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening {}", path.display()))
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    let storage = open_storage(&config)?;
    server::serve(&config, storage).await?;
    Ok(())
}

fn handle_setup(config: &Config, cmd: &SetupCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let report = setup::run(&storage, cmd.action)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(details) = &report.details {
            println!("{}", details.connection.message);
            println!("{}", details.initialization.message);
            println!("{}", details.seeding.message);
        }
        println!("{}", report.message);
    }
    Ok(())
}

fn handle_invitation(config: &Config, cmd: InvitationCommand) -> anyhow::Result<()> {
    let mut storage = open_storage(config)?;

    match cmd {
        InvitationCommand::List { query, json } => {
            let invitations = storage.search_invitations(query.as_deref().unwrap_or_default())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&invitations)?);
            } else if invitations.is_empty() {
                println!("No invitations found.");
            } else {
                for invitation in &invitations {
                    print_invitation_line(invitation);
                }
            }
        }
        InvitationCommand::Add {
            name,
            email,
            party_size,
            invitation_type,
            id,
        } => {
            let mut input = NewInvitation::new(name, email, party_size, invitation_type.into());
            input.id = id;
            let invitation = storage.create_invitation(&input)?;
            println!("Created invitation {}", invitation.id);
        }
        InvitationCommand::Find { name, json } => match storage.find_invitation_by_name(&name)? {
            Some(invitation) if json => {
                println!("{}", serde_json::to_string_pretty(&invitation)?);
            }
            Some(invitation) => print_invitation_line(&invitation),
            None => anyhow::bail!("Invitation not found"),
        },
        InvitationCommand::Remove { id } => {
            if storage.delete_invitation(&id)? {
                println!("Deleted invitation {id}");
            } else {
                anyhow::bail!("Invitation {id} not found");
            }
        }
    }
    Ok(())
}

fn print_invitation_line(invitation: &Invitation) {
    println!(
        "{:<14} {:<24} {:<30} {:>2}  {:<12} {}",
        invitation.id,
        invitation.primary_guest_name,
        invitation.email,
        invitation.party_size,
        invitation.invitation_type.as_str(),
        invitation.rsvp_status.as_str()
    );
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let groups = storage.current_responses()?;
    let rendered = cmd.format.render(&groups)?;

    match &cmd.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            println!("Exported {} invitations to {}", groups.len(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn handle_summary(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let summary = report::summarize(&storage.current_responses()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let totals = &summary.totals;
    println!("{}", config.event.name);
    println!("{}", "=".repeat(config.event.name.chars().count()));
    println!();
    println!("Invitations:     {}", totals.total_invitations);
    println!("Completed RSVPs: {}", totals.completed_rsvps);
    println!("Response rate:   {}", totals.response_rate);
    println!("Guests:          {}", totals.total_guests);
    println!();
    println!("[Events]");
    for event in rsvp::model::Event::ALL {
        println!("  {:<28} {}", event.to_string(), summary.event_attendance.get(event));
    }
    println!();
    println!("[Entrées]");
    for entree in rsvp::model::Entree::ALL {
        println!("  {:<28} {}", entree.label(), summary.entree_selections.get(entree));
    }
    println!();
    println!("[Dietary restrictions]");
    for restriction in rsvp::model::DietaryRestriction::ALL {
        println!(
            "  {:<28} {}",
            restriction.label(),
            summary.dietary_restrictions.get(restriction)
        );
    }

    let stats = storage.stats()?;
    println!();
    println!("[Database]");
    println!("  Path:            {}", storage.path().display());
    println!("  Submissions:     {}", stats.submissions);
    println!("  Size:            {} bytes", stats.db_size_bytes);
    Ok(())
}

fn handle_config(path: Option<std::path::PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:   {}", config.database_path().display());
                println!();
                println!("[Server]");
                println!("  Listen:          {}:{}", config.server.host, config.server.port);
                println!(
                    "  Frame ancestors: {}",
                    config.server.frame_ancestors.join(" ")
                );
                println!();
                println!("[Admin]");
                println!(
                    "  Password:        {}",
                    if config.admin.password().is_some() {
                        "set"
                    } else {
                        "not set (dashboard disabled)"
                    }
                );
                println!();
                println!("[Event]");
                println!("  Name:            {}", config.event.name);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

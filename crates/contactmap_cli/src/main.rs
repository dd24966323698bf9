//! Operator CLI for a ContactMap database.
//!
//! # Responsibility
//! - Inspect, query, export and import a contact database from a shell.
//! - Keep core crate wiring testable without the mobile shell.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use contactmap_core::db::open_db;
use contactmap_core::{
    ContactInterchange, ContactService, Coordinate, SqliteContactRepository, StaticLocation,
    ViewportQuery,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Inspect and migrate ContactMap contact databases")]
struct Args {
    /// SQLite database file
    #[arg(long, env = "CONTACTMAP_DB_PATH", default_value = "contactmap.sqlite3")]
    db: PathBuf,
    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage info
    Ping,
    /// List all contacts, most recent first
    List,
    /// Record a contact met now
    Add {
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Contacts inside a map rectangle (spans in degrees)
    Viewport {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        lat_span: f64,
        #[arg(long)]
        lon_span: f64,
    },
    /// Contacts within a radius of a position
    Near {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value_t = 500.0)]
        radius_m: f64,
    },
    /// Write the interchange document to a file or stdout
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show what importing a document would replace
    Preview { file: PathBuf },
    /// Replace every stored contact with the document's records
    Import {
        file: PathBuf,
        /// Confirm the destructive replace; without it only a preview is shown
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(log_dir) = args.log_dir.as_deref() {
        contactmap_core::init_logging(contactmap_core::default_log_level(), log_dir)
            .map_err(anyhow::Error::msg)
            .context("logging init failed")?;
    }

    if let Command::Ping = args.command {
        println!("contactmap_core ping={}", contactmap_core::ping());
        println!("contactmap_core version={}", contactmap_core::core_version());
        return Ok(());
    }

    let conn = open_db(&args.db)
        .with_context(|| format!("failed to open database {}", args.db.display()))?;
    let repo = SqliteContactRepository::try_new(&conn)?;

    match args.command {
        Command::Ping => {}
        Command::List => {
            let service = ContactService::new(repo);
            print_contacts(&service.list_contacts()?);
        }
        Command::Add {
            name,
            lat,
            lon,
            description,
        } => {
            let service = ContactService::new(repo);
            let contact =
                service.create_contact(&name, description, Coordinate::new(lat, lon), None)?;
            println!("created {}", contact.id);
        }
        Command::Viewport {
            lat,
            lon,
            lat_span,
            lon_span,
        } => {
            let service = ContactService::new(repo);
            let query = ViewportQuery::rectangle(Coordinate::new(lat, lon), lat_span, lon_span);
            let pins = service.map_pins(Some(&query))?;
            for pin in &pins {
                println!(
                    "{}\t{}\toffset=({:.1}, {:.1})",
                    pin.contact.id,
                    pin.contact.name,
                    pin.placement.offset.dx,
                    pin.placement.offset.dy
                );
            }
        }
        Command::Near { lat, lon, radius_m } => {
            let service = ContactService::new(repo);
            let here = StaticLocation::authorized(Coordinate::new(lat, lon));
            print_contacts(&service.contacts_near(&here, radius_m)?);
        }
        Command::Export { out } => {
            let document = ContactInterchange::new(repo).export()?;
            match out {
                Some(path) => fs::write(&path, document)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{document}"),
            }
        }
        Command::Preview { file } => {
            let text = read_document(&file)?;
            let preview = ContactInterchange::new(repo).preview_import(&text)?;
            println!(
                "would replace {} existing contact(s) with {} imported ({} with defaulted fields)",
                preview.existing_count, preview.import_count, preview.defaulted_records
            );
        }
        Command::Import { file, yes } => {
            let text = read_document(&file)?;
            let interchange = ContactInterchange::new(repo);
            let preview = interchange.preview_import(&text)?;
            if !yes {
                bail!(
                    "refusing to replace {} existing contact(s) with {} imported without --yes",
                    preview.existing_count,
                    preview.import_count
                );
            }
            let imported = interchange.commit_import(&text)?;
            println!("imported {imported} contact(s)");
        }
    }

    Ok(())
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_contacts(contacts: &[contactmap_core::Contact]) {
    for contact in contacts {
        let when = contact
            .timestamp
            .map(contactmap_core::interchange::document::format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{:.6},{:.6}\t{}",
            contact.id, when, contact.latitude, contact.longitude, contact.name
        );
    }
}

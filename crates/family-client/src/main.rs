use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use family_client::dashboard::{self, EventFilter};
use family_client::{FamilyClient, SessionStore};
use family_types::models::{EventDraft, EventPatch};

#[derive(Parser)]
#[command(name = "family")]
#[command(about = "Manage your family's shared events")]
struct Cli {
    /// Base URL of the family organiser API
    #[arg(long, env = "FAMILY_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Where the login session is kept
    #[arg(long, env = "FAMILY_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register {
        username: String,
        family: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    Login {
        username: String,
        family: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    /// Show who is logged in
    Whoami,
    /// List the family's events
    Events {
        /// Match against title or location
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only events on this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    Show {
        id: String,
    },
    Add {
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM
        #[arg(long)]
        end: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "")]
        items: String,
    },
    /// Change only the given fields of an event
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        items: Option<String>,
    },
    Delete {
        id: String,
    },
    /// List family members
    Users,
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ").context("failed to read password"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "family_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let session_file = match cli.session_file {
        Some(path) => path,
        None => SessionStore::default_path().context("no config directory for the session file")?,
    };
    let client = FamilyClient::new(cli.api_url, SessionStore::new(session_file));

    match cli.command {
        Commands::Register {
            username,
            family,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let session = client.register_and_login(&username, &password, &family).await?;
            println!("Registered and logged in as {} ({})", session.username, session.family_id);
        }
        Commands::Login {
            username,
            family,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let session = client.login(&username, &password, &family).await?;
            println!("Logged in as {} ({})", session.username, session.family_id);
        }
        Commands::Logout => {
            client.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => {
            let session = client.session()?;
            println!("{} ({}, {})", session.username, session.family_id, session.role);
        }
        Commands::Events { search, date } => {
            let events = client.family_events().await?;
            print!("{}", dashboard::render_events(&events, &EventFilter { search, date }));
        }
        Commands::Show { id } => {
            let event = client.event(&id).await?;
            print!("{}", dashboard::render_event(&event));
        }
        Commands::Add {
            title,
            date,
            start,
            end,
            location,
            items,
        } => {
            let draft = EventDraft {
                title,
                date,
                start_time: start,
                end_time: end,
                location,
                required_items: items,
            };
            let event = client.add_event(&draft).await?;
            println!("Added {}", event.id);
        }
        Commands::Edit {
            id,
            title,
            date,
            start,
            end,
            location,
            items,
        } => {
            let patch = EventPatch {
                title,
                date,
                start_time: start,
                end_time: end,
                location,
                required_items: items,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to change");
            }
            client.update_event(&id, &patch).await?;
            println!("Updated {}", id);
        }
        Commands::Delete { id } => {
            let removed = client.delete_event(&id).await?;
            if removed == 0 {
                println!("No such event");
            } else {
                println!("Deleted {}", id);
            }
        }
        Commands::Users => {
            let users = client.all_users().await?;
            print!("{}", dashboard::render_users(&users));
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::LedgerApp;
use crate::domain::{
    EntryFilter, EntryId, EntryKind, EntryStatus, LedgerEntry, UserId, format_amount,
    parse_amount,
};

/// Finbook - Personal Finance Ledger
#[derive(Parser)]
#[command(name = "finbook")]
#[command(about = "A personal ledger of income and expense entries")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "FINBOOK_DATABASE", default_value = "finbook.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Entry management commands
    #[command(subcommand)]
    Entry(EntryCommands),

    /// Show the balance (income minus expenses) of a user
    Balance {
        /// User ID
        user: UserId,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Register {
        /// Display name
        name: String,

        /// Email address (must be unique)
        #[arg(short, long)]
        email: String,

        /// Secret (password)
        #[arg(short, long, env = "FINBOOK_SECRET")]
        secret: String,
    },

    /// Show a user
    Show {
        /// User ID
        id: UserId,
    },
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// Record a new entry (always starts as pending)
    Add {
        /// Description of the entry
        description: String,

        /// Amount (e.g., "50.00", "50" or "50,00")
        #[arg(short, long)]
        amount: String,

        /// Month, 1-12
        #[arg(short, long)]
        month: i32,

        /// Four-digit year
        #[arg(short, long)]
        year: i32,

        /// Owner user ID
        #[arg(short, long)]
        user: UserId,

        /// Entry type: income, expense
        #[arg(short = 't', long = "type")]
        kind: String,
    },

    /// Change fields of an existing entry
    Update {
        /// Entry ID
        id: EntryId,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        amount: Option<String>,

        #[arg(short, long)]
        month: Option<i32>,

        #[arg(short, long)]
        year: Option<i32>,

        /// Entry type: income, expense
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        id: EntryId,
    },

    /// Set the status of an entry: pending, settled, cancelled
    Status {
        /// Entry ID
        id: EntryId,

        /// New status
        status: String,
    },

    /// Show a single entry
    Show {
        /// Entry ID
        id: EntryId,
    },

    /// Search a user's entries
    Search {
        /// Owner user ID
        #[arg(short, long)]
        user: UserId,

        /// Part of the description (case-insensitive)
        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        month: Option<i32>,

        #[arg(short, long)]
        year: Option<i32>,

        /// Entry type: income, expense
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Status: pending, settled, cancelled
        #[arg(short, long)]
        status: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerApp::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::User(user_cmd) => {
                let app = LedgerApp::connect(&self.database).await?;
                run_user_command(&app, user_cmd).await?;
            }

            Commands::Entry(entry_cmd) => {
                let app = LedgerApp::connect(&self.database).await?;
                run_entry_command(&app, entry_cmd).await?;
            }

            Commands::Balance { user } => {
                let app = LedgerApp::connect(&self.database).await?;
                let balance = app.ledger.compute_balance(user).await?;
                println!("{}", format_amount(balance));
            }
        }

        Ok(())
    }
}

async fn run_user_command(app: &LedgerApp, cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::Register {
            name,
            email,
            secret,
        } => {
            let user = app.users.register(name, email, &secret).await?;
            println!("Registered user: {} <{}> ({})", user.name, user.email, user.id);
        }

        UserCommands::Show { id } => {
            let user = app
                .users
                .find_by_id(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User not found: {}", id))?;
            println!("User: {}", user.name);
            println!("  ID:     {}", user.id);
            println!("  Email:  {}", user.email);
        }
    }
    Ok(())
}

async fn run_entry_command(app: &LedgerApp, cmd: EntryCommands) -> Result<()> {
    match cmd {
        EntryCommands::Add {
            description,
            amount,
            month,
            year,
            user,
            kind,
        } => {
            let amount = parse_amount(&amount)
                .context("Invalid amount format. Use '50.00' or '50'")?;
            let kind = parse_kind(&kind)?;

            let entry = LedgerEntry::new(user, description, month, year, amount, kind);
            let stored = app.ledger.create(entry).await?;
            println!(
                "Recorded entry {}: {} {}",
                stored.id.unwrap_or_default(),
                kind,
                format_amount(amount)
            );
        }

        EntryCommands::Update {
            id,
            description,
            amount,
            month,
            year,
            kind,
        } => {
            let mut entry = find_entry(app, id).await?;
            if let Some(description) = description {
                entry.description = Some(description);
            }
            if let Some(amount) = amount {
                entry.amount = Some(
                    parse_amount(&amount).context("Invalid amount format. Use '50.00' or '50'")?,
                );
            }
            if month.is_some() {
                entry.month = month;
            }
            if year.is_some() {
                entry.year = year;
            }
            if let Some(kind) = kind {
                entry.kind = Some(parse_kind(&kind)?);
            }

            let stored = app.ledger.update(entry).await?;
            print_entry(&stored);
        }

        EntryCommands::Delete { id } => {
            let entry = find_entry(app, id).await?;
            app.ledger.delete(&entry).await?;
            println!("Deleted entry {}", id);
        }

        EntryCommands::Status { id, status } => {
            let status = EntryStatus::from_str(&status).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid status '{}'. Use pending, settled or cancelled",
                    status
                )
            })?;
            let entry = find_entry(app, id).await?;
            let stored = app.ledger.update_status(entry, status).await?;
            println!("Entry {} is now {}", id, display(stored.status));
        }

        EntryCommands::Show { id } => {
            let entry = find_entry(app, id).await?;
            print_entry(&entry);
        }

        EntryCommands::Search {
            user,
            description,
            month,
            year,
            kind,
            status,
            format,
        } => {
            // searching someone who does not exist is a usage error, not an empty result
            app.users
                .find_by_id(user)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User not found: {}", user))?;

            let filter = EntryFilter {
                description,
                month,
                year,
                owner: Some(user),
                amount: None,
                kind: kind.as_deref().map(parse_kind).transpose()?,
                status: status
                    .as_deref()
                    .map(|s| {
                        EntryStatus::from_str(s)
                            .ok_or_else(|| anyhow::anyhow!("Invalid status '{}'", s))
                    })
                    .transpose()?,
            };

            let entries = app.ledger.search(&filter).await?;
            print_entries(&entries, &format)?;
        }
    }
    Ok(())
}

async fn find_entry(app: &LedgerApp, id: EntryId) -> Result<LedgerEntry> {
    app.ledger
        .find_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Entry not found: {}", id))
}

fn parse_kind(s: &str) -> Result<EntryKind> {
    EntryKind::from_str(s)
        .ok_or_else(|| anyhow::anyhow!("Invalid entry type '{}'. Use income or expense", s))
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn print_entry(entry: &LedgerEntry) {
    println!("Entry: {}", display(entry.id));
    println!("  Description:  {}", display(entry.description.as_deref()));
    println!(
        "  Period:       {:02}/{}",
        entry.month.unwrap_or_default(),
        display(entry.year)
    );
    println!("  Amount:       {}", display(entry.amount.map(format_amount)));
    println!("  Type:         {}", display(entry.kind));
    println!("  Status:       {}", display(entry.status));
    println!("  Owner:        {}", display(entry.owner));
    println!("  Registered:   {}", display(entry.registration_date));
}

fn print_entries(entries: &[LedgerEntry], format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(entries)?);
        }
        "csv" => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for entry in entries {
                writer.serialize(entry)?;
            }
            writer.flush()?;
        }
        "table" => {
            if entries.is_empty() {
                println!("No entries found.");
                return Ok(());
            }
            println!(
                "{:<6} {:<30} {:<8} {:>12} {:<8} {:<10}",
                "ID", "DESCRIPTION", "PERIOD", "AMOUNT", "TYPE", "STATUS"
            );
            println!("{}", "-".repeat(79));
            for entry in entries {
                println!(
                    "{:<6} {:<30} {:<8} {:>12} {:<8} {:<10}",
                    display(entry.id),
                    display(entry.description.as_deref()),
                    format!(
                        "{:02}/{}",
                        entry.month.unwrap_or_default(),
                        display(entry.year)
                    ),
                    display(entry.amount.map(format_amount)),
                    display(entry.kind),
                    display(entry.status)
                );
            }
        }
        other => anyhow::bail!("Unknown format '{}'. Use table, json or csv", other),
    }
    Ok(())
}

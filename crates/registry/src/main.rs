//! Civic Registry CLI - Main entry point

use civic_conflict::ConflictStatus;
use civic_core::EntityType;
use civic_history::{HistoryQuery, PageRequest};
use civic_ledger::ChangeType;
use civic_registry::{commands, Registry, RegistryConfig, Scenario, ScenarioRun};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "civic")]
#[command(about = "Civic Registry - versioned facts about people, organizations and their ties", long_about = None)]
struct Cli {
    /// Registry configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario to load before running the command (JSON)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-field attribution for an entity
    Blame {
        /// PERSON, ORGANIZATION, ASSOCIATION or CONFLICT_OF_INTEREST
        entity_type: EntityType,
        /// Entity id or scenario alias
        entity: String,
    },

    /// Field changes in the version window [from, to)
    Diff {
        entity_type: EntityType,
        entity: String,
        from: usize,
        to: usize,
    },

    /// Ledger records, newest first
    History {
        #[arg(long)]
        entity_type: Option<EntityType>,
        #[arg(long)]
        entity: Option<String>,
        /// Only records by this author id
        #[arg(long)]
        author: Option<String>,
        /// Only records touching this field
        #[arg(long)]
        field: Option<String>,
        /// Only these change types (repeatable)
        #[arg(long = "change-type")]
        change_types: Vec<ChangeType>,
        #[arg(long)]
        limit: Option<usize>,
        /// Cursor from a previous page
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Detected conflicts of interest
    Conflicts {
        /// Person id or scenario alias
        #[arg(long)]
        person: Option<String>,
        #[arg(long)]
        status: Option<ConflictStatus>,
    },

    /// Beneficial owners of an organization
    Ownership {
        /// Organization id or scenario alias
        organization: String,
    },

    /// Relationship graph around an entity
    Network {
        center: String,
        #[arg(long, default_value = "2")]
        depth: usize,
    },

    /// Verify every hash chain in the ledger
    Audit,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => RegistryConfig::from_file(path)?,
        None => RegistryConfig::default(),
    };
    let registry = Registry::new(config);

    let run = match cli.scenario {
        Some(ref path) => Scenario::from_file(path)?.apply(&registry)?,
        None => ScenarioRun::default(),
    };

    let output = match cli.command {
        Commands::Blame {
            entity_type,
            entity,
        } => commands::blame(&registry, &run, entity_type, &entity)?,

        Commands::Diff {
            entity_type,
            entity,
            from,
            to,
        } => commands::diff(&registry, &run, entity_type, &entity, from, to)?,

        Commands::History {
            entity_type,
            entity,
            author,
            field,
            change_types,
            limit,
            cursor,
        } => {
            let query = HistoryQuery {
                entity_type,
                entity_id: entity,
                change_types,
                author_id: author,
                field,
                ..HistoryQuery::default()
            };
            commands::history(&registry, &run, query, PageRequest { cursor, limit })?
        }

        Commands::Conflicts { person, status } => {
            commands::conflicts(&registry, &run, person.as_deref(), status)?
        }

        Commands::Ownership { organization } => commands::ownership(&registry, &run, &organization)?,

        Commands::Network { center, depth } => commands::network(&registry, &run, &center, depth)?,

        Commands::Audit => commands::audit(&registry)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

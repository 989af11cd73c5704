//! Gardonyi CLI
//!
//! Command-line admin client for the Gardonyi CMS.
//!
//! # Commands
//!
//! - `list` - List a page of records
//! - `get` - Show one record
//! - `create` / `update` / `patch` / `delete` - Edit records
//! - `route` - Enter an admin route and show the resulting store state
//! - `demo` - Run a scripted session against an in-process server

mod commands;

use clap::{Parser, Subcommand};
use commands::{EntityKind, FieldArgs, OutputFormat};
use gardonyi_client::{
    ClientConfig, HttpClient, HttpTransport, LoopbackClient, ReqwestClient, StoreRegistry,
};
use gardonyi_model::EntityId;
use gardonyi_protocol::Sort;
use gardonyi_server::{CmsServer, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Gardonyi CMS admin client.
#[derive(Parser)]
#[command(name = "gardonyi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the CMS server
    #[arg(global = true, long, default_value = "http://localhost:8080")]
    base_url: String,

    /// Use a seeded in-process server instead of the network
    #[arg(global = true, long)]
    memory: bool,

    /// Bearer token sent with every request
    #[arg(global = true, long)]
    token: Option<String>,

    /// Output format
    #[arg(global = true, short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a page of records
    List {
        /// Entity type
        #[arg(value_enum)]
        entity: EntityKind,

        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page: u32,

        /// Records per page
        #[arg(long)]
        size: Option<u32>,

        /// Sort order, e.g. `title,desc`
        #[arg(long)]
        sort: Option<Sort>,
    },

    /// Show one record
    Get {
        /// Entity type
        #[arg(value_enum)]
        entity: EntityKind,

        /// Record id
        id: EntityId,
    },

    /// Create a record
    Create {
        /// Entity type
        #[arg(value_enum)]
        entity: EntityKind,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Replace a record
    Update {
        /// Entity type
        #[arg(value_enum)]
        entity: EntityKind,

        /// Record id
        id: EntityId,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Change only the given fields of a record
    Patch {
        /// Entity type
        #[arg(value_enum)]
        entity: EntityKind,

        /// Record id
        id: EntityId,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a record
    Delete {
        /// Entity type
        #[arg(value_enum)]
        entity: EntityKind,

        /// Record id
        id: EntityId,
    },

    /// Enter an admin route, e.g. `/page/1/edit`
    Route {
        /// Route path
        path: String,
    },

    /// Run a scripted session against an in-process server
    Demo,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::new(cli.base_url.clone());
    if let Some(token) = &cli.token {
        config = config.with_bearer_token(token.clone());
    }
    let format = cli.format;

    match cli.command {
        Commands::Demo => return commands::demo::run(format).await,
        Commands::Version => {
            println!("Gardonyi CLI v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    if cli.memory {
        let server = Arc::new(CmsServer::with_default_resources(ServerConfig::default()));
        let transport = Arc::new(HttpTransport::new(&config, LoopbackClient::new(server)));
        let registry = StoreRegistry::with_default_stores(&config, transport);
        commands::seed::<LoopbackClient<Arc<CmsServer>>>(&registry).await?;
        execute::<LoopbackClient<Arc<CmsServer>>>(&registry, cli.command, format).await
    } else {
        let client = ReqwestClient::new(&config)?;
        let transport = Arc::new(HttpTransport::new(&config, client));
        let registry = StoreRegistry::with_default_stores(&config, transport);
        execute::<ReqwestClient>(&registry, cli.command, format).await
    }
}

async fn execute<C: HttpClient + 'static>(
    registry: &StoreRegistry,
    command: Commands,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::List {
            entity,
            page,
            size,
            sort,
        } => commands::entity::list::<C>(registry, entity, page, size, sort, format).await?,
        Commands::Get { entity, id } => {
            commands::entity::get::<C>(registry, entity, id, format).await?
        }
        Commands::Create { entity, fields } => {
            commands::entity::create::<C>(registry, entity, &fields, format).await?
        }
        Commands::Update { entity, id, fields } => {
            commands::entity::update::<C>(registry, entity, id, &fields, false, format).await?
        }
        Commands::Patch { entity, id, fields } => {
            commands::entity::update::<C>(registry, entity, id, &fields, true, format).await?
        }
        Commands::Delete { entity, id } => {
            commands::entity::delete::<C>(registry, entity, id, format).await?
        }
        Commands::Route { path } => commands::route::run::<C>(registry, &path, format).await?,
        Commands::Demo | Commands::Version => {}
    }
    Ok(())
}

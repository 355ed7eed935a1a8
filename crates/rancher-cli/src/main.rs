//! Rancher - schema-driven API client
//!
//! Main entry point for the `rancher` CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use rancher_api::ClientConfig;

mod commands;

use commands::{action, call, create, delete, get, list, schema, update};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Rancher - schema-driven API client
#[derive(Parser)]
#[command(name = "rancher")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API endpoint the schema is discovered from
    #[arg(long, global = true, env = "RANCHER_URL")]
    pub url: Option<String>,

    /// Access key for basic auth
    #[arg(long, global = true, env = "RANCHER_ACCESS_KEY")]
    pub access_key: Option<String>,

    /// Secret key for basic auth
    #[arg(long, global = true, env = "RANCHER_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// TOML config file
    #[arg(short, long, global = true, env = "RANCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reject list filters the schema does not declare
    #[arg(long, global = true)]
    pub strict: bool,

    /// Cache the schema document on disk
    #[arg(long, global = true, conflicts_with = "no_cache")]
    pub cache: bool,

    /// Never read or write the schema cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the resource types the server declares
    Schema(schema::SchemaArgs),

    /// List a collection
    List(list::ListArgs),

    /// Show one resource
    Get(get::GetArgs),

    /// Create a resource
    Create(create::CreateArgs),

    /// Update a resource
    Update(update::UpdateArgs),

    /// Delete resources
    Delete(delete::DeleteArgs),

    /// Invoke an action on a resource
    Action(action::ActionArgs),

    /// Invoke a per-type method by name (e.g. list_container)
    Call(call::CallArgs),
}

impl Cli {
    /// Config file, then environment, then flags.
    fn resolve_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ClientConfig::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());

        if let Some(url) = &self.url {
            config.url = Some(url.clone());
        }
        if let Some(key) = &self.access_key {
            config.access_key = Some(key.clone());
        }
        if let Some(key) = &self.secret_key {
            config.secret_key = Some(key.clone());
        }
        if self.strict {
            config.strict = true;
        }
        if self.cache {
            config.cache.enabled = true;
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
        Ok(config)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays clean
    let filter = if cli.verbose {
        "rancher=debug,rancher_api=debug,warn"
    } else {
        "rancher=warn,rancher_api=warn"
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
                ),
        )
        .init();

    let config = cli.resolve_config()?;

    // Create context for commands
    let ctx = commands::Context {
        config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Schema(args) => schema::run(args, &ctx).await,
        Commands::List(args) => list::run(args, &ctx).await,
        Commands::Get(args) => get::run(args, &ctx).await,
        Commands::Create(args) => create::run(args, &ctx).await,
        Commands::Update(args) => update::run(args, &ctx).await,
        Commands::Delete(args) => delete::run(args, &ctx).await,
        Commands::Action(args) => action::run(args, &ctx).await,
        Commands::Call(args) => call::run(args, &ctx).await,
    }
}

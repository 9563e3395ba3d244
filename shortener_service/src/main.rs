use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;
use shared::{DatabaseSettings, connect_db};
use shortener_service::{NewMapping, UrlStore};
use tracing::{Level, info};

#[derive(Debug, Parser)]
#[command(name = "shortener", about = "Manage short url mappings")]
struct Cli {
    /// Overrides DATABASE_URL.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations
    Migrate,
    /// Shorten a url, reusing the existing slug for a known destination
    Shorten {
        url: String,
        #[arg(long)]
        slug: Option<String>,
        /// RFC 3339 timestamp, e.g. 2030-01-01T00:00:00Z
        #[arg(long)]
        expires_at: Option<DateTime<Utc>>,
    },
    /// Resolve a slug and record the access
    Resolve { slug: String },
    /// Show a mapping with its access times
    Stats { slug: String },
    /// List every mapping
    List,
    /// Delete a mapping and its access logs
    Delete { slug: String },
    /// Delete every mapping past its expiry
    PurgeExpired,
    /// Check that the database answers
    Ping,
}

#[derive(Serialize)]
struct Shortened<'a> {
    slug: &'a str,
    normalized_url: &'a str,
    created: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = DatabaseSettings::from_env()?;
    if let Some(url) = cli.database_url {
        settings.url = url;
    }

    let db = connect_db(&settings).await?;
    let store = UrlStore::new(db.clone());

    match cli.command {
        Command::Migrate => {
            Migrator::up(&*db, None)
                .await
                .context("Failed to apply migrations")?;
            info!("Migrations applied");
        }
        Command::Shorten {
            url,
            slug,
            expires_at,
        } => {
            let new = NewMapping {
                url,
                slug,
                expires_at,
            };
            let (model, created) = store.shorten(new).await?;
            print_json(&Shortened {
                slug: &model.slug,
                normalized_url: &model.normalized_url,
                created,
            })?;
        }
        Command::Resolve { slug } => {
            let model = store.visit(&slug).await?;
            println!("{}", model.normalized_url);
        }
        Command::Stats { slug } => print_json(&store.stats(&slug).await?)?,
        Command::List => print_json(&store.list_mappings().await?)?,
        Command::Delete { slug } => print_json(&store.delete_mapping(&slug).await?)?,
        Command::PurgeExpired => {
            let purged = store.purge_expired(Utc::now()).await?;
            print_json(&serde_json::json!({ "purged": purged }))?;
        }
        Command::Ping => {
            store.ping().await.context("Database is not ready")?;
            print_json(&serde_json::json!({ "ready": true }))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

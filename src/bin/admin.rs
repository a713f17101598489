//! CLI administration tool for shortmap.
//!
//! Inspects stored mappings, reports duplicate rows and evicts cache entries
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Look up a mapping in either direction
//! cargo run --bin admin -- mappings find --url "https://example.com/page"
//! cargo run --bin admin -- mappings find --code 0000x1Z
//!
//! # List long URLs and short codes stored more than once
//! cargo run --bin admin -- mappings duplicates --limit 20
//!
//! # Remove a cache slot, by short code or by long URL
//! cargo run --bin admin -- cache evict --code 0000x1Z
//! cargo run --bin admin -- cache evict --url "https://example.com/page"
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_*` components): PostgreSQL connection string
//! - `REDIS_URL` (or `REDIS_*` components): required for `cache` commands
//! - `CACHE_KEY_PREFIX`: namespace used by the server, applied to evicted keys

use shortmap::config::Config;
use shortmap::infrastructure::cache::{CacheService, RedisCache, code_key, url_key};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;

/// CLI tool for managing shortmap.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Inspect stored mappings
    Mappings {
        #[command(subcommand)]
        action: MappingAction,
    },

    /// Cache operations
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

/// Mapping inspection subcommands.
#[derive(Subcommand)]
enum MappingAction {
    /// Find rows by long URL or short code
    Find {
        /// Long URL to look up
        #[arg(short, long, conflicts_with = "code", required_unless_present = "code")]
        url: Option<String>,

        /// Short code to look up
        #[arg(short, long)]
        code: Option<String>,
    },

    /// List long URLs and short codes that appear in more than one row
    Duplicates {
        /// Maximum entries per section
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },
}

/// Cache subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Delete the cached entry for a long URL or a short code
    Evict {
        /// Long URL whose cached short code is removed
        #[arg(short, long, conflicts_with = "code", required_unless_present = "code")]
        url: Option<String>,

        /// Short code whose cached long URL is removed
        #[arg(short, long)]
        code: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &connect_db().await?).await?,
        Commands::Mappings { action } => {
            handle_mapping_action(action, &connect_db().await?).await?
        }
        Commands::Cache { action } => handle_cache_action(action).await?,
    }

    Ok(())
}

async fn connect_db() -> Result<PgPool> {
    let database_url = Config::load_database_url()?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Mappings:   {}", rows.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}

/// Dispatches mapping inspection commands.
async fn handle_mapping_action(action: MappingAction, pool: &PgPool) -> Result<()> {
    match action {
        MappingAction::Find { url, code } => find_mappings(pool, url, code).await,
        MappingAction::Duplicates { limit } => list_duplicates(pool, limit).await,
    }
}

/// Prints every row matching the long URL or short code.
///
/// # Output Format
///
/// ```text
/// 🔎 Mappings
///
///   Short      Long URL
///   ─────────────────────────────────────────────
///   0000x1Z    https://example.com/page
/// ```
async fn find_mappings(pool: &PgPool, url: Option<String>, code: Option<String>) -> Result<()> {
    println!("{}", "🔎 Mappings".bright_blue().bold());
    println!();

    let rows: Vec<(String, String)> = match (url, code) {
        (Some(url), _) => {
            sqlx::query_as("SELECT url, short FROM urls WHERE url = $1")
                .bind(url)
                .fetch_all(pool)
                .await?
        }
        (None, Some(code)) => {
            sqlx::query_as("SELECT url, short FROM urls WHERE short = $1")
                .bind(code)
                .fetch_all(pool)
                .await?
        }
        (None, None) => anyhow::bail!("Either --url or --code is required"),
    };

    if rows.is_empty() {
        println!("{}", "  No mappings found".yellow());
        return Ok(());
    }

    println!(
        "  {:<10} {}",
        "Short".bright_white().bold(),
        "Long URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    for (long_url, short_code) in &rows {
        println!("  {:<10} {}", short_code.cyan(), long_url);
    }

    println!();
    if rows.len() > 1 {
        println!(
            "{}",
            format!("⚠️  {} rows share this key", rows.len())
                .yellow()
                .bold()
        );
        println!();
    }

    Ok(())
}

/// Lists keys stored in more than one row, in both directions.
async fn list_duplicates(pool: &PgPool, limit: i64) -> Result<()> {
    println!("{}", "🧬 Duplicate Mappings".bright_blue().bold());
    println!();

    let by_url: Vec<(String, i64)> = sqlx::query_as(
        "SELECT url, COUNT(*) FROM urls GROUP BY url HAVING COUNT(*) > 1 \
         ORDER BY COUNT(*) DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let by_code: Vec<(String, i64)> = sqlx::query_as(
        "SELECT short, COUNT(*) FROM urls GROUP BY short HAVING COUNT(*) > 1 \
         ORDER BY COUNT(*) DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    print_duplicate_section("Long URLs", &by_url);
    print_duplicate_section("Short codes", &by_code);

    Ok(())
}

fn print_duplicate_section(title: &str, entries: &[(String, i64)]) {
    println!("  {}", title.bright_white().bold());

    if entries.is_empty() {
        println!("    {}", "none".green());
    } else {
        for (key, count) in entries {
            println!("    {:>4}  {}", count.to_string().red().bold(), key);
        }
    }

    println!();
}

/// Dispatches cache commands.
async fn handle_cache_action(action: CacheAction) -> Result<()> {
    match action {
        CacheAction::Evict { url, code, yes } => {
            let key = match (url, code) {
                (Some(url), _) => url_key(&url),
                (None, Some(code)) => code_key(&code),
                (None, None) => anyhow::bail!("Either --url or --code is required"),
            };
            evict_key(key, yes).await
        }
    }
}

/// Deletes one namespaced cache slot after confirmation.
async fn evict_key(key: String, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Evict Cache Entry".bright_blue().bold());
    println!();

    let redis_url = Config::load_redis_url().context("REDIS_URL or REDIS_HOST must be set")?;
    let prefix = std::env::var("CACHE_KEY_PREFIX").unwrap_or_default();

    println!("  Key: {}{}", prefix.bright_black(), key.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Evict this key?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let cache = RedisCache::connect(&redis_url, prefix)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))?;

    cache
        .delete(&key)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to evict key: {}", e))?;

    println!("{}", "✅ Key evicted".green().bold());
    println!();

    Ok(())
}

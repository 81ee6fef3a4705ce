//! CLI administration tool for panel-query-cache.
//!
//! Derives cache keys, purges a panel's entries, inspects stored responses
//! and checks store connectivity without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show the key a request would use
//! cargo run --bin admin -- key -d dash -s ds -o 1 -p 3 \
//!     --var env=prod --from 2024-01-01T10:00:00Z --to 2024-01-01T10:05:00Z --ttl 300
//!
//! # Drop every entry of one panel
//! cargo run --bin admin -- purge -d dash -s ds -o 1 -p 3
//!
//! # Decode a stored entry
//! cargo run --bin admin -- inspect "dash_ds_1_3_Env:prod_5m0s_2024-01-01T10:00:00Z"
//!
//! # Check the store
//! cargo run --bin admin -- ping
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL` or `REDIS_HOST`/`REDIS_PORT`/`REDIS_PASSWORD`/`REDIS_DB`
//!   (required except for `key`)
//! - `CACHE_KEY_NAMESPACE` (default: `query-cache:`)

use std::collections::HashMap;

use panel_query_cache::config::{self, Config, mask_connection_string};
use panel_query_cache::domain::cache_key::{cache_key, purge_prefix};
use panel_query_cache::domain::headers::{
    DASHBOARD_UID, DASHBOARD_VAR_PREFIX, DATASOURCE_UID, ORG_ID, PANEL_ID, canonical_name,
};
use panel_query_cache::domain::query::TimeRange;
use panel_query_cache::infrastructure::cache::{CacheStore, RedisCache};
use panel_query_cache::infrastructure::codec::decode_response;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing panel-query-cache.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cache key and purge prefix for a request
    Key {
        #[command(flatten)]
        panel: PanelArgs,

        /// Dashboard variable binding, `name=value` (repeatable)
        #[arg(long = "var", value_parser = parse_binding)]
        vars: Vec<(String, String)>,

        /// Range start (RFC 3339)
        #[arg(long)]
        from: DateTime<Utc>,

        /// Range end (RFC 3339)
        #[arg(long)]
        to: DateTime<Utc>,

        /// Caching TTL in seconds
        #[arg(long, default_value_t = 0.0)]
        ttl: f64,
    },

    /// Delete every cached entry of one panel
    Purge {
        #[command(flatten)]
        panel: PanelArgs,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Decode and summarize a stored entry
    Inspect {
        /// Cache key, without the namespace
        key: String,
    },

    /// Check store connectivity
    Ping,
}

/// Identity of a dashboard panel.
#[derive(Args)]
struct PanelArgs {
    /// Dashboard UID
    #[arg(short, long)]
    dashboard: String,

    /// Data source UID
    #[arg(short = 's', long)]
    datasource: String,

    /// Organization ID
    #[arg(short, long)]
    org: String,

    /// Panel ID
    #[arg(short, long)]
    panel: String,
}

impl PanelArgs {
    fn headers(&self) -> HashMap<String, String> {
        HashMap::from([
            (DASHBOARD_UID.to_string(), self.dashboard.clone()),
            (DATASOURCE_UID.to_string(), self.datasource.clone()),
            (ORG_ID.to_string(), self.org.clone()),
            (PANEL_ID.to_string(), self.panel.clone()),
        ])
    }
}

fn parse_binding(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Key {
            panel,
            vars,
            from,
            to,
            ttl,
        } => show_key(&panel, &vars, TimeRange::new(from, to), ttl),
        Commands::Purge { panel, yes } => {
            let config = config::load_from_env()?;
            let store = connect(&config).await?;
            purge(&store, &panel, yes).await
        }
        Commands::Inspect { key } => {
            let config = config::load_from_env()?;
            let store = connect(&config).await?;
            inspect(&store, &key).await
        }
        Commands::Ping => {
            let config = config::load_from_env()?;
            let store = connect(&config).await?;
            ping(&store, &config).await
        }
    }
}

/// Connects to the Redis store named by the environment.
async fn connect(config: &Config) -> Result<RedisCache> {
    let redis_url = config
        .redis_url
        .as_deref()
        .context("REDIS_URL or REDIS_HOST must be set")?;

    RedisCache::connect(redis_url, &config.key_namespace)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))
}

fn show_key(panel: &PanelArgs, vars: &[(String, String)], range: TimeRange, ttl: f64) -> Result<()> {
    let mut headers = panel.headers();
    for (name, value) in vars {
        headers.insert(
            canonical_name(&format!("{}{}", DASHBOARD_VAR_PREFIX, name)),
            value.clone(),
        );
    }

    println!("{}", "🔑 Cache Key".bright_blue().bold());
    println!();
    println!("  Key:          {}", cache_key(&headers, &range, ttl).bright_yellow());
    println!("  Purge prefix: {}", purge_prefix(&headers).cyan());
    println!();

    Ok(())
}

/// Deletes a panel's entries after confirmation.
async fn purge(store: &RedisCache, panel: &PanelArgs, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Purge Panel".bright_blue().bold());
    println!();

    let prefix = purge_prefix(&panel.headers());
    println!("  Prefix: {}", prefix.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete every entry with this prefix?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = store
        .delete_with_prefix(&prefix)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to purge: {}", e))?;

    println!(
        "{} {}",
        "✅ Deleted entries:".green().bold(),
        deleted.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Fetches an entry and prints one line per query result.
///
/// # Output Format
///
/// ```text
/// 🔍 Cache Entry
///
///   Key:   dash_ds_1_3_5m0s_2024-01-01T10:00:00Z
///   Size:  412 bytes (gzip)
///
///   A      2 frame(s), 4 field(s), 120 value(s)
/// ```
async fn inspect(store: &RedisCache, key: &str) -> Result<()> {
    println!("{}", "🔍 Cache Entry".bright_blue().bold());
    println!();

    let bytes = store
        .get(key)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read entry: {}", e))?;

    let Some(bytes) = bytes else {
        println!("{}", "  Not found (never written or expired)".yellow());
        return Ok(());
    };

    println!("  Key:   {}", key.cyan());
    println!("  Size:  {} bytes (gzip)", bytes.len());
    println!();

    let response = decode_response(&bytes).context("Entry is corrupted")?;

    for (ref_id, result) in &response.responses {
        let fields: usize = result.frames.iter().map(|f| f.fields.len()).sum();
        let values: usize = result
            .frames
            .iter()
            .flat_map(|f| &f.fields)
            .map(|field| field.values.len())
            .sum();

        let summary = format!(
            "{} frame(s), {} field(s), {} value(s)",
            result.frames.len(),
            fields,
            values
        );
        match &result.error {
            Some(error) => println!("  {:<6} {}", ref_id.bright_white(), error.red()),
            None => println!("  {:<6} {}", ref_id.bright_white(), summary.bright_black()),
        }
    }
    println!();

    Ok(())
}

async fn ping(store: &RedisCache, config: &Config) -> Result<()> {
    let target = config
        .redis_url
        .as_deref()
        .map(mask_connection_string)
        .unwrap_or_default();

    if store.health_check().await {
        println!("{} {}", "✅ Store reachable:".green().bold(), target);
        Ok(())
    } else {
        println!("{} {}", "❌ Store unreachable:".red().bold(), target);
        anyhow::bail!("Store health check failed")
    }
}

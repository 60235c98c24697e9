// prodev command line entry point.
// Data goes to stdout as JSON lines; logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use prodev::cache::QueryCache;
use prodev::config::Config;
use prodev::db::{self, Record, cache_query, log_queries, query_records, retry, with_query_connection};
use prodev::error::Result;
use prodev::github::{GitHubClient, GithubOrgClient};
use prodev::users;

#[derive(Parser)]
#[command(name = "prodev", version, about = "Stream and query the user_data table")]
struct Cli {
    /// SQLite database path.
    #[arg(long, global = true, env = "PRODEV_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create user_data and load it from CSV if empty.
    Seed {
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print users one at a time.
    Stream {
        /// Stop after this many users.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print users older than 25, processed in batches.
    Batches {
        #[arg(long)]
        size: Option<usize>,
    },
    /// Print users page by page.
    Paginate {
        #[arg(long)]
        size: Option<usize>,
    },
    /// Print the average user age.
    AverageAge,
    /// Run a query several times through the query cache.
    Cached {
        query: String,
        #[arg(long, default_value_t = 2)]
        repeat: usize,
    },
    /// Fetch all users and users over 40 concurrently.
    Concurrent,
    /// List an organization's public repositories.
    Repos {
        org: String,
        #[arg(long)]
        license: Option<String>,
    },
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    let database = config.database_path.clone();

    match cli.command {
        Command::Seed { csv } => {
            let csv = csv.unwrap_or_else(|| config.csv_path.clone());
            let outcome = users::seed_database(&database, &csv)?;
            info!(?outcome, database = %database.display(), "seeding finished");
        }
        Command::Stream { limit } => {
            let stream = users::stream_users(&database)?;
            for user in stream.take(limit.unwrap_or(usize::MAX)) {
                emit(&user?)?;
            }
        }
        Command::Batches { size } => {
            for user in users::batch_processing(&database, size.unwrap_or(config.page_size))? {
                emit(&user?)?;
            }
        }
        Command::Paginate { size } => {
            for page in users::lazy_paginate(&database, size.unwrap_or(config.page_size))? {
                emit(&page?)?;
            }
        }
        Command::AverageAge => {
            let average = users::calculate_average_age(&database)?;
            println!("Average age of users: {:.2}", average);
        }
        Command::Cached { query, repeat } => {
            let mut cache: QueryCache<Vec<Record>> = QueryCache::new();
            let policy = config.retry_policy();
            {
                let mut fetch = log_queries(with_query_connection(
                    &database,
                    cache_query(&mut cache, |conn: &Connection, query: &str| {
                        retry(policy, || query_records(conn, query, []))
                    }),
                ));
                for _ in 0..repeat {
                    let rows = fetch(query.as_str())?;
                    info!(rows = rows.len(), "query returned");
                }
            }
            let stats = cache.stats();
            info!(hits = stats.hits, misses = stats.misses, "query cache");
        }
        Command::Concurrent => {
            let (all, older) = db::fetch_concurrently(&database).await?;
            emit(&all)?;
            emit(&older)?;
        }
        Command::Repos { org, license } => {
            let fetcher = GitHubClient::new(&config.github_api_base)?;
            let mut client = GithubOrgClient::new(org, fetcher);
            for name in client.public_repos(license.as_deref()).await? {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

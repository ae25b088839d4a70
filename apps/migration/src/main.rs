//! Schema migration CLI for the blog database.
//!
//! Reads `DATABASE_URL` (optionally from `.env`) and accepts the usual
//! `up`, `down`, `status`, `fresh` and `refresh` subcommands.

use sea_orm_migration::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm_migration=info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        migrations = migration::Migrator::migrations().len(),
        "Running blog schema migrations"
    );
    cli::run_cli(migration::Migrator).await;
}

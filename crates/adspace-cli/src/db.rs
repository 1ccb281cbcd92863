//! `db` command handlers.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

pub(crate) async fn run(pool: &sqlx::PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            adspace_db::health_check(pool).await?;
            println!("✓ database reachable");
        }
        DbCommands::Migrate => {
            let applied = adspace_db::run_migrations(pool).await?;
            println!("✓ applied {applied} migration(s)");
        }
    }
    Ok(())
}

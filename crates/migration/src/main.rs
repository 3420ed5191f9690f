use clap::{Parser, Subcommand};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;

use migration::Migrator;

#[derive(Parser, Debug)]
#[command(name = "ledgerbook_migrate")]
#[command(about = "Apply or roll back the Ledgerbook schema")]
struct Cli {
    /// Connection string. `LEDGERBOOK_DATABASE_URL` is read before `DATABASE_URL`.
    #[arg(long, env = "LEDGERBOOK_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations (the default).
    Up {
        /// Apply at most this many migrations.
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations, newest first.
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table, then apply all migrations again.
    Fresh {
        /// Required, the ledgers are lost.
        #[arg(long)]
        yes: bool,
    },
    /// Print which migrations are applied.
    Status,
}

fn database_url(cli_value: Option<String>) -> String {
    cli_value
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:./ledgerbook.db?mode=rwc".to_string())
}

async fn pending_count(db: &DatabaseConnection) -> Result<usize, DbErr> {
    Ok(Migrator::get_pending_migrations(db).await?.len())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(database_url(cli.database_url)).await?;

    match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => {
            let before = pending_count(&db).await?;
            Migrator::up(&db, steps).await?;
            let applied = before.saturating_sub(pending_count(&db).await?);
            println!("applied {applied} migration(s)");
        }
        Command::Down { steps } => {
            Migrator::down(&db, Some(steps)).await?;
            println!("rolled back up to {steps} migration(s)");
        }
        Command::Fresh { yes } => {
            if !yes {
                eprintln!("refusing to drop the ledgers without --yes");
                std::process::exit(2);
            }
            Migrator::fresh(&db).await?;
            println!("schema recreated");
        }
        Command::Status => Migrator::status(&db).await?,
    }

    Ok(())
}

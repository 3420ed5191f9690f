use std::{error::Error, io::Write};

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use csv::Writer;
use engine::{
    CompanyProfile, Currency, Engine, LedgerKind, Money, ReportLayout, TransactionFilter,
    TransactionInput, converted_total, filter_by_name, parse_minor,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "ledgerbook_admin")]
#[command(about = "Operator utilities for Ledgerbook (accounts, statements, balance repair)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./ledgerbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the accounts of a ledger with their current balance.
    Accounts(AccountsArgs),
    /// Open an account with a zero-amount seed transaction.
    Open(OpenArgs),
    /// Record a debit/credit transaction.
    Add(AddArgs),
    /// Delete a transaction after confirmation.
    Delete(DeleteArgs),
    /// Print an account statement, as a report or as CSV.
    Statement(StatementArgs),
    /// Rewrite every stored balance of a ledger from the full history.
    Recompute(LedgerArg),
    /// Save the company profile printed on reports.
    Company(CompanyArgs),
}

#[derive(Args, Debug)]
struct LedgerArg {
    /// `customer` or `supplier`.
    #[arg(long, value_parser = parse_ledger)]
    ledger: LedgerKind,
}

#[derive(Args, Debug)]
struct AccountsArgs {
    #[command(flatten)]
    ledger: LedgerArg,
    /// Case-insensitive name filter.
    #[arg(long)]
    name: Option<String>,
    /// Also print the combined balance converted to this currency.
    #[arg(long, value_parser = parse_currency)]
    display_currency: Option<Currency>,
}

#[derive(Args, Debug)]
struct OpenArgs {
    #[command(flatten)]
    ledger: LedgerArg,
    #[arg(long)]
    account: String,
    #[arg(long, value_parser = parse_currency, default_value = "USD")]
    currency: Currency,
    /// Opening date (YYYY-MM-DD), today when omitted.
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[command(flatten)]
    ledger: LedgerArg,
    #[arg(long)]
    account: String,
    #[arg(long)]
    description: String,
    /// Transaction date (YYYY-MM-DD), today when omitted.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_currency, default_value = "USD")]
    currency: Currency,
    /// Debit amount in major units, e.g. `1250.50`.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    debit: i64,
    /// Credit amount in major units.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    credit: i64,
    /// Client-chosen transaction id.
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args, Debug)]
struct DeleteArgs {
    #[command(flatten)]
    ledger: LedgerArg,
    #[arg(long)]
    id: String,
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
}

#[derive(Args, Debug)]
struct StatementArgs {
    #[command(flatten)]
    ledger: LedgerArg,
    #[arg(long)]
    account: String,
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Write CSV rows instead of the printable report.
    #[arg(long)]
    csv: bool,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    page_height: Option<usize>,
}

#[derive(Args, Debug)]
struct CompanyArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    address: Option<String>,
}

fn parse_ledger(raw: &str) -> Result<LedgerKind, String> {
    LedgerKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw.to_uppercase().as_str()).map_err(|err| err.to_string())
}

fn parse_amount(raw: &str) -> Result<i64, String> {
    parse_minor(raw).map_err(|err| err.to_string())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Single-key yes/no prompt. Anything but `y` declines.
fn confirm(prompt: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt),
        Print(" [y/N] ")
    )?;
    out.flush()?;

    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        let answer = match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char(_) | KeyCode::Enter | KeyCode::Esc => false,
            _ => continue,
        };
        execute!(out, Print(if answer { "y\r\n" } else { "n\r\n" }))?;
        out.flush()?;
        return Ok(answer);
    }
}

#[derive(Serialize)]
struct StatementRow {
    date: NaiveDate,
    id: String,
    description: String,
    currency: &'static str,
    debit: String,
    credit: String,
    balance: String,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Accounts(args) => {
            let mut rows = engine.list_accounts(args.ledger.ledger).await?;
            if let Some(name) = args.name.as_deref() {
                rows = filter_by_name(rows, name);
            }
            if rows.is_empty() {
                println!("no accounts");
                return Ok(());
            }
            for row in &rows {
                println!(
                    "{:<32} {:>5} tx  last {}  balance {}",
                    row.name,
                    row.total_transactions,
                    row.last_transaction_date,
                    Money::new(row.current_balance_minor, row.currency)
                );
            }
            if let Some(display) = args.display_currency {
                let total = converted_total(&rows, display);
                println!(
                    "total: {}",
                    Money::new(total.amount_minor, total.currency)
                );
            }
        }
        Command::Open(args) => {
            let seed = engine
                .open_account(
                    args.ledger.ledger,
                    &args.account,
                    args.currency,
                    args.date.unwrap_or_else(today),
                )
                .await?;
            println!("opened account: {} ({})", seed.account_name, seed.id);
        }
        Command::Add(args) => {
            let input = TransactionInput {
                account_name: args.account,
                description: args.description,
                date: args.date.unwrap_or_else(today),
                currency: args.currency,
                debit_minor: args.debit,
                credit_minor: args.credit,
            };
            let tx = engine
                .create_transaction(args.ledger.ledger, input, args.id.as_deref())
                .await?;
            println!(
                "created transaction: {} (balance {})",
                tx.id,
                Money::new(tx.balance_minor, tx.currency)
            );
        }
        Command::Delete(args) => {
            let kind = args.ledger.ledger;
            let tx = engine.transaction(kind, &args.id).await?;
            let prompt = format!(
                "Delete {} '{}' of {} ({})?",
                tx.id, tx.description, tx.account_name, tx.date
            );
            if !args.yes && !confirm(&prompt)? {
                println!("aborted");
                return Ok(());
            }
            engine.delete_transaction(kind, &tx.id).await?;
            println!("deleted transaction: {}", tx.id);
        }
        Command::Statement(args) => {
            let kind = args.ledger.ledger;
            let filter = TransactionFilter {
                account: Some(args.account),
                from: args.from,
                to: args.to,
            };

            if args.csv {
                let statement = engine.statement(kind, &filter).await?;
                let mut writer = Writer::from_writer(std::io::stdout());
                for tx in statement.transactions {
                    writer.serialize(StatementRow {
                        date: tx.date,
                        description: tx.description,
                        currency: tx.currency.code(),
                        debit: Money::new(tx.debit_minor, tx.currency).amount(),
                        credit: Money::new(tx.credit_minor, tx.currency).amount(),
                        balance: Money::new(tx.balance_minor, tx.currency).amount(),
                        id: tx.id,
                    })?;
                }
                writer.flush()?;
            } else {
                let default = ReportLayout::default();
                let layout = ReportLayout {
                    width: args.width.unwrap_or(default.width),
                    page_height: args.page_height.unwrap_or(default.page_height),
                };
                let report = engine.render_statement(kind, &filter, layout).await?;
                print!("{report}");
            }
        }
        Command::Recompute(args) => {
            let changed = engine.recompute_balances(args.ledger).await?;
            println!("rewrote {changed} stale balances");
        }
        Command::Company(args) => {
            let profile = engine
                .upsert_company_profile(CompanyProfile {
                    name: args.name,
                    phone: args.phone,
                    email: args.email,
                    address: args.address,
                })
                .await?;
            println!("saved company profile: {}", profile.name);
        }
    }

    Ok(())
}

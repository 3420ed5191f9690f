//! Initial schema migration.
//!
//! - `ledger_transactions`: customer and supplier ledger rows, told apart by
//!   the `ledger` column
//! - `company_profiles`: the single company profile printed on reports

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum LedgerTransactions {
    Table,
    Id,
    Ledger,
    AccountName,
    Description,
    Date,
    Currency,
    DebitMinor,
    CreditMinor,
    BalanceMinor,
    CreatedAt,
}

#[derive(Iden)]
enum CompanyProfiles {
    Table,
    Id,
    Name,
    Phone,
    Email,
    Address,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Ledger transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::Ledger).string().not_null())
                    .col(
                        ColumnDef::new(LedgerTransactions::AccountName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::Date).date().not_null())
                    .col(
                        ColumnDef::new(LedgerTransactions::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::DebitMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::CreditMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_transactions-ledger-account_name")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::Ledger)
                    .col(LedgerTransactions::AccountName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_transactions-ledger-created_at")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::Ledger)
                    .col(LedgerTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Company profile
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CompanyProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompanyProfiles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CompanyProfiles::Name).string().not_null())
                    .col(ColumnDef::new(CompanyProfiles::Phone).string())
                    .col(ColumnDef::new(CompanyProfiles::Email).string())
                    .col(ColumnDef::new(CompanyProfiles::Address).string())
                    .col(
                        ColumnDef::new(CompanyProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompanyProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerTransactions::Table).to_owned())
            .await?;
        Ok(())
    }
}

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CompanyProfile, Currency, DocumentKind, Engine, EngineError, ItemDocument, ItemLine,
    LedgerKind, ReportLayout, TransactionFilter, TransactionInput, converted_total,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn input(account: &str, on: NaiveDate, debit_minor: i64, credit_minor: i64) -> TransactionInput {
    TransactionInput {
        account_name: account.to_string(),
        description: "Goods".to_string(),
        date: on,
        currency: Currency::Usd,
        debit_minor,
        credit_minor,
    }
}

#[tokio::test]
async fn running_balance_follows_calendar_order() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    // Inserted out of calendar order on purpose.
    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 2), 30, 0), Some("a-2"))
        .await
        .unwrap();
    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 100), Some("a-1"))
        .await
        .unwrap();

    let history = engine.account_history(kind, "Acme").await.unwrap();
    let balances: Vec<i64> = history
        .transactions
        .iter()
        .map(|tx| tx.balance_minor)
        .collect();
    assert_eq!(balances, vec![100, 70]);
    assert_eq!(history.current_balance_minor, 70);

    // Stored balances agree with the derived ones.
    assert_eq!(engine.transaction(kind, "a-2").await.unwrap().balance_minor, 70);
}

#[tokio::test]
async fn same_date_ties_break_on_creation_time() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 50), Some("b-1"))
        .await
        .unwrap();
    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 20, 0), Some("b-2"))
        .await
        .unwrap();

    let history = engine.account_history(kind, "Acme").await.unwrap();
    let balances: Vec<i64> = history
        .transactions
        .iter()
        .map(|tx| tx.balance_minor)
        .collect();
    assert_eq!(balances, vec![50, 30]);
}

#[tokio::test]
async fn zero_amount_is_rejected_without_writing() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Supplier;

    let err = engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(engine.list_accounts(kind).await.unwrap().is_empty());
}

#[tokio::test]
async fn negative_amount_and_blank_account_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    let err = engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), -5, 0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_transaction(kind, input("   ", date(2024, 1, 1), 5, 0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn debit_and_credit_together_are_accepted() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine
        .create_transaction(
            LedgerKind::Customer,
            input("Acme", date(2024, 1, 1), 40, 100),
            None,
        )
        .await
        .unwrap();
    assert_eq!(tx.balance_minor, 60);
}

#[tokio::test]
async fn deleting_last_transaction_removes_account() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    let tx = engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 100), None)
        .await
        .unwrap();
    assert_eq!(engine.list_accounts(kind).await.unwrap().len(), 1);

    let removed = engine.delete_transaction(kind, &tx.id).await.unwrap();
    assert_eq!(removed.id, tx.id);
    assert!(engine.list_accounts(kind).await.unwrap().is_empty());

    let err = engine.transaction(kind, &tx.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound(tx.id));
}

#[tokio::test]
async fn delete_in_the_middle_rewrites_later_balances() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 100), Some("c-1"))
        .await
        .unwrap();
    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 2), 30, 0), Some("c-2"))
        .await
        .unwrap();
    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 3), 0, 10), Some("c-3"))
        .await
        .unwrap();
    assert_eq!(engine.transaction(kind, "c-3").await.unwrap().balance_minor, 80);

    engine.delete_transaction(kind, "c-1").await.unwrap();

    assert_eq!(engine.transaction(kind, "c-2").await.unwrap().balance_minor, -30);
    assert_eq!(engine.transaction(kind, "c-3").await.unwrap().balance_minor, -20);
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_creation_time() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Supplier;

    let created = engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 100), None)
        .await
        .unwrap();

    let mut changed = input("Acme", date(2024, 1, 4), 0, 250);
    changed.description = "Corrected invoice".to_string();
    changed.currency = Currency::Pkr;
    let updated = engine
        .update_transaction(kind, &created.id, changed)
        .await
        .unwrap();

    assert_eq!(updated.description, "Corrected invoice");
    assert_eq!(updated.date, date(2024, 1, 4));
    assert_eq!(updated.currency, Currency::Pkr);
    assert_eq!(updated.balance_minor, 250);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn update_moving_account_rebalances_both() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 100), Some("m-1"))
        .await
        .unwrap();
    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 2), 0, 50), Some("m-2"))
        .await
        .unwrap();
    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 3), 20, 0), Some("m-3"))
        .await
        .unwrap();

    let moved = engine
        .update_transaction(kind, "m-2", input("Beta", date(2024, 1, 2), 0, 50))
        .await
        .unwrap();
    assert_eq!(moved.account_name, "Beta");
    assert_eq!(moved.balance_minor, 50);
    assert_eq!(engine.transaction(kind, "m-3").await.unwrap().balance_minor, 80);

    let names: Vec<String> = engine
        .list_accounts(kind)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.name)
        .collect();
    assert_eq!(names, vec!["Acme".to_string(), "Beta".to_string()]);
}

#[tokio::test]
async fn update_and_delete_unknown_id_fail() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    let err = engine
        .update_transaction(kind, "missing", input("Acme", date(2024, 1, 1), 1, 0))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("missing".to_string()));

    let err = engine.delete_transaction(kind, "missing").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("missing".to_string()));
}

#[tokio::test]
async fn ledgers_do_not_see_each_other() {
    let (engine, _db) = engine_with_db().await;

    let tx = engine
        .create_transaction(
            LedgerKind::Customer,
            input("Acme", date(2024, 1, 1), 0, 100),
            None,
        )
        .await
        .unwrap();

    assert!(engine.list_accounts(LedgerKind::Supplier).await.unwrap().is_empty());
    let err = engine
        .delete_transaction(LedgerKind::Supplier, &tx.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn duplicate_client_id_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 100), Some("dup"))
        .await
        .unwrap();
    let err = engine
        .create_transaction(kind, input("Beta", date(2024, 1, 1), 0, 100), Some("dup"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("dup".to_string()));

    // The failed create left no trace.
    assert_eq!(engine.list_accounts(kind).await.unwrap().len(), 1);
}

#[tokio::test]
async fn accounts_keep_native_currency_and_convert_for_display() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 100), None)
        .await
        .unwrap();
    let mut beta = input("Beta", date(2024, 1, 1), 0, 100);
    beta.currency = Currency::Pkr;
    engine.create_transaction(kind, beta, None).await.unwrap();

    let rows = engine.list_accounts(kind).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].current_balance_minor, 100);
    assert_eq!(rows[0].currency, Currency::Usd);
    assert_eq!(rows[1].current_balance_minor, 100);
    assert_eq!(rows[1].currency, Currency::Pkr);

    let total = converted_total(&rows, Currency::Pkr);
    assert_eq!(total.amount_minor, 28_100);

    // Display conversion did not touch storage.
    let again = engine.list_accounts(kind).await.unwrap();
    assert_eq!(again, rows);
}

#[tokio::test]
async fn list_is_newest_first_and_filters_by_date() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    for (id, day) in [("l-1", 1), ("l-2", 10), ("l-3", 20)] {
        engine
            .create_transaction(kind, input("Acme", date(2024, 1, day), 0, 10), Some(id))
            .await
            .unwrap();
    }

    let all = engine
        .list_transactions(kind, &TransactionFilter::default())
        .await
        .unwrap();
    let ids: Vec<&str> = all.iter().map(|tx| tx.id.as_str()).collect();
    assert_eq!(ids, vec!["l-3", "l-2", "l-1"]);

    let filter = TransactionFilter {
        account: Some("Acme".to_string()),
        from: Some(date(2024, 1, 5)),
        to: Some(date(2024, 1, 20)),
    };
    let ranged = engine.list_transactions(kind, &filter).await.unwrap();
    assert_eq!(ranged.len(), 2);

    let inverted = TransactionFilter {
        account: None,
        from: Some(date(2024, 2, 1)),
        to: Some(date(2024, 1, 1)),
    };
    let err = engine.list_transactions(kind, &inverted).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidDate(_)));
}

#[tokio::test]
async fn open_account_seeds_a_zero_row_once() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Supplier;

    let seed = engine
        .open_account(kind, " Steel Co ", Currency::Sar, date(2024, 1, 1))
        .await
        .unwrap();
    assert_eq!(seed.account_name, "Steel Co");
    assert_eq!(seed.balance_minor, 0);
    assert!(seed.is_seed());

    let rows = engine.list_accounts(kind).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].currency, Currency::Sar);

    let err = engine
        .open_account(kind, "Steel Co", Currency::Sar, date(2024, 1, 2))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Steel Co".to_string()));
}

#[tokio::test]
async fn concurrent_opens_seed_the_account_once() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Supplier;

    let (first, second) = tokio::join!(
        engine.open_account(kind, "Steel Co", Currency::Usd, date(2024, 1, 1)),
        engine.open_account(kind, "Steel Co", Currency::Usd, date(2024, 1, 1)),
    );
    assert_eq!(
        [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
        1
    );
    let history = engine.account_history(kind, "Steel Co").await.unwrap();
    assert_eq!(history.transactions.len(), 1);
}

#[tokio::test]
async fn overflowing_balance_is_rejected_and_rolled_back() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;
    let large = i64::MAX / 2 + 1;

    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, large), Some("big-1"))
        .await
        .unwrap();
    let err = engine
        .create_transaction(kind, input("Acme", date(2024, 1, 2), 0, large), Some("big-2"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(err.is_validation());

    // Nothing of the failed insert is left behind.
    assert!(matches!(
        engine.transaction(kind, "big-2").await,
        Err(EngineError::KeyNotFound(_))
    ));
    let history = engine.account_history(kind, "Acme").await.unwrap();
    assert_eq!(history.current_balance_minor, large);

    // An update that would overflow is refused the same way.
    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 2), 0, 1), Some("small"))
        .await
        .unwrap();
    let err = engine
        .update_transaction(kind, "small", input("Acme", date(2024, 1, 2), 0, large))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert_eq!(engine.transaction(kind, "small").await.unwrap().credit_minor, 1);
}

#[tokio::test]
async fn recompute_repairs_stale_rows() {
    let (engine, db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 100), Some("r-1"))
        .await
        .unwrap();
    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 2), 30, 0), Some("r-2"))
        .await
        .unwrap();
    assert_eq!(engine.recompute_balances(kind).await.unwrap(), 0);

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE ledger_transactions SET balance_minor = ? WHERE id = ?",
        vec![999_i64.into(), "r-2".into()],
    ))
    .await
    .unwrap();
    assert_eq!(engine.transaction(kind, "r-2").await.unwrap().balance_minor, 999);

    // Reads never trust the stored value.
    let history = engine.account_history(kind, "Acme").await.unwrap();
    assert_eq!(history.current_balance_minor, 70);

    assert_eq!(engine.recompute_balances(kind).await.unwrap(), 1);
    assert_eq!(engine.transaction(kind, "r-2").await.unwrap().balance_minor, 70);
}

#[tokio::test]
async fn statement_carries_opening_balance() {
    let (engine, _db) = engine_with_db().await;
    let kind = LedgerKind::Customer;

    engine
        .create_transaction(kind, input("Acme", date(2024, 1, 1), 0, 100), None)
        .await
        .unwrap();
    engine
        .create_transaction(kind, input("Acme", date(2024, 2, 1), 30, 0), None)
        .await
        .unwrap();

    let filter = TransactionFilter {
        account: Some("Acme".to_string()),
        from: Some(date(2024, 2, 1)),
        to: None,
    };
    let statement = engine.statement(kind, &filter).await.unwrap();
    assert_eq!(statement.opening_balance_minor, 100);
    assert_eq!(statement.transactions.len(), 1);
    assert_eq!(statement.final_balance_minor(), 70);

    let report = engine
        .render_statement(kind, &filter, ReportLayout::default())
        .await
        .unwrap();
    assert_eq!(report.page_count(), 1);
    assert!(report.to_string().contains("Account: Acme"));

    let unknown = TransactionFilter::for_account("Nobody");
    let err = engine.statement(kind, &unknown).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("Nobody".to_string()));
}

#[tokio::test]
async fn company_profile_create_is_unique_and_upsert_replaces() {
    let (engine, _db) = engine_with_db().await;
    assert_eq!(engine.company_profile().await.unwrap(), None);

    let profile = CompanyProfile {
        name: "Ledger Traders".to_string(),
        phone: Some("+92 300 0000000".to_string()),
        email: None,
        address: Some("12 Mall Road\nLahore".to_string()),
    };
    engine
        .create_company_profile(profile.clone())
        .await
        .unwrap();
    let err = engine
        .create_company_profile(profile.clone())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("company profile".to_string()));

    let replaced = engine
        .upsert_company_profile(CompanyProfile {
            name: "Ledger Traders Ltd".to_string(),
            ..profile
        })
        .await
        .unwrap();
    assert_eq!(
        engine.company_profile().await.unwrap(),
        Some(replaced.clone())
    );

    let report = engine
        .render_document(
            ItemDocument {
                kind: DocumentKind::Invoice,
                number: "INV-1".to_string(),
                date: date(2024, 3, 1),
                party: "Acme".to_string(),
                currency: Currency::Pkr,
                lines: vec![ItemLine {
                    description: "Bolts".to_string(),
                    quantity: 2,
                    unit_price_minor: 1_000,
                    vat_rate_bp: 1_700,
                }],
            },
            ReportLayout::default(),
        )
        .await
        .unwrap();
    assert!(report.to_string().contains("Ledger Traders Ltd"));
}

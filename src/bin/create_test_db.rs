use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use ledgerline::{
    AccountType, ExternalId, NewAccount, RawAmount, RecurringInterval, Transaction,
    TransactionType, TracingEventSink, create_account, create_transaction, initialize_db,
    provision_user, set_budget,
};

/// A utility for creating a test database for the JSON API server of ledgerline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The external ID of the demo user, i.e. the value of the identity header.
    #[arg(long, default_value = "demo")]
    user: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating user {:?}...", args.user);
    let user = provision_user(&ExternalId::new(args.user), &conn)?;

    println!("Creating accounts...");
    let everyday = create_account(
        user.id,
        &NewAccount {
            name: "Everyday".to_owned(),
            account_type: AccountType::Current,
            balance: RawAmount::from("2500.00"),
            is_default: true,
        },
        &mut conn,
    )?;
    create_account(
        user.id,
        &NewAccount {
            name: "Rainy Day".to_owned(),
            account_type: AccountType::Savings,
            balance: RawAmount::from("10000.00"),
            is_default: false,
        },
        &mut conn,
    )?;

    println!("Creating transactions...");
    let event_sink = TracingEventSink::default();
    let today = OffsetDateTime::now_utc().date();
    let transactions = [
        Transaction::build(everyday.id, TransactionType::Income, "4200", today - Duration::days(28))
            .description("Pay day")
            .category("salary")
            .recurring(RecurringInterval::Monthly),
        Transaction::build(everyday.id, TransactionType::Expense, "1650", today - Duration::days(27))
            .description("Rent")
            .category("housing")
            .recurring(RecurringInterval::Monthly),
        Transaction::build(everyday.id, TransactionType::Expense, "182.45", today - Duration::days(20))
            .description("Weekly shop")
            .category("groceries"),
        Transaction::build(everyday.id, TransactionType::Expense, "64.99", today - Duration::days(12))
            .description("Power bill")
            .category("utilities"),
        Transaction::build(everyday.id, TransactionType::Expense, "23.50", today - Duration::days(3))
            .description("Lunch")
            .category("food"),
        Transaction::build(everyday.id, TransactionType::Income, "300", today - Duration::days(90))
            .description("Website for a friend")
            .category("freelance"),
    ];

    for transaction in &transactions {
        create_transaction(user.id, transaction, &mut conn, &event_sink)?;
    }

    println!("Setting budget...");
    set_budget(user.id, &RawAmount::from("2000"), &mut conn)?;

    println!("Success!");

    Ok(())
}

use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, macros::datetime};

use cashflow_ledger::{
    Amount, NewCashFlow, TaxonomyName, create_cash_flow, create_category, create_flow_type,
    create_status, create_subcategory, initialize_db,
};

/// A utility for creating a test database for the cash-flow ledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The number of cash flows to create.
    #[arg(long, short, default_value_t = 40)]
    num_records: u32,
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
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating dictionaries...");

    let paid = create_status(TaxonomyName::new("Paid")?, &conn)?;
    let pending = create_status(TaxonomyName::new("Pending")?, &conn)?;

    let expense = create_flow_type(TaxonomyName::new("Expense")?, &conn)?;
    let income = create_flow_type(TaxonomyName::new("Income")?, &conn)?;

    let food = create_category(TaxonomyName::new("Food")?, expense.id, &conn)?;
    let transport = create_category(TaxonomyName::new("Transport")?, expense.id, &conn)?;
    let salary = create_category(TaxonomyName::new("Salary")?, income.id, &conn)?;

    let groceries = create_subcategory(TaxonomyName::new("Groceries")?, food.id, &conn)?;
    let restaurants = create_subcategory(TaxonomyName::new("Restaurants")?, food.id, &conn)?;
    let fuel = create_subcategory(TaxonomyName::new("Fuel")?, transport.id, &conn)?;
    let monthly = create_subcategory(TaxonomyName::new("Monthly")?, salary.id, &conn)?;

    // (type, category, subcategory) triples that satisfy the hierarchy.
    let classifications = [
        (expense.id, food.id, groceries.id),
        (expense.id, food.id, restaurants.id),
        (expense.id, transport.id, fuel.id),
        (income.id, salary.id, monthly.id),
    ];

    println!("Creating {} records...", args.num_records);

    let start = datetime!(2024-01-01 09:00:00);

    for i in 0..args.num_records {
        let (type_id, category_id, subcategory_id) =
            classifications[i as usize % classifications.len()];
        let status_id = if i % 5 == 0 { pending.id } else { paid.id };

        create_cash_flow(
            &NewCashFlow {
                created_at: start + Duration::hours(i64::from(i) * 29),
                status_id,
                type_id,
                category_id,
                subcategory_id,
                amount: Amount::from_cents(i64::from(i) * 1_237 % 25_000 + 150),
                comment: (i % 3 == 0).then(|| format!("Test record #{i}")),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}

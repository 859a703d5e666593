//! Invoicing System - Reporting Queries
//!
//! Builds the queries behind a small invoicing dashboard: overdue invoices,
//! revenue per client, unpaid balances and bulk status changes.
//!
//! Run with: cargo run --example invoicing

use chrono::{DateTime, Utc};
use quarry_core::builder::{count_all, exists, Delete, Insert, Order, Select, Update};
use quarry_core::dialect::PostgresDialect;
use quarry_core::{CompiledQuery, Compiler, TableSchema};
use quarry_derive::Table;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

// =============================================================================
// SCHEMA DEFINITIONS
// =============================================================================

/// Client - customers who receive invoices.
#[allow(dead_code)]
#[derive(Debug, Clone, Table)]
#[table(name = "clients")]
pub struct Client {
    #[column(optional)]
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub preferred_currency: String,
}

/// Invoice - the main billing document.
#[allow(dead_code)]
#[derive(Debug, Clone, Table)]
#[table(name = "invoices")]
pub struct Invoice {
    #[column(optional)]
    pub id: i64,
    pub company_id: i64,
    pub client_id: i64,
    pub invoice_number: String,
    pub status: String,
    pub total_cents: i64,
    pub due_date: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    #[column(sql_type = "json")]
    pub metadata: Option<String>,
}

/// Payment - records of payments received.
#[allow(dead_code)]
#[derive(Debug, Clone, Table)]
#[table(name = "payments")]
pub struct Payment {
    #[column(optional)]
    pub id: i64,
    pub invoice_id: i64,
    pub amount_cents: i64,
    pub paid_at: DateTime<Utc>,
}

fn print_sql(description: &str, compiled: &CompiledQuery) {
    println!("-- {description}");
    println!("{};", compiled.sql);
    for (i, value) in compiled.parameters.iter().enumerate() {
        println!("--   ${} = {value}", i + 1);
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let compiler = Compiler::new(&PostgresDialect);
    let clients = Client::table();
    let invoices = Invoice::table();
    let payments = Payment::table();
    let company_id = 1_i64;
    let today = Utc::now();

    // 1. Overdue invoices with the client name.
    let overdue = Select::from(&invoices)
        .inner_join(&clients, clients.col("id")?.eq(invoices.col("client_id")?))?
        .select(invoices.col("invoice_number")?.as_("invoice_number"))?
        .select(clients.col("name")?.as_("client"))?
        .select(invoices.col("total_cents")?.as_("total_cents"))?
        .where_clause(invoices.col("company_id")?.eq(company_id))?
        .where_clause(invoices.col("status")?.eq("sent"))?
        .where_clause(invoices.col("due_date")?.lt(today))?
        .order_by(invoices.col("due_date")?, Order::Asc);
    print_sql("Overdue invoices", &compiler.compile(&overdue)?);

    // 2. Revenue per client, largest first.
    let revenue = Select::from(&clients)
        .left_join(&invoices, invoices.col("client_id")?.eq(clients.col("id")?))?
        .select(clients.col("name")?.as_("client"))?
        .select(invoices.col("total_cents")?.sum().coalesce(0).as_("revenue"))?
        .select(count_all().as_("invoice_count"))?
        .group_by(clients.col("name")?)
        .order_by_selected(|selected| Ok(vec![(selected.get("revenue")?, Order::Desc)]))?
        .limit(10);
    print_sql("Top clients by revenue", &compiler.compile(&revenue)?);

    // 3. Unpaid balance per invoice through a derived table of payment sums.
    let paid = Select::from(&payments)
        .select(payments.col("invoice_id")?.as_("invoice_id"))?
        .select(payments.col("amount_cents")?.sum().as_("paid_cents"))?
        .group_by(payments.col("invoice_id")?)
        .alias("paid");
    let balance = Select::from(&invoices)
        .left_join(&paid, paid.col("invoice_id")?.eq(invoices.col("id")?))?
        .select(invoices.col("invoice_number")?.as_("invoice_number"))?
        .select(
            invoices
                .col("total_cents")?
                .sub(paid.col("paid_cents")?.coalesce(0))
                .as_("balance_cents"),
        )?
        .where_clause(invoices.col("status")?.not_in(["draft", "void"]))?;
    print_sql("Unpaid balances", &compiler.compile(&balance)?);

    // 4. Clients without any invoice.
    let idle = Select::from(&clients)
        .columns(&["name", "email"])?
        .where_not(exists(
            Select::from(&invoices)
                .select(invoices.col("id")?.as_("id"))?
                .where_clause(invoices.col("client_id")?.eq(clients.col("id")?))?,
        ))?;
    print_sql("Clients without invoices", &compiler.compile(&idle)?);

    // 5. Writes.
    let insert = Insert::into(&invoices)
        .values([
            ("company_id", quarry_core::val(company_id)),
            ("client_id", quarry_core::val(42_i64)),
            ("invoice_number", quarry_core::val("INV-0042")),
            ("status", quarry_core::val("draft")),
            ("total_cents", quarry_core::val(125_000_i64)),
            ("due_date", quarry_core::val(today)),
        ])?
        .returning_columns(&["id"])?;
    print_sql("Create an invoice", &compiler.compile(&insert)?);

    let mark_paid = Update::table(&invoices)
        .set("status", "paid")?
        .set("paid_at", today)?
        .where_eq([("invoice_number", "INV-0042")])?;
    print_sql("Mark an invoice paid", &compiler.compile(&mark_paid)?);

    let purge = Delete::from(&invoices)
        .where_eq([("status", "void")])?
        .where_clause(invoices.col("company_id")?.eq(company_id))?;
    print_sql("Purge void invoices", &compiler.compile(&purge)?);

    Ok(())
}

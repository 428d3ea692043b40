use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};

use dairy_ledger::config::{config_dir, load_config, resolve_path, CONFIG_TEMPLATE};
use dairy_ledger::error::{DairyError, Result};
use dairy_ledger::invoice::money;
use dairy_ledger::model::{NewCustomer, NewEntry, NewPayment};
use dairy_ledger::payload::{load_entry_payload, parse_extra_arg, parse_milk_arg};
use dairy_ledger::pdf::render_invoice;
use dairy_ledger::{logging, notify, Billing, Config, FileStore, Month, RecordStore};

#[derive(Parser)]
#[command(name = "dairy")]
#[command(version, about = "Dairy delivery ledger and monthly invoicing", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.dairy or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config
    Init,

    /// Register a new customer
    AddCustomer {
        /// Customer display name
        #[arg(short, long)]
        name: String,

        /// Contact phone number (must be unique)
        #[arg(short, long)]
        phone: String,

        /// Balance carried over from before this ledger
        #[arg(long, value_name = "AMOUNT")]
        opening_due: Option<String>,
    },

    /// List customers, optionally filtered by name or phone
    Customers {
        /// Case-insensitive text to match against name or phone
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Record a delivery for a customer
    Entry {
        /// Customer id or phone number
        customer: String,

        /// Milk line as TYPE:QTY@RATE (e.g., cow:10@50; can be repeated)
        #[arg(short, long, value_name = "TYPE:QTY@RATE")]
        milk: Vec<String>,

        /// Extra item as NAME:QTY@RATE (e.g., paneer:1@30; can be repeated)
        #[arg(short, long, value_name = "NAME:QTY@RATE")]
        extra: Vec<String>,

        /// Delivery date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Read the delivery from a JSON payload instead
        #[arg(long, conflicts_with_all = ["milk", "extra", "date"])]
        file: Option<PathBuf>,
    },

    /// Record a payment from a customer
    Pay {
        /// Customer id or phone number
        customer: String,

        /// Payment amount
        amount: String,

        /// Payment date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Payment method (cash, upi, ...)
        #[arg(long)]
        method: Option<String>,

        /// Payment reference
        #[arg(long = "ref", value_name = "REF")]
        reference: Option<String>,
    },

    /// Show a customer's entries, payments and totals for a month
    Summary {
        /// Customer id or phone number
        customer: String,

        /// Month as YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Build a customer's monthly invoice
    Invoice {
        /// Customer id or phone number
        customer: String,

        /// Month as YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Custom output file path (default: output_dir/INV-<phone>-<month>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the invoice document as JSON instead of rendering a PDF
        #[arg(long, conflicts_with_all = ["output", "open"])]
        json: bool,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Export monthly bill reminders for every customer as CSV
    Remind {
        /// Month as YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Write CSV to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show ledger status
    Status,
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::AddCustomer {
            name,
            phone,
            opening_due,
        } => cmd_add_customer(&cfg_dir, name, phone, opening_due),
        Commands::Customers { search } => cmd_customers(&cfg_dir, search),
        Commands::Entry {
            customer,
            milk,
            extra,
            date,
            file,
        } => cmd_entry(&cfg_dir, &customer, &milk, &extra, date, file),
        Commands::Pay {
            customer,
            amount,
            date,
            method,
            reference,
        } => cmd_pay(&cfg_dir, &customer, &amount, date, method, reference),
        Commands::Summary { customer, month } => cmd_summary(&cfg_dir, &customer, month),
        Commands::Invoice {
            customer,
            month,
            output,
            json,
            open,
        } => cmd_invoice(&cfg_dir, &customer, month, output, json, open),
        Commands::Remind { month, output } => cmd_remind(&cfg_dir, month, output),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Load config and open the records file it points at
fn open_billing(cfg_dir: &Path) -> Result<(Config, Billing<FileStore>)> {
    let config = load_config(cfg_dir)?;
    let store = FileStore::open(resolve_path(&config.store.path, cfg_dir))?;
    let billing = Billing::from_config(store, &config);
    Ok((config, billing))
}

fn parse_month(month: Option<String>) -> Result<Month> {
    match month {
        Some(m) => m.parse(),
        None => Ok(Month::current()),
    }
}

fn parse_date(date: Option<String>) -> Result<Option<NaiveDate>> {
    date.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| DairyError::InvalidDate(s.clone()))
    })
    .transpose()
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| DairyError::InvalidAmount {
        value: raw.to_string(),
        reason: "must be a number".to_string(),
    })
}

fn fmt_money(symbol: &str, value: Decimal) -> String {
    format!("{}{}", symbol, money(value))
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(DairyError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized dairy ledger at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your dairy details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Register a customer:      dairy add-customer --name <name> --phone <phone>");
    println!("  3. Record deliveries:        dairy entry <phone> --milk cow:2@50");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "DUE")]
    due: String,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "MILK")]
    milk: String,
    #[tabled(rename = "EXTRAS")]
    extras: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "REF")]
    reference: String,
}

#[derive(Tabled)]
struct InvoiceLine {
    #[tabled(rename = "S.NO")]
    sno: usize,
    #[tabled(rename = "ITEM")]
    item: String,
    #[tabled(rename = "QTY")]
    qty: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

/// Register a new customer
fn cmd_add_customer(
    cfg_dir: &Path,
    name: String,
    phone: String,
    opening_due: Option<String>,
) -> Result<()> {
    let (config, billing) = open_billing(cfg_dir)?;
    let opening_due = opening_due.as_deref().map(parse_decimal).transpose()?;

    let customer = billing.register_customer(NewCustomer {
        name,
        phone,
        opening_due,
    })?;

    println!("Registered {}", customer.name);
    println!("  ID:    {}", customer.id);
    println!("  Phone: {}", customer.phone);
    println!(
        "  Due:   {}",
        fmt_money(&config.invoice.currency_symbol, customer.due)
    );

    Ok(())
}

/// List customers
fn cmd_customers(cfg_dir: &Path, search: Option<String>) -> Result<()> {
    let (config, billing) = open_billing(cfg_dir)?;
    let customers = billing.search_customers(search.as_deref().unwrap_or(""))?;

    if customers.is_empty() {
        println!("No customers found.");
        return Ok(());
    }

    let rows: Vec<CustomerRow> = customers
        .iter()
        .map(|c| CustomerRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            phone: c.phone.clone(),
            due: fmt_money(&config.invoice.currency_symbol, c.due),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Record a delivery
fn cmd_entry(
    cfg_dir: &Path,
    customer_ref: &str,
    milk: &[String],
    extras: &[String],
    date: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let (config, billing) = open_billing(cfg_dir)?;
    let customer = billing.resolve_customer(customer_ref)?;

    let new_entry = match file {
        Some(path) => load_entry_payload(&path)?,
        None => NewEntry {
            date: parse_date(date)?.unwrap_or_else(|| chrono::Local::now().date_naive()),
            milk: milk
                .iter()
                .map(|m| parse_milk_arg(m))
                .collect::<Result<Vec<_>>>()?,
            extras: extras
                .iter()
                .map(|x| parse_extra_arg(x))
                .collect::<Result<Vec<_>>>()?,
        },
    };

    let recorded = billing.record_entry(customer.id, new_entry)?;
    let symbol = &config.invoice.currency_symbol;

    println!(
        "Recorded {} entry for {} on {}",
        fmt_money(symbol, recorded.entry.total),
        customer.name,
        recorded.entry.date
    );
    println!("  Due: {}", fmt_money(symbol, recorded.due));

    Ok(())
}

/// Record a payment
fn cmd_pay(
    cfg_dir: &Path,
    customer_ref: &str,
    amount: &str,
    date: Option<String>,
    method: Option<String>,
    reference: Option<String>,
) -> Result<()> {
    let amount = parse_decimal(amount)?;
    let (config, billing) = open_billing(cfg_dir)?;
    let customer = billing.resolve_customer(customer_ref)?;

    let recorded = billing.record_payment(
        customer.id,
        NewPayment {
            amount,
            date: parse_date(date)?,
            method,
            reference,
        },
    )?;
    let symbol = &config.invoice.currency_symbol;

    println!(
        "Recorded {} payment from {} on {}",
        fmt_money(symbol, recorded.payment.amount),
        customer.name,
        recorded.payment.date
    );
    println!("  Due: {}", fmt_money(symbol, recorded.due));

    Ok(())
}

/// Show a month's records and totals for one customer
fn cmd_summary(cfg_dir: &Path, customer_ref: &str, month: Option<String>) -> Result<()> {
    let month = parse_month(month)?;
    let (config, billing) = open_billing(cfg_dir)?;
    let customer = billing.resolve_customer(customer_ref)?;
    let statement = billing.month_statement(customer.id, Some(month))?;
    let symbol = &config.invoice.currency_symbol;

    println!("{} - {}", customer.name, statement.month);
    println!("{}", "-".repeat(50));

    if statement.entries.is_empty() {
        println!("No entries recorded.");
    } else {
        let rows: Vec<EntryRow> = statement
            .entries
            .iter()
            .map(|e| EntryRow {
                date: e.date.to_string(),
                milk: e
                    .milk
                    .iter()
                    .map(|m| format!("{} {}L@{}", m.milk_type, m.quantity(), m.rate()))
                    .collect::<Vec<_>>()
                    .join(", "),
                extras: e
                    .extras
                    .iter()
                    .map(|x| format!("{} {}", x.name, x.charge()))
                    .collect::<Vec<_>>()
                    .join(", "),
                total: fmt_money(symbol, e.total),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    if statement.payments.is_empty() {
        println!("No payments recorded.");
    } else {
        let rows: Vec<PaymentRow> = statement
            .payments
            .iter()
            .map(|p| PaymentRow {
                date: p.date.to_string(),
                amount: fmt_money(symbol, p.amount),
                method: p.method.clone().unwrap_or_default(),
                reference: p.reference.clone().unwrap_or_default(),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    println!("Charges:  {}", fmt_money(symbol, statement.total_charges));
    println!("Paid:     {}", fmt_money(symbol, statement.total_paid));
    println!("Due:      {}", fmt_money(symbol, statement.period_due));
    println!("Lifetime: {}", fmt_money(symbol, customer.due));

    Ok(())
}

/// Build and render a monthly invoice
fn cmd_invoice(
    cfg_dir: &Path,
    customer_ref: &str,
    month: Option<String>,
    output: Option<PathBuf>,
    json: bool,
    open: bool,
) -> Result<()> {
    let month = parse_month(month)?;
    let (config, billing) = open_billing(cfg_dir)?;
    let customer = billing.resolve_customer(customer_ref)?;
    let doc = billing.monthly_invoice(customer.id, month)?;

    if json {
        let rendered = serde_json::to_string_pretty(&doc)
            .map_err(|e| DairyError::PdfGeneration(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    let pdf_path = match output {
        Some(path) => path,
        None => {
            let output_dir = resolve_path(&config.pdf.output_dir, cfg_dir);
            std::fs::create_dir_all(&output_dir)?;
            output_dir.join(format!("INV-{}-{}.pdf", customer.phone, month))
        }
    };

    render_invoice(&doc, &pdf_path)?;

    let rows: Vec<InvoiceLine> = doc
        .rows
        .iter()
        .map(|r| InvoiceLine {
            sno: r.sno,
            item: match &r.remarks {
                Some(remarks) => format!("{} ({})", r.item, remarks),
                None => r.item.clone(),
            },
            qty: r.qty.clone(),
            rate: r.rate.clone(),
            amount: r.amount.clone(),
        })
        .collect();

    println!("Generated invoice for {} ({})", customer.name, month);
    if !rows.is_empty() {
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
    println!("  Total:    {}{}", doc.currency_symbol, doc.summary.total);
    println!("  Received: {}{}", doc.currency_symbol, doc.summary.received);
    println!("  Balance:  {}{}", doc.currency_symbol, doc.summary.balance);
    println!("  In words: {}", doc.summary.total_in_words);
    println!("  Saved:    {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", pdf_path.to_str().unwrap_or("")])
            .spawn()?;
    }
    Ok(())
}

/// Export reminders as CSV
fn cmd_remind(cfg_dir: &Path, month: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let month = parse_month(month)?;
    let (_, billing) = open_billing(cfg_dir)?;
    let reminders = billing.reminders(month)?;

    match output {
        Some(path) => {
            notify::write_csv(&reminders, std::fs::File::create(&path)?)?;
            println!(
                "Wrote {} reminder(s) for {} to {}",
                reminders.len(),
                month,
                path.display()
            );
        }
        None => notify::write_csv(&reminders, std::io::stdout().lock())?,
    }

    Ok(())
}

/// Show ledger status
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let (config, billing) = open_billing(cfg_dir)?;
    let customers = billing.store().customers()?;
    let outstanding: Decimal = customers.iter().map(|c| c.due).sum();
    let symbol = &config.invoice.currency_symbol;

    println!("Dairy Ledger Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Records file:     {}", billing.store().path().display());
    println!("Dairy:            {}", config.dairy.name);
    println!("Customers:        {}", customers.len());
    println!("Outstanding:      {}", fmt_money(symbol, outstanding));

    let mut owing: Vec<_> = customers.iter().filter(|c| c.due > Decimal::ZERO).collect();
    owing.sort_by(|a, b| b.due.cmp(&a.due));
    if !owing.is_empty() {
        println!();
        println!("Largest balances:");
        for c in owing.iter().take(5) {
            println!("  {} - {} - {}", c.name, c.phone, fmt_money(symbol, c.due));
        }
    }

    Ok(())
}

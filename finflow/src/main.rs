use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use finflow::{
    import::{ImportRequest, ImportSummary, Importer},
    logging,
    remote::HttpRemote,
    settings::Settings,
    Store,
};
use finflow_api::{
    endpoints::{
        csv::{export_url, ColumnMapping, ExportParams, DEFAULT_DATE_FORMAT},
        transactions::TransactionFilters,
        TransactionType,
    },
    Client,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "finflow", version, about = "Personal finance sync client")]
struct Cli {
    /// Config file (defaults to $FINFLOW_CONFIG or finflow.toml)
    #[arg(long)]
    config: Option<String>,

    /// API base URL, overrides the config file
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load every collection and print totals for a date range
    Summary {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Import transactions from a CSV file and wait for the result
    Import {
        file: PathBuf,
        #[arg(long, default_value = "amount")]
        amount: String,
        #[arg(long, default_value = "category")]
        category: String,
        #[arg(long, default_value = "date")]
        date: String,
        #[arg(long = "type", default_value = "type")]
        kind: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
        date_format: String,
    },
    /// Print the CSV export URL
    ExportUrl {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        category_id: Option<String>,
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
        #[arg(long)]
        date_format: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match cli.config {
        Some(ref path) => Settings::load(path)?,
        None => Settings::new()?,
    };
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    settings.validate()?;

    let (log_path, _guard) = logging::init_logging(settings.log_dir.as_deref())?;
    tracing::info!("Logging to {}", log_path.display());

    let client = Arc::new(Client::new(&settings.base_url));
    let remote = Arc::new(HttpRemote::new(client));

    match cli.command {
        Command::Summary { from, to } => summary(remote, from, to).await,
        Command::Import {
            file,
            amount,
            category,
            date,
            kind,
            description,
            currency,
            date_format,
        } => {
            let csv_text = std::fs::read_to_string(&file)
                .with_context(|| format!("Could not read {}", file.display()))?;
            let mapping = ColumnMapping {
                amount,
                currency,
                category_name: category,
                description,
                transaction_date: date,
                kind,
            };
            let request = ImportRequest::new(csv_text, mapping).date_format(date_format);
            import(remote, &settings, request).await
        }
        Command::ExportUrl {
            from,
            to,
            category_id,
            columns,
            date_format,
        } => {
            let params = ExportParams {
                start_date: from,
                end_date: to,
                category_id,
                columns,
                date_format,
            };
            println!("{}", export_url(&settings.base_url, &params)?);
            Ok(())
        }
    }
}

async fn summary(
    remote: Arc<HttpRemote>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let store = Store::new(remote);

    let filters = TransactionFilters {
        page_size: Some(100),
        start_date: from,
        end_date: to,
        ..TransactionFilters::default()
    };
    let (transactions, categories, budgets, recurring, totals, top) = tokio::join!(
        store.load_transactions(filters),
        store.load_categories(None),
        store.load_budgets(),
        store.load_recurring_transactions(),
        store.load_summary(from, to),
        store.load_top_categories(None, Some(TransactionType::Expense), from, to),
    );
    transactions?;
    categories?;
    budgets?;
    recurring?;
    totals?;
    top?;

    println!("Transactions: {}", store.transactions().len());
    println!("Categories:   {}", store.categories().len());
    println!("Budgets:      {}", store.budgets().len());
    println!("Recurring:    {}", store.recurring_transactions().len());
    if let Some(summary) = store.summary() {
        let currency = summary.display_currency.unwrap_or_default();
        println!();
        println!("Income:  {} {}", summary.total_income, currency);
        println!("Expense: {} {}", summary.total_expense, currency);
        println!("Balance: {} {}", summary.balance, currency);
    }
    let top = store.top_categories();
    if !top.is_empty() {
        println!();
        println!("Top spending:");
        for category in top {
            println!(
                "  {:<20} {:>12} ({}%)",
                category.category_name,
                category.total_amount,
                category.percentage.round_dp(1)
            );
        }
    }
    Ok(())
}

async fn import(remote: Arc<HttpRemote>, settings: &Settings, request: ImportRequest) -> Result<()> {
    let importer = Importer::new(remote, settings.poller_config());

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    match importer.import_and_wait(&request, &cancel).await {
        Some(summary) => print_import(&summary),
        None => println!("Import is still running on the server; check back later."),
    }
    Ok(())
}

fn print_import(summary: &ImportSummary) {
    if summary.is_failed() {
        println!("Import failed");
    } else {
        println!(
            "Done: {} created, {} errors",
            summary.created_count, summary.error_count
        );
    }
    let (shown, hidden) = summary.preview_errors(10);
    for error in shown {
        println!("  Row {}: {}", error.row, error.message);
    }
    if hidden > 0 {
        println!("  ... and {} more errors", hidden);
    }
}

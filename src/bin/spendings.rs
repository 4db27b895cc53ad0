use std::{error::Error, fs, path::PathBuf, process::exit};

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use spendings_rs::{
    BulkEditOutcome, ChartPalette, LoadOutcome, SpendingId, SpendingRecord, SpendingsController,
    SqliteSpendingsApi, YearMonth, dashboard_charts, format_currency, format_day_label,
    setup_logging, share_label,
};

/// Review a month of spendings and move them between categories.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: PathBuf,

    /// The month to show as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<YearMonth>,

    /// Log debug output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show totals by category and by day.
    Summary,
    /// List the month's spendings, newest first.
    List,
    /// Move spendings to another category.
    Recategorize {
        /// The category to move the spendings to.
        #[arg(long)]
        category: String,
        /// Move every spending in the month.
        #[arg(long, conflicts_with = "ids")]
        all: bool,
        /// The IDs of the spendings to move.
        ids: Vec<String>,
    },
    /// List the categories.
    Categories,
    /// Create a category.
    AddCategory { name: String },
    /// Delete a category, moving its spendings to "Other".
    DeleteCategory { name: String },
    /// Import spendings from a JSON array of spending records.
    Import { file: PathBuf },
    /// Write the dashboard charts as ECharts options.
    Chart {
        /// File path to write the chart options to.
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let connection = Connection::open(&args.db_path)?;
    let api = SqliteSpendingsApi::new(connection)?;

    let command = match args.command {
        Command::Import { file } => {
            let records: Vec<SpendingRecord> = serde_json::from_str(&fs::read_to_string(file)?)?;
            let summary = api.import_records(records)?;
            println!(
                "Imported {} spendings, skipped {}.",
                summary.imported, summary.skipped
            );
            return Ok(());
        }
        command => command,
    };

    let month = args.month.unwrap_or_else(YearMonth::current);
    let controller = SpendingsController::new(api, month);

    if controller.load_month(month).await == LoadOutcome::Failed {
        if let Some(notice) = controller.state().notice() {
            eprintln!("{}", notice.message());
        }
        exit(1);
    }

    match command {
        Command::Summary => print_summary(&controller, month),
        Command::List => print_spendings(&controller),
        Command::Recategorize { category, all, ids } => {
            let outcome = if all {
                controller.select_all();
                controller.set_pending_category(Some(category.parse()?));
                controller.submit_bulk_edit().await
            } else {
                controller
                    .recategorize(ids.into_iter().map(SpendingId::new), &category)
                    .await
            };

            match outcome {
                BulkEditOutcome::Skipped => println!("Nothing to move."),
                BulkEditOutcome::Committed => println!("Moved spendings to \"{category}\"."),
                BulkEditOutcome::Reverted(error) => {
                    if let Some(notice) = controller.state().notice() {
                        eprintln!("{}", notice.message());
                    }
                    return Err(error.into());
                }
            }
        }
        Command::Categories => {
            for category in controller.state().categories() {
                println!("{:>4}  {}", category.id, category.name);
            }
        }
        Command::AddCategory { name } => {
            let category = controller.create_category(&name).await?;
            println!("Created category \"{}\".", category.name);
        }
        Command::DeleteCategory { name } => {
            let category_id = controller
                .state()
                .categories()
                .iter()
                .find(|category| category.name.as_ref() == name)
                .map(|category| category.id)
                .ok_or_else(|| spendings_rs::Error::UnknownCategory(name.clone()))?;

            controller.delete_category(category_id).await?;
            println!("Deleted category \"{name}\".");
        }
        Command::Chart { out } => {
            let charts = dashboard_charts(&controller.dashboard(), month, &ChartPalette::default());
            let mut text = String::from("const charts = {\n");
            for chart in charts {
                text.push_str(&format!("  \"{}\": {},\n", chart.id, chart.options));
            }
            text.push_str("};\n");

            fs::write(&out, text)?;
            println!("Wrote charts to {out:#?}");
        }
        Command::Import { .. } => {}
    }

    Ok(())
}

fn print_summary(controller: &SpendingsController<SqliteSpendingsApi>, month: YearMonth) {
    let dashboard = controller.dashboard();

    println!("Spendings for {month}");
    println!(
        "Total: {} across {} spendings in {} categories",
        format_currency(dashboard.total_amount),
        dashboard.transaction_count,
        dashboard.category_count
    );

    println!("\nBy category:");
    for total in &dashboard.category_totals {
        let share = share_label(total.total, dashboard.total_amount).unwrap_or_default();
        println!(
            "  {:<24} {:>12} {:>5}",
            total.name,
            format_currency(total.total),
            share
        );
    }

    println!("\nBy day:");
    for total in &dashboard.daily_totals {
        println!(
            "  {:<8} {:>12}",
            format_day_label(total.date),
            format_currency(total.total)
        );
    }
}

fn print_spendings(controller: &SpendingsController<SqliteSpendingsApi>) {
    let state = controller.state();

    for row in state.spending_rows() {
        println!(
            "{:<14} {:<12} {:<30} {:<20} {:>12}",
            row.id.to_string(),
            row.date,
            row.name,
            row.category_name,
            row.amount
        );
    }

    println!(
        "\n{} spendings, {} total",
        state.spendings().len(),
        format_currency(state.total_amount())
    );
}

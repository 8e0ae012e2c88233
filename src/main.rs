//! ecomdash - Date-filtered analytics dashboard over e-commerce transactions

use chrono::{Datelike, Local};
use clap::Parser;
use ecomdash::{
    aggregation::Aggregator,
    cli::{Cli, Command},
    dashboard::{Dashboard, PageView},
    data_loader::{DataLoader, Dataset},
    output::get_formatter,
    server,
};
use ecomdash_core::aggregation_types::{CustomerDimension, Totals};
use ecomdash_core::{DateRange, Result, filters::resolve_range};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load the dataset named by the global flags
fn load_dataset(cli: &Cli, show_progress: bool) -> Result<Dataset> {
    DataLoader::new(&cli.data_dir)
        .with_orders_file(&cli.orders_file)
        .with_geo_file(&cli.geo_file)
        .with_progress(show_progress)
        .load()
}

/// Resolve `--since`/`--until` against the dataset bounds
fn selected_range(cli: &Cli, dataset: &Dataset) -> Result<DateRange> {
    resolve_range(cli.since_date()?, cli.until_date()?, &dataset.bounds)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. Quiet unless --verbose, where RUST_LOG may refine it.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ecomdash=info"))
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stderr());

    match &cli.command {
        Command::Serve { host, port } => {
            info!("Starting dashboard server");
            let dataset = Arc::new(load_dataset(&cli, show_progress)?);
            let dashboard = Arc::new(Dashboard::new(dataset)?);
            server::run(dashboard, host, *port).await?;
        }

        Command::Report { output } => {
            info!("Writing dashboard report to {}", output.display());
            let dataset = load_dataset(&cli, show_progress)?;
            let range = selected_range(&cli, &dataset)?;

            if cli.json {
                let report = Aggregator::report(&dataset, range);
                std::fs::write(output, serde_json::to_string_pretty(&report)?)?;
            } else {
                let dashboard = Dashboard::new(Arc::new(dataset))?;
                let view = PageView::Ready(Aggregator::report(dashboard.dataset(), range));
                std::fs::write(output, dashboard.render(&view, Local::now().year())?)?;
            }
            println!("Wrote {}", output.display());
        }

        Command::Daily => {
            info!("Running daily orders report");
            let dataset = load_dataset(&cli, show_progress)?;
            let filtered = selected_range(&cli, &dataset)?.apply(&dataset.transactions);

            let daily = Aggregator::daily_orders(&filtered);
            let totals = Totals::from_daily(&daily);
            println!("{}", get_formatter(cli.json).format_daily(&daily, &totals));
        }

        Command::Products { worst } => {
            info!("Running product performance report");
            let dataset = load_dataset(&cli, show_progress)?;
            let filtered = selected_range(&cli, &dataset)?.apply(&dataset.transactions);

            let mut sales = Aggregator::product_sales(&filtered);
            if *worst {
                sales = Aggregator::least_sold(&sales);
            }
            println!("{}", get_formatter(cli.json).format_products(&sales));
        }

        Command::Spend => {
            info!("Running monthly spend report");
            let dataset = load_dataset(&cli, show_progress)?;
            let filtered = selected_range(&cli, &dataset)?.apply(&dataset.transactions);

            let spend = Aggregator::monthly_spend(&filtered);
            println!("{}", get_formatter(cli.json).format_spend(&spend));
        }

        Command::Reviews => {
            info!("Running review score report");
            let dataset = load_dataset(&cli, show_progress)?;
            let filtered = selected_range(&cli, &dataset)?.apply(&dataset.transactions);

            let reviews = Aggregator::category_reviews(&filtered);
            println!("{}", get_formatter(cli.json).format_reviews(&reviews));
        }

        Command::Customers { by } => {
            let dimension = CustomerDimension::from(*by);
            info!("Running customer report by {dimension}");
            let dataset = load_dataset(&cli, show_progress)?;
            let filtered = selected_range(&cli, &dataset)?.apply(&dataset.transactions);

            let counts = Aggregator::customers_by(&filtered, dimension);
            println!(
                "{}",
                get_formatter(cli.json).format_customers(dimension, &counts)
            );
        }
    }

    Ok(())
}

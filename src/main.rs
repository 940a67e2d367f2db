use analytics::{Dataset, MetricsEngine};
use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{Config, LogFormat};
use core_types::Measure;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use views::{BrandFilter, PanelOptions, ViewSpec};

mod render;

/// The main entry point for the acrylic marker market dashboard.
fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = configuration::load_config(cli.config.as_deref())?;
    if let Some(data) = &cli.data {
        config.dataset.path = data.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(web_server::run_server(&config))
        }
        command => {
            let dataset = load_dataset(&config)?;
            let filter = BrandFilter::new(cli.brands);
            let options = PanelOptions::from(&config.dashboard);
            run(command, &dataset, &filter, &options)
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Market-size, brand-share, price-tier and feature views over monthly acrylic
/// marker sales.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (default: ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// The sales CSV to load, overriding `dataset.path`.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Restrict brand-level views to this brand. Repeat for several.
    #[arg(long = "brand", global = true)]
    brands: Vec<String>,

    /// Console log layout, overriding `logging.format`.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dataset coverage: rows, months, brands, coerced cells.
    Summary,
    /// Market size over time.
    Overview {
        /// Monthly mean to trend per brand: price, rate or sales.
        #[arg(long, default_value = "price")]
        metric: Measure,
    },
    /// Brand share matrices and ASIN stability rankings.
    Brands,
    /// Revenue by price tier.
    Prices,
    /// Packaging, ink delivery, nib and colour breakdowns.
    Features,
    /// An ad-hoc group-by over the selected brands.
    Query {
        /// Comma-separated dimensions, e.g. `month,brand`.
        #[arg(long, default_value = "")]
        dims: String,
        #[arg(long, default_value = "amount")]
        measure: String,
        /// sum, mean, max, min or count.
        #[arg(long, default_value = "sum")]
        agg: String,
    },
    /// Write every panel as one JSON document.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value = "price")]
        metric: Measure,
    },
    /// Serve the JSON API.
    Serve {
        /// Overrides `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn load_dataset(config: &Config) -> anyhow::Result<Dataset> {
    let engine = MetricsEngine::new(views::classifier(&config.dashboard));
    engine
        .load(&config.dataset.path)
        .with_context(|| format!("Failed to load dataset '{}'", config.dataset.path.display()))
}

fn run(command: Commands, dataset: &Dataset, filter: &BrandFilter, options: &PanelOptions) -> anyhow::Result<()> {
    match command {
        Commands::Summary => {
            println!("{}", render::summary(&dataset.report()));
        }
        Commands::Overview { metric } => {
            let view = views::market_overview(dataset, filter, metric)?;
            render::notice(view.notice.as_deref());
            render::title("Monthly amount by brand");
            println!("{}", render::series(&view.monthly_amount_by_brand, "Month", 0));
            render::title("Yearly amount by ink delivery");
            println!("{}", render::series(&view.yearly_amount_by_ink_delivery, "Year", 0));
            render::title(&format!("Monthly mean {} by brand", view.metric));
            println!("{}", render::series(&view.monthly_metric_by_brand, "Month", 2));
        }
        Commands::Brands => {
            let view = views::brand_share(dataset, filter, options)?;
            render::notice(view.notice.as_deref());
            render::title(&format!("Quarterly change over {} quarters (whole market)", view.yoy_lag));
            println!("{}", render::ratios(&view.quarterly_yoy, "Quarter"));
            render::title("Quarterly share (whole market)");
            println!("{}", render::ratios(&view.quarterly_share, "Quarter"));
            render::title("Annual share (whole market)");
            println!("{}", render::ratios(&view.annual_share, "Year"));
            render::title(&format!("Most stable ASINs (of {} months)", view.total_months));
            println!("{}", render::profiles(&view.top_stable));
            render::title("At-risk ASINs");
            println!("{}", render::profiles(&view.at_risk));
        }
        Commands::Prices => {
            let view = views::price_tiers(dataset);
            render::title("Quarterly amount by price tier (whole market)");
            println!("{}", render::series(&view.quarterly_amount_by_tier, "Quarter", 0));
            render::title("Amount by price tier and year");
            println!("{}", render::pivot(&view.tier_by_year, &view.tier_totals));
        }
        Commands::Features => {
            let view = views::features(dataset, filter);
            render::notice(view.notice.as_deref());
            render::title("Packaging and pack size");
            println!("{}", render::hierarchy(&view.packaging_unit_count, "Packaging", "Pens"));
            render::title("Price by ink delivery");
            println!("{}", render::distributions(&view.ink_delivery_price, "Ink delivery"));
            render::title("Nib type and line width");
            println!("{}", render::hierarchy(&view.nib_line_width, "Nib", "Line width"));
            render::title("Unit price by brand");
            println!("{}", render::distributions(&view.unit_price_by_brand, "Brand"));
            render::title("Independent vs assorted colours (whole market)");
            println!("{}", render::series(&view.color_type_trend, "Month", 0));
        }
        Commands::Query { dims, measure, agg } => {
            let spec = ViewSpec::parse(&dims, &measure, &agg)?;
            let result = views::assemble(dataset, filter, &spec);
            render::notice(result.notice.as_deref());
            println!("{}", render::view(&result));
        }
        Commands::Export { out, metric } => {
            let snapshot = views::snapshot(dataset, filter, options, metric)?;
            match out {
                Some(path) => {
                    let file = File::create(&path).with_context(|| format!("Failed to create '{}'", path.display()))?;
                    let mut writer = BufWriter::new(file);
                    serde_json::to_writer_pretty(&mut writer, &snapshot)?;
                    writer.flush()?;
                    tracing::info!(path = %path.display(), "Dashboard exported.");
                }
                None => {
                    let mut stdout = io::stdout().lock();
                    serde_json::to_writer_pretty(&mut stdout, &snapshot)?;
                    writeln!(stdout)?;
                }
            }
        }
        Commands::Serve { .. } => anyhow::bail!("`serve` does not run against a preloaded dataset"),
    }
    Ok(())
}

//! prodsearch CLI
//!
//! Runs the interactive search widget by default, with one-shot commands for
//! scripting and inspecting the configuration.

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use prodsearch::tui::ui::truncate_to_width;
use prodsearch::{AppConfig, CatalogClient, SearchError};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// prodsearch - search a product catalog from the terminal
#[derive(Parser)]
#[command(name = "prodsearch")]
#[command(author = "prodsearch Contributors")]
#[command(version)]
#[command(about = "Terminal product search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: <config dir>/prodsearch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog base URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Products requested per listing
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Debounce interval for the interactive search
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Log file for the interactive search
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive search (default)
    Tui,

    /// Search once and print the matches
    Search {
        /// Text matched against product titles and categories
        query: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the suggested searches shown for an empty query
    Popular,

    /// Show the effective configuration
    Config {
        /// Write the defaults to the config file if it does not exist
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| match cli.command {
        None | Some(Commands::Tui) => cmd_tui(&cli, &config),
        Some(Commands::Search { ref query, json }) => {
            prodsearch::logging::init_stderr(cli.verbose);
            cmd_search(&config, query, json)
        }
        Some(Commands::Popular) => cmd_popular(&config),
        Some(Commands::Config { init }) => cmd_config(&cli, &config, init),
    });

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn config_path(cli: &Cli) -> Option<PathBuf> {
    cli.config.clone().or_else(AppConfig::default_path)
}

/// Config file first, then command-line overrides
fn load_config(cli: &Cli) -> prodsearch::Result<AppConfig> {
    let mut config = match config_path(cli) {
        Some(path) => AppConfig::load_from(&path)?,
        None => AppConfig::default(),
    };

    if let Some(endpoint) = &cli.endpoint {
        config.catalog.base_url = endpoint.clone();
    }
    if let Some(limit) = cli.limit {
        config.catalog.limit = limit;
    }
    if let Some(debounce_ms) = cli.debounce_ms {
        config.search.debounce_ms = debounce_ms;
    }

    config.validate()?;
    Ok(config)
}

fn cmd_tui(cli: &Cli, config: &AppConfig) -> prodsearch::Result<()> {
    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(prodsearch::logging::default_log_path);
    prodsearch::logging::init_file(&log_path, cli.verbose);
    info!(
        "prodsearch {} starting, catalog {}",
        prodsearch::VERSION,
        config.catalog.base_url
    );

    prodsearch::tui::run(config)
}

fn cmd_search(config: &AppConfig, query: &str, json: bool) -> prodsearch::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SearchError::Runtime(e.to_string()))?;
    let client = CatalogClient::new(&config.catalog)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Searching products for \"{}\"...", query));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let start = Instant::now();
    let result = runtime.block_on(client.search(query));
    spinner.finish_and_clear();
    let products = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
        return Ok(());
    }

    if products.is_empty() {
        println!(
            "{} No products found for \"{}\"",
            style("!").yellow().bold(),
            query
        );
        return Ok(());
    }

    println!(
        "{} {} products for {} in {}",
        style("→").cyan().bold(),
        products.len(),
        style(format!("\"{}\"", query)).yellow(),
        HumanDuration(start.elapsed())
    );
    println!();
    println!(
        "{:>4}  {:<48}  {:<18}  {:>9}  {}",
        style("ID").bold(),
        style("Title").bold(),
        style("Category").bold(),
        style("Price").bold(),
        style("Rating").bold()
    );

    for product in &products {
        println!(
            "{:>4}  {:<48}  {:<18}  {:>9}  {} ({})",
            product.id,
            truncate_to_width(&product.title, 48),
            style(truncate_to_width(&product.category, 18)).dim(),
            style(product.display_price()).green(),
            product.rating.rate,
            product.rating.count
        );
    }

    Ok(())
}

fn cmd_popular(config: &AppConfig) -> prodsearch::Result<()> {
    println!("{}", style("Popular Searches").bold());
    for term in &config.search.popular_searches {
        println!("  {} {}", style("•").cyan(), term);
    }
    Ok(())
}

fn cmd_config(cli: &Cli, config: &AppConfig, init: bool) -> prodsearch::Result<()> {
    let path = config_path(cli);

    if init {
        let Some(path) = &path else {
            return Err(SearchError::InvalidConfig(
                "no config directory available; pass --config".to_string(),
            ));
        };
        if path.exists() {
            println!(
                "{} {} already exists",
                style("!").yellow().bold(),
                path.display()
            );
        } else {
            AppConfig::default().save_to(path)?;
            println!("{} Wrote {}", style("✓").green().bold(), path.display());
        }
        return Ok(());
    }

    match &path {
        Some(p) if p.exists() => println!("# {}", p.display()),
        Some(p) => println!("# {} (not present, showing defaults)", p.display()),
        None => println!("# no config directory, showing defaults"),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

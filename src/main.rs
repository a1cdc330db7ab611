use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};

use yt_prospector::config::Config;
use yt_prospector::pipeline::SearchPipeline;
use yt_prospector::recency::{CustomWindow, RecencyMode};
use yt_prospector::report::render_report;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("yt_prospector=info,warn")
        .init();

    let matches = Command::new("yt-prospector")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Search YouTube and mine video descriptions for contact links")
        .arg(
            Arg::new("query")
                .short('q')
                .long("query")
                .value_name("TERMS")
                .help("Search term(s), comma-separated for multiple queries")
        )
        .arg(
            Arg::new("categories")
                .short('c')
                .long("categories")
                .value_name("LIST")
                .help("Link categories to collect: email | social | other | all (comma-separated)")
        )
        .arg(
            Arg::new("max")
                .short('m')
                .long("max")
                .value_name("NUM")
                .help("Maximum results requested per query (1-500)")
        )
        .arg(
            Arg::new("published")
                .short('p')
                .long("published")
                .value_name("MODE")
                .help("Recency window: last_month | last_week | last_day | custom")
        )
        .arg(
            Arg::new("published-custom")
                .long("published-custom")
                .value_name("W,D,H")
                .help("Custom window as weeks,days,hours (with --published custom)")
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Root directory for per-query CSV output")
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Path to a yt-prospector.toml configuration file")
        )
        .arg(
            Arg::new("no-csv")
                .long("no-csv")
                .help("Skip the local CSV export")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("sheet")
                .long("sheet")
                .value_name("ID")
                .help("Spreadsheet id to merge links into (token from config/env)")
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };
    config.apply_env();

    // CLI flags override file and environment
    if let Some(query) = matches.get_one::<String>("query") {
        config.search.queries = query.split(',').map(|q| q.trim().to_string()).collect();
    }
    if let Some(categories) = matches.get_one::<String>("categories") {
        config.search.categories = categories
            .split(',')
            .map(|c| c.trim().to_string())
            .collect();
    }
    if let Some(max) = matches.get_one::<String>("max") {
        config.search.max_results = max.parse()?;
    }
    if let Some(mode) = matches.get_one::<String>("published") {
        config.search.published = RecencyMode::parse(mode)
            .ok_or_else(|| anyhow::anyhow!("Unknown recency mode '{}'", mode))?;
    }
    if let Some(window) = matches.get_one::<String>("published-custom") {
        config.search.published_custom = Some(CustomWindow::parse_triple(window)?);
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.export.output_dir = PathBuf::from(dir);
    }
    if matches.get_flag("no-csv") {
        config.export.write_csv = false;
    }
    if let Some(sheet) = matches.get_one::<String>("sheet") {
        config.sheets.spreadsheet_id = sheet.clone();
    }

    config.validate()?;

    info!("🚀 yt-prospector starting...");
    info!("{}", config.summary());

    let pipeline = SearchPipeline::from_config(config)?;

    let start_time = std::time::Instant::now();
    let summary = pipeline.run().await;
    let duration = start_time.elapsed();

    // Print per-query reports
    for report in &summary.reports {
        println!("\n=== {} ===", report.query);
        println!("{}", render_report(&report.rows));
        if let Some(dir) = &report.export_dir {
            info!("📂 Tables written to {}", dir.display());
        }
    }

    info!("🎉 Run completed in {:.2}s", duration.as_secs_f64());
    info!("✅ Successful queries: {}", summary.successful);
    info!("❌ Failed queries: {}", summary.failed);

    if summary.failed > 0 && summary.successful == 0 {
        return Err(anyhow::anyhow!("All queries failed"));
    }

    Ok(())
}

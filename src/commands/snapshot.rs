use crate::constants::DEFAULT_CONFIG_PATH;
use crate::error::{Error, Result};
use crate::models::IndexConfig;
use crate::output;
use crate::services::calendar;
use crate::services::feed::ChartFeed;
use crate::services::snapshot::{build_snapshot, Snapshot};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub fn run(config_path: Option<PathBuf>, output_dir: Option<PathBuf>, date: Option<String>) {
    let target_date = match date {
        Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ Invalid --date '{}': {}", raw, e);
                eprintln!("   Expected format: YYYY-MM-DD");
                std::process::exit(1);
            }
        },
        None => calendar::market_today(),
    };

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Config error: {}", e);
            std::process::exit(1);
        }
    };
    let out_dir = output_dir.unwrap_or_else(output::get_output_dir);

    println!(
        "📐 {} snapshot for {} ({} tickers)",
        config.key,
        target_date,
        config.tickers.len()
    );

    match run_snapshot(&config, target_date, &out_dir) {
        Ok(snapshot) => {
            match snapshot.session_date {
                Some(session) => println!(
                    "✅ Snapshot complete: {} session, today {:+.2}%",
                    session, snapshot.stats.pct_intraday
                ),
                None => println!("✅ Snapshot complete: no intraday session available"),
            }
            if let Some(level) = snapshot.stats.last_level {
                println!("   Index level: {:.2}", level);
            }
            println!("   Artifacts in {}", out_dir.display());
        }
        Err(e) => {
            eprintln!("❌ Snapshot failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<IndexConfig> {
    match path {
        Some(path) => IndexConfig::from_file(path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                IndexConfig::from_file(default)
            } else {
                tracing::info!("No config file found - using built-in basket");
                Ok(IndexConfig::default())
            }
        }
    }
}

fn run_snapshot(config: &IndexConfig, target_date: NaiveDate, out_dir: &Path) -> Result<Snapshot> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let feed = ChartFeed::new()?;
        let snapshot = build_snapshot(&feed, config, target_date).await?;
        // compute-then-write: nothing touches disk until the snapshot is whole
        output::write_artifacts(&snapshot, out_dir)?;
        Ok(snapshot)
    })
}

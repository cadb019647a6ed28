use crate::constants::{HEARTBEAT, STATS_JSON};
use crate::error::Result;
use crate::models::SnapshotStats;
use crate::output;
use std::fs;
use std::path::{Path, PathBuf};

pub fn run(output_dir: Option<PathBuf>) {
    let dir = output_dir.unwrap_or_else(output::get_output_dir);

    println!("📊 Index Snapshot Status\n");

    match show_status(&dir) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_status(dir: &Path) -> Result<()> {
    let stats_path = dir.join(STATS_JSON);
    if !stats_path.exists() {
        println!("⚠️  No snapshot found in {}. Run 'snapshot' first.", dir.display());
        return Ok(());
    }

    let stats: SnapshotStats = serde_json::from_str(&fs::read_to_string(&stats_path)?)?;

    println!("🔹 {} (updated {})", stats.key, stats.updated_at);
    println!("   Today:  {:+.2}%", stats.pct_intraday);
    match stats.last_level {
        Some(level) => println!("   Level:  {:.2}", level),
        None => println!("   Level:  n/a"),
    }
    println!("   Basket: {}", stats.tickers.join("/"));

    let heartbeat = dir.join(HEARTBEAT);
    if heartbeat.exists() {
        println!("   Last run: {}", fs::read_to_string(heartbeat)?.trim());
    }

    Ok(())
}

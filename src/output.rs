//! Artifact sinks: CSV series, stats JSON, post text, heartbeat.
//!
//! Called only after the whole snapshot is computed, so a failed run never
//! leaves partial artifacts behind.

use crate::constants::{HEARTBEAT, INTRADAY_CSV, LEVELS_CSV, POST_TEXT, STATS_JSON};
use crate::error::Result;
use crate::models::{IndexLevelSeries, IntradayPctSeries, SnapshotStats};
use crate::services::calendar;
use crate::services::snapshot::Snapshot;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output directory from environment variable or default
pub fn get_output_dir() -> PathBuf {
    std::env::var("SKYTECH_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("outputs"))
}

/// Write all artifacts for one completed snapshot
pub fn write_artifacts(snapshot: &Snapshot, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    write_levels_csv(&snapshot.levels, &out_dir.join(LEVELS_CSV))?;
    write_intraday_csv(&snapshot.intraday, &out_dir.join(INTRADAY_CSV))?;

    let json = serde_json::to_string_pretty(&snapshot.stats)?;
    fs::write(out_dir.join(STATS_JSON), json)?;
    fs::write(out_dir.join(POST_TEXT), post_text(&snapshot.stats))?;
    fs::write(
        out_dir.join(HEARTBEAT),
        calendar::market_now().format("%Y/%m/%d %H:%M:%S").to_string(),
    )?;

    info!(dir = %out_dir.display(), "Artifacts written");
    Ok(())
}

fn write_levels_csv(levels: &IndexLevelSeries, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "level"])?;
    for (date, level) in levels {
        writer.write_record([date.format("%Y-%m-%d").to_string(), format!("{:.6}", level)])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_intraday_csv(intraday: &IntradayPctSeries, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["time", "pct"])?;
    for (time, pct) in intraday {
        writer.write_record([
            time.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
            format!("{:.6}", pct),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Human-readable post text for the intraday snapshot
pub fn post_text(stats: &SnapshotStats) -> String {
    let level_line = match stats.last_level {
        Some(level) => format!("Level: {:.2}", level),
        None => "Level: n/a".to_string(),
    };

    [
        format!("[{}]", stats.key),
        format!("Today: {:+.2}%", stats.pct_intraday),
        level_line,
        format!("Members: {}", stats.tickers.join("/")),
        "#SkyTech".to_string(),
    ]
    .join("\n")
}

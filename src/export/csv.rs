use anyhow::{anyhow, Context, Result};
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::aggregate::SearchTables;

const VIDEO_HEADERS: [&str; 4] = ["channel", "title", "published", "id"];
const LINK_HEADERS: [&str; 4] = ["id", "link", "category", "valid"];

/// Local CSV sink: one run directory per query under the output root
pub struct CsvExporter {
    output_root: PathBuf,
}

impl CsvExporter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    /// Stamp used in run directory names (local time, second precision)
    pub fn run_stamp() -> String {
        Local::now().format("%d-%m-%Y_%H-%M-%S").to_string()
    }

    /// Directory name for one query run: `<stamp>_<query-with-spaces-as-dashes>`
    pub fn run_dir_name(stamp: &str, query: &str) -> String {
        let dashed = query.split(' ').collect::<Vec<_>>().join("-");
        format!("{}_{}", stamp, dashed)
    }

    /// Export the tables under a run directory stamped with the current time
    pub async fn export(&self, query: &str, tables: &SearchTables) -> Result<PathBuf> {
        self.export_stamped(&Self::run_stamp(), query, tables).await
    }

    /// Export the tables under a run directory for an explicit stamp.
    ///
    /// The run directory must not exist yet; an existing directory fails the
    /// export rather than overwriting a previous run.
    pub async fn export_stamped(
        &self,
        stamp: &str,
        query: &str,
        tables: &SearchTables,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_root)
            .await
            .with_context(|| format!("cannot create output root {}", self.output_root.display()))?;

        let run_dir = self.output_root.join(Self::run_dir_name(stamp, query));
        tokio::fs::create_dir(&run_dir).await.with_context(|| {
            format!(
                "cannot create run directory {} (already exists?)",
                run_dir.display()
            )
        })?;

        let videos = to_csv(&VIDEO_HEADERS, &tables.videos)?;
        let links = to_csv(&LINK_HEADERS, &tables.links)?;
        tokio::fs::write(run_dir.join("videos.csv"), videos).await?;
        tokio::fs::write(run_dir.join("links.csv"), links).await?;

        info!(
            "💾 Exported {} videos and {} links to {}",
            tables.videos.len(),
            tables.links.len(),
            run_dir.display()
        );

        Ok(run_dir)
    }
}

/// Serialize records to CSV bytes with an explicit header row
fn to_csv<T: Serialize>(headers: &[&str], records: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| anyhow!("csv writer: {}", e))
}

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::aggregate::LinkRecord;
use crate::config::SheetsConfig;
use crate::links::LinkCategory;

const SHEET_HEADERS: [&str; 4] = ["id", "link", "category", "valid"];

/// One row of the remote links table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    pub id: String,
    pub link: String,
    pub category: LinkCategory,
    pub valid: bool,
}

impl SheetRow {
    pub fn from_record(record: &LinkRecord) -> Self {
        Self {
            id: record.id.clone(),
            link: record.link.clone(),
            category: record.category,
            valid: record.valid,
        }
    }

    /// Parse a spreadsheet row; rows missing cells or carrying an unknown
    /// category are treated as incomplete.
    fn from_cells(cells: &[String]) -> Option<Self> {
        if cells.len() < 4 {
            return None;
        }
        Some(Self {
            id: cells[0].clone(),
            link: cells[1].clone(),
            category: LinkCategory::parse(&cells[2])?,
            valid: cells[3].eq_ignore_ascii_case("true"),
        })
    }

    fn to_cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.link.clone(),
            self.category.to_string(),
            self.valid.to_string(),
        ]
    }

    fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.link.is_empty()
    }
}

/// Merge newly found links into the stored table: drop rows with missing
/// fields, deduplicate by link value (first occurrence wins, stored rows
/// before new ones), then sort by category (stable).
pub fn merge_links(existing: Vec<SheetRow>, incoming: Vec<SheetRow>) -> Vec<SheetRow> {
    let mut seen = HashSet::new();
    let mut merged: Vec<SheetRow> = existing
        .into_iter()
        .chain(incoming)
        .filter(SheetRow::is_complete)
        .filter(|row| seen.insert(row.link.clone()))
        .collect();
    merged.sort_by_key(|row| row.category);
    merged
}

/// Remote table with whole-table read and write only
#[async_trait]
pub trait SpreadsheetStore: Send + Sync {
    async fn read_all(&self) -> Result<Vec<SheetRow>>;
    async fn write_all(&self, rows: &[SheetRow]) -> Result<()>;
}

/// Read-modify-write merge of a run's links into the remote table.
///
/// Whole-table semantics: concurrent runs race and the last writer wins.
pub async fn merge_into(store: &dyn SpreadsheetStore, links: &[LinkRecord]) -> Result<usize> {
    let existing = store.read_all().await?;
    let incoming: Vec<SheetRow> = links.iter().map(SheetRow::from_record).collect();
    let merged = merge_links(existing, incoming);
    store.write_all(&merged).await?;

    info!("📊 Spreadsheet merged: {} link rows stored", merged.len());
    Ok(merged.len())
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ValueRange {
    range: String,
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

/// Google Sheets values-API client scoped to one worksheet
pub struct SheetsClient {
    config: SheetsConfig,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{}/{}/values/{}{}",
            self.config.api_base,
            self.config.spreadsheet_id,
            urlencoding::encode(&self.config.worksheet),
            suffix,
        )
    }
}

#[async_trait]
impl SpreadsheetStore for SheetsClient {
    async fn read_all(&self) -> Result<Vec<SheetRow>> {
        let url = self.values_url("");
        let response = self
            .client
            .get(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.access_token),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Sheets API error {}: {}", status, text));
        }

        let values: ValuesResponse = response.json().await?;
        let mut rows = Vec::new();
        // first row is the header
        for cells in values.values.iter().skip(1) {
            match SheetRow::from_cells(cells) {
                Some(row) => rows.push(row),
                None => debug!("Skipping incomplete spreadsheet row: {:?}", cells),
            }
        }

        debug!("Read {} link rows from the spreadsheet", rows.len());
        Ok(rows)
    }

    async fn write_all(&self, rows: &[SheetRow]) -> Result<()> {
        // the merged table can be shorter than the stored one, so clear first
        let clear_url = self.values_url(":clear");
        let response = self
            .client
            .post(&clear_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.access_token),
            )
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Sheets clear error {}: {}", status, text));
        }

        let mut values: Vec<Vec<String>> =
            vec![SHEET_HEADERS.iter().map(|h| h.to_string()).collect()];
        values.extend(rows.iter().map(SheetRow::to_cells));

        let body = ValueRange {
            range: self.config.worksheet.clone(),
            major_dimension: "ROWS",
            values,
        };

        let update_url = self.values_url("?valueInputOption=RAW");
        let response = self
            .client
            .put(&update_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.access_token),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Sheets update error {}: {}", status, text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn row(id: &str, link: &str, category: LinkCategory) -> SheetRow {
        SheetRow {
            id: id.to_string(),
            link: link.to_string(),
            category,
            valid: true,
        }
    }

    #[test]
    fn test_merge_dedups_by_link_first_wins() {
        let existing = vec![row("old", "a@x.com", LinkCategory::Email)];
        let incoming = vec![
            row("new", "a@x.com", LinkCategory::Email),
            row("new", "b@x.com", LinkCategory::Email),
        ];

        let merged = merge_links(existing, incoming);

        assert_eq!(merged.len(), 2);
        let a = merged.iter().find(|r| r.link == "a@x.com").unwrap();
        assert_eq!(a.id, "old");
        assert!(merged.iter().any(|r| r.link == "b@x.com"));
    }

    #[test]
    fn test_merge_sorts_by_category() {
        let existing = vec![
            row("v1", "https://shop.example.com", LinkCategory::Other),
            row("v1", "https://instagram.com/a", LinkCategory::Social),
        ];
        let incoming = vec![row("v2", "a@x.com", LinkCategory::Email)];

        let merged = merge_links(existing, incoming);
        let categories: Vec<LinkCategory> = merged.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                LinkCategory::Email,
                LinkCategory::Social,
                LinkCategory::Other
            ]
        );
    }

    #[test]
    fn test_merge_sort_is_stable_within_category() {
        let existing = vec![
            row("v1", "https://one.example.com", LinkCategory::Other),
            row("v2", "https://two.example.com", LinkCategory::Other),
        ];
        let merged = merge_links(existing, vec![]);
        assert_eq!(merged[0].link, "https://one.example.com");
        assert_eq!(merged[1].link, "https://two.example.com");
    }

    #[test]
    fn test_merge_drops_incomplete_rows() {
        let existing = vec![
            row("", "https://no-id.example.com", LinkCategory::Other),
            row("v1", "", LinkCategory::Other),
            row("v2", "kept@x.com", LinkCategory::Email),
        ];
        let merged = merge_links(existing, vec![]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].link, "kept@x.com");
    }

    #[test]
    fn test_from_cells() {
        let cells = vec![
            "v1".to_string(),
            "a@x.com".to_string(),
            "email".to_string(),
            "true".to_string(),
        ];
        let row = SheetRow::from_cells(&cells).unwrap();
        assert_eq!(row.link, "a@x.com");
        assert_eq!(row.category, LinkCategory::Email);
        assert!(row.valid);

        assert!(SheetRow::from_cells(&cells[..3].to_vec()).is_none());

        let mut bad_category = cells.clone();
        bad_category[2] = "spam".to_string();
        assert!(SheetRow::from_cells(&bad_category).is_none());
    }

    struct FakeStore {
        stored: Mutex<Vec<SheetRow>>,
    }

    #[async_trait]
    impl SpreadsheetStore for FakeStore {
        async fn read_all(&self) -> Result<Vec<SheetRow>> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn write_all(&self, rows: &[SheetRow]) -> Result<()> {
            *self.stored.lock().unwrap() = rows.to_vec();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_merge_into_store_round_trip() {
        let store = FakeStore {
            stored: Mutex::new(vec![row("old", "a@x.com", LinkCategory::Email)]),
        };
        let new_links = vec![
            LinkRecord {
                id: "v9".to_string(),
                link: "a@x.com".to_string(),
                category: LinkCategory::Email,
                valid: true,
            },
            LinkRecord {
                id: "v9".to_string(),
                link: "b@x.com".to_string(),
                category: LinkCategory::Email,
                valid: false,
            },
        ];

        let count = merge_into(&store, &new_links).await.unwrap();
        assert_eq!(count, 2);

        let stored = store.stored.lock().unwrap();
        assert_eq!(stored.len(), 2);
        let a = stored.iter().find(|r| r.link == "a@x.com").unwrap();
        assert_eq!(a.id, "old");
    }
}

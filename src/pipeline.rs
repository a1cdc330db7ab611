use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::aggregate::{Aggregator, SearchTables};
use crate::config::Config;
use crate::export::{merge_into, CsvExporter, SheetsClient, SpreadsheetStore};
use crate::recency;
use crate::report::{build_report, ReportRow};
use crate::youtube::{
    DescriptionFetcher, InnertubeClient, VideoSearch, YouTubeSearchClient, MAX_PAGE_SIZE,
};

/// Outcome of one query term's run
#[derive(Debug)]
pub struct QueryReport {
    pub query: String,
    pub videos: usize,
    pub rows: Vec<ReportRow>,
    pub export_dir: Option<PathBuf>,
}

/// Outcome of one pipeline invocation across all query terms
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub reports: Vec<QueryReport>,
}

/// Orchestrates one search run: cutoff, page loop, aggregation, join, export.
///
/// Queries are processed strictly in sequence; each query is an independent
/// unit of failure.
pub struct SearchPipeline {
    config: Config,
    search: Arc<dyn VideoSearch>,
    aggregator: Aggregator,
    csv: Option<CsvExporter>,
    sheet_store: Option<Arc<dyn SpreadsheetStore>>,
}

impl SearchPipeline {
    /// Build a pipeline over explicit collaborators (used by tests and
    /// embedders; `from_config` wires up the real clients).
    pub fn new(
        config: Config,
        search: Arc<dyn VideoSearch>,
        descriptions: Arc<dyn DescriptionFetcher>,
        sheet_store: Option<Arc<dyn SpreadsheetStore>>,
    ) -> Result<Self> {
        let aggregator = Aggregator::new(descriptions, config.search.wanted())?;
        let csv = config
            .export
            .write_csv
            .then(|| CsvExporter::new(config.export.output_dir.clone()));

        Ok(Self {
            config,
            search,
            aggregator,
            csv,
            sheet_store,
        })
    }

    /// Build a pipeline with the real YouTube and Sheets clients
    pub fn from_config(config: Config) -> Result<Self> {
        let search = Arc::new(YouTubeSearchClient::new(config.youtube.clone())?);
        let descriptions = Arc::new(
            InnertubeClient::new(config.youtube.timeout_seconds)
                .context("cannot build description-fetch client")?,
        );
        let sheet_store: Option<Arc<dyn SpreadsheetStore>> = if config.sheets.enabled() {
            Some(Arc::new(SheetsClient::new(config.sheets.clone())?))
        } else {
            None
        };

        Self::new(config, search, descriptions, sheet_store)
    }

    /// Run every configured query under a fresh run stamp
    pub async fn run(&self) -> RunSummary {
        self.run_stamped(&CsvExporter::run_stamp()).await
    }

    /// Run every configured query under an explicit run stamp.
    ///
    /// A failing query is logged and tallied; the remaining queries still run.
    pub async fn run_stamped(&self, stamp: &str) -> RunSummary {
        let mut summary = RunSummary::default();

        for query in &self.config.search.queries {
            let query = query.trim();
            if query.is_empty() {
                continue;
            }
            summary.total += 1;

            info!("🔍 Searching for '{}'", query);
            match self.run_query(stamp, query).await {
                Ok(report) => {
                    info!(
                        "✅ '{}': {} videos, {} report rows",
                        query,
                        report.videos,
                        report.rows.len()
                    );
                    summary.successful += 1;
                    summary.reports.push(report);
                }
                Err(e) => {
                    error!("❌ Query '{}' failed: {:#}", query, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    async fn run_query(&self, stamp: &str, query: &str) -> Result<QueryReport> {
        let cutoff = recency::cutoff(
            self.config.search.published,
            self.config.search.published_custom,
        )?;

        let tables = self.collect_tables(query, &cutoff).await?;
        let rows = build_report(&tables, &self.config.search.wanted());

        let export_dir = match &self.csv {
            Some(exporter) => Some(exporter.export_stamped(stamp, query, &tables).await?),
            None => None,
        };

        if let Some(store) = &self.sheet_store {
            merge_into(store.as_ref(), &tables.links).await?;
        }

        Ok(QueryReport {
            query: query.to_string(),
            videos: tables.videos.len(),
            rows,
            export_dir,
        })
    }

    /// Page through search results until the requested-items budget is spent.
    ///
    /// The budget counts items *requested*, not returned or classified, so a
    /// run can legitimately yield fewer rows than `max_results`.
    async fn collect_tables(&self, query: &str, cutoff: &str) -> Result<SearchTables> {
        let mut tables = SearchTables::default();
        let mut remaining = self.config.search.max_results;
        let mut page_token: Option<String> = None;

        while remaining > 0 {
            let page_size = remaining.min(MAX_PAGE_SIZE);
            let page = self
                .search
                .search_page(query, page_size, cutoff, page_token.as_deref())
                .await
                .with_context(|| format!("search page request failed for '{}'", query))?;

            for item in &page.items {
                self.aggregator.ingest(item, &mut tables).await;
            }

            remaining -= page_size;
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(tables)
    }
}

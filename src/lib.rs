/// yt-prospector
///
/// Searches YouTube for videos matching a query, mines each video's
/// description for contact links (emails, Instagram, other URLs) and exports
/// the results as per-query CSV tables and, optionally, a shared Google
/// Sheets worksheet.

pub mod aggregate;
pub mod config;
pub mod export;
pub mod links;
pub mod pipeline;
pub mod recency;
pub mod report;
pub mod youtube;

// Re-export main types for easy access
pub use crate::aggregate::{Aggregator, LinkRecord, SearchTables, VideoRecord};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::export::{merge_links, CsvExporter, SheetRow, SheetsClient, SpreadsheetStore};
pub use crate::links::{ExtractedLink, LinkCategory, LinkExtractor};
pub use crate::pipeline::{QueryReport, RunSummary, SearchPipeline};
pub use crate::recency::{cutoff, CustomWindow, RecencyMode};
pub use crate::report::{build_report, render_report, ReportRow};
pub use crate::youtube::{DescriptionError, DescriptionFetcher, VideoSearch};

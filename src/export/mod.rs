//! Export backends for collected link tables

pub mod csv;
pub mod sheets;

pub use csv::CsvExporter;
pub use sheets::{merge_into, merge_links, SheetRow, SheetsClient, SpreadsheetStore};

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write;

use crate::aggregate::SearchTables;
use crate::links::LinkCategory;

/// One (video, link) pair from the joined report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub channel: String,
    pub title: String,
    pub published: String,
    pub id: String,
    pub link: String,
    pub category: LinkCategory,
    pub valid: bool,
}

/// Inner-join the videos and links tables on video identifier.
///
/// Videos without links vanish (no row); link rows whose category is not in
/// `wanted` are left out, which is where unwanted email rows drop off.
pub fn build_report(tables: &SearchTables, wanted: &BTreeSet<LinkCategory>) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for video in &tables.videos {
        for link in tables.links.iter().filter(|l| l.id == video.id) {
            if !wanted.contains(&link.category) {
                continue;
            }
            rows.push(ReportRow {
                channel: video.channel.clone(),
                title: video.title.clone(),
                published: video.published.clone(),
                id: video.id.clone(),
                link: link.link.clone(),
                category: link.category,
                valid: link.valid,
            });
        }
    }
    rows
}

const HEADERS: [&str; 7] = ["channel", "title", "published", "id", "link", "category", "valid"];
const MAX_TITLE_WIDTH: usize = 40;

/// Render the report as an aligned text table followed by the bare link list
pub fn render_report(rows: &[ReportRow]) -> String {
    if rows.is_empty() {
        return "(no report rows)".to_string();
    }

    let cells: Vec<[String; 7]> = rows
        .iter()
        .map(|row| {
            [
                row.channel.clone(),
                clip(&row.title, MAX_TITLE_WIDTH),
                row.published.clone(),
                row.id.clone(),
                row.link.clone(),
                row.category.to_string(),
                row.valid.to_string(),
            ]
        })
        .collect();

    let mut widths: [usize; 7] = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    render_line(&mut out, &HEADERS.map(String::from), &widths);
    for row in &cells {
        render_line(&mut out, row, &widths);
    }

    out.push('\n');
    for row in rows {
        out.push_str(&row.link);
        out.push('\n');
    }

    out
}

fn render_line(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        let _ = write!(out, "{:<width$}", cell, width = *width);
    }
    // trim the padding on the last column
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max.saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::links::{LinkCategory, LinkExtractor};
use crate::youtube::{DescriptionFetcher, ItemKind, SearchItem};

/// One row of the per-query videos table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub channel: String,
    pub title: String,
    pub published: String,
    pub id: String,
}

/// One row of the per-query links table, keyed to its video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: String,
    pub link: String,
    pub category: LinkCategory,
    pub valid: bool,
}

/// The videos and links tables owned by one query run
#[derive(Debug, Clone, Default)]
pub struct SearchTables {
    pub videos: Vec<VideoRecord>,
    pub links: Vec<LinkRecord>,
}

/// Classifies raw search results into the videos/links tables.
///
/// Only video items produce records; channel and playlist results are valid
/// API responses this pipeline does not support and are dropped silently.
pub struct Aggregator {
    descriptions: Arc<dyn DescriptionFetcher>,
    extractor: LinkExtractor,
    wanted: BTreeSet<LinkCategory>,
}

impl Aggregator {
    pub fn new(
        descriptions: Arc<dyn DescriptionFetcher>,
        wanted: BTreeSet<LinkCategory>,
    ) -> Result<Self> {
        Ok(Self {
            descriptions,
            extractor: LinkExtractor::new()?,
            wanted,
        })
    }

    /// Ingest a single raw item, appending to the caller-owned tables
    pub async fn ingest(&self, item: &SearchItem, tables: &mut SearchTables) {
        let video_id = match (item.id.kind(), item.id.value()) {
            (ItemKind::Video, Some(id)) => id.to_string(),
            (kind, _) => {
                debug!("Skipping {:?} result '{}'", kind, item.snippet.title);
                return;
            }
        };

        tables.videos.push(VideoRecord {
            channel: item.snippet.channel_title.clone(),
            title: item.snippet.title.clone(),
            published: item.snippet.published_at.clone(),
            id: video_id.clone(),
        });

        // Snippet text is truncated by the search API; ask the player for the
        // full description and fall back to the snippet when that fails.
        let description = match self.descriptions.fetch_description(&video_id).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "⚠️ Description fetch failed for {} ({}), using snippet text",
                    video_id, e
                );
                item.snippet.description.clone()
            }
        };

        for extracted in self.extractor.extract(&description, &self.wanted) {
            tables.links.push(LinkRecord {
                id: video_id.clone(),
                link: extracted.value,
                category: extracted.category,
                valid: extracted.valid,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::{DescriptionError, ItemId, Snippet};
    use async_trait::async_trait;

    struct FixedFetcher {
        text: String,
    }

    #[async_trait]
    impl DescriptionFetcher for FixedFetcher {
        async fn fetch_description(&self, _video_id: &str) -> Result<String, DescriptionError> {
            Ok(self.text.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl DescriptionFetcher for FailingFetcher {
        async fn fetch_description(&self, video_id: &str) -> Result<String, DescriptionError> {
            Err(DescriptionError::Restricted(video_id.to_string()))
        }
    }

    fn video_item(id: &str, title: &str, snippet_description: &str) -> SearchItem {
        SearchItem {
            id: ItemId {
                kind: "youtube#video".to_string(),
                video_id: Some(id.to_string()),
                ..Default::default()
            },
            snippet: Snippet {
                channel_title: "Test Channel".to_string(),
                title: title.to_string(),
                published_at: "2024-05-01T10:00:00Z".to_string(),
                description: snippet_description.to_string(),
            },
        }
    }

    fn channel_item() -> SearchItem {
        SearchItem {
            id: ItemId {
                kind: "youtube#channel".to_string(),
                channel_id: Some("UCabc".to_string()),
                ..Default::default()
            },
            snippet: Snippet {
                channel_title: "Test Channel".to_string(),
                title: "The Channel Itself".to_string(),
                published_at: "2024-01-01T00:00:00Z".to_string(),
                description: "channel blurb with owner@label.com".to_string(),
            },
        }
    }

    fn all_categories() -> BTreeSet<LinkCategory> {
        LinkCategory::ALL.into_iter().collect()
    }

    #[tokio::test]
    async fn test_video_items_produce_records() {
        let fetcher = Arc::new(FixedFetcher {
            text: "bookings: beats@example.com / https://instagram.com/artist".to_string(),
        });
        let aggregator = Aggregator::new(fetcher, all_categories()).unwrap();
        let mut tables = SearchTables::default();

        aggregator
            .ingest(&video_item("vid1", "Video One", ""), &mut tables)
            .await;

        assert_eq!(tables.videos.len(), 1);
        assert_eq!(tables.videos[0].id, "vid1");
        assert_eq!(tables.videos[0].channel, "Test Channel");

        assert_eq!(tables.links.len(), 2);
        assert!(tables.links.iter().all(|l| l.id == "vid1"));
        assert_eq!(tables.links[0].category, LinkCategory::Email);
        assert!(tables.links[0].valid);
        assert_eq!(tables.links[1].category, LinkCategory::Social);
    }

    #[tokio::test]
    async fn test_channel_and_playlist_items_are_dropped() {
        let fetcher = Arc::new(FixedFetcher {
            text: "never fetched".to_string(),
        });
        let aggregator = Aggregator::new(fetcher, all_categories()).unwrap();
        let mut tables = SearchTables::default();

        aggregator.ingest(&channel_item(), &mut tables).await;

        let playlist = SearchItem {
            id: ItemId {
                kind: "youtube#playlist".to_string(),
                playlist_id: Some("PL1".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        aggregator.ingest(&playlist, &mut tables).await;

        assert!(tables.videos.is_empty());
        assert!(tables.links.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_snippet_text() {
        let aggregator = Aggregator::new(Arc::new(FailingFetcher), all_categories()).unwrap();
        let mut tables = SearchTables::default();

        let item = video_item("vid2", "Restricted Video", "snippet says mail@artist.net");
        aggregator.ingest(&item, &mut tables).await;

        // the item survives with whatever text was already available
        assert_eq!(tables.videos.len(), 1);
        assert_eq!(tables.links.len(), 1);
        assert_eq!(tables.links[0].link, "mail@artist.net");
    }

    #[tokio::test]
    async fn test_video_without_links_still_recorded() {
        let fetcher = Arc::new(FixedFetcher {
            text: "no contact info here".to_string(),
        });
        let aggregator = Aggregator::new(fetcher, all_categories()).unwrap();
        let mut tables = SearchTables::default();

        aggregator
            .ingest(&video_item("vid3", "Quiet Video", ""), &mut tables)
            .await;

        assert_eq!(tables.videos.len(), 1);
        assert!(tables.links.is_empty());
    }
}

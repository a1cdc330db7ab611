pub mod player;
pub mod search;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use player::InnertubeClient;
pub use search::YouTubeSearchClient;

/// Largest page the search API will serve per request
pub const MAX_PAGE_SIZE: u32 = 50;

/// Search-result kinds the platform returns for a plain query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Video,
    Channel,
    Playlist,
    Other,
}

/// Kind-discriminated identifier object attached to every search result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemId {
    #[serde(default)]
    pub kind: String,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(rename = "playlistId")]
    pub playlist_id: Option<String>,
}

impl ItemId {
    /// Kind tag with the "youtube#" prefix stripped
    pub fn kind(&self) -> ItemKind {
        match self.kind.split('#').last().unwrap_or_default() {
            "video" => ItemKind::Video,
            "channel" => ItemKind::Channel,
            "playlist" => ItemKind::Playlist,
            _ => ItemKind::Other,
        }
    }

    /// The identifier field named by the kind
    pub fn value(&self) -> Option<&str> {
        match self.kind() {
            ItemKind::Video => self.video_id.as_deref(),
            ItemKind::Channel => self.channel_id.as_deref(),
            ItemKind::Playlist => self.playlist_id.as_deref(),
            ItemKind::Other => None,
        }
    }
}

/// Snippet fields carried by every search result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snippet {
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
    #[serde(default)]
    pub description: String,
}

/// A raw search result as returned by the platform
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    pub id: ItemId,
    pub snippet: Snippet,
}

/// One page of raw search results
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// Search collaborator: serves one page of results per call
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search_page(
        &self,
        query: &str,
        page_size: u32,
        published_after: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage>;
}

/// Why a description fetch came back empty-handed
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("video {0} is age-restricted beyond this client context")]
    Restricted(String),
    #[error("no video details returned for {0}")]
    Unavailable(String),
    #[error("player API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("player request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Description-fetch collaborator.
///
/// Implementations are expected to serve age-restricted videos where their
/// client identity allows it and to report `DescriptionError::Restricted`
/// when the platform still refuses playback.
#[async_trait]
pub trait DescriptionFetcher: Send + Sync {
    async fn fetch_description(&self, video_id: &str) -> Result<String, DescriptionError>;
}

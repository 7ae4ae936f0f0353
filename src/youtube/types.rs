use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub privacy_status: String,
    pub url: String,
}

impl Video {
    pub fn embed_url(video_id: &str) -> String {
        format!("https://www.youtube.com/embed/{}", video_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub description: String,
    pub privacy_status: String,
    pub videos: Vec<Video>,
}

/// Result of uploading one file.
#[derive(Debug, Clone)]
pub struct UploadedVideo {
    pub file_name: String,
    pub video_id: String,
}

// --- YouTube Data API v3 wire types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub privacy_status: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistResource {
    pub id: String,
    pub snippet: Snippet,
    pub status: Option<Status>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemResource {
    pub content_details: ContentDetails,
    pub snippet: Snippet,
    pub status: Option<Status>,
}

#[derive(Debug, Deserialize)]
pub struct VideoResource {
    pub id: String,
}

impl From<PlaylistResource> for Playlist {
    fn from(p: PlaylistResource) -> Self {
        Self {
            id: p.id,
            title: p.snippet.title,
            description: p.snippet.description,
            privacy_status: p.status.map(|s| s.privacy_status).unwrap_or_default(),
            videos: Vec::new(),
        }
    }
}

impl From<PlaylistItemResource> for Video {
    fn from(item: PlaylistItemResource) -> Self {
        let url = Video::embed_url(&item.content_details.video_id);
        Self {
            id: item.content_details.video_id,
            title: item.snippet.title,
            description: item.snippet.description,
            privacy_status: item.status.map(|s| s.privacy_status).unwrap_or_default(),
            url,
        }
    }
}

use super::types::*;
use super::upload;
use super::VideoPlatform;
use crate::config::{ENV_FILE, YOUTUBE_TOKEN_VAR};
use crate::paginate::{collect_pages, Page};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Body, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use tokio::fs::File;
use tokio::sync::OnceCell;
use tokio_util::io::ReaderStream;

pub const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/youtube/v3";

const PAGE_SIZE: &str = "50";
const UPLOAD_CATEGORY: &str = "27";

/// Asks the operator for an access token the first time one is needed.
pub type TokenPrompt = Box<dyn Fn() -> Result<String> + Send + Sync>;

pub struct YouTubeRest {
    client: Client,
    access_token: OnceCell<String>,
    ask_token: Option<TokenPrompt>,
    api_base: String,
    upload_base: String,
}

impl YouTubeRest {
    pub fn new(access_token: Option<String>) -> Result<Self> {
        Self::with_base_urls(access_token, API_BASE, UPLOAD_BASE)
    }

    pub fn with_base_urls(access_token: Option<String>, api_base: &str, upload_base: &str) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(4)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            access_token: OnceCell::new_with(access_token),
            ask_token: None,
            api_base: api_base.trim_end_matches('/').to_string(),
            upload_base: upload_base.trim_end_matches('/').to_string(),
        })
    }

    /// Without a token, ask for one on the first call instead of failing.
    pub fn with_token_prompt(mut self, ask: impl Fn() -> Result<String> + Send + Sync + 'static) -> Self {
        self.ask_token = Some(Box::new(ask));
        self
    }

    async fn token(&self) -> Result<&str> {
        let token = self
            .access_token
            .get_or_try_init(|| async {
                match &self.ask_token {
                    Some(ask) => ask(),
                    None => anyhow::bail!(
                        "YouTube access token is not set; add {} to the environment or {}",
                        YOUTUBE_TOKEN_VAR,
                        ENV_FILE
                    ),
                }
            })
            .await?;
        Ok(token)
    }

    /// Fetch one page of a list endpoint.
    async fn get_page<T: DeserializeOwned>(
        &self,
        resource: &str,
        mut query: Vec<(&'static str, String)>,
        page_token: Option<String>,
    ) -> Result<Page<T>> {
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        let url = format!("{}/{}", self.api_base, resource);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(self.token().await?)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("GET {} failed", resource))?;
        let resp = check(resp, resource).await?;
        let parsed: ListResponse<T> = resp
            .json()
            .await
            .with_context(|| format!("failed to parse {} response", resource))?;
        Ok(Page::new(parsed.items, parsed.next_page_token))
    }

    async fn list_videos(&self, playlist_id: &str) -> Result<Vec<Video>> {
        let items: Vec<PlaylistItemResource> = collect_pages(|token| {
            self.get_page(
                "playlistItems",
                vec![
                    ("part", "contentDetails,status,snippet".to_string()),
                    ("maxResults", PAGE_SIZE.to_string()),
                    ("playlistId", playlist_id.to_string()),
                ],
                token,
            )
        })
        .await?;
        Ok(items.into_iter().map(Video::from).collect())
    }

    async fn create_playlist(&self, title: &str) -> Result<String> {
        let url = format!("{}/playlists", self.api_base);
        let body = json!({
            "snippet": { "title": title, "description": "" },
            "status": { "privacyStatus": "unlisted" },
        });
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.token().await?)
            .query(&[("part", "snippet,status")])
            .json(&body)
            .send()
            .await
            .context("create playlist request failed")?;
        let created: PlaylistResource = check(resp, "create playlist")
            .await?
            .json()
            .await
            .context("failed to parse created playlist")?;
        tracing::info!(title, id = %created.id, "created playlist");
        Ok(created.id)
    }

    /// Resumable upload: open a session with the metadata, then PUT the bytes.
    async fn upload_video(&self, path: &Path, title: &str, index: usize) -> Result<String> {
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open video file: {}", path.display()))?;
        let size = file
            .metadata()
            .await
            .with_context(|| format!("Failed to read video file size: {}", path.display()))?
            .len();

        let url = format!("{}/videos", self.upload_base);
        let metadata = json!({
            "snippet": {
                "title": title,
                "description": format!("Video {}", index),
                "categoryId": UPLOAD_CATEGORY,
                "tags": ["annotation", "crowdsourcing"],
            },
            "status": {
                "privacyStatus": "unlisted",
                "selfDeclaredMadeForKids": false,
            },
        });
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.token().await?)
            .query(&[
                ("uploadType", "resumable"),
                ("part", "snippet,status"),
                ("notifySubscribers", "false"),
            ])
            .header("X-Upload-Content-Length", size)
            .header("X-Upload-Content-Type", "application/octet-stream")
            .json(&metadata)
            .send()
            .await
            .context("upload session request failed")?;
        let resp = check(resp, "start upload").await?;
        let session_url = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .context("upload session response has no Location header")?;

        let resp = self
            .client
            .put(&session_url)
            .bearer_auth(self.token().await?)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await
            .with_context(|| format!("upload of {} failed", path.display()))?;
        let video: VideoResource = check(resp, "upload video")
            .await?
            .json()
            .await
            .context("failed to parse uploaded video")?;
        Ok(video.id)
    }

    async fn add_to_playlist(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        let url = format!("{}/playlistItems", self.api_base);
        let body = json!({
            "snippet": {
                "playlistId": playlist_id,
                "resourceId": { "kind": "youtube#video", "videoId": video_id },
            },
        });
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.token().await?)
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await
            .context("playlist insert request failed")?;
        check(resp, "add video to playlist").await?;
        Ok(())
    }
}

#[async_trait]
impl VideoPlatform for YouTubeRest {
    fn is_signed_in(&self) -> bool {
        self.access_token.initialized()
    }

    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let resources: Vec<PlaylistResource> = collect_pages(|token| {
            self.get_page(
                "playlists",
                vec![
                    ("part", "snippet,contentDetails,status,id".to_string()),
                    ("maxResults", PAGE_SIZE.to_string()),
                    ("mine", "true".to_string()),
                ],
                token,
            )
        })
        .await?;

        let mut playlists = Vec::with_capacity(resources.len());
        for resource in resources {
            let mut playlist = Playlist::from(resource);
            playlist.videos = self.list_videos(&playlist.id).await?;
            tracing::debug!(title = %playlist.title, videos = playlist.videos.len(), "fetched playlist");
            playlists.push(playlist);
        }
        Ok(playlists)
    }

    async fn upload_directory(&self, dir: &Path, playlist_title: &str) -> Result<Vec<UploadedVideo>> {
        let files = upload::video_files(dir)?;
        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "no video files to upload");
            println!("No video files found in {}. Nothing to upload.", dir.display());
            return Ok(Vec::new());
        }

        let playlist_id = match self.find_playlist(playlist_title).await? {
            Some(playlist) => playlist.id,
            None => self.create_playlist(playlist_title).await?,
        };

        let mut uploaded = Vec::with_capacity(files.len());
        for (idx, path) in files.iter().enumerate() {
            let title = upload::video_title(path);
            println!("Uploading video {} ({}/{})..", title, idx + 1, files.len());
            let video_id = self.upload_video(path, &title, idx).await?;
            self.add_to_playlist(&playlist_id, &video_id).await?;
            tracing::info!(file = %path.display(), video_id = %video_id, playlist = playlist_title, "uploaded video");
            uploaded.push(UploadedVideo {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                video_id,
            });
        }
        Ok(uploaded)
    }
}

/// Pass successful responses through; turn anything else into an error
/// carrying the response body.
async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("YouTube {} failed ({}): {}", what, status, body);
    }
    Ok(resp)
}

pub mod rest;
pub mod types;
pub mod upload;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use types::{Playlist, UploadedVideo};

#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Every playlist on the account, each with its videos.
    async fn list_playlists(&self) -> Result<Vec<Playlist>>;

    /// Upload the accepted video files in `dir` and add them to the playlist
    /// titled `playlist_title`.
    async fn upload_directory(&self, dir: &Path, playlist_title: &str) -> Result<Vec<UploadedVideo>>;

    /// Whether calls can be made without asking the operator for credentials.
    fn is_signed_in(&self) -> bool {
        true
    }

    async fn find_playlist(&self, title: &str) -> Result<Option<Playlist>> {
        let found = self
            .list_playlists()
            .await?
            .into_iter()
            .find(|p| p.title == title);
        if found.is_none() {
            tracing::warn!(title, "playlist not found");
            println!("Could not find playlist '{}' in your YouTube account", title);
        }
        Ok(found)
    }
}

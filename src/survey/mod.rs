pub mod combinations;
pub mod questions;
pub mod template;

use crate::youtube::types::Playlist;
use anyhow::{Context, Result};
use combinations::Combinations;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error(
        "playlist '{playlist}' only has {available} videos but you want {requested} videos per survey; \
         choose a number <= {available}"
    )]
    NotEnoughVideos {
        playlist: String,
        available: usize,
        requested: usize,
    },
    #[error("a survey needs at least one video per task")]
    NoVideosRequested,
    #[error("failed to build survey manifest: {0}")]
    Manifest(#[from] csv::Error),
}

/// The two survey flavours the CLI manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyKind {
    Survey,
    Qualification,
}

impl SurveyKind {
    pub fn label(self) -> &'static str {
        match self {
            SurveyKind::Survey => "survey",
            SurveyKind::Qualification => "qualification survey",
        }
    }

    /// Fixed output files for this kind under `dir`.
    pub fn paths(self, dir: &Path) -> SurveyPaths {
        let prefix = match self {
            SurveyKind::Survey => "",
            SurveyKind::Qualification => "qualification_",
        };
        SurveyPaths {
            survey: dir.join(format!("{}survey.html", prefix)),
            sample: dir.join(format!("{}sample_survey_do_not_upload.html", prefix)),
            manifest: dir.join(format!("{}survey.csv", prefix)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyPaths {
    pub survey: PathBuf,
    pub sample: PathBuf,
    pub manifest: PathBuf,
}

impl SurveyPaths {
    pub fn all(&self) -> [&Path; 3] {
        [self.survey.as_path(), self.sample.as_path(), self.manifest.as_path()]
    }

    pub fn exists(&self) -> bool {
        self.all().iter().all(|p| p.is_file())
    }
}

/// Generated survey artifacts for one playlist.
#[derive(Debug, Clone)]
pub struct Survey {
    pub html: String,
    pub sample_html: String,
    pub manifest: String,
    pub rows: usize,
}

impl Survey {
    /// Build the survey form, a preview with the first `num_videos` playlist
    /// videos filled in, and the manifest of every `num_videos`-combination.
    pub fn generate(playlist: &Playlist, num_videos: usize) -> Result<Self, SurveyError> {
        if num_videos == 0 {
            return Err(SurveyError::NoVideosRequested);
        }
        if playlist.videos.len() < num_videos {
            return Err(SurveyError::NotEnoughVideos {
                playlist: playlist.title.clone(),
                available: playlist.videos.len(),
                requested: num_videos,
            });
        }

        let html = template::render(num_videos);
        let sample_html = fill_sample(&html, playlist, num_videos);
        let (manifest, rows) = build_manifest(playlist, num_videos)?;

        tracing::debug!(
            playlist = %playlist.title,
            videos = playlist.videos.len(),
            per_task = num_videos,
            rows,
            "survey generated"
        );

        Ok(Self { html, sample_html, manifest, rows })
    }

    /// Write all three files, replacing whatever was there.
    pub fn save(&self, paths: &SurveyPaths) -> Result<()> {
        write_text(&paths.survey, &self.html)?;
        write_text(&paths.sample, &self.sample_html)?;
        write_text(&paths.manifest, &self.manifest)?;
        tracing::info!(
            survey = %paths.survey.display(),
            sample = %paths.sample.display(),
            manifest = %paths.manifest.display(),
            rows = self.rows,
            "survey saved"
        );
        Ok(())
    }
}

fn fill_sample(html: &str, playlist: &Playlist, num_videos: usize) -> String {
    let mut out = html.to_string();
    for (i, video) in playlist.videos.iter().take(num_videos).enumerate() {
        out = out.replace(&template::placeholder(i), &video.url);
    }
    out
}

fn build_manifest(playlist: &Playlist, num_videos: usize) -> Result<(String, usize), SurveyError> {
    let urls: Vec<&str> = playlist.videos.iter().map(|v| v.url.as_str()).collect();
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record((0..num_videos).map(|i| format!("video_url_{}", i)))?;
    let mut rows = 0;
    for combo in Combinations::new(&urls, num_videos) {
        writer.write_record(combo.iter().map(|url| url.as_bytes()))?;
        rows += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SurveyError::Manifest(e.into_error().into()))?;
    Ok((String::from_utf8_lossy(&bytes).into_owned(), rows))
}

/// Delete-then-write, creating parent directories as needed.
fn write_text(path: &Path, text: &str) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove old file: {}", path.display()))?;
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

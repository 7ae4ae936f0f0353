use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// File extensions (upper-cased, without the dot) the platform accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "MOV", "MPEG-1", "MPEG-2", "MPEG4", "MP4", "MPG", "AVI", "WMV", "MPEGPS", "FLV",
];

pub fn is_accepted(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_uppercase().as_str()))
        .unwrap_or(false)
}

/// Video files directly inside `dir`, sorted by path. Anything else is
/// skipped with a warning.
pub fn video_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read video directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    files.retain(|path| {
        let ok = is_accepted(path);
        if !ok {
            tracing::warn!(file = %path.display(), "not an accepted video file, ignoring");
            println!("Video {} not an accepted video file, ignoring", path.display());
        }
        ok
    });
    Ok(files)
}

/// Title used for an uploaded file: its name minus the extension.
pub fn video_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

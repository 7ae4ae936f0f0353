use super::{capitalize, App};
use crate::config::schema::Section;
use crate::mturk::Endpoint;
use crate::survey::SurveyKind;
use crate::youtube::types::Playlist;
use crossterm::style::Stylize;
use std::fmt::Write;

/// One line of the status header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub label: String,
    /// `Err` carries the reason shown next to the cross.
    pub result: Result<(), String>,
}

impl Check {
    fn new(label: impl Into<String>, result: Result<(), String>) -> Self {
        Self {
            label: label.into(),
            result,
        }
    }

    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run every setup check. Failures become crosses; nothing here returns an
/// error.
pub async fn collect(app: &App) -> Vec<Check> {
    let mut checks = Vec::new();

    for section in [Section::YouTube, Section::Survey, Section::Aws, Section::MTurk] {
        let errors = app.config.errors_in(section);
        let result = if !app.config.section_complete(section) {
            Err("INCOMPLETE options in config".to_string())
        } else if !errors.is_empty() {
            Err(format!("Unreadable values: {}", errors.join("; ")))
        } else {
            Ok(())
        };
        checks.push(Check::new(format!("{} config", section.name()), result));
    }

    // One listing serves both playlist checks.
    let survey = &app.config.settings().survey;
    let listing = if app.videos.is_signed_in() {
        app.videos.list_playlists().await.map_err(|e| {
            tracing::warn!("could not list playlists: {:#}", e);
            format!("Could not reach YouTube: {:#}", e)
        })
    } else {
        Err("Not signed in to YouTube yet".to_string())
    };
    checks.push(Check::new(
        "Survey playlist",
        playlist_status(&survey.survey_playlist, &listing),
    ));
    checks.push(Check::new(
        "Qualification playlist",
        playlist_status(&survey.qualification_playlist, &listing),
    ));

    for kind in [SurveyKind::Survey, SurveyKind::Qualification] {
        let result = if kind.paths(&app.survey_dir).exists() {
            Ok(())
        } else {
            Err("Not created yet".to_string())
        };
        checks.push(Check::new(format!("{} files", capitalize(kind.label())), result));
    }

    for (endpoint, label) in [
        (Endpoint::Sandbox, "Sandbox HITs"),
        (Endpoint::Production, "HITs"),
    ] {
        let result = match app.market.list_tasks(endpoint).await {
            Ok(tasks) if tasks.is_empty() => Err("No HITs created".to_string()),
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!(endpoint = endpoint.label(), "could not list HITs: {:#}", e);
                Err(format!("Could not reach MTurk: {:#}", e))
            }
        };
        checks.push(Check::new(label, result));
    }

    checks
}

fn playlist_status(title: &str, listing: &Result<Vec<Playlist>, String>) -> Result<(), String> {
    if title.is_empty() {
        return Err("Playlist name not filled in config".to_string());
    }
    let playlists = listing.as_ref().map_err(Clone::clone)?;
    match playlists.iter().find(|p| p.title == title) {
        None => Err("Playlist not found in YouTube Account".to_string()),
        Some(p) if p.videos.is_empty() => Err("No videos in the playlist".to_string()),
        Some(_) => Ok(()),
    }
}

pub fn render(checks: &[Check]) -> String {
    let mut out = String::from("\nVideo Annotation CLI\n====================\nSteps\n-----\n");
    for check in checks {
        match &check.result {
            Ok(()) => {
                let _ = writeln!(out, " {} {}", "✔".green(), check.label);
            }
            Err(reason) => {
                let _ = writeln!(out, " {} {} - {}", "✘".red(), check.label, reason);
            }
        }
    }
    out
}

use super::{capitalize, prompt, App, Command, Outcome};
use crate::config::schema::Section;
use crate::mturk::question::html_question;
use crate::mturk::types::TaskRequest;
use crate::mturk::Endpoint;
use crate::survey::{Survey, SurveyKind};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

impl App {
    pub async fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        let text = match command {
            Command::CheckConfig => self.check_config()?,
            Command::EditConfig => self.edit_config()?,
            Command::CheckPlaylists => self.check_playlists().await?,
            Command::CreateSurvey => self.create_surveys().await?,
            Command::PreviewSurvey => self.preview_survey()?,
            Command::CreateSandboxTask => self.create_task(Endpoint::Sandbox).await?,
            Command::CreateTask => self.create_task(Endpoint::Production).await?,
            Command::CheckTaskStatus => self.check_task_status().await?,
            Command::UploadVideos => {
                let dir = prompt("Folder of videos to upload")?;
                let playlist = prompt("Playlist title")?;
                self.upload_videos(Path::new(&dir), &playlist).await?
            }
            Command::Exit => return Ok(Outcome::Exit),
        };
        Ok(Outcome::Continue(text))
    }

    /// Re-read the config file and describe how complete it is.
    pub fn check_config(&mut self) -> Result<String> {
        self.config.reload()?;
        let mut out = format!("\nCONFIG ({})\n------\n{}\n", self.config.path().display(), self.config.report());
        for (section, error) in self.config.section_errors() {
            let _ = writeln!(out, "{} values could not be read: {}", section.name(), error);
        }
        Ok(out)
    }

    pub fn edit_config(&self) -> Result<String> {
        let path = self.config.path();
        open::that(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(format!(
            "Opened {} in your default editor. Save it, then display the config (a) to reload it.",
            path.display()
        ))
    }

    pub async fn check_playlists(&self) -> Result<String> {
        let playlists = self.videos.list_playlists().await?;
        Ok(format!("\n\nHere are your playlists:\n{}\n", pretty(&playlists)?))
    }

    /// Generate both surveys, then save them. Nothing is written unless both
    /// generate cleanly.
    pub async fn create_surveys(&self) -> Result<String> {
        let errors = self.config.errors_in(Section::Survey);
        if !errors.is_empty() {
            let mut out = format!(
                "\nNo survey files were written. Fix the SURVEY section of {}:\n",
                self.config.path().display()
            );
            for error in errors {
                let _ = writeln!(out, "  - {}", error);
            }
            return Ok(out);
        }

        let settings = &self.config.settings().survey;
        let wanted = [
            (SurveyKind::Qualification, "QUALIFICATION_PLAYLIST", settings.qualification_playlist.as_str(), settings.qualification_videos),
            (SurveyKind::Survey, "SURVEY_PLAYLIST", settings.survey_playlist.as_str(), settings.survey_videos),
        ];

        let mut surveys = Vec::with_capacity(wanted.len());
        let mut problems = Vec::new();
        for (kind, option, title, num_videos) in wanted {
            if title.is_empty() {
                problems.push(format!("{} is not filled in the config", option));
                continue;
            }
            let Some(playlist) = self.videos.find_playlist(title).await? else {
                problems.push(format!("playlist '{}' was not found in your YouTube account", title));
                continue;
            };
            match Survey::generate(&playlist, num_videos) {
                Ok(survey) => surveys.push((kind, survey)),
                Err(e) => {
                    tracing::warn!(kind = kind.label(), error = %e, "survey not generated");
                    problems.push(format!("{}: {}", kind.label(), e));
                }
            }
        }

        if !problems.is_empty() {
            let mut out = String::from("\nNo survey files were written:\n");
            for problem in &problems {
                let _ = writeln!(out, "  - {}", problem);
            }
            return Ok(out);
        }

        let mut out = String::from("\n\n");
        for (kind, survey) in &surveys {
            let paths = kind.paths(&self.survey_dir);
            survey.save(&paths)?;
            let _ = writeln!(out, "{} is here: {}", capitalize(kind.label()), absolute(&paths.survey).display());
            let _ = writeln!(out, "Sample {} is here: {}", kind.label(), absolute(&paths.sample).display());
            let _ = writeln!(
                out,
                "Accompanying csv ({} rows) is here: {}",
                survey.rows,
                absolute(&paths.manifest).display()
            );
        }
        out.push_str("\nCheck the sample surveys to ensure they look correct\n");
        Ok(out)
    }

    pub fn preview_survey(&self) -> Result<String> {
        let sample = absolute(&SurveyKind::Survey.paths(&self.survey_dir).sample);
        if !sample.is_file() {
            return Ok("No sample survey yet. Create the survey (d) first.".to_string());
        }
        open::that(&sample).with_context(|| format!("Failed to open {}", sample.display()))?;
        Ok(format!("Opened {} in your browser", sample.display()))
    }

    /// Publish the saved survey as a HIT, provided the AWS and MTURK config
    /// sections are filled out.
    pub async fn create_task(&self, endpoint: Endpoint) -> Result<String> {
        if !self.config.ready_for_tasks() {
            let missing: Vec<&str> = [Section::Aws, Section::MTurk]
                .into_iter()
                .filter(|s| !self.config.section_complete(*s))
                .map(Section::name)
                .collect();
            let detail = if missing.is_empty() {
                "some values could not be read".to_string()
            } else {
                format!("incomplete sections: {}", missing.join(", "))
            };
            return Ok(format!(
                "Fill out the AWS and MTURK sections of {} before creating HITs ({}).",
                self.config.path().display(),
                detail
            ));
        }

        let survey_path = SurveyKind::Survey.paths(&self.survey_dir).survey;
        if !survey_path.is_file() {
            return Ok("No survey html yet. Create the survey (d) first.".to_string());
        }
        let html = std::fs::read_to_string(&survey_path)
            .with_context(|| format!("Failed to read survey: {}", survey_path.display()))?;

        let mturk = &self.config.settings().mturk;
        let request = TaskRequest {
            title: mturk.title.clone(),
            description: mturk.description.clone(),
            keywords: mturk.keywords.clone(),
            reward: mturk.reward,
            max_assignments: mturk.max_assignments,
            lifetime_seconds: mturk.lifetime_seconds,
            assignment_duration_seconds: mturk.assignment_duration_seconds,
            auto_approval_seconds: mturk.auto_approval_seconds,
            question: html_question(&html),
        };

        let created = self.market.create_task(endpoint, &request).await?;
        Ok(format!(
            "A new HIT has been created. You can preview it here:\n{}\nHITID = {} (Use to Get Results)",
            created.preview_url, created.hit_id
        ))
    }

    /// Both endpoints, each reported on its own so one failing doesn't hide
    /// the other.
    pub async fn check_task_status(&self) -> Result<String> {
        let mut out = String::new();
        for endpoint in [Endpoint::Sandbox, Endpoint::Production] {
            let heading = match endpoint {
                Endpoint::Sandbox => "HITS (sandbox):",
                Endpoint::Production => "HITS:",
            };
            let _ = writeln!(out, "{}", heading);
            match self.market.list_tasks(endpoint).await {
                Ok(tasks) => {
                    let _ = writeln!(out, "{}", pretty(&tasks)?);
                }
                Err(e) => {
                    tracing::warn!(endpoint = endpoint.label(), "listing HITs failed: {:#}", e);
                    let _ = writeln!(out, "  could not list HITs: {:#}", e);
                }
            }
        }
        Ok(out)
    }

    pub async fn upload_videos(&self, dir: &Path, playlist_title: &str) -> Result<String> {
        let uploaded = self.videos.upload_directory(dir, playlist_title).await?;
        if uploaded.is_empty() {
            return Ok(format!("Nothing uploaded from {}", dir.display()));
        }
        let mut out = format!("Uploaded {} videos to '{}':\n", uploaded.len(), playlist_title);
        for video in &uploaded {
            let _ = writeln!(out, "  {} -> {}", video.file_name, video.video_id);
        }
        Ok(out)
    }
}

fn pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to format result")
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

pub mod report;
pub mod schema;

use anyhow::{Context, Result};
use report::ConfigReport;
use schema::Section;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

pub const ENV_FILE: &str = ".env";
pub const YOUTUBE_TOKEN_VAR: &str = "YOUTUBE_ACCESS_TOKEN";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Typed view of `config.toml`. Fields missing from the file take the schema
/// defaults.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Settings {
    #[serde(rename = "YOUTUBE", default)]
    pub youtube: YouTubeConfig,
    #[serde(rename = "AWS", default)]
    pub aws: AwsConfig,
    #[serde(rename = "MTURK", default)]
    pub mturk: MTurkConfig,
    #[serde(rename = "SURVEY", default)]
    pub survey: SurveyConfig,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct YouTubeConfig {
    pub oauth_client_secrets_file: String,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct MTurkConfig {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub reward: f64,
    pub max_assignments: u32,
    pub lifetime_seconds: u64,
    pub assignment_duration_seconds: u64,
    pub auto_approval_seconds: u64,
}

impl Default for MTurkConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            keywords: String::new(),
            reward: 0.0,
            max_assignments: 100,
            lifetime_seconds: 604_800,
            assignment_duration_seconds: 3600,
            auto_approval_seconds: 259_200,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct SurveyConfig {
    pub survey_videos: usize,
    pub survey_playlist: String,
    pub qualification_videos: usize,
    pub qualification_playlist: String,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            survey_videos: 5,
            survey_playlist: String::new(),
            qualification_videos: 5,
            qualification_playlist: String::new(),
        }
    }
}

/// Config file loaded once at startup. The raw table backs the completeness
/// report; `settings` is the typed view the rest of the program reads.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    table: Table,
    settings: Settings,
    section_errors: Vec<(Section, String)>,
}

impl ConfigStore {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(path, &content)
    }

    /// Load the config, first writing a template with every default if the
    /// file doesn't exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, schema::template())
                .with_context(|| format!("Failed to write config template: {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote config template");
        }
        Self::load(path)
    }

    pub fn from_toml_str(path: &Path, content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let table: Table = content
            .parse()
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;

        for key in schema::unknown_keys(&table) {
            tracing::warn!(key = %key, "unknown config option");
        }

        let mut section_errors = Vec::new();
        let settings = Settings {
            youtube: typed_section(&table, Section::YouTube, &mut section_errors),
            aws: typed_section(&table, Section::Aws, &mut section_errors),
            mturk: typed_section(&table, Section::MTurk, &mut section_errors),
            survey: typed_section(&table, Section::Survey, &mut section_errors),
        };

        Ok(Self {
            path: path.to_path_buf(),
            table,
            settings,
            section_errors,
        })
    }

    /// Re-read the file from disk. On failure the previously loaded config is
    /// kept.
    pub fn reload(&mut self) -> Result<()> {
        let fresh = Self::load(&self.path)?;
        if fresh.settings.aws != self.settings.aws {
            tracing::warn!("AWS credentials changed; restart to use the new credentials");
        }
        *self = fresh;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn report(&self) -> ConfigReport {
        ConfigReport::evaluate(&self.table)
    }

    pub fn is_complete(&self) -> bool {
        schema::config_complete(&self.table)
    }

    pub fn section_complete(&self, section: Section) -> bool {
        schema::section_complete(&self.table, section)
    }

    /// Sections whose values couldn't be read into `Settings`.
    pub fn section_errors(&self) -> &[(Section, String)] {
        &self.section_errors
    }

    /// Whether the sections needed to publish tasks are filled out and usable.
    pub fn ready_for_tasks(&self) -> bool {
        [Section::Aws, Section::MTurk].into_iter().all(|section| {
            self.section_complete(section)
                && !self.section_errors.iter().any(|(s, _)| *s == section)
        })
    }

    /// Problems recorded for one section, if any.
    pub fn errors_in(&self, section: Section) -> Vec<&str> {
        self.section_errors
            .iter()
            .filter(|(s, _)| *s == section)
            .map(|(_, e)| e.as_str())
            .collect()
    }
}

/// YouTube access token from the process environment (which includes `.env`
/// once it has been loaded).
pub fn youtube_access_token() -> Option<String> {
    std::env::var(YOUTUBE_TOKEN_VAR)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Set `key=value` in the env file at `path`, replacing an existing
/// assignment of `key` and keeping every other line as it was.
pub fn persist_env_var(path: &Path, key: &str, value: &str) -> Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let assignment = format!("{}={}", key, value);
    let mut replaced = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            let assigns_key = line
                .split_once('=')
                .is_some_and(|(k, _)| k.trim().trim_start_matches("export ").trim() == key);
            if assigns_key && !replaced {
                replaced = true;
                assignment.clone()
            } else {
                line.to_string()
            }
        })
        .collect();
    if !replaced {
        lines.push(assignment);
    }

    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), key, "saved to env file");
    Ok(())
}

/// Decode one config section option by option. A value that can't be read
/// falls back to its own default and is recorded; the other options keep
/// their values.
fn typed_section<T>(table: &Table, section: Section, errors: &mut Vec<(Section, String)>) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(value) = table.get(section.name()) else {
        return T::default();
    };
    let Some(raw) = value.as_table() else {
        tracing::warn!(section = section.name(), "config section is not a table, using defaults");
        errors.push((section, format!("[{}] must be a table", section.name())));
        return T::default();
    };

    let mut accepted = Table::new();
    for (option, value) in raw {
        let mut candidate = accepted.clone();
        candidate.insert(option.clone(), value.clone());
        match Value::Table(candidate.clone()).try_into::<T>() {
            Ok(_) => accepted = candidate,
            Err(e) => {
                tracing::warn!(section = section.name(), option = %option, error = %e, "invalid config value, using default");
                errors.push((section, format!("{}: {}", option, e.message().trim())));
            }
        }
    }
    Value::Table(accepted).try_into().unwrap_or_default()
}

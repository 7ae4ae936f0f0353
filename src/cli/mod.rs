pub mod actions;
pub mod status;

use crate::config::ConfigStore;
use crate::mturk::Marketplace;
use crate::youtube::VideoPlatform;
use anyhow::Result;
use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Every action the operator can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Command {
    CheckConfig,
    EditConfig,
    CheckPlaylists,
    CreateSurvey,
    PreviewSurvey,
    CreateSandboxTask,
    CreateTask,
    CheckTaskStatus,
    UploadVideos,
    Exit,
}

pub struct MenuEntry {
    pub key: char,
    pub command: Command,
    pub group: &'static str,
    pub description: &'static str,
}

/// Menu letter -> command, in display order.
pub const MENU: &[MenuEntry] = &[
    MenuEntry { key: 'a', command: Command::CheckConfig, group: "Config", description: "Display config file" },
    MenuEntry { key: 'b', command: Command::EditConfig, group: "Config", description: "Edit config file" },
    MenuEntry { key: 'c', command: Command::CheckPlaylists, group: "YouTube", description: "Check status of YouTube playlists" },
    MenuEntry { key: 'u', command: Command::UploadVideos, group: "YouTube", description: "Upload a folder of videos to a playlist" },
    MenuEntry { key: 'd', command: Command::CreateSurvey, group: "Survey HTML", description: "Create survey html for mechanical turk" },
    MenuEntry { key: 'e', command: Command::PreviewSurvey, group: "Survey HTML", description: "Verify the sample survey is correct in your browser" },
    MenuEntry { key: 'f', command: Command::CreateSandboxTask, group: "Mechanical Turk", description: "Create HITs in mechanical turk sandbox mode" },
    MenuEntry { key: 'g', command: Command::CreateTask, group: "Mechanical Turk", description: "Create HITs in mechanical turk" },
    MenuEntry { key: 'h', command: Command::CheckTaskStatus, group: "Mechanical Turk", description: "Check status of HITs" },
    MenuEntry { key: 'x', command: Command::Exit, group: "", description: "Exit" },
];

impl Command {
    pub fn from_key(input: &str) -> Option<Self> {
        let mut chars = input.trim().chars();
        let key = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        MENU.iter().find(|e| e.key == key).map(|e| e.command)
    }

    pub fn key(self) -> char {
        MENU.iter()
            .find(|e| e.command == self)
            .map(|e| e.key)
            .unwrap_or('?')
    }
}

/// What the loop should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Exit,
}

/// Everything a command needs: the loaded config and the two service clients.
pub struct App {
    config: ConfigStore,
    videos: Arc<dyn VideoPlatform>,
    market: Arc<dyn Marketplace>,
    survey_dir: PathBuf,
}

impl App {
    pub fn new(
        config: ConfigStore,
        videos: Arc<dyn VideoPlatform>,
        market: Arc<dyn Marketplace>,
        survey_dir: PathBuf,
    ) -> Self {
        Self {
            config,
            videos,
            market,
            survey_dir,
        }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }
}

/// Interactive menu. A failing command is reported and the menu comes back;
/// only `x` or end of input leaves the loop.
pub async fn run(app: &mut App) -> Result<()> {
    let stdin = io::stdin();
    loop {
        let statuses = status::collect(app).await;
        println!("{}", status::render(&statuses));
        println!("{}", menu_text());
        print!("> ");
        io::stdout().flush()?;

        let Some(input) = read_line(&mut stdin.lock())? else {
            return Ok(());
        };
        let Some(command) = Command::from_key(&input) else {
            println!("Invalid choice, please try again.");
            continue;
        };

        tracing::info!(?command, "running command");
        match app.dispatch(command).await {
            Ok(Outcome::Exit) => return Ok(()),
            Ok(Outcome::Continue(text)) => println!("{}", text),
            Err(e) => {
                tracing::error!(?command, "command failed: {:#}", e);
                eprintln!("\n{} {:#}\n", "error:".red(), e);
            }
        }

        print!("\nPress enter to show the menu again");
        io::stdout().flush()?;
        if read_line(&mut stdin.lock())?.is_none() {
            return Ok(());
        }
    }
}

/// One trimmed line, or `None` at end of input.
fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for one value on stdin. Empty input or end of input is an error.
pub fn prompt(label: &str) -> Result<String> {
    print!("  {} > ", label);
    io::stdout().flush()?;
    match read_line(&mut io::stdin().lock())? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("{} cannot be empty", label),
    }
}

pub fn menu_text() -> String {
    let mut out = String::from(
        "\nOptions (enter the letter of the action you wish to perform)\n\
         ------------------------------------------------------------\n",
    );
    let mut group = None;
    for entry in MENU {
        if group != Some(entry.group) {
            group = Some(entry.group);
            out.push_str(if entry.group.is_empty() { "\n" } else { " " });
            if !entry.group.is_empty() {
                out.push_str(entry.group);
                out.push('\n');
            }
        }
        out.push_str(&format!("   {} - {}\n", entry.key, entry.description));
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

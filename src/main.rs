use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vid_annotate::cli::{self, App, Command, Outcome};
use vid_annotate::config::{self, ConfigStore, DEFAULT_CONFIG_PATH, ENV_FILE, YOUTUBE_TOKEN_VAR};
use vid_annotate::mturk::rest::MTurkRest;
use vid_annotate::youtube::rest::YouTubeRest;

const LOG_FILE: &str = "vid-annotate.log";

#[derive(Parser)]
#[command(name = "vid-annotate", version, about = "Crowdsourced video annotation with YouTube and Mechanical Turk")]
struct Cli {
    /// Config file; a template is written here if it doesn't exist.
    #[arg(long, env = "VID_ANNOTATE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Where survey html and csv files are written.
    #[arg(long, default_value = "surveys")]
    survey_dir: PathBuf,

    /// Run one action and exit instead of showing the menu.
    #[arg(value_enum)]
    command: Option<Command>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = std::fs::File::create(LOG_FILE)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vid_annotate=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    // Saved keys from .env; real env vars take precedence
    dotenv::dotenv().ok();

    let config = ConfigStore::load_or_init(&cli.config)?;
    tracing::info!(path = %cli.config.display(), complete = config.is_complete(), "config loaded");

    println!();
    println!("  Video Annotation CLI v{}", env!("CARGO_PKG_VERSION"));
    println!("  ========================");
    println!();

    let token = config::youtube_access_token();
    if token.is_none() {
        println!("  No {} found; you'll be asked for one on the first YouTube call.", YOUTUBE_TOKEN_VAR);
        println!();
    }
    let secrets = config.settings().youtube.oauth_client_secrets_file.clone();
    let videos = YouTubeRest::new(token)?.with_token_prompt(move || ask_youtube_token(&secrets));

    let aws = &config.settings().aws;
    let market = Arc::new(MTurkRest::new(&aws.access_key_id, &aws.secret_access_key)?);

    let mut app = App::new(config, Arc::new(videos), market, cli.survey_dir);

    match cli.command {
        Some(command) => match app.dispatch(command).await? {
            Outcome::Continue(text) => println!("{}", text),
            Outcome::Exit => {}
        },
        None => cli::run(&mut app).await?,
    }

    tracing::info!("exiting");
    Ok(())
}

/// Prompt for a YouTube OAuth access token and save it to .env for later runs.
fn ask_youtube_token(secrets_file: &str) -> Result<String> {
    println!("  A YouTube OAuth access token is needed (scope youtube.force-ssl).");
    if !secrets_file.is_empty() {
        println!("  Mint one with the client secrets in {}.", secrets_file);
    }
    let token = cli::prompt("YouTube OAuth access token")?;
    if let Err(e) = config::persist_env_var(Path::new(ENV_FILE), YOUTUBE_TOKEN_VAR, &token) {
        tracing::warn!("could not save the YouTube token: {:#}", e);
    }
    Ok(token)
}

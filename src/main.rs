use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use eyre::{Result, bail};
use log::{info, warn};

mod cli;

use cli::{Cli, Command, OutputFormat};
use ytscript::captions::{CaptionSource, InnertubeCaptions};
use ytscript::config::{self, Config};
use ytscript::locale::Locale;
use ytscript::server::{self, FetchedTranscript, TranscriptFailure};
use ytscript::output;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytscript.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytscript")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "\nConfig is read from: {}\nLogs are written to: {}",
        config::config_path().display(),
        log_dir().join("ytscript.log").display()
    )
}

fn load_config(path: Option<&Path>) -> Config {
    let result = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    result.unwrap_or_else(|e| {
        warn!("Ignoring invalid config: {e}");
        eprintln!("warning: ignoring invalid config: {e}");
        Config::default()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cmd = <Cli as clap::CommandFactory>::command().after_help(build_after_help());
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // CLI flags take priority over the config file
    let config = load_config(cli.config.as_deref());
    let captions = InnertubeCaptions::new(reqwest::Client::new(), config.session_settings());

    match cli.command {
        Command::Serve { host, port, locale } => {
            let host = host.unwrap_or_else(|| config.host().to_string());
            let port = port.unwrap_or_else(|| config.port());
            let locale = locale.unwrap_or_else(|| config.locale());
            if cli.verbose {
                eprintln!("Locale: {locale}");
            }

            let state = Arc::new(server::AppState {
                captions: Arc::new(captions),
                locale,
            });
            server::serve(&host, port, state).await
        }
        Command::Fetch {
            url,
            format,
            output,
            save,
            locale,
        } => {
            let format = match format {
                Some(format) => format,
                None => config
                    .default_format
                    .as_deref()
                    .and_then(|f| OutputFormat::from_str(f, true).ok())
                    .unwrap_or(OutputFormat::Text),
            };
            let locale = locale.unwrap_or_else(|| config.locale());
            let request = FetchRequest {
                url: &url,
                format,
                output: output.as_deref(),
                save,
                locale,
                verbose: cli.verbose,
            };
            run_fetch(&captions, request).await
        }
    }
}

struct FetchRequest<'a> {
    url: &'a str,
    format: OutputFormat,
    output: Option<&'a Path>,
    save: bool,
    locale: Locale,
    verbose: bool,
}

async fn run_fetch(captions: &dyn CaptionSource, req: FetchRequest<'_>) -> Result<()> {
    let transcript = match server::transcript_for_url(captions, req.url).await {
        Ok(transcript) => transcript,
        Err(TranscriptFailure::InvalidUrl) => bail!(
            "{}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  <11-character video ID>",
            TranscriptFailure::InvalidUrl.message(req.locale)
        ),
        Err(failure) => {
            if req.verbose {
                if let TranscriptFailure::Fetch(err) = &failure {
                    eprintln!("Caption fetch failed: {err}");
                }
            }
            bail!("{}", failure.message(req.locale));
        }
    };
    let FetchedTranscript { video_id, segments } = transcript;

    if req.verbose {
        eprintln!("Video: {video_id}\nSegments: {}", segments.len());
    }

    let rendered = match req.format {
        OutputFormat::Text => output::render_text(&segments),
        OutputFormat::Timeline => output::render_timeline(&segments),
        OutputFormat::Json => output::render_json(&segments),
        OutputFormat::Srt => output::render_srt(&segments),
    };

    if let Some(path) = req.output {
        std::fs::write(path, &rendered)?;
        if req.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }

    if req.save {
        let path = PathBuf::from(output::download_filename(video_id.as_str()));
        std::fs::write(&path, output::render_text(&segments))?;
        eprintln!("Saved: {}", path.display());
    }

    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use comfy_table::{Cell, Table};
use dialoguer::{Confirm, Input};

use crate::config::{self, Config};
use crate::core::downloader::{Downloader, Outcome};
use crate::core::retag;
use crate::models::BatchSummary;
use crate::sources::artwork::HttpArtwork;
use crate::sources::ytdlp::YtDlp;

#[derive(Parser)]
#[command(
    name = "yt2mp3",
    version,
    about = "Download YouTube videos or playlists as tagged MP3 files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video or playlist as MP3
    Download {
        /// Video or playlist URL; prompted for when omitted
        url: Option<String>,
        /// Output directory (overrides the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rewrite tags of existing MP3 files from their file names
    Retag {
        /// Directory to process recursively
        directory: PathBuf,
    },
    /// Edit the configuration file
    Config,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Download { url, output }) => cmd_download(url, output),
        Some(Commands::Retag { directory }) => cmd_retag(&directory),
        Some(Commands::Config) => cmd_config(),
        None => {
            println!("YouTube to MP3 Downloader and Metadata Editor");
            cmd_download(None, None)
        }
    }
}

fn prompt_url() -> Result<String> {
    let url: String = Input::new()
        .with_prompt("Enter YouTube URL")
        .interact_text()?;
    Ok(url)
}

fn cmd_download(url: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let cfg = config::load_config();
    let url = match url {
        Some(url) => url,
        None => prompt_url()?,
    };

    let ytdlp = YtDlp::new(&cfg);
    let version = ytdlp.check_available()?;
    log::info!("using yt-dlp {version}");

    let artwork = HttpArtwork::new()?;
    let root = output.unwrap_or_else(|| cfg.output.directory.clone());
    let downloader = Downloader::new(&ytdlp, &artwork, &cfg, root);

    match downloader.download(&url)? {
        Outcome::Track(path) => log::info!("wrote {}", path.display()),
        Outcome::Playlist(summary) => {
            log::info!("{}/{} playlist items downloaded", summary.succeeded, summary.total);
            print_failures(&summary);
            if summary.succeeded == 0 {
                bail!("no videos from the playlist could be downloaded");
            }
        }
    }
    Ok(())
}

fn print_failures(summary: &BatchSummary) {
    if summary.failures.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Skipped", "Reason"]);
    for (item, reason) in &summary.failures {
        table.add_row(vec![Cell::new(item), Cell::new(reason)]);
    }
    println!("{table}");
}

fn cmd_retag(directory: &Path) -> Result<()> {
    let cfg = config::load_config();
    println!("Processing existing MP3 files in: {}", directory.display());

    let report = retag::retag_directory(directory, &cfg.metadata)?;
    if report.entries.is_empty() {
        println!("No MP3 files found in {}", directory.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["File", "Artist", "Title", "Album", "Status"]);

    for entry in &report.entries {
        let filename = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let row = match &entry.outcome {
            Ok(meta) => vec![
                Cell::new(filename),
                Cell::new(meta.artist()),
                Cell::new(meta.title()),
                Cell::new(meta.album().unwrap_or("-")),
                Cell::new("ok"),
            ],
            Err(reason) => vec![
                Cell::new(filename),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(reason),
            ],
        };
        table.add_row(row);
    }

    println!("{table}");
    println!(
        "\nMetadata processing complete: {} successful, {} failed",
        report.summary.succeeded,
        report.summary.failed(),
    );
    Ok(())
}

fn cmd_config() -> Result<()> {
    let mut cfg: Config = config::load_config();

    println!("yt2mp3 settings\n");

    let directory: String = Input::new()
        .with_prompt("Output directory")
        .with_initial_text(cfg.output.directory.display().to_string())
        .interact_text()?;

    let audio_quality: String = Input::new()
        .with_prompt("MP3 bitrate (kbit/s)")
        .with_initial_text(cfg.output.audio_quality.clone())
        .interact_text()?;

    let ytdlp: String = Input::new()
        .with_prompt("yt-dlp executable")
        .with_initial_text(cfg.tools.ytdlp.clone())
        .interact_text()?;

    let default_album: String = Input::new()
        .with_prompt("Album for single videos")
        .with_initial_text(cfg.metadata.default_album.clone())
        .interact_text()?;

    let embed_thumbnail = Confirm::new()
        .with_prompt("Embed video thumbnail as cover art?")
        .default(cfg.metadata.embed_thumbnail)
        .interact()?;

    cfg.output.directory = PathBuf::from(directory);
    cfg.output.audio_quality = audio_quality;
    cfg.tools.ytdlp = ytdlp;
    cfg.metadata.default_album = default_album;
    cfg.metadata.embed_thumbnail = embed_thumbnail;

    let path = config::save_config(&cfg)?;
    println!("\nSettings saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_download() {
        let cli = Cli::try_parse_from(["yt2mp3", "download", "https://youtu.be/x", "-o", "out"]).unwrap();
        match cli.command {
            Some(Commands::Download { url, output }) => {
                assert_eq!(url.as_deref(), Some("https://youtu.be/x"));
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            _ => panic!("expected download"),
        }
    }

    #[test]
    fn test_parse_verbosity_and_default() {
        let cli = Cli::try_parse_from(["yt2mp3", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_retag_requires_directory() {
        assert!(Cli::try_parse_from(["yt2mp3", "retag"]).is_err());
        let cli = Cli::try_parse_from(["yt2mp3", "retag", "music", "-v"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Retag { .. })));
        assert_eq!(cli.verbose, 1);
    }
}

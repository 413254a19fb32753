//! CLI for feedgrab.

mod commands;
mod control_socket;
mod indicator;

use anyhow::Result;
use clap::{Parser, Subcommand};
use feedgrab_core::config;
use std::path::PathBuf;

use commands::{run_replay, run_scan, run_send, run_status, ReplayOptions};
use feedgrab_core::surface::Command;

/// Top-level CLI for feedgrab.
#[derive(Debug, Parser)]
#[command(name = "feedgrab")]
#[command(about = "feedgrab: carousel-aware media extractor for recorded social feeds", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Replay a recorded session and extract its media.
    Replay {
        /// Directory of saved page states (`*.html`, one per feed position).
        session: PathBuf,

        /// Download root (default: config `sink.download_dir`, else current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Items to process before stopping (clamped to 1..=100).
        #[arg(long, value_name = "N")]
        max_posts: Option<usize>,

        /// Start on the focused item right away and exit when done.
        #[arg(long)]
        start: bool,
    },

    /// List the media the locator finds in a session's first page state.
    Scan {
        /// Directory of saved page states.
        session: PathBuf,
    },

    /// Ask a running `feedgrab replay` to start on its focused item.
    Start,

    /// Ask a running `feedgrab replay` to stop every traversal.
    Stop,

    /// Show cumulative download stats.
    Status,
}

impl CliCommand {
    pub async fn run(self) -> Result<()> {
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self {
            CliCommand::Replay {
                session,
                out,
                max_posts,
                start,
            } => {
                if let Some(n) = max_posts {
                    cfg.settings.max_posts = n;
                }
                if let Some(dir) = out {
                    cfg.sink.download_dir = Some(dir);
                }
                run_replay(&cfg, &session, ReplayOptions { start }).await?;
            }
            CliCommand::Scan { session } => run_scan(&cfg, &session)?,
            CliCommand::Start => run_send(Command::Start).await?,
            CliCommand::Stop => run_send(Command::Stop).await?,
            CliCommand::Status => run_status()?,
        }

        Ok(())
    }
}

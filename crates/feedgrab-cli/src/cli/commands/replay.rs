//! `feedgrab replay <session>` – host a recorded session: attach controls,
//! accept start/stop commands, run traversals, persist stats.

use anyhow::{Context, Result};
use feedgrab_core::carousel::CarouselWalker;
use feedgrab_core::config::FeedgrabConfig;
use feedgrab_core::feed::{FeedDriver, FeedOutcome};
use feedgrab_core::item::FeedItem;
use feedgrab_core::sink::FsSink;
use feedgrab_core::snapshot::SnapshotSession;
use feedgrab_core::stats::{DownloadStats, RunTally};
use feedgrab_core::surface::{Command, CommandOutcome, ControlSurface, PressOutcome};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::cli::control_socket;
use crate::cli::indicator::LogIndicator;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Start right away and exit once the traversal ends.
    pub start: bool,
}

type Running<'a> = Option<Pin<Box<dyn Future<Output = CommandOutcome> + 'a>>>;

async fn next_outcome(running: &mut Running<'_>) -> CommandOutcome {
    match running.as_mut() {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

fn report(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Pressed(PressOutcome::Finished(o)) | CommandOutcome::Pressed(PressOutcome::Orphaned(o)) => {
            print_outcome(o)
        }
        CommandOutcome::NoFocusedItem => println!("No focused item to start from."),
        other => tracing::debug!(?other, "command done"),
    }
}

fn print_outcome(o: &FeedOutcome) {
    println!(
        "Traversal ended ({:?}) after {} item(s): {} saved, {} failed",
        o.end, o.items, o.acquired, o.failed
    );
}

struct StatsFile {
    path: Option<PathBuf>,
    stats: DownloadStats,
}

impl StatsFile {
    fn open() -> Self {
        let path = DownloadStats::default_path().ok();
        let stats = match &path {
            Some(p) => DownloadStats::load_from_path(p).unwrap_or_else(|e| {
                tracing::warn!("ignoring unreadable stats: {:#}", e);
                DownloadStats::default()
            }),
            None => DownloadStats::default(),
        };
        Self { path, stats }
    }

    fn save(&self) {
        if let Some(path) = &self.path {
            if let Err(e) = self.stats.save_to_path(path) {
                tracing::warn!("could not save stats to {}: {:#}", path.display(), e);
            }
        }
    }
}

pub async fn run_replay(cfg: &FeedgrabConfig, session_dir: &Path, opts: ReplayOptions) -> Result<()> {
    cfg.validate()?;
    let session = SnapshotSession::open(session_dir)?.with_next_item_key(&cfg.selectors.next_item_key);
    let sink = FsSink::from_config(&cfg.sink).context("resolve download directory")?;
    println!(
        "Replaying {} page state(s) from {} into {}",
        session.page_count(),
        session_dir.display(),
        sink.root().display()
    );

    let tally = RunTally::new();
    let driver = FeedDriver::new(CarouselWalker::new(&session, &sink, cfg, &tally));
    let surface = ControlSurface::new(cfg);
    let indicator = LogIndicator;

    let mut stats = StatsFile::open();
    stats.stats.is_running = true;
    stats.save();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Command>();
    let listener = match feedgrab_core::control::default_control_socket_path() {
        Ok(path) => match control_socket::spawn_control_listener(tx.clone(), &path) {
            Ok(handle) => {
                tracing::debug!(path = %path.display(), "control socket listening");
                Some((handle, path))
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("no control socket path: {}", e);
            None
        }
    };

    if opts.start || cfg.settings.auto_download {
        let _ = tx.send(Command::Start);
    } else {
        println!("Waiting for `feedgrab start` (Ctrl-C to quit)");
    }

    let mut attach = tokio::time::interval(cfg.surface.attach_interval());
    let mut running: Running<'_> = None;
    let mut quitting = false;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            outcome = next_outcome(&mut running) => {
                running = None;
                report(&outcome);
                if opts.start || quitting {
                    break;
                }
            }
            Some(command) = rx.recv() => match command {
                Command::Start if running.is_some() => println!("Already running."),
                Command::Start => {
                    running = Some(Box::pin(surface.handle(Command::Start, &driver, &indicator)));
                }
                Command::Stop => {
                    surface.stop_all(&indicator);
                }
            },
            _ = attach.tick() => {
                for el in surface.attach(&session) {
                    let item = FeedItem::resolve(el, &cfg.selectors);
                    tracing::debug!(profile = %item.profile, "control attached");
                }
            }
            res = &mut ctrl_c, if !quitting => {
                if let Err(e) = res {
                    tracing::warn!("ctrl-c handler: {}", e);
                }
                quitting = true;
                surface.stop_all(&indicator);
                if running.is_none() {
                    break;
                }
            }
        }
    }

    if let Some((handle, path)) = listener {
        handle.abort();
        let _ = std::fs::remove_file(path);
    }

    let run = tally.snapshot();
    stats.stats.record_run(&run);
    stats.save();
    println!(
        "{} item(s), {} media saved ({} single-frame), {} failed, {} sink rejection(s)",
        run.items,
        run.delivered(),
        run.degraded,
        run.failed,
        run.sink_rejections
    );
    Ok(())
}

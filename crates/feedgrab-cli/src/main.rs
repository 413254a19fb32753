use clap::Parser;
use feedgrab_core::logging::{self, LogTarget};

mod cli;

use crate::cli::{Cli, CliCommand};

fn log_target(command: &CliCommand) -> anyhow::Result<LogTarget> {
    match command {
        CliCommand::Replay { session, .. } => LogTarget::for_session(session),
        _ => LogTarget::shared(),
    }
}

fn main() {
    let cli = Cli::parse();

    let logged = log_target(&cli.command).and_then(|target| logging::init_logging(&target));
    if let Err(err) = logged {
        eprintln!("feedgrab: file logging unavailable ({:#}), logging to stderr", err);
        let _ = logging::init_logging(&LogTarget::Stderr);
    }

    // Single thread: traversals only yield at timers, page handles are not Send.
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("feedgrab error: runtime: {}", err);
            std::process::exit(1);
        }
    };
    let local = tokio::task::LocalSet::new();

    if let Err(err) = local.block_on(&runtime, cli.command.run()) {
        eprintln!("feedgrab error: {:#}", err);
        std::process::exit(1);
    }
}

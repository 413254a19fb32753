//! Control socket: server (during `feedgrab replay`) and client (`feedgrab start|stop`).
//! Protocol: one command per line, "start" or "stop".

use anyhow::{Context, Result};
use feedgrab_core::surface::Command;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::mpsc::UnboundedSender;

/// Spawns a task that listens on `path` and forwards each well-formed command
/// line to `commands`. Ignores malformed lines.
pub fn spawn_control_listener(
    commands: UnboundedSender<Command>,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path).with_context(|| format!("control socket bind: {}", path.display()))?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let commands = commands.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = reader.next_line().await {
                            match line.parse::<Command>() {
                                Ok(cmd) => {
                                    if commands.send(cmd).is_err() {
                                        return;
                                    }
                                }
                                Err(e) => tracing::debug!("control socket: {}", e),
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

/// Sends "<command>\n" to the control socket.
pub async fn send_command(socket_path: &Path, command: Command) -> Result<()> {
    if !socket_path.exists() {
        anyhow::bail!("no running `feedgrab replay` (no socket at {})", socket_path.display());
    }
    let mut stream = tokio::net::UnixStream::connect(socket_path)
        .await
        .with_context(|| format!("connect {}", socket_path.display()))?;
    let msg = format!("{}\n", command);
    tokio::io::AsyncWriteExt::write_all(&mut stream, msg.as_bytes()).await?;
    Ok(())
}

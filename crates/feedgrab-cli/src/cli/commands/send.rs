//! `feedgrab start` / `feedgrab stop` – signal a running replay over the control socket.

use anyhow::Result;
use feedgrab_core::surface::Command;

use crate::cli::control_socket;

pub async fn run_send(command: Command) -> Result<()> {
    let path = feedgrab_core::control::default_control_socket_path()?;
    control_socket::send_command(&path, command).await?;
    println!("Sent {command}");
    Ok(())
}

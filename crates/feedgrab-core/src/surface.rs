//! Control surface: one start/stop affordance per feed item.
//!
//! Pressing an idle item's control starts a feed traversal from that item;
//! pressing it again while running stops it. Items are independent, each with
//! its own [`TraversalControl`](crate::control::TraversalControl).

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::config::FeedgrabConfig;
use crate::control::ControlRegistry;
use crate::dom::{Document, Element, NodeKey};
use crate::feed::{FeedDriver, FeedOutcome};
use crate::sink::DownloadSink;

/// Visual state of an item's control, rendered by the host.
pub trait Indicator {
    fn show_running(&self, item: NodeKey);
    /// Running animation tick; `glow` is the current halo size.
    fn pulse(&self, item: NodeKey, glow: u8);
    fn show_idle(&self, item: NodeKey);
}

/// Halo size of the running animation: 2, 4, .. 20, 18, .. 0, 2, ..
#[derive(Debug, Clone)]
pub struct Pulse {
    glow: u8,
    growing: bool,
}

impl Pulse {
    pub const MAX_GLOW: u8 = 20;
    const STEP: u8 = 2;

    pub fn new() -> Self {
        Self {
            glow: 0,
            growing: true,
        }
    }
}

impl Default for Pulse {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Pulse {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.glow = if self.growing {
            self.glow.saturating_add(Self::STEP)
        } else {
            self.glow.saturating_sub(Self::STEP)
        };
        if self.glow >= Self::MAX_GLOW {
            self.growing = false;
        }
        if self.glow == 0 {
            self.growing = true;
        }
        Some(self.glow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// The item was running; it has been cancelled and reset to idle.
    Stopped,
    /// The traversal ended on its own and the control was reset to idle.
    Finished(FeedOutcome),
    /// The traversal ended after its entry had been stopped or replaced;
    /// the control was left alone.
    Orphaned(FeedOutcome),
}

/// Message-style commands from outside the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start from the focused item.
    Start,
    /// Stop every active traversal.
    Stop,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Command::Start => "start",
            Command::Stop => "stop",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Pressed(PressOutcome),
    /// `start` with the focused item already running.
    AlreadyRunning(NodeKey),
    /// `start` with nothing focused.
    NoFocusedItem,
    /// `stop`; the items that were stopped.
    Stopped(Vec<NodeKey>),
}

pub struct ControlSurface {
    registry: ControlRegistry,
    attached: RwLock<HashSet<NodeKey>>,
    item_selector: String,
    pulse_interval: Duration,
}

impl ControlSurface {
    pub fn new(config: &FeedgrabConfig) -> Self {
        Self {
            registry: ControlRegistry::new(),
            attached: RwLock::new(HashSet::new()),
            item_selector: config.selectors.item.clone(),
            pulse_interval: config.surface.pulse_interval(),
        }
    }

    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    /// Ensure every rendered item has a control. Returns the items that did not
    /// have one yet. Items that left the page are forgotten so a re-mounted
    /// item gets a fresh control.
    pub fn attach<D: Document>(&self, doc: &D) -> Vec<D::Element> {
        let items = doc.select_all(&self.item_selector);
        let present: HashSet<NodeKey> = items.iter().map(|el| el.key()).collect();
        let mut attached = self.attached.write().unwrap_or_else(PoisonError::into_inner);
        attached.retain(|k| present.contains(k));
        items
            .into_iter()
            .filter(|el| attached.insert(el.key()))
            .collect()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Toggle the traversal for `item`.
    pub async fn press<D, S, I>(&self, driver: &FeedDriver<'_, D, S>, item: D::Element, indicator: &I) -> PressOutcome
    where
        D: Document,
        S: DownloadSink,
        I: Indicator,
    {
        let key = item.key();
        if self.registry.request_stop(key) {
            tracing::info!(item = key.0, "traversal stopped");
            indicator.show_idle(key);
            return PressOutcome::Stopped;
        }

        let control = self.registry.register(key);
        tracing::info!(item = key.0, "traversal started");
        indicator.show_running(key);

        let outcome = {
            let run = driver.run(item, &control);
            tokio::pin!(run);
            let mut ticker = tokio::time::interval(self.pulse_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut pulse = Pulse::new();
            loop {
                tokio::select! {
                    outcome = &mut run => break outcome,
                    _ = ticker.tick() => indicator.pulse(key, pulse.next().unwrap_or(0)),
                }
            }
        };

        if self.registry.unregister_if_current(key, &control) {
            indicator.show_idle(key);
            PressOutcome::Finished(outcome)
        } else {
            tracing::debug!(item = key.0, "traversal ended after stop or replacement");
            PressOutcome::Orphaned(outcome)
        }
    }

    /// Cancel every active traversal and reset their controls.
    pub fn stop_all<I: Indicator>(&self, indicator: &I) -> Vec<NodeKey> {
        let stopped = self.registry.request_stop_all();
        for key in &stopped {
            indicator.show_idle(*key);
        }
        if !stopped.is_empty() {
            tracing::info!(count = stopped.len(), "stopped all traversals");
        }
        stopped
    }

    pub async fn handle<D, S, I>(&self, command: Command, driver: &FeedDriver<'_, D, S>, indicator: &I) -> CommandOutcome
    where
        D: Document,
        S: DownloadSink,
        I: Indicator,
    {
        match command {
            Command::Stop => CommandOutcome::Stopped(self.stop_all(indicator)),
            Command::Start => {
                let Some(item) = driver.focused_item() else {
                    tracing::warn!("start requested with no focused item");
                    return CommandOutcome::NoFocusedItem;
                };
                let key = item.key();
                if self.registry.is_active(key) {
                    return CommandOutcome::AlreadyRunning(key);
                }
                CommandOutcome::Pressed(self.press(driver, item, indicator).await)
            }
        }
    }
}

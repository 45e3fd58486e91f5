/// Command channel: many producers → one render loop.
///
/// Unbounded `mpsc` queue. Senders never block, so a burst of updates can
/// never stall the render loop; the loop drains with `try_recv` and never
/// waits on the channel.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::domain::placement::Mode;
use crate::sim::state::Settings;

/// Optional cosmetic overrides carried by an update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    pub mode: Option<Mode>,
    pub color: Option<String>,
    pub brightness: Option<u8>,
}

impl Overrides {
    /// Fill every absent field from `defaults`.
    pub fn resolve(&self, defaults: &Settings) -> Settings {
        Settings {
            mode: self.mode.unwrap_or(defaults.mode),
            color: self.color.clone().unwrap_or_else(|| defaults.color.clone()),
            brightness: self.brightness.unwrap_or(defaults.brightness),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Update { text: String, overrides: Overrides },
    Clear,
}

/// The render loop has gone away; nothing will consume this command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Disconnected;

#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    pub fn send(&self, cmd: Command) -> Result<(), Disconnected> {
        self.tx.send(cmd).map_err(|_| Disconnected)
    }
}

pub struct CommandReceiver {
    rx: Receiver<Command>,
}

/// Everything that was pending at drain time, in arrival order.
#[derive(Debug, Default)]
pub struct Drained {
    pub commands: Vec<Command>,
    /// All senders are gone; no further commands can arrive.
    pub disconnected: bool,
}

impl CommandReceiver {
    /// Non-blocking: take whatever is queued right now.
    pub fn drain(&self) -> Drained {
        let mut out = Drained::default();
        loop {
            match self.rx.try_recv() {
                Ok(cmd) => out.commands.push(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    out.disconnected = true;
                    break;
                }
            }
        }
        out
    }
}

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel();
    (CommandSender { tx }, CommandReceiver { rx })
}

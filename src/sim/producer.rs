/// Producer handle: the only way content reaches the display.
///
/// Validation happens here, on the caller's thread, before anything is
/// queued. A caller (an HTTP handler, a script feed) gets a synchronous
/// yes/no; the render loop only ever sees commands that already passed.

use std::fmt;
use std::sync::Arc;

use crate::domain::raster::{RasterError, Rasterizer};
use crate::sim::command::{Command, CommandSender, Overrides};
use crate::ui::palette::Palette;

/// Shown by `show_summary`.
pub const SUMMARY_TEXT: &str = "Open LED Badge - Free, hackable, and fun! :star: :heart:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The display string itself is bad (icon, character, asset).
    Validation(RasterError),
    /// A cosmetic override is out of range or unknown.
    InvalidOverride(String),
    /// The render loop is gone.
    Disconnected,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Validation(e) => write!(f, "invalid display string format: {e}"),
            SubmitError::InvalidOverride(msg) => write!(f, "invalid display option: {msg}"),
            SubmitError::Disconnected => write!(f, "display is not running"),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RasterError> for SubmitError {
    fn from(e: RasterError) -> Self {
        SubmitError::Validation(e)
    }
}

#[derive(Clone)]
pub struct Producer {
    rasterizer: Arc<dyn Rasterizer>,
    palette: Arc<Palette>,
    tx: CommandSender,
}

impl Producer {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, palette: Arc<Palette>, tx: CommandSender) -> Self {
        Producer { rasterizer, palette, tx }
    }

    /// Check `text` and `overrides` exactly as the render loop will.
    pub fn validate(&self, text: &str, overrides: &Overrides) -> Result<(), SubmitError> {
        if let Some(color) = &overrides.color {
            if !self.palette.contains(color) {
                let known: Vec<&str> = self.palette.names().collect();
                return Err(SubmitError::InvalidOverride(format!(
                    "unknown color {color:?} (known: {})",
                    known.join(", ")
                )));
            }
        }
        if let Some(b) = overrides.brightness {
            if b > 100 {
                return Err(SubmitError::InvalidOverride(format!("brightness {b} is above 100")));
            }
        }
        self.rasterizer.rasterize(text)?;
        Ok(())
    }

    pub fn enqueue_update(&self, text: &str, overrides: Overrides) -> Result<(), SubmitError> {
        self.validate(text, &overrides)?;
        self.tx
            .send(Command::Update { text: text.to_string(), overrides })
            .map_err(|_| SubmitError::Disconnected)
    }

    pub fn enqueue_clear(&self) -> Result<(), SubmitError> {
        self.tx.send(Command::Clear).map_err(|_| SubmitError::Disconnected)
    }

    /// Every builtin icon as a ready-to-use `:name:` token.
    pub fn predefined_icons(&self) -> Vec<String> {
        self.rasterizer
            .icon_names()
            .into_iter()
            .map(|name| format!(":{name}:"))
            .collect()
    }

    pub fn show_summary(&self) -> Result<(), SubmitError> {
        self.enqueue_update(SUMMARY_TEXT, Overrides::default())
    }
}

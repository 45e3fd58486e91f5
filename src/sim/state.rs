/// DisplayState: what the badge currently shows.
///
/// ## Ownership
///
/// The render loop owns the one mutable `DisplayState` and is its only
/// writer. Everyone else reads through a `StateView`, which hands out
/// immutable `Arc` snapshots; the lock is held only to swap the pointer.
///
/// ## Invariants
///   - `width == 0` ⇔ `text == ""`
///   - every text update resets `scroll_position` to 0
///   - `0 <= scroll_position <= width + viewport`

use std::sync::{Arc, RwLock};

use crate::domain::grid::PixelGrid;
use crate::domain::placement::Mode;

/// Cosmetic settings applied by an update. Every field is always set: an
/// update never inherits a stale value from the previous one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,
    pub color: String,
    pub brightness: u8,
}

/// Result of one scroll advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollStep {
    Idle,
    Advanced,
    Wrapped,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub text: String,
    /// Decoded pixels. Replaced wholesale, never mutated.
    pub grid: Arc<PixelGrid>,
    pub width: usize,
    pub mode: Mode,
    pub scroll_position: usize,
    pub running: bool,
    pub color: String,
    pub brightness: u8,
}

impl DisplayState {
    pub fn new(defaults: &Settings) -> Self {
        DisplayState {
            text: String::new(),
            grid: Arc::new(PixelGrid::empty()),
            width: 0,
            mode: defaults.mode,
            scroll_position: 0,
            running: false,
            color: defaults.color.clone(),
            brightness: defaults.brightness,
        }
    }

    /// Install a freshly decoded grid for `text`.
    /// A grid with no columns leaves the display idle.
    pub fn apply_update(&mut self, text: &str, grid: PixelGrid, settings: Settings) {
        self.mode = settings.mode;
        self.color = settings.color;
        self.brightness = settings.brightness;

        if grid.width() == 0 {
            self.clear();
            return;
        }

        self.text = text.to_string();
        self.width = grid.width();
        self.grid = Arc::new(grid);
        self.scroll_position = 0;
        self.running = true;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.grid = Arc::new(PixelGrid::empty());
        self.width = 0;
        self.scroll_position = 0;
        self.running = false;
    }

    pub fn is_idle(&self) -> bool {
        !self.running || self.text.is_empty()
    }

    /// Advance the scroll by one column; past `width + viewport` the cycle
    /// restarts at 0.
    pub fn advance_scroll(&mut self, viewport: usize) -> ScrollStep {
        if self.is_idle() {
            return ScrollStep::Idle;
        }
        self.scroll_position += 1;
        if self.scroll_position > self.width + viewport {
            self.scroll_position = 0;
            ScrollStep::Wrapped
        } else {
            ScrollStep::Advanced
        }
    }
}

// ── StateView ──

/// Read handle onto the published display state.
#[derive(Clone)]
pub struct StateView {
    current: Arc<RwLock<Arc<DisplayState>>>,
}

impl StateView {
    pub fn new(initial: &DisplayState) -> Self {
        StateView { current: Arc::new(RwLock::new(Arc::new(initial.clone()))) }
    }

    /// Snapshot-consistent copy of the last published state.
    pub fn snapshot(&self) -> Arc<DisplayState> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Publish a new state. Only the render loop calls this.
    pub(crate) fn publish(&self, state: &DisplayState) {
        let next = Arc::new(state.clone());
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = next;
    }
}

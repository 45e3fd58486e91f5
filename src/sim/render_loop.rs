/// Render loop: the fixed-tick animation scheduler.
///
/// ```text
///   every tick_rate:
///     drain commands (non-blocking)  ─┐
///     advance scroll if animating     ├─ sim::step
///     changed? → publish + paint      ┘
///     sleep until the next tick boundary
/// ```
///
/// The sleep is the loop's only suspension point. It never waits on the
/// command channel, so the animation keeps running with nothing queued.
/// Deadlines are absolute: a slow paint shortens the next sleep instead of
/// drifting the cadence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::domain::raster::Rasterizer;
use crate::sim::command::CommandReceiver;
use crate::sim::event::DisplayEvent;
use crate::sim::state::{DisplayState, Settings, StateView};
use crate::sim::step::{self, TickOutcome};
use crate::ui::surface::{self, PixelSurface};

/// Cooperative stop flag, checked once per tick.
#[derive(Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        StopSignal::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Stop on behalf of something outside the loop (signal, quit key).
    pub fn request_shutdown(&self, reason: &str) {
        log::info!("shutdown requested: {reason}");
        self.stop();
    }

    /// Raise this signal on SIGINT and SIGTERM. Once per process.
    pub fn stop_on_shutdown(&self) -> anyhow::Result<()> {
        let stop = self.clone();
        ctrlc::set_handler(move || stop.request_shutdown("termination signal"))
            .context("installing signal handler")
    }
}

/// Consecutive failed frames tolerated before the loop gives up.
pub const MAX_PRESENT_FAILURES: u32 = 20;

/// Totals reported when the loop exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames: u64,
}

pub struct RenderLoop {
    state: DisplayState,
    commands: CommandReceiver,
    rasterizer: Arc<dyn Rasterizer>,
    defaults: Settings,
    viewport: usize,
    tick_rate: Duration,
    view: StateView,
    stop: StopSignal,
    max_ticks: Option<u64>,
    summary: RunSummary,
    present_failures: u32,
}

impl RenderLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: DisplayState,
        commands: CommandReceiver,
        rasterizer: Arc<dyn Rasterizer>,
        defaults: Settings,
        viewport: usize,
        tick_rate: Duration,
        view: StateView,
        stop: StopSignal,
    ) -> Self {
        RenderLoop {
            state,
            commands,
            rasterizer,
            defaults,
            viewport,
            tick_rate,
            view,
            stop,
            max_ticks: None,
            summary: RunSummary::default(),
            present_failures: 0,
        }
    }

    /// Stop on its own after `ticks` ticks.
    pub fn set_max_ticks(&mut self, ticks: Option<u64>) {
        self.max_ticks = ticks;
    }

    #[cfg(test)]
    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Paint the current state unconditionally (first frame, redraw on demand).
    fn repaint(&mut self, surface: &mut dyn PixelSurface) -> anyhow::Result<()> {
        surface::paint(surface, &self.state, self.viewport)?;
        self.summary.frames += 1;
        Ok(())
    }

    /// Paint, tolerating up to `MAX_PRESENT_FAILURES` failures in a row.
    /// A dropped frame is logged and the next change repaints anyway.
    fn present(&mut self, surface: &mut dyn PixelSurface) -> anyhow::Result<()> {
        match self.repaint(surface) {
            Ok(()) => {
                self.present_failures = 0;
                Ok(())
            }
            Err(e) => {
                self.present_failures += 1;
                if self.present_failures >= MAX_PRESENT_FAILURES {
                    return Err(e.context(format!("{} frames in a row failed", self.present_failures)));
                }
                log::warn!("frame dropped: {e:#}");
                Ok(())
            }
        }
    }

    /// One tick without the sleep: drain, step, publish and paint on change.
    pub fn tick(&mut self, surface: &mut dyn PixelSurface) -> anyhow::Result<TickOutcome> {
        let drained = self.commands.drain();
        if drained.disconnected && !drained.commands.is_empty() {
            log::debug!("producers gone; applying final {} command(s)", drained.commands.len());
        }

        let outcome = step::step(
            &mut self.state,
            drained.commands,
            self.rasterizer.as_ref(),
            &self.defaults,
            self.viewport,
        );
        self.summary.ticks += 1;

        for event in &outcome.events {
            log_event(event);
        }

        if outcome.changed {
            self.view.publish(&self.state);
            self.present(surface)?;
        }

        Ok(outcome)
    }

    /// Run until stopped (or the tick budget runs out).
    pub fn run(&mut self, surface: &mut dyn PixelSurface) -> anyhow::Result<RunSummary> {
        log::info!(
            "render loop started: tick {:?}, viewport {} columns",
            self.tick_rate,
            self.viewport
        );
        self.present(surface)?;

        let mut next_tick = Instant::now() + self.tick_rate;
        loop {
            if self.stop.is_stopped() {
                break;
            }

            self.tick(surface)?;

            if self.max_ticks.is_some_and(|max| self.summary.ticks >= max) {
                break;
            }

            let now = Instant::now();
            if next_tick > now {
                std::thread::sleep(next_tick - now);
                next_tick += self.tick_rate;
            } else {
                log::trace!("tick overran by {:?}", now - next_tick);
                next_tick = now + self.tick_rate;
            }
        }

        log::info!(
            "render loop stopped after {} ticks, {} frames",
            self.summary.ticks,
            self.summary.frames
        );
        Ok(self.summary)
    }
}

fn log_event(event: &DisplayEvent) {
    match event {
        DisplayEvent::Updated { text, width, lit } => {
            log::debug!("display updated: {text:?} ({width} columns, {lit} lit)")
        }
        DisplayEvent::Cleared => log::debug!("display cleared"),
        DisplayEvent::Blanked => log::debug!("update had nothing to show; display idle"),
        DisplayEvent::RasterFailed { text, error } => {
            log::warn!("keeping previous frame, could not rasterize {text:?}: {error}")
        }
        DisplayEvent::ScrollWrapped => log::trace!("scroll cycle restarted"),
    }
}

/// Session wiring: one channel, one state, one loop, any number of producers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::BadgeConfig;
use crate::domain::raster::Rasterizer;
use crate::sim::command::command_channel;
use crate::sim::producer::Producer;
use crate::sim::render_loop::{RenderLoop, StopSignal};
use crate::sim::state::{DisplayState, StateView};

pub struct Session {
    pub producer: Producer,
    pub view: StateView,
    pub render_loop: RenderLoop,
    pub stop: StopSignal,
}

impl Session {
    pub fn new(config: &BadgeConfig, rasterizer: Arc<dyn Rasterizer>) -> Self {
        let defaults = config.display.settings();
        let (tx, rx) = command_channel();
        let state = DisplayState::new(&defaults);
        let view = StateView::new(&state);
        let stop = StopSignal::new();

        let producer = Producer::new(rasterizer.clone(), Arc::new(config.palette.clone()), tx);
        let render_loop = RenderLoop::new(
            state,
            rx,
            rasterizer,
            defaults,
            config.display.viewport_width,
            Duration::from_millis(config.display.tick_rate_ms),
            view.clone(),
            stop.clone(),
        );

        log::info!(
            "session ready: {} columns, {} ms tick, default color {}",
            config.display.viewport_width,
            config.display.tick_rate_ms,
            config.display.default_color
        );
        Session { producer, view, render_loop, stop }
    }
}

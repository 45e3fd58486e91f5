/// Entry point: wire config, producers and a surface around the render loop.

mod cli;
mod config;
mod domain;
mod feed;
mod sim;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use cli::Args;
use config::BadgeConfig;
use domain::placement::Mode;
use domain::raster::{BadgeRasterizer, Rasterizer};
use feed::{expand_escapes, spawn_feed, FeedSource};
use sim::command::Overrides;
use sim::render_loop::{RenderLoop, RunSummary, StopSignal};
use sim::session::Session;
use ui::input;
use ui::palette::Palette;
use ui::plain::PlainSurface;
use ui::terminal::TerminalSurface;

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("ledbadge-sim: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut config = BadgeConfig::load(args.config.as_deref())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter.as_str())).init();
    if let Some(path) = &config.source {
        log::info!("config loaded from {}", path.display());
    }
    for warning in &config.warnings {
        log::warn!("config: {warning}");
    }

    if args.static_mode {
        config.display.default_mode = Mode::Static;
    }

    let rasterizer: Arc<dyn Rasterizer> = Arc::new(BadgeRasterizer::new(config.images_dir.clone()));
    let Session { producer, view, mut render_loop, stop } = Session::new(&config, rasterizer);
    render_loop.set_max_ticks(args.ticks);
    stop.stop_on_shutdown()?;

    if args.list_icons {
        println!("{}", producer.predefined_icons().join(" "));
        return Ok(());
    }

    if let Some(text) = &args.text {
        producer
            .enqueue_update(&expand_escapes(text), Overrides::default())
            .context("--text rejected")?;
    }

    let source = match (&args.script, args.plain) {
        (Some(path), _) => Some(FeedSource::Script(path.clone())),
        (None, true) => Some(FeedSource::Stdin),
        (None, false) => None,
    };
    let feed = source.map(|s| spawn_feed(s, producer.clone(), stop.clone()));

    let result = if args.plain {
        run_plain(&mut render_loop, config.display.viewport_width)
    } else {
        run_terminal(&mut render_loop, &config.palette, &stop)
    };
    stop.stop();

    // A stdin feed may still be blocked on a read; only collect finished ones.
    if let Some(handle) = feed.filter(|h| h.is_finished()) {
        match handle.join() {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => eprintln!("ledbadge-sim: feed stopped: {e:#}"),
            Err(_) => log::error!("feed thread panicked"),
        }
    }

    let summary = result?;
    let last = view.snapshot();
    if !args.plain {
        println!(
            "Last shown: {:?} ({} ticks, {} frames)",
            last.text, summary.ticks, summary.frames
        );
    }
    Ok(())
}

fn run_plain(render_loop: &mut RenderLoop, viewport: usize) -> anyhow::Result<RunSummary> {
    let mut surface = PlainSurface::new(std::io::stdout(), viewport);
    render_loop.run(&mut surface)
}

fn run_terminal(render_loop: &mut RenderLoop, palette: &Palette, stop: &StopSignal) -> anyhow::Result<RunSummary> {
    let mut surface = TerminalSurface::new(palette.clone());
    surface.init()?;

    let watcher = input::spawn_quit_watcher(stop.clone());
    let result = render_loop.run(&mut surface);
    stop.stop();
    if watcher.join().is_err() {
        log::error!("quit watcher panicked");
    }

    let cleanup = surface.cleanup();
    let summary = result?;
    cleanup?;
    Ok(summary)
}

/// Line-oriented feed: drives a producer from a script file or stdin.
///
/// One directive per line:
///
/// ```text
/// # comment                 ignored, as are blank lines
/// !clear                    blank the badge
/// !wait 1500                pause the feed (ms)
/// !summary                  show the project summary
/// !static Hello             centred, no scrolling
/// !mode left Hello          explicit mode (`left` or `static`)
/// !color green Hello        one-off colour
/// !dim Hello                one-off low brightness
/// Hi\n:heart:               anything else: display text, `\n` escapes expanded
/// ```
///
/// Bad lines are logged and skipped; the feed keeps going.

use std::fmt;
use std::io::BufRead;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::domain::placement::Mode;
use crate::sim::command::Overrides;
use crate::sim::producer::{Producer, SubmitError};
use crate::sim::render_loop::StopSignal;

/// Brightness used by `!dim`.
pub const DIM_BRIGHTNESS: u8 = 30;

/// Granularity at which `!wait` notices a stop request.
const WAIT_SLICE: Duration = Duration::from_millis(25);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    Skip,
    Clear,
    Wait(Duration),
    Summary,
    Show { text: String, overrides: Overrides },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveError(String);

impl fmt::Display for DirectiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DirectiveError {}

/// Expand `\n` and `\\`; any other backslash is kept as written.
pub fn expand_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                chars.next();
                out.push('\n');
            }
            Some('\\') => {
                chars.next();
                out.push('\\');
            }
            _ => out.push('\\'),
        }
    }
    out
}

pub fn parse_line(line: &str) -> Result<Directive, DirectiveError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Directive::Skip);
    }

    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim_start()),
        None => (trimmed, ""),
    };

    let show = |text: &str, overrides: Overrides| -> Result<Directive, DirectiveError> {
        if text.is_empty() {
            return Err(DirectiveError(format!("{head} needs some text")));
        }
        Ok(Directive::Show { text: expand_escapes(text), overrides })
    };

    match head {
        "!clear" => Ok(Directive::Clear),
        "!summary" => Ok(Directive::Summary),
        "!wait" => rest
            .parse::<u64>()
            .map(|ms| Directive::Wait(Duration::from_millis(ms)))
            .map_err(|_| DirectiveError(format!("!wait expects milliseconds, got {rest:?}"))),
        "!static" => show(rest, Overrides { mode: Some(Mode::Static), ..Overrides::default() }),
        "!dim" => show(rest, Overrides { brightness: Some(DIM_BRIGHTNESS), ..Overrides::default() }),
        "!mode" => {
            let (name, text) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| DirectiveError("!mode expects a mode and text".into()))?;
            let mode = Mode::parse(name).ok_or_else(|| DirectiveError(format!("unknown mode {name:?}")))?;
            show(text.trim_start(), Overrides { mode: Some(mode), ..Overrides::default() })
        }
        "!color" => {
            let (name, text) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| DirectiveError("!color expects a colour name and text".into()))?;
            show(text.trim_start(), Overrides { color: Some(name.to_string()), ..Overrides::default() })
        }
        _ => Ok(Directive::Show { text: expand_escapes(line), overrides: Overrides::default() }),
    }
}

/// Lines taken and refused by a feed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// Feed every line of `reader` to `producer` until EOF, a stop request or a
/// disconnected display.
pub fn run_feed(reader: impl BufRead, producer: &Producer, stop: &StopSignal) -> anyhow::Result<FeedSummary> {
    let mut summary = FeedSummary::default();

    for (n, line) in reader.lines().enumerate() {
        if stop.is_stopped() {
            break;
        }
        let line = line.with_context(|| format!("reading feed line {}", n + 1))?;

        let directive = match parse_line(&line) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("line {}: {e}", n + 1);
                summary.rejected += 1;
                continue;
            }
        };

        let result = match directive {
            Directive::Skip => continue,
            Directive::Wait(d) => {
                wait(d, stop);
                continue;
            }
            Directive::Clear => producer.enqueue_clear(),
            Directive::Summary => producer.show_summary(),
            Directive::Show { text, overrides } => producer.enqueue_update(&text, overrides),
        };

        match result {
            Ok(()) => summary.accepted += 1,
            Err(SubmitError::Disconnected) => {
                log::debug!("display gone, feed stopping at line {}", n + 1);
                break;
            }
            Err(e) => {
                log::warn!("line {}: {e}", n + 1);
                summary.rejected += 1;
            }
        }
    }

    log::info!("feed finished: {} accepted, {} rejected", summary.accepted, summary.rejected);
    Ok(summary)
}

fn wait(d: Duration, stop: &StopSignal) {
    let until = Instant::now() + d;
    while !stop.is_stopped() {
        let now = Instant::now();
        if now >= until {
            break;
        }
        thread::sleep((until - now).min(WAIT_SLICE));
    }
}

pub enum FeedSource {
    Script(PathBuf),
    Stdin,
}

pub fn spawn_feed(source: FeedSource, producer: Producer, stop: StopSignal) -> JoinHandle<anyhow::Result<FeedSummary>> {
    thread::spawn(move || match source {
        FeedSource::Script(path) => {
            let file = std::fs::File::open(&path).with_context(|| format!("opening script {}", path.display()))?;
            run_feed(std::io::BufReader::new(file), &producer, &stop)
        }
        FeedSource::Stdin => run_feed(std::io::stdin().lock(), &producer, &stop),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::raster::BadgeRasterizer;
    use crate::sim::command::{command_channel, Command, CommandReceiver};
    use crate::sim::producer::SUMMARY_TEXT;
    use crate::ui::palette::Palette;

    fn producer() -> (Producer, CommandReceiver) {
        let (tx, rx) = command_channel();
        let p = Producer::new(
            Arc::new(BadgeRasterizer::new(std::env::temp_dir())),
            Arc::new(Palette::builtin()),
            tx,
        );
        (p, rx)
    }

    fn show(text: &str, overrides: Overrides) -> Directive {
        Directive::Show { text: text.into(), overrides }
    }

    #[test]
    fn escapes() {
        assert_eq!(expand_escapes(r"Hi\nthere"), "Hi\nthere");
        assert_eq!(expand_escapes(r"a\\nb"), r"a\nb");
        assert_eq!(expand_escapes(r"trailing\"), r"trailing\");
        assert_eq!(expand_escapes(r"\t"), r"\t");
    }

    #[test]
    fn directives() {
        assert_eq!(parse_line("").unwrap(), Directive::Skip);
        assert_eq!(parse_line("   # note").unwrap(), Directive::Skip);
        assert_eq!(parse_line("!clear").unwrap(), Directive::Clear);
        assert_eq!(parse_line("!summary").unwrap(), Directive::Summary);
        assert_eq!(parse_line("!wait 250").unwrap(), Directive::Wait(Duration::from_millis(250)));
        assert_eq!(
            parse_line("!static Hi :heart:").unwrap(),
            show("Hi :heart:", Overrides { mode: Some(Mode::Static), ..Overrides::default() })
        );
        assert_eq!(
            parse_line("!color green Go  now").unwrap(),
            show("Go  now", Overrides { color: Some("green".into()), ..Overrides::default() })
        );
        assert_eq!(
            parse_line("!mode left Hi").unwrap(),
            show("Hi", Overrides { mode: Some(Mode::LeftScroll), ..Overrides::default() })
        );
        assert_eq!(
            parse_line("!dim night").unwrap(),
            show("night", Overrides { brightness: Some(DIM_BRIGHTNESS), ..Overrides::default() })
        );
    }

    #[test]
    fn plain_text_keeps_spacing() {
        assert_eq!(parse_line("  Hello\\nWorld ").unwrap(), show("  Hello\nWorld ", Overrides::default()));
        assert_eq!(parse_line("!wow").unwrap(), show("!wow", Overrides::default()));
    }

    #[test]
    fn malformed_directives() {
        assert!(parse_line("!wait soon").is_err());
        assert!(parse_line("!color green").is_err());
        assert!(parse_line("!static").is_err());
        assert!(parse_line("!mode bounce Hi").is_err());
    }

    #[test_log::test]
    fn feed_skips_bad_lines_and_continues() {
        let (p, rx) = producer();
        let script = "# demo\nHello\n!wait 1\nBad :nope:\n!wait x\n!color mauve Hi\n!summary\n!clear\n";
        let summary = run_feed(script.as_bytes(), &p, &StopSignal::new()).unwrap();

        assert_eq!(summary, FeedSummary { accepted: 3, rejected: 3 });
        let cmds = rx.drain().commands;
        assert_eq!(cmds.len(), 3);
        assert!(matches!(&cmds[0], Command::Update { text, .. } if text == "Hello"));
        assert!(matches!(&cmds[1], Command::Update { text, .. } if text == SUMMARY_TEXT));
        assert_eq!(cmds[2], Command::Clear);
    }

    #[test]
    fn feed_halts_when_stopped() {
        let (p, rx) = producer();
        let stop = StopSignal::new();
        stop.stop();
        let summary = run_feed("one\ntwo\n".as_bytes(), &p, &stop).unwrap();
        assert_eq!(summary, FeedSummary::default());
        assert!(rx.drain().commands.is_empty());
    }

    #[test]
    fn feed_halts_when_display_gone() {
        let (p, rx) = producer();
        drop(rx);
        let summary = run_feed("one\ntwo\n".as_bytes(), &p, &StopSignal::new()).unwrap();
        assert_eq!(summary.accepted, 0);
    }

    #[test]
    fn script_file_feed() {
        let (p, rx) = producer();
        let path = std::env::temp_dir().join(format!("ledbadge-script-{}.txt", std::process::id()));
        std::fs::write(&path, "!static Hi\n").unwrap();
        let summary = spawn_feed(FeedSource::Script(path.clone()), p, StopSignal::new()).join().unwrap().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(summary.accepted, 1);
        assert_eq!(rx.drain().commands.len(), 1);
    }

    #[test]
    fn missing_script_is_an_error() {
        let (p, _rx) = producer();
        let path = std::env::temp_dir().join("ledbadge-no-such-script.txt");
        assert!(spawn_feed(FeedSource::Script(path), p, StopSignal::new()).join().unwrap().is_err());
    }
}

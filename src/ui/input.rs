/// Quit-key watcher for the terminal view.
///
/// The render loop never blocks on input, so keys are read on their own
/// thread: poll with a short timeout, and on q / Esc / Ctrl+C raise the
/// loop's stop signal. The watcher also exits once the loop has stopped for
/// any other reason.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::render_loop::StopSignal;

const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Does this key end the session?
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('C') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub fn spawn_quit_watcher(stop: StopSignal) -> JoinHandle<()> {
    thread::spawn(move || {
        while !stop.is_stopped() {
            match poll(POLL_TIMEOUT) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if is_quit_key(&key) => stop.request_shutdown("quit key"),
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("terminal input error: {e}");
                        stop.stop();
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    log::warn!("terminal poll error: {e}");
                    stop.stop();
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit_key(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
        assert!(is_quit_key(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn other_keys_ignored() {
        assert!(!is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&key(KeyCode::Enter, KeyModifiers::NONE)));
        let mut release = key(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!is_quit_key(&release));
    }
}

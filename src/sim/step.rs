/// One render-loop tick, minus the clock and the painting.
///
/// Order per tick:
///   1. Apply drained commands in arrival order (last writer wins)
///   2. Advance the scroll if animating
///   3. Report whether anything changed so the caller knows to repaint

use crate::domain::raster::Rasterizer;
use crate::sim::command::Command;
use crate::sim::event::DisplayEvent;
use crate::sim::state::{DisplayState, ScrollStep, Settings};

#[derive(Debug, Default)]
pub struct TickOutcome {
    pub changed: bool,
    pub events: Vec<DisplayEvent>,
}

/// Apply one command. Returns true if the state changed.
///
/// A rasterization failure here leaves the state untouched: the previous
/// grid keeps showing.
pub fn apply_command(
    state: &mut DisplayState,
    cmd: Command,
    rasterizer: &dyn Rasterizer,
    defaults: &Settings,
    events: &mut Vec<DisplayEvent>,
) -> bool {
    match cmd {
        Command::Update { text, overrides } => match rasterizer.rasterize(&text) {
            Ok(buffer) => {
                let blank = buffer.is_empty();
                state.apply_update(&text, buffer.decode(), overrides.resolve(defaults));
                if blank {
                    events.push(DisplayEvent::Blanked);
                } else {
                    let lit = state.grid.lit_count();
                    events.push(DisplayEvent::Updated { text, width: state.width, lit });
                }
                true
            }
            Err(error) => {
                events.push(DisplayEvent::RasterFailed { text, error });
                false
            }
        },
        Command::Clear => {
            state.clear();
            events.push(DisplayEvent::Cleared);
            true
        }
    }
}

pub fn step(
    state: &mut DisplayState,
    commands: Vec<Command>,
    rasterizer: &dyn Rasterizer,
    defaults: &Settings,
    viewport: usize,
) -> TickOutcome {
    let mut out = TickOutcome::default();

    for cmd in commands {
        if apply_command(state, cmd, rasterizer, defaults, &mut out.events) {
            out.changed = true;
        }
    }

    match state.advance_scroll(viewport) {
        ScrollStep::Idle => {}
        ScrollStep::Advanced => out.changed = true,
        ScrollStep::Wrapped => {
            out.changed = true;
            out.events.push(DisplayEvent::ScrollWrapped);
        }
    }

    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::grid::{RasterBuffer, ROWS};
    use crate::domain::placement::Mode;
    use crate::domain::raster::RasterError;
    use crate::sim::command::Overrides;

    /// One lit column group per character; `!` fails as unsupported.
    pub(crate) struct BlockRasterizer;

    impl Rasterizer for BlockRasterizer {
        fn rasterize(&self, text: &str) -> Result<RasterBuffer, RasterError> {
            if let Some(c) = text.chars().find(|c| *c == '!') {
                return Err(RasterError::UnsupportedCharacter(c));
            }
            let groups: Vec<[u8; ROWS]> = text.chars().filter(|c| *c != '\n').map(|_| [0xFF; ROWS]).collect();
            Ok(RasterBuffer::from_groups(&groups))
        }

        fn icon_names(&self) -> Vec<String> {
            vec!["heart".into()]
        }
    }

    pub(crate) fn defaults() -> Settings {
        Settings { mode: Mode::LeftScroll, color: "red".into(), brightness: 100 }
    }

    fn update(text: &str) -> Command {
        Command::Update { text: text.into(), overrides: Overrides::default() }
    }

    #[test]
    fn updates_coalesce_to_last() {
        let mut s = DisplayState::new(&defaults());
        let out = step(&mut s, vec![update("A"), update("B")], &BlockRasterizer, &defaults(), 44);

        assert!(out.changed);
        assert_eq!(s.text, "B");
        assert_eq!(s.width, 8);
        // Reset to 0 by the update, then advanced once by this tick.
        assert_eq!(s.scroll_position, 1);
    }

    #[test]
    fn idle_tick_changes_nothing() {
        let mut s = DisplayState::new(&defaults());
        let out = step(&mut s, Vec::new(), &BlockRasterizer, &defaults(), 44);
        assert!(!out.changed);
        assert!(out.events.is_empty());
    }

    #[test]
    fn animating_tick_advances() {
        let mut s = DisplayState::new(&defaults());
        step(&mut s, vec![update("AB")], &BlockRasterizer, &defaults(), 44);
        let out = step(&mut s, Vec::new(), &BlockRasterizer, &defaults(), 44);
        assert!(out.changed);
        assert_eq!(s.scroll_position, 2);
    }

    #[test]
    fn clear_after_update_is_idle() {
        let mut s = DisplayState::new(&defaults());
        let out = step(&mut s, vec![update("AB"), Command::Clear], &BlockRasterizer, &defaults(), 44);
        assert!(out.changed);
        assert_eq!(s.width, 0);
        assert_eq!(s.scroll_position, 0);
        assert!(!s.running);
        assert_eq!(out.events.last(), Some(&DisplayEvent::Cleared));
    }

    #[test]
    fn failed_rasterization_keeps_previous_grid() {
        let mut s = DisplayState::new(&defaults());
        step(&mut s, vec![update("AB")], &BlockRasterizer, &defaults(), 44);
        let grid_before = s.grid.clone();

        let out = step(&mut s, vec![update("oops!")], &BlockRasterizer, &defaults(), 44);
        assert_eq!(s.text, "AB");
        assert!(std::sync::Arc::ptr_eq(&s.grid, &grid_before));
        assert_eq!(s.scroll_position, 2);
        assert!(matches!(
            out.events.first(),
            Some(DisplayEvent::RasterFailed { error: RasterError::UnsupportedCharacter('!'), .. })
        ));
    }

    #[test]
    fn wrap_emits_event() {
        let mut s = DisplayState::new(&defaults());
        step(&mut s, vec![update("A")], &BlockRasterizer, &defaults(), 44);
        s.scroll_position = s.width + 44;

        let out = step(&mut s, Vec::new(), &BlockRasterizer, &defaults(), 44);
        assert_eq!(s.scroll_position, 0);
        assert_eq!(out.events, vec![DisplayEvent::ScrollWrapped]);
    }

    #[test]
    fn overrides_applied_and_not_sticky() {
        let mut s = DisplayState::new(&defaults());
        let styled = Command::Update {
            text: "A".into(),
            overrides: Overrides { mode: Some(Mode::Static), color: Some("blue".into()), brightness: Some(20) },
        };
        step(&mut s, vec![styled], &BlockRasterizer, &defaults(), 44);
        assert_eq!((s.mode, s.color.as_str(), s.brightness), (Mode::Static, "blue", 20));

        step(&mut s, vec![update("B")], &BlockRasterizer, &defaults(), 44);
        assert_eq!((s.mode, s.color.as_str(), s.brightness), (Mode::LeftScroll, "red", 100));
    }
}

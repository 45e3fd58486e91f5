/// Presentation surface: the seam between the simulation and a backend.
///
/// A backend implements `set_pixel` and `present_frame`; `paint` walks the
/// viewport with the shared placement rules and feeds it. Backends never
/// compute placement themselves, so every surface shows the same pixels.

use crate::domain::grid::ROWS;
use crate::domain::placement::{self, Mode};
use crate::sim::state::DisplayState;

/// Per-frame context handed to a surface before its pixels.
#[derive(Clone, Copy, Debug)]
pub struct FrameInfo<'a> {
    pub text: &'a str,
    pub color: &'a str,
    pub mode: Mode,
    pub scroll_position: usize,
}

pub trait PixelSurface {
    fn begin_frame(&mut self, _frame: &FrameInfo<'_>) {}

    fn set_pixel(&mut self, row: usize, col: usize, on: bool, brightness: u8);

    fn present_frame(&mut self) -> anyhow::Result<()>;
}

/// Paint `state` onto `surface` and present it.
pub fn paint(surface: &mut dyn PixelSurface, state: &DisplayState, viewport: usize) -> anyhow::Result<()> {
    surface.begin_frame(&FrameInfo {
        text: &state.text,
        color: &state.color,
        mode: state.mode,
        scroll_position: state.scroll_position,
    });

    for row in 0..ROWS {
        for col in 0..viewport {
            let on = placement::pixel_on(&state.grid, state.mode, row, col, state.scroll_position, viewport);
            surface.set_pixel(row, col, on, state.brightness);
        }
    }

    surface.present_frame()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::RasterBuffer;
    use crate::sim::state::Settings;
    use crate::ui::plain::PlainSurface;
    use crate::ui::palette::LedLevel;

    fn settings(mode: Mode, brightness: u8) -> Settings {
        Settings { mode, color: "red".into(), brightness }
    }

    fn lit_state(groups: usize, mode: Mode, brightness: u8) -> DisplayState {
        let mut s = DisplayState::new(&settings(mode, brightness));
        let grid = RasterBuffer::from_groups(&vec![[0xFF; ROWS]; groups]).decode();
        s.apply_update("XY", grid, settings(mode, brightness));
        s
    }

    fn lit_columns(surface: &PlainSurface<Vec<u8>>) -> Vec<usize> {
        let frame = surface.last_frame();
        (0..frame[0].len()).filter(|c| frame[0][*c] != LedLevel::Off).collect()
    }

    #[test]
    fn static_frame_is_centred() {
        let mut surface = PlainSurface::new(Vec::new(), 44);
        paint(&mut surface, &lit_state(2, Mode::Static, 100), 44).unwrap();

        assert_eq!(lit_columns(&surface), (14..30).collect::<Vec<_>>());
        assert_eq!(surface.frames_presented(), 1);
    }

    #[test]
    fn scrolling_frame_enters_from_right() {
        let mut state = lit_state(1, Mode::LeftScroll, 100);
        state.scroll_position = 3;
        let mut surface = PlainSurface::new(Vec::new(), 44);
        paint(&mut surface, &state, 44).unwrap();

        assert_eq!(lit_columns(&surface), vec![41, 42, 43]);
    }

    #[test]
    fn idle_frame_is_dark_in_every_mode() {
        for mode in [Mode::LeftScroll, Mode::Static] {
            let mut state = lit_state(2, mode, 100);
            state.clear();
            let mut surface = PlainSurface::new(Vec::new(), 44);
            paint(&mut surface, &state, 44).unwrap();
            assert!(surface.last_frame().iter().flatten().all(|l| *l == LedLevel::Off));
        }
    }

    #[test]
    fn low_brightness_dims() {
        let mut surface = PlainSurface::new(Vec::new(), 44);
        paint(&mut surface, &lit_state(1, Mode::Static, 10), 44).unwrap();
        let frame = surface.last_frame();
        assert_eq!(frame[0][18], LedLevel::Dim);
        assert_eq!(frame[0][0], LedLevel::Off);
    }
}

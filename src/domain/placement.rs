/// Pixel placement: which source column of the grid lands on a viewport cell.
///
/// This is the one piece of visual logic every surface shares. Two modes:
///
///   - `Static`:     `src = col - floor((viewport - width) / 2)`, centred
///   - `LeftScroll`: `src = col + scroll - viewport`, text enters from the
///     right edge and leaves on the left
///
/// A cell is lit iff the row is in range, `0 <= src < width` and the grid
/// pixel at `(row, src)` is on.

use serde::Deserialize;

use crate::domain::grid::PixelGrid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    #[serde(alias = "left")]
    LeftScroll,
    Static,
}

impl Mode {
    /// Parse the short names used in scripts (`left`, `static`).
    pub fn parse(s: &str) -> Option<Mode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "left_scroll" | "scroll" => Some(Mode::LeftScroll),
            "static" | "center" | "centre" => Some(Mode::Static),
            _ => None,
        }
    }
}

/// Grid column shown at viewport column `col`, or `None` when the cell falls
/// outside the text.
pub fn source_column(mode: Mode, col: usize, width: usize, scroll: usize, viewport: usize) -> Option<usize> {
    let (col, width, scroll, viewport) = (col as i64, width as i64, scroll as i64, viewport as i64);
    let src = match mode {
        // Floor division: text wider than the viewport shifts left, not right.
        Mode::Static => col - (viewport - width).div_euclid(2),
        Mode::LeftScroll => col + scroll - viewport,
    };
    if (0..width).contains(&src) {
        Some(src as usize)
    } else {
        None
    }
}

/// Is viewport cell `(row, col)` lit?
pub fn pixel_on(grid: &PixelGrid, mode: Mode, row: usize, col: usize, scroll: usize, viewport: usize) -> bool {
    if row >= grid.height() {
        return false;
    }
    match source_column(mode, col, grid.width(), scroll, viewport) {
        Some(src) => grid.get(row, src),
        None => false,
    }
}

/// Terminal surface: double-buffered, diff-based crossterm renderer.
///
/// How it works:
///   1. `begin_frame` clears the `front` buffer and draws the header
///   2. `set_pixel` drops one LED glyph per viewport cell into `front`
///   3. `present_frame` draws the status line, compares `front` with
///      `back` (the previous frame) and emits commands only for changed
///      cells, batched with `queue!` and flushed once
///   4. Swap front/back
///
/// A scrolling badge changes a handful of cells per tick, so the diff keeps
/// the terminal from flickering.

use std::io::{self, BufWriter, Write};

use anyhow::Context;
use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::grid::ROWS;
use crate::domain::placement::Mode;
use crate::ui::palette::{LedColors, LedLevel, Palette, Rgb};
use crate::ui::surface::{FrameInfo, PixelSurface};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// LED cells sit on pure black so the unlit glow stays visible.
    const BASE_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell, so every position is diff'd on the next flush.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.r, g: rgb.g, b: rgb.b }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies one column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell { ch, fg, bg: Cell::BASE_BG });
        }
    }
}

// ── Layout ──

const ON_CHAR: char = '●';
const OFF_CHAR: char = '○';

const TITLE_ROW: usize = 0;
const TEXT_ROW: usize = 1;
const LED_ROW: usize = 3;
const STATUS_ROW: usize = LED_ROW + ROWS + 1;
const HELP_ROW: usize = STATUS_ROW + 1;
const LEFT: usize = 2;

/// Longest caption shown before truncating with "...".
const CAPTION_MAX: usize = 60;

const TITLE_FG: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const TEXT_FG: Color = Color::White;
const HELP_FG: Color = Color::DarkGrey;

/// Shorten `text` for the header and make line breaks visible.
fn caption(text: &str) -> String {
    if text.is_empty() {
        return "(none)".to_string();
    }
    let flat = text.replace('\n', "⏎");
    if flat.chars().count() > CAPTION_MAX {
        let head: String = flat.chars().take(CAPTION_MAX).collect();
        format!("{head}...")
    } else {
        flat
    }
}

/// Run `undo` when `step` failed, keeping the original error.
fn undo_on_error<T>(step: io::Result<T>, undo: impl FnOnce() -> io::Result<()>) -> io::Result<T> {
    if step.is_err() {
        if let Err(e) = undo() {
            log::warn!("terminal rollback failed: {e}");
        }
    }
    step
}

// ── TerminalSurface ──

pub struct TerminalSurface {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    palette: Palette,
    colors: LedColors,
    status: String,
}

impl TerminalSurface {
    pub fn new(palette: Palette) -> Self {
        let colors = palette.colors("red");
        TerminalSurface {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            palette,
            colors,
            status: String::new(),
        }
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        let entered = execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        );
        undo_on_error(entered, terminal::disable_raw_mode).context("entering alternate screen")?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        log::info!("terminal surface ready ({}x{})", self.term_w, self.term_h);
        Ok(())
    }

    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)
            .context("leaving alternate screen")?;
        terminal::disable_raw_mode().context("disabling raw mode")
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    fn detect_resize(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    fn compose_header(&mut self, text: &str) {
        self.front.put_str(LEFT, TITLE_ROW, "LED Name Badge (mock)", TITLE_FG);
        let line = format!("Text: {}", caption(text));
        self.front.put_str(LEFT, TEXT_ROW, &line, TEXT_FG);
    }

    fn compose_footer(&mut self) {
        self.front.put_str(LEFT, STATUS_ROW, &self.status, HELP_FG);
        self.front.put_str(LEFT, HELP_ROW, "[q] quit", HELP_FG);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

impl PixelSurface for TerminalSurface {
    fn begin_frame(&mut self, frame: &FrameInfo<'_>) {
        if let Err(e) = self.detect_resize() {
            log::warn!("terminal resize check failed: {e}");
        }
        self.front.clear();
        self.colors = self.palette.colors(frame.color);
        self.status = format!(
            "mode: {}  color: {}  scroll: {}",
            match frame.mode {
                Mode::LeftScroll => "left",
                Mode::Static => "static",
            },
            frame.color,
            frame.scroll_position
        );
        self.compose_header(frame.text);
    }

    fn set_pixel(&mut self, row: usize, col: usize, on: bool, brightness: u8) {
        let level = LedLevel::classify(on, brightness);
        let ch = if level == LedLevel::Off { OFF_CHAR } else { ON_CHAR };
        let fg = to_color(self.colors.shade(level));
        self.front.set(LEFT + col, LED_ROW + row, Cell { ch, fg, bg: Cell::BASE_BG });
    }

    fn present_frame(&mut self) -> anyhow::Result<()> {
        self.compose_footer();
        self.flush_diff().context("flushing terminal frame")?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

/// Plain-text surface: frames as lines of characters on any `io::Write`.
///
/// Used for pipes, CI logs and tests. No escape codes, no raw mode.
///
/// ```text
/// -- frame 12 | scroll 12 | Hello
/// ..........................................##
/// ```
///
/// `#` = lit, `+` = lit at low brightness, `.` = off.

use std::io::Write;

use anyhow::Context;

use crate::domain::grid::ROWS;
use crate::ui::palette::LedLevel;
use crate::ui::surface::{FrameInfo, PixelSurface};

pub struct PlainSurface<W: Write> {
    out: W,
    width: usize,
    frame: Vec<Vec<LedLevel>>,
    caption: String,
    frames: u64,
}

impl<W: Write> PlainSurface<W> {
    pub fn new(out: W, width: usize) -> Self {
        PlainSurface {
            out,
            width,
            frame: vec![vec![LedLevel::Off; width]; ROWS],
            caption: String::new(),
            frames: 0,
        }
    }

    #[cfg(test)]
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// The pixels of the most recently painted frame.
    #[cfg(test)]
    pub fn last_frame(&self) -> &[Vec<LedLevel>] {
        &self.frame
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }
}

fn level_char(level: LedLevel) -> char {
    match level {
        LedLevel::On => '#',
        LedLevel::Dim => '+',
        LedLevel::Off => '.',
    }
}

impl<W: Write> PixelSurface for PlainSurface<W> {
    fn begin_frame(&mut self, frame: &FrameInfo<'_>) {
        self.caption = format!("scroll {} | {}", frame.scroll_position, frame.text.replace('\n', "\\n"));
    }

    fn set_pixel(&mut self, row: usize, col: usize, on: bool, brightness: u8) {
        if row < ROWS && col < self.width {
            self.frame[row][col] = LedLevel::classify(on, brightness);
        }
    }

    fn present_frame(&mut self) -> anyhow::Result<()> {
        self.frames += 1;
        writeln!(self.out, "-- frame {} | {}", self.frames, self.caption).context("writing frame header")?;
        for row in &self.frame {
            let line: String = row.iter().map(|l| level_char(*l)).collect();
            writeln!(self.out, "{line}").context("writing frame row")?;
        }
        self.out.flush().context("flushing frame")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let mut s = PlainSurface::new(Vec::new(), 4);
        s.begin_frame(&FrameInfo {
            text: "Hi\nyou",
            color: "red",
            mode: crate::domain::placement::Mode::LeftScroll,
            scroll_position: 3,
        });
        s.set_pixel(0, 1, true, 100);
        s.set_pixel(1, 2, true, 10);
        s.set_pixel(ROWS, 0, true, 100); // ignored
        s.present_frame().unwrap();

        let text = String::from_utf8(s.output().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "-- frame 1 | scroll 3 | Hi\\nyou");
        assert_eq!(lines[1], ".#..");
        assert_eq!(lines[2], "..+.");
        assert_eq!(lines.len(), 1 + ROWS);
    }
}

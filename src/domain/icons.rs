/// Builtin icon table.
///
/// Icons are drawn as ASCII art (`X` = lit) so the table stays reviewable.
/// Every icon is `ROWS` tall and a whole number of column groups wide.
/// Mirrored entries reuse another icon's art flipped horizontally.

use crate::domain::grid::{GROUP_WIDTH, ROWS};

pub struct Icon {
    pub name: &'static str,
    art: &'static [&'static str; ROWS],
    mirrored: bool,
}

impl Icon {
    /// Width in column groups.
    pub fn groups(&self) -> usize {
        self.art[0].len() / GROUP_WIDTH
    }

    /// Pack the art into per-group row bytes (MSB = leftmost pixel).
    pub fn to_groups(&self) -> Vec<[u8; ROWS]> {
        let mut groups = vec![[0u8; ROWS]; self.groups()];
        let width = self.groups() * GROUP_WIDTH;
        for (r, line) in self.art.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                if ch != 'X' {
                    continue;
                }
                let x = if self.mirrored { width - 1 - x } else { x };
                groups[x / GROUP_WIDTH][r] |= 0x80 >> (x % GROUP_WIDTH);
            }
        }
        groups
    }
}

pub fn lookup(name: &str) -> Option<&'static Icon> {
    ICONS.iter().find(|icon| icon.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    ICONS.iter().map(|icon| icon.name)
}

// ── Art ──

const BALL: [&str; ROWS] = [
    "........",
    "..XXXX..",
    ".XXXXXX.",
    "XXXXXXXX",
    "XXXXXXXX",
    "XXXXXXXX",
    "XXXXXXXX",
    "XXXXXXXX",
    ".XXXXXX.",
    "..XXXX..",
    "........",
];

const HAPPY: [&str; ROWS] = [
    "........",
    "..XXXX..",
    ".X....X.",
    "X.X..X.X",
    "X......X",
    "X......X",
    "X.X..X.X",
    "X..XX..X",
    ".X....X.",
    "..XXXX..",
    "........",
];

const HAPPY2: [&str; ROWS] = [
    "................",
    ".....XXXXXX.....",
    "...XX......XX...",
    "..X..XX..XX..X..",
    ".X............X.",
    ".X............X.",
    ".X..X......X..X.",
    "..X..XXXXXX..X..",
    "...XX......XX...",
    ".....XXXXXX.....",
    "................",
];

const HEART: [&str; ROWS] = [
    "........",
    "........",
    ".XX..XX.",
    "X..XX..X",
    "X......X",
    "X......X",
    ".X....X.",
    "..X..X..",
    "...XX...",
    "........",
    "........",
];

const HEART2: [&str; ROWS] = [
    "........",
    "........",
    ".XX..XX.",
    "XXXXXXXX",
    "XXXXXXXX",
    "XXXXXXXX",
    ".XXXXXX.",
    "..XXXX..",
    "...XX...",
    "........",
    "........",
];

const BIG_HEART: [&str; ROWS] = [
    "................",
    "..XXXX....XXXX..",
    ".X....X..X....X.",
    "X......XX......X",
    "X..............X",
    "X..............X",
    ".X............X.",
    "..X..........X..",
    "...XX......XX...",
    ".....XX..XX.....",
    ".......XX.......",
];

const BIG_HEART2: [&str; ROWS] = [
    "................",
    "..XXXX....XXXX..",
    ".XXXXXX..XXXXXX.",
    "XXXXXXXXXXXXXXXX",
    "XXXXXXXXXXXXXXXX",
    "XXXXXXXXXXXXXXXX",
    ".XXXXXXXXXXXXXX.",
    "..XXXXXXXXXXXX..",
    "...XXXXXXXXXX...",
    ".....XXXXXX.....",
    ".......XX.......",
];

const STAR: [&str; ROWS] = [
    "........",
    "...XX...",
    "...XX...",
    "XXXXXXXX",
    ".XXXXXX.",
    "..XXXX..",
    "..XXXX..",
    ".XX..XX.",
    ".X....X.",
    "........",
    "........",
];

const BICYCLE: [&str; ROWS] = [
    "................",
    "......XXX.......",
    ".......X........",
    "...XXXXXXX......",
    "....X.....X.....",
    "..XXXX...XXXX...",
    ".X..X.X.X.X..X..",
    "X...X..X..X...X.",
    "X......X......X.",
    ".X....X.X....X..",
    "..XXXX...XXXX...",
];

const ARROW: [&str; ROWS] = [
    "........",
    "....X...",
    "....XX..",
    "....XXX.",
    "XXXXXXXX",
    "XXXXXXXX",
    "XXXXXXXX",
    "....XXX.",
    "....XX..",
    "....X...",
    "........",
];

static ICONS: &[Icon] = &[
    Icon { name: "ball", art: &BALL, mirrored: false },
    Icon { name: "happy", art: &HAPPY, mirrored: false },
    Icon { name: "happy2", art: &HAPPY2, mirrored: false },
    Icon { name: "heart", art: &HEART, mirrored: false },
    Icon { name: "HEART", art: &BIG_HEART, mirrored: false },
    Icon { name: "heart2", art: &HEART2, mirrored: false },
    Icon { name: "HEART2", art: &BIG_HEART2, mirrored: false },
    Icon { name: "star", art: &STAR, mirrored: false },
    Icon { name: "bicycle", art: &BICYCLE, mirrored: false },
    Icon { name: "bicycle_r", art: &BICYCLE, mirrored: true },
    Icon { name: "arrow", art: &ARROW, mirrored: false },
    Icon { name: "arrow_l", art: &ARROW, mirrored: true },
];

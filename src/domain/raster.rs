/// Glyph rasterizer: display string → column-major raster buffer.
///
/// The simulation only depends on the `Rasterizer` trait. `BadgeRasterizer`
/// is the bundled implementation:
///
///   - literal characters → one column group each, drawn with the
///     ISO-8859-1 6x10 mono font from `embedded-graphics`
///   - `:name:` icons     → builtin icon table (`domain::icons`)
///   - `:0:` .. `:9:`     → reserved slot, one blank column group
///   - `:file.png:`       → image asset, scaled to `ROWS` tall (feature `images`)
///   - `\n`, `\r`         → skipped
///
/// Errors follow one taxonomy so the producer-side validation and the
/// render-loop rasterization reject exactly the same inputs.

use std::fmt;
use std::path::{Path, PathBuf};

use embedded_graphics::{
    mono_font::{iso_8859_1::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

use crate::domain::grid::{RasterBuffer, GROUP_WIDTH, ROWS};
use crate::domain::icons;
use crate::domain::token::{tokenize, Segment};

// ── Errors ──

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RasterError {
    UnknownIcon(String),
    UnsupportedCharacter(char),
    MissingAsset(PathBuf),
    InvalidInput(String),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::UnknownIcon(name) => write!(f, "icon not found: :{name}:"),
            RasterError::UnsupportedCharacter(c) => {
                write!(f, "unsupported character {c:?} (U+{:04X})", *c as u32)
            }
            RasterError::MissingAsset(path) => write!(f, "image not found: {}", path.display()),
            RasterError::InvalidInput(msg) => write!(f, "invalid display string: {msg}"),
        }
    }
}

impl std::error::Error for RasterError {}

// ── Trait ──

/// Anything that can turn a display string into badge pixels.
///
/// Implementations must be pure with respect to the display: the same text
/// yields the same buffer, and failures leave nothing behind.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, text: &str) -> Result<RasterBuffer, RasterError>;

    /// Builtin icon names this rasterizer understands.
    fn icon_names(&self) -> Vec<String>;
}

// ── BadgeRasterizer ──

pub struct BadgeRasterizer {
    images_dir: PathBuf,
}

impl BadgeRasterizer {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        BadgeRasterizer { images_dir: images_dir.into() }
    }

    /// Resolve an image token name against the images directory.
    fn resolve_image(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.images_dir.join(path)
        }
    }

    fn segment_groups(&self, seg: &Segment, out: &mut Vec<[u8; ROWS]>) -> Result<(), RasterError> {
        match seg {
            Segment::LineBreak => {}
            Segment::Reserved(_) => out.push([0; ROWS]),
            Segment::Icon(name) => {
                let icon = icons::lookup(name)
                    .ok_or_else(|| RasterError::UnknownIcon(name.clone()))?;
                out.extend(icon.to_groups());
            }
            Segment::Image(name) => {
                let path = self.resolve_image(name);
                if !path.is_file() {
                    return Err(RasterError::MissingAsset(path));
                }
                out.extend(image_groups(&path)?);
            }
            Segment::Char(c) => {
                if !is_supported_char(*c) {
                    return Err(RasterError::UnsupportedCharacter(*c));
                }
                out.push(glyph_group(*c));
            }
        }
        Ok(())
    }
}

impl Rasterizer for BadgeRasterizer {
    fn rasterize(&self, text: &str) -> Result<RasterBuffer, RasterError> {
        let mut groups = Vec::with_capacity(text.len());
        for seg in tokenize(text) {
            self.segment_groups(&seg, &mut groups)?;
        }
        RasterBuffer::new(groups.concat(), groups.len())
    }

    fn icon_names(&self) -> Vec<String> {
        icons::names().map(str::to_string).collect()
    }
}

/// Printable ASCII and printable Latin-1: exactly what the 6x10 font covers.
pub fn is_supported_char(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}')
}

// ── Glyphs ──

/// One 8×ROWS column group as an embedded-graphics draw target.
struct GlyphCell {
    rows: [u8; ROWS],
}

impl OriginDimensions for GlyphCell {
    fn size(&self) -> Size {
        Size::new(GROUP_WIDTH as u32, ROWS as u32)
    }
}

impl DrawTarget for GlyphCell {
    type Color = BinaryColor;
    type Error = std::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color != BinaryColor::On {
                continue;
            }
            let (x, y) = (point.x, point.y);
            if (0..GROUP_WIDTH as i32).contains(&x) && (0..ROWS as i32).contains(&y) {
                self.rows[y as usize] |= 0x80 >> x;
            }
        }
        Ok(())
    }
}

/// Rasterize one supported character into a column group.
/// The 6-pixel glyph sits one pixel in from the left and one row down.
fn glyph_group(c: char) -> [u8; ROWS] {
    let mut cell = GlyphCell { rows: [0; ROWS] };
    let mut buf = [0u8; 4];
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    Text::with_baseline(c.encode_utf8(&mut buf), Point::new(1, 1), style, Baseline::Top)
        .draw(&mut cell)
        .unwrap_or_else(|never| match never {});
    cell.rows
}

// ── Images ──

/// Load an image, scale it to `ROWS` tall and pack it into column groups.
/// Dark, opaque pixels are lit.
#[cfg(feature = "images")]
fn image_groups(path: &Path) -> Result<Vec<[u8; ROWS]>, RasterError> {
    use image::imageops::{self, FilterType};

    let img = image::open(path)
        .map_err(|e| RasterError::InvalidInput(format!("{}: {e}", path.display())))?
        .to_luma_alpha8();

    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(RasterError::InvalidInput(format!("{}: empty image", path.display())));
    }
    let rows = ROWS as u32;
    let img = if h == rows {
        img
    } else {
        let scaled_w = ((w * rows) / h).max(1);
        imageops::resize(&img, scaled_w, rows, FilterType::Nearest)
    };

    let width = img.width() as usize;
    let mut groups = vec![[0u8; ROWS]; width.div_ceil(GROUP_WIDTH)];
    for (x, y, px) in img.enumerate_pixels() {
        let [luma, alpha] = px.0;
        if alpha >= 128 && luma < 128 {
            let x = x as usize;
            groups[x / GROUP_WIDTH][y as usize] |= 0x80 >> (x % GROUP_WIDTH);
        }
    }
    Ok(groups)
}

#[cfg(not(feature = "images"))]
fn image_groups(path: &Path) -> Result<Vec<[u8; ROWS]>, RasterError> {
    Err(RasterError::InvalidInput(format!(
        "{}: image support not compiled in",
        path.display()
    )))
}

/// Raster buffers and the pixel matrix decoder.
///
/// ## Bit layout
///
/// The rasterizer emits a flat byte sequence organised as `columns` groups of
/// `ROWS` bytes. Byte `(c, r)` carries 8 horizontal pixels of row `r`,
/// MSB-first: bit 7 is the leftmost pixel of the group.
///
/// ```text
///   group 0          group 1
///   [r0 r1 .. r10]   [r0 r1 .. r10]   ...
///    |
///    +-- 0b1000_0000 -> pixel (0, 0) on
/// ```
///
/// `decode` turns that into a row-major boolean grid `ROWS × columns*8`.

use std::fmt;

use crate::domain::raster::RasterError;

/// LED rows on the badge. Every glyph, icon and image is exactly this tall.
pub const ROWS: usize = 11;

/// Pixels per column group (one byte per row).
pub const GROUP_WIDTH: usize = 8;

// ── RasterBuffer ──

/// Column-major, bit-packed pixel data as produced by a rasterizer.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RasterBuffer {
    bytes: Vec<u8>,
    columns: usize,
}

impl RasterBuffer {
    /// Wrap raw rasterizer output. Fails unless `bytes.len() == columns * ROWS`.
    pub fn new(bytes: Vec<u8>, columns: usize) -> Result<Self, RasterError> {
        if bytes.len() != columns * ROWS {
            return Err(RasterError::InvalidInput(format!(
                "raster buffer holds {} bytes, expected {} for {} column groups",
                bytes.len(),
                columns * ROWS,
                columns
            )));
        }
        Ok(RasterBuffer { bytes, columns })
    }

    /// Build from per-group row bytes. Cannot violate the length invariant.
    #[cfg(test)]
    pub fn from_groups(groups: &[[u8; ROWS]]) -> Self {
        let mut bytes = Vec::with_capacity(groups.len() * ROWS);
        for group in groups {
            bytes.extend_from_slice(group);
        }
        RasterBuffer { bytes, columns: groups.len() }
    }

    #[cfg(test)]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.columns == 0
    }

    pub fn decode(&self) -> PixelGrid {
        decode(&self.bytes, self.columns)
    }
}

impl fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("columns", &self.columns)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

// ── PixelGrid ──

/// Row-major boolean pixel matrix, `ROWS` rows of `width` pixels.
///
/// Never mutated after construction; the display state swaps in a new grid
/// on every text change.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelGrid {
    rows: Vec<Vec<bool>>,
    width: usize,
}

impl PixelGrid {
    /// The idle grid: `ROWS` rows of zero width.
    pub fn empty() -> Self {
        PixelGrid { rows: vec![Vec::new(); ROWS], width: 0 }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Pixel lookup. Out-of-range coordinates read as off.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    pub fn lit_count(&self) -> usize {
        self.rows.iter().map(|r| r.iter().filter(|p| **p).count()).sum()
    }
}

impl Default for PixelGrid {
    fn default() -> Self {
        PixelGrid::empty()
    }
}

impl fmt::Debug for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PixelGrid {}x{}", ROWS, self.width)?;
        for row in &self.rows {
            let line: String = row.iter().map(|p| if *p { '#' } else { '.' }).collect();
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

/// Unpack a column-major raster buffer into a row-major grid.
///
/// Assumes a well-formed buffer (`bytes.len() == columns * ROWS`); missing
/// trailing bytes decode as off rather than panicking.
pub fn decode(bytes: &[u8], columns: usize) -> PixelGrid {
    let width = columns * GROUP_WIDTH;
    let mut rows = vec![vec![false; width]; ROWS];

    for c in 0..columns {
        let base = c * ROWS;
        for (r, row) in rows.iter_mut().enumerate() {
            let byte = bytes.get(base + r).copied().unwrap_or(0);
            for bit in 0..GROUP_WIDTH {
                if byte & (1 << (7 - bit)) != 0 {
                    row[c * GROUP_WIDTH + bit] = true;
                }
            }
        }
    }

    PixelGrid { rows, width }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_lit_group_lights_first_eight_columns() {
        let buf = RasterBuffer::from_groups(&[[0xFF; ROWS], [0x00; ROWS]]);
        let grid = buf.decode();

        assert_eq!(grid.width(), 16);
        assert_eq!(grid.height(), ROWS);
        for r in 0..ROWS {
            for c in 0..8 {
                assert!(grid.get(r, c), "({r},{c}) should be on");
            }
            for c in 8..16 {
                assert!(!grid.get(r, c), "({r},{c}) should be off");
            }
        }
    }

    #[test]
    fn zero_columns_is_empty_width_grid() {
        let grid = decode(&[], 0);
        assert_eq!(grid.width(), 0);
        assert_eq!(grid.height(), ROWS);
        assert_eq!(grid, PixelGrid::empty());
    }

    #[test]
    fn msb_is_leftmost_pixel() {
        let mut group = [0u8; ROWS];
        group[3] = 0b1000_0001;
        let grid = RasterBuffer::from_groups(&[group]).decode();

        assert!(grid.get(3, 0));
        assert!(grid.get(3, 7));
        assert_eq!(grid.lit_count(), 2);
    }

    #[test]
    fn second_group_offsets_by_eight() {
        let mut second = [0u8; ROWS];
        second[0] = 0b0100_0000;
        let grid = RasterBuffer::from_groups(&[[0; ROWS], second]).decode();

        assert!(grid.get(0, 9));
        assert_eq!(grid.lit_count(), 1);
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = RasterBuffer::new(vec![0; ROWS + 1], 1).unwrap_err();
        assert!(matches!(err, RasterError::InvalidInput(_)));
        assert!(RasterBuffer::new(vec![0; 2 * ROWS], 2).is_ok());
    }

    #[test]
    fn out_of_range_reads_off() {
        let grid = RasterBuffer::from_groups(&[[0xFF; ROWS]]).decode();
        assert!(!grid.get(ROWS, 0));
        assert!(!grid.get(0, 8));
    }
}

/// Events emitted by a render-loop tick.
/// The loop logs them; tests assert on them.

use crate::domain::raster::RasterError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayEvent {
    Updated { text: String, width: usize, lit: usize },
    Cleared,
    /// An update rasterized to nothing and left the display idle.
    Blanked,
    /// Rasterization failed inside the loop; the previous frame stays.
    RasterFailed { text: String, error: RasterError },
    ScrollWrapped,
}

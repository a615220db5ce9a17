//! Vision service interface.
//!
//! Frame capture and circular-blob extraction are an opaque primitive owned
//! by the host (a camera plus whatever image library it ships). The primitive
//! performs the whole segmentation chain for one target colour:
//!
//! ```text
//! frame ─ colour distance(target) ─ dilate(2) ─ binarise(threshold) ─ blobs ─ circularity(tolerance)
//! ```
//!
//! and hands back the circular blobs in its own (stable) order. Everything
//! after that, area banding and candidate choice, lives in
//! [`crate::tracker`].

use crate::marker::{Coord, Rgb};

/// Maximum number of circular blobs kept from one segmentation.
pub const MAX_BLOBS: usize = 32;

/// Circularity tolerance handed to the primitive; found by experiment.
pub const CIRCULARITY_TOLERANCE: f32 = 0.25;

/// A circular blob found by the vision primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blob {
    /// Blob centre.
    pub position: Coord,
    /// Blob area in pixels.
    pub area: u32,
}

impl Blob {
    /// Construct a blob at `(x, y)` with `area` pixels.
    pub const fn new(x: i32, y: i32, area: u32) -> Self {
        Self {
            position: Coord::new(x, y),
            area,
        }
    }
}

/// Circularity-filtered blobs from one segmentation, in primitive order.
pub type BlobSet = heapless::Vec<Blob, MAX_BLOBS>;

/// Camera plus circular-blob segmentation primitive.
pub trait VisionService {
    /// Captured image type.
    type Frame;

    /// Block until the next frame is available and return it.
    ///
    /// Implementations return the frame already flipped horizontally, so
    /// image coordinates match the robot's left/right.
    fn capture(&mut self) -> Self::Frame;

    /// Segment `frame` around `target` and return blobs whose circularity
    /// error is below `circularity_tolerance`. An empty set means nothing found.
    fn find_circular_blobs(
        &mut self,
        frame: &Self::Frame,
        target: Rgb,
        threshold: u8,
        circularity_tolerance: f32,
    ) -> BlobSet;
}

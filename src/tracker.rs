/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Marker tracking: from a frame and a marker class to zero or one dot.
//!
//! Several marker classes share a colour (all three blue classes, the food
//! bowl and the ball) and differ only in their area band. Segmentation is the
//! expensive part, so [`MarkerTracker`] keeps a single-slot memo of the last
//! segmentation keyed on `(colour, frame id)`. Asking for another
//! class of the same colour in the same frame reuses the cached blob set; a
//! new frame id or a different colour invalidates it.
//!
//! # Candidate choice
//!
//! After area banding, the **last** surviving candidate (in the primitive's
//! order) wins. This is *last-candidate-wins*: it is neither the largest nor
//! the one closest to the previous observation, just deterministic.
//!
//! # Invariants
//!
//! - A returned dot passed the circularity filter and has `min_area < area < max_area`.
//! - Segmentation runs at most once per `(colour, frame id)` key in a row.
//! - The threshold is not part of the key. The ball and the food bowl share
//!   a colour, so whichever is asked for first in a frame sets the threshold
//!   the other one is searched with.

use crate::marker::{Coord, MarkerClass, MarkerTable, Observations, Rgb};
use crate::vision::{Blob, BlobSet, VisionService, CIRCULARITY_TOLERANCE};

// ─── Segmentation cache ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SegmentationKey {
    color: Rgb,
    frame_id: u64,
}

/// Single-slot memo of the most recent segmentation.
#[derive(Clone, Debug, Default)]
pub struct SegmentationCache {
    key: Option<SegmentationKey>,
    circles: BlobSet,
}

impl SegmentationCache {
    /// Empty cache; the first lookup always segments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached entry.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.circles.clear();
    }
}

// ─── Tracker ────────────────────────────────────────────────────────────────

/// Per-class dot finder on top of a [`VisionService`].
#[derive(Clone, Debug, Default)]
pub struct MarkerTracker {
    cache: SegmentationCache,
    segmentations: u64,
}

impl MarkerTracker {
    /// Fresh tracker with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the vision primitive has actually been invoked.
    pub fn segmentations(&self) -> u64 {
        self.segmentations
    }

    /// Locate `class` in `frame`.
    ///
    /// `frame_id` must change whenever a new frame is captured; the robot
    /// uses its cycle counter.
    pub fn track<V: VisionService>(
        &mut self,
        vision: &mut V,
        frame: &V::Frame,
        class: &MarkerClass,
        frame_id: u64,
    ) -> Option<Coord> {
        let key = SegmentationKey {
            color: class.color,
            frame_id,
        };
        if self.cache.key != Some(key) {
            self.cache.circles =
                vision.find_circular_blobs(frame, class.color, class.threshold, CIRCULARITY_TOLERANCE);
            self.cache.key = Some(key);
            self.segmentations += 1;
        }
        select_dot(&self.cache.circles, class)
    }

    /// Run every class of `table` against one frame.
    pub fn track_all<V: VisionService>(
        &mut self,
        vision: &mut V,
        frame: &V::Frame,
        table: &MarkerTable,
        frame_id: u64,
    ) -> Observations {
        let mut observations = Observations::empty();
        for class in table.iter() {
            observations.set(class.id, self.track(vision, frame, class, frame_id));
        }
        observations
    }
}

/// Apply `class`'s area band to `circles` and pick the last survivor.
pub fn select_dot(circles: &[Blob], class: &MarkerClass) -> Option<Coord> {
    circles
        .iter()
        .filter(|blob| class.accepts_area(blob.area))
        .last()
        .map(|blob| blob.position)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

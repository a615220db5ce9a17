/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Marker classes and per-cycle observations.
//!
//! The robot sees its world as six coloured circular markers. Two are stuck
//! to its own body (used for pose), four are objects placed in its box:
//!
//! | Marker | Colour | Area band (px) | Meaning |
//! |--------|--------|----------------|---------|
//! | [`MarkerId::SmallBody`] | blue | 1600–2800 | rear body dot |
//! | [`MarkerId::LargeBody`] | blue | 4000–7000 | forehead dot, robot position |
//! | [`MarkerId::Boombox`] | blue | 450–800 | dance trigger |
//! | [`MarkerId::Bed`] | green | 450–800 | sleep target |
//! | [`MarkerId::FoodBowl`] | red | 450–800 | eat target |
//! | [`MarkerId::Ball`] | red-orange | 3500–5500 | kick target |
//!
//! Boombox, bed and food bowl together are the *calming* markers: showing
//! all three at once brings a dead robot back to life.
//!
//! # Invariants
//!
//! - **Area band is open**: a dot is accepted only when `min_area < area < max_area`.
//! - Observations live for one cycle; nothing here is cached.

/// Three-channel colour, `[r, g, b]`.
pub type Rgb = [u8; 3];

/// Integer pixel coordinate in the (horizontally flipped) camera frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing downwards.
    pub y: i32,
}

impl Coord {
    /// Construct a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Vector from `self` to `other`.
    pub fn delta_to(&self, other: Coord) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Euclidean distance to `other` in pixels.
    pub fn distance_to(&self, other: Coord) -> f64 {
        let (dx, dy) = self.delta_to(other);
        libm::sqrt(f64::from(dx) * f64::from(dx) + f64::from(dy) * f64::from(dy))
    }
}

// ─── Marker identity ────────────────────────────────────────────────────────

/// The six semantic markers the robot knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkerId {
    /// Small blue dot at the back of the robot.
    SmallBody,
    /// Large blue dot on the robot's forehead; its position is the robot position.
    LargeBody,
    /// Small blue floor marker: the boombox.
    Boombox,
    /// Small green floor marker: the bed.
    Bed,
    /// Small red floor marker: the food bowl.
    FoodBowl,
    /// Ping-pong ball.
    Ball,
}

impl MarkerId {
    /// All markers, in tracking order.
    pub const ALL: [MarkerId; 6] = [
        MarkerId::SmallBody,
        MarkerId::LargeBody,
        MarkerId::Boombox,
        MarkerId::Bed,
        MarkerId::FoodBowl,
        MarkerId::Ball,
    ];

    /// The object markers that behaviours react to.
    pub const OBJECTS: [MarkerId; 4] = [
        MarkerId::Boombox,
        MarkerId::Bed,
        MarkerId::FoodBowl,
        MarkerId::Ball,
    ];

    /// Dense index in `0..6`.
    pub const fn index(self) -> usize {
        match self {
            MarkerId::SmallBody => 0,
            MarkerId::LargeBody => 1,
            MarkerId::Boombox => 2,
            MarkerId::Bed => 3,
            MarkerId::FoodBowl => 4,
            MarkerId::Ball => 5,
        }
    }

    /// Short lowercase name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            MarkerId::SmallBody => "small-body",
            MarkerId::LargeBody => "large-body",
            MarkerId::Boombox => "boombox",
            MarkerId::Bed => "bed",
            MarkerId::FoodBowl => "food-bowl",
            MarkerId::Ball => "ball",
        }
    }
}

// ─── Marker classes ─────────────────────────────────────────────────────────

/// Detection descriptor for one marker: colour, binarisation threshold, area band.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerClass {
    /// Which marker this class detects.
    pub id: MarkerId,
    /// Colour the colour-distance transform is centred on.
    pub color: Rgb,
    /// Binarisation threshold applied after the colour-distance transform.
    pub threshold: u8,
    /// Exclusive lower bound on dot area (pixels).
    pub min_area: u32,
    /// Exclusive upper bound on dot area (pixels).
    pub max_area: u32,
}

impl MarkerClass {
    /// `true` when `area` lies strictly inside the class's area band.
    pub fn accepts_area(&self, area: u32) -> bool {
        self.min_area < area && area < self.max_area
    }
}

const BLUE: Rgb = [0, 0, 255];
const GREEN: Rgb = [0, 255, 0];
const RED: Rgb = [255, 0, 0];
// Calibrated: the ball reads as pure red under the box lighting.
const ORANGE: Rgb = [255, 0, 0];

/// The six calibrated marker classes, indexed by [`MarkerId::index`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerTable {
    classes: [MarkerClass; 6],
}

impl MarkerTable {
    /// Build a table from explicit classes. Entry `i` must describe `MarkerId::ALL[i]`.
    pub fn new(classes: [MarkerClass; 6]) -> Self {
        debug_assert!(classes
            .iter()
            .zip(MarkerId::ALL.iter())
            .all(|(c, id)| c.id == *id));
        Self { classes }
    }

    /// Class descriptor for `id`.
    pub fn get(&self, id: MarkerId) -> &MarkerClass {
        &self.classes[id.index()]
    }

    /// Mutable class descriptor for `id` (for calibration).
    pub fn get_mut(&mut self, id: MarkerId) -> &mut MarkerClass {
        &mut self.classes[id.index()]
    }

    /// Iterate the classes in tracking order.
    pub fn iter(&self) -> impl Iterator<Item = &MarkerClass> {
        self.classes.iter()
    }
}

impl Default for MarkerTable {
    fn default() -> Self {
        let class = |id, color, threshold, min_area, max_area| MarkerClass {
            id,
            color,
            threshold,
            min_area,
            max_area,
        };
        Self {
            classes: [
                class(MarkerId::SmallBody, BLUE, 150, 1600, 2800),
                class(MarkerId::LargeBody, BLUE, 150, 4000, 7000),
                class(MarkerId::Boombox, BLUE, 150, 450, 800),
                class(MarkerId::Bed, GREEN, 170, 450, 800),
                class(MarkerId::FoodBowl, RED, 150, 450, 800),
                class(MarkerId::Ball, ORANGE, 160, 3500, 5500),
            ],
        }
    }
}

// ─── Observations ───────────────────────────────────────────────────────────

/// Everything seen in one frame: at most one position per marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observations {
    positions: [Option<Coord>; 6],
}

impl Observations {
    /// Nothing observed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Position of `id` this cycle, if seen.
    pub fn get(&self, id: MarkerId) -> Option<Coord> {
        self.positions[id.index()]
    }

    /// Record (or clear) the position of `id`.
    pub fn set(&mut self, id: MarkerId, position: Option<Coord>) {
        self.positions[id.index()] = position;
    }

    /// Builder-style [`Observations::set`] with a present position.
    pub fn with(mut self, id: MarkerId, position: Coord) -> Self {
        self.set(id, Some(position));
        self
    }

    /// `true` when boombox, bed and food bowl are all in view.
    pub fn calming_all_present(&self) -> bool {
        self.get(MarkerId::Boombox).is_some()
            && self.get(MarkerId::Bed).is_some()
            && self.get(MarkerId::FoodBowl).is_some()
    }

    /// Number of markers seen.
    pub fn count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

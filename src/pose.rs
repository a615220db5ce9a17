/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Robot pose from the two body markers.
//!
//! The robot carries a small dot at its back and a large dot on its
//! forehead. The large dot is the robot's position; the vector from the small
//! dot to the large dot is its heading.
//!
//! Angles are integer degrees in the image plane with the y axis flipped so
//! that counter-clockwise on screen is positive:
//!
//! ```text
//! heading = -round(degrees(atan2(dy, dx)))      (dx, dy) = large - small
//! ```
//!
//! # Invariants
//!
//! - Every angle returned by this module lies in (−180, 180].
//! - Coincident body dots do not produce `atan2(0, 0)`; the last valid heading is kept.

use crate::marker::Coord;

/// Robot position and heading, valid for one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotPose {
    /// Large body marker position.
    pub position: Coord,
    /// Heading in degrees, (−180, 180].
    pub heading: i32,
}

/// Fold any integer angle into (−180, 180].
pub fn normalize_degrees(angle: i32) -> i32 {
    let wrapped = angle.rem_euclid(360);
    if wrapped > 180 {
        wrapped - 360
    } else {
        wrapped
    }
}

/// Direction of the vector `from → to` in heading convention.
///
/// Returns `None` when the two points coincide.
pub fn bearing(from: Coord, to: Coord) -> Option<i32> {
    let (dx, dy) = from.delta_to(to);
    if dx == 0 && dy == 0 {
        return None;
    }
    let radians = libm::atan2(f64::from(dy), f64::from(dx));
    let degrees = libm::round(radians * 180.0 / core::f64::consts::PI) as i32;
    Some(normalize_degrees(-degrees))
}

/// Signed rotation (degrees) the robot must make to face `target`.
///
/// Positive means the target lies clockwise of the current heading on
/// screen. A target on top of the robot needs no turn.
pub fn turn_angle(pose: &RobotPose, target: Coord) -> i32 {
    match bearing(pose.position, target) {
        Some(motion_angle) => normalize_degrees(pose.heading - motion_angle),
        None => 0,
    }
}

/// Derives a [`RobotPose`] from the body markers each cycle.
#[derive(Clone, Debug, Default)]
pub struct PoseEstimator {
    last_heading: Option<i32>,
    ever_located: bool,
}

impl PoseEstimator {
    /// Fresh estimator; the robot has never been located.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once any pose has been produced.
    pub fn ever_located(&self) -> bool {
        self.ever_located
    }

    /// Estimate the pose; `None` unless both body markers were seen this cycle.
    pub fn estimate(&mut self, small_body: Option<Coord>, large_body: Option<Coord>) -> Option<RobotPose> {
        let (small, large) = (small_body?, large_body?);
        let heading = bearing(small, large)
            .or(self.last_heading)
            .unwrap_or(0);
        self.last_heading = Some(heading);
        self.ever_located = true;
        Some(RobotPose {
            position: large,
            heading,
        })
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_zero_facing_right() {
        let mut est = PoseEstimator::new();
        let pose = est
            .estimate(Some(Coord::new(100, 100)), Some(Coord::new(120, 100)))
            .unwrap();
        assert_eq!(pose.heading, 0);
        assert_eq!(pose.position, Coord::new(120, 100));
    }

    #[test]
    fn test_heading_up_screen_is_positive() {
        let mut est = PoseEstimator::new();
        // Large dot above small dot on screen (smaller y).
        let pose = est
            .estimate(Some(Coord::new(100, 100)), Some(Coord::new(100, 80)))
            .unwrap();
        assert_eq!(pose.heading, 90);
    }

    #[test]
    fn test_heading_facing_left_is_180_not_minus_180() {
        let mut est = PoseEstimator::new();
        let pose = est
            .estimate(Some(Coord::new(100, 100)), Some(Coord::new(80, 100)))
            .unwrap();
        assert_eq!(pose.heading, 180);
    }

    #[test]
    fn test_missing_marker_is_pose_unknown() {
        let mut est = PoseEstimator::new();
        assert!(est.estimate(Some(Coord::new(1, 1)), None).is_none());
        assert!(est.estimate(None, Some(Coord::new(1, 1))).is_none());
        assert!(!est.ever_located());
    }

    #[test]
    fn test_coincident_markers_keep_previous_heading() {
        let mut est = PoseEstimator::new();
        est.estimate(Some(Coord::new(100, 100)), Some(Coord::new(100, 80)));
        let pose = est
            .estimate(Some(Coord::new(50, 50)), Some(Coord::new(50, 50)))
            .unwrap();
        assert_eq!(pose.heading, 90);
    }

    #[test]
    fn test_normalize_degrees_range() {
        for angle in -1000..=1000 {
            let n = normalize_degrees(angle);
            assert!(n > -180 && n <= 180, "angle {} normalised to {}", angle, n);
            assert_eq!((n - angle).rem_euclid(360), 0);
        }
    }

    #[test]
    fn test_turn_angle_quarter_turn() {
        let pose = RobotPose {
            position: Coord::new(120, 100),
            heading: 0,
        };
        // Target straight down the screen.
        assert_eq!(turn_angle(&pose, Coord::new(120, 200)), 90);
        // Target straight up the screen.
        assert_eq!(turn_angle(&pose, Coord::new(120, 0)), -90);
        // Target dead ahead.
        assert_eq!(turn_angle(&pose, Coord::new(300, 100)), 0);
    }

    #[test]
    fn test_turn_angle_wraps_across_180() {
        let pose = RobotPose {
            position: Coord::new(0, 0),
            heading: 170,
        };
        // Bearing to (-100, 10) is about -174; raw difference 344 wraps to -16.
        let angle = turn_angle(&pose, Coord::new(-100, 10));
        assert!(angle > -180 && angle <= 180);
        assert_eq!(angle, normalize_degrees(170 - bearing(Coord::new(0, 0), Coord::new(-100, 10)).unwrap()));
    }
}

/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Motion controller: timing policy for the differential base.
//!
//! Nothing here touches hardware. Every function returns declarative
//! [`MotionCommand`]s (signed duty per wheel plus a duration) that the
//! actuation runner in [`crate::runner`] executes.
//!
//! # Turn buckets
//!
//! | turn angle | action | pulse |
//! |------------|--------|-------|
//! | `> 25` | pivot toward target | 0.3 s |
//! | `(15, 25]` | pivot toward target | 0.05 s |
//! | `< −25` | pivot away | 0.3 s |
//! | `[−25, −15)` | pivot away | 0.05 s |
//! | otherwise | hold | none |
//!
//! # Invariants
//!
//! - Turn bucket choice is a pure function of the signed turn angle.
//! - `drive_back(drive_to(..).duration)` reverses for exactly the forward time.
//! - Stability compares against the previous cycle's coordinate of the *same* marker.

use core::time::Duration;

use hashbrown::HashMap;

use crate::marker::{Coord, MarkerId};
use crate::pose::{turn_angle, RobotPose};

// ─── Configuration ──────────────────────────────────────────────────────────

/// How the stability test measures movement between cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StabilityMode {
    /// `|Δx| < t && |Δy| < t`.
    #[default]
    Absolute,
    /// `Δx < t && Δy < t` on the signed deltas. Reproduces the historical
    /// firmware, which lets anything moving up or left count as still.
    SignedLiteral,
}

/// Calibration constants for motion synthesis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Duty (percent) for ordinary driving and turning.
    pub normal_speed: i8,
    /// Duty (percent) for the ball kick.
    pub kick_speed: i8,
    /// Turn angles at or below this magnitude count as aligned (exclusive).
    pub align_tolerance_deg: i32,
    /// Turn angles above this magnitude get the long pivot pulse.
    pub coarse_turn_deg: i32,
    /// Long pivot pulse.
    pub coarse_pulse: Duration,
    /// Short pivot pulse.
    pub fine_pulse: Duration,
    /// Calibrated ground speed at `normal_speed`, pixels per second.
    pub pixels_per_second: f64,
    /// Per-axis pixel movement below which a marker is stationary.
    pub stationary_px: i32,
    /// Stability comparison mode.
    pub stability: StabilityMode,
    /// Idle swing fires on cycles divisible by this.
    pub idle_period: u64,
    /// Tired idle adds a mirrored swing on cycles divisible by this.
    pub idle_alt_period: u64,
    /// Duty (percent) of the idle swing.
    pub idle_speed: i8,
    /// Length of each half of the idle swing.
    pub idle_pulse: Duration,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            normal_speed: 20,
            kick_speed: 100,
            align_tolerance_deg: 15,
            coarse_turn_deg: 25,
            coarse_pulse: Duration::from_millis(300),
            fine_pulse: Duration::from_millis(50),
            pixels_per_second: 150.0,
            stationary_px: 4,
            stability: StabilityMode::Absolute,
            idle_period: 15,
            idle_alt_period: 16,
            idle_speed: 20,
            idle_pulse: Duration::from_millis(500),
        }
    }
}

// ─── Motion command ─────────────────────────────────────────────────────────

/// Largest wheel duty magnitude.
pub const MAX_DUTY: i8 = 100;

const fn clamp_duty(duty: i8) -> i8 {
    if duty > MAX_DUTY {
        MAX_DUTY
    } else if duty < -MAX_DUTY {
        -MAX_DUTY
    } else {
        duty
    }
}

/// One timed actuation step: both wheel duties held for `duration`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionCommand {
    /// Left wheel duty, `-100..=100`; negative is backwards.
    pub left: i8,
    /// Right wheel duty, `-100..=100`; negative is backwards.
    pub right: i8,
    /// How long the duties are held.
    pub duration: Duration,
}

impl MotionCommand {
    /// Both wheels at `speed`, clamped to `±MAX_DUTY`.
    pub const fn straight(speed: i8, duration: Duration) -> Self {
        let speed = clamp_duty(speed);
        Self {
            left: speed,
            right: speed,
            duration,
        }
    }

    /// Spin on the spot: left wheel at `left`, right wheel at `-left`.
    /// `left` is clamped to `±MAX_DUTY` first.
    pub const fn pivot(left: i8, duration: Duration) -> Self {
        let left = clamp_duty(left);
        Self {
            left,
            right: -left,
            duration,
        }
    }
}

// ─── Turning ────────────────────────────────────────────────────────────────

/// Turn response selected from the signed turn angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnBucket {
    /// `angle > 25`: long pivot toward the target.
    CoarseToward,
    /// `15 < angle <= 25`: short pivot toward the target.
    FineToward,
    /// `angle < -25`: long pivot the other way.
    CoarseAway,
    /// `-25 <= angle < -15`: short pivot the other way.
    FineAway,
    /// Close enough; no motion.
    Hold,
}

impl TurnBucket {
    /// Classify `angle` with the thresholds in `config`.
    pub fn select(angle: i32, config: &MotionConfig) -> Self {
        let fine = config.align_tolerance_deg;
        let coarse = config.coarse_turn_deg;
        if angle > coarse {
            TurnBucket::CoarseToward
        } else if angle > fine {
            TurnBucket::FineToward
        } else if angle < -coarse {
            TurnBucket::CoarseAway
        } else if angle < -fine {
            TurnBucket::FineAway
        } else {
            TurnBucket::Hold
        }
    }

    /// Pivot command for this bucket, `None` for [`TurnBucket::Hold`].
    pub fn command(self, config: &MotionConfig) -> Option<MotionCommand> {
        let speed = config.normal_speed;
        match self {
            TurnBucket::CoarseToward => Some(MotionCommand::pivot(speed, config.coarse_pulse)),
            TurnBucket::FineToward => Some(MotionCommand::pivot(speed, config.fine_pulse)),
            TurnBucket::CoarseAway => Some(MotionCommand::pivot(speed.saturating_neg(), config.coarse_pulse)),
            TurnBucket::FineAway => Some(MotionCommand::pivot(speed.saturating_neg(), config.fine_pulse)),
            TurnBucket::Hold => None,
        }
    }
}

/// `true` when the robot faces `target` within the alignment tolerance.
pub fn is_aligned(pose: &RobotPose, target: Coord, config: &MotionConfig) -> bool {
    turn_angle(pose, target).abs() < config.align_tolerance_deg
}

/// Single pivot pulse toward `target`, or `None` if already aligned.
pub fn turn_toward(pose: &RobotPose, target: Coord, config: &MotionConfig) -> Option<MotionCommand> {
    if is_aligned(pose, target, config) {
        return None;
    }
    TurnBucket::select(turn_angle(pose, target), config).command(config)
}

// ─── Driving ────────────────────────────────────────────────────────────────

/// Drive straight from the pose to `target` at `speed`.
///
/// Duration is the Euclidean distance divided by the calibrated ground
/// speed. Read `duration` off the result to reverse the same distance later.
pub fn drive_to(pose: &RobotPose, target: Coord, speed: i8, config: &MotionConfig) -> MotionCommand {
    let seconds = pose.position.distance_to(target) / config.pixels_per_second;
    let duration = if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    };
    MotionCommand::straight(speed, duration)
}

/// Reverse at normal speed for `duration`.
pub fn drive_back(duration: Duration, config: &MotionConfig) -> MotionCommand {
    MotionCommand::straight(config.normal_speed.saturating_neg(), duration)
}

// ─── Idle swing ─────────────────────────────────────────────────────────────

/// Periodic wiggle performed while idling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleSwing {
    /// Nothing this cycle.
    None,
    /// Pivot right-wheel-forward first, then back.
    RightForwardFirst,
    /// Mirror image: right wheel backwards first.
    RightBackwardFirst,
}

impl IdleSwing {
    /// Swing for `cycle`. The mirrored swing only exists when `allow_mirror`.
    pub fn for_cycle(cycle: u64, allow_mirror: bool, config: &MotionConfig) -> Self {
        if config.idle_period != 0 && cycle % config.idle_period == 0 {
            IdleSwing::RightForwardFirst
        } else if allow_mirror && config.idle_alt_period != 0 && cycle % config.idle_alt_period == 0 {
            IdleSwing::RightBackwardFirst
        } else {
            IdleSwing::None
        }
    }

    /// The two pivots of the swing, in order.
    pub fn commands(self, config: &MotionConfig) -> Option<[MotionCommand; 2]> {
        let first = match self {
            IdleSwing::None => return None,
            // right(+s), left(-s)
            IdleSwing::RightForwardFirst => MotionCommand::pivot(config.idle_speed.saturating_neg(), config.idle_pulse),
            IdleSwing::RightBackwardFirst => MotionCommand::pivot(config.idle_speed, config.idle_pulse),
        };
        let second = MotionCommand::pivot(first.right, config.idle_pulse);
        Some([first, second])
    }
}

// ─── Stability ──────────────────────────────────────────────────────────────

/// Remembers where each object marker was last cycle.
#[derive(Clone, Debug)]
pub struct StabilityTracker {
    previous: HashMap<MarkerId, Coord>,
    threshold: i32,
    mode: StabilityMode,
}

impl StabilityTracker {
    /// Empty tracker with the given per-axis pixel threshold.
    pub fn new(threshold: i32, mode: StabilityMode) -> Self {
        Self {
            previous: HashMap::new(),
            threshold,
            mode,
        }
    }

    /// Tracker configured from `config`.
    pub fn from_config(config: &MotionConfig) -> Self {
        Self::new(config.stationary_px, config.stability)
    }

    /// Compare `current` with the stored coordinate of `id`, then store `current`.
    ///
    /// The first sighting of a marker is never stationary.
    pub fn is_stationary(&mut self, id: MarkerId, current: Coord) -> bool {
        let stationary = match self.previous.get(&id) {
            Some(prev) => {
                let (dx, dy) = prev.delta_to(current);
                match self.mode {
                    StabilityMode::Absolute => dx.abs() < self.threshold && dy.abs() < self.threshold,
                    StabilityMode::SignedLiteral => dx < self.threshold && dy < self.threshold,
                }
            }
            None => false,
        };
        self.previous.insert(id, current);
        stationary
    }

    /// Forget `id` (it was not seen this cycle).
    pub fn forget(&mut self, id: MarkerId) {
        self.previous.remove(&id);
    }

    /// Last stored coordinate of `id`.
    pub fn previous(&self, id: MarkerId) -> Option<Coord> {
        self.previous.get(&id).copied()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

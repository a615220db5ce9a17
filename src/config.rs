//! Robot configuration.
//!
//! One [`RobotConfig`] gathers the calibration of every component. The
//! defaults are the values measured on the reference robot and box. With the
//! `serde` feature every section deserialises with `#[serde(default)]`, so a
//! JSON file only needs to list the fields it overrides.

use crate::arbiter::ArbiterThresholds;
use crate::marker::MarkerTable;
use crate::motion::MotionConfig;
use crate::needs::NeedsConfig;
use crate::plan::{ScriptConfig, ServoConfig};

/// Complete configuration of the control loop.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RobotConfig {
    /// Marker colour, threshold and area calibration.
    pub markers: MarkerTable,
    /// Needs drift and death threshold.
    pub needs: NeedsConfig,
    /// Needs gates of the priority table.
    pub arbiter: ArbiterThresholds,
    /// Wheel timing and turning.
    pub motion: MotionConfig,
    /// Head servo positions and settling.
    pub servo: ServoConfig,
    /// Behaviour script timing.
    pub script: ScriptConfig,
    /// Play face videos. Off when the robot runs without a screen.
    pub show_animation: bool,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            markers: MarkerTable::default(),
            needs: NeedsConfig::default(),
            arbiter: ArbiterThresholds::default(),
            motion: MotionConfig::default(),
            servo: ServoConfig::default(),
            script: ScriptConfig::default(),
            show_animation: true,
        }
    }
}

//! # petbot-core
//!
//! Perception-to-action control loop for a camera-tracked tabletop pet robot.
//!
//! ---
//!
//! A ceiling camera looks down into the robot's box. Coloured dots mark the
//! robot's body and four objects: a boombox, a bed, a food bowl and a ball.
//! Every cycle the robot finds those dots, works out where it is and which
//! way it faces, weighs its needs (hunger, tiredness, boredom) against what
//! it can see, and picks exactly one behaviour: eat, sleep, dance, kick the
//! ball, turn toward something, idle, or die of neglect.
//!
//! ## The pipeline
//!
//! ```text
//! Camera → MarkerTracker → PoseEstimator ─┐
//!                 │                       ├→ arbiter → Planner → runner → wheels / head / LEDs / face
//!                 └→ StabilityTracker ────┘      ↑                  │
//!                                           NeedsEngine ←───────────┘ (completion deltas)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`marker`] | [`MarkerTable`], [`Observations`] | Marker identities and their colour/area calibration |
//! | [`vision`] | [`VisionService`], [`Blob`] | Camera and circular-blob segmentation interface |
//! | [`tracker`] | [`MarkerTracker`] | Area banding, last-candidate choice, per-frame segmentation cache |
//! | [`pose`] | [`PoseEstimator`], [`RobotPose`] | Position and heading from the two body markers |
//! | [`needs`] | [`NeedsEngine`], [`NeedsState`] | Drifting needs, death and resurrection |
//! | [`arbiter`] | [`Behavior`], [`Situation`] | Priority table choosing one behaviour per cycle |
//! | [`motion`] | [`MotionCommand`], [`TurnBucket`] | Turn buckets, drive timing, idle swing, marker stability |
//! | [`plan`] | [`Plan`], [`Step`] | Behaviour scripts as declarative step lists |
//! | [`runner`] | [`execute_plan`] | Interruptible plan execution that always leaves the motors off |
//! | [`face`] | [`FaceDisplay`] | Face animations over an unreliable video player |
//! | [`hal`] | [`Actuator`], [`LedStrip`], [`VideoPlayer`], [`Clock`] | Collaborator interfaces |
//! | [`robot`] | [`Robot`], [`CycleReport`] | The loop itself |
//! | [`sim`] | [`sim::SceneVision`] | Recording fakes for host-side runs |
//!
//! ## `no_std`
//!
//! This crate is `#![no_std]` by default and needs only `alloc`. Enable the
//! `std` feature for [`hal::StdClock`] and the console logger. Enable the
//! `serde` feature to load a [`RobotConfig`] from JSON and serialise
//! [`CycleReport`]s.
//!
//! ## License
//!
//! Business Source License 1.1. Free for evaluation and non-production use.

#![cfg_attr(not(any(feature = "std", feature = "python-ffi", test)), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod arbiter;
pub mod config;
pub mod error;
pub mod face;
pub mod hal;
pub mod marker;
pub mod motion;
pub mod needs;
pub mod plan;
pub mod pose;
pub mod robot;
pub mod runner;
pub mod sim;
pub mod tracker;
pub mod vision;

#[cfg(feature = "std")]
pub mod logger;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use arbiter::{arbitrate, decide, ArbiterThresholds, Behavior, Perception, Sighting, Situation};
pub use config::RobotConfig;
pub use error::{ActuatorError, PlaybackError};
pub use face::{Face, FaceDisplay, FaceMode};
pub use hal::{Actuator, Clock, Direction, LedStrip, Side, VideoPlayer};
pub use marker::{Coord, MarkerClass, MarkerId, MarkerTable, Observations, Rgb};
pub use motion::{MotionCommand, MotionConfig, StabilityMode, StabilityTracker, TurnBucket};
pub use needs::{Activity, DriftSource, FixedDrift, NeedsConfig, NeedsEngine, NeedsState, RandomDrift};
pub use plan::{Plan, Planner, ScriptConfig, ServoConfig, Step};
pub use pose::{PoseEstimator, RobotPose};
pub use robot::{CycleReport, Robot};
pub use runner::{execute_plan, Hardware, Outcome};
pub use tracker::MarkerTracker;
pub use vision::{Blob, VisionService};

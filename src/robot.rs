/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The perception-to-action loop.
//!
//! One call to [`Robot::cycle`] is one tick of the robot's life:
//!
//! ```text
//! capture ─▶ track markers ─▶ pose ─▶ stability ─▶ arbitrate ─▶ plan ─▶ execute ─▶ needs
//! ```
//!
//! Everything runs on the caller's thread. The behaviour of a cycle is one
//! atomic unit of actuation: the camera is not sampled again until the plan
//! has finished, apart from the interrupt flag which is polled throughout.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::arbiter::{decide, Behavior, Perception, Sighting, Situation};
use crate::config::RobotConfig;
use crate::face::FaceDisplay;
use crate::hal::{Actuator, Clock, LedStrip, VideoPlayer};
use crate::marker::{Coord, MarkerId, Observations};
use crate::motion::{is_aligned, StabilityTracker};
use crate::needs::{DriftSource, NeedsEngine, NeedsState};
use crate::plan::Planner;
use crate::pose::{PoseEstimator, RobotPose};
use crate::runner::{execute_plan, Hardware, Outcome};
use crate::tracker::MarkerTracker;
use crate::vision::VisionService;

/// What happened in one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleReport {
    /// Zero-based cycle index.
    pub cycle: u64,
    /// Behaviour chosen.
    pub behavior: Behavior,
    /// Needs at the end of the cycle, after drift.
    pub needs: NeedsState,
    /// Pose used for the decision.
    pub pose: Option<RobotPose>,
    /// Whether the behaviour ran to completion.
    pub outcome: Outcome,
}

/// A complete robot: perception, needs, decision and hardware.
pub struct Robot<V, A, L, P, C, D>
where
    V: VisionService,
    P: VideoPlayer,
{
    config: RobotConfig,
    vision: V,
    tracker: MarkerTracker,
    pose: PoseEstimator,
    stability: StabilityTracker,
    needs: NeedsEngine,
    drift: D,
    hardware: Hardware<A, L, P>,
    clock: C,
    cycle: u64,
    last_behavior: Option<Behavior>,
}

impl<V, A, L, P, C, D> Robot<V, A, L, P, C, D>
where
    V: VisionService,
    A: Actuator,
    L: LedStrip,
    P: VideoPlayer,
    C: Clock,
    D: DriftSource,
{
    /// Assemble a robot and blank its LEDs.
    pub fn new(config: RobotConfig, vision: V, actuator: A, leds: L, player: P, clock: C, drift: D) -> Self {
        let face = FaceDisplay::new(player, config.show_animation);
        let mut hardware = Hardware::new(actuator, leds, face);
        hardware.fill_leds([0, 0, 0]);
        Self {
            stability: StabilityTracker::from_config(&config.motion),
            needs: NeedsEngine::new(config.needs.clone()),
            config,
            vision,
            tracker: MarkerTracker::new(),
            pose: PoseEstimator::new(),
            drift,
            hardware,
            clock,
            cycle: 0,
            last_behavior: None,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Current needs.
    pub fn needs(&self) -> NeedsState {
        self.needs.state()
    }

    /// Needs engine, for seeding a simulation.
    pub fn needs_mut(&mut self) -> &mut NeedsEngine {
        &mut self.needs
    }

    /// Number of cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Output devices.
    pub fn hardware(&self) -> &Hardware<A, L, P> {
        &self.hardware
    }

    /// Vision service.
    pub fn vision(&self) -> &V {
        &self.vision
    }

    /// Vision service, for feeding a simulation.
    pub fn vision_mut(&mut self) -> &mut V {
        &mut self.vision
    }

    /// Clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run one cycle.
    pub fn cycle(&mut self, interrupt: &AtomicBool) -> CycleReport {
        let cycle = self.cycle;
        let frame = self.vision.capture();
        let seen = self
            .tracker
            .track_all(&mut self.vision, &frame, &self.config.markers, cycle);
        let pose = self
            .pose
            .estimate(seen.get(MarkerId::SmallBody), seen.get(MarkerId::LargeBody));
        let objects = self.update_stability(&seen);

        let perception = match pose {
            Some(pose) => Perception::Located(self.situation(&pose, &objects)),
            None if self.pose.ever_located() => Perception::Lost,
            None => Perception::NeverLocated,
        };
        let behavior = decide(&perception, &self.config.arbiter);
        self.log_transition(behavior);

        match behavior {
            Behavior::Die => {
                if self.needs.try_die() {
                    warn!("cycle {}: robot died of neglect", cycle);
                }
            }
            Behavior::Resurrect => {
                if self.needs.try_resurrect(seen.calming_all_present()) {
                    info!("cycle {}: robot resurrected", cycle);
                }
            }
            _ => {}
        }

        let planner = Planner::new(&self.config.motion, &self.config.servo, &self.config.script);
        let plan = planner.plan(behavior, pose.as_ref(), cycle);
        let outcome = execute_plan(&plan, &mut self.hardware, &mut self.clock, &self.config.servo, interrupt);

        if outcome == Outcome::Completed {
            if let Some(activity) = plan.activity() {
                self.needs.complete(activity);
                info!("cycle {}: finished {:?}", cycle, activity);
            }
        }
        self.needs.tick(&mut self.drift);
        self.cycle += 1;

        let needs = self.needs.state();
        debug!(
            "cycle {}: hunger={} tiredness={} boredom={} alive={}",
            cycle, needs.hunger, needs.tiredness, needs.boredom, needs.alive
        );
        CycleReport {
            cycle,
            behavior,
            needs,
            pose,
            outcome,
        }
    }

    /// Cycle until `interrupt` is raised, then shut down. Returns the cycles run.
    pub fn run(&mut self, interrupt: &AtomicBool) -> u64 {
        let start = self.cycle;
        while !interrupt.load(Ordering::Relaxed) {
            if self.cycle(interrupt).outcome == Outcome::Cancelled {
                break;
            }
        }
        self.shutdown();
        self.cycle - start
    }

    /// Zero the outputs, release the actuation handles and stop the face video.
    pub fn shutdown(&mut self) {
        info!("shutting down after {} cycles", self.cycle);
        if let Err(e) = self.hardware.actuator.stop_all_motors() {
            warn!("stop_all_motors failed during shutdown: {}", e);
        }
        if let Err(e) = self.hardware.actuator.release() {
            warn!("release failed during shutdown: {}", e);
        }
        self.hardware.face.shutdown();
    }

    /// Refresh the stability history of every object marker.
    ///
    /// Markers seen this cycle are compared with (then replace) their
    /// previous coordinate; markers not seen are forgotten.
    fn update_stability(&mut self, seen: &Observations) -> [Option<(Coord, bool)>; 4] {
        let mut out = [None; 4];
        for (slot, id) in out.iter_mut().zip(MarkerId::OBJECTS) {
            *slot = match seen.get(id) {
                Some(at) => Some((at, self.stability.is_stationary(id, at))),
                None => {
                    self.stability.forget(id);
                    None
                }
            };
        }
        out
    }

    fn situation(&self, pose: &RobotPose, objects: &[Option<(Coord, bool)>; 4]) -> Situation {
        let mut situation = Situation::new(self.needs.state(), self.needs.over_limit());
        for (id, object) in MarkerId::OBJECTS.into_iter().zip(objects) {
            let sighting = object.map(|(position, stationary)| Sighting {
                position,
                stationary,
                aligned: is_aligned(pose, position, &self.config.motion),
            });
            situation.set_sighting(id, sighting);
        }
        situation
    }

    fn log_transition(&mut self, behavior: Behavior) {
        let changed = self
            .last_behavior
            .map_or(true, |last| last.name() != behavior.name());
        if changed {
            info!("cycle {}: {}", self.cycle, behavior.name());
        }
        self.last_behavior = Some(behavior);
    }
}

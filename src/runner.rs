/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Plan execution against the hardware collaborators.
//!
//! [`execute_plan`] walks a [`Plan`] step by step. Every blocking wait is cut
//! into slices of at most [`POLL_INTERVAL`] and the interrupt flag is checked
//! between slices, so a cancelled plan stops within one slice.
//!
//! # Invariants
//!
//! - The motors are stopped when `execute_plan` returns, however it returns:
//!   completion, cancellation or a panic inside a collaborator. A
//!   [`MotorGuard`] owns the actuator for the duration of the plan.
//! - A hardware fault never aborts a plan. It is logged at `warn` and the
//!   next step runs.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use log::{debug, trace, warn};

use crate::face::FaceDisplay;
use crate::hal::{Actuator, Clock, Direction, LedStrip, Side, VideoPlayer};
use crate::motion::MotionCommand;
use crate::plan::{Plan, ServoConfig, Step};

/// Longest uninterrupted pause.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a plan ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Every step ran.
    Completed,
    /// The interrupt flag was raised part-way through.
    Cancelled,
}

/// The output devices a plan drives.
#[derive(Debug)]
pub struct Hardware<A, L, P: VideoPlayer> {
    /// Wheels and head servo.
    pub actuator: A,
    /// LED strip.
    pub leds: L,
    /// Face display.
    pub face: FaceDisplay<P>,
}

impl<A: Actuator, L: LedStrip, P: VideoPlayer> Hardware<A, L, P> {
    /// Bundle the devices.
    pub fn new(actuator: A, leds: L, face: FaceDisplay<P>) -> Self {
        Self { actuator, leds, face }
    }

    /// Set every LED to `color` and latch it.
    pub fn fill_leds(&mut self, color: crate::marker::Rgb) {
        fill(&mut self.leds, color);
    }
}

// ─── Motor guard ────────────────────────────────────────────────────────────

/// Exclusive access to the actuator that stops the motors when dropped.
pub struct MotorGuard<'a, A: Actuator> {
    actuator: &'a mut A,
}

impl<'a, A: Actuator> MotorGuard<'a, A> {
    /// Take the actuator for the lifetime of the guard.
    pub fn new(actuator: &'a mut A) -> Self {
        Self { actuator }
    }

    /// Apply both wheel duties of `command`.
    pub fn drive(&mut self, command: &MotionCommand) {
        for (side, signed) in [(Side::Left, command.left), (Side::Right, command.right)] {
            let (duty, direction) = Direction::split(signed);
            if let Err(e) = self.actuator.set_motor(side, duty, direction) {
                warn!("motor command failed: {}", e);
            }
        }
    }

    /// Stop both wheels.
    pub fn stop(&mut self) {
        if let Err(e) = self.actuator.stop_all_motors() {
            warn!("stop_all_motors failed: {}", e);
        }
    }

    /// Write the head servo duty.
    pub fn servo(&mut self, duty: f32) {
        if let Err(e) = self.actuator.set_servo(duty) {
            warn!("servo command failed: {}", e);
        }
    }
}

impl<A: Actuator> Drop for MotorGuard<'_, A> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Execution ──────────────────────────────────────────────────────────────

/// Pause for `duration` in slices, returning `false` as soon as `interrupt` is set.
pub fn pause_interruptible<C: Clock>(clock: &mut C, duration: Duration, interrupt: &AtomicBool) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if interrupt.load(Ordering::Relaxed) {
            return false;
        }
        let slice = remaining.min(POLL_INTERVAL);
        clock.pause(slice);
        remaining -= slice;
    }
    !interrupt.load(Ordering::Relaxed)
}

fn fill<L: LedStrip>(leds: &mut L, color: crate::marker::Rgb) {
    if let Err(e) = leds.set_all_pixels(color).and_then(|()| leds.show()) {
        warn!("LED update failed: {}", e);
    }
}

/// Run `plan` to completion or until `interrupt` is raised.
pub fn execute_plan<A, L, P, C>(
    plan: &Plan,
    hardware: &mut Hardware<A, L, P>,
    clock: &mut C,
    servo: &ServoConfig,
    interrupt: &AtomicBool,
) -> Outcome
where
    A: Actuator,
    L: LedStrip,
    P: VideoPlayer,
    C: Clock,
{
    let Hardware { actuator, leds, face } = hardware;
    let mut motors = MotorGuard::new(actuator);
    debug!("executing {} ({} steps)", plan.behavior().name(), plan.steps().len());

    for step in plan.steps() {
        if interrupt.load(Ordering::Relaxed) {
            debug!("{} cancelled", plan.behavior().name());
            return Outcome::Cancelled;
        }
        trace!("step {:?}", step);
        let finished = match *step {
            Step::Drive(command) => {
                motors.drive(&command);
                pause_interruptible(clock, command.duration, interrupt)
            }
            Step::Stop => {
                motors.stop();
                true
            }
            Step::Wait(duration) => pause_interruptible(clock, duration, interrupt),
            Step::Head(duty) => {
                let mut ok = true;
                for _ in 0..servo.settle_writes {
                    motors.servo(duty);
                    ok = pause_interruptible(clock, servo.settle_pause, interrupt);
                    if !ok {
                        break;
                    }
                }
                ok
            }
            Step::Breathe { from, to } => {
                let steps = servo.sweep_steps.max(1);
                let mut ok = true;
                for i in 1..=steps {
                    let duty = from + (to - from) * f32::from(i) / f32::from(steps);
                    motors.servo(duty);
                    ok = pause_interruptible(clock, servo.sweep_interval, interrupt);
                    if !ok {
                        break;
                    }
                }
                ok
            }
            Step::Leds(color) => {
                fill(leds, color);
                true
            }
            Step::Face(which, mode) => {
                face.show(which, mode);
                true
            }
        };
        if !finished {
            debug!("{} cancelled", plan.behavior().name());
            return Outcome::Cancelled;
        }
    }
    Outcome::Completed
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::Behavior;
    use crate::face::{Face, FaceMode};
    use crate::sim::{ActuatorEvent, SimActuator, SimClock, SimLeds, SimPlayer};
    use alloc::sync::Arc;

    fn hardware() -> Hardware<SimActuator, SimLeds, SimPlayer> {
        Hardware::new(SimActuator::new(), SimLeds::new(), FaceDisplay::new(SimPlayer::new(), true))
    }

    fn drive_plan() -> Plan {
        let mut plan = Plan::new(Behavior::Dance);
        plan.push(Step::Face(Face::Disco, FaceMode::Change))
            .push(Step::Drive(MotionCommand::pivot(25, Duration::from_secs(2))))
            .push(Step::Leds([0, 255, 0]));
        plan
    }

    #[test]
    fn test_completed_plan_ends_stopped() {
        let mut hw = hardware();
        let mut clock = SimClock::new();
        let flag = AtomicBool::new(false);
        let outcome = execute_plan(&drive_plan(), &mut hw, &mut clock, &ServoConfig::default(), &flag);
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
        assert_eq!(clock.pauses(), 40);
        assert!(hw.actuator.is_stopped());
        assert_eq!(hw.actuator.events.last(), Some(&ActuatorEvent::StopAll));
        assert_eq!(hw.leds.current(), Some([0, 255, 0]));
        assert_eq!(hw.face.current(), Some(Face::Disco));
    }

    #[test]
    fn test_cancel_mid_drive_stops_within_a_slice() {
        let mut hw = hardware();
        let flag = Arc::new(AtomicBool::new(false));
        let mut clock = SimClock::new().interrupt_at(Duration::from_millis(500), flag.clone());
        let outcome = execute_plan(&drive_plan(), &mut hw, &mut clock, &ServoConfig::default(), &flag);
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(clock.elapsed() <= Duration::from_millis(500) + POLL_INTERVAL);
        assert!(hw.actuator.is_stopped());
        assert_eq!(hw.leds.current(), None, "steps after the cancel never ran");
    }

    #[test]
    fn test_preraised_interrupt_runs_nothing() {
        let mut hw = hardware();
        let mut clock = SimClock::new();
        let flag = AtomicBool::new(true);
        let outcome = execute_plan(&drive_plan(), &mut hw, &mut clock, &ServoConfig::default(), &flag);
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(hw.face.current(), None);
        assert_eq!(hw.actuator.events, [ActuatorEvent::StopAll]);
    }

    #[test]
    fn test_motor_faults_do_not_abort() {
        let mut hw = hardware();
        hw.actuator.reject_motors = true;
        let mut clock = SimClock::new();
        let flag = AtomicBool::new(false);
        let outcome = execute_plan(&drive_plan(), &mut hw, &mut clock, &ServoConfig::default(), &flag);
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(hw.leds.current(), Some([0, 255, 0]));
    }

    #[test]
    fn test_head_move_is_written_twice() {
        let mut hw = hardware();
        let mut clock = SimClock::new();
        let flag = AtomicBool::new(false);
        let mut plan = Plan::new(Behavior::StayDead);
        plan.push(Step::Head(9.5));
        execute_plan(&plan, &mut hw, &mut clock, &ServoConfig::default(), &flag);
        assert_eq!(hw.actuator.servo_writes(), [9.5, 9.5]);
        assert_eq!(clock.elapsed(), Duration::from_millis(200));
    }

    #[test]
    fn test_breath_sweeps_to_target() {
        let mut hw = hardware();
        let mut clock = SimClock::new();
        let flag = AtomicBool::new(false);
        let mut plan = Plan::new(Behavior::Sleep { target: crate::marker::Coord::new(0, 0) });
        plan.push(Step::Breathe { from: 11.0, to: 9.5 });
        execute_plan(&plan, &mut hw, &mut clock, &ServoConfig::default(), &flag);
        let writes = hw.actuator.servo_writes();
        assert_eq!(writes.len(), 10);
        assert!((writes[9] - 9.5).abs() < 1e-4);
        assert!(writes.windows(2).all(|w| w[1] < w[0]));
    }
}

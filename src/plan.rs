/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Behaviour scripts as declarative plans.
//!
//! A [`Plan`] is the complete, ordered list of [`Step`]s a behaviour performs
//! in one cycle: wheel commands, pauses, head movements, LED flashes and face
//! changes. Plans are built here from the chosen [`Behavior`] and executed by
//! [`crate::runner::execute_plan`]. Building is pure, so every script can be
//! inspected step by step in tests without any hardware or real time.
//!
//! A plan that carries an [`Activity`] changes the needs, but only when the
//! runner reports it ran to completion.

use core::time::Duration;

use heapless::Vec as HVec;
use log::warn;

use crate::arbiter::Behavior;
use crate::face::{Face, FaceMode};
use crate::marker::{Coord, Rgb};
use crate::motion::{drive_back, drive_to, turn_toward, IdleSwing, MotionCommand, MotionConfig};
use crate::needs::Activity;
use crate::pose::RobotPose;

/// Upper bound on steps in one plan. The dance is the longest script.
pub const MAX_STEPS: usize = 128;

/// Sleep steps besides the breaths: face, pulse in, head up, pulse out.
const SLEEP_FIXED_STEPS: usize = 6;
/// Most breaths (two sweeps each) that fit in one sleep plan.
pub const MAX_SLEEP_BREATHS: u8 = ((MAX_STEPS - SLEEP_FIXED_STEPS) / 2) as u8;

/// Dance steps outside the rounds: face, two pivots, pulse back, LEDs off, face.
const DANCE_FIXED_STEPS: usize = 7;
/// One round: a flash and a pivot per colour, then a stop.
const DANCE_ROUND_STEPS: usize = 2 * 6 + 1;
/// Most colour rounds that fit in one dance plan.
pub const MAX_DANCE_ROUNDS: u8 = ((MAX_STEPS - DANCE_FIXED_STEPS) / DANCE_ROUND_STEPS) as u8;

const LEDS_OFF: Rgb = [0, 0, 0];

// ─── Configuration ──────────────────────────────────────────────────────────

/// Head servo calibration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ServoConfig {
    /// Duty cycle (percent) for the head-up position.
    pub up_duty: f32,
    /// Duty cycle (percent) for the head-down position.
    pub down_duty: f32,
    /// Each head move is written this many times; the servo stalls under load.
    pub settle_writes: u8,
    /// Pause after each settle write.
    pub settle_pause: Duration,
    /// Increments in one breathing sweep.
    pub sweep_steps: u8,
    /// Pause after each sweep increment.
    pub sweep_interval: Duration,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            up_duty: 11.0,
            down_duty: 9.5,
            settle_writes: 2,
            settle_pause: Duration::from_millis(100),
            sweep_steps: 10,
            sweep_interval: Duration::from_millis(100),
        }
    }
}

/// Timing and intensity of the behaviour scripts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScriptConfig {
    /// Pivot duty while dancing.
    pub dance_speed: i8,
    /// Opening and closing dance pivot.
    pub dance_turn: Duration,
    /// Number of colour rounds in the dance.
    pub dance_rounds: u8,
    /// Colours flashed in each round.
    pub dance_colors: [Rgb; 6],
    /// Length of one colour flash.
    pub flash: Duration,
    /// Reverse after dancing, back to the rear of the box.
    pub dance_reverse: Duration,
    /// Pause between the activated face and the kick.
    pub kick_windup: Duration,
    /// Full-speed burst.
    pub kick_burst: Duration,
    /// Pause after the kick.
    pub kick_rest: Duration,
    /// Reverse after the kick.
    pub kick_reverse: Duration,
    /// Time spent at the bowl (length of the eating animation).
    pub eat_time: Duration,
    /// Breathing cycles while asleep.
    pub sleep_breaths: u8,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            dance_speed: 25,
            dance_turn: Duration::from_millis(250),
            dance_rounds: 6,
            dance_colors: [
                [255, 0, 0],
                [0, 255, 0],
                [0, 0, 255],
                [255, 255, 0],
                [255, 0, 255],
                [0, 255, 255],
            ],
            flash: Duration::from_millis(500),
            dance_reverse: Duration::from_millis(1500),
            kick_windup: Duration::from_millis(500),
            kick_burst: Duration::from_millis(500),
            kick_rest: Duration::from_secs(1),
            kick_reverse: Duration::from_secs(1),
            eat_time: Duration::from_secs(27),
            sleep_breaths: 4,
        }
    }
}

// ─── Steps and plans ────────────────────────────────────────────────────────

/// One primitive action of a behaviour script.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Set both wheel duties and hold them for the command's duration.
    /// The wheels keep turning afterwards until a [`Step::Stop`] or the end of the plan.
    Drive(MotionCommand),
    /// Motors off.
    Stop,
    /// Block for a while.
    Wait(Duration),
    /// Move the head servo to a duty cycle and let it settle.
    Head(f32),
    /// Sweep the head servo from one duty to another in small increments.
    Breathe {
        /// Starting duty.
        from: f32,
        /// Final duty.
        to: f32,
    },
    /// Set every LED to a colour and latch it.
    Leds(Rgb),
    /// Change the face animation.
    Face(Face, FaceMode),
}

/// The steps of one behaviour, plus the activity credited on completion.
#[derive(Clone, Debug)]
pub struct Plan {
    behavior: Behavior,
    steps: HVec<Step, MAX_STEPS>,
    activity: Option<Activity>,
    truncated: bool,
}

impl Plan {
    /// Empty plan for `behavior`.
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            steps: HVec::new(),
            activity: None,
            truncated: false,
        }
    }

    /// Behaviour this plan performs.
    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    /// Steps, in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Activity credited when the plan completes. Always `None` for a
    /// truncated plan, since its script never runs to the end.
    pub fn activity(&self) -> Option<Activity> {
        if self.truncated {
            None
        } else {
            self.activity
        }
    }

    /// `true` when a step was dropped because the plan was full.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// `true` when the plan does nothing.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a step. Steps beyond [`MAX_STEPS`] are dropped with a warning.
    pub fn push(&mut self, step: Step) -> &mut Self {
        if self.steps.push(step).is_err() {
            warn!("{} plan full, dropping {:?}", self.behavior.name(), step);
            self.truncated = true;
        }
        self
    }

    /// Drive for the command's duration, then stop.
    pub fn pulse(&mut self, command: MotionCommand) -> &mut Self {
        self.push(Step::Drive(command)).push(Step::Stop)
    }

    /// Sum of every wheel hold and explicit wait. Servo settle time excluded.
    pub fn motion_time(&self) -> Duration {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Drive(c) => c.duration,
                Step::Wait(d) => *d,
                _ => Duration::ZERO,
            })
            .sum()
    }

    fn credit(&mut self, activity: Activity) -> &mut Self {
        if self.truncated {
            warn!("{} plan truncated, no {:?} credit", self.behavior.name(), activity);
        }
        self.activity = Some(activity);
        self
    }
}

// ─── Planner ────────────────────────────────────────────────────────────────

/// Builds plans from behaviours using the motion, servo and script calibration.
#[derive(Clone, Copy, Debug)]
pub struct Planner<'a> {
    motion: &'a MotionConfig,
    servo: &'a ServoConfig,
    script: &'a ScriptConfig,
}

impl<'a> Planner<'a> {
    /// Planner over the given calibration.
    pub fn new(motion: &'a MotionConfig, servo: &'a ServoConfig, script: &'a ScriptConfig) -> Self {
        Self {
            motion,
            servo,
            script,
        }
    }

    /// Plan `behavior` for this cycle.
    ///
    /// `pose` is required by the behaviours that move relative to a target;
    /// without it they degrade to an empty plan.
    pub fn plan(&self, behavior: Behavior, pose: Option<&RobotPose>, cycle: u64) -> Plan {
        let mut plan = Plan::new(behavior);
        match behavior {
            Behavior::Searching => {}
            Behavior::Lost => {
                plan.push(Step::Face(Face::Lost, FaceMode::WhenFinished))
                    .push(Step::Stop);
            }
            Behavior::Resurrect => {
                plan.push(Step::Face(Face::Happy, FaceMode::Change))
                    .push(Step::Head(self.servo.up_duty));
            }
            Behavior::Die => {
                plan.push(Step::Head(self.servo.down_duty))
                    .push(Step::Face(Face::Dead, FaceMode::Change));
            }
            Behavior::StayDead => {
                plan.push(Step::Head(self.servo.down_duty));
            }
            Behavior::Dance => self.dance(&mut plan),
            Behavior::Kick { .. } => self.kick(&mut plan),
            Behavior::TurnTo { target, .. } => match pose {
                Some(pose) => {
                    if let Some(command) = turn_toward(pose, target, self.motion) {
                        plan.pulse(command);
                    }
                }
                None => warn!("turn requested without a pose"),
            },
            Behavior::Sleep { target } => match pose {
                Some(pose) => self.sleep(&mut plan, pose, target),
                None => warn!("sleep requested without a pose"),
            },
            Behavior::Eat { target } => match pose {
                Some(pose) => self.eat(&mut plan, pose, target),
                None => warn!("eat requested without a pose"),
            },
            Behavior::TiredIdle => {
                plan.push(Step::Head(self.servo.down_duty))
                    .push(Step::Face(Face::Tired, FaceMode::WhenFinished));
                self.idle_swing(&mut plan, cycle, true);
            }
            Behavior::HungryIdle => {
                plan.push(Step::Head(self.servo.up_duty))
                    .push(Step::Face(Face::Angry, FaceMode::WhenFinished));
                self.idle_swing(&mut plan, cycle, false);
            }
            Behavior::BoredIdle => {
                plan.push(Step::Head(self.servo.up_duty))
                    .push(Step::Face(Face::Sad, FaceMode::WhenFinished));
                self.idle_swing(&mut plan, cycle, false);
            }
            Behavior::DefaultIdle => {
                plan.push(Step::Face(Face::Idle, FaceMode::WhenFinished))
                    .push(Step::Head(self.servo.up_duty));
                self.idle_swing(&mut plan, cycle, false);
            }
        }
        plan
    }

    fn dance(&self, plan: &mut Plan) {
        let s = self.script;
        let rounds = s.dance_rounds.min(MAX_DANCE_ROUNDS);
        if rounds < s.dance_rounds {
            warn!("dance limited to {} rounds, {} configured", rounds, s.dance_rounds);
        }
        plan.push(Step::Face(Face::Disco, FaceMode::Change))
            .push(Step::Drive(MotionCommand::pivot(s.dance_speed, s.dance_turn)));
        for _ in 0..rounds {
            for (i, color) in s.dance_colors.iter().enumerate() {
                let left = if i % 2 == 0 { s.dance_speed.saturating_neg() } else { s.dance_speed };
                plan.push(Step::Leds(*color))
                    .push(Step::Drive(MotionCommand::pivot(left, s.flash)));
            }
            plan.push(Step::Stop);
        }
        plan.push(Step::Drive(MotionCommand::pivot(s.dance_speed.saturating_neg(), s.dance_turn)))
            .pulse(drive_back(s.dance_reverse, self.motion))
            .push(Step::Leds(LEDS_OFF))
            .push(Step::Face(Face::Happy, FaceMode::Change))
            .credit(Activity::Dance);
    }

    fn kick(&self, plan: &mut Plan) {
        let s = self.script;
        plan.push(Step::Face(Face::Activated, FaceMode::Change))
            .push(Step::Wait(s.kick_windup))
            .pulse(MotionCommand::straight(self.motion.kick_speed, s.kick_burst))
            .push(Step::Wait(s.kick_rest))
            .pulse(drive_back(s.kick_reverse, self.motion))
            .credit(Activity::KickBall);
    }

    fn sleep(&self, plan: &mut Plan, pose: &RobotPose, bed: Coord) {
        let forward = drive_to(pose, bed, self.motion.normal_speed, self.motion);
        let (up, down) = (self.servo.up_duty, self.servo.down_duty);
        let breaths = self.script.sleep_breaths.min(MAX_SLEEP_BREATHS);
        if breaths < self.script.sleep_breaths {
            warn!("sleep limited to {} breaths, {} configured", breaths, self.script.sleep_breaths);
        }
        plan.push(Step::Face(Face::Sleep, FaceMode::Change))
            .pulse(forward)
            .push(Step::Head(up));
        for _ in 0..breaths {
            plan.push(Step::Breathe { from: up, to: down })
                .push(Step::Breathe { from: down, to: up });
        }
        plan.pulse(drive_back(forward.duration, self.motion))
            .credit(Activity::Sleep);
    }

    fn eat(&self, plan: &mut Plan, pose: &RobotPose, bowl: Coord) {
        let forward = drive_to(pose, bowl, self.motion.normal_speed, self.motion);
        plan.push(Step::Face(Face::Eating, FaceMode::Change))
            .pulse(forward)
            .push(Step::Wait(self.script.eat_time))
            .push(Step::Face(Face::Happy, FaceMode::WhenFinished))
            .push(Step::Head(self.servo.up_duty))
            .pulse(drive_back(forward.duration, self.motion))
            .credit(Activity::Eat);
    }

    fn idle_swing(&self, plan: &mut Plan, cycle: u64, allow_mirror: bool) {
        let swing = IdleSwing::for_cycle(cycle, allow_mirror, self.motion);
        if let Some([first, second]) = swing.commands(self.motion) {
            plan.pulse(first)
                .push(Step::Wait(self.motion.idle_pulse))
                .pulse(second);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct Calibration {
        motion: MotionConfig,
        servo: ServoConfig,
        script: ScriptConfig,
    }

    fn calibration() -> Calibration {
        Calibration {
            motion: MotionConfig::default(),
            servo: ServoConfig::default(),
            script: ScriptConfig::default(),
        }
    }

    fn pose() -> RobotPose {
        RobotPose {
            position: Coord::new(0, 0),
            heading: 0,
        }
    }

    #[test]
    fn test_dance_fits_and_credits() {
        let c = calibration();
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        let plan = planner.plan(Behavior::Dance, Some(&pose()), 1);
        assert!(plan.steps().len() < MAX_STEPS);
        assert_eq!(plan.activity(), Some(Activity::Dance));
        assert_eq!(plan.steps()[0], Step::Face(Face::Disco, FaceMode::Change));
        let flashes = plan.steps().iter().filter(|s| matches!(s, Step::Leds(_))).count();
        assert_eq!(flashes, 6 * 6 + 1);
    }

    #[test]
    fn test_eat_reverses_same_distance() {
        let c = calibration();
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        let plan = planner.plan(Behavior::Eat { target: Coord::new(0, 150) }, Some(&pose()), 1);
        let drives: heapless::Vec<MotionCommand, 4> = plan
            .steps()
            .iter()
            .filter_map(|s| match s {
                Step::Drive(c) => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(drives.len(), 2);
        assert_eq!(drives[0].duration, Duration::from_secs(1));
        assert_eq!(drives[1].duration, drives[0].duration);
        assert_eq!((drives[1].left, drives[1].right), (-20, -20));
        assert_eq!(plan.activity(), Some(Activity::Eat));
        assert_eq!(plan.motion_time(), Duration::from_secs(29));
    }

    #[test]
    fn test_turn_plan_is_one_pulse() {
        let c = calibration();
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        let plan = planner.plan(
            Behavior::TurnTo {
                marker: crate::marker::MarkerId::Bed,
                target: Coord::new(0, 100),
            },
            Some(&pose()),
            1,
        );
        assert_eq!(
            plan.steps(),
            &[
                Step::Drive(MotionCommand::pivot(20, Duration::from_millis(300))),
                Step::Stop
            ]
        );
        assert_eq!(plan.activity(), None);
    }

    #[test]
    fn test_idle_swings_every_fifteenth_cycle() {
        let c = calibration();
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        let quiet = planner.plan(Behavior::DefaultIdle, Some(&pose()), 14);
        assert_eq!(quiet.motion_time(), Duration::ZERO);
        let swing = planner.plan(Behavior::DefaultIdle, Some(&pose()), 15);
        assert_eq!(swing.motion_time(), Duration::from_millis(1500));
    }

    #[test]
    fn test_tired_idle_has_mirror_swing() {
        let c = calibration();
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        let tired = planner.plan(Behavior::TiredIdle, Some(&pose()), 16);
        assert_eq!(tired.motion_time(), Duration::from_millis(1500));
        let hungry = planner.plan(Behavior::HungryIdle, Some(&pose()), 16);
        assert_eq!(hungry.motion_time(), Duration::ZERO);
    }

    #[test]
    fn test_searching_does_nothing() {
        let c = calibration();
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        assert!(planner.plan(Behavior::Searching, None, 0).is_empty());
    }

    #[test]
    fn test_sleep_breathes() {
        let c = calibration();
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        let plan = planner.plan(Behavior::Sleep { target: Coord::new(150, 0) }, Some(&pose()), 1);
        let breaths = plan
            .steps()
            .iter()
            .filter(|s| matches!(s, Step::Breathe { .. }))
            .count();
        assert_eq!(breaths, 8);
        assert_eq!(plan.activity(), Some(Activity::Sleep));
    }

    fn drives(plan: &Plan) -> usize {
        plan.steps().iter().filter(|s| matches!(s, Step::Drive(_))).count()
    }

    #[test]
    fn test_long_sleep_still_drives_back() {
        let mut c = calibration();
        c.script.sleep_breaths = 100;
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        let plan = planner.plan(Behavior::Sleep { target: Coord::new(150, 0) }, Some(&pose()), 1);
        assert!(!plan.is_truncated());
        assert_eq!(drives(&plan), 2);
        assert_eq!(plan.steps().last(), Some(&Step::Stop));
        let back = plan.steps()[plan.steps().len() - 2];
        assert!(matches!(back, Step::Drive(m) if m.left < 0 && m.right < 0));
        assert_eq!(plan.activity(), Some(Activity::Sleep));
    }

    #[test]
    fn test_long_dance_still_drives_back() {
        let mut c = calibration();
        c.script.dance_rounds = u8::MAX;
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        let plan = planner.plan(Behavior::Dance, Some(&pose()), 1);
        assert!(!plan.is_truncated());
        assert_eq!(plan.steps().last(), Some(&Step::Face(Face::Happy, FaceMode::Change)));
        let flashes = plan.steps().iter().filter(|s| matches!(s, Step::Leds(_))).count();
        assert_eq!(flashes, usize::from(MAX_DANCE_ROUNDS) * 6 + 1);
        assert_eq!(plan.activity(), Some(Activity::Dance));
    }

    #[test]
    fn test_truncated_plan_earns_no_credit() {
        let mut plan = Plan::new(Behavior::Sleep { target: Coord::new(0, 0) });
        for _ in 0..=MAX_STEPS {
            plan.push(Step::Stop);
        }
        plan.credit(Activity::Sleep);
        assert!(plan.is_truncated());
        assert_eq!(plan.steps().len(), MAX_STEPS);
        assert_eq!(plan.activity(), None);
    }

    #[test]
    fn test_dance_with_most_negative_speed() {
        let mut c = calibration();
        c.script.dance_speed = i8::MIN;
        let planner = Planner::new(&c.motion, &c.servo, &c.script);
        let plan = planner.plan(Behavior::Dance, Some(&pose()), 1);
        assert_eq!(
            plan.steps()[1],
            Step::Drive(MotionCommand::pivot(-100, c.script.dance_turn))
        );
        assert!(plan.steps().iter().all(|s| match s {
            Step::Drive(m) => m.left.abs() <= 100 && m.right.abs() <= 100,
            _ => true,
        }));
    }
}

//! End-to-end cycles of the robot against simulated hardware.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use petbot_core::sim::{ActuatorEvent, SceneVision, SimActuator, SimClock, SimLeds, SimPlayer};
use petbot_core::{
    Behavior, Coord, Direction, FixedDrift, MarkerId, MarkerTable, NeedsState, Observations, Outcome, Robot,
    RobotConfig, Side,
};

type SimRobot = Robot<SceneVision, SimActuator, SimLeds, SimPlayer, SimClock, FixedDrift>;

fn robot_with(drift: u32, clock: SimClock) -> SimRobot {
    Robot::new(
        RobotConfig::default(),
        SceneVision::new(MarkerTable::default()),
        SimActuator::new(),
        SimLeds::new(),
        SimPlayer::new(),
        clock,
        FixedDrift(drift),
    )
}

fn robot(drift: u32) -> SimRobot {
    robot_with(drift, SimClock::new())
}

/// Robot at (120, 100) facing right (heading 0).
fn body() -> Observations {
    Observations::empty()
        .with(MarkerId::SmallBody, Coord::new(100, 100))
        .with(MarkerId::LargeBody, Coord::new(120, 100))
}

fn needs(hunger: u32, tiredness: u32, boredom: u32) -> NeedsState {
    NeedsState {
        hunger,
        tiredness,
        boredom,
        alive: true,
    }
}

#[test]
fn test_leds_are_blanked_at_startup() {
    let r = robot(0);
    assert_eq!(r.hardware().leds.current(), Some([0, 0, 0]));
}

#[test]
fn test_searching_then_located_then_lost() {
    let mut r = robot(0);
    let flag = AtomicBool::new(false);

    r.vision_mut()
        .push_frame(Observations::empty())
        .push_frame(body())
        .push_frame(Observations::empty().with(MarkerId::LargeBody, Coord::new(120, 100)));

    let first = r.cycle(&flag);
    assert_eq!(first.behavior, Behavior::Searching);
    assert_eq!(first.pose, None);
    assert!(r.hardware().actuator.events.iter().all(|e| *e == ActuatorEvent::StopAll));

    let second = r.cycle(&flag);
    assert_eq!(second.behavior, Behavior::DefaultIdle);
    assert_eq!(second.pose.map(|p| p.heading), Some(0));

    let third = r.cycle(&flag);
    assert_eq!(third.behavior, Behavior::Lost);
    assert_eq!(r.hardware().face.player().last_played(), Some("faces/lost.mp4"));
    assert!(r.hardware().actuator.is_stopped());
}

#[test]
fn test_eats_once_the_bowl_holds_still() {
    let mut r = robot(0);
    r.needs_mut().set_state(needs(50, 10, 0));
    let flag = AtomicBool::new(false);
    let scene = body().with(MarkerId::FoodBowl, Coord::new(300, 100));
    r.vision_mut().repeat_frame(scene, 2);

    // First sighting never counts as stationary.
    let first = r.cycle(&flag);
    assert_eq!(first.behavior, Behavior::DefaultIdle);
    assert_eq!(first.needs.hunger, 50);

    let before = r.clock().elapsed();
    let second = r.cycle(&flag);
    assert_eq!(second.behavior, Behavior::Eat { target: Coord::new(300, 100) });
    assert_eq!(second.outcome, Outcome::Completed);
    assert_eq!(second.needs.hunger, 0);
    assert_eq!(second.needs.tiredness, 10);

    // 180 px out and back at 150 px/s, plus 27 s at the bowl and one head move.
    let spent = r.clock().elapsed() - before;
    assert!(spent >= Duration::from_millis(29_400), "spent {:?}", spent);
    assert!(r.hardware().actuator.is_stopped());
}

#[test]
fn test_turns_toward_a_bowl_below_the_robot() {
    let mut r = robot(0);
    r.needs_mut().set_state(needs(50, 0, 0));
    let flag = AtomicBool::new(false);
    r.vision_mut()
        .repeat_frame(body().with(MarkerId::FoodBowl, Coord::new(120, 200)), 2);

    r.cycle(&flag);
    let events_before = r.hardware().actuator.events.len();
    let report = r.cycle(&flag);

    assert_eq!(
        report.behavior,
        Behavior::TurnTo {
            marker: MarkerId::FoodBowl,
            target: Coord::new(120, 200)
        }
    );
    let events = &r.hardware().actuator.events[events_before..];
    assert_eq!(
        &events[..2],
        &[
            ActuatorEvent::Motor(Side::Left, 20, Direction::Forward),
            ActuatorEvent::Motor(Side::Right, 20, Direction::Backward),
        ]
    );
    assert_eq!(report.needs.hunger, 50, "turning changes no needs");
}

#[test]
fn test_dies_at_cycle_251_and_comes_back() {
    let mut r = robot(4);
    let flag = AtomicBool::new(false);
    r.vision_mut().push_frame(body());

    let mut died = None;
    for _ in 0..260 {
        let report = r.cycle(&flag);
        if report.behavior == Behavior::Die {
            died = Some(report);
            break;
        }
    }
    let died = died.expect("robot never died");
    assert_eq!(died.cycle, 251);
    assert!(!died.needs.alive);
    assert_eq!(r.hardware().face.player().last_played(), Some("faces/dead.mp4"));

    let dead = r.cycle(&flag);
    assert_eq!(dead.behavior, Behavior::StayDead);
    assert!(dead.needs.hunger > 1000, "death keeps the counters");

    r.vision_mut().push_frame(
        body()
            .with(MarkerId::Boombox, Coord::new(300, 40))
            .with(MarkerId::Bed, Coord::new(40, 300))
            .with(MarkerId::FoodBowl, Coord::new(300, 300)),
    );
    let back = r.cycle(&flag);
    assert_eq!(back.behavior, Behavior::Resurrect);
    assert_eq!(back.needs, needs(4, 4, 4));
    assert_eq!(r.hardware().face.player().last_played(), Some("faces/happy.mp4"));
}

#[test]
fn test_interrupt_mid_meal_skips_the_needs_change() {
    let flag = Arc::new(AtomicBool::new(false));
    let clock = SimClock::new().interrupt_at(Duration::from_secs(10), flag.clone());
    let mut r = robot_with(0, clock);
    r.needs_mut().set_state(needs(50, 0, 0));
    r.vision_mut()
        .repeat_frame(body().with(MarkerId::FoodBowl, Coord::new(300, 100)), 2);

    let cycles = r.run(&flag);

    assert_eq!(cycles, 2);
    assert_eq!(r.needs().hunger, 50);
    let actuator = &r.hardware().actuator;
    assert!(actuator.is_released());
    assert!(actuator.is_stopped());
    assert_eq!(actuator.events.last(), Some(&ActuatorEvent::Release));
}

#[test]
fn test_raised_interrupt_shuts_down_without_cycling() {
    let mut r = robot(0);
    let flag = AtomicBool::new(true);
    assert_eq!(r.run(&flag), 0);
    assert!(r.hardware().actuator.is_released());
    assert_eq!(r.cycles(), 0);
}

#[test]
fn test_activity_costs_feed_later_decisions() {
    let mut r = robot(0);
    r.needs_mut().set_state(needs(0, 0, 10));
    let flag = AtomicBool::new(false);
    // Ball straight ahead.
    r.vision_mut()
        .repeat_frame(body().with(MarkerId::Ball, Coord::new(200, 100)), 3);

    r.cycle(&flag);
    let kick = r.cycle(&flag);
    assert_eq!(kick.behavior, Behavior::Kick { target: Coord::new(200, 100) });
    assert_eq!(kick.needs, needs(200, 200, 0));

    // Boredom is gone, so the ball is no longer interesting.
    let after = r.cycle(&flag);
    assert_eq!(after.behavior, Behavior::DefaultIdle);
}

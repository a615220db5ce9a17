//! # Pet robot life simulation
//!
//! Runs the full control loop against a simulated box for a few thousand
//! cycles. The scene changes every so often: objects are placed, moved and
//! taken away, and once everything is removed for long enough the robot
//! starves, gets tired and bored, and dies. Putting the boombox, bed and bowl
//! back brings it to life again.
//!
//! ```bash
//! cargo run --example simulation --features std
//! ```

use std::sync::atomic::AtomicBool;

use log::LevelFilter;
use petbot_core::logger;
use petbot_core::sim::{SceneVision, SimActuator, SimClock, SimLeds, SimPlayer};
use petbot_core::{Coord, CycleReport, MarkerId, Observations, RandomDrift, Robot, RobotConfig};
use rand::rngs::SmallRng;
use rand::SeedableRng;

// ── Scenes ────────────────────────────────────────────────────────────────────

/// Robot in the middle of the box facing right.
fn robot_only() -> Observations {
    Observations::empty()
        .with(MarkerId::SmallBody, Coord::new(300, 240))
        .with(MarkerId::LargeBody, Coord::new(320, 240))
}

fn breakfast() -> Observations {
    robot_only().with(MarkerId::FoodBowl, Coord::new(520, 240))
}

fn playtime() -> Observations {
    robot_only()
        .with(MarkerId::Ball, Coord::new(320, 80))
        .with(MarkerId::Boombox, Coord::new(560, 420))
}

fn bedtime() -> Observations {
    robot_only().with(MarkerId::Bed, Coord::new(100, 240))
}

fn full_room() -> Observations {
    robot_only()
        .with(MarkerId::Boombox, Coord::new(560, 420))
        .with(MarkerId::Bed, Coord::new(100, 240))
        .with(MarkerId::FoodBowl, Coord::new(520, 60))
}

/// Robot picked up off the table.
fn nobody() -> Observations {
    Observations::empty()
}

// ── Display helpers ───────────────────────────────────────────────────────────

fn bar(v: u32) -> String {
    let filled = (v.min(1000) / 50) as usize;
    let empty = 20usize.saturating_sub(filled);
    format!("[{}{}] {:>4}", "█".repeat(filled), "░".repeat(empty), v)
}

fn print_report(r: &CycleReport) {
    println!(
        "  {:>5}  {:<12} hunger {}  tired {}  bored {}  {}",
        r.cycle,
        r.behavior.name(),
        bar(r.needs.hunger),
        bar(r.needs.tiredness),
        bar(r.needs.boredom),
        if r.needs.alive { "" } else { "✝" }
    );
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    let _ = logger::init(LevelFilter::Warn);

    let config = RobotConfig::default();
    let mut vision = SceneVision::new(config.markers.clone());
    let schedule: [(&str, Observations, usize); 7] = [
        ("picked up", nobody(), 3),
        ("morning", breakfast(), 30),
        ("play", playtime(), 60),
        ("evening", bedtime(), 40),
        ("abandoned", robot_only(), 900),
        ("still abandoned", robot_only(), 200),
        ("rescued", full_room(), 20),
    ];
    for (_, scene, cycles) in &schedule {
        vision.repeat_frame(*scene, *cycles);
    }
    let total: usize = schedule.iter().map(|(_, _, n)| n).sum();

    let mut robot = Robot::new(
        config,
        vision,
        SimActuator::new(),
        SimLeds::new(),
        SimPlayer::new(),
        SimClock::new(),
        RandomDrift::new(SmallRng::seed_from_u64(2024)),
    );
    let interrupt = AtomicBool::new(false);

    println!("Pet robot simulation: {} cycles", total);
    println!();

    let mut boundaries = schedule.iter().scan(0usize, |acc, (name, _, n)| {
        let start = *acc;
        *acc += n;
        Some((start, *name))
    });
    let mut next = boundaries.next();
    let mut last_behavior = None;

    for i in 0..total {
        if let Some((start, name)) = next {
            if start == i {
                println!("── {} ──", name);
                next = boundaries.next();
            }
        }
        let report = robot.cycle(&interrupt);
        let name = report.behavior.name();
        if last_behavior != Some(name) || i % 100 == 0 {
            print_report(&report);
        }
        last_behavior = Some(name);
    }

    robot.shutdown();
    let hw = robot.hardware();
    println!();
    println!("Simulated time:    {:?}", robot.clock().elapsed());
    println!("Segmentations:     {}", robot.vision().segmentations);
    println!("Actuator commands: {}", hw.actuator.events.len());
    println!("Face videos:       {}", hw.face.player().played.len());
    println!("LED updates:       {}", hw.leds.shown.len());
}

//! Configuration loading and report serialisation (requires `serde`).
#![cfg(feature = "serde")]

use std::sync::atomic::AtomicBool;

use petbot_core::sim::{SceneVision, SimActuator, SimClock, SimLeds, SimPlayer};
use petbot_core::{Behavior, Coord, CycleReport, FixedDrift, MarkerId, Observations, Robot, RobotConfig, StabilityMode};

#[test]
fn test_partial_json_overrides_only_named_fields() {
    let json = r#"{
        "needs": { "death_threshold": 400 },
        "motion": { "normal_speed": 35, "stability": "SignedLiteral" },
        "show_animation": false
    }"#;
    let config: RobotConfig = serde_json::from_str(json).unwrap();
    let defaults = RobotConfig::default();

    assert_eq!(config.needs.death_threshold, 400);
    assert_eq!(config.needs.max_drift, defaults.needs.max_drift);
    assert_eq!(config.motion.normal_speed, 35);
    assert_eq!(config.motion.stability, StabilityMode::SignedLiteral);
    assert_eq!(config.motion.pixels_per_second, 150.0);
    assert!(!config.show_animation);
    assert_eq!(config.markers, defaults.markers);
    assert_eq!(config.arbiter, defaults.arbiter);
}

#[test]
fn test_empty_json_is_the_default_config() {
    let config: RobotConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, RobotConfig::default());
}

#[test]
fn test_config_survives_a_round_trip() {
    let mut config = RobotConfig::default();
    config.markers.get_mut(MarkerId::Ball).threshold = 170;
    let text = serde_json::to_string(&config).unwrap();
    let back: RobotConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_cycle_report_serialises() {
    let config = RobotConfig {
        show_animation: false,
        ..RobotConfig::default()
    };
    let mut vision = SceneVision::new(config.markers.clone());
    vision.push_frame(
        Observations::empty()
            .with(MarkerId::SmallBody, Coord::new(100, 100))
            .with(MarkerId::LargeBody, Coord::new(120, 100)),
    );
    let mut robot = Robot::new(
        config,
        vision,
        SimActuator::new(),
        SimLeds::new(),
        SimPlayer::new(),
        SimClock::new(),
        FixedDrift(1),
    );
    let report = robot.cycle(&AtomicBool::new(false));
    assert_eq!(report.behavior, Behavior::DefaultIdle);
    assert!(robot.hardware().face.player().played.is_empty());

    let value = serde_json::to_value(report).unwrap();
    assert_eq!(value["cycle"], 0);
    assert_eq!(value["behavior"], "DefaultIdle");
    assert_eq!(value["needs"]["hunger"], 1);
    assert_eq!(value["pose"]["heading"], 0);
    assert_eq!(value["outcome"], "Completed");

    let back: CycleReport = serde_json::from_value(value).unwrap();
    assert_eq!(back, report);
}

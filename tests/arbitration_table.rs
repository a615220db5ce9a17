//! Exhaustive checks of the priority table over a grid of situations.

use petbot_core::arbiter::RULES;
use petbot_core::{arbitrate, ArbiterThresholds, Behavior, Coord, MarkerId, NeedsState, Sighting, Situation};

const LEVELS: [u32; 7] = [0, 3, 6, 300, 600, 800, 1001];

/// Sighting variants: absent, moving, still but off-axis, still and aligned.
fn variants(x: i32) -> [Option<Sighting>; 4] {
    let at = Coord::new(x, x);
    [
        None,
        Some(Sighting {
            position: at,
            stationary: false,
            aligned: true,
        }),
        Some(Sighting {
            position: at,
            stationary: true,
            aligned: false,
        }),
        Some(Sighting {
            position: at,
            stationary: true,
            aligned: true,
        }),
    ]
}

fn for_each_situation(mut check: impl FnMut(&Situation)) {
    for &hunger in &LEVELS {
        for &tiredness in &LEVELS {
            for &boredom in &LEVELS {
                for alive in [true, false] {
                    let needs = NeedsState {
                        hunger,
                        tiredness,
                        boredom,
                        alive,
                    };
                    let over_limit = needs.all_exceed(1000);
                    for boombox in variants(1) {
                        for ball in variants(2) {
                            for bed in variants(3) {
                                for food in variants(4) {
                                    let mut s = Situation::new(needs, over_limit);
                                    s.boombox = boombox;
                                    s.ball = ball;
                                    s.bed = bed;
                                    s.food = food;
                                    check(&s);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn still(s: Option<Sighting>) -> bool {
    s.map_or(false, |s| s.stationary)
}

#[test]
fn test_winning_rule_is_the_first_that_matches() {
    let t = ArbiterThresholds::default();
    for_each_situation(|s| {
        let (rule, behavior) = arbitrate(s, &t);
        let first = RULES
            .iter()
            .position(|r| (r.select)(s, &t).is_some())
            .expect("idle always matches");
        assert_eq!(rule.name, RULES[first].name, "{:?}", s);
        assert_eq!(Some(behavior), (RULES[first].select)(s, &t));
    });
}

#[test]
fn test_dead_robot_only_waits_or_resurrects() {
    let t = ArbiterThresholds::default();
    for_each_situation(|s| {
        if s.needs.alive {
            return;
        }
        let behavior = arbitrate(s, &t).1;
        let expected = if s.calming_all_present() {
            Behavior::Resurrect
        } else {
            Behavior::StayDead
        };
        assert_eq!(behavior, expected, "{:?}", s);
    });
}

#[test]
fn test_die_only_when_alive_and_over_limit() {
    let t = ArbiterThresholds::default();
    for_each_situation(|s| {
        let died = arbitrate(s, &t).1 == Behavior::Die;
        assert_eq!(died, s.needs.alive && s.over_limit, "{:?}", s);
    });
}

#[test]
fn test_activities_need_a_still_aligned_target() {
    let t = ArbiterThresholds::default();
    for_each_situation(|s| {
        let behavior = arbitrate(s, &t).1;
        let sighting = match behavior {
            Behavior::Kick { .. } => s.ball,
            Behavior::Sleep { .. } => s.bed,
            Behavior::Eat { .. } => s.food,
            Behavior::TurnTo { marker, target } => {
                let seen = s.sighting(marker).expect("turn target must be in view");
                assert_eq!(seen.position, target);
                assert!(seen.stationary && !seen.aligned, "{:?}", s);
                return;
            }
            Behavior::Dance => {
                assert!(still(s.boombox), "{:?}", s);
                return;
            }
            _ => return,
        };
        let seen = sighting.expect("activity target must be in view");
        assert!(seen.stationary && seen.aligned, "{:?}", s);
        assert_eq!(behavior.target(), Some(seen.position));
    });
}

#[test]
fn test_dance_outranks_every_object_rule() {
    let t = ArbiterThresholds::default();
    for_each_situation(|s| {
        let wants_dance = s.needs.alive
            && !s.over_limit
            && still(s.boombox)
            && s.needs.tiredness < t.dance_max_tiredness
            && s.needs.boredom > t.play_min_boredom;
        if wants_dance {
            assert_eq!(arbitrate(s, &t).1, Behavior::Dance, "{:?}", s);
        }
    });
}

#[test]
fn test_ball_outranks_bed_and_bowl() {
    let t = ArbiterThresholds::default();
    for_each_situation(|s| {
        let behavior = arbitrate(s, &t).1;
        let ball_wins = matches!(
            behavior,
            Behavior::Kick { .. } | Behavior::TurnTo { marker: MarkerId::Ball, .. }
        );
        let wants_ball = s.needs.alive
            && !s.over_limit
            && still(s.ball)
            && s.needs.boredom > t.play_min_boredom
            && !(still(s.boombox) && s.needs.tiredness < t.dance_max_tiredness);
        assert_eq!(ball_wins, wants_ball, "{:?}", s);
    });
}

#[test]
fn test_idle_variants_follow_need_order() {
    let t = ArbiterThresholds::default();
    for_each_situation(|s| {
        let expected = if s.needs.tiredness > t.tired_idle {
            Behavior::TiredIdle
        } else if s.needs.hunger > t.hungry_idle {
            Behavior::HungryIdle
        } else if s.needs.boredom > t.bored_idle {
            Behavior::BoredIdle
        } else {
            Behavior::DefaultIdle
        };
        match arbitrate(s, &t).1 {
            b @ (Behavior::TiredIdle | Behavior::HungryIdle | Behavior::BoredIdle | Behavior::DefaultIdle) => {
                assert_eq!(b, expected, "{:?}", s)
            }
            _ => {}
        }
    });
}

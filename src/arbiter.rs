/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Behaviour arbitration: one behaviour per perception cycle.
//!
//! The arbiter is a pure function. Everything stateful (stability history,
//! pose, needs) is resolved by the caller into a [`Situation`] first, so the
//! priority table can be tested exhaustively without hardware.
//!
//! # Priority table
//!
//! Rules are evaluated top-down; the first that matches wins.
//!
//! | # | Rule | Condition | Behaviour |
//! |---|------|-----------|-----------|
//! | 1 | resurrect | dead, boombox + bed + bowl in view | [`Behavior::Resurrect`] |
//! | 2 | die | alive, every need over the limit | [`Behavior::Die`] |
//! | 3 | stay-dead | dead | [`Behavior::StayDead`] |
//! | 4 | dance | boombox, tiredness < 500, boredom > 5, boombox still | [`Behavior::Dance`] |
//! | 5 | play | ball, boredom > 5, ball still | kick, or turn to ball |
//! | 6 | sleep | bed, tiredness > 5, bed still | sleep, or turn to bed |
//! | 7 | eat | bowl, hunger > 2, bowl still | eat, or turn to bowl |
//! | 8 | tired | tiredness > 500 | [`Behavior::TiredIdle`] |
//! | 9 | hungry | hunger > 700 | [`Behavior::HungryIdle`] |
//! | 10 | bored | boredom > 250 | [`Behavior::BoredIdle`] |
//! | 11 | idle | always | [`Behavior::DefaultIdle`] |
//!
//! Without a pose the table is not consulted: the robot is either
//! [`Behavior::Searching`] (never located) or [`Behavior::Lost`].

use crate::marker::{Coord, MarkerId};
use crate::needs::{Activity, NeedsState};

// ─── Thresholds ─────────────────────────────────────────────────────────────

/// Needs gates used by the priority table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArbiterThresholds {
    /// Dancing needs tiredness strictly below this.
    pub dance_max_tiredness: u32,
    /// Dancing and ball play need boredom strictly above this.
    pub play_min_boredom: u32,
    /// Going to bed needs tiredness strictly above this.
    pub sleep_min_tiredness: u32,
    /// Eating needs hunger strictly above this.
    pub eat_min_hunger: u32,
    /// Tired idle above this tiredness.
    pub tired_idle: u32,
    /// Hungry idle above this hunger.
    pub hungry_idle: u32,
    /// Bored idle above this boredom.
    pub bored_idle: u32,
}

impl Default for ArbiterThresholds {
    fn default() -> Self {
        Self {
            dance_max_tiredness: 500,
            play_min_boredom: 5,
            sleep_min_tiredness: 5,
            eat_min_hunger: 2,
            tired_idle: 500,
            hungry_idle: 700,
            bored_idle: 250,
        }
    }
}

// ─── Inputs ─────────────────────────────────────────────────────────────────

/// An object marker seen this cycle, with its motion gates resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sighting {
    /// Where the marker is.
    pub position: Coord,
    /// Marker has not moved since last cycle.
    pub stationary: bool,
    /// Robot heading is within tolerance of the marker.
    pub aligned: bool,
}

/// Everything the priority table looks at, for a cycle with a known pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Situation {
    /// Current needs.
    pub needs: NeedsState,
    /// Every need is above the death threshold.
    pub over_limit: bool,
    /// Boombox sighting.
    pub boombox: Option<Sighting>,
    /// Ball sighting.
    pub ball: Option<Sighting>,
    /// Bed sighting.
    pub bed: Option<Sighting>,
    /// Food bowl sighting.
    pub food: Option<Sighting>,
}

impl Situation {
    /// Situation with the given needs and nothing in view.
    pub fn new(needs: NeedsState, over_limit: bool) -> Self {
        Self {
            needs,
            over_limit,
            boombox: None,
            ball: None,
            bed: None,
            food: None,
        }
    }

    /// Sighting slot for an object marker (`None` for body markers).
    pub fn sighting(&self, id: MarkerId) -> Option<Sighting> {
        match id {
            MarkerId::Boombox => self.boombox,
            MarkerId::Ball => self.ball,
            MarkerId::Bed => self.bed,
            MarkerId::FoodBowl => self.food,
            MarkerId::SmallBody | MarkerId::LargeBody => None,
        }
    }

    /// Store a sighting for an object marker. Body markers are ignored.
    pub fn set_sighting(&mut self, id: MarkerId, sighting: Option<Sighting>) {
        match id {
            MarkerId::Boombox => self.boombox = sighting,
            MarkerId::Ball => self.ball = sighting,
            MarkerId::Bed => self.bed = sighting,
            MarkerId::FoodBowl => self.food = sighting,
            MarkerId::SmallBody | MarkerId::LargeBody => {}
        }
    }

    /// Boombox, bed and bowl are all in view.
    pub fn calming_all_present(&self) -> bool {
        self.boombox.is_some() && self.bed.is_some() && self.food.is_some()
    }
}

/// What perception produced this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Perception {
    /// No pose yet, and there never has been one.
    NeverLocated,
    /// No pose now, but there was one before.
    Lost,
    /// Pose known; arbitrate on the situation.
    Located(Situation),
}

// ─── Output ─────────────────────────────────────────────────────────────────

/// The single behaviour chosen for a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Behavior {
    /// Waiting for the first pose.
    Searching,
    /// Pose lost; stop and show the lost face.
    Lost,
    /// Back from the dead.
    Resurrect,
    /// Needs neglected for too long.
    Die,
    /// Still dead.
    StayDead,
    /// Dance to the boombox.
    Dance,
    /// Kick the ball at `target`.
    Kick {
        /// Ball position.
        target: Coord,
    },
    /// Pivot toward `marker` at `target`.
    TurnTo {
        /// Marker being approached.
        marker: MarkerId,
        /// Marker position.
        target: Coord,
    },
    /// Drive to the bed at `target` and sleep.
    Sleep {
        /// Bed position.
        target: Coord,
    },
    /// Drive to the bowl at `target` and eat.
    Eat {
        /// Bowl position.
        target: Coord,
    },
    /// Tired face, idle swing.
    TiredIdle,
    /// Angry face, idle swing.
    HungryIdle,
    /// Sad face, idle swing.
    BoredIdle,
    /// Idle face, idle swing.
    DefaultIdle,
}

impl Behavior {
    /// Short name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Behavior::Searching => "searching",
            Behavior::Lost => "lost",
            Behavior::Resurrect => "resurrect",
            Behavior::Die => "die",
            Behavior::StayDead => "stay-dead",
            Behavior::Dance => "dance",
            Behavior::Kick { .. } => "kick",
            Behavior::TurnTo { .. } => "turn-to",
            Behavior::Sleep { .. } => "sleep",
            Behavior::Eat { .. } => "eat",
            Behavior::TiredIdle => "tired-idle",
            Behavior::HungryIdle => "hungry-idle",
            Behavior::BoredIdle => "bored-idle",
            Behavior::DefaultIdle => "idle",
        }
    }

    /// Target marker position, if the behaviour has one.
    pub fn target(&self) -> Option<Coord> {
        match *self {
            Behavior::Kick { target }
            | Behavior::TurnTo { target, .. }
            | Behavior::Sleep { target }
            | Behavior::Eat { target } => Some(target),
            _ => None,
        }
    }

    /// Needs-changing activity performed when this behaviour completes.
    pub fn activity(&self) -> Option<Activity> {
        match self {
            Behavior::Dance => Some(Activity::Dance),
            Behavior::Kick { .. } => Some(Activity::KickBall),
            Behavior::Sleep { .. } => Some(Activity::Sleep),
            Behavior::Eat { .. } => Some(Activity::Eat),
            _ => None,
        }
    }
}

// ─── Rules ──────────────────────────────────────────────────────────────────

/// One row of the priority table.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Rule name, for logs.
    pub name: &'static str,
    /// Returns the behaviour when the rule matches.
    pub select: fn(&Situation, &ArbiterThresholds) -> Option<Behavior>,
}

impl core::fmt::Debug for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Approach an object: act when facing it, otherwise turn toward it.
fn approach(marker: MarkerId, sighting: Sighting, act: fn(Coord) -> Behavior) -> Behavior {
    if sighting.aligned {
        act(sighting.position)
    } else {
        Behavior::TurnTo {
            marker,
            target: sighting.position,
        }
    }
}

/// A still sighting of `sighting`'s marker, gated by `need`.
fn still_if(sighting: Option<Sighting>, need: bool) -> Option<Sighting> {
    sighting.filter(|s| need && s.stationary)
}

/// The priority table, highest priority first.
pub static RULES: [Rule; 11] = [
    Rule {
        name: "resurrect",
        select: |s, _| (!s.needs.alive && s.calming_all_present()).then_some(Behavior::Resurrect),
    },
    Rule {
        name: "die",
        select: |s, _| (s.needs.alive && s.over_limit).then_some(Behavior::Die),
    },
    Rule {
        name: "stay-dead",
        select: |s, _| (!s.needs.alive).then_some(Behavior::StayDead),
    },
    Rule {
        name: "dance",
        select: |s, t| {
            let need = s.needs.tiredness < t.dance_max_tiredness && s.needs.boredom > t.play_min_boredom;
            still_if(s.boombox, need).map(|_| Behavior::Dance)
        },
    },
    Rule {
        name: "play",
        select: |s, t| {
            still_if(s.ball, s.needs.boredom > t.play_min_boredom)
                .map(|b| approach(MarkerId::Ball, b, |target| Behavior::Kick { target }))
        },
    },
    Rule {
        name: "sleep",
        select: |s, t| {
            still_if(s.bed, s.needs.tiredness > t.sleep_min_tiredness)
                .map(|b| approach(MarkerId::Bed, b, |target| Behavior::Sleep { target }))
        },
    },
    Rule {
        name: "eat",
        select: |s, t| {
            still_if(s.food, s.needs.hunger > t.eat_min_hunger)
                .map(|b| approach(MarkerId::FoodBowl, b, |target| Behavior::Eat { target }))
        },
    },
    Rule {
        name: "tired",
        select: |s, t| (s.needs.tiredness > t.tired_idle).then_some(Behavior::TiredIdle),
    },
    Rule {
        name: "hungry",
        select: |s, t| (s.needs.hunger > t.hungry_idle).then_some(Behavior::HungryIdle),
    },
    Rule {
        name: "bored",
        select: |s, t| (s.needs.boredom > t.bored_idle).then_some(Behavior::BoredIdle),
    },
    Rule {
        name: "idle",
        select: |_, _| Some(Behavior::DefaultIdle),
    },
];

/// Evaluate the priority table; returns the winning rule and its behaviour.
pub fn arbitrate(situation: &Situation, thresholds: &ArbiterThresholds) -> (&'static Rule, Behavior) {
    for rule in RULES.iter() {
        if let Some(behavior) = (rule.select)(situation, thresholds) {
            return (rule, behavior);
        }
    }
    (&RULES[RULES.len() - 1], Behavior::DefaultIdle)
}

/// Full decision for a cycle, including the pose-less cases.
pub fn decide(perception: &Perception, thresholds: &ArbiterThresholds) -> Behavior {
    match perception {
        Perception::NeverLocated => Behavior::Searching,
        Perception::Lost => Behavior::Lost,
        Perception::Located(situation) => arbitrate(situation, thresholds).1,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

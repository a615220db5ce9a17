/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Needs engine: hunger, tiredness, boredom, and life itself.
//!
//! Three counters drift upwards by a small random amount every cycle.
//! Activities pay some of them back and cost others. If all three are left
//! to climb past the death threshold the robot dies, and it stays dead until
//! someone shows it the food bowl, the bed and the boombox at once.
//!
//! ```text
//!            all counters > 1000
//!   Alive ───────────────────────────▶ Dead
//!     ▲                                  │
//!     └──────────────────────────────────┘
//!       boombox + bed + bowl in view → counters reset to 0
//! ```
//!
//! # Invariants
//!
//! - Counters only grow, except through [`NeedsEngine::complete`] and the
//!   reset in [`NeedsEngine::try_resurrect`].
//! - Death does not reset the counters.
//! - `alive == false` is sticky until [`NeedsEngine::try_resurrect`] succeeds.

use rand::{Rng, RngCore};

// ─── Configuration ──────────────────────────────────────────────────────────

/// Tunable constants of the needs engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NeedsConfig {
    /// All three counters must exceed this for the robot to die.
    pub death_threshold: u32,
    /// Upper bound (inclusive) of the per-cycle random drift.
    pub max_drift: u32,
    /// Amount an activity adds to the needs it costs.
    pub activity_cost: u32,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            death_threshold: 1000,
            max_drift: 4,
            activity_cost: 200,
        }
    }
}

// ─── State ──────────────────────────────────────────────────────────────────

/// Snapshot of the robot's needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeedsState {
    /// Grows every cycle; cleared by eating.
    pub hunger: u32,
    /// Grows every cycle; cleared by sleeping.
    pub tiredness: u32,
    /// Grows every cycle; cleared by dancing or kicking the ball.
    pub boredom: u32,
    /// `false` once the robot has died.
    pub alive: bool,
}

impl NeedsState {
    /// Newborn state: all counters zero, alive.
    pub const fn new() -> Self {
        Self {
            hunger: 0,
            tiredness: 0,
            boredom: 0,
            alive: true,
        }
    }

    /// `true` when every counter is strictly above `threshold`.
    pub fn all_exceed(&self, threshold: u32) -> bool {
        self.hunger > threshold && self.tiredness > threshold && self.boredom > threshold
    }
}

impl Default for NeedsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Activities that change the needs once they have fully run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Activity {
    /// Danced to the boombox.
    Dance,
    /// Kicked the ball.
    KickBall,
    /// Slept in the bed.
    Sleep,
    /// Ate from the food bowl.
    Eat,
}

// ─── Drift sources ──────────────────────────────────────────────────────────

/// Supplies the per-counter, per-cycle drift.
pub trait DriftSource {
    /// Next drift value in `0..=max`.
    fn next_drift(&mut self, max: u32) -> u32;
}

/// Uniform random drift from any [`RngCore`].
#[derive(Clone, Debug)]
pub struct RandomDrift<R: RngCore> {
    rng: R,
}

impl<R: RngCore> RandomDrift<R> {
    /// Wrap a random number generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> DriftSource for RandomDrift<R> {
    fn next_drift(&mut self, max: u32) -> u32 {
        self.rng.gen_range(0..=max)
    }
}

/// Constant drift, clamped to `max`. Used for deterministic simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDrift(pub u32);

impl DriftSource for FixedDrift {
    fn next_drift(&mut self, max: u32) -> u32 {
        self.0.min(max)
    }
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Owner of the [`NeedsState`] and its transitions.
#[derive(Clone, Debug, Default)]
pub struct NeedsEngine {
    state: NeedsState,
    config: NeedsConfig,
}

impl NeedsEngine {
    /// Newborn engine with the given configuration.
    pub fn new(config: NeedsConfig) -> Self {
        Self {
            state: NeedsState::new(),
            config,
        }
    }

    /// Current state.
    pub fn state(&self) -> NeedsState {
        self.state
    }

    /// Engine configuration.
    pub fn config(&self) -> &NeedsConfig {
        &self.config
    }

    /// `true` when every counter is above the death threshold.
    pub fn over_limit(&self) -> bool {
        self.state.all_exceed(self.config.death_threshold)
    }

    /// End-of-cycle drift: each counter grows by an independent draw.
    pub fn tick<D: DriftSource>(&mut self, drift: &mut D) {
        let max = self.config.max_drift;
        self.state.hunger = self.state.hunger.saturating_add(drift.next_drift(max));
        self.state.boredom = self.state.boredom.saturating_add(drift.next_drift(max));
        self.state.tiredness = self.state.tiredness.saturating_add(drift.next_drift(max));
    }

    /// Die if alive and over the limit. Returns `true` on the transition.
    pub fn try_die(&mut self) -> bool {
        if self.state.alive && self.over_limit() {
            self.state.alive = false;
            true
        } else {
            false
        }
    }

    /// Come back to life if dead and all calming markers are in view.
    ///
    /// Resets every counter to zero. Returns `true` on the transition.
    pub fn try_resurrect(&mut self, calming_all_present: bool) -> bool {
        if !self.state.alive && calming_all_present {
            self.state = NeedsState::new();
            true
        } else {
            false
        }
    }

    /// Apply the needs change of a fully executed activity.
    pub fn complete(&mut self, activity: Activity) {
        let cost = self.config.activity_cost;
        let s = &mut self.state;
        match activity {
            Activity::Dance | Activity::KickBall => {
                s.tiredness = s.tiredness.saturating_add(cost);
                s.hunger = s.hunger.saturating_add(cost);
                s.boredom = 0;
            }
            Activity::Sleep => {
                s.tiredness = 0;
                s.hunger = s.hunger.saturating_add(cost);
                s.boredom = s.boredom.saturating_add(cost);
            }
            Activity::Eat => {
                s.hunger = 0;
            }
        }
    }

    /// Overwrite the state (simulation and tests).
    pub fn set_state(&mut self, state: NeedsState) {
        self.state = state;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

//! Python FFI bindings via PyO3.
//!
//! Exposes the decision core (needs, arbitration, turn geometry) to Python
//! so behaviour tuning can be scripted against recorded sessions without the
//! robot.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from petbot_core import Needs, arbitrate, turn_bucket
//!
//! needs = Needs(seed=7)
//! for _ in range(100):
//!     needs.tick()
//!
//! # sightings are (x, y, stationary, aligned) tuples or None
//! rule, behavior = arbitrate(needs, food=(300, 120, True, False))
//! print(rule, behavior)                       # eat turn-to
//! print(turn_bucket(0, 120, 100, 120, 200))   # coarse-toward
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::arbiter::{arbitrate as rust_arbitrate, ArbiterThresholds, Sighting, Situation};
use crate::marker::Coord;
use crate::motion::{MotionConfig, TurnBucket};
use crate::needs::{Activity, NeedsConfig, NeedsEngine, RandomDrift};
use crate::pose::{turn_angle as rust_turn_angle, RobotPose};

/// `(x, y, stationary, aligned)` as passed from Python.
type PySighting = (i32, i32, bool, bool);

fn sighting(raw: Option<PySighting>) -> Option<Sighting> {
    raw.map(|(x, y, stationary, aligned)| Sighting {
        position: Coord::new(x, y),
        stationary,
        aligned,
    })
}

fn parse_activity(name: &str) -> PyResult<Activity> {
    match name {
        "dance" => Ok(Activity::Dance),
        "kick" => Ok(Activity::KickBall),
        "sleep" => Ok(Activity::Sleep),
        "eat" => Ok(Activity::Eat),
        other => Err(PyValueError::new_err(format!(
            "unknown activity {other:?}, expected dance, kick, sleep or eat"
        ))),
    }
}

// ── Needs ─────────────────────────────────────────────────────────────────────

/// Hunger, tiredness and boredom with death and resurrection.
#[pyclass(name = "Needs")]
pub struct PyNeeds {
    inner: NeedsEngine,
    drift: RandomDrift<SmallRng>,
}

#[pymethods]
impl PyNeeds {
    /// Create a newborn needs engine.
    ///
    /// Args:
    ///     seed: random seed for the per-cycle drift (default 0)
    ///     death_threshold: all three needs above this kill the robot (default 1000)
    #[new]
    #[pyo3(signature = (seed=0, death_threshold=1000))]
    pub fn new(seed: u64, death_threshold: u32) -> Self {
        Self {
            inner: NeedsEngine::new(NeedsConfig {
                death_threshold,
                ..NeedsConfig::default()
            }),
            drift: RandomDrift::new(SmallRng::seed_from_u64(seed)),
        }
    }

    /// Current hunger.
    #[getter]
    pub fn hunger(&self) -> u32 {
        self.inner.state().hunger
    }

    /// Current tiredness.
    #[getter]
    pub fn tiredness(&self) -> u32 {
        self.inner.state().tiredness
    }

    /// Current boredom.
    #[getter]
    pub fn boredom(&self) -> u32 {
        self.inner.state().boredom
    }

    /// False once the robot has died.
    #[getter]
    pub fn alive(&self) -> bool {
        self.inner.state().alive
    }

    /// Apply one cycle of random drift.
    pub fn tick(&mut self) {
        self.inner.tick(&mut self.drift);
    }

    /// Die if every need is over the threshold. Returns True on the transition.
    pub fn try_die(&mut self) -> bool {
        self.inner.try_die()
    }

    /// Resurrect if dead and the calming markers are all in view.
    pub fn try_resurrect(&mut self, calming_all_present: bool) -> bool {
        self.inner.try_resurrect(calming_all_present)
    }

    /// Apply the needs change of a completed activity: "dance", "kick", "sleep" or "eat".
    pub fn complete(&mut self, activity: &str) -> PyResult<()> {
        self.inner.complete(parse_activity(activity)?);
        Ok(())
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        let s = self.inner.state();
        format!(
            "Needs(hunger={}, tiredness={}, boredom={}, alive={})",
            s.hunger,
            s.tiredness,
            s.boredom,
            if s.alive { "True" } else { "False" }
        )
    }
}

// ── Free functions ────────────────────────────────────────────────────────────

/// Run the priority table.
///
/// Args:
///     needs:   Needs instance
///     boombox, ball, bed, food: (x, y, stationary, aligned) or None
///
/// Returns:
///     (rule name, behaviour name)
#[pyfunction]
#[pyo3(signature = (needs, boombox=None, ball=None, bed=None, food=None))]
pub fn arbitrate(
    needs: &PyNeeds,
    boombox: Option<PySighting>,
    ball: Option<PySighting>,
    bed: Option<PySighting>,
    food: Option<PySighting>,
) -> (&'static str, &'static str) {
    let mut situation = Situation::new(needs.inner.state(), needs.inner.over_limit());
    situation.boombox = sighting(boombox);
    situation.ball = sighting(ball);
    situation.bed = sighting(bed);
    situation.food = sighting(food);
    let (rule, behavior) = rust_arbitrate(&situation, &ArbiterThresholds::default());
    (rule.name, behavior.name())
}

/// Signed turn (degrees) from a pose to a target.
#[pyfunction]
pub fn turn_angle(heading: i32, x: i32, y: i32, target_x: i32, target_y: i32) -> i32 {
    let pose = RobotPose {
        position: Coord::new(x, y),
        heading,
    };
    rust_turn_angle(&pose, Coord::new(target_x, target_y))
}

/// Turn response bucket for a pose and target, with default calibration.
#[pyfunction]
pub fn turn_bucket(heading: i32, x: i32, y: i32, target_x: i32, target_y: i32) -> &'static str {
    let angle = turn_angle(heading, x, y, target_x, target_y);
    match TurnBucket::select(angle, &MotionConfig::default()) {
        TurnBucket::CoarseToward => "coarse-toward",
        TurnBucket::FineToward => "fine-toward",
        TurnBucket::CoarseAway => "coarse-away",
        TurnBucket::FineAway => "fine-away",
        TurnBucket::Hold => "hold",
    }
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Pet robot decision core Python bindings.
#[pymodule]
pub fn petbot_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyNeeds>()?;
    m.add_function(wrap_pyfunction!(arbitrate, m)?)?;
    m.add_function(wrap_pyfunction!(turn_angle, m)?)?;
    m.add_function(wrap_pyfunction!(turn_bucket, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

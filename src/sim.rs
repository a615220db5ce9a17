//! Simulated collaborators for host-side runs and tests.
//!
//! Every type here records what it was asked to do and never blocks:
//! [`SimClock`] advances a counter instead of sleeping, [`SceneVision`]
//! renders a scripted list of marker layouts into blob sets. Together they
//! let the whole control loop run thousands of cycles in a test.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use crate::error::{ActuatorError, PlaybackError};
use crate::hal::{Actuator, Clock, Direction, LedStrip, Side, VideoPlayer};
use crate::marker::{MarkerTable, Observations, Rgb};
use crate::vision::{Blob, BlobSet, VisionService};

// ─── Actuator ───────────────────────────────────────────────────────────────

/// One call made on a [`SimActuator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActuatorEvent {
    /// `set_motor`.
    Motor(Side, u8, Direction),
    /// `set_servo`.
    Servo(f32),
    /// `stop_all_motors`.
    StopAll,
    /// `release`.
    Release,
}

/// Recording motor/servo driver.
#[derive(Clone, Debug, Default)]
pub struct SimActuator {
    /// Every call, in order.
    pub events: Vec<ActuatorEvent>,
    /// Reject every `set_motor` call.
    pub reject_motors: bool,
    duty: [u8; 2],
    released: bool,
}

impl SimActuator {
    /// New, idle driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when neither wheel has a nonzero duty applied.
    pub fn is_stopped(&self) -> bool {
        self.duty == [0, 0]
    }

    /// `true` once `release` has been called.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Servo duties written so far.
    pub fn servo_writes(&self) -> Vec<f32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ActuatorEvent::Servo(d) => Some(*d),
                _ => None,
            })
            .collect()
    }
}

impl Actuator for SimActuator {
    fn set_motor(&mut self, side: Side, duty: u8, direction: Direction) -> Result<(), ActuatorError> {
        if self.released {
            return Err(ActuatorError::Released);
        }
        if self.reject_motors {
            return Err(ActuatorError::MotorRejected { side, duty });
        }
        self.events.push(ActuatorEvent::Motor(side, duty, direction));
        let slot = match side {
            Side::Left => 0,
            Side::Right => 1,
        };
        self.duty[slot] = duty;
        Ok(())
    }

    fn set_servo(&mut self, duty: f32) -> Result<(), ActuatorError> {
        if self.released {
            return Err(ActuatorError::Released);
        }
        self.events.push(ActuatorEvent::Servo(duty));
        Ok(())
    }

    fn stop_all_motors(&mut self) -> Result<(), ActuatorError> {
        if self.released {
            return Err(ActuatorError::Released);
        }
        self.events.push(ActuatorEvent::StopAll);
        self.duty = [0, 0];
        Ok(())
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        if self.released {
            return Err(ActuatorError::Released);
        }
        self.events.push(ActuatorEvent::Release);
        self.duty = [0, 0];
        self.released = true;
        Ok(())
    }
}

// ─── LEDs ───────────────────────────────────────────────────────────────────

/// Recording LED strip.
#[derive(Clone, Debug, Default)]
pub struct SimLeds {
    staged: Option<Rgb>,
    /// Colours latched with `show`, in order.
    pub shown: Vec<Rgb>,
}

impl SimLeds {
    /// Dark strip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour currently latched on the strip.
    pub fn current(&self) -> Option<Rgb> {
        self.shown.last().copied()
    }
}

impl LedStrip for SimLeds {
    fn set_all_pixels(&mut self, color: Rgb) -> Result<(), ActuatorError> {
        self.staged = Some(color);
        Ok(())
    }

    fn show(&mut self) -> Result<(), ActuatorError> {
        match self.staged {
            Some(color) => {
                self.shown.push(color);
                Ok(())
            }
            None => Err(ActuatorError::Fault("nothing staged")),
        }
    }
}

// ─── Video player ───────────────────────────────────────────────────────────

/// Video player that misbehaves like the real one.
///
/// `is_playing` fails with [`PlaybackError::NoHandle`] before the first
/// `play` and after `stop`, and with [`PlaybackError::StaleHandle`] whenever
/// `stale` is set.
#[derive(Clone, Debug, Default)]
pub struct SimPlayer {
    /// Asset paths passed to `play`, in order.
    pub played: Vec<String>,
    /// Number of `stop` calls that found a handle.
    pub stops: u32,
    /// Report the current video as still running.
    pub looping: bool,
    /// Fail every state query.
    pub stale: bool,
    handle: bool,
}

impl SimPlayer {
    /// Player with no handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asset most recently started.
    pub fn last_played(&self) -> Option<&str> {
        self.played.last().map(String::as_str)
    }
}

impl VideoPlayer for SimPlayer {
    fn play(&mut self, path: &str) -> Result<(), PlaybackError> {
        self.played.push(String::from(path));
        self.handle = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlaybackError> {
        if !self.handle {
            return Err(PlaybackError::NoHandle);
        }
        self.handle = false;
        self.stops += 1;
        Ok(())
    }

    fn is_playing(&mut self) -> Result<bool, PlaybackError> {
        if self.stale {
            Err(PlaybackError::StaleHandle)
        } else if !self.handle {
            Err(PlaybackError::NoHandle)
        } else {
            Ok(self.looping)
        }
    }
}

// ─── Clock ──────────────────────────────────────────────────────────────────

/// Clock that only counts.
///
/// Optionally raises an interrupt flag once a given amount of simulated time
/// has passed, which is how tests cancel a plan part-way through.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    elapsed: Duration,
    pauses: u64,
    interrupt_at: Option<(Duration, Arc<AtomicBool>)>,
}

impl SimClock {
    /// Clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `flag` once `at` has elapsed.
    pub fn interrupt_at(mut self, at: Duration, flag: Arc<AtomicBool>) -> Self {
        self.interrupt_at = Some((at, flag));
        self
    }

    /// Total simulated time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of `pause` calls.
    pub fn pauses(&self) -> u64 {
        self.pauses
    }
}

impl Clock for SimClock {
    fn pause(&mut self, duration: Duration) {
        self.elapsed += duration;
        self.pauses += 1;
        if let Some((at, flag)) = &self.interrupt_at {
            if self.elapsed >= *at {
                flag.store(true, Ordering::SeqCst);
            }
        }
    }
}

// ─── Vision ─────────────────────────────────────────────────────────────────

/// Vision service that renders scripted marker layouts.
///
/// Each captured frame is the next [`Observations`] in the script; once the
/// script runs out the last layout repeats. A marker is rendered as one
/// circular blob of its class's colour with an area in the middle of the
/// class's band, so the tracker finds it exactly where it was placed.
#[derive(Clone, Debug)]
pub struct SceneVision {
    table: MarkerTable,
    script: VecDeque<Observations>,
    last: Observations,
    /// Number of segmentations requested.
    pub segmentations: u64,
}

impl SceneVision {
    /// Vision over `table` with an empty scene.
    pub fn new(table: MarkerTable) -> Self {
        Self {
            table,
            script: VecDeque::new(),
            last: Observations::empty(),
            segmentations: 0,
        }
    }

    /// Queue one frame.
    pub fn push_frame(&mut self, scene: Observations) -> &mut Self {
        self.script.push_back(scene);
        self
    }

    /// Queue `count` copies of one frame.
    pub fn repeat_frame(&mut self, scene: Observations, count: usize) -> &mut Self {
        for _ in 0..count {
            self.script.push_back(scene);
        }
        self
    }
}

impl VisionService for SceneVision {
    type Frame = Observations;

    fn capture(&mut self) -> Observations {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }

    fn find_circular_blobs(&mut self, frame: &Observations, target: Rgb, _threshold: u8, _tol: f32) -> BlobSet {
        self.segmentations += 1;
        let mut blobs = BlobSet::new();
        for class in self.table.iter().filter(|c| c.color == target) {
            if let Some(at) = frame.get(class.id) {
                let area = class.min_area + (class.max_area - class.min_area) / 2;
                let _ = blobs.push(Blob { position: at, area });
            }
        }
        blobs
    }
}

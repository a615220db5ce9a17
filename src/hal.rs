//! Collaborator interfaces: actuators, LED strip, face video player, clock.
//!
//! These are the thin I/O layers the control loop drives but does not own.
//! The host application implements them over GPIO/PWM, an SPI LED driver and
//! an external video player; tests implement them with recording fakes.
//!
//! Every blocking pause in the crate goes through [`Clock::pause`], so a
//! behaviour plan can be executed against a fake clock in microseconds.

use core::time::Duration;

use crate::error::{ActuatorError, PlaybackError};
use crate::marker::Rgb;

/// Drive side of the differential base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// Left wheel.
    Left,
    /// Right wheel.
    Right,
}

/// Wheel rotation direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Drive forwards.
    Forward,
    /// Drive backwards.
    Backward,
}

impl Direction {
    /// Split a signed duty (`-100..=100`) into magnitude and direction.
    ///
    /// Zero is reported as [`Direction::Forward`].
    pub fn split(signed_duty: i8) -> (u8, Direction) {
        let magnitude = signed_duty.unsigned_abs().min(100);
        if signed_duty >= 0 {
            (magnitude, Direction::Forward)
        } else {
            (magnitude, Direction::Backward)
        }
    }
}

/// Motor and head-servo output.
pub trait Actuator {
    /// Set one wheel's PWM duty (`0..=100`) and direction pins.
    fn set_motor(&mut self, side: Side, duty: u8, direction: Direction)
        -> Result<(), ActuatorError>;

    /// Set the head servo PWM duty cycle (percent, e.g. 9.5 = down, 11.0 = up).
    fn set_servo(&mut self, duty: f32) -> Result<(), ActuatorError>;

    /// Clear every direction pin so both wheels coast to a stop.
    fn stop_all_motors(&mut self) -> Result<(), ActuatorError>;

    /// Zero all PWM outputs and hand the pins back to the system.
    ///
    /// Called exactly once on shutdown. Further calls may return
    /// [`ActuatorError::Released`].
    fn release(&mut self) -> Result<(), ActuatorError>;
}

/// Addressable LED strip.
pub trait LedStrip {
    /// Stage `color` on every pixel.
    fn set_all_pixels(&mut self, color: Rgb) -> Result<(), ActuatorError>;

    /// Latch the staged colours onto the strip.
    fn show(&mut self) -> Result<(), ActuatorError>;
}

/// External face-animation video player.
///
/// The real player misreports its own state: `is_playing` may fail on a
/// handle whose video has ended. Callers must tolerate every error and
/// recover by stopping and replaying, never by assuming the handle is healthy.
pub trait VideoPlayer {
    /// Start playing the asset at `path`, replacing the current handle.
    fn play(&mut self, path: &str) -> Result<(), PlaybackError>;

    /// Quit the current playback and drop its handle.
    fn stop(&mut self) -> Result<(), PlaybackError>;

    /// Query whether the current video is still running.
    fn is_playing(&mut self) -> Result<bool, PlaybackError>;
}

/// Source of blocking time.
pub trait Clock {
    /// Block the control loop for `duration`.
    fn pause(&mut self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, Default)]
pub struct StdClock;

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

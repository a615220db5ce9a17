//! Fault types reported by the external collaborators.
//!
//! Collaborator faults are never fatal. The actuation runner and the face
//! display catch them at the call site, log them at `warn`, and carry on with
//! the cycle. Perception absence is not represented here at all: a marker
//! that is not seen is simply `None`.

use thiserror::Error;

use crate::hal::Side;

/// Fault raised by the motor/servo/LED hardware layer.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ActuatorError {
    /// The motor driver refused a duty cycle for one side.
    #[error("motor {side:?} rejected duty {duty}%")]
    MotorRejected {
        /// Side whose driver refused the command.
        side: Side,
        /// Requested duty cycle in percent.
        duty: u8,
    },
    /// The servo PWM channel refused a duty cycle.
    #[error("servo rejected duty {0}%")]
    ServoRejected(f32),
    /// The hardware handles were already released.
    #[error("actuation handles already released")]
    Released,
    /// Any other bus or pin failure reported by the driver.
    #[error("hardware fault: {0}")]
    Fault(&'static str),
}

/// Fault raised by the (notoriously unreliable) face video player.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackError {
    /// No player handle exists (nothing was ever started, or it was stopped).
    #[error("no active player handle")]
    NoHandle,
    /// The handle points at a player process that has gone away.
    #[error("player handle is stale")]
    StaleHandle,
    /// The player could not open the requested asset.
    #[error("player failed to open asset")]
    OpenFailed,
}

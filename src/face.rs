//! Face animation on top of the unreliable video player.
//!
//! The face is a looping video on the robot's screen. The player behind it
//! breaks in creative ways: state queries fail on finished videos, `stop`
//! fails when nothing is running. [`FaceDisplay`] absorbs all of that. Every
//! fault is logged and recovered by stopping and replaying; none of them
//! reaches the control loop.

use log::{debug, info, warn};

use crate::hal::VideoPlayer;

/// One face animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Face {
    /// Content, after eating/dancing or on resurrection.
    Happy,
    /// Dead.
    Dead,
    /// Dancing.
    Disco,
    /// About to kick.
    Activated,
    /// Asleep.
    Sleep,
    /// Eating.
    Eating,
    /// Tired idle.
    Tired,
    /// Hungry idle.
    Angry,
    /// Bored idle.
    Sad,
    /// Default idle.
    Idle,
    /// Pose lost.
    Lost,
}

impl Face {
    /// Asset path handed to the video player.
    pub const fn asset_path(self) -> &'static str {
        match self {
            Face::Happy => "faces/happy.mp4",
            Face::Dead => "faces/dead.mp4",
            Face::Disco => "faces/disco.mp4",
            Face::Activated => "faces/activated.mp4",
            Face::Sleep => "faces/sleep.mp4",
            Face::Eating => "faces/eating.mp4",
            Face::Tired => "faces/tired.mp4",
            Face::Angry => "faces/angry.mp4",
            Face::Sad => "faces/sad.mp4",
            Face::Idle => "faces/idle.mp4",
            Face::Lost => "faces/lost.mp4",
        }
    }
}

/// How a face request treats the video already playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaceMode {
    /// Cut the current video and start the new one now.
    Change,
    /// Start the new one only once the current video has finished.
    WhenFinished,
}

/// Face display owning the video player handle.
#[derive(Debug)]
pub struct FaceDisplay<P: VideoPlayer> {
    player: P,
    enabled: bool,
    current: Option<Face>,
}

impl<P: VideoPlayer> FaceDisplay<P> {
    /// Wrap `player`. With `enabled == false` every request is ignored.
    pub fn new(player: P, enabled: bool) -> Self {
        Self {
            player,
            enabled,
            current: None,
        }
    }

    /// Last face successfully started.
    pub fn current(&self) -> Option<Face> {
        self.current
    }

    /// Access the underlying player.
    pub fn player(&self) -> &P {
        &self.player
    }

    /// Request `face` with the given mode.
    pub fn show(&mut self, face: Face, mode: FaceMode) {
        match mode {
            FaceMode::Change => self.change(face),
            FaceMode::WhenFinished => self.show_when_finished(face),
        }
    }

    /// Stop whatever is playing and start `face`.
    pub fn change(&mut self, face: Face) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.player.stop() {
            debug!("no video to stop before {:?}: {}", face, e);
        }
        self.start(face);
    }

    /// Start `face` only if the current video has finished.
    ///
    /// A failed state query is treated as "finished": the handle is
    /// recreated from scratch rather than trusted.
    pub fn show_when_finished(&mut self, face: Face) {
        if !self.enabled {
            return;
        }
        match self.player.is_playing() {
            Ok(true) => {}
            Ok(false) => self.start(face),
            Err(e) => {
                warn!("video state query failed ({}), resetting player", e);
                if let Err(e) = self.player.stop() {
                    debug!("stale player refused to stop: {}", e);
                }
                self.start(face);
            }
        }
    }

    /// Best-effort shutdown: stop anything still running, swallow faults.
    pub fn shutdown(&mut self) {
        if !self.enabled {
            return;
        }
        match self.player.is_playing() {
            Ok(false) => {}
            Ok(true) => {
                info!("stopping face video");
                if let Err(e) = self.player.stop() {
                    warn!("face video did not stop cleanly: {}", e);
                }
            }
            Err(_) => {
                if let Err(e) = self.player.stop() {
                    warn!("face video did not stop cleanly: {}", e);
                }
            }
        }
        self.current = None;
    }

    fn start(&mut self, face: Face) {
        match self.player.play(face.asset_path()) {
            Ok(()) => self.current = Some(face),
            Err(e) => {
                warn!("could not play {:?}: {}", face, e);
                self.current = None;
            }
        }
    }
}

//! Transient signals for the presentation layer: floating text messages and
//! one-shot sound effects.

use serde::{Deserialize, Serialize};

/// A floating text message. The renderer shows it starting at `start_row`
/// (screen rows, hidden rows excluded), scrolling up at `speed` rows per
/// second, for `duration` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub start_row: i32,
    pub duration: f32,
    pub speed: f32,
}

impl Message {
    pub fn new(text: impl Into<String>, start_row: i32, duration: f32, speed: f32) -> Self {
        Self {
            text: text.into(),
            start_row,
            duration,
            speed,
        }
    }
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    Collided,
    LineDeleted,
    LevelUp,
    Hold,
    GameOver,
}

impl SoundEffect {
    /// Stable integer code for hosts that index sound banks by number
    pub fn code(&self) -> i32 {
        match self {
            SoundEffect::Collided => 0,
            SoundEffect::LineDeleted => 1,
            SoundEffect::LevelUp => 2,
            SoundEffect::Hold => 3,
            SoundEffect::GameOver => 4,
        }
    }
}

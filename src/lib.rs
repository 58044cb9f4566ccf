//! BLOCKFALL - a falling-block puzzle engine
//!
//! The engine is frame driven and renderer agnostic: a host feeds it
//! elapsed time and player commands, then reads back the board, the
//! pieces, the score, floating messages and sound cues.

pub mod bag;
pub mod board;
pub mod engine;
pub mod feedback;
pub mod highscore;
pub mod piece;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod srs;
pub mod tetromino;

pub use board::{Board, Cell};
pub use engine::{Engine, EngineConfig, Phase};
pub use feedback::{Message, SoundEffect};
pub use highscore::{HighScore, HighScoreError, HighScores};
pub use piece::Piece;
pub use score::Score;
pub use settings::Settings;
pub use snapshot::Snapshot;
pub use tetromino::{Rotation, RotationDirection, TetrominoType};

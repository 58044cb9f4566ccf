//! Read-only view of an engine for renderers and diagnostics

use crate::board::{Cell, HIDDEN_ROWS};
use crate::engine::{Engine, Phase};
use crate::piece::Piece;
use crate::tetromino::{Rotation, TetrominoType};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceSnapshot {
    pub kind: TetrominoType,
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
    /// Absolute board positions of the four blocks
    pub blocks: [(i32, i32); 4],
}

impl From<&Piece> for PieceSnapshot {
    fn from(piece: &Piece) -> Self {
        Self {
            kind: piece.kind(),
            rotation: piece.rotation(),
            x: piece.x,
            y: piece.y,
            blocks: piece.block_positions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub hidden_rows: usize,
    /// Rows top to bottom, hidden rows included
    pub board: Vec<Vec<Option<Cell>>>,
    pub current: Option<PieceSnapshot>,
    pub next: Option<PieceSnapshot>,
    pub hold: Option<PieceSnapshot>,
    pub ghost: Option<PieceSnapshot>,
    pub points: String,
    pub level: String,
    pub lines_to_clear: String,
    pub can_hold: bool,
    pub phase: Phase,
    pub paused: bool,
    pub game_over: bool,
}

impl Snapshot {
    pub fn capture<R: Rng>(engine: &Engine<R>) -> Self {
        Self {
            hidden_rows: HIDDEN_ROWS,
            board: engine.board().rows().to_vec(),
            current: engine.current().map(PieceSnapshot::from),
            next: engine.next().map(PieceSnapshot::from),
            hold: engine.hold_piece().map(PieceSnapshot::from),
            ghost: engine.ghost().map(PieceSnapshot::from),
            points: engine.points_text(),
            level: engine.level_text(),
            lines_to_clear: engine.lines_to_clear_text(),
            can_hold: engine.can_hold(),
            phase: engine.phase(),
            paused: engine.is_paused(),
            game_over: engine.is_game_over(),
        }
    }

    /// Rows the player sees, without the spawn buffer
    pub fn visible_rows(&self) -> &[Vec<Option<Cell>>] {
        &self.board[self.hidden_rows.min(self.board.len())..]
    }
}

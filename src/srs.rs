//! Super Rotation System (SRS) wall kick data
//!
//! SRS defines the wall kicks attempted when rotating a piece.
//! If a rotation would cause collision, these offsets are tried in order.
//! Offsets are (dx, dy) in board coordinates where y grows downward, so the
//! vertical component is negated relative to the usual SRS charts.

use crate::tetromino::{Rotation, TetrominoType};

/// Which offset table a tetromino rotates with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickCategory {
    /// J, L, S, T and Z share one table
    Jlstz,
    /// The I piece has its own, wider table
    I,
    /// The O piece never needs to kick
    O,
}

impl KickCategory {
    pub fn of(piece_type: TetrominoType) -> Self {
        match piece_type {
            TetrominoType::I => KickCategory::I,
            TetrominoType::O => KickCategory::O,
            _ => KickCategory::Jlstz,
        }
    }
}

type Kicks = [(i32, i32); 5];

const O_KICKS: [(i32, i32); 1] = [(0, 0)];

// JLSTZ
const JLSTZ_0_R: Kicks = [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)];
const JLSTZ_R_0: Kicks = [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)];
const JLSTZ_R_2: Kicks = [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)];
const JLSTZ_2_R: Kicks = [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)];
const JLSTZ_2_L: Kicks = [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)];
const JLSTZ_L_2: Kicks = [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)];
const JLSTZ_L_0: Kicks = [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)];
const JLSTZ_0_L: Kicks = [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)];

// I
const I_0_R: Kicks = [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)];
const I_R_0: Kicks = [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)];
const I_R_2: Kicks = [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)];
const I_2_R: Kicks = [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)];
const I_2_L: Kicks = [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)];
const I_L_2: Kicks = [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)];
const I_L_0: Kicks = [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)];
const I_0_L: Kicks = [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)];

/// Get the wall kick offsets for rotating `piece_type` from `from` to `to`,
/// in the order they must be tried.
///
/// # Panics
///
/// Panics when `from` and `to` are not one quarter turn apart; rotation only
/// ever steps by one state, so any other pair is a caller defect.
pub fn get_wall_kicks(
    piece_type: TetrominoType,
    from: Rotation,
    to: Rotation,
) -> &'static [(i32, i32)] {
    use Rotation::*;

    match KickCategory::of(piece_type) {
        KickCategory::O => &O_KICKS,
        KickCategory::Jlstz => match (from, to) {
            (North, East) => &JLSTZ_0_R,
            (East, North) => &JLSTZ_R_0,
            (East, South) => &JLSTZ_R_2,
            (South, East) => &JLSTZ_2_R,
            (South, West) => &JLSTZ_2_L,
            (West, South) => &JLSTZ_L_2,
            (West, North) => &JLSTZ_L_0,
            (North, West) => &JLSTZ_0_L,
            _ => panic!("no wall kicks defined for {piece_type:?} {from:?} -> {to:?}"),
        },
        KickCategory::I => match (from, to) {
            (North, East) => &I_0_R,
            (East, North) => &I_R_0,
            (East, South) => &I_R_2,
            (South, East) => &I_2_R,
            (South, West) => &I_2_L,
            (West, South) => &I_L_2,
            (West, North) => &I_L_0,
            (North, West) => &I_0_L,
            _ => panic!("no wall kicks defined for {piece_type:?} {from:?} -> {to:?}"),
        },
    }
}

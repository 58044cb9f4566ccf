//! Falling piece logic

use crate::board::Board;
use crate::srs::get_wall_kicks;
use crate::tetromino::{Rotation, RotationDirection, TetrominoType};

/// Points per cell for a hard drop
pub const HARD_DROP_POINTS: u32 = 2;

/// A positioned, rotated tetromino
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: TetrominoType,
    rotation: Rotation,
    /// Top-left corner of the shape box in board coordinates
    pub x: i32,
    pub y: i32,
    /// Soft and hard drop points collected during this placement
    pub points: u32,
    /// Set while the piece sits in the hold slot
    pub held: bool,
}

/// Look up the piece for a type and rotation, anchored at the origin
pub fn get_piece(kind: TetrominoType, rotation: Rotation) -> Piece {
    Piece {
        kind,
        rotation,
        x: 0,
        y: 0,
        points: 0,
        held: false,
    }
}

impl Piece {
    /// Create a new piece in its spawn rotation
    pub fn new(kind: TetrominoType) -> Self {
        get_piece(kind, Rotation::North)
    }

    pub fn kind(&self) -> TetrominoType {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Width of the shape box
    pub fn width(&self) -> i32 {
        self.kind.box_size()
    }

    /// Get the absolute positions of all 4 blocks
    pub fn block_positions(&self) -> [(i32, i32); 4] {
        self.positions_at(self.x, self.y, self.rotation)
    }

    fn positions_at(&self, x: i32, y: i32, rotation: Rotation) -> [(i32, i32); 4] {
        self.kind
            .cells(rotation)
            .map(|(dx, dy)| (x + dx, y + dy))
    }

    fn collides_at(&self, x: i32, y: i32, rotation: Rotation, board: &Board) -> bool {
        self.positions_at(x, y, rotation)
            .iter()
            .any(|&(px, py)| board.has_collision(px, py))
    }

    /// True if the piece overlaps a wall, the floor or a locked cell
    pub fn collides(&self, board: &Board) -> bool {
        self.collides_at(self.x, self.y, self.rotation, board)
    }

    /// True if the piece cannot fall any further
    pub fn is_grounded(&self, board: &Board) -> bool {
        self.collides_at(self.x, self.y + 1, self.rotation, board)
    }

    /// Move to (x, y) if the piece fits there
    pub fn move_to(&mut self, x: i32, y: i32, board: &Board) -> bool {
        if self.collides_at(x, y, self.rotation, board) {
            return false;
        }
        self.x = x;
        self.y = y;
        true
    }

    pub fn move_left(&mut self, board: &Board) -> bool {
        self.move_to(self.x - 1, self.y, board)
    }

    pub fn move_right(&mut self, board: &Board) -> bool {
        self.move_to(self.x + 1, self.y, board)
    }

    pub fn move_down(&mut self, board: &Board) -> bool {
        self.move_to(self.x, self.y + 1, board)
    }

    pub fn move_up(&mut self, board: &Board) -> bool {
        self.move_to(self.x, self.y - 1, board)
    }

    /// Hard drop - move down as far as possible, collecting the drop bonus.
    /// Returns the distance dropped
    pub fn drop(&mut self, board: &Board) -> u32 {
        let mut distance = 0;
        while self.move_down(board) {
            distance += 1;
        }
        self.points += distance * HARD_DROP_POINTS;
        distance
    }

    /// Center the piece on the top row.
    /// Returns false if the spawn location is already blocked
    pub fn move_to_start_position(&mut self, board: &Board) -> bool {
        self.x = (board.width() as i32 - self.width()).div_euclid(2);
        self.y = 0;
        !self.collides(board)
    }

    /// Try to rotate, using SRS wall kicks in table order
    pub fn rotate(&mut self, direction: RotationDirection, board: &Board) -> bool {
        let target = self.rotation.rotated(direction);
        let kicks = get_wall_kicks(self.kind, self.rotation, target);

        let Some(&(dx, dy)) = kicks
            .iter()
            .find(|&&(dx, dy)| !self.collides_at(self.x + dx, self.y + dy, target, board))
        else {
            return false;
        };

        self.x += dx;
        self.y += dy;
        self.rotation = target;
        true
    }

    /// Reset to the spawn rotation at the origin without any collision test
    pub fn rotate_to_start(&mut self) {
        self.rotation = Rotation::North;
        self.x = 0;
        self.y = 0;
    }

    /// A copy of this piece moved straight down to where it would land
    pub fn ghost(&self, board: &Board) -> Piece {
        let mut ghost = self.clone();
        while ghost.move_down(board) {}
        ghost.points = 0;
        ghost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BOARD_HEIGHT, Cell};

    fn block(board: &mut Board, x: i32, y: i32) {
        board.set(x, y, Some(Cell::new(TetrominoType::O)));
    }

    #[test]
    fn test_spawn_position() {
        let board = Board::default();
        let mut piece = Piece::new(TetrominoType::T);
        assert!(piece.move_to_start_position(&board));
        assert_eq!((piece.x, piece.y), (3, 0));

        let mut piece = Piece::new(TetrominoType::O);
        assert!(piece.move_to_start_position(&board));
        assert_eq!((piece.x, piece.y), (4, 0));

        let mut piece = Piece::new(TetrominoType::I);
        assert!(piece.move_to_start_position(&board));
        assert_eq!((piece.x, piece.y), (3, 0));
    }

    #[test]
    fn test_spawn_blocked() {
        let mut board = Board::default();
        block(&mut board, 4, 1);
        let mut piece = Piece::new(TetrominoType::T);
        assert!(!piece.move_to_start_position(&board));
    }

    #[test]
    fn test_move_blocked_leaves_piece_unchanged() {
        let board = Board::default();
        let mut piece = Piece::new(TetrominoType::J);
        assert!(piece.move_to(0, 5, &board));
        let before = piece.clone();
        assert!(!piece.move_left(&board));
        assert_eq!(piece, before);
        assert!(piece.move_right(&board));
        assert_eq!(piece.x, 1);
        assert!(piece.move_up(&board));
        assert_eq!(piece.y, 4);
    }

    #[test]
    fn test_hard_drop() {
        let board = Board::default();
        let mut piece = Piece::new(TetrominoType::O);
        piece.move_to_start_position(&board);
        let distance = piece.drop(&board);
        // The O piece rests on the floor with its lower row on the last board row
        assert_eq!(distance, BOARD_HEIGHT as u32 - 2);
        assert_eq!(piece.y, BOARD_HEIGHT as i32 - 2);
        assert_eq!(piece.points, distance * 2);
        assert!(!piece.move_down(&board));
    }

    #[test]
    fn test_rotate_in_open_space_uses_identity() {
        let board = Board::default();
        let mut piece = Piece::new(TetrominoType::T);
        piece.move_to(4, 5, &board);
        assert!(piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!(piece.rotation(), Rotation::East);
        assert_eq!((piece.x, piece.y), (4, 5));
        assert!(piece.rotate(RotationDirection::CounterClockwise, &board));
        assert_eq!(piece.rotation(), Rotation::North);
    }

    #[test]
    fn test_i_rotation_against_left_wall_takes_listed_kick() {
        let mut board = Board::default();
        let mut piece = Piece::new(TetrominoType::I);
        // Flat I flush against the left wall, occupying row 6, columns 0..4
        assert!(piece.move_to(0, 5, &board));
        // Blocks in columns 2 and 0 at row 8 make the first two
        // candidates (0,0) and (-2,0) fail
        block(&mut board, 2, 8);
        block(&mut board, 0, 8);
        // Third candidate (1,0) puts the vertical bar in column 3, rows 5..8
        assert!(piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!(piece.rotation(), Rotation::East);
        assert_eq!((piece.x, piece.y), (1, 5));
        let columns: Vec<i32> = piece.block_positions().iter().map(|p| p.0).collect();
        assert!(columns.iter().all(|&c| c == 3));
    }

    #[test]
    fn test_i_rotation_kicks_off_wall() {
        let board = Board::default();
        let mut piece = Piece::new(TetrominoType::I);
        piece.move_to(0, 5, &board);
        assert!(piece.rotate(RotationDirection::CounterClockwise, &board));
        assert_eq!(piece.rotation(), Rotation::West);
        // Vertical I in the West state sits in box column 1
        assert_eq!(piece.x, 0);
        // Pushed flush against the wall, box column 0 is outside the board
        assert!(piece.move_left(&board));
        assert_eq!(piece.x, -1);
        // West -> North in place would put a cell at x = -1; the (1, 0) kick fixes it
        assert!(piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!(piece.rotation(), Rotation::North);
        assert_eq!((piece.x, piece.y), (0, 5));
    }

    #[test]
    fn test_failed_rotation_leaves_state_unchanged() {
        let mut board = Board::new(4, 8);
        let mut piece = Piece::new(TetrominoType::I);
        // Flat I fills row 7 of a 4-wide board
        assert!(piece.move_to(0, 6, &board));
        // Fill everything above so no vertical placement can fit
        for y in 0..7 {
            for x in 0..4 {
                block(&mut board, x, y);
            }
        }
        let before = piece.clone();
        assert!(!piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_o_rotation_keeps_position() {
        let board = Board::default();
        let mut piece = Piece::new(TetrominoType::O);
        piece.move_to(0, 3, &board);
        assert!(piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!((piece.x, piece.y), (0, 3));
        assert_eq!(piece.rotation(), Rotation::East);
    }

    #[test]
    fn test_rotate_to_start() {
        let board = Board::default();
        let mut piece = get_piece(TetrominoType::L, Rotation::South);
        piece.move_to(5, 9, &board);
        piece.rotate_to_start();
        assert_eq!(piece.rotation(), Rotation::North);
        assert_eq!((piece.x, piece.y), (0, 0));
    }

    #[test]
    fn test_ghost_lands_on_stack() {
        let mut board = Board::default();
        block(&mut board, 4, 12);
        let mut piece = Piece::new(TetrominoType::O);
        piece.move_to_start_position(&board);
        let ghost = piece.ghost(&board);
        assert_eq!((ghost.x, ghost.y), (4, 10));
        assert_eq!(piece.y, 0);
    }
}

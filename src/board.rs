//! Game board representation and collision detection
//!
//! Coordinates are (x, y) with x growing rightward and y growing downward.
//! The top `HIDDEN_ROWS` rows form a spawn buffer above the visible playfield.

use crate::piece::Piece;
use crate::score::line_clear_points;
use crate::tetromino::{Color, TetrominoType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Standard board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 23;
/// Rows above the rendered area
pub const HIDDEN_ROWS: usize = 1;

/// An occupied cell. Empty cells are `None` in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub color: Color,
    pub kind: TetrominoType,
}

impl Cell {
    pub fn new(kind: TetrominoType) -> Self {
        Self {
            color: kind.color(),
            kind,
        }
    }
}

/// Display label for a number of rows that became full at once
pub fn row_clear_label(count: usize) -> Option<&'static str> {
    match count {
        1 => Some("Single!"),
        2 => Some("Double!"),
        3 => Some("Triple!"),
        4 => Some("Blocks!"),
        _ => None,
    }
}

/// The game board
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    /// Grid stored as [row][col], row 0 is the top
    cells: Vec<Vec<Option<Cell>>>,
    /// Full rows found by the last scan, top to bottom
    full_rows: Vec<usize>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

impl Board {
    /// Create a new empty board
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![None; width]; height],
            full_rows: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows top to bottom, hidden rows included
    pub fn rows(&self) -> &[Vec<Option<Cell>>] {
        &self.cells
    }

    /// Get the cell at (x, y).
    /// Returns None if the cell is empty or out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        let (x, y) = self.index(x, y)?;
        self.cells[y][x]
    }

    /// Set a cell at a position.
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Option<Cell>) -> bool {
        match self.index(x, y) {
            Some((x, y)) => {
                self.cells[y][x] = cell;
                true
            }
            None => false,
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((x, y))
    }

    /// True when (x, y) is outside the grid or already occupied
    pub fn has_collision(&self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some((x, y)) => self.cells[y][x].is_some(),
            None => true,
        }
    }

    /// Write a piece into the grid and rescan for full rows.
    ///
    /// The caller must have checked that the piece does not collide.
    pub fn copy_piece(&mut self, piece: &Piece) -> Option<&'static str> {
        let cell = Cell::new(piece.kind());
        for (x, y) in piece.block_positions() {
            debug_assert!(!self.has_collision(x, y), "copying a colliding piece");
            self.set(x, y, Some(cell));
        }
        self.find_full_rows()
    }

    /// Scan every row top to bottom and record the full ones.
    /// Returns the label for the number of full rows, if any
    pub fn find_full_rows(&mut self) -> Option<&'static str> {
        self.full_rows = (0..self.height)
            .filter(|&row| self.is_row_full(row))
            .collect();
        row_clear_label(self.full_rows.len())
    }

    /// Full rows recorded by the last scan, top to bottom
    pub fn full_rows(&self) -> &[usize] {
        &self.full_rows
    }

    /// Remove every recorded full row, shifting the rows above it down.
    /// Adds the line-clear points for `level` to `points` and returns the
    /// number of rows removed
    pub fn remove_full_rows(&mut self, level: u32, points: &mut u32) -> usize {
        let removed = self.full_rows.len();
        for &row in &self.full_rows {
            // Rows recorded lower down are untouched by shifting rows above this one
            self.cells[..=row].rotate_right(1);
            self.cells[0] = vec![None; self.width];
        }
        self.full_rows.clear();

        if removed > 0 {
            *points += line_clear_points(removed, level);
            debug!(removed, level, "removed full rows");
        }
        removed
    }

    /// Check if a row is completely filled
    fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_some())
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_none()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i32) {
        for x in 0..board.width() as i32 {
            board.set(x, y, Some(Cell::new(TetrominoType::I)));
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::default();
        assert!(board.is_empty());
        assert_eq!(board.width(), BOARD_WIDTH);
        assert_eq!(board.height(), BOARD_HEIGHT);
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::default();
        let cell = Cell::new(TetrominoType::Z);
        assert!(board.set(5, 5, Some(cell)));
        assert_eq!(board.get(5, 5), Some(cell));
        assert_eq!(board.get(5, 5).map(|c| c.color), Some(Color(255, 0, 0)));
        assert!(!board.set(-1, 5, Some(cell)));
    }

    #[test]
    fn test_collision_bounds() {
        let board = Board::new(4, 6);
        for y in -2..8 {
            for x in -2..6 {
                let outside = x < 0 || y < 0 || x >= 4 || y >= 6;
                assert_eq!(board.has_collision(x, y), outside, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_collision_follows_occupancy() {
        let mut board = Board::new(4, 6);
        board.set(2, 3, Some(Cell::new(TetrominoType::T)));
        assert!(board.has_collision(2, 3));
        assert!(!board.has_collision(3, 3));
    }

    #[test]
    fn test_row_labels() {
        for (count, label) in [(1, "Single!"), (2, "Double!"), (3, "Triple!"), (4, "Blocks!")] {
            let mut board = Board::default();
            for i in 0..count {
                fill_row(&mut board, (BOARD_HEIGHT - 1 - i * 2) as i32);
            }
            assert_eq!(board.find_full_rows(), Some(label));
            assert_eq!(board.full_rows().len(), count);
        }
        let mut board = Board::default();
        assert_eq!(board.find_full_rows(), None);
    }

    #[test]
    fn test_remove_single_row() {
        let mut board = Board::default();
        let bottom = BOARD_HEIGHT as i32 - 1;
        fill_row(&mut board, bottom);
        // A block above the full row
        let marker = Cell::new(TetrominoType::S);
        board.set(0, bottom - 1, Some(marker));

        board.find_full_rows();
        let mut points = 0;
        let removed = board.remove_full_rows(3, &mut points);

        assert_eq!(removed, 1);
        assert_eq!(points, 300);
        // The block from the row above should now sit on the bottom row
        assert_eq!(board.get(0, bottom), Some(marker));
        assert_eq!(board.get(0, bottom - 1), None);
        assert!(board.full_rows().is_empty());
    }

    #[test]
    fn test_remove_split_rows() {
        let mut board = Board::default();
        let bottom = BOARD_HEIGHT as i32 - 1;
        fill_row(&mut board, bottom);
        fill_row(&mut board, bottom - 2);
        let between = Cell::new(TetrominoType::J);
        let above = Cell::new(TetrominoType::L);
        board.set(3, bottom - 1, Some(between));
        board.set(7, bottom - 3, Some(above));

        assert_eq!(board.find_full_rows(), Some("Double!"));
        let mut points = 0;
        assert_eq!(board.remove_full_rows(1, &mut points), 2);
        assert_eq!(points, 300);
        assert_eq!(board.get(3, bottom), Some(between));
        assert_eq!(board.get(7, bottom - 1), Some(above));
        let occupied = board.rows().iter().flatten().filter(|c| c.is_some()).count();
        assert_eq!(occupied, 2);
    }

    #[test]
    fn test_remove_without_scan_is_noop() {
        let mut board = Board::default();
        fill_row(&mut board, BOARD_HEIGHT as i32 - 1);
        let mut points = 0;
        assert_eq!(board.remove_full_rows(1, &mut points), 0);
        assert_eq!(points, 0);
    }
}

//! Tetromino definitions and shapes
//!
//! All 7 tetrominoes with their four rotation states. Shapes are stored as
//! constant occupancy matrices in the SRS boxes (4x4 for I, 2x2 for O, 3x3
//! for the rest), row 0 at the top.

use serde::{Deserialize, Serialize};

/// An RGB color tag carried by cells for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I, // Cyan - long bar
    J, // Blue - J-shape
    L, // Orange - L-shape
    O, // Yellow - square
    S, // Green - S-shape
    T, // Purple - T-shape
    Z, // Red - Z-shape
}

/// Occupancy matrix for one rotation state, padded to 4x4.
pub type Matrix = [[u8; 4]; 4];

const I_SHAPES: [Matrix; 4] = [
    [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0]],
    [[0, 0, 0, 0], [0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0]],
];

const J_SHAPES: [Matrix; 4] = [
    [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 1, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [1, 1, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0]],
];

const L_SHAPES: [Matrix; 4] = [
    [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [1, 1, 1, 0], [1, 0, 0, 0], [0, 0, 0, 0]],
    [[1, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
];

// O piece doesn't rotate: one shape for every state
const O_SHAPE: Matrix = [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]];

const S_SHAPES: [Matrix; 4] = [
    [[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]],
    [[1, 0, 0, 0], [1, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
];

const T_SHAPES: [Matrix; 4] = [
    [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [1, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [1, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
];

const Z_SHAPES: [Matrix; 4] = [
    [[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 1, 0], [0, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [1, 1, 0, 0], [1, 0, 0, 0], [0, 0, 0, 0]],
];

impl TetrominoType {
    /// Get the base color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color(0, 255, 255),
            TetrominoType::J => Color(0, 0, 255),
            TetrominoType::L => Color(255, 165, 0),
            TetrominoType::O => Color(255, 255, 0),
            TetrominoType::S => Color(0, 255, 0),
            TetrominoType::T => Color(160, 0, 240),
            TetrominoType::Z => Color(255, 0, 0),
        }
    }

    /// Get all tetromino types in bag order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::O,
            TetrominoType::S,
            TetrominoType::T,
            TetrominoType::Z,
        ]
    }

    /// Side length of the shape box, used as the piece width when centering
    pub fn box_size(&self) -> i32 {
        match self {
            TetrominoType::I => 4,
            TetrominoType::O => 2,
            _ => 3,
        }
    }

    /// Get the occupancy matrix for this tetromino at a given rotation
    pub fn shape(&self, rotation: Rotation) -> &'static Matrix {
        let index = rotation.index();
        match self {
            TetrominoType::I => &I_SHAPES[index],
            TetrominoType::J => &J_SHAPES[index],
            TetrominoType::L => &L_SHAPES[index],
            TetrominoType::O => &O_SHAPE,
            TetrominoType::S => &S_SHAPES[index],
            TetrominoType::T => &T_SHAPES[index],
            TetrominoType::Z => &Z_SHAPES[index],
        }
    }

    /// The four occupied (dx, dy) offsets of the shape at a given rotation
    pub fn cells(&self, rotation: Rotation) -> [(i32, i32); 4] {
        let matrix = self.shape(rotation);
        let mut cells = [(0, 0); 4];
        let mut count = 0;
        for (dy, row) in matrix.iter().enumerate() {
            for (dx, &filled) in row.iter().enumerate() {
                if filled != 0 {
                    assert!(count < 4, "shape for {self:?} {rotation:?} has more than four cells");
                    cells[count] = (dx as i32, dy as i32);
                    count += 1;
                }
            }
        }
        assert_eq!(count, 4, "shape for {self:?} {rotation:?} is not a tetromino");
        cells
    }
}

/// Rotation states (using SRS naming convention)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North, // Spawn state, 0 degrees
    East,  // 90 degrees clockwise
    South, // 180 degrees
    West,  // 270 degrees
}

impl Rotation {
    /// Quarter turns clockwise from North
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Rotation state for a quarter-turn index.
    ///
    /// # Panics
    ///
    /// Panics if `index > 3`: the rotation space is closed and any other value
    /// is a caller defect.
    pub fn from_index(index: usize) -> Rotation {
        match index {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            3 => Rotation::West,
            _ => panic!("no rotation state for quarter-turn index {index}"),
        }
    }

    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(&self) -> Rotation {
        Rotation::from_index((self.index() + 1) % 4)
    }

    /// Rotate counter-clockwise: North → West → South → East → North
    pub fn ccw(&self) -> Rotation {
        Rotation::from_index((self.index() + 3) % 4)
    }

    /// Destination of a rotation in the given direction
    pub fn rotated(&self, direction: RotationDirection) -> Rotation {
        match direction {
            RotationDirection::Clockwise => self.cw(),
            RotationDirection::CounterClockwise => self.ccw(),
        }
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATIONS: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    #[test]
    fn test_every_shape_has_four_cells_inside_its_box() {
        for kind in TetrominoType::all() {
            for rotation in ROTATIONS {
                let size = kind.box_size();
                for (dx, dy) in kind.cells(rotation) {
                    assert!(dx < size && dy < size, "{kind:?} {rotation:?} leaves its box");
                }
            }
        }
    }

    #[test]
    fn test_o_shape_is_shared() {
        for rotation in ROTATIONS {
            assert_eq!(TetrominoType::O.shape(rotation), &O_SHAPE);
        }
    }

    #[test]
    fn test_t_spawn_shape() {
        assert_eq!(
            TetrominoType::T.cells(Rotation::North),
            [(1, 0), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn test_rotation_cycle() {
        let mut rotation = Rotation::North;
        for _ in 0..4 {
            rotation = rotation.cw();
        }
        assert_eq!(rotation, Rotation::North);
        assert_eq!(Rotation::North.ccw(), Rotation::West);
        assert_eq!(Rotation::West.cw(), Rotation::North);
    }

    #[test]
    #[should_panic]
    fn test_rotation_index_out_of_range() {
        let _ = Rotation::from_index(4);
    }
}

//! Block face directions.
//!
//! Quad queries are partitioned by face: each of the six directions plus the
//! "no side" query used for item rendering. [`Direction::index`] is the stable
//! slot used by per-direction tables.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// One of the six axis-aligned faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    /// Negative Y / bottom face.
    Down = 0,
    /// Positive Y / top face.
    Up = 1,
    /// Negative Z face.
    North = 2,
    /// Positive Z face.
    South = 3,
    /// Negative X face.
    West = 4,
    /// Positive X face.
    East = 5,
}

impl Direction {
    /// Number of directions.
    pub const COUNT: usize = 6;

    /// All directions in index order.
    pub const ALL: [Direction; Self::COUNT] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Stable table index in `0..COUNT`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit normal of the face.
    pub const fn normal(self) -> [i8; 3] {
        match self {
            Self::Down => [0, -1, 0],
            Self::Up => [0, 1, 0],
            Self::North => [0, 0, -1],
            Self::South => [0, 0, 1],
            Self::West => [-1, 0, 0],
            Self::East => [1, 0, 0],
        }
    }

    /// Canonical string key used in configs/logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::North => "north",
            Self::South => "south",
            Self::West => "west",
            Self::East => "east",
        }
    }

}

bitflags! {
    /// Set of block faces, e.g. the faces a block is connected across.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Directions: u8 {
        /// Bottom face.
        const DOWN = 1 << 0;
        /// Top face.
        const UP = 1 << 1;
        /// Negative Z face.
        const NORTH = 1 << 2;
        /// Positive Z face.
        const SOUTH = 1 << 3;
        /// Negative X face.
        const WEST = 1 << 4;
        /// Positive X face.
        const EAST = 1 << 5;
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a cell a wall sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSide {
    North,
    East,
    South,
    West,
}

impl WallSide {
    /// The wall on the neighbouring cell that shares this wall.
    pub fn opposite(self) -> Self {
        match self {
            WallSide::North => WallSide::South,
            WallSide::East => WallSide::West,
            WallSide::South => WallSide::North,
            WallSide::West => WallSide::East,
        }
    }
}

impl fmt::Display for WallSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WallSide::North => "north",
            WallSide::East => "east",
            WallSide::South => "south",
            WallSide::West => "west",
        };
        f.write_str(name)
    }
}

/// Wall material codes of one cell, in north/east/south/west order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walls {
    pub north: char,
    pub east: char,
    pub south: char,
    pub west: char,
}

impl Walls {
    pub fn new(north: char, east: char, south: char, west: char) -> Self {
        Self { north, east, south, west }
    }

    /// Same material on all four sides.
    pub fn uniform(code: char) -> Self {
        Self::new(code, code, code, code)
    }

    /// Parses a 4-character NESW token such as `"nbnd"`.
    pub fn from_token(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        let walls = Self::new(chars.next()?, chars.next()?, chars.next()?, chars.next()?);
        if chars.next().is_some() {
            return None;
        }
        Some(walls)
    }

    #[inline]
    pub fn get(&self, side: WallSide) -> char {
        match side {
            WallSide::North => self.north,
            WallSide::East => self.east,
            WallSide::South => self.south,
            WallSide::West => self.west,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WallSide, char)> {
        [
            (WallSide::North, self.north),
            (WallSide::East, self.east),
            (WallSide::South, self.south),
            (WallSide::West, self.west),
        ]
        .into_iter()
    }
}

impl Default for Walls {
    fn default() -> Self {
        Self::uniform('n')
    }
}

impl fmt::Display for Walls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.north, self.east, self.south, self.west)
    }
}

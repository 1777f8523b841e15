use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NavError;

/// Integer grid coordinate. Identity is value-based, so cells are used
/// directly as map keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Cell { x, y }
    }

    pub fn manhattan_distance(&self, other: Cell) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Straight-line distance between the two cells, in grid units.
    pub fn euclidean_distance(&self, other: Cell) -> f64 {
        let dx = self.x.abs_diff(other.x) as f64;
        let dy = self.y.abs_diff(other.y) as f64;
        dx.hypot(dy)
    }

    /// True when the two cells share an edge.
    pub fn is_adjacent(&self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl From<(usize, usize)> for Cell {
    fn from((x, y): (usize, usize)) -> Self {
        Cell { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Parses `"x,y"` (whitespace around either number is ignored).
impl FromStr for Cell {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| NavError::Parse(format!("expected `x,y`, got {s:?}")))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|err| NavError::Parse(format!("bad coordinate {part:?} in {s:?}: {err}")))
        };
        Ok(Cell::new(parse(x)?, parse(y)?))
    }
}

/// Cells from (excluding) the start to (including) the goal, in walking
/// order.
pub type Route = Vec<Cell>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Tree,
    Rock,
    Bush,
    Wall,
}

impl ObstacleKind {
    pub fn symbol(&self) -> char {
        match self {
            ObstacleKind::Tree => 'T',
            ObstacleKind::Rock => 'R',
            ObstacleKind::Bush => 'B',
            ObstacleKind::Wall => '#',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'T' => Some(ObstacleKind::Tree),
            'R' => Some(ObstacleKind::Rock),
            'B' => Some(ObstacleKind::Bush),
            '#' => Some(ObstacleKind::Wall),
            _ => None,
        }
    }
}

/// Opaque reference to a placed obstacle: its category and its ordinal
/// within that category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObstacleHandle {
    pub kind: ObstacleKind,
    pub id: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(b.manhattan_distance(a), 7);
        assert!((a.euclidean_distance(b) - 5.0).abs() < 1e-9);
        assert!(Cell::new(2, 3).is_adjacent(Cell::new(2, 2)));
        assert!(!Cell::new(2, 3).is_adjacent(Cell::new(3, 4)));
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!("3,4".parse::<Cell>().unwrap(), Cell::new(3, 4));
        assert_eq!(" 9 , 0 ".parse::<Cell>().unwrap(), Cell::new(9, 0));
        assert!(matches!("3".parse::<Cell>(), Err(NavError::Parse(_))));
        assert!(matches!("-1,2".parse::<Cell>(), Err(NavError::Parse(_))));
    }

    #[test]
    fn test_obstacle_symbols() {
        for kind in [
            ObstacleKind::Tree,
            ObstacleKind::Rock,
            ObstacleKind::Bush,
            ObstacleKind::Wall,
        ] {
            assert_eq!(ObstacleKind::from_symbol(kind.symbol()), Some(kind));
        }
        assert_eq!(ObstacleKind::from_symbol('.'), None);
    }
}

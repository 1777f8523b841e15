use std::collections::HashMap;

use tracing::trace;

use crate::common::{Cell, ObstacleHandle, ObstacleKind};
use crate::error::{NavError, Result};

/// The minimal capability the pathfinder needs from a world.
pub trait Grid {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn is_occupied(&self, cell: Cell) -> bool;

    fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width() && cell.y < self.height()
    }

    /// In-bounds axis neighbors, ordered left, right, top, bottom.
    /// Occupancy is not consulted here.
    fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        let mut neighbors = Vec::with_capacity(4);
        if cell.x > 0 {
            neighbors.push(Cell::new(cell.x - 1, cell.y));
        }
        if cell.x + 1 < self.width() {
            neighbors.push(Cell::new(cell.x + 1, cell.y));
        }
        if cell.y > 0 {
            neighbors.push(Cell::new(cell.x, cell.y - 1));
        }
        if cell.y + 1 < self.height() {
            neighbors.push(Cell::new(cell.x, cell.y + 1));
        }
        neighbors
    }

    fn check_bounds(&self, cell: Cell) -> Result<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(NavError::OutOfBounds {
                cell,
                width: self.width(),
                height: self.height(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyEntry {
    pub cell: Cell,
    pub obstacle: ObstacleHandle,
    /// Only consulted while placing; queries look at the cell alone.
    pub exclusion_radius: f64,
}

/// Which cells are blocked, keyed by exact cell.
#[derive(Debug, Clone)]
pub struct OccupancyIndex {
    width: usize,
    height: usize,
    entries: HashMap<Cell, OccupancyEntry>,
}

impl OccupancyIndex {
    pub fn new(width: usize, height: usize) -> Self {
        OccupancyIndex {
            width,
            height,
            entries: HashMap::new(),
        }
    }

    /// Builds an index from a character map, one line per row. `.` is free,
    /// `T`, `R`, `B` and `#` are obstacles placed with a zero radius.
    pub fn from_ascii(text: &str) -> Result<Self> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect())
            .collect();

        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(NavError::Parse("map has no cells".to_string()));
        }

        let mut index = OccupancyIndex::new(width, height);
        let mut next_id: HashMap<ObstacleKind, usize> = HashMap::new();

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(NavError::Parse(format!(
                    "row {y} has {} cells, expected {width}",
                    row.len()
                )));
            }
            for (x, &symbol) in row.iter().enumerate() {
                if symbol == '.' {
                    continue;
                }
                let kind = ObstacleKind::from_symbol(symbol).ok_or_else(|| {
                    NavError::Parse(format!("unknown map symbol {symbol:?} at ({x}, {y})"))
                })?;
                let id = next_id.entry(kind).or_default();
                index.try_place(Cell::new(x, y), ObstacleHandle { kind, id: *id }, 0.0)?;
                *id += 1;
            }
        }

        Ok(index)
    }

    /// Records `obstacle` at `cell` unless the cell is taken or another
    /// entry sits closer than the sum of both exclusion radii. Returns
    /// whether the entry was recorded; a rejection leaves the index as it
    /// was.
    pub fn try_place(
        &mut self,
        cell: Cell,
        obstacle: ObstacleHandle,
        exclusion_radius: f64,
    ) -> Result<bool> {
        self.check_bounds(cell)?;

        if self.entries.contains_key(&cell) {
            trace!("reject {obstacle:?} at {cell}: cell taken");
            return Ok(false);
        }

        if let Some(blocker) = self.entries.values().find(|entry| {
            cell.euclidean_distance(entry.cell) < exclusion_radius + entry.exclusion_radius
        }) {
            trace!("reject {obstacle:?} at {cell}: too close to {:?}", blocker.obstacle);
            return Ok(false);
        }

        self.entries.insert(
            cell,
            OccupancyEntry {
                cell,
                obstacle,
                exclusion_radius,
            },
        );
        Ok(true)
    }

    pub fn get(&self, cell: Cell) -> Option<&OccupancyEntry> {
        self.entries.get(&cell)
    }

    pub fn entries(&self) -> impl Iterator<Item = &OccupancyEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Grid for OccupancyIndex {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn is_occupied(&self, cell: Cell) -> bool {
        self.entries.contains_key(&cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(id: usize) -> ObstacleHandle {
        ObstacleHandle {
            kind: ObstacleKind::Tree,
            id,
        }
    }

    #[test]
    fn test_read_ascii_map() {
        let index = OccupancyIndex::from_ascii(
            "
            .T..
            ..R.
            #..B
            ",
        )
        .unwrap();

        assert_eq!(index.width(), 4);
        assert_eq!(index.height(), 3);
        assert_eq!(index.len(), 4);

        assert!(!index.is_occupied(Cell::new(0, 0)));
        assert!(index.is_occupied(Cell::new(1, 0)));
        assert!(index.is_occupied(Cell::new(2, 1)));
        assert!(index.is_occupied(Cell::new(0, 2)));
        assert_eq!(
            index.get(Cell::new(3, 2)).map(|entry| entry.obstacle.kind),
            Some(ObstacleKind::Bush)
        );

        assert!(matches!(
            OccupancyIndex::from_ascii("..\n..."),
            Err(NavError::Parse(_))
        ));
        assert!(matches!(
            OccupancyIndex::from_ascii(".x"),
            Err(NavError::Parse(_))
        ));
        assert!(matches!(
            OccupancyIndex::from_ascii(""),
            Err(NavError::Parse(_))
        ));
    }

    #[test]
    fn test_neighbors_stay_in_bounds() {
        let index = OccupancyIndex::new(3, 3);

        assert_eq!(
            index.neighbors(Cell::new(1, 1)),
            vec![
                Cell::new(0, 1),
                Cell::new(2, 1),
                Cell::new(1, 0),
                Cell::new(1, 2)
            ]
        );
        assert_eq!(
            index.neighbors(Cell::new(0, 0)),
            vec![Cell::new(1, 0), Cell::new(0, 1)]
        );
        assert_eq!(
            index.neighbors(Cell::new(2, 2)),
            vec![Cell::new(1, 2), Cell::new(2, 1)]
        );
    }

    #[test]
    fn test_overlapping_placement_keeps_first() {
        let mut index = OccupancyIndex::new(10, 10);

        assert!(index.try_place(Cell::new(4, 4), tree(0), 0.8).unwrap());
        // Distance 1.0 is less than 0.8 + 0.3.
        assert!(!index.try_place(Cell::new(5, 4), tree(1), 0.3).unwrap());

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(Cell::new(4, 4)).unwrap().obstacle, tree(0));
        assert!(!index.is_occupied(Cell::new(5, 4)));

        // Far enough apart.
        assert!(index.try_place(Cell::new(6, 4), tree(2), 0.3).unwrap());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_same_cell_rejected_even_with_zero_radius() {
        let mut index = OccupancyIndex::new(5, 5);

        assert!(index.try_place(Cell::new(2, 2), tree(0), 0.0).unwrap());
        assert!(!index.try_place(Cell::new(2, 2), tree(1), 0.0).unwrap());
        assert_eq!(index.get(Cell::new(2, 2)).unwrap().obstacle, tree(0));
    }

    #[test]
    fn test_radius_blocks_only_own_cell() {
        let mut index = OccupancyIndex::new(10, 10);
        index.try_place(Cell::new(5, 5), tree(0), 3.0).unwrap();

        assert!(index.is_occupied(Cell::new(5, 5)));
        assert!(!index.is_occupied(Cell::new(5, 6)));
        assert!(!index.is_occupied(Cell::new(4, 5)));
    }

    #[test]
    fn test_out_of_bounds_placement() {
        let mut index = OccupancyIndex::new(4, 4);

        let result = index.try_place(Cell::new(4, 0), tree(0), 0.2);
        assert_eq!(
            result,
            Err(NavError::OutOfBounds {
                cell: Cell::new(4, 0),
                width: 4,
                height: 4
            })
        );
        assert!(index.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut index = OccupancyIndex::from_ascii("T.\n.R").unwrap();
        assert_eq!(index.len(), 2);

        index.clear();
        assert!(index.is_empty());
        assert!(!index.is_occupied(Cell::new(0, 0)));
        assert_eq!(index.width(), 2);
    }
}

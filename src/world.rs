use rand::Rng;
use std::collections::HashSet;
use tracing::info;

use crate::common::Cell;
use crate::error::Result;
use crate::map::{Grid, OccupancyIndex};
use crate::placer::{ObjectPlacer, PlacementPlan, PlacementReport};

/// The grid the agent walks on, together with the plan used to scatter its
/// obstacles.
#[derive(Debug, Clone)]
pub struct World {
    index: OccupancyIndex,
    plan: PlacementPlan,
}

impl World {
    pub fn new(width: usize, height: usize, plan: PlacementPlan) -> Self {
        World {
            index: OccupancyIndex::new(width, height),
            plan,
        }
    }

    pub fn from_index(index: OccupancyIndex) -> Self {
        World {
            index,
            plan: PlacementPlan::scene(0, 0, 0),
        }
    }

    /// Drops every obstacle and scatters a fresh set from the plan.
    pub fn regenerate<R: Rng + ?Sized>(
        &mut self,
        placer: &ObjectPlacer,
        rng: &mut R,
    ) -> Result<PlacementReport> {
        self.index.clear();
        let report = placer.populate(&mut self.index, &self.plan, rng)?;
        info!(
            "generated {}x{} world with {} obstacles",
            self.index.width(),
            self.index.height(),
            self.index.len()
        );
        Ok(report)
    }

    pub fn index(&self) -> &OccupancyIndex {
        &self.index
    }

    pub fn plan(&self) -> &PlacementPlan {
        &self.plan
    }

    /// One line per row: obstacle symbols, `A` for the agent, `*` for route
    /// cells and `.` for free ground.
    pub fn render(&self, agent: Option<Cell>, route: &[Cell]) -> String {
        let route: HashSet<Cell> = route.iter().copied().collect();
        let capacity = self
            .width()
            .checked_add(1)
            .and_then(|line| line.checked_mul(self.height()))
            .unwrap_or(0);
        let mut out = String::with_capacity(capacity);

        for y in 0..self.height() {
            for x in 0..self.width() {
                let cell = Cell::new(x, y);
                let symbol = if agent == Some(cell) {
                    'A'
                } else if let Some(entry) = self.index.get(cell) {
                    entry.obstacle.kind.symbol()
                } else if route.contains(&cell) {
                    '*'
                } else {
                    '.'
                };
                out.push(symbol);
            }
            out.push('\n');
        }
        out
    }
}

impl Grid for World {
    fn width(&self) -> usize {
        self.index.width()
    }

    fn height(&self) -> usize {
        self.index.height()
    }

    fn is_occupied(&self, cell: Cell) -> bool {
        self.index.is_occupied(cell)
    }
}

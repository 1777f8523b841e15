use std::time::Duration;

use tracing::{debug, info};

use crate::astar::PathFinder;
use crate::common::{Cell, Route};
use crate::error::Result;
use crate::map::Grid;
use crate::stat::SearchStats;

pub const DEFAULT_STEP_INTERVAL_MS: u64 = 300;
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(DEFAULT_STEP_INTERVAL_MS);

/// Walks a route one cell per tick. Holds no clock; whoever drives it
/// decides how long a tick lasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationAgent {
    position: Cell,
    route: Route,
    route_index: usize,
}

impl NavigationAgent {
    pub fn new(position: Cell) -> Self {
        NavigationAgent {
            position,
            route: Route::new(),
            route_index: 0,
        }
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn route(&self) -> &[Cell] {
        &self.route
    }

    /// Cells left to walk.
    pub fn remaining(&self) -> &[Cell] {
        &self.route[self.route_index..]
    }

    pub fn is_moving(&self) -> bool {
        self.route_index < self.route.len()
    }

    pub fn cancel(&mut self) {
        self.route.clear();
        self.route_index = 0;
    }

    /// Stops any walk in progress and plans a new one to `target`. Returns
    /// the route length, or `None` when no route was found; in both that
    /// case and the zero-length case the agent stays put. An off-grid
    /// `target` is an error and leaves the current walk untouched.
    pub fn request_path<G: Grid + ?Sized>(
        &mut self,
        grid: &G,
        finder: &PathFinder,
        target: Cell,
    ) -> Result<Option<usize>> {
        self.request_path_with_stats(grid, finder, target, &mut SearchStats::default())
    }

    pub fn request_path_with_stats<G: Grid + ?Sized>(
        &mut self,
        grid: &G,
        finder: &PathFinder,
        target: Cell,
        stats: &mut SearchStats,
    ) -> Result<Option<usize>> {
        grid.check_bounds(self.position)?;
        grid.check_bounds(target)?;
        self.cancel();

        match finder.find_path_with_stats(grid, self.position, target, stats)? {
            Some(route) => {
                let steps = route.len();
                info!("route from {} to {target}: {steps} steps", self.position);
                self.route = route;
                Ok(Some(steps))
            }
            None => {
                info!("no route from {} to {target}", self.position);
                Ok(None)
            }
        }
    }

    /// Moves to the next cell of the route, if any.
    pub fn tick(&mut self) -> Option<Cell> {
        let next = *self.route.get(self.route_index)?;
        self.route_index += 1;
        self.position = next;
        debug!("agent at {next}");
        Some(next)
    }
}

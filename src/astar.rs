use crate::common::{Cell, Route};
use crate::error::Result;
use crate::map::Grid;
use crate::stat::SearchStats;

use clap::ValueEnum;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, instrument, trace};

pub const DEFAULT_MAX_SEARCH_DISTANCE: usize = 20;

/// Which g term ranks the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RankingCost {
    /// Manhattan distance from the start. Equals the true cost only on open
    /// terrain.
    #[default]
    Geometric,
    /// The recorded path cost, i.e. plain A* ordering.
    Accumulated,
}

/// Bounded best-first search over a [`Grid`] with unit moves in four
/// directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathFinder {
    max_search_distance: usize,
    ranking: RankingCost,
}

impl Default for PathFinder {
    fn default() -> Self {
        PathFinder::new(DEFAULT_MAX_SEARCH_DISTANCE, RankingCost::default())
    }
}

impl PathFinder {
    pub fn new(max_search_distance: usize, ranking: RankingCost) -> Self {
        PathFinder {
            max_search_distance,
            ranking,
        }
    }

    pub fn max_search_distance(&self) -> usize {
        self.max_search_distance
    }

    pub fn ranking(&self) -> RankingCost {
        self.ranking
    }

    /// Returns the route from `start` to `goal`, `None` when no route exists
    /// within the search budget, or an error when either cell is off the
    /// grid.
    pub fn find_path<G: Grid + ?Sized>(
        &self,
        grid: &G,
        start: Cell,
        goal: Cell,
    ) -> Result<Option<Route>> {
        self.find_path_with_stats(grid, start, goal, &mut SearchStats::default())
    }

    #[instrument(skip_all, name = "find_path", fields(start = %start, goal = %goal), level = "debug")]
    pub fn find_path_with_stats<G: Grid + ?Sized>(
        &self,
        grid: &G,
        start: Cell,
        goal: Cell,
        stats: &mut SearchStats,
    ) -> Result<Option<Route>> {
        grid.check_bounds(start)?;
        grid.check_bounds(goal)?;

        if start == goal {
            return Ok(Some(Route::new()));
        }

        let search_start_time = Instant::now();
        stats.searches += 1;

        let mut cost: HashMap<Cell, usize> = HashMap::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();
        // A cell may sit here more than once if its cost improved before it
        // was popped.
        let mut frontier = vec![start];
        cost.insert(start, 0);
        stats.pushed_nodes += 1;

        let mut found = false;

        while !frontier.is_empty() {
            // Stable sort, so equal ranks keep insertion order.
            frontier.sort_by_key(|cell| {
                let g_cost = match self.ranking {
                    RankingCost::Geometric => start.manhattan_distance(*cell),
                    RankingCost::Accumulated => cost[cell],
                };
                g_cost + cell.manhattan_distance(goal)
            });

            let candidate = frontier.remove(0);
            trace!("pop candidate: {candidate}");

            if candidate == goal {
                found = true;
                break;
            }

            if start.manhattan_distance(candidate) > self.max_search_distance {
                trace!("candidate {candidate} beyond search distance, discard");
                stats.discarded_nodes += 1;
                continue;
            }

            stats.expanded_nodes += 1;

            // Uniform cost per move.
            let tentative_cost = cost[&candidate] + 1;

            for neighbor in grid.neighbors(candidate) {
                let improves = cost
                    .get(&neighbor)
                    .map_or(true, |&recorded| tentative_cost < recorded);
                if !improves {
                    continue;
                }
                cost.insert(neighbor, tentative_cost);

                if grid.is_occupied(neighbor) {
                    continue;
                }

                came_from.insert(neighbor, candidate);
                frontier.push(neighbor);
                stats.pushed_nodes += 1;
            }
            trace!("frontier size {}", frontier.len());
        }

        stats.time_us += search_start_time.elapsed().as_micros();

        if !found {
            debug!("cannot find route");
            return Ok(None);
        }

        let route = construct_route(&came_from, start, goal);
        debug!("route of {} steps", route.len());
        Ok(Some(route))
    }
}

// Every pushed cell has a backpointer to a cell of strictly lower recorded
// cost, so the walk ends at `start`.
fn construct_route(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Route {
    let mut route = Vec::new();
    let mut current = goal;
    while current != start {
        route.push(current);
        current = came_from[&current];
    }
    route.reverse();
    route
}

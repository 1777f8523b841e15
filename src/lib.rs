//! Grid occupancy and bounded best-first pathfinding for a single agent
//! walking around scattered obstacles.

pub mod agent;
pub mod astar;
pub mod common;
pub mod config;
pub mod error;
pub mod map;
pub mod placer;
pub mod stat;
pub mod world;

pub use agent::NavigationAgent;
pub use astar::{PathFinder, RankingCost};
pub use common::{Cell, ObstacleHandle, ObstacleKind, Route};
pub use error::{NavError, Result};
pub use map::{Grid, OccupancyEntry, OccupancyIndex};
pub use placer::{CategoryPlan, ObjectPlacer, PlacementPlan, PlacementReport};
pub use stat::SearchStats;
pub use world::World;

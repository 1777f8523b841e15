use anyhow::{anyhow, Context};
use clap::Parser;
use serde::Deserialize;
use std::time::Duration;

use crate::agent::DEFAULT_STEP_INTERVAL_MS;
use crate::astar::{PathFinder, RankingCost, DEFAULT_MAX_SEARCH_DISTANCE};
use crate::common::Cell;
use crate::placer::{ObjectPlacer, PlacementPlan};

#[derive(Parser, Debug, Default)]
#[command(
    name = "grid_nav",
    about = "Walk an agent across a grid of scattered obstacles.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Grid width in cells")]
    pub width: Option<usize>,

    #[arg(long, help = "Grid height in cells")]
    pub height: Option<usize>,

    #[arg(long, help = "Number of trees to scatter")]
    pub trees: Option<usize>,

    #[arg(long, help = "Number of rocks to scatter")]
    pub rocks: Option<usize>,

    #[arg(long, help = "Number of bushes to scatter")]
    pub bushes: Option<usize>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Furthest Manhattan distance from the start the search expands")]
    pub max_search_distance: Option<usize>,

    #[arg(long, help = "Cell draws allowed per obstacle before placement gives up")]
    pub max_placement_attempts: Option<usize>,

    #[arg(long, help = "Agent start cell as x,y")]
    pub start: Option<Cell>,

    #[arg(
        long = "target",
        help = "Target cell as x,y; repeat to walk several legs"
    )]
    pub targets: Vec<Cell>,

    #[arg(long, value_enum, help = "Cost used to rank the frontier")]
    pub ranking: Option<RankingCost>,

    #[arg(long, help = "Milliseconds between agent steps when animating")]
    pub step_interval_ms: Option<u64>,

    #[arg(long, help = "Sleep between agent steps", default_value_t = false)]
    pub animate: bool,

    #[arg(long, help = "Print routes as JSON", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub trees: usize,
    pub rocks: usize,
    pub bushes: usize,
    pub seed: u64,
    pub max_search_distance: usize,
    pub max_placement_attempts: usize,
    pub start: Cell,
    pub targets: Vec<Cell>,
    pub ranking: RankingCost,
    pub step_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 10,
            height: 10,
            trees: 20,
            rocks: 20,
            bushes: 20,
            seed: 0,
            max_search_distance: DEFAULT_MAX_SEARCH_DISTANCE,
            max_placement_attempts: 1000,
            start: Cell::new(5, 5),
            targets: Vec::new(),
            ranking: RankingCost::default(),
            step_interval_ms: DEFAULT_STEP_INTERVAL_MS,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid config yaml")
    }

    /// Command-line values win over whatever the file or defaults set. The
    /// merged config is validated before it is returned.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(height) = cli.height {
            self.height = height;
        }
        if let Some(trees) = cli.trees {
            self.trees = trees;
        }
        if let Some(rocks) = cli.rocks {
            self.rocks = rocks;
        }
        if let Some(bushes) = cli.bushes {
            self.bushes = bushes;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(max_search_distance) = cli.max_search_distance {
            self.max_search_distance = max_search_distance;
        }
        if let Some(max_placement_attempts) = cli.max_placement_attempts {
            self.max_placement_attempts = max_placement_attempts;
        }
        if let Some(start) = cli.start {
            self.start = start;
        }
        if !cli.targets.is_empty() {
            self.targets = cli.targets.clone();
        }
        if let Some(ranking) = cli.ranking {
            self.ranking = ranking;
        }
        if let Some(step_interval_ms) = cli.step_interval_ms {
            self.step_interval_ms = step_interval_ms;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(anyhow!(
                "Grid must have at least one cell, got {}x{}",
                self.width,
                self.height
            ));
        }

        let cell_count = self.width.checked_mul(self.height).ok_or_else(|| {
            anyhow!("Grid of {}x{} cells is too large", self.width, self.height)
        })?;
        let obstacle_count = self
            .trees
            .checked_add(self.rocks)
            .and_then(|count| count.checked_add(self.bushes))
            .ok_or_else(|| {
                anyhow!(
                    "Too many obstacles: {} trees, {} rocks, {} bushes",
                    self.trees,
                    self.rocks,
                    self.bushes
                )
            })?;
        if obstacle_count > cell_count {
            return Err(anyhow!(
                "Cannot fit {} obstacles on {} cells",
                obstacle_count,
                cell_count
            ));
        }

        if self.max_placement_attempts == 0 && obstacle_count > 0 {
            return Err(anyhow!("Placement attempts must be greater than 0"));
        }

        for (what, cell) in std::iter::once(("start", &self.start))
            .chain(self.targets.iter().map(|target| ("target", target)))
        {
            if cell.x >= self.width || cell.y >= self.height {
                return Err(anyhow!(
                    "The {} cell {} is outside the {}x{} grid",
                    what,
                    cell,
                    self.width,
                    self.height
                ));
            }
        }

        Ok(())
    }

    pub fn plan(&self) -> PlacementPlan {
        PlacementPlan::scene(self.trees, self.rocks, self.bushes)
    }

    pub fn path_finder(&self) -> PathFinder {
        PathFinder::new(self.max_search_distance, self.ranking)
    }

    pub fn placer(&self) -> ObjectPlacer {
        ObjectPlacer::new(self.max_placement_attempts)
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

use rand::Rng;
use tracing::{debug, info};

use crate::common::{Cell, ObstacleHandle, ObstacleKind};
use crate::error::{NavError, Result};
use crate::map::{Grid, OccupancyIndex};

pub const TREE_RADIUS: f64 = 0.2;
pub const MIN_ROCK_RADIUS: f64 = 0.1;
pub const MAX_ROCK_RADIUS: f64 = 0.3;
pub const MIN_BUSH_RADIUS: f64 = 0.1;
pub const MAX_BUSH_RADIUS: f64 = 0.3;

/// How many obstacles of one kind to scatter, and the range their exclusion
/// radius is drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPlan {
    pub kind: ObstacleKind,
    pub count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
}

impl CategoryPlan {
    pub fn fixed(kind: ObstacleKind, count: usize, radius: f64) -> Self {
        CategoryPlan {
            kind,
            count,
            min_radius: radius,
            max_radius: radius,
        }
    }

    pub fn ranged(kind: ObstacleKind, count: usize, min_radius: f64, max_radius: f64) -> Self {
        CategoryPlan {
            kind,
            count,
            min_radius,
            max_radius,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_radius >= 0.0
            && self.min_radius <= self.max_radius
            && self.max_radius.is_finite())
        {
            return Err(NavError::Config(format!(
                "{:?} radius range [{}, {}] must be finite, non-negative and ordered",
                self.kind, self.min_radius, self.max_radius
            )));
        }
        Ok(())
    }

    fn sample_radius<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max_radius > self.min_radius {
            rng.gen_range(self.min_radius..self.max_radius)
        } else {
            self.min_radius
        }
    }
}

/// Categories in placement order. Earlier categories win contested cells.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPlan {
    pub categories: Vec<CategoryPlan>,
}

impl PlacementPlan {
    /// Trees, then rocks, then bushes.
    pub fn scene(trees: usize, rocks: usize, bushes: usize) -> Self {
        PlacementPlan {
            categories: vec![
                CategoryPlan::fixed(ObstacleKind::Tree, trees, TREE_RADIUS),
                CategoryPlan::ranged(ObstacleKind::Rock, rocks, MIN_ROCK_RADIUS, MAX_ROCK_RADIUS),
                CategoryPlan::ranged(ObstacleKind::Bush, bushes, MIN_BUSH_RADIUS, MAX_BUSH_RADIUS),
            ],
        }
    }

    pub fn total(&self) -> usize {
        self.categories.iter().map(|category| category.count).sum()
    }

    pub fn validate(&self) -> Result<()> {
        self.categories.iter().try_for_each(CategoryPlan::validate)
    }
}

impl Default for PlacementPlan {
    fn default() -> Self {
        PlacementPlan::scene(20, 20, 20)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub placed: Vec<(ObstacleKind, usize)>,
    pub draws: usize,
}

/// Scatters obstacles by rejection sampling: draw a uniformly random cell
/// until the index accepts it, at most `max_attempts` draws per obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPlacer {
    max_attempts: usize,
}

impl ObjectPlacer {
    pub fn new(max_attempts: usize) -> Self {
        ObjectPlacer { max_attempts }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Adds every obstacle of `plan` to `index`. Obstacles placed before a
    /// category runs out of attempts stay in the index.
    pub fn populate<R: Rng + ?Sized>(
        &self,
        index: &mut OccupancyIndex,
        plan: &PlacementPlan,
        rng: &mut R,
    ) -> Result<PlacementReport> {
        plan.validate()?;
        if plan.total() > 0 && (index.width() == 0 || index.height() == 0) {
            return Err(NavError::Config(format!(
                "cannot place {} obstacles on a {}x{} grid",
                plan.total(),
                index.width(),
                index.height()
            )));
        }

        let mut report = PlacementReport::default();
        for category in &plan.categories {
            let placed = self.place_category(index, category, rng, &mut report.draws)?;
            report.placed.push((category.kind, placed));
        }

        info!(
            "placed {} obstacles in {} draws: {:?}",
            index.len(),
            report.draws,
            report.placed
        );
        Ok(report)
    }

    fn place_category<R: Rng + ?Sized>(
        &self,
        index: &mut OccupancyIndex,
        category: &CategoryPlan,
        rng: &mut R,
        draws: &mut usize,
    ) -> Result<usize> {
        'obstacles: for id in 0..category.count {
            let radius = category.sample_radius(rng);
            let obstacle = ObstacleHandle {
                kind: category.kind,
                id,
            };

            for _ in 0..self.max_attempts {
                let cell = Cell::new(
                    rng.gen_range(0..index.width()),
                    rng.gen_range(0..index.height()),
                );
                *draws += 1;

                if index.try_place(cell, obstacle, radius)? {
                    debug!("placed {obstacle:?} at {cell} with radius {radius:.2}");
                    continue 'obstacles;
                }
            }

            return Err(NavError::PlacementExhausted {
                kind: category.kind,
                placed: id,
                requested: category.count,
                attempts: self.max_attempts,
            });
        }

        Ok(category.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn occupied_cells(index: &OccupancyIndex) -> BTreeSet<Cell> {
        index.entries().map(|entry| entry.cell).collect()
    }

    #[test]
    fn test_default_scene_fits() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut index = OccupancyIndex::new(10, 10);

        let report = ObjectPlacer::new(1000)
            .populate(&mut index, &PlacementPlan::default(), &mut rng)
            .unwrap();

        assert_eq!(index.len(), 60);
        assert_eq!(
            report.placed,
            vec![
                (ObstacleKind::Tree, 20),
                (ObstacleKind::Rock, 20),
                (ObstacleKind::Bush, 20)
            ]
        );
        assert!(report.draws >= 60);

        let tree_ids: BTreeSet<usize> = index
            .entries()
            .filter(|entry| entry.obstacle.kind == ObstacleKind::Tree)
            .map(|entry| entry.obstacle.id)
            .collect();
        assert_eq!(tree_ids, (0..20).collect());

        for entry in index.entries() {
            assert!(index.contains(entry.cell));
            match entry.obstacle.kind {
                ObstacleKind::Tree => assert_eq!(entry.exclusion_radius, TREE_RADIUS),
                _ => assert!((MIN_ROCK_RADIUS..MAX_ROCK_RADIUS).contains(&entry.exclusion_radius)),
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let plan = PlacementPlan::scene(5, 7, 3);
        let placer = ObjectPlacer::new(100);

        let mut first = OccupancyIndex::new(12, 8);
        placer
            .populate(&mut first, &plan, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let mut second = OccupancyIndex::new(12, 8);
        placer
            .populate(&mut second, &plan, &mut StdRng::seed_from_u64(42))
            .unwrap();

        assert_eq!(occupied_cells(&first), occupied_cells(&second));
        assert_eq!(first.len(), 15);
    }

    // No two cells of a 5x5 grid are 6 apart, so the second tree never fits.
    #[test]
    fn test_exclusion_radius_exhausts_attempts() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut index = OccupancyIndex::new(5, 5);
        let plan = PlacementPlan {
            categories: vec![CategoryPlan::fixed(ObstacleKind::Tree, 2, 3.0)],
        };

        let result = ObjectPlacer::new(200).populate(&mut index, &plan, &mut rng);

        assert_eq!(
            result,
            Err(NavError::PlacementExhausted {
                kind: ObstacleKind::Tree,
                placed: 1,
                requested: 2,
                attempts: 200
            })
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_more_obstacles_than_cells() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut index = OccupancyIndex::new(3, 3);
        let plan = PlacementPlan {
            categories: vec![CategoryPlan::fixed(ObstacleKind::Bush, 10, 0.0)],
        };

        let result = ObjectPlacer::new(500).populate(&mut index, &plan, &mut rng);

        assert!(matches!(
            result,
            Err(NavError::PlacementExhausted {
                kind: ObstacleKind::Bush,
                placed: 9,
                requested: 10,
                ..
            })
        ));
        assert_eq!(index.len(), 9);
    }

    #[test]
    fn test_invalid_plan() {
        let mut rng = StdRng::seed_from_u64(0);
        let placer = ObjectPlacer::new(10);

        let mut index = OccupancyIndex::new(4, 4);
        let plan = PlacementPlan {
            categories: vec![CategoryPlan::ranged(ObstacleKind::Rock, 1, 0.5, 0.1)],
        };
        assert!(matches!(
            placer.populate(&mut index, &plan, &mut rng),
            Err(NavError::Config(_))
        ));
        assert!(index.is_empty());

        for max_radius in [f64::INFINITY, f64::NAN] {
            let plan = PlacementPlan {
                categories: vec![CategoryPlan::ranged(ObstacleKind::Rock, 1, 0.1, max_radius)],
            };
            assert!(matches!(
                placer.populate(&mut index, &plan, &mut rng),
                Err(NavError::Config(_))
            ));
            assert!(index.is_empty());
        }

        let mut empty = OccupancyIndex::new(0, 4);
        assert!(matches!(
            placer.populate(&mut empty, &PlacementPlan::default(), &mut rng),
            Err(NavError::Config(_))
        ));
    }

    #[test]
    fn test_empty_plan_places_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut index = OccupancyIndex::new(0, 0);

        let report = ObjectPlacer::new(10)
            .populate(&mut index, &PlacementPlan::scene(0, 0, 0), &mut rng)
            .unwrap();
        assert_eq!(report.draws, 0);
        assert!(index.is_empty());
    }
}

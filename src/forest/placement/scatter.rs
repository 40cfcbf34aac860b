// src/forest/placement/scatter.rs
//! Bounded-retry rejection scatter (deterministic).

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::forest::core::{
    ForestSeed, PlacementSet, PlacementStrategy, ScatterError, ScatterParams,
};

/// Draws candidates uniformly from the region's bounding rectangle and
/// rejects any that land closer than `spacing` to an accepted position.
/// When the per-slot retry budget runs out, the last draw is kept anyway,
/// so a session always appends exactly `count` positions.
pub struct ScatterPlacement {
    params: ScatterParams,
    salt: u64,
}

impl ScatterPlacement {
    /// Validates `params` eagerly; sampling itself cannot fail.
    pub fn new(params: ScatterParams) -> Result<Self, ScatterError> {
        params.validate()?;
        Ok(Self { params, salt: 0 })
    }

    /// Distinguishes sessions that share one world seed (e.g. per archetype).
    pub fn with_salt(mut self, salt: u64) -> Self {
        self.salt = salt;
        self
    }

    #[inline]
    fn rng_for(&self, seed: ForestSeed) -> ChaCha8Rng {
        // Stable per (seed, salt)
        let mix = seed.0 ^ (self.salt << 17) ^ 0xC2B2_AE3D_27D4_EB4Fu64;
        ChaCha8Rng::seed_from_u64(mix)
    }

    #[inline]
    fn draw(&self, rng: &mut ChaCha8Rng) -> Vec2 {
        // x and z are drawn independently, so Disk regions keep the square
        // spread of the bounding rectangle; `Region::contains` stays radial.
        let h = self.params.region.bounding_half();
        Vec2::new(rng.random_range(-h.x..h.x), rng.random_range(-h.y..h.y))
    }
}

impl PlacementStrategy for ScatterPlacement {
    fn place(&self, seed: ForestSeed, set: &mut PlacementSet) {
        let mut rng = self.rng_for(seed);
        let spacing = self.params.spacing;

        for _ in 0..self.params.count {
            let mut candidate = self.draw(&mut rng);
            let mut redraws = 0;
            while !set.admits(candidate, spacing) && redraws < self.params.tries {
                candidate = self.draw(&mut rng);
                redraws += 1;
            }
            // Budget spent: keep the last draw so the session still completes.
            set.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::core::Region;

    fn scatter(count: usize, spacing: f32, radius: f32, tries: u32) -> ScatterPlacement {
        ScatterPlacement::new(ScatterParams {
            count,
            spacing,
            region: Region::Disk { radius },
            tries,
        })
        .expect("valid test params")
    }

    fn min_pairwise_distance(points: &[Vec2]) -> f32 {
        let mut min = f32::INFINITY;
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                min = min.min(a.distance(*b));
            }
        }
        min
    }

    #[test]
    fn appends_exactly_count_positions() {
        let strat = scatter(17, 5.0, 100.0, 10);
        let mut set = PlacementSet::new();

        strat.place(ForestSeed(7), &mut set);

        assert_eq!(set.len(), 17);
    }

    #[test]
    fn identical_seed_reproduces_the_layout() {
        let strat = scatter(12, 8.0, 80.0, 20);

        let mut a = PlacementSet::new();
        let mut b = PlacementSet::new();
        strat.place(ForestSeed(99), &mut a);
        strat.place(ForestSeed(99), &mut b);

        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn salt_separates_sessions_sharing_a_seed() {
        let params = ScatterParams {
            count: 10,
            spacing: 8.0,
            region: Region::Disk { radius: 80.0 },
            tries: 20,
        };
        let a_strat = ScatterPlacement::new(params).unwrap().with_salt(1);
        let b_strat = ScatterPlacement::new(params).unwrap().with_salt(2);

        let mut a = PlacementSet::new();
        let mut b = PlacementSet::new();
        a_strat.place(ForestSeed(5), &mut a);
        b_strat.place(ForestSeed(5), &mut b);

        assert_ne!(a.points(), b.points());
    }

    #[test]
    fn sparse_config_satisfies_spacing() {
        // 5 positions with spacing 10 in a radius-100 disk leave plenty of
        // room; with 100 retries the constraint holds for this seed.
        let strat = scatter(5, 10.0, 100.0, 100);
        let mut set = PlacementSet::new();

        strat.place(ForestSeed(42), &mut set);

        assert_eq!(set.len(), 5);
        assert!(min_pairwise_distance(set.points()) >= 10.0);
    }

    #[test]
    fn overpacked_config_still_completes() {
        // Far more positions than the region can hold at this spacing: the
        // accept-anyway fallback must deliver the full count regardless.
        let strat = scatter(1000, 50.0, 10.0, 5);
        let mut set = PlacementSet::new();

        strat.place(ForestSeed(3), &mut set);

        assert_eq!(set.len(), 1000);
        // Spacing is necessarily violated somewhere.
        assert!(min_pairwise_distance(set.points()) < 50.0);
    }

    #[test]
    fn zero_count_leaves_the_set_untouched() {
        let strat = scatter(0, 10.0, 100.0, 10);
        let mut set = PlacementSet::new();

        strat.place(ForestSeed(1), &mut set);

        assert!(set.is_empty());
    }

    #[test]
    fn single_position_lands_inside_the_bounds() {
        let strat = scatter(1, 10.0, 100.0, 10);
        let mut set = PlacementSet::new();

        strat.place(ForestSeed(1), &mut set);

        assert_eq!(set.len(), 1);
        let p = set.points()[0];
        assert!(p.x.abs() <= 100.0 && p.y.abs() <= 100.0);
    }

    #[test]
    fn every_position_stays_in_the_bounding_rectangle() {
        let region = Region::Rect { half: Vec2::new(30.0, 12.0) };
        let strat = ScatterPlacement::new(ScatterParams {
            count: 50,
            spacing: 2.0,
            region,
            tries: 10,
        })
        .unwrap();
        let mut set = PlacementSet::new();

        strat.place(ForestSeed(8), &mut set);

        let h = region.bounding_half();
        for p in set.points() {
            assert!(p.x.abs() <= h.x, "{p:?} escapes x bound");
            assert!(p.y.abs() <= h.y, "{p:?} escapes z bound");
        }
    }

    #[test]
    fn preseeded_centerpiece_constrains_the_scatter() {
        // Ground 500 across with a 40 m rim margin gives a radius-210 disk;
        // one centerpiece at the origin plus 20 satellites.
        let strat = scatter(20, 40.0, 210.0, 100);
        let mut set = PlacementSet::new();
        set.push(Vec2::ZERO);

        strat.place(ForestSeed(21), &mut set);

        assert_eq!(set.len(), 21);
        assert_eq!(set.points()[0], Vec2::ZERO);
        for p in &set.points()[1..] {
            assert!(
                p.length() >= 40.0,
                "satellite {p:?} crowds the centerpiece"
            );
        }
    }

    #[test]
    fn rejected_params_never_reach_a_sampler() {
        let bad = ScatterParams {
            count: 4,
            spacing: -1.0,
            region: Region::Disk { radius: 10.0 },
            tries: 5,
        };
        assert!(ScatterPlacement::new(bad).is_err());
    }
}

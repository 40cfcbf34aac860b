// src/forest/core.rs
//! Core types for deterministic forest placement.
//! Keep this file dependency-light; it should compile before any placement impls.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ---------- Seed ----------

/// Global forest seed; changing this reshuffles every placement session.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForestSeed(pub u64);

// ---------- Region ----------

/// Bounded ground-plane area centered at the origin. Immutable for the
/// lifetime of one placement session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Region {
    /// Disk of given radius (meters).
    Disk { radius: f32 },
    /// Axis-aligned rectangle with half-extents (meters).
    Rect { half: Vec2 },
}

impl Region {
    /// Half-extents of the bounding rectangle.
    #[inline]
    pub fn bounding_half(&self) -> Vec2 {
        match *self {
            Region::Disk { radius } => Vec2::splat(radius),
            Region::Rect { half } => half,
        }
    }

    /// Exact containment test (radial for disks). Note that candidates are
    /// drawn from the bounding rectangle, so sampled positions of a `Disk`
    /// region may fail this test.
    pub fn contains(&self, p: Vec2) -> bool {
        match *self {
            Region::Disk { radius } => p.length_squared() <= radius * radius,
            Region::Rect { half } => p.x.abs() <= half.x && p.y.abs() <= half.y,
        }
    }

    /// True when the bounding rectangle has no area to draw from.
    pub fn is_empty(&self) -> bool {
        let h = self.bounding_half();
        !(h.x > 0.0 && h.y > 0.0)
    }
}

// ---------- Placement session state ----------

/// Accepted positions of one sampling session, in draw order (x, z).
///
/// Owned exclusively by the session building it. Pre-seeding the set
/// (e.g. with a centerpiece at the origin) constrains every later
/// candidate a [`PlacementStrategy`] appends.
#[derive(Clone, Debug, Default)]
pub struct PlacementSet {
    points: Vec<Vec2>,
}

impl PlacementSet {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self { points: Vec::with_capacity(cap) }
    }

    /// True when `candidate` keeps at least `spacing` to every accepted
    /// position. An exact `spacing` separation is admitted.
    pub fn admits(&self, candidate: Vec2, spacing: f32) -> bool {
        let s2 = spacing * spacing;
        !self.points.iter().any(|p| p.distance_squared(candidate) < s2)
    }

    /// Accept a position; it constrains all later candidates.
    pub fn push(&mut self, p: Vec2) {
        self.points.push(p);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

// ---------- Sampler configuration ----------

/// One placement session's configuration. Validated before any sampling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterParams {
    /// Number of positions to append.
    pub count: usize,
    /// Minimum distance between any two accepted positions (meters).
    pub spacing: f32,
    /// Sampling bounds.
    pub region: Region,
    /// Redraws allowed per position before the spacing constraint is waived.
    pub tries: u32,
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum ScatterError {
    #[error("spacing must be positive, got {0}")]
    NonPositiveSpacing(f32),
    #[error("tries must be at least 1")]
    ZeroTries,
    #[error("region has no area: {0:?}")]
    EmptyRegion(Region),
}

impl ScatterParams {
    /// Reject nonsensical configurations up front; sampling itself never fails.
    pub fn validate(&self) -> Result<(), ScatterError> {
        if !(self.spacing > 0.0) {
            return Err(ScatterError::NonPositiveSpacing(self.spacing));
        }
        if self.tries == 0 {
            return Err(ScatterError::ZeroTries);
        }
        if self.region.is_empty() {
            return Err(ScatterError::EmptyRegion(self.region));
        }
        Ok(())
    }
}

// ---------- Strategy seam ----------

/// Strategy that appends positions to a caller-owned session set.
pub trait PlacementStrategy: Send + Sync + 'static {
    /// Grow `set`; must be deterministic for identical inputs.
    fn place(&self, seed: ForestSeed, set: &mut PlacementSet);
}

// src/forest/placement/mod.rs
//! Deterministic placement strategies and the factory from data-form defs.

use std::sync::Arc;

use crate::forest::core::{PlacementStrategy, Region, ScatterError, ScatterParams};
use crate::forest::registry::ScatterDef;

mod scatter;

pub use scatter::ScatterPlacement;

/// Factory: build a boxed strategy from a registry `ScatterDef` and the
/// session region. Nonsensical parameters are rejected here, before any
/// sampling happens.
pub fn make_strategy(
    def: &ScatterDef,
    region: Region,
    salt: u64,
) -> Result<Arc<dyn PlacementStrategy>, ScatterError> {
    match *def {
        ScatterDef::Scatter { count, spacing, tries } => {
            let params = ScatterParams { count, spacing, region, tries };
            Ok(Arc::new(ScatterPlacement::new(params)?.with_salt(salt)))
        }
    }
}

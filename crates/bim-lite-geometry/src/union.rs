// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid aggregation
//!
//! Reduces a sequence of solids to a single solid by pairwise boolean union,
//! skipping inputs that carry no volume.

use crate::csg::CsgEngine;
use crate::{Error, Result};
use bim_lite_model::Solid;
use log::debug;

/// Pairwise boolean union capability
///
/// Engines must be usable from several threads at once. A failure is
/// reported as an error, never retried.
pub trait BooleanEngine: Send + Sync {
    /// Union of two solids
    ///
    /// The `index` of a returned `BooleanOperationFailed` is ignored; the
    /// aggregator replaces it with the position of `b` in its input.
    fn union(&self, a: &Solid, b: &Solid) -> Result<Solid>;

    /// Engine name for diagnostics
    fn name(&self) -> &'static str {
        "boolean"
    }
}

/// Folds solids together with a [`BooleanEngine`]
///
/// The fold runs left to right, so when two solids only touch (tangent
/// faces, shared edges) the result may depend on input order.
///
/// # Example
///
/// ```ignore
/// use bim_lite_geometry::SolidAggregator;
///
/// let merged = SolidAggregator::new().union(element_solids)?;
/// println!("volume: {}", merged.volume());
/// ```
pub struct SolidAggregator<E: BooleanEngine = CsgEngine> {
    engine: E,
}

impl SolidAggregator<CsgEngine> {
    /// Aggregator backed by the csgrs engine
    pub fn new() -> Self {
        Self::with_engine(CsgEngine::new())
    }
}

impl Default for SolidAggregator<CsgEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BooleanEngine> SolidAggregator<E> {
    /// Aggregator backed by a custom engine
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    /// The engine in use
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Union all solids with positive volume
    ///
    /// Solids with `volume <= 0` are discarded first. Fails with
    /// `EmptyInput` when nothing is left, or with `BooleanOperationFailed`
    /// naming the input index of the operand that could not be merged.
    pub fn union<I>(&self, solids: I) -> Result<Solid>
    where
        I: IntoIterator<Item = Solid>,
    {
        let mut usable = solids.into_iter().enumerate().filter(|(index, solid)| {
            let keep = solid.has_volume();
            if !keep {
                debug!(
                    "Skipping solid {} with non-positive volume {:.6}",
                    index,
                    solid.volume()
                );
            }
            keep
        });

        let (_, mut acc) = usable
            .next()
            .ok_or_else(|| Error::empty_input("solid union"))?;

        for (index, solid) in usable {
            acc = self.engine.union(&acc, &solid).map_err(|e| {
                let message = match e {
                    Error::BooleanOperationFailed { message, .. } => message,
                    other => other.to_string(),
                };
                Error::boolean_failed(index, message)
            })?;
            debug!(
                "{} union with solid {} -> volume {:.6}",
                self.engine.name(),
                index,
                acc.volume()
            );
        }

        Ok(acc)
    }
}

/// Union solids with the default csgrs engine
pub fn union_solids<I>(solids: I) -> Result<Solid>
where
    I: IntoIterator<Item = Solid>,
{
    SolidAggregator::new().union(solids)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM-Lite Geometry
//!
//! Geometry algorithms over the `bim-lite-model` snapshot types.
//!
//! ## Overview
//!
//! - **Flattening**: resolve instanced geometry trees into leaf primitives
//!   ([`flatten`], [`collect_solids`])
//! - **Aggregation**: merge solids by boolean union ([`SolidAggregator`],
//!   csgrs-backed [`CsgEngine`])
//! - **Classification**: decide which rooms an element belongs to
//!   ([`SpatialClassifier`])
//! - **Oriented frames**: frames and section boxes looking at an object
//!   ([`build_frame`], [`section_box`])
//! - **Extrusion**: room footprints to closed solids ([`extrude_region`])
//!
//! ## Architecture
//!
//! Boolean operations sit behind the [`BooleanEngine`] trait, so hosts with
//! their own solid modeller can plug it into [`SolidAggregator`]. Regions
//! come in through the model's `Region` trait.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bim_lite_geometry::{collect_solids, union_solids};
//! use bim_lite_model::Representation;
//!
//! let solids = collect_solids(&element_geometry, Representation::Placed);
//! let merged = union_solids(solids)?;
//! println!("Element volume: {}", merged.volume());
//! ```

pub mod classify;
pub mod csg;
pub mod extrusion;
pub mod flatten;
pub mod frame;
pub mod triangulation;
pub mod union;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use bim_lite_model::{Error, Result};

pub use classify::{Assignment, ClassifierOptions, HintPolicy, SpatialClassifier, Strategy};
pub use csg::CsgEngine;
pub use extrusion::{extrude_footprint, extrude_region};
pub use flatten::{collect_edges, collect_faces, collect_solids, flatten, geometry_bounds, Flatten};
pub use frame::{build_frame, build_local_box, frame_outline, section_box, SectionBoxExtents};
pub use triangulation::triangulate_footprint;
pub use union::{union_solids, BooleanEngine, SolidAggregator};

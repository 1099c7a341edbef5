// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM-Lite Model - Shared data model for the geometry kernel
//!
//! This crate holds the read-only snapshot types the host application hands
//! to the kernel: instanced geometry trees, rooms, and located elements.
//! Nothing here talks to a document or performs I/O; every value is plain
//! data that the caller owns.
//!
//! # Overview
//!
//! - [`GeometryNode`] / [`GeometryInstance`] - instanced geometry tree with
//!   placed and symbol representations
//! - [`Solid`], [`Face`], [`Edge`], [`Curve`] / [`Line`] - leaf primitives
//! - [`Transform`] / [`BoundingBox`] - local frames and (oriented) boxes
//! - [`Region`] / [`PolygonRegion`] - rooms with a containment predicate
//! - [`LocatedElement`] / [`RelationalHint`] - elements to classify
//! - [`Error`] - the kernel's error kinds
//!
//! # Example
//!
//! ```ignore
//! use bim_lite_model::{Category, ElementId, LocatedElement, PolygonRegion, Region};
//! use nalgebra::{Point2, Point3};
//!
//! let (min, max) = (Point2::new(0.0, 0.0), Point2::new(5.0, 4.0));
//! let room = PolygonRegion::rectangle(ElementId(1), min, max, 0.0, 3.0)?;
//! let chair = LocatedElement::new(ElementId(2), Category::Furniture)
//!     .with_point(Point3::new(1.0, 1.0, 0.0));
//! assert!(room.contains(&chair.placement_point().unwrap()));
//! ```

pub mod curve;
pub mod error;
pub mod geometry;
pub mod math;
pub mod spatial;
pub mod types;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector3};

// Re-export all public types
pub use curve::*;
pub use error::*;
pub use geometry::*;
pub use math::{BoundingBox, Transform, LINEAR_TOLERANCE};
pub use spatial::*;
pub use types::*;

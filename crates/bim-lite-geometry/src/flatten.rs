// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry tree flattening
//!
//! Resolves an instanced geometry tree into the flat sequence of leaf
//! primitives of one kind, descending into instances through the requested
//! [`Representation`].

use crate::{Error, Result};
use bim_lite_model::{
    BoundingBox, Edge, Face, GeometryNode, GeometryObject, LeafKind, Representation, Solid,
};
use nalgebra::Point3;
use std::marker::PhantomData;
use std::slice;

/// Lazy depth-first iterator over the leaves of kind `T`
///
/// Node order is preserved. The traversal keeps its own stack of child
/// iterators, so nesting depth is bounded by memory rather than by the call
/// stack. Owned trees cannot be cyclic; a host adapter that fakes cycles
/// (e.g. by re-expanding the same instance forever) would make this iterator
/// run without end.
pub struct Flatten<'a, T: ?Sized + 'a> {
    stack: Vec<slice::Iter<'a, GeometryNode>>,
    representation: Representation,
    _kind: PhantomData<&'a T>,
}

impl<'a, T: LeafKind + ?Sized + 'a> Flatten<'a, T> {
    /// Start a traversal over `nodes`
    pub fn new(nodes: &'a [GeometryNode], representation: Representation) -> Self {
        Self {
            stack: vec![nodes.iter()],
            representation,
            _kind: PhantomData,
        }
    }
}

impl<'a, T: LeafKind + ?Sized + 'a> Iterator for Flatten<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = match self.stack.last_mut()?.next() {
                Some(node) => node,
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            match node {
                GeometryNode::Leaf(object) => {
                    if let Some(leaf) = T::from_object(object) {
                        return Some(leaf);
                    }
                }
                GeometryNode::Instance(instance) => {
                    self.stack
                        .push(instance.children(self.representation).iter());
                }
                GeometryNode::Group(nodes) => {
                    self.stack.push(nodes.iter());
                }
            }
        }
    }
}

/// Flatten a geometry tree into its leaves of kind `T`
///
/// Fails with `InvalidArgument` only when `root` is missing. An empty tree,
/// or one without any `T`, yields an empty sequence.
///
/// # Example
///
/// ```ignore
/// use bim_lite_geometry::flatten;
/// use bim_lite_model::{Representation, Solid};
///
/// let solids: Vec<&Solid> = flatten::<Solid>(Some(&nodes[..]), Representation::Placed)?.collect();
/// ```
pub fn flatten<T: LeafKind + ?Sized>(
    root: Option<&[GeometryNode]>,
    representation: Representation,
) -> Result<Flatten<'_, T>> {
    let nodes = root.ok_or_else(|| Error::invalid_argument("geometry root is missing"))?;
    Ok(Flatten::new(nodes, representation))
}

/// All solids of a tree, cloned out
pub fn collect_solids(nodes: &[GeometryNode], representation: Representation) -> Vec<Solid> {
    Flatten::<Solid>::new(nodes, representation).cloned().collect()
}

/// Faces of every solid plus loose face leaves, in tree order
pub fn collect_faces(nodes: &[GeometryNode], representation: Representation) -> Vec<Face> {
    Flatten::<GeometryObject>::new(nodes, representation)
        .flat_map(|object| match object {
            GeometryObject::Solid(solid) => solid.faces().to_vec(),
            GeometryObject::Face(face) => vec![face.clone()],
            _ => Vec::new(),
        })
        .collect()
}

/// Edges of every solid plus loose edge leaves, in tree order
///
/// Solids without edges (empty shells) contribute nothing.
pub fn collect_edges(nodes: &[GeometryNode], representation: Representation) -> Vec<Edge> {
    Flatten::<GeometryObject>::new(nodes, representation)
        .flat_map(|object| match object {
            GeometryObject::Solid(solid) => solid.edges(),
            GeometryObject::Edge(edge) => vec![*edge],
            _ => Vec::new(),
        })
        .collect()
}

/// World axis-aligned box around every leaf of a tree
///
/// Curves contribute their end points and midpoint. Returns `None` when the
/// tree has no positioned leaves.
pub fn geometry_bounds(
    nodes: &[GeometryNode],
    representation: Representation,
) -> Option<BoundingBox> {
    let mut points: Vec<Point3<f64>> = Vec::new();
    for object in Flatten::<GeometryObject>::new(nodes, representation) {
        match object {
            GeometryObject::Solid(solid) => points.extend(solid.vertices().copied()),
            GeometryObject::Face(face) => points.extend_from_slice(face.vertices()),
            GeometryObject::Edge(edge) => points.extend([edge.start, edge.end]),
            GeometryObject::Point(point) => points.push(*point),
            GeometryObject::Curve(curve) => {
                points.extend(curve.end_point(0).ok());
                points.extend(curve.end_point(1).ok());
                points.push(curve.midpoint());
            }
        }
    }
    BoundingBox::from_points(points.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bim_lite_model::{Curve, GeometryInstance, Line, Transform};
    use nalgebra::Vector3;
    use std::sync::Arc;

    fn cube_at(x: f64) -> Solid {
        Solid::cuboid(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
    }

    fn line(x: f64) -> Arc<dyn Curve> {
        Arc::new(Line::new(Point3::new(x, 0.0, 0.0), Point3::new(x, 1.0, 0.0)).unwrap())
    }

    #[test]
    fn test_filters_by_kind_and_keeps_order() {
        let a = cube_at(0.0);
        let c = cube_at(5.0);
        let nodes = vec![
            GeometryNode::solid(a.clone()),
            GeometryNode::curve(line(2.0)),
            GeometryNode::solid(c.clone()),
        ];

        for repr in [Representation::Placed, Representation::Symbol] {
            let solids: Vec<&Solid> = flatten::<Solid>(Some(nodes.as_slice()), repr)
                .unwrap()
                .collect();
            assert_eq!(solids, vec![&a, &c]);
        }
    }

    #[test]
    fn test_instance_representation_selects_child_tree() {
        let placed = cube_at(0.0);
        let symbol = cube_at(10.0);
        let nodes = vec![GeometryNode::Instance(GeometryInstance::new(
            Transform::identity(),
            vec![GeometryNode::solid(placed.clone())],
            vec![GeometryNode::solid(symbol.clone())],
        ))];

        let from_placed: Vec<&Solid> =
            flatten(Some(nodes.as_slice()), Representation::Placed).unwrap().collect();
        let from_symbol: Vec<&Solid> =
            flatten(Some(nodes.as_slice()), Representation::Symbol).unwrap().collect();
        assert_eq!(from_placed, vec![&placed]);
        assert_eq!(from_symbol, vec![&symbol]);
    }

    #[test]
    fn test_depth_first_order_through_instances_and_groups() {
        let nodes = vec![
            GeometryNode::point(Point3::new(1.0, 0.0, 0.0)),
            GeometryNode::Group(vec![
                GeometryNode::point(Point3::new(2.0, 0.0, 0.0)),
                GeometryNode::Instance(GeometryInstance::from_symbol(
                    Transform::identity(),
                    vec![GeometryNode::point(Point3::new(3.0, 0.0, 0.0))],
                )),
            ]),
            GeometryNode::point(Point3::new(4.0, 0.0, 0.0)),
        ];

        let xs: Vec<f64> = flatten::<Point3<f64>>(Some(nodes.as_slice()), Representation::Placed)
            .unwrap()
            .map(|p| p.x)
            .collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_missing_root_is_invalid_argument() {
        let result = flatten::<Solid>(None, Representation::Placed);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_type_mismatch_yields_empty() {
        let nodes = vec![GeometryNode::curve(line(0.0))];
        assert_eq!(
            flatten::<Solid>(Some(nodes.as_slice()), Representation::Placed)
                .unwrap()
                .count(),
            0
        );
        let empty: Vec<GeometryNode> = Vec::new();
        assert_eq!(
            flatten::<Face>(Some(empty.as_slice()), Representation::Placed)
                .unwrap()
                .count(),
            0
        );
    }

    #[test]
    fn test_curves_flatten_as_trait_objects() {
        let nodes = vec![GeometryNode::curve(line(0.0)), GeometryNode::curve(line(3.0))];
        let mids: Vec<Point3<f64>> =
            flatten::<dyn Curve>(Some(nodes.as_slice()), Representation::Placed)
                .unwrap()
                .map(|c| c.midpoint())
                .collect();
        assert_eq!(mids, vec![Point3::new(0.0, 0.5, 0.0), Point3::new(3.0, 0.5, 0.0)]);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut node = GeometryNode::point(Point3::new(7.0, 0.0, 0.0));
        for _ in 0..50_000 {
            node = GeometryNode::Group(vec![node]);
        }
        let nodes = vec![node];
        let found: Vec<&Point3<f64>> = Flatten::new(&nodes, Representation::Placed).collect();
        assert_eq!(found, vec![&Point3::new(7.0, 0.0, 0.0)]);

        // Dropping a deeply nested tree recurses; unwind it iteratively
        let mut current = nodes;
        while let Some(GeometryNode::Group(children)) = current.pop() {
            current = children;
        }
    }

    #[test]
    fn test_collect_edges_and_faces() {
        let nodes = vec![
            GeometryNode::solid(cube_at(0.0)),
            GeometryNode::Leaf(GeometryObject::Edge(Edge::new(
                Point3::origin(),
                Point3::new(0.0, 0.0, 9.0),
            ))),
            GeometryNode::solid(Solid::default()),
        ];
        assert_eq!(collect_edges(&nodes, Representation::Placed).len(), 13);
        assert_eq!(collect_faces(&nodes, Representation::Placed).len(), 6);
        assert_eq!(collect_solids(&nodes, Representation::Placed).len(), 2);
    }

    #[test]
    fn test_geometry_bounds_of_placed_instance() {
        let nodes = vec![GeometryNode::Instance(GeometryInstance::from_symbol(
            Transform::translation(Vector3::new(10.0, 0.0, 0.0)),
            vec![GeometryNode::solid(cube_at(0.0))],
        ))];
        let placed = geometry_bounds(&nodes, Representation::Placed).unwrap();
        assert_eq!(placed.min, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(placed.max, Point3::new(11.0, 1.0, 1.0));

        let symbol = geometry_bounds(&nodes, Representation::Symbol).unwrap();
        assert_eq!(symbol.min, Point3::origin());
        assert!(geometry_bounds(&[], Representation::Placed).is_none());
    }
}

//! Collision geometry attached to the parts of a kinematic model.

use crate::math::{Isometry, Point, Real, Vector};

/// The geometric primitive of a collision shape.
///
/// Cylinders and cones have their principal axis aligned with the local `z` axis and are
/// centered on the origin. The apex of a cone points toward `+z`.
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub enum CollisionShape {
    /// An axis-aligned box given by its full side lengths.
    Box {
        /// The full extents of the box along each local axis.
        size: Vector<Real>,
    },
    /// A sphere centered on the origin.
    Sphere {
        /// The sphere radius.
        radius: Real,
    },
    /// A cylinder aligned with the local `z` axis.
    Cylinder {
        /// The radius of the cylinder.
        radius: Real,
        /// The full length of the cylinder along `z`.
        length: Real,
    },
    /// A cone aligned with the local `z` axis.
    Cone {
        /// The radius of the cone base (located at `z = -length / 2`).
        radius: Real,
        /// The full length of the cone along `z`.
        length: Real,
    },
    /// An indexed triangle mesh with outward-facing triangles.
    Mesh {
        /// The vertex buffer.
        vertices: Vec<Point<Real>>,
        /// The index buffer.
        indices: Vec<[u32; 3]>,
    },
}

impl CollisionShape {
    /// A box with the given full side lengths.
    pub fn cuboid(size: Vector<Real>) -> Self {
        CollisionShape::Box { size }
    }

    /// A sphere with the given radius.
    pub fn sphere(radius: Real) -> Self {
        CollisionShape::Sphere { radius }
    }

    /// A `z`-aligned cylinder.
    pub fn cylinder(radius: Real, length: Real) -> Self {
        CollisionShape::Cylinder { radius, length }
    }

    /// A `z`-aligned cone.
    pub fn cone(radius: Real, length: Real) -> Self {
        CollisionShape::Cone { radius, length }
    }

    /// A triangle mesh.
    pub fn mesh(vertices: Vec<Point<Real>>, indices: Vec<[u32; 3]>) -> Self {
        CollisionShape::Mesh { vertices, indices }
    }

    /// A short human-readable name of this shape's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CollisionShape::Box { .. } => "box",
            CollisionShape::Sphere { .. } => "sphere",
            CollisionShape::Cylinder { .. } => "cylinder",
            CollisionShape::Cone { .. } => "cone",
            CollisionShape::Mesh { .. } => "mesh",
        }
    }
}

/// A collision shape together with its pose relative to the frame of the part owning it.
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub struct PartShape {
    /// The collision origin of the shape, expressed in the part frame.
    pub pose: Isometry<Real>,
    /// The geometry.
    pub shape: CollisionShape,
}

impl PartShape {
    /// Creates a new posed shape.
    pub fn new(pose: Isometry<Real>, shape: CollisionShape) -> Self {
        PartShape { pose, shape }
    }

    /// A shape located at the origin of the part frame.
    pub fn at_origin(shape: CollisionShape) -> Self {
        PartShape {
            pose: Isometry::identity(),
            shape,
        }
    }
}

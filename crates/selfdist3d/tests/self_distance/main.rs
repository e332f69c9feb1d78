#[macro_use]
extern crate approx;

use selfdist3d::kinematics::{Joint, KinematicTree};
use selfdist3d::math::{Isometry, Vector};
use selfdist3d::self_distance::FieldParams;
use selfdist3d::shape::{CollisionShape, PartShape};

mod classification;
mod field_queries;
mod scenarios;
mod sphere_retry;

/// A static box `B` (half-extent 1, centered 2m away along `x`) at the root, and an active
/// ball `A` of radius 0.1 at the origin, moved by the joint group `arm`.
pub fn ball_and_box() -> KinematicTree {
    let mut tree = KinematicTree::new("B");
    tree.add_shape(
        0,
        PartShape::new(
            Isometry::translation(2.0, 0.0, 0.0),
            CollisionShape::cuboid(Vector::repeat(2.0)),
        ),
    )
    .unwrap();

    let a = tree
        .add_part(
            "A",
            0,
            Joint::revolute(Isometry::identity(), Vector::z_axis()),
        )
        .unwrap();
    tree.add_shape(a, PartShape::at_origin(CollisionShape::sphere(0.1)))
        .unwrap();
    tree.add_joint_group("arm", &[a]).unwrap();
    tree
}

/// Coarse parameters with an exterior band wide enough for `ball_and_box`.
pub fn coarse_params() -> FieldParams {
    FieldParams {
        voxel_size: 0.1,
        background: 2.0,
        exterior_band: 12.0,
        interior_band: 3.0,
    }
}

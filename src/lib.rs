/*!
selfdist3d
========

**selfdist3d** computes minimum distances between the parts of an articulated body
(a robot arm, a humanoid, any kinematic tree) using sparse signed distance fields.

Every collision-bearing part is voxelized into a narrow-band distance field. Parts that
move often are additionally approximated by a small set of spheres, which are looked up in
the fields of the other parts at query time to get, for each moving part, the distance to
its closest neighbor and the direction it should move along to get away from it.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(unused_qualifications)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::type_complexity)]

#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;
pub extern crate parry3d;

pub mod kinematics;
pub mod self_distance;
pub mod shape;
pub mod utils;
pub mod volume;

/// Aliases for mathematical types.
pub mod math {
    pub use na::{Isometry3, Point3, Translation3, UnitVector3, Vector3};

    /// The scalar type used throughout this crate.
    pub use f32 as Real;

    /// The point type.
    pub use Point3 as Point;
    /// The vector type.
    pub use Vector3 as Vector;
    /// The unit vector type.
    pub use UnitVector3 as UnitVector;
    /// The transformation matrix type.
    pub use Isometry3 as Isometry;
    /// The translation type.
    pub use Translation3 as Translation;
}

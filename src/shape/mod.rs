//! Collision geometry of the parts of a kinematic model.

pub use self::collision_shape::{CollisionShape, PartShape};

mod collision_shape;

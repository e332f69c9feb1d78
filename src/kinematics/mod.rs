//! Read-only views of articulated bodies and of their collision policies.

pub use self::allowed_collision::{AllowList, AllowedCollision, AllowedCollisionMatrix};
pub use self::kinematic_model::{FixedAttachments, KinematicModel, PartId};
pub use self::kinematic_tree::{Joint, JointKind, KinematicTree, ModelError};

mod allowed_collision;
mod kinematic_model;
mod kinematic_tree;

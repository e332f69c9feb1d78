use crate::math::{Isometry, Real};
use crate::shape::PartShape;
use smallvec::SmallVec;

/// The index of a part within a [`KinematicModel`].
pub type PartId = usize;

/// A list of parts rigidly attached to another one, with their relative transforms.
pub type FixedAttachments = SmallVec<[(PartId, Isometry<Real>); 4]>;

/// Read-only view of an articulated body.
///
/// The self-distance engine never owns nor mutates the model: it only refers to its parts
/// through their [`PartId`], walks its fixed attachments and joint groups once at
/// construction, and reads the parts' world transforms at query time.
pub trait KinematicModel {
    /// The number of parts of this model. Valid part ids are `0..num_parts()`.
    fn num_parts(&self) -> usize;

    /// The root part of the kinematic tree.
    fn root_part(&self) -> PartId;

    /// The unique name of a part.
    fn part_name(&self, part: PartId) -> &str;

    /// The collision shapes of a part, expressed in the part frame.
    fn collision_shapes(&self, part: PartId) -> &[PartShape];

    /// Does this part carry any collision geometry?
    fn has_collision_geometry(&self, part: PartId) -> bool {
        !self.collision_shapes(part).is_empty()
    }

    /// The parts directly attached to `part` through a non-actuated joint, with the transform
    /// of their frame relative to the frame of `part`.
    fn fixed_attachments(&self, part: PartId) -> FixedAttachments;

    /// The names of all the actuated joint groups of this model.
    fn joint_group_names(&self) -> Vec<&str>;

    /// The parts moved by the given joint group, or `None` if the group does not exist.
    fn joint_group_parts(&self, group: &str) -> Option<Vec<PartId>>;

    /// The current transform of the part frame relative to the world frame.
    fn part_world_transform(&self, part: PartId) -> Isometry<Real>;

    /// The ids of all the parts carrying collision geometry, in increasing order.
    fn parts_with_collision_geometry(&self) -> Vec<PartId> {
        (0..self.num_parts())
            .filter(|part| self.has_collision_geometry(*part))
            .collect()
    }

    /// The id of the part with the given name, if any.
    fn part_id(&self, name: &str) -> Option<PartId> {
        (0..self.num_parts()).find(|part| self.part_name(*part) == name)
    }
}

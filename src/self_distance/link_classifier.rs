//! Partition of the collision-bearing parts of a model by mobility.

use crate::kinematics::{KinematicModel, PartId};
use crate::math::{Isometry, Real};
use hashbrown::HashSet;

/// How often a part moves relative to the others.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum MobilityClass {
    /// Rigidly attached to the kinematic root.
    Static,
    /// Moved by one of the actuated joint groups.
    Active,
    /// Neither static nor active.
    Dynamic,
}

/// A collision-bearing part together with its mobility class.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedPart {
    /// The part name.
    pub name: String,
    /// The part id in its kinematic model.
    pub part: PartId,
    /// The mobility class of the part.
    pub class: MobilityClass,
    /// The transform of the part frame relative to the root frame, accumulated through its
    /// fixed attachments. Identity for non-static parts.
    pub fixed_transform: Isometry<Real>,
}

/// The collision-bearing parts of a model, partitioned by mobility class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartClassification {
    /// The parts rigidly attached to the root, in walk order.
    pub statics: Vec<ClassifiedPart>,
    /// The parts moved by a joint group, in group order.
    pub actives: Vec<ClassifiedPart>,
    /// The remaining parts, in increasing id order.
    pub dynamics: Vec<ClassifiedPart>,
}

impl PartClassification {
    /// Classifies every collision-bearing part of `model`.
    ///
    /// The fixed attachments are walked from the root with an explicit stack so deep models
    /// do not recurse, and a visited set makes sure each part is classified at most once even
    /// if it can be reached through several fixed paths.
    pub fn classify<M: KinematicModel + ?Sized>(model: &M) -> Self {
        let mut result = Self::default();
        let mut classified = HashSet::new();
        let mut visited = HashSet::new();

        let root = model.root_part();
        let _ = visited.insert(root);
        let mut stack = vec![(root, Isometry::identity())];

        if model.has_collision_geometry(root) {
            let _ = classified.insert(root);
            result
                .statics
                .push(classified_part(model, root, MobilityClass::Static, Isometry::identity()));
        }

        while let Some((part, pose)) = stack.pop() {
            for (child, relative) in model.fixed_attachments(part) {
                if !visited.insert(child) {
                    continue;
                }

                let child_pose = pose * relative;

                if model.has_collision_geometry(child) {
                    let _ = classified.insert(child);
                    result.statics.push(classified_part(
                        model,
                        child,
                        MobilityClass::Static,
                        child_pose,
                    ));
                }

                stack.push((child, child_pose));
            }
        }

        for group in model.joint_group_names() {
            for part in model.joint_group_parts(group).unwrap_or_default() {
                if model.has_collision_geometry(part) && classified.insert(part) {
                    result.actives.push(classified_part(
                        model,
                        part,
                        MobilityClass::Active,
                        Isometry::identity(),
                    ));
                }
            }
        }

        for part in model.parts_with_collision_geometry() {
            if classified.insert(part) {
                result.dynamics.push(classified_part(
                    model,
                    part,
                    MobilityClass::Dynamic,
                    Isometry::identity(),
                ));
            }
        }

        log::debug!(
            "Classified {} static, {} active and {} dynamic parts.",
            result.statics.len(),
            result.actives.len(),
            result.dynamics.len()
        );

        result
    }

    /// The total number of classified parts.
    pub fn len(&self) -> usize {
        self.statics.len() + self.actives.len() + self.dynamics.len()
    }

    /// Is there no collision-bearing part at all?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates through all the classified parts, statics first, then actives and dynamics.
    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedPart> {
        self.statics
            .iter()
            .chain(self.actives.iter())
            .chain(self.dynamics.iter())
    }

    /// The class of the part with the given name, if it is classified.
    pub fn class_of(&self, name: &str) -> Option<MobilityClass> {
        self.iter()
            .find(|part| part.name == name)
            .map(|part| part.class)
    }
}

fn classified_part<M: KinematicModel + ?Sized>(
    model: &M,
    part: PartId,
    class: MobilityClass,
    fixed_transform: Isometry<Real>,
) -> ClassifiedPart {
    ClassifiedPart {
        name: model.part_name(part).to_string(),
        part,
        class,
        fixed_transform,
    }
}
